// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use chromiumoxide::Browser;
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;

use crate::config::credentials::Credentials;
use crate::config::settings::PortalSettings;
use crate::crawler::hooks::CrawlerHooks;
use crate::engines::page::PageActions;
use crate::utils::errors::CrawlError;

/// 门户流程配置
///
/// 登录流程使用的选择器、文本标记、等待超时和快照输出路径。
/// 全部来自配置，默认值绑定到具体的ERP实例。
#[derive(Debug, Clone)]
pub struct PortalConfig {
    pub login_url: String,
    pub email_selector: String,
    pub password_selector: String,
    pub login_button_selector: String,
    pub nav_selector: String,
    pub nav_text: String,
    pub attendance_cell_selector: String,
    pub attendance_marker: String,
    pub wait_timeout: Duration,
    pub output_path: PathBuf,
}

impl PortalConfig {
    pub fn from_settings(settings: &PortalSettings) -> Self {
        Self {
            login_url: settings.login_url.clone(),
            email_selector: settings.email_selector.clone(),
            password_selector: settings.password_selector.clone(),
            login_button_selector: settings.login_button_selector.clone(),
            nav_selector: settings.nav_selector.clone(),
            nav_text: settings.nav_text.clone(),
            attendance_cell_selector: settings.attendance_cell_selector.clone(),
            attendance_marker: settings.attendance_marker.clone(),
            wait_timeout: Duration::from_secs(settings.wait_timeout_secs),
            output_path: PathBuf::from(&settings.output_path),
        }
    }
}

/// ERP考勤门户钩子集
///
/// 三个生命周期钩子共同完成考勤页抓取：
/// 浏览器创建后仅记录日志；页面创建后执行登录并导航到考勤页，
/// 等待目标员工的考勤单元格渲染；返回HTML前把完整快照写入本地文件。
pub struct ErpPortalHooks {
    config: PortalConfig,
    credentials: Credentials,
}

impl ErpPortalHooks {
    pub fn new(config: PortalConfig, credentials: Credentials) -> Self {
        Self {
            config,
            credentials,
        }
    }
}

#[async_trait]
impl CrawlerHooks for ErpPortalHooks {
    async fn on_browser_created(&self, _browser: &Browser) -> Result<(), CrawlError> {
        info!("[HOOK] on_browser_created - Browser created successfully!");
        Ok(())
    }

    async fn on_page_context_created(&self, page: &mut dyn PageActions) -> Result<(), CrawlError> {
        info!("[HOOK] on_page_context_created - Setting up page & context");

        // The login sequence is strictly ordered; any failed step aborts the run
        page.goto(&self.config.login_url).await?;
        page.fill(&self.config.email_selector, &self.credentials.username)
            .await?;
        page.fill(&self.config.password_selector, &self.credentials.password)
            .await?;
        page.click(&self.config.login_button_selector).await?;
        page.click_by_text(&self.config.nav_selector, &self.config.nav_text)
            .await?;

        // The attendance grid is rendered client-side; wait for the marker cell
        page.wait_for_selector(
            &self.config.attendance_cell_selector,
            &self.config.attendance_marker,
            self.config.wait_timeout,
        )
        .await?;

        info!(
            "Found \"{}\" inside the attendance cell",
            self.config.attendance_marker
        );
        Ok(())
    }

    async fn before_return_html(
        &self,
        _page: &mut dyn PageActions,
        html: &str,
    ) -> Result<(), CrawlError> {
        info!("[HOOK] before_return_html - HTML length: {}", html.len());

        tokio::fs::write(&self.config.output_path, html)
            .await
            .map_err(|source| CrawlError::Sink {
                path: self.config.output_path.display().to_string(),
                source,
            })?;
        Ok(())
    }
}
