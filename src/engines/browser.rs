// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chromiumoxide::{Browser, BrowserConfig};
use futures::StreamExt;
use std::time::Duration;
use tokio::task::JoinHandle;

use crate::engines::page::CdpPage;
use crate::utils::errors::CrawlError;

/// 浏览器启动选项
#[derive(Debug, Clone)]
pub struct BrowserOptions {
    /// 是否无头运行（false时打开可见窗口）
    pub headless: bool,
    /// CDP请求超时时间
    pub request_timeout: Duration,
    /// 附加的Chromium启动参数
    pub extra_args: Vec<String>,
}

impl Default for BrowserOptions {
    fn default() -> Self {
        Self {
            headless: true,
            request_timeout: Duration::from_secs(30),
            extra_args: Vec::new(),
        }
    }
}

/// 浏览器会话
///
/// 持有chromiumoxide浏览器实例及其CDP事件处理任务。
/// 一个会话对应一个浏览器进程，显式`close`后结束。
pub struct BrowserSession {
    browser: Browser,
    handler_task: JoinHandle<()>,
}

impl BrowserSession {
    /// 启动（或连接）浏览器并建立会话
    ///
    /// 设置了 `CHROMIUM_REMOTE_DEBUGGING_URL` 时连接到已有的远程Chrome实例，
    /// 否则按选项启动本地进程。
    pub async fn launch(options: &BrowserOptions) -> Result<Self, CrawlError> {
        let remote_debugging_url = std::env::var("CHROMIUM_REMOTE_DEBUGGING_URL").ok();

        let (browser, mut handler) = if let Some(ref url) = remote_debugging_url {
            tracing::info!("Connecting to remote Chrome instance at: {}", url);
            Browser::connect(url).await.map_err(|e| {
                CrawlError::Browser(format!("Failed to connect to remote Chrome: {}", e))
            })?
        } else {
            let mut builder = BrowserConfig::builder()
                .no_sandbox()
                .request_timeout(options.request_timeout);

            if !options.headless {
                builder = builder.with_head();
            }

            builder = builder.arg("--disable-gpu").arg("--disable-dev-shm-usage");
            for arg in &options.extra_args {
                builder = builder.arg(arg);
            }

            Browser::launch(builder.build().map_err(CrawlError::Browser)?)
                .await
                .map_err(|e| CrawlError::Browser(e.to_string()))?
        };

        // Spawn a handler to process browser events
        let handler_task = tokio::spawn(async move {
            while let Some(h) = handler.next().await {
                if h.is_err() {
                    break;
                }
            }
        });

        Ok(Self {
            browser,
            handler_task,
        })
    }

    pub fn browser(&self) -> &Browser {
        &self.browser
    }

    /// 创建一个空白新页面
    pub async fn new_page(&self) -> Result<CdpPage, CrawlError> {
        let page = self
            .browser
            .new_page("about:blank")
            .await
            .map_err(|e| CrawlError::Browser(e.to_string()))?;
        Ok(CdpPage::new(page))
    }

    /// 关闭浏览器并等待事件处理任务退出
    pub async fn close(mut self) -> Result<(), CrawlError> {
        self.browser
            .close()
            .await
            .map_err(|e| CrawlError::Browser(e.to_string()))?;
        let _ = self.handler_task.await;
        Ok(())
    }
}
