// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

use crate::cache::PageCache;
use crate::crawler::hooks::CrawlerHooks;
use crate::crawler::run_config::CrawlerRunConfig;
use crate::engines::browser::{BrowserOptions, BrowserSession};
use crate::engines::page::PageActions;
use crate::markdown::MarkdownGenerator;
use crate::utils::errors::CrawlError;

// Cached pages go stale quickly on a live attendance grid.
const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(300);

/// 爬取结果
///
/// 单次运行的输出：原始HTML、未过滤的Markdown转换结果，
/// 以及附加了内容过滤器时的过滤后Markdown。
#[derive(Debug, Clone)]
pub struct CrawlResult {
    /// 目标URL
    pub url: String,
    /// 渲染后的完整HTML
    pub html: String,
    /// 未过滤的Markdown
    pub markdown: String,
    /// 过滤后的Markdown（未附加过滤器时为空）
    pub fit_markdown: String,
    /// 是否来自缓存
    pub from_cache: bool,
}

/// 爬取驱动器
///
/// 持有浏览器会话、生命周期钩子和页面缓存，
/// 以 `start` → `run` → `close` 的顺序执行单次爬取。
/// 一次 `run` 的流程：缓存探测（按模式）→ 新建页面 →
/// `on_page_context_created` → 导航到目标URL → 捕获HTML →
/// `before_return_html` → Markdown生成 → 可选内容过滤 → 缓存写入（按模式）。
pub struct Crawler {
    options: BrowserOptions,
    hooks: Arc<dyn CrawlerHooks>,
    cache: PageCache,
    markdown: MarkdownGenerator,
    session: Option<BrowserSession>,
}

impl Crawler {
    pub fn new(options: BrowserOptions, hooks: Arc<dyn CrawlerHooks>) -> Self {
        Self {
            options,
            hooks,
            cache: PageCache::new(DEFAULT_CACHE_TTL),
            markdown: MarkdownGenerator::new(),
            session: None,
        }
    }

    pub fn cache(&self) -> &PageCache {
        &self.cache
    }

    /// 启动浏览器会话并触发 `on_browser_created` 钩子
    pub async fn start(&mut self) -> Result<(), CrawlError> {
        if self.session.is_some() {
            return Ok(());
        }

        let session = BrowserSession::launch(&self.options).await?;
        self.hooks.on_browser_created(session.browser()).await?;
        self.session = Some(session);
        info!("Browser session started");
        Ok(())
    }

    /// 对目标URL执行一次爬取
    ///
    /// 缓存命中（按模式允许读取时）直接返回缓存结果，不接触浏览器；
    /// 否则要求会话已启动，创建新页面并执行完整流程。
    pub async fn run(
        &self,
        url: &str,
        config: &CrawlerRunConfig,
    ) -> Result<CrawlResult, CrawlError> {
        Url::parse(url)?;

        if config.cache_mode.should_read() {
            if let Some(html) = self.cache.get(url) {
                debug!("Serving {} from page cache", url);
                return self.finalize(url, html, config, true).await;
            }
        }

        let session = self
            .session
            .as_ref()
            .ok_or_else(|| CrawlError::Browser("crawler has not been started".to_string()))?;
        let mut page = session.new_page().await?;
        self.run_on_page(&mut page, url, config).await
    }

    /// 在给定页面上执行一次爬取流程
    ///
    /// 与 `run` 相同的钩子顺序，但页面由调用方提供，
    /// 缓存读取不在此路径上发生（只有写入按模式执行）。
    pub async fn run_on_page(
        &self,
        page: &mut dyn PageActions,
        url: &str,
        config: &CrawlerRunConfig,
    ) -> Result<CrawlResult, CrawlError> {
        self.hooks.on_page_context_created(page).await?;

        page.goto(url).await?;
        let html = page.content().await?;

        self.hooks.before_return_html(page, &html).await?;

        if config.cache_mode.should_write() {
            self.cache.store(url, &html);
        }

        self.finalize(url, html, config, false).await
    }

    async fn finalize(
        &self,
        url: &str,
        html: String,
        config: &CrawlerRunConfig,
        from_cache: bool,
    ) -> Result<CrawlResult, CrawlError> {
        let markdown = self.markdown.generate(&html);
        let fit_markdown = match &config.content_filter {
            Some(filter) => filter.filter_content(&markdown).await?,
            None => String::new(),
        };

        Ok(CrawlResult {
            url: url.to_string(),
            html,
            markdown,
            fit_markdown,
            from_cache,
        })
    }

    /// 关闭浏览器会话
    pub async fn close(&mut self) -> Result<(), CrawlError> {
        if let Some(session) = self.session.take() {
            session.close().await?;
            info!("Browser session closed");
        }
        Ok(())
    }
}
