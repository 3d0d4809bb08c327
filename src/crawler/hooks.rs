// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use chromiumoxide::Browser;

use crate::engines::page::PageActions;
use crate::utils::errors::CrawlError;

/// 爬取生命周期钩子
///
/// 驱动器在固定的生命周期点依次调用这些方法，每个方法对应一个扩展点：
///
/// 1. `on_browser_created` - 浏览器进程可用之后、任何页面创建之前，调用一次
/// 2. `on_page_context_created` - 新页面创建之后、目标URL加载之前，每页调用一次
/// 3. `before_return_html` - 结果最终确定之前，带着渲染后的完整HTML调用一次
///
/// 所有方法都有空默认实现；钩子返回错误会中止整次运行，没有重试。
#[async_trait]
pub trait CrawlerHooks: Send + Sync {
    async fn on_browser_created(&self, _browser: &Browser) -> Result<(), CrawlError> {
        Ok(())
    }

    async fn on_page_context_created(
        &self,
        _page: &mut dyn PageActions,
    ) -> Result<(), CrawlError> {
        Ok(())
    }

    async fn before_return_html(
        &self,
        _page: &mut dyn PageActions,
        _html: &str,
    ) -> Result<(), CrawlError> {
        Ok(())
    }
}

/// 空钩子集
pub struct NoopHooks;

#[async_trait]
impl CrawlerHooks for NoopHooks {}
