// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use chromiumoxide::Page;
use std::time::Duration;
use thiserror::Error;

// How often the selector wait re-queries the DOM.
const WAIT_POLL_INTERVAL: Duration = Duration::from_millis(250);

/// 页面操作错误类型
#[derive(Error, Debug)]
pub enum PageError {
    /// 导航失败
    #[error("Navigation failed for {url}: {message}")]
    Navigation { url: String, message: String },
    /// 元素未找到
    #[error("Element not found: {selector}")]
    NotFound { selector: String },
    /// 元素交互失败
    #[error("Interaction failed on {selector}: {message}")]
    Interaction { selector: String, message: String },
    /// 等待选择器超时
    #[error("Timed out after {timeout:?} waiting for {selector} containing \"{text}\"")]
    WaitTimeout {
        selector: String,
        text: String,
        timeout: Duration,
    },
    /// 读取页面内容失败
    #[error("Failed to read page content: {0}")]
    Content(String),
}

/// 页面操作特质
///
/// 登录流程和内容捕获所需的最小页面操作集。
/// 生产实现包装chromiumoxide的Page；测试使用记录型假实现，
/// 从而无需真实浏览器即可验证操作顺序和超时语义。
#[async_trait]
pub trait PageActions: Send {
    /// 导航到指定URL并等待加载完成
    async fn goto(&mut self, url: &str) -> Result<(), PageError>;

    /// 向匹配选择器的输入框填入文本
    async fn fill(&mut self, selector: &str, value: &str) -> Result<(), PageError>;

    /// 点击匹配选择器的第一个元素
    async fn click(&mut self, selector: &str) -> Result<(), PageError>;

    /// 点击匹配选择器且文本包含指定字面量的第一个元素
    ///
    /// CSS没有Playwright的`:has-text()`伪类，文本匹配在这里显式完成
    async fn click_by_text(&mut self, selector: &str, text: &str) -> Result<(), PageError>;

    /// 等待匹配选择器且文本包含指定字面量的元素出现
    ///
    /// 超过`timeout`仍未出现则返回`PageError::WaitTimeout`
    async fn wait_for_selector(
        &mut self,
        selector: &str,
        text: &str,
        timeout: Duration,
    ) -> Result<(), PageError>;

    /// 获取当前渲染后的完整HTML
    async fn content(&mut self) -> Result<String, PageError>;
}

/// 基于CDP的页面操作实现
pub struct CdpPage {
    page: Page,
}

impl CdpPage {
    pub fn new(page: Page) -> Self {
        Self { page }
    }
}

#[async_trait]
impl PageActions for CdpPage {
    async fn goto(&mut self, url: &str) -> Result<(), PageError> {
        // goto waits for the load event by default
        self.page
            .goto(url)
            .await
            .map_err(|e| PageError::Navigation {
                url: url.to_string(),
                message: e.to_string(),
            })?;
        Ok(())
    }

    async fn fill(&mut self, selector: &str, value: &str) -> Result<(), PageError> {
        let element =
            self.page
                .find_element(selector)
                .await
                .map_err(|e| PageError::NotFound {
                    selector: format!("{} ({})", selector, e),
                })?;

        // Focus the field before typing into it
        element
            .click()
            .await
            .map_err(|e| PageError::Interaction {
                selector: selector.to_string(),
                message: e.to_string(),
            })?;
        element
            .type_str(value)
            .await
            .map_err(|e| PageError::Interaction {
                selector: selector.to_string(),
                message: e.to_string(),
            })?;
        Ok(())
    }

    async fn click(&mut self, selector: &str) -> Result<(), PageError> {
        self.page
            .find_element(selector)
            .await
            .map_err(|e| PageError::NotFound {
                selector: format!("{} ({})", selector, e),
            })?
            .click()
            .await
            .map_err(|e| PageError::Interaction {
                selector: selector.to_string(),
                message: e.to_string(),
            })?;
        Ok(())
    }

    async fn click_by_text(&mut self, selector: &str, text: &str) -> Result<(), PageError> {
        let elements =
            self.page
                .find_elements(selector)
                .await
                .map_err(|e| PageError::NotFound {
                    selector: format!("{} ({})", selector, e),
                })?;

        for element in elements {
            let inner = element.inner_text().await.unwrap_or(None);
            if inner.map(|t| t.contains(text)).unwrap_or(false) {
                element.click().await.map_err(|e| PageError::Interaction {
                    selector: selector.to_string(),
                    message: e.to_string(),
                })?;
                return Ok(());
            }
        }

        Err(PageError::NotFound {
            selector: format!("{} containing \"{}\"", selector, text),
        })
    }

    async fn wait_for_selector(
        &mut self,
        selector: &str,
        text: &str,
        timeout: Duration,
    ) -> Result<(), PageError> {
        let page = &self.page;
        tokio::time::timeout(timeout, async {
            loop {
                if let Ok(elements) = page.find_elements(selector).await {
                    for element in elements {
                        if let Ok(Some(inner)) = element.inner_text().await {
                            if inner.contains(text) {
                                return;
                            }
                        }
                    }
                }
                tokio::time::sleep(WAIT_POLL_INTERVAL).await;
            }
        })
        .await
        .map_err(|_| PageError::WaitTimeout {
            selector: selector.to_string(),
            text: text.to_string(),
            timeout,
        })
    }

    async fn content(&mut self) -> Result<String, PageError> {
        self.page
            .content()
            .await
            .map_err(|e| PageError::Content(e.to_string()))
    }
}
