// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde::{Deserialize, Serialize};

use crate::filter::llm_filter::LLMContentFilter;

/// 缓存模式
///
/// 控制单次运行是否读取和写入页面缓存
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CacheMode {
    /// 读取并写入缓存
    Enabled,
    /// 绕过缓存：既不读取也不写入
    Bypass,
    /// 只读缓存
    ReadOnly,
    /// 只写缓存
    WriteOnly,
    /// 完全禁用缓存（与Bypass语义一致，保留以兼容旧配置）
    Disabled,
}

impl CacheMode {
    pub fn should_read(self) -> bool {
        matches!(self, CacheMode::Enabled | CacheMode::ReadOnly)
    }

    pub fn should_write(self) -> bool {
        matches!(self, CacheMode::Enabled | CacheMode::WriteOnly)
    }
}

/// 单次爬取运行配置
pub struct CrawlerRunConfig {
    /// 缓存模式
    pub cache_mode: CacheMode,
    /// 附加的内容过滤器（None时结果的`fit_markdown`为空）
    pub content_filter: Option<LLMContentFilter>,
}

impl Default for CrawlerRunConfig {
    fn default() -> Self {
        Self {
            cache_mode: CacheMode::Enabled,
            content_filter: None,
        }
    }
}
