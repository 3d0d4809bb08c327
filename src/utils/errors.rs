// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use thiserror::Error;

use crate::engines::page::PageError;
use crate::filter::llm_filter::FilterError;

/// 爬取错误类型
///
/// 覆盖一次爬取运行的全部失败路径：凭证缺失、浏览器故障、
/// 页面操作失败、内容过滤失败以及HTML快照写入失败。
/// 所有错误对单次运行都是致命的，没有重试或恢复层。
#[derive(Error, Debug)]
pub enum CrawlError {
    #[error("缺少凭证: 环境变量 {0} 未设置或为空")]
    MissingCredential(&'static str),

    #[error("浏览器错误: {0}")]
    Browser(String),

    #[error("无效的URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("页面操作失败: {0}")]
    Page(#[from] PageError),

    #[error("内容过滤失败: {0}")]
    Filter(#[from] FilterError),

    #[error("写入HTML快照失败 ({path}): {source}")]
    Sink {
        path: String,
        source: std::io::Error,
    },

    #[error("配置错误: {0}")]
    Config(#[from] config::ConfigError),
}
