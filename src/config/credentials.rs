// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::utils::errors::CrawlError;

/// 运行凭证
///
/// 三个不透明字符串，启动时从进程环境读取一次，仅保留在内存中，
/// 不做任何持久化。任一变量缺失或为空即视为启动失败，
/// 在任何网络或浏览器活动之前终止运行。
#[derive(Clone)]
pub struct Credentials {
    /// LLM API令牌
    pub api_key: String,
    /// ERP登录用户名
    pub username: String,
    /// ERP登录密码
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &"<redacted>")
            .field("username", &"<redacted>")
            .field("password", &"<redacted>")
            .finish()
    }
}

impl Credentials {
    /// 从环境变量加载凭证
    ///
    /// 必需变量: `openai_api`、`erp_username`、`erp_password`
    pub fn from_env() -> Result<Self, CrawlError> {
        Ok(Self {
            api_key: require_env("openai_api")?,
            username: require_env("erp_username")?,
            password: require_env("erp_password")?,
        })
    }
}

fn require_env(name: &'static str) -> Result<String, CrawlError> {
    match std::env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(CrawlError::MissingCredential(name)),
    }
}
