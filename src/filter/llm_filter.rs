// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use thiserror::Error;
use tracing::debug;

use crate::filter::chunking::{estimate_tokens, split_by_token_threshold};

const SYSTEM_PROMPT: &str = "You are a helpful content extraction assistant. \
You extract the requested content from the supplied page text and return it as markdown.";

/// 过滤器错误类型
#[derive(Error, Debug)]
pub enum FilterError {
    /// 请求失败
    #[error("Request to LLM API failed: {0}")]
    RequestFailed(#[from] reqwest::Error),
    /// API返回错误状态
    #[error("LLM API returned error: {status} - {body}")]
    Api { status: u16, body: String },
    /// 响应格式无效
    #[error("Invalid response format from LLM API")]
    MalformedResponse,
}

/// 令牌使用统计
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

impl TokenUsage {
    fn add(&mut self, other: &TokenUsage) {
        self.prompt_tokens += other.prompt_tokens;
        self.completion_tokens += other.completion_tokens;
        self.total_tokens += other.total_tokens;
    }
}

/// LLM内容过滤器
///
/// 将Markdown内容按令牌阈值分块后逐块交给LLM，
/// 依据自然语言指令提取目标内容，各块输出按顺序以空行拼接。
/// 任何传输、配额或响应格式错误都原样向上传播，没有重试。
pub struct LLMContentFilter {
    model: String,
    api_token: String,
    api_base_url: String,
    instruction: String,
    chunk_token_threshold: usize,
    client: reqwest::Client,
}

impl LLMContentFilter {
    pub fn new(
        model: String,
        api_token: String,
        api_base_url: String,
        instruction: String,
        chunk_token_threshold: usize,
    ) -> Self {
        Self {
            model,
            api_token,
            api_base_url,
            instruction,
            chunk_token_threshold,
            client: reqwest::Client::new(),
        }
    }

    /// 过滤内容
    ///
    /// # 参数
    /// * `content` - 输入Markdown（通常是整页转换结果）
    ///
    /// # 返回值
    /// * `Result<String, FilterError>` - 过滤后的Markdown
    pub async fn filter_content(&self, content: &str) -> Result<String, FilterError> {
        let chunks = split_by_token_threshold(content, self.chunk_token_threshold);
        let mut outputs: Vec<String> = Vec::with_capacity(chunks.len());
        let mut usage = TokenUsage::default();

        for (index, chunk) in chunks.iter().enumerate() {
            debug!(
                "Filtering chunk {}/{} (~{} tokens)",
                index + 1,
                chunks.len(),
                estimate_tokens(chunk)
            );
            let (piece, chunk_usage) = self.filter_chunk(chunk).await?;
            usage.add(&chunk_usage);
            if !piece.is_empty() {
                outputs.push(piece);
            }
        }

        debug!(
            "LLM filter token usage: prompt={} completion={} total={}",
            usage.prompt_tokens, usage.completion_tokens, usage.total_tokens
        );
        Ok(outputs.join("\n\n"))
    }

    async fn filter_chunk(&self, chunk: &str) -> Result<(String, TokenUsage), FilterError> {
        let request_body = json!({
            "model": self.model,
            "messages": [
                {
                    "role": "system",
                    "content": SYSTEM_PROMPT
                },
                {
                    "role": "user",
                    "content": format!("{}\n\nContent:\n{}", self.instruction, chunk)
                }
            ],
            "temperature": 0.0
        });

        let url = format!("{}/chat/completions", self.api_base_url);
        let response = self
            .client
            .post(url)
            .header("Authorization", format!("Bearer {}", self.api_token))
            .json(&request_body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(FilterError::Api { status, body });
        }

        let body: Value = response.json().await?;

        let usage = if let Some(usage_val) = body.get("usage") {
            TokenUsage {
                prompt_tokens: usage_val["prompt_tokens"].as_u64().unwrap_or(0) as u32,
                completion_tokens: usage_val["completion_tokens"].as_u64().unwrap_or(0) as u32,
                total_tokens: usage_val["total_tokens"].as_u64().unwrap_or(0) as u32,
            }
        } else {
            TokenUsage::default()
        };

        let content = body["choices"][0]["message"]["content"]
            .as_str()
            .ok_or(FilterError::MalformedResponse)?;

        Ok((strip_code_fences(content).to_string(), usage))
    }
}

/// 去除回复两端可能存在的Markdown代码围栏
fn strip_code_fences(content: &str) -> &str {
    content
        .trim()
        .trim_start_matches("```markdown")
        .trim_start_matches("```json")
        .trim_start_matches("```")
        .trim_end_matches("```")
        .trim()
}
