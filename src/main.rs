// Copyright 2025 Kirky.X
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use attendrs::config::credentials::Credentials;
use attendrs::config::settings::Settings;
use attendrs::crawler::{CacheMode, Crawler, CrawlerRunConfig};
use attendrs::engines::browser::BrowserOptions;
use attendrs::filter::llm_filter::LLMContentFilter;
use attendrs::portal::{ErpPortalHooks, PortalConfig};
use attendrs::utils::telemetry;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// 主函数
///
/// 应用程序入口点：登录ERP门户，抓取考勤页面，
/// 保存HTML快照并输出过滤后的Markdown
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Initialize logging
    telemetry::init_telemetry();
    info!("Starting attendrs...");

    // 2. Load configuration and credentials (fails before any network contact)
    let settings = Settings::new()?;
    let credentials = Credentials::from_env()?;
    info!("Configuration loaded");

    // 3. Initialize LLM filter with the extraction instruction
    let llm_filter = LLMContentFilter::new(
        settings.filter.model.clone(),
        credentials.api_key.clone(),
        settings.filter.api_base_url.clone(),
        settings.filter.instruction.clone(),
        settings.filter.chunk_token_threshold,
    );

    // 4. Build the crawler with the portal hook set
    let hooks = ErpPortalHooks::new(
        PortalConfig::from_settings(&settings.portal),
        credentials.clone(),
    );
    let options = BrowserOptions {
        headless: settings.browser.headless,
        request_timeout: Duration::from_secs(settings.browser.request_timeout_secs),
        extra_args: Vec::new(),
    };
    let mut crawler = Crawler::new(options, Arc::new(hooks));

    // 5. Start the browser and run a single crawl, always bypassing the cache
    crawler.start().await?;

    let run_config = CrawlerRunConfig {
        cache_mode: CacheMode::Bypass,
        content_filter: Some(llm_filter),
    };
    let result = crawler.run(&settings.portal.root_url, &run_config).await?;

    // 6. Print the raw HTML and the filtered markdown
    println!("{}", result.html);
    println!("{}", result.fit_markdown);

    crawler.close().await?;

    Ok(())
}
