// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

//! 门户流程集成测试
//!
//! 使用记录型假页面验证登录钩子的操作顺序、超时语义、
//! HTML快照写入和缓存模式，并以wiremock模拟LLM端点做端到端验证。

use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use attendrs::config::credentials::Credentials;
use attendrs::crawler::{CacheMode, Crawler, CrawlerHooks, CrawlerRunConfig};
use attendrs::engines::browser::BrowserOptions;
use attendrs::engines::page::{PageActions, PageError};
use attendrs::filter::llm_filter::LLMContentFilter;
use attendrs::portal::{ErpPortalHooks, PortalConfig};
use attendrs::utils::errors::CrawlError;

use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[derive(Clone, Debug, PartialEq)]
enum Action {
    Goto(String),
    Fill(String, String),
    Click(String),
    ClickByText(String, String),
    WaitFor(String, String),
    Content,
}

/// 记录型假页面：记录每次操作，按脚本决定等待步骤成败
struct ScriptedPage {
    actions: Vec<Action>,
    html: String,
    marker_present: bool,
}

impl ScriptedPage {
    fn new(html: &str, marker_present: bool) -> Self {
        Self {
            actions: Vec::new(),
            html: html.to_string(),
            marker_present,
        }
    }
}

#[async_trait]
impl PageActions for ScriptedPage {
    async fn goto(&mut self, url: &str) -> Result<(), PageError> {
        self.actions.push(Action::Goto(url.to_string()));
        Ok(())
    }

    async fn fill(&mut self, selector: &str, value: &str) -> Result<(), PageError> {
        self.actions
            .push(Action::Fill(selector.to_string(), value.to_string()));
        Ok(())
    }

    async fn click(&mut self, selector: &str) -> Result<(), PageError> {
        self.actions.push(Action::Click(selector.to_string()));
        Ok(())
    }

    async fn click_by_text(&mut self, selector: &str, text: &str) -> Result<(), PageError> {
        self.actions
            .push(Action::ClickByText(selector.to_string(), text.to_string()));
        Ok(())
    }

    async fn wait_for_selector(
        &mut self,
        selector: &str,
        text: &str,
        timeout: Duration,
    ) -> Result<(), PageError> {
        self.actions
            .push(Action::WaitFor(selector.to_string(), text.to_string()));
        if self.marker_present {
            Ok(())
        } else {
            Err(PageError::WaitTimeout {
                selector: selector.to_string(),
                text: text.to_string(),
                timeout,
            })
        }
    }

    async fn content(&mut self) -> Result<String, PageError> {
        self.actions.push(Action::Content);
        Ok(self.html.clone())
    }
}

const CELL_SELECTOR: &str =
    "td.o_data_cell.o_field_cell.o_list_many2one.o_readonly_modifier.o_required_modifier";
const MARKER: &str = "Nguyễn Đức Thái - 3381";

fn portal_config(output_path: PathBuf) -> PortalConfig {
    PortalConfig {
        login_url: "https://erp.vmo.dev/web/login".to_string(),
        email_selector: r#"input[placeholder="Email"]"#.to_string(),
        password_selector: r#"input[placeholder="Password"]"#.to_string(),
        login_button_selector: "button.btn-primary.btn-block".to_string(),
        nav_selector: "li.nav-item".to_string(),
        nav_text: "Chấm công".to_string(),
        attendance_cell_selector: CELL_SELECTOR.to_string(),
        attendance_marker: MARKER.to_string(),
        wait_timeout: Duration::from_secs(10),
        output_path,
    }
}

fn test_credentials() -> Credentials {
    Credentials {
        api_key: "test-token".to_string(),
        username: "thai.nguyen@vmo.dev".to_string(),
        password: "secret".to_string(),
    }
}

const ATTENDANCE_HTML: &str = r#"<html><body>
<table>
<tr><th>Date</th><th>Nhân viên</th><th>Giờ vào</th></tr>
<tr><td class="o_data_cell">01/02/2025</td><td>Nguyễn Đức Thái - 3381</td><td>08:30</td></tr>
</table>
</body></html>"#;

#[test]
fn missing_credentials_fail_before_any_network_contact() {
    std::env::remove_var("openai_api");
    std::env::remove_var("erp_username");
    std::env::remove_var("erp_password");

    let err = Credentials::from_env().expect_err("must fail with nothing set");
    assert!(matches!(err, CrawlError::MissingCredential("openai_api")));

    std::env::set_var("openai_api", "sk-test");
    let err = Credentials::from_env().expect_err("must fail on the next missing variable");
    assert!(matches!(err, CrawlError::MissingCredential("erp_username")));

    // Whitespace-only values count as absent
    std::env::set_var("erp_username", "   ");
    let err = Credentials::from_env().expect_err("blank value must fail");
    assert!(matches!(err, CrawlError::MissingCredential("erp_username")));

    std::env::set_var("erp_username", "user@vmo.dev");
    std::env::set_var("erp_password", "pw");
    let credentials = Credentials::from_env().expect("all three set");
    assert_eq!(credentials.api_key, "sk-test");
    assert_eq!(credentials.username, "user@vmo.dev");
    assert_eq!(credentials.password, "pw");

    std::env::remove_var("openai_api");
    std::env::remove_var("erp_username");
    std::env::remove_var("erp_password");
}

#[tokio::test]
async fn login_hook_performs_page_actions_in_order() {
    let dir = tempfile::tempdir().unwrap();
    let hooks = ErpPortalHooks::new(
        portal_config(dir.path().join("output.html")),
        test_credentials(),
    );

    let mut page = ScriptedPage::new(ATTENDANCE_HTML, true);
    hooks
        .on_page_context_created(&mut page)
        .await
        .expect("login flow should succeed");

    assert_eq!(
        page.actions,
        vec![
            Action::Goto("https://erp.vmo.dev/web/login".to_string()),
            Action::Fill(
                r#"input[placeholder="Email"]"#.to_string(),
                "thai.nguyen@vmo.dev".to_string()
            ),
            Action::Fill(
                r#"input[placeholder="Password"]"#.to_string(),
                "secret".to_string()
            ),
            Action::Click("button.btn-primary.btn-block".to_string()),
            Action::ClickByText("li.nav-item".to_string(), "Chấm công".to_string()),
            Action::WaitFor(CELL_SELECTOR.to_string(), MARKER.to_string()),
        ]
    );
}

#[tokio::test]
async fn wait_timeout_aborts_the_run_and_no_html_is_written() {
    let dir = tempfile::tempdir().unwrap();
    let output_path = dir.path().join("output.html");
    let hooks = ErpPortalHooks::new(portal_config(output_path.clone()), test_credentials());

    let crawler = Crawler::new(BrowserOptions::default(), Arc::new(hooks));
    let mut page = ScriptedPage::new(ATTENDANCE_HTML, false);

    let config = CrawlerRunConfig {
        cache_mode: CacheMode::Bypass,
        content_filter: None,
    };
    let result = crawler
        .run_on_page(&mut page, "https://erp.vmo.dev/", &config)
        .await;

    assert!(matches!(
        result,
        Err(CrawlError::Page(PageError::WaitTimeout { .. }))
    ));
    // The run aborted before the capture step: nothing was fetched or persisted
    assert!(!page.actions.contains(&Action::Content));
    assert!(!output_path.exists());
    assert!(crawler.cache().is_empty());
}

#[tokio::test]
async fn html_snapshot_round_trips_and_is_overwritten() {
    let dir = tempfile::tempdir().unwrap();
    let output_path = dir.path().join("output.html");
    let hooks = ErpPortalHooks::new(portal_config(output_path.clone()), test_credentials());

    let html = "<html><body>Chấm công — Nguyễn Đức Thái - 3381</body></html>";
    let mut page = ScriptedPage::new(html, true);
    hooks
        .before_return_html(&mut page, html)
        .await
        .expect("snapshot write should succeed");

    let written = std::fs::read_to_string(&output_path).unwrap();
    assert_eq!(written, html);

    // A second run overwrites the previous snapshot in full
    let replacement = "<html><body>second run</body></html>";
    hooks
        .before_return_html(&mut page, replacement)
        .await
        .expect("overwrite should succeed");

    let written = std::fs::read_to_string(&output_path).unwrap();
    assert_eq!(written, replacement);
}

#[tokio::test]
async fn bypass_mode_skips_cache_writes_and_enabled_mode_populates_it() {
    let dir = tempfile::tempdir().unwrap();
    let hooks = ErpPortalHooks::new(
        portal_config(dir.path().join("output.html")),
        test_credentials(),
    );
    let crawler = Crawler::new(BrowserOptions::default(), Arc::new(hooks));

    let bypass = CrawlerRunConfig {
        cache_mode: CacheMode::Bypass,
        content_filter: None,
    };
    let mut page = ScriptedPage::new(ATTENDANCE_HTML, true);
    let result = crawler
        .run_on_page(&mut page, "https://erp.vmo.dev/", &bypass)
        .await
        .expect("bypass run should succeed");

    assert!(!result.from_cache);
    assert!(crawler.cache().is_empty());
    assert_eq!(crawler.cache().stats().stores, 0);

    let enabled = CrawlerRunConfig {
        cache_mode: CacheMode::Enabled,
        content_filter: None,
    };
    let mut page = ScriptedPage::new(ATTENDANCE_HTML, true);
    crawler
        .run_on_page(&mut page, "https://erp.vmo.dev/", &enabled)
        .await
        .expect("enabled run should succeed");

    assert_eq!(crawler.cache().len(), 1);
    assert_eq!(crawler.cache().stats().stores, 1);
}

#[tokio::test]
async fn end_to_end_run_with_mock_llm_produces_snapshot_and_filtered_markdown() {
    let mock_server = MockServer::start().await;
    let filtered = "| Date | Nhân viên | Giờ vào |\n| --- | --- | --- |\n| 01/02/2025 | Nguyễn Đức Thái - 3381 | 08:30 |";

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("Authorization", "Bearer test-token"))
        .and(body_partial_json(serde_json::json!({"model": "gpt-4o-mini"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "choices": [{"message": {"content": format!("```markdown\n{}\n```", filtered)}}],
            "usage": {"prompt_tokens": 120, "completion_tokens": 40, "total_tokens": 160}
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let output_path = dir.path().join("output.html");
    let hooks = ErpPortalHooks::new(portal_config(output_path.clone()), test_credentials());
    let crawler = Crawler::new(BrowserOptions::default(), Arc::new(hooks));

    let llm_filter = LLMContentFilter::new(
        "gpt-4o-mini".to_string(),
        "test-token".to_string(),
        format!("{}/v1", mock_server.uri()),
        "Extract table with columns 'Date', 'Nhân viên', 'Khối', 'Giờ vào', ... and so on"
            .to_string(),
        4096,
    );

    let config = CrawlerRunConfig {
        cache_mode: CacheMode::Bypass,
        content_filter: Some(llm_filter),
    };
    let mut page = ScriptedPage::new(ATTENDANCE_HTML, true);
    let result = crawler
        .run_on_page(&mut page, "https://erp.vmo.dev/", &config)
        .await
        .expect("end-to-end run should succeed");

    assert_eq!(result.html, ATTENDANCE_HTML);
    assert!(result.markdown.contains("| Date | Nhân viên | Giờ vào |"));
    assert_eq!(result.fit_markdown, filtered);
    assert!(!result.from_cache);

    let snapshot = std::fs::read_to_string(&output_path).unwrap();
    assert_eq!(snapshot, ATTENDANCE_HTML);
}

#[tokio::test]
async fn llm_api_error_propagates_as_filter_failure() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(429).set_body_string("quota exceeded"))
        .mount(&mock_server)
        .await;

    let llm_filter = LLMContentFilter::new(
        "gpt-4o-mini".to_string(),
        "test-token".to_string(),
        format!("{}/v1", mock_server.uri()),
        "Extract the table".to_string(),
        4096,
    );

    let err = llm_filter
        .filter_content("| some | table |")
        .await
        .expect_err("quota error must propagate");
    let message = err.to_string();
    assert!(message.contains("429"));
    assert!(message.contains("quota exceeded"));
}
