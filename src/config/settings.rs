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

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

/// 应用程序配置设置
///
/// 包含门户、浏览器和内容过滤器的所有配置项。
/// 选择器和标记文本默认绑定到具体门户页面和具体用户，
/// 可通过配置文件或环境变量按用户/选择器参数化。
#[derive(Debug, Deserialize)]
pub struct Settings {
    /// 门户配置
    pub portal: PortalSettings,
    /// 浏览器配置
    pub browser: BrowserSettings,
    /// 内容过滤器配置
    pub filter: FilterSettings,
}

/// 门户配置设置
#[derive(Debug, Deserialize)]
pub struct PortalSettings {
    /// ERP根URL（爬取目标）
    pub root_url: String,
    /// 登录页URL
    pub login_url: String,
    /// 邮箱输入框选择器
    pub email_selector: String,
    /// 密码输入框选择器
    pub password_selector: String,
    /// 登录按钮选择器
    pub login_button_selector: String,
    /// 考勤导航项选择器
    pub nav_selector: String,
    /// 考勤导航项文本
    pub nav_text: String,
    /// 考勤表格单元格选择器
    pub attendance_cell_selector: String,
    /// 考勤单元格标记文本（员工标识）
    pub attendance_marker: String,
    /// 等待考勤单元格出现的超时时间（秒）
    pub wait_timeout_secs: u64,
    /// HTML快照输出路径
    pub output_path: String,
}

/// 浏览器配置设置
#[derive(Debug, Deserialize)]
pub struct BrowserSettings {
    /// 是否无头运行
    pub headless: bool,
    /// CDP请求超时时间（秒）
    pub request_timeout_secs: u64,
}

/// 内容过滤器配置设置
#[derive(Debug, Deserialize)]
pub struct FilterSettings {
    /// LLM模型名称
    pub model: String,
    /// LLM API基础URL
    pub api_base_url: String,
    /// 提取指令
    pub instruction: String,
    /// 每次过滤调用的令牌分块阈值
    pub chunk_token_threshold: usize,
}

impl Settings {
    /// 创建新的配置实例
    ///
    /// 从环境变量加载配置，支持默认值
    ///
    /// # Returns
    ///
    /// * `Ok(Settings)` - 成功加载的配置
    /// * `Err(ConfigError)` - 配置加载失败
    pub fn new() -> Result<Self, ConfigError> {
        let env = std::env::var("APP_ENVIRONMENT").unwrap_or_else(|_| "default".to_string());
        let builder = Config::builder()
            // Default portal settings (the concrete ERP instance and its markup)
            .set_default("portal.root_url", "https://erp.vmo.dev/")?
            .set_default("portal.login_url", "https://erp.vmo.dev/web/login")?
            .set_default("portal.email_selector", r#"input[placeholder="Email"]"#)?
            .set_default("portal.password_selector", r#"input[placeholder="Password"]"#)?
            .set_default("portal.login_button_selector", "button.btn-primary.btn-block")?
            .set_default("portal.nav_selector", "li.nav-item")?
            .set_default("portal.nav_text", "Chấm công")?
            .set_default(
                "portal.attendance_cell_selector",
                "td.o_data_cell.o_field_cell.o_list_many2one.o_readonly_modifier.o_required_modifier",
            )?
            .set_default("portal.attendance_marker", "Nguyễn Đức Thái - 3381")?
            .set_default("portal.wait_timeout_secs", 10)?
            .set_default("portal.output_path", "output.html")?
            // Default browser settings (visible window)
            .set_default("browser.headless", false)?
            .set_default("browser.request_timeout_secs", 30)?
            // Default content filter settings
            .set_default("filter.model", "gpt-4o-mini")?
            .set_default(
                "filter.api_base_url",
                "https://api.openai.com/v1",
            )?
            .set_default(
                "filter.instruction",
                "Extract table with columns 'Date', 'Nhân viên', 'Khối', 'Giờ vào', ... and so on",
            )?
            .set_default("filter.chunk_token_threshold", 4096)?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            .add_source(Environment::with_prefix("ATTENDRS").separator("__"));

        builder.build()?.try_deserialize()
    }
}
