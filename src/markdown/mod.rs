// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};

// Non-content subtrees are dropped wholesale.
const SKIPPED_TAGS: &[&str] = &["script", "style", "head", "noscript", "template", "svg"];

static ROW_SELECTOR: Lazy<Selector> = Lazy::new(|| Selector::parse("tr").unwrap());
static CELL_SELECTOR: Lazy<Selector> = Lazy::new(|| Selector::parse("th, td").unwrap());

/// Markdown生成器
///
/// 将渲染后的完整HTML转换为Markdown：标题、段落、列表、链接
/// 和管道语法表格。表格是考勤页面的有效载荷，必须以表格形式保留。
/// 生成结果既是爬取结果的`markdown`字段，也是LLM过滤器的输入。
pub struct MarkdownGenerator {
    whitespace_regex: Regex,
    blank_lines_regex: Regex,
}

impl Default for MarkdownGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl MarkdownGenerator {
    pub fn new() -> Self {
        Self {
            whitespace_regex: Regex::new(r"\s+").unwrap(),
            blank_lines_regex: Regex::new(r"\n{3,}").unwrap(),
        }
    }

    /// 生成Markdown
    pub fn generate(&self, html: &str) -> String {
        let document = Html::parse_document(html);
        let mut out = String::new();
        self.walk(document.root_element(), &mut out);

        let normalized = self.blank_lines_regex.replace_all(&out, "\n\n");
        normalized.trim().to_string()
    }

    /// 遍历块级元素
    fn walk(&self, element: ElementRef<'_>, out: &mut String) {
        let tag = element.value().name();
        if SKIPPED_TAGS.contains(&tag) {
            return;
        }

        match tag {
            "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
                let level = tag[1..].parse::<usize>().unwrap_or(1);
                let text = self.inline_text(element);
                if !text.is_empty() {
                    out.push('\n');
                    out.push_str(&"#".repeat(level));
                    out.push(' ');
                    out.push_str(&text);
                    out.push('\n');
                }
            }
            "p" | "blockquote" | "pre" => {
                let text = self.inline_text(element);
                if !text.is_empty() {
                    out.push('\n');
                    out.push_str(&text);
                    out.push('\n');
                }
            }
            "li" => {
                let text = self.inline_text(element);
                if !text.is_empty() {
                    out.push_str("- ");
                    out.push_str(&text);
                    out.push('\n');
                }
            }
            "a" => {
                let text = self.inline_text(element);
                let href = element.value().attr("href").unwrap_or("");
                if !text.is_empty() {
                    out.push('\n');
                    out.push_str(&format!("[{}]({})", text, href));
                    out.push('\n');
                }
            }
            "table" => self.render_table(element, out),
            "br" | "hr" => out.push('\n'),
            _ => {
                // Container element: recurse, emitting bare text as its own paragraph
                for node in element.children() {
                    if let Some(child) = ElementRef::wrap(node) {
                        self.walk(child, out);
                    } else if let Some(text) = node.value().as_text() {
                        let trimmed = self
                            .whitespace_regex
                            .replace_all(text.trim(), " ")
                            .to_string();
                        if !trimmed.is_empty() {
                            out.push('\n');
                            out.push_str(&trimmed);
                            out.push('\n');
                        }
                    }
                }
            }
        }
    }

    /// 渲染管道语法表格，首行之后插入分隔行
    fn render_table(&self, table: ElementRef<'_>, out: &mut String) {
        let mut rows: Vec<Vec<String>> = Vec::new();
        for row in table.select(&ROW_SELECTOR) {
            let cells: Vec<String> = row
                .select(&CELL_SELECTOR)
                .map(|cell| self.inline_text(cell).replace('|', "\\|"))
                .collect();
            if !cells.is_empty() {
                rows.push(cells);
            }
        }

        if rows.is_empty() {
            return;
        }

        out.push('\n');
        for (index, cells) in rows.iter().enumerate() {
            out.push_str("| ");
            out.push_str(&cells.join(" | "));
            out.push_str(" |\n");
            if index == 0 {
                out.push('|');
                out.push_str(&" --- |".repeat(cells.len()));
                out.push('\n');
            }
        }
    }

    /// 展平元素的行内文本，链接转换为Markdown形式
    fn inline_text(&self, element: ElementRef<'_>) -> String {
        let mut buf = String::new();
        self.collect_inline(element, &mut buf);
        self.whitespace_regex
            .replace_all(buf.trim(), " ")
            .to_string()
    }

    fn collect_inline(&self, element: ElementRef<'_>, buf: &mut String) {
        for node in element.children() {
            if let Some(text) = node.value().as_text() {
                buf.push_str(text);
            } else if let Some(child) = ElementRef::wrap(node) {
                let tag = child.value().name();
                if SKIPPED_TAGS.contains(&tag) {
                    continue;
                }
                match tag {
                    "a" => {
                        let mut inner = String::new();
                        self.collect_inline(child, &mut inner);
                        let href = child.value().attr("href").unwrap_or("");
                        buf.push_str(&format!("[{}]({})", inner.trim(), href));
                    }
                    "br" => buf.push(' '),
                    _ => self.collect_inline(child, buf),
                }
            }
        }
    }
}
