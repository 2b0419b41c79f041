// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use chrono::{DateTime, SecondsFormat, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt::Write;

use crate::domain::models::asset::Asset;
use crate::domain::models::message::{Message, MessageRole};
use crate::domain::models::task::Task;

static URL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"https?://[^\s<>"'()\[\]]+"#).expect("valid url pattern"));

const NOT_SET: &str = "Not set";
const NOT_PROVIDED: &str = "Not provided";

/// 把任务、对话和附件编译为纯文本简报
///
/// 纯函数：输入相同（包括 `generated_at`）时输出逐字节相同。
/// 没有链接或附件时省略对应章节；没有对话时写明 "No messages yet."。
///
/// # 参数
///
/// * `task` - 任务
/// * `messages` - 完整对话，按时间正序
/// * `assets` - 任务附件
/// * `generated_at` - 编译时间，写在最后一行
pub fn compile_brief(
    task: &Task,
    messages: &[Message],
    assets: &[Asset],
    generated_at: DateTime<Utc>,
) -> String {
    let mut out = String::new();

    section(&mut out, "PROJECT BRIEF");
    line(&mut out, "Title", &task.title);
    line(&mut out, "Status", task.status.label());
    line(&mut out, "Task ID", &task.id.to_string());
    let organization = task
        .organization_id
        .map(|id| id.to_string())
        .unwrap_or_else(|| NOT_SET.to_string());
    line(&mut out, "Organization", &organization);
    out.push('\n');

    section(&mut out, "CLIENT INFORMATION");
    line(&mut out, "Name", task.client_name.as_deref().unwrap_or(NOT_PROVIDED));
    line(&mut out, "Email", task.client_email.as_deref().unwrap_or(NOT_PROVIDED));
    out.push('\n');

    section(&mut out, "PROJECT DETAILS");
    line(&mut out, "Product", task.product_name.as_deref().unwrap_or(NOT_SET));
    line(&mut out, "Description", task.description.as_deref().unwrap_or(NOT_PROVIDED));
    let deadline = task
        .deadline
        .map(|d| d.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| NOT_SET.to_string());
    line(&mut out, "Deadline", &deadline);
    line(&mut out, "Estimated price", &format_price(task.estimated_price));
    line(&mut out, "Final price", &format_price(task.final_price));
    out.push('\n');

    let links = extract_links(messages);
    if !links.is_empty() {
        section(&mut out, "REFERENCE LINKS");
        for link in &links {
            let _ = writeln!(out, "- {}", link);
        }
        out.push('\n');
    }

    if !assets.is_empty() {
        section(&mut out, "ASSETS");
        for asset in assets {
            let _ = writeln!(
                out,
                "- {} ({}, {}): {}",
                asset.file_name,
                asset.mime_type,
                format_size(asset.size_bytes),
                asset.url
            );
        }
        out.push('\n');
    }

    section(&mut out, "CONVERSATION TRANSCRIPT");
    if messages.is_empty() {
        out.push_str("No messages yet.\n");
    } else {
        for message in messages {
            let speaker = match message.role {
                MessageRole::User => "Client",
                MessageRole::Assistant => "Assistant",
            };
            let _ = writeln!(
                out,
                "[{}] {}: {}",
                message.created_at.format("%Y-%m-%d %H:%M:%S UTC"),
                speaker,
                message.content
            );
            if !message.image_urls.is_empty() {
                let _ = writeln!(out, "    Attachments: {}", message.image_urls.join(", "));
            }
        }
    }
    out.push('\n');

    let _ = write!(
        out,
        "Generated at: {}",
        generated_at.to_rfc3339_opts(SecondsFormat::Secs, true)
    );
    out
}

/// 对话中出现的链接，按首次出现的顺序去重
pub fn extract_links(messages: &[Message]) -> Vec<String> {
    let mut links: Vec<String> = Vec::new();
    for message in messages {
        for m in URL_RE.find_iter(&message.content) {
            let url = m
                .as_str()
                .trim_end_matches(['.', ',', ';', ':', '!', '?'])
                .to_string();
            if !links.contains(&url) {
                links.push(url);
            }
        }
    }
    links
}

fn section(out: &mut String, title: &str) {
    let _ = writeln!(out, "{}", title);
    let _ = writeln!(out, "{}", "=".repeat(title.len()));
}

fn line(out: &mut String, label: &str, value: &str) {
    let _ = writeln!(out, "{}: {}", label, value);
}

fn format_price(price: Option<f64>) -> String {
    price
        .map(|p| format!("${:.2}", p))
        .unwrap_or_else(|| NOT_SET.to_string())
}

fn format_size(bytes: i64) -> String {
    const KB: i64 = 1024;
    const MB: i64 = KB * 1024;
    if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

#[cfg(test)]
#[path = "brief_compiler_test.rs"]
mod tests;
