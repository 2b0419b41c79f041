// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use metrics::counter;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, warn};
use validator::ValidateEmail;

use super::deadline::normalize_deadline;
use super::llm_service::{
    strip_code_fences, ChatMessage, CompletionRequest, LlmModel, LlmService,
};
use super::pricing::{
    apply_pricing_rules, estimate_price, explicit_price, has_price_intent, parse_amount,
    PriceEstimate,
};
use crate::domain::models::catalog::PricingRule;
use crate::domain::models::message::{Message, MessageRole};
use crate::domain::models::task::{Task, TaskFieldUpdate};

/// 送入模型的最近对话条数
pub const HISTORY_LIMIT: u64 = 10;

const ASSISTANT_PROMPT: &str = "You are a friendly project coordinator for a creative agency. \
Help the client describe their project so the agency can start work. \
Ask for one missing detail at a time: their name, contact email, the product, \
what they need, the deadline and their budget. Keep answers short and conversational. \
Do not use markdown formatting.";

const EXTRACTION_PROMPT: &str = "You extract project brief fields from a client's message. \
Return ONLY a JSON object with these optional keys: clientName, clientEmail, productName, \
productDescription, deadline, estimatedPrice. Include a key only when the latest message \
states it explicitly. deadline must be the client's own wording or an ISO date. \
estimatedPrice must be a number without currency symbols.";

const VISION_PROMPT: &str = "You are a project coordinator for a creative agency. \
The client shared reference images. Describe what you see that matters for the project \
and ask one follow-up question. Do not use markdown formatting.";

static LINK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[([^\]]+)\]\(([^)\s]+)\)").expect("valid link pattern"));
static HEADING_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^[ \t]*#{1,6}[ \t]*").expect("valid heading pattern"));
static BULLET_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^([ \t]*)[*+][ \t]+").expect("valid bullet pattern"));
static QUOTE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^[ \t]*>[ \t]?").expect("valid quote pattern"));
static BLANK_LINES_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\n[ \t]*\n(?:[ \t]*\n)+").expect("valid blank line pattern"));

/// 模型返回的字段，全部可选
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExtractedFields {
    pub client_name: Option<String>,
    pub client_email: Option<String>,
    pub product_name: Option<String>,
    pub product_description: Option<String>,
    pub deadline: Option<String>,
    /// 数字或带货币符号的字符串
    pub estimated_price: Option<Value>,
}

impl ExtractedFields {
    fn price(&self) -> Option<f64> {
        match self.estimated_price.as_ref()? {
            Value::Number(n) => n.as_f64().filter(|v| v.is_finite() && *v > 0.0),
            Value::String(s) => parse_amount(s),
            _ => None,
        }
    }
}

/// 一轮对话所需的上下文
pub struct ConversationContext<'a> {
    pub task: &'a Task,
    /// 本轮用户消息之前的最近对话，按时间正序
    pub history: &'a [Message],
    pub asset_names: &'a [String],
    /// 组织内的价格规则
    pub pricing_rules: &'a [PricingRule],
    /// 调用方的本地日期，用于解析相对截止时间
    pub today: NaiveDate,
}

/// 一轮对话的结果
#[derive(Debug, Clone)]
pub struct AgentTurn {
    /// 已去除标记符号的回复
    pub reply: String,
    /// 本轮新发现的字段，不会覆盖任务上已有的值
    pub update: TaskFieldUpdate,
    /// 根据描述推断出的报价
    pub price_estimate: Option<PriceEstimate>,
}

/// 对话式需求提取代理
///
/// 每轮并发执行两次模型调用：一次生成回复，一次提取字段。
/// 回复失败时整轮失败；提取失败只记录日志，本轮不更新字段。
pub struct ExtractionAgent {
    llm: Arc<dyn LlmService>,
}

impl ExtractionAgent {
    pub fn new(llm: Arc<dyn LlmService>) -> Self {
        Self { llm }
    }

    /// 处理一条用户消息
    ///
    /// # 参数
    ///
    /// * `message` - 用户消息文本
    /// * `image_urls` - 附带的图片，非空时改用图片理解模型且不提取字段
    /// * `ctx` - 任务和对话上下文
    pub async fn respond(
        &self,
        message: &str,
        image_urls: &[String],
        ctx: &ConversationContext<'_>,
    ) -> Result<AgentTurn> {
        if !image_urls.is_empty() {
            let reply = self.describe_images(message, image_urls, ctx).await?;
            return Ok(AgentTurn {
                reply,
                update: TaskFieldUpdate::default(),
                price_estimate: None,
            });
        }

        let (reply, extraction) = tokio::join!(
            self.generate_reply(message, ctx),
            self.extract_fields(message, ctx)
        );
        let reply = reply?;

        let (update, price_estimate) = match extraction {
            Ok(fields) => merge_new_fields(ctx, &fields, message),
            Err(e) => {
                warn!(task_id = %ctx.task.id, error = %e, "field extraction failed");
                counter!("extraction_failures_total").increment(1);
                (TaskFieldUpdate::default(), None)
            }
        };

        debug!(
            task_id = %ctx.task.id,
            fields = ?update.field_names(),
            "conversation turn processed"
        );

        Ok(AgentTurn {
            reply,
            update,
            price_estimate,
        })
    }

    async fn generate_reply(&self, message: &str, ctx: &ConversationContext<'_>) -> Result<String> {
        let mut messages = vec![ChatMessage::system(format!(
            "{}\n\n{}",
            ASSISTANT_PROMPT,
            describe_known_fields(ctx)
        ))];
        messages.extend(ctx.history.iter().map(|m| match m.role {
            MessageRole::User => ChatMessage::user(m.content.clone()),
            MessageRole::Assistant => ChatMessage::assistant(m.content.clone()),
        }));
        messages.push(ChatMessage::user(message));

        let completion = self
            .llm
            .complete(CompletionRequest::new(LlmModel::Text, messages))
            .await
            .context("reply generation failed")?;
        Ok(strip_markup(&completion.content))
    }

    async fn extract_fields(
        &self,
        message: &str,
        ctx: &ConversationContext<'_>,
    ) -> Result<ExtractedFields> {
        let known = json!({
            "clientName": ctx.task.client_name,
            "clientEmail": ctx.task.client_email,
            "productName": ctx.task.product_name,
            "productDescription": ctx.task.description,
        });
        let prompt = format!("Known fields: {}\n\nLatest message: {}", known, message);
        let request = CompletionRequest::new(
            LlmModel::Text,
            vec![
                ChatMessage::system(EXTRACTION_PROMPT),
                ChatMessage::user(prompt),
            ],
        )
        .json();

        let completion = self.llm.complete(request).await?;
        serde_json::from_str(strip_code_fences(&completion.content))
            .context("extraction output is not a JSON object")
    }

    async fn describe_images(
        &self,
        message: &str,
        image_urls: &[String],
        ctx: &ConversationContext<'_>,
    ) -> Result<String> {
        let text = if message.trim().is_empty() {
            "Here are some reference images.".to_string()
        } else {
            message.to_string()
        };
        let messages = vec![
            ChatMessage::system(format!("{}\n\n{}", VISION_PROMPT, describe_known_fields(ctx))),
            ChatMessage::user(text).with_images(image_urls.to_vec()),
        ];
        let completion = self
            .llm
            .complete(CompletionRequest::new(LlmModel::Vision, messages))
            .await
            .context("image description failed")?;
        Ok(strip_markup(&completion.content))
    }
}

/// 合并模型提取结果，只保留任务上仍为空的字段
///
/// 报价优先使用明确给出的金额；否则仅在用户询价时按描述推断，
/// 再由组织内同类别的价格规则约束。
pub fn merge_new_fields(
    ctx: &ConversationContext<'_>,
    fields: &ExtractedFields,
    message: &str,
) -> (TaskFieldUpdate, Option<PriceEstimate>) {
    let task = ctx.task;
    let mut update = TaskFieldUpdate::default();

    if task.client_name.is_none() {
        update.client_name = non_empty(&fields.client_name);
    }
    if task.client_email.is_none() {
        update.client_email = non_empty(&fields.client_email)
            .map(|e| e.to_lowercase())
            .filter(|e| e.as_str().validate_email());
    }
    if task.product_name.is_none() {
        update.product_name = non_empty(&fields.product_name);
    }
    if task.description.is_none() {
        update.description = non_empty(&fields.product_description);
    }
    if task.deadline.is_none() {
        update.deadline = fields
            .deadline
            .as_deref()
            .and_then(|d| normalize_deadline(d, ctx.today));
    }

    let mut price_estimate = None;
    if task.estimated_price.is_none() {
        if let Some(price) = fields.price().or_else(|| explicit_price(message)) {
            update.estimated_price = Some(price);
        } else if has_price_intent(message) {
            let basis = update
                .description
                .as_deref()
                .or(task.description.as_deref())
                .unwrap_or(message);
            let estimate = apply_pricing_rules(estimate_price(basis), ctx.pricing_rules);
            update.estimated_price = Some(estimate.amount);
            price_estimate = Some(estimate);
        }
    }

    (update, price_estimate)
}

/// 去除回复中的 Markdown 标记
///
/// 去掉星号、井号、反引号、删除线和双下划线，
/// 单个下划线保留（常见于邮箱和文件名），多余空行合并。
pub fn strip_markup(text: &str) -> String {
    let text = text.replace("\r\n", "\n");
    let text = LINK_RE.replace_all(&text, "$1 ($2)");
    let text = HEADING_RE.replace_all(&text, "");
    let text = QUOTE_RE.replace_all(&text, "");
    let text = BULLET_RE.replace_all(&text, "$1- ");
    let text = text
        .replace("```", "")
        .replace('`', "")
        .replace("~~", "")
        .replace("__", "")
        .replace('*', "")
        .replace('#', "");
    let text = BLANK_LINES_RE.replace_all(&text, "\n\n");
    text.trim().to_string()
}

fn describe_known_fields(ctx: &ConversationContext<'_>) -> String {
    let task = ctx.task;
    let show = |v: &Option<String>| v.clone().unwrap_or_else(|| "unknown".to_string());
    let mut summary = format!(
        "Project: {}\nClient name: {}\nClient email: {}\nProduct: {}\nDescription: {}\nDeadline: {}\nBudget: {}",
        task.title,
        show(&task.client_name),
        show(&task.client_email),
        show(&task.product_name),
        show(&task.description),
        task.deadline
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| "unknown".to_string()),
        task.estimated_price
            .map(|p| format!("${:.2}", p))
            .unwrap_or_else(|| "unknown".to_string()),
    );
    if !ctx.asset_names.is_empty() {
        summary.push_str("\nUploaded files: ");
        summary.push_str(&ctx.asset_names.join(", "));
    }
    summary
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
#[path = "extraction_service_test.rs"]
mod tests;
