// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// 令牌用量
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// 模型用途，具体模型名称由配置决定
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LlmModel {
    /// 对话与字段提取
    Text,
    /// 图片理解
    Vision,
    /// 网站内容总结
    Summarizer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

impl ChatRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChatRole::System => "system",
            ChatRole::User => "user",
            ChatRole::Assistant => "assistant",
        }
    }
}

/// 发送给模型的一条消息
#[derive(Debug, Clone)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
    /// 仅图片理解模型使用
    pub image_urls: Vec<String>,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self::new(ChatRole::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(ChatRole::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(ChatRole::Assistant, content)
    }

    pub fn with_images(mut self, image_urls: Vec<String>) -> Self {
        self.image_urls = image_urls;
        self
    }

    fn new(role: ChatRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            image_urls: Vec::new(),
        }
    }
}

/// 一次补全请求
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub model: LlmModel,
    pub messages: Vec<ChatMessage>,
    /// 要求模型只输出 JSON 对象
    pub json_response: bool,
    pub temperature: f32,
}

impl CompletionRequest {
    pub fn new(model: LlmModel, messages: Vec<ChatMessage>) -> Self {
        Self {
            model,
            messages,
            json_response: false,
            temperature: 0.7,
        }
    }

    pub fn json(mut self) -> Self {
        self.json_response = true;
        self.temperature = 0.0;
        self
    }
}

/// 补全结果
#[derive(Debug, Clone)]
pub struct Completion {
    pub content: String,
    pub usage: TokenUsage,
}

/// 生成式模型特质
///
/// 对话代理、简报任务和产品分析通过它访问模型，
/// 基础设施层提供 OpenAI 兼容接口的实现，测试中使用桩实现。
#[async_trait]
pub trait LlmService: Send + Sync {
    async fn complete(&self, request: CompletionRequest) -> Result<Completion>;
}

/// 去掉模型输出外层的 Markdown 代码块
pub fn strip_code_fences(content: &str) -> &str {
    content
        .trim()
        .trim_start_matches("```json")
        .trim_start_matches("```")
        .trim_end_matches("```")
        .trim()
}
