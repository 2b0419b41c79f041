// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use anyhow::{Context, Result};
use async_trait::async_trait;
use metrics::counter;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::debug;

use crate::config::settings::LlmSettings;
use crate::domain::services::llm_service::{
    ChatMessage, Completion, CompletionRequest, LlmModel, LlmService, TokenUsage,
};

/// OpenAI 兼容的 `chat/completions` 客户端
///
/// # 配置
///
/// 三种用途分别使用 `text_model`、`vision_model` 和 `summarizer_model`，
/// 未配置 API 密钥时每次调用都会失败
pub struct OpenAiLlmService {
    client: reqwest::Client,
    api_key: Option<String>,
    api_base_url: String,
    text_model: String,
    vision_model: String,
    summarizer_model: String,
}

impl OpenAiLlmService {
    pub fn new(settings: &LlmSettings) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .context("Failed to build LLM HTTP client")?;

        Ok(Self {
            client,
            api_key: settings.api_key.clone(),
            api_base_url: settings.api_base_url.trim_end_matches('/').to_string(),
            text_model: settings.text_model.clone(),
            vision_model: settings.vision_model.clone(),
            summarizer_model: settings.summarizer_model.clone(),
        })
    }

    fn model_name(&self, model: LlmModel) -> &str {
        match model {
            LlmModel::Text => &self.text_model,
            LlmModel::Vision => &self.vision_model,
            LlmModel::Summarizer => &self.summarizer_model,
        }
    }
}

/// 带图片的消息使用多段内容格式
fn message_json(message: &ChatMessage) -> Value {
    if message.image_urls.is_empty() {
        return json!({ "role": message.role.as_str(), "content": message.content });
    }

    let mut parts = vec![json!({ "type": "text", "text": message.content })];
    parts.extend(
        message
            .image_urls
            .iter()
            .map(|url| json!({ "type": "image_url", "image_url": { "url": url } })),
    );
    json!({ "role": message.role.as_str(), "content": parts })
}

fn parse_usage(body: &Value) -> TokenUsage {
    match body.get("usage") {
        Some(usage) => TokenUsage {
            prompt_tokens: usage["prompt_tokens"].as_u64().unwrap_or(0) as u32,
            completion_tokens: usage["completion_tokens"].as_u64().unwrap_or(0) as u32,
            total_tokens: usage["total_tokens"].as_u64().unwrap_or(0) as u32,
        },
        None => TokenUsage::default(),
    }
}

#[async_trait]
impl LlmService for OpenAiLlmService {
    async fn complete(&self, request: CompletionRequest) -> Result<Completion> {
        let api_key = self
            .api_key
            .as_ref()
            .ok_or_else(|| anyhow::anyhow!("LLM API key not configured"))?;

        let model = self.model_name(request.model);
        let mut body = json!({
            "model": model,
            "messages": request.messages.iter().map(message_json).collect::<Vec<_>>(),
            "temperature": request.temperature,
        });
        if request.json_response {
            body["response_format"] = json!({ "type": "json_object" });
        }

        counter!("llm_requests_total", "model" => model.to_string()).increment(1);

        let url = format!("{}/chat/completions", self.api_base_url);
        let response = self
            .client
            .post(url)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await
            .context("Failed to send request to LLM API")?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(anyhow::anyhow!(
                "LLM API returned error: {} - {}",
                status,
                error_text
            ));
        }

        let body: Value = response
            .json()
            .await
            .context("Failed to parse LLM API response")?;

        let usage = parse_usage(&body);
        let content = body["choices"][0]["message"]["content"]
            .as_str()
            .ok_or_else(|| anyhow::anyhow!("Invalid response format from LLM API"))?;

        debug!(model, tokens = usage.total_tokens, "completion received");
        Ok(Completion {
            content: content.to_string(),
            usage,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::settings::Settings;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn settings_for(server: &MockServer, api_key: Option<&str>) -> LlmSettings {
        let mut settings = Settings::defaults().unwrap().llm;
        settings.api_base_url = format!("{}/v1", server.uri());
        settings.api_key = api_key.map(str::to_string);
        settings
    }

    #[tokio::test]
    async fn test_complete_sends_model_and_json_mode() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(header("authorization", "Bearer sk-test"))
            .and(body_partial_json(json!({
                "model": "gpt-4o-mini",
                "response_format": { "type": "json_object" }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{ "message": { "content": "{\"clientName\":\"Ada\"}" } }],
                "usage": { "prompt_tokens": 12, "completion_tokens": 5, "total_tokens": 17 }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let llm = OpenAiLlmService::new(&settings_for(&server, Some("sk-test"))).unwrap();
        let completion = llm
            .complete(
                CompletionRequest::new(LlmModel::Text, vec![ChatMessage::user("hi")]).json(),
            )
            .await
            .unwrap();

        assert_eq!(completion.content, "{\"clientName\":\"Ada\"}");
        assert_eq!(completion.usage.total_tokens, 17);
    }

    #[tokio::test]
    async fn test_vision_messages_use_content_parts() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(body_partial_json(json!({ "model": "gpt-4o" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{ "message": { "content": "Nice colours" } }]
            })))
            .mount(&server)
            .await;

        let llm = OpenAiLlmService::new(&settings_for(&server, Some("sk-test"))).unwrap();
        let message =
            ChatMessage::user("look").with_images(vec!["https://img.example.com/a.png".into()]);
        let encoded = message_json(&message);
        assert_eq!(encoded["content"][1]["image_url"]["url"], "https://img.example.com/a.png");

        let completion = llm
            .complete(CompletionRequest::new(LlmModel::Vision, vec![message]))
            .await
            .unwrap();
        assert_eq!(completion.content, "Nice colours");
    }

    #[tokio::test]
    async fn test_error_status_is_reported() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
            .mount(&server)
            .await;

        let llm = OpenAiLlmService::new(&settings_for(&server, Some("sk-test"))).unwrap();
        let err = llm
            .complete(CompletionRequest::new(LlmModel::Text, vec![ChatMessage::user("hi")]))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("503"));
    }

    #[tokio::test]
    async fn test_missing_api_key_fails_without_request() {
        let server = MockServer::start().await;
        let llm = OpenAiLlmService::new(&settings_for(&server, None)).unwrap();
        let err = llm
            .complete(CompletionRequest::new(LlmModel::Text, vec![ChatMessage::user("hi")]))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("not configured"));
    }
}
