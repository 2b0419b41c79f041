// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::domain::models::product::{Product, ProductStatus};
use crate::domain::repositories::product_repository::ProductRepository;
use crate::domain::services::llm_service::{
    strip_code_fences, ChatMessage, CompletionRequest, LlmModel, LlmService,
};
use crate::utils::errors::{ServiceError, ServiceResult};

/// 送入模型的网站文本上限（字符）
pub const MAX_SITE_CHARS: usize = 12_000;

const ANALYSIS_PROMPT: &str = "You analyse a company's website for a creative agency. \
Reply with a JSON object with two keys: \"category\" (a short product category such as \
\"saas\", \"fashion\", \"food & beverage\") and \"guidelines\" (several paragraphs of \
brand guidelines covering audience, tone of voice, visual style and key messages).";

/// 网站抓取特质，返回页面的可读文本
#[async_trait]
pub trait SiteFetcher: Send + Sync {
    async fn fetch_text(&self, url: &str) -> anyhow::Result<String>;
}

#[derive(Debug, Deserialize)]
struct AnalysisResult {
    category: String,
    guidelines: String,
}

/// 产品网站分析用例
///
/// 状态流转 pending → analyzing → completed/failed，
/// 失败时把错误信息写入产品记录
pub struct AnalyzeProductUseCase {
    products: Arc<dyn ProductRepository>,
    fetcher: Arc<dyn SiteFetcher>,
    llm: Arc<dyn LlmService>,
}

impl AnalyzeProductUseCase {
    pub fn new(
        products: Arc<dyn ProductRepository>,
        fetcher: Arc<dyn SiteFetcher>,
        llm: Arc<dyn LlmService>,
    ) -> Self {
        Self {
            products,
            fetcher,
            llm,
        }
    }

    pub async fn execute(&self, product_id: Uuid) -> ServiceResult<Product> {
        let product = self
            .products
            .find_by_id(product_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("product"))?;

        let Some(url) = product.website_url.clone() else {
            let message = "product has no website url".to_string();
            self.products
                .update_status(product.id, ProductStatus::Failed, Some(message.clone()))
                .await?;
            return Err(ServiceError::Validation(message));
        };

        self.products
            .update_status(product.id, ProductStatus::Analyzing, None)
            .await?;

        match self.analyze(&product.name, &url).await {
            Ok(result) => {
                let updated = self
                    .products
                    .complete_analysis(product.id, &result.category, &result.guidelines)
                    .await?;
                info!(product_id = %product.id, category = %result.category, "product analysed");
                Ok(updated)
            }
            Err(e) => {
                let message = format!("{:#}", e);
                warn!(product_id = %product.id, error = %message, "product analysis failed");
                self.products
                    .update_status(product.id, ProductStatus::Failed, Some(message.clone()))
                    .await?;
                Err(ServiceError::Upstream(message))
            }
        }
    }

    async fn analyze(&self, name: &str, url: &str) -> anyhow::Result<AnalysisResult> {
        let text = self.fetcher.fetch_text(url).await?;
        let text = truncate_chars(&text, MAX_SITE_CHARS);
        if text.trim().is_empty() {
            anyhow::bail!("website returned no readable text");
        }

        let request = CompletionRequest::new(
            LlmModel::Summarizer,
            vec![
                ChatMessage::system(ANALYSIS_PROMPT),
                ChatMessage::user(format!(
                    "Product: {}\nWebsite: {}\n\nWebsite text:\n{}",
                    name, url, text
                )),
            ],
        )
        .json();

        let completion = self.llm.complete(request).await?;
        let result: AnalysisResult = serde_json::from_str(strip_code_fences(&completion.content))?;
        if result.category.trim().is_empty() || result.guidelines.trim().is_empty() {
            anyhow::bail!("analysis returned empty fields");
        }
        Ok(AnalysisResult {
            category: result.category.trim().to_lowercase(),
            guidelines: result.guidelines.trim().to_string(),
        })
    }
}

/// 按字符截断，保证不切断 UTF-8 字符
pub fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
