// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use anyhow::{Context, Result};
use async_trait::async_trait;
use once_cell::sync::Lazy;
use scraper::{Html, Selector};
use std::time::Duration;

use crate::application::use_cases::analyze_product::SiteFetcher;

static TEXT_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("title, meta[name=description], h1, h2, h3, p, li")
        .unwrap_or_else(|_| Selector::parse("body").unwrap_or_else(|_| unreachable!()))
});

/// 基于 reqwest 和 scraper 的网站抓取
///
/// 只取标题、描述和正文段落，脚本与样式被忽略
pub struct HttpSiteFetcher {
    client: reqwest::Client,
}

impl HttpSiteFetcher {
    pub fn new(timeout_secs: u64) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .user_agent(concat!("briefdesk/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to build site fetcher client")?;
        Ok(Self { client })
    }
}

/// 从 HTML 中提取可读文本，每个块一行
pub fn extract_readable_text(html: &str) -> String {
    let document = Html::parse_document(html);
    let mut lines: Vec<String> = Vec::new();

    for element in document.select(&TEXT_SELECTOR) {
        let text = if element.value().name() == "meta" {
            element.value().attr("content").unwrap_or_default().to_string()
        } else {
            element.text().collect::<Vec<_>>().join(" ")
        };
        let normalized = text.split_whitespace().collect::<Vec<_>>().join(" ");
        if !normalized.is_empty() && lines.last() != Some(&normalized) {
            lines.push(normalized);
        }
    }

    lines.join("\n")
}

#[async_trait]
impl SiteFetcher for HttpSiteFetcher {
    async fn fetch_text(&self, url: &str) -> Result<String> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .with_context(|| format!("Failed to fetch {}", url))?;

        if !response.status().is_success() {
            anyhow::bail!("website returned {}", response.status());
        }

        let html = response.text().await.context("Failed to read website body")?;
        Ok(extract_readable_text(&html))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const PAGE: &str = r#"<html><head><title>Acme Coffee</title>
        <meta name="description" content="Small batch roasters">
        <style>body { color: red }</style></head>
        <body><script>var x = 1;</script>
        <h1>Fresh   beans</h1><p>Roasted weekly in Portland.</p>
        <ul><li>Espresso</li><li>Filter</li></ul></body></html>"#;

    #[test]
    fn test_extract_readable_text_skips_scripts() {
        let text = extract_readable_text(PAGE);
        assert_eq!(
            text,
            "Acme Coffee\nSmall batch roasters\nFresh beans\nRoasted weekly in Portland.\nEspresso\nFilter"
        );
    }

    #[tokio::test]
    async fn test_fetch_text() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(ResponseTemplate::new(200).set_body_string(PAGE))
            .mount(&server)
            .await;

        let fetcher = HttpSiteFetcher::new(5).unwrap();
        let text = fetcher.fetch_text(&format!("{}/", server.uri())).await.unwrap();
        assert!(text.contains("Roasted weekly"));
    }

    #[tokio::test]
    async fn test_fetch_text_rejects_error_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let fetcher = HttpSiteFetcher::new(5).unwrap();
        assert!(fetcher.fetch_text(&server.uri()).await.is_err());
    }
}
