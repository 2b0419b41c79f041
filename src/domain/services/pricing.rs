// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use crate::domain::models::catalog::PricingRule;

/// 表示客户在询价的关键词
const PRICE_INTENT_KEYWORDS: &[&str] = &[
    "price", "prices", "pricing", "cost", "costs", "how much", "quote", "budget", "estimate",
];

const VIDEO_KEYWORDS: &[&str] = &[
    "video", "videos", "film", "animation", "animated", "motion", "commercial", "footage", "reel",
];
const WEB_KEYWORDS: &[&str] = &[
    "website", "websites", "web", "landing page", "webpage", "web app", "site", "e commerce",
    "ecommerce",
];
const DESIGN_KEYWORDS: &[&str] = &[
    "logo", "logos", "design", "branding", "illustration", "graphic", "graphics", "poster",
    "banner", "flyer", "brochure", "packaging",
];
const SOCIAL_KEYWORDS: &[&str] = &[
    "social", "social media", "instagram", "tiktok", "facebook", "twitter", "linkedin", "post",
    "posts",
];

const SIMPLE_KEYWORDS: &[&str] = &["simple", "basic", "minimal", "quick", "small"];
const COMPLEX_KEYWORDS: &[&str] = &[
    "cinematic", "complex", "premium", "advanced", "detailed", "custom", "elaborate", "high end",
];

static EXPLICIT_PRICE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\$\s?(\d[\d,]*(?:\.\d+)?)|(\d[\d,]*(?:\.\d+)?)\s?(?:usd|dollars|eur|euros)\b")
        .expect("valid price pattern")
});

/// 价格类别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceCategory {
    Video,
    Web,
    Design,
    Social,
    General,
}

impl PriceCategory {
    /// 基础报价（美元）
    pub fn base_rate(&self) -> i64 {
        match self {
            PriceCategory::Video => 1500,
            PriceCategory::Web => 2000,
            PriceCategory::Design => 500,
            PriceCategory::Social => 300,
            PriceCategory::General => 400,
        }
    }

    /// 与价格规则 `category` 字段对应的名称
    pub fn as_str(&self) -> &'static str {
        match self {
            PriceCategory::Video => "video",
            PriceCategory::Web => "web",
            PriceCategory::Design => "design",
            PriceCategory::Social => "social",
            PriceCategory::General => "general",
        }
    }
}

/// 复杂度
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Complexity {
    Simple,
    Standard,
    Complex,
}

impl Complexity {
    /// 百分比形式的系数，避免浮点乘法带来的误差
    pub fn multiplier_percent(&self) -> i64 {
        match self {
            Complexity::Simple => 70,
            Complexity::Standard => 100,
            Complexity::Complex => 180,
        }
    }
}

/// 推断出的报价
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceEstimate {
    pub category: PriceCategory,
    pub complexity: Complexity,
    pub amount: f64,
}

/// 消息是否在询价
pub fn has_price_intent(message: &str) -> bool {
    contains_any(&normalize(message), PRICE_INTENT_KEYWORDS)
}

/// 按固定顺序匹配类别：视频、网站、设计、社媒，都不匹配时为通用
pub fn categorize(description: &str) -> PriceCategory {
    let text = normalize(description);
    if contains_any(&text, VIDEO_KEYWORDS) {
        PriceCategory::Video
    } else if contains_any(&text, WEB_KEYWORDS) {
        PriceCategory::Web
    } else if contains_any(&text, DESIGN_KEYWORDS) {
        PriceCategory::Design
    } else if contains_any(&text, SOCIAL_KEYWORDS) {
        PriceCategory::Social
    } else {
        PriceCategory::General
    }
}

/// 复杂关键词优先于简单关键词
pub fn complexity(description: &str) -> Complexity {
    let text = normalize(description);
    if contains_any(&text, COMPLEX_KEYWORDS) {
        Complexity::Complex
    } else if contains_any(&text, SIMPLE_KEYWORDS) {
        Complexity::Simple
    } else {
        Complexity::Standard
    }
}

/// 根据描述推断报价
///
/// # 示例
///
/// ```
/// use briefdesk::domain::services::pricing::estimate_price;
///
/// assert_eq!(estimate_price("simple logo design").amount, 350.0);
/// assert_eq!(estimate_price("a cinematic brand film").amount, 2700.0);
/// ```
pub fn estimate_price(description: &str) -> PriceEstimate {
    let category = categorize(description);
    let complexity = complexity(description);
    let cents = category.base_rate() * 100 * complexity.multiplier_percent() / 100;
    PriceEstimate {
        category,
        complexity,
        amount: cents as f64 / 100.0,
    }
}

/// 用组织内同类别的有效价格规则约束报价
pub fn apply_pricing_rules(estimate: PriceEstimate, rules: &[PricingRule]) -> PriceEstimate {
    let rule = rules
        .iter()
        .filter(|r| r.is_active)
        .find(|r| r.category.eq_ignore_ascii_case(estimate.category.as_str()));

    match rule {
        Some(rule) => PriceEstimate {
            amount: rule.clamp(estimate.amount),
            ..estimate
        },
        None => estimate,
    }
}

/// 消息中明确写出的金额，例如 `$1,500` 或 `800 usd`
pub fn explicit_price(message: &str) -> Option<f64> {
    let caps = EXPLICIT_PRICE_RE.captures(message)?;
    let raw = caps.get(1).or_else(|| caps.get(2))?.as_str();
    parse_amount(raw)
}

/// 解析金额文本，忽略货币符号和千位分隔符
pub fn parse_amount(raw: &str) -> Option<f64> {
    let cleaned: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    cleaned
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite() && *v > 0.0)
}

/// 小写并把非字母数字字符替换为空格，两端补空格便于整词匹配
fn normalize(text: &str) -> String {
    let mapped: String = text
        .to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect();
    format!(" {} ", mapped.split_whitespace().collect::<Vec<_>>().join(" "))
}

fn contains_any(normalized: &str, keywords: &[&str]) -> bool {
    keywords
        .iter()
        .any(|kw| normalized.contains(&format!(" {} ", kw)))
}

#[cfg(test)]
#[path = "pricing_test.rs"]
mod tests;
