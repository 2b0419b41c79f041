// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

/// Webhook 签名校验错误
#[derive(Error, Debug, PartialEq, Eq)]
pub enum SignatureError {
    #[error("signature header is missing a timestamp")]
    MissingTimestamp,
    #[error("signature header has no v1 signature")]
    MissingSignature,
    #[error("signature timestamp outside tolerance")]
    Expired,
    #[error("signature mismatch")]
    Mismatch,
}

/// 计算 `"{timestamp}.{payload}"` 的 HMAC-SHA256 十六进制签名
pub fn sign_payload(secret: &str, timestamp: i64, payload: &[u8]) -> String {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC can take key of any size");
    mac.update(timestamp.to_string().as_bytes());
    mac.update(b".");
    mac.update(payload);
    hex::encode(mac.finalize().into_bytes())
}

/// 生成 `t=<ts>,v1=<sig>` 形式的签名头
pub fn signature_header(secret: &str, timestamp: i64, payload: &[u8]) -> String {
    format!("t={},v1={}", timestamp, sign_payload(secret, timestamp, payload))
}

/// 校验支付处理方的 Webhook 签名头
///
/// # 参数
///
/// * `secret` - Webhook 签名密钥
/// * `payload` - 原始请求体
/// * `header` - 签名头，可包含多个 `v1` 条目
/// * `now` - 当前 Unix 时间戳
/// * `tolerance_secs` - 允许的时间偏差
pub fn verify_signature(
    secret: &str,
    payload: &[u8],
    header: &str,
    now: i64,
    tolerance_secs: i64,
) -> Result<(), SignatureError> {
    let mut timestamp = None;
    let mut signatures = Vec::new();

    for part in header.split(',') {
        match part.trim().split_once('=') {
            Some(("t", value)) => timestamp = value.parse::<i64>().ok(),
            Some(("v1", value)) => signatures.push(value),
            _ => {}
        }
    }

    let timestamp = timestamp.ok_or(SignatureError::MissingTimestamp)?;
    if signatures.is_empty() {
        return Err(SignatureError::MissingSignature);
    }
    if (now - timestamp).abs() > tolerance_secs {
        return Err(SignatureError::Expired);
    }

    for candidate in signatures {
        let Ok(expected) = hex::decode(candidate) else {
            continue;
        };
        let Ok(mut mac) = HmacSha256::new_from_slice(secret.as_bytes()) else {
            return Err(SignatureError::Mismatch);
        };
        mac.update(timestamp.to_string().as_bytes());
        mac.update(b".");
        mac.update(payload);
        // constant-time comparison
        if mac.verify_slice(&expected).is_ok() {
            return Ok(());
        }
    }

    Err(SignatureError::Mismatch)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "whsec_test";

    #[test]
    fn test_valid_signature() {
        let body = br#"{"type":"checkout.session.completed"}"#;
        let header = signature_header(SECRET, 1_700_000_000, body);
        assert_eq!(
            verify_signature(SECRET, body, &header, 1_700_000_010, 300),
            Ok(())
        );
    }

    #[test]
    fn test_tampered_body_is_rejected() {
        let header = signature_header(SECRET, 1_700_000_000, b"original");
        assert_eq!(
            verify_signature(SECRET, b"tampered", &header, 1_700_000_000, 300),
            Err(SignatureError::Mismatch)
        );
    }

    #[test]
    fn test_stale_timestamp_is_rejected() {
        let header = signature_header(SECRET, 1_700_000_000, b"body");
        assert_eq!(
            verify_signature(SECRET, b"body", &header, 1_700_001_000, 300),
            Err(SignatureError::Expired)
        );
    }

    #[test]
    fn test_malformed_headers() {
        assert_eq!(
            verify_signature(SECRET, b"body", "v1=abc", 0, 300),
            Err(SignatureError::MissingTimestamp)
        );
        assert_eq!(
            verify_signature(SECRET, b"body", "t=0", 0, 300),
            Err(SignatureError::MissingSignature)
        );
    }

    #[test]
    fn test_any_v1_entry_may_match() {
        let good = sign_payload(SECRET, 10, b"body");
        let header = format!("t=10,v1=deadbeef,v1={}", good);
        assert_eq!(verify_signature(SECRET, b"body", &header, 10, 300), Ok(()));
    }
}
