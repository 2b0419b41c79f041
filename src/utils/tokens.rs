// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use rand::distr::Alphanumeric;
use rand::Rng;

const SERVICE_ID_CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// 生成会话令牌（64 位十六进制）
pub fn generate_session_token() -> String {
    let bytes: [u8; 32] = rand::random();
    hex::encode(bytes)
}

/// 生成邀请码（24 位字母数字）
pub fn generate_invite_code() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(24)
        .map(char::from)
        .collect()
}

/// 生成形如 `SVC-XXXXX` 的服务标识
pub fn generate_service_id() -> String {
    let mut rng = rand::rng();
    let suffix: String = (0..5)
        .map(|_| SERVICE_ID_CHARSET[rng.random_range(0..SERVICE_ID_CHARSET.len())] as char)
        .collect();
    format!("SVC-{}", suffix)
}

/// 把组织名称转换为 URL slug
///
/// 非 ASCII 字符先音译，其余非字母数字字符折叠为单个连字符
pub fn slugify(name: &str) -> String {
    let ascii = deunicode::deunicode(name).to_lowercase();
    let mut slug = String::with_capacity(ascii.len());
    let mut pending_dash = false;

    for c in ascii.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c);
        } else {
            pending_dash = true;
        }
    }

    if slug.is_empty() {
        "organization".to_string()
    } else {
        slug
    }
}

/// 为冲突的 slug 追加随机后缀
pub fn slug_with_suffix(base: &str) -> String {
    let suffix: String = rand::rng()
        .sample_iter(&Alphanumeric)
        .take(6)
        .map(char::from)
        .collect();
    format!("{}-{}", base, suffix.to_lowercase())
}
