// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use super::Settings;

#[test]
fn test_defaults_cover_every_section() {
    let settings = Settings::defaults().expect("defaults should deserialize");

    assert_eq!(settings.server.port, 3000);
    assert_eq!(settings.server.public_base_url, "http://localhost:3000");
    assert_eq!(settings.auth.session_ttl_hours, 336);
    assert!(settings.llm.api_key.is_none());
    assert_eq!(settings.billing.currency, "usd");
    assert_eq!(settings.billing.per_client_fee_cents, 500);
    assert_eq!(settings.storage.max_upload_bytes, 10 * 1024 * 1024);
    assert!(settings.storage.doc_sync_url.is_none());
    assert!(settings.storage.s3_bucket.is_none());
    assert_eq!(settings.jobs.max_attempts, 3);
    assert!(!settings.metrics.enabled);
}

#[test]
fn test_optional_tiers_are_absent_by_default() {
    let settings = Settings::defaults().unwrap();

    // 没有配置时只启用本地磁盘
    assert!(settings.storage.doc_sync_token.is_none());
    assert!(settings.storage.s3_access_key.is_none());
    assert_eq!(settings.storage.local_path, "./storage");
}
