// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use aws_sdk_s3::config::BehaviorVersion;
use aws_sdk_s3::primitives::ByteStream;
use metrics::counter;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::config::settings::StorageSettings;
use crate::domain::models::asset::StorageTier;
use crate::domain::repositories::storage_repository::{
    StorageError, StorageRepository, StoredObject,
};

/// 文档同步服务存储
///
/// 以 `PUT {base}/files/{key}` 上传，响应中的 `url` 作为访问地址
pub struct DocSyncStorage {
    client: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DocSyncResponse {
    url: Option<String>,
}

impl DocSyncStorage {
    pub fn new(base_url: String, token: Option<String>) -> Result<Self, StorageError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| StorageError::Other(e.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
        })
    }
}

#[async_trait]
impl StorageRepository for DocSyncStorage {
    async fn save(
        &self,
        key: &str,
        data: &[u8],
        content_type: &str,
    ) -> Result<StoredObject, StorageError> {
        let endpoint = format!("{}/files/{}", self.base_url, key);
        let mut request = self
            .client
            .put(&endpoint)
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(data.to_vec());
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| StorageError::Other(e.to_string()))?;
        if !response.status().is_success() {
            return Err(StorageError::Other(format!(
                "document sync returned {}",
                response.status()
            )));
        }

        // 响应体不是 JSON 时退回到上传地址
        let url = response
            .json::<DocSyncResponse>()
            .await
            .ok()
            .and_then(|r| r.url)
            .unwrap_or(endpoint);

        Ok(StoredObject {
            url,
            tier: StorageTier::DocSync,
            key: key.to_string(),
        })
    }
}

/// S3 对象存储实现
pub struct S3Storage {
    client: aws_sdk_s3::Client,
    bucket: String,
    public_base_url: String,
}

impl S3Storage {
    pub fn new(
        region: String,
        bucket: String,
        access_key: String,
        secret_key: String,
        endpoint: Option<String>,
        public_base_url: Option<String>,
    ) -> Self {
        let credentials =
            aws_sdk_s3::config::Credentials::new(access_key, secret_key, None, None, "static");

        let mut config_builder = aws_sdk_s3::config::Builder::new()
            .behavior_version(BehaviorVersion::latest())
            .region(aws_sdk_s3::config::Region::new(region.clone()))
            .credentials_provider(credentials);

        if let Some(ep) = &endpoint {
            config_builder = config_builder.endpoint_url(ep).force_path_style(true);
        }

        let public_base_url = public_base_url.unwrap_or_else(|| match &endpoint {
            Some(ep) => format!("{}/{}", ep.trim_end_matches('/'), bucket),
            None => format!("https://{}.s3.{}.amazonaws.com", bucket, region),
        });

        let config = config_builder.build();
        let client = aws_sdk_s3::Client::from_conf(config);

        Self {
            client,
            bucket,
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl StorageRepository for S3Storage {
    async fn save(
        &self,
        key: &str,
        data: &[u8],
        content_type: &str,
    ) -> Result<StoredObject, StorageError> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_type(content_type)
            .body(ByteStream::from(data.to_vec()))
            .send()
            .await
            .map_err(|e| StorageError::Other(e.to_string()))?;

        Ok(StoredObject {
            url: format!("{}/{}", self.public_base_url, key),
            tier: StorageTier::ObjectStorage,
            key: key.to_string(),
        })
    }
}

/// 本地文件系统存储实现，文件通过 `/files` 路由对外提供
pub struct LocalStorage {
    base_path: PathBuf,
    public_base_url: String,
}

impl LocalStorage {
    pub fn new(base_path: impl Into<PathBuf>, public_base_url: &str) -> Self {
        Self {
            base_path: base_path.into(),
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
        }
    }

    fn full_path(&self, key: &str) -> Result<PathBuf, StorageError> {
        let relative = Path::new(key);
        if relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_)))
        {
            return Err(StorageError::Other(format!("invalid storage key: {}", key)));
        }
        Ok(self.base_path.join(relative))
    }
}

#[async_trait]
impl StorageRepository for LocalStorage {
    async fn save(
        &self,
        key: &str,
        data: &[u8],
        _content_type: &str,
    ) -> Result<StoredObject, StorageError> {
        let full_path = self.full_path(key)?;

        // 确保目录存在
        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let mut file = fs::File::create(&full_path).await?;
        file.write_all(data).await?;
        file.flush().await?;

        Ok(StoredObject {
            url: format!("{}/files/{}", self.public_base_url, key),
            tier: StorageTier::Local,
            key: key.to_string(),
        })
    }
}

/// 分层存储
///
/// 按顺序尝试各层，失败的层记录警告后交给下一层
pub struct TieredStorage {
    tiers: Vec<Arc<dyn StorageRepository>>,
}

impl TieredStorage {
    pub fn new(tiers: Vec<Arc<dyn StorageRepository>>) -> Self {
        Self { tiers }
    }

    pub fn len(&self) -> usize {
        self.tiers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiers.is_empty()
    }
}

#[async_trait]
impl StorageRepository for TieredStorage {
    async fn save(
        &self,
        key: &str,
        data: &[u8],
        content_type: &str,
    ) -> Result<StoredObject, StorageError> {
        let mut last_error = None;
        for (index, tier) in self.tiers.iter().enumerate() {
            match tier.save(key, data, content_type).await {
                Ok(stored) => {
                    counter!("asset_uploads_total", "tier" => stored.tier.as_str()).increment(1);
                    return Ok(stored);
                }
                Err(e) => {
                    warn!(tier = index, key, error = %e, "storage tier failed, falling through");
                    counter!("storage_fallbacks_total").increment(1);
                    last_error = Some(e);
                }
            }
        }
        Err(last_error.unwrap_or_else(|| StorageError::Other("no storage tier configured".into())))
    }
}

/// 按配置组装存储层级
///
/// 文档同步和 S3 只有在配置齐全时启用，本地磁盘总是最后一层
pub fn create_storage(
    settings: &StorageSettings,
    public_base_url: &str,
) -> Result<TieredStorage, StorageError> {
    let mut tiers: Vec<Arc<dyn StorageRepository>> = Vec::new();

    if let Some(url) = &settings.doc_sync_url {
        tiers.push(Arc::new(DocSyncStorage::new(
            url.clone(),
            settings.doc_sync_token.clone(),
        )?));
        info!("document sync storage tier enabled");
    }

    if let (Some(region), Some(bucket), Some(access_key), Some(secret_key)) = (
        &settings.s3_region,
        &settings.s3_bucket,
        &settings.s3_access_key,
        &settings.s3_secret_key,
    ) {
        tiers.push(Arc::new(S3Storage::new(
            region.clone(),
            bucket.clone(),
            access_key.clone(),
            secret_key.clone(),
            settings.s3_endpoint.clone(),
            settings.s3_public_base_url.clone(),
        )));
        info!(bucket = %bucket, "object storage tier enabled");
    }

    tiers.push(Arc::new(LocalStorage::new(
        settings.local_path.clone(),
        public_base_url,
    )));

    Ok(TieredStorage::new(tiers))
}

/// 测试用的内存存储实现（用于单元测试）
pub struct InMemoryStorage {
    data: Arc<RwLock<HashMap<String, Vec<u8>>>>,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self {
            data: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub async fn get(&self, key: &str) -> Option<Vec<u8>> {
        self.data.read().await.get(key).cloned()
    }
}

impl Default for InMemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl StorageRepository for InMemoryStorage {
    async fn save(
        &self,
        key: &str,
        data: &[u8],
        _content_type: &str,
    ) -> Result<StoredObject, StorageError> {
        let mut map = self.data.write().await;
        map.insert(key.to_string(), data.to_vec());
        Ok(StoredObject {
            url: format!("memory://{}", key),
            tier: StorageTier::Local,
            key: key.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FailingStorage;

    #[async_trait]
    impl StorageRepository for FailingStorage {
        async fn save(&self, _: &str, _: &[u8], _: &str) -> Result<StoredObject, StorageError> {
            Err(StorageError::Other("down".into()))
        }
    }

    #[tokio::test]
    async fn test_tiered_storage_falls_through() {
        let memory = Arc::new(InMemoryStorage::new());
        let tiered = TieredStorage::new(vec![Arc::new(FailingStorage), memory.clone()]);

        let stored = tiered.save("a/b.txt", b"hello", "text/plain").await.unwrap();

        assert_eq!(stored.url, "memory://a/b.txt");
        assert_eq!(memory.get("a/b.txt").await.unwrap(), b"hello".to_vec());
    }

    #[tokio::test]
    async fn test_tiered_storage_reports_last_error() {
        let tiered = TieredStorage::new(vec![Arc::new(FailingStorage)]);
        let err = tiered.save("k", b"x", "text/plain").await.unwrap_err();
        assert!(err.to_string().contains("down"));
    }

    #[tokio::test]
    async fn test_local_storage_writes_file_and_builds_url() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalStorage::new(dir.path(), "http://localhost:3000/");

        let stored = storage
            .save("tasks/1/logo.png", b"png", "image/png")
            .await
            .unwrap();

        assert_eq!(stored.url, "http://localhost:3000/files/tasks/1/logo.png");
        assert_eq!(stored.tier, StorageTier::Local);
        let written = tokio::fs::read(dir.path().join("tasks/1/logo.png")).await.unwrap();
        assert_eq!(written, b"png");
    }

    #[tokio::test]
    async fn test_local_storage_rejects_traversal() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalStorage::new(dir.path(), "http://localhost:3000");
        assert!(storage.save("../escape", b"x", "text/plain").await.is_err());
    }

    #[test]
    fn test_only_local_tier_without_remote_settings() {
        let settings = crate::config::settings::Settings::defaults().unwrap();
        let tiers = create_storage(&settings.storage, "http://localhost:3000").unwrap();
        assert_eq!(tiers.len(), 1);
    }
}
