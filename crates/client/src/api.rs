//! # Fabric REST API
//!
//! ## エンドポイント
//! | 操作 | リクエスト |
//! |------|-----------|
//! | オブジェクト情報 | `GET /qlibs/{lib}/q/{obj}` |
//! | メタデータ | `GET /qlibs/{lib}/q/{obj}/meta` |
//! | 編集開始 | `POST /qlibs/{lib}/q/{obj}` → 書き込みトークン |
//! | ファイルジョブ作成 | `POST /qlibs/{lib}/q/{wt}/file_jobs` |
//! | ジョブ範囲取得 | `GET /qlibs/{lib}/q/{wt}/file_jobs/{id}/uploads/{job}` |
//! | データ送信 | `POST /qlibs/{lib}/q/{wt}/file_jobs/{id}/{job}` |
//!
//! 認証は `Authorization: Bearer <静的トークン>`。

use std::collections::HashMap;

use serde::de::DeserializeOwned;
use tokio::sync::RwLock;

use fabric_types::{
    ContentObjectResponse, EditResponse, FileJobOp, FileJobRequest, FileJobResponse,
    FileProgress, UploadJobInfo, UploadProgress,
};

use crate::{FabricError, ProgressCallback, UploadFile};

/// 対応している暗号化方式
const ENCRYPTION_NONE: &str = "none";

/// Fabric REST APIの抽象。
#[async_trait::async_trait]
pub trait FabricApi: Send + Sync {
    /// 以降のリクエストで使う静的トークンを設定する。
    async fn set_static_token(&self, token: &str);

    async fn content_object(
        &self,
        library_id: &str,
        object_id: &str,
    ) -> Result<ContentObjectResponse, FabricError>;

    async fn content_object_metadata(
        &self,
        library_id: &str,
        object_id: &str,
    ) -> Result<serde_json::Value, FabricError>;

    /// 編集を開始し、書き込みトークンを返す。
    async fn edit_content_object(
        &self,
        library_id: &str,
        object_id: &str,
    ) -> Result<EditResponse, FabricError>;

    /// 書き込みトークンに対してファイルをアップロードする。
    async fn upload_files(
        &self,
        library_id: &str,
        write_token: &str,
        files: &[UploadFile],
        progress: Option<ProgressCallback>,
    ) -> Result<(), FabricError>;
}

/// reqwestによる `FabricApi` 実装。
pub struct HttpFabricClient {
    base_url: String,
    http_client: reqwest::Client,
    static_token: RwLock<Option<String>>,
}

impl HttpFabricClient {
    pub fn new(base_url: &str) -> Self {
        Self::with_client(base_url, reqwest::Client::new())
    }

    pub fn with_client(base_url: &str, http_client: reqwest::Client) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http_client,
            static_token: RwLock::new(None),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn object_url(&self, library_id: &str, object_or_token: &str) -> String {
        format!("{}/qlibs/{library_id}/q/{object_or_token}", self.base_url)
    }

    async fn authorize(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.static_token.read().await.as_deref() {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// リクエストを送信し、成功ステータスならボディをJSONとしてパースする。
    async fn send_json<T: DeserializeOwned>(
        &self,
        builder: reqwest::RequestBuilder,
        url: &str,
    ) -> Result<T, FabricError> {
        let response = self
            .authorize(builder)
            .await
            .send()
            .await
            .map_err(|e| FabricError::Http(format!("{url}: {e}")))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| FabricError::Http(format!("レスポンス読み取り失敗: {e}")))?;
        if !status.is_success() {
            tracing::warn!(url, status = status.as_u16(), "Fabricがエラーを返しました");
            return Err(FabricError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body = if body.trim().is_empty() { "null" } else { body.as_str() };
        serde_json::from_str(body)
            .map_err(|e| FabricError::InvalidResponse(format!("{url}: {e}")))
    }
}

#[async_trait::async_trait]
impl FabricApi for HttpFabricClient {
    async fn set_static_token(&self, token: &str) {
        *self.static_token.write().await = Some(token.to_string());
        tracing::debug!("静的トークンを設定しました");
    }

    async fn content_object(
        &self,
        library_id: &str,
        object_id: &str,
    ) -> Result<ContentObjectResponse, FabricError> {
        let url = self.object_url(library_id, object_id);
        self.send_json(self.http_client.get(&url), &url).await
    }

    async fn content_object_metadata(
        &self,
        library_id: &str,
        object_id: &str,
    ) -> Result<serde_json::Value, FabricError> {
        let url = format!("{}/meta", self.object_url(library_id, object_id));
        self.send_json(self.http_client.get(&url), &url).await
    }

    async fn edit_content_object(
        &self,
        library_id: &str,
        object_id: &str,
    ) -> Result<EditResponse, FabricError> {
        let url = self.object_url(library_id, object_id);
        let edit: EditResponse = self
            .send_json(self.http_client.post(&url).json(&serde_json::json!({})), &url)
            .await?;
        tracing::info!(object_id, write_token = %edit.write_token, "編集を開始しました");
        Ok(edit)
    }

    async fn upload_files(
        &self,
        library_id: &str,
        write_token: &str,
        files: &[UploadFile],
        progress: Option<ProgressCallback>,
    ) -> Result<(), FabricError> {
        let jobs_url = format!("{}/file_jobs", self.object_url(library_id, write_token));

        let mut state: UploadProgress = files
            .iter()
            .map(|f| {
                (
                    f.info.path.clone(),
                    FileProgress {
                        uploaded: 0,
                        total: f.info.size,
                    },
                )
            })
            .collect();
        if let Some(callback) = &progress {
            callback(&state);
        }

        let request = FileJobRequest {
            encryption: ENCRYPTION_NONE.to_string(),
            ops: files
                .iter()
                .map(|f| FileJobOp {
                    op: "add".to_string(),
                    path: f.info.path.clone(),
                    entry_type: "file".to_string(),
                    mime_type: f.info.mime_type.clone(),
                    size: f.info.size,
                })
                .collect(),
        };
        let job: FileJobResponse = self
            .send_json(self.http_client.post(&jobs_url).json(&request), &jobs_url)
            .await?;
        tracing::info!(upload_id = %job.id, jobs = job.jobs.len(), "ファイルジョブを作成しました");

        let by_path: HashMap<&str, &UploadFile> =
            files.iter().map(|f| (f.info.path.as_str(), f)).collect();

        for job_id in &job.jobs {
            let info_url = format!("{jobs_url}/{}/uploads/{job_id}", job.id);
            let info: UploadJobInfo = self
                .send_json(self.http_client.get(&info_url), &info_url)
                .await?;

            for range in &info.files {
                let file = by_path.get(range.path.as_str()).ok_or_else(|| {
                    FabricError::InvalidResponse(format!("未知のファイル: {}", range.path))
                })?;
                let start = usize::try_from(range.off).unwrap_or(usize::MAX);
                let end = start.checked_add(usize::try_from(range.len).unwrap_or(usize::MAX));
                let chunk = end
                    .and_then(|end| file.data.get(start..end))
                    .ok_or_else(|| {
                        FabricError::InvalidResponse(format!(
                            "{}: 範囲外 (off={}, len={})",
                            range.path, range.off, range.len
                        ))
                    })?;

                let data_url = format!("{jobs_url}/{}/{job_id}", job.id);
                let _: serde_json::Value = self
                    .send_json(
                        self.http_client
                            .post(&data_url)
                            .header("Content-Type", "application/octet-stream")
                            .body(chunk.to_vec()),
                        &data_url,
                    )
                    .await?;

                if let Some(entry) = state.get_mut(&range.path) {
                    entry.uploaded = entry.uploaded.saturating_add(range.len).min(entry.total);
                }
                if let Some(callback) = &progress {
                    callback(&state);
                }
                tracing::debug!(path = %range.path, off = range.off, len = range.len, "送信しました");
            }
        }

        tracing::info!(files = files.len(), "アップロードが完了しました");
        Ok(())
    }
}
