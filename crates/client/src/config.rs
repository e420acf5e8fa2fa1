//! # ネットワーク設定
//!
//! ネットワークの `/config` ドキュメントからContent Space IDと各APIのシードノードを得る。

use fabric_types::NetworkConfigDocument;

use crate::FabricError;

/// 既知ネットワーク名と設定URL
const NETWORKS: [(&str, &str); 3] = [
    ("main", "https://main.net955305.contentfabric.io/config"),
    ("demo", "https://demov3.net955210.contentfabric.io/config"),
    ("test", "https://test.net955203.contentfabric.io/config"),
];

/// ネットワーク名から設定URLを引く。
pub fn config_url_for_network(network_name: &str) -> Option<&'static str> {
    NETWORKS
        .iter()
        .find(|(name, _)| *name == network_name)
        .map(|(_, url)| *url)
}

/// Fabricネットワーク設定。
#[derive(Debug, Clone)]
pub struct FabricConfig {
    /// 取得元の設定URL
    pub config_url: String,
    /// Content Space ID
    pub content_space_id: String,
    /// Fabric REST APIのURI一覧
    pub fabric_uris: Vec<String>,
    /// Ethereum JSON-RPCのURI一覧
    pub ethereum_uris: Vec<String>,
}

impl FabricConfig {
    /// ネットワーク名（"main", "demo", "test"）から設定を取得する。
    pub async fn from_network_name(
        http_client: &reqwest::Client,
        network_name: &str,
    ) -> Result<Self, FabricError> {
        let url = config_url_for_network(network_name).ok_or_else(|| {
            FabricError::Config(format!("未知のネットワーク名です: {network_name}"))
        })?;
        Self::from_config_url(http_client, url).await
    }

    /// 設定URLから取得する。
    pub async fn from_config_url(
        http_client: &reqwest::Client,
        config_url: &str,
    ) -> Result<Self, FabricError> {
        tracing::info!(config_url, "ネットワーク設定を取得中");
        let response = http_client
            .get(config_url)
            .send()
            .await
            .map_err(|e| FabricError::Http(format!("設定の取得に失敗 ({config_url}): {e}")))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| FabricError::Http(format!("レスポンス読み取り失敗: {e}")))?;
        if !status.is_success() {
            return Err(FabricError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let doc: NetworkConfigDocument = serde_json::from_str(&body)
            .map_err(|e| FabricError::InvalidResponse(format!("設定のパースに失敗: {e}")))?;
        let config = Self {
            config_url: config_url.to_string(),
            content_space_id: doc.qspace.id,
            fabric_uris: doc.network.seed_nodes.fabric_api,
            ethereum_uris: doc.network.seed_nodes.ethereum_api,
        };
        if config.fabric_uris.is_empty() {
            return Err(FabricError::Config(
                "設定にFabric APIのURIがありません".to_string(),
            ));
        }

        tracing::info!(
            content_space_id = %config.content_space_id,
            fabric_uri = %config.fabric_uris[0],
            "ネットワーク設定を取得しました"
        );
        Ok(config)
    }

    /// 使用するFabric APIのURI（先頭）。
    pub fn fabric_url(&self) -> &str {
        self.fabric_uris
            .first()
            .map(String::as_str)
            .unwrap_or_default()
    }
}
