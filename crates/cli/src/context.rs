//! # 実行コンテキスト
//!
//! 起動時に一度だけ構築し、各操作に明示的に渡す。

use std::sync::Arc;

use anyhow::Context as _;

use fabric_client::{ContentContracts, FabricApi, FabricConfig, HttpFabricClient};
use fabric_token::MessageSigner;
use fabric_wallet::{EventDispatcher, HttpWalletProvider, WalletProvider, WalletSigner};

use crate::config::AppConfig;

/// Fabricへの接続（ネットワーク設定取得後に利用可能）。
pub struct FabricSession {
    pub content_space_id: String,
    pub api: Arc<dyn FabricApi>,
}

/// CLIの実行コンテキスト。
pub struct AppContext {
    pub config: AppConfig,
    pub wallet: Arc<dyn WalletProvider>,
    pub signer: Arc<dyn MessageSigner>,
    pub contracts: ContentContracts,
    pub events: EventDispatcher,
    fabric: Option<FabricSession>,
}

impl AppContext {
    /// ウォレット操作のみのコンテキスト。ネットワーク設定は取得しない。
    pub fn wallet_only(config: AppConfig, http_client: reqwest::Client) -> Self {
        let wallet: Arc<dyn WalletProvider> =
            Arc::new(HttpWalletProvider::with_client(&config.rpc_url, http_client));
        Self::from_parts(config, wallet, None)
    }

    /// ネットワーク設定を取得し、Fabricクライアントまで構築する。
    pub async fn connect(config: AppConfig, http_client: reqwest::Client) -> anyhow::Result<Self> {
        let network = match &config.config_url {
            Some(url) => FabricConfig::from_config_url(&http_client, url).await,
            None => FabricConfig::from_network_name(&http_client, &config.network).await,
        }
        .context("ネットワーク設定の取得に失敗")?;

        let content_space_id = config
            .content_space_id
            .clone()
            .unwrap_or_else(|| network.content_space_id.clone());
        let api: Arc<dyn FabricApi> = Arc::new(HttpFabricClient::with_client(
            network.fabric_url(),
            http_client.clone(),
        ));
        tracing::info!(
            network = %config.network,
            %content_space_id,
            fabric_url = network.fabric_url(),
            "Fabricに接続しました"
        );

        let mut ctx = Self::wallet_only(config, http_client);
        ctx.fabric = Some(FabricSession {
            content_space_id,
            api,
        });
        Ok(ctx)
    }

    /// 既存の部品から組み立てる。署名はウォレットの `personal_sign` で行う。
    pub fn from_parts(
        config: AppConfig,
        wallet: Arc<dyn WalletProvider>,
        fabric: Option<FabricSession>,
    ) -> Self {
        let signer: Arc<dyn MessageSigner> = Arc::new(WalletSigner::new(wallet.clone()));
        Self {
            config,
            contracts: ContentContracts::new(wallet.clone()),
            wallet,
            signer,
            events: EventDispatcher::default(),
            fabric,
        }
    }

    /// Fabric接続。ウォレット専用コンテキストではエラー。
    pub fn fabric(&self) -> anyhow::Result<&FabricSession> {
        self.fabric
            .as_ref()
            .context("Fabricに接続していません")
    }
}
