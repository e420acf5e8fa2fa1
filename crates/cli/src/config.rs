//! # CLI設定
//!
//! 環境変数から読み込み、同名のフラグで上書きできる。
//!
//! | 環境変数 | 既定値 |
//! |---------|-------|
//! | `FABRIC_NETWORK` | `demo` |
//! | `FABRIC_CONFIG_URL` | ネットワーク名から決定 |
//! | `WALLET_RPC_URL` | `http://127.0.0.1:8546` |
//! | `FABRIC_LIBRARY_ID` | デモ用ライブラリ |
//! | `FABRIC_OBJECT_ID` | デモ用オブジェクト |
//! | `FABRIC_CONTENT_SPACE_ID` | ネットワーク設定のContent Space |
//! | `FABRIC_CONTENT_TYPE` | なし |
//! | `INGEST_SETTLE_SECS` | `15` |
//! | `TOKEN_DURATION_SECS` | `86400` |

use std::time::Duration;

use fabric_wallet::chain::DEMO_RPC_URL;

/// デモ用ライブラリID
pub const DEFAULT_LIBRARY_ID: &str = "ilib3MUNGcWxTNmK2WCJ5HYCvpxdSfFE";

/// デモ用オブジェクトID
pub const DEFAULT_OBJECT_ID: &str = "iq__2gT74zSivCodXieqM3pt52tQo2E3";

/// 全サブコマンド共通の設定。
#[derive(Debug, Clone, clap::Args)]
pub struct AppConfig {
    /// Fabricネットワーク名 (main, demo, test)
    #[arg(long, env = "FABRIC_NETWORK", default_value = "demo", global = true)]
    pub network: String,

    /// ネットワーク設定URL（指定時はネットワーク名より優先）
    #[arg(long, env = "FABRIC_CONFIG_URL", global = true)]
    pub config_url: Option<String>,

    /// ウォレットのJSON-RPC URL
    #[arg(long, env = "WALLET_RPC_URL", default_value = DEMO_RPC_URL, global = true)]
    pub rpc_url: String,

    #[arg(long, env = "FABRIC_LIBRARY_ID", default_value = DEFAULT_LIBRARY_ID, global = true)]
    pub library_id: String,

    #[arg(long, env = "FABRIC_OBJECT_ID", default_value = DEFAULT_OBJECT_ID, global = true)]
    pub object_id: String,

    /// Content Space ID（省略時はネットワーク設定から取得）
    #[arg(long, env = "FABRIC_CONTENT_SPACE_ID", global = true)]
    pub content_space_id: Option<String>,

    /// 新規オブジェクトのコンテンツタイプ (iq__ / hq__)
    #[arg(long, env = "FABRIC_CONTENT_TYPE", global = true)]
    pub content_type: Option<String>,

    /// オブジェクト作成後、編集トークン発行までの待機秒数
    #[arg(long, env = "INGEST_SETTLE_SECS", default_value_t = 15, global = true)]
    pub settle_secs: u64,

    /// クライアント署名トークンの有効期間（秒）
    #[arg(long, env = "TOKEN_DURATION_SECS", default_value_t = 86_400, global = true)]
    pub token_duration_secs: u64,
}

impl AppConfig {
    pub fn settle_delay(&self) -> Duration {
        Duration::from_secs(self.settle_secs)
    }

    pub fn token_duration(&self) -> Duration {
        Duration::from_secs(self.token_duration_secs)
    }
}

#[cfg(test)]
pub(crate) fn test_config() -> AppConfig {
    AppConfig {
        network: "demo".to_string(),
        config_url: None,
        rpc_url: DEMO_RPC_URL.to_string(),
        library_id: DEFAULT_LIBRARY_ID.to_string(),
        object_id: DEFAULT_OBJECT_ID.to_string(),
        content_space_id: Some("ispc3ANoVSzNA3P6t7abLR69ho5YPPZU".to_string()),
        content_type: None,
        settle_secs: 0,
        token_duration_secs: 60,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct TestCli {
        #[command(flatten)]
        config: AppConfig,
    }

    /// 既定値とフラグによる上書きを確認
    #[test]
    fn test_defaults_and_overrides() {
        let cli = TestCli::parse_from(["fabric-cli"]);
        assert_eq!(cli.config.rpc_url, DEMO_RPC_URL);
        assert_eq!(cli.config.library_id, DEFAULT_LIBRARY_ID);
        assert_eq!(cli.config.token_duration(), Duration::from_secs(86_400));

        let cli = TestCli::parse_from(["fabric-cli", "--network", "test", "--settle-secs", "2"]);
        assert_eq!(cli.config.network, "test");
        assert_eq!(cli.config.settle_delay(), Duration::from_secs(2));
    }
}
