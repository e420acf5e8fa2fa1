//! # チェーン定義

use fabric_types::{AddChainParams, NativeCurrency};

/// Ethereumメインネット
pub const MAINNET_CHAIN_ID: &str = "0x1";

/// ローカル開発チェーン（1338）
pub const DEMO_CHAIN_ID: &str = "0x53a";

/// ローカル開発チェーンのRPC
pub const DEMO_RPC_URL: &str = "http://127.0.0.1:8546";

/// `wallet_addEthereumChain` に渡すローカル開発チェーンの定義。
pub fn demo_chain_params() -> AddChainParams {
    AddChainParams {
        chain_id: DEMO_CHAIN_ID.to_string(),
        rpc_urls: vec![DEMO_RPC_URL.to_string()],
        chain_name: "Localhost 8546".to_string(),
        native_currency: NativeCurrency {
            name: "TEST".to_string(),
            decimals: 18,
            symbol: "TEST".to_string(),
        },
        block_explorer_urls: None,
    }
}

/// メインネットに接続しているか。メインネットでは警告を表示する。
pub fn is_mainnet(chain_id: &str) -> bool {
    let digits = fabric_crypto::strip_hex_prefix(chain_id);
    u64::from_str_radix(digits, 16).map(|id| id == 1).unwrap_or(false)
}
