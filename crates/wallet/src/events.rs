//! # ウォレットイベント
//!
//! チェーン変更・アカウント変更などの通知を一つのディスパッチャから配信する。
//! 購読側（CLI表示など）はハンドラ内で直接状態を書き換えず、受信したイベントを描画する。
//!
//! HTTPプロバイダにはプッシュ通知がないため、[`WalletWatcher`] が定期的に
//! 状態を取得し、変化があったときだけイベントを発行する。

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;

use crate::chain::is_mainnet;
use crate::{WalletApi, WalletError, WalletProvider};

/// ディスパッチャのバッファ長
const DEFAULT_CAPACITY: usize = 64;

/// ウォレットから届くイベント。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WalletEvent {
    /// チェーンIDが変わった
    ChainChanged {
        /// 新しいチェーンID (hex)
        chain_id: String,
        /// メインネットか（警告表示用）
        mainnet: bool,
    },
    /// ネットワークバージョンが変わった
    NetworkChanged(String),
    /// 接続アカウントが変わった
    AccountsChanged(Vec<String>),
    /// EIP-1559対応状況が判明・変化した
    Eip1559Support(bool),
}

/// ウォレットイベントのディスパッチャ。
#[derive(Clone)]
pub struct EventDispatcher {
    sender: broadcast::Sender<WalletEvent>,
}

impl EventDispatcher {
    /// 指定バッファ長で構築する。
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// イベントを購読する。購読以降に発行されたイベントのみ受信する。
    pub fn subscribe(&self) -> broadcast::Receiver<WalletEvent> {
        self.sender.subscribe()
    }

    /// イベントを発行し、受信者数を返す。購読者がいなくてもエラーにしない。
    pub fn emit(&self, event: WalletEvent) -> usize {
        tracing::debug!(?event, "ウォレットイベントを発行");
        self.sender.send(event).unwrap_or(0)
    }
}

impl Default for EventDispatcher {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

/// 最後に観測したウォレット状態
#[derive(Debug, Default)]
struct ObservedState {
    chain_id: Option<String>,
    network: Option<String>,
    accounts: Option<Vec<String>>,
    eip1559: Option<bool>,
}

/// ウォレット状態を定期取得してイベントに変換する。
pub struct WalletWatcher {
    provider: Arc<dyn WalletProvider>,
    dispatcher: EventDispatcher,
    interval: Duration,
    observed: ObservedState,
}

impl WalletWatcher {
    /// プロバイダ・ディスパッチャ・取得間隔から構築する。
    pub fn new(
        provider: Arc<dyn WalletProvider>,
        dispatcher: EventDispatcher,
        interval: Duration,
    ) -> Self {
        Self {
            provider,
            dispatcher,
            interval,
            observed: ObservedState::default(),
        }
    }

    /// 一度だけ状態を取得し、変化分のイベントを発行して返す。
    ///
    /// EIP-1559対応はチェーンまたはアカウントが変わったときに再確認する。
    pub async fn poll_once(&mut self) -> Result<Vec<WalletEvent>, WalletError> {
        let mut events = Vec::new();

        let chain_id = self.provider.chain_id().await?;
        let chain_changed = self.observed.chain_id.as_deref() != Some(chain_id.as_str());
        if chain_changed {
            events.push(WalletEvent::ChainChanged {
                mainnet: is_mainnet(&chain_id),
                chain_id: chain_id.clone(),
            });
            self.observed.chain_id = Some(chain_id);
        }

        let network = self.provider.net_version().await?;
        if self.observed.network.as_deref() != Some(network.as_str()) {
            events.push(WalletEvent::NetworkChanged(network.clone()));
            self.observed.network = Some(network);
        }

        let accounts = self.provider.accounts().await?;
        let accounts_changed = self.observed.accounts.as_ref() != Some(&accounts);
        if accounts_changed {
            events.push(WalletEvent::AccountsChanged(accounts.clone()));
            self.observed.accounts = Some(accounts);
        }

        if chain_changed || accounts_changed {
            let eip1559 = self.provider.supports_eip1559().await?;
            if self.observed.eip1559 != Some(eip1559) {
                events.push(WalletEvent::Eip1559Support(eip1559));
                self.observed.eip1559 = Some(eip1559);
            }
        }

        for event in &events {
            self.dispatcher.emit(event.clone());
        }
        Ok(events)
    }

    /// `shutdown` が完了するまで定期取得を続ける。取得エラーはログに残して継続する。
    pub async fn run<F>(mut self, shutdown: F)
    where
        F: Future<Output = ()> + Send,
    {
        let mut ticker = tokio::time::interval(self.interval);
        tokio::pin!(shutdown);
        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    tracing::info!("ウォレット監視を終了します");
                    return;
                }
                _ = ticker.tick() => {
                    if let Err(e) = self.poll_once().await {
                        tracing::warn!(error = %e, "ウォレット状態の取得に失敗");
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    /// 状態を書き換えられるモックプロバイダ
    struct MockWallet {
        chain_id: Mutex<String>,
        accounts: Mutex<Vec<String>>,
    }

    #[async_trait::async_trait]
    impl WalletProvider for MockWallet {
        async fn request(
            &self,
            method: &str,
            _params: serde_json::Value,
        ) -> Result<serde_json::Value, WalletError> {
            match method {
                "eth_chainId" => Ok(serde_json::json!(self.chain_id.lock().unwrap().clone())),
                "net_version" => Ok(serde_json::json!("1338")),
                "eth_accounts" => Ok(serde_json::json!(self.accounts.lock().unwrap().clone())),
                "eth_getBlockByNumber" => Ok(serde_json::json!({"number": "0x1"})),
                other => Err(WalletError::Rpc {
                    code: -32601,
                    message: format!("unsupported: {other}"),
                }),
            }
        }
    }

    #[tokio::test]
    async fn test_watcher_emits_only_on_change() {
        let wallet = Arc::new(MockWallet {
            chain_id: Mutex::new("0x53a".to_string()),
            accounts: Mutex::new(vec![]),
        });
        let dispatcher = EventDispatcher::default();
        let mut rx = dispatcher.subscribe();
        let mut watcher =
            WalletWatcher::new(wallet.clone(), dispatcher, Duration::from_millis(10));

        // 初回は全項目が通知される
        let first = watcher.poll_once().await.unwrap();
        assert_eq!(
            first,
            vec![
                WalletEvent::ChainChanged {
                    chain_id: "0x53a".to_string(),
                    mainnet: false
                },
                WalletEvent::NetworkChanged("1338".to_string()),
                WalletEvent::AccountsChanged(vec![]),
                WalletEvent::Eip1559Support(false),
            ]
        );
        assert_eq!(rx.recv().await.unwrap(), first[0]);

        // 変化がなければ何も通知されない
        assert!(watcher.poll_once().await.unwrap().is_empty());

        // メインネットへの切り替えとアカウント接続
        *wallet.chain_id.lock().unwrap() = "0x1".to_string();
        *wallet.accounts.lock().unwrap() = vec!["0xabc".to_string()];
        let changed = watcher.poll_once().await.unwrap();
        assert_eq!(
            changed,
            vec![
                WalletEvent::ChainChanged {
                    chain_id: "0x1".to_string(),
                    mainnet: true
                },
                WalletEvent::AccountsChanged(vec!["0xabc".to_string()]),
            ]
        );
    }

    #[test]
    fn test_emit_without_subscribers() {
        let dispatcher = EventDispatcher::default();
        assert_eq!(dispatcher.emit(WalletEvent::NetworkChanged("1".to_string())), 0);
    }

    #[tokio::test]
    async fn test_run_stops_on_shutdown() {
        let wallet = Arc::new(MockWallet {
            chain_id: Mutex::new("0x53a".to_string()),
            accounts: Mutex::new(vec![]),
        });
        let dispatcher = EventDispatcher::default();
        let mut rx = dispatcher.subscribe();
        let watcher = WalletWatcher::new(wallet, dispatcher, Duration::from_millis(10));

        let (tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();
        let handle = tokio::spawn(watcher.run(async move {
            let _ = shutdown_rx.await;
        }));

        assert!(matches!(
            rx.recv().await.unwrap(),
            WalletEvent::ChainChanged { .. }
        ));
        tx.send(()).unwrap();
        handle.await.unwrap();
    }
}
