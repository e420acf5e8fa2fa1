//! # 操作フロー
//!
//! ## インジェスト
//! 1. ライブラリにContent Objectを作成（`createContent`）
//! 2. ブロックチェーンへの反映を待つ
//! 3. `updateRequest` を送り、そのトランザクションハッシュで編集トークンを作る
//! 4. 編集トークンを静的トークンに設定して編集を開始
//! 5. ファイルをアップロード

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use anyhow::Context as _;

use fabric_client::{format_progress, ProgressCallback, UploadFile};
use fabric_types::{ObjectInfo, UploadProgress};
use fabric_wallet::chain::{demo_chain_params, is_mainnet, DEMO_CHAIN_ID};
use fabric_wallet::{WalletApi, WalletEvent, WalletWatcher};

use crate::context::AppContext;

/// 現在のアカウントを解決する。未接続なら接続を要求する。
pub async fn current_address(ctx: &AppContext) -> anyhow::Result<String> {
    let mut accounts = ctx.wallet.accounts().await?;
    if accounts.is_empty() {
        accounts = ctx.wallet.request_accounts().await?;
    }
    accounts
        .into_iter()
        .next()
        .context("ウォレットにアカウントがありません")
}

/// `updateRequest` を送り、その証跡で編集リクエストトークンを作る。
pub async fn create_edit_token(
    ctx: &AppContext,
    address: &str,
    object_id: &str,
) -> anyhow::Result<String> {
    let session = ctx.fabric()?;
    let update = ctx.contracts.update_request(address, object_id).await?;
    let token = fabric_token::create_edit_token(
        ctx.signer.as_ref(),
        address,
        &update.transaction_hash,
        &session.content_space_id,
        &ctx.config.library_id,
    )
    .await?;
    tracing::info!(object_id, tx = %update.transaction_hash, "編集トークンを作成しました");
    Ok(token)
}

/// 現在時刻から `duration` 有効なクライアント署名トークンを作る。
pub async fn create_client_signed_token(
    ctx: &AppContext,
    address: &str,
    duration: Duration,
) -> anyhow::Result<String> {
    let session = ctx.fabric()?;
    let issued_at_ms = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .context("システム時刻が不正です")?
        .as_millis();
    let issued_at_ms = u64::try_from(issued_at_ms).context("システム時刻が範囲外です")?;
    let duration_ms = u64::try_from(duration.as_millis()).context("有効期間が大きすぎます")?;

    let token = fabric_token::create_client_signed_token(
        ctx.signer.as_ref(),
        address,
        &session.content_space_id,
        issued_at_ms,
        duration_ms,
    )
    .await?;
    Ok(token)
}

/// オブジェクトの最新ハッシュ・タイプ・メタデータを取得する。
pub async fn object_info(
    ctx: &AppContext,
    library_id: &str,
    object_id: &str,
) -> anyhow::Result<ObjectInfo> {
    let api = &ctx.fabric()?.api;
    let object = api.content_object(library_id, object_id).await?;
    let metadata = api.content_object_metadata(library_id, object_id).await?;
    Ok(ObjectInfo {
        object_id: object.id,
        latest_hash: object.hash,
        content_type: object.content_type,
        metadata,
    })
}

/// インジェストの結果。
#[derive(Debug, Clone)]
pub struct IngestResult {
    pub object_id: String,
    pub write_token: String,
    pub edit_token: String,
}

/// 新しいオブジェクトを作成し、ファイルをアップロードする。
pub async fn ingest(
    ctx: &AppContext,
    address: &str,
    files: &[UploadFile],
    progress: Option<ProgressCallback>,
) -> anyhow::Result<IngestResult> {
    let api = &ctx.fabric()?.api;
    let library_id = &ctx.config.library_id;

    let created = ctx
        .contracts
        .create_content_object(address, library_id, ctx.config.content_type.as_deref())
        .await?;

    let settle = ctx.config.settle_delay();
    if !settle.is_zero() {
        tracing::info!(secs = settle.as_secs(), "オブジェクトの反映を待機中");
        tokio::time::sleep(settle).await;
    }

    let edit_token = create_edit_token(ctx, address, &created.object_id).await?;
    api.set_static_token(&edit_token).await;

    let edit = api
        .edit_content_object(library_id, &created.object_id)
        .await?;
    api.upload_files(library_id, &edit.write_token, files, progress)
        .await?;

    tracing::info!(object_id = %created.object_id, "インジェストが完了しました");
    Ok(IngestResult {
        object_id: created.object_id,
        write_token: edit.write_token,
        edit_token,
    })
}

/// 設定済みオブジェクトへのトークン作成とインジェストを続けて行い、解読した静的トークンを返す。
pub async fn attach(
    ctx: &AppContext,
    files: &[UploadFile],
    progress: Option<ProgressCallback>,
) -> anyhow::Result<serde_json::Value> {
    let address = current_address(ctx).await?;
    tracing::info!(%address, "アカウントを解決しました");

    let object_token = create_edit_token(ctx, &address, &ctx.config.object_id).await?;
    tracing::debug!(token = %object_token, object_id = %ctx.config.object_id, "編集トークン");

    let result = ingest(ctx, &address, files, progress).await?;
    let decoded = fabric_token::decode_token(&result.edit_token)?;

    let mut summary = decoded.summary();
    summary["object_id"] = serde_json::json!(result.object_id);
    summary["write_token"] = serde_json::json!(result.write_token);
    Ok(summary)
}

/// 進捗をログ行として出力するコールバック。
pub fn logging_progress() -> ProgressCallback {
    std::sync::Arc::new(|progress: &UploadProgress| {
        for line in format_progress(progress) {
            println!("{line}");
        }
    })
}

/// ウォレットの状態。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalletStatus {
    pub chain_id: String,
    pub network: String,
    pub accounts: Vec<String>,
    pub eip1559: bool,
    pub mainnet: bool,
}

/// 接続を要求し、許可されたアカウントを返す。
pub async fn connect(ctx: &AppContext) -> anyhow::Result<Vec<String>> {
    match ctx.wallet.request_accounts().await {
        Ok(accounts) => {
            ctx.events
                .emit(WalletEvent::AccountsChanged(accounts.clone()));
            Ok(accounts)
        }
        Err(e) if e.is_user_rejection() => Err(anyhow::anyhow!("接続が拒否されました: {e}")),
        Err(e) => Err(e.into()),
    }
}

pub async fn accounts(ctx: &AppContext) -> anyhow::Result<Vec<String>> {
    Ok(ctx.wallet.accounts().await?)
}

pub async fn status(ctx: &AppContext) -> anyhow::Result<WalletStatus> {
    let chain_id = ctx.wallet.chain_id().await?;
    let network = ctx.wallet.net_version().await?;
    let accounts = ctx.wallet.accounts().await?;
    let eip1559 = ctx.wallet.supports_eip1559().await?;
    let mainnet = is_mainnet(&chain_id);
    if mainnet {
        tracing::warn!(%chain_id, "メインネットに接続しています");
    }
    Ok(WalletStatus {
        chain_id,
        network,
        accounts,
        eip1559,
        mainnet,
    })
}

/// ローカル開発チェーンをウォレットに追加する。
pub async fn add_chain(ctx: &AppContext) -> anyhow::Result<()> {
    ctx.wallet.add_chain(&demo_chain_params()).await?;
    Ok(())
}

/// チェーンを切り替える。省略時はローカル開発チェーン。
pub async fn switch_chain(ctx: &AppContext, chain_id: Option<&str>) -> anyhow::Result<String> {
    let chain_id = chain_id.unwrap_or(DEMO_CHAIN_ID);
    ctx.wallet.switch_chain(chain_id).await?;
    ctx.events.emit(WalletEvent::ChainChanged {
        chain_id: chain_id.to_string(),
        mainnet: is_mainnet(chain_id),
    });
    Ok(chain_id.to_string())
}

/// Ctrl-Cまでウォレット状態を監視し、変化をイベントとして表示する。
pub async fn watch(ctx: &AppContext, interval: Duration) -> anyhow::Result<()> {
    let mut receiver = ctx.events.subscribe();
    let printer = tokio::spawn(async move {
        while let Ok(event) = receiver.recv().await {
            println!("{}", render_event(&event));
        }
    });

    let watcher = WalletWatcher::new(ctx.wallet.clone(), ctx.events.clone(), interval);
    watcher
        .run(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::warn!(error = %e, "シグナル待機に失敗");
            }
        })
        .await;
    printer.abort();
    Ok(())
}

/// イベントを1行の表示にする。
pub fn render_event(event: &WalletEvent) -> String {
    match event {
        WalletEvent::ChainChanged { chain_id, mainnet } => {
            if *mainnet {
                format!("chainChanged: {chain_id} (WARNING: mainnet)")
            } else {
                format!("chainChanged: {chain_id}")
            }
        }
        WalletEvent::NetworkChanged(network) => format!("networkChanged: {network}"),
        WalletEvent::AccountsChanged(accounts) if accounts.is_empty() => {
            "accountsChanged: (not connected)".to_string()
        }
        WalletEvent::AccountsChanged(accounts) => format!("accountsChanged: {}", accounts.join(", ")),
        WalletEvent::Eip1559Support(supported) => format!("eip1559: {supported}"),
    }
}
