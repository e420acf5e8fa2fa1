//! # ウォレットテスト用共通ヘルパー

use std::sync::Arc;

use axum::Json;

/// メソッド名とパラメータから結果（またはエラーコードとメッセージ）を返すハンドラ
pub type RpcHandler =
    dyn Fn(&str, &serde_json::Value) -> Result<serde_json::Value, (i64, String)> + Send + Sync;

/// テスト用モックJSON-RPCサーバーを起動し、ポート番号を返す。
pub async fn start_mock_rpc<F>(handler: F) -> u16
where
    F: Fn(&str, &serde_json::Value) -> Result<serde_json::Value, (i64, String)>
        + Send
        + Sync
        + 'static,
{
    let handler: Arc<RpcHandler> = Arc::new(handler);

    let app = axum::Router::new().route(
        "/",
        axum::routing::post(move |Json(body): Json<serde_json::Value>| {
            let handler = handler.clone();
            async move {
                assert_eq!(body["jsonrpc"], "2.0");
                let method = body["method"].as_str().unwrap_or_default().to_string();
                let id = body["id"].clone();
                let response = match handler(&method, &body["params"]) {
                    Ok(result) => serde_json::json!({"jsonrpc": "2.0", "id": id, "result": result}),
                    Err((code, message)) => serde_json::json!({
                        "jsonrpc": "2.0",
                        "id": id,
                        "error": {"code": code, "message": message},
                    }),
                };
                Json(response)
            }
        }),
    );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    port
}
