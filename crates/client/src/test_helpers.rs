//! # Fabricクライアントテスト用共通ヘルパー

/// テスト用モックFabricサーバーを起動し、ポート番号を返す。
pub async fn start_mock_fabric(app: axum::Router) -> u16 {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    port
}
