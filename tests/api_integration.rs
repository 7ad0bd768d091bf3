use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::routing::get;
use axum::{Json, Router};
use reqwest::Client;
use tokio::task::JoinHandle;

use zk_tx_monitor::api::{app_router, AppState};
use zk_tx_monitor::client::{EtherscanClient, ExplorerClient};
use zk_tx_monitor::dashboard::{DashboardHook, DashboardSource};
use zk_tx_monitor::network::{Network, NetworkUrls};
use zk_tx_monitor::retry::RetryPolicy;

#[tokio::test]
async fn health_endpoint_works() {
    let (hook, _) = etherscan_hook_without_key();
    let (base_url, handle) = spawn_app(&hook).await;
    let client = Client::new();
    let res = client
        .get(format!("{}/health", base_url))
        .send()
        .await
        .unwrap();
    assert!(res.status().is_success());
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body.get("status").and_then(|s| s.as_str()), Some("ok"));
    handle.abort();
}

#[tokio::test]
async fn dashboard_without_key_serves_placeholder() {
    let (hook, _) = etherscan_hook_without_key();
    tokio::time::sleep(Duration::from_millis(20)).await;
    let (base_url, handle) = spawn_app(&hook).await;

    let body: serde_json::Value = Client::new()
        .get(format!("{}/dashboard", base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body.get("live").and_then(|v| v.as_bool()), Some(false));
    assert_eq!(
        body.get("notice").and_then(|v| v.as_str()),
        Some("Etherscan API key is required")
    );
    let networks = body
        .get("networks")
        .and_then(|v| v.as_array())
        .cloned()
        .unwrap_or_default();
    assert_eq!(networks.len(), 4);
    handle.abort();
}

#[tokio::test]
async fn dashboard_serves_live_zksync_data() {
    let explorer = Router::new().route(
        "/accounts/:address/transactions",
        get(|| async {
            Json(serde_json::json!({
                "data": [
                    { "hash": "0xfeed", "from": "0xa", "value": "250000000000000000", "status": "verified", "timestamp": 1700000000 }
                ]
            }))
        }),
    );
    let (explorer_url, explorer_handle) = spawn_router(explorer).await;
    let urls = NetworkUrls {
        mainnet: explorer_url.clone(),
        testnet: explorer_url,
    };
    let client =
        ExplorerClient::with_options(Network::Mainnet, urls, RetryPolicy::no_retry()).unwrap();
    let hook = DashboardHook::start(DashboardSource::ZkSync(Arc::new(client)), "0xa");
    tokio::time::sleep(Duration::from_millis(100)).await;

    let (base_url, handle) = spawn_app(&hook).await;
    let body: serde_json::Value = Client::new()
        .get(format!("{}/dashboard", base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(body.get("live").and_then(|v| v.as_bool()), Some(true));
    assert_eq!(body.get("source").and_then(|v| v.as_str()), Some("zk_sync"));
    let recent = body
        .get("recent")
        .and_then(|v| v.as_array())
        .cloned()
        .unwrap_or_default();
    assert_eq!(recent.len(), 1);
    assert_eq!(
        recent[0].get("amount").and_then(|v| v.as_str()),
        Some("0.25 ETH")
    );
    assert_eq!(recent[0].get("type").and_then(|v| v.as_str()), Some("zk"));
    handle.abort();
    explorer_handle.abort();
}

fn etherscan_hook_without_key() -> (DashboardHook, Arc<EtherscanClient>) {
    let client = Arc::new(EtherscanClient::new(None).unwrap());
    let hook = DashboardHook::start(DashboardSource::Etherscan(client.clone()), "0xabc");
    (hook, client)
}

async fn spawn_app(hook: &DashboardHook) -> (String, JoinHandle<()>) {
    let state = AppState {
        source: hook.source(),
        dashboard: hook.handle(),
    };
    spawn_router(app_router(state)).await
}

async fn spawn_router(app: Router) -> (String, JoinHandle<()>) {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr: SocketAddr = listener.local_addr().unwrap();
    let base_url = format!("http://{}", addr);
    let server = axum::serve(listener, app);
    let handle = tokio::spawn(async move {
        let _ = server.await;
    });

    (base_url, handle)
}
