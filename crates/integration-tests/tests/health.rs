mod harness;

use harness::config::ConfigBuilder;
use harness::mock_tts::{Behavior, MockTts};
use harness::server::TestServer;

#[tokio::test]
async fn health_endpoint_returns_ok() {
    let mock = MockTts::start(&[]).await.unwrap();
    let config = ConfigBuilder::new(&mock.base_url()).build();

    let server = TestServer::start(config).await.unwrap();

    let resp = server.client().get(server.url("/health")).send().await.unwrap();

    assert_eq!(resp.status(), 200);

    let json: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(json, serde_json::json!({ "status": "healthy" }));
}

#[tokio::test]
async fn health_endpoint_disabled() {
    let mock = MockTts::start(&[]).await.unwrap();
    let config = ConfigBuilder::new(&mock.base_url()).without_health().build();

    let server = TestServer::start(config).await.unwrap();

    let resp = server.client().get(server.url("/health")).send().await.unwrap();

    assert_eq!(resp.status(), 404);
}

#[tokio::test]
async fn root_describes_service() {
    let mock = MockTts::start(&[("key-1", Behavior::Ok)]).await.unwrap();
    let config = ConfigBuilder::new(&mock.base_url())
        .with_account("account_1", "key-1")
        .with_account("account_2", "")
        .build();

    let server = TestServer::start(config).await.unwrap();

    let resp = server.client().get(server.url("/")).send().await.unwrap();
    assert_eq!(resp.status(), 200);

    let json: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(json["status"], "online");
    assert_eq!(json["provider"], "elevenlabs");
    assert_eq!(json["endpoint"], "/tts");
    // Blank keys are skipped at load
    assert_eq!(json["accounts"], 1);
}
