//! `HttpProvider` against a local mock JSON-RPC endpoint.

use mockito::Matcher;
use serde_json::json;

use chainrelay_core::{
    ConnectionStatus, JsonRpcRequest, RequestOptions, RpcId, TransportError, TransportProvider,
};
use chainrelay_http::HttpProvider;

fn block_number() -> JsonRpcRequest {
    JsonRpcRequest::new(1, "eth_blockNumber", vec![])
}

#[tokio::test]
async fn successful_response_is_decoded() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/")
        .match_body(Matcher::PartialJson(json!({ "method": "eth_blockNumber", "id": 1 })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"jsonrpc":"2.0","id":1,"result":"0x12a05f200"}"#)
        .create_async()
        .await;

    let provider = HttpProvider::default_for(server.url()).unwrap();
    let resp = provider.request(block_number(), None).await.unwrap();

    assert_eq!(resp.id, RpcId::Number(1));
    assert_eq!(resp.result, Some(json!("0x12a05f200")));
    mock.assert_async().await;
}

#[tokio::test]
async fn too_many_requests_keeps_status_code() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/")
        .with_status(429)
        .with_body("slow down")
        .create_async()
        .await;

    let provider = HttpProvider::default_for(server.url()).unwrap();
    let err = provider.request(block_number(), None).await.unwrap_err();

    assert_eq!(err.code(), Some(429));
    assert!(matches!(err, TransportError::HttpStatus { status: 429, ref body } if body == "slow down"));
    mock.assert_async().await;
}

#[tokio::test]
async fn request_options_headers_are_sent() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/")
        .match_header("x-api-key", "secret")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"jsonrpc":"2.0","id":1,"result":"0x1"}"#)
        .create_async()
        .await;

    let provider = HttpProvider::default_for(server.url()).unwrap();
    let opts = RequestOptions::default().with_header("x-api-key", "secret");
    provider.request(block_number(), Some(opts)).await.unwrap();
    mock.assert_async().await;
}

#[tokio::test]
async fn node_errors_come_back_in_the_response() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"jsonrpc":"2.0","id":1,"error":{"code":-32601,"message":"method not found"}}"#)
        .create_async()
        .await;

    let provider = HttpProvider::default_for(server.url()).unwrap();
    let resp = provider.request(block_number(), None).await.unwrap();
    assert_eq!(resp.into_result().unwrap_err().code, -32601);
}

#[tokio::test]
async fn undecodable_success_body_is_a_deserialization_error() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/")
        .with_status(200)
        .with_header("content-type", "text/html")
        .with_body("<html>gateway maintenance</html>")
        .create_async()
        .await;

    let provider = HttpProvider::default_for(server.url()).unwrap();
    let err = provider.request(block_number(), None).await.unwrap_err();
    assert!(matches!(err, TransportError::Deserialization(_)), "got {err:?}");
}

#[tokio::test]
async fn unreachable_endpoint_is_an_http_error() {
    let provider = HttpProvider::default_for("http://127.0.0.1:1").unwrap();
    let err = provider.request(block_number(), None).await.unwrap_err();
    assert!(matches!(err, TransportError::Http(_)));
    assert_eq!(err.code(), None);
}

#[test]
fn http_provider_has_no_optional_capabilities() {
    let provider = HttpProvider::default_for("https://rpc.example").unwrap();
    assert_eq!(provider.status(), ConnectionStatus::Connected);
    assert!(!provider.supports_subscriptions());
    assert!(provider.events().is_none());
    assert!(provider.lifecycle().is_none());
    assert_eq!(provider.url(), "https://rpc.example");
}
