// Copyright (c) Argument Computer Corporation
// SPDX-License-Identifier: Apache-2.0

use reqwest::StatusCode;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use supply_chain_core::crypto::hash::HashValue;
use supply_chain_toolkit::client::ProofServerClient;
use supply_chain_toolkit::server::serve;
use supply_chain_toolkit::service::ProofService;
use tokio::io::AsyncWriteExt;
use tokio::net::{TcpListener, TcpStream};

const ROOT: &str = "0xd7c266b39bce7003ef91fd9187b926a19abc1aee7ff0499974436876b52f71e6";
const MEMBER: &str = "0x70997970C51812dc3A010C7d01b50e0d17dc79C8";
const UNKNOWN: &str = "0x0000000000000000000000000000000000000001";

async fn start_server() -> (SocketAddr, ProofServerClient) {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("test-assets")
        .join("tree.json");
    let service = Arc::new(ProofService::from_file(path).unwrap());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap();
    tokio::spawn(serve(listener, service));

    let client = ProofServerClient::new(&address.to_string());
    client.test_endpoint().await.unwrap();
    (address, client)
}

async fn get_status(address: SocketAddr, path: &str) -> StatusCode {
    reqwest::get(format!("http://{address}{path}"))
        .await
        .unwrap()
        .status()
}

async fn post_verify(address: SocketAddr, body: String) -> StatusCode {
    reqwest::Client::new()
        .post(format!("http://{address}/verify"))
        .header("content-type", "application/json")
        .body(body)
        .send()
        .await
        .unwrap()
        .status()
}

/// Polls `/ready` until it answers `expected`, failing after a few seconds.
async fn wait_for_readiness(client: &ProofServerClient, expected: bool) {
    for _ in 0..100 {
        if client.is_ready().await.unwrap() == expected {
            return;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    panic!("server never reported ready = {expected}");
}

#[tokio::test]
async fn test_root_and_proof() {
    let (_, client) = start_server().await;

    let root = client.root().await.unwrap();
    assert_eq!(root.to_hex(), ROOT);
    assert!(client.is_ready().await.unwrap());

    let proof = client.proof(&MEMBER.to_lowercase()).await.unwrap().unwrap();
    assert_eq!(proof.index(), 2);
    assert_eq!(proof.value(), &vec![serde_json::Value::from(MEMBER)]);
    assert_eq!(proof.proof().len(), 3);

    assert!(client
        .verify(None, proof.value().clone(), proof.proof().clone())
        .await
        .unwrap());
    assert!(client
        .verify(Some(root), proof.value().clone(), proof.proof().clone())
        .await
        .unwrap());
    assert!(!client
        .verify(
            Some(HashValue::new([0; 32])),
            proof.value().clone(),
            proof.proof().clone()
        )
        .await
        .unwrap());
}

#[tokio::test]
async fn test_unknown_and_malformed_addresses() {
    let (address, client) = start_server().await;

    assert!(client.proof(UNKNOWN).await.unwrap().is_none());
    assert!(client.proof("not-an-address").await.is_err());

    let member = get_status(address, &format!("/proof/{MEMBER}")).await;
    assert_eq!(member, StatusCode::OK);
    let unknown = get_status(address, &format!("/proof/{UNKNOWN}")).await;
    assert_eq!(unknown, StatusCode::NOT_FOUND);
    let malformed = get_status(address, "/proof/not-an-address").await;
    assert_eq!(malformed, StatusCode::BAD_REQUEST);
    let truncated = get_status(address, "/proof/0x1234").await;
    assert_eq!(truncated, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_verify_rejects_malformed_body() {
    let (address, client) = start_server().await;
    let root = client.root().await.unwrap();
    let member = client.proof(MEMBER).await.unwrap().unwrap();

    // A proof for one member does not hold for another.
    let other = vec![serde_json::Value::from("0x90F79bf6EB2c4f870365E785982E1f101E93b906")];
    assert!(!client
        .verify(Some(root), other, member.proof().clone())
        .await
        .unwrap());

    // A leaf that is not an address is rejected.
    assert!(client
        .verify(None, vec![serde_json::Value::from(42)], member.proof().clone())
        .await
        .is_err());

    let proof = serde_json::to_string(member.proof()).unwrap();
    let not_an_address = format!(r#"{{"value":[42],"proof":{proof}}}"#);
    assert_eq!(
        post_verify(address, not_an_address).await,
        StatusCode::BAD_REQUEST
    );
    let cut = r#"{"value":["#.to_string();
    assert_eq!(post_verify(address, cut).await, StatusCode::BAD_REQUEST);
    let valid = format!(r#"{{"value":["{MEMBER}"],"proof":{proof}}}"#);
    assert_eq!(post_verify(address, valid).await, StatusCode::OK);
}

#[tokio::test]
async fn test_ready_conflicts_while_busy() {
    let (address, client) = start_server().await;
    assert!(client.is_ready().await.unwrap());

    // Headers announce a body that is not sent yet, which keeps the request in flight.
    let mut pending = TcpStream::connect(address).await.unwrap();
    pending
        .write_all(
            b"POST /verify HTTP/1.1\r\nHost: localhost\r\nContent-Type: application/json\r\n\
              Content-Length: 100\r\n\r\n",
        )
        .await
        .unwrap();
    pending.flush().await.unwrap();

    wait_for_readiness(&client, false).await;
    assert_eq!(get_status(address, "/ready").await, StatusCode::CONFLICT);
    assert_eq!(get_status(address, "/health").await, StatusCode::OK);

    // Completing the body lets the request finish, as a bad request.
    pending.write_all(&[b' '; 100]).await.unwrap();
    pending.flush().await.unwrap();
    wait_for_readiness(&client, true).await;
}
