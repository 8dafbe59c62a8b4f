//! Runs the full client walk against a live server and checks the output.

#![allow(clippy::unwrap_used)] // unwrap is acceptable in tests

use std::net::SocketAddr;
use std::time::Duration;

use greeter_client::{ConnectError, Driver, UNEXPECTED_ERROR};
use greeter_grpc::{GreeterServer, HealthRegistry, ServerConfig};

async fn start_server(config: ServerConfig) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        let result = GreeterServer::new(config, HealthRegistry::new())
            .serve_with_listener(listener, std::future::pending())
            .await;
        eprintln!("[TEST] Server task ended: {:?}", result);
    });

    // Give the server a moment to start
    tokio::time::sleep(Duration::from_millis(50)).await;
    addr
}

async fn run_walk(config: ServerConfig) -> (usize, String) {
    let addr = start_server(config).await;
    let mut driver = Driver::connect(&format!("http://{addr}"), Vec::new())
        .await
        .unwrap();

    let failures = tokio::time::timeout(Duration::from_secs(10), driver.run())
        .await
        .unwrap()
        .unwrap();
    let output = String::from_utf8(driver.into_output()).unwrap();
    (failures, output)
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn full_walk_prints_every_section() {
    let (failures, output) = run_walk(ServerConfig::default()).await;
    eprintln!("{output}");
    assert_eq!(failures, 0);

    assert!(output.contains("----------- Health Check -----------\nstatus: SERVING\n"));

    // Unary with metadata
    assert!(output.contains("message: Hello, damian!\nis_welcome: false\n"));
    assert!(output.contains("metadata\n"));
    assert!(output.lines().any(|line| line == "retry false"));

    // Structured error
    assert!(output.contains("----------- rpc failed -----------"));
    assert!(output.contains("  field: \"name\"\n"));
    assert!(output.contains("  description: \"name 'anonymous' is invalid.\"\n"));
    assert!(!output.contains(UNEXPECTED_ERROR));

    assert!(output.contains("message: Hello again, damian!\n"));

    // Four streamed replies, all welcoming hyemi
    assert_eq!(output.matches("----------- Unary-Streaming -----------").count(), 4);
    for text in ["one", "two", "three", "four"] {
        assert!(output.contains(&format!("message: {text}\nis_welcome: true\n")));
    }

    assert!(output.contains("message: Hello everyone!, jam, ham, tam\nis_welcome: true\n"));

    assert_eq!(output.matches("----------- Streaming-Streaming -----------").count(), 3);
    for name in ["jam1", "jam2", "jam3"] {
        assert!(output.contains(&format!("message: Hello, {name}!\n")));
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn failed_call_does_not_stop_the_walk() {
    let config = ServerConfig {
        health: false,
        log_requests: true,
        ..Default::default()
    };
    let (failures, output) = run_walk(config).await;

    assert_eq!(failures, 1);
    assert!(!output.contains("Health Check"));
    assert!(output.contains("message: Hello everyone!, jam, ham, tam\n"));
    assert_eq!(output.matches("----------- Streaming-Streaming -----------").count(), 3);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn malformed_address_is_rejected() {
    let err = Driver::connect("not a uri", Vec::new()).await.unwrap_err();
    assert!(matches!(err, ConnectError::InvalidAddress { ref addr, .. } if addr == "not a uri"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn unreachable_server_is_a_transport_error() {
    // Bind then drop to get a port nobody listens on.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let err = Driver::connect(&format!("http://{addr}"), Vec::new())
        .await
        .unwrap_err();
    assert!(matches!(err, ConnectError::Transport(_)));
}
