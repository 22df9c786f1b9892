//! Connection Tests
//!
//! Transport and protocol failure handling, request ids and cancellation.

#[path = "../common/mod.rs"]
mod common;

use std::io::Write;
use std::net::TcpListener;
use std::thread;
use std::time::{Duration, Instant};

use common::{client_for, spawn_fixed_responder, spawn_raw, swallow_request, TestServer};
use waddlemap::correlator::{IdGenerator, RequestId, SequentialGenerator};
use waddlemap::protocol::{encode_response, Response, ResponseResult};
use waddlemap::transport::{write_frame, DEFAULT_MAX_FRAME_SIZE};
use waddlemap::{Client, ClientConfig, WaddleError};

// =============================================================================
// Helper Functions
// =============================================================================

/// Swallow one request, write `reply` verbatim, then hang up
fn reply_raw(reply: &'static [u8]) -> std::net::SocketAddr {
    spawn_raw(move |mut stream| {
        if swallow_request(&mut stream) {
            let _ = stream.write_all(reply);
            let _ = stream.flush();
        }
    })
}

/// Swallow requests and never answer
fn silent_server() -> std::net::SocketAddr {
    spawn_raw(|mut stream| {
        while swallow_request(&mut stream) {}
    })
}

// =============================================================================
// Transport Failure Tests
// =============================================================================

#[test]
fn test_truncated_response_is_connection_closed() {
    // Declares 100 bytes, sends 3, closes
    let addr = reply_raw(&[0x00, 0x00, 0x00, 0x64, 1, 2, 3]);
    let mut client = client_for(addr);

    let err = client.get_keys().unwrap_err();
    assert!(matches!(err, WaddleError::ConnectionClosed), "{:?}", err);
    assert!(err.is_transport());
    assert!(client.is_closed());

    // The connection is not reused
    assert!(matches!(client.get_keys(), Err(WaddleError::ConnectionClosed)));
}

#[test]
fn test_server_hangs_up_before_answering() {
    let addr = spawn_raw(|mut stream| {
        swallow_request(&mut stream);
    });
    let mut client = client_for(addr);

    assert!(matches!(client.list_collections(), Err(WaddleError::ConnectionClosed)));
}

#[test]
fn test_read_timeout() {
    let addr = silent_server();
    let config = ClientConfig::builder()
        .addr(addr.to_string())
        .read_timeout_ms(200)
        .build();
    let mut client = Client::connect(config).unwrap();

    let started = Instant::now();
    let err = client.get_length("k").unwrap_err();
    assert!(matches!(err, WaddleError::Timeout), "{:?}", err);
    assert!(started.elapsed() < Duration::from_secs(5));

    // A late answer could be mistaken for the next one, so the client gives up
    assert!(client.is_closed());
}

#[test]
fn test_connect_refused() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let err = Client::connect_addr(addr.to_string()).err().unwrap();
    assert!(err.is_transport(), "{:?}", err);
}

// =============================================================================
// Protocol Failure Tests
// =============================================================================

#[test]
fn test_garbage_response_is_protocol_error() {
    let addr = spawn_raw(|mut stream| {
        if swallow_request(&mut stream) {
            let _ = write_frame(&mut stream, &[0xFF, 0xFF, 0xFF], DEFAULT_MAX_FRAME_SIZE);
            thread::sleep(Duration::from_secs(1));
        }
    });
    let mut client = client_for(addr);

    let err = client.get_keys().unwrap_err();
    assert!(matches!(err, WaddleError::Protocol(_)), "{:?}", err);
    assert!(err.is_protocol());
    assert!(client.is_closed());
}

#[test]
fn test_oversized_response_length() {
    let addr = reply_raw(&[0xFF, 0xFF, 0xFF, 0xFF]);
    let mut client = client_for(addr);

    let err = client.get_keys().unwrap_err();
    assert!(matches!(err, WaddleError::FrameTooLarge { .. }), "{:?}", err);
    assert!(client.is_closed());
}

#[test]
fn test_mismatched_result_variant() {
    let addr = spawn_fixed_responder(Response::ok(
        RequestId::NIL,
        Some(ResponseResult::KeyList(vec!["x".to_string()])),
    ));
    let mut client = client_for(addr);

    match client.collection("docs").get_block("k", 0) {
        Err(WaddleError::UnexpectedResult { operation, received }) => {
            assert_eq!(operation, "get_block");
            assert_eq!(received, "key_list");
        }
        other => panic!("Expected UnexpectedResult, got {:?}", other),
    }
    assert!(client.is_closed());
}

#[test]
fn test_relative_read_with_too_many_blocks() {
    let block = waddlemap::BlockData::new("b");
    let addr = spawn_fixed_responder(Response::ok(
        RequestId::NIL,
        Some(ResponseResult::BlockList(vec![block.clone(), block.clone(), block])),
    ));
    let mut client = client_for(addr);

    let err = client.collection("docs").get_next_block("k", 0).unwrap_err();
    assert!(err.is_protocol(), "{:?}", err);
}

#[test]
fn test_oversized_request_keeps_connection() {
    let server = TestServer::start();
    let config = ClientConfig::builder()
        .addr(server.addr())
        .max_frame_size(256)
        .build();
    let mut client = Client::connect(config).unwrap();

    let err = client.add_value("k", vec![0u8; 1024]).unwrap_err();
    assert!(matches!(err, WaddleError::FrameTooLarge { max: 256, .. }), "{:?}", err);

    // Nothing was sent, so the connection is still good
    assert!(!client.is_closed());
    assert_eq!(client.get_length("k").unwrap(), 0);
}

#[test]
fn test_invalid_frame_limit_rejected() {
    let config = ClientConfig::builder().max_frame_size(0).build();
    let err = Client::connect(config).err().unwrap();
    assert!(matches!(err, WaddleError::Config(_)));
}

// =============================================================================
// Application Error Tests
// =============================================================================

#[test]
fn test_application_error_keeps_connection() {
    let addr = spawn_fixed_responder(Response::error(RequestId::NIL, "collection \"x\" not found"));
    let mut client = client_for(addr);

    let err = client.list_collections().unwrap_err();
    assert!(err.is_not_found());
    assert!(!err.is_transport());
    assert!(!client.is_closed());

    // Same connection, next request
    assert!(client.list_collections().unwrap_err().is_not_found());
}

#[test]
fn test_response_with_foreign_request_id_is_accepted() {
    let addr = spawn_raw(|mut stream| {
        if swallow_request(&mut stream) {
            let response = Response::ok(
                RequestId::from_bytes([7u8; 16]),
                Some(ResponseResult::Length(3)),
            );
            let payload = encode_response(&response).unwrap();
            let _ = write_frame(&mut stream, &payload, DEFAULT_MAX_FRAME_SIZE);
            thread::sleep(Duration::from_secs(1));
        }
    });
    let mut client = client_for(addr);
    assert_eq!(client.get_length("k").unwrap(), 3);
}

// =============================================================================
// Request Id Tests
// =============================================================================

#[test]
fn test_request_ids_are_fresh() {
    let server = TestServer::start();
    let mut client = server.client();
    for _ in 0..5 {
        client.get_keys().unwrap();
    }

    let mut ids = server.request_ids();
    assert_eq!(ids.len(), 5);
    assert!(ids.iter().all(|id| !id.is_nil()));
    ids.sort_by_key(|id| *id.as_bytes());
    ids.dedup();
    assert_eq!(ids.len(), 5);
}

#[test]
fn test_custom_id_generator() {
    let server = TestServer::start();
    let mut client = server.client().with_id_generator(SequentialGenerator::starting_at(100));
    client.get_keys().unwrap();
    client.check_key("a").unwrap();
    client.get_length("a").unwrap();

    let mut expected = SequentialGenerator::starting_at(100);
    let expected: Vec<RequestId> = (0..3).map(|_| expected.next_id()).collect();
    assert_eq!(server.request_ids(), expected);
}

// =============================================================================
// Ordering Tests
// =============================================================================

#[test]
fn test_requests_answered_in_order() {
    let server = TestServer::start();
    let mut client = server.client();
    for i in 0..50u32 {
        client.add_value("seq", i.to_be_bytes().to_vec()).unwrap();
        assert_eq!(client.get_length("seq").unwrap(), u64::from(i) + 1);
    }
}

// =============================================================================
// Cancellation Tests
// =============================================================================

#[test]
fn test_shutdown_handle_unblocks_call() {
    let addr = silent_server();
    let mut client = client_for(addr);
    let handle = client.shutdown_handle().unwrap();

    let canceller = thread::spawn(move || {
        thread::sleep(Duration::from_millis(200));
        handle.shutdown().unwrap();
    });

    let started = Instant::now();
    let err = client.get_keys().unwrap_err();
    assert!(matches!(err, WaddleError::ConnectionClosed), "{:?}", err);
    assert!(started.elapsed() < Duration::from_secs(5));
    canceller.join().unwrap();

    assert!(client.is_closed());
    assert!(matches!(client.get_keys(), Err(WaddleError::ConnectionClosed)));
}

#[test]
fn test_close_is_clean() {
    let server = TestServer::start();
    let client = server.client();
    let handle = client.shutdown_handle().unwrap();
    client.close().unwrap();
    assert!(handle.is_closed());
}
