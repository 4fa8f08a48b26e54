// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use serde_json::json;
use std::time::Duration;
use tokio::io::BufReader;

const TIMEOUT: Duration = Duration::from_secs(1);

#[tokio::test]
async fn read_single_request() {
    let data = b"{\"jsonrpc\":\"2.0\",\"id\":1,\"method\":\"ping\"}\n" as &[u8];
    let mut reader = BufReader::new(data);
    let request = read_request(&mut reader, TIMEOUT).await.unwrap().unwrap();
    assert_eq!(request.method, "ping");
    assert_eq!(request.id, Some(RpcId::Number(1)));
    assert!(!request.is_notification());
}

#[tokio::test]
async fn read_notification() {
    let data = b"{\"jsonrpc\":\"2.0\",\"method\":\"tick\"}\n" as &[u8];
    let mut reader = BufReader::new(data);
    let request = read_request(&mut reader, TIMEOUT).await.unwrap().unwrap();
    assert!(request.is_notification());
}

#[tokio::test]
async fn garbage_line_yields_none() {
    let data = b"this is not json\n" as &[u8];
    let mut reader = BufReader::new(data);
    let request = read_request(&mut reader, TIMEOUT).await.unwrap();
    assert!(request.is_none());
}

#[tokio::test]
async fn eof_is_connection_closed() {
    let data = b"" as &[u8];
    let mut reader = BufReader::new(data);
    let err = read_request(&mut reader, TIMEOUT).await.unwrap_err();
    assert!(matches!(err, ProtocolError::ConnectionClosed));
}

#[tokio::test]
async fn oversized_line_is_rejected() {
    let mut data = vec![b'a'; MAX_LINE_BYTES + 16];
    data.push(b'\n');
    let mut reader = BufReader::new(data.as_slice());
    let err = read_request(&mut reader, TIMEOUT).await.unwrap_err();
    assert!(matches!(err, ProtocolError::Oversized));
}

#[tokio::test]
async fn unterminated_line_stops_at_the_cap() {
    // No newline at all: the read must stop at the cap and error, not
    // buffer the whole thing.
    let data = vec![b'a'; 4 * MAX_LINE_BYTES];
    let mut reader = BufReader::new(data.as_slice());
    let err = read_request(&mut reader, TIMEOUT).await.unwrap_err();
    assert!(matches!(err, ProtocolError::Oversized));
}

#[tokio::test]
async fn payload_at_the_cap_is_accepted() {
    // Exactly MAX_LINE_BYTES of payload plus the newline decodes
    // (to None here, since it is not valid JSON-RPC).
    let mut data = vec![b'a'; MAX_LINE_BYTES];
    data.push(b'\n');
    let mut reader = BufReader::new(data.as_slice());
    let request = read_request(&mut reader, TIMEOUT).await.unwrap();
    assert!(request.is_none());
}

#[tokio::test]
async fn write_is_newline_terminated() {
    let mut out = Vec::new();
    let response = RpcResponse::result(Some(RpcId::Number(1)), json!({"status": "ok"}));
    write_response(&mut out, &response).await.unwrap();
    assert!(out.ends_with(b"\n"));
    // Exactly one line.
    assert_eq!(out.iter().filter(|&&b| b == b'\n').count(), 1);

    let decoded: RpcResponse = serde_json::from_slice(&out[..out.len() - 1]).unwrap();
    assert_eq!(decoded, response);
}

#[test]
fn error_response_shape() {
    let response = RpcResponse::error(
        Some(RpcId::String("abc".to_string())),
        RpcError::method_not_found("bogus"),
    );
    let value = serde_json::to_value(&response).unwrap();
    assert_eq!(value["error"]["code"], ERR_METHOD_NOT_FOUND);
    assert_eq!(value["error"]["message"], "unknown method: bogus");
    assert!(value.get("result").is_none());
}

#[test]
fn parse_params_maps_to_invalid_params() {
    #[derive(Debug, serde::Deserialize)]
    struct Params {
        #[allow(dead_code)]
        name: String,
    }

    let request = RpcRequest::new(1, "x", Some(json!({"name": 42})));
    let err = request.parse_params::<Params>().unwrap_err();
    assert_eq!(err.code, ERR_INVALID_PARAMS);

    let request = RpcRequest::new(1, "x", None);
    let err = request.parse_params::<Params>().unwrap_err();
    assert_eq!(err.code, ERR_INVALID_PARAMS);
}

#[yare::parameterized(
    parse = { ERR_PARSE, -32700 },
    invalid_request = { ERR_INVALID_REQUEST, -32600 },
    method_not_found = { ERR_METHOD_NOT_FOUND, -32601 },
    invalid_params = { ERR_INVALID_PARAMS, -32602 },
    internal = { ERR_INTERNAL, -32603 },
)]
fn error_codes(code: i64, expected: i64) {
    assert_eq!(code, expected);
}
