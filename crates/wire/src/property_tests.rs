// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Property tests for the JSON-RPC envelopes.

use crate::{RpcError, RpcId, RpcRequest, RpcResponse};
use proptest::prelude::*;
use serde_json::json;

fn arb_id() -> impl Strategy<Value = RpcId> {
    prop_oneof![
        any::<i64>().prop_map(RpcId::Number),
        "[a-zA-Z0-9-]{1,24}".prop_map(RpcId::String),
    ]
}

proptest! {
    #[test]
    fn request_round_trip(
        id in proptest::option::of(arb_id()),
        method in "[a-z_.]{1,32}",
        has_params in any::<bool>(),
    ) {
        let request = RpcRequest {
            jsonrpc: "2.0".to_string(),
            id,
            method,
            params: has_params.then(|| json!({"k": "v"})),
        };
        let line = serde_json::to_string(&request).unwrap();
        let back: RpcRequest = serde_json::from_str(&line).unwrap();
        prop_assert_eq!(back, request);
    }

    #[test]
    fn response_round_trip(
        id in proptest::option::of(arb_id()),
        is_error in any::<bool>(),
        code in -32700i64..=-32000,
        message in "[ -~]{0,64}",
    ) {
        let response = if is_error {
            RpcResponse::error(id, RpcError::new(code, message))
        } else {
            RpcResponse::result(id, json!({"ok": true}))
        };
        let line = serde_json::to_string(&response).unwrap();
        let back: RpcResponse = serde_json::from_str(&line).unwrap();
        prop_assert_eq!(back, response);
    }

    #[test]
    fn response_never_carries_both(
        id in proptest::option::of(arb_id()),
    ) {
        let ok = RpcResponse::result(id.clone(), json!(1));
        prop_assert!(ok.error.is_none());
        let err = RpcResponse::error(id, RpcError::internal("x"));
        prop_assert!(err.result.is_none());
    }
}
