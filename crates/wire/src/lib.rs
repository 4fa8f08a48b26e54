// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Control-plane protocol for daemon communication.
//!
//! Wire format: line-delimited JSON-RPC 2.0. One newline-terminated
//! request per line; one newline-terminated response per request.
//! Notifications (no id) produce no response.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod methods;
mod rpc;

pub use methods::{
    CloseAllParams, ConfigShowResult, EventQueryParams, HealthSummary, LaunchNotifyParams,
    LaunchNotifyResult, LayoutParams, LazygitLaunchParams, LazygitLaunchResult, ProjectEditParams,
    ProjectSwitchParams, ProjectSwitchResult, RegistryStatsSummary, StateMismatch,
    TraceMatcherParams, TraceRefParams, ValidateStateResult, WindowIdentityParams,
    WorktreeCreateParams,
};
pub use rpc::{
    read_request, write_response, ProtocolError, RpcError, RpcId, RpcRequest, RpcResponse,
    ERR_INTERNAL, ERR_INVALID_PARAMS, ERR_INVALID_REQUEST, ERR_METHOD_NOT_FOUND, ERR_PARSE,
    MAX_LINE_BYTES,
};

#[cfg(test)]
mod property_tests;
