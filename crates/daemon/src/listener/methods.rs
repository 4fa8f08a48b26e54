// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Control-plane method dispatch.
//!
//! Runs on the engine's executor: the listener forwards whole requests
//! and this module executes them against `&mut Engine`. Handlers decode
//! params with `parse_params` (shape mismatch → -32602), do the work,
//! and serialize a result value.

use regex::Regex;
use serde_json::{json, Value};
use tracing::info;

use i3pm_core::{Clock, Project, WindowIdentity};
use i3pm_wire::{
    CloseAllParams, ConfigShowResult, EventQueryParams, LaunchNotifyParams, LaunchNotifyResult,
    LayoutParams, LazygitLaunchParams, LazygitLaunchResult, ProjectEditParams,
    ProjectSwitchParams, RpcError, RpcRequest, RpcResponse, TraceMatcherParams, TraceRefParams,
    WindowIdentityParams,
};

use crate::engine::Engine;
use crate::env;
use crate::ipc::SwayApi;
use crate::subproc::{launch_lazygit, Spawner, SubprocessError};
use crate::telemetry::TraceMatcher;

/// Execute one request and produce its response.
pub(crate) async fn dispatch<S, P, C>(
    engine: &mut Engine<S, P, C>,
    request: &RpcRequest,
) -> RpcResponse
where
    S: SwayApi,
    P: Spawner,
    C: Clock,
{
    let result = handle(engine, request).await;
    match result {
        Ok(value) => RpcResponse::result(request.id.clone(), value),
        Err(error) => RpcResponse::error(request.id.clone(), error),
    }
}

async fn handle<S, P, C>(
    engine: &mut Engine<S, P, C>,
    request: &RpcRequest,
) -> Result<Value, RpcError>
where
    S: SwayApi,
    P: Spawner,
    C: Clock,
{
    match request.method.as_str() {
        "ping" => Ok(json!({"status": "ok", "version": env::PROTOCOL_VERSION})),

        "health_check" => {
            engine.health.refresh_resource_usage();
            engine.health.wm_connected = engine.sway_connected();
            let mut value = serde_json::to_value(engine.health.summary())
                .map_err(internal)?;
            value["launch_registry"] =
                serde_json::to_value(engine.registry_stats().await).map_err(internal)?;
            value["performance"] =
                serde_json::to_value(engine.perf.all_stats()).map_err(internal)?;
            Ok(value)
        }

        "get_window_identity" => {
            let params: WindowIdentityParams = request.parse_params()?;
            let window = engine
                .window(params.window_id)
                .ok_or_else(|| RpcError::invalid_params(format!(
                    "window {} is not tracked",
                    params.window_id
                )))?;
            let identity =
                WindowIdentity::inspect(&window.class, &window.instance, Some(&window.title));
            Ok(json!({
                "window": window,
                "identity": identity,
                "unified_mark": window.unified_mark(),
            }))
        }

        "get_recent_events" => {
            let params: EventQueryParams = request.parse_params()?;
            if !(1..=500).contains(&params.limit) {
                return Err(RpcError::invalid_params("limit must be in 1..=500"));
            }
            let events = engine.ring.recent(params.limit, params.event_type.as_deref());
            Ok(json!({"events": events, "total_buffered": engine.ring.len()}))
        }

        "validate_state" => {
            let result = engine.validate_state().await?;
            serde_json::to_value(result).map_err(internal)
        }

        "notify_launch" => {
            let params: LaunchNotifyParams = request.parse_params()?;
            let pending = params.into_pending(0.0);
            let launch_id = engine.notify_launch(pending).await;
            serde_json::to_value(LaunchNotifyResult { launch_id }).map_err(internal)
        }

        "launch_stats" => serde_json::to_value(engine.registry_stats().await).map_err(internal),

        "project.list" => {
            let mut projects: Vec<&Project> = engine.projects_iter().collect();
            projects.sort_by(|a, b| a.name.cmp(&b.name));
            Ok(json!({"projects": projects, "quarantined": engine.quarantined_projects()}))
        }

        "project.current" => Ok(json!({"project": engine.active_project()})),

        "project.switch" => {
            let params: ProjectSwitchParams = request.parse_params()?;
            let result = engine.switch_project(params.project).await?;
            serde_json::to_value(result).map_err(internal)
        }

        "project.create" => {
            let params: ProjectEditParams = request.parse_params()?;
            engine.create_project(params).map(|p| json!({"project": p}))
        }

        "project.delete" => {
            let params: ProjectEditParams = request.parse_params()?;
            engine.delete_project(&params.name).await?;
            Ok(json!({"deleted": params.name}))
        }

        "project.edit" => {
            let params: ProjectEditParams = request.parse_params()?;
            engine.edit_project(params).map(|p| json!({"project": p}))
        }

        "project.list_repositories" => {
            let repos = engine.load_repos()?;
            serde_json::to_value(&*repos).map_err(internal)
        }

        "worktree.create" | "worktree.edit" | "worktree.delete" => {
            engine.worktree_op(&request.method, request).await
        }

        "layout.save" => {
            let params: LayoutParams = request.parse_params()?;
            let layout = required_layout(&params)?;
            let path = engine.save_layout(&params.project, layout)?;
            Ok(json!({"saved": path}))
        }

        "layout.restore" => {
            let params: LayoutParams = request.parse_params()?;
            let layout = required_layout(&params)?;
            let moved = engine.restore_layout(&params.project, layout).await?;
            Ok(json!({"windows_moved": moved}))
        }

        "layout.list" => {
            let params: LayoutParams = request.parse_params()?;
            let layouts = engine
                .layouts()
                .list(&params.project)
                .map_err(|e| RpcError::internal(e.to_string()))?;
            Ok(json!({"layouts": layouts}))
        }

        "layout.delete" => {
            let params: LayoutParams = request.parse_params()?;
            let layout = required_layout(&params)?;
            engine
                .layouts()
                .delete(&params.project, layout)
                .map_err(|e| RpcError::internal(e.to_string()))?;
            Ok(json!({"deleted": layout}))
        }

        "layout.export" => {
            let params: LayoutParams = request.parse_params()?;
            let layout = required_layout(&params)?;
            let destination = params
                .output_path
                .as_deref()
                .ok_or_else(|| RpcError::invalid_params("output_path is required"))?;
            engine
                .layouts()
                .export(&params.project, layout, destination)
                .map_err(|e| RpcError::internal(e.to_string()))?;
            Ok(json!({"exported": destination}))
        }

        "close_all" => {
            let params: CloseAllParams = request.parse_params()?;
            let closed = engine.close_all(&params.project, params.force).await?;
            Ok(json!({"closed": closed}))
        }

        "scratchpad.toggle" => {
            let params: LayoutParams = request.parse_params()?;
            let state = engine.toggle_scratchpad(&params.project).await?;
            Ok(json!({"state": state}))
        }

        "trace.start" => {
            let params: TraceMatcherParams = request.parse_params()?;
            let matcher = build_matcher(&params)?;
            let trace_id = engine
                .tracer
                .start(matcher, params.max_events)
                .map_err(RpcError::invalid_params)?;
            Ok(json!({"trace_id": trace_id}))
        }

        "trace.stop" => {
            let params: TraceRefParams = request.parse_params()?;
            engine.tracer.stop(&params.trace_id).map_err(RpcError::invalid_params)?;
            Ok(json!({"stopped": params.trace_id}))
        }

        "trace.list" => {
            let sessions: Vec<Value> = engine
                .tracer
                .sessions()
                .iter()
                .map(|s| {
                    json!({
                        "trace_id": s.trace_id,
                        "started_at": s.started_at,
                        "stopped_at": s.stopped_at,
                        "events": s.event_count(),
                        "active": s.is_active(),
                    })
                })
                .collect();
            Ok(json!({"sessions": sessions}))
        }

        "trace.get" => {
            let params: TraceRefParams = request.parse_params()?;
            let session = engine
                .tracer
                .get(&params.trace_id)
                .ok_or_else(|| RpcError::invalid_params("unknown trace session"))?;
            serde_json::to_value(session).map_err(internal)
        }

        "trace.snapshot" => {
            let params: TraceRefParams = request.parse_params()?;
            let window_id = params
                .window_id
                .ok_or_else(|| RpcError::invalid_params("window_id is required"))?;
            engine.trace_snapshot(&params.trace_id, window_id)
        }

        "trace.clear_stopped" => Ok(json!({"cleared": engine.tracer.clear_stopped()})),

        "lazygit.launch" => {
            let params: LazygitLaunchParams = request.parse_params()?;
            if !params.worktree_path.is_dir() {
                return Err(RpcError::invalid_params(format!(
                    "worktree path does not exist: {}",
                    params.worktree_path.display()
                )));
            }
            let (pid, command) = launch_lazygit(
                engine.spawner_ref(),
                &env::terminal_command(),
                &params.worktree_path,
                &params.flags,
            )
            .map_err(subprocess_error)?;
            serde_json::to_value(LazygitLaunchResult { pid, command }).map_err(internal)
        }

        "config_reload" => {
            engine.reload_config();
            Ok(json!({"reloaded": true, "errors": engine.config_errors()}))
        }

        "config_validate" => {
            Ok(json!({"valid": engine.config_errors().is_empty(), "errors": engine.config_errors()}))
        }

        "config_show" => {
            let result: ConfigShowResult = engine.config_show();
            serde_json::to_value(result).map_err(internal)
        }

        "config_get_versions" => engine.config_versions(),

        "config_rollback" => {
            let file = request
                .params
                .as_ref()
                .and_then(|p| p.get("file"))
                .and_then(Value::as_str)
                .ok_or_else(|| RpcError::invalid_params("file is required"))?;
            engine.config_rollback(file)
        }

        "config_get_conflicts" => {
            Ok(json!({"conflicts": engine.app_classes_conflicts()}))
        }

        other => {
            info!(method = other, "unknown control-plane method");
            Err(RpcError::method_not_found(other))
        }
    }
}

fn required_layout(params: &LayoutParams) -> Result<&str, RpcError> {
    params
        .layout
        .as_deref()
        .ok_or_else(|| RpcError::invalid_params("layout is required"))
}

fn build_matcher(params: &TraceMatcherParams) -> Result<TraceMatcher, RpcError> {
    let compile = |pattern: &Option<String>| -> Result<Option<Regex>, RpcError> {
        match pattern {
            Some(p) => Regex::new(p)
                .map(Some)
                .map_err(|e| RpcError::invalid_params(format!("bad regex '{p}': {e}"))),
            None => Ok(None),
        }
    };
    Ok(TraceMatcher {
        window_id: params.window_id,
        pid: params.pid,
        app_id: params.app_id.clone(),
        class_regex: compile(&params.class_regex)?,
        title_regex: compile(&params.title_regex)?,
    })
}

fn internal(e: impl std::fmt::Display) -> RpcError {
    RpcError::internal(e.to_string())
}

fn subprocess_error(e: SubprocessError) -> RpcError {
    match e {
        SubprocessError::Failed { category, message, stderr } => RpcError::internal(message)
            .with_data(json!({"category": category.as_str(), "stderr": stderr})),
        other => RpcError::internal(other.to_string()),
    }
}

#[cfg(test)]
#[path = "methods_tests.rs"]
mod methods_tests;
