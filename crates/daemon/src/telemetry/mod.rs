// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Telemetry: health record, latency metrics, event ring, window tracer.
//!
//! All instruments are owned by the engine and mutated on its executor;
//! the control plane reads them through engine queries.

pub mod health;
pub mod perf;
pub mod ring;
pub mod tracer;

pub use health::{HealthMetrics, HealthStatus};
pub use perf::{OperationStats, PerformanceMetrics};
pub use ring::{EventRecord, EventRing};
pub use tracer::{TraceEvent, TraceMatcher, TraceSession, WindowTracer};
