//! Observability setup for Tutorly: structured logging and optional
//! OpenTelemetry span export.

pub mod tracing_setup;
