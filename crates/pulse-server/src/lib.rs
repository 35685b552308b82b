//! # pulse-server
//!
//! Axum HTTP + `WebSocket` server and event broadcasting for the Pulse
//! test-results dashboard.
//!
//! - HTTP endpoints: health check, Prometheus metrics
//! - `WebSocket` gateway: connection registry, subscription handling,
//!   heartbeat probes, filtered event fan-out
//! - Periodic metrics publication via the [`metrics_publisher::MetricsSource`] seam
//! - Graceful shutdown via `tokio_util::sync::CancellationToken`
//!
//! The registry and broadcaster are constructed once by
//! [`server::PulseServer`] and passed by reference; there is no global
//! mutable state.

#![deny(unsafe_code)]

pub mod config;
pub mod health;
pub mod metrics;
pub mod metrics_publisher;
pub mod server;
pub mod shutdown;
pub mod websocket;
