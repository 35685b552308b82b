//! # pulse-core
//!
//! Foundation types for the Pulse dashboard backend.
//!
//! This crate provides the shared vocabulary the server crates depend on:
//!
//! - **Branded IDs**: [`ids::ConnectionId`], [`ids::RepositoryId`] as newtypes
//! - **Wire protocol**: [`events::ClientMessage`] (inbound) and
//!   [`events::ServerEvent`] (outbound) as serde tagged unions
//! - **Records**: [`records::TestResult`] and [`records::MetricsSnapshot`],
//!   the payloads carried by channel-tagged broadcasts
//! - **Errors**: [`error::ProtocolError`] via `thiserror`
//!
//! ## Crate Position
//!
//! Foundation crate. Depended on by `pulse-server`.

#![deny(unsafe_code)]

pub mod error;
pub mod events;
pub mod ids;
pub mod records;

pub use error::ProtocolError;
pub use events::{CHANNEL_METRICS, CHANNEL_TESTS, ClientMessage, ServerEvent};
pub use ids::{ConnectionId, RepositoryId};
pub use records::{MetricsSnapshot, TestResult, TestStatus};
