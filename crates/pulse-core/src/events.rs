//! The WebSocket wire protocol.
//!
//! Two message families:
//!
//! - **[`ClientMessage`]**: inbound frames from a dashboard client. The only
//!   operation defined today is `subscribe`; every other well-formed message
//!   parses to [`ClientMessage::Unknown`] and is ignored (reserved for
//!   extension).
//! - **[`ServerEvent`]**: outbound frames. The greeting, heartbeat, and
//!   subscription ack are addressed to a single connection; test-result and
//!   metrics events are broadcast and carry a channel tag used for delivery
//!   filtering.
//!
//! Both are internally tagged on `"type"` and never constructed from loose
//! JSON property bags.

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::error::ProtocolError;
use crate::records::{MetricsSnapshot, TestResult};

/// Channel tag carried by test-result broadcasts.
pub const CHANNEL_TESTS: &str = "tests";

/// Channel tag carried by metrics broadcasts.
pub const CHANNEL_METRICS: &str = "metrics";

/// Inbound message from a dashboard client.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ClientMessage {
    /// Opt in to a named channel.
    Subscribe {
        /// Channel to subscribe to.
        channel: String,
    },
    /// Any other message type, recognized or not. Parses cleanly and no-ops.
    #[serde(other)]
    Unknown,
}

impl ClientMessage {
    /// Parse a raw text frame.
    pub fn parse(raw: &str) -> Result<Self, ProtocolError> {
        Ok(serde_json::from_str(raw)?)
    }
}

/// Outbound event to one or more dashboard clients.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ServerEvent {
    /// Greeting, sent exactly once as the first message of a connection.
    Connection {
        /// Human-readable welcome line.
        message: String,
    },
    /// Periodic liveness probe, sent to every open connection.
    Heartbeat {
        /// RFC 3339 timestamp of the probe.
        timestamp: String,
    },
    /// Acknowledgement of a `subscribe`, sent to that connection only.
    Subscribed {
        /// The channel that was subscribed.
        channel: String,
    },
    /// A finished test run, broadcast on the [`CHANNEL_TESTS`] channel.
    TestResult {
        /// Delivery-filter channel, always [`CHANNEL_TESTS`].
        channel: String,
        /// The test-result record.
        data: TestResult,
    },
    /// A metrics refresh, broadcast on the [`CHANNEL_METRICS`] channel.
    Metrics {
        /// Delivery-filter channel, always [`CHANNEL_METRICS`].
        channel: String,
        /// The aggregated snapshot.
        data: MetricsSnapshot,
    },
}

impl ServerEvent {
    /// The greeting sent when a connection is established.
    #[must_use]
    pub fn greeting() -> Self {
        Self::Connection {
            message: "Connected to the Pulse dashboard event stream".into(),
        }
    }

    /// A heartbeat stamped with the current time.
    #[must_use]
    pub fn heartbeat_now() -> Self {
        Self::Heartbeat {
            timestamp: Utc::now().to_rfc3339(),
        }
    }

    /// Ack for a completed subscribe.
    pub fn subscribed(channel: impl Into<String>) -> Self {
        Self::Subscribed {
            channel: channel.into(),
        }
    }

    /// Wrap a test result for broadcast on the `tests` channel.
    #[must_use]
    pub fn test_result(data: TestResult) -> Self {
        Self::TestResult {
            channel: CHANNEL_TESTS.into(),
            data,
        }
    }

    /// Wrap a metrics snapshot for broadcast on the `metrics` channel.
    #[must_use]
    pub fn metrics(data: MetricsSnapshot) -> Self {
        Self::Metrics {
            channel: CHANNEL_METRICS.into(),
            data,
        }
    }

    /// The delivery-filter channel, if this event is channel-tagged.
    ///
    /// Untagged events (greeting, heartbeat, ack) return `None` and are
    /// delivered to every open connection regardless of subscriptions.
    #[must_use]
    pub fn channel(&self) -> Option<&str> {
        match self {
            Self::TestResult { channel, .. } | Self::Metrics { channel, .. } => Some(channel),
            Self::Connection { .. } | Self::Heartbeat { .. } | Self::Subscribed { .. } => None,
        }
    }

    /// The wire `type` tag.
    #[must_use]
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::Connection { .. } => "connection",
            Self::Heartbeat { .. } => "heartbeat",
            Self::Subscribed { .. } => "subscribed",
            Self::TestResult { .. } => "testResult",
            Self::Metrics { .. } => "metrics",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::RepositoryId;
    use crate::records::TestStatus;

    fn sample_result() -> TestResult {
        TestResult {
            repository_id: RepositoryId::from("repo_1"),
            test_name: "parser::round_trip".into(),
            status: TestStatus::Passed,
            duration_ms: 88,
            error_message: None,
            commit_id: None,
            branch: None,
            executed_by: None,
            executed_at: Utc::now(),
        }
    }

    #[test]
    fn subscribe_parses() {
        let msg = ClientMessage::parse(r#"{"type":"subscribe","channel":"tests"}"#).unwrap();
        assert_eq!(
            msg,
            ClientMessage::Subscribe {
                channel: "tests".into()
            }
        );
    }

    #[test]
    fn unknown_type_parses_to_unknown() {
        let msg = ClientMessage::parse(r#"{"type":"unsubscribe","channel":"tests"}"#).unwrap();
        assert_eq!(msg, ClientMessage::Unknown);
    }

    #[test]
    fn subscribe_without_channel_is_malformed() {
        assert!(ClientMessage::parse(r#"{"type":"subscribe"}"#).is_err());
    }

    #[test]
    fn non_object_is_malformed() {
        assert!(ClientMessage::parse("[1,2,3]").is_err());
        assert!(ClientMessage::parse("not json").is_err());
        assert!(ClientMessage::parse("").is_err());
    }

    #[test]
    fn greeting_wire_shape() {
        let json = serde_json::to_value(ServerEvent::greeting()).unwrap();
        assert_eq!(json["type"], "connection");
        assert!(json["message"].as_str().unwrap().contains("Pulse"));
    }

    #[test]
    fn heartbeat_wire_shape() {
        let json = serde_json::to_value(ServerEvent::heartbeat_now()).unwrap();
        assert_eq!(json["type"], "heartbeat");
        // RFC 3339 timestamps parse back.
        let ts = json["timestamp"].as_str().unwrap();
        assert!(chrono::DateTime::parse_from_rfc3339(ts).is_ok());
    }

    #[test]
    fn subscribed_wire_shape() {
        let json = serde_json::to_value(ServerEvent::subscribed("tests")).unwrap();
        assert_eq!(json["type"], "subscribed");
        assert_eq!(json["channel"], "tests");
    }

    #[test]
    fn test_result_wire_shape() {
        let json = serde_json::to_value(ServerEvent::test_result(sample_result())).unwrap();
        assert_eq!(json["type"], "testResult");
        assert_eq!(json["channel"], "tests");
        assert_eq!(json["data"]["testName"], "parser::round_trip");
    }

    #[test]
    fn metrics_wire_shape() {
        let snap = MetricsSnapshot {
            timestamp: Utc::now(),
            total_repositories: 2,
            total_tests: 10,
            tests_passed: 9,
            tests_failed: 1,
            pass_rate: 90.0,
            average_duration_ms: 100.0,
        };
        let json = serde_json::to_value(ServerEvent::metrics(snap)).unwrap();
        assert_eq!(json["type"], "metrics");
        assert_eq!(json["channel"], "metrics");
        assert_eq!(json["data"]["passRate"], 90.0);
    }

    #[test]
    fn channel_is_none_for_direct_events() {
        assert!(ServerEvent::greeting().channel().is_none());
        assert!(ServerEvent::heartbeat_now().channel().is_none());
        assert!(ServerEvent::subscribed("tests").channel().is_none());
    }

    #[test]
    fn channel_is_set_for_broadcasts() {
        assert_eq!(
            ServerEvent::test_result(sample_result()).channel(),
            Some(CHANNEL_TESTS)
        );
    }

    #[test]
    fn event_type_matches_wire_tag() {
        let event = ServerEvent::test_result(sample_result());
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], event.event_type());
    }
}
