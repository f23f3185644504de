//! Control channel.
//!
//! The foreground application steers the caching layer with small JSON
//! messages carrying a `type` field:
//!
//! | `type` | Effect |
//! |--------|--------|
//! | `SKIP_WAITING` | activate the waiting worker now |
//! | `CLEAR_CACHE` | delete every cache generation |
//!
//! Anything else (unknown types, a missing `type`, non-object payloads,
//! invalid JSON) is ignored silently. Handling is fire-and-forget: the
//! sender gets no reply, and failures are only logged.

use serde::{Deserialize, Serialize};

use crate::registration::Registration;

/// A command sent to the caching layer.
///
/// ```
/// use swcache::ControlMessage;
///
/// let message = ControlMessage::parse(br#"{"type": "SKIP_WAITING"}"#);
/// assert_eq!(message, Some(ControlMessage::SkipWaiting));
///
/// assert_eq!(ControlMessage::parse(b"SKIP_WAITING"), None);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ControlMessage {
    /// Activate the waiting worker without waiting for clients to close.
    SkipWaiting,
    /// Delete every cache generation, current ones included.
    ClearCache,
    /// A message type this layer does not know.
    #[serde(other)]
    Unknown,
}

impl ControlMessage {
    /// Parses a JSON payload. Returns `None` when it is not an object with a
    /// string `type` field.
    pub fn parse(payload: &[u8]) -> Option<Self> {
        serde_json::from_slice(payload).ok()
    }

    /// Parses an already decoded JSON value.
    pub fn from_value(value: serde_json::Value) -> Option<Self> {
        serde_json::from_value(value).ok()
    }
}

/// What handling a control message did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlOutcome {
    /// The message was not understood and had no effect.
    Ignored,
    /// `SKIP_WAITING` was handled.
    SkippedWaiting {
        /// Whether a waiting worker was activated.
        activated: bool,
    },
    /// `CLEAR_CACHE` was handled.
    CachesCleared {
        /// Number of generations deleted.
        generations: usize,
    },
}

impl Registration {
    /// Handles a raw control message.
    pub async fn post_message(&self, payload: &[u8]) -> ControlOutcome {
        match ControlMessage::parse(payload) {
            Some(message) => self.handle_message(message).await,
            None => {
                tracing::trace!("ignoring malformed control message");
                ControlOutcome::Ignored
            }
        }
    }

    /// Handles a decoded control message.
    pub async fn handle_message(&self, message: ControlMessage) -> ControlOutcome {
        match message {
            ControlMessage::SkipWaiting => {
                let activated = self.skip_waiting().await.unwrap_or_else(|error| {
                    tracing::warn!(%error, "skip waiting failed");
                    false
                });
                ControlOutcome::SkippedWaiting { activated }
            }
            ControlMessage::ClearCache => {
                let generations = self.clear_caches().await.unwrap_or_else(|error| {
                    tracing::debug!(%error, "cannot clear caches");
                    0
                });
                ControlOutcome::CachesCleared { generations }
            }
            ControlMessage::Unknown => {
                tracing::trace!("ignoring unknown control message");
                ControlOutcome::Ignored
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn known_types_parse() {
        assert_eq!(
            ControlMessage::parse(br#"{"type":"CLEAR_CACHE"}"#),
            Some(ControlMessage::ClearCache)
        );
        assert_eq!(
            ControlMessage::parse(br#"{"type":"SKIP_WAITING","from":"banner"}"#),
            Some(ControlMessage::SkipWaiting)
        );
    }

    #[test]
    fn unknown_type_is_unknown() {
        assert_eq!(
            ControlMessage::parse(br#"{"type":"RELOAD"}"#),
            Some(ControlMessage::Unknown)
        );
    }

    #[test]
    fn malformed_payloads_are_rejected() {
        for payload in [
            &b"null"[..],
            b"42",
            b"\"CLEAR_CACHE\"",
            b"{}",
            b"{\"type\": 1}",
            b"not json",
        ] {
            assert_eq!(ControlMessage::parse(payload), None);
        }
    }

    #[test]
    fn serializes_with_type_tag() {
        let json = serde_json::to_value(ControlMessage::ClearCache).unwrap();
        assert_eq!(json, serde_json::json!({"type": "CLEAR_CACHE"}));
    }
}
