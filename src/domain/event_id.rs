//! Type-safe upstream event identifier.
//!
//! [`EventId`] wraps the integer id the campaign API assigns to each defend
//! or attack event, so that it cannot be confused with regions, seasons or
//! faction ids that share the same representation.

use std::fmt;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Identifier of an in-game event as reported by the upstream API.
///
/// Ids are assigned upstream and never reused within a season; the herald
/// treats a change of id in the "current event" slot as the previous event
/// having concluded.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema,
)]
#[serde(transparent)]
pub struct EventId(i32);

impl EventId {
    /// Wraps a raw upstream id.
    #[must_use]
    pub const fn new(raw: i32) -> Self {
        Self(raw)
    }

    /// Returns the raw integer id.
    #[must_use]
    pub const fn get(self) -> i32 {
        self.0
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i32> for EventId {
    fn from(raw: i32) -> Self {
        Self(raw)
    }
}

impl From<EventId> for i32 {
    fn from(id: EventId) -> Self {
        id.0
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_from_bare_integer() {
        let Ok(id) = serde_json::from_str::<EventId>("4242") else {
            panic!("bare integer should decode");
        };
        assert_eq!(id.get(), 4242);
    }

    #[test]
    fn display_is_plain_number() {
        assert_eq!(EventId::new(10).to_string(), "10");
    }

    #[test]
    fn ordering_follows_raw_value() {
        assert!(EventId::new(10) < EventId::new(11));
    }
}
