// realism-gate-core/src/identifiers.rs
// ============================================================================
// Module: Opaque Identifiers
// Description: Newtype wrappers for every id and stable code the gate
//              passes between components.
// Purpose: Stop an id and a string from being interchangeable at the type
//          level.
// Dependencies: serde
// ============================================================================

//! Opaque identifiers shared across every Realism Gate component.
//!
//! Every identifier is a transparent newtype over `String` so that callers
//! cannot construct one without going through its `new` constructor, and so
//! that the wire representation is a plain JSON string rather than a nested
//! object.

use std::fmt;

use serde::Deserialize;
use serde::Serialize;

/// Declares an opaque, string-backed identifier newtype.
macro_rules! string_identifier {
    ($name:ident, $doc:literal) => {
        #[doc = $doc]
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Creates a new identifier from any string-like value.
            #[must_use]
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            /// Returns the identifier as a string slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self::new(value)
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self::new(value)
            }
        }
    };
}

string_identifier!(GateConfigId, "Opaque identifier for an immutable `GateConfig` document.");
string_identifier!(RunId, "Globally unique run identifier; embeds a UTC timestamp component.");
string_identifier!(AssetId, "Identifier for one generated asset, scoped to a run.");
string_identifier!(ViewId, "Identifier for one camera viewpoint in the render rig.");
string_identifier!(CriticName, "Stable name of one of the four critics.");
string_identifier!(FailCode, "Stable failure code string, e.g. `GEO_SCALE_IMPLAUSIBLE`.");
string_identifier!(IssueId, "Identifier for the work-item an iteration lineage is attached to.");
string_identifier!(Category, "Category tag, e.g. `car`.");

#[cfg(test)]
mod tests {
    use super::RunId;

    #[test]
    fn identifiers_round_trip_through_json() {
        let id = RunId::new("run-2026-07-28T00:00:00Z-abc123");
        let json = serde_json::to_string(&id).expect("serialize run id");
        assert_eq!(json, "\"run-2026-07-28T00:00:00Z-abc123\"");
        let parsed: RunId = serde_json::from_str(&json).expect("deserialize run id");
        assert_eq!(parsed, id);
    }

    #[test]
    fn identifiers_display_as_bare_string() {
        let id = RunId::new("abc");
        assert_eq!(id.to_string(), "abc");
        assert_eq!(id.as_str(), "abc");
    }
}
