// ── Identifier newtypes ──
//
// Catalog entities are keyed by short opaque strings ("1", "2", ...).
// Newtypes keep device and switch ids from being mixed up.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

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
            fn from(s: &str) -> Self {
                Self(s.to_owned())
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl FromStr for $name {
            type Err = std::convert::Infallible;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self::new(s.trim()))
            }
        }
    };
}

string_id!(
    /// Identifier of a configurable device in the catalog.
    DeviceId
);

string_id!(
    /// Identifier of a network switch (commutator).
    CommutatorId
);

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn device_id_display_round_trips() {
        let id = DeviceId::from("3");
        assert_eq!(id.to_string(), "3");
        assert_eq!(id.as_str(), "3");
    }

    #[test]
    fn from_str_trims_whitespace() {
        let id: CommutatorId = " 2 ".parse().unwrap();
        assert_eq!(id, CommutatorId::new("2"));
    }
}
