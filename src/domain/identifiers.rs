//! Strongly-typed identifiers for every persisted record.
//!
//! All identifiers wrap a UUID v7 so that rows created later sort after
//! rows created earlier, which keeps database indexes append-friendly.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Validation error raised when a path or body value is not a UUID.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid {kind} format: {value}")]
pub struct IdentifierError {
    /// Which identifier was being parsed (e.g. "user id").
    pub kind: &'static str,
    /// The rejected input.
    pub value: String,
}

macro_rules! define_identifier {
    ($(#[$meta:meta])* $name:ident, $kind:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Generates a new time-ordered identifier.
            #[must_use]
            pub fn generate() -> Self {
                Self(Uuid::now_v7())
            }

            /// Parses an identifier from its textual form.
            ///
            /// # Errors
            ///
            /// Returns [`IdentifierError`] when `value` is not a valid UUID.
            pub fn parse(value: &str) -> Result<Self, IdentifierError> {
                Uuid::from_str(value.trim())
                    .map(Self)
                    .map_err(|_| IdentifierError {
                        kind: $kind,
                        value: value.to_string(),
                    })
            }

            /// Returns the underlying UUID.
            #[must_use]
            pub const fn as_uuid(&self) -> &Uuid {
                &self.0
            }

            /// Consumes the identifier and returns the underlying UUID.
            #[must_use]
            pub const fn into_uuid(self) -> Uuid {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(formatter, "{}", self.0)
            }
        }

        impl From<Uuid> for $name {
            fn from(uuid: Uuid) -> Self {
                Self(uuid)
            }
        }

        impl FromStr for $name {
            type Err = IdentifierError;

            fn from_str(value: &str) -> Result<Self, Self::Err> {
                Self::parse(value)
            }
        }
    };
}

define_identifier!(
    /// Identifier of any account holder: customer, driver, manager or admin.
    UserId,
    "user id"
);
define_identifier!(
    /// Identifier of a registered vehicle.
    VehicleId,
    "vehicle id"
);
define_identifier!(
    /// Identifier of a parking site.
    SiteId,
    "site id"
);
define_identifier!(
    /// Identifier of a parking session (one car stay at one site).
    SessionId,
    "session id"
);
define_identifier!(
    /// Identifier of a valet assignment (one park or retrieve run).
    AssignmentId,
    "assignment id"
);
define_identifier!(
    /// Identifier of a recorded payment.
    PaymentId,
    "payment id"
);
