//! Enumerations stored as text columns and exchanged as snake_case JSON.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Raised when a stored or submitted value is not a known variant.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown {kind}: {value}")]
pub struct ParseStatusError {
    /// The enumeration being parsed.
    pub kind: &'static str,
    /// The rejected text.
    pub value: String,
}

macro_rules! text_enum {
    (
        $(#[$meta:meta])*
        $name:ident, $kind:literal {
            $($(#[$variant_meta:meta])* $variant:ident => $text:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $($(#[$variant_meta])* $variant),+
        }

        impl $name {
            /// Every variant, in declaration order.
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            /// The text form used in JSON and in the database.
            #[must_use]
            pub const fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $text),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
                formatter.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = ParseStatusError;

            fn from_str(value: &str) -> Result<Self, Self::Err> {
                match value {
                    $($text => Ok(Self::$variant),)+
                    other => Err(ParseStatusError {
                        kind: $kind,
                        value: other.to_string(),
                    }),
                }
            }
        }
    };
}

text_enum!(
    /// Role of an account holder.
    UserRole, "user role" {
        /// A customer who parks cars.
        User => "user",
        /// A valet who moves cars.
        Driver => "driver",
        /// A site manager.
        Manager => "manager",
        /// An administrator across sites.
        SuperAdmin => "super_admin",
    }
);

text_enum!(
    /// Body type of a registered vehicle.
    #[derive(Default)]
    VehicleType, "vehicle type" {
        #[default]
        Sedan => "sedan",
        Suv => "suv",
        Hatchback => "hatchback",
        Motorcycle => "motorcycle",
        Other => "other",
    }
);

text_enum!(
    /// Lifecycle of a parking session.
    ///
    /// `pending → active → retrieval_requested → completed`
    SessionStatus, "session status" {
        /// Requested; waiting for a valet to park the car.
        Pending => "pending",
        /// The car is parked at the site.
        Active => "active",
        /// The customer asked for the car back.
        RetrievalRequested => "retrieval_requested",
        /// The car has left the site.
        Completed => "completed",
    }
);

impl SessionStatus {
    /// Sessions a customer still has to act on or wait for.
    pub const OPEN: &'static [Self] = &[Self::Pending, Self::Active, Self::RetrievalRequested];

    /// Returns `true` while the car holds a slot at its site.
    #[must_use]
    pub fn is_open(self) -> bool {
        Self::OPEN.contains(&self)
    }
}

text_enum!(
    /// Whether the session fee has been settled.
    PaymentStatus, "payment status" {
        Pending => "pending",
        Paid => "paid",
    }
);

text_enum!(
    /// What a valet run does with the car.
    AssignmentType, "assignment type" {
        /// Take the car from the customer into a spot.
        Park => "park",
        /// Bring the car back to the customer.
        Retrieve => "retrieve",
    }
);

text_enum!(
    /// Lifecycle of a valet assignment.
    ///
    /// `pending → in_progress → completed`
    AssignmentStatus, "assignment status" {
        /// Waiting in the driver queue.
        Pending => "pending",
        /// Accepted by a driver.
        InProgress => "in_progress",
        /// Finished.
        Completed => "completed",
    }
);
