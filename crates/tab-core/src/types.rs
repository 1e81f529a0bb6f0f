//! Core type definitions with validation.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Validation errors for core types.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// The provided value was empty.
    #[error("{field} cannot be empty")]
    Empty { field: &'static str },

    /// Unknown tax/tip distribution type.
    #[error("unknown distribution type: {value} (expected 'proportional' or 'equal')")]
    UnknownDistribution { value: String },

    /// Unknown receipt status.
    #[error("unknown receipt status: {value}")]
    UnknownStatus { value: String },
}

/// Generates a validated string ID newtype with common trait implementations.
macro_rules! define_string_id {
    (
        $(#[$meta:meta])*
        $name:ident, $field_name:literal
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Creates a new ID after validation.
            pub fn new(id: impl Into<String>) -> Result<Self, ValidationError> {
                let id = id.into();
                if id.is_empty() {
                    return Err(ValidationError::Empty { field: $field_name });
                }
                Ok(Self(id))
            }

            /// Returns the ID as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl TryFrom<String> for $name {
            type Error = ValidationError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl FromStr for $name {
            type Err = ValidationError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::new(s)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

define_string_id!(
    /// A validated receipt identifier.
    ReceiptId, "receipt ID"
);

define_string_id!(
    /// A validated receipt line item identifier.
    ItemId, "item ID"
);

define_string_id!(
    /// A validated user identifier.
    ///
    /// Identifies both claimants and receipt owners; profiles are keyed by it.
    UserId, "user ID"
);

/// How a receipt-level charge (tax or tip) is shared among claimants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DistributionType {
    /// Each claimant pays in proportion to their share of the subtotal.
    #[default]
    Proportional,
    /// Every claimant pays the same amount.
    Equal,
}

impl DistributionType {
    /// String representation used in config files and JSON output.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Proportional => "proportional",
            Self::Equal => "equal",
        }
    }
}

impl fmt::Display for DistributionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for DistributionType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "proportional" => Ok(Self::Proportional),
            "equal" => Ok(Self::Equal),
            _ => Err(ValidationError::UnknownDistribution {
                value: s.to_string(),
            }),
        }
    }
}

impl Serialize for DistributionType {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for DistributionType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Tax and tip distribution policy for one settlement view.
///
/// Not stored anywhere; the settlement view may switch it between
/// recomputations without side effects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DistributionOptions {
    pub tax: DistributionType,
    pub tip: DistributionType,
}

impl DistributionOptions {
    #[must_use]
    pub const fn new(tax: DistributionType, tip: DistributionType) -> Self {
        Self { tax, tip }
    }
}

/// Lifecycle state of a receipt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReceiptStatus {
    /// Created from parser output, items still being reviewed.
    #[default]
    Draft,
    /// Shared with participants and open for claims.
    Active,
    /// Everyone has paid.
    Settled,
}

impl ReceiptStatus {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Active => "active",
            Self::Settled => "settled",
        }
    }
}

impl fmt::Display for ReceiptStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ReceiptStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(Self::Draft),
            "active" => Ok(Self::Active),
            "settled" => Ok(Self::Settled),
            _ => Err(ValidationError::UnknownStatus {
                value: s.to_string(),
            }),
        }
    }
}
