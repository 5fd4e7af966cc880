//! Strongly-typed identifiers used across the domain.
//!
//! Storefront identifiers are positive integers; zero is never a valid id.

use core::str::FromStr;
use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};

/// Identifier of a catalog product. A bundle is a product, so bundles share this id space.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u64", into = "u64")]
pub struct ProductId(u64);

/// Identifier of a storefront order (opaque to the core; only used for line-item lookup).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u64", into = "u64")]
pub struct OrderId(u64);

macro_rules! impl_numeric_newtype {
    ($t:ty, $name:literal) => {
        impl $t {
            /// Create an identifier, rejecting zero.
            pub fn new(raw: u64) -> DomainResult<Self> {
                if raw == 0 {
                    return Err(DomainError::invalid_id($name, "must be positive"));
                }
                Ok(Self(raw))
            }

            pub fn get(&self) -> u64 {
                self.0
            }
        }

        impl core::fmt::Display for $t {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                core::fmt::Display::fmt(&self.0, f)
            }
        }

        impl From<$t> for u64 {
            fn from(value: $t) -> Self {
                value.0
            }
        }

        impl TryFrom<u64> for $t {
            type Error = DomainError;

            fn try_from(value: u64) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl FromStr for $t {
            type Err = DomainError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let raw = s
                    .trim()
                    .parse::<u64>()
                    .map_err(|e| DomainError::invalid_id($name, e.to_string()))?;
                Self::new(raw)
            }
        }
    };
}

impl_numeric_newtype!(ProductId, "ProductId");
impl_numeric_newtype!(OrderId, "OrderId");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_is_not_a_valid_product_id() {
        assert!(matches!(ProductId::new(0), Err(DomainError::InvalidId { .. })));
        assert_eq!(ProductId::new(42).unwrap().get(), 42);
    }

    #[test]
    fn parses_stringified_ids() {
        let id: ProductId = " 107 ".parse().unwrap();
        assert_eq!(id.get(), 107);
        assert!("abc".parse::<ProductId>().is_err());
        assert!("-3".parse::<OrderId>().is_err());
    }

    #[test]
    fn serde_round_trips_as_a_plain_integer() {
        let id = ProductId::new(9).unwrap();
        assert_eq!(serde_json::to_string(&id).unwrap(), "9");
        let back: ProductId = serde_json::from_str("9").unwrap();
        assert_eq!(back, id);
        assert!(serde_json::from_str::<ProductId>("0").is_err());
    }
}
