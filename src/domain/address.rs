use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::EscrowError;

/// Identity of a counterparty, as carried by its transaction-signing account.
///
/// Addresses are normalized to lowercase on construction so that two spellings
/// of the same hex account compare equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Address(String);

impl Address {
    pub fn new(raw: impl AsRef<str>) -> Result<Self, EscrowError> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            return Err(EscrowError::InvalidAddress(raw.as_ref().to_string()));
        }
        Ok(Self(trimmed.to_ascii_lowercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Shortened form for log lines, e.g. `0x7099...79c8`.
    pub fn short(&self) -> String {
        if self.0.len() <= 10 || !self.0.is_ascii() {
            return self.0.clone();
        }
        format!("{}...{}", &self.0[..6], &self.0[self.0.len() - 4..])
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Address {
    type Error = EscrowError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Address::new(value)
    }
}

impl From<Address> for String {
    fn from(address: Address) -> Self {
        address.0
    }
}

impl std::str::FromStr for Address {
    type Err = EscrowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Address::new(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_address_is_case_insensitive() {
        let upper = Address::new("0x70997970C51812dc3A010C7d01b50e0d17dc79C8").unwrap();
        let lower = Address::new("0x70997970c51812dc3a010c7d01b50e0d17dc79c8").unwrap();
        assert_eq!(upper, lower);
        assert_eq!(upper.short(), "0x7099...79c8");
    }

    #[test]
    fn test_empty_address_rejected() {
        assert!(matches!(Address::new("   "), Err(EscrowError::InvalidAddress(_))));
    }
}
