use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::EscrowError;

/// Number of fractional digits in one whole unit of value (ether-style).
pub const DECIMALS: u32 = 18;

const UNIT: u128 = 10u128.pow(DECIMALS);

/// A quantity of value in the smallest indivisible unit (wei).
///
/// Serialized as a decimal wei string, since JSON numbers cannot carry `u128`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Amount(u128);

impl Amount {
    pub const ZERO: Amount = Amount(0);

    pub const fn from_wei(wei: u128) -> Self {
        Self(wei)
    }

    pub const fn wei(self) -> u128 {
        self.0
    }

    pub fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Parses a decimal ether string such as `"1.0"` or `"0.25"`.
    pub fn parse_ether(input: &str) -> Result<Self, EscrowError> {
        let invalid = || EscrowError::InvalidAmount(input.to_string());
        let trimmed = input.trim();
        let (whole, frac) = match trimmed.split_once('.') {
            Some((whole, frac)) => (whole, frac),
            None => (trimmed, ""),
        };
        if whole.is_empty() && frac.is_empty() {
            return Err(invalid());
        }
        if frac.len() > DECIMALS as usize
            || !whole.chars().all(|c| c.is_ascii_digit())
            || !frac.chars().all(|c| c.is_ascii_digit())
        {
            return Err(invalid());
        }

        let whole: u128 = if whole.is_empty() { 0 } else { whole.parse().map_err(|_| invalid())? };
        let frac_wei: u128 = if frac.is_empty() {
            0
        } else {
            let padded = format!("{:0<width$}", frac, width = DECIMALS as usize);
            padded.parse().map_err(|_| invalid())?
        };

        whole
            .checked_mul(UNIT)
            .and_then(|w| w.checked_add(frac_wei))
            .map(Amount)
            .ok_or_else(invalid)
    }

    pub fn checked_add(self, other: Amount) -> Option<Amount> {
        self.0.checked_add(other.0).map(Amount)
    }

    pub fn checked_sub(self, other: Amount) -> Option<Amount> {
        self.0.checked_sub(other.0).map(Amount)
    }

    pub fn saturating_add(self, other: Amount) -> Amount {
        Amount(self.0.saturating_add(other.0))
    }

    pub fn saturating_sub(self, other: Amount) -> Amount {
        Amount(self.0.saturating_sub(other.0))
    }
}

/// Formats as a decimal ether string with trailing zeros trimmed (`1.0`, `0.25`).
impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let whole = self.0 / UNIT;
        let frac = self.0 % UNIT;
        if frac == 0 {
            return write!(f, "{}.0", whole);
        }
        let digits = format!("{:0width$}", frac, width = DECIMALS as usize);
        write!(f, "{}.{}", whole, digits.trim_end_matches('0'))
    }
}

impl From<Amount> for String {
    fn from(amount: Amount) -> Self {
        amount.0.to_string()
    }
}

impl TryFrom<String> for Amount {
    type Error = EscrowError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value
            .parse::<u128>()
            .map(Amount)
            .map_err(|_| EscrowError::InvalidAmount(value))
    }
}

impl std::iter::Sum for Amount {
    fn sum<I: Iterator<Item = Amount>>(iter: I) -> Self {
        Amount(iter.map(|a| a.0).sum())
    }
}
