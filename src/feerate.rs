use crate::{Error, Result};

/// Fee rate
#[derive(Debug, Copy, Clone, PartialEq, PartialOrd)]
// Internally stored as satoshi/vbyte
pub struct FeeRate(f64);

impl FeeRate {
    /// A feerate of zero
    pub const ZERO: Self = Self(0.0);
    /// The default minimum relay fee that bitcoin core uses (1 sat per vbyte). This is also the
    /// rate used when the caller does not pick one.
    pub const DEFAULT_MIN_RELAY: Self = Self(1.0);

    fn is_valid(value: f64) -> bool {
        value.is_finite() && value.is_sign_positive()
    }

    /// Create a new instance checking the value provided
    ///
    /// ## Panics
    ///
    /// Panics if the value is negative, NaN or infinite.
    fn new_checked(value: f64) -> Self {
        assert!(Self::is_valid(value), "invalid feerate {}", value);
        Self(value)
    }

    /// Create a new instance of [`FeeRate`] given a fee rate in satoshi/vbyte.
    ///
    /// Use [`try_from_sat_per_vb`](Self::try_from_sat_per_vb) for values that come from users.
    ///
    /// ## Panics
    ///
    /// Panics if the value is negative, NaN or infinite.
    pub fn from_sat_per_vb(sat_per_vb: f64) -> Self {
        Self::new_checked(sat_per_vb)
    }

    /// Create a new instance of [`FeeRate`] given a fee rate in satoshi/vbyte, returning
    /// [`Error::InvalidInput`] if the value is negative, NaN or infinite.
    ///
    /// A rate of zero is accepted and implies a zero fee.
    pub fn try_from_sat_per_vb(sat_per_vb: f64) -> Result<Self> {
        if Self::is_valid(sat_per_vb) {
            Ok(Self(sat_per_vb))
        } else {
            Err(Error::InvalidInput(format!(
                "fee rate must be a non-negative number, got {}",
                sat_per_vb
            )))
        }
    }

    /// Calculate fee rate from `fee` and `vbytes`.
    pub fn from_vb(fee: u64, vbytes: u64) -> Self {
        Self::from_sat_per_vb(fee as f64 / vbytes as f64)
    }

    /// Return the value as satoshi/vbyte.
    pub fn as_sat_vb(&self) -> f64 {
        self.0
    }

    /// Whether this is the zero feerate.
    pub fn is_zero(&self) -> bool {
        self.0 == 0.0
    }

    /// The rate in millionths of a satoshi per vbyte, rounded to the nearest one.
    ///
    /// Decimal rates like `1.4` are not exact in binary, so the product with a size is taken in
    /// this unit instead.
    fn as_micro_sat_vb(&self) -> u128 {
        // saturates for huge rates
        (self.0 * MICRO_SATS_PER_SAT as f64).round() as u128
    }

    /// The fee that a transaction of `vbytes` virtual bytes pays at this rate, rounded down to
    /// the satoshi.
    pub fn implied_fee(&self, vbytes: u64) -> u64 {
        let fee = u128::from(vbytes).saturating_mul(self.as_micro_sat_vb()) / MICRO_SATS_PER_SAT;
        u64::try_from(fee).unwrap_or(u64::MAX)
    }
}

const MICRO_SATS_PER_SAT: u128 = 1_000_000;

impl Default for FeeRate {
    fn default() -> Self {
        Self::DEFAULT_MIN_RELAY
    }
}
