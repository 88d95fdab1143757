//! Deciding whether a transaction gets a change output.
//!
//! Whatever the inputs provide beyond the requested outputs and the fee is *leftover*. A change
//! policy returns the leftover to the sender only when it is worth more than the dust threshold;
//! smaller amounts are given to miners as extra fee.

use crate::{Drain, Error, Result, DEFAULT_DUST_THRESHOLD};
use bitcoin::ScriptBuf;

/// Describes when a change output should be added that drains the leftover value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ChangePolicy {
    /// Leftover at or below this value is absorbed into the fee instead of creating change.
    pub dust_threshold: u64,
}

impl Default for ChangePolicy {
    /// The default policy uses [`DEFAULT_DUST_THRESHOLD`].
    fn default() -> Self {
        Self {
            dust_threshold: DEFAULT_DUST_THRESHOLD,
        }
    }
}

impl ChangePolicy {
    /// Construct a change policy that creates change when the leftover is greater than
    /// `dust_threshold`.
    pub fn min_value(dust_threshold: u64) -> Self {
        Self { dust_threshold }
    }

    /// The value the change output should have to drain the leftover of a transaction spending
    /// `total_input` to pay `total_requested` plus `fee`.
    ///
    /// Returns `None` if no change output should be added, in which case the leftover (at most
    /// the dust threshold) goes to the fee. Fails with [`Error::InsufficientFunds`] if the inputs
    /// don't cover the outputs and fee.
    pub fn drain_value(
        &self,
        total_input: u64,
        total_requested: u64,
        fee: u64,
    ) -> Result<Option<u64>> {
        let needed = u128::from(total_requested) + u128::from(fee);
        let available = u128::from(total_input);

        if available < needed {
            let missing = needed - available;
            return Err(Error::InsufficientFunds {
                missing: u64::try_from(missing).unwrap_or(u64::MAX),
            });
        }

        // `available` fits in a u64 so the difference does too.
        let leftover = (available - needed) as u64;
        if leftover > self.dust_threshold {
            Ok(Some(leftover))
        } else {
            Ok(None)
        }
    }

    /// Figures out whether the transaction should have a change output paying to
    /// `change_script`. If it should not, then it will return [`Drain::none`]. The value of the
    /// `Drain` will be the same as [`drain_value`](Self::drain_value).
    pub fn drain(
        &self,
        total_input: u64,
        total_requested: u64,
        fee: u64,
        change_script: ScriptBuf,
    ) -> Result<Drain> {
        Ok(match self.drain_value(total_input, total_requested, fee)? {
            Some(value) => Drain {
                script_pubkey: change_script,
                value,
            },
            None => Drain::none(),
        })
    }
}

/// Decide the change amount using the [`DEFAULT_DUST_THRESHOLD`].
///
/// This is [`ChangePolicy::drain_value`] on the default policy.
pub fn decide_change(total_input: u64, total_requested: u64, fee: u64) -> Result<Option<u64>> {
    ChangePolicy::default().drain_value(total_input, total_requested, fee)
}
