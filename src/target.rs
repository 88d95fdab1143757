use crate::{Error, Result};
use bitcoin::{Address, Network, ScriptBuf};
use core::str::FromStr;
use serde::{Deserialize, Serialize};

/// A payment the caller wants the transaction to make.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Recipient {
    /// The destination address, as an encoded address string.
    pub address: String,
    /// The amount to pay in satoshis. Must be greater than zero.
    pub amount: u64,
}

impl Recipient {
    /// Create a recipient paying `amount` sats to `address`.
    pub fn new(address: impl Into<String>, amount: u64) -> Self {
        Self {
            address: address.into(),
            amount,
        }
    }

    /// The locking script of the destination address.
    ///
    /// Fails with [`Error::InvalidInput`] if the address does not parse or belongs to a
    /// different network.
    pub fn script_pubkey(&self, network: Network) -> Result<ScriptBuf> {
        parse_address(&self.address, network).map(|address| address.script_pubkey())
    }
}

pub(crate) fn parse_address(address: &str, network: Network) -> Result<Address> {
    Address::from_str(address)
        .map_err(|e| Error::InvalidInput(format!("invalid address {:?}: {}", address, e)))?
        .require_network(network)
        .map_err(|e| Error::InvalidInput(format!("invalid address {:?}: {}", address, e)))
}

/// Information about the outputs we're trying to fund. Only totals matter for fee and change
/// calculations, not the individual outputs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Ord, PartialOrd)]
pub struct TargetOutputs {
    /// The sum of the values of the requested outputs.
    pub value_sum: u64,
    /// The total number of requested outputs.
    pub n_outputs: usize,
}

impl TargetOutputs {
    /// Creates a `TargetOutputs` from a list of recipients.
    ///
    /// Fails with [`Error::InvalidInput`] if any amount is zero or the sum overflows.
    pub fn fund_outputs<'r>(recipients: impl IntoIterator<Item = &'r Recipient>) -> Result<Self> {
        let mut n_outputs = 0;
        let mut value_sum = 0_u64;

        for recipient in recipients {
            if recipient.amount == 0 {
                return Err(Error::InvalidInput(format!(
                    "output {} to {:?} has a zero amount",
                    n_outputs, recipient.address
                )));
            }
            value_sum = value_sum
                .checked_add(recipient.amount)
                .ok_or_else(|| Error::invalid_input("requested output total overflows"))?;
            n_outputs += 1;
        }

        Ok(Self {
            value_sum,
            n_outputs,
        })
    }

    /// The number of outputs if a change output were added.
    pub fn n_outputs_with_change(&self) -> usize {
        self.n_outputs + 1
    }
}
