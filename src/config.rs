//! Assembly settings as accepted from a caller or a configuration file.
//!
//! ```json
//! {
//!   "fee_rate": 2.5,
//!   "dust_threshold": 546,
//!   "change_address": "bcrt1q...",
//!   "network": "regtest"
//! }
//! ```
//!
//! Every field except `fee_rate` may be omitted.

use crate::{
    ChangePolicy, Error, FeeRate, Recipient, Result, TxAssembler, Utxo, DEFAULT_DUST_THRESHOLD,
};
use bitcoin::Network;
use serde::{Deserialize, Serialize};

/// Settings for a [`TxAssembler`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssemblyConfig {
    /// Fee rate in sat/vB.
    pub fee_rate: f64,
    /// Leftover at or below this becomes fee instead of change.
    #[serde(default = "default_dust_threshold")]
    pub dust_threshold: u64,
    /// Where change goes. Only needed if a change output ends up being created.
    #[serde(default)]
    pub change_address: Option<String>,
    /// Network the addresses must belong to.
    #[serde(default = "default_network")]
    pub network: Network,
    /// Re-estimate the fee for transactions that end up without change.
    #[serde(default)]
    pub reestimate_changeless: bool,
}

fn default_dust_threshold() -> u64 {
    DEFAULT_DUST_THRESHOLD
}

fn default_network() -> Network {
    Network::Regtest
}

impl Default for AssemblyConfig {
    fn default() -> Self {
        Self {
            fee_rate: FeeRate::DEFAULT_MIN_RELAY.as_sat_vb(),
            dust_threshold: DEFAULT_DUST_THRESHOLD,
            change_address: None,
            network: default_network(),
            reestimate_changeless: false,
        }
    }
}

impl AssemblyConfig {
    /// Parse a configuration from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json).map_err(|e| Error::Parse(e.to_string()))?;
        config.validated_fee_rate()?;
        Ok(config)
    }

    /// The configured fee rate, rejecting negative and non-finite values.
    pub fn validated_fee_rate(&self) -> Result<FeeRate> {
        FeeRate::try_from_sat_per_vb(self.fee_rate)
    }

    /// The configured change policy.
    pub fn change_policy(&self) -> ChangePolicy {
        ChangePolicy::min_value(self.dust_threshold)
    }

    /// A [`TxAssembler`] spending `utxos` to pay `recipients` with these settings.
    pub fn assembler<'a>(
        &self,
        utxos: &'a [Utxo],
        recipients: &'a [Recipient],
    ) -> Result<TxAssembler<'a>> {
        let mut assembler = TxAssembler::new(utxos, recipients)
            .fee_rate(self.validated_fee_rate()?)
            .change_policy(self.change_policy())
            .network(self.network)
            .reestimate_changeless(self.reestimate_changeless);
        if let Some(change_address) = &self.change_address {
            assembler = assembler.change_address(change_address.clone());
        }
        Ok(assembler)
    }
}
