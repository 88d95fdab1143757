use crate::{Error, Result};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use bitcoin::{Network, Psbt};

/// An assembled transaction ready to be handed to a signer.
///
/// The transaction is carried as a [`Psbt`] whose inputs have their spent outputs attached as
/// `witness_utxo`. Once created it is never mutated; changing anything means assembling again.
#[derive(Debug, Clone, PartialEq)]
pub struct UnsignedTx {
    psbt: Psbt,
    network: Network,
    fee_estimate: u64,
    change_index: Option<usize>,
}

impl UnsignedTx {
    pub(crate) fn new(
        psbt: Psbt,
        network: Network,
        fee_estimate: u64,
        change_index: Option<usize>,
    ) -> Self {
        Self {
            psbt,
            network,
            fee_estimate,
            change_index,
        }
    }

    /// Decode a base64 PSBT produced elsewhere.
    ///
    /// Nothing is known about how it was assembled, so [`fee_estimate`](Self::fee_estimate) is
    /// zero and [`change_index`](Self::change_index) is `None`.
    pub fn from_base64(psbt_base64: &str, network: Network) -> Result<Self> {
        Ok(Self::new(decode_psbt(psbt_base64)?, network, 0, None))
    }

    /// The underlying PSBT.
    pub fn psbt(&self) -> &Psbt {
        &self.psbt
    }

    /// Consume `self` and return the underlying PSBT.
    pub fn into_psbt(self) -> Psbt {
        self.psbt
    }

    /// The network the addresses in this transaction belong to.
    pub fn network(&self) -> Network {
        self.network
    }

    /// The fee estimated during assembly.
    ///
    /// When no change output was added the transaction actually pays this plus the absorbed
    /// leftover. See [`Analysis::fee`](crate::Analysis::fee) for the real fee.
    pub fn fee_estimate(&self) -> u64 {
        self.fee_estimate
    }

    /// The index of the change output, if one was added.
    pub fn change_index(&self) -> Option<usize> {
        self.change_index
    }

    /// The value of the change output, if one was added.
    pub fn change_value(&self) -> Option<u64> {
        let index = self.change_index?;
        self.psbt
            .unsigned_tx
            .output
            .get(index)
            .map(|txout| txout.value.to_sat())
    }

    /// Number of inputs.
    pub fn input_count(&self) -> usize {
        self.psbt.unsigned_tx.input.len()
    }

    /// Number of outputs, including change.
    pub fn output_count(&self) -> usize {
        self.psbt.unsigned_tx.output.len()
    }

    /// Serialize the PSBT in its binary form.
    pub fn serialize(&self) -> Vec<u8> {
        self.psbt.serialize()
    }

    /// The base64 encoding of the binary PSBT, as expected by wallets and signers.
    pub fn to_base64(&self) -> String {
        STANDARD.encode(self.psbt.serialize())
    }
}

pub(crate) fn decode_psbt(psbt_base64: &str) -> Result<Psbt> {
    let bytes = STANDARD
        .decode(psbt_base64.trim())
        .map_err(|e| Error::Parse(format!("invalid base64: {}", e)))?;
    Psbt::deserialize(&bytes).map_err(|e| Error::Parse(format!("invalid PSBT: {}", e)))
}
