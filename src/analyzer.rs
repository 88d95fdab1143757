//! Recompute the totals of a previously assembled (or externally supplied) PSBT.

use crate::{estimated_vsize, unsigned_tx::decode_psbt, FeeRate, Result, UnsignedTx};
use bitcoin::{Address, Network, OutPoint, Psbt};
use serde::{Deserialize, Serialize};

/// Per input breakdown of an [`Analysis`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputSummary {
    /// Position of the input in the transaction.
    pub index: usize,
    /// The output being spent.
    pub outpoint: OutPoint,
    /// The value of the spent output, if the PSBT carries it.
    ///
    /// `None` means the input counted as zero towards [`Analysis::total_input`].
    pub value: Option<u64>,
    /// The sighash type requested for this input, if any.
    pub sighash_type: Option<u32>,
}

/// Per output breakdown of an [`Analysis`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputSummary {
    /// Position of the output in the transaction.
    pub index: usize,
    /// Value in satoshis.
    pub value: u64,
    /// The destination, if the script is a standard address type.
    pub address: Option<String>,
    /// Whether this is the change output added by the assembler.
    pub is_change: bool,
}

/// Totals and breakdown of a transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Analysis {
    /// Sum of the input values that could be recovered.
    pub total_input: u64,
    /// Sum of all output values, change included.
    pub total_output: u64,
    /// `total_input - total_output`.
    ///
    /// This is negative only if some input values are missing. A negative fee means the data is
    /// incomplete, not that the transaction pays a negative fee.
    pub fee: i64,
    /// Inputs in transaction order.
    pub inputs: Vec<InputSummary>,
    /// Outputs in transaction order.
    pub outputs: Vec<OutputSummary>,
}

impl Analysis {
    /// Whether every input's value was recovered. If not, [`fee`](Self::fee) is meaningless.
    pub fn is_complete(&self) -> bool {
        self.inputs.iter().all(|input| input.value.is_some())
    }

    /// Indices of the inputs whose value is unknown.
    pub fn missing_values(&self) -> impl Iterator<Item = usize> + '_ {
        self.inputs
            .iter()
            .filter(|input| input.value.is_none())
            .map(|input| input.index)
    }

    /// The fee rate the transaction pays over its size as estimated by [`estimated_vsize`].
    ///
    /// Returns `None` if the analysis is incomplete or the fee is negative.
    pub fn estimated_fee_rate(&self) -> Option<FeeRate> {
        if !self.is_complete() || self.fee < 0 {
            return None;
        }
        let vsize = estimated_vsize(self.inputs.len(), self.outputs.len());
        Some(FeeRate::from_vb(self.fee as u64, vsize))
    }
}

/// The value of the output spent by input `index`.
///
/// Prefers `witness_utxo`, then looks the output up in `non_witness_utxo`. A `non_witness_utxo`
/// whose txid is not the one the input spends is ignored.
fn input_value(psbt: &Psbt, index: usize) -> Option<u64> {
    let input = psbt.inputs.get(index)?;
    if let Some(txout) = &input.witness_utxo {
        return Some(txout.value.to_sat());
    }
    let prevout = psbt.unsigned_tx.input.get(index)?.previous_output;
    let prev_tx = input.non_witness_utxo.as_ref()?;
    let prev_txid = prev_tx.compute_txid();
    if prev_txid != prevout.txid {
        tracing::warn!(
            index,
            expected = %prevout.txid,
            found = %prev_txid,
            "non_witness_utxo does not match the spent outpoint"
        );
        return None;
    }
    prev_tx
        .output
        .get(prevout.vout as usize)
        .map(|txout| txout.value.to_sat())
}

/// Analyze a PSBT, decoding output addresses for `network`.
pub fn analyze_psbt(psbt: &Psbt, network: Network) -> Analysis {
    analyze_inner(psbt, network, None)
}

/// Analyze a transaction produced by the assembler. The change output is flagged.
pub fn analyze(tx: &UnsignedTx) -> Analysis {
    analyze_inner(tx.psbt(), tx.network(), tx.change_index())
}

/// Analyze a base64 encoded PSBT.
///
/// Fails with [`Error::Parse`](crate::Error::Parse) if the string is not base64 or does not
/// hold a valid PSBT.
pub fn analyze_base64(psbt_base64: &str, network: Network) -> Result<Analysis> {
    let psbt = decode_psbt(psbt_base64)?;
    Ok(analyze_psbt(&psbt, network))
}

fn analyze_inner(psbt: &Psbt, network: Network, change_index: Option<usize>) -> Analysis {
    let inputs = psbt
        .unsigned_tx
        .input
        .iter()
        .enumerate()
        .map(|(index, txin)| InputSummary {
            index,
            outpoint: txin.previous_output,
            value: input_value(psbt, index),
            sighash_type: psbt
                .inputs
                .get(index)
                .and_then(|input| input.sighash_type)
                .map(|sighash| sighash.to_u32()),
        })
        .collect::<Vec<_>>();

    let outputs = psbt
        .unsigned_tx
        .output
        .iter()
        .enumerate()
        .map(|(index, txout)| OutputSummary {
            index,
            value: txout.value.to_sat(),
            address: Address::from_script(&txout.script_pubkey, network)
                .ok()
                .map(|address| address.to_string()),
            is_change: change_index == Some(index),
        })
        .collect::<Vec<_>>();

    let total_input = inputs
        .iter()
        .filter_map(|input| input.value)
        .fold(0_u64, u64::saturating_add);
    let total_output = outputs
        .iter()
        .map(|output| output.value)
        .fold(0_u64, u64::saturating_add);
    let fee = (i128::from(total_input) - i128::from(total_output))
        .clamp(i128::from(i64::MIN), i128::from(i64::MAX)) as i64;

    for missing in inputs.iter().filter(|input| input.value.is_none()) {
        tracing::warn!(
            index = missing.index,
            outpoint = %missing.outpoint,
            "input value unknown, counted as zero"
        );
    }
    tracing::trace!(total_input, total_output, fee, "analyzed transaction");

    Analysis {
        total_input,
        total_output,
        fee,
        inputs,
        outputs,
    }
}
