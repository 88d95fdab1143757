use crate::{Error, Result};
use bitcoin::{Amount, OutPoint, ScriptBuf, TxOut};
use core::str::FromStr;
use serde::{Deserialize, Serialize};

/// An unspent output that has already been selected for spending.
///
/// UTXOs are supplied by an external selection service. The assembler only reads them.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Utxo {
    /// The transaction id and output index identifying the output.
    pub outpoint: OutPoint,
    /// Value in satoshis.
    pub value: u64,
    /// The output's locking script.
    pub script_pubkey: ScriptBuf,
    /// Height of the block the output was seen in.
    pub height: u64,
}

impl Utxo {
    /// The number of confirmations at chain tip `tip_height`, floored at zero.
    pub fn confirmations(&self, tip_height: u64) -> u64 {
        tip_height.saturating_sub(self.height)
    }

    /// The output this UTXO refers to, as attached to a PSBT input.
    pub fn txout(&self) -> TxOut {
        TxOut {
            value: Amount::from_sat(self.value),
            script_pubkey: self.script_pubkey.clone(),
        }
    }
}

/// The record the UTXO selection service returns for each selected UTXO.
///
/// ```json
/// {
///   "outpoint": "<txid>:<vout>",
///   "output": { "value": 100000, "script_pubkey": "0014..." },
///   "height": 101,
///   "confirmations": 6
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexedUtxo {
    /// `txid:vout`
    pub outpoint: String,
    /// The output being spent.
    pub output: IndexedOutput,
    /// Height of the block the output was created in.
    pub height: u64,
    /// Confirmation count as reported by the service.
    #[serde(default)]
    pub confirmations: u64,
}

/// The output part of an [`IndexedUtxo`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexedOutput {
    /// Value in satoshis.
    pub value: u64,
    /// Hex encoded locking script.
    pub script_pubkey: String,
}

impl IndexedUtxo {
    /// Parse a JSON list of records as returned by the selection service.
    pub fn list_from_json(json: &str) -> Result<Vec<Utxo>> {
        let records: Vec<IndexedUtxo> =
            serde_json::from_str(json).map_err(|e| Error::Parse(e.to_string()))?;
        records.into_iter().map(Utxo::try_from).collect()
    }
}

impl TryFrom<IndexedUtxo> for Utxo {
    type Error = Error;

    fn try_from(record: IndexedUtxo) -> Result<Self> {
        let outpoint = OutPoint::from_str(&record.outpoint)
            .map_err(|e| Error::Parse(format!("invalid outpoint {:?}: {}", record.outpoint, e)))?;
        let script_pubkey = ScriptBuf::from_hex(&record.output.script_pubkey).map_err(|e| {
            Error::Parse(format!(
                "invalid script_pubkey for {}: {}",
                record.outpoint, e
            ))
        })?;

        Ok(Utxo {
            outpoint,
            value: record.output.value,
            script_pubkey,
            height: record.height,
        })
    }
}
