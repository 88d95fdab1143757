#![allow(dead_code)]

use bitcoin::{Network, OutPoint, ScriptBuf, Txid};
use core::str::FromStr;
use proptest::prelude::*;
use utxo_psbt::{assemble, FeeRate, Recipient, Result, UnsignedTx, Utxo};

pub const NETWORK: Network = Network::Regtest;

/// P2WPKH addresses on regtest.
pub const RECIPIENT: &str = "bcrt1qw508d6qejxtdg4y5r3zarvary0c5xw7kygt080";
pub const OTHER_RECIPIENT: &str = "bcrt1q4w46h2at4w46h2at4w46h2at4w46h2atzmxqe2";
pub const CHANGE: &str = "bcrt1qqypqxpq9qcrsszg2pvxq6rs0zqg3yyc5phstwt";

/// The same witness program as [`RECIPIENT`] but on mainnet.
pub const MAINNET_RECIPIENT: &str = "bc1qw508d6qejxtdg4y5r3zarvary0c5xw7kv8f3t4";

pub fn p2wpkh_script() -> ScriptBuf {
    ScriptBuf::from_hex("0014751e76e8199196d454941c45d1b3a323f1433bd6").unwrap()
}

pub fn outpoint(n: u64, vout: u32) -> OutPoint {
    OutPoint {
        txid: Txid::from_str(&format!("{:064x}", n + 1)).unwrap(),
        vout,
    }
}

/// A UTXO of `value` with an outpoint unique to `n`.
pub fn utxo(n: u64, value: u64) -> Utxo {
    Utxo {
        outpoint: outpoint(n, n as u32 % 4),
        value,
        script_pubkey: p2wpkh_script(),
        height: 100 + n,
    }
}

pub fn utxos(values: &[u64]) -> Vec<Utxo> {
    values
        .iter()
        .enumerate()
        .map(|(n, value)| utxo(n as u64, *value))
        .collect()
}

/// Recipients paying `amounts`, cycling through two addresses.
pub fn recipients(amounts: &[u64]) -> Vec<Recipient> {
    amounts
        .iter()
        .enumerate()
        .map(|(i, amount)| {
            let address = if i % 2 == 0 { RECIPIENT } else { OTHER_RECIPIENT };
            Recipient::new(address, *amount)
        })
        .collect()
}

pub fn sat_per_vb(rate: f64) -> FeeRate {
    FeeRate::from_sat_per_vb(rate)
}

/// Assemble on regtest paying change to [`CHANGE`].
pub fn build(input_values: &[u64], amounts: &[u64], fee_rate: f64) -> Result<UnsignedTx> {
    assemble(
        &utxos(input_values),
        &recipients(amounts),
        sat_per_vb(fee_rate),
        CHANGE,
        NETWORK,
    )
}

#[derive(Debug, Clone)]
pub struct StrategyParams {
    pub input_values: Vec<u64>,
    pub amounts: Vec<u64>,
    /// Fee rate in tenths of a sat/vB, the precision users usually type.
    pub fee_rate_tenths: u64,
}

impl StrategyParams {
    pub fn total_input(&self) -> u64 {
        self.input_values.iter().sum()
    }

    pub fn total_requested(&self) -> u64 {
        self.amounts.iter().sum()
    }

    pub fn fee_rate(&self) -> f64 {
        self.fee_rate_tenths as f64 / 10.0
    }

    /// The fee estimated assuming a change output, in integer arithmetic.
    pub fn fee_with_change(&self) -> u64 {
        let n_inputs = self.input_values.len() as u64;
        let n_outputs = self.amounts.len() as u64 + 1;
        let vsize = n_inputs * 148 + n_outputs * 34 + 10;
        vsize * self.fee_rate_tenths / 10
    }

    /// `total_input - total_requested - fee_with_change`
    pub fn leftover(&self) -> i128 {
        self.total_input() as i128 - self.total_requested() as i128 - self.fee_with_change() as i128
    }

    pub fn build(&self) -> Result<UnsignedTx> {
        build(&self.input_values, &self.amounts, self.fee_rate())
    }
}

pub fn arb_params() -> impl Strategy<Value = StrategyParams> {
    (
        prop::collection::vec(1_u64..5_000_000, 1..8),
        prop::collection::vec(1_u64..2_000_000, 1..5),
        0_u64..1_000,
    )
        .prop_map(|(input_values, amounts, fee_rate_tenths)| StrategyParams {
            input_values,
            amounts,
            fee_rate_tenths,
        })
}
