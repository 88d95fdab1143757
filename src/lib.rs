#![doc = include_str!("../README.md")]
#![warn(missing_docs)]
#![deny(unsafe_code)]

mod error;
pub use error::*;

mod feerate;
pub use feerate::*;
mod target;
pub use target::*;
mod drain;
pub use drain::*;
mod change_policy;
pub use change_policy::*;
mod utxo;
pub use utxo::*;

mod assembler;
pub use assembler::*;
mod unsigned_tx;
pub use unsigned_tx::*;
mod analyzer;
pub use analyzer::*;

pub mod config;

/// Estimated size in vbytes that each input adds to a transaction.
///
/// This is the size of a legacy P2PKH spend and is used for every input regardless of its
/// script type.
pub const INPUT_VSIZE: u64 = 148;

/// Estimated size in vbytes that each output adds to a transaction.
pub const OUTPUT_VSIZE: u64 = 34;

/// Estimated size in vbytes of the fixed transaction fields (version, locktime and the input
/// and output counts).
pub const TX_OVERHEAD_VSIZE: u64 = 10;

/// The value at or below which leftover value is given to miners instead of being returned as a
/// change output.
pub const DEFAULT_DUST_THRESHOLD: u64 = 546;

/// Estimate the virtual size of a transaction with `input_count` inputs and `output_count`
/// outputs.
///
/// This does not look at scripts or witnesses. Every input costs [`INPUT_VSIZE`], every output
/// [`OUTPUT_VSIZE`], plus [`TX_OVERHEAD_VSIZE`] once.
pub const fn estimated_vsize(input_count: usize, output_count: usize) -> u64 {
    input_count as u64 * INPUT_VSIZE + output_count as u64 * OUTPUT_VSIZE + TX_OVERHEAD_VSIZE
}

/// The fee a transaction with `input_count` inputs and `output_count` outputs pays at
/// `fee_rate`, rounded down to the satoshi.
pub fn estimate_fee(input_count: usize, output_count: usize, fee_rate: FeeRate) -> u64 {
    fee_rate.implied_fee(estimated_vsize(input_count, output_count))
}
