use bitcoin::{Amount, ScriptBuf, TxOut};

/// A drain (A.K.A. change) output.
///
/// This is returned from [`ChangePolicy::drain`]. Note if `drain` returns a drain where
/// `is_none()` returns true then **no change should be added** to the transaction.
///
/// [`ChangePolicy::drain`]: crate::ChangePolicy::drain
#[derive(Clone, Debug, PartialEq, Eq, Hash, Default)]
pub struct Drain {
    /// The locking script the change is paid to.
    pub script_pubkey: ScriptBuf,
    /// The value that should be assigned to the drain.
    pub value: u64,
}

impl Drain {
    /// A drain representing no drain at all.
    pub fn none() -> Self {
        Self::default()
    }

    /// is the "none" drain
    pub fn is_none(&self) -> bool {
        self.value == 0
    }

    /// Is not the "none" drain
    pub fn is_some(&self) -> bool {
        !self.is_none()
    }

    /// The output to append to the transaction, if any.
    pub fn to_txout(&self) -> Option<TxOut> {
        if self.is_none() {
            return None;
        }
        Some(TxOut {
            value: Amount::from_sat(self.value),
            script_pubkey: self.script_pubkey.clone(),
        })
    }
}
