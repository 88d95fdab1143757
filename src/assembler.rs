use crate::{
    estimate_fee, target::parse_address, ChangePolicy, Drain, Error, FeeRate, Recipient,
    Result, TargetOutputs, UnsignedTx, Utxo,
};
use bitcoin::{
    absolute::LockTime, transaction::Version, Amount, Network, Psbt, ScriptBuf, Sequence,
    Transaction, TxIn, TxOut, Witness,
};
use std::collections::HashSet;

/// [`TxAssembler`] turns already selected UTXOs and the requested payments into an
/// [`UnsignedTx`].
///
/// Inputs and outputs keep the order they were given in. The only output the assembler adds on
/// its own is the change output, which always comes last.
///
/// ```
/// # use utxo_psbt::{FeeRate, Recipient, TxAssembler, Utxo};
/// # use bitcoin::{Network, OutPoint, ScriptBuf};
/// let utxos = [Utxo {
///     outpoint: OutPoint::null(),
///     value: 100_000,
///     script_pubkey: ScriptBuf::new(),
///     height: 100,
/// }];
/// let recipients = [Recipient::new("bcrt1qw508d6qejxtdg4y5r3zarvary0c5xw7kygt080", 50_000)];
///
/// let tx = TxAssembler::new(&utxos, &recipients)
///     .fee_rate(FeeRate::from_sat_per_vb(1.0))
///     .change_address("bcrt1qw508d6qejxtdg4y5r3zarvary0c5xw7kygt080")
///     .network(Network::Regtest)
///     .assemble()?;
///
/// assert_eq!(tx.fee_estimate(), 226);
/// assert_eq!(tx.change_value(), Some(49_774));
/// # Ok::<(), utxo_psbt::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct TxAssembler<'a> {
    utxos: &'a [Utxo],
    recipients: &'a [Recipient],
    fee_rate: FeeRate,
    change_policy: ChangePolicy,
    change_address: Option<String>,
    network: Network,
    reestimate_changeless: bool,
}

impl<'a> TxAssembler<'a> {
    /// Creates a new assembler spending `utxos` to pay `recipients`.
    ///
    /// The defaults are a fee rate of [`FeeRate::DEFAULT_MIN_RELAY`], the default
    /// [`ChangePolicy`], regtest addresses and no change address.
    pub fn new(utxos: &'a [Utxo], recipients: &'a [Recipient]) -> Self {
        Self {
            utxos,
            recipients,
            fee_rate: FeeRate::default(),
            change_policy: ChangePolicy::default(),
            change_address: None,
            network: Network::Regtest,
            reestimate_changeless: false,
        }
    }

    /// Set the fee rate used to estimate the fee.
    pub fn fee_rate(mut self, fee_rate: FeeRate) -> Self {
        self.fee_rate = fee_rate;
        self
    }

    /// Set the policy deciding whether leftover value becomes a change output.
    pub fn change_policy(mut self, change_policy: ChangePolicy) -> Self {
        self.change_policy = change_policy;
        self
    }

    /// Set where change is sent. Only required if the transaction ends up with change.
    pub fn change_address(mut self, address: impl Into<String>) -> Self {
        self.change_address = Some(address.into());
        self
    }

    /// Set the network that recipient and change addresses must belong to.
    pub fn network(mut self, network: Network) -> Self {
        self.network = network;
        self
    }

    /// When set, a transaction that ends up without change has its fee estimated for the outputs
    /// it actually has instead of assuming a change output.
    ///
    /// Off by default: the fee is always estimated as if change were present, so changeless
    /// transactions slightly overpay.
    pub fn reestimate_changeless(mut self, reestimate: bool) -> Self {
        self.reestimate_changeless = reestimate;
        self
    }

    /// The UTXOs being spent.
    pub fn utxos(&self) -> &'a [Utxo] {
        self.utxos
    }

    /// Absolute value sum of all the UTXOs being spent.
    pub fn selected_value(&self) -> Result<u64> {
        self.utxos.iter().try_fold(0_u64, |sum, utxo| {
            sum.checked_add(utxo.value)
                .ok_or_else(|| Error::invalid_input("input total overflows"))
        })
    }

    /// The aggregate of the requested outputs.
    pub fn target(&self) -> Result<TargetOutputs> {
        TargetOutputs::fund_outputs(self.recipients)
    }

    /// The fee estimated for the transaction, with or without a change output.
    pub fn implied_fee(&self, n_outputs: usize) -> u64 {
        estimate_fee(self.utxos.len(), n_outputs, self.fee_rate)
    }

    fn validate(&self) -> Result<()> {
        if self.utxos.is_empty() {
            return Err(Error::invalid_input("no UTXOs to spend"));
        }
        if self.recipients.is_empty() {
            return Err(Error::invalid_input("at least one output is required"));
        }
        let mut seen = HashSet::with_capacity(self.utxos.len());
        for utxo in self.utxos {
            if !seen.insert(utxo.outpoint) {
                return Err(Error::InvalidInput(format!(
                    "outpoint {} is spent twice",
                    utxo.outpoint
                )));
            }
        }
        Ok(())
    }

    /// Work out the fee and the change value, if any.
    fn fee_and_change(
        &self,
        total_input: u64,
        target: TargetOutputs,
    ) -> Result<(u64, Option<u64>)> {
        let fee_with_change = self.implied_fee(target.n_outputs_with_change());
        let outcome = self
            .change_policy
            .drain_value(total_input, target.value_sum, fee_with_change);

        match outcome {
            Ok(Some(change)) => Ok((fee_with_change, Some(change))),
            _ if self.reestimate_changeless => {
                let fee = self.implied_fee(target.n_outputs);
                // Leftover that could only appear without the change output's cost is absorbed.
                self.change_policy
                    .drain_value(total_input, target.value_sum, fee)?;
                Ok((fee, None))
            }
            outcome => Ok((fee_with_change, outcome?)),
        }
    }

    /// Assemble the unsigned transaction.
    ///
    /// Fails with [`Error::InvalidInput`] if there is nothing to spend, nothing to pay, an amount
    /// is zero, an address is invalid or change is needed without a change address. Fails with
    /// [`Error::InsufficientFunds`] if the UTXOs don't cover the outputs and the estimated fee.
    #[tracing::instrument(level = "debug", skip_all, err)]
    pub fn assemble(&self) -> Result<UnsignedTx> {
        self.validate()?;
        let target = self.target()?;
        let total_input = self.selected_value()?;

        let mut output = self
            .recipients
            .iter()
            .map(|recipient| {
                Ok(TxOut {
                    value: Amount::from_sat(recipient.amount),
                    script_pubkey: recipient.script_pubkey(self.network)?,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let (fee, change) = self.fee_and_change(total_input, target)?;
        tracing::debug!(
            total_input,
            total_requested = target.value_sum,
            fee,
            ?change,
            "decided fee and change"
        );

        let drain = match change {
            Some(value) => {
                let address = self.change_address.as_deref().ok_or_else(|| {
                    Error::InvalidInput(format!(
                        "change of {} sats requires a change address",
                        value
                    ))
                })?;
                let change_script = parse_address(address, self.network)?.script_pubkey();
                self.change_policy
                    .drain(total_input, target.value_sum, fee, change_script)?
            }
            None => Drain::none(),
        };
        let change_index = drain.to_txout().map(|txout| {
            output.push(txout);
            output.len() - 1
        });

        let input = self
            .utxos
            .iter()
            .map(|utxo| TxIn {
                previous_output: utxo.outpoint,
                script_sig: ScriptBuf::new(),
                sequence: Sequence::MAX,
                witness: Witness::default(),
            })
            .collect();

        let unsigned_tx = Transaction {
            version: Version::TWO,
            lock_time: LockTime::ZERO,
            input,
            output,
        };

        let mut psbt = Psbt::from_unsigned_tx(unsigned_tx)
            .map_err(|e| Error::InvalidInput(format!("cannot create PSBT: {}", e)))?;
        for (psbt_input, utxo) in psbt.inputs.iter_mut().zip(self.utxos) {
            psbt_input.witness_utxo = Some(utxo.txout());
        }

        tracing::debug!(
            inputs = psbt.inputs.len(),
            outputs = psbt.outputs.len(),
            "assembled unsigned transaction"
        );

        Ok(UnsignedTx::new(psbt, self.network, fee, change_index))
    }
}

/// Assemble an unsigned transaction spending `utxos` to pay `recipients` at `fee_rate`, sending
/// any change above [`DEFAULT_DUST_THRESHOLD`](crate::DEFAULT_DUST_THRESHOLD) to
/// `change_address`.
///
/// See [`TxAssembler`] for more control.
pub fn assemble(
    utxos: &[Utxo],
    recipients: &[Recipient],
    fee_rate: FeeRate,
    change_address: &str,
    network: Network,
) -> Result<UnsignedTx> {
    TxAssembler::new(utxos, recipients)
        .fee_rate(fee_rate)
        .change_address(change_address)
        .network(network)
        .assemble()
}
