use bitcoin::ScriptBuf;
use utxo_psbt::{
    decide_change, estimate_fee, estimated_vsize, ChangePolicy, Drain, Error, FeeRate,
    DEFAULT_DUST_THRESHOLD,
};

#[test]
fn vsize_uses_fixed_weights() {
    assert_eq!(estimated_vsize(0, 0), 10);
    assert_eq!(estimated_vsize(1, 2), 226);
    assert_eq!(estimated_vsize(3, 1), 3 * 148 + 34 + 10);
}

#[test]
fn fee_is_rounded_down() {
    assert_eq!(estimate_fee(1, 2, FeeRate::from_sat_per_vb(1.0)), 226);
    assert_eq!(estimate_fee(1, 2, FeeRate::from_sat_per_vb(0.5)), 113);
    // 192 * 1.1 = 211.2
    assert_eq!(estimate_fee(1, 1, FeeRate::from_sat_per_vb(1.1)), 211);
    assert_eq!(estimate_fee(5, 5, FeeRate::ZERO), 0);
}

#[test]
fn decimal_rates_are_exact() {
    // 670 * 1.4 = 938, although 670.0 * 1.4 is 937.99.. in f64
    assert_eq!(estimate_fee(4, 2, FeeRate::from_sat_per_vb(1.4)), 938);
    for (tenths, n_inputs, n_outputs) in [(7, 1, 1), (23, 2, 3), (28, 4, 2), (41, 3, 5)] {
        let vsize = estimated_vsize(n_inputs, n_outputs);
        assert_eq!(
            estimate_fee(n_inputs, n_outputs, FeeRate::from_sat_per_vb(tenths as f64 / 10.0)),
            vsize * tenths / 10,
            "{} tenths of a sat/vB over {} vbytes",
            tenths,
            vsize
        );
    }
}

#[test]
fn huge_rates_saturate() {
    assert_eq!(estimate_fee(1, 1, FeeRate::from_sat_per_vb(1e30)), u64::MAX);
}

#[test]
fn feerate_validation() {
    assert!(FeeRate::try_from_sat_per_vb(0.0).unwrap().is_zero());
    assert_eq!(
        FeeRate::try_from_sat_per_vb(12.5).unwrap(),
        FeeRate::from_sat_per_vb(12.5)
    );
    for bad in [-1.0, f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
        let err = FeeRate::try_from_sat_per_vb(bad).unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)), "{:?}", err);
    }
}

#[test]
#[should_panic]
fn negative_feerate_literal_panics() {
    let _ = FeeRate::from_sat_per_vb(-0.5);
}

#[test]
fn feerate_from_fee_and_size() {
    assert_eq!(FeeRate::from_vb(452, 226).as_sat_vb(), 2.0);
    assert_eq!(FeeRate::default(), FeeRate::DEFAULT_MIN_RELAY);
}

#[test]
fn change_above_dust() {
    assert_eq!(decide_change(100_000, 50_000, 226), Ok(Some(49_774)));
    assert_eq!(
        decide_change(50_000 + 226 + DEFAULT_DUST_THRESHOLD + 1, 50_000, 226),
        Ok(Some(DEFAULT_DUST_THRESHOLD + 1))
    );
}

#[test]
fn no_change_at_or_below_dust() {
    assert_eq!(decide_change(50_500, 50_000, 226), Ok(None));
    assert_eq!(decide_change(50_226, 50_000, 226), Ok(None));
    assert_eq!(
        decide_change(50_000 + 226 + DEFAULT_DUST_THRESHOLD, 50_000, 226),
        Ok(None)
    );
}

#[test]
fn insufficient_funds_reports_what_is_missing() {
    assert_eq!(
        decide_change(50_225, 50_000, 226),
        Err(Error::InsufficientFunds { missing: 1 })
    );
    assert_eq!(
        decide_change(0, u64::MAX, u64::MAX),
        Err(Error::InsufficientFunds { missing: u64::MAX })
    );
}

#[test]
fn custom_dust_threshold() {
    let policy = ChangePolicy::min_value(0);
    assert_eq!(policy.drain_value(1_001, 1_000, 0), Ok(Some(1)));
    assert_eq!(policy.drain_value(1_000, 1_000, 0), Ok(None));

    let policy = ChangePolicy::min_value(10_000);
    assert_eq!(policy.drain_value(100_000, 80_000, 10_000), Ok(None));
    assert_eq!(ChangePolicy::default().dust_threshold, 546);
}

#[test]
fn drain_carries_the_change_script() {
    let script = ScriptBuf::from_hex("0014751e76e8199196d454941c45d1b3a323f1433bd6").unwrap();
    let policy = ChangePolicy::default();

    let drain = policy.drain(100_000, 50_000, 226, script.clone()).unwrap();
    assert!(drain.is_some());
    let txout = drain.to_txout().unwrap();
    assert_eq!(txout.value.to_sat(), 49_774);
    assert_eq!(txout.script_pubkey, script);

    let drain = policy.drain(50_500, 50_000, 226, script).unwrap();
    assert_eq!(drain, Drain::none());
    assert!(drain.to_txout().is_none());
}
