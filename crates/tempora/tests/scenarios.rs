use tempora::{
    ops::{lift1_for, lift2_for, Operator},
    serde_format::{from_wkb, to_wkb, Endianness},
    sync,
    value::{Instant, InstantSet, SequenceBuilder, SequenceSetBuilder, Temporal},
    BaseValue, Interpolation, Timestamp,
};

fn ts(text: &str) -> Timestamp {
    Timestamp::parse(text).unwrap()
}

#[test]
fn scenario_1_linear_value_at_timestamp() {
    let s = SequenceBuilder::new(Interpolation::Linear)
        .instant(ts("2024-01-01T00:00:00.000000Z"), BaseValue::Float(0.0))
        .instant(ts("2024-01-01T00:10:00.000000Z"), BaseValue::Float(10.0))
        .build()
        .unwrap();

    let at_7 = s.value_at_timestamp(ts("2024-01-01T00:07:00.000000Z")).unwrap().unwrap();
    assert_eq!(at_7, BaseValue::Float(7.0));

    let at_10 = s.value_at_timestamp(ts("2024-01-01T00:10:00.000000Z")).unwrap().unwrap();
    assert_eq!(at_10, BaseValue::Float(10.0));

    assert!(s.value_at_timestamp(ts("2024-01-01T00:11:00.000000Z")).unwrap().is_none());
}

#[test]
fn scenario_2_boolean_and_over_instant_sets() {
    let t1 = Timestamp::from_micros(1);
    let t3 = Timestamp::from_micros(3);
    let t4 = Timestamp::from_micros(4);

    let a = Temporal::InstantSet(
        InstantSet::new(vec![
            Instant::new(t1, BaseValue::Boolean(true)),
            Instant::new(t3, BaseValue::Boolean(false)),
            Instant::new(Timestamp::from_micros(2), BaseValue::Boolean(true)),
        ])
        .unwrap(),
    );
    let b = Temporal::InstantSet(
        InstantSet::new(vec![
            Instant::new(t1, BaseValue::Boolean(true)),
            Instant::new(t3, BaseValue::Boolean(false)),
            Instant::new(t4, BaseValue::Boolean(true)),
        ])
        .unwrap(),
    );

    let and_op = lift2_for(Operator::And).unwrap();
    let result = sync::lift2(&*and_op, &a, &b).unwrap().unwrap();
    let Temporal::InstantSet(set) = &result else { panic!("expected an instant set") };

    assert_eq!(set.value_at_timestamp(t1), Some(&BaseValue::Boolean(true)));
    assert_eq!(set.value_at_timestamp(t3), Some(&BaseValue::Boolean(false)));
    assert_eq!(set.value_at_timestamp(t4), None);
}

#[test]
fn scenario_3_comparison_splices_in_a_crossing() {
    let a = Temporal::Sequence(
        SequenceBuilder::new(Interpolation::Linear)
            .instant(Timestamp::from_micros(0), BaseValue::Float(-1.0))
            .instant(Timestamp::from_micros(10), BaseValue::Float(3.0))
            .build()
            .unwrap(),
    );
    let b = Temporal::Sequence(
        SequenceBuilder::new(Interpolation::Linear)
            .instant(Timestamp::from_micros(0), BaseValue::Float(0.0))
            .instant(Timestamp::from_micros(10), BaseValue::Float(0.0))
            .build()
            .unwrap(),
    );

    let lt_op = lift2_for(Operator::Lt).unwrap();
    let result = sync::lift2(&*lt_op, &a, &b).unwrap().unwrap();
    let Temporal::SequenceSet(set) = &result else { panic!("expected a sequence set") };

    // `<` is strict, so the crossing at t=3 belongs to neither piece: the
    // pre-crossing piece ends just before it and the post-crossing piece
    // starts just after, leaving a one-instant gap at the crossing itself.
    assert_eq!(set.sequences().len(), 2);
    let (before, after) = (&set.sequences()[0], &set.sequences()[1]);
    assert_eq!(before.period().upper(), Timestamp::from_micros(3));
    assert!(!before.upper_inc());
    assert_eq!(after.period().lower(), Timestamp::from_micros(3));
    assert!(!after.lower_inc());
    assert_eq!(before.instants().last().unwrap().value(), &BaseValue::Boolean(true));
    assert_eq!(after.instants()[0].value(), &BaseValue::Boolean(false));
}

#[test]
fn scenario_3b_non_strict_comparison_folds_the_crossing_inclusively() {
    let a = Temporal::Sequence(
        SequenceBuilder::new(Interpolation::Linear)
            .instant(Timestamp::from_micros(0), BaseValue::Float(-2.0))
            .instant(Timestamp::from_micros(10), BaseValue::Float(2.0))
            .build()
            .unwrap(),
    );
    let b = Temporal::Sequence(
        SequenceBuilder::new(Interpolation::Linear)
            .instant(Timestamp::from_micros(0), BaseValue::Float(0.0))
            .instant(Timestamp::from_micros(10), BaseValue::Float(0.0))
            .build()
            .unwrap(),
    );

    let le_op = lift2_for(Operator::Le).unwrap();
    let result = sync::lift2(&*le_op, &a, &b).unwrap().unwrap();
    let Temporal::SequenceSet(set) = &result else { panic!("expected a sequence set") };

    // `<=` holds at equality, so the crossing at t=5 folds into the piece
    // whose constant value matches it — here the "true" (pre-crossing)
    // side, since `le(0, 0)` is true. No gap results, unlike `<`.
    assert_eq!(set.sequences().len(), 2);
    let (before, after) = (&set.sequences()[0], &set.sequences()[1]);
    assert_eq!(before.period().upper(), Timestamp::from_micros(5));
    assert!(before.upper_inc());
    assert_eq!(after.period().lower(), Timestamp::from_micros(5));
    assert!(!after.lower_inc());

    assert_eq!(result.value_at_timestamp(Timestamp::from_micros(5)).unwrap(), Some(BaseValue::Boolean(true)));
    // The point the review's example hinged on: strictly after the
    // crossing, `a(7) = 0.8 > 0`, so `le` must read false there, not hold
    // over from the crossing's own true value.
    assert_eq!(result.value_at_timestamp(Timestamp::from_micros(7)).unwrap(), Some(BaseValue::Boolean(false)));
}

#[test]
fn scenario_4_product_splices_in_a_turning_point() {
    let a = Temporal::Sequence(
        SequenceBuilder::new(Interpolation::Linear)
            .instant(Timestamp::from_micros(0), BaseValue::Float(-1.0))
            .instant(Timestamp::from_micros(10), BaseValue::Float(1.0))
            .build()
            .unwrap(),
    );
    let b = Temporal::Sequence(
        SequenceBuilder::new(Interpolation::Linear)
            .instant(Timestamp::from_micros(0), BaseValue::Float(1.0))
            .instant(Timestamp::from_micros(10), BaseValue::Float(-1.0))
            .build()
            .unwrap(),
    );

    let mul_op = lift2_for(Operator::Mul).unwrap();
    let result = sync::lift2(&*mul_op, &a, &b).unwrap().unwrap();
    let Temporal::Sequence(s) = &result else { panic!("expected a sequence") };

    assert_eq!(s.instants().len(), 3);
    assert_eq!(s.instants()[0].value(), &BaseValue::Float(-1.0));
    assert_eq!(s.instants()[1].timestamp(), Timestamp::from_micros(5));
    assert_eq!(s.instants()[1].value(), &BaseValue::Float(0.0));
    assert_eq!(s.instants()[2].value(), &BaseValue::Float(-1.0));
}

#[test]
fn scenario_5_normalization_merges_touching_sequences() {
    let a = SequenceBuilder::new(Interpolation::Linear)
        .instant(Timestamp::from_micros(0), BaseValue::Float(0.0))
        .instant(Timestamp::from_micros(10), BaseValue::Float(10.0))
        .build()
        .unwrap();
    let b = SequenceBuilder::new(Interpolation::Linear)
        .instant(Timestamp::from_micros(10), BaseValue::Float(10.0))
        .instant(Timestamp::from_micros(20), BaseValue::Float(20.0))
        .build()
        .unwrap();

    let set = SequenceSetBuilder::new().sequence(a).sequence(b).build_normalized().unwrap();
    assert_eq!(set.sequences().len(), 1);
    let merged = &set.sequences()[0];
    assert_eq!(merged.instants().len(), 2);
    assert_eq!(merged.instants()[0].value(), &BaseValue::Float(0.0));
    assert_eq!(merged.instants()[1].value(), &BaseValue::Float(20.0));
}

#[test]
fn scenario_6_wkb_round_trip_is_identity() {
    let s = Temporal::Sequence(
        SequenceBuilder::new(Interpolation::Linear)
            .instant(Timestamp::from_micros(0), BaseValue::Float(1.0))
            .instant(Timestamp::from_micros(1), BaseValue::Float(2.0))
            .build()
            .unwrap(),
    );

    let bytes = to_wkb(&s, Endianness::Little);
    assert_eq!(bytes[0], 0x01);

    let decoded = from_wkb(&bytes).unwrap();
    assert_eq!(decoded, s);

    let big = to_wkb(&s, Endianness::Big);
    let decoded_big = from_wkb(&big).unwrap();
    assert_eq!(decoded_big, s);
}

#[test]
fn not_operator_lifts_over_a_sequence_pointwise() {
    let a = Temporal::Sequence(
        SequenceBuilder::new(Interpolation::Stepwise)
            .instant(Timestamp::from_micros(0), BaseValue::Boolean(true))
            .instant(Timestamp::from_micros(10), BaseValue::Boolean(false))
            .build()
            .unwrap(),
    );
    let not_op = lift1_for(Operator::Not).unwrap();
    let result = sync::lift1(&*not_op, &a).unwrap();
    assert_eq!(result.value_at_timestamp(Timestamp::from_micros(0)).unwrap(), Some(BaseValue::Boolean(false)));
    assert_eq!(result.value_at_timestamp(Timestamp::from_micros(10)).unwrap(), Some(BaseValue::Boolean(true)));
}
