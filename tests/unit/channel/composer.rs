use super::*;
use proptest::prelude::*;

fn id(n: u32) -> Identifier {
    Identifier::new(n).unwrap()
}

fn close(a: f32, b: f32) -> bool {
    (a - b).abs() < 1e-6
}

#[test]
fn empty_channel_composes_to_zero() {
    assert_eq!(compose(&[]), 0.0);
    let plan = CorePlan::resolve(&MaterialIdConfig::new());
    let out = plan.evaluate(&[1.0; ID_COUNT]);
    assert_eq!(out.rgb, [0.0, 0.0, 0.0]);
    assert_eq!(out.alpha, 0.0);
}

#[test]
fn later_full_mask_overrides_earlier() {
    // G holds [5, 6] -> presets [0.05, 1.0]
    assert!(close(compose(&[(id(5), 1.0), (id(6), 1.0)]), 1.0));
}

#[test]
fn zero_mask_is_a_no_op() {
    assert!(close(compose(&[(id(1), 1.0), (id(2), 0.0)]), 0.05));
}

#[test]
fn three_active_middle_mask() {
    let v = compose(&[(id(1), 0.0), (id(3), 1.0), (id(4), 0.0)]);
    assert!(close(v, 0.397), "{v}");
}

#[test]
fn fold_order_comes_from_identifier_not_caller() {
    let ordered = compose(&[(id(1), 1.0), (id(2), 1.0)]);
    let shuffled = compose(&[(id(2), 1.0), (id(1), 1.0)]);
    assert_eq!(ordered, shuffled);
    assert!(close(ordered, 1.0));
}

#[test]
#[cfg(debug_assertions)]
#[should_panic(expected = "distinct identifiers of a single channel")]
fn repeated_identifier_is_rejected() {
    compose(&[(id(1), 1.0), (id(1), 0.0)]);
}

#[test]
#[cfg(debug_assertions)]
#[should_panic(expected = "distinct identifiers of a single channel")]
fn identifiers_from_two_channels_are_rejected() {
    compose(&[(id(1), 1.0), (id(16), 0.0)]);
}

#[test]
fn partial_mask_blends_linearly() {
    // single id -> gray 1.0, half mask -> 0.5
    assert!(close(compose(&[(id(9), 0.5)]), 0.5));
    // [0.05, 1.0]: 0.05 then lerp(0.05, 1.0, 0.5)
    assert!(close(compose(&[(id(13), 1.0), (id(14), 0.5)]), 0.525));
}

#[test]
fn plan_matches_direct_compose() {
    let cfg = MaterialIdConfig::from_ids([1, 3, 4, 6, 7, 12, 13, 14, 15, 16]).unwrap();
    let plan = CorePlan::resolve(&cfg);
    let mut masks = [0.0f32; ID_COUNT];
    for (i, m) in masks.iter_mut().enumerate() {
        *m = (i as f32 * 0.37).fract();
    }
    let out = plan.evaluate(&masks);
    for ch in Channel::ALL {
        let pairs: Vec<(Identifier, f32)> = cfg
            .active_in(ch)
            .iter()
            .map(|i| (*i, masks[i.index()]))
            .collect();
        let expect = compose(&pairs);
        let got = if ch == Channel::A {
            out.alpha
        } else {
            out.rgb[ch.index()]
        };
        assert_eq!(got, expect, "channel {ch:?}");
    }
    assert_eq!(out.masks, masks);
}

#[test]
fn inactive_identifiers_contribute_nothing() {
    let cfg = MaterialIdConfig::from_ids([2]).unwrap();
    let plan = CorePlan::resolve(&cfg);
    let mut masks = [1.0f32; ID_COUNT];
    masks[1] = 0.0;
    assert_eq!(plan.evaluate(&masks).rgb[0], 0.0);
}

#[test]
fn steps_carry_preset_levels() {
    let cfg = MaterialIdConfig::from_ids([9, 10, 11, 12]).unwrap();
    let plan = CorePlan::resolve(&cfg);
    let grays: Vec<f32> = plan.channel(Channel::B).steps.iter().map(|s| s.gray).collect();
    assert_eq!(grays, vec![0.05, 0.212, 0.521, 1.0]);
}

proptest! {
    #[test]
    fn result_stays_in_unit_range(masks in proptest::collection::vec(0.0f32..=1.0, 1..=4)) {
        let pairs: Vec<(Identifier, f32)> = masks
            .iter()
            .enumerate()
            .map(|(i, m)| (id(i as u32 + 1), *m))
            .collect();
        let v = compose(&pairs);
        prop_assert!((0.0..=1.0 + 1e-6).contains(&v));
    }

    #[test]
    fn full_last_mask_yields_one(prefix in proptest::collection::vec(0.0f32..=1.0, 0..=3)) {
        let mut pairs: Vec<(Identifier, f32)> = prefix
            .iter()
            .enumerate()
            .map(|(i, m)| (id(i as u32 + 5), *m))
            .collect();
        pairs.push((id(8), 1.0));
        prop_assert!((compose(&pairs) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn all_zero_masks_yield_zero(n in 0usize..=4) {
        let pairs: Vec<(Identifier, f32)> = (0..n).map(|i| (id(i as u32 + 13), 0.0)).collect();
        prop_assert_eq!(compose(&pairs), 0.0);
    }
}
