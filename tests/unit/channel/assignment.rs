use super::*;
use crate::foundation::error::IdMaskError;

fn id(n: u32) -> Identifier {
    Identifier::new(n).unwrap()
}

#[test]
fn layout_matches_table() {
    let expect = [
        (1, Channel::R, 1),
        (4, Channel::R, 4),
        (5, Channel::G, 1),
        (8, Channel::G, 4),
        (9, Channel::B, 1),
        (11, Channel::B, 3),
        (13, Channel::A, 1),
        (16, Channel::A, 4),
    ];
    for (n, channel, slot) in expect {
        assert_eq!(channel_of(id(n)), ChannelSlot { channel, slot }, "id {n}");
    }
}

#[test]
fn every_channel_owns_exactly_four_ids() {
    for ch in Channel::ALL {
        let owned = Identifier::all()
            .filter(|i| channel_of(*i).channel == ch)
            .count();
        assert_eq!(owned, 4);
    }
}

#[test]
fn identifiers_of_is_inverse_of_channel_of() {
    for ch in Channel::ALL {
        for (slot, i) in identifiers_of(ch).into_iter().enumerate() {
            let cs = channel_of(i);
            assert_eq!(cs.channel, ch);
            assert_eq!(usize::from(cs.slot), slot + 1);
        }
    }
}

#[test]
fn raw_lookup_rejects_out_of_range() {
    assert!(matches!(
        channel_of_raw(0),
        Err(IdMaskError::InvalidIdentifier(0))
    ));
    assert!(matches!(
        channel_of_raw(17),
        Err(IdMaskError::InvalidIdentifier(17))
    ));
    assert_eq!(channel_of_raw(6).unwrap().channel, Channel::G);
}
