//! Fixed identifier layout:
//!
//! | ids   | channel |
//! |-------|---------|
//! | 1-4   | R       |
//! | 5-8   | G       |
//! | 9-12  | B       |
//! | 13-16 | A       |

use crate::foundation::core::{Channel, Identifier, SLOTS_PER_CHANNEL};
use crate::foundation::error::IdMaskResult;

/// Where an identifier lives in the packed output.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize)]
pub struct ChannelSlot {
    /// Owning channel.
    pub channel: Channel,
    /// Slot within the channel, `1..=4`.
    pub slot: u8,
}

/// Channel and slot of a validated identifier.
pub fn channel_of(id: Identifier) -> ChannelSlot {
    let i = id.index();
    ChannelSlot {
        channel: Channel::ALL[i / SLOTS_PER_CHANNEL],
        slot: (i % SLOTS_PER_CHANNEL) as u8 + 1,
    }
}

/// Channel and slot of a raw identifier number. Rejects numbers outside `1..=16`.
pub fn channel_of_raw(id: u32) -> IdMaskResult<ChannelSlot> {
    Identifier::new(id).map(channel_of)
}

/// The four identifiers owned by `channel`, ascending.
pub fn identifiers_of(channel: Channel) -> [Identifier; SLOTS_PER_CHANNEL] {
    let base = channel.index() * SLOTS_PER_CHANNEL;
    std::array::from_fn(|slot| Identifier::from_index(base + slot))
}

#[cfg(test)]
#[path = "../../tests/unit/channel/assignment.rs"]
mod tests;
