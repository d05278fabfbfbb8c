//! Override fold that packs a channel's active identifier masks into one scalar.
//!
//! `v = 0; for (id, mask) in ascending ids: v = lerp(v, gray(id), mask)`
//!
//! A later identifier with mask 1 replaces everything before it, mask 0 is a no-op,
//! anything in between blends linearly. Priority is the identifier number and is never
//! taken from the caller.

use crate::channel::assignment::channel_of;
use crate::channel::preset::preset_for;
use crate::config::model::MaterialIdConfig;
use crate::foundation::core::{Channel, ID_COUNT, Identifier, SLOTS_PER_CHANNEL};
use crate::foundation::math::lerp;
use smallvec::SmallVec;

/// Fold `(identifier, mask)` pairs of one channel into its packed value.
///
/// Pairs are folded in ascending identifier order whatever order they arrive in. The gray level
/// of each identifier is its rank in the preset for `ordered_active.len()`.
///
/// Identifiers must be distinct and belong to one channel; anything else is not a channel fold.
pub fn compose(ordered_active: &[(Identifier, f32)]) -> f32 {
    let mut pairs: SmallVec<[(Identifier, f32); SLOTS_PER_CHANNEL]> =
        ordered_active.iter().copied().collect();
    pairs.sort_by_key(|(id, _)| *id);
    debug_assert!(
        pairs.windows(2).all(|w| w[0].0 != w[1].0
            && channel_of(w[0].0).channel == channel_of(w[1].0).channel),
        "compose takes distinct identifiers of a single channel"
    );

    let preset = preset_for(pairs.len());
    pairs
        .iter()
        .enumerate()
        .fold(0.0, |v, (rank, (_, mask))| lerp(v, preset.level(rank), *mask))
}

/// Identity echo of a mask, exposed as the `IDxx_Mask` pass-through output.
pub fn pass_through(mask: f32) -> f32 {
    mask
}

/// One fold step: identifier and the gray level it overrides with.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct ChannelStep {
    /// Identifier whose mask drives this step.
    pub id: Identifier,
    /// Gray level written where the mask is 1.
    pub gray: f32,
}

/// Resolved fold for one channel of a given config.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct ChannelPlan {
    /// Channel this plan packs.
    pub channel: Channel,
    /// Steps in fold order (ascending identifier).
    pub steps: SmallVec<[ChannelStep; SLOTS_PER_CHANNEL]>,
}

impl ChannelPlan {
    /// Resolve the fold for `channel` from `config`.
    pub fn resolve(channel: Channel, config: &MaterialIdConfig) -> Self {
        let used = config.active_in(channel);
        let preset = preset_for(used.len());
        let steps = used
            .iter()
            .enumerate()
            .map(|(rank, id)| ChannelStep {
                id: *id,
                gray: preset.level(rank),
            })
            .collect();
        Self { channel, steps }
    }

    /// Evaluate the fold against per-identifier masks (index `id - 1`).
    pub fn evaluate(&self, masks: &[f32; ID_COUNT]) -> f32 {
        self.steps
            .iter()
            .fold(0.0, |v, step| lerp(v, step.gray, masks[step.id.index()]))
    }
}

/// Packed values produced by a core graph.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct PackedIds {
    /// `(compose(R), compose(G), compose(B))`.
    pub rgb: [f32; 3],
    /// `compose(A)`.
    pub alpha: f32,
    /// Per-identifier pass-through masks.
    pub masks: [f32; ID_COUNT],
}

/// All four channel folds of one config.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct CorePlan {
    /// Plans in `R, G, B, A` order.
    pub channels: [ChannelPlan; 4],
}

impl CorePlan {
    /// Resolve every channel of `config`.
    pub fn resolve(config: &MaterialIdConfig) -> Self {
        Self {
            channels: Channel::ALL.map(|ch| ChannelPlan::resolve(ch, config)),
        }
    }

    /// Plan of a single channel.
    pub fn channel(&self, channel: Channel) -> &ChannelPlan {
        &self.channels[channel.index()]
    }

    /// Reference evaluation of the whole core.
    pub fn evaluate(&self, masks: &[f32; ID_COUNT]) -> PackedIds {
        PackedIds {
            rgb: [
                self.channels[0].evaluate(masks),
                self.channels[1].evaluate(masks),
                self.channels[2].evaluate(masks),
            ],
            alpha: self.channels[3].evaluate(masks),
            masks: masks.map(pass_through),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/channel/composer.rs"]
mod tests;
