use crate::foundation::core::SLOTS_PER_CHANNEL;
use crate::foundation::error::{IdMaskError, IdMaskResult};

/// Gray levels per active-identifier count. Each row is strictly ascending and ends at `1.0`;
/// the values are spread for visual separation when the packed channel is viewed as grayscale.
const PRESETS: [&[f32]; SLOTS_PER_CHANNEL + 1] = [
    &[],
    &[1.0],
    &[0.05, 1.0],
    &[0.08, 0.397, 1.0],
    &[0.05, 0.212, 0.521, 1.0],
];

/// Result of a clamping preset lookup.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Preset {
    /// Gray levels, position `i` goes to the `i`-th active identifier (ascending).
    pub levels: &'static [f32],
    /// Count that was asked for. Differs from `levels.len()` only when clamped.
    pub requested: usize,
}

impl Preset {
    /// `true` when the requested count had no preset and the lookup fell back to the largest one.
    pub fn is_clamped(&self) -> bool {
        self.requested != self.levels.len()
    }

    /// Gray level for the identifier at `rank` among the channel's active identifiers.
    ///
    /// Ranks past the table yield `0.0` (the identifier contributes nothing).
    pub fn level(&self, rank: usize) -> f32 {
        self.levels.get(rank).copied().unwrap_or(0.0)
    }
}

/// Strict lookup: counts outside `0..=4` are an [`IdMaskError::UnknownPresetCount`].
pub fn try_preset_for(n: usize) -> IdMaskResult<&'static [f32]> {
    PRESETS
        .get(n)
        .copied()
        .ok_or(IdMaskError::UnknownPresetCount(n))
}

/// Clamping lookup. Counts above 4 fall back to the 4-level preset and log a warning.
pub fn preset_for(n: usize) -> Preset {
    match try_preset_for(n) {
        Ok(levels) => Preset {
            levels,
            requested: n,
        },
        Err(err) => {
            tracing::warn!(%err, "clamping gray-level preset to {SLOTS_PER_CHANNEL} levels");
            Preset {
                levels: PRESETS[SLOTS_PER_CHANNEL],
                requested: n,
            }
        }
    }
}

/// The whole table, `(count, levels)` for counts `0..=4`.
pub fn preset_table() -> impl Iterator<Item = (usize, &'static [f32])> {
    PRESETS.iter().copied().enumerate()
}

#[cfg(test)]
#[path = "../../tests/unit/channel/preset.rs"]
mod tests;
