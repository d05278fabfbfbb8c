use crate::channel::assignment::{channel_of, identifiers_of};
use crate::channel::preset::preset_for;
use crate::foundation::core::{Channel, ID_COUNT, Identifier, MaterialId, SLOTS_PER_CHANNEL};
use crate::foundation::error::{IdMaskError, IdMaskResult};
use smallvec::SmallVec;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Which of the 16 identifiers a material uses.
///
/// Only channel membership and ascending identifier order matter; the order in which
/// identifiers were switched on is not recorded.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(from = "MaterialIdConfigDef", into = "MaterialIdConfigDef")]
pub struct MaterialIdConfig {
    active: [bool; ID_COUNT],
}

#[derive(serde::Serialize, serde::Deserialize)]
struct MaterialIdConfigDef {
    active: Vec<Identifier>,
}

impl From<MaterialIdConfigDef> for MaterialIdConfig {
    fn from(def: MaterialIdConfigDef) -> Self {
        Self::with_active(def.active)
    }
}

impl From<MaterialIdConfig> for MaterialIdConfigDef {
    fn from(cfg: MaterialIdConfig) -> Self {
        Self {
            active: cfg.active_ids().collect(),
        }
    }
}

impl MaterialIdConfig {
    /// Config with every identifier inactive.
    pub fn new() -> Self {
        Self::default()
    }

    /// Config with exactly the given identifiers active. Duplicates are harmless.
    pub fn with_active(ids: impl IntoIterator<Item = Identifier>) -> Self {
        let mut cfg = Self::default();
        for id in ids {
            cfg.set(id, true);
        }
        cfg
    }

    /// Validate raw identifier numbers and build a config from them.
    pub fn from_ids(ids: impl IntoIterator<Item = u32>) -> IdMaskResult<Self> {
        let ids = ids
            .into_iter()
            .map(Identifier::new)
            .collect::<IdMaskResult<Vec<_>>>()?;
        Ok(Self::with_active(ids))
    }

    /// Switch one identifier on or off.
    pub fn set(&mut self, id: Identifier, active: bool) {
        self.active[id.index()] = active;
    }

    /// Whether `id` is active.
    pub fn is_active(&self, id: Identifier) -> bool {
        self.active[id.index()]
    }

    /// Active identifiers, ascending.
    pub fn active_ids(&self) -> impl Iterator<Item = Identifier> + '_ {
        Identifier::all().filter(|id| self.is_active(*id))
    }

    /// Active identifiers of one channel, ascending. At most four by construction.
    pub fn active_in(&self, channel: Channel) -> SmallVec<[Identifier; SLOTS_PER_CHANNEL]> {
        identifiers_of(channel)
            .into_iter()
            .filter(|id| self.is_active(*id))
            .collect()
    }

    /// Active-identifier count per channel, in `R, G, B, A` order.
    pub fn split(&self) -> [usize; 4] {
        let mut counts = [0usize; 4];
        for id in self.active_ids() {
            counts[channel_of(id).channel.index()] += 1;
        }
        counts
    }

    /// Gray level assigned to each identifier (index `id - 1`); inactive identifiers get `0.0`.
    pub fn gray_levels(&self) -> [f32; ID_COUNT] {
        let mut levels = [0.0f32; ID_COUNT];
        for channel in Channel::ALL {
            let used = self.active_in(channel);
            let preset = preset_for(used.len());
            for (rank, id) in used.iter().enumerate() {
                levels[id.index()] = preset.level(rank);
            }
        }
        levels
    }
}

/// JSON document read by the CLI: `{ "material": "Body", "active": [1, 3, 4] }`.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct MaterialDocument {
    /// Optional material name; callers may supply their own.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub material: Option<MaterialId>,
    /// Identifier usage.
    #[serde(flatten)]
    pub config: MaterialIdConfig,
}

impl MaterialDocument {
    /// Parse a document from a JSON reader.
    pub fn from_reader<R: std::io::Read>(r: R) -> IdMaskResult<Self> {
        serde_json::from_reader(r)
            .map_err(|e| IdMaskError::serde(format!("parse material id config JSON: {e}")))
    }

    /// Parse a document from a JSON string.
    pub fn from_json_str(s: &str) -> IdMaskResult<Self> {
        serde_json::from_str(s)
            .map_err(|e| IdMaskError::serde(format!("parse material id config JSON: {e}")))
    }

    /// Parse a document from a JSON file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> IdMaskResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            IdMaskError::validation(format!(
                "open material id config '{}': {e}",
                path.display()
            ))
        })?;
        Self::from_reader(BufReader::new(f))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/config/model.rs"]
mod tests;
