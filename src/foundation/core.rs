use crate::foundation::error::{IdMaskError, IdMaskResult};

/// Linear RGBA color in `[0, 1]` per component.
pub type Rgba = [f32; 4];

/// Three-component vector (tangent-space normals, packed RGB).
pub type Vec3 = [f32; 3];

/// Number of paintable identifiers per material.
pub const ID_COUNT: usize = 16;

/// Number of identifier slots owned by each channel.
pub const SLOTS_PER_CHANNEL: usize = 4;

/// One of the 16 paintable mask identifiers, numbered `1..=16`.
///
/// Construction validates the range, so every `Identifier` in circulation is in bounds.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(try_from = "u32", into = "u32")]
pub struct Identifier(u8);

impl Identifier {
    /// Smallest valid identifier number.
    pub const MIN: u32 = 1;
    /// Largest valid identifier number.
    pub const MAX: u32 = ID_COUNT as u32;

    /// Validate and wrap an identifier number.
    pub fn new(id: u32) -> IdMaskResult<Self> {
        if !(Self::MIN..=Self::MAX).contains(&id) {
            return Err(IdMaskError::InvalidIdentifier(id));
        }
        Ok(Self(id as u8))
    }

    /// Identifier number in `1..=16`.
    pub fn get(self) -> u32 {
        u32::from(self.0)
    }

    /// Zero-based position in `0..16`.
    pub fn index(self) -> usize {
        usize::from(self.0 - 1)
    }

    /// All identifiers in ascending order.
    pub fn all() -> impl Iterator<Item = Identifier> {
        (1..=ID_COUNT as u8).map(Identifier)
    }

    pub(crate) fn from_index(index: usize) -> Self {
        debug_assert!(index < ID_COUNT);
        Self(index as u8 + 1)
    }
}

impl TryFrom<u32> for Identifier {
    type Error = IdMaskError;

    fn try_from(value: u32) -> IdMaskResult<Self> {
        Self::new(value)
    }
}

impl From<Identifier> for u32 {
    fn from(value: Identifier) -> Self {
        value.get()
    }
}

impl std::fmt::Display for Identifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:02}", self.0)
    }
}

/// Packed output channel. Each channel owns four identifier slots.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub enum Channel {
    /// Red, identifiers 1-4.
    R,
    /// Green, identifiers 5-8.
    G,
    /// Blue, identifiers 9-12.
    B,
    /// Alpha, identifiers 13-16.
    A,
}

impl Channel {
    /// All channels in packing order.
    pub const ALL: [Channel; 4] = [Channel::R, Channel::G, Channel::B, Channel::A];

    /// Position of this channel in `ALL`.
    pub fn index(self) -> usize {
        match self {
            Channel::R => 0,
            Channel::G => 1,
            Channel::B => 2,
            Channel::A => 3,
        }
    }

    /// Single-letter name used in labels.
    pub fn letter(self) -> &'static str {
        match self {
            Channel::R => "R",
            Channel::G => "G",
            Channel::B => "B",
            Channel::A => "A",
        }
    }
}

/// Stable name of the material that owns a core graph and its mix chains.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MaterialId(String);

impl MaterialId {
    /// Wrap a material name. Empty names are rejected.
    pub fn new(name: impl Into<String>) -> IdMaskResult<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(IdMaskError::validation("material name must be non-empty"));
        }
        Ok(Self(name))
    }

    /// Material name as given.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Name with `.` replaced, for use inside generated graph names.
    pub fn sanitized(&self) -> String {
        self.0.replace('.', "_")
    }
}

impl TryFrom<String> for MaterialId {
    type Error = IdMaskError;

    fn try_from(value: String) -> IdMaskResult<Self> {
        Self::new(value)
    }
}

impl From<MaterialId> for String {
    fn from(value: MaterialId) -> Self {
        value.0
    }
}

impl std::fmt::Display for MaterialId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
