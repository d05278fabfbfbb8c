/// Options controlling how an [`crate::IdSystem`] names and sizes what it emits.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct IdSystemOpts {
    /// Prefix of the per-material core sub-graph name (`<prefix><material>`).
    pub core_graph_prefix: String,
    /// Prefix of color mix chain sub-graph names.
    pub color_chain_prefix: String,
    /// Prefix of normal mix chain sub-graph names.
    pub normal_chain_prefix: String,
}

impl Default for IdSystemOpts {
    fn default() -> Self {
        Self {
            core_graph_prefix: "ID_Core__".to_string(),
            color_chain_prefix: "ID_Mix_Color_".to_string(),
            normal_chain_prefix: "ID_Mix_Normal_".to_string(),
        }
    }
}

/// Options for [`crate::ImageTextureSource`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct MaskImageOpts {
    /// Width of newly declared mask images, in pixels.
    pub width: u32,
    /// Height of newly declared mask images, in pixels.
    pub height: u32,
}

impl Default for MaskImageOpts {
    fn default() -> Self {
        Self {
            width: 4096,
            height: 4096,
        }
    }
}
