//! idmask compiles per-material ID-mask configurations into host node graphs.
//!
//! Sixteen paintable identifier masks are packed into four channels (R, G, B, A) with fixed
//! gray-level presets and an override fold. On demand, reusable mix chains blend caller-chosen
//! subsets of identifier-tagged colors or tangent-space normals. The surface is facade-oriented:
//!
//! - Describe a material's active identifiers with a [`MaterialIdConfig`]
//! - Create an [`IdSystem`] over a [`GraphAdapter`] (e.g. the in-memory [`MemoryHost`])
//! - [`IdSystem::rebuild_core`], then build and remove mix chains
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod foundation;

pub(crate) mod channel;
pub(crate) mod config;
pub(crate) mod emit;
pub(crate) mod graph;
pub(crate) mod session;

pub use crate::foundation::core::{
    Channel, ID_COUNT, Identifier, MaterialId, Rgba, SLOTS_PER_CHANNEL, Vec3,
};
pub use crate::foundation::error::{IdMaskError, IdMaskResult};
pub use crate::foundation::math::{decode_tangent_normal, invert_green, lerp, lerp_rgba, lerp_vec3};

pub use crate::channel::assignment::{ChannelSlot, channel_of, channel_of_raw, identifiers_of};
pub use crate::channel::composer::{
    ChannelPlan, ChannelStep, CorePlan, PackedIds, compose, pass_through,
};
pub use crate::channel::preset::{Preset, preset_for, preset_table, try_preset_for};

pub use crate::config::model::{MaterialDocument, MaterialIdConfig};
pub use crate::config::opts::{IdSystemOpts, MaskImageOpts};

pub use crate::graph::adapter::{
    GraphAdapter, GraphId, InterfaceSocket, MathOp, MixData, NodeHandle, NodeKind, NodeKindTag,
    NodeParams, SocketDir, SocketRef, SocketType, SocketValue,
};
pub use crate::graph::eval::SocketValues;
pub use crate::graph::memory::MemoryHost;
pub use crate::graph::snapshot::{GraphSnapshot, LinkSnapshot, NodeSnapshot, TopologyFingerprint};

pub use crate::emit::chain::{
    ChainHandle, ChainIds, ChainKind, ColorInput, MAX_CHAIN_ENTRIES, MixChain, RESULT_OUTPUT,
    ScalarInput, chain_color_socket, chain_mask_socket,
};
pub use crate::emit::color_mix::{BASE_INPUT, ColorLayer, ColorMixEntry, mix_colors};
pub use crate::emit::core::{
    ALPHA_OUTPUT, CoreGraphHandle, GraphEmitter, RGB_OUTPUT, core_interface, mask_socket_name,
};
pub use crate::emit::images::{ImageTextureSource, MaskImageSource, NoMaskImages, id_image_name};
pub use crate::emit::normal_mix::{
    BASE_COLOR_INPUT, BASE_SPACE_INPUT, NormalLayer, NormalMixEntry, chain_space_socket,
    decode_with_space, mix_normals,
};
pub use crate::session::id_system::IdSystem;
