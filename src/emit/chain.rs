//! Shared pieces of the color and normal mix chains.

use crate::emit::core::CoreGraphHandle;
use crate::emit::scratch::discard_node;
use crate::foundation::core::{Identifier, MaterialId, Rgba};
use crate::foundation::error::{IdMaskError, IdMaskResult};
use crate::graph::adapter::{GraphAdapter, GraphId, NodeHandle, NodeKind, NodeParams, SocketRef};
use smallvec::SmallVec;

/// Most entries a single chain may blend.
pub const MAX_CHAIN_ENTRIES: usize = 4;

/// Identifiers of a chain in caller order.
pub type ChainIds = SmallVec<[Identifier; MAX_CHAIN_ENTRIES]>;

/// Opaque key of a built chain, issued by [`crate::IdSystem`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize)]
pub struct ChainHandle(pub(crate) u64);

impl std::fmt::Display for ChainHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "chain#{}", self.0)
    }
}

/// Which blend a chain performs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize)]
pub enum ChainKind {
    /// Albedo blend.
    Color,
    /// Tangent-space normal blend with per-input convention switch.
    Normal,
}

impl ChainKind {
    fn title(self) -> &'static str {
        match self {
            ChainKind::Color => "Color",
            ChainKind::Normal => "Normal",
        }
    }
}

/// A committed mix chain: its sub-graph and the instance that uses it.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
pub struct MixChain {
    /// Blend kind.
    pub kind: ChainKind,
    /// Material whose core feeds the masks.
    pub material: MaterialId,
    /// Identifiers in blend order.
    pub ids: ChainIds,
    /// Chain sub-graph.
    pub graph: GraphId,
    /// Instance node in the material graph.
    pub instance: NodeHandle,
}

impl MixChain {
    /// Blended output on the instance node.
    pub fn result(&self) -> SocketRef {
        self.instance.output(RESULT_OUTPUT)
    }
}

/// Chain output socket.
pub const RESULT_OUTPUT: &str = "Result";

/// Chain color input of an identifier (`Color_ID03`).
pub fn chain_color_socket(id: Identifier) -> String {
    format!("Color_ID{id}")
}

/// Chain mask input of an identifier (`Mask_ID03`).
pub fn chain_mask_socket(id: Identifier) -> String {
    format!("Mask_ID{id}")
}

/// Where an unmasked color input of a chain comes from.
#[derive(Clone, Debug, PartialEq)]
pub enum ColorInput {
    /// Fixed value written as the socket default.
    Constant(Rgba),
    /// Output socket in the material graph.
    Socket(SocketRef),
}

/// Where a scalar input of a chain comes from.
#[derive(Clone, Debug, PartialEq)]
pub enum ScalarInput {
    /// Fixed value written as the socket default.
    Constant(f32),
    /// Output socket in the material graph.
    Socket(SocketRef),
}

impl ColorInput {
    pub(crate) fn apply<A: GraphAdapter + ?Sized>(
        &self,
        adapter: &mut A,
        to: &SocketRef,
    ) -> IdMaskResult<()> {
        match self {
            ColorInput::Constant(c) => adapter.set_default_color(to, *c),
            ColorInput::Socket(from) => adapter.create_link(from, to),
        }
    }
}

impl ScalarInput {
    pub(crate) fn apply<A: GraphAdapter + ?Sized>(
        &self,
        adapter: &mut A,
        to: &SocketRef,
    ) -> IdMaskResult<()> {
        match self {
            ScalarInput::Constant(v) => adapter.set_default_scalar(to, *v),
            ScalarInput::Socket(from) => adapter.create_link(from, to),
        }
    }
}

/// Reject empty, oversized or repeating identifier lists.
pub(crate) fn validate_chain_ids(ids: &[Identifier]) -> IdMaskResult<()> {
    if ids.is_empty() || ids.len() > MAX_CHAIN_ENTRIES {
        return Err(IdMaskError::validation(format!(
            "a mix chain takes 1..={MAX_CHAIN_ENTRIES} entries, got {}",
            ids.len()
        )));
    }
    for (i, id) in ids.iter().enumerate() {
        if ids[..i].contains(id) {
            return Err(IdMaskError::validation(format!(
                "identifier {} appears twice in one mix chain",
                id.get()
            )));
        }
    }
    Ok(())
}

/// `<prefix><material>_01_02`, material dots replaced.
pub(crate) fn chain_graph_name(prefix: &str, material: &MaterialId, ids: &[Identifier]) -> String {
    let ids: Vec<String> = ids.iter().map(ToString::to_string).collect();
    format!("{prefix}{}_{}", material.sanitized(), ids.join("_"))
}

/// `ID Mix Color (1, 2)`.
pub(crate) fn chain_label(kind: ChainKind, ids: &[Identifier]) -> String {
    let ids: Vec<String> = ids.iter().map(|id| id.get().to_string()).collect();
    format!("ID Mix {} ({})", kind.title(), ids.join(", "))
}

/// Instance `graph` next to the core, link each `Mask_IDxx` from the core's pass-through output,
/// then let `wire` connect the remaining inputs. The instance is deleted again if any step fails.
pub(crate) fn instantiate_chain<A, F>(
    adapter: &mut A,
    core: &CoreGraphHandle,
    graph: GraphId,
    kind: ChainKind,
    ids: &[Identifier],
    wire: F,
) -> IdMaskResult<NodeHandle>
where
    A: GraphAdapter,
    F: FnOnce(&mut A, NodeHandle) -> IdMaskResult<()>,
{
    let instance = adapter.create_node(
        core.instance.graph,
        &NodeKind::GroupInstance { group: graph },
        &NodeParams::labeled(chain_label(kind, ids)),
    )?;
    if let Err(err) = wire_instance(adapter, core, instance, ids, wire) {
        discard_node(adapter, instance);
        return Err(err);
    }
    Ok(instance)
}

fn wire_instance<A, F>(
    adapter: &mut A,
    core: &CoreGraphHandle,
    instance: NodeHandle,
    ids: &[Identifier],
    wire: F,
) -> IdMaskResult<()>
where
    A: GraphAdapter,
    F: FnOnce(&mut A, NodeHandle) -> IdMaskResult<()>,
{
    for id in ids {
        adapter.create_link(&core.mask_output(*id), &instance.input(chain_mask_socket(*id)))?;
    }
    wire(adapter, instance)
}

#[cfg(test)]
#[path = "../../tests/unit/emit/chain.rs"]
mod tests;
