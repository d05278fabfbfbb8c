//! Per-material core graph: 16 mask inputs, their pass-through outputs, and the four packed
//! channel folds behind `RGB_ID` / `Alpha_ID`.
//!
//! Every rebuild regenerates the whole sub-graph from the config. The material graph holds one
//! instance node for it; that node keeps its handle across rebuilds and is re-pointed at the new
//! sub-graph only once the sub-graph was emitted completely.

use crate::channel::composer::{ChannelPlan, CorePlan};
use crate::config::model::MaterialIdConfig;
use crate::emit::images::MaskImageSource;
use crate::emit::scratch::{EmitStats, GraphBuilder, build_subgraph, discard_graph, discard_node};
use crate::foundation::core::{Identifier, MaterialId};
use crate::foundation::error::IdMaskResult;
use crate::graph::adapter::{
    GraphAdapter, GraphId, InterfaceSocket, MathOp, NodeHandle, NodeKind, NodeParams, SocketRef,
    SocketType,
};
use std::collections::BTreeMap;

/// Packed RGB output of the core.
pub const RGB_OUTPUT: &str = "RGB_ID";
/// Packed alpha output of the core.
pub const ALPHA_OUTPUT: &str = "Alpha_ID";

const CORE_LABEL: &str = "ID Core";

/// Core mask socket name (`ID07_Mask`), used for both the input and its pass-through output.
pub fn mask_socket_name(id: Identifier) -> String {
    format!("ID{id}_Mask")
}

/// External sockets of every core sub-graph, independent of the config.
pub fn core_interface() -> Vec<InterfaceSocket> {
    let mut sockets: Vec<InterfaceSocket> = Identifier::all()
        .map(|id| InterfaceSocket::input(mask_socket_name(id), SocketType::Scalar))
        .collect();
    sockets.push(InterfaceSocket::output(RGB_OUTPUT, SocketType::Color));
    sockets.push(InterfaceSocket::output(ALPHA_OUTPUT, SocketType::Scalar));
    sockets.extend(
        Identifier::all()
            .map(|id| InterfaceSocket::output(mask_socket_name(id), SocketType::Scalar)),
    );
    sockets
}

/// Committed core of one material.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
pub struct CoreGraphHandle {
    /// Owning material.
    pub material: MaterialId,
    /// Current core sub-graph. Changes on every rebuild.
    pub graph: GraphId,
    /// Instance node in the material graph. Stable across rebuilds.
    pub instance: NodeHandle,
}

impl CoreGraphHandle {
    /// Pass-through mask output of `id` on the instance node.
    pub fn mask_output(&self, id: Identifier) -> SocketRef {
        self.instance.output(mask_socket_name(id))
    }

    /// Mask input of `id` on the instance node.
    pub fn mask_input(&self, id: Identifier) -> SocketRef {
        self.instance.input(mask_socket_name(id))
    }

    /// Packed RGB output on the instance node.
    pub fn rgb_output(&self) -> SocketRef {
        self.instance.output(RGB_OUTPUT)
    }

    /// Packed alpha output on the instance node.
    pub fn alpha_output(&self) -> SocketRef {
        self.instance.output(ALPHA_OUTPUT)
    }
}

/// Owns the core registry and performs scratch-build-then-swap rebuilds.
#[derive(Clone, Debug)]
pub struct GraphEmitter {
    prefix: String,
    cores: BTreeMap<MaterialId, CoreGraphHandle>,
}

impl GraphEmitter {
    /// Emitter naming core sub-graphs `<prefix><material>`.
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            cores: BTreeMap::new(),
        }
    }

    /// Committed core of `material`, if any.
    pub fn get(&self, material: &MaterialId) -> Option<&CoreGraphHandle> {
        self.cores.get(material)
    }

    /// Drop `material`'s core from the registry and delete its instance and sub-graph.
    pub(crate) fn discard<A: GraphAdapter>(&mut self, adapter: &mut A, material: &MaterialId) {
        if let Some(core) = self.cores.remove(material) {
            discard_node(adapter, core.instance);
            discard_graph(adapter, core.graph);
        }
    }

    /// Regenerate `material`'s core from `config`.
    ///
    /// On any adapter error the scratch sub-graph is discarded and the previously committed core
    /// (if any) stays exactly as it was.
    pub fn rebuild<A: GraphAdapter>(
        &mut self,
        adapter: &mut A,
        images: &mut dyn MaskImageSource,
        material: &MaterialId,
        config: &MaterialIdConfig,
    ) -> IdMaskResult<CoreGraphHandle> {
        let plan = CorePlan::resolve(config);
        let name = format!("{}{}", self.prefix, material);
        let (graph, stats) =
            build_subgraph(adapter, &name, &core_interface(), |b| emit_core(b, &plan))?;
        let EmitStats { nodes, links } = stats;
        tracing::debug!(graph = graph.0, nodes, links, "core sub-graph emitted");

        let committed = match self.cores.get(material) {
            Some(prev) => swap_in(adapter, prev, graph),
            None => instantiate(adapter, images, material, graph),
        };
        match committed {
            Ok(handle) => {
                self.cores.insert(material.clone(), handle.clone());
                Ok(handle)
            }
            Err(err) => {
                discard_graph(adapter, graph);
                Err(err)
            }
        }
    }
}

fn swap_in<A: GraphAdapter>(
    adapter: &mut A,
    prev: &CoreGraphHandle,
    graph: GraphId,
) -> IdMaskResult<CoreGraphHandle> {
    adapter.assign_group(prev.instance, graph)?;
    // The swap is committed; a stale sub-graph left behind is only garbage.
    discard_graph(adapter, prev.graph);
    Ok(CoreGraphHandle {
        material: prev.material.clone(),
        graph,
        instance: prev.instance,
    })
}

fn instantiate<A: GraphAdapter>(
    adapter: &mut A,
    images: &mut dyn MaskImageSource,
    material: &MaterialId,
    graph: GraphId,
) -> IdMaskResult<CoreGraphHandle> {
    let material_graph = adapter.material_graph(material)?;
    let instance = adapter.create_node(
        material_graph,
        &NodeKind::GroupInstance { group: graph },
        &NodeParams::labeled(CORE_LABEL),
    )?;
    let handle = CoreGraphHandle {
        material: material.clone(),
        graph,
        instance,
    };
    if let Err(err) = wire_mask_images(adapter, images, &handle) {
        discard_node(adapter, instance);
        return Err(err);
    }
    Ok(handle)
}

fn wire_mask_images<A: GraphAdapter>(
    adapter: &mut A,
    images: &mut dyn MaskImageSource,
    core: &CoreGraphHandle,
) -> IdMaskResult<()> {
    for id in Identifier::all() {
        if let Some(src) = images.mask_socket(adapter, &core.material, core.instance.graph, id)? {
            adapter.create_link(&src, &core.mask_input(id))?;
        }
    }
    Ok(())
}

fn emit_core<A: GraphAdapter + ?Sized>(
    b: &mut GraphBuilder<'_, A>,
    plan: &CorePlan,
) -> IdMaskResult<()> {
    let input = b.node(NodeKind::GroupInput)?;
    let output = b.node(NodeKind::GroupOutput)?;
    for id in Identifier::all() {
        let name = mask_socket_name(id);
        b.link(&input.output(name.as_str()), &output.input(name))?;
    }

    let mut packed = Vec::with_capacity(plan.channels.len());
    for channel in &plan.channels {
        packed.push(emit_channel(b, input, channel)?);
    }

    let combine = b.node(NodeKind::CombineRgb)?;
    for (value, socket) in packed.iter().zip(["R", "G", "B"]) {
        b.link(value, &combine.input(socket))?;
    }
    b.link(&combine.output("Color"), &output.input(RGB_OUTPUT))?;
    b.link(&packed[3], &output.input(ALPHA_OUTPUT))
}

/// `prev + mask * (gray - prev)` per step, starting from a zero value node.
fn emit_channel<A: GraphAdapter + ?Sized>(
    b: &mut GraphBuilder<'_, A>,
    input: NodeHandle,
    plan: &ChannelPlan,
) -> IdMaskResult<SocketRef> {
    let zero = b.labeled(NodeKind::Value, plan.channel.letter())?;
    b.scalar(&zero.output("Value"), 0.0)?;
    let mut prev = zero.output("Value");

    for step in &plan.steps {
        let diff = b.node(NodeKind::Math(MathOp::Subtract))?;
        b.scalar(&diff.input("A"), step.gray)?;
        b.link(&prev, &diff.input("B"))?;

        let mul = b.node(NodeKind::Math(MathOp::Multiply))?;
        b.link(&input.output(mask_socket_name(step.id)), &mul.input("A"))?;
        b.link(&diff.output("Value"), &mul.input("B"))?;

        let add = b.node(NodeKind::Math(MathOp::Add))?;
        b.link(&prev, &add.input("A"))?;
        b.link(&mul.output("Value"), &add.input("B"))?;

        prev = add.output("Value");
    }
    Ok(prev)
}

#[cfg(test)]
#[path = "../../tests/unit/emit/core.rs"]
mod tests;
