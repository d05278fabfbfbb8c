//! Color mix chain: `v0 = base; v_i = lerp(v_{i-1}, color_i, mask_i)` in caller order.

use crate::emit::chain::{
    ChainIds, ChainKind, ColorInput, MixChain, RESULT_OUTPUT, chain_color_socket,
    chain_graph_name, chain_mask_socket, instantiate_chain, validate_chain_ids,
};
use crate::emit::core::CoreGraphHandle;
use crate::emit::scratch::{GraphBuilder, build_subgraph, discard_graph};
use crate::foundation::core::{Identifier, Rgba};
use crate::foundation::error::IdMaskResult;
use crate::foundation::math::lerp_rgba;
use crate::graph::adapter::{GraphAdapter, InterfaceSocket, MixData, NodeKind, SocketType};

/// Chain base color input.
pub const BASE_INPUT: &str = "Base";

/// One entry of a color chain: the identifier whose mask gates it, and its color.
#[derive(Clone, Debug, PartialEq)]
pub struct ColorMixEntry {
    /// Identifier; its core pass-through mask drives the blend.
    pub id: Identifier,
    /// Color blended in where the mask is set.
    pub color: ColorInput,
}

/// Resolved sample of one color entry, for [`mix_colors`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ColorLayer {
    /// Entry color.
    pub color: Rgba,
    /// Entry mask.
    pub mask: f32,
}

/// Reference value of a color chain.
pub fn mix_colors(base: Rgba, layers: &[ColorLayer]) -> Rgba {
    layers
        .iter()
        .fold(base, |v, layer| lerp_rgba(v, layer.color, layer.mask))
}

fn color_interface(ids: &[Identifier]) -> Vec<InterfaceSocket> {
    let mut sockets = vec![InterfaceSocket::input(BASE_INPUT, SocketType::Color)];
    for id in ids {
        sockets.push(InterfaceSocket::input(chain_color_socket(*id), SocketType::Color));
        sockets.push(InterfaceSocket::input(chain_mask_socket(*id), SocketType::Scalar));
    }
    sockets.push(InterfaceSocket::output(RESULT_OUTPUT, SocketType::Color));
    sockets
}

fn emit_color_chain<A: GraphAdapter + ?Sized>(
    b: &mut GraphBuilder<'_, A>,
    ids: &[Identifier],
) -> IdMaskResult<()> {
    let input = b.node(NodeKind::GroupInput)?;
    let output = b.node(NodeKind::GroupOutput)?;
    let mut current = input.output(BASE_INPUT);
    for id in ids {
        let mix = b.node(NodeKind::Mix(MixData::Color))?;
        b.link(&input.output(chain_mask_socket(*id)), &mix.input("Factor"))?;
        b.link(&current, &mix.input("A"))?;
        b.link(&input.output(chain_color_socket(*id)), &mix.input("B"))?;
        current = mix.output("Result");
    }
    b.link(&current, &output.input(RESULT_OUTPUT))
}

/// Build and instance a color chain over `core`'s masks.
pub(crate) fn build_color_chain<A: GraphAdapter>(
    adapter: &mut A,
    prefix: &str,
    core: &CoreGraphHandle,
    base: &ColorInput,
    entries: &[ColorMixEntry],
) -> IdMaskResult<MixChain> {
    let ids: ChainIds = entries.iter().map(|e| e.id).collect();
    validate_chain_ids(&ids)?;

    let name = chain_graph_name(prefix, &core.material, &ids);
    let (graph, stats) = build_subgraph(adapter, &name, &color_interface(&ids), |b| {
        emit_color_chain(b, &ids)
    })?;
    tracing::debug!(graph = graph.0, nodes = stats.nodes, "color chain emitted");

    let instance = instantiate_chain(adapter, core, graph, ChainKind::Color, &ids, |a, inst| {
        base.apply(a, &inst.input(BASE_INPUT))?;
        for e in entries {
            e.color.apply(a, &inst.input(chain_color_socket(e.id)))?;
        }
        Ok(())
    });
    let instance = match instance {
        Ok(instance) => instance,
        Err(err) => {
            discard_graph(adapter, graph);
            return Err(err);
        }
    };

    Ok(MixChain {
        kind: ChainKind::Color,
        material: core.material.clone(),
        ids,
        graph,
        instance,
    })
}

#[cfg(test)]
#[path = "../../tests/unit/emit/color_mix.rs"]
mod tests;
