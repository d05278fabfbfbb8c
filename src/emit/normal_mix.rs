//! Normal mix chain.
//!
//! Every input (the base and each entry) is decoded twice from the same packed color: directly
//! (convention A) and with green inverted first (convention B). Its `space` picks between the two,
//! `0` being pure A. Entries are then folded over the base by mask, in caller order. The result is
//! left unnormalized.

use crate::emit::chain::{
    ChainIds, ChainKind, ColorInput, MixChain, RESULT_OUTPUT, ScalarInput, chain_color_socket,
    chain_graph_name, chain_mask_socket, instantiate_chain, validate_chain_ids,
};
use crate::emit::core::CoreGraphHandle;
use crate::emit::scratch::{GraphBuilder, build_subgraph, discard_graph};
use crate::foundation::core::{Identifier, Rgba, Vec3};
use crate::foundation::error::IdMaskResult;
use crate::foundation::math::{decode_tangent_normal, invert_green, lerp_vec3};
use crate::graph::adapter::{
    GraphAdapter, InterfaceSocket, MathOp, MixData, NodeHandle, NodeKind, SocketRef, SocketType,
};

/// Chain base normal color input.
pub const BASE_COLOR_INPUT: &str = "BaseColor";
/// Chain base convention switch input.
pub const BASE_SPACE_INPUT: &str = "BaseSpace";

/// Chain convention switch of an identifier (`Space_ID03`).
pub fn chain_space_socket(id: Identifier) -> String {
    format!("Space_ID{id}")
}

/// One entry of a normal chain.
#[derive(Clone, Debug, PartialEq)]
pub struct NormalMixEntry {
    /// Identifier; its core pass-through mask drives the blend.
    pub id: Identifier,
    /// Packed tangent-space normal color.
    pub color: ColorInput,
    /// Convention switch, `0` = A, `1` = B.
    pub space: ScalarInput,
}

/// Resolved sample of one normal entry, for [`mix_normals`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NormalLayer {
    /// Packed normal color.
    pub color: Rgba,
    /// Convention switch.
    pub space: f32,
    /// Entry mask.
    pub mask: f32,
}

/// `lerp(decodeA(color), decodeB(color), space)`.
///
/// At `space == 0` the convention-B decode does not contribute at all.
pub fn decode_with_space(color: Rgba, space: f32) -> Vec3 {
    lerp_vec3(
        decode_tangent_normal(color),
        decode_tangent_normal(invert_green(color)),
        space,
    )
}

/// Reference value of a normal chain.
pub fn mix_normals(base_color: Rgba, base_space: f32, layers: &[NormalLayer]) -> Vec3 {
    layers.iter().fold(decode_with_space(base_color, base_space), |v, layer| {
        lerp_vec3(v, decode_with_space(layer.color, layer.space), layer.mask)
    })
}

fn normal_interface(ids: &[Identifier]) -> Vec<InterfaceSocket> {
    let mut sockets = vec![
        InterfaceSocket::input(BASE_COLOR_INPUT, SocketType::Color),
        InterfaceSocket::input(BASE_SPACE_INPUT, SocketType::Scalar),
    ];
    for id in ids {
        sockets.push(InterfaceSocket::input(chain_color_socket(*id), SocketType::Color));
        sockets.push(InterfaceSocket::input(chain_space_socket(*id), SocketType::Scalar));
        sockets.push(InterfaceSocket::input(chain_mask_socket(*id), SocketType::Scalar));
    }
    sockets.push(InterfaceSocket::output(RESULT_OUTPUT, SocketType::Vector));
    sockets
}

/// Both decodes of one packed color, blended by its space input.
fn emit_decode<A: GraphAdapter + ?Sized>(
    b: &mut GraphBuilder<'_, A>,
    input: NodeHandle,
    color_name: &str,
    space_name: &str,
) -> IdMaskResult<SocketRef> {
    let color = input.output(color_name);

    let gl = b.labeled(NodeKind::NormalMap, format!("{color_name}_GL"))?;
    b.link(&color, &gl.input("Color"))?;

    let sep = b.node(NodeKind::SeparateRgb)?;
    b.link(&color, &sep.input("Color"))?;
    let inv = b.node(NodeKind::Math(MathOp::Subtract))?;
    b.scalar(&inv.input("A"), 1.0)?;
    b.link(&sep.output("G"), &inv.input("B"))?;
    let comb = b.node(NodeKind::CombineRgb)?;
    b.link(&sep.output("R"), &comb.input("R"))?;
    b.link(&inv.output("Value"), &comb.input("G"))?;
    b.link(&sep.output("B"), &comb.input("B"))?;
    let dx = b.labeled(NodeKind::NormalMap, format!("{color_name}_DX"))?;
    b.link(&comb.output("Color"), &dx.input("Color"))?;

    let mix = b.labeled(NodeKind::Mix(MixData::Vector), format!("{color_name}_SpaceMix"))?;
    b.link(&input.output(space_name), &mix.input("Factor"))?;
    b.link(&gl.output("Normal"), &mix.input("A"))?;
    b.link(&dx.output("Normal"), &mix.input("B"))?;
    Ok(mix.output("Result"))
}

fn emit_normal_chain<A: GraphAdapter + ?Sized>(
    b: &mut GraphBuilder<'_, A>,
    ids: &[Identifier],
) -> IdMaskResult<()> {
    let input = b.node(NodeKind::GroupInput)?;
    let output = b.node(NodeKind::GroupOutput)?;

    let mut current = emit_decode(b, input, BASE_COLOR_INPUT, BASE_SPACE_INPUT)?;
    let mut decoded = Vec::with_capacity(ids.len());
    for id in ids {
        decoded.push(emit_decode(
            b,
            input,
            &chain_color_socket(*id),
            &chain_space_socket(*id),
        )?);
    }

    for (id, normal) in ids.iter().zip(&decoded) {
        let mix = b.node(NodeKind::Mix(MixData::Vector))?;
        b.link(&input.output(chain_mask_socket(*id)), &mix.input("Factor"))?;
        b.link(&current, &mix.input("A"))?;
        b.link(normal, &mix.input("B"))?;
        current = mix.output("Result");
    }
    b.link(&current, &output.input(RESULT_OUTPUT))
}

/// Build and instance a normal chain over `core`'s masks.
pub(crate) fn build_normal_chain<A: GraphAdapter>(
    adapter: &mut A,
    prefix: &str,
    core: &CoreGraphHandle,
    base: &ColorInput,
    base_space: &ScalarInput,
    entries: &[NormalMixEntry],
) -> IdMaskResult<MixChain> {
    let ids: ChainIds = entries.iter().map(|e| e.id).collect();
    validate_chain_ids(&ids)?;

    let name = chain_graph_name(prefix, &core.material, &ids);
    let (graph, stats) = build_subgraph(adapter, &name, &normal_interface(&ids), |b| {
        emit_normal_chain(b, &ids)
    })?;
    tracing::debug!(graph = graph.0, nodes = stats.nodes, "normal chain emitted");

    let instance = instantiate_chain(adapter, core, graph, ChainKind::Normal, &ids, |a, inst| {
        base.apply(a, &inst.input(BASE_COLOR_INPUT))?;
        base_space.apply(a, &inst.input(BASE_SPACE_INPUT))?;
        for e in entries {
            e.color.apply(a, &inst.input(chain_color_socket(e.id)))?;
            e.space.apply(a, &inst.input(chain_space_socket(e.id)))?;
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
        kind: ChainKind::Normal,
        material: core.material.clone(),
        ids,
        graph,
        instance,
    })
}

#[cfg(test)]
#[path = "../../tests/unit/emit/normal_mix.rs"]
mod tests;
