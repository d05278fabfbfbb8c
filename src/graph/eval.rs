//! Pull-based evaluation of graphs stored in a [`MemoryHost`].

use crate::foundation::error::{IdMaskError, IdMaskResult};
use crate::foundation::math::{decode_tangent_normal, lerp_rgba, lerp_vec3};
use crate::graph::adapter::{
    GraphId, MathOp, MixData, NodeHandle, NodeKind, SocketDir, SocketRef, SocketType, SocketValue,
};
use crate::graph::memory::MemoryHost;
use std::collections::{BTreeMap, HashMap, HashSet};

const MAX_GROUP_DEPTH: usize = 16;

/// Named values fed to or read from a sub-graph interface.
pub type SocketValues = BTreeMap<String, SocketValue>;

impl MemoryHost {
    /// Evaluate every interface output of `graph`, feeding `inputs` to its interface inputs.
    ///
    /// Missing inputs evaluate to the zero value of their declared type.
    pub fn evaluate(&self, graph: GraphId, inputs: &SocketValues) -> IdMaskResult<SocketValues> {
        Evaluation::new(self, graph, inputs, 0).outputs()
    }

    /// Evaluate one output socket of a node in any graph (material graphs included).
    pub fn evaluate_socket(&self, socket: &SocketRef) -> IdMaskResult<SocketValue> {
        if socket.dir != SocketDir::Out {
            return Err(IdMaskError::validation("only output sockets can be evaluated"));
        }
        let empty = SocketValues::new();
        Evaluation::new(self, socket.node.graph, &empty, 0).output(socket.node, &socket.name)
    }
}

struct Evaluation<'a> {
    host: &'a MemoryHost,
    graph: GraphId,
    inputs: &'a SocketValues,
    depth: usize,
    cache: HashMap<(u64, String), SocketValue>,
    visiting: HashSet<u64>,
}

impl<'a> Evaluation<'a> {
    fn new(host: &'a MemoryHost, graph: GraphId, inputs: &'a SocketValues, depth: usize) -> Self {
        Self {
            host,
            graph,
            inputs,
            depth,
            cache: HashMap::new(),
            visiting: HashSet::new(),
        }
    }

    fn outputs(mut self) -> IdMaskResult<SocketValues> {
        let host = self.host;
        let data = host.graph(self.graph)?;
        let out_node = data
            .nodes
            .iter()
            .find(|(_, n)| n.kind == NodeKind::GroupOutput)
            .map(|(id, _)| NodeHandle {
                graph: self.graph,
                id: *id,
            })
            .ok_or_else(|| IdMaskError::validation("graph has no group output node"))?;

        let mut out = SocketValues::new();
        for s in data.interface.iter().filter(|s| s.dir == SocketDir::Out) {
            let v = self.input(out_node, &s.name, s.ty)?;
            out.insert(s.name.clone(), v);
        }
        Ok(out)
    }

    /// Value arriving at an input socket: the linked source, else the socket default.
    fn input(&mut self, node: NodeHandle, name: &str, ty: SocketType) -> IdMaskResult<SocketValue> {
        let host = self.host;
        let to = node.input(name);
        if let Some(from) = host.link_source(&to) {
            return self.output(from.node, &from.name);
        }
        let data = host.node(node)?;
        Ok(data
            .defaults
            .get(&(SocketDir::In, name.to_string()))
            .copied()
            .unwrap_or(SocketValue::zero(ty)))
    }

    fn scalar(&mut self, node: NodeHandle, name: &str) -> IdMaskResult<f32> {
        Ok(self.input(node, name, SocketType::Scalar)?.as_scalar())
    }

    fn color(&mut self, node: NodeHandle, name: &str) -> IdMaskResult<[f32; 4]> {
        Ok(self.input(node, name, SocketType::Color)?.as_color())
    }

    fn vector(&mut self, node: NodeHandle, name: &str) -> IdMaskResult<[f32; 3]> {
        Ok(self.input(node, name, SocketType::Vector)?.as_vector())
    }

    fn output(&mut self, node: NodeHandle, name: &str) -> IdMaskResult<SocketValue> {
        let key = (node.id, name.to_string());
        if let Some(v) = self.cache.get(&key) {
            return Ok(*v);
        }
        if !self.visiting.insert(node.id) {
            return Err(IdMaskError::validation(format!(
                "cycle through node {}",
                node.id
            )));
        }
        let v = self.compute(node, name);
        self.visiting.remove(&node.id);
        let v = v?;
        self.cache.insert(key, v);
        Ok(v)
    }

    fn compute(&mut self, node: NodeHandle, name: &str) -> IdMaskResult<SocketValue> {
        let host = self.host;
        let data = host.node(node)?;
        let kind = data.kind.clone();
        let ty = host
            .socket_type(node.graph, &kind, SocketDir::Out, name)
            .ok_or_else(|| {
                IdMaskError::validation(format!("node {} has no output '{name}'", node.id))
            })?;
        let out_default = data.defaults.get(&(SocketDir::Out, name.to_string())).copied();

        let v = match kind {
            NodeKind::GroupInput => self
                .inputs
                .get(name)
                .copied()
                .unwrap_or(SocketValue::zero(ty)),
            NodeKind::GroupOutput => {
                return Err(IdMaskError::validation("group output has no outputs"));
            }
            NodeKind::GroupInstance { group } => {
                if self.depth >= MAX_GROUP_DEPTH {
                    return Err(IdMaskError::validation("group nesting too deep"));
                }
                let iface = &host.graph(group)?.interface;
                let mut inner = SocketValues::new();
                for s in iface.iter().filter(|s| s.dir == SocketDir::In) {
                    let v = self.input(node, &s.name, s.ty)?;
                    inner.insert(s.name.clone(), v);
                }
                let outs = Evaluation::new(host, group, &inner, self.depth + 1).outputs()?;
                outs.get(name).copied().unwrap_or(SocketValue::zero(ty))
            }
            NodeKind::Value => out_default.unwrap_or(SocketValue::Scalar(0.0)),
            NodeKind::Math(op) => {
                let a = self.scalar(node, "A")?;
                let b = self.scalar(node, "B")?;
                SocketValue::Scalar(match op {
                    MathOp::Add => a + b,
                    MathOp::Subtract => a - b,
                    MathOp::Multiply => a * b,
                })
            }
            NodeKind::CombineRgb => {
                let r = self.scalar(node, "R")?;
                let g = self.scalar(node, "G")?;
                let b = self.scalar(node, "B")?;
                SocketValue::Color([r, g, b, 1.0])
            }
            NodeKind::SeparateRgb => {
                let c = self.color(node, "Color")?;
                SocketValue::Scalar(match name {
                    "R" => c[0],
                    "G" => c[1],
                    _ => c[2],
                })
            }
            NodeKind::Mix(MixData::Color) => {
                let t = self.scalar(node, "Factor")?;
                let a = self.color(node, "A")?;
                let b = self.color(node, "B")?;
                SocketValue::Color(lerp_rgba(a, b, t))
            }
            NodeKind::Mix(MixData::Vector) => {
                let t = self.scalar(node, "Factor")?;
                let a = self.vector(node, "A")?;
                let b = self.vector(node, "B")?;
                SocketValue::Vector(lerp_vec3(a, b, t))
            }
            NodeKind::NormalMap => {
                let c = self.color(node, "Color")?;
                SocketValue::Vector(decode_tangent_normal(c))
            }
            NodeKind::ImageTexture { .. } => match name {
                "Alpha" => out_default.unwrap_or(SocketValue::Scalar(1.0)),
                _ => out_default.unwrap_or(SocketValue::zero(SocketType::Color)),
            },
        };
        Ok(v)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/graph/eval.rs"]
mod tests;
