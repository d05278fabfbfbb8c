//! Handle-free topology dumps of stored graphs.
//!
//! Node identities differ between two builds of the same graph; a snapshot replaces them with
//! creation ordinals so that structurally equal graphs produce equal snapshots and fingerprints.

use crate::foundation::error::IdMaskResult;
use crate::graph::adapter::{
    GraphId, InterfaceSocket, MathOp, MixData, NodeKind, SocketDir, SocketType, SocketValue,
};
use crate::graph::memory::MemoryHost;
use std::collections::BTreeMap;
use xxhash_rust::xxh3::Xxh3;

const XXH3_SEED: u64 = 0x1d6a_37c4_95e2_0b8f;

/// Serializable, handle-free view of one graph.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct GraphSnapshot {
    /// Graph name.
    pub name: String,
    /// Declared interface.
    pub interface: Vec<InterfaceSocket>,
    /// Nodes in creation order.
    pub nodes: Vec<NodeSnapshot>,
    /// Links, sorted.
    pub links: Vec<LinkSnapshot>,
}

/// One node of a [`GraphSnapshot`].
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct NodeSnapshot {
    /// Kind with sub-graph references replaced by sub-graph names.
    pub kind: String,
    /// Host label.
    pub label: Option<String>,
    /// Assigned defaults, `(direction, socket, value)`.
    pub defaults: Vec<(SocketDir, String, SocketValue)>,
}

/// One link of a [`GraphSnapshot`], endpoints given as `(node ordinal, socket name)`.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, serde::Serialize)]
pub struct LinkSnapshot {
    /// Source node ordinal and output socket.
    pub from: (usize, String),
    /// Target node ordinal and input socket.
    pub to: (usize, String),
}

/// Stable 128-bit topology fingerprint.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize)]
pub struct TopologyFingerprint {
    /// High 64 bits.
    pub hi: u64,
    /// Low 64 bits.
    pub lo: u64,
}

impl std::fmt::Display for TopologyFingerprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:016x}{:016x}", self.hi, self.lo)
    }
}

impl MemoryHost {
    /// Snapshot a stored graph.
    pub fn snapshot(&self, graph: GraphId) -> IdMaskResult<GraphSnapshot> {
        let data = self.graph(graph)?;
        let ordinal: BTreeMap<u64, usize> = data
            .nodes
            .keys()
            .enumerate()
            .map(|(i, id)| (*id, i))
            .collect();

        let nodes = data
            .nodes
            .values()
            .map(|n| NodeSnapshot {
                kind: self.describe_kind(&n.kind),
                label: n.params.label.clone(),
                defaults: n
                    .defaults
                    .iter()
                    .map(|((dir, name), v)| (*dir, name.clone(), *v))
                    .collect(),
            })
            .collect();

        let mut links: Vec<LinkSnapshot> = data
            .links
            .iter()
            .map(|l| LinkSnapshot {
                from: (ordinal[&l.from.node.id], l.from.name.clone()),
                to: (ordinal[&l.to.node.id], l.to.name.clone()),
            })
            .collect();
        links.sort();

        Ok(GraphSnapshot {
            name: data.name.clone(),
            interface: data.interface.clone(),
            nodes,
            links,
        })
    }

    fn describe_kind(&self, kind: &NodeKind) -> String {
        match kind {
            NodeKind::GroupInput => "group_input".to_string(),
            NodeKind::GroupOutput => "group_output".to_string(),
            NodeKind::GroupInstance { group } => {
                format!("group:{}", self.graph_name(*group).unwrap_or("?"))
            }
            NodeKind::Value => "value".to_string(),
            NodeKind::Math(MathOp::Add) => "math:add".to_string(),
            NodeKind::Math(MathOp::Subtract) => "math:subtract".to_string(),
            NodeKind::Math(MathOp::Multiply) => "math:multiply".to_string(),
            NodeKind::CombineRgb => "combine_rgb".to_string(),
            NodeKind::SeparateRgb => "separate_rgb".to_string(),
            NodeKind::Mix(MixData::Color) => "mix:color".to_string(),
            NodeKind::Mix(MixData::Vector) => "mix:vector".to_string(),
            NodeKind::NormalMap => "normal_map".to_string(),
            NodeKind::ImageTexture {
                image,
                width,
                height,
            } => format!("image:{image}:{width}x{height}"),
        }
    }
}

impl GraphSnapshot {
    /// Fingerprint of everything in the snapshot except the graph name.
    pub fn fingerprint(&self) -> TopologyFingerprint {
        let mut h = StableHasher::new();
        h.write_u32(self.interface.len() as u32);
        for s in &self.interface {
            h.write_str(&s.name);
            h.write_u8(match s.dir {
                SocketDir::In => 0,
                SocketDir::Out => 1,
            });
            h.write_u8(match s.ty {
                SocketType::Scalar => 0,
                SocketType::Color => 1,
                SocketType::Vector => 2,
            });
        }
        h.write_u32(self.nodes.len() as u32);
        for n in &self.nodes {
            h.write_str(&n.kind);
            h.write_str(n.label.as_deref().unwrap_or(""));
            h.write_u32(n.defaults.len() as u32);
            for (dir, name, v) in &n.defaults {
                h.write_u8(u8::from(*dir == SocketDir::Out));
                h.write_str(name);
                h.write_value(v);
            }
        }
        h.write_u32(self.links.len() as u32);
        for l in &self.links {
            h.write_u32(l.from.0 as u32);
            h.write_str(&l.from.1);
            h.write_u32(l.to.0 as u32);
            h.write_str(&l.to.1);
        }
        h.finish()
    }

    /// Interface sockets in one direction.
    pub fn sockets(&self, dir: SocketDir) -> impl Iterator<Item = &InterfaceSocket> {
        self.interface.iter().filter(move |s| s.dir == dir)
    }
}

struct StableHasher {
    inner: Xxh3,
}

impl StableHasher {
    fn new() -> Self {
        Self {
            inner: Xxh3::with_seed(XXH3_SEED),
        }
    }

    fn write_bytes(&mut self, b: &[u8]) {
        self.inner.update(b);
    }

    fn write_u8(&mut self, v: u8) {
        self.write_bytes(&[v]);
    }

    fn write_u32(&mut self, v: u32) {
        self.write_bytes(&v.to_le_bytes());
    }

    fn write_f32(&mut self, v: f32) {
        self.write_u32(v.to_bits());
    }

    fn write_str(&mut self, s: &str) {
        self.write_u32(s.len() as u32);
        self.write_bytes(s.as_bytes());
    }

    fn write_value(&mut self, v: &SocketValue) {
        match v {
            SocketValue::Scalar(x) => {
                self.write_u8(0);
                self.write_f32(*x);
            }
            SocketValue::Color(c) => {
                self.write_u8(1);
                c.iter().for_each(|x| self.write_f32(*x));
            }
            SocketValue::Vector(c) => {
                self.write_u8(2);
                c.iter().for_each(|x| self.write_f32(*x));
            }
        }
    }

    fn finish(self) -> TopologyFingerprint {
        let v = self.inner.digest128();
        TopologyFingerprint {
            hi: (v >> 64) as u64,
            lo: v as u64,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/graph/snapshot.rs"]
mod tests;
