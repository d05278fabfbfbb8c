//! In-process reference host.
//!
//! Stores graphs, nodes and links in handle-keyed arenas and validates every operation the way a
//! real host would (unknown sockets, cross-graph links, deleting a sub-graph that is still
//! instanced). Evaluation lives in `graph::eval`, topology dumps in `graph::snapshot`.

use crate::foundation::core::{MaterialId, Rgba};
use crate::foundation::error::{IdMaskError, IdMaskResult};
use crate::graph::adapter::{
    GraphAdapter, GraphId, InterfaceSocket, MixData, NodeHandle, NodeKind, NodeKindTag,
    NodeParams, SocketDir, SocketRef, SocketType, SocketValue,
};
use std::collections::{BTreeMap, BTreeSet};

#[derive(Clone, Debug)]
pub(crate) struct GraphData {
    pub(crate) name: String,
    pub(crate) interface: Vec<InterfaceSocket>,
    /// Keyed by host node id, which grows monotonically, so iteration is creation order.
    pub(crate) nodes: BTreeMap<u64, NodeData>,
    pub(crate) links: Vec<Link>,
}

#[derive(Clone, Debug)]
pub(crate) struct NodeData {
    pub(crate) kind: NodeKind,
    pub(crate) params: NodeParams,
    pub(crate) defaults: BTreeMap<(SocketDir, String), SocketValue>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Link {
    pub(crate) from: SocketRef,
    pub(crate) to: SocketRef,
}

/// Reference [`GraphAdapter`] that keeps everything in memory and can evaluate what it stores.
#[derive(Clone, Debug, Default)]
pub struct MemoryHost {
    next_graph: u64,
    next_node: u64,
    pub(crate) graphs: BTreeMap<GraphId, GraphData>,
    materials: BTreeMap<MaterialId, GraphId>,
    unsupported: BTreeSet<NodeKindTag>,
    fail_after: Option<u64>,
    constructive_ops: u64,
}

impl MemoryHost {
    /// Empty host that supports every node kind.
    pub fn new() -> Self {
        Self::default()
    }

    /// Host that rejects `kind`, as an older host version would.
    pub fn without_node_kind(mut self, kind: NodeKindTag) -> Self {
        self.unsupported.insert(kind);
        self
    }

    /// Make the `n`-th constructive operation from now fail (0 = the next one).
    ///
    /// Constructive operations are graph/node/link creation, interface declaration, default
    /// assignment and group assignment. Deletions never fail by injection so rollback can run.
    pub fn fail_after(&mut self, n: u64) {
        self.fail_after = Some(self.constructive_ops + n);
    }

    /// Stop injecting failures.
    pub fn clear_failure(&mut self) {
        self.fail_after = None;
    }

    /// Number of sub-graphs and material graphs currently stored.
    pub fn graph_count(&self) -> usize {
        self.graphs.len()
    }

    /// Whether `graph` still exists.
    pub fn contains_graph(&self, graph: GraphId) -> bool {
        self.graphs.contains_key(&graph)
    }

    /// Name of a stored graph.
    pub fn graph_name(&self, graph: GraphId) -> Option<&str> {
        self.graphs.get(&graph).map(|g| g.name.as_str())
    }

    /// Number of nodes in `graph`.
    pub fn node_count(&self, graph: GraphId) -> usize {
        self.graphs.get(&graph).map_or(0, |g| g.nodes.len())
    }

    /// Number of links in `graph`.
    pub fn link_count(&self, graph: GraphId) -> usize {
        self.graphs.get(&graph).map_or(0, |g| g.links.len())
    }

    /// Interface declared on `graph`.
    pub fn interface(&self, graph: GraphId) -> IdMaskResult<&[InterfaceSocket]> {
        Ok(&self.graph(graph)?.interface)
    }

    /// Kind of a stored node.
    pub fn node_kind(&self, node: NodeHandle) -> IdMaskResult<&NodeKind> {
        Ok(&self.node(node)?.kind)
    }

    /// Label of a stored node.
    pub fn node_label(&self, node: NodeHandle) -> IdMaskResult<Option<&str>> {
        Ok(self.node(node)?.params.label.as_deref())
    }

    /// Whether `from -> to` is currently linked.
    pub fn has_link(&self, from: &SocketRef, to: &SocketRef) -> bool {
        self.graphs
            .get(&from.node.graph)
            .is_some_and(|g| g.links.iter().any(|l| &l.from == from && &l.to == to))
    }

    /// Source feeding an input socket, if linked.
    pub fn link_source(&self, to: &SocketRef) -> Option<&SocketRef> {
        self.graphs
            .get(&to.node.graph)?
            .links
            .iter()
            .find(|l| &l.to == to)
            .map(|l| &l.from)
    }

    pub(crate) fn graph(&self, graph: GraphId) -> IdMaskResult<&GraphData> {
        self.graphs
            .get(&graph)
            .ok_or_else(|| IdMaskError::adapter(format!("unknown graph {}", graph.0)))
    }

    fn graph_mut(&mut self, graph: GraphId) -> IdMaskResult<&mut GraphData> {
        self.graphs
            .get_mut(&graph)
            .ok_or_else(|| IdMaskError::adapter(format!("unknown graph {}", graph.0)))
    }

    pub(crate) fn node(&self, node: NodeHandle) -> IdMaskResult<&NodeData> {
        self.graph(node.graph)?
            .nodes
            .get(&node.id)
            .ok_or_else(|| IdMaskError::adapter(format!("unknown node {}", node.id)))
    }

    fn node_mut(&mut self, node: NodeHandle) -> IdMaskResult<&mut NodeData> {
        self.graph_mut(node.graph)?
            .nodes
            .get_mut(&node.id)
            .ok_or_else(|| IdMaskError::adapter(format!("unknown node {}", node.id)))
    }

    fn constructive(&mut self, what: &str) -> IdMaskResult<()> {
        let n = self.constructive_ops;
        self.constructive_ops += 1;
        if self.fail_after == Some(n) {
            self.fail_after = None;
            return Err(IdMaskError::adapter(format!("injected failure at {what}")));
        }
        Ok(())
    }

    /// Type of socket `name` on a node, or `None` if the node has no such socket.
    pub(crate) fn socket_type(
        &self,
        graph: GraphId,
        kind: &NodeKind,
        dir: SocketDir,
        name: &str,
    ) -> Option<SocketType> {
        fn lookup(names: &[(&str, SocketType)], name: &str) -> Option<SocketType> {
            names.iter().find(|(n, _)| *n == name).map(|(_, ty)| *ty)
        }
        let fixed = |names: &[(&str, SocketType)]| lookup(names, name);
        let iface = |g: GraphId, want: SocketDir| {
            self.graphs.get(&g).and_then(|data| {
                data.interface
                    .iter()
                    .find(|s| s.dir == want && s.name == name)
                    .map(|s| s.ty)
            })
        };
        use SocketDir::{In, Out};
        use SocketType::{Color, Scalar, Vector};
        match (kind, dir) {
            (NodeKind::GroupInput, Out) => iface(graph, In),
            (NodeKind::GroupOutput, In) => iface(graph, Out),
            (NodeKind::GroupInstance { group }, d) => iface(*group, d),
            (NodeKind::Value, Out) => fixed(&[("Value", Scalar)]),
            (NodeKind::Math(_), In) => fixed(&[("A", Scalar), ("B", Scalar)]),
            (NodeKind::Math(_), Out) => fixed(&[("Value", Scalar)]),
            (NodeKind::CombineRgb, In) => fixed(&[("R", Scalar), ("G", Scalar), ("B", Scalar)]),
            (NodeKind::CombineRgb, Out) => fixed(&[("Color", Color)]),
            (NodeKind::SeparateRgb, In) => fixed(&[("Color", Color)]),
            (NodeKind::SeparateRgb, Out) => fixed(&[("R", Scalar), ("G", Scalar), ("B", Scalar)]),
            (NodeKind::Mix(data), In) => {
                let ty = match data {
                    MixData::Color => Color,
                    MixData::Vector => Vector,
                };
                fixed(&[("Factor", Scalar), ("A", ty), ("B", ty)])
            }
            (NodeKind::Mix(data), Out) => match data {
                MixData::Color => fixed(&[("Result", Color)]),
                MixData::Vector => fixed(&[("Result", Vector)]),
            },
            (NodeKind::NormalMap, In) => fixed(&[("Color", Color)]),
            (NodeKind::NormalMap, Out) => fixed(&[("Normal", Vector)]),
            (NodeKind::ImageTexture { .. }, Out) => fixed(&[("Color", Color), ("Alpha", Scalar)]),
            _ => None,
        }
    }

    fn check_socket(&self, socket: &SocketRef) -> IdMaskResult<SocketType> {
        let node = self.node(socket.node)?;
        self.socket_type(socket.node.graph, &node.kind, socket.dir, &socket.name)
            .ok_or_else(|| {
                IdMaskError::adapter(format!(
                    "node {} ({:?}) has no {:?} socket '{}'",
                    socket.node.id,
                    node.kind.tag(),
                    socket.dir,
                    socket.name
                ))
            })
    }

    fn set_default(&mut self, socket: &SocketRef, value: SocketValue) -> IdMaskResult<()> {
        self.check_socket(socket)?;
        self.constructive("set_default")?;
        let node = self.node_mut(socket.node)?;
        node.defaults.insert((socket.dir, socket.name.clone()), value);
        Ok(())
    }

    fn is_instanced(&self, group: GraphId) -> bool {
        self.graphs.values().any(|g| {
            g.nodes
                .values()
                .any(|n| matches!(n.kind, NodeKind::GroupInstance { group: x } if x == group))
        })
    }
}

impl GraphAdapter for MemoryHost {
    fn material_graph(&mut self, material: &MaterialId) -> IdMaskResult<GraphId> {
        if let Some(id) = self.materials.get(material) {
            return Ok(*id);
        }
        let id = GraphId(self.next_graph);
        self.next_graph += 1;
        self.graphs.insert(
            id,
            GraphData {
                name: material.as_str().to_string(),
                interface: Vec::new(),
                nodes: BTreeMap::new(),
                links: Vec::new(),
            },
        );
        self.materials.insert(material.clone(), id);
        Ok(id)
    }

    fn create_graph(&mut self, name: &str) -> IdMaskResult<GraphId> {
        self.constructive("create_graph")?;
        let id = GraphId(self.next_graph);
        self.next_graph += 1;
        self.graphs.insert(
            id,
            GraphData {
                name: name.to_string(),
                interface: Vec::new(),
                nodes: BTreeMap::new(),
                links: Vec::new(),
            },
        );
        Ok(id)
    }

    fn delete_graph(&mut self, graph: GraphId) -> IdMaskResult<()> {
        self.graph(graph)?;
        if self.materials.values().any(|g| *g == graph) {
            return Err(IdMaskError::adapter("cannot delete a material graph"));
        }
        if self.is_instanced(graph) {
            return Err(IdMaskError::adapter(format!(
                "graph {} is still instanced",
                graph.0
            )));
        }
        self.graphs.remove(&graph);
        Ok(())
    }

    fn declare_interface(
        &mut self,
        graph: GraphId,
        sockets: &[InterfaceSocket],
    ) -> IdMaskResult<()> {
        self.graph(graph)?;
        let mut seen = BTreeSet::new();
        for s in sockets {
            if !seen.insert((s.dir, s.name.as_str())) {
                return Err(IdMaskError::adapter(format!(
                    "duplicate interface socket '{}'",
                    s.name
                )));
            }
        }
        self.constructive("declare_interface")?;
        self.graph_mut(graph)?.interface = sockets.to_vec();
        Ok(())
    }

    fn create_node(
        &mut self,
        graph: GraphId,
        kind: &NodeKind,
        params: &NodeParams,
    ) -> IdMaskResult<NodeHandle> {
        self.graph(graph)?;
        if self.unsupported.contains(&kind.tag()) {
            return Err(IdMaskError::adapter(format!(
                "node kind {:?} is not supported by this host",
                kind.tag()
            )));
        }
        if let NodeKind::GroupInstance { group } = kind {
            self.graph(*group)?;
        }
        self.constructive("create_node")?;
        let id = self.next_node;
        self.next_node += 1;
        self.graph_mut(graph)?.nodes.insert(
            id,
            NodeData {
                kind: kind.clone(),
                params: params.clone(),
                defaults: BTreeMap::new(),
            },
        );
        Ok(NodeHandle { graph, id })
    }

    fn delete_node(&mut self, node: NodeHandle) -> IdMaskResult<()> {
        let g = self.graph_mut(node.graph)?;
        if g.nodes.remove(&node.id).is_none() {
            return Err(IdMaskError::adapter(format!("unknown node {}", node.id)));
        }
        g.links.retain(|l| l.from.node != node && l.to.node != node);
        Ok(())
    }

    fn create_link(&mut self, from: &SocketRef, to: &SocketRef) -> IdMaskResult<()> {
        if from.dir != SocketDir::Out || to.dir != SocketDir::In {
            return Err(IdMaskError::adapter("links run from an output to an input"));
        }
        if from.node.graph != to.node.graph {
            return Err(IdMaskError::adapter("cannot link across graphs"));
        }
        self.check_socket(from)?;
        self.check_socket(to)?;
        self.constructive("create_link")?;
        let g = self.graph_mut(to.node.graph)?;
        // An input takes one link; a new link replaces the old one.
        g.links.retain(|l| &l.to != to);
        g.links.push(Link {
            from: from.clone(),
            to: to.clone(),
        });
        Ok(())
    }

    fn remove_link(&mut self, from: &SocketRef, to: &SocketRef) -> IdMaskResult<()> {
        let g = self.graph_mut(to.node.graph)?;
        let before = g.links.len();
        g.links.retain(|l| !(&l.from == from && &l.to == to));
        if g.links.len() == before {
            return Err(IdMaskError::adapter(format!(
                "no link '{}' -> '{}'",
                from.name, to.name
            )));
        }
        Ok(())
    }

    fn set_default_scalar(&mut self, socket: &SocketRef, value: f32) -> IdMaskResult<()> {
        self.set_default(socket, SocketValue::Scalar(value))
    }

    fn set_default_color(&mut self, socket: &SocketRef, value: Rgba) -> IdMaskResult<()> {
        self.set_default(socket, SocketValue::Color(value))
    }

    fn assign_group(&mut self, instance: NodeHandle, group: GraphId) -> IdMaskResult<()> {
        let new_iface = self.graph(group)?.interface.clone();
        let node = self.node(instance)?;
        let NodeKind::GroupInstance { group: old } = node.kind else {
            return Err(IdMaskError::adapter("assign_group needs a group instance node"));
        };
        if self.graph(old)?.interface != new_iface {
            return Err(IdMaskError::adapter(
                "assign_group needs a sub-graph with an identical interface",
            ));
        }
        self.constructive("assign_group")?;
        self.node_mut(instance)?.kind = NodeKind::GroupInstance { group };
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/graph/memory.rs"]
mod tests;
