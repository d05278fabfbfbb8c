//! Scratch-graph construction with rollback.
//!
//! New topology is always built into a fresh sub-graph. The caller swaps it in only after every
//! adapter call succeeded; on failure the scratch graph is deleted and nothing previously
//! committed is touched.

use crate::foundation::error::IdMaskResult;
use crate::graph::adapter::{
    GraphAdapter, GraphId, InterfaceSocket, NodeHandle, NodeKind, NodeParams, SocketRef,
};

/// Thin recorder over an adapter that emits into one graph.
pub(crate) struct GraphBuilder<'a, A: GraphAdapter + ?Sized> {
    adapter: &'a mut A,
    graph: GraphId,
    nodes: usize,
    links: usize,
}

impl<'a, A: GraphAdapter + ?Sized> GraphBuilder<'a, A> {
    pub(crate) fn new(adapter: &'a mut A, graph: GraphId) -> Self {
        Self {
            adapter,
            graph,
            nodes: 0,
            links: 0,
        }
    }

    pub(crate) fn node(&mut self, kind: NodeKind) -> IdMaskResult<NodeHandle> {
        self.create(kind, NodeParams::default())
    }

    pub(crate) fn labeled(
        &mut self,
        kind: NodeKind,
        label: impl Into<String>,
    ) -> IdMaskResult<NodeHandle> {
        self.create(kind, NodeParams::labeled(label))
    }

    fn create(&mut self, kind: NodeKind, params: NodeParams) -> IdMaskResult<NodeHandle> {
        let node = self.adapter.create_node(self.graph, &kind, &params)?;
        self.nodes += 1;
        Ok(node)
    }

    pub(crate) fn link(&mut self, from: &SocketRef, to: &SocketRef) -> IdMaskResult<()> {
        self.adapter.create_link(from, to)?;
        self.links += 1;
        Ok(())
    }

    pub(crate) fn scalar(&mut self, socket: &SocketRef, value: f32) -> IdMaskResult<()> {
        self.adapter.set_default_scalar(socket, value)
    }

    pub(crate) fn stats(&self) -> EmitStats {
        EmitStats {
            nodes: self.nodes,
            links: self.links,
        }
    }
}

/// Counts of what one scratch build emitted.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize)]
pub struct EmitStats {
    /// Nodes created.
    pub nodes: usize,
    /// Links created.
    pub links: usize,
}

/// Create sub-graph `name` with `interface`, then run `body` against it.
///
/// Any error after the graph exists deletes it again before returning.
pub(crate) fn build_subgraph<A, F>(
    adapter: &mut A,
    name: &str,
    interface: &[InterfaceSocket],
    body: F,
) -> IdMaskResult<(GraphId, EmitStats)>
where
    A: GraphAdapter + ?Sized,
    F: FnOnce(&mut GraphBuilder<'_, A>) -> IdMaskResult<()>,
{
    let graph = adapter.create_graph(name)?;
    let built = adapter.declare_interface(graph, interface).and_then(|()| {
        let mut b = GraphBuilder::new(&mut *adapter, graph);
        body(&mut b)?;
        Ok(b.stats())
    });
    match built {
        Ok(stats) => Ok((graph, stats)),
        Err(err) => {
            discard_graph(adapter, graph);
            Err(err)
        }
    }
}

/// Best-effort delete used on rollback paths; failures are logged, never raised.
pub(crate) fn discard_graph<A: GraphAdapter + ?Sized>(adapter: &mut A, graph: GraphId) {
    if let Err(err) = adapter.delete_graph(graph) {
        tracing::warn!(graph = graph.0, %err, "failed to discard graph");
    }
}

/// Best-effort node delete, same contract as [`discard_graph`].
pub(crate) fn discard_node<A: GraphAdapter + ?Sized>(adapter: &mut A, node: NodeHandle) {
    if let Err(err) = adapter.delete_node(node) {
        tracing::warn!(node = node.id, %err, "failed to discard node");
    }
}

#[cfg(test)]
#[path = "../../tests/unit/emit/scratch.rs"]
mod tests;
