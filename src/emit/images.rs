//! Per-identifier mask image sockets fed into the core instance.
//!
//! Images themselves belong to a separate image-management collaborator. The compiler only asks
//! for an output socket per identifier and links it into the matching `IDxx_Mask` input.

use crate::config::opts::MaskImageOpts;
use crate::foundation::core::{Identifier, MaterialId};
use crate::foundation::error::IdMaskResult;
use crate::graph::adapter::{GraphAdapter, GraphId, NodeHandle, NodeKind, NodeParams, SocketRef};
use std::collections::BTreeMap;

/// Supplies the painted mask of an identifier as a socket in the material graph.
pub trait MaskImageSource {
    /// Output socket for `id`'s mask inside `graph`, or `None` to leave the input unlinked.
    fn mask_socket(
        &mut self,
        adapter: &mut dyn GraphAdapter,
        material: &MaterialId,
        graph: GraphId,
        id: Identifier,
    ) -> IdMaskResult<Option<SocketRef>>;
}

/// Leaves every mask input unlinked. Masks are then driven by socket defaults.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoMaskImages;

impl MaskImageSource for NoMaskImages {
    fn mask_socket(
        &mut self,
        _adapter: &mut dyn GraphAdapter,
        _material: &MaterialId,
        _graph: GraphId,
        _id: Identifier,
    ) -> IdMaskResult<Option<SocketRef>> {
        Ok(None)
    }
}

/// Image datablock name of an identifier's mask, e.g. `Body_ID03`.
pub fn id_image_name(material: &MaterialId, id: Identifier) -> String {
    format!("{material}_ID{id}")
}

/// Creates one image-texture node per `(material, identifier)` and reuses it afterwards.
#[derive(Clone, Debug, Default)]
pub struct ImageTextureSource {
    opts: MaskImageOpts,
    nodes: BTreeMap<(MaterialId, Identifier), NodeHandle>,
}

impl ImageTextureSource {
    /// Source that declares images at `opts` resolution.
    pub fn new(opts: MaskImageOpts) -> Self {
        Self {
            opts,
            nodes: BTreeMap::new(),
        }
    }

    /// Texture node registered for an identifier, if one was created.
    pub fn node(&self, material: &MaterialId, id: Identifier) -> Option<NodeHandle> {
        self.nodes.get(&(material.clone(), id)).copied()
    }

    /// Number of texture nodes created so far.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// `true` before any texture node was created.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

impl MaskImageSource for ImageTextureSource {
    fn mask_socket(
        &mut self,
        adapter: &mut dyn GraphAdapter,
        material: &MaterialId,
        graph: GraphId,
        id: Identifier,
    ) -> IdMaskResult<Option<SocketRef>> {
        let key = (material.clone(), id);
        if let Some(node) = self.nodes.get(&key) {
            return Ok(Some(node.output("Color")));
        }
        let kind = NodeKind::ImageTexture {
            image: id_image_name(material, id),
            width: self.opts.width,
            height: self.opts.height,
        };
        let node = adapter.create_node(graph, &kind, &NodeParams::labeled(format!("ID {id}")))?;
        self.nodes.insert(key, node);
        Ok(Some(node.output("Color")))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/emit/images.rs"]
mod tests;
