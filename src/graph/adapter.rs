//! Boundary between the compiler and whatever actually stores node graphs.
//!
//! The compiler only describes topology and parameters through [`GraphAdapter`]. Capability
//! differences between host versions stay behind this trait: a host that cannot provide a node
//! kind rejects it with [`crate::IdMaskError::Adapter`], and the compiler never probes versions
//! itself.

use crate::foundation::core::{MaterialId, Rgba, Vec3};
use crate::foundation::error::IdMaskResult;
use crate::foundation::math::luminance;

/// Identifier of a graph (a material's own graph or a reusable sub-graph) inside a host.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize)]
pub struct GraphId(pub u64);

/// Identifier of a node inside a host graph.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize)]
pub struct NodeHandle {
    /// Graph that owns the node.
    pub graph: GraphId,
    /// Host-assigned node id, unique within the host.
    pub id: u64,
}

impl NodeHandle {
    /// Named input socket of this node.
    pub fn input(self, name: impl Into<String>) -> SocketRef {
        SocketRef {
            node: self,
            dir: SocketDir::In,
            name: name.into(),
        }
    }

    /// Named output socket of this node.
    pub fn output(self, name: impl Into<String>) -> SocketRef {
        SocketRef {
            node: self,
            dir: SocketDir::Out,
            name: name.into(),
        }
    }
}

/// Socket direction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize)]
pub enum SocketDir {
    /// Consumes a value.
    In,
    /// Produces a value.
    Out,
}

/// A socket on a node, addressed by name.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SocketRef {
    /// Owning node.
    pub node: NodeHandle,
    /// Direction of the socket.
    pub dir: SocketDir,
    /// Socket name.
    pub name: String,
}

/// Value type carried by a socket.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum SocketType {
    /// Single float.
    Scalar,
    /// RGBA color.
    Color,
    /// XYZ vector.
    Vector,
}

/// One external socket of a reusable sub-graph.
#[derive(Clone, Debug, PartialEq, Eq, Hash, serde::Serialize)]
pub struct InterfaceSocket {
    /// Socket name, unique per direction.
    pub name: String,
    /// Whether the sub-graph consumes or produces it.
    pub dir: SocketDir,
    /// Value type.
    pub ty: SocketType,
}

impl InterfaceSocket {
    /// Input interface socket.
    pub fn input(name: impl Into<String>, ty: SocketType) -> Self {
        Self {
            name: name.into(),
            dir: SocketDir::In,
            ty,
        }
    }

    /// Output interface socket.
    pub fn output(name: impl Into<String>, ty: SocketType) -> Self {
        Self {
            name: name.into(),
            dir: SocketDir::Out,
            ty,
        }
    }
}

/// Scalar math operations used by the channel fold.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize)]
pub enum MathOp {
    /// `A + B`
    Add,
    /// `A - B`
    Subtract,
    /// `A * B`
    Multiply,
}

/// Data type a mix node interpolates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize)]
pub enum MixData {
    /// RGBA colors.
    Color,
    /// XYZ vectors, no clamping.
    Vector,
}

/// Node kinds the compiler emits.
///
/// Socket names per kind:
///
/// | kind            | inputs                  | outputs            |
/// |-----------------|-------------------------|--------------------|
/// | `GroupInput`    | -                       | interface inputs   |
/// | `GroupOutput`   | interface outputs       | -                  |
/// | `GroupInstance` | group interface inputs  | group outputs      |
/// | `Value`         | -                       | `Value`            |
/// | `Math`          | `A`, `B`                | `Value`            |
/// | `CombineRgb`    | `R`, `G`, `B`           | `Color`            |
/// | `SeparateRgb`   | `Color`                 | `R`, `G`, `B`      |
/// | `Mix`           | `Factor`, `A`, `B`      | `Result`           |
/// | `NormalMap`     | `Color`                 | `Normal`           |
/// | `ImageTexture`  | -                       | `Color`, `Alpha`   |
#[derive(Clone, Debug, PartialEq, Eq, Hash, serde::Serialize)]
pub enum NodeKind {
    /// Exposes the graph's interface inputs.
    GroupInput,
    /// Receives the graph's interface outputs.
    GroupOutput,
    /// Instance of a reusable sub-graph.
    GroupInstance {
        /// Sub-graph being instanced.
        group: GraphId,
    },
    /// Constant scalar.
    Value,
    /// Binary scalar math.
    Math(MathOp),
    /// Pack three scalars into a color.
    CombineRgb,
    /// Unpack a color into three scalars.
    SeparateRgb,
    /// `lerp(A, B, Factor)`.
    Mix(MixData),
    /// Tangent-space normal map decode of a packed color.
    NormalMap,
    /// Externally owned mask image.
    ImageTexture {
        /// Image datablock name.
        image: String,
        /// Image width in pixels.
        width: u32,
        /// Image height in pixels.
        height: u32,
    },
}

/// Field-less discriminant of [`NodeKind`], used for host capability lists.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize)]
pub enum NodeKindTag {
    /// [`NodeKind::GroupInput`]
    GroupInput,
    /// [`NodeKind::GroupOutput`]
    GroupOutput,
    /// [`NodeKind::GroupInstance`]
    GroupInstance,
    /// [`NodeKind::Value`]
    Value,
    /// [`NodeKind::Math`]
    Math,
    /// [`NodeKind::CombineRgb`]
    CombineRgb,
    /// [`NodeKind::SeparateRgb`]
    SeparateRgb,
    /// [`NodeKind::Mix`]
    Mix,
    /// [`NodeKind::NormalMap`]
    NormalMap,
    /// [`NodeKind::ImageTexture`]
    ImageTexture,
}

impl NodeKind {
    /// Discriminant of this kind.
    pub fn tag(&self) -> NodeKindTag {
        match self {
            NodeKind::GroupInput => NodeKindTag::GroupInput,
            NodeKind::GroupOutput => NodeKindTag::GroupOutput,
            NodeKind::GroupInstance { .. } => NodeKindTag::GroupInstance,
            NodeKind::Value => NodeKindTag::Value,
            NodeKind::Math(_) => NodeKindTag::Math,
            NodeKind::CombineRgb => NodeKindTag::CombineRgb,
            NodeKind::SeparateRgb => NodeKindTag::SeparateRgb,
            NodeKind::Mix(_) => NodeKindTag::Mix,
            NodeKind::NormalMap => NodeKindTag::NormalMap,
            NodeKind::ImageTexture { .. } => NodeKindTag::ImageTexture,
        }
    }
}

/// Presentation-only node parameters.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, serde::Serialize)]
pub struct NodeParams {
    /// Human-readable label shown by the host.
    pub label: Option<String>,
}

impl NodeParams {
    /// Params with a label.
    pub fn labeled(label: impl Into<String>) -> Self {
        Self {
            label: Some(label.into()),
        }
    }
}

/// A value flowing through a socket.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub enum SocketValue {
    /// Single float.
    Scalar(f32),
    /// RGBA color.
    Color(Rgba),
    /// XYZ vector.
    Vector(Vec3),
}

impl SocketValue {
    /// Zero value of a socket type (colors are opaque black).
    pub fn zero(ty: SocketType) -> Self {
        match ty {
            SocketType::Scalar => SocketValue::Scalar(0.0),
            SocketType::Color => SocketValue::Color([0.0, 0.0, 0.0, 1.0]),
            SocketType::Vector => SocketValue::Vector([0.0, 0.0, 0.0]),
        }
    }

    /// Implicit conversion to a scalar (colors use luminance, vectors their average).
    pub fn as_scalar(self) -> f32 {
        match self {
            SocketValue::Scalar(v) => v,
            SocketValue::Color(c) => luminance(c),
            SocketValue::Vector(v) => (v[0] + v[1] + v[2]) / 3.0,
        }
    }

    /// Implicit conversion to a color (alpha 1 for non-colors).
    pub fn as_color(self) -> Rgba {
        match self {
            SocketValue::Scalar(v) => [v, v, v, 1.0],
            SocketValue::Color(c) => c,
            SocketValue::Vector(v) => [v[0], v[1], v[2], 1.0],
        }
    }

    /// Implicit conversion to a vector.
    pub fn as_vector(self) -> Vec3 {
        match self {
            SocketValue::Scalar(v) => [v, v, v],
            SocketValue::Color(c) => [c[0], c[1], c[2]],
            SocketValue::Vector(v) => v,
        }
    }
}

/// Host node-graph substrate.
///
/// All calls are synchronous; the compiler assumes exclusive, serialized access for the duration
/// of a rebuild or chain build.
pub trait GraphAdapter {
    /// The material's own graph, where core and chain instances live.
    fn material_graph(&mut self, material: &MaterialId) -> IdMaskResult<GraphId>;

    /// Create an empty reusable sub-graph.
    fn create_graph(&mut self, name: &str) -> IdMaskResult<GraphId>;

    /// Delete a sub-graph and everything inside it.
    fn delete_graph(&mut self, graph: GraphId) -> IdMaskResult<()>;

    /// Declare the external sockets of a sub-graph.
    fn declare_interface(
        &mut self,
        graph: GraphId,
        sockets: &[InterfaceSocket],
    ) -> IdMaskResult<()>;

    /// Create a node.
    fn create_node(
        &mut self,
        graph: GraphId,
        kind: &NodeKind,
        params: &NodeParams,
    ) -> IdMaskResult<NodeHandle>;

    /// Delete a node and every link touching it.
    fn delete_node(&mut self, node: NodeHandle) -> IdMaskResult<()>;

    /// Link an output socket to an input socket of the same graph.
    fn create_link(&mut self, from: &SocketRef, to: &SocketRef) -> IdMaskResult<()>;

    /// Remove an existing link.
    fn remove_link(&mut self, from: &SocketRef, to: &SocketRef) -> IdMaskResult<()>;

    /// Set the unlinked value of a scalar socket.
    fn set_default_scalar(&mut self, socket: &SocketRef, value: f32) -> IdMaskResult<()>;

    /// Set the unlinked value of a color socket.
    fn set_default_color(&mut self, socket: &SocketRef, value: Rgba) -> IdMaskResult<()>;

    /// Point a group instance node at another sub-graph with the same interface.
    fn assign_group(&mut self, instance: NodeHandle, group: GraphId) -> IdMaskResult<()>;
}
