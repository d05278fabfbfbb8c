use super::*;
use crate::graph::memory::MemoryHost;

fn body() -> MaterialId {
    MaterialId::new("Body").unwrap()
}

fn id(n: u32) -> Identifier {
    Identifier::new(n).unwrap()
}

#[test]
fn image_names_are_zero_padded() {
    assert_eq!(id_image_name(&body(), id(3)), "Body_ID03");
    assert_eq!(id_image_name(&body(), id(16)), "Body_ID16");
}

#[test]
fn no_mask_images_leaves_inputs_unlinked() {
    let mut host = MemoryHost::new();
    let g = host.material_graph(&body()).unwrap();
    let s = NoMaskImages
        .mask_socket(&mut host, &body(), g, id(1))
        .unwrap();
    assert!(s.is_none());
    assert_eq!(host.node_count(g), 0);
}

#[test]
fn image_texture_nodes_are_created_once_per_identifier() {
    let mut host = MemoryHost::new();
    let g = host.material_graph(&body()).unwrap();
    let mut src = ImageTextureSource::new(MaskImageOpts {
        width: 512,
        height: 256,
    });
    let a = src.mask_socket(&mut host, &body(), g, id(2)).unwrap();
    let b = src.mask_socket(&mut host, &body(), g, id(2)).unwrap();
    assert_eq!(a, b);
    assert_eq!(src.len(), 1);
    assert_eq!(host.node_count(g), 1);

    let node = src.node(&body(), id(2)).unwrap();
    assert_eq!(
        host.node_kind(node).unwrap(),
        &NodeKind::ImageTexture {
            image: "Body_ID02".to_string(),
            width: 512,
            height: 256,
        }
    );
    assert_eq!(host.node_label(node).unwrap(), Some("ID 02"));
}

#[test]
fn default_resolution_is_4k() {
    let mut host = MemoryHost::new();
    let g = host.material_graph(&body()).unwrap();
    let mut src = ImageTextureSource::default();
    assert!(src.is_empty());
    src.mask_socket(&mut host, &body(), g, id(1)).unwrap();
    let node = src.node(&body(), id(1)).unwrap();
    let NodeKind::ImageTexture { width, height, .. } = host.node_kind(node).unwrap() else {
        panic!("expected an image texture");
    };
    assert_eq!((*width, *height), (4096, 4096));
}

#[test]
fn failing_host_registers_nothing() {
    let mut host =
        MemoryHost::new().without_node_kind(crate::graph::adapter::NodeKindTag::ImageTexture);
    let g = host.material_graph(&body()).unwrap();
    let mut src = ImageTextureSource::default();
    assert!(src.mask_socket(&mut host, &body(), g, id(1)).is_err());
    assert!(src.is_empty());
}
