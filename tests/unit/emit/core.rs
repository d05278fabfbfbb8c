use super::*;
use crate::emit::images::{ImageTextureSource, NoMaskImages};
use crate::foundation::core::ID_COUNT;
use crate::graph::adapter::{NodeKindTag, SocketDir, SocketValue};
use crate::graph::eval::SocketValues;
use crate::graph::memory::MemoryHost;

fn body() -> MaterialId {
    MaterialId::new("Body").unwrap()
}

fn cfg(ids: &[u32]) -> MaterialIdConfig {
    MaterialIdConfig::from_ids(ids.iter().copied()).unwrap()
}

fn mask_inputs(masks: &[f32; ID_COUNT]) -> SocketValues {
    Identifier::all()
        .map(|id| (mask_socket_name(id), SocketValue::Scalar(masks[id.index()])))
        .collect()
}

#[test]
fn interface_has_sixteen_masks_each_way_and_two_packed_outputs() {
    let iface = core_interface();
    let ins = iface.iter().filter(|s| s.dir == SocketDir::In).count();
    let outs: Vec<_> = iface.iter().filter(|s| s.dir == SocketDir::Out).collect();
    assert_eq!(ins, 16);
    assert_eq!(outs.len(), 18);
    assert!(outs.iter().any(|s| s.name == RGB_OUTPUT && s.ty == SocketType::Color));
    assert!(outs.iter().any(|s| s.name == ALPHA_OUTPUT && s.ty == SocketType::Scalar));
    assert_eq!(mask_socket_name(Identifier::new(7).unwrap()), "ID07_Mask");
}

#[test]
fn emitted_core_matches_reference_fold() {
    let mut host = MemoryHost::new();
    let mut emitter = GraphEmitter::new("ID_Core__");
    let config = cfg(&[1, 3, 4, 5, 6, 9, 13, 14, 15, 16]);
    let core = emitter
        .rebuild(&mut host, &mut NoMaskImages, &body(), &config)
        .unwrap();

    let plan = CorePlan::resolve(&config);
    let cases: [[f32; ID_COUNT]; 3] = [
        [0.0; ID_COUNT],
        [1.0; ID_COUNT],
        [
            0.0, 0.3, 1.0, 0.25, 1.0, 0.5, 0.0, 0.0, 0.75, 0.0, 0.0, 0.0, 0.1, 0.2, 0.3, 0.4,
        ],
    ];
    for masks in cases {
        let out = host.evaluate(core.graph, &mask_inputs(&masks)).unwrap();
        let expected = plan.evaluate(&masks);
        let SocketValue::Color(rgb) = out[RGB_OUTPUT] else {
            panic!("RGB_ID must be a color");
        };
        assert_eq!([rgb[0], rgb[1], rgb[2]], expected.rgb);
        assert_eq!(out[ALPHA_OUTPUT], SocketValue::Scalar(expected.alpha));
        for id in Identifier::all() {
            assert_eq!(
                out[&mask_socket_name(id)],
                SocketValue::Scalar(masks[id.index()])
            );
        }
    }
}

#[test]
fn three_active_middle_mask_through_the_graph() {
    let mut host = MemoryHost::new();
    let mut emitter = GraphEmitter::new("ID_Core__");
    let core = emitter
        .rebuild(&mut host, &mut NoMaskImages, &body(), &cfg(&[1, 3, 4]))
        .unwrap();
    let mut masks = [0.0; ID_COUNT];
    masks[2] = 1.0;
    let out = host.evaluate(core.graph, &mask_inputs(&masks)).unwrap();
    let rgb = out[RGB_OUTPUT].as_color();
    assert!((rgb[0] - 0.397).abs() < 1e-6, "{rgb:?}");
}

#[test]
fn rebuild_keeps_instance_and_replaces_sub_graph() {
    let mut host = MemoryHost::new();
    let mut emitter = GraphEmitter::new("ID_Core__");
    let first = emitter
        .rebuild(&mut host, &mut NoMaskImages, &body(), &cfg(&[1]))
        .unwrap();
    let second = emitter
        .rebuild(&mut host, &mut NoMaskImages, &body(), &cfg(&[1, 2]))
        .unwrap();
    assert_eq!(first.instance, second.instance);
    assert_ne!(first.graph, second.graph);
    assert!(!host.contains_graph(first.graph));
    assert_eq!(
        host.node_kind(second.instance).unwrap(),
        &NodeKind::GroupInstance {
            group: second.graph
        }
    );
    assert_eq!(emitter.get(&body()), Some(&second));
    assert_eq!(host.graph_name(second.graph), Some("ID_Core__Body"));
}

#[test]
fn failed_first_build_leaves_nothing_behind() {
    let mut host = MemoryHost::new().without_node_kind(NodeKindTag::CombineRgb);
    let mut emitter = GraphEmitter::new("ID_Core__");
    let err = emitter
        .rebuild(&mut host, &mut NoMaskImages, &body(), &cfg(&[1]))
        .unwrap_err();
    assert!(err.is_adapter_failure());
    assert_eq!(host.graph_count(), 0);
    assert!(emitter.get(&body()).is_none());
}

#[test]
fn failed_swap_keeps_previous_core() {
    let mut host = MemoryHost::new();
    let mut emitter = GraphEmitter::new("ID_Core__");
    let first = emitter
        .rebuild(&mut host, &mut NoMaskImages, &body(), &cfg(&[1, 2]))
        .unwrap();
    let before = host.snapshot(first.graph).unwrap();
    let graphs = host.graph_count();

    host.fail_after(20);
    assert!(
        emitter
            .rebuild(&mut host, &mut NoMaskImages, &body(), &cfg(&[5]))
            .is_err()
    );
    host.clear_failure();

    assert_eq!(host.graph_count(), graphs);
    assert_eq!(emitter.get(&body()), Some(&first));
    assert_eq!(host.snapshot(first.graph).unwrap(), before);
    assert_eq!(
        host.node_kind(first.instance).unwrap(),
        &NodeKind::GroupInstance { group: first.graph }
    );
}

#[test]
fn mask_images_are_wired_into_the_instance() {
    let mut host = MemoryHost::new();
    let mut emitter = GraphEmitter::new("ID_Core__");
    let mut images = ImageTextureSource::default();
    let core = emitter
        .rebuild(&mut host, &mut images, &body(), &cfg(&[1]))
        .unwrap();
    assert_eq!(images.len(), 16);
    for id in Identifier::all() {
        let node = images.node(&body(), id).unwrap();
        assert!(host.has_link(&node.output("Color"), &core.mask_input(id)));
    }
    // 16 textures + the core instance.
    assert_eq!(host.node_count(core.instance.graph), 17);
}

#[test]
fn failed_image_wiring_removes_the_new_instance() {
    let mut host = MemoryHost::new().without_node_kind(NodeKindTag::ImageTexture);
    let mut emitter = GraphEmitter::new("ID_Core__");
    let mut images = ImageTextureSource::default();
    assert!(
        emitter
            .rebuild(&mut host, &mut images, &body(), &cfg(&[1]))
            .is_err()
    );
    let material_graph = host.material_graph(&body()).unwrap();
    assert_eq!(host.node_count(material_graph), 0);
    // Only the material graph is left.
    assert_eq!(host.graph_count(), 1);
}

#[test]
fn every_failure_point_rolls_back_to_the_committed_core() {
    let mut host = MemoryHost::new();
    let mut emitter = GraphEmitter::new("ID_Core__");
    let first = emitter
        .rebuild(&mut host, &mut NoMaskImages, &body(), &cfg(&[1, 2]))
        .unwrap();
    let before = host.snapshot(first.graph).unwrap();
    let graphs = host.graph_count();

    let mut failures = 0;
    loop {
        host.fail_after(failures);
        let res = emitter.rebuild(&mut host, &mut NoMaskImages, &body(), &cfg(&[5, 6]));
        if res.is_ok() {
            break;
        }
        failures += 1;
        assert_eq!(host.graph_count(), graphs);
        assert_eq!(emitter.get(&body()), Some(&first));
        assert_eq!(host.snapshot(first.graph).unwrap(), before);
    }
    host.clear_failure();
    // Scratch build plus the final group assignment.
    assert!(failures > 40, "{failures}");
    assert_ne!(emitter.get(&body()).unwrap().graph, first.graph);
}
