use super::*;
use crate::config::model::MaterialIdConfig;
use crate::emit::images::NoMaskImages;
use crate::emit::core::GraphEmitter;
use crate::foundation::core::MaterialId;
use crate::graph::adapter::SocketValue;
use crate::graph::memory::MemoryHost;

fn id(n: u32) -> Identifier {
    Identifier::new(n).unwrap()
}

fn setup() -> (MemoryHost, CoreGraphHandle) {
    let mut host = MemoryHost::new();
    let core = GraphEmitter::new("ID_Core__")
        .rebuild(
            &mut host,
            &mut NoMaskImages,
            &MaterialId::new("Body").unwrap(),
            &MaterialIdConfig::new(),
        )
        .unwrap();
    (host, core)
}

fn bits(v: Vec3) -> [u32; 3] {
    v.map(f32::to_bits)
}

#[test]
fn space_zero_is_pure_convention_a() {
    let c = [0.7, 0.2, 0.9, 1.0];
    assert_eq!(bits(decode_with_space(c, 0.0)), bits(decode_tangent_normal(c)));
}

#[test]
fn space_one_is_pure_convention_b() {
    let c = [0.7, 0.2, 0.9, 1.0];
    let b = decode_with_space(c, 1.0);
    let want = decode_tangent_normal(invert_green(c));
    for i in 0..3 {
        assert!((b[i] - want[i]).abs() < 1e-6);
    }
}

#[test]
fn conventions_differ_only_in_green_sign() {
    let c = [0.6, 0.8, 0.9, 1.0];
    let a = decode_with_space(c, 0.0);
    let b = decode_with_space(c, 1.0);
    assert!((a[0] - b[0]).abs() < 1e-6);
    assert!((a[1] + b[1]).abs() < 1e-6);
    assert!((a[2] - b[2]).abs() < 1e-6);
}

#[test]
fn reference_chain_is_not_renormalized() {
    let left = [1.0, 0.5, 0.5, 1.0];
    let right = [0.0, 0.5, 0.5, 1.0];
    let v = mix_normals(
        left,
        0.0,
        &[NormalLayer {
            color: right,
            space: 0.0,
            mask: 0.5,
        }],
    );
    let len = (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt();
    assert!(len < 1e-6, "{v:?}");
}

fn entry(n: u32, color: Rgba, space: f32) -> NormalMixEntry {
    NormalMixEntry {
        id: id(n),
        color: ColorInput::Constant(color),
        space: ScalarInput::Constant(space),
    }
}

#[test]
fn graph_matches_reference() {
    let (mut host, core) = setup();
    let base = [0.5, 0.5, 1.0, 1.0];
    let a = [0.8, 0.3, 0.7, 1.0];
    let b = [0.2, 0.9, 0.6, 1.0];
    let chain = build_normal_chain(
        &mut host,
        "ID_Mix_Normal_",
        &core,
        &ColorInput::Constant(base),
        &ScalarInput::Constant(0.25),
        &[entry(6, a, 1.0), entry(1, b, 0.4)],
    )
    .unwrap();
    host.set_default_scalar(&core.mask_input(id(6)), 0.7)
        .unwrap();
    host.set_default_scalar(&core.mask_input(id(1)), 0.5)
        .unwrap();

    let want = mix_normals(
        base,
        0.25,
        &[
            NormalLayer {
                color: a,
                space: 1.0,
                mask: 0.7,
            },
            NormalLayer {
                color: b,
                space: 0.4,
                mask: 0.5,
            },
        ],
    );
    let SocketValue::Vector(got) = host.evaluate_socket(&chain.result()).unwrap() else {
        panic!("Result must be a vector");
    };
    assert_eq!(bits(got), bits(want));
    assert_eq!(host.graph_name(chain.graph), Some("ID_Mix_Normal_Body_06_01"));
}

#[test]
fn interface_lists_base_then_color_space_mask_per_entry() {
    let iface = normal_interface(&[id(3)]);
    let names: Vec<&str> = iface.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(
        names,
        ["BaseColor", "BaseSpace", "Color_ID03", "Space_ID03", "Mask_ID03", "Result"]
    );
    assert_eq!(iface.last().map(|s| s.ty), Some(SocketType::Vector));
}

#[test]
fn duplicate_identifiers_are_rejected_before_touching_the_host() {
    let (mut host, core) = setup();
    let graphs = host.graph_count();
    let err = build_normal_chain(
        &mut host,
        "ID_Mix_Normal_",
        &core,
        &ColorInput::Constant([0.5, 0.5, 1.0, 1.0]),
        &ScalarInput::Constant(0.0),
        &[entry(2, [0.5; 4], 0.0), entry(2, [0.5; 4], 0.0)],
    )
    .unwrap_err();
    assert!(matches!(err, crate::IdMaskError::Validation(_)));
    assert_eq!(host.graph_count(), graphs);
}
