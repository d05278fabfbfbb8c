use super::*;
use crate::graph::adapter::{GraphAdapter, NodeParams};

fn build(host: &mut MemoryHost, name: &str, gray: f32) -> GraphId {
    let g = host.create_graph(name).unwrap();
    host.declare_interface(g, &[InterfaceSocket::output("Out", SocketType::Scalar)])
        .unwrap();
    let go = host
        .create_node(g, &NodeKind::GroupOutput, &NodeParams::default())
        .unwrap();
    let sub = host
        .create_node(g, &NodeKind::Math(MathOp::Subtract), &NodeParams::labeled("Diff"))
        .unwrap();
    host.set_default_scalar(&sub.input("A"), gray).unwrap();
    host.create_link(&sub.output("Value"), &go.input("Out"))
        .unwrap();
    g
}

#[test]
fn equal_topology_gives_equal_fingerprint_regardless_of_handles() {
    let mut host = MemoryHost::new();
    let _pad = host.create_graph("Padding").unwrap();
    let a = build(&mut host, "A", 0.5);
    let b = build(&mut host, "B", 0.5);
    let sa = host.snapshot(a).unwrap();
    let sb = host.snapshot(b).unwrap();
    assert_ne!(sa.name, sb.name);
    assert_eq!(sa.nodes, sb.nodes);
    assert_eq!(sa.links, sb.links);
    assert_eq!(sa.fingerprint(), sb.fingerprint());
}

#[test]
fn defaults_change_the_fingerprint() {
    let mut host = MemoryHost::new();
    let a = build(&mut host, "A", 0.5);
    let b = build(&mut host, "B", 0.25);
    assert_ne!(
        host.snapshot(a).unwrap().fingerprint(),
        host.snapshot(b).unwrap().fingerprint()
    );
}

#[test]
fn snapshot_lists_links_by_ordinal() {
    let mut host = MemoryHost::new();
    let a = build(&mut host, "A", 0.5);
    let s = host.snapshot(a).unwrap();
    assert_eq!(
        s.links,
        vec![LinkSnapshot {
            from: (1, "Value".to_string()),
            to: (0, "Out".to_string()),
        }]
    );
    assert_eq!(s.nodes[1].kind, "math:subtract");
    assert_eq!(s.nodes[1].label.as_deref(), Some("Diff"));
    assert_eq!(s.sockets(SocketDir::Out).count(), 1);
    assert_eq!(s.sockets(SocketDir::In).count(), 0);
}

#[test]
fn fingerprint_renders_as_hex() {
    let fp = TopologyFingerprint { hi: 1, lo: 0xff };
    assert_eq!(fp.to_string(), "000000000000000100000000000000ff");
}

#[test]
fn snapshot_serializes_to_json() {
    let mut host = MemoryHost::new();
    let a = build(&mut host, "A", 0.5);
    let json = serde_json::to_value(host.snapshot(a).unwrap()).unwrap();
    assert_eq!(json["name"], "A");
    assert_eq!(json["nodes"].as_array().unwrap().len(), 2);
}
