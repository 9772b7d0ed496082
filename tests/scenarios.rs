//! Black-box scenarios S1-S6 from spec §8, driven end to end through
//! [`packetc::loader::Loader`] against the fixture `.packet` files under
//! `tests/fixtures/`.

use std::path::{Path, PathBuf};

use packetc::error::PacketError;
use packetc::loader::Loader;
use packetc::model::SizeDetail;

fn fixtures_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn load_and_analyze(relative: &str) -> Result<(Loader, packetc::model::PomId), PacketError> {
    let path = fixtures_dir().join(relative);
    let dir = path.parent().unwrap().to_str().unwrap().to_string();
    let mut loader = Loader::new(Some(&dir));
    let root = loader.load_root(&path)?;
    loader.analyze(root)?;
    Ok((loader, root))
}

#[test]
fn s1_const_size_with_inheritance() {
    let (loader, root) = load_and_analyze("s1_inheritance.packet").unwrap();
    let pom = loader.pom(root);

    let a = &pom.packets[pom.find_packet("A").unwrap().0];
    assert_eq!(a.min_size, 3);
    assert_eq!(a.size_info, Some(SizeDetail::Constant(3)));
    assert_eq!(a.fields[0].offset.as_ref().unwrap().constant_bytes, 0);
    assert_eq!(a.fields[1].offset.as_ref().unwrap().constant_bytes, 2);

    let b = &pom.packets[pom.find_packet("B").unwrap().0];
    assert_eq!(b.min_size, 7);
    assert_eq!(b.size_info, Some(SizeDetail::Constant(7)));
    assert_eq!(b.fields[0].offset.as_ref().unwrap().constant_bytes, 3);
}

#[test]
fn s2_dynamic_length_by_size_field() {
    let (loader, root) = load_and_analyze("s2_size_field.packet").unwrap();
    let pom = loader.pom(root);
    let pkt = &pom.packets[pom.find_packet("Pkt").unwrap().0];

    assert_eq!(pkt.min_size, 4);
    assert!(matches!(pkt.size_info, Some(SizeDetail::SizeField(_))));

    let (_, payload) = pkt.find_field("payload").unwrap();
    assert_eq!(payload.offset.as_ref().unwrap().constant_bytes, 4);
    assert!(payload.offset.as_ref().unwrap().intermediate_fields.is_empty());
    assert!(payload.repeated_info.as_ref().unwrap().is_implicit());
}

#[test]
fn s3_fixed_count_array() {
    let (loader, root) = load_and_analyze("s3_fixed_count_array.packet").unwrap();
    let pom = loader.pom(root);
    let v = &pom.packets[pom.find_packet("V").unwrap().0];

    assert_eq!(v.min_size, 13);
    assert_eq!(v.size_info, Some(SizeDetail::Constant(13)));
    assert_eq!(v.find_field("b").unwrap().1.offset.as_ref().unwrap().constant_bytes, 4);
    assert_eq!(v.find_field("tail").unwrap().1.offset.as_ref().unwrap().constant_bytes, 12);
}

#[test]
fn s4_array_sized_by_another_field() {
    let (loader, root) = load_and_analyze("s4_count_field.packet").unwrap();
    let pom = loader.pom(root);
    let m = &pom.packets[pom.find_packet("M").unwrap().0];

    let (data_ref, data) = m.find_field("data").unwrap();
    assert_eq!(data.repeated_info.as_ref().unwrap().count_field, Some(m.find_field("cnt").unwrap().0));

    let crc_offset = m.find_field("crc").unwrap().1.offset.as_ref().unwrap();
    assert_eq!(crc_offset.constant_bytes, 4);
    assert_eq!(crc_offset.intermediate_fields, vec![data_ref]);

    assert!(m.size_info.unwrap().is_dynamic());
}

#[test]
fn s5_non_last_implicit_array_is_rejected() {
    let err = load_and_analyze("s5_bad_implicit_array.packet").unwrap_err();
    match err {
        PacketError::LayoutError { location, message } => {
            assert_eq!(location.packet.as_deref(), Some("Bad"));
            assert_eq!(location.field.as_deref(), Some("blob"));
            assert!(message.contains("last"));
        }
        other => panic!("expected a layout error, got {other:?}"),
    }
}

#[test]
fn s6_cross_file_import_identity() {
    let (loader, root) = load_and_analyze("s6_diamond/c.packet").unwrap();

    let a_via_c = loader.pom(root).import("a").unwrap();
    let b_via_c = loader.pom(root).import("b").unwrap();
    let a_via_b = loader.pom(b_via_c).import("a").unwrap();
    assert_eq!(a_via_c, a_via_b, "the same absolute path must resolve to the same POM instance");

    let x_id = loader.pom(a_via_c).find_packet("X").unwrap();
    let y = &loader.pom(b_via_c).packets[loader.pom(b_via_c).find_packet("Y").unwrap().0];
    let parent = y.parent.expect("Y declares a parent");
    assert_eq!(parent.pom, a_via_c);
    assert_eq!(parent.packet, x_id);
}

/// Property 6 (spec §8): re-running the pipeline on an already-analyzed POM
/// produces identical `size_info`/`offset`/`big_endian`.
#[test]
fn analysis_pipeline_is_idempotent() {
    let (mut loader, root) = load_and_analyze("s3_fixed_count_array.packet").unwrap();
    let before: Vec<_> = loader
        .pom(root)
        .packets
        .iter()
        .map(|p| (p.min_size, p.size_info, p.big_endian))
        .collect();
    let offsets_before: Vec<_> = loader
        .pom(root)
        .packets
        .iter()
        .flat_map(|p| p.fields.iter().map(|f| f.offset.clone()))
        .collect();

    loader.analyze(root).unwrap();

    let after: Vec<_> = loader
        .pom(root)
        .packets
        .iter()
        .map(|p| (p.min_size, p.size_info, p.big_endian))
        .collect();
    let offsets_after: Vec<_> = loader
        .pom(root)
        .packets
        .iter()
        .flat_map(|p| p.fields.iter().map(|f| f.offset.clone()))
        .collect();

    assert_eq!(before, after);
    assert_eq!(offsets_before, offsets_after);
}

#[test]
fn generate_emits_cpp_for_an_imported_packet_set_recursively() {
    let out = tempfile::tempdir().unwrap();
    let root_file = fixtures_dir().join("s6_diamond/c.packet");
    let search_path = fixtures_dir().join("s6_diamond");

    packetc::generate(&root_file, "cpp", Some(search_path.to_str().unwrap()), out.path(), true).unwrap();

    let a_header = std::fs::read_to_string(out.path().join("a.h")).unwrap();
    assert!(a_header.contains("struct X"));
    let b_header = std::fs::read_to_string(out.path().join("b.h")).unwrap();
    assert!(b_header.contains("struct Y : public X"));
    let c_header = std::fs::read_to_string(out.path().join("c.h")).unwrap();
    assert!(c_header.contains("struct Z"));
}

#[test]
fn generate_emits_go_for_the_root_packet_only_when_not_recursive() {
    let out = tempfile::tempdir().unwrap();
    let root_file = fixtures_dir().join("s6_diamond/c.packet");
    let search_path = fixtures_dir().join("s6_diamond");

    packetc::generate(&root_file, "go", Some(search_path.to_str().unwrap()), out.path(), false).unwrap();

    let c_file = std::fs::read_to_string(out.path().join("c.go")).unwrap();
    assert!(c_file.contains("type Z struct"));
    assert!(!out.path().join("a.go").exists());
}

#[test]
fn generate_rejects_an_unknown_emitter() {
    let out = tempfile::tempdir().unwrap();
    let root_file = fixtures_dir().join("s1_inheritance.packet");
    let err = packetc::generate(&root_file, "rust", None, out.path(), false).unwrap_err();
    assert!(matches!(err, PacketError::ReferenceError { .. }));
}
