use std::collections::HashMap;

use grains_core::{from_json_slice, from_yaml_slice, stable_hash_string, to_canonical_json_bytes};
use grains_core::{Grain, RunProvenance, SchemaVersion};

#[test]
fn canonical_json_sorts_keys() {
    let mut map = HashMap::new();
    map.insert("zeta", 1);
    map.insert("alpha", 2);
    let bytes = to_canonical_json_bytes(&map).unwrap();
    let text = String::from_utf8(bytes).unwrap();
    assert!(text.find("alpha").unwrap() < text.find("zeta").unwrap());
}

#[test]
fn stable_hash_ignores_insertion_order() {
    let mut a = HashMap::new();
    a.insert("x", 1);
    a.insert("y", 2);
    let mut b = HashMap::new();
    b.insert("y", 2);
    b.insert("x", 1);
    assert_eq!(stable_hash_string(&a).unwrap(), stable_hash_string(&b).unwrap());
    assert_eq!(stable_hash_string(&a).unwrap().len(), 64);
}

#[test]
fn yaml_and_json_loaders_report_serde_errors() {
    let grains: Vec<Grain> = from_yaml_slice(b"- 1/2\n- \"3\"\n").unwrap();
    assert_eq!(grains, vec![Grain::new(1, 2).unwrap(), Grain::from(3)]);
    let err = from_json_slice::<Vec<Grain>>(b"[1").unwrap_err();
    assert_eq!(err.info().code, "json_deserialize");
}

#[test]
fn provenance_records_core_version() {
    let prov = RunProvenance::new("abc", 9).with_tool("grains-sim", "0.1.0");
    assert_eq!(prov.seed, 9);
    assert!(prov.tool_versions.contains_key("grains-core"));
    assert!(prov.tool_versions.contains_key("grains-sim"));
    assert_eq!(SchemaVersion::default(), SchemaVersion::new(1, 0, 0));
}
