use std::fs;
use std::path::Path;

use grains_core::errors::GrainsError;
use grains_docs::{check_bundle, BundleStatus, Conflict, DocsLayout};
use tempfile::tempdir;

const SCRIPTS: [&str; 5] = [
    "finite_newton.py",
    "gauss_jordan.py",
    "grain_agg.py",
    "grain_probability.py",
    "grains_arithmetic.py",
];

fn touch(root: &Path, rel: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, b"%PDF").unwrap();
}

fn clean_bundle(root: &Path) {
    let mut readme = String::from("# Finite Capacity-Based System\n\n## Manuals\n");
    for i in 0..3 {
        touch(root, &format!("manual/finite_manual_{i}.pdf"));
        readme.push_str(&format!("- [Finite Manual {i}](manual/finite_manual_{i}.pdf)\n"));
    }
    touch(root, "manual_math/intro_finite_math_1.pdf");
    readme.push_str("- [Intro](manual_math/intro_finite_math_1.pdf#page=2)\n");
    readme.push_str("- [Home](https://example.org) [top](#manuals)\n\n## Scripts\n");
    for script in SCRIPTS {
        touch(root, &format!("scripts/{script}"));
        readme.push_str(&format!("- `{script}`\n"));
    }
    fs::write(root.join("README.md"), readme).unwrap();
}

#[test]
fn consistent_bundle_passes() {
    let dir = tempdir().unwrap();
    clean_bundle(dir.path());
    let report = check_bundle(dir.path(), &DocsLayout::default()).unwrap();
    assert_eq!(report.status, BundleStatus::Ok, "{report:#?}");
    assert_eq!(report.links.len(), 4);
    assert!(report.links.iter().all(|link| link.exists));
    assert_eq!(report.manual_series.len(), 1);
    assert_eq!(report.manual_series[0].on_disk, vec![0, 1, 2]);
    assert_eq!(report.math_intros, vec!["manual_math/intro_finite_math_1.pdf"]);
    assert!(report.conflicts.is_empty());
}

#[test]
fn merged_readme_revisions_are_flagged_not_resolved() {
    let dir = tempdir().unwrap();
    let root = dir.path();
    clean_bundle(root);
    let mut readme = fs::read_to_string(root.join("README.md")).unwrap();
    readme.push_str("\n## Older list\n");
    readme.push_str("- [Finite Manual 0](manuals/finite_manual_0.pdf)\n");
    readme.push_str("- [Finite Manual 1](manuals/finite_manual_1.pdf)\n");
    readme.push_str("- [Finite Mabual_2](manuals/finite_manual_2.pdf)\n");
    readme.push_str("- [Intro](math-intro/intro_finite_math_1.pdf)\n");
    fs::write(root.join("README.md"), readme).unwrap();

    let report = check_bundle(root, &DocsLayout::default()).unwrap();
    assert_eq!(report.status, BundleStatus::NeedsAttention);
    let missing: Vec<&str> = report
        .links
        .iter()
        .filter(|l| !l.exists)
        .map(|l| l.target.as_str())
        .collect();
    assert_eq!(missing.len(), 4);
    assert!(missing.contains(&"math-intro/intro_finite_math_1.pdf"));

    let schemes: Vec<&Conflict> = report
        .conflicts
        .iter()
        .filter(|c| matches!(c, Conflict::PathScheme { .. }))
        .collect();
    assert_eq!(schemes.len(), 2);
    assert!(report.conflicts.iter().any(|c| matches!(
        c,
        Conflict::Label { label, .. } if label == "Finite Mabual_2"
    )));
    // both directory series are reported side by side
    let dirs: Vec<&str> = report.manual_series.iter().map(|s| s.directory.as_str()).collect();
    assert_eq!(dirs, vec!["manual", "manuals"]);
    assert!(!root.join("manuals").exists());
}

#[test]
fn numbering_gaps_and_duplicate_links_fail() {
    let dir = tempdir().unwrap();
    let root = dir.path();
    clean_bundle(root);
    touch(root, "manual/finite_manual_4.pdf");
    let mut readme = fs::read_to_string(root.join("README.md")).unwrap();
    readme.push_str("- [Finite Manual 1 again](manual/finite_manual_1.pdf)\n");
    fs::write(root.join("README.md"), readme).unwrap();

    let report = check_bundle(root, &DocsLayout::default()).unwrap();
    let series = &report.manual_series[0];
    assert_eq!(series.gaps, vec![3]);
    assert_eq!(series.duplicates, vec![1]);
    let numbering = report.checks.iter().find(|c| c.name == "manual-numbering").unwrap();
    assert!(!numbering.pass);
}

#[test]
fn scripts_are_compared_both_ways() {
    let dir = tempdir().unwrap();
    let root = dir.path();
    clean_bundle(root);
    fs::remove_file(root.join("scripts/grain_agg.py")).unwrap();
    touch(root, "scripts/page_rank_fin.py");

    let report = check_bundle(root, &DocsLayout::default()).unwrap();
    assert_eq!(report.scripts.missing, vec!["grain_agg.py"]);
    assert_eq!(report.scripts.unlisted, vec!["page_rank_fin.py"]);
    assert_eq!(report.status, BundleStatus::NeedsAttention);
}

#[test]
fn missing_readme_is_a_docs_error() {
    let dir = tempdir().unwrap();
    let err = check_bundle(dir.path(), &DocsLayout::default()).unwrap_err();
    assert!(matches!(err, GrainsError::Docs(_)));
    assert_eq!(err.info().code, "readme-read");

    let err = check_bundle(&dir.path().join("absent"), &DocsLayout::default()).unwrap_err();
    assert_eq!(err.info().code, "missing-root");
}

#[test]
fn layout_loads_from_yaml_with_defaults() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("layout.yaml");
    fs::write(&path, "readme: docs/README.md\nexpected_scripts: []\n").unwrap();
    let layout = DocsLayout::from_yaml_path(&path).unwrap();
    assert_eq!(layout.readme, "docs/README.md");
    assert!(layout.expected_scripts.is_empty());
    assert_eq!(layout.scheme_pairs.len(), 2);
}

#[test]
fn report_json_uses_kebab_case_tags() {
    let dir = tempdir().unwrap();
    let root = dir.path();
    clean_bundle(root);
    touch(root, "manuals/finite_manual_0.pdf");
    let report = check_bundle(root, &DocsLayout::default()).unwrap();
    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["status"], "needs-attention");
    assert_eq!(json["conflicts"][0]["kind"], "path-scheme");
    assert_eq!(json["conflicts"][0]["second_present"], true);
}
