use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;

use globset::{Glob, GlobSet, GlobSetBuilder};
use grains_core::errors::{ErrorInfo, GrainsError};
use log::{debug, info, warn};
use walkdir::WalkDir;

use crate::layout::DocsLayout;
use crate::links::{parse_links, script_mentions, MarkdownLink};
use crate::report::{
    BundleCheck, BundleReport, BundleStatus, Conflict, LinkStatus, ManualSeries, ScriptReport,
};

fn docs_error(code: &str, message: impl std::fmt::Display) -> GrainsError {
    GrainsError::Docs(ErrorInfo::new(code, message.to_string()))
}

fn build_globset(patterns: &[String]) -> Result<GlobSet, GrainsError> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        builder.add(Glob::new(pattern).map_err(|err| {
            GrainsError::Docs(ErrorInfo::new("glob", err.to_string()).with_context("pattern", pattern))
        })?);
    }
    builder.build().map_err(|err| docs_error("glob-build", err))
}

fn normalise(path: &Path) -> String {
    path.components()
        .map(|component| component.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

fn clean_target(target: &str) -> &str {
    target.trim_start_matches("./")
}

fn parent_dir(rel: &str) -> String {
    match rel.rsplit_once('/') {
        Some((dir, _)) => dir.to_string(),
        None => String::new(),
    }
}

fn first_component(rel: &str) -> &str {
    rel.split('/').next().unwrap_or("")
}

/// Trailing number of a file stem such as `finite_manual_7`.
fn manual_index(rel: &str) -> Option<u32> {
    let name = rel.rsplit('/').next()?;
    let stem = name.rsplit_once('.').map_or(name, |(stem, _)| stem);
    stem.rsplit('_').next()?.parse().ok()
}

fn bundle_files(root: &Path) -> Vec<String> {
    let mut files: Vec<String> = WalkDir::new(root)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .filter_map(|entry| {
            entry
                .path()
                .strip_prefix(root)
                .ok()
                .map(normalise)
        })
        .collect();
    files.sort();
    files
}

fn manual_series(
    files: &[String],
    manual_links: &[(&MarkdownLink, String)],
) -> Vec<ManualSeries> {
    let mut by_dir: BTreeMap<String, (Vec<u32>, Vec<u32>)> = BTreeMap::new();
    for rel in files {
        match manual_index(rel) {
            Some(index) => by_dir.entry(parent_dir(rel)).or_default().0.push(index),
            None => warn!("manual {rel} has no trailing index"),
        }
    }
    for (_, rel) in manual_links {
        if let Some(index) = manual_index(rel) {
            by_dir.entry(parent_dir(rel)).or_default().1.push(index);
        }
    }
    by_dir
        .into_iter()
        .map(|(directory, (mut on_disk, linked))| {
            on_disk.sort_unstable();
            let seen: BTreeSet<u32> = on_disk.iter().chain(&linked).copied().collect();
            let max = seen.iter().next_back().copied().unwrap_or(0);
            let gaps = (0..=max).filter(|index| !seen.contains(index)).collect();
            let mut counts: BTreeMap<u32, usize> = BTreeMap::new();
            for index in &linked {
                *counts.entry(*index).or_default() += 1;
            }
            let duplicates = counts
                .into_iter()
                .filter(|(_, count)| *count > 1)
                .map(|(index, _)| index)
                .collect();
            ManualSeries {
                directory,
                on_disk,
                linked,
                gaps,
                duplicates,
            }
        })
        .collect()
}

fn script_report(root: &Path, readme: &str, layout: &DocsLayout) -> ScriptReport {
    let mentioned = script_mentions(readme);
    let dir = root.join(&layout.scripts_dir);
    let mut present: Vec<String> = WalkDir::new(&dir)
        .min_depth(1)
        .max_depth(1)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .filter_map(|entry| entry.file_name().to_str().map(str::to_string))
        .filter(|name| name.ends_with(".py"))
        .collect();
    present.sort();

    let mut wanted: Vec<&String> = mentioned.iter().collect();
    for name in &layout.expected_scripts {
        if !wanted.contains(&name) {
            wanted.push(name);
        }
    }
    let missing = wanted
        .into_iter()
        .filter(|name| !present.contains(name))
        .cloned()
        .collect();
    let unlisted = present
        .iter()
        .filter(|name| !mentioned.contains(name))
        .cloned()
        .collect();
    ScriptReport {
        mentioned,
        present,
        missing,
        unlisted,
    }
}

/// Inspects a documentation bundle rooted at `root`.
///
/// Broken README links, gaps or duplicates in manual numbering, scripts
/// that are missing or unlisted, competing directory schemes and odd
/// manual labels are all reported. Conflicts are flagged and left as they
/// are.
pub fn check_bundle(root: &Path, layout: &DocsLayout) -> Result<BundleReport, GrainsError> {
    layout.validate()?;
    if !root.is_dir() {
        return Err(GrainsError::Docs(
            ErrorInfo::new("missing-root", "bundle root is not a directory")
                .with_context("root", root.display().to_string()),
        ));
    }
    let readme_path = root.join(&layout.readme);
    let readme = fs::read_to_string(&readme_path).map_err(|err| {
        GrainsError::Docs(
            ErrorInfo::new("readme-read", err.to_string())
                .with_context("path", readme_path.display().to_string()),
        )
    })?;

    let manuals = build_globset(&layout.manual_globs)?;
    let intros = build_globset(&layout.math_intro_globs)?;
    let files = bundle_files(root);

    let parsed = parse_links(&readme);
    let local: Vec<(&MarkdownLink, String)> = parsed
        .iter()
        .filter(|link| !link.is_external())
        .map(|link| (link, clean_target(link.path()).to_string()))
        .filter(|(_, rel)| !rel.is_empty())
        .collect();
    let links: Vec<LinkStatus> = local
        .iter()
        .map(|(link, rel)| LinkStatus {
            label: link.label.clone(),
            target: rel.clone(),
            line: link.line,
            exists: root.join(rel).exists(),
        })
        .collect();
    debug!("{} local links in {}", links.len(), layout.readme);

    let manual_files: Vec<String> = files
        .iter()
        .filter(|rel| manuals.is_match(rel.as_str()))
        .cloned()
        .collect();
    let manual_links: Vec<(&MarkdownLink, String)> = local
        .iter()
        .filter(|(_, rel)| manuals.is_match(rel.as_str()))
        .map(|(link, rel)| (*link, rel.clone()))
        .collect();
    let manual_series = manual_series(&manual_files, &manual_links);
    let math_intros: Vec<String> = files
        .iter()
        .filter(|rel| intros.is_match(rel.as_str()))
        .cloned()
        .collect();
    let scripts = script_report(root, &readme, layout);

    let mut conflicts = Vec::new();
    for pair in &layout.scheme_pairs {
        let count = |dir: &str| local.iter().filter(|(_, rel)| first_component(rel) == dir).count();
        let first_links = count(&pair.first);
        let second_links = count(&pair.second);
        let first_present = root.join(&pair.first).is_dir();
        let second_present = root.join(&pair.second).is_dir();
        if (first_links > 0 || first_present) && (second_links > 0 || second_present) {
            warn!("both {} and {} are in use", pair.first, pair.second);
            conflicts.push(Conflict::PathScheme {
                first: pair.first.clone(),
                second: pair.second.clone(),
                first_links,
                second_links,
                first_present,
                second_present,
            });
        }
    }
    let expected = layout.manual_label.to_lowercase();
    for (link, rel) in &manual_links {
        if !link.label.to_lowercase().contains(&expected) {
            conflicts.push(Conflict::Label {
                label: link.label.clone(),
                target: rel.clone(),
                line: link.line,
                expected: layout.manual_label.clone(),
            });
        }
    }

    let broken = links.iter().filter(|link| !link.exists).count();
    let broken_series = manual_series.iter().filter(|s| !s.is_contiguous()).count();
    let scheme_conflicts = conflicts
        .iter()
        .filter(|c| matches!(c, Conflict::PathScheme { .. }))
        .count();
    let label_conflicts = conflicts.len() - scheme_conflicts;
    let checks = vec![
        BundleCheck::new("readme-links", broken, "link targets missing"),
        BundleCheck::new("manual-numbering", broken_series, "manual series with gaps or duplicates"),
        BundleCheck::new(
            "scripts",
            scripts.missing.len() + scripts.unlisted.len(),
            "scripts missing or unlisted",
        ),
        BundleCheck::new("path-schemes", scheme_conflicts, "competing directory schemes"),
        BundleCheck::new("manual-labels", label_conflicts, "manual labels without the expected word"),
    ];
    let status = if checks.iter().all(|check| check.pass) {
        BundleStatus::Ok
    } else {
        BundleStatus::NeedsAttention
    };
    info!(
        "bundle {}: {status:?}, {} links, {} manual series, {} conflicts",
        root.display(),
        links.len(),
        manual_series.len(),
        conflicts.len()
    );
    Ok(BundleReport {
        status,
        checks,
        links,
        manual_series,
        math_intros,
        scripts,
        conflicts,
    })
}
