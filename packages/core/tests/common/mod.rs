//! Filesystem conformance checks shared by the integration tests.

#![allow(dead_code)]

use std::collections::BTreeSet;

use mackerelfs_core::{read_dir, DirEntry, Filesystem, OpenFlags, Path};

/// Walk `fs` from the root and check every directory it can reach.
///
/// For each entry: the listed name is unique, the lazily computed status
/// agrees with the entry's name and type, and opening the child reports
/// the same name and type. For each directory: paging with every `max`
/// visits each entry exactly once and ends with the end-of-sequence signal.
pub fn check_fs(fs: &dyn Filesystem) {
    check_dir(fs, &Path::root());
}

fn check_dir(fs: &dyn Filesystem, dir: &Path) {
    let status = fs
        .stat(dir)
        .unwrap_or_else(|e| panic!("stat {dir}: {e}"));
    assert!(status.is_dir(), "{dir} should be a directory");
    assert_eq!(status.name, dir.base(), "name of {dir}");

    let entries = read_dir(fs, dir).unwrap_or_else(|e| panic!("readdir {dir}: {e}"));
    let names: Vec<&str> = entries.iter().map(DirEntry::name).collect();
    let unique: BTreeSet<&str> = names.iter().copied().collect();
    assert_eq!(unique.len(), names.len(), "duplicate entries in {dir}: {names:?}");

    check_paging(fs, dir, &unique);

    for entry in &entries {
        let child = dir.child(entry.name());
        let info = entry
            .info()
            .unwrap_or_else(|e| panic!("info {child}: {e}"));
        assert_eq!(info.name, entry.name(), "info name of {child}");
        assert_eq!(info.is_dir(), entry.is_dir(), "info type of {child}");

        let opened = fs
            .stat(&child)
            .unwrap_or_else(|e| panic!("stat {child}: {e}"));
        assert_eq!(opened.name, entry.name(), "stat name of {child}");
        assert_eq!(opened.is_dir(), entry.is_dir(), "stat type of {child}");

        if entry.is_dir() {
            check_dir(fs, &child);
        }
    }
}

fn check_paging(fs: &dyn Filesystem, dir: &Path, expected: &BTreeSet<&str>) {
    for max in 1..=expected.len() + 1 {
        let mut handle = fs.open(dir, OpenFlags::READ).unwrap();
        let mut seen = Vec::new();
        while let Some(page) = handle.read_dir(max).unwrap() {
            assert!(!page.is_empty(), "empty page from {dir} with max {max}");
            assert!(page.len() <= max, "oversized page from {dir} with max {max}");
            seen.extend(page.iter().map(|e| e.name().to_string()));
        }
        handle.close().unwrap();
        seen.sort();
        let expected: Vec<String> = expected.iter().map(|s| s.to_string()).collect();
        assert_eq!(seen, expected, "paging {dir} with max {max}");
    }
}

/// Names in the directory at `path`, sorted.
pub fn names(fs: &dyn Filesystem, path: &str) -> Vec<String> {
    let path = Path::parse(path).unwrap();
    read_dir(fs, &path)
        .unwrap()
        .iter()
        .map(|e| e.name().to_string())
        .collect()
}
