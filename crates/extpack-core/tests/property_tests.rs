//! Property-based tests for ignore matching, name sanitizing, and manifest
//! handling.
//!
//! These tests use proptest to generate arbitrary inputs and verify the
//! packaging invariants hold across a wide range of cases.

#![allow(clippy::expect_used)]

use extpack_core::IgnoreRules;
use extpack_core::Manifest;
use extpack_core::NoopProgress;
use extpack_core::copy::CopyBuffer;
use extpack_core::copy::copy_with_buffer;
use extpack_core::sanitize_name;
use extpack_core::should_ignore;
use proptest::prelude::*;
use std::io::Cursor;
use std::path::PathBuf;

fn rules() -> IgnoreRules {
    IgnoreRules::from_patterns(["*.log", "tmp/*", "*.map", "node_modules/*"])
        .expect("valid patterns")
}

proptest! {
    /// The decision depends only on the path relative to the root.
    #[test]
    fn prop_should_ignore_is_root_independent(
        root_a in prop::collection::vec("[a-z]{1,8}", 1..4),
        root_b in prop::collection::vec("[a-z]{1,8}", 1..4),
        relative in prop::collection::vec("[a-z_]{1,8}(\\.(log|js|map|txt))?", 1..4),
    ) {
        let rules = rules();
        let relative: PathBuf = relative.iter().collect();
        let root_a = PathBuf::from("/").join(root_a.iter().collect::<PathBuf>());
        let root_b = PathBuf::from("/").join(root_b.iter().collect::<PathBuf>());

        let a = should_ignore(&root_a.join(&relative), &root_a, &rules).expect("under root");
        let b = should_ignore(&root_b.join(&relative), &root_b, &rules).expect("under root");

        prop_assert_eq!(a, b);
        prop_assert_eq!(a, rules.is_ignored(&relative));
    }

    /// Repeated calls with the same inputs agree.
    #[test]
    fn prop_should_ignore_is_deterministic(
        relative in prop::collection::vec("[a-z.]{1,10}", 1..5),
    ) {
        let rules = rules();
        let root = PathBuf::from("/project/src/app");
        let path = root.join(relative.iter().collect::<PathBuf>());
        let first = should_ignore(&path, &root, &rules).expect("under root");
        let second = should_ignore(&path, &root, &rules).expect("under root");
        prop_assert_eq!(first, second);
    }

    /// Any file with a `.log` extension is ignored at any depth.
    #[test]
    fn prop_log_files_ignored_at_any_depth(
        dirs in prop::collection::vec("[a-z]{1,8}", 0..4),
        stem in "[a-z]{1,8}",
    ) {
        let mut relative: PathBuf = dirs.iter().collect();
        relative.push(format!("{stem}.log"));
        prop_assert!(rules().is_ignored(&relative));
    }

    /// An empty rule set never ignores anything.
    #[test]
    fn prop_empty_rules_ignore_nothing(
        relative in prop::collection::vec("[a-zA-Z0-9._-]{1,10}", 1..5),
    ) {
        let relative: PathBuf = relative.iter().collect();
        prop_assert!(!IgnoreRules::new().is_ignored(&relative));
    }

    /// Sanitized names only keep alphanumerics, `-`, `_`, and `.`.
    #[test]
    fn prop_sanitized_name_charset(name in "\\PC{0,40}") {
        let sanitized = sanitize_name(&name);
        prop_assert!(sanitized
            .chars()
            .all(|c| c.is_alphanumeric() || matches!(c, '-' | '_' | '.')));
        prop_assert!(sanitized.chars().count() <= name.chars().count());
    }

    /// Sanitizing twice is the same as sanitizing once.
    #[test]
    fn prop_sanitize_is_idempotent(name in "\\PC{0,40}") {
        let once = sanitize_name(&name);
        prop_assert_eq!(sanitize_name(&once), once);
    }

    /// A stripped manifest never serializes a `key`, and keeps other fields.
    #[test]
    fn prop_stripped_manifest_has_no_key(
        name in "[^\"\\\\]{0,20}",
        version in proptest::option::of("[0-9]{1,3}(\\.[0-9]{1,3}){0,3}"),
        key in "[A-Za-z0-9+/=]{0,64}",
        extra in prop::collection::btree_map("[a-z_]{1,12}", any::<i32>(), 0..5),
    ) {
        let mut doc = serde_json::Map::new();
        for (field, value) in &extra {
            if !matches!(field.as_str(), "name" | "version" | "key") {
                doc.insert(field.clone(), serde_json::json!(value));
            }
        }
        doc.insert("name".to_string(), serde_json::json!(name));
        if let Some(version) = &version {
            doc.insert("version".to_string(), serde_json::json!(version));
        }
        doc.insert("key".to_string(), serde_json::json!(key));
        let text = serde_json::Value::Object(doc).to_string();

        let mut manifest = Manifest::parse(&text).expect("valid manifest");
        manifest.strip_key();
        let rendered: serde_json::Value =
            serde_json::from_str(&manifest.to_pretty_json().expect("serializable"))
                .expect("round-trips");

        prop_assert!(rendered.get("key").is_none());
        prop_assert_eq!(&rendered["name"], &serde_json::json!(name));
        for field in extra.keys().filter(|f| !matches!(f.as_str(), "name" | "version" | "key")) {
            prop_assert_eq!(&rendered[field.as_str()], &serde_json::json!(extra[field]));
        }
        prop_assert_eq!(
            manifest.archive_version(),
            version.as_deref().unwrap_or("0.0.0")
        );
    }

    /// Copying preserves data and reports the exact byte count.
    #[test]
    fn prop_copy_preserves_data(data in prop::collection::vec(any::<u8>(), 0..200_000)) {
        let mut buffer = CopyBuffer::new();
        let mut output = Vec::new();
        let copied = copy_with_buffer(
            &mut Cursor::new(&data),
            &mut output,
            &mut buffer,
            &mut NoopProgress,
        )
        .expect("in-memory copy");

        prop_assert_eq!(copied, data.len() as u64);
        prop_assert_eq!(output, data);
    }
}
