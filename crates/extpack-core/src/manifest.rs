//! Extension manifest loading and sanitization.
//!
//! The manifest is the `manifest.json` document at the top of the extension
//! source tree. Three fields are interpreted (`name`, `version`, `key`); every
//! other field is carried through unchanged, in source order.

use crate::PackageError;
use crate::Result;
use serde::Deserialize;
use serde::Serialize;
use serde::Serializer;
use serde_json::Map;
use serde_json::Value;
use std::path::Path;
use tracing::info;

/// File name of the manifest, relative to the source root.
pub const MANIFEST_FILE_NAME: &str = "manifest.json";

/// Version used for archive naming when the manifest has none.
pub const DEFAULT_VERSION: &str = "0.0.0";

/// Key removed from the manifest before it is staged.
const KEY_FIELD: &str = "key";

/// A parsed extension manifest.
///
/// The document is held in source order without its `key` field, which is
/// kept aside until stripped. A `Manifest` therefore never serializes a key.
///
/// # Examples
///
/// ```
/// use extpack_core::Manifest;
///
/// let mut manifest = Manifest::parse(r#"{"name": "Demo", "key": "abc", "manifest_version": 3}"#)?;
/// assert!(manifest.has_key());
///
/// manifest.strip_key();
/// let json = manifest.to_pretty_json()?;
/// assert!(!json.contains("\"key\""));
/// assert!(json.contains("manifest_version"));
/// # Ok::<(), serde_json::Error>(())
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Manifest {
    name: String,
    version: Option<String>,
    key: Option<Value>,
    key_stripped: bool,
    document: Map<String, Value>,
}

/// Typed view of the fields that drive archive naming.
#[derive(Deserialize)]
struct Identity {
    name: String,
    #[serde(default)]
    version: Option<String>,
}

impl Manifest {
    /// Parses a manifest from JSON text.
    ///
    /// Fails if the text is not a JSON object, if `name` is missing, or if
    /// `name`/`version` are not strings.
    pub fn parse(text: &str) -> serde_json::Result<Self> {
        let parsed: Map<String, Value> = serde_json::from_str(text)?;
        let identity: Identity = serde_json::from_str(text)?;

        let mut key = None;
        let mut document = Map::with_capacity(parsed.len());
        for (field, value) in parsed {
            if field == KEY_FIELD {
                key = Some(value);
            } else {
                document.insert(field, value);
            }
        }

        Ok(Self {
            name: identity.name,
            version: identity.version,
            key,
            key_stripped: false,
            document,
        })
    }

    /// Display name; drives the archive base name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared version, if any.
    #[must_use]
    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    /// Looks up any field other than `key`.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.document.get(field)
    }

    /// Field names in source order, `key` excluded.
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.document.keys().map(String::as_str)
    }

    /// Returns `true` while the manifest still holds a `key` field.
    #[must_use]
    pub fn has_key(&self) -> bool {
        self.key.is_some()
    }

    /// Removes the `key` field, returning its previous value.
    pub fn strip_key(&mut self) -> Option<Value> {
        let key = self.key.take();
        if key.is_some() {
            self.key_stripped = true;
        }
        key
    }

    /// Returns `true` if `strip_key` removed a key from this manifest.
    #[must_use]
    pub fn key_was_stripped(&self) -> bool {
        self.key_stripped
    }

    /// Version used in the archive name, `"0.0.0"` when absent.
    ///
    /// # Examples
    ///
    /// ```
    /// use extpack_core::Manifest;
    ///
    /// let manifest = Manifest::parse(r#"{"name": "Demo"}"#)?;
    /// assert_eq!(manifest.archive_version(), "0.0.0");
    /// # Ok::<(), serde_json::Error>(())
    /// ```
    #[must_use]
    pub fn archive_version(&self) -> &str {
        self.version.as_deref().unwrap_or(DEFAULT_VERSION)
    }

    /// Renders the manifest as indented JSON.
    ///
    /// Uses two-space indentation and keeps non-ASCII characters unescaped.
    pub fn to_pretty_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

impl Serialize for Manifest {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.document.serialize(serializer)
    }
}

/// Loads `manifest.json` from `source_root` and strips its `key` field.
///
/// The source document is only read, never written.
///
/// # Errors
///
/// - [`PackageError::ManifestNotFound`] if the document does not exist
/// - [`PackageError::ManifestParse`] if it is not a valid manifest object
/// - [`PackageError::Io`] for any other read failure
///
/// # Examples
///
/// ```no_run
/// use extpack_core::load_manifest;
/// use std::path::Path;
///
/// let manifest = load_manifest(Path::new("src/app"))?;
/// println!("{} {}", manifest.name(), manifest.archive_version());
/// # Ok::<(), extpack_core::PackageError>(())
/// ```
pub fn load_manifest(source_root: &Path) -> Result<Manifest> {
    let path = source_root.join(MANIFEST_FILE_NAME);

    let text = std::fs::read_to_string(&path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            PackageError::ManifestNotFound { path: path.clone() }
        } else {
            PackageError::io(&path, e)
        }
    })?;

    let mut manifest = Manifest::parse(&text).map_err(|source| PackageError::ManifestParse {
        path: path.clone(),
        source,
    })?;

    if manifest.strip_key().is_some() {
        info!(manifest = %path.display(), "stripping 'key' from manifest for store build");
    }

    Ok(manifest)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write_manifest(dir: &Path, body: &str) {
        fs::write(dir.join(MANIFEST_FILE_NAME), body).unwrap();
    }

    #[test]
    fn test_load_strips_key() {
        let temp = TempDir::new().unwrap();
        write_manifest(
            temp.path(),
            r#"{"name": "My Ext!", "version": "1.2.0", "key": "abc"}"#,
        );

        let manifest = load_manifest(temp.path()).unwrap();
        assert_eq!(manifest.name(), "My Ext!");
        assert_eq!(manifest.version(), Some("1.2.0"));
        assert!(!manifest.has_key());
        assert!(manifest.key_was_stripped());
    }

    #[test]
    fn test_load_without_key() {
        let temp = TempDir::new().unwrap();
        write_manifest(temp.path(), r#"{"name": "Plain"}"#);

        let manifest = load_manifest(temp.path()).unwrap();
        assert!(!manifest.has_key());
        assert!(!manifest.key_was_stripped());
        assert_eq!(manifest.archive_version(), DEFAULT_VERSION);
    }

    #[test]
    fn test_load_leaves_source_untouched() {
        let temp = TempDir::new().unwrap();
        let body = r#"{"name": "Keep", "key": "secret"}"#;
        write_manifest(temp.path(), body);

        load_manifest(temp.path()).unwrap();
        let on_disk = fs::read_to_string(temp.path().join(MANIFEST_FILE_NAME)).unwrap();
        assert_eq!(on_disk, body);
    }

    #[test]
    fn test_load_missing_manifest() {
        let temp = TempDir::new().unwrap();
        let err = load_manifest(temp.path()).unwrap_err();
        match err {
            PackageError::ManifestNotFound { path } => {
                assert_eq!(path, temp.path().join(MANIFEST_FILE_NAME));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_load_malformed_json() {
        let temp = TempDir::new().unwrap();
        write_manifest(temp.path(), "{ not json");
        let err = load_manifest(temp.path()).unwrap_err();
        assert!(matches!(err, PackageError::ManifestParse { .. }));
    }

    #[test]
    fn test_load_rejects_non_object() {
        let temp = TempDir::new().unwrap();
        write_manifest(temp.path(), r#"["name", "version"]"#);
        let err = load_manifest(temp.path()).unwrap_err();
        assert!(matches!(err, PackageError::ManifestParse { .. }));
    }

    #[test]
    fn test_load_rejects_missing_name() {
        let temp = TempDir::new().unwrap();
        write_manifest(temp.path(), r#"{"version": "1.0"}"#);
        let err = load_manifest(temp.path()).unwrap_err();
        assert!(matches!(err, PackageError::ManifestParse { .. }));
    }

    #[test]
    fn test_fields_preserved_in_source_order() {
        let mut manifest = Manifest::parse(
            r#"{"zeta": 1, "name": "Demo", "key": "k", "alpha": {"nested": [1, 2]}, "version": "2.0"}"#,
        )
        .unwrap();
        manifest.strip_key();

        let fields: Vec<&str> = manifest.fields().collect();
        assert_eq!(fields, ["zeta", "name", "alpha", "version"]);
        assert_eq!(manifest.get("alpha").unwrap()["nested"][1], 2);

        let json = manifest.to_pretty_json().unwrap();
        let zeta = json.find("\"zeta\"").unwrap();
        let name = json.find("\"name\"").unwrap();
        let version = json.find("\"version\"").unwrap();
        assert!(zeta < name && name < version);
    }

    #[test]
    fn test_parse_rejects_non_string_name_or_version() {
        assert!(Manifest::parse(r#"{"name": 7}"#).is_err());
        assert!(Manifest::parse(r#"{"name": "Demo", "version": 2}"#).is_err());
    }

    #[test]
    fn test_pretty_json_never_contains_key() {
        // Not stripped: still must not serialize.
        let manifest = Manifest::parse(r#"{"name": "Demo", "key": {"pem": "..."}}"#).unwrap();
        assert!(manifest.has_key());
        let json = manifest.to_pretty_json().unwrap();
        let value: Value = serde_json::from_str(&json).unwrap();
        assert!(value.get("key").is_none());
    }

    #[test]
    fn test_pretty_json_format() {
        let manifest = Manifest::parse(r#"{"name": "Café", "version": "1.0"}"#).unwrap();
        let json = manifest.to_pretty_json().unwrap();
        assert!(json.contains("Café"));
        assert!(json.contains("\n  \"name\": \"Café\""));
    }

    #[test]
    fn test_absent_version_not_written() {
        let manifest = Manifest::parse(r#"{"name": "Demo"}"#).unwrap();
        let json = manifest.to_pretty_json().unwrap();
        assert!(!json.contains("version"));
    }
}
