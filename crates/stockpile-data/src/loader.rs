//! Document loading primitive: errors, format detection, typed conversion and
//! per-resource load policies.
//!
//! Every aggregator goes through [`load_document`] / [`load_with_policy`] so the
//! read → parse → shape-check sequence lives in exactly one place.

use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::schema::Document;
use crate::source::AssetSource;

// ===========================================================================
// Errors
// ===========================================================================

/// Errors that can occur while building the store.
#[derive(Debug, thiserror::Error)]
pub enum DataLoadError {
    /// The file or directory does not exist.
    #[error("not found: {path}")]
    NotFound { path: PathBuf },

    /// The file has an extension we don't support.
    #[error("unsupported format for file: {file}")]
    UnsupportedFormat { file: PathBuf },

    /// Two files with the same stem but different formats exist in one directory.
    #[error("conflicting formats: {a} and {b}")]
    ConflictingFormats { a: PathBuf, b: PathBuf },

    /// The file exists but could not be decoded.
    #[error("parse error in {file}: {detail}")]
    Parse { file: PathBuf, detail: String },

    /// The file decoded but does not have the expected shape.
    #[error("invalid data structure in {file}: {detail}")]
    Schema { file: PathBuf, detail: String },

    /// An I/O error occurred.
    #[error("i/o error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// An error wrapped with the resource or build step that raised it.
    #[error("error loading {context}: {source}")]
    Context {
        context: String,
        #[source]
        source: Box<DataLoadError>,
    },
}

impl DataLoadError {
    /// Wrap this error with the name of the resource being loaded.
    pub fn context(self, context: impl Into<String>) -> Self {
        DataLoadError::Context {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// The innermost error, looking through any `Context` layers.
    pub fn root_cause(&self) -> &DataLoadError {
        let mut current = self;
        while let DataLoadError::Context { source, .. } = current {
            current = source;
        }
        current
    }

    /// True if the underlying failure is a missing file or directory.
    pub fn is_not_found(&self) -> bool {
        matches!(self.root_cause(), DataLoadError::NotFound { .. })
    }

    /// True if the underlying failure is a shape mismatch in a decoded document.
    pub fn is_schema(&self) -> bool {
        matches!(self.root_cause(), DataLoadError::Schema { .. })
    }
}

/// Attach resource context to a `Result`.
pub trait LoadContext<T> {
    fn context(self, context: impl Into<String>) -> Result<T, DataLoadError>;

    fn with_context<C, F>(self, f: F) -> Result<T, DataLoadError>
    where
        C: Into<String>,
        F: FnOnce() -> C;
}

impl<T> LoadContext<T> for Result<T, DataLoadError> {
    fn context(self, context: impl Into<String>) -> Result<T, DataLoadError> {
        self.map_err(|e| e.context(context))
    }

    fn with_context<C, F>(self, f: F) -> Result<T, DataLoadError>
    where
        C: Into<String>,
        F: FnOnce() -> C,
    {
        self.map_err(|e| e.context(f()))
    }
}

// ===========================================================================
// Format detection
// ===========================================================================

/// Supported document formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Json,
    Ron,
    Toml,
}

/// Detect the format of a file based on its extension.
pub fn detect_format(path: &Path) -> Result<Format, DataLoadError> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("json") => Ok(Format::Json),
        Some("ron") => Ok(Format::Ron),
        Some("toml") => Ok(Format::Toml),
        _ => Err(DataLoadError::UnsupportedFormat {
            file: path.to_path_buf(),
        }),
    }
}

/// Decode document text into a generic value according to the file's format.
pub fn parse_document(path: &Path, content: &str) -> Result<Value, DataLoadError> {
    let parse_err = |detail: String| DataLoadError::Parse {
        file: path.to_path_buf(),
        detail,
    };

    match detect_format(path)? {
        Format::Json => serde_json::from_str(content).map_err(|e| parse_err(e.to_string())),
        Format::Ron => ron::from_str(content).map_err(|e| parse_err(e.to_string())),
        Format::Toml => toml::from_str(content).map_err(|e| parse_err(e.to_string())),
    }
}

/// The key an enumerated document is stored under: its file name minus the extension.
pub fn document_key(file_name: &str) -> &str {
    Path::new(file_name)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(file_name)
}

// ===========================================================================
// Shape checks
// ===========================================================================

/// Human-readable name of a value's JSON type, for schema errors.
pub fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Convert a decoded value into the requested record type.
pub fn from_value<T: DeserializeOwned>(file: &Path, value: Value) -> Result<T, DataLoadError> {
    serde_json::from_value(value).map_err(|e| DataLoadError::Schema {
        file: file.to_path_buf(),
        detail: e.to_string(),
    })
}

/// Require that a value is an object.
pub fn into_object(file: &Path, value: Value) -> Result<Document, DataLoadError> {
    match value {
        Value::Object(map) => Ok(map),
        other => Err(DataLoadError::Schema {
            file: file.to_path_buf(),
            detail: format!("expected an object, found {}", value_kind(&other)),
        }),
    }
}

/// Normalize a top-level array of composite records into a `Vec<Document>`.
///
/// The result is allocated once with the input's length, so an empty array
/// yields an empty (never absent) list.
pub fn normalize_records(file: &Path, value: Value) -> Result<Vec<Document>, DataLoadError> {
    let items = match value {
        Value::Array(items) => items,
        other => {
            return Err(DataLoadError::Schema {
                file: file.to_path_buf(),
                detail: format!("expected an array, found {}", value_kind(&other)),
            });
        }
    };

    let mut records = Vec::with_capacity(items.len());
    for (index, item) in items.into_iter().enumerate() {
        match item {
            Value::Object(map) => records.push(map),
            other => {
                return Err(DataLoadError::Schema {
                    file: file.to_path_buf(),
                    detail: format!("element {index} is {}, expected an object", value_kind(&other)),
                });
            }
        }
    }
    Ok(records)
}

/// Apply the nested-`data` convention: if the object carries an object under
/// `data`, keep that; otherwise keep the whole object.
pub fn unwrap_data(mut document: Document) -> Document {
    if !matches!(document.get("data"), Some(Value::Object(_))) {
        return document;
    }
    match document.remove("data") {
        Some(Value::Object(inner)) => inner,
        _ => document,
    }
}

// ===========================================================================
// Load primitive
// ===========================================================================

/// How a resource failure affects the build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadPolicy {
    /// Any failure aborts the build.
    Required,
    /// Failure leaves the slot at its default; the miss is only visible at debug level.
    Tolerant,
    /// Failure leaves the slot empty and logs a warning.
    Logged,
}

/// Read a document and convert it with `convert`.
pub fn load_document_with<T, F>(
    source: &dyn AssetSource,
    path: &Path,
    convert: F,
) -> Result<T, DataLoadError>
where
    F: FnOnce(&Path, Value) -> Result<T, DataLoadError>,
{
    let value = source.read_document(path)?;
    convert(path, value)
}

/// Read a document and deserialize it as `T`.
pub fn load_document<T: DeserializeOwned>(
    source: &dyn AssetSource,
    path: &Path,
) -> Result<T, DataLoadError> {
    load_document_with(source, path, from_value)
}

/// Read an object document and apply the nested-`data` convention.
pub fn load_unwrapped(source: &dyn AssetSource, path: &Path) -> Result<Document, DataLoadError> {
    load_document_with(source, path, |file, value| {
        into_object(file, value).map(unwrap_data)
    })
}

/// Turn a load result into an optional slot according to `policy`.
pub fn apply_policy<T>(
    path: &Path,
    policy: LoadPolicy,
    result: Result<T, DataLoadError>,
) -> Result<Option<T>, DataLoadError> {
    match (result, policy) {
        (Ok(value), _) => Ok(Some(value)),
        (Err(e), LoadPolicy::Required) => Err(e),
        (Err(e), LoadPolicy::Tolerant) => {
            log_skipped(path, &e);
            Ok(None)
        }
        (Err(e), LoadPolicy::Logged) => {
            tracing::warn!(path = %path.display(), error = %e, "document could not be loaded");
            Ok(None)
        }
    }
}

fn log_skipped(path: &Path, error: &DataLoadError) {
    tracing::debug!(path = %path.display(), error = %error, "optional document skipped");
}

/// Tolerant read that cannot fail: any miss is logged at debug level and
/// yields `None`.
pub fn load_optional_with<T, F>(source: &dyn AssetSource, path: &Path, convert: F) -> Option<T>
where
    F: FnOnce(&Path, Value) -> Result<T, DataLoadError>,
{
    match load_document_with(source, path, convert) {
        Ok(value) => Some(value),
        Err(e) => {
            log_skipped(path, &e);
            None
        }
    }
}

/// [`load_optional_with`] deserializing the document as `T`.
pub fn load_optional<T: DeserializeOwned>(source: &dyn AssetSource, path: &Path) -> Option<T> {
    load_optional_with(source, path, from_value)
}

/// Read a document as `T` under the given policy.
pub fn load_with_policy<T: DeserializeOwned>(
    source: &dyn AssetSource,
    path: &Path,
    policy: LoadPolicy,
) -> Result<Option<T>, DataLoadError> {
    apply_policy(path, policy, load_document(source, path))
}

/// Enumerate every document in `dir` and key each one by its file stem.
///
/// Strict: a listing failure, an unreadable document, a failed conversion or
/// two files sharing a stem all fail the whole enumeration.
pub fn load_keyed_dir_with<T, F>(
    source: &dyn AssetSource,
    dir: &Path,
    mut convert: F,
) -> Result<BTreeMap<String, T>, DataLoadError>
where
    F: FnMut(&Path, Value) -> Result<T, DataLoadError>,
{
    let files = source.list_files(dir)?;
    let mut seen: BTreeMap<String, PathBuf> = BTreeMap::new();
    let mut documents = BTreeMap::new();

    for file_name in &files {
        let path = dir.join(file_name);
        let key = document_key(file_name).to_string();
        if let Some(existing) = seen.get(&key) {
            return Err(DataLoadError::ConflictingFormats {
                a: existing.clone(),
                b: path,
            });
        }
        let document = load_document_with(source, &path, &mut convert)?;
        seen.insert(key.clone(), path);
        documents.insert(key, document);
    }

    Ok(documents)
}

/// [`load_keyed_dir_with`] deserializing each document as `T`.
pub fn load_keyed_dir<T: DeserializeOwned>(
    source: &dyn AssetSource,
    dir: &Path,
) -> Result<BTreeMap<String, T>, DataLoadError> {
    load_keyed_dir_with(source, dir, from_value)
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::MemorySource;
    use serde_json::json;

    // -----------------------------------------------------------------------
    // detect_format / parse_document
    // -----------------------------------------------------------------------

    #[test]
    fn detect_format_known_extensions() {
        assert_eq!(detect_format(Path::new("a.json")).unwrap(), Format::Json);
        assert_eq!(detect_format(Path::new("a.ron")).unwrap(), Format::Ron);
        assert_eq!(detect_format(Path::new("a.toml")).unwrap(), Format::Toml);
    }

    #[test]
    fn detect_format_unsupported() {
        let result = detect_format(Path::new("notes.txt"));
        assert!(matches!(
            result,
            Err(DataLoadError::UnsupportedFormat { .. })
        ));
        assert!(detect_format(Path::new("README")).is_err());
    }

    #[test]
    fn parse_document_all_formats_agree() {
        let from_json = parse_document(Path::new("a.json"), r#"{"name": "easy", "level": 1}"#).unwrap();
        let from_ron = parse_document(Path::new("a.ron"), r#"{"name": "easy", "level": 1}"#).unwrap();
        let from_toml = parse_document(Path::new("a.toml"), "name = \"easy\"\nlevel = 1\n").unwrap();

        assert_eq!(from_json["name"], "easy");
        assert_eq!(from_ron["name"], "easy");
        assert_eq!(from_toml["name"], "easy");
        assert_eq!(from_toml["level"], 1);
    }

    #[test]
    fn parse_document_bad_json() {
        let result = parse_document(Path::new("bad.json"), "{ not json");
        assert!(matches!(result, Err(DataLoadError::Parse { .. })));
    }

    #[test]
    fn document_key_strips_extension() {
        assert_eq!(document_key("hard.json"), "hard");
        assert_eq!(document_key("client.settings.json"), "client.settings");
        assert_eq!(document_key("noext"), "noext");
    }

    // -----------------------------------------------------------------------
    // Shape checks
    // -----------------------------------------------------------------------

    #[test]
    fn normalize_records_keeps_order_and_length() {
        let records = normalize_records(
            Path::new("x.json"),
            json!([{"id": "a"}, {"id": "b"}, {"id": "c"}]),
        )
        .unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[1]["id"], "b");
    }

    #[test]
    fn normalize_records_empty_input() {
        let records = normalize_records(Path::new("x.json"), json!([])).unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn normalize_records_rejects_scalars() {
        let err = normalize_records(Path::new("x.json"), json!([{"id": "a"}, 7])).unwrap_err();
        assert!(err.is_schema());
        assert!(format!("{err}").contains("element 1"));

        let err = normalize_records(Path::new("x.json"), json!({"id": "a"})).unwrap_err();
        assert!(format!("{err}").contains("expected an array"));
    }

    #[test]
    fn unwrap_data_prefers_nested_object() {
        let doc = into_object(Path::new("x"), json!({"data": {"a": 1}, "err": 0})).unwrap();
        assert_eq!(Value::Object(unwrap_data(doc)), json!({"a": 1}));

        let doc = into_object(Path::new("x"), json!({"a": 1})).unwrap();
        assert_eq!(Value::Object(unwrap_data(doc)), json!({"a": 1}));
    }

    #[test]
    fn unwrap_data_ignores_non_object_data() {
        let doc = into_object(Path::new("x"), json!({"data": null, "a": 1})).unwrap();
        assert_eq!(Value::Object(unwrap_data(doc)), json!({"data": null, "a": 1}));
    }

    #[test]
    fn unwrap_data_keeps_key_order_when_not_unwrapping() {
        let doc = into_object(Path::new("x"), json!({"data": null, "a": 1, "b": 2})).unwrap();
        let kept = unwrap_data(doc);
        assert_eq!(kept.keys().collect::<Vec<_>>(), vec!["data", "a", "b"]);
    }

    // -----------------------------------------------------------------------
    // Policies
    // -----------------------------------------------------------------------

    #[test]
    fn required_policy_propagates() {
        let source = MemorySource::new();
        let result: Result<Option<Document>, _> =
            load_with_policy(&source, Path::new("missing.json"), LoadPolicy::Required);
        assert!(result.unwrap_err().is_not_found());
    }

    #[test]
    fn tolerant_and_logged_policies_swallow() {
        let source = MemorySource::new().with_file("bad.json", "[1, 2]");
        for policy in [LoadPolicy::Tolerant, LoadPolicy::Logged] {
            let missing: Option<Document> =
                load_with_policy(&source, Path::new("missing.json"), policy).unwrap();
            assert!(missing.is_none());
            let wrong_shape: Option<Document> =
                load_with_policy(&source, Path::new("bad.json"), policy).unwrap();
            assert!(wrong_shape.is_none());
        }
    }

    #[test]
    fn optional_load_yields_none_on_any_miss() {
        let source = MemorySource::new()
            .with_file("bad.json", "[1, 2]")
            .with_file("good.json", r#"{"a": 1}"#);
        let missing: Option<Document> = load_optional(&source, Path::new("missing.json"));
        assert!(missing.is_none());
        let wrong_shape: Option<Document> = load_optional(&source, Path::new("bad.json"));
        assert!(wrong_shape.is_none());
        let records = load_optional_with(&source, Path::new("good.json"), normalize_records);
        assert!(records.is_none());
        let good: Option<Document> = load_optional(&source, Path::new("good.json"));
        assert_eq!(good.unwrap()["a"], 1);
    }

    // -----------------------------------------------------------------------
    // Keyed directories
    // -----------------------------------------------------------------------

    #[test]
    fn keyed_dir_uses_file_stems() {
        let source = MemorySource::new()
            .with_file("d/easy.json", r#"{"aim": 1}"#)
            .with_file("d/hard.ron", r#"{"aim": 3}"#);
        let docs: BTreeMap<String, Document> = load_keyed_dir(&source, Path::new("d")).unwrap();
        assert_eq!(docs.keys().collect::<Vec<_>>(), vec!["easy", "hard"]);
        assert_eq!(docs["hard"]["aim"], 3);
    }

    #[test]
    fn keyed_dir_conflicting_stems() {
        let source = MemorySource::new()
            .with_file("d/easy.json", "{}")
            .with_file("d/easy.ron", "{}");
        let result: Result<BTreeMap<String, Document>, _> = load_keyed_dir(&source, Path::new("d"));
        assert!(matches!(
            result,
            Err(DataLoadError::ConflictingFormats { .. })
        ));
    }

    #[test]
    fn keyed_dir_missing_directory_fails() {
        let source = MemorySource::new();
        let result: Result<BTreeMap<String, Document>, _> = load_keyed_dir(&source, Path::new("d"));
        assert!(result.unwrap_err().is_not_found());
    }

    // -----------------------------------------------------------------------
    // Error display / classification
    // -----------------------------------------------------------------------

    #[test]
    fn context_wraps_and_classifies() {
        let err = DataLoadError::Schema {
            file: PathBuf::from("globals.json"),
            detail: "expected an object".to_string(),
        }
        .context("globals")
        .context("core config");

        let msg = format!("{err}");
        assert!(msg.contains("core config"));
        assert!(msg.contains("globals.json"));
        assert!(err.is_schema());
        assert!(!err.is_not_found());
    }

    #[test]
    fn load_context_trait() {
        let result: Result<(), DataLoadError> = Err(DataLoadError::NotFound {
            path: PathBuf::from("server.json"),
        });
        let err = result.with_context(|| format!("server config for {}", "core")).unwrap_err();
        assert!(format!("{err}").starts_with("error loading server config for core"));
        assert!(err.is_not_found());
    }
}
