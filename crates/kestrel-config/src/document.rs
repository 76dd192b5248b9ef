//! Hierarchical documents: the node interface the registry is written
//! against, dotted-path flattening, and parsing of YAML / TOML / JSON text.
//!
//! [`serde_json::Value`] is the provided [`DocumentNode`]. Text is parsed
//! through the `config` crate and deserialised into a `Value`, so every
//! supported format ends up as the same tree shape.

use std::path::Path;

use serde_json::Value;

use crate::error::RegistryError;

// ---------------------------------------------------------------------------
// Node interface
// ---------------------------------------------------------------------------

/// Read-only view of one node in a parsed hierarchical document.
pub trait DocumentNode {
    fn is_null(&self) -> bool;
    fn is_scalar(&self) -> bool;
    fn is_map(&self) -> bool;
    fn is_sequence(&self) -> bool;

    /// Literal text of a scalar node; `None` for maps, sequences and null.
    fn scalar_text(&self) -> Option<String>;

    /// Key/value children of a map node, in document order. Empty otherwise.
    fn map_entries(&self) -> Box<dyn Iterator<Item = (&str, &Self)> + '_>;

    /// Items of a sequence node. Empty otherwise.
    fn sequence_items(&self) -> Box<dyn Iterator<Item = &Self> + '_>;

    /// Serialise this node (and everything below it) to canonical text that
    /// the container codecs can parse back.
    fn to_canonical_text(&self) -> String;
}

impl DocumentNode for Value {
    fn is_null(&self) -> bool {
        self.is_null()
    }

    fn is_scalar(&self) -> bool {
        matches!(self, Value::Bool(_) | Value::Number(_) | Value::String(_))
    }

    fn is_map(&self) -> bool {
        self.is_object()
    }

    fn is_sequence(&self) -> bool {
        self.is_array()
    }

    fn scalar_text(&self) -> Option<String> {
        match self {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            Value::Null | Value::Array(_) | Value::Object(_) => None,
        }
    }

    fn map_entries(&self) -> Box<dyn Iterator<Item = (&str, &Self)> + '_> {
        match self {
            Value::Object(map) => Box::new(map.iter().map(|(k, v)| (k.as_str(), v))),
            _ => Box::new(std::iter::empty()),
        }
    }

    fn sequence_items(&self) -> Box<dyn Iterator<Item = &Self> + '_> {
        match self {
            Value::Array(items) => Box::new(items.iter()),
            _ => Box::new(std::iter::empty()),
        }
    }

    fn to_canonical_text(&self) -> String {
        self.to_string()
    }
}

// ---------------------------------------------------------------------------
// Names and flattening
// ---------------------------------------------------------------------------

/// `true` when every character of `name` is in `[A-Za-z0-9._]`.
///
/// The empty string passes; it is the path of a document root. Variable
/// creation additionally rejects empty names.
pub fn is_valid_name(name: &str) -> bool {
    name.chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '_')
}

/// Flatten `node` into `(dotted.path, node)` pairs in pre-order.
///
/// A path that fails [`is_valid_name`] is logged and neither appended nor
/// descended into. Sequences and scalars are leaves.
pub fn list_all_members<'a, N: DocumentNode>(
    prefix: &str,
    node: &'a N,
    output: &mut Vec<(String, &'a N)>,
) {
    if !is_valid_name(prefix) {
        tracing::error!(path = %prefix, node = %node.to_canonical_text(), "invalid config path, skipping");
        return;
    }
    output.push((prefix.to_string(), node));
    if node.is_map() {
        for (key, child) in node.map_entries() {
            let path = if prefix.is_empty() {
                key.to_string()
            } else {
                format!("{prefix}.{key}")
            };
            list_all_members(&path, child, output);
        }
    }
}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

/// Text formats a document can be parsed from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Yaml,
    Toml,
    Json,
}

impl DocumentFormat {
    /// Infer the format from a file extension (`yaml`/`yml`, `toml`, `json`).
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "yaml" | "yml" => Some(DocumentFormat::Yaml),
            "toml" => Some(DocumentFormat::Toml),
            "json" => Some(DocumentFormat::Json),
            _ => None,
        }
    }

    fn file_format(self) -> config::FileFormat {
        match self {
            DocumentFormat::Yaml => config::FileFormat::Yaml,
            DocumentFormat::Toml => config::FileFormat::Toml,
            DocumentFormat::Json => config::FileFormat::Json,
        }
    }
}

/// Parse `text` into a document tree.
pub fn parse_document(text: &str, format: DocumentFormat) -> Result<Value, RegistryError> {
    config::Config::builder()
        .add_source(config::File::from_str(text, format.file_format()))
        .build()?
        .try_deserialize::<Value>()
        .map_err(Into::into)
}

/// Read and parse a document file, inferring its format from the extension.
pub fn read_document(path: &Path) -> Result<Value, RegistryError> {
    let format = DocumentFormat::from_path(path).ok_or_else(|| {
        RegistryError::Document(format!("unsupported document extension: {}", path.display()))
    })?;
    let text = std::fs::read_to_string(path)
        .map_err(|e| RegistryError::Document(format!("{}: {e}", path.display())))?;
    parse_document(&text, format)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
