//! The working document
//!
//! A [Document] is always a fresh, merged copy of its inputs. Resolving references mutates the
//! document but never the values it was built from.
use crate::inputs::{InputDocuments, LoadError};
use crate::merge::deep_merge;
use crate::resolve::{ResolveError, ResolveReport, Resolver};
use crate::value::{Map, Value};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Document {
    root: Map,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    /// Deep-merge `inputs` left to right into a new document
    ///
    /// Inputs that are not objects (including `null`) are skipped.
    pub fn build<'a>(inputs: impl IntoIterator<Item = &'a Value>) -> Self {
        let mut root = Map::new();

        for (position, input) in inputs.into_iter().enumerate() {
            match input {
                Value::Object(map) => {
                    tracing::debug!(position, keys = map.len(), "merge input");
                    deep_merge(&mut root, map);
                }
                other => {
                    tracing::warn!(
                        position,
                        kind = other.kind(),
                        "ignoring input that is not an object"
                    )
                }
            }
        }

        Self { root }
    }

    /// Load and parse a single (commented) json file
    pub fn from_file(path: &Path) -> Result<Self, LoadError> {
        let mut inputs = InputDocuments::default();
        inputs.load_file(path)?;
        Ok(inputs.build())
    }

    pub fn as_map(&self) -> &Map {
        &self.root
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_empty()
    }

    /// Look up a dotted/bracketed path such as `a.b[2].c`
    ///
    /// Paths that do not parse do not resolve either.
    pub fn get_path(&self, path: &str) -> Option<&Value> {
        let path = crate::path::Path::parse(path).ok()?;
        crate::path::get(&self.root, &path)
    }

    /// Resolve all `${self:...}` references with default options
    pub fn resolve_references(&mut self) -> Result<&mut Self, ResolveError> {
        Resolver::default().resolve(&mut self.root)?;
        Ok(self)
    }

    pub fn resolve_references_with(
        &mut self,
        resolver: &Resolver,
    ) -> Result<ResolveReport, ResolveError> {
        resolver.resolve(&mut self.root)
    }

    /// Canonical compact json
    pub fn to_json_string(&self) -> String {
        self.to_string()
    }

    /// Indented json, `indent` spaces per level
    pub fn to_json_string_pretty(&self, indent: usize) -> Result<String, WriteError> {
        to_json_string_indented(self, indent)
    }

    pub fn to_yaml_string(&self) -> Result<String, WriteError> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn render(&self, options: &WriteOptions) -> Result<String, WriteError> {
        render(self, options)
    }

    pub fn write_file(&self, path: &Path, options: &WriteOptions) -> Result<(), WriteError> {
        write_file(path, &self.render(options)?)
    }
}

/// Render any serializable value (a [Document] or a single [Value])
pub fn render<T: serde::Serialize + ?Sized>(
    value: &T,
    options: &WriteOptions,
) -> Result<String, WriteError> {
    match options.format {
        Format::Json => to_json_string_indented(value, options.indent),
        Format::Yaml => Ok(serde_yaml::to_string(value)?),
    }
}

fn to_json_string_indented<T: serde::Serialize + ?Sized>(
    value: &T,
    indent: usize,
) -> Result<String, WriteError> {
    if indent == 0 {
        return Ok(serde_json::to_string(value)?);
    }

    let indent = " ".repeat(indent);
    let formatter = serde_json::ser::PrettyFormatter::with_indent(indent.as_bytes());
    let mut out = vec![];
    let mut serializer = serde_json::Serializer::with_formatter(&mut out, formatter);
    value.serialize(&mut serializer)?;

    Ok(String::from_utf8_lossy(&out).into_owned())
}

/// Write rendered text to `path`
pub fn write_file(path: &Path, rendered: &str) -> Result<(), WriteError> {
    tracing::info!(path=%path.display(), "writing file");

    std::fs::write(path, rendered).map_err(|cause| WriteError::Io {
        path: path.to_owned(),
        cause,
    })
}

impl std::str::FromStr for Document {
    type Err = LoadError;

    /// Parse (commented) json text. Empty text is an empty document.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut inputs = InputDocuments::default();
        inputs.load_str(s, None)?;
        Ok(inputs.build())
    }
}

impl From<Map> for Document {
    fn from(root: Map) -> Self {
        Self { root }
    }
}

impl serde::ser::Serialize for Document {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeMap;

        let mut ser = serializer.serialize_map(Some(self.root.len()))?;
        for (key, value) in &self.root {
            ser.serialize_entry(key, value)?;
        }
        ser.end()
    }
}

impl std::fmt::Display for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = serde_json::to_string(self).map_err(|_| std::fmt::Error)?;
        f.write_str(&text)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Format {
    #[default]
    Json,
    Yaml,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteOptions {
    pub format: Format,
    /// json only, `0` writes compact json
    pub indent: usize,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            format: Format::Json,
            indent: 2,
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum WriteError {
    #[error("{}: {cause}", .path.display())]
    Io {
        path: PathBuf,
        cause: std::io::Error,
    },
    #[error("Unable to serialize json")]
    Json(#[from] serde_json::Error),
    #[error("Unable to serialize yaml")]
    Yaml(#[from] serde_yaml::Error),
}

/// Utility macro to create a [Document]
///
/// Create from a single json text
/// ```
/// # use selfref::document;
/// let doc = document!(r#"{ "a": 1, /* comment */ "b": "${self:a}" }"#);
/// assert_eq!(doc.get_path("b").unwrap().as_str(), Some("${self:a}"));
/// ```
///
/// Create from multiple json texts (deep-merged in order)
/// ```
/// # use selfref::document;
/// let doc = document!(r#"{ "a": 1, "b": 2 }"#, r#"{ "b": 3 }"#);
/// assert_eq!(doc.to_json_string(), r#"{"a":1,"b":3}"#);
/// ```
///
/// # Panic
/// Panics on invalid input
///
/// ```should_panic
/// # use selfref::document;
/// document!("{ not json");
/// ```
#[macro_export]
macro_rules! document {
    { $text:expr } => {
        $text.parse::<$crate::document::Document>().expect("document must parse")
    };
    { $($text:expr),+ } => {{
        let mut inputs = $crate::inputs::InputDocuments::default();
        $(
            inputs.load_str($text, None).expect("document must parse");
        )+

        inputs.build()
    }};
}
