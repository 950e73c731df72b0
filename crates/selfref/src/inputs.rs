//! collection of input documents (parsed value and path to source file)
//!
//! [InputDocuments] keeps every input in the order it was added. [InputDocuments::build] merges them
//! into a single [Document], later inputs taking precedence.
use crate::document::Document;
use crate::value::{Map, Value};
use std::path::{Path, PathBuf};

pub type Source = Option<PathBuf>;

#[derive(Default, Debug, Clone)]
pub struct InputDocuments {
    inputs: Vec<(Source, Value)>,
}

impl InputDocuments {
    /// Adds an already parsed document
    pub fn insert(&mut self, document: Value, path: impl Into<Option<PathBuf>>) {
        self.inputs.push((path.into(), document));
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Source, &Value)> {
        self.inputs.iter().map(|(source, value)| (source, value))
    }

    pub fn source_count(&self) -> usize {
        self.inputs.len()
    }

    /// Merge all inputs into a new document
    pub fn build(&self) -> Document {
        Document::build(self.inputs.iter().map(|(_source, value)| value))
    }
}

impl InputDocuments {
    /// Parses (commented) json text and adds it
    pub fn load_str(
        &mut self,
        text: &str,
        path: impl Into<Option<PathBuf>>,
    ) -> Result<(), LoadError> {
        let path = path.into();
        let document = parse(text, &path)?;
        self.insert(document, path);
        Ok(())
    }

    pub fn load_file(&mut self, file_path: &Path) -> Result<(), LoadError> {
        let io_error = |cause: std::io::Error| LoadError::Io {
            path: file_path.to_owned(),
            cause,
        };

        let file_path = file_path.canonicalize().map_err(io_error)?;
        tracing::info!(path=%file_path.display(), "loading file");

        let file_contents = std::fs::read_to_string(&file_path).map_err(io_error)?;
        self.load_str(&file_contents, file_path)
    }

    /// Loads every `*.json` and `*.jsonc` file in `dir_path` (not recursive), sorted by file name
    pub fn load_directory(&mut self, dir_path: &Path) -> Result<(), LoadError> {
        let io_error = |cause: std::io::Error| LoadError::Io {
            path: dir_path.to_owned(),
            cause,
        };

        let mut file_paths = vec![];
        for dir_entry in std::fs::read_dir(dir_path).map_err(io_error)? {
            let dir_entry = dir_entry.map_err(io_error)?;
            if !dir_entry.file_type().map_err(io_error)?.is_file() {
                continue;
            }

            let file_path = dir_entry.path();
            let is_json_file = matches!(
                file_path.extension().and_then(|ext| ext.to_str()),
                Some("json" | "jsonc")
            );
            if is_json_file {
                file_paths.push(file_path);
            }
        }

        if file_paths.is_empty() {
            return Err(LoadError::NoFilesFound(dir_path.to_owned()));
        }

        file_paths.sort();
        for file_path in file_paths {
            self.load_file(&file_path)?;
        }

        Ok(())
    }
}

/// Parse (commented) json text
///
/// Blank text (or text that only contains comments) is an empty object.
pub fn parse(text: &str, source: &Source) -> Result<Value, LoadError> {
    let stripped = crate::comments::strip(text);
    if stripped.trim().is_empty() {
        return Ok(Value::Object(Map::new()));
    }

    let value: serde_json::Value =
        serde_json::from_str(&stripped).map_err(|cause| LoadError::Parse {
            source_name: source_name(source),
            cause,
        })?;

    Ok(value.into())
}

fn source_name(source: &Source) -> String {
    match source {
        Some(path) => path.display().to_string(),
        None => "<input>".to_string(),
    }
}

#[derive(thiserror::Error, Debug)]
pub enum LoadError {
    #[error("No json files found in directory {}", .0.display())]
    NoFilesFound(PathBuf),
    #[error("{}: {cause}", .path.display())]
    Io {
        path: PathBuf,
        cause: std::io::Error,
    },
    #[error("{source_name}: {cause}")]
    Parse {
        source_name: String,
        cause: serde_json::Error,
    },
}

#[cfg(test)]
pub(crate) mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn keeps_sources_in_order() {
        let mut inputs = InputDocuments::default();
        inputs.load_str(r#"{ "a": 1 }"#, PathBuf::from("one.json")).unwrap();
        inputs.load_str(r#"{ "a": 2 }"#, None).unwrap();

        let sources: Vec<_> = inputs.iter().map(|(source, _)| source.clone()).collect();
        assert_eq!(sources, vec![Some(PathBuf::from("one.json")), None]);
        assert_eq!(inputs.source_count(), 2);
        assert_eq!(inputs.build().to_json_string(), r#"{"a":2}"#);
    }

    #[test]
    fn parse_error_is_prefixed_with_source() {
        let mut inputs = InputDocuments::default();
        let error = inputs
            .load_str("{ \"a\": 1,, }", PathBuf::from("config/broken.json"))
            .unwrap_err();

        assert!(matches!(error, LoadError::Parse { .. }));
        assert!(
            error.to_string().starts_with("config/broken.json: "),
            "{error}"
        );
        assert_eq!(inputs.source_count(), 0);
    }

    #[test]
    fn blank_text_is_an_empty_object() {
        assert_eq!(parse("", &None).unwrap(), Value::Object(Map::new()));
        assert_eq!(parse(" \n\t", &None).unwrap(), Value::Object(Map::new()));
        assert_eq!(
            parse("// only a comment\n/* and another */", &None).unwrap(),
            Value::Object(Map::new())
        );
    }

    #[test]
    fn missing_file() {
        let error = InputDocuments::default()
            .load_file(Path::new("./invalid/path/file.json"))
            .unwrap_err();

        assert!(matches!(error, LoadError::Io { .. }));
        assert!(error.to_string().starts_with("./invalid/path/file.json: "));
    }
}
