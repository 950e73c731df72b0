//! dotted/bracketed paths into a document
//!
//! A path such as `a.b[2].c` is parsed into [Segment]s:
//! `[Key("a"), Key("b"), Index(2), Key("c")]`.
//!
//! Lookup is lenient in the same way a javascript deep-get is: a key segment that looks like a
//! number can index into an array, and an index segment can select a numeric key of an object.
use crate::value::{Map, Value};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Segment {
    Key(String),
    Index(usize),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Path {
    segments: Vec<Segment>,
}

impl Path {
    /// Parse path text such as `a.b[2][0].c`
    pub fn parse(text: &str) -> Result<Self, PathError> {
        let error = |reason| PathError {
            path: text.to_string(),
            reason,
        };

        if text.is_empty() {
            return Err(error(PathErrorReason::Empty));
        }

        let mut segments = vec![];
        for part in text.split('.') {
            let (key, mut indices) = match part.find('[') {
                Some(bracket) => part.split_at(bracket),
                None => (part, ""),
            };

            if key.is_empty() {
                return Err(error(PathErrorReason::EmptySegment));
            }
            segments.push(Segment::Key(key.to_string()));

            while !indices.is_empty() {
                let Some(rest) = indices.strip_prefix('[') else {
                    return Err(error(PathErrorReason::UnexpectedCharacter));
                };
                let Some((index, rest)) = rest.split_once(']') else {
                    return Err(error(PathErrorReason::UnterminatedIndex));
                };
                if index.is_empty() || !index.bytes().all(|b| b.is_ascii_digit()) {
                    return Err(error(PathErrorReason::InvalidIndex));
                }
                let index = index
                    .parse()
                    .map_err(|_| error(PathErrorReason::InvalidIndex))?;
                segments.push(Segment::Index(index));
                indices = rest;
            }
        }

        Ok(Self { segments })
    }

    pub fn root() -> Self {
        Self::default()
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn push(&mut self, segment: Segment) {
        self.segments.push(segment)
    }

    pub fn pop(&mut self) -> Option<Segment> {
        self.segments.pop()
    }
}

impl std::fmt::Display for Path {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.segments.is_empty() {
            return f.write_str("<root>");
        }

        for (position, segment) in self.segments.iter().enumerate() {
            match segment {
                Segment::Key(key) if position == 0 => f.write_str(key)?,
                Segment::Key(key) => write!(f, ".{key}")?,
                Segment::Index(index) => write!(f, "[{index}]")?,
            }
        }
        Ok(())
    }
}

impl std::str::FromStr for Path {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Path::parse(s)
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid path `{path}`: {reason}")]
pub struct PathError {
    pub path: String,
    pub reason: PathErrorReason,
}

#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathErrorReason {
    #[error("path is empty")]
    Empty,
    #[error("empty key")]
    EmptySegment,
    #[error("unexpected character after index")]
    UnexpectedCharacter,
    #[error("missing `]`")]
    UnterminatedIndex,
    #[error("index must be a non-negative integer")]
    InvalidIndex,
}

/// Look up `path` starting at the `root` object
///
/// The empty path does not address anything.
pub fn get<'v>(root: &'v Map, path: &Path) -> Option<&'v Value> {
    let (first, rest) = path.segments.split_first()?;
    let mut current = select_in_map(root, first)?;

    for segment in rest {
        current = select(current, segment)?;
    }

    Some(current)
}

/// Mutable variant of [get]
pub fn get_mut<'v>(root: &'v mut Map, path: &Path) -> Option<&'v mut Value> {
    let (first, rest) = path.segments.split_first()?;
    let mut current = match first {
        Segment::Key(key) => root.get_mut(key)?,
        Segment::Index(index) => root.get_mut(&index.to_string())?,
    };

    for segment in rest {
        current = match (current, segment) {
            (Value::Object(map), Segment::Key(key)) => map.get_mut(key)?,
            (Value::Object(map), Segment::Index(index)) => map.get_mut(&index.to_string())?,
            (Value::Array(items), Segment::Index(index)) => items.get_mut(*index)?,
            (Value::Array(items), Segment::Key(key)) => items.get_mut(array_index(key)?)?,
            _ => return None,
        };
    }

    Some(current)
}

/// Canonical form of `path`: object members are addressed by key, array elements by index
///
/// Returns `None` when `path` does not exist in `root`. Two paths select the same value exactly
/// when their canonical forms are equal.
pub fn locate(root: &Map, path: &Path) -> Option<Path> {
    let (first, rest) = path.segments.split_first()?;
    let mut current = select_in_map(root, first)?;
    let mut segments = vec![match first {
        Segment::Key(key) => Segment::Key(key.clone()),
        Segment::Index(index) => Segment::Key(index.to_string()),
    }];

    for segment in rest {
        let next = select(current, segment)?;
        segments.push(match (current, segment) {
            (Value::Array(_), Segment::Key(key)) => Segment::Index(array_index(key)?),
            (Value::Object(_), Segment::Index(index)) => Segment::Key(index.to_string()),
            (_, segment) => segment.clone(),
        });
        current = next;
    }

    Some(Path { segments })
}

fn select_in_map<'v>(map: &'v Map, segment: &Segment) -> Option<&'v Value> {
    match segment {
        Segment::Key(key) => map.get(key),
        Segment::Index(index) => map.get(&index.to_string()),
    }
}

fn select<'v>(value: &'v Value, segment: &Segment) -> Option<&'v Value> {
    match (value, segment) {
        (Value::Object(map), segment) => select_in_map(map, segment),
        (Value::Array(items), Segment::Index(index)) => items.get(*index),
        (Value::Array(items), Segment::Key(key)) => items.get(array_index(key)?),
        _ => None,
    }
}

fn array_index(key: &str) -> Option<usize> {
    if key.is_empty() || !key.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    key.parse().ok()
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    fn key(k: &str) -> Segment {
        Segment::Key(k.to_string())
    }

    fn root() -> Map {
        let value: Value = serde_json::from_str::<serde_json::Value>(
            r#"{ "o": { "a": [2, 4, { "deep": [[7]] }, 16] }, "1": "one", "x": null }"#,
        )
        .unwrap()
        .into();
        match value {
            Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    fn lookup<'v>(root: &'v Map, text: &str) -> Option<&'v Value> {
        get(root, &Path::parse(text).unwrap())
    }

    #[test]
    fn parse_segments() {
        let path = Path::parse("a.b[2][10].c").unwrap();
        assert_eq!(
            path.segments(),
            &[
                key("a"),
                key("b"),
                Segment::Index(2),
                Segment::Index(10),
                key("c")
            ]
        );
        assert_eq!(path.to_string(), "a.b[2][10].c");
    }

    #[test]
    fn parse_errors() {
        let reason = |text: &str| Path::parse(text).unwrap_err().reason;

        assert_eq!(reason(""), PathErrorReason::Empty);
        assert_eq!(reason("a..b"), PathErrorReason::EmptySegment);
        assert_eq!(reason("a."), PathErrorReason::EmptySegment);
        assert_eq!(reason("[0]"), PathErrorReason::EmptySegment);
        assert_eq!(reason("a[1"), PathErrorReason::UnterminatedIndex);
        assert_eq!(reason("a[x]"), PathErrorReason::InvalidIndex);
        assert_eq!(reason("a[-1]"), PathErrorReason::InvalidIndex);
        assert_eq!(reason("a[]"), PathErrorReason::InvalidIndex);
        assert_eq!(reason("a[1]b"), PathErrorReason::UnexpectedCharacter);
    }

    #[test]
    fn lookup_keys_and_indices() {
        let root = root();

        assert_eq!(lookup(&root, "o.a[2].deep[0][0]"), Some(&Value::Integer(7)));
        assert_eq!(lookup(&root, "o.a[3]"), Some(&Value::Integer(16)));
        assert_eq!(lookup(&root, "x"), Some(&Value::Null));
        assert_eq!(lookup(&root, "o.a[4]"), None);
        assert_eq!(lookup(&root, "o.b"), None);
        assert_eq!(lookup(&root, "o.a[0].nope"), None);
    }

    #[test]
    fn lookup_is_lenient_between_keys_and_indices() {
        let root = root();

        assert_eq!(lookup(&root, "o.a.1"), Some(&Value::Integer(4)));
        assert_eq!(lookup(&root, "o.a.one"), None);
        assert_eq!(
            get(&root, &Path { segments: vec![Segment::Index(1)] }),
            Some(&Value::from("one"))
        );
    }

    #[test]
    fn locate_spells_every_path_the_same_way() {
        let root = root();
        let canonical =
            |text: &str| locate(&root, &Path::parse(text).unwrap()).map(|p| p.to_string());

        assert_eq!(canonical("o.a.1").as_deref(), Some("o.a[1]"));
        assert_eq!(canonical("o.a[1]").as_deref(), Some("o.a[1]"));
        assert_eq!(
            canonical("o.a.2.deep.0[0]").as_deref(),
            Some("o.a[2].deep[0][0]")
        );
        assert_eq!(
            locate(&root, &Path { segments: vec![Segment::Index(1)] }),
            Some(Path::parse("1").unwrap())
        );
        assert_eq!(canonical("o.a.9"), None);
    }

    #[test]
    fn lookup_mut() {
        let mut root = root();
        let path = Path::parse("o.a[1]").unwrap();

        *get_mut(&mut root, &path).unwrap() = Value::from("four");

        assert_eq!(get(&root, &path), Some(&Value::from("four")));
    }

    #[test]
    fn root_path_addresses_nothing() {
        assert_eq!(get(&root(), &Path::root()), None);
        assert_eq!(Path::root().to_string(), "<root>");
    }
}
