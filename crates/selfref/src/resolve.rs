//! `${self:<path>}` reference resolution
//!
//! The [Resolver] walks the document depth-first (object keys in insertion order, array elements by
//! index) and rewrites every string that contains a reference.
//!
//! - a string that is exactly one reference is replaced by the referenced value, whatever its type
//! - otherwise the first reference is spliced into the string (strings verbatim, everything else in
//!   its canonical json form) and the string is scanned again
//!
//! A referenced value is resolved in place before it is used, with its canonical path pushed onto
//! a reference chain. Finding a path that is already on the chain means the document is cyclic,
//! which is reported as [ResolveError::Cycle]. Each string is rewritten once, later references to
//! the same value only copy the result.
//!
//! A run is bounded by [ResolveOptions], see [Limit].
use crate::path::{self, Path, Segment};
use crate::value::{Map, Value};
use once_cell::sync::Lazy;

pub const REFERENCE_PATTERN: &str = r"\$\{self:(.*?)\}";

static REFERENCE: Lazy<regex::Regex> =
    Lazy::new(|| regex::Regex::new(REFERENCE_PATTERN).expect("reference pattern must compile"));

/// What to do with a reference to a path that does not exist
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MissingReferencePolicy {
    /// Whole-string references become `null`, spliced ones the text `undefined`
    #[default]
    Undefined,
    /// Whole-string references become `null`, spliced ones the empty string
    Empty,
    /// Fail with [ResolveError::PathNotFound]
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolveOptions {
    pub missing: MissingReferencePolicy,
    /// Maximum number of nested reference expansions
    pub max_depth: usize,
    /// Maximum number of substitutions in one run
    pub max_substitutions: usize,
    /// Maximum length in bytes of a string built by splicing
    pub max_string_length: usize,
    /// Maximum number of values copied by whole-string references in one run
    pub max_copied_values: usize,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        Self {
            missing: Default::default(),
            max_depth: 64,
            max_substitutions: 100_000,
            max_string_length: 4 << 20,
            max_copied_values: 1_000_000,
        }
    }
}

/// Budgets of a single run besides [ResolveOptions::max_depth]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Limit {
    /// [ResolveOptions::max_substitutions]
    Substitutions,
    /// [ResolveOptions::max_string_length]
    StringLength,
    /// [ResolveOptions::max_copied_values]
    CopiedValues,
}

impl std::fmt::Display for Limit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Limit::Substitutions => write!(f, "substitution"),
            Limit::StringLength => write!(f, "string length"),
            Limit::CopiedValues => write!(f, "copied value"),
        }
    }
}

/// Summary of a resolver run
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ResolveReport {
    /// Number of references that were replaced with an existing value
    pub substitutions: usize,
    /// References whose path did not resolve (never filled with [MissingReferencePolicy::Error])
    pub missing: Vec<MissingReference>,
}

#[derive(Debug, Clone, PartialEq, Eq, derive_new::new)]
pub struct MissingReference {
    /// Location of the string containing the reference
    pub location: String,
    /// Path text as written inside `${self:...}`
    pub path: String,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    #[error("reference cycle while resolving `{location}`: {}", .chain.join(" -> "))]
    Cycle {
        location: String,
        chain: Vec<String>,
    },
    #[error("reference depth limit of {limit} exceeded while resolving `{location}`: {}", .chain.join(" -> "))]
    DepthExceeded {
        limit: usize,
        location: String,
        chain: Vec<String>,
    },
    #[error("{limit} limit of {max} exceeded while resolving `{location}`")]
    LimitExceeded {
        limit: Limit,
        max: usize,
        location: String,
    },
    #[error("reference `${{self:{path}}}` in `{location}` does not resolve")]
    PathNotFound { path: String, location: String },
}

/// Returns true when `text` contains at least one reference
pub fn contains_reference(text: &str) -> bool {
    REFERENCE.is_match(text)
}

/// Byte range of the first reference token and its path text
fn find_reference(text: &str) -> Option<(std::ops::Range<usize>, &str)> {
    let captures = REFERENCE.captures(text)?;
    Some((captures.get(0)?.range(), captures.get(1)?.as_str()))
}

/// Number of values in `value`, itself included
fn value_count(value: &Value) -> usize {
    match value {
        Value::Array(items) => 1 + items.iter().map(value_count).sum::<usize>(),
        Value::Object(map) => 1 + map.values().map(value_count).sum::<usize>(),
        _ => 1,
    }
}

#[derive(Debug, Default, Clone, derive_new::new)]
pub struct Resolver {
    options: ResolveOptions,
}

impl Resolver {
    /// Resolve all references reachable from `root` in place
    #[tracing::instrument(level = "debug", skip_all)]
    pub fn resolve(&self, root: &mut Map) -> Result<ResolveReport, ResolveError> {
        let mut run = Run::new(root, &self.options);
        run.walk(&mut Path::root())?;

        tracing::debug!(
            substitutions = run.report.substitutions,
            missing = run.report.missing.len(),
            copied = run.copied,
            "references resolved"
        );
        Ok(run.report)
    }
}

enum Step {
    Descend(Vec<Segment>),
    Substitute(String),
    Skip,
}

/// State of a single [Resolver::resolve] call
struct Run<'a> {
    root: &'a mut Map,
    options: &'a ResolveOptions,
    report: ResolveReport,
    /// canonical paths currently being expanded, outermost first
    chain: Vec<String>,
    /// references looked at, including missing ones
    rounds: usize,
    /// values copied by whole-string references
    copied: usize,
}

impl<'a> Run<'a> {
    fn new(root: &'a mut Map, options: &'a ResolveOptions) -> Self {
        Self {
            root,
            options,
            report: ResolveReport::default(),
            chain: vec![],
            rounds: 0,
            copied: 0,
        }
    }

    /// Resolve the value at `location` and everything below it in place
    fn walk(&mut self, location: &mut Path) -> Result<(), ResolveError> {
        let step = if location.is_empty() {
            Step::Descend(self.root.keys().cloned().map(Segment::Key).collect())
        } else {
            match path::get(self.root, location) {
                Some(Value::Object(map)) => {
                    Step::Descend(map.keys().cloned().map(Segment::Key).collect())
                }
                Some(Value::Array(items)) => {
                    Step::Descend((0..items.len()).map(Segment::Index).collect())
                }
                Some(Value::String(text)) if contains_reference(text) => {
                    Step::Substitute(text.clone())
                }
                _ => Step::Skip,
            }
        };

        match step {
            Step::Descend(children) => {
                for segment in children {
                    location.push(segment);
                    self.walk(location)?;
                    location.pop();
                }
            }
            Step::Substitute(text) => {
                tracing::trace!(%location, %text, "substitute");
                let resolved = self.substitute(text, location)?;
                if let Some(slot) = path::get_mut(self.root, location) {
                    *slot = resolved;
                }
            }
            Step::Skip => {}
        }

        Ok(())
    }

    fn substitute(&mut self, mut text: String, location: &Path) -> Result<Value, ResolveError> {
        while let Some((range, reference)) = find_reference(&text) {
            self.rounds += 1;
            if self.rounds > self.options.max_substitutions {
                return Err(self.limit_exceeded(Limit::Substitutions, location));
            }

            let reference = reference.to_string();
            let whole = range.start == 0 && range.end == text.len();
            let resolved = match self.expand(&reference, location)? {
                Some(target) => path::get(self.root, &target),
                None => None,
            };

            if whole {
                match resolved {
                    // may still hold a token assembled from spliced pieces
                    Some(Value::String(resolved)) => {
                        text = resolved.clone();
                        continue;
                    }
                    Some(value) => {
                        self.copied += value_count(value);
                        if self.copied > self.options.max_copied_values {
                            return Err(self.limit_exceeded(Limit::CopiedValues, location));
                        }
                        return Ok(value.clone());
                    }
                    None => return Ok(Value::Null),
                }
            }

            let replacement = match resolved {
                Some(Value::String(resolved)) => resolved.clone(),
                Some(value) => value.to_string(),
                None => self.missing_text(),
            };
            text.replace_range(range, &replacement);

            if text.len() > self.options.max_string_length {
                return Err(self.limit_exceeded(Limit::StringLength, location));
            }
        }

        Ok(Value::String(text))
    }

    /// Resolve the value `reference` points to and return its canonical path
    fn expand(&mut self, reference: &str, location: &Path) -> Result<Option<Path>, ResolveError> {
        let target = match Path::parse(reference) {
            Ok(target) => target,
            Err(error) => {
                tracing::debug!(%error, "unparseable reference path");
                return self.missing(reference, location);
            }
        };
        let Some(mut target) = path::locate(self.root, &target) else {
            return self.missing(reference, location);
        };

        let key = target.to_string();
        if self.chain.contains(&key) {
            let mut chain = self.chain.clone();
            chain.push(key);
            return Err(ResolveError::Cycle {
                location: location.to_string(),
                chain,
            });
        }

        if self.chain.len() >= self.options.max_depth {
            return Err(ResolveError::DepthExceeded {
                limit: self.options.max_depth,
                location: location.to_string(),
                chain: self.chain.clone(),
            });
        }

        self.chain.push(key);
        self.walk(&mut target)?;
        self.chain.pop();

        self.report.substitutions += 1;
        Ok(Some(target))
    }

    fn missing(&mut self, reference: &str, location: &Path) -> Result<Option<Path>, ResolveError> {
        let location = location.to_string();

        if self.options.missing == MissingReferencePolicy::Error {
            return Err(ResolveError::PathNotFound {
                path: reference.to_string(),
                location,
            });
        }

        tracing::warn!(%location, path = reference, "reference does not resolve");
        self.report
            .missing
            .push(MissingReference::new(location, reference.to_string()));
        Ok(None)
    }

    fn missing_text(&self) -> String {
        match self.options.missing {
            MissingReferencePolicy::Empty => String::new(),
            MissingReferencePolicy::Undefined | MissingReferencePolicy::Error => {
                "undefined".to_string()
            }
        }
    }

    fn limit_exceeded(&self, limit: Limit, location: &Path) -> ResolveError {
        let max = match limit {
            Limit::Substitutions => self.options.max_substitutions,
            Limit::StringLength => self.options.max_string_length,
            Limit::CopiedValues => self.options.max_copied_values,
        };

        ResolveError::LimitExceeded {
            limit,
            max,
            location: location.to_string(),
        }
    }
}
