//! # selfref - self-referencing json configuration
//!
//! Lets a value in a json document point to another value of the same document instead of
//! repeating it:
//!
//! ```json
//! {
//!   // comments are allowed
//!   "stage": "dev",
//!   "table": "users-${self:stage}",
//!   "environment": { "TABLE": "${self:table}" }
//! }
//! ```
//!
//! resolves to
//!
//! ```json
//! { "stage": "dev", "table": "users-dev", "environment": { "TABLE": "users-dev" } }
//! ```
//!
//! ## Introduction for developers
//!
//! Read this to understand how `selfref` works internally.
//!
//! ### Loading documents
//!
//! Text is passed through [comments::strip] (which removes `//` and `/* */` comments outside of
//! string literals) and then parsed with [serde_json] into a [value::Value].
//!
//! [inputs::InputDocuments] collects any number of parsed inputs and remembers the file each one
//! came from, so errors can point to it.
//!
//! ### Merging
//!
//! see [document::Document::build]
//!
//! All inputs are deep-merged, left to right, into a fresh [document::Document]:
//! - objects are merged key by key ([merge::deep_merge])
//! - any other value (scalar, array, `null`) replaces what was there before
//! - inputs that are not objects are skipped
//!
//! The inputs themselves are never touched again.
//!
//! ### Resolving
//!
//! see [resolve::Resolver]
//!
//! A reference is written as `${self:<path>}` where `<path>` is a [path::Path] such as `a.b[2].c`.
//!
//! | **input**                 | **`a` is `{"x":1}`**  | **`a` is missing**        |
//! |---------------------------|-----------------------|---------------------------|
//! | `"${self:a}"`             | `{"x":1}`             | `null`                    |
//! | `"a is ${self:a}"`        | `"a is {\"x\":1}"`    | `"a is undefined"`        |
//!
//! The document is walked depth-first. Each reference is looked up in the *live* document and the
//! value found is resolved itself (on a copy) before it is substituted, so chains of references
//! work in any declaration order.
//!
//! While a referenced value is being resolved its path sits on a reference chain. Seeing the same
//! path again means the document is cyclic and resolution stops with
//! [resolve::ResolveError::Cycle]. Deep (non-cyclic) chains are capped by
//! [resolve::ResolveOptions::max_depth].
//!
//! ### Output
//!
//! A [document::Document] serializes via [serde], either as json (compact or indented) or as yaml.
//!
pub mod comments;
pub mod document;
pub mod inputs;
pub mod merge;
pub mod path;
pub mod resolve;
pub mod value;
