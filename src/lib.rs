//! Olive - comments in, classes out
//!
//! Olive is a build-time rewriter. Authors annotate markup with ordinary
//! comments (`<!-- btn btn-primary -->`, `{/* color: red */}`) and olive
//! merges them into the `class`/`style` attribute of the element they
//! annotate, deleting the comments. Everything else in the file is left
//! byte-for-byte intact.
//!
//! ## Module Structure
//!
//! - `cli`: Command-line interface (`olive build`, `olive init`)
//! - `config`: `.oliverc.json` loading and parsing
//! - `core`: Host-independent document model and annotation pass
//! - `hosts`: HTML, Vue, Svelte, Astro, Lit and JSX adapters
//!
//! ```
//! let out = olive::transform("<p></p><!-- lead -->", "index.html").unwrap();
//! assert_eq!(out, r#"<p class="lead"></p>"#);
//! ```

pub mod cli;
pub mod config;
pub mod core;
pub mod hosts;

pub use crate::core::TransformError;
pub use hosts::{TransformOptions, Transformed, Transformer, transform};
