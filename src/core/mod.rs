//! Host-independent annotation core.
//!
//! Hosts build a [`Document`] per annotated region; everything from comment
//! scanning to patch emission happens here, identically for every host.

pub mod classify;
pub mod document;
pub mod engine;
pub mod error;
pub mod group;
pub mod merge;
pub mod patch;
pub mod resolve;
pub mod scan;

pub use classify::{Annotation, Declaration, StyleText, classify};
pub use document::{AttrValue, Attribute, Document, Node, NodeId, NodeKind, Span};
pub use engine::{AnnotateOptions, AnnotateReport, annotate};
pub use error::{Result, TransformError};
pub use merge::{ElementEdit, merge_class, merge_style};
pub use patch::{Patch, PatchKind, PatchSet};
pub use resolve::{Resolution, ResolveOptions};
pub use scan::ScanOptions;
