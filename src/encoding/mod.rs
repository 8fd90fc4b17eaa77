//! Resource encoding model.
//!
//! This module defines the pieces of one generation:
//! - `EncodingRegistry` - default and override encodings keyed by resource
//! - `EncodingDocument` - the persisted preference entries
//! - `PropertiesFileMerger` - before/after merge hooks and the output transformer
//! - `BuildLayout` - source sets that produce the default encodings

pub mod document;
pub mod layout;
pub mod merger;
pub mod registry;

pub use document::{
    DEFAULT_RESOURCE, EncodingDocument, LoadPolicy, SCHEMA_MARKER_KEY, SCHEMA_MARKER_VALUE,
};
pub use layout::{BuildLayout, SourceSet};
pub use merger::{
    HookAction, LineEnding, MergeHook, PropertiesFileMerger, TextAction, TextTransformer,
    merge_encodings,
};
pub use registry::{
    EncodingLayer, EncodingMap, EncodingRegistry, PROJECT_KEY, PROJECT_SENTINEL,
    ResourceEncoding, resource_key,
};
