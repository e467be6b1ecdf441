//! Nexema: schema compiler for the Nexema binary interchange IDL.
//!
//! The language-agnostic pipeline (tokenizer, parser, analyzer, lowering)
//! lives in `nexema_core`; this crate adds the filesystem-facing layer on
//! top of it — the project manifest, the generator registry and the
//! `Builder` that ties loading, analysis and generation into the three
//! operations the CLI exposes.

pub mod builder;
pub mod error;
pub mod generator;
pub mod manifest;

pub use nexema_core::definition;
