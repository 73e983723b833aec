//! Shared data model layer (structs/enums only).
//!
//! ## Files
//! - `models.rs` — database records, keyword states, styled glyphs, matrix/header/report types.
//!
//! ## Rule of thumb
//! Domain types should be data-only: no filesystem or terminal side effects.
//!
//! ## Compatibility note
//! `KeywordsReport` and friends are the `--json` output schema.

pub mod models;
