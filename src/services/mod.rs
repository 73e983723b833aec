//! Service layer: table building, layout and the side-effect helpers around it.
//!
//! ## Service map
//! - `header.rs` — arch selection/ordering and header labels.
//! - `matrix.rs` — version rows, slot grouping, redundancy, JSON report.
//! - `rotator.rs` — 90° label rotation.
//! - `render.rs` — both table orientations, terminal output.
//! - `text.rs` — styled label helpers and ANSI painting.
//! - `locate.rs` — package/repository inference from the working directory.
//! - `settings.rs` — config file + flags into `DisplayConfig`.
//! - `output.rs` — JSON output helper.
//!
//! ## Conventions
//! - Layout code is pure: lines of glyphs in, lines of glyphs out.
//! - Only `render::display` and `output` write, and only to the sink they are given.

pub mod header;
pub mod locate;
pub mod matrix;
pub mod output;
pub mod render;
pub mod rotator;
pub mod settings;
pub mod text;
