//! Command handler layer.
//!
//! ## Files
//! - `show.rs` — package selection and table output.
//!
//! ## Principles
//! - Decide what to show here.
//! - Delegate table building and layout to `services/*`, lookups to `portdb`.

pub mod show;

pub use show::handle_show;
