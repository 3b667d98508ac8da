//! Path renderer (verb module)
//!
//! Compiled node lists → path text, with join aliases shared through an
//! [`AliasMapping`] for the duration of one compile pass.

mod alias;
mod error;
mod path;
mod wire;

pub use alias::AliasMapping;
pub use error::RenderError;
pub use path::{render_all_outbound, render_path, render_reversed, RenderedPath};
pub use wire::{encode, encode_table, foreign_key_wire, JoinKind};
