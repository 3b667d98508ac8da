//! Renderer errors

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum RenderError {
    /// The all-outbound renderer was given a path with inbound hops
    #[error("Path to '{0}' is not all-outbound")]
    NotAllOutbound(String),
}
