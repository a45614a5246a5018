//! Error types for canvas editing operations.

use thiserror::Error;

/// Result type for canvas editing operations.
pub type CanvasResult<T> = Result<T, CanvasError>;

/// Errors that can occur in canvas editing operations.
///
/// None of these reach the user: tools and controllers log them and
/// degrade to a no-op.
#[derive(Debug, Error)]
pub enum CanvasError {
    /// No item exists at the given paint-order index.
    #[error("Item not found at index {0}")]
    ItemNotFound(usize),

    /// Geometry is degenerate or does not fit the item kind.
    #[error("Invalid geometry: {0}")]
    InvalidGeometry(String),

    /// Operation is not applicable to the item or current state.
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    /// A transaction was begun while another one is still open.
    #[error("A transaction is already open")]
    TransactionAlreadyOpen,

    /// A transaction was ended without a matching begin.
    #[error("No transaction is open")]
    NoOpenTransaction,

    /// Editor configuration failed validation.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// JSON serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O error while loading configuration or documents.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
