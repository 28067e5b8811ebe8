//! Error types for the B-tree engine.

use thiserror::Error;

/// Result type alias for tree operations
pub type Result<T> = std::result::Result<T, BTreeError>;

/// Errors that can occur in the B-tree engine
#[derive(Error, Debug)]
pub enum BTreeError {
    /// Key not found (for operations that require an existing key)
    #[error("Key not found")]
    KeyNotFound,

    /// The tree cannot be built with the requested parameters
    #[error("Invalid configuration: minimum degree {min_degree} is below 2")]
    InvalidConfiguration { min_degree: usize },

    /// A structural invariant does not hold
    #[error("Corruption detected: {0}")]
    Corruption(String),

    /// Failed to render the tree as JSON
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl BTreeError {
    /// Create a corruption error with a message
    pub fn corruption(msg: impl Into<String>) -> Self {
        Self::Corruption(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(BTreeError::KeyNotFound.to_string(), "Key not found");
        assert_eq!(
            BTreeError::InvalidConfiguration { min_degree: 1 }.to_string(),
            "Invalid configuration: minimum degree 1 is below 2"
        );
        assert_eq!(
            BTreeError::corruption("leaf depth mismatch").to_string(),
            "Corruption detected: leaf depth mismatch"
        );
    }
}
