//! Central error handling for terrasculpt.
//!
//! Provides a unified SculptError enum with consistent categorization
//! across import, editing, and proposal paths.

/// Centralized error type for all terrain-editing operations
#[derive(thiserror::Error, Debug)]
pub enum SculptError {
    #[error("Geometry error: {0}")]
    Geometry(String),

    #[error("Region error: {0}")]
    Region(String),

    #[error("Heightmap error: {0}")]
    Heightmap(String),

    #[error("Proposal error: {0}")]
    Proposal(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl SculptError {
    /// Convenience constructors for common error types
    pub fn geometry<T: ToString>(msg: T) -> Self {
        SculptError::Geometry(msg.to_string())
    }

    pub fn region<T: ToString>(msg: T) -> Self {
        SculptError::Region(msg.to_string())
    }

    pub fn heightmap<T: ToString>(msg: T) -> Self {
        SculptError::Heightmap(msg.to_string())
    }

    pub fn proposal<T: ToString>(msg: T) -> Self {
        SculptError::Proposal(msg.to_string())
    }
}

/// Result type alias for terrain-editing operations
pub type SculptResult<T> = Result<T, SculptError>;
