//! Error types for Voronoi diagram generation

use glam::DVec2;

/// Errors that can occur during diagram generation or queries
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum VoronoiError {
    /// Configuration validation failed
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Two lines with a zero determinant were intersected
    #[error("lines are parallel, no intersection")]
    ParallelLines,

    /// Two input sites share the same position and the duplicate policy rejects them
    #[error("duplicate site at ({x}, {y}): input {first} and input {second}", x = .position.x, y = .position.y)]
    DuplicateSite {
        /// Index of the first occurrence in the input
        first: usize,
        /// Index of the repeated occurrence in the input
        second: usize,
        /// Shared position
        position: DVec2,
    },

    /// An input site has a NaN or infinite coordinate
    #[error("site {0} has a non-finite coordinate")]
    NonFiniteSite(usize),

    /// A NaN or infinite value reached the diagram
    #[error("degenerate math: {0}")]
    MathDegenerate(String),

    /// Requested cell ID does not exist
    #[error("cell not found: {0}")]
    CellNotFound(usize),
}

/// Result type alias for voronoi operations
pub type Result<T> = std::result::Result<T, VoronoiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        let err = VoronoiError::DuplicateSite {
            first: 0,
            second: 3,
            position: DVec2::new(1.5, 2.0),
        };
        assert_eq!(
            err.to_string(),
            "duplicate site at (1.5, 2): input 0 and input 3"
        );
        assert_eq!(VoronoiError::CellNotFound(7).to_string(), "cell not found: 7");
        assert_eq!(
            VoronoiError::ParallelLines.to_string(),
            "lines are parallel, no intersection"
        );
    }
}
