//! Planar Voronoi diagrams with Fortune's sweep-line algorithm
//!
//! Computes the Voronoi diagram of a set of 2D sites in O(n log n): cells,
//! vertices and edges with their adjacency, every unbounded edge cut at a
//! rectangular frame. A `VoronoiMap` keeps an editable site list and its
//! diagram together for interactive use.
//!
//! # Quick Start
//!
//! ```rust
//! use rust_voronoi_map::*;
//!
//! // Random sites, reproducible from the seed
//! let config = MapConfigBuilder::new()
//!     .seed(42)
//!     .cell_count(200)
//!     .size(800.0, 600.0).unwrap()
//!     .build().unwrap();
//!
//! let map = VoronoiMap::generate(config).unwrap();
//! println!("{} cells, {} edges", map.cell_count(), map.diagram().edges().len());
//!
//! // Or straight from a list of sites
//! let sites = [DVec2::new(100.0, 100.0), DVec2::new(300.0, 250.0), DVec2::new(500.0, 80.0)];
//! let diagram = generate_diagram(&sites, &config.sweep_options()).unwrap();
//! assert_eq!(diagram.edges().len(), 3);
//! ```
//!
//! # Features
//!
//! - `spatial-index` (default): Enables O(log n) position-to-cell lookups using KD-tree
//! - `serde`: Enables serialization support for configuration and diagrams

// Modules
pub mod error;
pub mod config;
pub mod geometry;
pub mod diagram;
pub mod generation;
pub mod map;

#[cfg(feature = "spatial-index")]
pub mod spatial;

// Re-export core types for convenience
pub use error::{VoronoiError, Result};
pub use config::{DuplicatePolicy, MapConfig, MapConfigBuilder, SweepOptions};
pub use geometry::Bounds;
pub use diagram::{Cell, CellId, CleanupStats, Diagram, Edge, EdgeId, Vertex, VertexId};
pub use generation::{
    generate_diagram, generate_diagram_with_observer, generate_sites, SweepObserver, SweepStats,
    SweepStep,
};
pub use map::VoronoiMap;

#[cfg(feature = "spatial-index")]
pub use spatial::SpatialIndex;

// Re-export glam::DVec2 for convenience
pub use glam::DVec2;
