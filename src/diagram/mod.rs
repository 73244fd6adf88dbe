//! Voronoi Diagram Structure
//!
//! The finished output of a sweep: cells (one per kept input site), vertices
//! and edges, cross-referenced by dense ids.

mod builder;

pub use builder::CleanupStats;
pub(crate) use builder::DiagramBuilder;

use glam::DVec2;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::geometry::{Bounds, EPSILON};

/// Index of a cell in `Diagram::cells`
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CellId(pub usize);

/// Index of a vertex in `Diagram::vertices`
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VertexId(pub usize);

/// Index of an edge in `Diagram::edges`
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EdgeId(pub usize);

impl CellId {
    #[inline]
    pub fn index(self) -> usize {
        self.0
    }
}

impl VertexId {
    #[inline]
    pub fn index(self) -> usize {
        self.0
    }
}

impl EdgeId {
    #[inline]
    pub fn index(self) -> usize {
        self.0
    }
}

/// The region of the plane closer to one site than to any other
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone)]
pub struct Cell {
    /// Identifier of this cell
    pub id: CellId,

    /// Site position
    pub site: DVec2,

    /// Position of the site in the input slice
    pub input_index: usize,

    /// Vertices on the boundary of this cell (unordered)
    pub vertices: Vec<VertexId>,

    /// Edges on the boundary of this cell
    pub edges: Vec<EdgeId>,
}

impl Cell {
    /// Number of boundary edges
    #[inline]
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }
}

/// A point where edges meet, or where an edge was cut by the frame
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone)]
pub struct Vertex {
    pub id: VertexId,
    pub position: DVec2,
    /// Edges ending or starting here
    pub edges: Vec<EdgeId>,
    /// Cells whose boundary passes through this vertex
    pub cells: Vec<CellId>,
}

impl Vertex {
    /// Number of incident edges
    #[inline]
    pub fn degree(&self) -> usize {
        self.edges.len()
    }
}

/// A boundary segment between two cells
///
/// `left` and `right` are the arcs on either side of the breakpoint that
/// traced the edge, in beach line order. Walking from `start` to `end`, the
/// `right` cell lies on the left-hand side.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone)]
pub struct Edge {
    pub id: EdgeId,
    pub start: VertexId,
    pub end: VertexId,
    pub left: CellId,
    pub right: CellId,
    /// Unit direction from `start` towards `end`
    pub direction: DVec2,
    /// Slope of the bisector, infinite for vertical edges
    pub slope: f64,
    /// Y intercept of the bisector, not finite for vertical edges
    pub intercept: f64,
}

impl Edge {
    /// Whether this edge separates `a` and `b`
    pub fn separates(&self, a: CellId, b: CellId) -> bool {
        (self.left == a && self.right == b) || (self.left == b && self.right == a)
    }

    /// The cell on the other side of `cell`, if `cell` borders this edge
    pub fn opposite(&self, cell: CellId) -> Option<CellId> {
        if self.left == cell {
            Some(self.right)
        } else if self.right == cell {
            Some(self.left)
        } else {
            None
        }
    }
}

/// A finished planar Voronoi diagram
///
/// # Example
///
/// ```
/// use rust_voronoi_map::*;
/// use glam::DVec2;
///
/// let sites = [DVec2::new(2.0, 5.0), DVec2::new(8.0, 5.0)];
/// let options = SweepOptions::new(Bounds::from_size(10.0, 10.0));
/// let diagram = generate_diagram(&sites, &options).unwrap();
///
/// assert_eq!(diagram.cells().len(), 2);
/// assert_eq!(diagram.edges().len(), 1);
/// ```
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Default)]
pub struct Diagram {
    cells: Vec<Cell>,
    vertices: Vec<Vertex>,
    edges: Vec<Edge>,
    bounds: Bounds,
    merged_sites: Vec<(usize, CellId)>,
}

impl Diagram {
    pub(crate) fn from_parts(
        cells: Vec<Cell>,
        vertices: Vec<Vertex>,
        edges: Vec<Edge>,
        bounds: Bounds,
        merged_sites: Vec<(usize, CellId)>,
    ) -> Self {
        Self {
            cells,
            vertices,
            edges,
            bounds,
            merged_sites,
        }
    }

    #[inline]
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    #[inline]
    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    #[inline]
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Frame the open edges were cut against
    #[inline]
    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    /// Inputs dropped as duplicates, with the cell that absorbed them
    #[inline]
    pub fn merged_sites(&self) -> &[(usize, CellId)] {
        &self.merged_sites
    }

    /// Whether the diagram has no cells
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    #[inline]
    pub fn cell(&self, id: CellId) -> Option<&Cell> {
        self.cells.get(id.0)
    }

    #[inline]
    pub fn vertex(&self, id: VertexId) -> Option<&Vertex> {
        self.vertices.get(id.0)
    }

    #[inline]
    pub fn edge(&self, id: EdgeId) -> Option<&Edge> {
        self.edges.get(id.0)
    }

    /// Positions of both endpoints of an edge
    pub fn edge_segment(&self, id: EdgeId) -> Option<(DVec2, DVec2)> {
        let edge = self.edge(id)?;
        let start = self.vertex(edge.start)?.position;
        let end = self.vertex(edge.end)?.position;
        Some((start, end))
    }

    /// Cells sharing an edge with `id`, sorted by id
    pub fn neighbors(&self, id: CellId) -> Vec<CellId> {
        let Some(cell) = self.cell(id) else {
            return vec![];
        };
        let mut neighbors: Vec<CellId> = cell
            .edges
            .iter()
            .filter_map(|&e| self.edges[e.0].opposite(id))
            .collect();
        neighbors.sort();
        neighbors.dedup();
        neighbors
    }

    /// The edge separating two cells, if they are adjacent
    pub fn edge_between(&self, a: CellId, b: CellId) -> Option<&Edge> {
        let cell = self.cell(a)?;
        cell.edges
            .iter()
            .map(|&e| &self.edges[e.0])
            .find(|edge| edge.separates(a, b))
    }

    /// Vertices strictly inside the frame (not produced by cutting an edge)
    pub fn interior_vertices(&self) -> impl Iterator<Item = &Vertex> + '_ {
        let tolerance = EPSILON * (1.0 + self.bounds.diagonal());
        self.vertices.iter().filter(move |v| {
            self.bounds.contains(v.position) && !self.bounds.on_border(v.position, tolerance)
        })
    }

    /// Boundary vertices of a cell ordered counter-clockwise around its site
    ///
    /// Cells touching the frame yield an open chain: the frame corners are
    /// not inserted.
    pub fn cell_polygon(&self, id: CellId) -> Vec<DVec2> {
        let Some(cell) = self.cell(id) else {
            return vec![];
        };

        let mut points: Vec<(DVec2, f64)> = cell
            .vertices
            .iter()
            .map(|&v| {
                let position = self.vertices[v.0].position;
                let offset = position - cell.site;
                (position, offset.y.atan2(offset.x))
            })
            .collect();

        points.sort_by(|a, b| a.1.total_cmp(&b.1));
        points.into_iter().map(|(p, _)| p).collect()
    }

    /// Area of the polygon spanned by a cell's ordered vertices
    ///
    /// Exact for closed interior cells, an underestimate for cells cut by
    /// the frame.
    pub fn cell_area(&self, id: CellId) -> f64 {
        let polygon = self.cell_polygon(id);
        if polygon.len() < 3 {
            return 0.0;
        }

        let mut twice_area = 0.0;
        for i in 0..polygon.len() {
            let a = polygon[i];
            let b = polygon[(i + 1) % polygon.len()];
            twice_area += a.perp_dot(b);
        }
        twice_area.abs() * 0.5
    }
}
