//! Accumulates cells, vertices and open rays during the sweep and turns them
//! into a finished `Diagram`.
//!
//! Post-sweep cleanup runs in six steps:
//! 1. stitch each ray with its twin half into one segment
//! 2. drop vertices left without edges
//! 3. drop rays still missing an endpoint
//! 4. drop later edges repeating an already seen cell pair
//! 5. clip edges to the frame, dropping those outside it
//! 6. collapse zero-length edges into a single vertex
//!
//! followed by compaction into dense ids.

use glam::DVec2;
use std::collections::HashMap;

use super::{Cell, CellId, Diagram, Edge, EdgeId, Vertex, VertexId};
use crate::error::{Result, VoronoiError};
use crate::geometry::{Bounds, EPSILON};

/// Working cell record
#[derive(Debug, Clone)]
struct CellEntry {
    site: DVec2,
    input_index: usize,
    edges: Vec<EdgeId>,
}

/// Working vertex record
#[derive(Debug, Clone)]
struct VertexEntry {
    position: DVec2,
    edges: Vec<EdgeId>,
    removed: bool,
}

/// An edge under construction
///
/// Grows from `origin` along `direction` until a circle event or the final
/// frame cut gives it an `end`. A ray split off by a site event names the
/// opposite half as its `twin`; stitching turns the pair into one segment.
#[derive(Debug, Clone)]
pub(crate) struct Ray {
    pub origin: DVec2,
    pub start: Option<VertexId>,
    pub end: Option<VertexId>,
    pub left: CellId,
    pub right: CellId,
    pub direction: DVec2,
    pub slope: f64,
    pub intercept: f64,
    pub twin: Option<EdgeId>,
    removed: bool,
}

/// Counters reported by the cleanup pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CleanupStats {
    pub stitched: usize,
    /// Vertices dropped for having no edges left
    pub orphan_vertices: usize,
    pub incomplete_edges: usize,
    pub duplicate_edges: usize,
    /// Edges shortened to the frame
    pub clipped_edges: usize,
    /// Edges lying entirely outside the frame
    pub outside_edges: usize,
    /// Zero-length edges whose endpoints were merged
    pub collapsed_edges: usize,
}

#[derive(Debug, Clone)]
pub(crate) struct DiagramBuilder {
    bounds: Bounds,
    cells: Vec<CellEntry>,
    vertices: Vec<VertexEntry>,
    rays: Vec<Ray>,
    merged_sites: Vec<(usize, CellId)>,
}

impl DiagramBuilder {
    pub fn new(bounds: Bounds) -> Self {
        Self {
            bounds,
            cells: Vec::new(),
            vertices: Vec::new(),
            rays: Vec::new(),
            merged_sites: Vec::new(),
        }
    }

    #[inline]
    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    pub fn add_cell(&mut self, site: DVec2, input_index: usize) -> CellId {
        let id = CellId(self.cells.len());
        self.cells.push(CellEntry {
            site,
            input_index,
            edges: Vec::new(),
        });
        id
    }

    /// Record an input that was folded into an existing cell
    pub fn merge_site(&mut self, input_index: usize, into: CellId) {
        self.merged_sites.push((input_index, into));
    }

    #[inline]
    pub fn site(&self, cell: CellId) -> DVec2 {
        self.cells[cell.0].site
    }

    #[inline]
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// Create a vertex
    ///
    /// # Errors
    ///
    /// Returns `MathDegenerate` for a NaN or infinite position.
    pub fn add_vertex(&mut self, position: DVec2) -> Result<VertexId> {
        if !position.is_finite() {
            return Err(VoronoiError::MathDegenerate(format!(
                "vertex at non-finite position {:?}",
                position
            )));
        }
        Ok(self.push_vertex(position))
    }

    fn push_vertex(&mut self, position: DVec2) -> VertexId {
        let id = VertexId(self.vertices.len());
        self.vertices.push(VertexEntry {
            position,
            edges: Vec::new(),
            removed: false,
        });
        id
    }

    #[inline]
    pub fn vertex_position(&self, vertex: VertexId) -> DVec2 {
        self.vertices[vertex.0].position
    }

    /// Start a ray between `left` and `right` at a point that is not a vertex
    ///
    /// The direction is the bisector of the two sites, oriented so that the
    /// ray follows the breakpoint as the sweep line moves down.
    pub fn open_ray(&mut self, origin: DVec2, left: CellId, right: CellId) -> Result<EdgeId> {
        if !origin.is_finite() {
            return Err(VoronoiError::MathDegenerate(format!(
                "edge origin at non-finite position {:?}",
                origin
            )));
        }
        let l = self.site(left);
        let r = self.site(right);
        let direction = DVec2::new(r.y - l.y, l.x - r.x);
        let slope = (r.x - l.x) / (l.y - r.y);
        let intercept = origin.y - slope * origin.x;

        let id = EdgeId(self.rays.len());
        self.rays.push(Ray {
            origin,
            start: None,
            end: None,
            left,
            right,
            direction,
            slope,
            intercept,
            twin: None,
            removed: false,
        });
        self.cells[left.0].edges.push(id);
        self.cells[right.0].edges.push(id);
        Ok(id)
    }

    /// Start a ray at an existing vertex
    pub fn open_ray_at(&mut self, start: VertexId, left: CellId, right: CellId) -> Result<EdgeId> {
        let origin = self.vertex_position(start);
        let id = self.open_ray(origin, left, right)?;
        self.rays[id.0].start = Some(start);
        self.vertices[start.0].edges.push(id);
        Ok(id)
    }

    pub fn set_twin(&mut self, edge: EdgeId, twin: EdgeId) {
        self.rays[edge.0].twin = Some(twin);
    }

    /// Terminate a ray at `vertex`
    pub fn close_ray(&mut self, edge: EdgeId, vertex: VertexId) {
        let ray = &mut self.rays[edge.0];
        if ray.end.is_some() {
            return;
        }
        ray.end = Some(vertex);
        self.vertices[vertex.0].edges.push(edge);
    }

    #[inline]
    pub fn ray(&self, edge: EdgeId) -> &Ray {
        &self.rays[edge.0]
    }

    /// Run the cleanup steps and compact into a `Diagram`
    pub fn build(mut self) -> (Diagram, CleanupStats) {
        let mut stats = CleanupStats {
            stitched: self.stitch_twins(),
            orphan_vertices: self.drop_orphan_vertices(),
            incomplete_edges: self.drop_incomplete_rays(),
            duplicate_edges: self.drop_duplicate_rays(),
            ..Default::default()
        };
        (stats.clipped_edges, stats.outside_edges) = self.clip_to_bounds();
        stats.collapsed_edges = self.collapse_short_rays();
        stats.orphan_vertices += self.drop_orphan_vertices();

        if stats.incomplete_edges > 0 {
            log::warn!(
                "dropped {} edges still missing an endpoint",
                stats.incomplete_edges
            );
        }
        log::debug!("cleanup: {:?}", stats);

        (self.compact(), stats)
    }

    fn detach(&mut self, edge: EdgeId) {
        let (left, right, start, end) = {
            let ray = &mut self.rays[edge.0];
            ray.removed = true;
            (ray.left, ray.right, ray.start, ray.end)
        };
        for cell in [left, right] {
            self.cells[cell.0].edges.retain(|&e| e != edge);
        }
        for vertex in [start, end].into_iter().flatten() {
            self.vertices[vertex.0].edges.retain(|&e| e != edge);
        }
    }

    fn stitch_twins(&mut self) -> usize {
        let mut stitched = 0;
        for i in 0..self.rays.len() {
            if self.rays[i].removed {
                continue;
            }
            let Some(twin) = self.rays[i].twin.take() else {
                continue;
            };
            if self.rays[twin.0].removed {
                continue;
            }

            if let Some(vertex) = self.rays[twin.0].end {
                if self.rays[i].start.is_none() {
                    self.rays[i].start = Some(vertex);
                    self.vertices[vertex.0].edges.push(EdgeId(i));
                }
            }
            self.detach(twin);
            stitched += 1;
        }
        stitched
    }

    fn drop_orphan_vertices(&mut self) -> usize {
        let mut dropped = 0;
        for vertex in self.vertices.iter_mut() {
            if !vertex.removed && vertex.edges.is_empty() {
                vertex.removed = true;
                dropped += 1;
            }
        }
        dropped
    }

    fn drop_incomplete_rays(&mut self) -> usize {
        let incomplete: Vec<EdgeId> = self
            .rays
            .iter()
            .enumerate()
            .filter(|(_, ray)| !ray.removed && (ray.start.is_none() || ray.end.is_none()))
            .map(|(i, _)| EdgeId(i))
            .collect();
        for &edge in &incomplete {
            self.detach(edge);
        }
        incomplete.len()
    }

    fn drop_duplicate_rays(&mut self) -> usize {
        let mut seen: HashMap<(CellId, CellId), EdgeId> = HashMap::new();
        let mut duplicates = Vec::new();
        for (i, ray) in self.rays.iter().enumerate() {
            if ray.removed {
                continue;
            }
            let key = (ray.left.min(ray.right), ray.left.max(ray.right));
            if seen.contains_key(&key) {
                duplicates.push(EdgeId(i));
            } else {
                seen.insert(key, EdgeId(i));
            }
        }
        for &edge in &duplicates {
            log::trace!("dropping duplicate edge {:?}", edge);
            self.detach(edge);
        }
        duplicates.len()
    }

    /// Shorten every edge to the part inside the frame
    ///
    /// A moved endpoint becomes a new vertex, the old one stays with the
    /// other edges meeting there. Returns `(clipped, outside)`.
    fn clip_to_bounds(&mut self) -> (usize, usize) {
        let mut clipped = 0;
        let mut outside = 0;
        for i in 0..self.rays.len() {
            let ray = &self.rays[i];
            if ray.removed {
                continue;
            }
            let (Some(start), Some(end)) = (ray.start, ray.end) else {
                continue;
            };
            let a = self.vertices[start.0].position;
            let b = self.vertices[end.0].position;

            let Some((t0, t1)) = self.bounds.clip_segment(a, b) else {
                log::trace!("dropping edge {} outside the frame", i);
                self.detach(EdgeId(i));
                outside += 1;
                continue;
            };
            if t0 > 0.0 {
                self.move_endpoint(EdgeId(i), start, a + (b - a) * t0);
            }
            if t1 < 1.0 {
                self.move_endpoint(EdgeId(i), end, a + (b - a) * t1);
            }
            if t0 > 0.0 || t1 < 1.0 {
                clipped += 1;
            }
        }
        (clipped, outside)
    }

    fn move_endpoint(&mut self, edge: EdgeId, old: VertexId, position: DVec2) {
        let vertex = self.push_vertex(position);
        self.vertices[old.0].edges.retain(|&e| e != edge);
        self.vertices[vertex.0].edges.push(edge);

        let ray = &mut self.rays[edge.0];
        if ray.start == Some(old) {
            ray.start = Some(vertex);
        } else {
            ray.end = Some(vertex);
        }
    }

    /// Drop edges whose endpoints coincide and merge the two vertices
    ///
    /// Four or more co-circular sites leave such edges between cells that
    /// only touch at a point.
    fn collapse_short_rays(&mut self) -> usize {
        let mut collapsed = 0;
        for i in 0..self.rays.len() {
            let ray = &self.rays[i];
            if ray.removed {
                continue;
            }
            let (Some(start), Some(end)) = (ray.start, ray.end) else {
                continue;
            };
            let a = self.vertices[start.0].position;
            let b = self.vertices[end.0].position;
            let tolerance = EPSILON * (1.0 + self.bounds.diagonal() + a.abs().max_element());
            if (a - b).length() > tolerance {
                continue;
            }

            self.detach(EdgeId(i));
            if start != end {
                for edge in std::mem::take(&mut self.vertices[end.0].edges) {
                    let ray = &mut self.rays[edge.0];
                    if ray.start == Some(end) {
                        ray.start = Some(start);
                    }
                    if ray.end == Some(end) {
                        ray.end = Some(start);
                    }
                    if !self.vertices[start.0].edges.contains(&edge) {
                        self.vertices[start.0].edges.push(edge);
                    }
                }
                self.vertices[end.0].removed = true;
            }
            collapsed += 1;
        }
        collapsed
    }

    fn compact(self) -> Diagram {
        let mut vertex_map: Vec<Option<VertexId>> = vec![None; self.vertices.len()];
        let mut vertices: Vec<Vertex> = Vec::new();
        for (old, entry) in self.vertices.iter().enumerate() {
            if entry.removed || entry.edges.is_empty() {
                continue;
            }
            let id = VertexId(vertices.len());
            vertex_map[old] = Some(id);
            vertices.push(Vertex {
                id,
                position: entry.position,
                edges: Vec::new(),
                cells: Vec::new(),
            });
        }

        let mut cells: Vec<Cell> = self
            .cells
            .iter()
            .enumerate()
            .map(|(i, entry)| Cell {
                id: CellId(i),
                site: entry.site,
                input_index: entry.input_index,
                vertices: Vec::new(),
                edges: Vec::new(),
            })
            .collect();

        let mut edges: Vec<Edge> = Vec::new();
        for ray in self.rays.iter().filter(|r| !r.removed) {
            let (Some(start), Some(end)) = (
                ray.start.and_then(|v| vertex_map[v.0]),
                ray.end.and_then(|v| vertex_map[v.0]),
            ) else {
                continue;
            };
            let id = EdgeId(edges.len());
            edges.push(Edge {
                id,
                start,
                end,
                left: ray.left,
                right: ray.right,
                direction: ray.direction.normalize_or_zero(),
                slope: ray.slope,
                intercept: ray.intercept,
            });

            for cell in [ray.left, ray.right] {
                cells[cell.0].edges.push(id);
                for vertex in [start, end] {
                    if !cells[cell.0].vertices.contains(&vertex) {
                        cells[cell.0].vertices.push(vertex);
                    }
                }
            }
            for vertex in [start, end] {
                let v = &mut vertices[vertex.0];
                if !v.edges.contains(&id) {
                    v.edges.push(id);
                }
                for cell in [ray.left, ray.right] {
                    if !v.cells.contains(&cell) {
                        v.cells.push(cell);
                    }
                }
            }
        }

        Diagram::from_parts(cells, vertices, edges, self.bounds, self.merged_sites)
    }
}
