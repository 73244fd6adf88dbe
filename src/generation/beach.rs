//! The beach line
//!
//! A binary tree stored in an arena: leaves are parabolic arcs (one site
//! each), internal nodes are breakpoints owning the edge traced between the
//! rightmost arc of their left subtree and the leftmost arc of their right
//! subtree. An in-order walk yields the arcs from left to right.
//!
//! Nodes are never reused within a run. Removed nodes become `Vacant`, so a
//! `NodeId` held by a queued circle event can be checked against the live
//! tree when the event fires.

use glam::DVec2;

use super::events::{CircleEvent, EventQueue};
use crate::diagram::{CellId, DiagramBuilder, EdgeId, VertexId};
use crate::error::{Result, VoronoiError};
use crate::geometry::{breakpoint_x, ray_intersection, Parabola, EPSILON};

/// Index of a node in the beach line arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub usize);

#[derive(Debug, Clone, Copy)]
enum NodeKind {
    Arc {
        cell: CellId,
        site: DVec2,
    },
    Breakpoint {
        edge: EdgeId,
        left: NodeId,
        right: NodeId,
    },
    Vacant,
}

#[derive(Debug, Clone, Copy)]
struct Node {
    parent: Option<NodeId>,
    kind: NodeKind,
}

/// Result of handling a circle event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoveOutcome {
    /// The arc was removed and a vertex created
    Applied(VertexId),
    /// The arcs the event was scheduled for are no longer adjacent
    Stale,
}

/// Sweep-line frontier of parabolic arcs
#[derive(Debug, Clone, Default)]
pub struct BeachLine {
    nodes: Vec<Node>,
    root: Option<NodeId>,
}

/// Whether a site at `sweep_y` lies on the sweep line together with `focus`
fn on_sweep(focus: DVec2, sweep_y: f64) -> bool {
    (focus.y - sweep_y).abs() <= EPSILON * (1.0 + sweep_y.abs())
}

impl BeachLine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether no site has been inserted yet
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    fn alloc(&mut self, parent: Option<NodeId>, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node { parent, kind });
        id
    }

    fn set_parent(&mut self, node: NodeId, parent: NodeId) {
        self.nodes[node.0].parent = Some(parent);
    }

    fn arc(&self, node: NodeId) -> Option<(CellId, DVec2)> {
        match self.nodes.get(node.0)?.kind {
            NodeKind::Arc { cell, site } => Some((cell, site)),
            _ => None,
        }
    }

    fn arc_cell(&self, node: NodeId) -> Option<CellId> {
        self.arc(node).map(|(cell, _)| cell)
    }

    fn arc_site(&self, node: NodeId) -> DVec2 {
        self.arc(node).map(|(_, site)| site).unwrap_or(DVec2::NAN)
    }

    fn edge(&self, node: NodeId) -> Option<EdgeId> {
        match self.nodes[node.0].kind {
            NodeKind::Breakpoint { edge, .. } => Some(edge),
            _ => None,
        }
    }

    fn set_edge(&mut self, node: NodeId, new_edge: EdgeId) {
        if let NodeKind::Breakpoint { ref mut edge, .. } = self.nodes[node.0].kind {
            *edge = new_edge;
        }
    }

    /// Nearest breakpoint to the left of `node`
    ///
    /// Walks up until an ancestor is reached through its right child.
    fn left_parent(&self, node: NodeId) -> Option<NodeId> {
        let mut last = node;
        let mut parent = self.nodes[node.0].parent;
        while let Some(p) = parent {
            if let NodeKind::Breakpoint { right, .. } = self.nodes[p.0].kind {
                if right == last {
                    return Some(p);
                }
            }
            last = p;
            parent = self.nodes[p.0].parent;
        }
        None
    }

    /// Nearest breakpoint to the right of `node`
    fn right_parent(&self, node: NodeId) -> Option<NodeId> {
        let mut last = node;
        let mut parent = self.nodes[node.0].parent;
        while let Some(p) = parent {
            if let NodeKind::Breakpoint { left, .. } = self.nodes[p.0].kind {
                if left == last {
                    return Some(p);
                }
            }
            last = p;
            parent = self.nodes[p.0].parent;
        }
        None
    }

    /// Rightmost arc of the left subtree of a breakpoint
    fn left_child(&self, breakpoint: NodeId) -> NodeId {
        let mut node = match self.nodes[breakpoint.0].kind {
            NodeKind::Breakpoint { left, .. } => left,
            _ => return breakpoint,
        };
        while let NodeKind::Breakpoint { right, .. } = self.nodes[node.0].kind {
            node = right;
        }
        node
    }

    /// Leftmost arc of the right subtree of a breakpoint
    fn right_child(&self, breakpoint: NodeId) -> NodeId {
        let mut node = match self.nodes[breakpoint.0].kind {
            NodeKind::Breakpoint { right, .. } => right,
            _ => return breakpoint,
        };
        while let NodeKind::Breakpoint { left, .. } = self.nodes[node.0].kind {
            node = left;
        }
        node
    }

    fn replace_child(&mut self, parent: NodeId, old: NodeId, new: NodeId) {
        if let NodeKind::Breakpoint {
            ref mut left,
            ref mut right,
            ..
        } = self.nodes[parent.0].kind
        {
            if *left == old {
                *left = new;
            } else if *right == old {
                *right = new;
            }
        }
    }

    /// X position of a breakpoint node at the given sweep position
    fn breakpoint_at(&self, breakpoint: NodeId, sweep_y: f64) -> f64 {
        let left = self.arc_site(self.left_child(breakpoint));
        let right = self.arc_site(self.right_child(breakpoint));
        breakpoint_x(left, right, sweep_y)
    }

    /// Arc above `x` when the sweep line is at `sweep_y`
    fn find_arc(&self, x: f64, sweep_y: f64) -> Option<NodeId> {
        let mut node = self.root?;
        loop {
            match self.nodes[node.0].kind {
                NodeKind::Arc { .. } => return Some(node),
                NodeKind::Breakpoint { left, right, .. } => {
                    node = if x < self.breakpoint_at(node, sweep_y) {
                        left
                    } else {
                        right
                    };
                }
                NodeKind::Vacant => return None,
            }
        }
    }

    /// Insert the arc of a new site reached by the sweep line
    pub(crate) fn insert(
        &mut self,
        cell: CellId,
        site: DVec2,
        queue: &mut EventQueue,
        diagram: &mut DiagramBuilder,
    ) -> Result<()> {
        if self.root.is_none() {
            self.root = Some(self.alloc(None, NodeKind::Arc { cell, site }));
            return Ok(());
        }

        let hit = self.find_arc(site.x, site.y).ok_or_else(|| {
            VoronoiError::MathDegenerate(format!("no arc above site at {:?}", site))
        })?;
        let Some((hit_cell, hit_site)) = self.arc(hit) else {
            return Err(VoronoiError::MathDegenerate(format!(
                "search for {:?} ended on a non-arc node",
                site
            )));
        };

        if queue.cancel(hit) {
            log::trace!("site {:?} cancels circle event of arc {:?}", cell, hit);
        }

        if on_sweep(hit_site, site.y) {
            return self.split_flat(hit, (hit_cell, hit_site), (cell, site), queue, diagram);
        }

        let parabola = Parabola::at_sweep(hit_site, site.y).ok_or_else(|| {
            VoronoiError::MathDegenerate(format!("degenerate arc of {:?} above {:?}", hit_site, site))
        })?;
        let start = DVec2::new(site.x, parabola.eval(site.x));

        let left_edge = diagram.open_ray(start, hit_cell, cell)?;
        let right_edge = diagram.open_ray(start, cell, hit_cell)?;
        diagram.set_twin(left_edge, right_edge);

        // hit becomes the right breakpoint; its left child holds the left breakpoint
        let left_copy = self.alloc(None, NodeKind::Arc { cell: hit_cell, site: hit_site });
        let middle = self.alloc(None, NodeKind::Arc { cell, site });
        let right_copy = self.alloc(Some(hit), NodeKind::Arc { cell: hit_cell, site: hit_site });
        let inner = self.alloc(
            Some(hit),
            NodeKind::Breakpoint {
                edge: left_edge,
                left: left_copy,
                right: middle,
            },
        );
        self.set_parent(left_copy, inner);
        self.set_parent(middle, inner);
        self.nodes[hit.0].kind = NodeKind::Breakpoint {
            edge: right_edge,
            left: inner,
            right: right_copy,
        };

        self.check_circle(left_copy, site.y, queue, diagram);
        self.check_circle(right_copy, site.y, queue, diagram);
        Ok(())
    }

    /// Split an arc whose focus lies on the sweep line
    ///
    /// The two parabolas are vertical rays, so the new arc sits beside the old
    /// one instead of inside it and a single vertical edge separates them. The
    /// edge starts at the top of the frame.
    fn split_flat(
        &mut self,
        hit: NodeId,
        (hit_cell, hit_site): (CellId, DVec2),
        (cell, site): (CellId, DVec2),
        queue: &mut EventQueue,
        diagram: &mut DiagramBuilder,
    ) -> Result<()> {
        let top = diagram.bounds().max.y.max(site.y).max(hit_site.y);
        let origin = DVec2::new(0.5 * (hit_site.x + site.x), top);
        let start = diagram.add_vertex(origin)?;

        let old_arc = self.alloc(Some(hit), NodeKind::Arc { cell: hit_cell, site: hit_site });
        let new_arc = self.alloc(Some(hit), NodeKind::Arc { cell, site });
        let (left, right, edge) = if site.x >= hit_site.x {
            (old_arc, new_arc, diagram.open_ray_at(start, hit_cell, cell)?)
        } else {
            (new_arc, old_arc, diagram.open_ray_at(start, cell, hit_cell)?)
        };
        self.nodes[hit.0].kind = NodeKind::Breakpoint { edge, left, right };

        log::trace!("flat split of {:?} by {:?} at x = {}", hit_cell, cell, origin.x);
        self.check_circle(old_arc, site.y, queue, diagram);
        Ok(())
    }

    /// Remove the arc a circle event was scheduled for
    ///
    /// Returns `Stale` without touching anything when the event's arc triple
    /// is no longer adjacent in the tree.
    pub(crate) fn remove(
        &mut self,
        event: &CircleEvent,
        queue: &mut EventQueue,
        diagram: &mut DiagramBuilder,
    ) -> Result<RemoveOutcome> {
        let arc = event.arc;
        if self.arc_cell(arc) != Some(event.mid) {
            return Ok(RemoveOutcome::Stale);
        }
        let (Some(left_bp), Some(right_bp)) = (self.left_parent(arc), self.right_parent(arc))
        else {
            return Ok(RemoveOutcome::Stale);
        };
        let left_arc = self.left_child(left_bp);
        let right_arc = self.right_child(right_bp);
        if self.arc_cell(left_arc) != Some(event.left)
            || self.arc_cell(right_arc) != Some(event.right)
        {
            return Ok(RemoveOutcome::Stale);
        }
        let (Some(parent), Some(left_edge), Some(right_edge)) = (
            self.nodes[arc.0].parent,
            self.edge(left_bp),
            self.edge(right_bp),
        ) else {
            return Ok(RemoveOutcome::Stale);
        };
        let Some(grandparent) = self.nodes[parent.0].parent else {
            return Ok(RemoveOutcome::Stale);
        };
        let sibling = match self.nodes[parent.0].kind {
            NodeKind::Breakpoint { left, right, .. } if left == arc => right,
            NodeKind::Breakpoint { left, .. } => left,
            _ => return Ok(RemoveOutcome::Stale),
        };

        queue.cancel(left_arc);
        queue.cancel(right_arc);

        let vertex = diagram.add_vertex(event.center)?;
        diagram.close_ray(left_edge, vertex);
        diagram.close_ray(right_edge, vertex);
        let edge = diagram.open_ray_at(vertex, event.left, event.right)?;

        // parent is one of the two breakpoints; the other one is an ancestor and survives
        let higher = if parent == left_bp { right_bp } else { left_bp };
        self.set_edge(higher, edge);

        self.replace_child(grandparent, parent, sibling);
        self.set_parent(sibling, grandparent);
        self.nodes[arc.0] = Node {
            parent: None,
            kind: NodeKind::Vacant,
        };
        self.nodes[parent.0] = Node {
            parent: None,
            kind: NodeKind::Vacant,
        };

        let sweep_y = event.position.y;
        self.check_circle(left_arc, sweep_y, queue, diagram);
        self.check_circle(right_arc, sweep_y, queue, diagram);
        Ok(RemoveOutcome::Applied(vertex))
    }

    /// Schedule the circle event of `arc` if its two bounding edges converge
    /// below the sweep line
    ///
    /// A circle bottom within a small tolerance above the sweep still counts,
    /// so a fourth co-circular site closes its arc at the same vertex.
    pub(crate) fn check_circle(
        &self,
        arc: NodeId,
        sweep_y: f64,
        queue: &mut EventQueue,
        diagram: &DiagramBuilder,
    ) -> bool {
        let Some((mid, mid_site)) = self.arc(arc) else {
            return false;
        };
        let (Some(left_bp), Some(right_bp)) = (self.left_parent(arc), self.right_parent(arc))
        else {
            return false;
        };
        let (Some((left, left_site)), Some((right, right_site))) = (
            self.arc(self.left_child(left_bp)),
            self.arc(self.right_child(right_bp)),
        ) else {
            return false;
        };
        if left == right {
            return false;
        }
        // the middle arc only shrinks when its sites turn clockwise
        if (mid_site - left_site).perp_dot(right_site - mid_site) >= 0.0 {
            return false;
        }
        let (Some(left_edge), Some(right_edge)) = (self.edge(left_bp), self.edge(right_bp)) else {
            return false;
        };

        let a = diagram.ray(left_edge);
        let b = diagram.ray(right_edge);
        let Some(center) = ray_intersection(a.origin, a.direction, b.origin, b.direction) else {
            return false;
        };

        let radius = (center - mid_site).length();
        let bottom = center.y - radius;
        if bottom > sweep_y + EPSILON * (1.0 + sweep_y.abs()) {
            return false;
        }

        queue.schedule_circle(CircleEvent {
            arc,
            left,
            mid,
            right,
            center,
            position: DVec2::new(center.x, bottom),
        })
    }

    /// Terminate every edge still growing at a point beyond the frame
    ///
    /// Returns the number of edges terminated. The builder clips them back to
    /// the frame during cleanup.
    pub(crate) fn finish(&self, diagram: &mut DiagramBuilder) -> Result<usize> {
        let Some(root) = self.root else {
            return Ok(0);
        };
        let bounds = diagram.bounds();
        let mut finished = 0;

        // post-order walk without recursion, the tree is not balanced
        let mut stack = vec![(root, false)];
        while let Some((node, expanded)) = stack.pop() {
            let NodeKind::Breakpoint { edge, left, right } = self.nodes[node.0].kind else {
                continue;
            };
            if !expanded {
                stack.push((node, true));
                stack.push((right, false));
                stack.push((left, false));
                continue;
            }

            let ray = diagram.ray(edge);
            if ray.end.is_some() {
                continue;
            }
            let far = bounds.far_point(ray.origin, ray.direction);
            let vertex = diagram.add_vertex(far)?;
            diagram.close_ray(edge, vertex);
            finished += 1;
        }
        Ok(finished)
    }

    fn in_order_arcs(&self) -> Vec<NodeId> {
        let mut arcs = Vec::new();
        let mut stack = Vec::new();
        let mut current = self.root;
        while current.is_some() || !stack.is_empty() {
            while let Some(node) = current {
                stack.push(node);
                current = match self.nodes[node.0].kind {
                    NodeKind::Breakpoint { left, .. } => Some(left),
                    _ => None,
                };
            }
            let Some(node) = stack.pop() else {
                break;
            };
            match self.nodes[node.0].kind {
                NodeKind::Arc { .. } => arcs.push(node),
                NodeKind::Breakpoint { right, .. } => current = Some(right),
                NodeKind::Vacant => {}
            }
        }
        arcs
    }

    /// Sites of the arcs from left to right
    pub fn arcs(&self) -> Vec<CellId> {
        self.in_order_arcs()
            .into_iter()
            .filter_map(|node| self.arc_cell(node))
            .collect()
    }

    /// Number of arcs on the beach line
    pub fn arc_count(&self) -> usize {
        self.in_order_arcs().len()
    }

    /// X positions of the breakpoints from left to right at `sweep_y`
    pub fn breakpoints(&self, sweep_y: f64) -> Vec<f64> {
        let sites: Vec<DVec2> = self
            .in_order_arcs()
            .into_iter()
            .map(|node| self.arc_site(node))
            .collect();
        sites
            .windows(2)
            .map(|pair| breakpoint_x(pair[0], pair[1], sweep_y))
            .collect()
    }
}
