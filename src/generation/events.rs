//! Sweep events and their priority queue
//!
//! Events are processed from the highest y downwards, ties broken by
//! ascending x and then by scheduling order. Circle events can be cancelled
//! after they were queued; cancellation only clears the entry in a liveness
//! table keyed by the middle arc, and the stale heap entry is discarded
//! when it surfaces.

use glam::DVec2;
use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};

use super::beach::NodeId;
use crate::diagram::CellId;

/// Three consecutive arcs whose breakpoints converge
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CircleEvent {
    /// Arc that disappears when the event fires
    pub arc: NodeId,
    pub left: CellId,
    pub mid: CellId,
    pub right: CellId,
    /// Center of the circle through the three sites (the new vertex)
    pub center: DVec2,
    /// Lowest point of that circle, where the sweep line fires the event
    pub position: DVec2,
}

/// An event of the sweep
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Event {
    /// The sweep line reaches a site
    Site { cell: CellId, position: DVec2 },
    /// An arc shrinks to nothing
    Circle(CircleEvent),
}

impl Event {
    /// Point at which the sweep line handles this event
    pub fn position(&self) -> DVec2 {
        match self {
            Event::Site { position, .. } => *position,
            Event::Circle(circle) => circle.position,
        }
    }

    pub fn is_site(&self) -> bool {
        matches!(self, Event::Site { .. })
    }
}

#[derive(Debug, Clone)]
struct Queued {
    sequence: u64,
    event: Event,
}

impl PartialEq for Queued {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Queued {}

impl PartialOrd for Queued {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Queued {
    fn cmp(&self, other: &Self) -> Ordering {
        let a = self.event.position();
        let b = other.event.position();
        a.y.total_cmp(&b.y)
            .then_with(|| b.x.total_cmp(&a.x))
            .then_with(|| other.sequence.cmp(&self.sequence))
    }
}

#[derive(Debug, Clone, Copy)]
struct Pending {
    sequence: u64,
    sites: [CellId; 3],
}

/// Priority queue of sweep events
#[derive(Debug, Clone, Default)]
pub struct EventQueue {
    heap: BinaryHeap<Queued>,
    next_sequence: u64,
    pending: HashMap<NodeId, Pending>,
    discarded: usize,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_sequence(&mut self) -> u64 {
        let sequence = self.next_sequence;
        self.next_sequence += 1;
        sequence
    }

    /// Queue a site event
    pub fn push_site(&mut self, cell: CellId, position: DVec2) {
        let sequence = self.next_sequence();
        self.heap.push(Queued {
            sequence,
            event: Event::Site { cell, position },
        });
    }

    /// Queue a circle event for `event.arc`
    ///
    /// Returns `false` without queuing anything when the arc already has a
    /// live event for the same three sites. Any other live event of the arc
    /// is superseded.
    pub fn schedule_circle(&mut self, event: CircleEvent) -> bool {
        let sites = [event.left, event.mid, event.right];
        if let Some(existing) = self.pending.get(&event.arc) {
            if existing.sites == sites {
                return false;
            }
        }

        let sequence = self.next_sequence();
        self.pending.insert(event.arc, Pending { sequence, sites });
        self.heap.push(Queued {
            sequence,
            event: Event::Circle(event),
        });
        true
    }

    /// Cancel the live circle event of `arc`, if any
    pub fn cancel(&mut self, arc: NodeId) -> bool {
        self.pending.remove(&arc).is_some()
    }

    /// Whether `arc` has a live circle event
    pub fn has_pending(&self, arc: NodeId) -> bool {
        self.pending.contains_key(&arc)
    }

    /// Number of live circle events
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Cancelled entries dropped so far
    pub fn discarded(&self) -> usize {
        self.discarded
    }

    /// Pop the next live event
    pub fn pop(&mut self) -> Option<Event> {
        while let Some(queued) = self.heap.pop() {
            match queued.event {
                Event::Site { .. } => return Some(queued.event),
                Event::Circle(circle) => {
                    let live = self
                        .pending
                        .get(&circle.arc)
                        .is_some_and(|p| p.sequence == queued.sequence);
                    if live {
                        self.pending.remove(&circle.arc);
                        return Some(queued.event);
                    }
                    self.discarded += 1;
                }
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn circle(arc: usize, y: f64) -> CircleEvent {
        CircleEvent {
            arc: NodeId(arc),
            left: CellId(0),
            mid: CellId(1),
            right: CellId(2),
            center: DVec2::new(0.0, y + 1.0),
            position: DVec2::new(0.0, y),
        }
    }

    #[test]
    fn test_order_y_descending_then_x_ascending() {
        let mut queue = EventQueue::new();
        queue.push_site(CellId(0), DVec2::new(5.0, 1.0));
        queue.push_site(CellId(1), DVec2::new(3.0, 4.0));
        queue.push_site(CellId(2), DVec2::new(1.0, 1.0));
        queue.push_site(CellId(3), DVec2::new(9.0, 7.0));

        let order: Vec<DVec2> = std::iter::from_fn(|| queue.pop())
            .map(|e| e.position())
            .collect();
        assert_eq!(
            order,
            vec![
                DVec2::new(9.0, 7.0),
                DVec2::new(3.0, 4.0),
                DVec2::new(1.0, 1.0),
                DVec2::new(5.0, 1.0),
            ]
        );
    }

    #[test]
    fn test_circle_interleaves_with_sites() {
        let mut queue = EventQueue::new();
        queue.push_site(CellId(0), DVec2::new(0.0, 10.0));
        queue.push_site(CellId(1), DVec2::new(0.0, 0.0));
        assert!(queue.schedule_circle(circle(7, 5.0)));

        assert!(queue.pop().unwrap().is_site());
        assert!(matches!(queue.pop(), Some(Event::Circle(c)) if c.arc == NodeId(7)));
        assert!(queue.pop().unwrap().is_site());
        assert!(queue.pop().is_none());
    }

    #[test]
    fn test_cancelled_circle_is_skipped() {
        let mut queue = EventQueue::new();
        queue.schedule_circle(circle(3, 2.0));
        assert!(queue.has_pending(NodeId(3)));
        assert!(queue.cancel(NodeId(3)));
        assert!(!queue.has_pending(NodeId(3)));
        assert!(queue.pop().is_none());
        assert_eq!(queue.discarded(), 1);
        assert!(!queue.cancel(NodeId(3)));
    }

    #[test]
    fn test_same_triple_not_requeued() {
        let mut queue = EventQueue::new();
        assert!(queue.schedule_circle(circle(4, 1.0)));
        assert!(!queue.schedule_circle(circle(4, 1.0)));
        assert_eq!(queue.pending_count(), 1);
        assert!(queue.pop().is_some());
        assert!(queue.pop().is_none());
    }

    #[test]
    fn test_rescheduling_supersedes_old_event() {
        let mut queue = EventQueue::new();
        queue.schedule_circle(circle(4, 1.0));
        let mut other = circle(4, 3.0);
        other.right = CellId(9);
        assert!(queue.schedule_circle(other));

        match queue.pop() {
            Some(Event::Circle(c)) => assert_eq!(c.right, CellId(9)),
            e => panic!("unexpected {:?}", e),
        }
        assert!(queue.pop().is_none());
        assert_eq!(queue.discarded(), 1);
    }
}
