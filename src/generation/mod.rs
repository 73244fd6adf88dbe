//! Fortune's sweep
//!
//! A horizontal line moves from the highest site downwards. Site events grow
//! new arcs on the beach line, circle events remove arcs that shrink to
//! nothing and place the Voronoi vertices. Edges still open when the queue
//! runs dry are cut at the frame before the diagram is cleaned up.

mod beach;
mod events;
pub mod sites;

pub use beach::{BeachLine, NodeId, RemoveOutcome};
pub use events::{CircleEvent, Event};
pub use sites::generate_sites;

use events::EventQueue;
use glam::DVec2;
use std::collections::HashMap;

use crate::config::{DuplicatePolicy, SweepOptions};
use crate::diagram::{CellId, CleanupStats, Diagram, DiagramBuilder};
use crate::error::{Result, VoronoiError};

/// Read-only view handed to a `SweepObserver` after each event
#[derive(Debug, Clone, Copy)]
pub struct SweepStep<'a> {
    /// Position of the sweep line
    pub sweep_y: f64,
    /// Event just handled
    pub event: &'a Event,
    /// The event was a circle event whose arcs were no longer adjacent
    pub stale: bool,
    /// Beach line after the event
    pub beach: &'a BeachLine,
}

/// Receives every step of a sweep, e.g. for step-wise visualization
pub trait SweepObserver {
    fn on_event(&mut self, step: &SweepStep<'_>);
}

struct Silent;

impl SweepObserver for Silent {
    fn on_event(&mut self, _step: &SweepStep<'_>) {}
}

/// Counters collected over one sweep
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepStats {
    /// Sites inserted into the beach line
    pub site_events: usize,
    /// Circle events that removed an arc
    pub circle_events: usize,
    /// Circle events popped after their arc triple had changed
    pub stale_events: usize,
    /// Cancelled events dropped by the queue without being handled
    pub discarded_events: usize,
    /// Edges cut at the frame after the last event
    pub finished_edges: usize,
    /// Post-sweep cleanup
    pub cleanup: CleanupStats,
}

/// Compute the Voronoi diagram of `sites`
///
/// Cells keep the order of the input, minus merged duplicates.
///
/// # Errors
///
/// - `NonFiniteSite` if a coordinate is NaN or infinite
/// - `DuplicateSite` if two sites coincide and the policy is `Reject`
/// - `MathDegenerate` if a non-finite value reaches a vertex
///
/// # Example
///
/// ```
/// use rust_voronoi_map::*;
/// use glam::DVec2;
///
/// let sites = [DVec2::new(0.0, 0.0), DVec2::new(4.0, 0.0), DVec2::new(2.0, 4.0)];
/// let options = SweepOptions::new(Bounds::new(DVec2::splat(-10.0), DVec2::splat(10.0)));
/// let diagram = generate_diagram(&sites, &options).unwrap();
///
/// assert_eq!(diagram.edges().len(), 3);
/// assert_eq!(diagram.interior_vertices().count(), 1);
/// ```
pub fn generate_diagram(sites: &[DVec2], options: &SweepOptions) -> Result<Diagram> {
    generate_diagram_with_observer(sites, options, &mut Silent).map(|(diagram, _)| diagram)
}

/// Compute the Voronoi diagram of `sites`, reporting every step to `observer`
///
/// Also returns the counters of the run.
pub fn generate_diagram_with_observer<O>(
    sites: &[DVec2],
    options: &SweepOptions,
    observer: &mut O,
) -> Result<(Diagram, SweepStats)>
where
    O: SweepObserver + ?Sized,
{
    let mut builder = DiagramBuilder::new(options.bounds);
    let mut queue = EventQueue::new();
    register_sites(sites, options.duplicate_policy, &mut builder, &mut queue)?;

    let mut beach = BeachLine::new();
    let mut stats = SweepStats::default();

    while let Some(event) = queue.pop() {
        let sweep_y = event.position().y;
        let stale = match event {
            Event::Site { cell, position } => {
                beach.insert(cell, position, &mut queue, &mut builder)?;
                stats.site_events += 1;
                false
            }
            Event::Circle(circle) => match beach.remove(&circle, &mut queue, &mut builder)? {
                RemoveOutcome::Applied(vertex) => {
                    log::trace!(
                        "vertex {:?} at {:?} closes arc of {:?}",
                        vertex,
                        circle.center,
                        circle.mid
                    );
                    stats.circle_events += 1;
                    false
                }
                RemoveOutcome::Stale => {
                    log::trace!(
                        "ignoring stale circle event {:?}/{:?}/{:?} at y = {}",
                        circle.left,
                        circle.mid,
                        circle.right,
                        sweep_y
                    );
                    stats.stale_events += 1;
                    true
                }
            },
        };

        observer.on_event(&SweepStep {
            sweep_y,
            event: &event,
            stale,
            beach: &beach,
        });
    }

    stats.discarded_events = queue.discarded();
    stats.finished_edges = beach.finish(&mut builder)?;

    let (diagram, cleanup) = builder.build();
    stats.cleanup = cleanup;

    log::debug!(
        "swept {} sites: {} circle events ({} stale, {} cancelled), {} edges, {} vertices",
        stats.site_events,
        stats.circle_events,
        stats.stale_events,
        stats.discarded_events,
        diagram.edges().len(),
        diagram.vertices().len()
    );

    Ok((diagram, stats))
}

/// Validate the input and queue one site event per distinct position
fn register_sites(
    sites: &[DVec2],
    policy: DuplicatePolicy,
    builder: &mut DiagramBuilder,
    queue: &mut EventQueue,
) -> Result<()> {
    let mut seen: HashMap<(u64, u64), (usize, CellId)> = HashMap::with_capacity(sites.len());

    for (index, &site) in sites.iter().enumerate() {
        if !site.is_finite() {
            return Err(VoronoiError::NonFiniteSite(index));
        }

        // adding 0.0 folds -0.0 into 0.0
        let key = ((site.x + 0.0).to_bits(), (site.y + 0.0).to_bits());
        if let Some(&(first, cell)) = seen.get(&key) {
            match policy {
                DuplicatePolicy::Reject => {
                    return Err(VoronoiError::DuplicateSite {
                        first,
                        second: index,
                        position: site,
                    });
                }
                DuplicatePolicy::Merge => {
                    log::warn!(
                        "site {} at {:?} duplicates site {}, merged",
                        index,
                        site,
                        first
                    );
                    builder.merge_site(index, cell);
                }
            }
            continue;
        }

        let cell = builder.add_cell(site, index);
        seen.insert(key, (index, cell));
        queue.push_site(cell, site);
    }

    Ok(())
}
