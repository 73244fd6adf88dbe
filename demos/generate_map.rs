//! Example: Generate a Voronoi map
//!
//! Demonstrates the basic usage of the sweep: random sites, one diagram,
//! and a look at the counters of the run.

use rust_voronoi_map::*;

/// Prints the beach line size at every tenth event
struct Progress {
    events: usize,
}

impl SweepObserver for Progress {
    fn on_event(&mut self, step: &SweepStep<'_>) {
        self.events += 1;
        if self.events % 10 == 0 {
            println!(
                "  event {:>4} at y = {:>8.2}: {} arcs{}",
                self.events,
                step.sweep_y,
                step.beach.arc_count(),
                if step.stale { " (stale)" } else { "" }
            );
        }
    }
}

fn main() {
    println!("Voronoi Map Generation Example");
    println!("==============================\n");

    let config = MapConfigBuilder::new()
        .seed(42)
        .cell_count(50)
        .size(800.0, 600.0)
        .unwrap()
        .build()
        .unwrap();

    println!("Configuration:");
    println!("  Seed: {}", config.seed);
    println!("  Cell Count: {}", config.cell_count);
    println!("  Frame: {} x {}", config.width, config.height);
    println!("  Duplicates: {:?}", config.duplicate_policy);
    println!();

    let sites = generate_sites(config.cell_count, config.bounds(), config.seed);

    println!("Sweeping...");
    let mut progress = Progress { events: 0 };
    let (diagram, stats) =
        generate_diagram_with_observer(&sites, &config.sweep_options(), &mut progress)
            .expect("Failed to generate diagram");
    println!();

    println!("Statistics:");
    println!("  Site events: {}", stats.site_events);
    println!("  Circle events: {}", stats.circle_events);
    println!("  Stale events: {}", stats.stale_events);
    println!("  Cancelled events: {}", stats.discarded_events);
    println!("  Edges cut at frame: {}", stats.finished_edges);
    println!("  Cleanup: {:?}", stats.cleanup);
    println!();

    let total_neighbors: usize = diagram
        .cells()
        .iter()
        .map(|c| diagram.neighbors(c.id).len())
        .sum();
    let avg_neighbors = total_neighbors as f64 / diagram.cells().len() as f64;

    println!("Diagram:");
    println!("  Cells: {}", diagram.cells().len());
    println!("  Vertices: {} ({} interior)", diagram.vertices().len(), diagram.interior_vertices().count());
    println!("  Edges: {}", diagram.edges().len());
    println!("  Average neighbors per cell: {:.2}", avg_neighbors);
    println!();

    println!("Sample cells:");
    for cell in diagram.cells().iter().take(5) {
        println!(
            "  Cell {}: site=({:.2}, {:.2}), neighbors={}, vertices={}, area={:.1}",
            cell.id.index(),
            cell.site.x,
            cell.site.y,
            diagram.neighbors(cell.id).len(),
            cell.vertices.len(),
            diagram.cell_area(cell.id)
        );
    }

    println!("\nGeneration complete!");
}
