//! Integration tests for diagram generation
//!
//! Hand-checked small configurations plus structural properties over seeded
//! random site sets.

use rust_voronoi_map::generation::Event;
use rust_voronoi_map::*;
use std::collections::HashSet;

const TOLERANCE: f64 = 1e-6;

fn frame() -> SweepOptions {
    SweepOptions::new(Bounds::new(DVec2::splat(-10.0), DVec2::splat(10.0)))
}

fn random_options() -> SweepOptions {
    SweepOptions::new(Bounds::from_size(1000.0, 1000.0))
}

fn random_sites(count: usize, seed: u64) -> Vec<DVec2> {
    generate_sites(count, random_options().bounds, seed)
}

/// Records breakpoint order violations and circle events
#[derive(Default)]
struct OrderChecker {
    steps: usize,
    circles: usize,
    violations: Vec<(f64, Vec<f64>)>,
}

impl SweepObserver for OrderChecker {
    fn on_event(&mut self, step: &SweepStep<'_>) {
        self.steps += 1;
        if matches!(step.event, Event::Circle(_)) {
            self.circles += 1;
        }
        let breakpoints = step.beach.breakpoints(step.sweep_y);
        let ordered = breakpoints
            .windows(2)
            .all(|pair| pair[0] <= pair[1] + TOLERANCE * (1.0 + pair[1].abs()));
        if !ordered {
            self.violations.push((step.sweep_y, breakpoints));
        }
    }
}

/// Every edge point sampled (both ends and the middle) is as close to the two
/// cells it separates as to any other site
fn assert_edges_between_nearest_sites(name: &str, diagram: &Diagram) {
    for edge in diagram.edges() {
        let (start, end) = diagram.edge_segment(edge.id).unwrap();
        let left = diagram.cell(edge.left).unwrap().site;
        let right = diagram.cell(edge.right).unwrap().site;
        for point in [start, 0.5 * (start + end), end] {
            let own = (point - left).length();
            let tolerance = 1e-6 * (1.0 + own);
            assert!(
                (own - (point - right).length()).abs() < tolerance,
                "{}: edge {:?}-{:?} point {:?} off the bisector",
                name,
                edge.left,
                edge.right,
                point
            );
            for cell in diagram.cells() {
                let distance = (cell.site - point).length();
                assert!(
                    distance >= own - tolerance,
                    "{}: edge {:?}-{:?} point {:?} is {} from its sites but {} from {:?}",
                    name,
                    edge.left,
                    edge.right,
                    point,
                    own,
                    distance,
                    cell.id
                );
            }
        }
    }
}

fn inside_frame(diagram: &Diagram, point: DVec2) -> bool {
    let bounds = diagram.bounds();
    let margin = DVec2::splat(TOLERANCE);
    Bounds::new(bounds.min - margin, bounds.max + margin).contains(point)
}

fn print_summary(name: &str, diagram: &Diagram) {
    println!(
        "{}: {} cells, {} vertices, {} edges",
        name,
        diagram.cells().len(),
        diagram.vertices().len(),
        diagram.edges().len()
    );
}

#[test]
fn test_three_sites() {
    let sites = [DVec2::new(0.0, 0.0), DVec2::new(4.0, 0.0), DVec2::new(2.0, 4.0)];
    let diagram = generate_diagram(&sites, &frame()).unwrap();
    print_summary("three sites", &diagram);

    let interior: Vec<&Vertex> = diagram.interior_vertices().collect();
    assert_eq!(interior.len(), 1);
    let center = interior[0];
    assert!((center.position - DVec2::new(2.0, 1.5)).length() < TOLERANCE);
    assert_eq!(center.degree(), 3);

    assert_eq!(diagram.edges().len(), 3);
    let mut pairs = HashSet::new();
    for edge in diagram.edges() {
        pairs.insert((edge.left.min(edge.right), edge.left.max(edge.right)));

        let other = if edge.start == center.id {
            edge.end
        } else {
            assert_eq!(edge.end, center.id);
            edge.start
        };
        let position = diagram.vertex(other).unwrap().position;
        assert!(diagram.bounds().on_border(position, TOLERANCE), "{:?}", position);
    }
    assert_eq!(pairs.len(), 3);

    let edge = diagram.edge_between(CellId(0), CellId(1)).unwrap();
    assert!(edge.separates(CellId(1), CellId(0)));
    assert!(edge.direction.x.abs() < TOLERANCE);
}

#[test]
fn test_two_sites() {
    let a = DVec2::new(-3.0, 7.0);
    let b = DVec2::new(6.0, 2.0);
    let diagram = generate_diagram(&[a, b], &frame()).unwrap();

    assert_eq!(diagram.edges().len(), 1);
    let edge = &diagram.edges()[0];
    assert!(edge.direction.dot(b - a).abs() < TOLERANCE);

    let (start, end) = diagram.edge_segment(edge.id).unwrap();
    assert!(diagram.bounds().on_border(start, TOLERANCE), "{:?}", start);
    assert!(diagram.bounds().on_border(end, TOLERANCE), "{:?}", end);

    // both endpoints on the bisector
    for p in [start, end] {
        assert!(((p - a).length() - (p - b).length()).abs() < TOLERANCE);
    }
}

#[test]
fn test_two_sites_on_one_line() {
    let diagram =
        generate_diagram(&[DVec2::new(4.0, 3.0), DVec2::new(-2.0, 3.0)], &frame()).unwrap();
    assert_eq!(diagram.edges().len(), 1);
    let (start, end) = diagram.edge_segment(EdgeId(0)).unwrap();
    assert!((start.x - 1.0).abs() < TOLERANCE && (end.x - 1.0).abs() < TOLERANCE);
    assert!((start.y - end.y).abs() > 19.0);

    // walking from start to end, the right cell lies on the left-hand side
    let edge = &diagram.edges()[0];
    let right = diagram.cell(edge.right).unwrap().site;
    assert_eq!(right, DVec2::new(4.0, 3.0));
    assert!((end - start).perp_dot(right - start) > 0.0);
}

#[test]
fn test_collinear_sites() {
    let sites = [DVec2::new(0.0, 0.0), DVec2::new(1.0, 0.0), DVec2::new(2.0, 0.0)];
    let mut checker = OrderChecker::default();
    let (diagram, stats) = generate_diagram_with_observer(&sites, &frame(), &mut checker).unwrap();

    assert_eq!(checker.circles, 0);
    assert_eq!(stats.circle_events, 0);
    assert_eq!(diagram.edges().len(), 2);
    assert_eq!(diagram.interior_vertices().count(), 0);

    let pairs: HashSet<(CellId, CellId)> = diagram
        .edges()
        .iter()
        .map(|e| (e.left.min(e.right), e.left.max(e.right)))
        .collect();
    assert!(pairs.contains(&(CellId(0), CellId(1))));
    assert!(pairs.contains(&(CellId(1), CellId(2))));

    for vertex in diagram.vertices() {
        assert!(diagram.bounds().on_border(vertex.position, TOLERANCE));
    }
}

#[test]
fn test_vertical_column() {
    let sites = [DVec2::new(1.0, -4.0), DVec2::new(1.0, 0.0), DVec2::new(1.0, 4.0)];
    let diagram = generate_diagram(&sites, &frame()).unwrap();
    assert_eq!(diagram.edges().len(), 2);
    assert_eq!(diagram.interior_vertices().count(), 0);
    for edge in diagram.edges() {
        assert!(edge.direction.y.abs() < TOLERANCE);
    }
}

#[test]
fn test_empty_and_single() {
    let empty = generate_diagram(&[], &frame()).unwrap();
    assert!(empty.cells().is_empty());
    assert!(empty.vertices().is_empty());
    assert!(empty.edges().is_empty());

    let single = generate_diagram(&[DVec2::new(3.0, -1.0)], &frame()).unwrap();
    assert_eq!(single.cells().len(), 1);
    assert!(single.vertices().is_empty());
    assert!(single.edges().is_empty());
}

#[test]
fn test_hexagon_cell() {
    let mut sites = vec![DVec2::ZERO];
    for i in 0..6 {
        let angle = std::f64::consts::FRAC_PI_3 * i as f64;
        sites.push(DVec2::new(2.0 * angle.cos(), 2.0 * angle.sin()));
    }
    let diagram = generate_diagram(&sites, &frame()).unwrap();
    print_summary("hexagon", &diagram);

    assert_eq!(diagram.edges().len(), 12);
    assert_eq!(diagram.neighbors(CellId(0)).len(), 6);

    let polygon = diagram.cell_polygon(CellId(0));
    assert_eq!(polygon.len(), 6);
    for p in &polygon {
        assert!((p.length() - 2.0 / 3f64.sqrt()).abs() < TOLERANCE);
    }
    let expected = 2.0 * 3f64.sqrt();
    assert!((diagram.cell_area(CellId(0)) - expected).abs() < TOLERANCE);
}

#[test]
fn test_deterministic_runs() {
    let sites = random_sites(300, 9);
    let first = generate_diagram(&sites, &random_options()).unwrap();
    let second = generate_diagram(&sites, &random_options()).unwrap();

    assert_eq!(first.edges().len(), second.edges().len());
    assert_eq!(first.vertices().len(), second.vertices().len());
    for cell in first.cells() {
        assert_eq!(first.neighbors(cell.id), second.neighbors(cell.id));
    }
}

#[test]
fn test_random_sets_structure() {
    for seed in 0..20 {
        let sites = random_sites(150 + 10 * seed as usize, seed);
        let (diagram, stats) =
            generate_diagram_with_observer(&sites, &random_options(), &mut OrderChecker::default())
                .unwrap();
        assert_eq!(diagram.cells().len(), sites.len());
        assert_eq!(stats.cleanup.duplicate_edges, 0, "seed {}", seed);

        // at most one edge per cell pair, never a cell with itself
        let mut pairs = HashSet::new();
        for edge in diagram.edges() {
            assert_ne!(edge.left, edge.right);
            let key = (edge.left.min(edge.right), edge.left.max(edge.right));
            assert!(pairs.insert(key), "seed {}: repeated pair {:?}", seed, key);
        }

        for vertex in diagram.vertices() {
            assert!(!vertex.edges.is_empty());
            assert!(vertex.position.is_finite());
        }

        // every interior vertex is a circumcenter of the cells it touches
        for vertex in diagram.interior_vertices() {
            let distances: Vec<f64> = vertex
                .cells
                .iter()
                .map(|&c| (diagram.cell(c).unwrap().site - vertex.position).length())
                .collect();
            let reference = distances[0];
            for d in &distances {
                assert!(
                    (d - reference).abs() < 1e-6 * (1.0 + reference),
                    "seed {}: vertex {:?} distances {:?}",
                    seed,
                    vertex.position,
                    distances
                );
            }
        }

        // no site is closer to an interior vertex than the sites of its cells
        for vertex in diagram.interior_vertices() {
            let own = (diagram.cell(vertex.cells[0]).unwrap().site - vertex.position).length();
            for site in &sites {
                assert!((*site - vertex.position).length() >= own - 1e-6 * (1.0 + own));
            }
        }

        for cell in diagram.cells() {
            assert!(!diagram.neighbors(cell.id).is_empty());
        }

        for vertex in diagram.vertices() {
            assert!(inside_frame(&diagram, vertex.position), "seed {}", seed);
        }
        assert_edges_between_nearest_sites(&format!("seed {}", seed), &diagram);
    }
}

#[test]
fn test_site_below_breakpoint() {
    let sites = [DVec2::new(4.0, 10.0), DVec2::new(8.0, 10.0), DVec2::new(6.0, 2.0)];
    let options = SweepOptions::new(Bounds::from_size(20.0, 20.0));
    let diagram = generate_diagram(&sites, &options).unwrap();
    print_summary("below breakpoint", &diagram);

    assert_eq!(diagram.edges().len(), 3);
    for edge in diagram.edges() {
        let (start, end) = diagram.edge_segment(edge.id).unwrap();
        assert!((end - start).length() > 1.0, "{:?}-{:?}", edge.left, edge.right);
    }

    let interior: Vec<&Vertex> = diagram.interior_vertices().collect();
    assert_eq!(interior.len(), 1);
    assert!((interior[0].position - DVec2::new(6.0, 6.25)).length() < TOLERANCE);
    assert_eq!(interior[0].degree(), 3);
    for cell in diagram.cells() {
        assert_eq!(diagram.neighbors(cell.id).len(), 2);
    }
    assert_edges_between_nearest_sites("below breakpoint", &diagram);
}

#[test]
fn test_vertex_outside_frame() {
    // the circle through the three top sites is centered above the frame
    let sites = [
        DVec2::new(10.0, 19.9),
        DVec2::new(2.0, 19.0),
        DVec2::new(3.0, 18.5),
        DVec2::new(10.0, 5.0),
    ];
    let options = SweepOptions::new(Bounds::from_size(20.0, 20.0));
    let (diagram, stats) =
        generate_diagram_with_observer(&sites, &options, &mut OrderChecker::default()).unwrap();
    print_summary("vertex outside frame", &diagram);

    assert!(stats.cleanup.clipped_edges > 0);
    for vertex in diagram.vertices() {
        assert!(inside_frame(&diagram, vertex.position), "{:?}", vertex.position);
    }
    assert_edges_between_nearest_sites("vertex outside frame", &diagram);
}

#[test]
fn test_integer_sites() {
    let bounds = Bounds::from_size(20.0, 20.0);
    let options = SweepOptions::new(bounds);
    for seed in 0..5 {
        let sites: Vec<DVec2> = generate_sites(60, bounds, seed)
            .into_iter()
            .map(|p| p.floor())
            .collect();
        let diagram = generate_diagram(&sites, &options).unwrap();
        let name = format!("integer seed {}", seed);
        print_summary(&name, &diagram);

        assert_eq!(
            diagram.cells().len() + diagram.merged_sites().len(),
            sites.len()
        );
        for edge in diagram.edges() {
            let (start, end) = diagram.edge_segment(edge.id).unwrap();
            assert!((end - start).length() > TOLERANCE, "{}: zero-length edge", name);
        }
        for vertex in diagram.interior_vertices() {
            assert!(vertex.degree() >= 3, "{}: vertex {:?}", name, vertex.position);
        }
        assert_edges_between_nearest_sites(&name, &diagram);
    }
}

#[test]
fn test_breakpoints_stay_ordered() {
    for seed in [3, 17, 256] {
        let sites = random_sites(200, seed);
        let mut checker = OrderChecker::default();
        generate_diagram_with_observer(&sites, &random_options(), &mut checker).unwrap();
        assert!(checker.steps >= sites.len());
        assert!(
            checker.violations.is_empty(),
            "seed {}: {} unordered steps, first at y = {}",
            seed,
            checker.violations.len(),
            checker.violations[0].0
        );
    }
}

#[test]
fn test_grid_with_cocircular_sites() {
    let mut sites = Vec::new();
    for i in 0..6 {
        for j in 0..6 {
            sites.push(DVec2::new(100.0 + 150.0 * i as f64, 100.0 + 150.0 * j as f64));
        }
    }
    let diagram = generate_diagram(&sites, &random_options()).unwrap();
    print_summary("grid", &diagram);

    assert_eq!(diagram.cells().len(), 36);
    for edge in diagram.edges() {
        assert_ne!(edge.left, edge.right);
    }
    for vertex in diagram.vertices() {
        assert!(vertex.position.is_finite());
    }
    // an inner grid cell is bounded by its four axis neighbors only
    let inner = CellId(7);
    assert_eq!(
        diagram.neighbors(inner),
        vec![CellId(1), CellId(6), CellId(8), CellId(13)]
    );
    // four cells meet at each inner grid corner
    let corners: Vec<&Vertex> = diagram.interior_vertices().collect();
    assert_eq!(corners.len(), 25);
    for corner in corners {
        assert_eq!(corner.degree(), 4, "{:?}", corner.position);
    }
    assert_edges_between_nearest_sites("grid", &diagram);
}
