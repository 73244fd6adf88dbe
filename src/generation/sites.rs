//! Random Site Placement
//!
//! Uniform random sites inside a frame, reproducible from a seed.

use glam::DVec2;
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::geometry::Bounds;

/// Generate `count` sites uniformly distributed inside `bounds`
///
/// The same seed always yields the same sites.
///
/// # Example
///
/// ```rust
/// use rust_voronoi_map::generation::generate_sites;
/// use rust_voronoi_map::Bounds;
///
/// let bounds = Bounds::from_size(800.0, 600.0);
/// let sites = generate_sites(100, bounds, 42);
/// assert_eq!(sites.len(), 100);
/// assert!(sites.iter().all(|&s| bounds.contains(s)));
/// ```
pub fn generate_sites(count: usize, bounds: Bounds, seed: u64) -> Vec<DVec2> {
    if count == 0 {
        return Vec::new();
    }

    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut sites = Vec::with_capacity(count);

    for _ in 0..count {
        let u: f64 = rng.gen();
        let v: f64 = rng.gen();
        sites.push(DVec2::new(
            bounds.min.x + u * bounds.width(),
            bounds.min.y + v * bounds.height(),
        ));
    }

    sites
}
