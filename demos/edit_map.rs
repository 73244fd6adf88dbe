//! Demonstration of interactive editing with VoronoiMap

use rust_voronoi_map::*;

fn describe(map: &VoronoiMap) {
    println!(
        "  {} sites, {} cells, {} edges",
        map.sites().len(),
        map.cell_count(),
        map.diagram().edges().len()
    );
}

fn main() -> Result<()> {
    let config = MapConfigBuilder::new()
        .seed(7)
        .cell_count(20)
        .size(100.0, 100.0)?
        .build()?;

    let mut map = VoronoiMap::generate(config)?;
    println!("Generated map:");
    describe(&map);

    let index = map.add_site(DVec2::new(50.0, 50.0))?;
    println!("\nAdded site {} at the center:", index);
    describe(&map);

    map.move_site(index, DVec2::new(25.0, 75.0))?;
    println!("\nMoved site {} to (25, 75):", index);
    describe(&map);

    let removed = map.remove_site(0)?;
    println!("\nRemoved site 0 at ({:.2}, {:.2}):", removed.x, removed.y);
    describe(&map);

    // Duplicates are merged by default
    let duplicate = map.sites()[3];
    map.add_site(duplicate)?;
    println!("\nAdded a duplicate of site 3:");
    describe(&map);
    println!("  Merged: {:?}", map.diagram().merged_sites());

    #[cfg(feature = "spatial-index")]
    {
        let pos = DVec2::new(60.0, 40.0);
        if let Some(cell_id) = map.find_cell_at(pos) {
            println!("\nPosition {:?} is in cell {}", pos, cell_id.index());

            let neighbors = map.get_neighbors(cell_id);
            println!("Cell {} has {} neighbors: {:?}", cell_id.index(), neighbors.len(), neighbors);

            let nearby = map.find_cells_within_radius(cell_id, 2);
            println!("{} cells within 2 hops", nearby.len());
        }
    }

    Ok(())
}

