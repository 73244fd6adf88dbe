//! VoronoiMap main structure

use glam::DVec2;

use crate::config::MapConfig;
use crate::diagram::{Cell, CellId, Diagram};
use crate::error::{Result, VoronoiError};
use crate::generation::{generate_diagram, generate_sites};

#[cfg(feature = "spatial-index")]
use crate::spatial::SpatialIndex;

/// An editable set of sites together with their Voronoi diagram
///
/// Every edit recomputes the whole diagram. A failed edit leaves the map
/// unchanged.
///
/// # Examples
///
/// ```
/// use rust_voronoi_map::*;
///
/// let config = MapConfigBuilder::new()
///     .seed(42)
///     .cell_count(50)
///     .build()
///     .unwrap();
///
/// let mut map = VoronoiMap::generate(config).unwrap();
/// assert_eq!(map.cell_count(), 50);
///
/// map.add_site(DVec2::new(500.0, 500.0)).unwrap();
/// assert_eq!(map.cell_count(), 51);
/// ```
#[derive(Clone)]
pub struct VoronoiMap {
    /// Configuration the map was created with
    config: MapConfig,

    /// Input sites in insertion order
    sites: Vec<DVec2>,

    /// Diagram of `sites`
    diagram: Diagram,

    /// Neighbor lists indexed by cell ID
    neighbors: Vec<Vec<CellId>>,

    /// Spatial index over cell sites (optional, requires spatial-index feature)
    #[cfg(feature = "spatial-index")]
    spatial_index: SpatialIndex,
}

impl VoronoiMap {
    /// Generate a map from `config.cell_count` random sites
    ///
    /// # Example
    ///
    /// ```
    /// use rust_voronoi_map::*;
    ///
    /// let map = VoronoiMap::generate(MapConfig::default()).unwrap();
    /// assert_eq!(map.cell_count(), 100);
    /// ```
    pub fn generate(config: MapConfig) -> Result<Self> {
        let sites = generate_sites(config.cell_count, config.bounds(), config.seed);
        Self::from_sites(config, sites)
    }

    /// Build a map from explicit sites
    ///
    /// The frame and duplicate policy come from `config`; its seed and
    /// cell count are not used.
    pub fn from_sites(config: MapConfig, sites: Vec<DVec2>) -> Result<Self> {
        let diagram = generate_diagram(&sites, &config.sweep_options())?;
        let neighbors = diagram
            .cells()
            .iter()
            .map(|cell| diagram.neighbors(cell.id))
            .collect();

        #[cfg(feature = "spatial-index")]
        let spatial_index = {
            let centers: Vec<DVec2> = diagram.cells().iter().map(|c| c.site).collect();
            SpatialIndex::new(&centers)
        };

        log::debug!(
            "map with {} sites: {} cells, {} edges",
            sites.len(),
            diagram.cells().len(),
            diagram.edges().len()
        );

        Ok(Self {
            config,
            sites,
            diagram,
            neighbors,
            #[cfg(feature = "spatial-index")]
            spatial_index,
        })
    }

    fn replace_sites(&mut self, sites: Vec<DVec2>) -> Result<()> {
        *self = Self::from_sites(self.config, sites)?;
        Ok(())
    }

    fn check_index(&self, index: usize) -> Result<()> {
        if index >= self.sites.len() {
            return Err(VoronoiError::CellNotFound(index));
        }
        Ok(())
    }

    /// Recompute the diagram from the current sites
    pub fn regenerate(&mut self) -> Result<()> {
        self.replace_sites(self.sites.clone())
    }

    /// Append a site and return its input index
    pub fn add_site(&mut self, site: DVec2) -> Result<usize> {
        let mut sites = self.sites.clone();
        sites.push(site);
        self.replace_sites(sites)?;
        Ok(self.sites.len() - 1)
    }

    /// Move the site at input index `index`
    ///
    /// # Errors
    ///
    /// Returns `CellNotFound` if `index` is out of range
    pub fn move_site(&mut self, index: usize, position: DVec2) -> Result<()> {
        self.check_index(index)?;
        let mut sites = self.sites.clone();
        sites[index] = position;
        self.replace_sites(sites)
    }

    /// Remove the site at input index `index` and return its position
    ///
    /// Later sites shift down by one index.
    ///
    /// # Errors
    ///
    /// Returns `CellNotFound` if `index` is out of range
    pub fn remove_site(&mut self, index: usize) -> Result<DVec2> {
        self.check_index(index)?;
        let mut sites = self.sites.clone();
        let removed = sites.remove(index);
        self.replace_sites(sites)?;
        Ok(removed)
    }

    /// Replace all sites
    pub fn set_sites(&mut self, sites: Vec<DVec2>) -> Result<()> {
        self.replace_sites(sites)
    }

    #[inline]
    pub fn config(&self) -> &MapConfig {
        &self.config
    }

    /// Input sites, including any merged duplicates
    #[inline]
    pub fn sites(&self) -> &[DVec2] {
        &self.sites
    }

    #[inline]
    pub fn diagram(&self) -> &Diagram {
        &self.diagram
    }

    /// Number of cells (input sites minus merged duplicates)
    #[inline]
    pub fn cell_count(&self) -> usize {
        self.diagram.cells().len()
    }

    /// Get a cell by ID
    ///
    /// Returns `None` if the cell ID is out of bounds.
    #[inline]
    pub fn get_cell(&self, id: CellId) -> Option<&Cell> {
        self.diagram.cell(id)
    }

    /// Get neighbor IDs for a cell
    ///
    /// Returns empty slice if cell ID is invalid.
    pub fn get_neighbors(&self, id: CellId) -> &[CellId] {
        self.neighbors
            .get(id.0)
            .map(|n| n.as_slice())
            .unwrap_or(&[])
    }

    /// Find the cell containing a position (requires spatial-index feature)
    ///
    /// Returns `None` for a map without cells.
    ///
    /// # Example
    ///
    /// ```
    /// # use rust_voronoi_map::*;
    /// # #[cfg(feature = "spatial-index")]
    /// # {
    /// let sites = vec![DVec2::new(100.0, 100.0), DVec2::new(900.0, 900.0)];
    /// let map = VoronoiMap::from_sites(MapConfig::default(), sites).unwrap();
    /// assert_eq!(map.find_cell_at(DVec2::new(200.0, 50.0)), Some(CellId(0)));
    /// # }
    /// ```
    #[cfg(feature = "spatial-index")]
    pub fn find_cell_at(&self, position: DVec2) -> Option<CellId> {
        self.spatial_index.find_nearest(position).map(CellId)
    }

    /// Find cells within a given hop count from a center cell (BFS)
    ///
    /// Includes the center cell. Returns an empty vec if `center` is invalid.
    pub fn find_cells_within_radius(&self, center: CellId, hops: usize) -> Vec<CellId> {
        if center.0 >= self.neighbors.len() {
            return vec![];
        }

        let mut visited = std::collections::HashSet::new();
        let mut current = vec![center];
        visited.insert(center);

        for _ in 0..hops {
            let mut next = Vec::new();
            for &cell in &current {
                for &neighbor in self.get_neighbors(cell) {
                    if visited.insert(neighbor) {
                        next.push(neighbor);
                    }
                }
            }
            current = next;
        }

        let mut cells: Vec<CellId> = visited.into_iter().collect();
        cells.sort();
        cells
    }
}
