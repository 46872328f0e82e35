//! Run-length encoded region map over the galactic X/Z plane.

use galaxy_router_spatial::Point3;

use super::galaxy::{GALAXY_ORIGIN, REGION_CELLS_PER_LY, REGION_GRID_SIDE};
use crate::errors::{ErrorKind, RouterError, RouterResult};

/// Index into [`RegionTable::names`]. Region `0` marks unmapped cells.
pub type RegionId = u16;

/// Region id of cells that belong to no named region.
pub const UNMAPPED_REGION: RegionId = 0;

/// `length` consecutive grid cells owned by `region`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RegionRun {
    pub length: u32,
    pub region: RegionId,
}

impl RegionRun {
    pub fn new(length: u32, region: RegionId) -> Self {
        RegionRun { length, region }
    }
}

impl From<(u32, RegionId)> for RegionRun {
    fn from((length, region): (u32, RegionId)) -> Self {
        RegionRun { length, region }
    }
}

/// Square grid projecting points onto map cells.
///
/// A point maps to column `floor((x - origin_x) · cells_per_ly)` and row
/// `floor((z - origin_z) · cells_per_ly)`; the flattened cell index is
/// `row · cells_per_side + column`. The y coordinate is ignored.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RegionGrid {
    cells_per_side: u32,
    origin_x: f64,
    origin_z: f64,
    cells_per_ly: f64,
}

impl Default for RegionGrid {
    fn default() -> Self {
        Self::galactic()
    }
}

impl RegionGrid {
    /// The 2048 × 2048 grid used by the community region map.
    pub fn galactic() -> Self {
        RegionGrid {
            cells_per_side: REGION_GRID_SIDE,
            origin_x: GALAXY_ORIGIN.x,
            origin_z: GALAXY_ORIGIN.z,
            cells_per_ly: REGION_CELLS_PER_LY,
        }
    }

    /// Creates a custom grid.
    ///
    /// # Errors
    ///
    /// [`ErrorKind::InvalidArgument`] for an empty grid, a non-finite origin
    /// or a scale that is not a positive finite number.
    pub fn new(
        cells_per_side: u32,
        origin_x: f64,
        origin_z: f64,
        cells_per_ly: f64,
    ) -> RouterResult<Self> {
        if cells_per_side == 0 {
            return Err(RouterError::new(
                "region grid needs at least one cell per side",
                ErrorKind::InvalidArgument,
            ));
        }
        if !origin_x.is_finite() || !origin_z.is_finite() {
            return Err(RouterError::new(
                "region grid origin must be finite",
                ErrorKind::InvalidArgument,
            ));
        }
        if !(cells_per_ly.is_finite() && cells_per_ly > 0.0) {
            return Err(RouterError::new(
                &format!("invalid region grid scale {}", cells_per_ly),
                ErrorKind::InvalidArgument,
            ));
        }
        Ok(RegionGrid {
            cells_per_side,
            origin_x,
            origin_z,
            cells_per_ly,
        })
    }

    pub fn cells_per_side(&self) -> u32 {
        self.cells_per_side
    }

    /// Total number of cells in the grid.
    pub fn cell_count(&self) -> u64 {
        u64::from(self.cells_per_side) * u64::from(self.cells_per_side)
    }

    /// `(column, row)` of the cell containing `point`, or `None` if the
    /// point projects outside the grid.
    pub fn cell_of(&self, point: &Point3) -> Option<(u32, u32)> {
        let column = self.axis_cell(point.x, self.origin_x)?;
        let row = self.axis_cell(point.z, self.origin_z)?;
        Some((column, row))
    }

    /// Flattened index of the cell containing `point`.
    pub fn cell_index(&self, point: &Point3) -> Option<u64> {
        self.cell_of(point)
            .map(|(column, row)| u64::from(row) * u64::from(self.cells_per_side) + u64::from(column))
    }

    fn axis_cell(&self, coord: f64, origin: f64) -> Option<u32> {
        let cell = ((coord - origin) * self.cells_per_ly).floor();
        if cell.is_finite() && cell >= 0.0 && cell < f64::from(self.cells_per_side) {
            Some(cell as u32)
        } else {
            None
        }
    }
}

/// A named region returned by a lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Region<'a> {
    pub id: RegionId,
    pub name: &'a str,
}

/// Region names plus the run-length encoded cell ownership of a grid.
///
/// Run start offsets are prefix-summed once at construction, so a lookup is
/// a binary search over runs rather than a walk over cells.
///
/// # Examples
///
/// ```rust
/// use galaxy_router::codec::{RegionGrid, RegionRun, RegionTable};
/// use galaxy_router_spatial::Point3;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// // 2 x 2 cells, one light year each
/// let grid = RegionGrid::new(2, 0.0, 0.0, 1.0)?;
/// let table = RegionTable::with_grid(
///     grid,
///     vec!["".into(), "Inner Orion Spur".into()],
///     vec![RegionRun::new(1, 0), RegionRun::new(3, 1)],
/// )?;
///
/// assert!(table.region_at(&Point3::new(0.5, 0.0, 0.5))?.is_none());
/// let region = table.region_at(&Point3::new(1.5, 0.0, 0.5))?.unwrap();
/// assert_eq!(region.name, "Inner Orion Spur");
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "RegionTableData", into = "RegionTableData")
)]
pub struct RegionTable {
    grid: RegionGrid,
    names: Vec<String>,
    runs: Vec<RegionRun>,
    // exclusive end offset of each run
    run_ends: Vec<u64>,
}

impl RegionTable {
    /// Creates a table over the galactic grid.
    pub fn new(names: Vec<String>, runs: Vec<RegionRun>) -> RouterResult<Self> {
        Self::with_grid(RegionGrid::galactic(), names, runs)
    }

    /// Creates a table over a custom grid.
    ///
    /// The runs are not required to cover the grid exactly here; a table
    /// that does not is reported by [`RegionTable::validate_coverage`] and
    /// refused by [`RegionTable::region_at`].
    ///
    /// # Errors
    ///
    /// [`ErrorKind::MalformedTable`] if a run names a region id with no
    /// entry in `names`.
    pub fn with_grid(
        grid: RegionGrid,
        names: Vec<String>,
        runs: Vec<RegionRun>,
    ) -> RouterResult<Self> {
        let mut run_ends = Vec::with_capacity(runs.len());
        let mut covered = 0u64;
        for (i, run) in runs.iter().enumerate() {
            if usize::from(run.region) >= names.len() && run.region != UNMAPPED_REGION {
                return Err(RouterError::new(
                    &format!(
                        "run {} references region {} but only {} names are defined",
                        i,
                        run.region,
                        names.len()
                    ),
                    ErrorKind::MalformedTable,
                ));
            }
            covered += u64::from(run.length);
            run_ends.push(covered);
        }

        log::debug!(
            "Region table: {} regions, {} runs covering {} of {} cells",
            names.len(),
            runs.len(),
            covered,
            grid.cell_count()
        );
        Ok(RegionTable {
            grid,
            names,
            runs,
            run_ends,
        })
    }

    /// Builds a galactic table from one run list per grid row, the layout of
    /// the community region map.
    ///
    /// # Errors
    ///
    /// [`ErrorKind::MalformedTable`] if the row count or any row's total
    /// length differs from the grid side.
    pub fn from_rows(names: Vec<String>, rows: Vec<Vec<RegionRun>>) -> RouterResult<Self> {
        Self::from_rows_with_grid(RegionGrid::galactic(), names, rows)
    }

    /// [`RegionTable::from_rows`] over a custom grid.
    pub fn from_rows_with_grid(
        grid: RegionGrid,
        names: Vec<String>,
        rows: Vec<Vec<RegionRun>>,
    ) -> RouterResult<Self> {
        let side = u64::from(grid.cells_per_side());
        if rows.len() as u64 != side {
            return Err(RouterError::new(
                &format!("region map has {} rows, grid needs {}", rows.len(), side),
                ErrorKind::MalformedTable,
            ));
        }
        for (row, runs) in rows.iter().enumerate() {
            let width: u64 = runs.iter().map(|run| u64::from(run.length)).sum();
            if width != side {
                return Err(RouterError::new(
                    &format!("region map row {} spans {} cells, expected {}", row, width, side),
                    ErrorKind::MalformedTable,
                ));
            }
        }
        Self::with_grid(grid, names, rows.into_iter().flatten().collect())
    }

    pub fn grid(&self) -> &RegionGrid {
        &self.grid
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn runs(&self) -> &[RegionRun] {
        &self.runs
    }

    /// Name of region `id`, if defined.
    pub fn region_name(&self, id: RegionId) -> Option<&str> {
        self.names.get(usize::from(id)).map(String::as_str)
    }

    /// Sum of all run lengths.
    pub fn covered_cells(&self) -> u64 {
        self.run_ends.last().copied().unwrap_or(0)
    }

    /// Whether the runs cover every grid cell exactly once.
    pub fn covers_grid(&self) -> bool {
        self.covered_cells() == self.grid.cell_count()
    }

    /// Fails with [`ErrorKind::MalformedTable`] unless the runs cover the
    /// grid exactly.
    pub fn validate_coverage(&self) -> RouterResult<()> {
        if self.covers_grid() {
            Ok(())
        } else {
            Err(RouterError::new(
                &format!(
                    "region runs cover {} cells but the grid has {}",
                    self.covered_cells(),
                    self.grid.cell_count()
                ),
                ErrorKind::MalformedTable,
            ))
        }
    }

    /// Position of the run containing cell `index`.
    ///
    /// # Errors
    ///
    /// [`ErrorKind::MalformedTable`] if `index` lies past the last run.
    pub fn owning_run(&self, index: u64) -> RouterResult<usize> {
        let run = self.run_ends.partition_point(|&end| end <= index);
        if run == self.runs.len() {
            return Err(RouterError::new(
                &format!(
                    "cell {} lies beyond the {} cells covered by the region table",
                    index,
                    self.covered_cells()
                ),
                ErrorKind::MalformedTable,
            ));
        }
        Ok(run)
    }

    /// Region owning cell `index`; `None` for an unmapped cell.
    pub fn lookup_cell(&self, index: u64) -> RouterResult<Option<Region<'_>>> {
        let run = self.runs[self.owning_run(index)?];
        if run.region == UNMAPPED_REGION {
            return Ok(None);
        }
        match self.region_name(run.region) {
            Some(name) => Ok(Some(Region {
                id: run.region,
                name,
            })),
            None => Err(RouterError::new(
                &format!("region {} has no name", run.region),
                ErrorKind::MalformedTable,
            )),
        }
    }

    /// Region containing `point`.
    ///
    /// Returns `Ok(None)` when the point falls in an unmapped cell or
    /// outside the grid.
    ///
    /// # Errors
    ///
    /// - [`ErrorKind::InvalidArgument`] for non-finite coordinates
    /// - [`ErrorKind::MalformedTable`] if the runs do not cover the grid
    pub fn region_at(&self, point: &Point3) -> RouterResult<Option<Region<'_>>> {
        if !point.is_finite() {
            return Err(RouterError::new(
                &format!("non-finite point {}", point),
                ErrorKind::InvalidArgument,
            ));
        }
        self.validate_coverage()?;
        match self.grid.cell_index(point) {
            Some(index) => self.lookup_cell(index),
            None => Ok(None),
        }
    }
}

#[cfg(feature = "serde")]
#[derive(serde::Serialize, serde::Deserialize)]
struct RegionTableData {
    grid: RegionGrid,
    names: Vec<String>,
    runs: Vec<RegionRun>,
}

#[cfg(feature = "serde")]
impl TryFrom<RegionTableData> for RegionTable {
    type Error = RouterError;

    fn try_from(data: RegionTableData) -> Result<Self, Self::Error> {
        RegionTable::with_grid(data.grid, data.names, data.runs)
    }
}

#[cfg(feature = "serde")]
impl From<RegionTable> for RegionTableData {
    fn from(table: RegionTable) -> Self {
        RegionTableData {
            grid: table.grid,
            names: table.names,
            runs: table.runs,
        }
    }
}
