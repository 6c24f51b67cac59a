use serde::{Deserialize, Serialize};
use crate::errors::ScatterError;

///
/// Uniform structured grid over the unit square with `nx * ny` cells and
/// `(nx + 1) * (ny + 1)` nodes. Serialized as the cell counts only; the
/// spacing is derived again on load.
///
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawGridSpec", into = "RawGridSpec")]
pub struct GridSpec
{
    nx: usize,
    ny: usize,
    dx: f64,
    dy: f64,
}

impl GridSpec
{
    pub fn new(nx: usize, ny: usize) -> Result<Self, ScatterError>
    {
        if nx == 0
        {
            return Err(ScatterError::InvalidHeader { field: "NX", value: 0 });
        }
        if ny == 0
        {
            return Err(ScatterError::InvalidHeader { field: "NY", value: 0 });
        }
        Ok(Self { nx, ny, dx: 1.0 / nx as f64, dy: 1.0 / ny as f64 })
    }

    /// Number of cells in x.
    #[inline]
    pub fn nx(&self) -> usize
    {
        self.nx
    }

    /// Number of cells in y.
    #[inline]
    pub fn ny(&self) -> usize
    {
        self.ny
    }

    /// Number of nodes in x (`GRID_X`).
    #[inline]
    pub fn grid_x(&self) -> usize
    {
        self.nx + 1
    }

    /// Number of nodes in y (`GRID_Y`).
    #[inline]
    pub fn grid_y(&self) -> usize
    {
        self.ny + 1
    }

    #[inline]
    pub fn dx(&self) -> f64
    {
        self.dx
    }

    #[inline]
    pub fn dy(&self) -> f64
    {
        self.dy
    }

    /// Area of one cell; also the mass a single point deposits.
    #[inline]
    pub fn cell_area(&self) -> f64
    {
        self.dx * self.dy
    }

    ///
    /// Total node count, `None` if it does not fit in `usize`.
    ///
    pub fn num_nodes(&self) -> Option<usize>
    {
        self.grid_x().checked_mul(self.grid_y())
    }

    /// Flattened row-major index of node `(i, j)`.
    #[inline]
    pub fn node_index(&self, i: usize, j: usize) -> usize
    {
        debug_assert!(i < self.grid_x() && j < self.grid_y());
        j * self.grid_x() + i
    }
}

#[derive(Copy, Clone, Serialize, Deserialize)]
struct RawGridSpec
{
    nx: usize,
    ny: usize,
}

impl TryFrom<RawGridSpec> for GridSpec
{
    type Error = ScatterError;

    fn try_from(raw: RawGridSpec) -> Result<Self, Self::Error>
    {
        GridSpec::new(raw.nx, raw.ny)
    }
}

impl From<GridSpec> for RawGridSpec
{
    fn from(grid: GridSpec) -> Self
    {
        Self { nx: grid.nx, ny: grid.ny }
    }
}

///
/// Run parameters as stored in the input file header.
///
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RunConfig
{
    pub grid: GridSpec,
    pub num_points: usize,
    pub max_iter: usize,
}

impl RunConfig
{
    ///
    /// Validates the raw header fields `(NX, NY, NUM_Points, Maxiter)`.
    ///
    pub fn from_header(header: [i32; 4]) -> Result<Self, ScatterError>
    {
        let [nx, ny, num_points, max_iter] = header;
        let positive = |field: &'static str, value: i32| -> Result<usize, ScatterError>
        {
            if value < 1
            {
                return Err(ScatterError::InvalidHeader { field, value: value.into() });
            }
            Ok(value as usize)
        };
        let non_negative = |field: &'static str, value: i32| -> Result<usize, ScatterError>
        {
            usize::try_from(value).map_err(|_|ScatterError::InvalidHeader { field, value: value.into() })
        };
        let grid = GridSpec::new(positive("NX", nx)?, positive("NY", ny)?)?;
        Ok(Self { grid, num_points: non_negative("NUM_Points", num_points)?, max_iter: non_negative("Maxiter", max_iter)? })
    }

    ///
    /// Header fields in file order. Counts that do not fit the file's `i32`
    /// fields are rejected.
    ///
    pub fn to_header(&self) -> Result<[i32; 4], ScatterError>
    {
        let field = |field: &'static str, value: usize| -> Result<i32, ScatterError>
        {
            i32::try_from(value).map_err(|_|ScatterError::InvalidHeader { field, value: i64::try_from(value).unwrap_or(i64::MAX) })
        };
        Ok([
            field("NX", self.grid.nx())?,
            field("NY", self.grid.ny())?,
            field("NUM_Points", self.num_points)?,
            field("Maxiter", self.max_iter)?,
        ])
    }
}
