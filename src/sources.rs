pub mod binary;
pub mod random;

use crate::errors::ScatterError;
use crate::point::Point;

///
/// Supplies one batch of points per iteration. Sources are consumed strictly
/// forward; `iteration` is only used for error reporting.
///
pub trait PointSource
{
    fn fill_batch(&mut self, iteration: usize, points: &mut [Point]) -> Result<(), ScatterError>;
}

///
/// Allocates the per-iteration point buffer, reporting failure as `Allocation`.
///
pub fn allocate_points(len: usize) -> Result<Vec<Point>, ScatterError>
{
    let mut points = Vec::new();
    points.try_reserve_exact(len).map_err(|_|ScatterError::Allocation { what: "point", len })?;
    points.resize(len, Point::default());
    Ok(points)
}
