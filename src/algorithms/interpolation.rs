use crate::grid::GridSpec;
use crate::mesh::Mesh;
use crate::point::Point;

/// Points ahead of the current block whose records are prefetched (16 points = 256 bytes).
pub const PREFETCH_DISTANCE: usize = 16;

///
/// Loop strategy used to scatter a batch. Both variants apply the same
/// per-point weights and produce the same mesh up to the order in which
/// contributions to a shared node are summed.
///
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum ScatterKernel
{
    /// One point at a time.
    Scalar,
    /// Four points per step with corner writes interleaved across the four
    /// points and software prefetch of upcoming point records on x86_64.
    #[default]
    Unrolled,
}

/// Base node and the four bilinear weights of one point.
#[derive(Copy, Clone, Debug, PartialEq)]
struct Deposit
{
    base: usize,
    w00: f64,
    w10: f64,
    w01: f64,
    w11: f64,
}

/// Grid constants hoisted out of the point loop.
#[derive(Copy, Clone)]
struct CellGeometry
{
    dx: f64,
    dy: f64,
    inv_dx: f64,
    inv_dy: f64,
    max_ix: i64,
    max_iy: i64,
    grid_x: usize,
}

impl CellGeometry
{
    fn new(grid: &GridSpec) -> Self
    {
        Self
        {
            dx: grid.dx(),
            dy: grid.dy(),
            inv_dx: 1.0 / grid.dx(),
            inv_dy: 1.0 / grid.dy(),
            max_ix: grid.nx() as i64 - 1,
            max_iy: grid.ny() as i64 - 1,
            grid_x: grid.grid_x(),
        }
    }

    ///
    /// Cell indices truncate toward zero and are clamped to the valid cell
    /// range on both sides, so points on or outside the domain boundary land
    /// in the nearest edge cell.
    ///
    #[inline(always)]
    fn deposit(&self, point: &Point) -> Deposit
    {
        let ix = ((point.x * self.inv_dx) as i64).clamp(0, self.max_ix);
        let iy = ((point.y * self.inv_dy) as i64).clamp(0, self.max_iy);

        let lx = point.x - ix as f64 * self.dx;
        let ly = point.y - iy as f64 * self.dy;
        let rx = self.dx - lx;
        let ry = self.dy - ly;

        Deposit
        {
            base: iy as usize * self.grid_x + ix as usize,
            w00: rx * ry,
            w10: lx * ry,
            w01: rx * ly,
            w11: lx * ly,
        }
    }
}

///
/// Scatters unit point masses onto the nodes of their enclosing cells with
/// bilinear area weights. Contributions are added to the mesh, never assigned.
///
#[derive(Copy, Clone, Debug, Default)]
pub struct ScatterInterpolator
{
    kernel: ScatterKernel,
}

impl ScatterInterpolator
{
    pub fn new(kernel: ScatterKernel) -> Self
    {
        Self { kernel }
    }

    pub fn kernel(&self) -> ScatterKernel
    {
        self.kernel
    }

    pub fn accumulate(&self, points: &[Point], mesh: &mut Mesh)
    {
        let geometry = CellGeometry::new(mesh.grid());
        let values = mesh.values_mut();
        match self.kernel
        {
            ScatterKernel::Scalar => scatter_scalar(&geometry, points, values),
            ScatterKernel::Unrolled => scatter_unrolled(&geometry, points, values),
        }
    }
}

#[inline(always)]
fn scatter_point(geometry: &CellGeometry, point: &Point, values: &mut [f64])
{
    let d = geometry.deposit(point);
    let above = d.base + geometry.grid_x;
    values[d.base] += d.w00;
    values[d.base + 1] += d.w10;
    values[above] += d.w01;
    values[above + 1] += d.w11;
}

fn scatter_scalar(geometry: &CellGeometry, points: &[Point], values: &mut [f64])
{
    for point in points
    {
        scatter_point(geometry, point, values);
    }
}

fn scatter_unrolled(geometry: &CellGeometry, points: &[Point], values: &mut [f64])
{
    let grid_x = geometry.grid_x;
    let mut blocks = points.chunks_exact(4);
    for (block, quad) in blocks.by_ref().enumerate()
    {
        prefetch_points(points, block * 4 + PREFETCH_DISTANCE);

        let d0 = geometry.deposit(&quad[0]);
        let d1 = geometry.deposit(&quad[1]);
        let d2 = geometry.deposit(&quad[2]);
        let d3 = geometry.deposit(&quad[3]);

        // consecutive stores go to different points' cells
        values[d0.base] += d0.w00;
        values[d1.base] += d1.w00;
        values[d2.base] += d2.w00;
        values[d3.base] += d3.w00;

        values[d0.base + 1] += d0.w10;
        values[d1.base + 1] += d1.w10;
        values[d2.base + 1] += d2.w10;
        values[d3.base + 1] += d3.w10;

        values[d0.base + grid_x] += d0.w01;
        values[d1.base + grid_x] += d1.w01;
        values[d2.base + grid_x] += d2.w01;
        values[d3.base + grid_x] += d3.w01;

        values[d0.base + grid_x + 1] += d0.w11;
        values[d1.base + grid_x + 1] += d1.w11;
        values[d2.base + grid_x + 1] += d2.w11;
        values[d3.base + grid_x + 1] += d3.w11;
    }

    for point in blocks.remainder()
    {
        scatter_point(geometry, point, values);
    }
}

#[cfg(target_arch = "x86_64")]
#[inline(always)]
fn prefetch_points(points: &[Point], start: usize)
{
    use std::arch::x86_64::{_mm_prefetch, _MM_HINT_T0};
    if let Some(ahead) = points.get(start..start + 4)
    {
        // SAFETY: prefetch is a hint and never dereferences; both pointers come from live references.
        unsafe
        {
            _mm_prefetch::<_MM_HINT_T0>((&ahead[0] as *const Point).cast::<i8>());
            _mm_prefetch::<_MM_HINT_T0>((&ahead[2] as *const Point).cast::<i8>());
        }
    }
}

#[cfg(not(target_arch = "x86_64"))]
#[inline(always)]
fn prefetch_points(_points: &[Point], _start: usize) {}
