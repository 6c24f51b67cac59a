//! Binary input format: a 16 byte header `[i32 NX][i32 NY][i32 NUM_Points][i32 Maxiter]`
//! followed by `Maxiter` blocks of `NUM_Points` records `(f64 x, f64 y)`.
//! Everything is native-endian without padding.

use std::io::{Read, Write};
use crate::errors::ScatterError;
use crate::grid::RunConfig;
use crate::point::Point;
use super::PointSource;

pub const HEADER_BYTES: usize = 4 * std::mem::size_of::<i32>();

///
/// Sequential reader over an input stream. The header has been consumed by
/// the time the stream exists, so the reader is positioned at the first point block.
///
pub struct BinaryPointStream<R: Read>
{
    reader: R,
    config: RunConfig,
}

impl<R: Read> BinaryPointStream<R>
{
    ///
    /// Reads and validates the header.
    ///
    pub fn open_header(mut reader: R) -> Result<Self, ScatterError>
    {
        let mut header = [0_i32; 4];
        reader.read_exact(bytemuck::cast_slice_mut(&mut header)).map_err(|source|ScatterError::HeaderRead { source })?;
        let config = RunConfig::from_header(header)?;
        Ok(Self { reader, config })
    }

    pub fn config(&self) -> &RunConfig
    {
        &self.config
    }

    ///
    /// Reads `points.len()` records in place. A truncated block is an error;
    /// the contents of `points` are unspecified afterwards.
    ///
    pub fn read_iteration(&mut self, iteration: usize, points: &mut [Point]) -> Result<(), ScatterError>
    {
        self.reader.read_exact(bytemuck::cast_slice_mut(points)).map_err(|source|ScatterError::ShortRead { iteration, source })
    }

    pub fn into_inner(self) -> R
    {
        self.reader
    }
}

impl<R: Read> PointSource for BinaryPointStream<R>
{
    fn fill_batch(&mut self, iteration: usize, points: &mut [Point]) -> Result<(), ScatterError>
    {
        self.read_iteration(iteration, points)
    }
}

///
/// Fails with `InvalidInput` if a count does not fit the header's `i32` fields.
///
pub fn write_header<W: Write>(mut writer: W, config: &RunConfig) -> std::io::Result<()>
{
    let header = config.to_header().map_err(|err|std::io::Error::new(std::io::ErrorKind::InvalidInput, err))?;
    writer.write_all(bytemuck::cast_slice(&header))
}

pub fn write_points<W: Write>(mut writer: W, points: &[Point]) -> std::io::Result<()>
{
    writer.write_all(bytemuck::cast_slice(points))
}
