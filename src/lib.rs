pub mod algorithms;
pub mod driver;
pub mod errors;
pub mod grid;
pub mod mesh;
pub mod point;
pub mod serialization;
pub mod sources;

pub use algorithms::interpolation::{ScatterInterpolator, ScatterKernel};
pub use driver::{DriverOptions, IterationDriver, RunReport};
pub use errors::ScatterError;
pub use grid::{GridSpec, RunConfig};
pub use mesh::Mesh;
pub use point::Point;
