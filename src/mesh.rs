use std::io::Write;
use std::path::Path;
use serde::{Deserialize, Serialize};
use crate::errors::ScatterError;
use crate::grid::GridSpec;
use crate::serialization::{self, SerializationFormat};

///
/// Scalar field over the nodes of a `GridSpec`, stored row-major:
/// node `(i, j)` lives at `j * GRID_X + i`.
///
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Mesh
{
    grid: GridSpec,
    values: Vec<f64>,
}

impl Mesh
{
    ///
    /// Allocates a zeroed mesh for `grid`. Fails with `Allocation` instead of
    /// aborting when the node count overflows or memory cannot be reserved.
    ///
    pub fn new(grid: GridSpec) -> Result<Self, ScatterError>
    {
        let len = grid.num_nodes().ok_or(ScatterError::Allocation { what: "mesh", len: usize::MAX })?;
        let mut values = Vec::new();
        values.try_reserve_exact(len).map_err(|_|ScatterError::Allocation { what: "mesh", len })?;
        values.resize(len, 0.0);
        Ok(Self { grid, values })
    }

    #[inline]
    pub fn grid(&self) -> &GridSpec
    {
        &self.grid
    }

    #[inline]
    pub fn values(&self) -> &[f64]
    {
        &self.values
    }

    #[inline]
    pub fn values_mut(&mut self) -> &mut [f64]
    {
        &mut self.values
    }

    #[inline]
    pub fn get(&self, i: usize, j: usize) -> f64
    {
        self.values[self.grid.node_index(i, j)]
    }

    /// Zeroes every node.
    pub fn reset(&mut self)
    {
        self.values.fill(0.0);
    }

    pub fn total_mass(&self) -> f64
    {
        self.values.iter().sum()
    }

    ///
    /// Writes one text line per mesh row `j = 0..GRID_Y`, each holding the
    /// row's `GRID_X` values separated by single spaces with 6 fractional digits.
    ///
    pub fn serialize<W: Write>(&self, sink: W) -> std::io::Result<()>
    {
        let mut sink = std::io::BufWriter::new(sink);
        for row in self.values.chunks_exact(self.grid.grid_x())
        {
            for (i, value) in row.iter().enumerate()
            {
                if i > 0
                {
                    sink.write_all(b" ")?;
                }
                write!(sink, "{value:.6}")?;
            }
            sink.write_all(b"\n")?;
        }
        sink.flush()
    }

    ///
    /// Creates (or truncates) `path` and writes the text grid into it.
    ///
    pub fn write_text<P: AsRef<Path>>(&self, path: P) -> Result<(), ScatterError>
    {
        let path = path.as_ref();
        let output_error = |source|ScatterError::OutputWrite { path: path.to_path_buf(), source };
        let file = std::fs::File::create(path).map_err(output_error)?;
        self.serialize(file).map_err(output_error)
    }

    ///
    /// Saves the mesh and its grid geometry as an LZ4 compressed binary snapshot.
    ///
    pub fn save_snapshot<P: AsRef<Path>>(&self, path: P) -> Result<(), ScatterError>
    {
        let path = path.as_ref();
        let output_error = |source|ScatterError::OutputWrite { path: path.to_path_buf(), source };
        let buffer = self.write_buffer(SerializationFormat::default())?;
        let mut file = std::io::BufWriter::new(std::fs::File::create(path).map_err(output_error)?);
        file.write_all(&buffer).map_err(output_error)?;
        file.flush().map_err(output_error)
    }

    pub fn write_buffer(&self, format: SerializationFormat) -> Result<Vec<u8>, ScatterError>
    {
        serialization::serialize(self, format)
    }

    ///
    /// Reads a snapshot produced by `write_buffer`. The value count must match
    /// the stored grid.
    ///
    pub fn read_buffer(buffer: &[u8], format: SerializationFormat) -> Result<Self, ScatterError>
    {
        let mesh: Self = serialization::deserialize(buffer, format)?;
        let expected = mesh.grid.num_nodes().ok_or(ScatterError::Deserialization)?;
        if mesh.values.len() != expected
        {
            return Err(ScatterError::DimensionMismatch { expected, found: mesh.values.len() });
        }
        Ok(mesh)
    }

    pub fn read<Reader: std::io::Read>(mut reader: Reader, format: SerializationFormat) -> Result<Self, ScatterError>
    {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes).map_err(|_|ScatterError::Deserialization)?;
        Self::read_buffer(&bytes, format)
    }
}

#[cfg(test)]
mod tests
{
    use super::*;

    fn text(mesh: &Mesh) -> String
    {
        let mut out = Vec::new();
        mesh.serialize(&mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn reset_then_serialize_is_all_zero()
    {
        let mut mesh = Mesh::new(GridSpec::new(3, 2).unwrap()).unwrap();
        mesh.values_mut()[4] = 1.5;
        mesh.reset();
        let out = text(&mesh);
        let lines: Vec<_> = out.lines().collect();
        assert_eq!(lines.len(), 3);
        for line in lines
        {
            let fields: Vec<_> = line.split(' ').collect();
            assert_eq!(fields.len(), 4);
            assert!(fields.iter().all(|f| *f == "0.000000"));
        }
    }

    #[test]
    fn serialize_preserves_row_major_layout()
    {
        let mut mesh = Mesh::new(GridSpec::new(1, 1).unwrap()).unwrap();
        mesh.values_mut().copy_from_slice(&[0.0625, 1.0, 2.5, 1.0 / 3.0]);
        assert_eq!(text(&mesh), "0.062500 1.000000\n2.500000 0.333333\n");
        assert_eq!(mesh.get(1, 0), 1.0);
        assert_eq!(mesh.get(0, 1), 2.5);
        assert!((mesh.total_mass() - (3.5625 + 1.0 / 3.0)).abs() < 1e-15);
    }

    #[test]
    fn snapshot_roundtrip()
    {
        let mut mesh = Mesh::new(GridSpec::new(4, 3).unwrap()).unwrap();
        for (k, value) in mesh.values_mut().iter_mut().enumerate()
        {
            *value = k as f64 * 0.125;
        }
        for format in [SerializationFormat::Bincode, SerializationFormat::BincodeLz4]
        {
            let bytes = mesh.write_buffer(format).unwrap();
            let restored = Mesh::read_buffer(&bytes, format).unwrap();
            assert_eq!(restored, mesh);
            let restored = Mesh::read(std::io::Cursor::new(bytes), format).unwrap();
            assert_eq!(restored, mesh);
        }
    }

    #[test]
    fn snapshot_with_wrong_value_count_is_rejected()
    {
        let mut mesh = Mesh::new(GridSpec::new(2, 2).unwrap()).unwrap();
        mesh.values.pop();
        let bytes = mesh.write_buffer(SerializationFormat::BincodeLz4).unwrap();
        assert!(matches!(Mesh::read_buffer(&bytes, SerializationFormat::BincodeLz4),
            Err(ScatterError::DimensionMismatch { expected: 9, found: 8 })));
    }

    #[test]
    fn snapshot_with_zero_cells_is_rejected()
    {
        #[derive(serde::Serialize)]
        struct Cells
        {
            nx: usize,
            ny: usize,
        }
        #[derive(serde::Serialize)]
        struct RawMesh
        {
            grid: Cells,
            values: Vec<f64>,
        }

        let raw = RawMesh { grid: Cells { nx: 0, ny: 1 }, values: vec![0.0; 2] };
        for format in [SerializationFormat::Bincode, SerializationFormat::BincodeLz4]
        {
            let bytes = serialization::serialize(&raw, format).unwrap();
            assert!(matches!(Mesh::read_buffer(&bytes, format), Err(ScatterError::Deserialization)));
        }

        // the same layout with a valid grid loads and derives its spacing
        let raw = RawMesh { grid: Cells { nx: 1, ny: 2 }, values: vec![0.0; 6] };
        let bytes = serialization::serialize(&raw, SerializationFormat::Bincode).unwrap();
        let mesh = Mesh::read_buffer(&bytes, SerializationFormat::Bincode).unwrap();
        assert_eq!(mesh.grid().dx(), 1.0);
        assert_eq!(mesh.grid().dy(), 0.5);
    }

    #[test]
    fn snapshot_file_roundtrip()
    {
        let path = std::env::temp_dir().join(format!("meshscatter_snapshot_{}.bin", std::process::id()));
        let mut mesh = Mesh::new(GridSpec::new(2, 5).unwrap()).unwrap();
        mesh.values_mut()[7] = 0.5;
        mesh.save_snapshot(&path).unwrap();
        let restored = Mesh::read(std::fs::File::open(&path).unwrap(), SerializationFormat::default()).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(restored, mesh);
    }

    #[test]
    fn write_text_into_missing_directory_fails()
    {
        let mesh = Mesh::new(GridSpec::new(1, 1).unwrap()).unwrap();
        let path = std::env::temp_dir().join("meshscatter_no_such_dir").join("Mesh.out");
        let err = mesh.write_text(&path).unwrap_err();
        assert!(matches!(err, ScatterError::OutputWrite { .. }));
        assert!(!err.is_fatal());
    }
}
