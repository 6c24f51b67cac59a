use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use crate::algorithms::interpolation::{ScatterInterpolator, ScatterKernel};
use crate::errors::ScatterError;
use crate::grid::RunConfig;
use crate::mesh::Mesh;
use crate::point::Point;
use crate::sources::binary::BinaryPointStream;
use crate::sources::{allocate_points, PointSource};

pub const DEFAULT_OUTPUT: &str = "Mesh.out";

#[derive(Clone, Debug)]
pub struct DriverOptions
{
    /// Text output for the final mesh.
    pub output: PathBuf,
    /// Optional compressed binary snapshot of the final mesh.
    pub snapshot: Option<PathBuf>,
    pub kernel: ScatterKernel,
}

impl Default for DriverOptions
{
    fn default() -> Self
    {
        Self { output: PathBuf::from(DEFAULT_OUTPUT), snapshot: None, kernel: ScatterKernel::default() }
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct RunReport
{
    pub iterations: usize,
    pub points_per_iteration: usize,
    /// Time spent inside the scatter step only, summed over iterations.
    pub interpolation_time: Duration,
    pub total_mass: f64,
}

///
/// Runs `Maxiter` iterations of read, reset and scatter over one mesh. The mesh
/// and the point buffer are allocated once up front.
///
pub struct IterationDriver
{
    config: RunConfig,
    mesh: Mesh,
    points: Vec<Point>,
    interpolator: ScatterInterpolator,
    completed: usize,
    interpolation_time: Duration,
}

impl IterationDriver
{
    pub fn new(config: RunConfig, kernel: ScatterKernel) -> Result<Self, ScatterError>
    {
        let mesh = Mesh::new(config.grid)?;
        let points = allocate_points(config.num_points)?;
        Ok(Self { config, mesh, points, interpolator: ScatterInterpolator::new(kernel), completed: 0, interpolation_time: Duration::ZERO })
    }

    pub fn config(&self) -> &RunConfig
    {
        &self.config
    }

    pub fn mesh(&self) -> &Mesh
    {
        &self.mesh
    }

    pub fn is_done(&self) -> bool
    {
        self.completed >= self.config.max_iter
    }

    ///
    /// One iteration: ingest points, reset the mesh, scatter. Only the scatter
    /// is timed.
    ///
    pub fn step<S: PointSource>(&mut self, source: &mut S) -> Result<(), ScatterError>
    {
        let iteration = self.completed;
        source.fill_batch(iteration, &mut self.points)?;
        if log::log_enabled!(log::Level::Debug)
        {
            let outside = self.points.iter().filter(|p| !p.in_unit_domain()).count();
            if outside > 0
            {
                log::warn!("iteration {iteration}: {outside} points outside the unit domain were clamped");
            }
        }
        self.mesh.reset();

        let start = Instant::now();
        self.interpolator.accumulate(&self.points, &mut self.mesh);
        let elapsed = start.elapsed();

        self.interpolation_time += elapsed;
        self.completed += 1;
        log::debug!("iteration {iteration}: interpolation {:.6} s", elapsed.as_secs_f64());
        Ok(())
    }

    ///
    /// Runs the remaining iterations. Any error aborts the run before the
    /// mesh is handed out.
    ///
    pub fn run<S: PointSource>(mut self, source: &mut S) -> Result<(Mesh, RunReport), ScatterError>
    {
        while !self.is_done()
        {
            self.step(source)?;
        }
        let report = RunReport
        {
            iterations: self.completed,
            points_per_iteration: self.config.num_points,
            interpolation_time: self.interpolation_time,
            total_mass: self.mesh.total_mass(),
        };
        Ok((self.mesh, report))
    }
}

///
/// Writes the final mesh to the configured outputs. Failures are logged and
/// do not fail the run.
///
pub fn write_outputs(mesh: &Mesh, options: &DriverOptions)
{
    match mesh.write_text(&options.output)
    {
        Ok(()) => log::info!("mesh written to {}", options.output.display()),
        Err(err) => log::warn!("{err}"),
    }
    if let Some(path) = &options.snapshot
    {
        match mesh.save_snapshot(path)
        {
            Ok(()) => log::info!("mesh snapshot written to {}", path.display()),
            Err(err) => log::warn!("snapshot not written: {err}"),
        }
    }
}

///
/// Full run over an input file. The file is closed on every exit path.
///
pub fn run_file<P: AsRef<Path>>(input: P, options: &DriverOptions) -> Result<RunReport, ScatterError>
{
    let input = input.as_ref();
    let file = File::open(input).map_err(|source|ScatterError::FileOpen { path: input.to_path_buf(), source })?;
    let mut stream = BinaryPointStream::open_header(BufReader::new(file))?;
    let config = *stream.config();
    log::info!("grid {}x{} cells, {} points, {} iterations", config.grid.nx(), config.grid.ny(), config.num_points, config.max_iter);

    let (mesh, report) = IterationDriver::new(config, options.kernel)?.run(&mut stream)?;
    log::info!("run finished after {} iterations, total mass {}", report.iterations, report.total_mass);
    write_outputs(&mesh, options);
    Ok(report)
}

#[cfg(test)]
mod tests
{
    use super::*;
    use crate::grid::GridSpec;
    use crate::sources::binary::{write_header, write_points};
    use crate::sources::random::RandomPoints;

    struct TempDir(PathBuf);

    impl TempDir
    {
        fn new(name: &str) -> Self
        {
            let path = std::env::temp_dir().join(format!("meshscatter_{name}_{}", std::process::id()));
            std::fs::create_dir_all(&path).unwrap();
            Self(path)
        }
    }

    impl Drop for TempDir
    {
        fn drop(&mut self)
        {
            let _ = std::fs::remove_dir_all(&self.0);
        }
    }

    fn write_input(path: &Path, config: &RunConfig, blocks: &[Vec<Point>])
    {
        let mut file = std::io::BufWriter::new(File::create(path).unwrap());
        write_header(&mut file, config).unwrap();
        for block in blocks
        {
            write_points(&mut file, block).unwrap();
        }
    }

    #[test]
    fn only_last_iteration_survives()
    {
        let config = RunConfig { grid: GridSpec::new(2, 2).unwrap(), num_points: 1, max_iter: 2 };
        let dir = TempDir::new("last_iteration");
        let input = dir.0.join("input.bin");
        write_input(&input, &config, &[vec![Point::new(0.75, 0.75)], vec![Point::new(0.25, 0.25)]]);
        let options = DriverOptions { output: dir.0.join("Mesh.out"), snapshot: Some(dir.0.join("mesh.snap")), kernel: ScatterKernel::Scalar };

        let report = run_file(&input, &options).unwrap();
        assert_eq!(report.iterations, 2);
        assert_eq!(report.points_per_iteration, 1);
        assert!((report.total_mass - 0.25).abs() < 1e-12);

        let text = std::fs::read_to_string(&options.output).unwrap();
        assert_eq!(text, "0.062500 0.062500 0.000000\n0.062500 0.062500 0.000000\n0.000000 0.000000 0.000000\n");

        let snapshot = Mesh::read(File::open(dir.0.join("mesh.snap")).unwrap(), Default::default()).unwrap();
        assert!((snapshot.get(1, 1) - 0.0625).abs() < 1e-12);
        assert_eq!(snapshot.get(2, 2), 0.0);
    }

    #[test]
    fn short_read_aborts_without_output()
    {
        let config = RunConfig { grid: GridSpec::new(4, 4).unwrap(), num_points: 8, max_iter: 3 };
        let dir = TempDir::new("short_read");
        let input = dir.0.join("input.bin");
        write_input(&input, &config, &[vec![Point::new(0.5, 0.5); 8], vec![Point::new(0.5, 0.5); 5]]);
        let options = DriverOptions { output: dir.0.join("Mesh.out"), ..Default::default() };

        let err = run_file(&input, &options).unwrap_err();
        assert!(matches!(err, ScatterError::ShortRead { iteration: 1, .. }));
        assert!(err.is_fatal());
        assert!(!options.output.exists());
    }

    #[test]
    fn missing_input_file()
    {
        let dir = TempDir::new("missing_input");
        let options = DriverOptions { output: dir.0.join("Mesh.out"), ..Default::default() };
        assert!(matches!(run_file(dir.0.join("nope.bin"), &options), Err(ScatterError::FileOpen { .. })));
    }

    #[test]
    fn random_source_run()
    {
        let config = RunConfig { grid: GridSpec::new(16, 16).unwrap(), num_points: 1000, max_iter: 4 };
        let mut driver = IterationDriver::new(config, ScatterKernel::Unrolled).unwrap();
        let mut source = RandomPoints::new(11);
        driver.step(&mut source).unwrap();
        assert!(!driver.is_done());
        assert_eq!(driver.config().max_iter, 4);

        let (mesh, report) = driver.run(&mut source).unwrap();
        assert_eq!(report.iterations, 4);
        let expected = 1000.0 * mesh.grid().cell_area();
        assert!((mesh.total_mass() - expected).abs() < 1e-9);
        assert_eq!(report.total_mass, mesh.total_mass());
    }

    #[test]
    fn zero_iterations_leave_a_zero_mesh()
    {
        let config = RunConfig { grid: GridSpec::new(3, 3).unwrap(), num_points: 10, max_iter: 0 };
        let driver = IterationDriver::new(config, ScatterKernel::Unrolled).unwrap();
        assert!(driver.is_done());
        assert!(driver.mesh().values().iter().all(|v| *v == 0.0));
        let (_, report) = driver.run(&mut RandomPoints::new(0)).unwrap();
        assert_eq!(report.interpolation_time, Duration::ZERO);
    }
}
