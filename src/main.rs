use std::ffi::OsString;
use std::path::PathBuf;
use std::process::ExitCode;

use meshscatter::driver::{run_file, DriverOptions, RunReport};
use meshscatter::errors::ScatterError;

/// Environment variable naming an optional binary snapshot of the final mesh.
const SNAPSHOT_ENV: &str = "MESH_SNAPSHOT";

fn parse_args<I: IntoIterator<Item = String>>(args: I) -> Result<PathBuf, ScatterError>
{
    let mut args = args.into_iter();
    let program = args.next().unwrap_or_else(|| "meshscatter".to_string());
    match (args.next(), args.next())
    {
        (Some(input), None) => Ok(PathBuf::from(input)),
        _ => Err(ScatterError::Usage { program }),
    }
}

fn run<I: IntoIterator<Item = String>>(args: I, snapshot: Option<OsString>, output: PathBuf) -> Result<RunReport, ScatterError>
{
    let input = parse_args(args)?;
    let options = DriverOptions
    {
        output,
        snapshot: snapshot.map(PathBuf::from),
        ..Default::default()
    };
    run_file(&input, &options)
}

fn exit_code(result: &Result<RunReport, ScatterError>) -> u8
{
    match result
    {
        Ok(_) => 0,
        Err(_) => 1,
    }
}

fn main() -> ExitCode
{
    env_logger::init();
    let result = run(std::env::args(), std::env::var_os(SNAPSHOT_ENV), PathBuf::from(meshscatter::driver::DEFAULT_OUTPUT));
    match &result
    {
        Ok(report) => println!("Total interpolation time (serial) = {} seconds", report.interpolation_time.as_secs_f64()),
        Err(err) => eprintln!("{err}"),
    }
    ExitCode::from(exit_code(&result))
}
