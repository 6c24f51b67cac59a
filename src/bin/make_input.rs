//! Writes a binary input file of uniformly random points.
//!
//! make_input <output_file> <NX> <NY> <NUM_Points> <Maxiter> [seed]

use std::fs::File;
use std::io::{BufWriter, Write};
use std::process::ExitCode;
use std::str::FromStr;

use meshscatter::grid::RunConfig;
use meshscatter::sources::binary::{write_header, write_points};
use meshscatter::sources::allocate_points;
use meshscatter::sources::random::RandomPoints;

fn usage(program: &str)
{
    eprintln!("Usage: {program} <output_file> <NX> <NY> <NUM_Points> <Maxiter> [seed]");
}

fn parse<T: FromStr>(name: &str, value: &str) -> Result<T, String>
{
    value.parse().map_err(|_| format!("invalid {name}: {value}"))
}

fn generate(args: &[String]) -> Result<(), String>
{
    let header = [
        parse::<i32>("NX", &args[1])?,
        parse::<i32>("NY", &args[2])?,
        parse::<i32>("NUM_Points", &args[3])?,
        parse::<i32>("Maxiter", &args[4])?,
    ];
    let seed = match args.get(5)
    {
        Some(seed) => parse::<u64>("seed", seed)?,
        None => 0,
    };
    let config = RunConfig::from_header(header).map_err(|e| e.to_string())?;

    let file = File::create(&args[0]).map_err(|e| format!("cannot create {}: {e}", args[0]))?;
    let mut writer = BufWriter::new(file);
    let write_error = |e: std::io::Error| format!("cannot write {}: {e}", args[0]);
    write_header(&mut writer, &config).map_err(write_error)?;

    let mut source = RandomPoints::new(seed);
    let mut points = allocate_points(config.num_points).map_err(|e| e.to_string())?;
    for _ in 0..config.max_iter
    {
        source.fill(&mut points);
        write_points(&mut writer, &points).map_err(write_error)?;
    }
    writer.flush().map_err(write_error)?;
    log::info!("wrote {} iterations of {} points to {}", config.max_iter, config.num_points, args[0]);
    Ok(())
}

fn main() -> ExitCode
{
    env_logger::init();
    let args: Vec<String> = std::env::args().collect();
    if !(6..=7).contains(&args.len())
    {
        usage(args.first().map(String::as_str).unwrap_or("make_input"));
        return ExitCode::FAILURE;
    }
    match generate(&args[1..])
    {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) =>
        {
            eprintln!("{message}");
            ExitCode::FAILURE
        }
    }
}
