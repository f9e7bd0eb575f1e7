use std::path::PathBuf;

use anyhow::Context;
use chrono::Utc;
use clap::Parser;
use log::info;

use crate::config::Config;
use crate::grid::job::Job;
use crate::grid::jsub::Jsub;
use crate::grid::submit::submit;

mod config;
mod error;
mod grid;

/// Submit a get_features job to the execution grid
///
/// Creates a job directory under $GET_FEATURES_BASE_DIR/jobs (default ~/sock-classifier/jobs)
/// and prints its name so you can find it. Within that directory:
///
///   job.bash: the job control file, used by jsub
///
///   jsub.{out,err}: output of the jsub command
///
///   get_features.{out,err}: output of the grid job itself
///
/// The .err files should all be empty. If not, you should investigate what went wrong: jsub's
/// exit status isn't checked.
#[derive(Parser, Debug)]
#[command(name = "submit_get_features", version)]
struct Args {
    /// Absolute path to the file piped into get_features.py
    input_file: PathBuf,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let config = Config::from_env().context("Can't resolve base directory")?;
    info!("Base directory is {}", config.base_dir.display());

    let job = submit(&config, &args.input_file, Utc::now(), &Jsub::default())
        .context("Can't submit get_features job")?;

    println!("{}", report(&job));
    Ok(())
}

/// The only line written to stdout
fn report(job: &Job) -> String {
    format!("job directory is {}", job.dir.display())
}
