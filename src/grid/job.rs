use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use log::info;

use crate::config::Config;
use crate::error::SubmitError;

/// Every job name starts with this, followed by a timestamp
static JOB_PREFIX: &str = "get_features";

/// A Job is one submission to the grid, backed by a directory under `<base>/jobs`
///
/// The directory holds:
/// - job.bash: the job control file, used by jsub
/// - jsub.{out,err}: output of the jsub command
/// - get_features.{out,err}: output of the grid job itself
/// - get_features.log: log written by get_features.py
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    pub name: String,
    pub dir: PathBuf,
    pub input_file: PathBuf,
}

/// Job names have one second resolution, two submissions in the same second collide
pub fn job_name(submitted_at: DateTime<Utc>) -> String {
    format!("{}.{}", JOB_PREFIX, submitted_at.format("%Y-%m-%d-%H-%M-%S"))
}

impl Job {
    /// Describe a job without touching the filesystem
    ///
    /// The input file has to be absolute because the job runs somewhere else on the grid. It's
    /// never opened here, a missing file fails inside the submitted job.
    pub fn new(config: &Config, input_file: &Path, submitted_at: DateTime<Utc>) -> Result<Job, SubmitError> {
        if !input_file.is_absolute() {
            return Err(SubmitError::RelativeInput(input_file.to_path_buf()));
        }

        let name = job_name(submitted_at);
        let dir = config.jobs_dir().join(&name);
        Ok(Job { name, dir, input_file: input_file.to_path_buf() })
    }

    /// Create the job directory
    ///
    /// Parents are never created: a missing `jobs` directory usually means a bad base directory.
    /// An existing job directory is an error and is left untouched.
    pub fn create_dir(&self) -> Result<(), SubmitError> {
        info!("Creating job {} in {}", self.name, self.dir.display());
        fs::create_dir(&self.dir).map_err(|err| match err.kind() {
            ErrorKind::AlreadyExists => SubmitError::DirectoryExists(self.dir.clone()),
            ErrorKind::NotFound => {
                let parent = self.dir.parent().unwrap_or(&self.dir).to_path_buf();
                SubmitError::MissingJobsDir(parent)
            }
            _ => SubmitError::CreateDir { path: self.dir.clone(), source: err },
        })
    }

    /// The job control file handed to jsub
    pub fn script_path(&self) -> PathBuf {
        self.dir.join("job.bash")
    }

    /// Passed to get_features.py with `--log`
    pub fn log_path(&self) -> PathBuf {
        self.dir.join("get_features.log")
    }

    /// Where the scheduler writes the job's stdout
    pub fn stdout_path(&self) -> PathBuf {
        self.dir.join("get_features.out")
    }

    /// Where the scheduler writes the job's stderr
    pub fn stderr_path(&self) -> PathBuf {
        self.dir.join("get_features.err")
    }

    /// Where the jsub call itself writes its stdout
    pub fn jsub_stdout_path(&self) -> PathBuf {
        self.dir.join("jsub.out")
    }

    /// Where the jsub call itself writes its stderr
    pub fn jsub_stderr_path(&self) -> PathBuf {
        self.dir.join("jsub.err")
    }
}
