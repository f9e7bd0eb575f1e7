use std::ffi::OsString;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::process::Command;

use log::info;

use crate::error::SubmitError;
use crate::grid::job::Job;

/// Everything the scheduler needs to queue one job
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchedulerRequest {
    pub job_name: String,
    /// `-o`, the job's own stdout on the grid
    pub job_stdout: PathBuf,
    /// `-e`, the job's own stderr on the grid
    pub job_stderr: PathBuf,
    pub script: PathBuf,
    /// stdout of the submission call itself
    pub capture_stdout: PathBuf,
    /// stderr of the submission call itself
    pub capture_stderr: PathBuf,
}

impl SchedulerRequest {
    pub fn for_job(job: &Job) -> SchedulerRequest {
        SchedulerRequest {
            job_name: job.name.clone(),
            job_stdout: job.stdout_path(),
            job_stderr: job.stderr_path(),
            script: job.script_path(),
            capture_stdout: job.jsub_stdout_path(),
            capture_stderr: job.jsub_stderr_path(),
        }
    }

    /// `-N <name> -o <stdout> -e <stderr> <script>`
    pub fn arguments(&self) -> Vec<OsString> {
        vec![
            OsString::from("-N"),
            OsString::from(&self.job_name),
            OsString::from("-o"),
            self.job_stdout.clone().into_os_string(),
            OsString::from("-e"),
            self.job_stderr.clone().into_os_string(),
            self.script.clone().into_os_string(),
        ]
    }
}

/// What came back from a finished submission call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchedulerReceipt {
    /// None if the submission process was killed by a signal
    pub exit_code: Option<i32>,
    pub stdout: PathBuf,
    pub stderr: PathBuf,
}

impl SchedulerReceipt {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// Something that accepts a job script and queues it on the grid
pub trait Scheduler {
    /// Block until the submission call returns
    fn submit(&self, request: &SchedulerRequest) -> Result<SchedulerReceipt, SubmitError>;
}

/// Submit with the `jsub` command found on PATH
#[derive(Debug, Clone)]
pub struct Jsub {
    program: PathBuf,
}

impl Default for Jsub {
    fn default() -> Self {
        Jsub { program: PathBuf::from("jsub") }
    }
}

#[cfg(test)]
impl Jsub {
    pub fn with_program(program: &Path) -> Jsub {
        Jsub { program: program.to_path_buf() }
    }
}

impl Scheduler for Jsub {
    fn submit(&self, request: &SchedulerRequest) -> Result<SchedulerReceipt, SubmitError> {
        let stdout = create_capture(&request.capture_stdout)?;
        let stderr = create_capture(&request.capture_stderr)?;

        let mut jsub = Command::new(&self.program);
        let cmd = jsub.args(request.arguments()).stdout(stdout).stderr(stderr);
        info!("Running jsub process");
        info!("{:?}", &cmd);

        let status = cmd.status().map_err(|source| SubmitError::Submission {
            program: self.program.display().to_string(),
            source,
        })?;

        Ok(SchedulerReceipt {
            exit_code: status.code(),
            stdout: request.capture_stdout.clone(),
            stderr: request.capture_stderr.clone(),
        })
    }
}

fn create_capture(path: &Path) -> Result<File, SubmitError> {
    File::create(path).map_err(|source| SubmitError::WriteFile { path: path.to_path_buf(), source })
}
