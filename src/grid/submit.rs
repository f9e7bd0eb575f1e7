use std::path::Path;

use chrono::{DateTime, Utc};
use log::{info, warn};

use crate::config::Config;
use crate::error::SubmitError;
use crate::grid::job::Job;
use crate::grid::jsub::{Scheduler, SchedulerRequest};
use crate::grid::script::render_script;

/// Create a job directory, write the job script into it and hand it to the scheduler
///
/// Any failure stops the submission. Whatever was already written stays in the job directory so
/// it can be inspected later. The scheduler's exit status isn't a failure: check the `.err`
/// files in the job directory.
pub fn submit(
    config: &Config,
    input_file: &Path,
    submitted_at: DateTime<Utc>,
    scheduler: &dyn Scheduler,
) -> Result<Job, SubmitError> {
    let job = Job::new(config, input_file, submitted_at)?;
    job.create_dir()?;

    let script = render_script(config, &job)?;
    script.write(&job.script_path())?;

    let receipt = scheduler.submit(&SchedulerRequest::for_job(&job))?;
    if receipt.success() {
        info!("Submitted {}, scheduler output in {}", job.name, receipt.stdout.display());
    } else {
        match receipt.exit_code {
            Some(code) => warn!("Scheduler exited with status {code}, see {}", receipt.stderr.display()),
            None => warn!("Scheduler was terminated by a signal, see {}", receipt.stderr.display()),
        }
    }

    Ok(job)
}
