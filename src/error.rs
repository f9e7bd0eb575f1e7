use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Everything that can stop a submission
///
/// All variants are fatal: nothing is retried and nothing already written to the job directory
/// is cleaned up.
#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("input_file ({0}) must be an absolute path")]
    RelativeInput(PathBuf),
    #[error("base directory ({0}) must be an absolute path")]
    RelativeBaseDir(PathBuf),
    #[error("can't find a home directory, set {0} instead")]
    NoHomeDir(&'static str),
    #[error("job directory {0} already exists")]
    DirectoryExists(PathBuf),
    #[error("jobs directory {0} doesn't exist")]
    MissingJobsDir(PathBuf),
    #[error("can't create job directory {path}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("can't write {path}")]
    WriteFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("path {0} isn't valid UTF-8 and can't be written to a job script")]
    NonUtf8Path(PathBuf),
    #[error("can't render job script")]
    Render(#[from] tinytemplate::error::Error),
    #[error("can't run scheduler {program}")]
    Submission {
        program: String,
        #[source]
        source: io::Error,
    },
}
