use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;

use log::info;
use serde::Serialize;
use tinytemplate::TinyTemplate;

use crate::config::Config;
use crate::error::SubmitError;
use crate::grid::job::Job;

/// rwxr-xr-x, jsub runs the script directly
const SCRIPT_MODE: u32 = 0o755;

/// Rendered job control script
///
/// Activates the python environment under the base directory, then runs get_features.py with
/// stdin redirected from the input file. Every path is absolute so the script doesn't depend on
/// the working directory the grid picks.
#[derive(Debug, PartialEq, Eq)]
pub struct JobScript {
    pub content: String,
}

/// Rendering context for the job script
#[derive(Serialize)]
struct ScriptContext {
    activate: String,
    executable: String,
    job_name: String,
    log_path: String,
    input_file: String,
}

/// Render the job script using TinyTemplate
pub fn render_script(config: &Config, job: &Job) -> Result<JobScript, SubmitError> {
    /// included job template
    static JOB: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/data/templates/job.bash"));
    let mut tt = TinyTemplate::new();
    // paths go into a shell script, not HTML
    tt.set_default_formatter(&tinytemplate::format_unescaped);
    tt.add_template("job", JOB)?;

    let context = ScriptContext {
        activate: shell_word(&config.activate_script())?,
        executable: shell_word(&config.executable())?,
        job_name: job.name.clone(),
        log_path: shell_word(&job.log_path())?,
        input_file: shell_word(&job.input_file)?,
    };

    Ok(JobScript { content: tt.render("job", &context)? })
}

impl JobScript {
    /// Write the script to disk and make it executable
    pub fn write(&self, out_path: &Path) -> Result<(), SubmitError> {
        info!("Writing job script to {}", out_path.display());
        let write_err = |source| SubmitError::WriteFile { path: out_path.to_path_buf(), source };
        fs::write(out_path, &self.content).map_err(write_err)?;
        fs::set_permissions(out_path, fs::Permissions::from_mode(SCRIPT_MODE)).map_err(write_err)
    }
}

/// A path as a single bash word
fn shell_word(path: &Path) -> Result<String, SubmitError> {
    path.to_str()
        .map(shell_quote)
        .ok_or_else(|| SubmitError::NonUtf8Path(path.to_path_buf()))
}

/// POSIX single quoting, plain words are left alone
fn shell_quote(s: &str) -> String {
    if s.is_empty() {
        return "''".to_string();
    }
    if s.chars().all(|c| c.is_ascii_alphanumeric() || "-_./:@+,%".contains(c)) {
        return s.to_string();
    }
    format!("'{}'", s.replace('\'', "'\\''"))
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use chrono::{TimeZone, Utc};
    use tempfile::TempDir;

    use super::*;

    fn job(base: &str, input: &str) -> (Config, Job) {
        let config = Config::new(PathBuf::from(base)).unwrap();
        let submitted_at = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
        let job = Job::new(&config, Path::new(input), submitted_at).unwrap();
        (config, job)
    }

    #[test]
    fn test_render() {
        let (config, job) = job("/tmp/sc", "/data/in.txt");
        let script = render_script(&config, &job).unwrap();

        let expected = "#!/bin/bash\n\
            \n\
            source /tmp/sc/env/bin/activate\n\
            \n\
            /tmp/sc/src/utils/get_features.py \
            --job-name=get_features.2024-01-02-03-04-05 \
            --log=/tmp/sc/jobs/get_features.2024-01-02-03-04-05/get_features.log \
            --progress=1000 \
            < /data/in.txt\n";
        assert_eq!(script.content, expected);
    }

    #[test]
    fn test_render_is_deterministic() {
        let (config, job) = job("/tmp/sc", "/data/in.txt");
        assert_eq!(render_script(&config, &job).unwrap(), render_script(&config, &job).unwrap());
    }

    #[test]
    fn test_shell_quote() {
        assert_eq!(shell_quote("/tmp/sc/env/bin/activate"), "/tmp/sc/env/bin/activate");
        assert_eq!(shell_quote(""), "''");
        assert_eq!(shell_quote("/tmp/R&D"), "'/tmp/R&D'");
        assert_eq!(shell_quote("/data/my input.txt"), "'/data/my input.txt'");
        assert_eq!(shell_quote("/data/it's.txt"), r"'/data/it'\''s.txt'");
    }

    #[test]
    fn test_render_quotes_paths() {
        let (config, job) = job("/tmp/R&D", "/data/<in> $x.txt");
        let script = render_script(&config, &job).unwrap();

        assert!(script.content.contains("source '/tmp/R&D/env/bin/activate'\n"));
        assert!(script.content.contains("'/tmp/R&D/src/utils/get_features.py' --job-name="));
        assert!(script.content.contains("--log='/tmp/R&D/jobs/get_features.2024-01-02-03-04-05/get_features.log'"));
        assert!(script.content.ends_with("< '/data/<in> $x.txt'\n"));
    }

    #[test]
    fn test_rendered_script_runs() {
        use std::process::Command;

        let dir = TempDir::new().unwrap();
        let base = dir.path().join("R&D base");
        fs::create_dir_all(base.join("env/bin")).unwrap();
        fs::create_dir_all(base.join("src/utils")).unwrap();
        fs::create_dir_all(base.join("jobs")).unwrap();
        fs::write(base.join("env/bin/activate"), "export ACTIVATED=yes\n").unwrap();
        let executable = base.join("src/utils/get_features.py");
        fs::write(&executable, "#!/bin/sh\necho \"$ACTIVATED $1 stdin: $(cat)\"\n").unwrap();
        fs::set_permissions(&executable, fs::Permissions::from_mode(0o755)).unwrap();
        let input = dir.path().join("my input's.txt");
        fs::write(&input, "RECORDS").unwrap();

        let (config, job) = job(base.to_str().unwrap(), input.to_str().unwrap());
        job.create_dir().unwrap();
        render_script(&config, &job).unwrap().write(&job.script_path()).unwrap();

        let output = Command::new("bash").arg(job.script_path()).output().unwrap();
        let stdout = String::from_utf8_lossy(&output.stdout);
        assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
        assert_eq!(stdout, "yes --job-name=get_features.2024-01-02-03-04-05 stdin: RECORDS\n");
    }

    #[test]
    fn test_non_utf8_input_rejected() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let config = Config::new(PathBuf::from("/tmp/sc")).unwrap();
        let input = Path::new(OsStr::from_bytes(b"/data/\xff.txt"));
        let submitted_at = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
        let job = Job::new(&config, input, submitted_at).unwrap();

        let err = render_script(&config, &job).unwrap_err();
        assert!(matches!(err, SubmitError::NonUtf8Path(_)));
    }

    #[test]
    fn test_write_sets_mode() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("job.bash");
        let script = JobScript { content: "#!/bin/bash\n".to_string() };

        script.write(&path).unwrap();

        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o755);
        assert_eq!(fs::read_to_string(&path).unwrap(), "#!/bin/bash\n");
    }

    #[test]
    fn test_write_into_missing_dir() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing").join("job.bash");
        let script = JobScript { content: String::new() };

        let err = script.write(&path).unwrap_err();
        assert!(matches!(err, SubmitError::WriteFile { .. }));
    }
}
