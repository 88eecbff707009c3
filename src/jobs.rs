//! End-to-end jobs for the two front ends.
//!
//! Both hold a [`Workspace`] guard for the duration of the run, so the
//! working directories are released on success and on every error path.

use std::path::Path;

use tracing::info;

use crate::error::Result;
use crate::params::{EmailJob, JobParams};
use crate::pipeline::{Mashup, Pipeline, Stage};
use crate::services::{packager, AudioEngine, Mailer, TrackSource};
use crate::workspace::{CleanupPolicy, JobId, Workspace};

/// Fixed names used by web jobs.
pub const WEB_OUTPUT_NAME: &str = "mashup.mp3";
pub const WEB_ARCHIVE_NAME: &str = "mashup.zip";

/// Command-line job: build the mashup under `root/output`, drop the
/// intermediate directories afterwards.
pub fn run_cli_job(
    root: &Path,
    params: &JobParams,
    source: &dyn TrackSource,
    engine: &dyn AudioEngine,
    progress: &mut dyn FnMut(&Stage),
) -> Result<Mashup> {
    let ws = Workspace::prepare(root, CleanupPolicy::Intermediate)?;
    Pipeline::new(source, engine).run(&ws, params, progress)
}

/// Web job: build, zip and mail the mashup inside a private job directory
/// that is removed afterwards.
pub fn run_email_job(
    workspace_root: &Path,
    job: &EmailJob,
    source: &dyn TrackSource,
    engine: &dyn AudioEngine,
    mailer: &dyn Mailer,
) -> Result<()> {
    let job_id = JobId::new();
    let ws = Workspace::for_job(workspace_root, &job_id)?;
    info!("Job {} started for {}", job_id, job.recipient);

    let mashup = Pipeline::new(source, engine).run(&ws, &job.params, &mut |stage| {
        info!("Job {}: {}", job_id, stage);
    })?;

    let archive = packager::package(&mashup.path, &ws.output().join(WEB_ARCHIVE_NAME))?;
    mailer.send_archive(&job.recipient, &archive)?;

    info!("Job {} finished", job_id);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{FailingMailer, FakeEngine, FakeSource, RecordingMailer};
    use crate::workspace::{OUTPUT_DIR, RAW_DIR, TRIMMED_DIR};
    use std::fs;

    fn email_job() -> EmailJob {
        EmailJob {
            params: JobParams {
                performer: "Test Singer".into(),
                track_count: 12,
                trim_secs: 25,
                output_name: WEB_OUTPUT_NAME.into(),
            },
            recipient: "fan@example.com".parse().unwrap(),
        }
    }

    #[test]
    fn cli_job_keeps_only_the_output() {
        let tmp = tempfile::tempdir().unwrap();
        let source = FakeSource::new(&[("one", 50.0), ("two", 10.0)]);
        let params = JobParams {
            performer: "Test Singer".into(),
            track_count: 12,
            trim_secs: 25,
            output_name: "out.mp3".into(),
        };

        let mut lines = Vec::new();
        let mashup = run_cli_job(tmp.path(), &params, &source, &FakeEngine, &mut |stage| {
            lines.push(stage.to_string())
        })
        .unwrap();

        assert_eq!(mashup.path, tmp.path().join(OUTPUT_DIR).join("out.mp3"));
        assert!(mashup.path.exists());
        assert_eq!(mashup.duration_secs, 35.0);
        assert!(!tmp.path().join(RAW_DIR).exists());
        assert!(!tmp.path().join(TRIMMED_DIR).exists());
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn cli_job_cleans_up_after_a_failure() {
        let tmp = tempfile::tempdir().unwrap();
        let source = FakeSource::new(&[]);
        let params = JobParams {
            performer: "Nobody".into(),
            track_count: 11,
            trim_secs: 21,
            output_name: "out.mp3".into(),
        };

        assert!(run_cli_job(tmp.path(), &params, &source, &FakeEngine, &mut |_| {}).is_err());
        assert!(!tmp.path().join(RAW_DIR).exists());
        assert!(!tmp.path().join(TRIMMED_DIR).exists());
    }

    #[test]
    fn email_job_sends_zip_and_leaves_nothing_behind() {
        let tmp = tempfile::tempdir().unwrap();
        let source = FakeSource::new(&[("a", 30.0), ("b", 30.0)]);
        let mailer = RecordingMailer::default();

        run_email_job(tmp.path(), &email_job(), &source, &FakeEngine, &mailer).unwrap();

        let sent = mailer.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].recipient, "fan@example.com");
        assert_eq!(sent[0].archive_name, WEB_ARCHIVE_NAME);
        assert_eq!(sent[0].entries, [WEB_OUTPUT_NAME]);
        assert_eq!(fs::read_dir(tmp.path()).unwrap().count(), 0);
    }

    #[test]
    fn email_job_cleans_up_when_mail_fails() {
        let tmp = tempfile::tempdir().unwrap();
        let source = FakeSource::new(&[("a", 30.0)]);

        let err = run_email_job(tmp.path(), &email_job(), &source, &FakeEngine, &FailingMailer)
            .unwrap_err();
        assert!(err.to_string().contains("authentication failed"));
        assert_eq!(fs::read_dir(tmp.path()).unwrap().count(), 0);
    }

    #[test]
    fn back_to_back_jobs_do_not_share_files() {
        let tmp = tempfile::tempdir().unwrap();
        let mailer = RecordingMailer::default();

        let first = FakeSource::new(&[("first-run", 30.0)]);
        run_email_job(tmp.path(), &email_job(), &first, &FakeEngine, &mailer).unwrap();
        let second = FakeSource::new(&[("second-run", 30.0)]);
        run_email_job(tmp.path(), &email_job(), &second, &FakeEngine, &mailer).unwrap();

        let sent = mailer.sent.lock().unwrap();
        assert_eq!(sent[0].clips, ["first-run.mp3"]);
        assert_eq!(sent[1].clips, ["second-run.mp3"]);
        assert_eq!(fs::read_dir(tmp.path()).unwrap().count(), 0);
    }
}
