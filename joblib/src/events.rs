use std::io;
use std::process::ExitStatus;

/// How a job's process ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum JobStatus {
    Exited { code: i32 },
    Killed { signal: i32 },
    /// The process could not be spawned at all.
    NotStarted { kind: io::ErrorKind },
    /// The process was started but its termination could not be observed.
    Lost,
}

impl JobStatus {
    pub fn succeeded(&self) -> bool {
        matches!(self, JobStatus::Exited { code: 0 })
    }

    /// The exit code a shell would report for this status.
    pub fn exit_code(&self) -> i32 {
        match *self {
            JobStatus::Exited { code } => code,
            JobStatus::Killed { signal } => 128 + signal,
            JobStatus::NotStarted {
                kind: io::ErrorKind::NotFound,
            } => 127,
            JobStatus::NotStarted { .. } => 126,
            JobStatus::Lost => -1,
        }
    }
}

impl From<ExitStatus> for JobStatus {
    fn from(exit_status: ExitStatus) -> Self {
        if let Some(code) = exit_status.code() {
            return JobStatus::Exited { code };
        }
        #[cfg(unix)]
        {
            use std::os::unix::process::ExitStatusExt;
            if let Some(signal) = exit_status.signal() {
                return JobStatus::Killed { signal };
            }
        }
        JobStatus::Lost
    }
}

/// Sent by a worker to the supervisor once its process has terminated and
/// all of its output has been handed to the printer.
#[derive(Debug)]
pub enum WorkerEvent {
    Finished { index: usize, status: JobStatus },
}
