use crate::actors::worker::WorkerHandle;
use crate::events::JobStatus;
use crate::job::{Job, JobResult};
use crate::outcome::Outcome;
use crate::types::JobName;

/// Where a job stands from the supervisor's point of view.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum JobState {
    Pending,
    Succeeded(i32),
    Failed(i32),
}

impl From<JobStatus> for JobState {
    fn from(status: JobStatus) -> Self {
        if status.succeeded() {
            JobState::Succeeded(status.exit_code())
        } else {
            JobState::Failed(status.exit_code())
        }
    }
}

#[derive(Debug)]
struct Entry {
    name: JobName,
    worker: Option<WorkerHandle>,
    state: JobState,
}

/// Map from a job's declaration index to its worker and state.
///
/// Only the supervisor's control loop touches the table.
#[derive(Debug)]
pub struct JobTable {
    entries: Vec<Entry>,
}

impl JobTable {
    pub fn new(jobs: &[Job]) -> Self {
        let entries = jobs
            .iter()
            .map(|job| Entry {
                name: job.shared_name(),
                worker: None,
                state: JobState::Pending,
            })
            .collect();
        Self { entries }
    }

    pub fn launched(&mut self, index: usize, worker: WorkerHandle) {
        if let Some(entry) = self.entries.get_mut(index) {
            entry.worker = Some(worker);
        }
    }

    /// Record the end of a job. Returns the new state, or `None` if the job was
    /// unknown or already finished.
    pub fn finish(&mut self, index: usize, status: JobStatus) -> Option<JobState> {
        let entry = self.entries.get_mut(index)?;
        if entry.state != JobState::Pending {
            return None;
        }
        entry.state = JobState::from(status);
        entry.worker = None;
        Some(entry.state)
    }

    pub fn name(&self, index: usize) -> Option<&str> {
        self.entries.get(index).map(|entry| &*entry.name)
    }

    pub fn pid(&self, index: usize) -> Option<u32> {
        self.entries
            .get(index)
            .and_then(|entry| entry.worker.as_ref())
            .and_then(WorkerHandle::pid)
    }

    pub fn has_pending(&self) -> bool {
        self.entries
            .iter()
            .any(|entry| entry.state == JobState::Pending)
    }

    pub fn pending(&self) -> Vec<usize> {
        self.entries
            .iter()
            .enumerate()
            .filter(|(_, entry)| entry.state == JobState::Pending)
            .map(|(index, _)| index)
            .collect()
    }

    pub fn into_outcome(self) -> Outcome {
        let results = self
            .entries
            .into_iter()
            .map(|entry| {
                let (exit_code, succeeded) = match entry.state {
                    JobState::Succeeded(code) => (code, true),
                    JobState::Failed(code) => (code, false),
                    JobState::Pending => (JobStatus::Lost.exit_code(), false),
                };
                JobResult {
                    name: entry.name.to_string(),
                    exit_code,
                    succeeded,
                }
            })
            .collect();
        Outcome::new(results)
    }
}
