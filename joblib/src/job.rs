use crate::events::JobStatus;
use crate::types::{Args, Dir, Envs, JobName, Program};
use std::path::PathBuf;

/// One independently runnable external job.
///
/// A `Job` is immutable once built; the builder methods consume and return it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Job {
    name: JobName,
    program: Program,
    args: Args,
    dir: Dir,
    envs: Envs,
}

impl Job {
    /// A job running `program` with no arguments in the current directory.
    pub fn new(name: impl AsRef<str>, program: impl Into<Program>) -> Self {
        Self {
            name: name.as_ref().into(),
            program: program.into(),
            args: Vec::new(),
            dir: PathBuf::from("."),
            envs: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn dir(mut self, dir: impl Into<Dir>) -> Self {
        self.dir = dir.into();
        self
    }

    pub fn env(mut self, key: impl Into<String>, val: impl Into<String>) -> Self {
        self.envs.push((key.into(), val.into()));
        self
    }

    pub fn envs<I, K, V>(mut self, envs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.envs
            .extend(envs.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn shared_name(&self) -> JobName {
        self.name.clone()
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn arguments(&self) -> &[String] {
        &self.args
    }

    pub fn working_dir(&self) -> &Dir {
        &self.dir
    }

    pub fn environment(&self) -> &[(String, String)] {
        &self.envs
    }
}

/// The result of one job, produced exactly once when its process terminates.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct JobResult {
    pub name: String,
    pub exit_code: i32,
    pub succeeded: bool,
}

impl JobResult {
    pub fn new(name: &str, status: JobStatus) -> Self {
        Self {
            name: name.to_string(),
            exit_code: status.exit_code(),
            succeeded: status.succeeded(),
        }
    }
}
