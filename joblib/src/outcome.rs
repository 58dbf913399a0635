use crate::job::JobResult;

/// Aggregate over every job of one supervisor run, in declaration order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Outcome {
    results: Vec<JobResult>,
}

impl Outcome {
    pub(crate) fn new(results: Vec<JobResult>) -> Self {
        Self { results }
    }

    /// True iff every job succeeded.
    pub fn succeeded(&self) -> bool {
        self.results.iter().all(|result| result.succeeded)
    }

    pub fn results(&self) -> &[JobResult] {
        &self.results
    }

    pub fn failures(&self) -> impl Iterator<Item = &JobResult> {
        self.results.iter().filter(|result| !result.succeeded)
    }

    /// 0 on full success, 1 otherwise.
    pub fn exit_code(&self) -> u8 {
        if self.succeeded() {
            0
        } else {
            1
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::JobStatus;

    #[test]
    fn partial_success_is_failure() {
        let outcome = Outcome::new(vec![
            JobResult::new("A", JobStatus::Exited { code: 0 }),
            JobResult::new("B", JobStatus::Exited { code: 2 }),
            JobResult::new("C", JobStatus::Exited { code: 0 }),
        ]);
        assert!(!outcome.succeeded());
        assert_eq!(outcome.exit_code(), 1);
        let failed: Vec<_> = outcome
            .failures()
            .map(|r| (r.name.as_str(), r.exit_code))
            .collect();
        assert_eq!(failed, [("B", 2)]);
    }

    #[test]
    fn all_ok() {
        let outcome = Outcome::new(vec![
            JobResult::new("A", JobStatus::Exited { code: 0 }),
            JobResult::new("B", JobStatus::Exited { code: 0 }),
        ]);
        assert!(outcome.succeeded());
        assert_eq!(outcome.exit_code(), 0);
        assert_eq!(outcome.failures().count(), 0);
    }
}
