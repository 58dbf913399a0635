//! Launch a fixed set of external jobs concurrently, merge their output into
//! one tagged stream and aggregate their exit statuses.

mod actors;
pub mod error;
mod events;
mod job;
mod lines;
mod outcome;
mod supervisor;
pub mod types;

pub use events::JobStatus;
pub use job::{Job, JobResult};
pub use outcome::Outcome;
pub use supervisor::{JobState, Supervisor, DEFAULT_KIND};

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn basic() {
        let echo_str = "hello world!";
        let supervisor = Supervisor::new(vec![Job::new("ECHO", "echo")
            .args(["-n", echo_str])
            .dir("/tmp")]);
        let (outcome, out) = supervisor.run(Vec::<u8>::new()).await.expect("run failed");
        assert!(outcome.succeeded());
        assert_eq!(
            String::from_utf8_lossy(&out),
            "[META] launching ECHO scraper\n[ECHO] hello world!\n[META] all scrapers finished successfully\n"
        );
    }
}
