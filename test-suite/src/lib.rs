pub mod runner;
pub mod test_case;

pub use runner::TestRunner;
pub use test_case::{CaseGroup, TestCase};

/// Tally of one suite run.
#[derive(Debug, Default)]
pub struct TestResults {
    pub passed: usize,
    pub failures: Vec<TestFailure>,
}

impl TestResults {
    /// Count `outcome` under `case`; an `Err` becomes a failure.
    pub fn record(&mut self, case: impl Into<String>, outcome: anyhow::Result<()>) {
        match outcome {
            Ok(()) => self.passed += 1,
            Err(e) => self.failures.push(TestFailure {
                case: case.into(),
                message: format!("{e:#}"),
            }),
        }
    }

    pub fn total(&self) -> usize {
        self.passed + self.failures.len()
    }

    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct TestFailure {
    /// `file: group / test`
    pub case: String,
    pub message: String,
}

impl core::fmt::Display for TestFailure {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "[FAIL] {}\n  {}", self.case, self.message)
    }
}
