//! Run result types

/// Outcome of running commands
///
/// The same shape is used for a single command, a step, a matrix entry and
/// a whole build: zero means success, anything else is the exit code of the
/// command that failed first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunResult {
    pub return_code: i32,
}

impl RunResult {
    pub fn new(return_code: i32) -> Self {
        Self { return_code }
    }

    pub fn success() -> Self {
        Self { return_code: 0 }
    }

    pub fn is_success(&self) -> bool {
        self.return_code == 0
    }
}

impl Default for RunResult {
    fn default() -> Self {
        Self::success()
    }
}
