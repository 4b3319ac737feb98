//! Per-kind job state: `Idle`/`Running` plus the token of the running job.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JobState {
    #[default]
    Idle,
    Running,
}

/// Identity of one started job. Tokens of a slot increase monotonically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct JobToken(u64);

impl JobToken {
    pub fn get(self) -> u64 {
        self.0
    }
}

/// State machine for one job kind. At most one job is `Running`;
/// completions carrying any other token are stale.
#[derive(Debug, Default)]
pub struct JobSlot {
    state: JobState,
    issued: u64,
    current: Option<JobToken>,
}

impl JobSlot {
    pub fn state(&self) -> JobState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == JobState::Running
    }

    /// `Idle -> Running` with a fresh token; `None` if a job is already running.
    pub fn try_start(&mut self) -> Option<JobToken> {
        if self.is_running() {
            return None;
        }
        self.issued += 1;
        let token = JobToken(self.issued);
        self.state = JobState::Running;
        self.current = Some(token);
        Some(token)
    }

    /// Whether `token` belongs to the running job.
    pub fn is_current(&self, token: JobToken) -> bool {
        self.is_running() && self.current == Some(token)
    }

    /// `Running -> Idle` if `token` is current. Returns false for stale tokens,
    /// leaving the slot unchanged.
    pub fn finish(&mut self, token: JobToken) -> bool {
        if !self.is_current(token) {
            return false;
        }
        self.state = JobState::Idle;
        self.current = None;
        true
    }
}
