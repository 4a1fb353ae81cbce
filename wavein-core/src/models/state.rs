/// Capture engine state machine.
///
/// State transitions:
/// ```text
/// stopped → running → stop-requested → stopped
/// ```
///
/// `Stopped` is both the initial state and the state after every completed
/// `stop()`; the engine may be started again from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureState {
    Stopped,
    Running,
    StopRequested,
}

impl CaptureState {
    pub fn is_stopped(&self) -> bool {
        matches!(self, Self::Stopped)
    }

    pub fn is_running(&self) -> bool {
        matches!(self, Self::Running)
    }

    pub fn is_stop_requested(&self) -> bool {
        matches!(self, Self::StopRequested)
    }
}
