//! Progress events emitted by a download job.

/// One step of a download job, in emission order.
///
/// Within a job, `Progress` values never decrease and `Finished`/`Failed`
/// is always the last event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressEvent {
    Started,
    /// Percent complete, 0..=100.
    Progress(u8),
    Info(String),
    Finished,
    Failed(String),
}

impl ProgressEvent {
    /// `Finished` or `Failed`.
    pub fn is_terminal(&self) -> bool {
        matches!(self, ProgressEvent::Finished | ProgressEvent::Failed(_))
    }
}

/// Integer percent `floor(downloaded / total * 100)`, capped at 100.
/// `None` while the total is unknown or zero.
pub fn percent_of(downloaded: u64, total: Option<u64>) -> Option<u8> {
    let total = total.filter(|t| *t > 0)?;
    let pct = (u128::from(downloaded) * 100 / u128::from(total)).min(100);
    Some(pct as u8)
}

/// Filters percent values so a job only ever reports increasing progress.
#[derive(Debug, Default)]
pub struct ProgressTracker {
    last: Option<u8>,
}

impl ProgressTracker {
    /// Returns the percent to report, or `None` if it would not move forward.
    pub fn advance(&mut self, percent: u8) -> Option<u8> {
        let percent = percent.min(100);
        match self.last {
            Some(last) if percent <= last => None,
            _ => {
                self.last = Some(percent);
                Some(percent)
            }
        }
    }
}
