use time::OffsetDateTime;

/// Time source for the evaluation window, abstracted so passes can be
/// computed against a fixed instant.
pub(crate) trait Clock: Send + Sync {
    fn now(&self) -> OffsetDateTime;
}

pub(crate) struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> OffsetDateTime {
        OffsetDateTime::now_utc()
    }
}
