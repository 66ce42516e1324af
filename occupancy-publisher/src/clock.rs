use time::{macros::format_description, OffsetDateTime, UtcOffset};

/// Source of the instant stamped on each reading.
pub trait Clock {
    fn now(&self) -> OffsetDateTime;
}

/// Wall clock in the host's local offset.
///
/// The offset is captured once: `time` refuses to query it after the process
/// has spawned threads, and the HTTP client spawns resolver threads.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    offset: UtcOffset,
}

impl SystemClock {
    pub fn local() -> Self {
        let offset = match UtcOffset::current_local_offset() {
            Ok(offset) => offset,
            Err(e) => {
                tracing::warn!(error = %e, "local UTC offset unavailable, stamping readings in UTC");
                UtcOffset::UTC
            }
        };
        Self { offset }
    }
}

impl Clock for SystemClock {
    fn now(&self) -> OffsetDateTime {
        OffsetDateTime::now_utc().to_offset(self.offset)
    }
}

/// Always reports the same instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub OffsetDateTime);

impl Clock for FixedClock {
    fn now(&self) -> OffsetDateTime {
        self.0
    }
}

/// Renders `ts` as naive local time: `YYYY-MM-DD HH:MM:SS[.ffffff]`.
///
/// The fractional part is dropped when the microsecond component is zero.
pub fn format_updated(ts: OffsetDateTime) -> Result<String, time::error::Format> {
    if ts.microsecond() == 0 {
        ts.format(format_description!("[year]-[month]-[day] [hour]:[minute]:[second]"))
    } else {
        ts.format(format_description!(
            "[year]-[month]-[day] [hour]:[minute]:[second].[subsecond digits:6]"
        ))
    }
}
