//! Console state owning the transcript.

use std::fmt;
use std::sync::Arc;

use time::{OffsetDateTime, UtcOffset};
use tracing::debug;

use crate::commands::{evaluate, CommandResult};
use crate::transcript::{Transcript, TranscriptEntry};

/// Source of the current time for `date`.
pub type Clock = Arc<dyn Fn() -> OffsetDateTime + Send + Sync>;

/// What one [`Console::submit`] did to the transcript.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Submission {
    /// This many entries were appended to the end.
    Appended(usize),
    /// The transcript was replaced by the banner.
    Reset,
}

/// One terminal panel: a transcript plus the command evaluator.
pub struct Console {
    transcript: Transcript,
    clock: Clock,
}

impl fmt::Debug for Console {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Console")
            .field("transcript", &self.transcript)
            .finish_non_exhaustive()
    }
}

impl Console {
    /// Console showing the startup banner, reading the local wall clock.
    ///
    /// On Unix the local offset is only readable while the process has a
    /// single thread. Anywhere else `date` reports UTC; multi-threaded hosts
    /// should pass [`local_offset_clock`] to [`Console::with_clock`] instead.
    #[must_use]
    pub fn new() -> Self {
        Self::with_clock(Arc::new(local_now))
    }

    #[must_use]
    pub fn with_clock(clock: Clock) -> Self {
        Self {
            transcript: Transcript::with_banner(),
            clock,
        }
    }

    #[must_use]
    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    /// Echo `raw` as an input entry, then evaluate it.
    ///
    /// Blank lines are echoed but not evaluated. `clear` drops the echo along
    /// with everything else.
    pub fn submit(&mut self, raw: &str) -> Submission {
        self.transcript.push(TranscriptEntry::input(format!("$ {raw}")));
        let Some(result) = evaluate(raw, || (self.clock)()) else {
            return Submission::Appended(1);
        };
        match result {
            CommandResult::Output(text) => {
                self.transcript.push(TranscriptEntry::output(text));
                Submission::Appended(2)
            }
            CommandResult::Error(text) => {
                debug!(line = raw, "unrecognized console command");
                self.transcript.push(TranscriptEntry::error(text));
                Submission::Appended(2)
            }
            CommandResult::Reset => {
                self.transcript.reset();
                Submission::Reset
            }
        }
    }

    /// Restore the banner without submitting anything.
    pub fn reset(&mut self) {
        self.transcript.reset();
    }

    /// Entries touched by `submission`: the appended tail, or the whole
    /// transcript after a reset.
    #[must_use]
    pub fn changed(&self, submission: Submission) -> &[TranscriptEntry] {
        let entries = self.transcript.entries();
        match submission {
            Submission::Appended(count) => &entries[entries.len().saturating_sub(count)..],
            Submission::Reset => entries,
        }
    }
}

impl Default for Console {
    fn default() -> Self {
        Self::new()
    }
}

fn local_now() -> OffsetDateTime {
    OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc())
}

/// Clock reading UTC shifted to `offset`.
#[must_use]
pub fn offset_clock(offset: UtcOffset) -> Clock {
    Arc::new(move || OffsetDateTime::now_utc().to_offset(offset))
}

/// Clock pinned to the local offset as resolved now, UTC if unavailable.
///
/// Call it before spawning threads.
#[must_use]
pub fn local_offset_clock() -> Clock {
    let offset = UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC);
    debug!(%offset, "console clock offset resolved");
    offset_clock(offset)
}
