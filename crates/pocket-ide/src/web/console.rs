//! Per-client console sessions behind the web API.

#![allow(missing_docs)]

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{SystemTime, UNIX_EPOCH};

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use pocket_console::{Clock, Console, Submission, TranscriptEntry};
use rand::rngs::OsRng;
use rand::RngCore;
use serde::Serialize;
use tracing::debug;

use crate::config::ConsoleConfig;

#[derive(Debug, Clone, Copy, Serialize)]
pub struct SessionLimits {
    pub session_ttl_secs: u64,
    pub max_sessions: usize,
}

impl From<ConsoleConfig> for SessionLimits {
    fn from(config: ConsoleConfig) -> Self {
        Self {
            session_ttl_secs: config.session_ttl_secs,
            max_sessions: config.max_sessions,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ConsoleSession {
    pub token: String,
    pub expires_at: u64,
    pub transcript: Vec<TranscriptEntry>,
}

/// What one submitted line did to the transcript.
#[derive(Debug, Clone, Serialize)]
pub struct SubmitOutcome {
    /// The transcript was cleared back to the banner.
    pub reset: bool,
    /// Entries added by this line; the whole transcript after a reset.
    pub appended: Vec<TranscriptEntry>,
    pub transcript_len: usize,
    pub expires_at: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionErrorKind {
    Unauthorized,
    LimitExceeded,
    Internal,
}

#[derive(Debug, Clone)]
pub struct SessionError {
    kind: SessionErrorKind,
    message: String,
}

impl SessionError {
    fn new(kind: SessionErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn kind(&self) -> SessionErrorKind {
        self.kind
    }

    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self.kind {
            SessionErrorKind::Unauthorized => 401,
            SessionErrorKind::LimitExceeded => 429,
            SessionErrorKind::Internal => 500,
        }
    }
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for SessionError {}

pub struct ConsoleSessions {
    now: Arc<dyn Fn() -> u64 + Send + Sync>,
    console_clock: Option<Clock>,
    limits: SessionLimits,
    inner: Mutex<HashMap<String, SessionEntry>>,
}

impl fmt::Debug for ConsoleSessions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConsoleSessions")
            .field("limits", &self.limits)
            .finish_non_exhaustive()
    }
}

#[derive(Debug)]
struct SessionEntry {
    console: Console,
    expires_at: u64,
}

impl ConsoleSessions {
    #[must_use]
    pub fn new(limits: SessionLimits) -> Self {
        Self::with_clock(limits, Arc::new(now_secs))
    }

    /// Session store with an injected expiry clock (unix seconds).
    #[must_use]
    pub fn with_clock(limits: SessionLimits, now: Arc<dyn Fn() -> u64 + Send + Sync>) -> Self {
        Self {
            now,
            console_clock: None,
            limits,
            inner: Mutex::new(HashMap::new()),
        }
    }

    /// Clock handed to every new console, used by `date`.
    #[must_use]
    pub fn with_console_clock(mut self, clock: Clock) -> Self {
        self.console_clock = Some(clock);
        self
    }

    #[must_use]
    pub fn limits(&self) -> SessionLimits {
        self.limits
    }

    pub fn create(&self) -> Result<ConsoleSession, SessionError> {
        let now = (self.now)();
        let mut guard = self.lock()?;
        prune_expired(&mut guard, now);
        if guard.len() >= self.limits.max_sessions {
            return Err(SessionError::new(
                SessionErrorKind::LimitExceeded,
                "too many active console sessions",
            ));
        }

        let console = match &self.console_clock {
            Some(clock) => Console::with_clock(clock.clone()),
            None => Console::new(),
        };
        let token = generate_token();
        let expires_at = now.saturating_add(self.limits.session_ttl_secs);
        let transcript = console.transcript().entries().to_vec();
        guard.insert(token.clone(), SessionEntry { console, expires_at });
        debug!(sessions = guard.len(), "console session created");

        Ok(ConsoleSession {
            token,
            expires_at,
            transcript,
        })
    }

    pub fn submit(&self, token: &str, line: &str) -> Result<SubmitOutcome, SessionError> {
        let now = (self.now)();
        let mut guard = self.lock()?;
        let entry = self.ensure_session(&mut guard, token, now)?;
        let submission = entry.console.submit(line);
        Ok(SubmitOutcome {
            reset: submission == Submission::Reset,
            appended: entry.console.changed(submission).to_vec(),
            transcript_len: entry.console.transcript().len(),
            expires_at: entry.expires_at,
        })
    }

    pub fn reset(&self, token: &str) -> Result<ConsoleSession, SessionError> {
        let now = (self.now)();
        let mut guard = self.lock()?;
        let entry = self.ensure_session(&mut guard, token, now)?;
        entry.console.reset();
        Ok(ConsoleSession {
            token: token.to_string(),
            expires_at: entry.expires_at,
            transcript: entry.console.transcript().entries().to_vec(),
        })
    }

    pub fn transcript(&self, token: &str) -> Result<ConsoleSession, SessionError> {
        let now = (self.now)();
        let mut guard = self.lock()?;
        let entry = self.ensure_session(&mut guard, token, now)?;
        Ok(ConsoleSession {
            token: token.to_string(),
            expires_at: entry.expires_at,
            transcript: entry.console.transcript().entries().to_vec(),
        })
    }

    pub fn close(&self, token: &str) -> Result<(), SessionError> {
        let now = (self.now)();
        let mut guard = self.lock()?;
        self.ensure_session(&mut guard, token, now)?;
        guard.remove(token);
        Ok(())
    }

    /// Number of live sessions.
    pub fn active(&self) -> Result<usize, SessionError> {
        let now = (self.now)();
        let mut guard = self.lock()?;
        prune_expired(&mut guard, now);
        Ok(guard.len())
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<String, SessionEntry>>, SessionError> {
        self.inner.lock().map_err(|_| {
            SessionError::new(SessionErrorKind::Internal, "session state lock poisoned")
        })
    }

    fn ensure_session<'a>(
        &self,
        sessions: &'a mut HashMap<String, SessionEntry>,
        token: &str,
        now: u64,
    ) -> Result<&'a mut SessionEntry, SessionError> {
        prune_expired(sessions, now);
        let entry = sessions.get_mut(token).ok_or_else(|| {
            SessionError::new(
                SessionErrorKind::Unauthorized,
                "missing or expired console session",
            )
        })?;
        entry.expires_at = now.saturating_add(self.limits.session_ttl_secs);
        Ok(entry)
    }
}

fn prune_expired(sessions: &mut HashMap<String, SessionEntry>, now: u64) {
    let before = sessions.len();
    sessions.retain(|_, session| session.expires_at > now);
    let pruned = before - sessions.len();
    if pruned > 0 {
        debug!(pruned, "expired console sessions removed");
    }
}

fn generate_token() -> String {
    let mut bytes = [0_u8; 32];
    OsRng.fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}
