//! In-memory session store.
//!
//! The per-login session bag does triple duty, as the legacy tool's
//! `st.session_state` did: it is the auth token store, the intake-wizard
//! position, and the form-draft store. Sessions live only in memory and
//! die with the process; the inactivity timeout evicts idle ones.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use base64::Engine;
use chrono::NaiveDateTime;

use crate::models::enums::Role;
use crate::wizard::IntakeWizard;

/// Default inactivity timeout: 15 minutes.
const DEFAULT_INACTIVITY_TIMEOUT_SECS: u64 = 900;

/// Generate a random bearer token (URL-safe base64, 32 bytes of entropy).
pub fn generate_token() -> String {
    let bytes: [u8; 32] = rand::random();
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes)
}

/// One logged-in user's state.
pub struct Session {
    pub username: String,
    pub role: Role,
    pub login_time: NaiveDateTime,
    pub wizard: IntakeWizard,
    last_activity: Instant,
}

impl Session {
    fn new(username: String, role: Role, login_time: NaiveDateTime) -> Self {
        Self {
            username,
            role,
            login_time,
            wizard: IntakeWizard::new(),
            last_activity: Instant::now(),
        }
    }
}

/// All live sessions, keyed by bearer token.
pub struct SessionStore {
    sessions: HashMap<String, Session>,
    timeout: Duration,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::with_timeout(Duration::from_secs(DEFAULT_INACTIVITY_TIMEOUT_SECS))
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            sessions: HashMap::new(),
            timeout,
        }
    }

    /// Start a session for a freshly authenticated account; returns the
    /// bearer token the client presents on every later request.
    pub fn issue(&mut self, username: &str, role: Role, login_time: NaiveDateTime) -> String {
        let token = generate_token();
        self.sessions.insert(
            token.clone(),
            Session::new(username.to_string(), role, login_time),
        );
        token
    }

    /// Look up a session by token, evicting it instead if it has idled
    /// past the timeout. A hit refreshes the activity clock.
    pub fn validate(&mut self, token: &str) -> Option<&mut Session> {
        let expired = match self.sessions.get(token) {
            Some(session) => session.last_activity.elapsed() > self.timeout,
            None => return None,
        };
        if expired {
            self.sessions.remove(token);
            return None;
        }
        let session = self.sessions.get_mut(token)?;
        session.last_activity = Instant::now();
        Some(session)
    }

    /// Drop one session (logout).
    pub fn revoke(&mut self, token: &str) -> bool {
        self.sessions.remove(token).is_some()
    }

    /// Drop every session belonging to a username. Used when an admin
    /// deletes an account so the deleted user cannot keep working.
    pub fn revoke_user(&mut self, username: &str) {
        self.sessions.retain(|_, s| s.username != username);
    }

    /// Sweep idle sessions.
    pub fn purge_expired(&mut self) {
        let timeout = self.timeout;
        self.sessions
            .retain(|_, s| s.last_activity.elapsed() <= timeout);
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}
