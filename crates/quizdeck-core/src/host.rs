//! Server-authoritative session hosting.
//!
//! A [`SessionHost`] wraps a [`Session`] behind a mutex and owns the live
//! question's [`QuestionTimer`]. Timeouts are enforced by the host's own
//! clock: the expiry task fires whether or not the driver ever calls back
//! in, and the session mutex arbitrates who decides each answer slot. The
//! expiry task re-checks that its question is still live after acquiring
//! the lock, so a cancelled or stale timer never lands a state change.
//!
//! Each host is an independent unit of concurrency; hosting many sessions
//! means holding many hosts, with no shared mutable state between them.
//! Dropping a host releases its timer, so abandonment cannot leak a
//! scheduled expiry.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, MutexGuard};
use uuid::Uuid;

use crate::model::{Question, QuizConfig};
use crate::session::{Session, SessionState, Transition};
use crate::timer::QuestionTimer;

/// A hosted session with authoritative per-question timing.
#[derive(Debug)]
pub struct SessionHost {
    session: Arc<Mutex<Session>>,
    budget: Duration,
    timer: Option<QuestionTimer>,
}

impl SessionHost {
    /// Start a fresh session and arm the countdown for question 0.
    pub fn start(quiz_id: Uuid, config: QuizConfig, questions: Vec<Question>) -> Self {
        Self::from_session(Session::begin(quiz_id, config, questions))
    }

    /// Host an already-constructed session (the retake path).
    ///
    /// The session must be at `InProgress(0)`; its countdown starts now.
    pub fn from_session(session: Session) -> Self {
        assert_eq!(
            session.state(),
            SessionState::InProgress { index: 0 },
            "hosted session must start at question 0"
        );
        let budget = session.time_budget();
        let mut host = Self {
            session: Arc::new(Mutex::new(session)),
            budget,
            timer: None,
        };
        host.arm(0);
        host
    }

    fn arm(&mut self, index: usize) {
        let session = Arc::clone(&self.session);
        self.timer = Some(QuestionTimer::start(self.budget, move || async move {
            let mut s = session.lock().await;
            if s.state() == (SessionState::InProgress { index }) {
                s.expire_current();
            }
        }));
    }

    /// Submit an answer for the live question.
    ///
    /// The timer is cancelled synchronously before the session lock is
    /// taken; an expiry task that already won the slot makes this a no-op.
    pub async fn submit_answer(&mut self, choice: usize) -> Transition {
        if let Some(timer) = self.timer.take() {
            timer.cancel();
        }
        let mut session = self.session.lock().await;
        session.submit_answer(choice)
    }

    /// Force a timeout for the live question.
    ///
    /// Used by drivers that observe the countdown hit zero themselves; a
    /// no-op if the background expiry already decided the slot.
    pub async fn expire_current(&mut self) -> Transition {
        if let Some(timer) = self.timer.take() {
            timer.cancel();
        }
        let mut session = self.session.lock().await;
        session.expire_current()
    }

    /// Advance past a decided question, re-arming the countdown when
    /// another question goes live.
    pub async fn advance(&mut self) -> SessionState {
        let next = {
            let mut session = self.session.lock().await;
            session.advance()
        };
        match next {
            SessionState::InProgress { index } => self.arm(index),
            _ => self.timer = None,
        }
        next
    }

    /// Time left on the live question's countdown, for display only.
    pub fn remaining(&self) -> Duration {
        self.timer
            .as_ref()
            .map(QuestionTimer::remaining)
            .unwrap_or(Duration::ZERO)
    }

    /// Lock the underlying session for inspection or completion.
    pub async fn session(&self) -> MutexGuard<'_, Session> {
        self.session.lock().await
    }
}
