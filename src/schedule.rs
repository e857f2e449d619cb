//! Time-of-day greeting and per-session step check-off.

use crate::routine::{Routine, Session, StepTitle};
use chrono::Timelike;
use serde::Serialize;
use std::collections::HashSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimeOfDay {
    pub greeting: &'static str,
    pub session: Session,
}

impl TimeOfDay {
    /// 05:00–11:59 morning, 12:00–16:59 afternoon (still the AM routine),
    /// everything else evening.
    pub fn for_hour(hour: u32) -> Self {
        match hour {
            5..=11 => Self {
                greeting: "Good Morning",
                session: Session::Am,
            },
            12..=16 => Self {
                greeting: "Good Afternoon",
                session: Session::Am,
            },
            _ => Self {
                greeting: "Good Evening",
                session: Session::Pm,
            },
        }
    }

    pub fn now() -> Self {
        Self::for_hour(chrono::Local::now().hour())
    }
}

/// Tracks which steps of today's routine have been checked off.
#[derive(Debug, Clone, Default)]
pub struct CompletionTracker {
    am: HashSet<StepTitle>,
    pm: HashSet<StepTitle>,
}

impl CompletionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    fn done_mut(&mut self, session: Session) -> &mut HashSet<StepTitle> {
        match session {
            Session::Am => &mut self.am,
            Session::Pm => &mut self.pm,
        }
    }

    fn done(&self, session: Session) -> &HashSet<StepTitle> {
        match session {
            Session::Am => &self.am,
            Session::Pm => &self.pm,
        }
    }

    /// Flip a step between done and not done. Returns the new state.
    pub fn toggle(&mut self, session: Session, title: StepTitle) -> bool {
        let done = self.done_mut(session);
        if done.remove(&title) {
            false
        } else {
            done.insert(title);
            true
        }
    }

    pub fn is_done(&self, session: Session, title: StepTitle) -> bool {
        self.done(session).contains(&title)
    }

    /// A session is complete only if it has steps and all of them are checked.
    pub fn is_complete(&self, routine: &Routine, session: Session) -> bool {
        let steps = routine.steps(session);
        !steps.is_empty() && steps.iter().all(|s| self.is_done(session, s.title))
    }

    pub fn reset(&mut self) {
        self.am.clear();
        self.pm.clear();
    }
}
