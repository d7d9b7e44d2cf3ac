//! Clock-injected idle session state machine.
//!
//! Every operation takes `now` explicitly, so the machine itself never sleeps
//! and never reads a clock. [`super::IdleSessionHandle`] drives it from a tokio task.

use log::*;
use service::config::Config;
use std::time::Duration;
use tokio::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdleTimerConfig {
    /// Inactivity before the warning is shown.
    pub warning_after: Duration,
    /// Inactivity before the session is signed out regardless of the countdown.
    pub logout_after: Duration,
    /// Seconds shown on the countdown once the warning is up.
    pub countdown_secs: u32,
    /// Countdown resolution.
    pub tick: Duration,
}

impl Default for IdleTimerConfig {
    fn default() -> Self {
        Self {
            warning_after: Duration::from_secs(28 * 60),
            logout_after: Duration::from_secs(30 * 60),
            countdown_secs: 30,
            tick: Duration::from_secs(1),
        }
    }
}

impl From<&Config> for IdleTimerConfig {
    /// A warning configured at or after the logout is clamped to the logout instant.
    fn from(config: &Config) -> Self {
        let logout_after = config.idle_logout_after();
        let mut warning_after = config.idle_warning_after();
        if warning_after >= logout_after {
            warn!(
                "Idle warning ({}s) is not before idle logout ({}s); warning at logout instead",
                warning_after.as_secs(),
                logout_after.as_secs()
            );
            warning_after = logout_after;
        }

        Self {
            warning_after,
            logout_after,
            countdown_secs: config.idle_countdown_secs,
            tick: Duration::from_secs(1),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdlePhase {
    /// Not armed: nobody is signed in.
    Inactive,
    Active,
    /// Warning shown; the countdown runs when the page has somewhere to show it.
    Warning,
    /// Terminal.
    LoggedOut,
}

/// What a call to [`IdleTimer::advance`] observed, in the order it happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdleEvent {
    WarningDue,
    CountdownTick(u32),
    SignOut,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Countdown {
    remaining: u32,
    next_tick: Instant,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Deadline {
    Warning,
    Logout,
    Tick,
}

/// Owned idle timer state: the last activity, both deadlines and the countdown.
///
/// The warning and logout deadlines are tracked separately and rescheduled
/// together, so a reset can never leave a stale deadline behind.
#[derive(Debug, Clone)]
pub struct IdleTimer {
    config: IdleTimerConfig,
    phase: IdlePhase,
    last_activity_at: Option<Instant>,
    warning_at: Option<Instant>,
    logout_at: Option<Instant>,
    countdown: Option<Countdown>,
}

impl IdleTimer {
    pub fn new(config: IdleTimerConfig) -> Self {
        Self {
            config,
            phase: IdlePhase::Inactive,
            last_activity_at: None,
            warning_at: None,
            logout_at: None,
            countdown: None,
        }
    }

    pub fn config(&self) -> &IdleTimerConfig {
        &self.config
    }

    pub fn phase(&self) -> IdlePhase {
        self.phase
    }

    pub fn last_activity_at(&self) -> Option<Instant> {
        self.last_activity_at
    }

    pub fn warning_armed(&self) -> bool {
        self.warning_at.is_some()
    }

    pub fn countdown_remaining(&self) -> Option<u32> {
        self.countdown.map(|c| c.remaining)
    }

    /// Arms the timer for a signed-in user. Returns whether it armed.
    pub fn arm(&mut self, now: Instant, signed_in: bool) -> bool {
        if !signed_in || self.phase != IdlePhase::Inactive {
            return false;
        }
        self.reschedule(now);
        true
    }

    /// Records user activity. Returns whether the timer was running to be reset.
    pub fn reset(&mut self, now: Instant) -> bool {
        match self.phase {
            IdlePhase::Active | IdlePhase::Warning => {
                self.reschedule(now);
                true
            }
            IdlePhase::Inactive | IdlePhase::LoggedOut => false,
        }
    }

    /// Same as [`IdleTimer::reset`]; the caller also hides the warning.
    pub fn stay_logged_in(&mut self, now: Instant) -> bool {
        self.reset(now)
    }

    /// Disarms the timer without signing out.
    pub fn cancel(&mut self) {
        if self.phase == IdlePhase::LoggedOut {
            return;
        }
        self.clear();
        self.phase = IdlePhase::Inactive;
    }

    /// Ends the session now. Returns true only on the transition into `LoggedOut`.
    pub fn force_logout(&mut self) -> bool {
        match self.phase {
            IdlePhase::Active | IdlePhase::Warning => {
                self.log_out();
                true
            }
            IdlePhase::Inactive | IdlePhase::LoggedOut => false,
        }
    }

    /// Starts the visible countdown. Only meaningful in `Warning`, and only once per warning.
    pub fn start_countdown(&mut self, now: Instant) -> bool {
        if self.phase != IdlePhase::Warning || self.countdown.is_some() {
            return false;
        }
        self.countdown = Some(Countdown {
            remaining: self.config.countdown_secs,
            next_tick: now + self.config.tick,
        });
        true
    }

    /// Earliest pending deadline, if the timer is running.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.next().map(|(at, _)| at)
    }

    /// Fires every deadline due at `now`, earliest first.
    pub fn advance(&mut self, now: Instant) -> Vec<IdleEvent> {
        let mut events = Vec::new();

        while let Some((at, deadline)) = self.next() {
            if at > now {
                break;
            }
            match deadline {
                Deadline::Warning => {
                    self.warning_at = None;
                    self.phase = IdlePhase::Warning;
                    events.push(IdleEvent::WarningDue);
                }
                Deadline::Logout => {
                    self.log_out();
                    events.push(IdleEvent::SignOut);
                }
                Deadline::Tick => {
                    let Some(countdown) = self.countdown.as_mut() else {
                        break;
                    };
                    countdown.remaining = countdown.remaining.saturating_sub(1);
                    countdown.next_tick += self.config.tick;
                    let remaining = countdown.remaining;
                    events.push(IdleEvent::CountdownTick(remaining));
                    if remaining == 0 {
                        self.log_out();
                        events.push(IdleEvent::SignOut);
                    }
                }
            }
        }

        events
    }

    fn next(&self) -> Option<(Instant, Deadline)> {
        let candidates = [
            self.warning_at.map(|at| (at, Deadline::Warning)),
            self.logout_at.map(|at| (at, Deadline::Logout)),
            self.countdown.map(|c| (c.next_tick, Deadline::Tick)),
        ];
        candidates.into_iter().flatten().min_by_key(|(at, _)| *at)
    }

    fn reschedule(&mut self, now: Instant) {
        self.clear();
        self.last_activity_at = Some(now);
        // A deadline past the end of the clock never fires.
        self.warning_at = now.checked_add(self.config.warning_after);
        self.logout_at = now.checked_add(self.config.logout_after);
        self.phase = IdlePhase::Active;
    }

    fn log_out(&mut self) {
        self.clear();
        self.phase = IdlePhase::LoggedOut;
    }

    fn clear(&mut self) {
        self.warning_at = None;
        self.logout_at = None;
        self.countdown = None;
    }
}
