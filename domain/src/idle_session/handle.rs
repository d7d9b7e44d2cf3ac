use super::surface::{ActivityEvent, SessionSurface};
use super::timer::{IdleEvent, IdlePhase, IdleTimer, IdleTimerConfig};
use log::*;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{sleep_until, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Activity(ActivityEvent),
    StayLoggedIn,
    ForceLogout,
    Cancel,
}

/// Runs an [`IdleTimer`] against a [`SessionSurface`] on its own tokio task.
///
/// The task owns the timer, so deadlines are only ever rescheduled in one place.
/// Dropping the handle stops the task.
pub struct IdleSessionHandle {
    commands: mpsc::UnboundedSender<Command>,
    phase: watch::Receiver<IdlePhase>,
    task: JoinHandle<()>,
}

impl IdleSessionHandle {
    /// Arms a timer for the surface and starts driving it.
    ///
    /// When the surface is not signed in the timer stays `Inactive` and every
    /// method on the handle is a no-op.
    pub fn spawn<S>(config: IdleTimerConfig, surface: S) -> Self
    where
        S: SessionSurface + 'static,
    {
        let mut timer = IdleTimer::new(config);
        if timer.arm(Instant::now(), surface.is_signed_in()) {
            debug!(
                "Idle session timer armed: warning after {:?}, logout after {:?}",
                config.warning_after, config.logout_after
            );
        } else {
            debug!("No signed-in user, idle session timer not armed");
        }

        let (commands, receiver) = mpsc::unbounded_channel();
        let (phase_tx, phase) = watch::channel(timer.phase());
        let task = tokio::spawn(run(timer, surface, receiver, phase_tx));

        Self {
            commands,
            phase,
            task,
        }
    }

    pub fn phase(&self) -> IdlePhase {
        *self.phase.borrow()
    }

    pub fn activity(&self, event: ActivityEvent) {
        self.send(Command::Activity(event));
    }

    /// Keeps the session alive and hides the warning.
    pub fn stay_logged_in(&self) {
        self.send(Command::StayLoggedIn);
    }

    pub fn force_logout(&self) {
        self.send(Command::ForceLogout);
    }

    /// Disarms the timer without signing out.
    pub fn cancel(&self) {
        self.send(Command::Cancel);
    }

    fn send(&self, command: Command) {
        // The task is gone once the session ended; late commands are ignored.
        if self.commands.send(command).is_err() {
            trace!("Idle session already ended, ignoring {command:?}");
        }
    }
}

impl Drop for IdleSessionHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn run<S: SessionSurface>(
    mut timer: IdleTimer,
    mut surface: S,
    mut commands: mpsc::UnboundedReceiver<Command>,
    phase: watch::Sender<IdlePhase>,
) {
    while let Some(deadline) = timer.next_deadline() {
        let command = tokio::select! {
            _ = sleep_until(deadline) => None,
            command = commands.recv() => match command {
                Some(command) => Some(command),
                None => return,
            },
        };

        let now = Instant::now();
        match command {
            Some(Command::Activity(event)) => {
                trace!("Activity ({event}), resetting idle session timer");
                timer.reset(now);
            }
            Some(Command::StayLoggedIn) => {
                if timer.stay_logged_in(now) {
                    debug!("User chose to stay signed in");
                    surface.hide_warning();
                }
            }
            Some(Command::ForceLogout) => {
                if timer.force_logout() {
                    info!("Signing out on request");
                    surface.sign_out();
                }
            }
            Some(Command::Cancel) => {
                timer.cancel();
                surface.hide_warning();
            }
            None => {}
        }

        for event in timer.advance(now) {
            match event {
                IdleEvent::WarningDue => {
                    if surface.show_warning() {
                        timer.start_countdown(now);
                    } else {
                        debug!("No warning modal on this page, skipping countdown");
                    }
                }
                IdleEvent::CountdownTick(remaining) => surface.render_countdown(remaining),
                IdleEvent::SignOut => {
                    info!("Idle session expired, signing out");
                    surface.sign_out();
                }
            }
        }

        phase.send_replace(timer.phase());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;
    use tokio::time::sleep;

    const MINUTE: Duration = Duration::from_secs(60);
    const HALF_SECOND: Duration = Duration::from_millis(500);

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Call {
        ShowWarning,
        HideWarning,
        Countdown(u32),
        SignOut,
    }

    #[derive(Clone)]
    struct RecordingSurface {
        signed_in: bool,
        has_modal: bool,
        calls: Arc<Mutex<Vec<Call>>>,
    }

    impl RecordingSurface {
        fn new(signed_in: bool, has_modal: bool) -> Self {
            Self {
                signed_in,
                has_modal,
                calls: Arc::new(Mutex::new(Vec::new())),
            }
        }

        fn calls(&self) -> Vec<Call> {
            self.calls.lock().unwrap().clone()
        }

        fn count(&self, call: Call) -> usize {
            self.calls().iter().filter(|c| **c == call).count()
        }

        fn countdowns(&self) -> Vec<u32> {
            self.calls()
                .iter()
                .filter_map(|c| match c {
                    Call::Countdown(n) => Some(*n),
                    _ => None,
                })
                .collect()
        }

        fn record(&self, call: Call) {
            self.calls.lock().unwrap().push(call);
        }
    }

    impl SessionSurface for RecordingSurface {
        fn is_signed_in(&self) -> bool {
            self.signed_in
        }

        fn show_warning(&mut self) -> bool {
            if self.has_modal {
                self.record(Call::ShowWarning);
            }
            self.has_modal
        }

        fn hide_warning(&mut self) {
            self.record(Call::HideWarning);
        }

        fn render_countdown(&mut self, remaining: u32) {
            self.record(Call::Countdown(remaining));
        }

        fn sign_out(&mut self) {
            self.record(Call::SignOut);
        }
    }

    fn spawn(surface: &RecordingSurface) -> IdleSessionHandle {
        IdleSessionHandle::spawn(IdleTimerConfig::default(), surface.clone())
    }

    #[tokio::test(start_paused = true)]
    async fn test_activity_at_minute_27_delays_warning_to_minute_55() {
        let surface = RecordingSurface::new(true, true);
        let handle = spawn(&surface);

        sleep(27 * MINUTE).await;
        handle.activity(ActivityEvent::KeyPress);

        sleep(28 * MINUTE - HALF_SECOND).await;
        assert_eq!(surface.count(Call::ShowWarning), 0);
        assert_eq!(handle.phase(), IdlePhase::Active);

        sleep(Duration::from_secs(1)).await;
        assert_eq!(surface.count(Call::ShowWarning), 1);
        assert_eq!(handle.phase(), IdlePhase::Warning);
    }

    #[tokio::test(start_paused = true)]
    async fn test_logged_out_thirty_seconds_after_warning() {
        let surface = RecordingSurface::new(true, true);
        let handle = spawn(&surface);

        sleep(28 * MINUTE + HALF_SECOND).await;
        assert_eq!(surface.calls(), vec![Call::ShowWarning]);

        sleep(Duration::from_secs(29)).await;
        assert_eq!(handle.phase(), IdlePhase::Warning);
        assert_eq!(surface.countdowns(), (1..=29).rev().collect::<Vec<_>>());
        assert_eq!(surface.count(Call::SignOut), 0);

        sleep(Duration::from_secs(1)).await;
        assert_eq!(handle.phase(), IdlePhase::LoggedOut);
        assert_eq!(surface.countdowns().last(), Some(&0));
        assert_eq!(surface.count(Call::SignOut), 1);

        sleep(60 * MINUTE).await;
        handle.activity(ActivityEvent::Click);
        handle.force_logout();
        sleep(MINUTE).await;
        assert_eq!(surface.count(Call::SignOut), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stay_logged_in_cancels_countdown() {
        let surface = RecordingSurface::new(true, true);
        let handle = spawn(&surface);

        sleep(28 * MINUTE + Duration::from_secs(10) + HALF_SECOND).await;
        assert_eq!(surface.countdowns().len(), 10);

        handle.stay_logged_in();
        sleep(Duration::from_secs(5)).await;

        assert_eq!(handle.phase(), IdlePhase::Active);
        assert_eq!(surface.count(Call::HideWarning), 1);
        assert_eq!(surface.countdowns().len(), 10);

        sleep(27 * MINUTE).await;
        assert_eq!(surface.count(Call::SignOut), 0);
        assert_eq!(surface.count(Call::ShowWarning), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_activity_during_warning_stops_countdown() {
        let surface = RecordingSurface::new(true, true);
        let handle = spawn(&surface);

        sleep(28 * MINUTE + Duration::from_secs(3) + HALF_SECOND).await;
        handle.activity(ActivityEvent::PointerMove);
        sleep(MINUTE).await;

        assert_eq!(handle.phase(), IdlePhase::Active);
        assert_eq!(surface.countdowns(), vec![29, 28, 27]);
        assert_eq!(surface.count(Call::SignOut), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_missing_modal_falls_back_to_absolute_deadline() {
        let surface = RecordingSurface::new(true, false);
        let handle = spawn(&surface);

        sleep(29 * MINUTE + Duration::from_secs(59)).await;
        assert_eq!(handle.phase(), IdlePhase::Warning);
        assert!(surface.calls().is_empty());

        sleep(Duration::from_secs(2)).await;
        assert_eq!(handle.phase(), IdlePhase::LoggedOut);
        assert_eq!(surface.calls(), vec![Call::SignOut]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_not_signed_in_never_arms() {
        let surface = RecordingSurface::new(false, true);
        let handle = spawn(&surface);

        handle.activity(ActivityEvent::Scroll);
        handle.stay_logged_in();
        handle.force_logout();
        sleep(120 * MINUTE).await;

        assert_eq!(handle.phase(), IdlePhase::Inactive);
        assert!(surface.calls().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_force_logout_signs_out_once() {
        let surface = RecordingSurface::new(true, true);
        let handle = spawn(&surface);

        handle.force_logout();
        handle.force_logout();
        sleep(Duration::from_secs(1)).await;

        assert_eq!(handle.phase(), IdlePhase::LoggedOut);
        assert_eq!(surface.calls(), vec![Call::SignOut]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_disarms_without_signing_out() {
        let surface = RecordingSurface::new(true, true);
        let handle = spawn(&surface);

        handle.cancel();
        sleep(60 * MINUTE).await;

        assert_eq!(handle.phase(), IdlePhase::Inactive);
        assert_eq!(surface.calls(), vec![Call::HideWarning]);
    }
}
