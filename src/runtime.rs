use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::time::Duration;

use crossterm::event::{self, Event as CtEvent, KeyEvent, KeyEventKind};

/// What the app loop reacts to: key presses, terminal resizes, and the tick
/// heartbeat that drives the results countdown.
#[derive(Clone, Debug)]
pub enum AppEvent {
    Key(KeyEvent),
    Resize,
    Tick,
}

pub trait AppEventSource: Send + 'static {
    /// Block for up to `timeout` waiting for the next event.
    fn recv_timeout(&self, timeout: Duration) -> Result<AppEvent, RecvTimeoutError>;
}

/// Terminal-backed source. A reader thread forwards crossterm events over a
/// channel so the app loop can time out into ticks.
pub struct CrosstermEventSource {
    rx: Receiver<AppEvent>,
}

impl CrosstermEventSource {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();

        std::thread::spawn(move || loop {
            let ev = match event::read() {
                // Some terminals report key releases as separate events;
                // only presses count, or one Enter would submit and advance.
                Ok(CtEvent::Key(key)) if key.kind == KeyEventKind::Press => AppEvent::Key(key),
                Ok(CtEvent::Resize(_, _)) => AppEvent::Resize,
                Ok(_) => continue,
                Err(_) => break,
            };
            if tx.send(ev).is_err() {
                break;
            }
        });

        Self { rx }
    }
}

impl Default for CrosstermEventSource {
    fn default() -> Self {
        Self::new()
    }
}

impl AppEventSource for CrosstermEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<AppEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

/// Channel-fed source for driving the app loop in tests without a terminal.
pub struct TestEventSource {
    rx: Receiver<AppEvent>,
}

impl TestEventSource {
    pub fn new(rx: Receiver<AppEvent>) -> Self {
        Self { rx }
    }
}

impl AppEventSource for TestEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<AppEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

/// Pumps the app loop: waits up to one tick interval for input and degrades
/// to `Tick` when the terminal stays quiet, so armed countdowns keep moving
/// even while the learner's hands are off the keyboard.
pub struct Runner<E: AppEventSource> {
    source: E,
    tick_rate: Duration,
}

impl<E: AppEventSource> Runner<E> {
    pub fn new(source: E, tick_rate: Duration) -> Self {
        Self { source, tick_rate }
    }

    pub fn next_event(&self) -> AppEvent {
        match self.source.recv_timeout(self.tick_rate) {
            Ok(ev) => ev,
            // Disconnection means the reader thread is gone; idle ticks let
            // the loop keep rendering until the user quits.
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => AppEvent::Tick,
        }
    }
}

/// Tick-driven delay between the final answer and the results screen.
/// Presentation state only; the quiz session never sees it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Countdown {
    remaining: Option<u8>,
}

impl Countdown {
    pub fn arm(&mut self, ticks: u8) {
        self.remaining = Some(ticks);
    }

    pub fn cancel(&mut self) {
        self.remaining = None;
    }

    pub fn is_armed(&self) -> bool {
        self.remaining.is_some()
    }

    /// Counts one tick down. Returns true exactly once, on the tick that
    /// exhausts the countdown; a disarmed countdown ignores ticks.
    pub fn tick(&mut self) -> bool {
        match self.remaining {
            Some(n) if n <= 1 => {
                self.remaining = None;
                true
            }
            Some(n) => {
                self.remaining = Some(n - 1);
                false
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyCode, KeyModifiers};
    use std::sync::mpsc;

    #[test]
    fn runner_delivers_pending_keys_before_ticking() {
        let (tx, rx) = mpsc::channel();
        let answer = KeyEvent::new(KeyCode::Char('2'), KeyModifiers::NONE);
        tx.send(AppEvent::Key(answer)).unwrap();
        tx.send(AppEvent::Resize).unwrap();
        let runner = Runner::new(TestEventSource::new(rx), Duration::from_millis(10));

        match runner.next_event() {
            AppEvent::Key(k) => assert_eq!(k.code, KeyCode::Char('2')),
            other => panic!("expected the queued key, got {other:?}"),
        }
        assert!(matches!(runner.next_event(), AppEvent::Resize));
        // Queue drained and the sender dropped: only ticks from here on
        drop(tx);
        assert!(matches!(runner.next_event(), AppEvent::Tick));
        assert!(matches!(runner.next_event(), AppEvent::Tick));
    }

    #[test]
    fn runner_ticks_on_quiet_terminal() {
        let (_tx, rx) = mpsc::channel();
        let runner = Runner::new(TestEventSource::new(rx), Duration::from_millis(1));

        assert!(matches!(runner.next_event(), AppEvent::Tick));
    }

    #[test]
    fn countdown_fires_exactly_once() {
        let mut countdown = Countdown::default();
        countdown.arm(3);

        assert!(!countdown.tick());
        assert!(!countdown.tick());
        assert!(countdown.tick());
        assert!(!countdown.is_armed());
        // Spent countdowns stay quiet on further ticks
        assert!(!countdown.tick());
    }

    #[test]
    fn countdown_cancel_disarms() {
        let mut countdown = Countdown::default();
        countdown.arm(5);
        countdown.cancel();

        assert!(!countdown.is_armed());
        assert!(!countdown.tick());
    }

    #[test]
    fn countdown_starts_disarmed() {
        let mut countdown = Countdown::default();
        assert!(!countdown.is_armed());
        assert!(!countdown.tick());
    }
}
