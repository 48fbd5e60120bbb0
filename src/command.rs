//! Free-text command intake.
//!
//! [`CommandSurface`] sits in front of an [`Interpreter`] and enforces the
//! one-at-a-time contract: `submit` hands the text to a worker thread that
//! snapshots the shared parameters and calls the interpreter, `poll`
//! collects the outcome without blocking the frame loop. The surface never
//! merges anything itself; the caller applies accepted updates so all writes
//! to the shared parameters happen on one thread.
//!
//! [`run_command_pump`] is the console driver built on top: it feeds lines
//! from any receiver through the surface (or straight through the JSON
//! parser) and forwards accepted updates to the frame loop.

use std::collections::VecDeque;
use std::fmt;
use std::io::{self, BufRead};
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use crate::interpret::Interpreter;
use crate::params::{ParamSet, ParamUpdate};

/// Accepted commands kept for recall, newest first.
pub const HISTORY_LIMIT: usize = 10;

/// The one user-facing message for any interpretation failure.
pub const FAILURE_MESSAGE: &str = "System malfunction. The stars are silent. Try again.";

/// Why a submission was not started.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandError {
    /// A previous command is still being interpreted.
    Busy,
    /// The input was blank.
    Empty,
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandError::Busy => write!(f, "A command is already being interpreted."),
            CommandError::Empty => write!(f, "Empty command."),
        }
    }
}

impl std::error::Error for CommandError {}

/// The result of one submitted command.
#[derive(Debug, Clone)]
pub enum CommandOutcome {
    /// The service produced an update; the caller merges it.
    Applied { input: String, update: ParamUpdate },
    /// Interpretation failed; parameters are untouched.
    Failed { input: String, message: String },
}

/// One-at-a-time command intake in front of an interpreter.
pub struct CommandSurface {
    interpreter: Arc<dyn Interpreter>,
    params: Arc<Mutex<ParamSet>>,
    outcome_tx: Sender<CommandOutcome>,
    outcome_rx: Receiver<CommandOutcome>,
    busy: bool,
    history: VecDeque<String>,
}

impl CommandSurface {
    pub fn new(interpreter: Arc<dyn Interpreter>, params: Arc<Mutex<ParamSet>>) -> Self {
        let (outcome_tx, outcome_rx) = mpsc::channel();
        Self {
            interpreter,
            params,
            outcome_tx,
            outcome_rx,
            busy: false,
            history: VecDeque::with_capacity(HISTORY_LIMIT),
        }
    }

    /// Hand a command to a worker thread for interpretation.
    ///
    /// Blank input is rejected, and a new command cannot start while one is
    /// in flight. The worker reads a parameter snapshot at call time, so the
    /// interpreter sees the state the user was looking at.
    pub fn submit(&mut self, text: &str) -> Result<(), CommandError> {
        if self.busy {
            return Err(CommandError::Busy);
        }
        let text = text.trim().to_owned();
        if text.is_empty() {
            return Err(CommandError::Empty);
        }

        self.busy = true;
        let interpreter = Arc::clone(&self.interpreter);
        let params = Arc::clone(&self.params);
        let outcome_tx = self.outcome_tx.clone();
        thread::spawn(move || {
            let snapshot = params.lock().unwrap().clone();
            let outcome = match interpreter.interpret(&text, &snapshot) {
                Ok(update) => CommandOutcome::Applied { input: text, update },
                Err(err) => {
                    eprintln!("interpretation failed: {}", err);
                    CommandOutcome::Failed {
                        input: text,
                        message: FAILURE_MESSAGE.to_owned(),
                    }
                }
            };
            // The surface may be gone if the app is shutting down.
            let _ = outcome_tx.send(outcome);
        });
        Ok(())
    }

    /// Collect the outcome of the in-flight command, if it finished.
    ///
    /// Accepted commands enter the history, newest first, verbatim as typed.
    pub fn poll(&mut self) -> Option<CommandOutcome> {
        match self.outcome_rx.try_recv() {
            Ok(outcome) => {
                self.busy = false;
                if let CommandOutcome::Applied { input, .. } = &outcome {
                    self.history.push_front(input.clone());
                    self.history.truncate(HISTORY_LIMIT);
                }
                Some(outcome)
            }
            Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => None,
        }
    }

    #[inline]
    pub fn is_busy(&self) -> bool {
        self.busy
    }

    /// Accepted commands, newest first.
    pub fn history(&self) -> impl Iterator<Item = &str> {
        self.history.iter().map(String::as_str)
    }
}

/// Drive a command surface from a stream of input lines.
///
/// Lines starting with `{` are treated as raw parameter JSON and merged
/// directly, skipping the interpreter. Everything else goes through the
/// surface, waiting for each outcome before reading the next line. Accepted
/// updates are forwarded over `updates`; the function returns when the line
/// source closes or the frame loop stops listening.
pub fn run_command_pump(
    mut surface: Option<CommandSurface>,
    lines: Receiver<String>,
    updates: Sender<ParamUpdate>,
) {
    for line in lines {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        if line.starts_with('{') {
            match ParamUpdate::from_json(line) {
                Ok(update) => {
                    if updates.send(update).is_err() {
                        return;
                    }
                    println!("merged");
                }
                Err(err) => eprintln!("bad parameter JSON: {}", err),
            }
            continue;
        }

        let Some(surface) = surface.as_mut() else {
            eprintln!(
                "no interpreter configured; send parameter JSON instead, \
                 e.g. {{\"mode\": \"vortex\", \"speed\": 2}}"
            );
            continue;
        };

        if let Err(err) = surface.submit(line) {
            eprintln!("{}", err);
            continue;
        }
        let outcome = loop {
            match surface.poll() {
                Some(outcome) => break outcome,
                None => thread::sleep(Duration::from_millis(25)),
            }
        };
        match outcome {
            CommandOutcome::Applied { input, update } => {
                if updates.send(update).is_err() {
                    return;
                }
                println!("ok: {}", input);
            }
            CommandOutcome::Failed { message, .. } => println!("{}", message),
        }
    }
}

/// Forward stdin lines into a command feed until EOF.
pub fn spawn_stdin_feed(feed: Sender<String>) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        let stdin = io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            if feed.send(line).is_err() {
                break;
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interpret::InterpretError;
    use crate::params::Mode;

    /// Interpreter that answers from a fixed table after an optional delay.
    struct Scripted {
        delay: Duration,
    }

    impl Interpreter for Scripted {
        fn interpret(
            &self,
            prompt: &str,
            _current: &ParamSet,
        ) -> Result<ParamUpdate, InterpretError> {
            thread::sleep(self.delay);
            match prompt {
                "go chaotic" => Ok(ParamUpdate {
                    mode: Some(Mode::Chaos),
                    ..Default::default()
                }),
                _ => Err(InterpretError::Unreachable("no canned answer".into())),
            }
        }
    }

    fn surface_with_delay(delay: Duration) -> (CommandSurface, Arc<Mutex<ParamSet>>) {
        let params = Arc::new(Mutex::new(ParamSet::default()));
        let surface = CommandSurface::new(Arc::new(Scripted { delay }), Arc::clone(&params));
        (surface, params)
    }

    fn wait_for_outcome(surface: &mut CommandSurface) -> CommandOutcome {
        for _ in 0..400 {
            if let Some(outcome) = surface.poll() {
                return outcome;
            }
            thread::sleep(Duration::from_millis(5));
        }
        panic!("no outcome within two seconds");
    }

    #[test]
    fn test_blank_input_is_rejected() {
        let (mut surface, _) = surface_with_delay(Duration::ZERO);
        assert_eq!(surface.submit("   "), Err(CommandError::Empty));
        assert!(!surface.is_busy());
    }

    #[test]
    fn test_busy_until_polled() {
        let (mut surface, _) = surface_with_delay(Duration::from_millis(100));
        surface.submit("go chaotic").unwrap();
        assert!(surface.is_busy());
        assert_eq!(surface.submit("another"), Err(CommandError::Busy));

        let outcome = wait_for_outcome(&mut surface);
        assert!(matches!(outcome, CommandOutcome::Applied { .. }));
        assert!(!surface.is_busy());
        assert!(surface.submit("go chaotic").is_ok());
    }

    #[test]
    fn test_applied_outcome_carries_the_update() {
        let (mut surface, params) = surface_with_delay(Duration::ZERO);
        surface.submit("go chaotic").unwrap();

        match wait_for_outcome(&mut surface) {
            CommandOutcome::Applied { input, update } => {
                assert_eq!(input, "go chaotic");
                assert_eq!(update.mode, Some(Mode::Chaos));
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
        // The surface itself never merges.
        assert_eq!(params.lock().unwrap().mode, Mode::Galaxy);
    }

    #[test]
    fn test_failure_reports_the_generic_message() {
        let (mut surface, params) = surface_with_delay(Duration::ZERO);
        let before = params.lock().unwrap().clone();
        surface.submit("anything unknown").unwrap();

        match wait_for_outcome(&mut surface) {
            CommandOutcome::Failed { message, .. } => assert_eq!(message, FAILURE_MESSAGE),
            other => panic!("unexpected outcome: {:?}", other),
        }
        assert_eq!(*params.lock().unwrap(), before);
        assert_eq!(surface.history().count(), 0);
    }

    #[test]
    fn test_history_is_newest_first_and_capped() {
        let (mut surface, _) = surface_with_delay(Duration::ZERO);
        for _ in 0..(HISTORY_LIMIT + 3) {
            surface.submit("go chaotic").unwrap();
            wait_for_outcome(&mut surface);
        }
        assert_eq!(surface.history().count(), HISTORY_LIMIT);

        surface.submit("  go chaotic  ").unwrap();
        wait_for_outcome(&mut surface);
        assert_eq!(surface.history().next(), Some("go chaotic"));
        assert_eq!(surface.history().count(), HISTORY_LIMIT);
    }

    #[test]
    fn test_pump_merges_raw_json_without_interpreter() {
        let (lines_tx, lines_rx) = mpsc::channel();
        let (updates_tx, updates_rx) = mpsc::channel();

        lines_tx.send(r#"{"speed": 2.5}"#.to_string()).unwrap();
        lines_tx.send("plain words".to_string()).unwrap();
        drop(lines_tx);
        run_command_pump(None, lines_rx, updates_tx);

        let update = updates_rx.try_recv().unwrap();
        assert_eq!(update.speed, Some(2.5));
        // The prose line had nowhere to go.
        assert!(updates_rx.try_recv().is_err());
    }

    #[test]
    fn test_pump_routes_prose_through_the_interpreter() {
        let params = Arc::new(Mutex::new(ParamSet::default()));
        let surface = CommandSurface::new(
            Arc::new(Scripted {
                delay: Duration::from_millis(10),
            }),
            params,
        );
        let (lines_tx, lines_rx) = mpsc::channel();
        let (updates_tx, updates_rx) = mpsc::channel();

        lines_tx.send("go chaotic".to_string()).unwrap();
        lines_tx.send("gibberish".to_string()).unwrap();
        drop(lines_tx);
        run_command_pump(Some(surface), lines_rx, updates_tx);

        let update = updates_rx.try_recv().unwrap();
        assert_eq!(update.mode, Some(Mode::Chaos));
        assert!(updates_rx.try_recv().is_err());
    }
}
