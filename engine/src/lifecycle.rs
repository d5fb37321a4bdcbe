use std::cell::Cell;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

/// Hands control to another scene. Fire-and-forget: nothing is awaited or returned.
pub trait SceneLoader {
    fn load_scene(&mut self, index: usize);
}

/// Ends the session. Production hosts exit the process; tooling hosts just stop simulating.
pub trait Terminate {
    fn quit(&mut self);
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuitStrategy {
    #[default]
    ExitProcess,
    StopSimulation,
}

impl QuitStrategy {
    /// Builds the capability. `stop` is the flag a `StopSimulation` strategy raises.
    pub fn build(self, stop: &StopSimulation) -> Box<dyn Terminate> {
        match self {
            QuitStrategy::ExitProcess => Box::new(ExitProcess::default()),
            QuitStrategy::StopSimulation => Box::new(stop.clone()),
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ExitProcess {
    pub code: i32,
}

impl Terminate for ExitProcess {
    fn quit(&mut self) {
        tracing::info!(code = self.code, "exiting process");
        std::process::exit(self.code);
    }
}

/// Raises a flag instead of exiting, the way an editor stops play mode.
#[derive(Debug, Clone, Default)]
pub struct StopSimulation {
    stopped: Rc<Cell<bool>>,
}

impl StopSimulation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped.get()
    }
}

impl Terminate for StopSimulation {
    fn quit(&mut self) {
        tracing::info!("stopping simulation");
        self.stopped.set(true);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stop_simulation_is_observable_through_clones() {
        let observer = StopSimulation::new();
        let mut handle = observer.clone();
        assert!(!observer.is_stopped());
        handle.quit();
        assert!(observer.is_stopped());
    }

    #[test]
    fn quit_strategy_uses_snake_case_names() {
        let parsed: QuitStrategy =
            serde_json::from_str(r#""stop_simulation""#).expect("strategy should parse");
        assert_eq!(parsed, QuitStrategy::StopSimulation);
        assert_eq!(QuitStrategy::default(), QuitStrategy::ExitProcess);
    }

    #[test]
    fn stop_strategy_raises_the_shared_flag() {
        let stop = StopSimulation::new();
        let mut terminate = QuitStrategy::StopSimulation.build(&stop);
        terminate.quit();
        assert!(stop.is_stopped());
    }
}
