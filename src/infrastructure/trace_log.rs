use chrono::Local;
use parking_lot::Mutex;
use tracing::info;

use crate::domain::{
    models::outcome::RegistrationPhase, services::registration_observer::RegistrationObserver,
};

/// Timestamped, human-readable trace of the latest registration attempt.
///
/// Every line is also logged at `info`.
#[derive(Debug, Default)]
pub struct TraceLog {
    entries: Mutex<Vec<String>>,
}

impl TraceLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<String> {
        self.entries.lock().clone()
    }
}

impl RegistrationObserver for TraceLog {
    fn on_phase(&self, phase: RegistrationPhase) {
        // a new attempt starts a fresh trace
        if phase == RegistrationPhase::Validating {
            self.entries.lock().clear();
        }
        self.note(&format!("Entering phase: {}", phase));
    }

    fn note(&self, message: &str) {
        let line = format!("{}: {}", Local::now().format("%H:%M:%S"), message);
        info!("{}", line);
        self.entries.lock().push(line);
    }
}

#[cfg(test)]
mod tests {
    use tracing_test::traced_test;

    use super::*;

    #[test]
    fn entries_are_timestamped_in_order() {
        let trace = TraceLog::new();
        trace.note("first");
        trace.on_phase(RegistrationPhase::CreatingIdentity);

        let entries = trace.entries();
        assert_eq!(entries.len(), 2);
        assert!(entries[0].ends_with(": first"));
        assert!(entries[1].ends_with(": Entering phase: creating identity"));
        // HH:MM:SS prefix
        assert_eq!(entries[0].as_bytes()[2], b':');
        assert_eq!(entries[0].as_bytes()[5], b':');
    }

    #[test]
    fn validating_starts_a_fresh_trace() {
        let trace = TraceLog::new();
        trace.note("left over from the previous attempt");
        trace.on_phase(RegistrationPhase::Validating);

        let entries = trace.entries();
        assert_eq!(entries.len(), 1);
        assert!(entries[0].ends_with(": Entering phase: validating"));
    }

    #[traced_test]
    #[test]
    fn lines_are_emitted_as_logs() {
        let trace = TraceLog::new();
        trace.note("Creating user account...");
        assert!(logs_contain("Creating user account..."));
    }
}
