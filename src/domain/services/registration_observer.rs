use crate::domain::models::outcome::RegistrationPhase;

/// Watches a registration attempt without influencing it
pub trait RegistrationObserver: Send + Sync {
    fn on_phase(&self, phase: RegistrationPhase) {
        self.note(&format!("Entering phase: {}", phase));
    }

    fn note(&self, message: &str);
}
