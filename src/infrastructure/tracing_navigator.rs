use tracing::info;

use crate::domain::{models::outcome::NavigationTarget, services::navigator::Navigator};

/// Server-side navigator. Clients follow `navigate_to` from the response,
/// so all that is left to do here is record the hand-off.
#[derive(Debug, Clone, Default)]
pub struct TracingNavigator;

impl Navigator for TracingNavigator {
    fn navigate(&self, target: NavigationTarget) {
        info!(path = target.path(), "navigating");
    }
}
