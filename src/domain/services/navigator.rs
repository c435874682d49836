use crate::domain::models::outcome::NavigationTarget;

/// Moves the actor to another surface once a registration attempt settles
pub trait Navigator: Send + Sync {
    fn navigate(&self, target: NavigationTarget);
}
