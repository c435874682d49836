use std::{collections::HashSet, panic::AssertUnwindSafe, sync::Arc, time::Duration};

use futures::FutureExt;
use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};

use crate::domain::{
    error::{DomainError, IdentityError, StoreError},
    models::{
        driver::DriverProfile,
        identity::{ActorRole, IdentityId, IdentityMetadata, IdentityReceipt, NewIdentity},
        outcome::{
            InsertFailureKind, NavigationTarget, RegistrationOutcome, RegistrationPhase,
            RegistrationReport, ScheduledNavigation, UnreachableCause,
        },
        registration::RegistrationInput,
    },
    repositories::driver_repository::{DRIVERS_COLLECTION, DriverRepository},
    services::{
        identity_service::IdentityService, insert_failure_classifier,
        navigator::Navigator, registration_observer::RegistrationObserver,
    },
};

/// Timing knobs for the registration flow
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrationConfig {
    /// Wait after identity creation so the new identity is visible to
    /// subsequent reads. Works around replication lag in the identity backend.
    pub identity_propagation_delay: Duration,
    /// Delay before sending the actor to the login page after a link timing failure.
    pub login_redirect_delay: Duration,
}

impl Default for RegistrationConfig {
    fn default() -> Self {
        Self {
            identity_propagation_delay: Duration::from_millis(1000),
            login_redirect_delay: Duration::from_millis(3000),
        }
    }
}

impl RegistrationConfig {
    pub fn immediate() -> Self {
        Self {
            identity_propagation_delay: Duration::ZERO,
            login_redirect_delay: Duration::ZERO,
        }
    }
}

/// Submitters with a registration attempt in flight, keyed by normalized email.
///
/// Attempts from different submitters run side by side; a second attempt for
/// an email that is already in flight is refused.
#[derive(Debug, Clone, Default)]
pub struct InFlightSubmissions(Arc<Mutex<HashSet<String>>>);

impl InFlightSubmissions {
    pub fn is_submitting(&self, email: &str) -> bool {
        self.0.lock().contains(&submitter_key(email))
    }

    pub fn is_empty(&self) -> bool {
        self.0.lock().is_empty()
    }

    fn acquire(&self, email: &str) -> Option<SubmissionGuard> {
        let key = submitter_key(email);
        if !self.0.lock().insert(key.clone()) {
            return None;
        }
        Some(SubmissionGuard {
            submissions: Arc::clone(&self.0),
            key,
        })
    }
}

fn submitter_key(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Removes its submitter from the in-flight set when dropped, on every exit path.
struct SubmissionGuard {
    submissions: Arc<Mutex<HashSet<String>>>,
    key: String,
}

impl Drop for SubmissionGuard {
    fn drop(&mut self) {
        self.submissions.lock().remove(&self.key);
    }
}

/// Per-attempt bookkeeping: visited phases and observer notifications
struct Attempt {
    phases: Vec<RegistrationPhase>,
    observer: Option<Arc<dyn RegistrationObserver>>,
}

impl Attempt {
    fn new(observer: Option<Arc<dyn RegistrationObserver>>) -> Self {
        Self {
            phases: Vec::with_capacity(7),
            observer,
        }
    }

    fn enter(&mut self, phase: RegistrationPhase) {
        debug!(%phase, "registration phase");
        if let Some(observer) = &self.observer {
            observer.on_phase(phase);
        }
        self.phases.push(phase);
    }

    fn note(&self, message: &str) {
        if let Some(observer) = &self.observer {
            observer.note(message);
        }
    }

    fn finish(&mut self, outcome: &RegistrationOutcome) {
        match outcome.failure_kind() {
            None => self.enter(RegistrationPhase::Succeeded),
            Some(kind) => self.enter(RegistrationPhase::Failed(kind)),
        }
    }
}

/// Two-phase driver registration: identity first, then the driver profile.
///
/// The two writes go to different services and are not transactional. When
/// the profile insert fails after the identity was created the identity is
/// left in place and the actor is pointed at the login page.
pub struct RegisterDriverUsecase<I: IdentityService, D: DriverRepository, N: Navigator> {
    identity_service: I,
    driver_repository: D,
    navigator: Arc<N>,
    observer: Option<Arc<dyn RegistrationObserver>>,
    config: RegistrationConfig,
    in_flight: InFlightSubmissions,
    session: CancellationToken,
}

impl<I: IdentityService, D: DriverRepository, N: Navigator> RegisterDriverUsecase<I, D, N> {
    pub fn new(
        identity_service: I,
        driver_repository: D,
        navigator: Arc<N>,
        config: RegistrationConfig,
    ) -> Self {
        Self {
            identity_service,
            driver_repository,
            navigator,
            observer: None,
            config,
            in_flight: InFlightSubmissions::default(),
            session: CancellationToken::new(),
        }
    }

    pub fn with_observer(mut self, observer: Arc<dyn RegistrationObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    pub fn with_in_flight(mut self, in_flight: InFlightSubmissions) -> Self {
        self.in_flight = in_flight;
        self
    }

    /// Whether an attempt for this submitter is running right now.
    pub fn is_loading(&self, email: &str) -> bool {
        self.in_flight.is_submitting(email)
    }

    pub fn is_idle(&self) -> bool {
        self.in_flight.is_empty()
    }

    /// Ends the surrounding session. Navigation still waiting on its delay is dropped.
    pub fn end_session(&self) {
        self.session.cancel();
    }

    /// Run one registration attempt.
    ///
    /// Every collaborator failure ends up in the report's outcome. The only
    /// error is a refusal to start while an attempt for the same email is
    /// still running.
    #[instrument(name = "driver_signup.submit", skip(self, input), fields(email = %input.email))]
    pub async fn submit(&self, input: RegistrationInput) -> Result<RegistrationReport, DomainError>
    where
        I: Send + Sync,
        D: Send + Sync,
        N: 'static,
    {
        let Some(_in_flight) = self.in_flight.acquire(&input.email) else {
            info!("registration already in flight for this email");
            return Err(DomainError::SubmissionInProgress);
        };

        let mut attempt = Attempt::new(self.observer.clone());
        let result = AssertUnwindSafe(self.run(&input, &mut attempt))
            .catch_unwind()
            .await;
        let outcome = match result {
            Ok(outcome) => outcome,
            Err(_) => {
                error!("registration attempt panicked");
                attempt.note("Unexpected error: registration attempt panicked");
                RegistrationOutcome::UnexpectedFailure
            }
        };
        attempt.finish(&outcome);

        let scheduled_navigation = self.navigate_for(&outcome);

        Ok(RegistrationReport {
            outcome,
            phases: attempt.phases,
            scheduled_navigation,
        })
    }

    async fn run(&self, input: &RegistrationInput, attempt: &mut Attempt) -> RegistrationOutcome
    where
        I: Send + Sync,
        D: Send + Sync,
    {
        attempt.enter(RegistrationPhase::Validating);
        attempt.note("Starting driver signup process...");
        if let Err(reason) = input.validate() {
            debug!(%reason, "registration input rejected");
            return RegistrationOutcome::ValidationFailure(reason);
        }

        attempt.enter(RegistrationPhase::CreatingIdentity);
        attempt.note("Creating user account...");
        let request = NewIdentity {
            email: input.email.clone(),
            password: input.password.clone(),
            metadata: IdentityMetadata {
                full_name: input.full_name.clone(),
                role: ActorRole::Driver,
            },
        };
        let receipt = match self.identity_service.create_identity(&request).await {
            Ok(receipt) => receipt,
            Err(IdentityError::Rejected { message }) => {
                info!(%message, "identity service rejected signup");
                attempt.note(&format!("Auth error: {}", message));
                return RegistrationOutcome::IdentityFailure { message };
            }
            Err(IdentityError::Unavailable(reason)) => {
                error!(%reason, "identity service unavailable");
                attempt.note(&format!("Unexpected error: {}", reason));
                return RegistrationOutcome::UnexpectedFailure;
            }
        };
        let Some(identity_id) = receipt.identity_id else {
            error!("identity service reported success without an identity id");
            attempt.note("Unexpected error: no user returned from signup");
            return RegistrationOutcome::UnexpectedFailure;
        };
        attempt.note(&format!("User created with ID: {}", identity_id));

        attempt.enter(RegistrationPhase::Settling);
        if !self.config.identity_propagation_delay.is_zero() {
            tokio::time::sleep(self.config.identity_propagation_delay).await;
        }
        self.confirm_identity(&receipt, identity_id).await;

        attempt.enter(RegistrationPhase::ProbingStore);
        match self.driver_repository.probe(1).await {
            Ok(rows) => debug!(rows, collection = DRIVERS_COLLECTION, "collection is readable"),
            Err(err) => {
                warn!(
                    %identity_id,
                    collection = DRIVERS_COLLECTION,
                    error = %err,
                    "record store unreachable; identity exists without a driver profile"
                );
                let cause = match &err {
                    StoreError::Rejected(_) => {
                        attempt.note(&format!("Database test failed: {}", err.message()));
                        UnreachableCause::Refused
                    }
                    StoreError::Unavailable(_) => {
                        attempt.note(&format!("Database connection error: {}", err.message()));
                        UnreachableCause::Transport
                    }
                };
                return RegistrationOutcome::StoreUnreachable {
                    cause,
                    message: err.message().to_string(),
                };
            }
        }

        attempt.enter(RegistrationPhase::InsertingProfile);
        attempt.note("Creating driver profile...");
        let profile = DriverProfile::pending(
            identity_id,
            input.full_name.clone(),
            input.phone_number.clone(),
        );
        attempt.note(&format!(
            "Driver data: user_id={}, full_name={}, phone_number={}, status={}",
            profile.identity_id(),
            profile.full_name(),
            profile.phone_number(),
            profile.status().as_str()
        ));

        match self.driver_repository.insert(&profile).await {
            Ok(()) => {
                info!(%identity_id, "driver profile created");
                attempt.note("Driver profile created successfully!");
                attempt.note("Redirecting to application page...");
                RegistrationOutcome::Success {
                    navigate_to: NavigationTarget::DriverApplicationForm,
                    identity_id,
                }
            }
            Err(StoreError::Rejected(failure)) => {
                let kind = insert_failure_classifier::classify(&failure);
                warn!(
                    %identity_id,
                    ?kind,
                    store_message = %failure.message,
                    details = ?failure.details,
                    hint = ?failure.hint,
                    code = ?failure.code,
                    status_code = ?failure.status_code,
                    "driver profile insert rejected; identity exists without a driver profile"
                );
                attempt.note(&format!("Driver profile error: {:?}", failure));
                RegistrationOutcome::ProfileInsertFailure {
                    kind,
                    message: failure.message,
                }
            }
            Err(StoreError::Unavailable(reason)) => {
                error!(%identity_id, %reason, "record store failed during driver insert");
                attempt.note(&format!("Unexpected error: {}", reason));
                RegistrationOutcome::UnexpectedFailure
            }
        }
    }

    /// Best-effort read-back of the new identity. Never changes the outcome.
    async fn confirm_identity(&self, receipt: &IdentityReceipt, identity_id: IdentityId)
    where
        I: Send + Sync,
    {
        let Some(session) = &receipt.session else {
            debug!("no session issued with the new identity; skipping confirmation");
            return;
        };
        match self.identity_service.confirm_identity(session).await {
            Ok(Some(confirmed)) if confirmed == identity_id => {
                debug!(%identity_id, "identity confirmed")
            }
            Ok(Some(confirmed)) => {
                warn!(%identity_id, %confirmed, "session resolved to a different identity")
            }
            Ok(None) => warn!(%identity_id, "identity not visible yet after settle delay"),
            Err(err) => warn!(%identity_id, error = %err, "identity confirmation failed"),
        }
    }

    fn navigate_for(&self, outcome: &RegistrationOutcome) -> Option<ScheduledNavigation>
    where
        N: 'static,
    {
        match outcome {
            RegistrationOutcome::Success { navigate_to, .. } => {
                self.navigator.navigate(*navigate_to);
                None
            }
            RegistrationOutcome::ProfileInsertFailure {
                kind: InsertFailureKind::LinkTimingFailure,
                ..
            } => Some(self.schedule(NavigationTarget::DriverLogin, self.config.login_redirect_delay)),
            _ => None,
        }
    }

    fn schedule(&self, target: NavigationTarget, delay: Duration) -> ScheduledNavigation
    where
        N: 'static,
    {
        let navigator = Arc::clone(&self.navigator);
        let session = self.session.clone();
        tokio::spawn(async move {
            tokio::select! {
                biased;
                _ = session.cancelled() => {
                    debug!(path = target.path(), "session ended; scheduled navigation dropped");
                }
                _ = tokio::time::sleep(delay) => {
                    navigator.navigate(target);
                }
            }
        });
        ScheduledNavigation { target, delay }
    }
}

impl<I: IdentityService, D: DriverRepository, N: Navigator> Drop
    for RegisterDriverUsecase<I, D, N>
{
    fn drop(&mut self) {
        self.session.cancel();
    }
}
