//! Hand-written collaborators shared by the unit and router tests.

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::Notify;

use crate::{
    domain::{
        error::{IdentityError, StoreError},
        models::{
            driver::DriverProfile,
            identity::{IdentityId, IdentityReceipt, NewIdentity, SessionToken},
            outcome::NavigationTarget,
            registration::RegistrationInput,
        },
        repositories::driver_repository::DriverRepository,
        services::{identity_service::IdentityService, navigator::Navigator},
    },
    usecase::register_driver_usecase::{InFlightSubmissions, RegisterDriverUsecase, RegistrationConfig},
};

pub const TEST_ID: &str = "00000000-0000-0000-0000-000000000001";

pub const TEST_EMAIL: &str = "a@b.com";

pub fn test_identity_id() -> IdentityId {
    IdentityId::parse(TEST_ID).unwrap()
}

pub fn valid_input() -> RegistrationInput {
    RegistrationInput {
        email: TEST_EMAIL.to_string(),
        password: "abcdef".to_string(),
        password_confirmation: "abcdef".to_string(),
        full_name: "A B".to_string(),
        phone_number: "555-1".to_string(),
    }
}

/// Ordered record of every collaborator call made during a test
#[derive(Default)]
pub struct CallLog {
    events: Mutex<Vec<&'static str>>,
    loading_seen: Mutex<Vec<bool>>,
    requests: Mutex<Vec<NewIdentity>>,
    inserted: Mutex<Vec<DriverProfile>>,
    watched: Mutex<Option<(InFlightSubmissions, String)>>,
}

impl CallLog {
    fn record(&self, event: &'static str) {
        self.events.lock().push(event);
        if let Some((in_flight, email)) = self.watched.lock().as_ref() {
            self.loading_seen.lock().push(in_flight.is_submitting(email));
        }
    }

    /// Record, on every call, whether `email` is marked in flight.
    pub fn watch_submitter(&self, in_flight: InFlightSubmissions, email: &str) {
        *self.watched.lock() = Some((in_flight, email.to_string()));
    }

    pub fn events(&self) -> Vec<&'static str> {
        self.events.lock().clone()
    }

    pub fn count(&self, event: &str) -> usize {
        self.events.lock().iter().filter(|e| **e == event).count()
    }

    pub fn loading_seen(&self) -> Vec<bool> {
        self.loading_seen.lock().clone()
    }

    pub fn requests(&self) -> Vec<NewIdentity> {
        self.requests.lock().clone()
    }

    pub fn inserted(&self) -> Vec<DriverProfile> {
        self.inserted.lock().clone()
    }
}

#[derive(Clone)]
pub enum IdentityBehavior {
    Succeed,
    Reject(String),
    MissingId,
    Unavailable(String),
    ConfirmFails,
    Panic,
    /// Requests for `email` wait for `release`; every other email succeeds at once.
    Hold { email: String, release: Arc<Notify> },
}

#[derive(Clone)]
pub struct MockIdentityService {
    log: Arc<CallLog>,
    behavior: IdentityBehavior,
}

impl MockIdentityService {
    pub fn new(log: Arc<CallLog>, behavior: IdentityBehavior) -> Self {
        Self { log, behavior }
    }

    fn receipt() -> IdentityReceipt {
        IdentityReceipt::new(test_identity_id(), SessionToken::new("session".to_string()))
    }
}

#[async_trait]
impl IdentityService for MockIdentityService {
    async fn create_identity(&self, request: &NewIdentity) -> Result<IdentityReceipt, IdentityError> {
        self.log.record("create_identity");
        self.log.requests.lock().push(request.clone());
        match &self.behavior {
            IdentityBehavior::Succeed | IdentityBehavior::ConfirmFails => Ok(Self::receipt()),
            IdentityBehavior::Reject(message) => Err(IdentityError::rejected(message.clone())),
            IdentityBehavior::MissingId => Ok(IdentityReceipt::empty()),
            IdentityBehavior::Unavailable(reason) => Err(IdentityError::Unavailable(reason.clone())),
            IdentityBehavior::Panic => panic!("identity backend exploded"),
            IdentityBehavior::Hold { email, release } => {
                if request.email == *email {
                    release.notified().await;
                }
                Ok(Self::receipt())
            }
        }
    }

    async fn confirm_identity(
        &self,
        _session: &SessionToken,
    ) -> Result<Option<IdentityId>, IdentityError> {
        self.log.record("confirm_identity");
        match &self.behavior {
            IdentityBehavior::ConfirmFails => {
                Err(IdentityError::Unavailable("session lookup failed".to_string()))
            }
            _ => Ok(Some(test_identity_id())),
        }
    }
}

#[derive(Clone)]
pub struct MockDriverRepository {
    log: Arc<CallLog>,
    probe_error: Option<StoreError>,
    insert_error: Option<StoreError>,
}

impl MockDriverRepository {
    pub fn new(log: Arc<CallLog>) -> Self {
        Self {
            log,
            probe_error: None,
            insert_error: None,
        }
    }

    pub fn failing_probe(mut self, error: StoreError) -> Self {
        self.probe_error = Some(error);
        self
    }

    pub fn failing_insert(mut self, error: StoreError) -> Self {
        self.insert_error = Some(error);
        self
    }
}

#[async_trait]
impl DriverRepository for MockDriverRepository {
    async fn probe(&self, _limit: u64) -> Result<usize, StoreError> {
        self.log.record("probe");
        match &self.probe_error {
            Some(error) => Err(error.clone()),
            None => Ok(1),
        }
    }

    async fn insert(&self, profile: &DriverProfile) -> Result<(), StoreError> {
        self.log.record("insert");
        self.log.inserted.lock().push(profile.clone());
        match &self.insert_error {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }
}

#[derive(Default)]
pub struct RecordingNavigator {
    calls: Mutex<Vec<NavigationTarget>>,
}

impl RecordingNavigator {
    pub fn calls(&self) -> Vec<NavigationTarget> {
        self.calls.lock().clone()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, target: NavigationTarget) {
        self.calls.lock().push(target);
    }
}

pub type TestUsecase = RegisterDriverUsecase<MockIdentityService, MockDriverRepository, RecordingNavigator>;

/// A use case wired to mocks, plus handles to inspect them afterwards
pub struct Harness {
    pub log: Arc<CallLog>,
    pub navigator: Arc<RecordingNavigator>,
    pub usecase: TestUsecase,
}

impl Harness {
    pub fn new(identity: IdentityBehavior) -> Self {
        Self::with_repository(identity, |repo| repo)
    }

    pub fn with_repository(
        identity: IdentityBehavior,
        configure: impl FnOnce(MockDriverRepository) -> MockDriverRepository,
    ) -> Self {
        Self::with_config(identity, configure, RegistrationConfig::immediate())
    }

    pub fn with_config(
        identity: IdentityBehavior,
        configure: impl FnOnce(MockDriverRepository) -> MockDriverRepository,
        config: RegistrationConfig,
    ) -> Self {
        let log = Arc::new(CallLog::default());
        let navigator = Arc::new(RecordingNavigator::default());
        let in_flight = InFlightSubmissions::default();
        log.watch_submitter(in_flight.clone(), TEST_EMAIL);

        let usecase = RegisterDriverUsecase::new(
            MockIdentityService::new(log.clone(), identity),
            configure(MockDriverRepository::new(log.clone())),
            navigator.clone(),
            config,
        )
        .with_in_flight(in_flight);

        Self {
            log,
            navigator,
            usecase,
        }
    }
}
