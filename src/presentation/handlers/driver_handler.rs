use std::sync::Arc;

use crate::{
    domain::{
        error::DomainError,
        models::{
            outcome::{RegistrationOutcome, RegistrationReport},
            registration::RegistrationInput,
        },
        repositories::driver_repository::DriverRepository,
        services::{identity_service::IdentityService, navigator::Navigator},
    },
    usecase::register_driver_usecase::RegisterDriverUsecase,
};
use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};

// Request

/// json for driver signup request
#[derive(Serialize, Deserialize)]
pub struct RegisterDriverRequest {
    pub email: String,
    pub password: String,
    pub password_confirmation: String,
    pub full_name: String,
    pub phone_number: String,
}

impl From<RegisterDriverRequest> for RegistrationInput {
    fn from(request: RegisterDriverRequest) -> Self {
        Self {
            email: request.email,
            password: request.password,
            password_confirmation: request.password_confirmation,
            full_name: request.full_name,
            phone_number: request.phone_number,
        }
    }
}

// Response

/// json for driver signup response
#[derive(Debug, Serialize, Deserialize)]
pub struct RegisterDriverResponse {
    pub outcome: String,
    pub message: Option<String>,
    pub navigate_to: Option<String>,
    pub redirect_after_ms: Option<u64>,
    pub identity_id: Option<String>,
}

impl From<RegistrationReport> for RegisterDriverResponse {
    fn from(report: RegistrationReport) -> Self {
        let message = report.message();
        let (navigate_to, redirect_after_ms) = match (&report.outcome, &report.scheduled_navigation) {
            (RegistrationOutcome::Success { navigate_to, .. }, _) => {
                (Some(navigate_to.path().to_string()), None)
            }
            (_, Some(scheduled)) => (
                Some(scheduled.target.path().to_string()),
                Some(scheduled.delay.as_millis() as u64),
            ),
            _ => (None, None),
        };
        let identity_id = match &report.outcome {
            RegistrationOutcome::Success { identity_id, .. } => Some(identity_id.to_string()),
            _ => None,
        };

        Self {
            outcome: report.outcome.code().to_string(),
            message,
            navigate_to,
            redirect_after_ms,
            identity_id,
        }
    }
}

/// query for the in-flight status
#[derive(Deserialize)]
pub struct RegistrationStatusQuery {
    pub email: String,
}

/// json for the in-flight status
#[derive(Serialize, Deserialize)]
pub struct RegistrationStatusResponse {
    pub loading: bool,
}

fn status_for(outcome: &RegistrationOutcome) -> StatusCode {
    match outcome {
        RegistrationOutcome::Success { .. } => StatusCode::CREATED,
        RegistrationOutcome::ValidationFailure(_) => StatusCode::BAD_REQUEST,
        RegistrationOutcome::IdentityFailure { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        RegistrationOutcome::StoreUnreachable { .. } => StatusCode::SERVICE_UNAVAILABLE,
        RegistrationOutcome::ProfileInsertFailure { .. } | RegistrationOutcome::UnexpectedFailure => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

/* Router Function and Handler Function */

// Driver Router

/// function return Router object
/// Suppose to be nested by main router

pub fn create_driver_router<
    I: IdentityService + Send + Sync + 'static,
    D: DriverRepository + Send + Sync + 'static,
    N: Navigator + 'static,
>(
    register_service: Arc<RegisterDriverUsecase<I, D, N>>,
) -> Router {
    let state = AppState { register_service };

    Router::new()
        .route("/drivers/register", post(register::<I, D, N>))
        .route("/drivers/register/status", get(status::<I, D, N>))
        .with_state(state)
}

pub struct AppState<I: IdentityService, D: DriverRepository, N: Navigator> {
    pub register_service: Arc<RegisterDriverUsecase<I, D, N>>,
}

impl<I: IdentityService, D: DriverRepository, N: Navigator> Clone for AppState<I, D, N> {
    fn clone(&self) -> Self {
        Self {
            register_service: Arc::clone(&self.register_service),
        }
    }
}

// handler function

/// handler function for driver signup
async fn register<
    I: IdentityService + Send + Sync + 'static,
    D: DriverRepository + Send + Sync + 'static,
    N: Navigator + 'static,
>(
    State(state): State<AppState<I, D, N>>,
    Json(payload): Json<RegisterDriverRequest>,
) -> impl IntoResponse {
    match state.register_service.submit(payload.into()).await {
        Ok(report) => {
            let status = status_for(&report.outcome);
            (status, Json(RegisterDriverResponse::from(report))).into_response()
        }
        Err(err @ DomainError::SubmissionInProgress) => {
            let response = RegisterDriverResponse {
                outcome: "submission_in_progress".to_string(),
                message: Some(err.to_string()),
                navigate_to: None,
                redirect_after_ms: None,
                identity_id: None,
            };
            (StatusCode::CONFLICT, Json(response)).into_response()
        }
        Err(_) => (StatusCode::INTERNAL_SERVER_ERROR, Json("Registration failed")).into_response(),
    }
}

/// handler function for the in-flight status of one submitter
async fn status<
    I: IdentityService + Send + Sync + 'static,
    D: DriverRepository + Send + Sync + 'static,
    N: Navigator + 'static,
>(
    State(state): State<AppState<I, D, N>>,
    Query(query): Query<RegistrationStatusQuery>,
) -> impl IntoResponse {
    Json(RegistrationStatusResponse {
        loading: state.register_service.is_loading(&query.email),
    })
}
