use async_trait::async_trait;
use sea_orm::{
    ActiveValue::Set, DatabaseConnection, DbErr, EntityTrait, QuerySelect, SqlErr,
};
use uuid::Uuid;

use crate::domain::{
    error::{StoreError, StoreFailure},
    models::driver::DriverProfile,
    repositories::driver_repository::DriverRepository,
};
use crate::infrastructure::entity::drivers;

#[derive(Clone)]
pub struct PostgresDriverRepository {
    db: DatabaseConnection,
}

impl PostgresDriverRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

/// Connection-level trouble means the store never saw the request; anything
/// else is the store refusing it.
fn store_error(err: DbErr) -> StoreError {
    if matches!(err, DbErr::Conn(_) | DbErr::ConnectionAcquire(_)) {
        return StoreError::Unavailable(err.to_string());
    }

    let mut failure = StoreFailure::new(err.to_string());
    match err.sql_err() {
        Some(SqlErr::ForeignKeyConstraintViolation(detail)) => {
            failure = failure.with_code("23503").with_details(detail);
        }
        Some(SqlErr::UniqueConstraintViolation(detail)) => {
            failure = failure.with_code("23505").with_details(detail);
        }
        _ => {}
    }
    StoreError::Rejected(failure)
}

#[async_trait]
impl DriverRepository for PostgresDriverRepository {
    async fn probe(&self, limit: u64) -> Result<usize, StoreError> {
        let rows = drivers::Entity::find()
            .limit(limit)
            .all(&self.db)
            .await
            .map_err(store_error)?;
        Ok(rows.len())
    }

    async fn insert(&self, profile: &DriverProfile) -> Result<(), StoreError> {
        let model = drivers::ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(*profile.identity_id().as_uuid()),
            full_name: Set(profile.full_name().to_string()),
            phone_number: Set(profile.phone_number().to_string()),
            status: Set(profile.status().as_str().to_string()),
        };

        drivers::Entity::insert(model)
            .exec(&self.db)
            .await
            .map_err(store_error)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn custom_errors_are_rejections_with_the_message() {
        let err = store_error(DbErr::Custom("relation \"drivers\" does not exist".to_string()));
        match err {
            StoreError::Rejected(failure) => {
                assert!(failure.message.contains("does not exist"));
                assert_eq!(failure.code, None);
            }
            other => panic!("expected rejection, got {:?}", other),
        }
    }

    #[test]
    fn record_not_inserted_is_a_rejection() {
        assert!(matches!(
            store_error(DbErr::RecordNotInserted),
            StoreError::Rejected(_)
        ));
    }
}
