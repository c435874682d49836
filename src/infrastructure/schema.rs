use sea_orm::{ConnectionTrait, DatabaseConnection, DbErr, EntityTrait, Schema};
use tracing::info;

use crate::infrastructure::entity::{drivers, identities};

async fn create_if_missing<E: EntityTrait>(db: &DatabaseConnection, entity: E) -> Result<(), DbErr> {
    let backend = db.get_database_backend();
    let schema = Schema::new(backend);
    let mut statement = schema.create_table_from_entity(entity);
    statement.if_not_exists();
    db.execute(backend.build(&statement)).await?;
    Ok(())
}

/// Create the identity and driver tables when they are not there yet.
/// `identities` goes first, `drivers.user_id` references it.
pub async fn ensure_schema(db: &DatabaseConnection) -> Result<(), DbErr> {
    create_if_missing(db, identities::Entity).await?;
    create_if_missing(db, drivers::Entity).await?;
    info!("database schema ready");
    Ok(())
}
