mod appointments;
mod medications;
mod users;

pub use appointments::AppointmentRepository;
pub use medications::MedicationRepository;
pub use users::{PatientIdType, UserRepository, hash_password};

use deadpool_postgres::{Config, Pool, Runtime};
use tokio_postgres::NoTls;

use crate::error::AppError;

const SCHEMA: &str = include_str!("../../sql/schema.sql");

/// Create a connection pool from a database URL
pub async fn create_pool(database_url: &str) -> Result<Pool, deadpool_postgres::CreatePoolError> {
    let mut cfg = Config::new();
    cfg.url = Some(database_url.to_string());
    cfg.create_pool(Some(Runtime::Tokio1), NoTls)
}

/// Create tables and indexes if they do not exist yet
pub async fn apply_schema(pool: &Pool) -> Result<(), AppError> {
    let client = pool.get().await?;
    client.batch_execute(SCHEMA).await?;
    Ok(())
}
