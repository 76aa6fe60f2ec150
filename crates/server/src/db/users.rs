use clinic_core::Identity;
use deadpool_postgres::Pool;
use serde::Deserialize;
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

use crate::error::AppError;

/// Which identifier a patient logs in with
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PatientIdType {
    #[default]
    Bruhims,
    Ic,
}

/// SHA-256 hex digest stored in the `password_hash` columns
pub fn hash_password(password: &str) -> String {
    hex::encode(Sha256::digest(password.as_bytes()))
}

fn password_matches(password: &str, stored_hash: &str) -> bool {
    hash_password(password)
        .as_bytes()
        .ct_eq(stored_hash.as_bytes())
        .into()
}

/// Credential lookups for patients and doctors
#[derive(Clone)]
pub struct UserRepository {
    pool: Pool,
}

impl UserRepository {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }

    /// Check a patient's credentials; `None` when the id or password is wrong
    pub async fn authenticate_patient(
        &self,
        id_type: PatientIdType,
        id: &str,
        password: &str,
    ) -> Result<Option<Identity>, AppError> {
        let query = match id_type {
            PatientIdType::Bruhims => "SELECT username, password_hash FROM users WHERE bruhims = $1",
            PatientIdType::Ic => "SELECT username, password_hash FROM users WHERE ic = $1",
        };

        let client = self.pool.get().await?;
        let row = client.query_opt(query, &[&id]).await?;

        Ok(row.and_then(|row| {
            let hash: String = row.get(1);
            password_matches(password, &hash).then(|| Identity::patient(row.get::<_, String>(0)))
        }))
    }

    /// Check a doctor's credentials; `None` when the id or password is wrong
    pub async fn authenticate_doctor(
        &self,
        id: &str,
        password: &str,
    ) -> Result<Option<Identity>, AppError> {
        let client = self.pool.get().await?;
        let row = client
            .query_opt(
                "SELECT id, name, password_hash FROM doctor WHERE id = $1",
                &[&id],
            )
            .await?;

        Ok(row.and_then(|row| {
            let hash: String = row.get(2);
            password_matches(password, &hash).then(|| {
                Identity::doctor(row.get::<_, String>(0), row.get::<_, String>(1))
            })
        }))
    }
}
