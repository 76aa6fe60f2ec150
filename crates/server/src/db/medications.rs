use clinic_core::MedicationRecord;
use deadpool_postgres::Pool;

use crate::error::AppError;

/// Read-only access to patients' medication lists
#[derive(Clone)]
pub struct MedicationRepository {
    pool: Pool,
}

impl MedicationRepository {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }

    /// Medications of the patient whose BruHIMS or IC number equals `query`
    pub async fn search(&self, query: &str) -> Result<Vec<MedicationRecord>, AppError> {
        let client = self.pool.get().await?;
        let rows = client
            .query(
                "SELECT u.username, u.bruhims, u.ic, m.medicine_name, m.typical_dose,
                        m.times_per_day, m.reminder_times
                   FROM user_medications m
                   JOIN users u ON m.user_id = u.id
                  WHERE u.bruhims = $1 OR u.ic = $1
                  ORDER BY m.medicine_name",
                &[&query],
            )
            .await?;

        Ok(rows
            .into_iter()
            .map(|row| MedicationRecord {
                username: row.get(0),
                bruhims: row.get(1),
                ic: row.get(2),
                medicine_name: row.get(3),
                typical_dose: row.get(4),
                times_per_day: row.get(5),
                reminder_times: row.get::<_, Option<Vec<String>>>(6).unwrap_or_default(),
            })
            .collect())
    }
}
