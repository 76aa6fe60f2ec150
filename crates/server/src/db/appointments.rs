use async_trait::async_trait;
use clinic_core::{
    Appointment, AppointmentStatus, AppointmentStore, AppointmentSummary, ClinicError,
    NewAppointment,
};
use deadpool_postgres::Pool;
use tokio_postgres::Row;

use crate::error::AppError;

const DASHBOARD_COLUMNS: &str = "SELECT a.id, a.username, u.bruhims, u.ic, a.location,
        a.appointment_date, a.appointment_time, a.status
   FROM appointments a
   LEFT JOIN users u ON u.username = a.username";

/// Repository for appointment bookings and their triage status
#[derive(Clone)]
pub struct AppointmentRepository {
    pool: Pool,
}

impl AppointmentRepository {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }

    /// Appointments assigned to `doctor_id` plus the unassigned queue,
    /// earliest first
    pub async fn for_doctor(&self, doctor_id: &str) -> Result<Vec<Appointment>, AppError> {
        let client = self.pool.get().await?;
        let rows = client
            .query(
                &format!(
                    "{DASHBOARD_COLUMNS}
                      WHERE a.doctor_id = $1 OR a.doctor_id IS NULL
                      ORDER BY a.appointment_date ASC, a.appointment_time ASC"
                ),
                &[&doctor_id],
            )
            .await?;

        rows.iter().map(appointment_from_row).collect()
    }

    /// Get one appointment by id
    pub async fn get(&self, id: i32) -> Result<Option<Appointment>, AppError> {
        let client = self.pool.get().await?;
        let row = client
            .query_opt(&format!("{DASHBOARD_COLUMNS} WHERE a.id = $1"), &[&id])
            .await?;

        row.as_ref().map(appointment_from_row).transpose()
    }

    /// Set the status of an appointment the doctor may act on.
    ///
    /// An unassigned appointment becomes assigned to `doctor_id`.
    /// Returns `None` when no such appointment is visible to the doctor.
    pub async fn update_status(
        &self,
        id: i32,
        doctor_id: &str,
        status: AppointmentStatus,
    ) -> Result<Option<Appointment>, AppError> {
        let client = self.pool.get().await?;
        let updated = client
            .execute(
                "UPDATE appointments SET status = $1, doctor_id = $2
                  WHERE id = $3 AND (doctor_id = $2 OR doctor_id IS NULL)",
                &[&status.as_str(), &doctor_id, &id],
            )
            .await?;

        if updated == 0 {
            return Ok(None);
        }

        tracing::info!(appointment_id = id, doctor_id = %doctor_id, status = %status, "Appointment status updated");
        self.get(id).await
    }
}

fn appointment_from_row(row: &Row) -> Result<Appointment, AppError> {
    let status: String = row.get(7);
    let status = status
        .parse::<AppointmentStatus>()
        .map_err(|e| AppError::Internal(format!("Corrupt appointment row: {}", e)))?;

    Ok(Appointment {
        id: row.get(0),
        username: row.get(1),
        bruhims: row.get(2),
        ic: row.get(3),
        location: row.get(4),
        date: row.get(5),
        time: row.get(6),
        status,
    })
}

fn persistence_error(err: impl std::fmt::Display) -> ClinicError {
    ClinicError::Persistence(err.to_string())
}

#[async_trait]
impl AppointmentStore for AppointmentRepository {
    async fn insert(&self, appointment: &NewAppointment) -> Result<(), ClinicError> {
        let client = self.pool.get().await.map_err(persistence_error)?;
        client
            .execute(
                "INSERT INTO appointments (username, location, appointment_date, appointment_time)
                 VALUES ($1, $2, $3, $4)",
                &[
                    &appointment.user,
                    &appointment.location,
                    &appointment.date,
                    &appointment.time,
                ],
            )
            .await
            .map_err(persistence_error)?;
        Ok(())
    }

    async fn list_by_user(&self, user: &str) -> Result<Vec<AppointmentSummary>, ClinicError> {
        let client = self.pool.get().await.map_err(persistence_error)?;
        let rows = client
            .query(
                "SELECT location, appointment_date, appointment_time
                   FROM appointments
                  WHERE username = $1
                  ORDER BY appointment_date DESC, appointment_time DESC",
                &[&user],
            )
            .await
            .map_err(persistence_error)?;

        Ok(rows
            .into_iter()
            .map(|row| AppointmentSummary {
                location: row.get(0),
                date: row.get(1),
                time: row.get(2),
            })
            .collect())
    }
}
