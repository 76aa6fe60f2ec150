use serde::{Deserialize, Serialize};

/// A patient's medication entry, as returned by the doctor-side search
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MedicationRecord {
    pub username: String,
    pub bruhims: Option<String>,
    pub ic: Option<String>,
    pub medicine_name: String,
    pub typical_dose: Option<String>,
    pub times_per_day: Option<i32>,
    #[serde(default)]
    pub reminder_times: Vec<String>,
}
