pub mod medication;

pub use medication::{parse_time_of_day, MedicationDraft, MedicationRecord, ValidationError};
