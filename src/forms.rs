//! Record forms: field definitions, population, and submit validation.
//!
//! The web client fills modal forms from trigger-element attributes or a
//! fetched record and posts them to per-record URLs. Here a form is a
//! typed field list owned by the app; opening a form always starts from
//! a fresh state, which clears prior values and validation marks.

use crate::api::{AppointmentRecord, MedicineRecord};

/// Inline message shown under an empty mandatory field.
pub const REQUIRED_MESSAGE: &str = "This field is required.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormKind {
    EditDog,
    EditPersonality,
    AddAppointment,
    EditAppointment,
    AddMedicine,
    EditMedicine,
}

impl FormKind {
    pub fn title(&self) -> &'static str {
        match self {
            FormKind::EditDog => "Edit Dog",
            FormKind::EditPersonality => "Edit Personality",
            FormKind::AddAppointment => "New Appointment",
            FormKind::EditAppointment => "Edit Appointment",
            FormKind::AddMedicine => "New Medicine",
            FormKind::EditMedicine => "Edit Medicine",
        }
    }

    /// Edit flows for server-side records populate asynchronously: the
    /// form opens empty and fills when the record fetch resolves.
    pub fn populates_async(&self) -> bool {
        matches!(self, FormKind::EditAppointment | FormKind::EditMedicine)
    }

    fn field_specs(&self) -> &'static [(&'static str, &'static str, bool)] {
        match self {
            FormKind::EditDog => &[
                ("name", "Name", true),
                ("adoption_status", "Status", false),
                ("age", "Age", false),
                ("breed", "Breed", false),
                ("intake_date", "Intake", false),
                ("microchip_id", "Microchip", false),
                ("notes", "Notes", false),
                ("medical_info", "Medical", false),
            ],
            FormKind::EditPersonality => &[
                ("energy_level", "Energy", false),
                ("personality_notes", "Personality", false),
                ("social_notes", "Social", false),
                ("special_story", "Story", false),
                ("temperament_tags", "Tags", false),
            ],
            FormKind::AddAppointment | FormKind::EditAppointment => &[
                ("title", "Title", true),
                ("appointment_type", "Type", true),
                ("start_datetime", "Start", true),
                ("end_datetime", "End", false),
                ("status", "Status", false),
                ("description", "Notes", false),
            ],
            FormKind::AddMedicine | FormKind::EditMedicine => &[
                ("medicine", "Medicine", true),
                ("dosage", "Dosage", true),
                ("unit", "Unit", false),
                ("frequency", "Frequency", false),
                ("start_date", "Start", true),
                ("end_date", "End", false),
                ("status", "Status", false),
                ("notes", "Notes", false),
            ],
        }
    }
}

#[derive(Debug, Clone)]
pub struct Field {
    pub key: &'static str,
    pub label: &'static str,
    pub mandatory: bool,
    pub value: String,
    pub error: Option<&'static str>,
}

#[derive(Debug, Clone)]
pub struct FormState {
    pub kind: FormKind,
    pub record_id: Option<i64>,
    /// Submission target, a per-record URL from config templates.
    pub action: String,
    pub fields: Vec<Field>,
    pub active: usize,
    /// True while an async populate fetch is outstanding.
    pub populating: bool,
}

impl FormState {
    pub fn new(kind: FormKind, record_id: Option<i64>, action: String) -> Self {
        let fields = kind
            .field_specs()
            .iter()
            .map(|&(key, label, mandatory)| Field {
                key,
                label,
                mandatory,
                value: String::new(),
                error: None,
            })
            .collect();
        Self {
            kind,
            record_id,
            action,
            fields,
            active: 0,
            populating: kind.populates_async(),
        }
    }

    pub fn set_value(&mut self, key: &str, value: impl Into<String>) {
        if let Some(field) = self.fields.iter_mut().find(|f| f.key == key) {
            field.value = value.into();
        }
    }

    pub fn value(&self, key: &str) -> &str {
        self.fields
            .iter()
            .find(|f| f.key == key)
            .map(|f| f.value.as_str())
            .unwrap_or("")
    }

    pub fn next_field(&mut self) {
        self.active = (self.active + 1) % self.fields.len();
    }

    pub fn prev_field(&mut self) {
        self.active = (self.active + self.fields.len() - 1) % self.fields.len();
    }

    /// Typing into a field clears that field's error, and only that
    /// field's.
    pub fn input_char(&mut self, c: char) {
        if let Some(field) = self.fields.get_mut(self.active) {
            field.value.push(c);
            field.error = None;
        }
    }

    pub fn backspace(&mut self) {
        if let Some(field) = self.fields.get_mut(self.active) {
            field.value.pop();
            field.error = None;
        }
    }

    /// Check mandatory fields. Marks each empty one with the fixed
    /// inline message and reports whether submission may proceed.
    pub fn validate(&mut self) -> bool {
        let mut valid = true;
        for field in &mut self.fields {
            if field.mandatory && field.value.trim().is_empty() {
                field.error = Some(REQUIRED_MESSAGE);
                valid = false;
            }
        }
        valid
    }

    pub fn has_errors(&self) -> bool {
        self.fields.iter().any(|f| f.error.is_some())
    }

    /// Field key/value pairs for form-encoded submission.
    pub fn payload(&self) -> Vec<(String, String)> {
        self.fields
            .iter()
            .map(|f| (f.key.to_string(), f.value.clone()))
            .collect()
    }

    /// Fill from a fetched appointment record (async populate).
    pub fn apply_appointment(&mut self, record: &AppointmentRecord) {
        self.set_value("title", record.title.clone().unwrap_or_default());
        self.set_value(
            "start_datetime",
            truncated(record.start_datetime.as_deref(), 16),
        );
        self.set_value(
            "end_datetime",
            truncated(record.end_datetime.as_deref(), 16),
        );
        self.set_value(
            "status",
            record.status.clone().unwrap_or_else(|| "scheduled".to_string()),
        );
        self.set_value("description", record.description.clone().unwrap_or_default());
        self.populating = false;
    }

    /// Fill from a fetched medicine record (async populate).
    pub fn apply_medicine(&mut self, record: &MedicineRecord) {
        self.set_value("dosage", record.dosage.clone().unwrap_or_default());
        self.set_value("unit", record.unit.clone().unwrap_or_default());
        self.set_value(
            "frequency",
            record.frequency.clone().unwrap_or_else(|| "daily".to_string()),
        );
        self.set_value("start_date", truncated(record.start_date.as_deref(), 10));
        self.set_value("end_date", truncated(record.end_date.as_deref(), 10));
        self.set_value(
            "status",
            record.status.clone().unwrap_or_else(|| "active".to_string()),
        );
        self.set_value("notes", record.notes.clone().unwrap_or_default());
        self.populating = false;
    }
}

/// Datetime-local / date inputs want the stamp cut to their precision.
fn truncated(value: Option<&str>, len: usize) -> String {
    let value = value.unwrap_or("");
    value.chars().take(len).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_mandatory_fields_block_submission() {
        let mut form = FormState::new(FormKind::EditDog, Some(7), "/dogs/7/edit".to_string());
        form.set_value("breed", "collie");
        assert!(!form.validate());
        let name = form.fields.iter().find(|f| f.key == "name").unwrap();
        assert_eq!(name.error, Some(REQUIRED_MESSAGE));
        // Optional fields are never marked
        let notes = form.fields.iter().find(|f| f.key == "notes").unwrap();
        assert!(notes.error.is_none());
    }

    #[test]
    fn whitespace_only_counts_as_empty() {
        let mut form = FormState::new(FormKind::EditDog, Some(7), "/dogs/7/edit".to_string());
        form.set_value("name", "   ");
        assert!(!form.validate());
    }

    #[test]
    fn editing_clears_only_that_fields_error() {
        let mut form =
            FormState::new(FormKind::AddAppointment, None, "/appointments/add".to_string());
        assert!(!form.validate());
        assert!(form.has_errors());

        // Active field is "title"; typing clears its error
        form.input_char('V');
        assert!(form.fields[0].error.is_none());
        assert!(form.fields[1].error.is_some());
        assert!(form.fields[2].error.is_some());
    }

    #[test]
    fn valid_form_passes_and_payload_covers_all_fields() {
        let mut form =
            FormState::new(FormKind::AddAppointment, None, "/appointments/add".to_string());
        form.set_value("title", "Vet visit");
        form.set_value("appointment_type", "Vet");
        form.set_value("start_datetime", "2026-03-04T14:30");
        assert!(form.validate());

        let payload = form.payload();
        assert_eq!(payload.len(), form.fields.len());
        assert!(payload.contains(&("title".to_string(), "Vet visit".to_string())));
    }

    #[test]
    fn edit_flows_open_in_populating_state() {
        let form = FormState::new(
            FormKind::EditAppointment,
            Some(3),
            "/appointments/3/edit".to_string(),
        );
        assert!(form.populating);
        assert!(form.fields.iter().all(|f| f.value.is_empty()));

        let sync = FormState::new(FormKind::EditDog, Some(3), "/dogs/3/edit".to_string());
        assert!(!sync.populating);
    }

    #[test]
    fn applying_a_record_fills_fields_and_ends_populating() {
        let mut form = FormState::new(
            FormKind::EditAppointment,
            Some(3),
            "/appointments/3/edit".to_string(),
        );
        form.apply_appointment(&AppointmentRecord {
            title: Some("Dental cleaning".to_string()),
            start_datetime: Some("2026-03-04T14:30:00".to_string()),
            end_datetime: None,
            status: None,
            description: Some("upper molars".to_string()),
        });
        assert!(!form.populating);
        assert_eq!(form.value("title"), "Dental cleaning");
        // datetime-local precision
        assert_eq!(form.value("start_datetime"), "2026-03-04T14:30");
        assert_eq!(form.value("status"), "scheduled");
        assert_eq!(form.value("description"), "upper molars");
    }

    #[test]
    fn medicine_record_dates_are_cut_to_date_precision() {
        let mut form = FormState::new(
            FormKind::EditMedicine,
            Some(5),
            "/medicines/5/edit".to_string(),
        );
        form.apply_medicine(&MedicineRecord {
            dosage: Some("2".to_string()),
            unit: Some("tablet".to_string()),
            frequency: None,
            start_date: Some("2026-03-01T00:00:00".to_string()),
            end_date: None,
            status: None,
            notes: None,
        });
        assert_eq!(form.value("start_date"), "2026-03-01");
        assert_eq!(form.value("frequency"), "daily");
    }
}
