use chrono::{NaiveDate, NaiveDateTime};
use serde::Deserialize;

use super::category::{self, Category};

/// Text color applied to every rendered event regardless of category.
pub const EVENT_TEXT_COLOR: &str = "white";

/// Raw event record as returned by `GET /api/calendar/events`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawEvent {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub start: String,
    #[serde(default)]
    pub end: Option<String>,
    #[serde(default, rename = "allDay")]
    pub all_day: Option<bool>,
    #[serde(default, rename = "extendedProps")]
    pub extended_props: RawProps,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawProps {
    #[serde(default, rename = "eventType")]
    pub event_type: String,
    #[serde(default)]
    pub appointment_type: Option<String>,
    #[serde(default)]
    pub dog_id: Option<i64>,
    #[serde(default)]
    pub dog_name: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub vet_name: Option<String>,
    #[serde(default)]
    pub medicine_name: Option<String>,
}

/// Normalized display record consumed by the calendar views.
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayEvent {
    pub id: String,
    pub title: String,
    pub start: String,
    pub end: Option<String>,
    pub all_day: bool,
    pub category: Category,
    pub background_color: &'static str,
    pub border_color: &'static str,
    pub text_color: &'static str,
    pub dog_id: Option<i64>,
    pub dog_name: Option<String>,
    pub location: Option<String>,
    pub notes: Option<String>,
    pub vet_name: Option<String>,
    pub appointment_type: Option<String>,
    pub medicine_name: Option<String>,
    pub event_type: String,
}

/// Map a raw event into its display form. Pure: the input is only read.
pub fn transform(event: &RawEvent) -> DisplayEvent {
    let props = &event.extended_props;
    let category = category::classify(
        &props.event_type,
        props.appointment_type.as_deref().unwrap_or(""),
    );

    DisplayEvent {
        id: event.id.clone(),
        title: event.title.clone(),
        start: event.start.clone(),
        end: event.end.clone(),
        all_day: event.all_day.unwrap_or(false),
        category,
        background_color: category.hex_color(),
        border_color: category.hex_color(),
        text_color: EVENT_TEXT_COLOR,
        dog_id: props.dog_id,
        dog_name: props.dog_name.clone(),
        location: props.location.clone(),
        notes: props.notes.clone().or_else(|| props.description.clone()),
        vet_name: props.vet_name.clone(),
        appointment_type: props.appointment_type.clone(),
        medicine_name: props.medicine_name.clone(),
        event_type: props.event_type.clone(),
    }
}

impl DisplayEvent {
    /// Parse the server's ISO-8601 start stamp. The API emits naive
    /// local datetimes, occasionally bare dates for all-day entries.
    pub fn start_datetime(&self) -> Option<NaiveDateTime> {
        parse_stamp(&self.start)
    }

    pub fn end_datetime(&self) -> Option<NaiveDateTime> {
        self.end.as_deref().and_then(parse_stamp)
    }

    pub fn start_date(&self) -> Option<NaiveDate> {
        self.start_datetime().map(|dt| dt.date())
    }

    /// Numeric record id behind the event. The server prefixes ids by
    /// source table ("appt-7", "med-12") to keep them unique.
    pub fn record_id(&self) -> Option<i64> {
        self.id.rsplit('-').next()?.parse().ok()
    }

    pub fn duration_display(&self) -> String {
        if self.all_day {
            return "All day".to_string();
        }
        match (self.start_datetime(), self.end_datetime()) {
            (Some(start), Some(end)) => {
                format!("{} - {}", start.format("%H:%M"), end.format("%H:%M"))
            }
            (Some(start), None) => start.format("%H:%M").to_string(),
            _ => String::new(),
        }
    }
}

fn parse_stamp(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim_end_matches('Z');
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw_appointment() -> RawEvent {
        serde_json::from_value(serde_json::json!({
            "id": "appt-7",
            "title": "Biscuit - Emergency Vet Visit",
            "start": "2026-03-04T14:30:00",
            "end": "2026-03-04T15:30:00",
            "extendedProps": {
                "eventType": "appointment",
                "appointment_type": "Emergency Vet Visit",
                "dog_name": "Biscuit",
                "dog_id": 7,
                "description": "limping on front paw"
            }
        }))
        .unwrap()
    }

    #[test]
    fn transform_does_not_mutate_input() {
        let raw = raw_appointment();
        let before = format!("{:?}", raw);
        let _ = transform(&raw);
        assert_eq!(format!("{:?}", raw), before);
    }

    #[test]
    fn transform_applies_category_colors_and_fixed_text_color() {
        let display = transform(&raw_appointment());
        assert_eq!(display.category, Category::Vet);
        assert_eq!(display.background_color, "#e74c3c");
        assert_eq!(display.border_color, display.background_color);
        assert_eq!(display.text_color, EVENT_TEXT_COLOR);

        let other = transform(&RawEvent::default());
        assert_eq!(other.category, Category::Other);
        assert_eq!(other.text_color, EVENT_TEXT_COLOR);
    }

    #[test]
    fn all_day_defaults_to_false() {
        let display = transform(&raw_appointment());
        assert!(!display.all_day);
    }

    #[test]
    fn notes_fall_back_to_description() {
        let mut raw = raw_appointment();
        assert_eq!(
            transform(&raw).notes.as_deref(),
            Some("limping on front paw")
        );

        raw.extended_props.notes = Some("seen by Dr. Ruiz".to_string());
        assert_eq!(transform(&raw).notes.as_deref(), Some("seen by Dr. Ruiz"));
    }

    #[test]
    fn record_id_strips_source_prefix() {
        let display = transform(&raw_appointment());
        assert_eq!(display.record_id(), Some(7));

        let unprefixed = transform(&RawEvent {
            id: "42".to_string(),
            ..RawEvent::default()
        });
        assert_eq!(unprefixed.record_id(), Some(42));
        assert_eq!(transform(&RawEvent::default()).record_id(), None);
    }

    #[test]
    fn start_stamp_parses_datetime_and_bare_date() {
        let display = transform(&raw_appointment());
        let start = display.start_datetime().unwrap();
        assert_eq!(
            start.format("%Y-%m-%d %H:%M").to_string(),
            "2026-03-04 14:30"
        );

        let bare = RawEvent {
            start: "2026-03-04".to_string(),
            ..RawEvent::default()
        };
        let display = transform(&bare);
        assert_eq!(display.start_date().unwrap().to_string(), "2026-03-04");
    }
}
