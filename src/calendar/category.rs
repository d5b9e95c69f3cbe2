use ratatui::style::Color;

/// Display classification bucket for a calendar event.
///
/// Declaration order matters: appointment keyword matching walks the
/// variants in this order and the first hit wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Vet,
    Checkup,
    Grooming,
    Medication,
    Other,
}

/// All categories in match priority order.
pub const ALL: [Category; 5] = [
    Category::Vet,
    Category::Checkup,
    Category::Grooming,
    Category::Medication,
    Category::Other,
];

impl Category {
    pub fn name(&self) -> &'static str {
        match self {
            Category::Vet => "vet",
            Category::Checkup => "checkup",
            Category::Grooming => "grooming",
            Category::Medication => "medication",
            Category::Other => "other",
        }
    }

    /// Hex color shared with the web frontend's event styling.
    pub fn hex_color(&self) -> &'static str {
        match self {
            Category::Vet => "#e74c3c",
            Category::Checkup => "#2ecc71",
            Category::Grooming => "#3498db",
            Category::Medication => "#f39c12",
            Category::Other => "#95a5a6",
        }
    }

    pub fn color(&self) -> Color {
        match self {
            Category::Vet => Color::Rgb(0xe7, 0x4c, 0x3c),
            Category::Checkup => Color::Rgb(0x2e, 0xcc, 0x71),
            Category::Grooming => Color::Rgb(0x34, 0x98, 0xdb),
            Category::Medication => Color::Rgb(0xf3, 0x9c, 0x12),
            Category::Other => Color::Rgb(0x95, 0xa5, 0xa6),
        }
    }

    fn keywords(&self) -> &'static [&'static str] {
        match self {
            Category::Vet => &["vet", "medical", "surgery", "treatment", "emergency"],
            Category::Checkup => &["checkup", "wellness", "routine", "physical"],
            Category::Grooming => &["groom", "grooming", "bath", "nail"],
            Category::Medication => &["medicine", "medication", "dose"],
            Category::Other => &[],
        }
    }
}

/// Classify an event by its type and, for appointments, its appointment
/// type string. Pure: the same input always maps to the same category.
pub fn classify(event_type: &str, appointment_type: &str) -> Category {
    if event_type == "medicine_start" || event_type == "medicine_end" {
        return Category::Medication;
    }

    if event_type == "appointment" {
        let appointment_type = appointment_type.to_lowercase();
        for category in ALL {
            if category
                .keywords()
                .iter()
                .any(|kw| appointment_type.contains(kw))
            {
                return category;
            }
        }
    }

    Category::Other
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn medicine_events_are_medication() {
        assert_eq!(classify("medicine_start", ""), Category::Medication);
        assert_eq!(classify("medicine_end", ""), Category::Medication);
        // Appointment type is irrelevant for medicine events
        assert_eq!(classify("medicine_start", "Grooming"), Category::Medication);
    }

    #[test]
    fn appointment_keywords_match_case_insensitively() {
        assert_eq!(classify("appointment", "Emergency Vet Visit"), Category::Vet);
        assert_eq!(classify("appointment", "Annual Wellness"), Category::Checkup);
        assert_eq!(classify("appointment", "Nail Trim"), Category::Grooming);
        assert_eq!(classify("appointment", "Medication Review"), Category::Medication);
    }

    #[test]
    fn first_declared_category_wins_on_overlap() {
        // "vet checkup" contains keywords for both Vet and Checkup;
        // Vet is declared first.
        assert_eq!(classify("appointment", "vet checkup"), Category::Vet);
        assert_eq!(classify("appointment", "routine surgery"), Category::Vet);
    }

    #[test]
    fn unmatched_inputs_fall_through_to_other() {
        assert_eq!(classify("appointment", "adoption meet"), Category::Other);
        assert_eq!(classify("appointment", ""), Category::Other);
        assert_eq!(classify("reminder", "vet"), Category::Other);
        assert_eq!(classify("", ""), Category::Other);
    }

    #[test]
    fn vet_scenario_color() {
        let cat = classify("appointment", "Emergency Vet Visit");
        assert_eq!(cat, Category::Vet);
        assert_eq!(cat.hex_color(), "#e74c3c");
    }
}
