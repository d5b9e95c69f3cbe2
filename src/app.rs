use std::collections::HashSet;
use std::time::Instant;

use chrono::{Datelike, Local, NaiveDate};

use crate::api::ApiClient;
use crate::calendar::{self, category, Category, DisplayEvent};
use crate::config::{record_url, Config};
use crate::forms::{FormKind, FormState};
use crate::net::{Completion, Dispatcher, PageKind};
use crate::notice::{Notice, Severity};
use crate::reminders::ReminderPane;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ViewMode {
    Month,
    Day,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputMode {
    Normal,
    Form,
    Filter,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Focus {
    Calendar,
    Reminders,
}

pub struct App {
    pub running: bool,
    pub view_mode: ViewMode,
    pub input_mode: InputMode,
    pub focus: Focus,
    pub selected_date: NaiveDate,
    pub today: NaiveDate,
    pub events: Vec<DisplayEvent>,
    pub events_loading: bool,
    pub panes: Vec<ReminderPane>,
    pub selected_pane: usize,
    pub selected_reminder: usize,
    pub selected_event: usize,
    pub form: Option<FormState>,
    pub notice: Option<Notice>,
    pub filter: String,
    pub show_help: bool,
    config: Config,
    dispatcher: Dispatcher,
    events_generation: u64,
    form_generation: u64,
    fetched_month: Option<(i32, u32)>,
}

impl App {
    pub fn new(config: Config) -> std::io::Result<Self> {
        let client = ApiClient::new(&config);
        let dispatcher = Dispatcher::new(client)?;
        let today = Local::now().date_naive();

        let mut app = Self {
            running: true,
            view_mode: ViewMode::Month,
            input_mode: InputMode::Normal,
            focus: Focus::Calendar,
            selected_date: today,
            today,
            events: Vec::new(),
            events_loading: false,
            panes: category::ALL.into_iter().map(ReminderPane::new).collect(),
            selected_pane: 0,
            selected_reminder: 0,
            selected_event: 0,
            form: None,
            notice: None,
            filter: String::new(),
            show_help: false,
            config,
            dispatcher,
            events_generation: 0,
            form_generation: 0,
            fetched_month: None,
        };

        app.refresh_events();
        app.refresh_reminders();
        Ok(app)
    }

    // ── notices ──

    /// Show a transient message, replacing whatever is up.
    pub fn emit(&mut self, message: impl Into<String>, severity: Severity) {
        self.notice = Some(Notice::new(message, severity));
    }

    // ── tick ──

    /// Drain settled network requests and expire the notice. Called
    /// once per UI tick.
    pub fn tick(&mut self) {
        for completion in self.dispatcher.poll() {
            self.on_completion(completion);
        }
        if self
            .notice
            .as_ref()
            .is_some_and(|n| n.is_expired(Instant::now()))
        {
            self.notice = None;
        }
    }

    pub fn on_completion(&mut self, completion: Completion) {
        match completion {
            Completion::Events { generation, result } => {
                if generation != self.events_generation {
                    return;
                }
                self.events_loading = false;
                match result {
                    Ok(raw) => {
                        let mut events: Vec<DisplayEvent> =
                            raw.iter().map(calendar::transform).collect();
                        events.sort_by(|a, b| a.start.cmp(&b.start));
                        self.events = events;
                        self.clamp_event_selection();
                    }
                    Err(_) => {
                        self.emit(
                            "Failed to load calendar events. Please refresh.",
                            Severity::Warning,
                        );
                    }
                }
            }
            Completion::ReminderPage {
                category,
                kind,
                generation,
                result,
            } => {
                let Some(idx) = self.panes.iter().position(|p| p.category == category) else {
                    return;
                };
                let mut failed = None;
                match (kind, result) {
                    (PageKind::Baseline, Ok((items, total))) => {
                        self.panes[idx].apply_baseline(generation, items, total);
                    }
                    (PageKind::Expand, Ok((items, _))) => {
                        self.panes[idx].apply_page(generation, items);
                    }
                    (kind, Err(_)) => {
                        self.panes[idx].expand_failed(generation);
                        failed = Some(kind);
                    }
                }
                match failed {
                    Some(PageKind::Baseline) => {
                        self.emit("Failed to load reminders. Please refresh.", Severity::Warning);
                    }
                    Some(PageKind::Expand) => {
                        self.emit(
                            "Failed to load more reminders. Please try again.",
                            Severity::Warning,
                        );
                    }
                    None => {}
                }
                self.clamp_reminder_selection();
            }
            Completion::Acknowledged {
                category,
                reminder_id,
                result,
            } => {
                let ok = result.is_ok();
                if let Some(pane) = self.panes.iter_mut().find(|p| p.category == category) {
                    pane.finish_acknowledge(reminder_id, ok);
                }
                if !ok {
                    self.emit(
                        "Failed to complete reminder. Please try again.",
                        Severity::Warning,
                    );
                }
                self.clamp_reminder_selection();
            }
            Completion::Appointment { generation, result } => {
                if generation != self.form_generation {
                    return;
                }
                let mut failed = false;
                match (self.form.as_mut(), result) {
                    (Some(form), Ok(record)) if form.kind == FormKind::EditAppointment => {
                        form.apply_appointment(&record);
                    }
                    (Some(form), Err(_)) => {
                        form.populating = false;
                        failed = true;
                    }
                    _ => {}
                }
                if failed {
                    self.emit("Failed to load appointment.", Severity::Warning);
                }
            }
            Completion::Medicine { generation, result } => {
                if generation != self.form_generation {
                    return;
                }
                let mut failed = false;
                match (self.form.as_mut(), result) {
                    (Some(form), Ok(record)) if form.kind == FormKind::EditMedicine => {
                        form.apply_medicine(&record);
                    }
                    (Some(form), Err(_)) => {
                        form.populating = false;
                        failed = true;
                    }
                    _ => {}
                }
                if failed {
                    self.emit("Failed to load medicine.", Severity::Warning);
                }
            }
            Completion::FormSubmitted { kind, result } => match result {
                Ok(()) => {
                    self.close_form();
                    self.emit(format!("{} saved.", kind.title()), Severity::Success);
                    self.refresh_events_forced();
                }
                Err(_) => {
                    self.emit("Something went wrong. Please try again.", Severity::Warning);
                }
            },
        }
    }

    // ── events ──

    fn refresh_events(&mut self) {
        let month = (self.selected_date.year(), self.selected_date.month());
        if self.fetched_month == Some(month) {
            return;
        }
        self.refresh_events_forced();
    }

    fn refresh_events_forced(&mut self) {
        let year = self.selected_date.year();
        let month = self.selected_date.month();
        let start = NaiveDate::from_ymd_opt(year, month, 1).unwrap_or(self.selected_date);
        let end = next_month_start(year, month);

        self.fetched_month = Some((year, month));
        self.events_generation += 1;
        self.events_loading = true;
        self.dispatcher
            .fetch_events(self.events_generation, start, end);
    }

    /// Re-fetch the current month and every reminder pane.
    pub fn refresh(&mut self) {
        self.refresh_events_forced();
        self.refresh_reminders();
    }

    pub fn refresh_reminders(&mut self) {
        for pane in &mut self.panes {
            let page = pane.request_baseline();
            self.dispatcher
                .fetch_reminder_page(pane.category, PageKind::Baseline, page);
        }
    }

    /// Events on the selected date, narrowed by the dog-name filter.
    pub fn day_events(&self) -> Vec<&DisplayEvent> {
        self.events
            .iter()
            .filter(|ev| ev.start_date() == Some(self.selected_date))
            .filter(|ev| self.matches_filter(ev))
            .collect()
    }

    fn matches_filter(&self, ev: &DisplayEvent) -> bool {
        let needle = self.filter.trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }
        let haystack = format!(
            "{} {}",
            ev.title.to_lowercase(),
            ev.dog_name.as_deref().unwrap_or("").to_lowercase()
        );
        haystack.contains(&needle)
    }

    /// Days of the displayed month that have at least one event, mapped
    /// to the category of their first event for the day marker color.
    pub fn day_markers(&self) -> Vec<(u32, Category)> {
        let year = self.selected_date.year();
        let month = self.selected_date.month();
        let mut seen = HashSet::new();
        let mut markers = Vec::new();
        for ev in &self.events {
            if let Some(date) = ev.start_date() {
                if date.year() == year && date.month() == month && seen.insert(date.day()) {
                    markers.push((date.day(), ev.category));
                }
            }
        }
        markers
    }

    // ── navigation ──

    pub fn next_day(&mut self) {
        self.selected_date = self.selected_date.succ_opt().unwrap_or(self.selected_date);
        self.on_date_changed();
    }

    pub fn prev_day(&mut self) {
        self.selected_date = self.selected_date.pred_opt().unwrap_or(self.selected_date);
        self.on_date_changed();
    }

    pub fn next_month(&mut self) {
        self.shift_month(1);
    }

    pub fn prev_month(&mut self) {
        self.shift_month(-1);
    }

    fn shift_month(&mut self, delta: i32) {
        let mut year = self.selected_date.year();
        let mut month = self.selected_date.month() as i32 + delta;
        if month > 12 {
            year += 1;
            month = 1;
        } else if month < 1 {
            year -= 1;
            month = 12;
        }
        let month = month as u32;
        let day = self.selected_date.day().min(days_in_month(year, month));
        if let Some(date) = NaiveDate::from_ymd_opt(year, month, day) {
            self.selected_date = date;
        }
        self.on_date_changed();
    }

    pub fn go_to_today(&mut self) {
        self.today = Local::now().date_naive();
        self.selected_date = self.today;
        self.on_date_changed();
    }

    fn on_date_changed(&mut self) {
        self.selected_event = 0;
        self.refresh_events();
    }

    // ── selection ──

    pub fn toggle_focus(&mut self) {
        self.focus = match self.focus {
            Focus::Calendar => Focus::Reminders,
            Focus::Reminders => Focus::Calendar,
        };
    }

    pub fn select_next(&mut self) {
        match self.focus {
            Focus::Calendar => {
                let count = self.day_events().len();
                if count > 0 {
                    self.selected_event = (self.selected_event + 1).min(count - 1);
                }
            }
            Focus::Reminders => {
                let count = self.panes[self.selected_pane].shown();
                if count > 0 {
                    self.selected_reminder = (self.selected_reminder + 1).min(count - 1);
                }
            }
        }
    }

    pub fn select_prev(&mut self) {
        match self.focus {
            Focus::Calendar => self.selected_event = self.selected_event.saturating_sub(1),
            Focus::Reminders => self.selected_reminder = self.selected_reminder.saturating_sub(1),
        }
    }

    pub fn next_pane(&mut self) {
        self.selected_pane = (self.selected_pane + 1) % self.panes.len();
        self.selected_reminder = 0;
    }

    pub fn prev_pane(&mut self) {
        self.selected_pane = (self.selected_pane + self.panes.len() - 1) % self.panes.len();
        self.selected_reminder = 0;
    }

    fn clamp_event_selection(&mut self) {
        let count = self.day_events().len();
        self.selected_event = self.selected_event.min(count.saturating_sub(1));
    }

    fn clamp_reminder_selection(&mut self) {
        let count = self.panes[self.selected_pane].shown();
        self.selected_reminder = self.selected_reminder.min(count.saturating_sub(1));
    }

    // ── reminders ──

    pub fn expand_selected_pane(&mut self) {
        let pane = &mut self.panes[self.selected_pane];
        if let Some(page) = pane.request_expand() {
            self.dispatcher
                .fetch_reminder_page(pane.category, PageKind::Expand, page);
        }
    }

    pub fn collapse_selected_pane(&mut self) {
        self.panes[self.selected_pane].collapse();
        self.clamp_reminder_selection();
    }

    pub fn acknowledge_selected(&mut self) {
        let pane = &mut self.panes[self.selected_pane];
        let Some(item) = pane.items().get(self.selected_reminder) else {
            return;
        };
        let id = item.item.id;
        if pane.begin_acknowledge(id) {
            self.dispatcher.acknowledge(pane.category, id);
        }
    }

    // ── forms ──

    pub fn open_add_appointment(&mut self) {
        self.open_form(FormState::new(
            FormKind::AddAppointment,
            None,
            self.config.urls.appointment_add.clone(),
        ));
    }

    pub fn open_add_medicine(&mut self) {
        self.open_form(FormState::new(
            FormKind::AddMedicine,
            None,
            self.config.urls.medicine_add.clone(),
        ));
    }

    /// Open the matching edit form for the selected event. Appointment
    /// and medicine records populate asynchronously: the form shows
    /// immediately and fills when the fetch resolves.
    pub fn open_edit_for_selected(&mut self) {
        let Some(ev) = self.day_events().get(self.selected_event).cloned().cloned() else {
            return;
        };
        let Some(record_id) = ev.record_id() else {
            return;
        };
        match ev.event_type.as_str() {
            "appointment" => {
                self.open_form(FormState::new(
                    FormKind::EditAppointment,
                    Some(record_id),
                    record_url(&self.config.urls.appointment_edit, record_id),
                ));
                self.dispatcher
                    .fetch_appointment(self.form_generation, record_id);
            }
            "medicine_start" | "medicine_end" => {
                self.open_form(FormState::new(
                    FormKind::EditMedicine,
                    Some(record_id),
                    record_url(&self.config.urls.medicine_edit, record_id),
                ));
                self.dispatcher
                    .fetch_medicine(self.form_generation, record_id);
            }
            _ => {}
        }
    }

    /// Dog forms populate synchronously from the event's own fields,
    /// the way the web client reads trigger-element data attributes.
    pub fn open_edit_dog(&mut self) {
        let Some(ev) = self.day_events().get(self.selected_event).cloned().cloned() else {
            return;
        };
        let Some(dog_id) = ev.dog_id else {
            return;
        };
        let mut form = FormState::new(
            FormKind::EditDog,
            Some(dog_id),
            record_url(&self.config.urls.dog_edit, dog_id),
        );
        form.set_value("name", ev.dog_name.clone().unwrap_or_default());
        self.open_form(form);
    }

    pub fn open_edit_personality(&mut self) {
        let Some(ev) = self.day_events().get(self.selected_event).cloned().cloned() else {
            return;
        };
        let Some(dog_id) = ev.dog_id else {
            return;
        };
        self.open_form(FormState::new(
            FormKind::EditPersonality,
            Some(dog_id),
            record_url(&self.config.urls.dog_personality, dog_id),
        ));
    }

    fn open_form(&mut self, form: FormState) {
        // A fresh state per open clears prior values and validation
        // marks; bumping the generation strands any populate fetch
        // still in flight for an earlier form.
        self.form_generation += 1;
        self.form = Some(form);
        self.input_mode = InputMode::Form;
    }

    pub fn close_form(&mut self) {
        self.form_generation += 1;
        self.form = None;
        self.input_mode = InputMode::Normal;
    }

    pub fn submit_form(&mut self) {
        let valid = match self.form.as_mut() {
            Some(form) => form.validate(),
            None => return,
        };
        if !valid {
            self.emit("Please fill in all required fields.", Severity::Warning);
            return;
        }
        if let Some(form) = self.form.as_ref() {
            self.dispatcher
                .submit_form(form.kind, form.action.clone(), form.payload());
        }
    }

    // ── filter ──

    pub fn start_filter(&mut self) {
        self.input_mode = InputMode::Filter;
    }

    pub fn filter_input(&mut self, c: char) {
        self.filter.push(c);
        self.clamp_event_selection();
    }

    pub fn filter_backspace(&mut self) {
        self.filter.pop();
        self.clamp_event_selection();
    }

    pub fn clear_filter(&mut self) {
        self.filter.clear();
        self.input_mode = InputMode::Normal;
        self.clamp_event_selection();
    }

    pub fn accept_filter(&mut self) {
        self.input_mode = InputMode::Normal;
    }
}

fn days_in_month(year: i32, month: u32) -> u32 {
    next_month_start(year, month)
        .signed_duration_since(NaiveDate::from_ymd_opt(year, month, 1).unwrap())
        .num_days() as u32
}

fn next_month_start(year: i32, month: u32) -> NaiveDate {
    if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    }
    .unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ApiError;
    use crate::calendar::RawEvent;

    fn test_app() -> App {
        // Points at a dead port; the startup fetches fail quietly in
        // the background and these tests never poll them.
        App::new(Config {
            server_url: "http://127.0.0.1:9".to_string(),
            ..Config::default()
        })
        .unwrap()
    }

    fn raw_event(id: &str, start: &str, dog: &str) -> RawEvent {
        serde_json::from_value(serde_json::json!({
            "id": id,
            "title": format!("{} - Vet", dog),
            "start": start,
            "extendedProps": {
                "eventType": "appointment",
                "appointment_type": "Vet",
                "dog_name": dog,
                "dog_id": 1
            }
        }))
        .unwrap()
    }

    #[test]
    fn stale_event_responses_are_discarded() {
        let mut app = test_app();
        let current = app.events_generation;
        app.on_completion(Completion::Events {
            generation: current.wrapping_sub(1),
            result: Ok(vec![raw_event("appt-1", "2026-03-10T09:00:00", "Rex")]),
        });
        assert!(app.events.is_empty());

        app.on_completion(Completion::Events {
            generation: current,
            result: Ok(vec![raw_event("appt-1", "2026-03-10T09:00:00", "Rex")]),
        });
        assert_eq!(app.events.len(), 1);
    }

    #[test]
    fn failed_event_fetch_emits_warning_and_keeps_page_usable() {
        let mut app = test_app();
        let current = app.events_generation;
        app.on_completion(Completion::Events {
            generation: current,
            result: Err(ApiError::Status {
                status: 500,
                body: "boom".to_string(),
            }),
        });
        assert!(app.running);
        let notice = app.notice.as_ref().unwrap();
        assert_eq!(notice.severity, Severity::Warning);
    }

    #[test]
    fn emitting_replaces_previous_notice() {
        let mut app = test_app();
        app.emit("first", Severity::Info);
        app.emit("second", Severity::Danger);
        let notice = app.notice.as_ref().unwrap();
        assert_eq!(notice.message, "second");
        assert_eq!(notice.severity, Severity::Danger);
    }

    #[test]
    fn filter_narrows_day_events_by_dog_name() {
        let mut app = test_app();
        app.selected_date = NaiveDate::from_ymd_opt(2026, 3, 10).unwrap();
        app.fetched_month = Some((2026, 3));
        let current = app.events_generation;
        app.on_completion(Completion::Events {
            generation: current,
            result: Ok(vec![
                raw_event("appt-1", "2026-03-10T09:00:00", "Rex"),
                raw_event("appt-2", "2026-03-10T11:00:00", "Luna"),
                raw_event("appt-3", "2026-03-11T09:00:00", "Rex"),
            ]),
        });
        assert_eq!(app.day_events().len(), 2);

        app.filter = "luna".to_string();
        let filtered = app.day_events();
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].dog_name.as_deref(), Some("Luna"));

        app.clear_filter();
        assert_eq!(app.day_events().len(), 2);
    }

    #[test]
    fn add_medicine_form_opens_empty_and_targets_the_add_url() {
        let mut app = test_app();
        app.open_add_medicine();
        let form = app.form.as_ref().unwrap();
        assert_eq!(form.kind, FormKind::AddMedicine);
        assert_eq!(form.action, "/medicines/add");
        assert!(!form.populating);
        assert!(form.fields.iter().all(|f| f.value.is_empty()));
        assert_eq!(app.input_mode, InputMode::Form);
    }

    #[test]
    fn baseline_and_expand_failures_read_differently() {
        let mut app = test_app();
        let category = app.panes[0].category;
        let err = || ApiError::Status {
            status: 500,
            body: String::new(),
        };

        app.on_completion(Completion::ReminderPage {
            category,
            kind: PageKind::Baseline,
            generation: 1,
            result: Err(err()),
        });
        assert!(app.notice.as_ref().unwrap().message.contains("refresh"));

        app.on_completion(Completion::ReminderPage {
            category,
            kind: PageKind::Expand,
            generation: 1,
            result: Err(err()),
        });
        assert!(app.notice.as_ref().unwrap().message.contains("more"));
    }

    #[test]
    fn stale_form_populate_is_discarded() {
        let mut app = test_app();
        app.open_add_appointment();
        let stale = app.form_generation;
        app.close_form();
        app.open_add_appointment();

        app.on_completion(Completion::Appointment {
            generation: stale,
            result: Ok(crate::api::AppointmentRecord {
                title: Some("old record".to_string()),
                ..Default::default()
            }),
        });
        let form = app.form.as_ref().unwrap();
        assert_eq!(form.value("title"), "");
    }

    #[test]
    fn invalid_form_blocks_submission_with_warning() {
        let mut app = test_app();
        app.open_add_appointment();
        app.submit_form();
        assert!(app.form.as_ref().unwrap().has_errors());
        assert_eq!(app.notice.as_ref().unwrap().severity, Severity::Warning);
        // Form stays open for correction
        assert_eq!(app.input_mode, InputMode::Form);
    }

    #[test]
    fn successful_submit_closes_form_with_success_notice() {
        let mut app = test_app();
        app.open_add_appointment();
        app.on_completion(Completion::FormSubmitted {
            kind: FormKind::AddAppointment,
            result: Ok(()),
        });
        assert!(app.form.is_none());
        assert_eq!(app.notice.as_ref().unwrap().severity, Severity::Success);
    }

    #[test]
    fn failed_submit_keeps_form_open() {
        let mut app = test_app();
        app.open_add_appointment();
        app.form.as_mut().unwrap().set_value("title", "Vet");
        app.on_completion(Completion::FormSubmitted {
            kind: FormKind::AddAppointment,
            result: Err(ApiError::Status {
                status: 400,
                body: String::new(),
            }),
        });
        assert!(app.form.is_some());
        assert_eq!(app.notice.as_ref().unwrap().severity, Severity::Warning);
    }

    #[test]
    fn month_shift_clamps_day() {
        let mut app = test_app();
        app.selected_date = NaiveDate::from_ymd_opt(2026, 1, 31).unwrap();
        app.next_month();
        assert_eq!(
            app.selected_date,
            NaiveDate::from_ymd_opt(2026, 2, 28).unwrap()
        );
    }
}
