//! Bridge between the synchronous UI loop and the async API client.
//!
//! The UI thread never blocks on the network: requests are spawned onto
//! a tokio runtime and their completions come back over a channel the
//! app drains once per tick. In-flight requests are not cancelled;
//! instead every completion carries the generation that issued it and
//! the app discards the stale ones.

use std::sync::Arc;

use chrono::NaiveDate;
use tokio::sync::mpsc;

use crate::api::{ApiClient, ApiError, AppointmentRecord, MedicineRecord, ReminderItem};
use crate::calendar::{Category, RawEvent};
use crate::forms::FormKind;
use crate::reminders::FetchPage;

/// Whether a reminder page is the baseline load or an expansion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageKind {
    Baseline,
    Expand,
}

/// A settled network request, delivered to the app on its tick.
pub enum Completion {
    Events {
        generation: u64,
        result: Result<Vec<RawEvent>, ApiError>,
    },
    ReminderPage {
        category: Category,
        kind: PageKind,
        generation: u64,
        result: Result<(Vec<ReminderItem>, Option<usize>), ApiError>,
    },
    Acknowledged {
        category: Category,
        reminder_id: i64,
        result: Result<(), ApiError>,
    },
    Appointment {
        generation: u64,
        result: Result<AppointmentRecord, ApiError>,
    },
    Medicine {
        generation: u64,
        result: Result<MedicineRecord, ApiError>,
    },
    FormSubmitted {
        kind: FormKind,
        result: Result<(), ApiError>,
    },
}

pub struct Dispatcher {
    runtime: tokio::runtime::Runtime,
    client: Arc<ApiClient>,
    tx: mpsc::UnboundedSender<Completion>,
    rx: mpsc::UnboundedReceiver<Completion>,
}

impl Dispatcher {
    pub fn new(client: ApiClient) -> std::io::Result<Self> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .enable_all()
            .build()?;
        let (tx, rx) = mpsc::unbounded_channel();
        Ok(Self {
            runtime,
            client: Arc::new(client),
            tx,
            rx,
        })
    }

    /// Drain every completion that has arrived since the last tick.
    pub fn poll(&mut self) -> Vec<Completion> {
        let mut done = Vec::new();
        while let Ok(completion) = self.rx.try_recv() {
            done.push(completion);
        }
        done
    }

    pub fn fetch_events(&self, generation: u64, start: NaiveDate, end: NaiveDate) {
        let client = self.client.clone();
        let tx = self.tx.clone();
        self.runtime.spawn(async move {
            let result = client.events(start, end).await;
            let _ = tx.send(Completion::Events { generation, result });
        });
    }

    pub fn fetch_reminder_page(&self, category: Category, kind: PageKind, page: FetchPage) {
        let client = self.client.clone();
        let tx = self.tx.clone();
        self.runtime.spawn(async move {
            let result = client
                .reminders_fragment(category.name(), page.offset, page.limit)
                .await
                .map(|html| {
                    (
                        crate::api::parse_reminder_fragment(&html),
                        crate::api::affordance_total(&html),
                    )
                });
            let _ = tx.send(Completion::ReminderPage {
                category,
                kind,
                generation: page.generation,
                result,
            });
        });
    }

    pub fn acknowledge(&self, category: Category, reminder_id: i64) {
        let client = self.client.clone();
        let tx = self.tx.clone();
        self.runtime.spawn(async move {
            let result = client.acknowledge_reminder(reminder_id).await;
            let _ = tx.send(Completion::Acknowledged {
                category,
                reminder_id,
                result,
            });
        });
    }

    pub fn fetch_appointment(&self, generation: u64, id: i64) {
        let client = self.client.clone();
        let tx = self.tx.clone();
        self.runtime.spawn(async move {
            let result = client.appointment(id).await;
            let _ = tx.send(Completion::Appointment { generation, result });
        });
    }

    pub fn fetch_medicine(&self, generation: u64, id: i64) {
        let client = self.client.clone();
        let tx = self.tx.clone();
        self.runtime.spawn(async move {
            let result = client.medicine(id).await;
            let _ = tx.send(Completion::Medicine { generation, result });
        });
    }

    pub fn submit_form(&self, kind: FormKind, action: String, payload: Vec<(String, String)>) {
        let client = self.client.clone();
        let tx = self.tx.clone();
        self.runtime.spawn(async move {
            let result = client.submit_form(&action, &payload).await;
            let _ = tx.send(Completion::FormSubmitted { kind, result });
        });
    }
}
