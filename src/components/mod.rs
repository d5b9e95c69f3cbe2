pub mod day_view;
pub mod month_view;
pub mod record_form;
pub mod reminder_list;

pub use day_view::DayView;
pub use month_view::MonthView;
pub use record_form::RecordForm;
pub use reminder_list::ReminderList;
