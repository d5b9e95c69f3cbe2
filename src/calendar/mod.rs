pub mod category;
pub mod event;

pub use category::Category;
pub use event::{transform, DisplayEvent, RawEvent};
