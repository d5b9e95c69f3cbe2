//! Per-category reminder panes with incremental "show more" loading.
//!
//! Each pane owns a baseline page of items plus any expanded pages, and
//! walks Collapsed -> Loading -> Expanded -> Collapsed. Expansion is
//! split into a pure command phase (`request_expand` decides what to
//! fetch) and an apply phase (`apply_page` / `expand_failed`), so the
//! state machine is testable without a server. Responses carry the
//! generation that issued them; a stale generation is discarded, which
//! resolves the web client's overlapping-request race.

use crate::api::ReminderItem;
use crate::calendar::Category;

/// Items shown while collapsed, and the expansion batch size.
pub const PAGE_SIZE: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaneState {
    Collapsed,
    Loading,
    Expanded,
}

/// What the expand affordance currently reads, if visible at all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Affordance {
    Hidden,
    ShowMore(usize),
    Loading,
}

/// A fetch the pane wants issued, tagged with the generation that must
/// match for the response to be applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchPage {
    pub offset: usize,
    pub limit: usize,
    pub generation: u64,
}

#[derive(Debug, Clone)]
pub struct PaneItem {
    pub item: ReminderItem,
    /// True while an acknowledge request for this item is in flight.
    pub acknowledging: bool,
}

pub struct ReminderPane {
    pub category: Category,
    items: Vec<PaneItem>,
    total: usize,
    state: PaneState,
    generation: u64,
    loaded: bool,
}

impl ReminderPane {
    pub fn new(category: Category) -> Self {
        Self {
            category,
            items: Vec::new(),
            total: 0,
            state: PaneState::Collapsed,
            generation: 0,
            loaded: false,
        }
    }

    pub fn items(&self) -> &[PaneItem] {
        &self.items
    }

    pub fn shown(&self) -> usize {
        self.items.len()
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn state(&self) -> PaneState {
        self.state
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Request the baseline page (the web client gets this page
    /// server-rendered; here it is fetched on startup and on refresh).
    pub fn request_baseline(&mut self) -> FetchPage {
        self.generation += 1;
        self.state = PaneState::Loading;
        FetchPage {
            offset: 0,
            limit: PAGE_SIZE,
            generation: self.generation,
        }
    }

    /// Apply the baseline page. `total` comes from the fragment's
    /// affordance when present, otherwise the page length stands in.
    pub fn apply_baseline(
        &mut self,
        generation: u64,
        items: Vec<ReminderItem>,
        total: Option<usize>,
    ) -> bool {
        if generation != self.generation {
            return false;
        }
        self.total = total.unwrap_or(items.len()).max(items.len());
        self.items = items
            .into_iter()
            .map(|item| PaneItem {
                item,
                acknowledging: false,
            })
            .collect();
        self.state = PaneState::Collapsed;
        self.loaded = true;
        true
    }

    /// Begin an expand transition. Returns the page to fetch, or `None`
    /// when nothing should be requested: everything is already shown,
    /// or a fetch is still in flight (duplicate clicks are suppressed).
    pub fn request_expand(&mut self) -> Option<FetchPage> {
        if self.state == PaneState::Loading {
            return None;
        }
        let items_to_show = PAGE_SIZE.min(self.total.saturating_sub(self.shown()));
        if items_to_show == 0 {
            return None;
        }
        self.generation += 1;
        self.state = PaneState::Loading;
        Some(FetchPage {
            offset: self.shown(),
            limit: items_to_show,
            generation: self.generation,
        })
    }

    /// Append an expanded page. The whole batch lands or none of it;
    /// stale generations are discarded and leave the pane untouched.
    pub fn apply_page(&mut self, generation: u64, items: Vec<ReminderItem>) -> bool {
        if generation != self.generation {
            return false;
        }
        if items.is_empty() {
            // Server had nothing beyond what is shown; trust it over
            // our stale total.
            self.total = self.shown();
        } else {
            self.items.extend(items.into_iter().map(|item| PaneItem {
                item,
                acknowledging: false,
            }));
            self.total = self.total.max(self.shown());
        }
        self.state = PaneState::Expanded;
        true
    }

    /// A failed fetch restores the previous affordance state; no
    /// partial batch is ever visible.
    pub fn expand_failed(&mut self, generation: u64) {
        if generation != self.generation || self.state != PaneState::Loading {
            return;
        }
        self.state = if self.shown() > PAGE_SIZE {
            PaneState::Expanded
        } else {
            PaneState::Collapsed
        };
    }

    /// Drop every item beyond the baseline page and reset the
    /// affordance from the original total.
    pub fn collapse(&mut self) {
        // Invalidate any fetch still in flight.
        self.generation += 1;
        self.items.truncate(PAGE_SIZE.min(self.total));
        self.state = PaneState::Collapsed;
    }

    /// Current affordance content, derived from counts and state.
    pub fn affordance(&self) -> Affordance {
        if self.state == PaneState::Loading {
            return Affordance::Loading;
        }
        let remaining = self.total.saturating_sub(self.shown());
        if remaining == 0 {
            Affordance::Hidden
        } else {
            Affordance::ShowMore(PAGE_SIZE.min(remaining))
        }
    }

    /// Mark an item's acknowledge request as in flight. Returns false
    /// when the item is unknown or already being acknowledged.
    pub fn begin_acknowledge(&mut self, reminder_id: i64) -> bool {
        match self.items.iter_mut().find(|i| i.item.id == reminder_id) {
            Some(item) if !item.acknowledging => {
                item.acknowledging = true;
                true
            }
            _ => false,
        }
    }

    /// Settle an acknowledge request. Success removes the item and
    /// shrinks the total; failure restores the item's normal action.
    pub fn finish_acknowledge(&mut self, reminder_id: i64, ok: bool) {
        if ok {
            let before = self.items.len();
            self.items.retain(|i| i.item.id != reminder_id);
            if self.items.len() < before {
                self.total = self.total.saturating_sub(1);
            }
        } else if let Some(item) = self.items.iter_mut().find(|i| i.item.id == reminder_id) {
            item.acknowledging = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: i64) -> ReminderItem {
        ReminderItem {
            id,
            category: Some("vet".to_string()),
            text: format!("reminder {}", id),
        }
    }

    fn items(range: std::ops::Range<i64>) -> Vec<ReminderItem> {
        range.map(item).collect()
    }

    fn loaded_pane(total: usize) -> ReminderPane {
        let mut pane = ReminderPane::new(Category::Vet);
        let fetch = pane.request_baseline();
        assert!(pane.apply_baseline(fetch.generation, items(0..5), Some(total)));
        pane
    }

    #[test]
    fn expand_requests_next_page_and_updates_label() {
        let mut pane = loaded_pane(12);
        assert_eq!(pane.affordance(), Affordance::ShowMore(5));

        let fetch = pane.request_expand().unwrap();
        assert_eq!((fetch.offset, fetch.limit), (5, 5));
        assert_eq!(pane.affordance(), Affordance::Loading);

        assert!(pane.apply_page(fetch.generation, items(5..10)));
        assert_eq!(pane.shown(), 10);
        // 2 of 12 remain: "Show 2 more"
        assert_eq!(pane.affordance(), Affordance::ShowMore(2));
    }

    #[test]
    fn final_expand_requests_only_the_remainder_then_hides_affordance() {
        let mut pane = loaded_pane(12);
        let fetch = pane.request_expand().unwrap();
        pane.apply_page(fetch.generation, items(5..10));

        let fetch = pane.request_expand().unwrap();
        assert_eq!((fetch.offset, fetch.limit), (10, 2));
        pane.apply_page(fetch.generation, items(10..12));

        assert_eq!(pane.shown(), 12);
        assert_eq!(pane.affordance(), Affordance::Hidden);
        // Fully shown is terminal for expansion
        assert!(pane.request_expand().is_none());
    }

    #[test]
    fn never_requests_more_than_remaining() {
        let mut pane = loaded_pane(7);
        let fetch = pane.request_expand().unwrap();
        assert_eq!(fetch.limit, 2);
    }

    #[test]
    fn no_affordance_when_everything_fits_in_baseline() {
        let pane = loaded_pane(4);
        assert_eq!(pane.affordance(), Affordance::Hidden);
    }

    #[test]
    fn duplicate_expand_while_loading_is_suppressed() {
        let mut pane = loaded_pane(12);
        let first = pane.request_expand().unwrap();
        assert!(pane.request_expand().is_none());
        assert!(pane.apply_page(first.generation, items(5..10)));
    }

    #[test]
    fn failed_expand_restores_previous_affordance() {
        let mut pane = loaded_pane(12);
        let fetch = pane.request_expand().unwrap();
        pane.expand_failed(fetch.generation);
        assert_eq!(pane.state(), PaneState::Collapsed);
        assert_eq!(pane.shown(), 5);
        assert_eq!(pane.affordance(), Affordance::ShowMore(5));
    }

    #[test]
    fn stale_response_is_discarded() {
        let mut pane = loaded_pane(12);
        let stale = pane.request_expand().unwrap();
        pane.collapse();
        assert!(!pane.apply_page(stale.generation, items(5..10)));
        assert_eq!(pane.shown(), 5);
    }

    #[test]
    fn collapse_truncates_to_baseline_and_resets_label() {
        let mut pane = loaded_pane(12);
        let fetch = pane.request_expand().unwrap();
        pane.apply_page(fetch.generation, items(5..10));
        assert_eq!(pane.shown(), 10);

        pane.collapse();
        assert_eq!(pane.shown(), 5);
        assert_eq!(pane.affordance(), Affordance::ShowMore(5));
    }

    #[test]
    fn collapse_with_small_total_keeps_all_items() {
        let mut pane = ReminderPane::new(Category::Grooming);
        let fetch = pane.request_baseline();
        pane.apply_baseline(fetch.generation, items(0..3), Some(3));
        pane.collapse();
        assert_eq!(pane.shown(), 3);
    }

    #[test]
    fn empty_page_marks_list_fully_shown() {
        // Server-side total drifted below ours (items completed
        // elsewhere); an empty page corrects it.
        let mut pane = loaded_pane(12);
        let fetch = pane.request_expand().unwrap();
        assert!(pane.apply_page(fetch.generation, Vec::new()));
        assert_eq!(pane.total(), 5);
        assert_eq!(pane.affordance(), Affordance::Hidden);
    }

    #[test]
    fn failed_acknowledge_keeps_item_and_restores_action() {
        let mut pane = loaded_pane(12);
        assert!(pane.begin_acknowledge(2));
        assert!(pane.items()[2].acknowledging);
        // Second attempt while in flight is refused
        assert!(!pane.begin_acknowledge(2));

        pane.finish_acknowledge(2, false);
        assert_eq!(pane.shown(), 5);
        assert!(!pane.items()[2].acknowledging);
        assert_eq!(pane.total(), 12);
    }

    #[test]
    fn successful_acknowledge_removes_item_and_shrinks_total() {
        let mut pane = loaded_pane(12);
        pane.begin_acknowledge(2);
        pane.finish_acknowledge(2, true);
        assert_eq!(pane.shown(), 4);
        assert_eq!(pane.total(), 11);
        assert!(pane.items().iter().all(|i| i.item.id != 2));
    }
}
