use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Frame,
};

use crate::reminders::{Affordance, ReminderPane};
use crate::theme;

pub struct ReminderList;

impl ReminderList {
    pub fn render(
        frame: &mut Frame,
        area: Rect,
        panes: &[ReminderPane],
        selected_pane: usize,
        selected_reminder: usize,
        focused: bool,
    ) {
        let total: usize = panes.iter().map(|p| p.total()).sum();
        let w = area.width as usize;

        let title = if w >= 25 {
            format!(" Reminders ({}) ", total)
        } else {
            " Reminders ".to_string()
        };

        let border_style = if focused {
            Style::default().fg(ratatui::style::Color::Cyan)
        } else {
            theme::current().border
        };

        let block = Block::default()
            .title(title)
            .title_style(theme::current().header)
            .borders(Borders::ALL)
            .border_style(border_style);

        let inner = block.inner(area);
        frame.render_widget(block, area);

        // Category tabs
        let mut tab_spans: Vec<Span> = vec![Span::raw(" ")];
        for (i, pane) in panes.iter().enumerate() {
            let label = format!("{}:{}", pane.category.name(), pane.total());
            let style = if i == selected_pane {
                theme::current()
                    .highlight
                    .fg(pane.category.color())
                    .add_modifier(Modifier::UNDERLINED)
            } else {
                theme::DIM_STYLE
            };
            tab_spans.push(Span::styled(label, style));
            tab_spans.push(Span::raw(" "));
        }

        let Some(pane) = panes.get(selected_pane) else {
            return;
        };

        let mut items: Vec<ListItem> = vec![ListItem::new(Line::from(tab_spans))];

        if pane.is_loaded() && pane.items().is_empty() {
            items.push(ListItem::new(Line::from(Span::styled(
                " No reminders in this category",
                theme::DIM_STYLE,
            ))));
        }

        let inner_w = inner.width as usize;
        for (i, entry) in pane.items().iter().enumerate() {
            let is_selected = i == selected_reminder && focused;
            let action = if entry.acknowledging { " [~] " } else { " [ ] " };
            let item_style = if is_selected {
                theme::current().selected
            } else {
                Style::default()
            };

            items.push(ListItem::new(Line::from(vec![
                Span::styled("  ", Style::default().bg(pane.category.color())),
                Span::styled(action.to_string(), item_style),
                Span::styled(truncate(&entry.item.text, inner_w.saturating_sub(7)), item_style),
            ])));
        }

        match pane.affordance() {
            Affordance::Hidden => {}
            Affordance::Loading => {
                items.push(ListItem::new(Line::from(Span::styled(
                    "   ◌ Loading…",
                    theme::DIM_STYLE,
                ))));
            }
            Affordance::ShowMore(n) => {
                items.push(ListItem::new(Line::from(Span::styled(
                    format!("   ▾ Show {} more", n),
                    Style::default().add_modifier(Modifier::BOLD),
                ))));
            }
        }
        if pane.shown() > crate::reminders::PAGE_SIZE {
            items.push(ListItem::new(Line::from(Span::styled(
                "   ▴ Show less",
                theme::DIM_STYLE,
            ))));
        }

        let list = List::new(items);
        frame.render_widget(list, inner);

        if !pane.is_loaded() {
            let msg = Paragraph::new("Loading reminders…").style(theme::DIM_STYLE);
            let msg_area = Rect::new(
                inner.x + 1,
                inner.y.saturating_add(1).min(inner.bottom().saturating_sub(1)),
                inner.width.saturating_sub(1),
                1,
            );
            frame.render_widget(msg, msg_area);
        }
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else if max > 3 {
        let cut: String = s.chars().take(max - 3).collect();
        format!("{}...", cut)
    } else {
        s.chars().take(max).collect()
    }
}
