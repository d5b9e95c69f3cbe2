use chrono::NaiveDate;
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Frame,
};

use crate::calendar::DisplayEvent;
use crate::theme;

pub struct DayView;

impl DayView {
    pub fn render(
        frame: &mut Frame,
        area: Rect,
        date: NaiveDate,
        events: &[&DisplayEvent],
        selected: usize,
        focused: bool,
        loading: bool,
        filter: &str,
    ) {
        let w = area.width as usize;

        let title = if w >= 30 {
            format!(" {} ", date.format("%A, %B %d, %Y"))
        } else {
            format!(" {} ", date.format("%m/%d"))
        };

        let footer = if loading {
            " loading… ".to_string()
        } else if !filter.is_empty() {
            format!(" {} event(s) · filter: {} ", events.len(), filter)
        } else if events.is_empty() {
            String::new()
        } else {
            format!(" {} event(s) ", events.len())
        };

        let border_style = if focused {
            Style::default().fg(ratatui::style::Color::Cyan)
        } else {
            theme::BORDER_STYLE
        };

        let block = Block::default()
            .title(title)
            .title_style(theme::HEADER_STYLE)
            .title_bottom(Line::from(Span::styled(footer, theme::DIM_STYLE)))
            .borders(Borders::ALL)
            .border_style(border_style);

        if events.is_empty() {
            let inner = block.inner(area);
            frame.render_widget(block, area);
            let msg = if filter.is_empty() {
                "No events"
            } else {
                "No events match the filter"
            };
            frame.render_widget(Paragraph::new(msg).style(theme::DIM_STYLE), inner);
            return;
        }

        let inner_w = area.width.saturating_sub(2) as usize;

        let all_day: Vec<(usize, &&DisplayEvent)> =
            events.iter().enumerate().filter(|(_, e)| e.all_day).collect();
        let timed: Vec<(usize, &&DisplayEvent)> =
            events.iter().enumerate().filter(|(_, e)| !e.all_day).collect();

        let mut items: Vec<ListItem> = Vec::new();

        if !all_day.is_empty() {
            items.push(ListItem::new(Line::from(Span::styled(
                "All Day",
                Style::default().add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
            ))));
            for (idx, ev) in &all_day {
                items.push(format_event(ev, inner_w, *idx == selected && focused));
            }
            if !timed.is_empty() {
                items.push(ListItem::new(Line::from("")));
            }
        }

        for (idx, ev) in &timed {
            items.push(format_event(ev, inner_w, *idx == selected && focused));
        }

        let list = List::new(items).block(block);
        frame.render_widget(list, area);
    }
}

fn format_event(ev: &DisplayEvent, max_width: usize, selected: bool) -> ListItem<'static> {
    let category_chip = Span::styled("  ", Style::default().bg(ev.category.color()));

    let time_str = {
        let d = ev.duration_display();
        if d.is_empty() {
            " ".to_string()
        } else {
            format!(" {} ", d)
        }
    };
    let time_span = Span::styled(time_str.clone(), Style::default().add_modifier(Modifier::DIM));

    let title_style = if selected {
        theme::current().selected
    } else {
        Style::default()
    };
    let title_span = Span::styled(ev.title.clone(), title_style);

    let mut spans = vec![category_chip, time_span, title_span];

    let used = 2 + time_str.len() + ev.title.len();
    if let Some(ref loc) = ev.location {
        if !loc.is_empty() && used + 4 + loc.len() <= max_width {
            spans.push(Span::styled(format!(" @ {}", loc), theme::DIM_STYLE));
        }
    }
    if let Some(ref vet) = ev.vet_name {
        if !vet.is_empty() && used + 6 + vet.len() <= max_width {
            spans.push(Span::styled(format!(" Dr. {}", vet), theme::DIM_STYLE));
        }
    }

    ListItem::new(Line::from(spans))
}
