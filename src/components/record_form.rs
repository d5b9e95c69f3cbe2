use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use crate::forms::FormState;
use crate::theme;

pub struct RecordForm;

impl RecordForm {
    pub fn render(frame: &mut Frame, area: Rect, state: &FormState) {
        // One row per field, plus title border, spacer and help line.
        let needed_h = state.fields.len() as u16 + 5;
        let form_w = area.width.min(54).max(30);
        let form_h = area.height.min(needed_h).max(8);
        let x = area.x + (area.width.saturating_sub(form_w)) / 2;
        let y = area.y + (area.height.saturating_sub(form_h)) / 2;
        let form_area = Rect::new(x, y, form_w, form_h);

        frame.render_widget(Clear, form_area);

        let title = if state.populating {
            format!(" {} (loading…) ", state.kind.title())
        } else {
            format!(" {} ", state.kind.title())
        };

        let block = Block::default()
            .title(title)
            .title_style(
                Style::default()
                    .fg(ratatui::style::Color::Green)
                    .add_modifier(Modifier::BOLD),
            )
            .borders(Borders::ALL)
            .border_style(Style::default().fg(ratatui::style::Color::Green));

        let inner = block.inner(form_area);
        frame.render_widget(block, form_area);

        let mut constraints: Vec<Constraint> = state
            .fields
            .iter()
            .map(|_| Constraint::Length(1))
            .collect();
        constraints.push(Constraint::Length(1)); // spacer
        constraints.push(Constraint::Length(1)); // help
        constraints.push(Constraint::Min(0));
        let rows = Layout::vertical(constraints).split(inner);

        for (i, field) in state.fields.iter().enumerate() {
            let active = i == state.active && !state.populating;
            render_field(frame, rows[i], field.label, &field.value, field.error, active);
        }

        let help = Line::from(vec![
            Span::styled("Tab", Style::default().add_modifier(Modifier::BOLD)),
            Span::styled(":Next ", theme::current().dim),
            Span::styled("Enter", Style::default().add_modifier(Modifier::BOLD)),
            Span::styled(":Save ", theme::current().dim),
            Span::styled("Esc", Style::default().add_modifier(Modifier::BOLD)),
            Span::styled(":Cancel", theme::current().dim),
        ]);
        frame.render_widget(Paragraph::new(help), rows[state.fields.len() + 1]);
    }
}

fn render_field(
    frame: &mut Frame,
    area: Rect,
    label: &str,
    value: &str,
    error: Option<&'static str>,
    active: bool,
) {
    let cursor = if active { "_" } else { "" };
    let style = if active {
        Style::default().fg(ratatui::style::Color::Cyan)
    } else {
        Style::default()
    };

    let mut spans = vec![
        Span::styled(format!("{:<12}", format!("{}:", label)), theme::current().dim),
        Span::styled(format!("{}{}", value, cursor), style),
    ];
    if let Some(msg) = error {
        spans.push(Span::styled(format!("  {}", msg), theme::ERROR_STYLE));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}
