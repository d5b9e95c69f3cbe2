use chrono::{Datelike, NaiveDate};
use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::calendar::Category;
use crate::theme;

const DAY_NAMES: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

pub struct MonthView;

impl MonthView {
    /// Render the month grid. `markers` maps a day of this month to the
    /// category whose color marks it as having events.
    pub fn render(
        frame: &mut Frame,
        area: Rect,
        selected_date: NaiveDate,
        today: NaiveDate,
        markers: &[(u32, Category)],
        focused: bool,
    ) {
        let year = selected_date.year();
        let month = selected_date.month();

        let title = format!(" {} {} ", month_name(month), year);
        let border_style = if focused {
            Style::default().fg(ratatui::style::Color::Cyan)
        } else {
            theme::BORDER_STYLE
        };

        let block = Block::default()
            .title(title)
            .title_style(theme::HEADER_STYLE)
            .borders(Borders::ALL)
            .border_style(border_style);

        let inner = block.inner(area);
        frame.render_widget(block, area);

        let header_cells: Vec<Span> = DAY_NAMES
            .iter()
            .map(|d| Span::styled(format!("{:^5}", d), theme::HEADER_STYLE))
            .collect();
        let header = Line::from(header_cells);

        let first_day = match NaiveDate::from_ymd_opt(year, month, 1) {
            Some(d) => d,
            None => return,
        };
        let first_weekday = first_day.weekday().num_days_from_sunday() as usize;
        let days_in_month = days_in_month(year, month);

        let mut weeks: Vec<Line> = Vec::new();
        let mut current_day: i32 = 1 - first_weekday as i32;

        while current_day <= days_in_month as i32 {
            let mut cells: Vec<Span> = Vec::new();
            for _ in 0..7 {
                if current_day < 1 || current_day > days_in_month as i32 {
                    cells.push(Span::raw("     "));
                } else {
                    let day = current_day as u32;
                    let date = NaiveDate::from_ymd_opt(year, month, day);
                    let marker = markers.iter().find(|(d, _)| *d == day);

                    let style = if date == Some(today) && date == Some(selected_date) {
                        theme::TODAY_STYLE.add_modifier(Modifier::BOLD)
                    } else if date == Some(selected_date) {
                        theme::current().selected
                    } else if date == Some(today) {
                        theme::current().today
                    } else {
                        Style::default()
                    };

                    cells.push(Span::styled(format!(" {:>2}", day), style));
                    match marker {
                        Some((_, category)) => cells.push(Span::styled(
                            "• ",
                            Style::default().fg(category.color()),
                        )),
                        None => cells.push(Span::raw("  ")),
                    }
                }
                current_day += 1;
            }
            weeks.push(Line::from(cells));
        }

        let mut constraints = vec![Constraint::Length(1)];
        for _ in &weeks {
            constraints.push(Constraint::Length(1));
        }
        constraints.push(Constraint::Min(0));

        let rows = Layout::vertical(constraints).split(inner);

        frame.render_widget(Paragraph::new(header), rows[0]);
        for (i, week) in weeks.iter().enumerate() {
            frame.render_widget(Paragraph::new(week.clone()), rows[i + 1]);
        }
    }
}

fn days_in_month(year: i32, month: u32) -> u32 {
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    };
    match (next, NaiveDate::from_ymd_opt(year, month, 1)) {
        (Some(next), Some(first)) => next.signed_duration_since(first).num_days() as u32,
        _ => 30,
    }
}

fn month_name(month: u32) -> &'static str {
    match month {
        1 => "January",
        2 => "February",
        3 => "March",
        4 => "April",
        5 => "May",
        6 => "June",
        7 => "July",
        8 => "August",
        9 => "September",
        10 => "October",
        11 => "November",
        12 => "December",
        _ => "Unknown",
    }
}
