mod api;
mod app;
mod calendar;
mod components;
mod config;
mod forms;
mod net;
mod notice;
mod reminders;
mod term;
mod theme;

use std::time::Duration;

use app::{App, Focus, InputMode, ViewMode};
use color_eyre::Result;
use config::Config;
use crossterm::event::{KeyCode, KeyModifiers};
use ratatui::layout::{Constraint, Layout, Rect};

fn main() -> Result<()> {
    color_eyre::install()?;

    let config = Config::load();
    let mut app = App::new(config)?;

    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = term::restore();
        original_hook(panic_info);
    }));

    let mut terminal = term::init()?;
    let result = run(&mut terminal, &mut app);
    term::restore()?;
    result
}

fn run(terminal: &mut term::Tui, app: &mut App) -> Result<()> {
    while app.running {
        app.tick();

        terminal.draw(|frame| {
            let area = frame.area();

            // Main layout: content + status bar
            let layout = Layout::vertical([Constraint::Min(1), Constraint::Length(1)]).split(area);
            let content_area = layout[0];

            match app.view_mode {
                ViewMode::Month => render_month_layout(frame, content_area, app),
                ViewMode::Day => render_day_layout(frame, content_area, app),
            }

            if let Some(ref form) = app.form {
                components::RecordForm::render(frame, area, form);
            }

            if app.show_help {
                render_help(frame, area);
            }

            render_status_bar(frame, layout[1], app);
        })?;

        if let Some(key) = term::next_key_event(Duration::from_millis(100))? {
            // Any key dismisses the current notice
            app.notice = None;

            if app.show_help {
                if key.code == KeyCode::Esc || key.code == KeyCode::Char('?') {
                    app.show_help = false;
                }
                continue;
            }

            match app.input_mode {
                InputMode::Form => handle_form_input(app, key.code),
                InputMode::Filter => handle_filter_input(app, key.code),
                InputMode::Normal => handle_normal_input(app, key.code, key.modifiers),
            }
        }
    }

    Ok(())
}

fn handle_normal_input(app: &mut App, code: KeyCode, modifiers: KeyModifiers) {
    match (code, modifiers) {
        (KeyCode::Char('q'), _) | (KeyCode::Char('c'), KeyModifiers::CONTROL) => {
            app.running = false;
        }
        (KeyCode::Char('1'), _) => app.view_mode = ViewMode::Month,
        (KeyCode::Char('2'), _) => app.view_mode = ViewMode::Day,
        (KeyCode::Char('t'), _) => app.go_to_today(),
        (KeyCode::Char('r'), _) => app.refresh(),
        (KeyCode::Tab, _) => app.toggle_focus(),
        (KeyCode::Left, _) | (KeyCode::Char('h'), _) => match app.focus {
            Focus::Calendar => app.prev_day(),
            Focus::Reminders => app.prev_pane(),
        },
        (KeyCode::Right, _) | (KeyCode::Char('l'), _) => match app.focus {
            Focus::Calendar => app.next_day(),
            Focus::Reminders => app.next_pane(),
        },
        (KeyCode::Up, _) | (KeyCode::Char('k'), _) => app.select_prev(),
        (KeyCode::Down, _) | (KeyCode::Char('j'), _) => app.select_next(),
        (KeyCode::Char('['), _) => app.prev_month(),
        (KeyCode::Char(']'), _) => app.next_month(),
        (KeyCode::Enter, _) => {
            if app.focus == Focus::Reminders {
                app.expand_selected_pane();
            }
        }
        (KeyCode::Char('c'), _) => {
            if app.focus == Focus::Reminders {
                app.collapse_selected_pane();
            }
        }
        (KeyCode::Char(' '), _) => {
            if app.focus == Focus::Reminders {
                app.acknowledge_selected();
            }
        }
        (KeyCode::Char('n'), _) => app.open_add_appointment(),
        (KeyCode::Char('m'), _) => app.open_add_medicine(),
        (KeyCode::Char('T'), _) => {
            let name = theme::toggle_preset();
            app.emit(format!("Theme: {}", name), notice::Severity::Info);
        }
        (KeyCode::Char('e'), _) => app.open_edit_for_selected(),
        (KeyCode::Char('d'), _) => app.open_edit_dog(),
        (KeyCode::Char('p'), _) => app.open_edit_personality(),
        (KeyCode::Char('/'), _) => app.start_filter(),
        (KeyCode::Char('?'), _) => app.show_help = true,
        _ => {}
    }
}

fn handle_form_input(app: &mut App, code: KeyCode) {
    match code {
        KeyCode::Esc => app.close_form(),
        KeyCode::Enter => app.submit_form(),
        KeyCode::Tab => {
            if let Some(ref mut form) = app.form {
                form.next_field();
            }
        }
        KeyCode::BackTab => {
            if let Some(ref mut form) = app.form {
                form.prev_field();
            }
        }
        KeyCode::Backspace => {
            if let Some(ref mut form) = app.form {
                form.backspace();
            }
        }
        KeyCode::Char(c) => {
            if let Some(ref mut form) = app.form {
                form.input_char(c);
            }
        }
        _ => {}
    }
}

fn handle_filter_input(app: &mut App, code: KeyCode) {
    match code {
        KeyCode::Esc => app.clear_filter(),
        KeyCode::Enter => app.accept_filter(),
        KeyCode::Backspace => app.filter_backspace(),
        KeyCode::Char(c) => app.filter_input(c),
        _ => {}
    }
}

fn render_month_layout(frame: &mut ratatui::Frame, area: Rect, app: &App) {
    let markers = app.day_markers();

    if area.width < 60 {
        components::MonthView::render(
            frame,
            area,
            app.selected_date,
            app.today,
            &markers,
            app.focus == Focus::Calendar,
        );
        return;
    }

    let month_w = if area.width >= 100 { 44 } else { 38 };
    let content =
        Layout::horizontal([Constraint::Length(month_w), Constraint::Min(20)]).split(area);

    // Month grid above the reminder panes, day detail alongside
    let left =
        Layout::vertical([Constraint::Length(10), Constraint::Min(5)]).split(content[0]);

    components::MonthView::render(
        frame,
        left[0],
        app.selected_date,
        app.today,
        &markers,
        app.focus == Focus::Calendar,
    );
    components::ReminderList::render(
        frame,
        left[1],
        &app.panes,
        app.selected_pane,
        app.selected_reminder,
        app.focus == Focus::Reminders,
    );
    components::DayView::render(
        frame,
        content[1],
        app.selected_date,
        &app.day_events(),
        app.selected_event,
        app.focus == Focus::Calendar,
        app.events_loading,
        &app.filter,
    );
}

fn render_day_layout(frame: &mut ratatui::Frame, area: Rect, app: &App) {
    if area.width < 60 {
        components::DayView::render(
            frame,
            area,
            app.selected_date,
            &app.day_events(),
            app.selected_event,
            app.focus == Focus::Calendar,
            app.events_loading,
            &app.filter,
        );
        return;
    }

    let content =
        Layout::horizontal([Constraint::Min(30), Constraint::Length(36)]).split(area);

    components::DayView::render(
        frame,
        content[0],
        app.selected_date,
        &app.day_events(),
        app.selected_event,
        app.focus == Focus::Calendar,
        app.events_loading,
        &app.filter,
    );
    components::ReminderList::render(
        frame,
        content[1],
        &app.panes,
        app.selected_pane,
        app.selected_reminder,
        app.focus == Focus::Reminders,
    );
}

fn render_status_bar(frame: &mut ratatui::Frame, area: Rect, app: &App) {
    use ratatui::style::Style;
    use ratatui::text::{Line, Span};
    use ratatui::widgets::Paragraph;

    let w = area.width as usize;

    let mode_str = match app.view_mode {
        ViewMode::Month => "[1]Month",
        ViewMode::Day => "[2]Day",
    };

    let context = match app.input_mode {
        InputMode::Form => " [Form]",
        InputMode::Filter => " [Filter]",
        InputMode::Normal => "",
    };

    // A notice takes over the right side; its severity sets the color
    let (right_text, right_style) = if let Some(ref notice) = app.notice {
        (
            format!(" {} ", notice.message),
            Style::default()
                .fg(notice.severity.color())
                .bg(ratatui::style::Color::DarkGray),
        )
    } else {
        let hints = match app.input_mode {
            InputMode::Filter => " type to filter, Enter:Keep Esc:Clear".to_string(),
            InputMode::Form => " Tab:Next Enter:Save Esc:Cancel".to_string(),
            InputMode::Normal if w >= 100 => {
                " hjkl:Nav [/]:Mon Tab:Focus Enter:More Sp:Done n:New e:Edit /:Filter ?:Help q:Quit"
                    .to_string()
            }
            InputMode::Normal if w >= 60 => {
                " Tab:Focus Enter:More Sp:Done n:New ?:Help q:Quit".to_string()
            }
            InputMode::Normal => " ?:Help q:Quit".to_string(),
        };
        (hints, theme::current().status)
    };

    let left = format!(" {}{} ", mode_str, context);
    let padding = " ".repeat(w.saturating_sub(left.len() + right_text.len()));

    let line = Line::from(vec![
        Span::styled(left, theme::current().status),
        Span::styled(padding, theme::current().status),
        Span::styled(right_text, right_style),
    ]);

    frame.render_widget(Paragraph::new(line).style(theme::current().status), area);
}

fn render_help(frame: &mut ratatui::Frame, area: Rect) {
    use ratatui::style::{Color, Modifier, Style};
    use ratatui::text::{Line, Span};
    use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};

    let popup_w = area.width.min(54).max(30);
    let popup_h = area.height.min(28).max(12);
    let x = area.x + (area.width.saturating_sub(popup_w)) / 2;
    let y = area.y + (area.height.saturating_sub(popup_h)) / 2;
    let popup_area = Rect::new(x, y, popup_w, popup_h);

    frame.render_widget(Clear, popup_area);

    let block = Block::default()
        .title(" Keybindings ")
        .title_style(Style::default().fg(Color::Green).add_modifier(Modifier::BOLD))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Green));

    let inner = block.inner(popup_area);
    frame.render_widget(block, popup_area);

    let key_style = Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD);
    let desc_style = Style::default();
    let section_style = Style::default().add_modifier(Modifier::BOLD | Modifier::UNDERLINED);

    let lines = vec![
        Line::from(Span::styled("Navigation", section_style)),
        Line::from(vec![
            Span::styled("  h/l       ", key_style),
            Span::styled("Previous/next day (or reminder tab)", desc_style),
        ]),
        Line::from(vec![
            Span::styled("  j/k       ", key_style),
            Span::styled("Select event or reminder", desc_style),
        ]),
        Line::from(vec![
            Span::styled("  [/]       ", key_style),
            Span::styled("Previous/next month", desc_style),
        ]),
        Line::from(vec![
            Span::styled("  t         ", key_style),
            Span::styled("Jump to today", desc_style),
        ]),
        Line::from(vec![
            Span::styled("  Tab       ", key_style),
            Span::styled("Switch calendar/reminders focus", desc_style),
        ]),
        Line::from(vec![
            Span::styled("  1/2       ", key_style),
            Span::styled("Month / Day view", desc_style),
        ]),
        Line::from(""),
        Line::from(Span::styled("Reminders", section_style)),
        Line::from(vec![
            Span::styled("  Enter     ", key_style),
            Span::styled("Show more in this category", desc_style),
        ]),
        Line::from(vec![
            Span::styled("  c         ", key_style),
            Span::styled("Collapse back to the first five", desc_style),
        ]),
        Line::from(vec![
            Span::styled("  Space     ", key_style),
            Span::styled("Mark reminder done", desc_style),
        ]),
        Line::from(""),
        Line::from(Span::styled("Records", section_style)),
        Line::from(vec![
            Span::styled("  n         ", key_style),
            Span::styled("New appointment", desc_style),
        ]),
        Line::from(vec![
            Span::styled("  m         ", key_style),
            Span::styled("New medicine", desc_style),
        ]),
        Line::from(vec![
            Span::styled("  e         ", key_style),
            Span::styled("Edit selected appointment/medicine", desc_style),
        ]),
        Line::from(vec![
            Span::styled("  d         ", key_style),
            Span::styled("Edit the event's dog", desc_style),
        ]),
        Line::from(vec![
            Span::styled("  p         ", key_style),
            Span::styled("Edit the dog's personality", desc_style),
        ]),
        Line::from(""),
        Line::from(vec![
            Span::styled("  /         ", key_style),
            Span::styled("Filter events by dog or title", desc_style),
        ]),
        Line::from(vec![
            Span::styled("  r         ", key_style),
            Span::styled("Refresh events and reminders", desc_style),
        ]),
        Line::from(vec![
            Span::styled("  T         ", key_style),
            Span::styled("Toggle light/dark theme", desc_style),
        ]),
        Line::from(vec![
            Span::styled("  q", key_style),
            Span::styled(" / ", theme::DIM_STYLE),
            Span::styled("Esc     ", key_style),
            Span::styled("Quit / close popup", desc_style),
        ]),
    ];

    let para = Paragraph::new(lines).wrap(Wrap { trim: false });
    frame.render_widget(para, inner);
}
