use std::path::PathBuf;
use std::sync::RwLock;

use ratatui::style::{Color, Modifier, Style};
use serde::Deserialize;

static THEME: RwLock<Option<Theme>> = RwLock::new(None);

/// Get the active theme. Loaded from config on first call; replaced
/// when the user toggles presets at runtime.
pub fn current() -> Theme {
    if let Ok(guard) = THEME.read() {
        if let Some(theme) = guard.as_ref() {
            return theme.clone();
        }
    }
    let theme = Theme::load().unwrap_or_default();
    if let Ok(mut guard) = THEME.write() {
        guard.get_or_insert_with(|| theme.clone());
    }
    theme
}

/// Switch between the dark and light presets. Returns the name of the
/// preset now active.
pub fn toggle_preset() -> &'static str {
    let next = if current().name == "light" { "dark" } else { "light" };
    if let Ok(mut guard) = THEME.write() {
        *guard = Some(Theme::preset(next));
    }
    next
}

// Const fallbacks used in places that need compile-time styles
pub const HEADER_STYLE: Style = Style::new().fg(Color::White).add_modifier(Modifier::BOLD);
pub const DIM_STYLE: Style = Style::new().fg(Color::DarkGray);
pub const BORDER_STYLE: Style = Style::new().fg(Color::Gray);
pub const TODAY_STYLE: Style = Style::new().fg(Color::Black).bg(Color::Yellow);
pub const ERROR_STYLE: Style = Style::new().fg(Color::Red);

#[derive(Debug, Clone)]
pub struct Theme {
    pub name: String,
    pub today: Style,
    pub selected: Style,
    pub header: Style,
    pub dim: Style,
    pub border: Style,
    pub status: Style,
    pub highlight: Style,
}

impl Default for Theme {
    fn default() -> Self {
        Self::dark()
    }
}

impl Theme {
    pub fn load() -> Option<Self> {
        let path = config_path()?;
        if !path.exists() {
            return None;
        }
        let content = std::fs::read_to_string(&path).ok()?;
        let config: ThemeConfig = toml::from_str(&content).ok()?;
        Some(config.into_theme())
    }

    /// Get a built-in preset by name.
    pub fn preset(name: &str) -> Self {
        match name {
            "light" => Self::light(),
            _ => Self::dark(),
        }
    }

    fn dark() -> Self {
        Self {
            name: "dark".to_string(),
            today: Style::default().fg(Color::Black).bg(Color::Yellow),
            selected: Style::default().fg(Color::Black).bg(Color::Cyan),
            header: Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
            dim: Style::default().fg(Color::DarkGray),
            border: Style::default().fg(Color::Gray),
            status: Style::default().fg(Color::White).bg(Color::DarkGray),
            highlight: Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD),
        }
    }

    fn light() -> Self {
        Self {
            name: "light".to_string(),
            today: Style::default().fg(Color::White).bg(Color::Blue),
            selected: Style::default().fg(Color::White).bg(Color::Rgb(0x34, 0x98, 0xdb)),
            header: Style::default().fg(Color::Black).add_modifier(Modifier::BOLD),
            dim: Style::default().fg(Color::Gray),
            border: Style::default().fg(Color::DarkGray),
            status: Style::default().fg(Color::Black).bg(Color::Gray),
            highlight: Style::default().bg(Color::Gray).add_modifier(Modifier::BOLD),
        }
    }
}

fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("rescuecal").join("theme.toml"))
}

// ── TOML config types ──

#[derive(Debug, Deserialize, Default)]
struct ThemeConfig {
    preset: Option<String>,
    today_fg: Option<String>,
    today_bg: Option<String>,
    selected_fg: Option<String>,
    selected_bg: Option<String>,
    header_fg: Option<String>,
    dim_fg: Option<String>,
    border_fg: Option<String>,
    status_fg: Option<String>,
    status_bg: Option<String>,
    highlight_bg: Option<String>,
}

impl ThemeConfig {
    fn into_theme(self) -> Theme {
        let mut theme = self
            .preset
            .as_deref()
            .map(Theme::preset)
            .unwrap_or_default();

        if let Some(c) = self.today_fg.as_deref().and_then(parse_color) {
            theme.today = theme.today.fg(c);
        }
        if let Some(c) = self.today_bg.as_deref().and_then(parse_color) {
            theme.today = theme.today.bg(c);
        }
        if let Some(c) = self.selected_fg.as_deref().and_then(parse_color) {
            theme.selected = theme.selected.fg(c);
        }
        if let Some(c) = self.selected_bg.as_deref().and_then(parse_color) {
            theme.selected = theme.selected.bg(c);
        }
        if let Some(c) = self.header_fg.as_deref().and_then(parse_color) {
            theme.header = theme.header.fg(c);
        }
        if let Some(c) = self.dim_fg.as_deref().and_then(parse_color) {
            theme.dim = theme.dim.fg(c);
        }
        if let Some(c) = self.border_fg.as_deref().and_then(parse_color) {
            theme.border = theme.border.fg(c);
        }
        if let Some(c) = self.status_fg.as_deref().and_then(parse_color) {
            theme.status = theme.status.fg(c);
        }
        if let Some(c) = self.status_bg.as_deref().and_then(parse_color) {
            theme.status = theme.status.bg(c);
        }
        if let Some(c) = self.highlight_bg.as_deref().and_then(parse_color) {
            theme.highlight = theme.highlight.bg(c);
        }

        theme
    }
}

/// Parse a color string: hex "#rrggbb", or named colors.
fn parse_color(s: &str) -> Option<Color> {
    let s = s.trim();
    if s.starts_with('#') && s.len() == 7 {
        let r = u8::from_str_radix(&s[1..3], 16).ok()?;
        let g = u8::from_str_radix(&s[3..5], 16).ok()?;
        let b = u8::from_str_radix(&s[5..7], 16).ok()?;
        return Some(Color::Rgb(r, g, b));
    }
    match s.to_lowercase().as_str() {
        "black" => Some(Color::Black),
        "red" => Some(Color::Red),
        "green" => Some(Color::Green),
        "yellow" => Some(Color::Yellow),
        "blue" => Some(Color::Blue),
        "magenta" => Some(Color::Magenta),
        "cyan" => Some(Color::Cyan),
        "white" => Some(Color::White),
        "gray" | "grey" => Some(Color::Gray),
        "darkgray" | "darkgrey" => Some(Color::DarkGray),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overrides_apply_on_top_of_preset() {
        let config: ThemeConfig =
            toml::from_str("preset = \"light\"\ntoday_bg = \"#e74c3c\"").unwrap();
        let theme = config.into_theme();
        assert_eq!(theme.name, "light");
        assert_eq!(theme.today.bg, Some(Color::Rgb(0xe7, 0x4c, 0x3c)));
    }

    #[test]
    fn toggle_flips_between_presets() {
        let first = toggle_preset();
        let second = toggle_preset();
        assert_ne!(first, second);
        assert_eq!(current().name, second);
        assert_eq!(toggle_preset(), first);
    }

    #[test]
    fn unknown_color_strings_are_ignored() {
        assert_eq!(parse_color("#zzzzzz"), None);
        assert_eq!(parse_color("sparkle"), None);
        assert_eq!(parse_color("cyan"), Some(Color::Cyan));
    }
}
