use ratatui::style::Color;

pub struct Theme {
    pub bg: Color,
    pub fg: Color,
    pub border: Color,
    pub title: Color,     // Yellow
    pub key: Color,       // Blue for keyboard shortcuts
    pub hint: Color,      // Grey
    pub status_bg: Color, // Slightly lighter BG for the status bar
    pub prompt: Color,    // Orange for the argument prompt
}

pub const DEFAULT_THEME: Theme = Theme {
    bg: Color::Rgb(30, 30, 46),
    fg: Color::Rgb(205, 214, 244),
    border: Color::Rgb(108, 112, 134),
    title: Color::Rgb(249, 226, 175),
    key: Color::Rgb(137, 180, 250),
    hint: Color::Rgb(108, 112, 134),
    status_bg: Color::Rgb(50, 50, 70),
    prompt: Color::Rgb(250, 179, 135),
};
