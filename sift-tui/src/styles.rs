use ratatui::style::{Color, Modifier, Style};

fn fg(color: Color) -> Style {
    Style::default().fg(color)
}

fn bold(color: Color) -> Style {
    fg(color).add_modifier(Modifier::BOLD)
}

pub fn header() -> Style {
    bold(Color::LightCyan)
}

/// Result headline, the clickable-looking line.
pub fn result_title() -> Style {
    bold(Color::LightBlue).add_modifier(Modifier::UNDERLINED)
}

pub fn result_link() -> Style {
    fg(Color::Green)
}

/// Section headings and the results banner.
pub fn label() -> Style {
    bold(Color::Yellow)
}

pub fn value() -> Style {
    fg(Color::Gray)
}

pub fn dim() -> Style {
    fg(Color::DarkGray)
}

pub fn skeleton() -> Style {
    dim().add_modifier(Modifier::DIM)
}

pub fn selected() -> Style {
    bold(Color::Black).bg(Color::LightCyan)
}

pub fn error() -> Style {
    bold(Color::LightRed)
}
