mod command;
mod events;
mod input;
mod styles;
mod tui;
mod view;

pub use command::{Command, parse_command};
pub use tui::SearchTui;
