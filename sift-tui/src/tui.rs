use crate::{
    command::{Command, parse_command},
    events::spawn_feeders,
    input::LineEditor,
    styles,
    view::{self, StyledLine, ViewSnap},
};
use anyhow::Result;
use crossterm::{
    cursor::Show,
    event::{Event as CtEvent, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{
        EnterAlternateScreen, LeaveAlternateScreen, SetTitle, disable_raw_mode, enable_raw_mode,
    },
};
use ratatui::{Terminal, backend::CrosstermBackend};
use sift_search::display::results_banner;
use sift_search::view::MAX_PAGE;
use sift_search::{Location, RequestState, SearchView, TitleCell};
use std::io::{self, Stdout};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

const BRAILLE_FRAMES: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

pub enum TuiMsg {
    Input(CtEvent),
    InputError(String),
    Tick,
    StateChanged,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Submit(String),
    NextTab,
    NextPage,
    PrevPage,
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Stop,
}

/// Editor, scroll, and overlay state; everything keys can touch directly.
#[derive(Default)]
pub struct UiState {
    pub editor: LineEditor,
    pub scroll: usize,
    pub show_help: bool,
    pub notice: Option<StyledLine>,
    dirty: bool,
    spin_idx: usize,
}

impl UiState {
    pub fn handle_key(&mut self, key: KeyEvent) -> Option<Action> {
        self.dirty = true;
        match (key.code, key.modifiers) {
            (KeyCode::Char('c'), KeyModifiers::CONTROL)
            | (KeyCode::Char('q'), KeyModifiers::CONTROL) => return Some(Action::Quit),
            (KeyCode::Char('n'), KeyModifiers::CONTROL) => return Some(Action::NextPage),
            (KeyCode::Char('p'), KeyModifiers::CONTROL) => return Some(Action::PrevPage),
            (KeyCode::Tab, _) => return Some(Action::NextTab),
            (KeyCode::Enter, _) => return Some(Action::Submit(self.editor.text().to_string())),
            (KeyCode::PageUp, _) => self.scroll = self.scroll.saturating_sub(5),
            (KeyCode::PageDown, _) => self.scroll = self.scroll.saturating_add(5),
            (KeyCode::Up, _) => self.scroll = self.scroll.saturating_sub(1),
            (KeyCode::Down, _) => self.scroll = self.scroll.saturating_add(1),
            (KeyCode::Left, _) => self.editor.left(),
            (KeyCode::Right, _) => self.editor.right(),
            (KeyCode::Home, _) => self.editor.home(),
            (KeyCode::End, _) => self.editor.end(),
            (KeyCode::Backspace, _) => self.editor.backspace(),
            (KeyCode::Delete, _) => self.editor.delete(),
            (KeyCode::Esc, _) if self.show_help => self.show_help = false,
            (KeyCode::Esc, _) => self.editor.clear(),
            (KeyCode::Char(ch), _) => self.editor.insert(ch),
            _ => self.dirty = false,
        }
        None
    }

    fn spinner(&self, busy: bool) -> &'static str {
        if busy {
            BRAILLE_FRAMES[self.spin_idx % BRAILLE_FRAMES.len()]
        } else {
            " "
        }
    }

    fn step_spinner(&mut self, busy: bool) {
        if busy {
            self.spin_idx = (self.spin_idx + 1) % BRAILLE_FRAMES.len();
            self.dirty = true;
        }
    }

    fn warn(&mut self, text: impl Into<String>) {
        self.notice = Some(StyledLine::new(text, styles::error()));
        self.dirty = true;
    }
}

/// Interactive results view. Owns the terminal for its lifetime and restores
/// it on exit or drop.
pub struct SearchTui {
    view: SearchView,
    title: TitleCell,
    term: Terminal<CrosstermBackend<Stdout>>,
    ui: UiState,
    state: RequestState,
    banner: Option<String>,
    applied_title: String,
    restored: bool,
}

impl SearchTui {
    /// `title` must be the sink the view's orchestrator writes to.
    pub fn new(view: SearchView, title: TitleCell) -> Result<Self> {
        let mut stdout = io::stdout();
        enable_raw_mode()?;
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut term = Terminal::new(backend)?;
        term.clear()?;

        let state = view.state();
        Ok(Self {
            view,
            title,
            term,
            ui: UiState {
                dirty: true,
                ..Default::default()
            },
            state,
            banner: None,
            applied_title: String::new(),
            restored: false,
        })
    }

    /// Run until the user quits. `entry` is applied as the initial navigation.
    pub async fn run(mut self, entry: Option<Location>) -> Result<()> {
        let shutdown = CancellationToken::new();
        let (tx, mut rx) = mpsc::channel(256);
        spawn_feeders(tx, self.view.subscribe(), shutdown.clone());

        if let Some(location) = entry {
            let _ = self.view.enter(location);
        }
        self.ui.editor.set(self.view.draft());
        tracing::info!(
            target: "tui",
            provider = self.view.orchestrator().provider_name(),
            "tui.started"
        );

        let result = loop {
            let Some(msg) = rx.recv().await else {
                break Ok(());
            };
            match self.handle(msg) {
                Ok(Flow::Continue) => {}
                Ok(Flow::Stop) => break Ok(()),
                Err(e) => break Err(e),
            }
        };

        shutdown.cancel();
        self.restore();
        tracing::info!(target: "tui", "tui.stopped");
        result
    }

    fn handle(&mut self, msg: TuiMsg) -> Result<Flow> {
        match msg {
            TuiMsg::Input(CtEvent::Key(key)) if key.kind == KeyEventKind::Press => {
                match self.ui.handle_key(key) {
                    Some(action) => return Ok(self.apply(action)),
                    None => self.sync_draft(),
                }
            }
            TuiMsg::Input(CtEvent::Resize(..)) => self.ui.dirty = true,
            TuiMsg::Input(_) => {}
            TuiMsg::InputError(e) => {
                tracing::error!(target: "tui", error = %e, "tui.input.error");
                return Ok(Flow::Stop);
            }
            TuiMsg::Tick => {
                self.ui.step_spinner(self.state.is_loading());
                if self.ui.dirty {
                    self.draw()?;
                }
            }
            TuiMsg::StateChanged => self.on_state_changed()?,
        }
        Ok(Flow::Continue)
    }

    // Command lines never become the draft.
    fn sync_draft(&mut self) {
        let text = self.ui.editor.text();
        if !text.trim_start().starts_with('/') {
            self.view.set_draft(text);
        }
    }

    fn apply(&mut self, action: Action) -> Flow {
        self.ui.notice = None;
        match action {
            Action::Quit => return Flow::Stop,
            Action::Submit(line) => return self.submit_line(&line),
            Action::NextTab => {
                let next = self.view.vertical().next();
                let _ = self.view.select_vertical(next);
            }
            Action::NextPage => {
                if self.view.page() < MAX_PAGE {
                    let _ = self.view.select_page(self.view.page() + 1);
                }
            }
            Action::PrevPage => {
                if self.view.page() > 1 {
                    let _ = self.view.select_page(self.view.page() - 1);
                }
            }
        }
        self.ui.dirty = true;
        Flow::Continue
    }

    fn submit_line(&mut self, line: &str) -> Flow {
        match parse_command(line) {
            Command::Search(text) => {
                self.view.set_draft(text);
                if self.view.submit().is_some() {
                    self.ui.show_help = false;
                }
            }
            Command::Lucky(text) => {
                if !text.is_empty() {
                    self.view.set_draft(text);
                }
                if self.view.submit_lucky().is_some() {
                    self.ui.show_help = false;
                }
            }
            Command::Related(n) => {
                if self.view.follow_related(n - 1).is_some() {
                    self.ui.show_help = false;
                } else {
                    self.ui.warn(format!("× No related search #{n}"));
                }
            }
            Command::Tab(vertical) => {
                let _ = self.view.select_vertical(vertical);
            }
            Command::Page(n) if (1..=MAX_PAGE).contains(&n) => {
                let _ = self.view.select_page(n);
            }
            Command::Page(_) => self.ui.warn(format!("× Pages run from 1 to {MAX_PAGE}")),
            Command::Help => self.ui.show_help = !self.ui.show_help,
            Command::Quit => return Flow::Stop,
            Command::Unknown(s) => self.ui.warn(format!("× Unknown command: {s} (try /help)")),
        }
        self.ui.editor.set(self.view.draft());
        self.ui.dirty = true;
        Flow::Continue
    }

    fn on_state_changed(&mut self) -> Result<()> {
        let state = self.view.state();
        match &state {
            RequestState::Idle => self.banner = None,
            RequestState::Loading { .. } => {
                self.ui.scroll = 0;
                self.banner = None;
            }
            RequestState::Ready { results, .. } => {
                self.banner = Some(results_banner(
                    results.organic_results.len(),
                    &mut rand::thread_rng(),
                ));
            }
        }
        self.state = state;
        self.apply_title()?;
        self.ui.dirty = true;
        Ok(())
    }

    fn apply_title(&mut self) -> Result<()> {
        let title = self.title.get();
        if !title.is_empty() && title != self.applied_title {
            execute!(self.term.backend_mut(), SetTitle(&title))?;
            self.applied_title = title;
        }
        Ok(())
    }

    fn draw(&mut self) -> Result<()> {
        let location = self.view.source().location().to_href();
        let snap = ViewSnap {
            title: &self.applied_title,
            location: &location,
            input: self.ui.editor.text(),
            input_cursor: self.ui.editor.cursor(),
            state: &self.state,
            vertical: self.view.vertical(),
            page: self.view.page(),
            banner: self.banner.as_deref(),
            scroll: self.ui.scroll,
            spinner: self.ui.spinner(self.state.is_loading()),
            provider: self.view.orchestrator().provider_name(),
            notice: self.ui.notice.as_ref(),
            show_help: self.ui.show_help,
        };
        view::draw(&mut self.term, &snap)?;
        self.ui.dirty = false;
        Ok(())
    }

    fn restore(&mut self) {
        if self.restored {
            return;
        }
        self.restored = true;
        disable_raw_mode().ok();
        let _ = execute!(self.term.backend_mut(), LeaveAlternateScreen, Show);
    }
}

impl Drop for SearchTui {
    fn drop(&mut self) {
        self.restore();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ctrl(ch: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(ch), KeyModifiers::CONTROL)
    }

    #[test]
    fn typing_then_enter_submits_the_line() {
        let mut ui = UiState::default();
        for ch in "cats".chars() {
            assert_eq!(ui.handle_key(key(KeyCode::Char(ch))), None);
        }
        assert_eq!(
            ui.handle_key(key(KeyCode::Enter)),
            Some(Action::Submit("cats".into()))
        );
        assert_eq!(ui.editor.text(), "cats");
    }

    #[test]
    fn control_keys_map_to_actions() {
        let mut ui = UiState::default();
        assert_eq!(ui.handle_key(ctrl('c')), Some(Action::Quit));
        assert_eq!(ui.handle_key(ctrl('q')), Some(Action::Quit));
        assert_eq!(ui.handle_key(ctrl('n')), Some(Action::NextPage));
        assert_eq!(ui.handle_key(ctrl('p')), Some(Action::PrevPage));
        assert_eq!(ui.handle_key(key(KeyCode::Tab)), Some(Action::NextTab));
        assert_eq!(ui.editor.text(), "");
    }

    #[test]
    fn scrolling_saturates_at_the_top() {
        let mut ui = UiState::default();
        ui.handle_key(key(KeyCode::PageDown));
        ui.handle_key(key(KeyCode::Down));
        assert_eq!(ui.scroll, 6);
        ui.handle_key(key(KeyCode::PageUp));
        ui.handle_key(key(KeyCode::PageUp));
        assert_eq!(ui.scroll, 0);
    }

    #[test]
    fn escape_closes_help_before_clearing_input() {
        let mut ui = UiState {
            show_help: true,
            ..Default::default()
        };
        ui.editor.set("dogs");
        ui.handle_key(key(KeyCode::Esc));
        assert!(!ui.show_help);
        assert_eq!(ui.editor.text(), "dogs");
        ui.handle_key(key(KeyCode::Esc));
        assert_eq!(ui.editor.text(), "");
    }

    #[test]
    fn spinner_only_moves_while_busy() {
        let mut ui = UiState::default();
        ui.step_spinner(false);
        assert_eq!(ui.spinner(false), " ");
        ui.step_spinner(true);
        assert_eq!(ui.spinner(true), BRAILLE_FRAMES[1]);
    }
}
