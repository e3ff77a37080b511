use crate::styles;
use anyhow::Result;
use ratatui::{
    Frame, Terminal,
    backend::Backend,
    layout::{Constraint, Direction, Layout, Position, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph, Tabs},
};
use sift_search::view::MAX_PAGE;
use sift_search::{RequestState, SearchResultSet, Vertical};
use textwrap::wrap;

const SKELETON_WIDTHS: [usize; 3] = [24, 56, 40];
const SKELETON_ROWS: usize = 4;

pub const HELP: &[(&str, &str)] = &[
    ("<text>", "search for <text>"),
    ("/lucky <text>", "search, flagged as \"I'm feeling lucky\""),
    ("/related <n>", "follow the n-th related search"),
    ("/tab <name>", "all, images, videos, news, maps"),
    ("/page <n>", "jump to result page 1-10"),
    ("/help", "toggle this help"),
    ("/quit", "exit"),
    ("Tab", "next results tab"),
    ("Ctrl+N / Ctrl+P", "next / previous page"),
    ("Up Down PgUp PgDn", "scroll"),
];

#[derive(Clone)]
pub struct StyledLine {
    pub text: String,
    pub style: Style,
}

impl StyledLine {
    pub fn new(text: impl Into<String>, style: Style) -> Self {
        Self {
            text: text.into(),
            style,
        }
    }

    fn blank() -> Self {
        Self::new(String::new(), Style::default())
    }
}

pub struct ViewSnap<'a> {
    /// Window title, empty until the first dispatch.
    pub title: &'a str,
    pub location: &'a str,
    pub input: &'a str,
    pub input_cursor: usize,
    pub state: &'a RequestState,
    pub vertical: Vertical,
    pub page: u32,
    pub banner: Option<&'a str>,
    pub scroll: usize,
    pub spinner: &'static str,
    pub provider: &'a str,
    pub notice: Option<&'a StyledLine>,
    pub show_help: bool,
}

pub fn draw<B: Backend>(term: &mut Terminal<B>, snap: &ViewSnap<'_>) -> Result<()> {
    term.draw(|frame| render(frame, snap))?;
    Ok(())
}

pub fn render(frame: &mut Frame<'_>, snap: &ViewSnap<'_>) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Min(3),
            Constraint::Length(3),
            Constraint::Length(3),
        ])
        .split(frame.area());

    let mut header = vec![Span::styled(" sift ", styles::header())];
    if !snap.title.is_empty() {
        header.push(Span::styled(format!(" {} ", snap.title), styles::value()));
    }
    header.push(Span::styled(snap.location.to_string(), styles::dim()));
    let header = Paragraph::new(Line::from(header));
    frame.render_widget(header, layout[0]);

    let tabs = Tabs::new(Vertical::ALL.iter().map(|v| v.label()))
        .select(snap.vertical.index())
        .style(styles::dim())
        .highlight_style(styles::selected());
    frame.render_widget(tabs, layout[1]);

    render_body(frame, layout[2], snap);

    let input_box = Paragraph::new(snap.input.to_string())
        .block(Block::default().borders(Borders::ALL).title(" Search "));
    frame.render_widget(Clear, layout[3]);
    frame.render_widget(input_box, layout[3]);
    frame.set_cursor_position(Position {
        x: layout[3].x + 1 + visual_caret_col(snap.input, snap.input_cursor),
        y: layout[3].y + 1,
    });

    let status = Paragraph::new(status_line(snap))
        .block(Block::default().borders(Borders::ALL).title(" Status "));
    frame.render_widget(status, layout[4]);
}

fn render_body(frame: &mut Frame<'_>, area: Rect, snap: &ViewSnap<'_>) {
    let visible_h = area.height.saturating_sub(2) as usize;
    let content_width = area.width.saturating_sub(2) as usize;
    let lines = if snap.show_help {
        help_lines()
    } else {
        body_lines(snap)
    };
    let wrapped = wrap_lines(&lines, content_width);
    let start = snap.scroll.min(wrapped.len().saturating_sub(visible_h));
    let end = (start + visible_h).min(wrapped.len());

    let items: Vec<ListItem> = wrapped[start..end]
        .iter()
        .map(|(text, style)| ListItem::new(Line::from(Span::styled(text.clone(), *style))))
        .collect();
    let title = if snap.show_help { " Help " } else { " Results " };
    let body = List::new(items).block(Block::default().borders(Borders::ALL).title(title));
    frame.render_widget(body, area);
}

fn status_line(snap: &ViewSnap<'_>) -> Line<'static> {
    let (label, style) = match snap.state {
        RequestState::Idle => ("Idle", styles::dim()),
        RequestState::Loading { .. } => ("Searching…", styles::label()),
        RequestState::Ready { .. } => ("Ready", styles::result_link()),
    };
    let mut spans = vec![
        Span::raw(" "),
        Span::styled(snap.spinner, styles::label()),
        Span::raw(" "),
        Span::styled(label, style),
        Span::raw(format!(
            " • {} • {} • page {}",
            snap.provider,
            snap.vertical.label(),
            snap.page
        )),
    ];
    if let Some(notice) = snap.notice {
        spans.push(Span::raw("  "));
        spans.push(Span::styled(notice.text.clone(), notice.style));
    }
    Line::from(spans)
}

pub fn body_lines(snap: &ViewSnap<'_>) -> Vec<StyledLine> {
    match snap.state {
        RequestState::Idle => vec![StyledLine::new(
            "Type a query and press Enter. /help lists commands.",
            styles::dim(),
        )],
        RequestState::Loading { query } => {
            let mut out = vec![
                StyledLine::new(format!("Searching for \"{query}\""), styles::dim()),
                StyledLine::blank(),
            ];
            for _ in 0..SKELETON_ROWS {
                for width in SKELETON_WIDTHS {
                    out.push(StyledLine::new("░".repeat(width), styles::skeleton()));
                }
                out.push(StyledLine::blank());
            }
            out
        }
        RequestState::Ready { results, .. } => result_lines(results, snap.banner, snap.page),
    }
}

fn result_lines(results: &SearchResultSet, banner: Option<&str>, page: u32) -> Vec<StyledLine> {
    let mut out = Vec::new();
    if let Some(banner) = banner {
        out.push(StyledLine::new(banner, styles::dim()));
        out.push(StyledLine::blank());
    }

    if results.organic_results.is_empty() {
        out.push(StyledLine::new("No results.", styles::dim()));
        out.push(StyledLine::blank());
    }
    for hit in &results.organic_results {
        let origin = match &hit.source {
            Some(source) => format!("{source} › {}", hit.link),
            None => hit.link.clone(),
        };
        out.push(StyledLine::new(origin, styles::result_link()));
        out.push(StyledLine::new(hit.title.clone(), styles::result_title()));
        if !hit.snippet.is_empty() {
            out.push(StyledLine::new(hit.snippet.clone(), styles::value()));
        }
        out.push(StyledLine::blank());
    }

    if !results.people_also_ask.is_empty() {
        out.push(StyledLine::new("People also ask", styles::label()));
        for qa in &results.people_also_ask {
            out.push(StyledLine::new(format!("  ▸ {}", qa.question), styles::value()));
            out.push(StyledLine::new(format!("    {}", qa.answer), styles::dim()));
        }
        out.push(StyledLine::blank());
    }

    if !results.related_searches.is_empty() {
        out.push(StyledLine::new("Related searches", styles::label()));
        for (i, related) in results.related_searches.iter().enumerate() {
            out.push(StyledLine::new(
                format!("  [{}] {related}", i + 1),
                styles::value(),
            ));
        }
        out.push(StyledLine::blank());
    }

    out.push(StyledLine::new(pagination(page), styles::dim()));
    out
}

/// `Page  1 [2] 3 … 10`, current page bracketed.
pub fn pagination(current: u32) -> String {
    let pages: Vec<String> = (1..=MAX_PAGE)
        .map(|p| {
            if p == current {
                format!("[{p}]")
            } else {
                p.to_string()
            }
        })
        .collect();
    format!("Page  {}", pages.join(" "))
}

fn help_lines() -> Vec<StyledLine> {
    let mut out = vec![StyledLine::new("Commands:", styles::label())];
    for (keys, what) in HELP {
        out.push(StyledLine::new(format!("  {keys:<18} {what}"), styles::value()));
    }
    out
}

fn visual_caret_col(input: &str, cursor: usize) -> u16 {
    use unicode_width::UnicodeWidthStr;
    UnicodeWidthStr::width(&input[..cursor]) as u16
}

fn wrap_lines(lines: &[StyledLine], width: usize) -> Vec<(String, Style)> {
    let effective_width = width.max(1);
    let mut out = Vec::new();

    for entry in lines {
        if entry.text.is_empty() {
            out.push((String::new(), entry.style));
            continue;
        }
        let segments = wrap(&entry.text, effective_width);
        if segments.is_empty() {
            out.push((String::new(), entry.style));
        } else {
            out.extend(
                segments
                    .into_iter()
                    .map(|seg| (seg.into_owned(), entry.style)),
            );
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::backend::TestBackend;
    use sift_search::synthesize;

    fn snap<'a>(state: &'a RequestState, banner: Option<&'a str>) -> ViewSnap<'a> {
        ViewSnap {
            title: "cats - Search",
            location: "/search?q=cats",
            input: "cats",
            input_cursor: 4,
            state,
            vertical: Vertical::All,
            page: 1,
            banner,
            scroll: 0,
            spinner: " ",
            provider: "offline",
            notice: None,
            show_help: false,
        }
    }

    fn screen(term: &Terminal<TestBackend>) -> String {
        let buf = term.backend().buffer();
        let mut out = String::new();
        for y in 0..buf.area.height {
            for x in 0..buf.area.width {
                out.push_str(buf[(x, y)].symbol());
            }
            out.push('\n');
        }
        out
    }

    #[test]
    fn ready_state_renders_results_and_related() {
        let state = RequestState::Ready {
            query: "cats".into(),
            results: synthesize("cats"),
        };
        let mut term = Terminal::new(TestBackend::new(120, 80)).unwrap();
        draw(&mut term, &snap(&state, Some("About 5 results (0.42 seconds)"))).unwrap();
        let text = screen(&term);
        assert!(text.contains("About 5 results (0.42 seconds)"));
        assert!(text.contains("cats - Wikipedia"));
        assert!(text.contains("https://en.wikipedia.org/wiki/cats"));
        assert!(text.contains("[8] cats tips"));
        assert!(text.contains("Ready"));
        assert!(text.contains("cats - Search"));
    }

    #[test]
    fn loading_state_shows_skeleton() {
        let state = RequestState::Loading {
            query: "cats".into(),
        };
        let lines = body_lines(&snap(&state, None));
        assert_eq!(lines[0].text, "Searching for \"cats\"");
        assert!(lines.iter().any(|l| l.text.starts_with('░')));

        let mut term = Terminal::new(TestBackend::new(80, 30)).unwrap();
        draw(&mut term, &snap(&state, None)).unwrap();
        assert!(screen(&term).contains("Searching…"));
    }

    #[test]
    fn tabs_row_lists_every_vertical() {
        let state = RequestState::Idle;
        let mut term = Terminal::new(TestBackend::new(80, 20)).unwrap();
        draw(&mut term, &snap(&state, None)).unwrap();
        let text = screen(&term);
        for v in Vertical::ALL {
            assert!(text.contains(v.label()), "{v}");
        }
    }

    #[test]
    fn pagination_brackets_the_current_page() {
        assert_eq!(pagination(2), "Page  1 [2] 3 4 5 6 7 8 9 10");
    }

    #[test]
    fn wrapping_keeps_styles() {
        let lines = vec![StyledLine::new("aaa bbb ccc", styles::label())];
        let wrapped = wrap_lines(&lines, 4);
        assert_eq!(wrapped.len(), 3);
        assert!(wrapped.iter().all(|(_, s)| *s == styles::label()));
    }
}
