use gemchat_core::Theme;
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{block::Title, Block, Borders, List, ListItem, Paragraph, Wrap},
};
use crate::app::{App, FocusPane};

const HISTORY_WIDTH: u16 = 42;
const ASK_WIDTH: u16 = 9;
/// History rows show at most this many characters of the question.
const QUESTION_PREVIEW_CHARS: usize = 35;
const HIGHLIGHT_SYMBOL: &str = "> ";
const DELETE_GLYPH: &str = "✕";

struct Palette {
    bg: Color,
    fg: Color,
    muted: Color,
    panel_bg: Color,
    border: Color,
    focus: Color,
    link: Color,
    danger: Color,
    input_bg: Color,
    button_bg: Color,
}

impl Palette {
    fn for_theme(theme: Theme) -> Self {
        match theme {
            Theme::Dark => Self {
                bg: Color::Rgb(30, 30, 30),
                fg: Color::White,
                muted: Color::Rgb(161, 161, 170),
                panel_bg: Color::Rgb(43, 43, 43),
                border: Color::Rgb(63, 63, 70),
                focus: Color::Cyan,
                link: Color::Rgb(96, 165, 250),
                danger: Color::Rgb(239, 68, 68),
                input_bg: Color::Rgb(51, 51, 51),
                button_bg: Color::Rgb(37, 99, 235),
            },
            Theme::Light => Self {
                bg: Color::White,
                fg: Color::Black,
                muted: Color::Rgb(156, 163, 175),
                panel_bg: Color::Rgb(243, 244, 246),
                border: Color::Rgb(209, 213, 219),
                focus: Color::Rgb(79, 70, 229),
                link: Color::Rgb(59, 130, 246),
                danger: Color::Rgb(239, 68, 68),
                input_bg: Color::White,
                button_bg: Color::Rgb(37, 99, 235),
            },
        }
    }
}

/// Shorten a question for the history panel.
pub fn truncate_question(question: &str) -> String {
    if question.chars().count() > QUESTION_PREVIEW_CHARS {
        let head: String = question.chars().take(QUESTION_PREVIEW_CHARS).collect();
        format!("{}...", head)
    } else {
        question.to_string()
    }
}

/// Column of the delete glyph on a selected history row, counted from the
/// first cell inside the panel border.
pub fn delete_glyph_offset(question: &str) -> u16 {
    let preview = Span::raw(truncate_question(question)).width() + 1;
    (HIGHLIGHT_SYMBOL.len() + preview) as u16
}

/// Parse a line of text and convert **bold** markdown to styled spans
fn parse_markdown_line(text: &str) -> Line<'static> {
    let mut spans: Vec<Span<'static>> = Vec::new();
    let mut chars = text.chars().peekable();
    let mut current_text = String::new();

    while let Some(c) = chars.next() {
        if c == '*' && chars.peek() == Some(&'*') {
            chars.next();

            let mut bold_text = String::new();
            let mut found_close = false;
            while let Some(c) = chars.next() {
                if c == '*' && chars.peek() == Some(&'*') {
                    chars.next();
                    found_close = true;
                    break;
                }
                bold_text.push(c);
            }

            if found_close && !bold_text.is_empty() {
                if !current_text.is_empty() {
                    spans.push(Span::raw(std::mem::take(&mut current_text)));
                }
                spans.push(Span::styled(
                    bold_text,
                    Style::default().add_modifier(Modifier::BOLD),
                ));
            } else {
                // No closing **, keep it literal
                current_text.push_str("**");
                current_text.push_str(&bold_text);
            }
        } else {
            current_text.push(c);
        }
    }

    if !current_text.is_empty() {
        spans.push(Span::raw(current_text));
    }

    Line::from(spans)
}

pub fn render(app: &mut App, frame: &mut Frame) {
    let palette = Palette::for_theme(app.session.theme());
    let area = frame.area();

    frame.render_widget(
        Block::default().style(Style::default().bg(palette.bg).fg(palette.fg)),
        area,
    );

    // Main layout: header, body, footer
    let [header_area, body_area, footer_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(1),
    ])
    .areas(area);

    let [history_area, main_area] = Layout::horizontal([
        Constraint::Length(HISTORY_WIDTH),
        Constraint::Min(0),
    ])
    .areas(body_area);

    let [answer_area, input_row] = Layout::vertical([
        Constraint::Min(0),
        Constraint::Length(3),
    ])
    .areas(main_area);

    let [input_area, ask_area] = Layout::horizontal([
        Constraint::Min(0),
        Constraint::Length(ASK_WIDTH),
    ])
    .areas(input_row);

    // Store areas for mouse hit-testing
    app.history_area = Some(history_area);
    app.answer_area = Some(answer_area);
    app.ask_area = Some(ask_area);

    render_header(frame, header_area, &palette);
    render_history(app, frame, history_area, &palette);
    render_answer(app, frame, answer_area, &palette);
    render_input(app, frame, input_area, &palette);
    render_ask_button(app, frame, ask_area, &palette);
    render_footer(app, frame, footer_area, &palette);
}

fn render_header(frame: &mut Frame, area: Rect, palette: &Palette) {
    let title = Line::from(vec![
        Span::styled(" Gemini Clone ", Style::default().fg(Color::Magenta).bold()),
        Span::styled(
            format!("v{}", env!("CARGO_PKG_VERSION")),
            Style::default().fg(palette.muted),
        ),
    ]);

    let header = Paragraph::new(title)
        .alignment(Alignment::Center)
        .style(Style::default().bg(palette.panel_bg));
    frame.render_widget(header, area);
}

fn render_history(app: &mut App, frame: &mut Frame, area: Rect, palette: &Palette) {
    let focused = app.focus == FocusPane::History;
    let border_color = if focused { palette.focus } else { palette.border };

    let toggle = Title::from(Line::from(vec![
        Span::styled(" ^T ", Style::default().fg(palette.muted)),
        Span::styled(
            format!("{} ", app.session.theme().toggle_label()),
            Style::default().fg(Color::Magenta).bold(),
        ),
    ]))
    .alignment(Alignment::Right);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .style(Style::default().bg(palette.panel_bg).fg(palette.fg))
        .title(" Chat History ")
        .title(toggle);

    let history = app.session.history();
    if history.is_empty() {
        let empty = Paragraph::new(Span::styled(
            "No chats yet...",
            Style::default().fg(palette.muted),
        ))
        .block(block);
        frame.render_widget(empty, area);
        return;
    }

    let selected = app.history_state.selected();
    let items: Vec<ListItem> = history
        .iter()
        .enumerate()
        .map(|(i, exchange)| {
            let mut spans = vec![Span::styled(
                truncate_question(&exchange.question),
                Style::default().fg(palette.link),
            )];
            // Delete affordance on the row the keyboard is on
            if focused && selected == Some(i) {
                spans.push(Span::raw(" "));
                spans.push(Span::styled(DELETE_GLYPH, Style::default().fg(palette.danger)));
            }
            ListItem::new(Line::from(spans))
        })
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default().add_modifier(Modifier::BOLD | Modifier::UNDERLINED))
        .highlight_symbol(HIGHLIGHT_SYMBOL);

    frame.render_stateful_widget(list, area, &mut app.history_state);
}

fn render_answer(app: &App, frame: &mut Frame, area: Rect, palette: &Palette) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(palette.border))
        .title(" Answer ");

    let text = if app.session.is_loading() {
        // thinking. -> thinking.. -> thinking...
        let dots = ".".repeat((app.animation_frame as usize) + 1);
        Text::from(Span::styled(
            format!("thinking{}", dots),
            Style::default().fg(palette.muted).add_modifier(Modifier::ITALIC),
        ))
    } else if let Some(answer) = app.session.last_answer() {
        Text::from(answer.lines().map(parse_markdown_line).collect::<Vec<_>>())
    } else {
        Text::from(Span::styled(
            "Ask a question...",
            Style::default().fg(palette.muted),
        ))
    };

    // No trimming: indentation in answers is meaningful
    let answer = Paragraph::new(text)
        .block(block)
        .wrap(Wrap { trim: false })
        .scroll((app.answer_scroll, 0));

    frame.render_widget(answer, area);
}

fn render_input(app: &App, frame: &mut Frame, area: Rect, palette: &Palette) {
    let focused = app.focus == FocusPane::Input;
    let border_color = if focused { palette.focus } else { palette.border };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .style(Style::default().bg(palette.input_bg));

    // Calculate visible portion of input with horizontal scrolling
    let inner_width = area.width.saturating_sub(2) as usize;
    let input = app.session.input();
    let cursor_pos = app.input_cursor.min(input.chars().count());

    let scroll_offset = if inner_width == 0 {
        0
    } else if cursor_pos >= inner_width {
        cursor_pos - inner_width + 1
    } else {
        0
    };

    let content = if input.is_empty() {
        Span::styled("Ask anything...", Style::default().fg(palette.muted))
    } else {
        let visible_text: String = input.chars().skip(scroll_offset).take(inner_width).collect();
        Span::styled(visible_text, Style::default().fg(palette.fg))
    };

    frame.render_widget(Paragraph::new(content).block(block), area);

    if focused {
        let cursor_x = (cursor_pos - scroll_offset) as u16;
        frame.set_cursor_position((area.x + cursor_x + 1, area.y + 1));
    }
}

fn render_ask_button(app: &App, frame: &mut Frame, area: Rect, palette: &Palette) {
    // Disabled while a request is in flight
    let style = if app.session.is_loading() {
        Style::default().fg(palette.muted).add_modifier(Modifier::DIM)
    } else {
        Style::default().fg(Color::White).bg(palette.button_bg).bold()
    };

    let button = Paragraph::new("Ask")
        .alignment(Alignment::Center)
        .style(style)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(palette.border)),
        );
    frame.render_widget(button, area);
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect, palette: &Palette) {
    // Key style: dark background with bright text for visibility on both themes
    let key_style = Style::default().bg(Color::DarkGray).fg(Color::White);
    let label_style = Style::default().bg(palette.panel_bg).fg(palette.fg);

    let (mode_text, hints): (&str, Vec<(&str, &str)>) = match app.focus {
        FocusPane::Input => (
            " ASK ",
            vec![
                (" Enter ", " ask "),
                (" Tab ", " history "),
                (" PgUp/PgDn ", " scroll "),
                (" ^T ", " theme "),
                (" ^C ", " quit "),
            ],
        ),
        FocusPane::History => (
            " HISTORY ",
            vec![
                (" j/k ", " nav "),
                (" Enter ", " show "),
                (" d ", " delete "),
                (" t ", " theme "),
                (" i ", " ask "),
                (" q ", " quit "),
            ],
        ),
    };

    let mut spans = vec![
        Span::styled(mode_text, Style::default().bg(Color::Blue).fg(Color::White)),
        Span::styled(" ", label_style),
    ];
    for (key, label) in hints {
        spans.push(Span::styled(key, key_style));
        spans.push(Span::styled(label, label_style));
    }

    let footer = Paragraph::new(Line::from(spans)).style(Style::default().bg(palette.panel_bg));
    frame.render_widget(footer, area);
}
