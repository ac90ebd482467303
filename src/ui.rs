use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph, Wrap},
};

use ragask::{QueryMode, RequestState};

use crate::app::{App, Focus, Health, InputMode};

pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();

    // Main layout: header, body, footer
    let [header_area, body_area, footer_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(1),
    ])
    .areas(area);

    render_header(app, frame, header_area);
    render_form(app, frame, body_area);
    render_footer(app, frame, footer_area);

    if app.show_mode_picker {
        render_mode_picker(app, frame, area);
    }
}

fn render_header(app: &App, frame: &mut Frame, area: Rect) {
    let (health_text, health_color) = match &app.health {
        Health::Unknown => ("?".to_string(), Color::Gray),
        Health::Checking => ("checking".to_string(), Color::Gray),
        Health::Up(status) => (status.clone(), Color::Green),
        Health::Down => ("unreachable".to_string(), Color::Red),
    };

    let title = Line::from(vec![
        Span::styled(" AI Query ", Style::default().fg(Color::Cyan).bold()),
        Span::styled(app.client.base_url().to_string(), Style::default().fg(Color::White)),
        Span::raw(" "),
        Span::styled(format!("[{}]", health_text), Style::default().fg(health_color)),
        Span::raw(" "),
        Span::styled(
            format!("v{}", env!("CARGO_PKG_VERSION")),
            Style::default().fg(Color::Gray),
        ),
    ]);

    let header = Paragraph::new(title).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(header, area);
}

fn border_color(app: &App, focus: Focus) -> Color {
    if app.focus != focus {
        Color::DarkGray
    } else if app.input_mode == InputMode::Editing {
        Color::Yellow
    } else {
        Color::Cyan
    }
}

fn render_form(app: &mut App, frame: &mut Frame, area: Rect) {
    let attachment_height = if app.attachments_enabled { 3 } else { 0 };
    let [query_area, mode_area, attachment_area, answer_area] = Layout::vertical([
        Constraint::Length(3),
        Constraint::Length(3),
        Constraint::Length(attachment_height),
        Constraint::Min(0),
    ])
    .areas(area);

    let submit_hint = if app.form.is_pending() {
        " Query (waiting for answer) "
    } else {
        " Query (Enter to submit) "
    };
    let cursor = app.form.cursor;
    render_line_input(
        frame,
        query_area,
        &app.form.input,
        cursor,
        submit_hint,
        border_color(app, Focus::Query),
        app.focus == Focus::Query && app.input_mode == InputMode::Editing,
    );

    render_mode_row(app, frame, mode_area);

    if app.attachments_enabled {
        let cursor = app.attachment_cursor;
        render_line_input(
            frame,
            attachment_area,
            &app.attachment_input,
            cursor,
            " Attach file (optional path) ",
            border_color(app, Focus::Attachment),
            app.focus == Focus::Attachment && app.input_mode == InputMode::Editing,
        );
    }

    render_answer(app, frame, answer_area);
}

/// Single-line input with horizontal scrolling that keeps the cursor visible.
fn render_line_input(
    frame: &mut Frame,
    area: Rect,
    text: &str,
    cursor_pos: usize,
    title: &str,
    border: Color,
    show_cursor: bool,
) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border))
        .title(title.to_string());

    let inner_width = area.width.saturating_sub(2) as usize;
    let scroll_offset = if inner_width == 0 {
        0
    } else if cursor_pos >= inner_width {
        cursor_pos - inner_width + 1
    } else {
        0
    };

    let visible_text: String = text.chars().skip(scroll_offset).take(inner_width).collect();

    let input = Paragraph::new(visible_text)
        .style(Style::default().fg(Color::Cyan))
        .block(block);
    frame.render_widget(input, area);

    if show_cursor {
        let cursor_x = (cursor_pos - scroll_offset) as u16;
        frame.set_cursor_position((area.x + cursor_x + 1, area.y + 1));
    }
}

fn render_mode_row(app: &App, frame: &mut Frame, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color(app, Focus::Mode)))
        .title(" Mode ");

    let mut spans: Vec<Span> = Vec::new();
    for mode in QueryMode::all() {
        let label = format!(" {} ", mode.as_str());
        if mode == app.form.mode {
            spans.push(Span::styled(
                label,
                Style::default().bg(Color::Blue).fg(Color::White).add_modifier(Modifier::BOLD),
            ));
        } else {
            spans.push(Span::raw(label));
        }
        spans.push(Span::raw(" "));
    }
    spans.push(Span::styled(
        format!("- {}", app.form.mode.description()),
        Style::default().fg(Color::DarkGray),
    ));

    let row = Paragraph::new(Line::from(spans)).block(block);
    frame.render_widget(row, area);
}

fn render_answer(app: &mut App, frame: &mut Frame, area: Rect) {
    app.answer_area = Some(area);
    app.answer_height = area.height.saturating_sub(2);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color(app, Focus::Answer)))
        .title(" Answer ");

    let text = match app.form.status() {
        RequestState::Idle => Text::from(Span::styled(
            "Type a question and press Enter.",
            Style::default().fg(Color::DarkGray),
        )),
        RequestState::Pending => {
            // Animated ellipsis: cycles through ".", "..", "..."
            let dots = ".".repeat((app.animation_frame as usize) + 1);
            Text::from(Span::styled(
                format!("Thinking{}", dots),
                Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
            ))
        }
        RequestState::Succeeded => Text::from(
            app.form
                .display_text()
                .unwrap_or_default()
                .lines()
                .map(|l| Line::from(l.to_string()))
                .collect::<Vec<_>>(),
        ),
        RequestState::Failed => {
            let mut lines = vec![Line::from(Span::styled(
                app.form.display_text().unwrap_or_default().to_string(),
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            ))];
            if let Some(code) = app.form.state().error_code {
                lines.push(Line::from(Span::styled(
                    format!("({})", code),
                    Style::default().fg(Color::DarkGray),
                )));
            }
            Text::from(lines)
        }
    };

    let paragraph = Paragraph::new(text).wrap(Wrap { trim: false });

    // Rows after word wrapping, measured inside the borders
    let inner_width = area.width.saturating_sub(2);
    app.answer_lines = paragraph
        .line_count(inner_width)
        .try_into()
        .unwrap_or(u16::MAX);

    let paragraph = paragraph.block(block).scroll((app.answer_scroll, 0));
    frame.render_widget(paragraph, area);
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect) {
    let mode_style = match app.input_mode {
        InputMode::Normal => Style::default().bg(Color::Blue).fg(Color::White),
        InputMode::Editing => Style::default().bg(Color::Yellow).fg(Color::Black),
    };
    let mode_text = match app.input_mode {
        InputMode::Normal => " NORMAL ",
        InputMode::Editing => " EDIT ",
    };

    // Key style: dark background with bright text for visibility on both light/dark terminals
    let key_style = Style::default().bg(Color::DarkGray).fg(Color::White);
    let label_style = Style::default().bg(Color::Black).fg(Color::White);

    let mut hints = match (app.focus, app.input_mode) {
        (Focus::Query, InputMode::Editing) => vec![
            Span::styled(" Enter ", key_style),
            Span::styled(if app.form.is_pending() { " busy " } else { " submit " }, label_style),
            Span::styled(" Esc ", key_style),
            Span::styled(" stop typing ", label_style),
        ],
        (Focus::Attachment, InputMode::Editing) => vec![
            Span::styled(" Enter ", key_style),
            Span::styled(" done ", label_style),
            Span::styled(" C-u ", key_style),
            Span::styled(" clear ", label_style),
        ],
        (Focus::Mode, _) => vec![
            Span::styled(" h/l ", key_style),
            Span::styled(" mode ", label_style),
            Span::styled(" Enter ", key_style),
            Span::styled(" pick ", label_style),
        ],
        _ => vec![
            Span::styled(" j/k ", key_style),
            Span::styled(" scroll ", label_style),
            Span::styled(" i ", key_style),
            Span::styled(" edit ", label_style),
            Span::styled(" m ", key_style),
            Span::styled(" mode ", label_style),
            Span::styled(" r ", key_style),
            Span::styled(" health ", label_style),
            Span::styled(" q ", key_style),
            Span::styled(" quit ", label_style),
        ],
    };
    hints.extend(vec![
        Span::styled(" Tab ", key_style),
        Span::styled(" focus ", label_style),
    ]);

    let footer_content = Line::from(
        vec![
            Span::styled(mode_text, mode_style),
            Span::styled(" ", label_style),
        ]
        .into_iter()
        .chain(hints)
        .collect::<Vec<_>>(),
    );

    let footer = Paragraph::new(footer_content).style(Style::default().bg(Color::Black));
    frame.render_widget(footer, area);
}

fn render_mode_picker(app: &mut App, frame: &mut Frame, area: Rect) {
    let modes = QueryMode::all();

    // Calculate popup size and position (centered)
    let popup_width = 60.min(area.width.saturating_sub(4));
    let popup_height = (modes.len() as u16 + 2).min(area.height.saturating_sub(4));

    let popup_x = (area.width.saturating_sub(popup_width)) / 2;
    let popup_y = (area.height.saturating_sub(popup_height)) / 2;

    let popup_area = Rect::new(popup_x, popup_y, popup_width, popup_height);

    // Clear the area behind the popup
    frame.render_widget(Clear, popup_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(" Select Mode (Enter to select, Esc to cancel) ");

    let items: Vec<ListItem> = modes
        .iter()
        .map(|mode| {
            let is_current = *mode == app.form.mode;
            let prefix = if is_current { "* " } else { "  " };
            let style = if is_current {
                Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            ListItem::new(format!(
                "{}{:<7} {}",
                prefix,
                mode.display_name(),
                mode.description()
            ))
            .style(style)
        })
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(
            Style::default()
                .bg(Color::Blue)
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");

    frame.render_stateful_widget(list, popup_area, &mut app.mode_picker_state);
}
