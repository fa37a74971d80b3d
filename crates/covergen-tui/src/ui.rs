use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};
use crate::app::{App, Focus, InputMode};

/// Parse a line of text and convert **bold** markdown to styled spans
fn parse_markdown_line(text: &str) -> Line<'static> {
    let mut spans: Vec<Span<'static>> = Vec::new();
    let mut rest = text;

    while let Some(start) = rest.find("**") {
        let after = &rest[start + 2..];
        let Some(end) = after.find("**") else {
            break;
        };
        if end == 0 {
            // "****" - nothing to embolden, keep literally
            spans.push(Span::raw(rest[..start + 4].to_string()));
            rest = &after[2..];
            continue;
        }
        if start > 0 {
            spans.push(Span::raw(rest[..start].to_string()));
        }
        spans.push(Span::styled(
            after[..end].to_string(),
            Style::default().add_modifier(Modifier::BOLD),
        ));
        rest = &after[end + 2..];
    }

    // No closing ** (or no markup at all): the rest is literal
    if !rest.is_empty() {
        spans.push(Span::raw(rest.to_string()));
    }

    Line::from(spans)
}

/// Wrap text to fit within a given width, returning multiple lines
/// Uses word boundaries for wrapping (doesn't break mid-word)
fn wrap_text_to_width(text: &str, width: usize) -> Vec<String> {
    if width == 0 {
        return vec![text.to_string()];
    }

    let mut lines = Vec::new();
    let mut current_line = String::new();
    let mut current_len = 0;

    for word in text.split_whitespace() {
        let word_len = word.chars().count();

        if current_len == 0 {
            current_line = word.to_string();
            current_len = word_len;
        } else if current_len + 1 + word_len <= width {
            current_line.push(' ');
            current_line.push_str(word);
            current_len += 1 + word_len;
        } else {
            lines.push(current_line);
            current_line = word.to_string();
            current_len = word_len;
        }
    }

    if !current_line.is_empty() {
        lines.push(current_line);
    }

    // Blank source lines stay as paragraph breaks
    if lines.is_empty() {
        lines.push(String::new());
    }

    lines
}

/// Wrap every line of the letter, keeping its paragraph breaks
fn wrap_letter(text: &str, width: usize) -> Vec<String> {
    text.lines()
        .flat_map(|line| wrap_text_to_width(line, width))
        .collect()
}

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

    let [form_area, letter_area] = Layout::horizontal([
        Constraint::Percentage(50),
        Constraint::Percentage(50),
    ])
    .areas(body_area);

    render_form(app, frame, form_area);
    render_letter(app, frame, letter_area);

    render_footer(app, frame, footer_area);

    // Render popups (in order of priority)
    if app.show_api_key_input {
        render_api_key_input(app, frame, area);
    } else if app.show_help {
        render_help(frame, area);
    }
}

fn render_header(app: &App, frame: &mut Frame, area: Rect) {
    let key_indicator = if app.session.client().has_api_key() {
        String::new()
    } else {
        " [no API key - press K]".to_string()
    };

    let title = Line::from(vec![
        Span::styled(" CoverGenius ", Style::default().fg(Color::Cyan).bold()),
        Span::styled("Create cover letters with AI", Style::default().fg(Color::Gray)),
        Span::styled(key_indicator, Style::default().fg(Color::Yellow)),
        Span::raw(" "),
        Span::styled(
            format!("v{}", env!("CARGO_PKG_VERSION")),
            Style::default().fg(Color::DarkGray),
        ),
    ]);

    let header = Paragraph::new(title).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(header, area);
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect) {
    let (mode_text, mode_style) = match app.input_mode {
        InputMode::Normal => (" NORMAL ", Style::default().bg(Color::Blue).fg(Color::White)),
        InputMode::Editing => (" EDIT ", Style::default().bg(Color::Yellow).fg(Color::Black)),
    };

    // Key style: dark background with bright text for visibility on both light/dark terminals
    let key_style = Style::default().bg(Color::DarkGray).fg(Color::White);
    let label_style = Style::default().bg(Color::Black).fg(Color::White);

    let hints = if app.show_api_key_input {
        vec![
            Span::styled(" Enter ", key_style),
            Span::styled(" save ", label_style),
            Span::styled(" Esc ", key_style),
            Span::styled(" cancel ", label_style),
        ]
    } else {
        match app.input_mode {
            InputMode::Editing => {
                let mut hints = vec![
                    Span::styled(" Tab ", key_style),
                    Span::styled(" next field ", label_style),
                ];
                if app.focus.is_multiline() {
                    hints.extend(vec![
                        Span::styled(" Enter ", key_style),
                        Span::styled(" new line ", label_style),
                    ]);
                }
                hints.extend(vec![
                    Span::styled(" Ctrl+G ", key_style),
                    Span::styled(" generate ", label_style),
                    Span::styled(" Esc ", key_style),
                    Span::styled(" stop typing ", label_style),
                ]);
                hints
            }
            InputMode::Normal => {
                let mut hints = vec![
                    Span::styled(" Tab ", key_style),
                    Span::styled(" focus ", label_style),
                ];
                if app.focus == Focus::Letter {
                    hints.extend(vec![
                        Span::styled(" j/k ", key_style),
                        Span::styled(" scroll ", label_style),
                    ]);
                } else {
                    hints.extend(vec![
                        Span::styled(" Enter ", key_style),
                        Span::styled(" edit ", label_style),
                    ]);
                }
                hints.extend(vec![
                    Span::styled(" g ", key_style),
                    Span::styled(" generate ", label_style),
                ]);
                if !app.session.result().is_empty() {
                    hints.extend(vec![
                        Span::styled(" c ", key_style),
                        Span::styled(" copy ", label_style),
                    ]);
                }
                hints.extend(vec![
                    Span::styled(" K ", key_style),
                    Span::styled(" API key ", label_style),
                    Span::styled(" ? ", key_style),
                    Span::styled(" help ", label_style),
                    Span::styled(" q ", key_style),
                    Span::styled(" quit ", label_style),
                ]);
                hints
            }
        }
    };

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

fn render_form(app: &App, frame: &mut Frame, area: Rect) {
    let error_height = if app.session.error_message().is_empty() { 0 } else { 4 };

    let [name_area, skills_area, experience_area, job_area, error_area, button_area] =
        Layout::vertical([
            Constraint::Length(3),
            Constraint::Length(5),
            Constraint::Length(6),
            Constraint::Min(5),
            Constraint::Length(error_height),
            Constraint::Length(3),
        ])
        .areas(area);

    render_input(app, frame, name_area, Focus::Name);
    render_input(app, frame, skills_area, Focus::Skills);
    render_input(app, frame, experience_area, Focus::Experience);
    render_input(app, frame, job_area, Focus::JobDescription);

    if error_height > 0 {
        render_error(app, frame, error_area);
    }

    render_generate_button(app, frame, button_area);
}

fn render_input(app: &App, frame: &mut Frame, area: Rect, field: Focus) {
    let focused = app.focus == field;
    let editing = focused && app.input_mode == InputMode::Editing;

    let border_color = if editing {
        Color::Yellow
    } else if focused {
        Color::Cyan
    } else {
        Color::DarkGray
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(format!(" {} ", field.label()));

    let inner = block.inner(area);
    let text = app.text_for(field);

    if text.is_empty() && !editing {
        let placeholder = Paragraph::new(field.placeholder())
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        frame.render_widget(placeholder, area);
        return;
    }

    // Scroll so the cursor line/column stays inside the box
    let (line, col) = if focused { app.cursor_line_col() } else { (0, 0) };
    let visible_rows = (inner.height as usize).max(1);
    let visible_cols = (inner.width as usize).max(1);
    let row_offset = line.saturating_sub(visible_rows - 1);
    let col_offset = col.saturating_sub(visible_cols - 1);

    let input = Paragraph::new(text)
        .style(Style::default().fg(Color::Cyan))
        .block(block)
        .scroll((row_offset as u16, col_offset as u16));

    frame.render_widget(input, area);

    if editing && !app.show_api_key_input && !app.show_help {
        frame.set_cursor_position((
            inner.x + (col - col_offset) as u16,
            inner.y + (line - row_offset) as u16,
        ));
    }
}

fn render_error(app: &App, frame: &mut Frame, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Red))
        .title(Span::styled(" Error ", Style::default().fg(Color::Red).bold()));

    let alert = Paragraph::new(app.session.error_message())
        .style(Style::default().fg(Color::Red))
        .wrap(Wrap { trim: true })
        .block(block);

    frame.render_widget(alert, area);
}

fn render_generate_button(app: &App, frame: &mut Frame, area: Rect) {
    let (label, style) = if app.session.is_loading() {
        // Animated ellipsis: cycles through ".", "..", "..."
        let dots = ".".repeat((app.animation_frame as usize) + 1);
        (
            format!("Generating{:<3}", dots),
            Style::default().fg(Color::Yellow).add_modifier(Modifier::ITALIC),
        )
    } else if app.session.can_submit() {
        (
            "✦ Generate Cover Letter (Ctrl+G)".to_string(),
            Style::default().fg(Color::White).bg(Color::Blue).add_modifier(Modifier::BOLD),
        )
    } else {
        (
            "✦ Generate Cover Letter".to_string(),
            Style::default().fg(Color::DarkGray),
        )
    };

    let button = Paragraph::new(label)
        .alignment(Alignment::Center)
        .style(style)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray)),
        );

    frame.render_widget(button, area);
}

fn render_letter(app: &mut App, frame: &mut Frame, area: Rect) {
    let focused = app.focus == Focus::Letter;
    let border_color = if focused { Color::Cyan } else { Color::DarkGray };

    let mut block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(format!(" {} ", Focus::Letter.label()));

    if !app.session.result().is_empty() {
        let copy_status = if app.session.is_copied() {
            Span::styled(" ✓ Copied! ", Style::default().fg(Color::Green).bold())
        } else {
            Span::styled(" c Copy to Clipboard ", Style::default().fg(Color::Gray))
        };
        block = block.title_bottom(Line::from(copy_status).right_aligned());
    }

    let inner = block.inner(area);

    // Store area and size for mouse hit-testing and scroll math
    app.letter_area = Some(area);
    app.letter_height = inner.height;

    let text = if app.session.result().is_empty() {
        app.total_letter_lines = 0;
        app.letter_scroll = 0;
        let message = if app.session.is_loading() {
            "Generating your cover letter..."
        } else {
            Focus::Letter.placeholder()
        };
        Text::from(Span::styled(
            message,
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
        ))
    } else {
        let lines = wrap_letter(app.session.result(), inner.width as usize);
        app.total_letter_lines = lines.len().min(u16::MAX as usize) as u16;
        // Keep scroll valid after a resize or a shorter letter
        app.letter_scroll = app
            .letter_scroll
            .min(app.total_letter_lines.saturating_sub(app.letter_height));
        Text::from(
            lines
                .iter()
                .map(|line| parse_markdown_line(line))
                .collect::<Vec<_>>(),
        )
    };

    let letter = Paragraph::new(text)
        .block(block)
        .scroll((app.letter_scroll, 0));

    frame.render_widget(letter, area);
}

/// A rectangle of the given size centered in `area`
fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width.saturating_sub(4));
    let height = height.min(area.height);
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width, height)
}

fn render_help(frame: &mut Frame, area: Rect) {
    let popup_area = centered_rect(70, 20, area);

    // Clear the area behind the popup
    frame.render_widget(Clear, popup_area);

    let heading = Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD);
    let key = Style::default().fg(Color::Yellow);
    let dim = Style::default().fg(Color::DarkGray);

    let lines = vec![
        Line::from(Span::styled("1. Paste Job Description", heading)),
        Line::from("   Paste the job description you're applying for."),
        Line::from(Span::styled("2. AI Analysis", heading)),
        Line::from("   The AI matches your skills and experience to the requirements."),
        Line::from(Span::styled("3. Get Your Letter", heading)),
        Line::from("   Copy the tailored cover letter and make it your own."),
        Line::default(),
        Line::from(vec![
            Span::styled("Tab/Shift+Tab", key),
            Span::raw(" move between fields   "),
            Span::styled("Enter", key),
            Span::raw(" edit field"),
        ]),
        Line::from(vec![
            Span::styled("Ctrl+G", key),
            Span::raw(" generate   "),
            Span::styled("c", key),
            Span::raw(" copy letter   "),
            Span::styled("K", key),
            Span::raw(" set API key   "),
            Span::styled("q", key),
            Span::raw(" quit"),
        ]),
        Line::default(),
        Line::from(Span::styled(
            "AI-generated cover letters are meant as a starting point. \
             Review and personalize the content before sending.",
            dim,
        )),
        Line::default(),
        Line::from(Span::styled("Press any key to close", dim)),
    ];

    let help = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan))
                .title(" How It Works "),
        );

    frame.render_widget(help, popup_area);
}

/// Show only the last four characters of an API key
fn mask_api_key(key: &str) -> String {
    let char_count = key.chars().count();
    if char_count <= 4 {
        return "*".repeat(char_count);
    }
    let masked_len = char_count - 4;
    let last_four: String = key.chars().skip(masked_len).collect();
    format!("{}...{}", "*".repeat(masked_len.min(20)), last_four)
}

fn render_api_key_input(app: &App, frame: &mut Frame, area: Rect) {
    let popup_area = centered_rect(60, 7, area);

    // Clear the area behind the popup
    frame.render_widget(Clear, popup_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow))
        .title(" Enter Gemini API Key ");

    let inner = block.inner(popup_area);
    frame.render_widget(block, popup_area);

    // Short terminals squeeze these rows down to nothing rather than past the popup
    let [instructions_area, _, input_area, _, status_area] =
        Layout::vertical([Constraint::Length(1); 5]).areas(inner);

    let instructions = Paragraph::new("Paste your API key below. Press Enter to save, Esc to cancel.")
        .style(Style::default().fg(Color::DarkGray));
    frame.render_widget(instructions, instructions_area);

    let input = Paragraph::new(mask_api_key(&app.api_key_input))
        .style(Style::default().fg(Color::Cyan));
    frame.render_widget(input, input_area);

    if !input_area.is_empty() {
        // The mask isn't the same length as the key, so park the cursor at its end
        let cursor_x = mask_api_key(&app.api_key_input)
            .chars()
            .count()
            .min(input_area.width.saturating_sub(1) as usize) as u16;
        frame.set_cursor_position((input_area.x + cursor_x, input_area.y));
    }

    let status = Paragraph::new(format!("{} characters", app.api_key_input.chars().count()))
        .style(Style::default().fg(Color::DarkGray));
    frame.render_widget(status, status_area);
}
