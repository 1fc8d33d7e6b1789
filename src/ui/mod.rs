use crate::app_state::{survey_layout, App, InputMode, SurveyItem, SurveyLine};
use crate::kiosk::{Rating, Screen};
use rand::Rng;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph, Wrap},
    Frame,
};

const SPARKLES: &[&str] = &["✦", "✧", "·", "*"];

pub fn draw(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // 标题栏
            Constraint::Min(0),    // 当前屏幕
            Constraint::Length(3), // 操作提示
        ])
        .split(f.size());

    render_top_bar(f, chunks[0]);

    match app.controller.screen() {
        Screen::Start => render_start(f, chunks[1], app),
        Screen::Video => render_video(f, chunks[1], app),
        Screen::Survey => render_survey(f, chunks[1], app),
        Screen::ThankYou => render_thank_you(f, chunks[1], app),
    }

    render_hints(f, chunks[2], app);

    if app.input_mode == InputMode::AdminPrompt {
        render_admin_popup(f, f.size(), app);
    }
}

fn render_top_bar(f: &mut Frame, area: Rect) {
    let title = Line::from(vec![
        Span::styled(
            " ALTAAQA ",
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw("×"),
        Span::styled(
            " Energy Expo ",
            Style::default()
                .fg(Color::Green)
                .add_modifier(Modifier::BOLD),
        ),
    ]);
    let paragraph = Paragraph::new(title)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .style(Style::default().fg(Color::Cyan)),
        )
        .alignment(Alignment::Center);
    f.render_widget(paragraph, area);
}

fn render_start(f: &mut Frame, area: Rect, app: &App) {
    let block = Block::default().borders(Borders::ALL);
    let inner = block.inner(area);
    f.render_widget(block, area);

    // 装饰动画：开始后立即关闭
    if app.controller.animations_enabled() && inner.width > 2 && inner.height > 2 {
        let mut rng = rand::thread_rng();
        let buf = f.buffer_mut();
        for _ in 0..(inner.width as usize * inner.height as usize / 40) {
            let x = inner.x + rng.gen_range(0..inner.width);
            let y = inner.y + rng.gen_range(0..inner.height);
            let glyph = SPARKLES[rng.gen_range(0..SPARKLES.len())];
            buf.get_mut(x, y)
                .set_symbol(glyph)
                .set_style(Style::default().fg(Color::DarkGray));
        }
    }

    let prompt_style = if app.controller.animations_enabled() {
        Style::default()
            .fg(Color::Black)
            .bg(Color::Green)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            "Powering Progress Together",
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            "Share your energy needs in under two minutes",
            Style::default().fg(Color::Gray),
        )),
        Line::from(""),
        Line::from(Span::styled("  Begin Experience  ", prompt_style)),
    ];
    let height = lines.len() as u16;
    let text_area = Rect {
        x: inner.x,
        y: inner.y + inner.height.saturating_sub(height) / 2,
        width: inner.width,
        height: height.min(inner.height),
    };
    f.render_widget(Clear, text_area);
    f.render_widget(
        Paragraph::new(lines).alignment(Alignment::Center),
        text_area,
    );
}

fn render_video(f: &mut Frame, area: Rect, app: &App) {
    let lines = if app.controller.video_error() {
        vec![
            Line::from(Span::styled(
                "Video Unavailable",
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
            Line::from("Proceeding to survey..."),
        ]
    } else {
        vec![
            Line::from(Span::styled(
                "▶ Now playing",
                Style::default()
                    .fg(Color::Green)
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
            Line::from(Span::styled(
                "Press S to skip",
                Style::default().fg(Color::DarkGray),
            )),
        ]
    };
    let paragraph = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title("Video"))
        .alignment(Alignment::Center);
    f.render_widget(paragraph, area);
}

fn item_line(app: &App, item: SurveyItem, focused: bool) -> Line<'static> {
    let form = app.controller.form();
    let text = match item {
        SurveyItem::Multi { key, option } => {
            let mark = if form.multi(key).contains(option) { "[x]" } else { "[ ]" };
            format!("  {} {}", mark, option)
        }
        SurveyItem::Single { key, option } => {
            let mark = if form.single(key) == option { "(•)" } else { "( )" };
            format!("  {} {}", mark, option)
        }
        SurveyItem::Rating(factor) => {
            let value = form.rating(factor).map(|r| r.value()).unwrap_or(0);
            let stars: String = (Rating::MIN..=Rating::MAX)
                .map(|i| if i <= value { '★' } else { '☆' })
                .collect();
            let label = form.rating(factor).map(|r| r.label()).unwrap_or("not rated");
            format!("  {:<32} {} {}", factor.label(), stars, label)
        }
        SurveyItem::Text(key, label) => {
            let cursor = if focused { "_" } else { "" };
            format!("      {}: {}{}", label, form.single(key), cursor)
        }
        SurveyItem::Submit => {
            if app.controller.is_busy() {
                "  [ Processing... ]".to_string()
            } else {
                "  [ Submit Survey ]".to_string()
            }
        }
    };

    let style = if focused {
        Style::default()
            .fg(Color::Black)
            .bg(Color::Cyan)
            .add_modifier(Modifier::BOLD)
    } else if item == SurveyItem::Submit {
        Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::White)
    };
    Line::from(Span::styled(text, style))
}

fn render_survey(f: &mut Frame, area: Rect, app: &App) {
    let notice = app.controller.notice().map(|n| n.message());
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),
            Constraint::Length(if notice.is_some() { 3 } else { 0 }),
        ])
        .split(area);

    let mut lines = Vec::new();
    let mut cursor_line = 0usize;
    let mut item_index = 0usize;
    for entry in survey_layout(app.controller.form()) {
        match entry {
            SurveyLine::Header(title) => {
                lines.push(Line::from(""));
                lines.push(Line::from(Span::styled(
                    title,
                    Style::default()
                        .fg(Color::Cyan)
                        .add_modifier(Modifier::BOLD),
                )));
            }
            SurveyLine::Item(item) => {
                let focused = item_index == app.survey_cursor;
                if focused {
                    cursor_line = lines.len();
                }
                lines.push(item_line(app, item, focused));
                item_index += 1;
            }
        }
    }

    // 保持焦点行在可视区域中部
    let visible = chunks[0].height.saturating_sub(2) as usize;
    let scroll = cursor_line.saturating_sub(visible / 2) as u16;
    let paragraph = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title("Survey"))
        .scroll((scroll, 0));
    f.render_widget(paragraph, chunks[0]);

    if let Some(message) = notice {
        let warning = Paragraph::new(message)
            .style(Style::default().fg(Color::Red))
            .wrap(Wrap { trim: true })
            .block(Block::default().borders(Borders::ALL));
        f.render_widget(warning, chunks[1]);
    }
}

fn render_thank_you(f: &mut Frame, area: Rect, app: &App) {
    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            "Thank You!",
            Style::default()
                .fg(Color::Green)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from("Your response has been recorded. Our team will be in touch."),
        Line::from(""),
        Line::from(Span::styled(
            format!("Returning to start in {}s", app.controller.countdown()),
            Style::default().fg(Color::DarkGray),
        )),
    ];
    let paragraph = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL))
        .alignment(Alignment::Center);
    f.render_widget(paragraph, area);
}

/// 访客看到的提示用英文，管理员弹窗保留中文
fn hint_text(screen: Screen, mode: &InputMode) -> &'static str {
    match (screen, mode) {
        (_, InputMode::AdminPrompt) => "Enter 导出  Esc 关闭",
        (Screen::Start, _) => "Press Enter or Space to begin",
        (Screen::Video, _) => "Press S, Enter or Esc to skip the video",
        (Screen::Survey, _) => {
            "↑↓/Tab move  Space select  ←→/1-5 rate  0 clear  Enter on Submit to send"
        }
        (Screen::ThankYou, _) => "",
    }
}

fn render_hints(f: &mut Frame, area: Rect, app: &App) {
    let hint = hint_text(app.controller.screen(), &app.input_mode);
    let paragraph = Paragraph::new(Line::from(hint))
        .block(Block::default().borders(Borders::ALL))
        .style(Style::default().fg(Color::DarkGray));
    f.render_widget(paragraph, area);
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}

fn render_admin_popup(f: &mut Frame, area: Rect, app: &App) {
    let popup = centered_rect(70, 70, area);
    f.render_widget(Clear, popup);

    let block = Block::default()
        .borders(Borders::ALL)
        .title("管理员导出")
        .style(Style::default().fg(Color::Yellow));
    let inner = block.inner(popup);
    f.render_widget(block, popup);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(4), Constraint::Min(0)])
        .split(inner);

    let count = app
        .record_count
        .map(|n| n.to_string())
        .unwrap_or_else(|| "…".to_string());
    let masked: String = "•".repeat(app.admin_input.chars().count());
    let header = vec![
        Line::from(vec![
            Span::raw("已保存问卷: "),
            Span::styled(count, Style::default().fg(Color::Cyan)),
        ]),
        Line::from(vec![
            Span::styled("导出口令: ", Style::default().fg(Color::Green)),
            Span::raw(masked),
            Span::styled("_", Style::default().fg(Color::Yellow)),
        ]),
        Line::from(app.admin_status.clone().unwrap_or_default()),
    ];
    f.render_widget(Paragraph::new(header), chunks[0]);

    let log_items: Vec<ListItem> = app
        .log_messages
        .iter()
        .rev()
        .take(20)
        .map(|msg| {
            let style = if msg.starts_with("✓") {
                Style::default().fg(Color::Green)
            } else if msg.starts_with("✗") {
                Style::default().fg(Color::Red)
            } else if msg.starts_with("⚠") {
                Style::default().fg(Color::Yellow)
            } else {
                Style::default().fg(Color::White)
            };
            ListItem::new(msg.as_str()).style(style)
        })
        .collect();
    let log = List::new(log_items).block(
        Block::default()
            .borders(Borders::TOP)
            .title(format!("日志 (共 {} 条)", app.log_messages.len())),
    );
    f.render_widget(log, chunks[1]);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn has_cjk(s: &str) -> bool {
        s.chars().any(|c| ('\u{4e00}'..='\u{9fff}').contains(&c))
    }

    #[test]
    fn visitor_hints_are_english() {
        for screen in [Screen::Start, Screen::Video, Screen::Survey, Screen::ThankYou] {
            let hint = hint_text(screen, &InputMode::Normal);
            assert!(!has_cjk(hint), "{:?}: {}", screen, hint);
        }
        assert!(hint_text(Screen::Start, &InputMode::Normal).contains("begin"));
        assert!(hint_text(Screen::Video, &InputMode::Normal).contains("skip"));
    }

    #[test]
    fn admin_prompt_keeps_operator_hint() {
        assert!(has_cjk(hint_text(Screen::Start, &InputMode::AdminPrompt)));
    }
}
