use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};
use crate::app::{App, InputMode, ModalField};
use crate::client::JokeAction;
use crate::page::markup_text;

const SPINNER: [&str; 4] = ["|", "/", "-", "\\"];

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
    render_panels(app, frame, body_area);
    render_footer(app, frame, footer_area);

    if app.is_modal_open() {
        render_custom_modal(app, frame, area);
    }
}

fn render_header(app: &App, frame: &mut Frame, area: Rect) {
    let shown = if app.jokes_shown > 0 {
        format!(" [{} told]", app.jokes_shown)
    } else {
        String::new()
    };

    let title = Line::from(vec![
        Span::styled(" Jokers ", Style::default().fg(Color::Cyan).bold()),
        Span::styled(shown, Style::default().fg(Color::DarkGray)),
        Span::raw(" "),
        Span::styled(
            app.widget.client().base_url().to_string(),
            Style::default().fg(Color::Gray),
        ),
        Span::raw(" "),
        Span::styled(
            format!("v{}", env!("CARGO_PKG_VERSION")),
            Style::default().fg(Color::DarkGray),
        ),
    ]);

    let header = Paragraph::new(title).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(header, area);
}

fn render_panels(app: &mut App, frame: &mut Frame, area: Rect) {
    let areas: [Rect; 3] = Layout::vertical([
        Constraint::Ratio(1, 3),
        Constraint::Ratio(1, 3),
        Constraint::Ratio(1, 3),
    ])
    .areas(area);

    for (i, (action, panel_area)) in JokeAction::ALL.into_iter().zip(areas).enumerate() {
        app.panel_areas[i] = Some(panel_area);

        let key = match action {
            JokeAction::Random => "r",
            JokeAction::Personal => "p",
            JokeAction::Custom => "c",
        };

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Blue))
            .title(format!(" {} joke ", action.display_name()))
            .title_bottom(Line::from(format!(" {key} ")).right_aligned());

        let lines: Vec<Line> = app
            .document
            .fragments()
            .get(i)
            .map(|f| fragment_lines(&f.markup))
            .unwrap_or_default()
            .into_iter()
            .map(Line::from)
            .collect();

        let paragraph = Paragraph::new(lines)
            .block(block)
            .wrap(Wrap { trim: true });

        frame.render_widget(paragraph, panel_area);
    }
}

fn fragment_lines(markup: &str) -> Vec<String> {
    markup_text(markup).unwrap_or_else(|e| {
        tracing::warn!(error = %e, "could not render joke markup");
        vec![markup.to_string()]
    })
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect) {
    let (mode_text, mode_style) = match app.input_mode {
        InputMode::Normal => (" JOKES ", Style::default().bg(Color::Blue).fg(Color::White)),
        InputMode::Editing => (" NAME ", Style::default().bg(Color::Yellow).fg(Color::Black)),
    };

    let hints = match app.input_mode {
        InputMode::Normal => " r random  p personal  c custom  q quit ",
        InputMode::Editing => " Tab switch field  Enter/Esc close and send ",
    };

    let mut spans = vec![
        Span::styled(mode_text, mode_style.add_modifier(Modifier::BOLD)),
        Span::styled(hints, Style::default().fg(Color::DarkGray)),
    ];

    if app.in_flight > 0 {
        spans.push(Span::styled(
            format!(
                " {} {} in flight ",
                SPINNER[app.animation_frame % SPINNER.len()],
                app.in_flight
            ),
            Style::default().fg(Color::Yellow),
        ));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_custom_modal(app: &App, frame: &mut Frame, area: Rect) {
    // Calculate popup size and position (centered)
    let popup_width = 50.min(area.width.saturating_sub(4));
    let popup_height = 8;

    let popup_x = (area.width.saturating_sub(popup_width)) / 2;
    let popup_y = (area.height.saturating_sub(popup_height)) / 2;

    let popup_area = Rect::new(popup_x, popup_y, popup_width, popup_height.min(area.height));

    // Clear the area behind the popup
    frame.render_widget(Clear, popup_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow))
        .title(" Custom joke ");

    let inner = block.inner(popup_area);
    frame.render_widget(block, popup_area);

    // Only the border fits
    if inner.height == 0 || inner.width == 0 {
        return;
    }

    let instructions = Paragraph::new("Who is the joke about? Close to send.")
        .style(Style::default().fg(Color::DarkGray));
    let instructions_area = Rect::new(inner.x, inner.y, inner.width, 1).intersection(inner);
    frame.render_widget(instructions, instructions_area);

    let fields = [
        (ModalField::First, "First", inner.y + 2),
        (ModalField::Last, "Last ", inner.y + 4),
    ];

    for (field, label, y) in fields {
        if y >= inner.y + inner.height {
            continue;
        }
        let value = app.document.input_value(field.input_id()).unwrap_or_default();
        let focused = app.modal_field == field;
        let value_style = if focused {
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::White)
        };

        let line = Line::from(vec![
            Span::styled(format!("{label}: "), Style::default().fg(Color::DarkGray)),
            Span::styled(value.to_string(), value_style),
        ]);
        let field_area = Rect::new(inner.x, y, inner.width, 1).intersection(inner);
        frame.render_widget(Paragraph::new(line), field_area);

        if focused {
            let typed = label.len() + 2 + value.chars().count();
            let cursor_x = typed.min(inner.width.saturating_sub(1) as usize) as u16;
            frame.set_cursor_position((inner.x + cursor_x, y));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{JokeClient, Reply};
    use crate::widget::{Completion, JokeWidget};
    use ratatui::{backend::TestBackend, Terminal};
    use tokio::sync::mpsc;

    fn buffer_text(terminal: &Terminal<TestBackend>) -> String {
        let buffer = terminal.backend().buffer();
        buffer.content().iter().map(|c| c.symbol()).collect()
    }

    #[test]
    fn test_render_shows_replaced_joke() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut app = App::new(JokeWidget::new(JokeClient::new("http://localhost:3000"), tx));
        app.on_completion(Completion {
            action: JokeAction::Random,
            outcome: Ok(Reply {
                status: 200,
                body: r#"<div id="rJoke">Chuck &amp; the keyboard</div>"#.into(),
            }),
        });

        let mut terminal = Terminal::new(TestBackend::new(60, 20)).unwrap();
        terminal.draw(|f| render(&mut app, f)).unwrap();

        let text = buffer_text(&terminal);
        assert!(text.contains("Chuck & the keyboard"));
        assert!(text.contains("Personal joke"));
        assert!(app.panel_areas.iter().all(Option::is_some));
    }

    #[test]
    fn test_render_modal() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut app = App::new(JokeWidget::new(JokeClient::new("http://localhost:3000"), tx));
        app.open_custom_modal();
        app.modal_input_mut().unwrap().push_str("Ada");

        let mut terminal = Terminal::new(TestBackend::new(60, 20)).unwrap();
        terminal.draw(|f| render(&mut app, f)).unwrap();

        let text = buffer_text(&terminal);
        assert!(text.contains("Custom joke"));
        assert!(text.contains("First: Ada"));
    }

    #[test]
    fn test_render_modal_in_tiny_terminal() {
        for (width, height) in [(60, 1), (60, 2), (60, 3), (3, 20), (1, 1)] {
            let (tx, _rx) = mpsc::unbounded_channel();
            let mut app = App::new(JokeWidget::new(JokeClient::new("http://localhost:3000"), tx));
            app.open_custom_modal();
            app.modal_input_mut().unwrap().push_str("Ada");

            let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
            terminal.draw(|f| render(&mut app, f)).unwrap();
            assert!(app.is_modal_open());
        }
    }

    #[test]
    fn test_fragment_lines_keep_text_only() {
        assert_eq!(fragment_lines("<p>A & B</p><p>C</p>"), vec!["A & B", "C"]);
    }
}
