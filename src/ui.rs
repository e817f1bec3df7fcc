use itertools::Itertools;
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Cell, Gauge, Paragraph, Row, Table, Widget, Wrap},
};
use unicode_width::UnicodeWidthStr;

use crate::app::App;
use crate::board::Highlight;
use crate::clock::Clock;
use crate::stats::{StatisticsRecord, COLUMNS};

const HORIZONTAL_MARGIN: u16 = 5;
const VERTICAL_MARGIN: u16 = 1;
const RETRY_HINT: &str = "ESC / Space / Enter to retry";
const KEYS_HINT: &str = "(tab) skip / (esc) clear / (ctrl+r) retry / (ctrl+c) quit";

/// Rows needed to show `text` wrapped at `max_width` columns.
fn occupied_lines(text: &str, max_width: u16) -> u16 {
    let width = text.width();
    if width <= max_width as usize {
        1
    } else {
        (width as f64 / max_width as f64).ceil() as u16 + 1
    }
}

impl<C: Clock + Clone> Widget for &App<C> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let board = self.board();
        let session = self.session();

        // styles
        let bold_style = Style::default().add_modifier(Modifier::BOLD);
        let green_bold_style = Style::default().patch(bold_style).fg(Color::Green);
        let red_bold_style = Style::default().patch(bold_style).fg(Color::Red);
        let dim_bold_style = Style::default()
            .patch(bold_style)
            .add_modifier(Modifier::DIM);
        let italic_style = Style::default().add_modifier(Modifier::ITALIC);

        let max_chars_per_line = area.width.saturating_sub(HORIZONTAL_MARGIN * 2).max(1);
        let goal_text = &board.entry().sentence;
        let goal_lines = occupied_lines(goal_text, max_chars_per_line);
        let user_lines = occupied_lines(board.text(), max_chars_per_line);
        let alignment = if goal_lines == 1 {
            Alignment::Center
        } else {
            Alignment::Left
        };

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .horizontal_margin(HORIZONTAL_MARGIN)
            .vertical_margin(VERTICAL_MARGIN)
            .constraints([
                Constraint::Length(1), // header
                Constraint::Length(1),
                Constraint::Length(goal_lines),
                Constraint::Length(1), // reference
                Constraint::Length(1),
                Constraint::Length(user_lines),
                Constraint::Length(1), // progress
                Constraint::Length(1), // hint
                Constraint::Length(1),
                Constraint::Length(4), // statistics
                Constraint::Min(0),
            ])
            .split(area);

        let header = [
            "hardtype".to_string(),
            format!("#{}/{}", self.sentence_number(), self.corpus().len().max(1)),
            format!("since {}", session.started_at.format("%H:%M")),
        ]
        .iter()
        .join(" · ");
        Paragraph::new(Span::styled(header, italic_style))
            .alignment(Alignment::Center)
            .render(chunks[0], buf);

        // Goal words already typed are shown at full strength.
        let reached = board.marked_tokens().len();
        let goal_spans = board
            .goal()
            .iter()
            .enumerate()
            .map(|(idx, token)| {
                let style = if idx < reached {
                    bold_style
                } else {
                    dim_bold_style
                };
                Span::styled(token.content.clone(), style)
            })
            .collect::<Vec<Span>>();
        Paragraph::new(Line::from(goal_spans))
            .alignment(alignment)
            .wrap(Wrap { trim: true })
            .render(chunks[2], buf);

        let reference = &board.entry().reference;
        if !reference.is_empty() {
            Paragraph::new(Span::styled(format!("— {}", reference), italic_style))
                .alignment(Alignment::Right)
                .render(chunks[3], buf);
        }

        let mut user_spans = board
            .marked_tokens()
            .into_iter()
            .map(|marked| match marked.highlight {
                Highlight::Passed => Span::styled(marked.token.content, green_bold_style),
                Highlight::Typing => Span::styled(marked.token.content, bold_style),
                Highlight::Failed if marked.token.is_separator() => {
                    Span::styled("·", red_bold_style)
                }
                Highlight::Failed => Span::styled(marked.token.content, red_bold_style),
            })
            .collect::<Vec<Span>>();
        if board.is_typable() {
            user_spans.push(Span::styled(
                "_",
                dim_bold_style.add_modifier(Modifier::SLOW_BLINK),
            ));
        }
        Paragraph::new(Line::from(user_spans))
            .alignment(alignment)
            .wrap(Wrap { trim: false })
            .render(chunks[5], buf);

        let gauge_color = if board.is_locked() {
            Color::Red
        } else {
            Color::Green
        };
        Gauge::default()
            .gauge_style(Style::default().fg(gauge_color))
            .ratio(board.completion_ratio())
            .label(format!("{:.0}%", board.completion_ratio() * 100.0))
            .render(chunks[6], buf);

        let hint = if board.is_unlockable() {
            Span::styled(
                RETRY_HINT,
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            )
        } else if let Some(remaining) = board.lock_remaining() {
            Span::styled(
                format!("{} in {:.1}s", RETRY_HINT, remaining.as_secs_f64()),
                dim_bold_style,
            )
        } else {
            Span::styled(KEYS_HINT, italic_style)
        };
        Paragraph::new(hint)
            .alignment(Alignment::Center)
            .render(chunks[7], buf);

        statistics_table(session.records().map(|record| &**record), bold_style)
            .render(chunks[9], buf);
    }
}

fn statistics_table<'a>(records: [&StatisticsRecord; 3], header_style: Style) -> Table<'a> {
    let header = Row::new(
        std::iter::once(Cell::from(""))
            .chain(COLUMNS.iter().map(|column| Cell::from(column.label))),
    )
    .style(header_style);

    let rows = records
        .iter()
        .map(|record| {
            Row::new(
                std::iter::once(Cell::from(record.label.clone()))
                    .chain(COLUMNS.iter().map(|column| Cell::from(column.format(record)))),
            )
        })
        .collect::<Vec<Row>>();

    let widths = std::iter::once(Constraint::Length(9))
        .chain(COLUMNS.iter().map(|_| Constraint::Min(6)))
        .collect::<Vec<Constraint>>();

    Table::new(rows, widths).header(header).column_spacing(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::BoardSettings;
    use crate::clock::ManualClock;
    use crate::corpus::{Corpus, SentenceEntry};
    use crate::keys::KeySets;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

    fn create_test_app(sentence: &str, reference: &str) -> (App<ManualClock>, ManualClock) {
        let clock = ManualClock::new();
        let corpus = Corpus::from_entries(vec![SentenceEntry::new(sentence, reference)]);
        let app = App::new(
            corpus,
            BoardSettings::default(),
            KeySets::default(),
            clock.clone(),
        )
        .unwrap();
        (app, clock)
    }

    fn type_str(app: &mut App<ManualClock>, text: &str) {
        for c in text.chars() {
            app.on_key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE));
        }
    }

    fn render(app: &App<ManualClock>, width: u16, height: u16) -> String {
        let area = Rect::new(0, 0, width, height);
        let mut buffer = Buffer::empty(area);
        app.render(area, &mut buffer);
        buffer
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect::<String>()
    }

    #[test]
    fn test_renders_goal_reference_and_table() {
        let (app, _clock) = create_test_app("run fast", "track notes");
        let rendered = render(&app, 80, 24);

        assert!(rendered.contains("run fast"));
        assert!(rendered.contains("track notes"));
        assert!(rendered.contains("#1/1"));
        assert!(rendered.contains("Failures"));
        assert!(rendered.contains("Previous"));
        assert!(rendered.contains("Total"));
        assert!(rendered.contains(KEYS_HINT));
    }

    #[test]
    fn test_renders_user_text_while_typing() {
        let (mut app, _clock) = create_test_app("run fast", "");
        type_str(&mut app, "run f");
        let rendered = render(&app, 80, 24);
        assert!(rendered.contains("run f_"));
    }

    #[test]
    fn test_failed_attempt_shows_retry_hint() {
        let (mut app, clock) = create_test_app("run fast", "");
        type_str(&mut app, "rin ");

        let rendered = render(&app, 80, 24);
        assert!(rendered.contains(RETRY_HINT));
        assert!(rendered.contains("in 0.5s"));
        assert!(rendered.contains("rin "));
        assert!(!rendered.contains(KEYS_HINT));

        clock.advance_ms(200);
        app.on_tick();
        assert!(render(&app, 80, 24).contains("in 0.3s"));

        clock.advance_ms(300);
        app.on_tick();
        let rendered = render(&app, 80, 24);
        assert!(rendered.contains(RETRY_HINT));
        assert!(!rendered.contains("in 0."));
    }

    #[test]
    fn test_unlockable_hint_is_highlighted() {
        let (mut app, clock) = create_test_app("run fast", "");
        type_str(&mut app, "rin ");
        clock.advance_ms(500);
        app.on_tick();

        let area = Rect::new(0, 0, 80, 24);
        let mut buffer = Buffer::empty(area);
        (&app).render(area, &mut buffer);

        let yellow = buffer
            .content()
            .iter()
            .filter(|cell| cell.fg == Color::Yellow)
            .map(|cell| cell.symbol())
            .collect::<String>();
        assert_eq!(yellow, RETRY_HINT);
    }

    #[test]
    fn test_table_shows_previous_sentence() {
        let (mut app, clock) = create_test_app("go", "");
        app.on_key(KeyEvent::new(KeyCode::Char('g'), KeyModifiers::NONE));
        clock.advance_ms(1_000);
        type_str(&mut app, "o ");

        let rendered = render(&app, 100, 24);
        assert!(rendered.contains("180.0"));
        assert!(rendered.contains("1.000"));
    }

    #[test]
    fn test_long_sentence_and_small_area() {
        let long = "the quick brown fox jumps over the lazy dog ".repeat(4);
        let (app, _clock) = create_test_app(long.trim(), "");
        render(&app, 30, 12);
        render(&app, 5, 3);
    }

    #[test]
    fn test_occupied_lines() {
        assert_eq!(occupied_lines("short", 20), 1);
        assert_eq!(occupied_lines(&"x".repeat(45), 20), 4);
        assert_eq!(occupied_lines("", 1), 1);
    }
}
