//! Renders a demo's playback session: header, step cards, results, footer.

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Gauge, Paragraph, Wrap},
    Frame,
};

use super::keybindings::{footer_hint, SHORTCUTS};
use crate::demos::DemoDefinition;
use crate::format::{format_elapsed, format_percent, status_line};
use crate::playback::{PlaybackSession, Step, StepStatus};

/// Rows used by one step card, borders included
const STEP_CARD_HEIGHT: u16 = 4;

fn status_color(status: StepStatus) -> Color {
    match status {
        StepStatus::Pending => Color::DarkGray,
        StepStatus::Processing => Color::Yellow,
        StepStatus::Complete => Color::Green,
    }
}

/// Borrowed view over everything the player draws
pub struct PlayerView<'a> {
    pub demo: &'a DemoDefinition,
    pub session: &'a PlaybackSession,
    pub active: bool,
    pub show_help: bool,
}

impl PlayerView<'_> {
    pub fn render(&self, frame: &mut Frame) {
        let area = frame.area();
        let results_height = if self.session.is_complete() {
            self.demo.results.len() as u16 + 2
        } else {
            0
        };

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(4),
                Constraint::Min(0),
                Constraint::Length(results_height),
                Constraint::Length(1),
            ])
            .split(area);

        self.render_header(frame, chunks[0]);
        if self.active {
            self.render_steps(frame, chunks[1]);
        } else {
            let hidden = Paragraph::new("Demo hidden. Press space to show it.")
                .style(Style::default().fg(Color::DarkGray))
                .alignment(Alignment::Center);
            frame.render_widget(hidden, chunks[1]);
        }
        if results_height > 0 {
            self.render_results(frame, chunks[2]);
        }

        let footer = Paragraph::new(footer_hint()).style(Style::default().fg(Color::DarkGray));
        frame.render_widget(footer, chunks[3]);

        if self.show_help {
            self.render_help(frame, area);
        }
    }

    fn render_header(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .title(Span::styled(
                format!(" {} ", self.demo.name),
                Style::default().add_modifier(Modifier::BOLD),
            ))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(1), Constraint::Length(1)])
            .split(inner);

        let status = Line::from(vec![
            Span::raw(self.demo.description.clone()),
            Span::raw("  "),
            Span::styled(status_line(self.session), Style::default().fg(Color::Cyan)),
        ]);
        frame.render_widget(Paragraph::new(status), rows[0]);

        let overall = self.session.overall_percent();
        let gauge = Gauge::default()
            .gauge_style(Style::default().fg(Color::Cyan))
            .ratio(overall / 100.0)
            .label(format_percent(overall));
        frame.render_widget(gauge, rows[1]);
    }

    fn render_steps(&self, frame: &mut Frame, area: Rect) {
        let steps = self.session.steps();
        let mut constraints: Vec<Constraint> = steps
            .iter()
            .map(|_| Constraint::Length(STEP_CARD_HEIGHT))
            .collect();
        constraints.push(Constraint::Min(0));

        let cards = Layout::default()
            .direction(Direction::Vertical)
            .constraints(constraints)
            .split(area);

        for (step, card) in steps.iter().zip(cards.iter()) {
            render_step_card(frame, *card, step);
        }
    }

    fn render_results(&self, frame: &mut Frame, area: Rect) {
        let lines: Vec<Line> = self
            .demo
            .results
            .iter()
            .map(|metric| {
                Line::from(vec![
                    Span::styled(
                        format!("{}: ", metric.label),
                        Style::default().fg(Color::Gray),
                    ),
                    Span::styled(
                        metric.value.clone(),
                        Style::default()
                            .fg(Color::Green)
                            .add_modifier(Modifier::BOLD),
                    ),
                ])
            })
            .collect();

        let title = format!(
            " Results · {} ",
            format_elapsed(self.session.total_elapsed())
        );
        let results = Paragraph::new(lines).block(
            Block::default()
                .title(title)
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Green)),
        );
        frame.render_widget(results, area);
    }

    fn render_help(&self, frame: &mut Frame, area: Rect) {
        let popup = centered_rect(60, 50, area);
        frame.render_widget(Clear, popup);

        let mut lines = vec![
            Line::from(Span::styled(
                self.demo.name.clone(),
                Style::default().add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
        ];
        for shortcut in SHORTCUTS {
            lines.push(Line::from(vec![
                Span::styled(
                    format!("{:>7}  ", shortcut.label),
                    Style::default().fg(Color::Cyan),
                ),
                Span::raw(shortcut.description),
            ]));
        }

        let help = Paragraph::new(lines)
            .block(
                Block::default()
                    .title(" Help ")
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::Cyan)),
            )
            .wrap(Wrap { trim: true });
        frame.render_widget(help, popup);
    }
}

fn render_step_card(frame: &mut Frame, area: Rect, step: &Step) {
    let color = status_color(step.status);
    let block = Block::default()
        .title(Span::styled(
            format!(" {} {} ", step.status.glyph(), step.title),
            Style::default().fg(color),
        ))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(color));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if inner.height == 0 {
        return;
    }
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Length(1)])
        .split(inner);

    let gauge = Gauge::default()
        .gauge_style(Style::default().fg(color))
        .ratio(step.progress_percent / 100.0)
        .label(format_percent(step.progress_percent));
    frame.render_widget(gauge, rows[0]);

    let detail = match step.status {
        StepStatus::Pending => Span::styled("Waiting", Style::default().fg(Color::DarkGray)),
        StepStatus::Processing => Span::raw(step.description.clone()),
        StepStatus::Complete => match step.visible_impact() {
            Some(impact) => Span::styled(impact.to_string(), Style::default().fg(Color::Green)),
            None => Span::styled("Done", Style::default().fg(Color::Green)),
        },
    };
    frame.render_widget(Paragraph::new(Line::from(detail)), rows[1]);
}

/// Helper to create a centered rect
fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
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
        .split(popup_layout[1])[1]
}
