use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Gauge, Paragraph, Widget, Wrap},
};

use crate::score::{INCORRECT_PENALTY, TARGET_SCORE, TIMEOUT_PENALTY};
use crate::session::{Phase, Session, Stage};

const HORIZONTAL_MARGIN: u16 = 4;

/// Single-screen view over the session. The core never imports this module;
/// the binary hands it a borrowed session plus the answer buffer each draw.
pub struct TrainerView<'a> {
    pub session: &'a Session,
    pub input: &'a str,
}

fn stage_title(table: u8, stage: Stage) -> String {
    format!(
        "Table of {} (Stage {}: {})",
        table,
        stage.as_number(),
        stage
    )
}

impl Widget for TrainerView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        match self.session.phase {
            Phase::Idle => self.render_idle(area, buf),
            Phase::MasteryActive | Phase::MarathonActive => self.render_active(area, buf),
            Phase::MasteryComplete => self.render_mastery_complete(area, buf),
            Phase::MarathonComplete => self.render_marathon_complete(area, buf),
            Phase::AllTablesComplete => self.render_all_complete(area, buf),
        }
    }
}

impl TrainerView<'_> {
    fn render_idle(&self, area: Rect, buf: &mut Buffer) {
        let state = &self.session.state;
        let chunks = centered_rows(area, &[2, 1, 1, 2]);

        title_paragraph(&stage_title(state.table, state.stage)).render(chunks[0], buf);
        Paragraph::new("Press s to start")
            .alignment(Alignment::Center)
            .render(chunks[1], buf);
        Paragraph::new(format!(
            "Time per question: {} s  (+/- to adjust)",
            state.time_limit
        ))
        .style(dim())
        .alignment(Alignment::Center)
        .render(chunks[2], buf);
        hints("(s)tart  (+/-) timer  (q)uit").render(chunks[3], buf);
    }

    fn render_active(&self, area: Rect, buf: &mut Buffer) {
        let session = self.session;
        let state = &session.state;
        let chunks = centered_rows(area, &[1, 2, 2, 1, 1, 1, 2]);

        title_paragraph(&stage_title(state.table, state.stage)).render(chunks[0], buf);

        match state.stage {
            Stage::Mastery => {
                let (mastered, total) = session.mastery_progress();
                let mut spans: Vec<Span> = Vec::with_capacity(total + 1);
                for i in 0..total {
                    if i < mastered {
                        spans.push(Span::styled("★", Style::default().fg(Color::Yellow)));
                    } else {
                        spans.push(Span::styled("☆", dim()));
                    }
                }
                Paragraph::new(Line::from(spans))
                    .alignment(Alignment::Center)
                    .render(chunks[1], buf);
                Paragraph::new(format!("Learning progress: {mastered}/{total}"))
                    .style(dim())
                    .alignment(Alignment::Center)
                    .render(chunks[2], buf);
            }
            Stage::Marathon => {
                let ratio = f64::from(state.score.min(TARGET_SCORE)) / f64::from(TARGET_SCORE);
                Gauge::default()
                    .gauge_style(Style::default().fg(Color::Green))
                    .ratio(ratio)
                    .label(format!("{} / {}", state.score, TARGET_SCORE))
                    .render(inset(chunks[1], area.width / 4), buf);
                Paragraph::new(format!("Scored {} of {}", state.score, TARGET_SCORE))
                    .style(bold())
                    .alignment(Alignment::Center)
                    .render(chunks[2], buf);
            }
        }

        if let Some(fact) = session.current {
            Paragraph::new(Span::styled(fact.to_string(), bold()))
                .alignment(Alignment::Center)
                .render(chunks[3], buf);
        }

        Paragraph::new(format!("Your answer: {}_", self.input))
            .alignment(Alignment::Center)
            .render(chunks[4], buf);

        // Feedback replaces the countdown for the one-second pause between
        // questions, mirroring the timer/feedback swap of the original screen.
        let status = match &session.feedback {
            Some(feedback) => {
                let style = if feedback.is_positive() {
                    Style::default().patch(bold()).fg(Color::Green)
                } else {
                    Style::default().patch(bold()).fg(Color::Red)
                };
                Span::styled(feedback.message(), style)
            }
            None => Span::styled(format!("Time: {}", state.remaining_time), dim()),
        };
        Paragraph::new(status)
            .alignment(Alignment::Center)
            .render(chunks[5], buf);

        let hint_line = match &session.notice {
            Some(notice) => Paragraph::new(Span::styled(
                notice.clone(),
                Style::default().fg(Color::Magenta),
            ))
            .alignment(Alignment::Center),
            None => hints("(enter) check  (0-9) digits  (backspace) erase  (c)lear  (esc) stop"),
        };
        hint_line.render(chunks[6], buf);
    }

    fn render_mastery_complete(&self, area: Rect, buf: &mut Buffer) {
        let state = &self.session.state;
        let message = format!(
            "Well done, you have learned table {}!\n\
             Next up: the MARATHON.\n\n\
             Score {} points to unlock the next table.\n\
             Correct answer: +1   Wrong answer: -{}   Out of time: -{}\n\n\
             Press enter to start the marathon",
            state.table, TARGET_SCORE, INCORRECT_PENALTY, TIMEOUT_PENALTY
        );
        notice_screen("Stage complete!", &message, area, buf);
    }

    fn render_marathon_complete(&self, area: Rect, buf: &mut Buffer) {
        let state = &self.session.state;
        // The table has already advanced by the time this screen shows.
        let message = format!(
            "You finished table {}!\n\
             Moving on to table {}.\n\n\
             Press enter to continue",
            state.table - 1,
            state.table
        );
        notice_screen("Excellent!", &message, area, buf);
    }

    fn render_all_complete(&self, area: Rect, buf: &mut Buffer) {
        let message = format!(
            "You have learned every times-table from 2 to 9!\n\
             Final marathon score: {}.\n\n\
             Press enter to start over from table 2",
            self.session.state.score
        );
        notice_screen("Congratulations!", &message, area, buf);
    }
}

fn notice_screen(title: &str, message: &str, area: Rect, buf: &mut Buffer) {
    let chunks = centered_rows(area, &[2, 8]);
    title_paragraph(title).render(chunks[0], buf);
    Paragraph::new(message.to_string())
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .render(chunks[1], buf);
}

fn centered_rows(area: Rect, heights: &[u16]) -> Vec<Rect> {
    let used: u16 = heights.iter().sum();
    let top = area.height.saturating_sub(used) / 2;
    let mut constraints = vec![Constraint::Length(top)];
    constraints.extend(heights.iter().map(|&h| Constraint::Length(h)));
    constraints.push(Constraint::Min(0));
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .constraints(constraints)
        .split(area);
    rows[1..rows.len() - 1].to_vec()
}

fn inset(area: Rect, margin: u16) -> Rect {
    let margin = margin.min(area.width / 2);
    Rect {
        x: area.x + margin,
        width: area.width.saturating_sub(margin * 2),
        ..area
    }
}

fn title_paragraph(text: &str) -> Paragraph<'static> {
    Paragraph::new(Span::styled(
        text.to_string(),
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
    ))
    .alignment(Alignment::Center)
}

fn hints(text: &str) -> Paragraph<'static> {
    Paragraph::new(Span::styled(text.to_string(), italic_dim())).alignment(Alignment::Center)
}

fn bold() -> Style {
    Style::default().add_modifier(Modifier::BOLD)
}

fn dim() -> Style {
    Style::default().add_modifier(Modifier::DIM)
}

fn italic_dim() -> Style {
    Style::default().add_modifier(Modifier::ITALIC | Modifier::DIM)
}
