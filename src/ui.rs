pub mod screen;

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Gauge, Paragraph, Tabs, Widget, Wrap},
};
use unicode_width::UnicodeWidthStr;
use webbrowser::Browser;

use crate::{App, AppState, TeacherTab};

const HORIZONTAL_MARGIN: u16 = 5;
const VERTICAL_MARGIN: u16 = 2;

const OPTION_KEYS: [char; 4] = ['1', '2', '3', '4'];

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        match self.state {
            AppState::Home => render_home(self, area, buf),
            AppState::Quiz => render_quiz(self, area, buf),
            AppState::Results => render_results(self, area, buf),
            AppState::Dashboard => render_dashboard(self, area, buf),
            AppState::Teacher => render_teacher(self, area, buf),
            AppState::NotFound => render_not_found(area, buf),
        }
    }
}

fn bold() -> Style {
    Style::default().add_modifier(Modifier::BOLD)
}

fn italic() -> Style {
    Style::default().add_modifier(Modifier::ITALIC)
}

fn dim() -> Style {
    Style::default().add_modifier(Modifier::DIM)
}

fn centered(text: &str, style: Style, area: Rect, buf: &mut Buffer) {
    Paragraph::new(Span::styled(text.to_owned(), style))
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .render(area, buf);
}

fn render_home(app: &App, area: Rect, buf: &mut Buffer) {
    let mut lines: Vec<Line> = vec![
        Line::from(Span::styled("GeoQuest", bold().fg(Color::Cyan))),
        Line::from(Span::styled(
            "Pick a theme and start your geography journey",
            italic(),
        )),
        Line::from(""),
    ];

    for (idx, theme) in app.home.themes.iter().enumerate() {
        let (title, count) = crate::bank::get_quiz(theme)
            .map(|q| (q.title, q.questions.len()))
            .unwrap_or_else(|| (theme.clone(), 0));
        let marker = if idx == app.home.cursor { "➤ " } else { "  " };
        let style = if idx == app.home.cursor {
            bold().fg(Color::Green)
        } else {
            Style::default()
        };
        lines.push(Line::from(Span::styled(
            format!("{marker}{title}  ({count} questions)"),
            style,
        )));
    }

    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "(↑/↓) choose / (enter) start / (d)ashboard / (t)eacher portal / (esc)ape",
        italic(),
    )));

    Paragraph::new(lines)
        .alignment(Alignment::Center)
        .render(inset(area), buf);
}

fn render_quiz(app: &App, area: Rect, buf: &mut Buffer) {
    let Some(session) = app.session.as_ref() else {
        return;
    };

    // Between the last advance and the results screen the session is already
    // complete; show the interstitial while the tick countdown runs.
    if session.is_complete() {
        centered(
            "Tallying your score...",
            bold().fg(Color::Yellow).add_modifier(Modifier::ITALIC),
            area,
            buf,
        );
        return;
    }
    let Some(question) = session.current_question() else {
        return;
    };

    let area = inset(area);
    let max_chars_per_line = area.width.max(1);
    let prompt_lines =
        ((question.prompt.width() as f64 / max_chars_per_line as f64).ceil() as u16).max(1);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            [
                Constraint::Length(1), // header
                Constraint::Length(1), // progress gauge
                Constraint::Length(1),
                Constraint::Length(prompt_lines),
                Constraint::Length(1),
                Constraint::Length(question.options.len() as u16),
                Constraint::Length(1),
                Constraint::Min(1), // explanation
                Constraint::Length(1), // legend
            ]
            .as_ref(),
        )
        .split(area);

    let header = Line::from(vec![
        Span::styled(session.quiz.title.clone(), bold()),
        Span::raw("   "),
        Span::styled(
            format!(
                "Question {} of {}",
                session.current_index + 1,
                session.quiz.questions.len()
            ),
            dim(),
        ),
        Span::raw("   "),
        Span::styled(format!("[{}]", question.difficulty.label()), dim()),
        Span::raw("   "),
        Span::styled(
            format!("Score: {}/{}", session.correct_count, session.current_index),
            dim(),
        ),
    ]);
    Paragraph::new(header).render(chunks[0], buf);

    let progress = session.progress_percent();
    Gauge::default()
        .gauge_style(Style::default().fg(Color::Magenta))
        .ratio(progress / 100.0)
        .label(format!("{}% Complete", progress.round()))
        .render(chunks[1], buf);

    Paragraph::new(Span::styled(question.prompt.clone(), bold()))
        .wrap(Wrap { trim: true })
        .render(chunks[3], buf);

    let option_lines: Vec<Line> = question
        .options
        .iter()
        .enumerate()
        .map(|(idx, option)| {
            let selected = session.selected_option == Some(idx);
            // Options past the hotkey range are still reachable with ↑/↓
            let mut text = match OPTION_KEYS.get(idx) {
                Some(key) => format!("({key}) {option}"),
                None => format!("    {option}"),
            };

            let style = if session.result_revealed {
                if idx == question.correct_index {
                    text.push_str("  ✔");
                    bold().fg(Color::Green)
                } else if selected {
                    text.push_str("  ✘");
                    bold().fg(Color::Red)
                } else {
                    dim()
                }
            } else if selected {
                bold().fg(Color::Blue)
            } else {
                Style::default()
            };
            Line::from(Span::styled(text, style))
        })
        .collect();
    Paragraph::new(option_lines).render(chunks[5], buf);

    if session.result_revealed {
        Paragraph::new(Span::styled(
            format!("Explanation: {}", question.explanation),
            Style::default().fg(Color::Cyan).patch(italic()),
        ))
        .wrap(Wrap { trim: true })
        .render(chunks[7], buf);
    }

    let legend = if session.result_revealed {
        if session.current_index + 1 < session.quiz.questions.len() {
            "(enter) next question / (esc) home"
        } else {
            "(enter) see results / (esc) home"
        }
    } else {
        "(1-4) select / (enter) submit / (esc) home"
    };
    Paragraph::new(Span::styled(legend.to_owned(), italic())).render(chunks[8], buf);
}

fn render_results(app: &App, area: Rect, buf: &mut Buffer) {
    let Some(score) = app
        .session
        .as_ref()
        .and_then(|s| s.final_score().ok())
    else {
        return;
    };

    let legend = if Browser::is_available() {
        "(r)etry / (h)ome / (s)hare / (esc)ape"
    } else {
        "(r)etry / (h)ome / (esc)ape"
    };

    let lines = vec![
        Line::from(Span::styled(score.tier.message(), bold().fg(Color::Yellow))),
        Line::from(""),
        Line::from(Span::styled(
            format!("{}/{}", score.correct, score.total),
            bold().fg(Color::Cyan),
        )),
        Line::from(Span::styled(format!("You scored {}%", score.percent), bold())),
        Line::from(Span::styled(format!("Tier: {}", score.tier), dim())),
        Line::from(""),
        Line::from(vec![
            Span::styled(format!("Correct: {}", score.correct), bold().fg(Color::Green)),
            Span::raw("   "),
            Span::styled(
                format!("Incorrect: {}", score.total - score.correct),
                bold().fg(Color::Red),
            ),
        ]),
        Line::from(""),
        Line::from(Span::styled(legend.to_owned(), italic())),
    ];

    Paragraph::new(lines)
        .alignment(Alignment::Center)
        .render(inset(area), buf);
}

fn render_dashboard(app: &App, area: Rect, buf: &mut Buffer) {
    let dash = &app.dashboard;
    let stats = &dash.user_stats;
    let area = inset(area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            [
                Constraint::Length(2), // welcome
                Constraint::Length(2), // quick stats
                Constraint::Length(1), // level gauge
                Constraint::Length(2), // points to next level
                Constraint::Min(4),    // badges + activity
                Constraint::Length(1), // legend
            ]
            .as_ref(),
        )
        .split(area);

    Paragraph::new(Line::from(Span::styled(
        format!(
            "Welcome back, {}!  Level {} Geography Explorer",
            stats.name, stats.level
        ),
        bold().fg(Color::Green),
    )))
    .render(chunks[0], buf);

    Paragraph::new(Line::from(Span::styled(
        format!(
            "{} points   {} quizzes done   {}% avg score   {} day streak",
            stats.total_points, stats.quizzes_completed, stats.average_score, stats.streak_days
        ),
        bold(),
    )))
    .render(chunks[1], buf);

    Gauge::default()
        .gauge_style(Style::default().fg(Color::Yellow))
        .ratio(dash.level_progress_percent() / 100.0)
        .label(format!(
            "Level {} -> {}",
            stats.level,
            stats.level + 1
        ))
        .render(chunks[2], buf);

    Paragraph::new(Span::styled(
        format!("{} points to next level", dash.points_to_next_level()),
        dim(),
    ))
    .render(chunks[3], buf);

    let mut lines: Vec<Line> = vec![Line::from(Span::styled("Badges", bold()))];
    for badge in &dash.badges {
        let style = if badge.earned { Style::default() } else { dim() };
        lines.push(Line::from(Span::styled(
            format!(
                "{} {} - {}{}",
                badge.icon,
                badge.name,
                badge.description,
                if badge.earned { "" } else { " (locked)" }
            ),
            style,
        )));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled("Recent Activity", bold())));
    for entry in &dash.recent_activity {
        lines.push(Line::from(Span::styled(
            format!(
                "{}: {}%  (+{} pts, {})",
                entry.quiz,
                entry.score,
                entry.points,
                entry.relative_label()
            ),
            Style::default(),
        )));
    }
    Paragraph::new(lines).render(chunks[4], buf);

    Paragraph::new(Span::styled("(b)ack / (esc) home".to_owned(), italic()))
        .render(chunks[5], buf);
}

fn render_teacher(app: &App, area: Rect, buf: &mut Buffer) {
    let portal = &app.teacher_portal;
    let area = inset(area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            [
                Constraint::Length(2), // welcome
                Constraint::Length(1), // tabs
                Constraint::Length(1),
                Constraint::Min(4),    // tab body
                Constraint::Length(1), // legend
            ]
            .as_ref(),
        )
        .split(area);

    Paragraph::new(Line::from(Span::styled(
        format!(
            "Welcome, {}!  {} students  {}% avg class score",
            portal.teacher_name,
            portal.total_students(),
            portal.overall_avg_score()
        ),
        bold().fg(Color::Cyan),
    )))
    .render(chunks[0], buf);

    let selected = match app.teacher_tab {
        TeacherTab::Overview => 0,
        TeacherTab::Students => 1,
        TeacherTab::Assignments => 2,
    };
    Tabs::new(vec!["Overview", "Students", "Assignments"])
        .select(selected)
        .highlight_style(bold().fg(Color::Green))
        .render(chunks[1], buf);

    let lines: Vec<Line> = match app.teacher_tab {
        TeacherTab::Overview => portal
            .classes
            .iter()
            .map(|c| {
                Line::from(Span::raw(format!(
                    "{}: {} students, {}% avg",
                    c.name, c.students, c.avg_score
                )))
            })
            .collect(),
        TeacherTab::Students => portal
            .ranked_students()
            .into_iter()
            .enumerate()
            .map(|(rank, s)| {
                Line::from(Span::raw(format!(
                    "{}. {} - {}% avg, {} quizzes, {} day streak",
                    rank + 1,
                    s.name,
                    s.avg_score,
                    s.quizzes,
                    s.streak
                )))
            })
            .collect(),
        TeacherTab::Assignments => portal
            .assignments
            .iter()
            .map(|a| {
                Line::from(Span::raw(format!(
                    "{} (due {}): {}/{} completed ({}%)",
                    a.title,
                    a.due,
                    a.completed,
                    a.total,
                    a.completion_percent()
                )))
            })
            .collect(),
    };
    Paragraph::new(lines).render(chunks[3], buf);

    Paragraph::new(Span::styled(
        "(tab) switch view / (b)ack / (esc) home".to_owned(),
        italic(),
    ))
    .render(chunks[4], buf);
}

fn render_not_found(area: Rect, buf: &mut Buffer) {
    let lines = vec![
        Line::from(Span::styled("Quiz Not Found", bold().fg(Color::Red))),
        Line::from(""),
        Line::from(Span::styled(
            "This theme has no questions yet.",
            Style::default(),
        )),
        Line::from(Span::styled("(h)ome".to_owned(), italic())),
    ];
    Paragraph::new(lines)
        .alignment(Alignment::Center)
        .render(area, buf);
}

fn inset(area: Rect) -> Rect {
    area.inner(ratatui::layout::Margin {
        horizontal: HORIZONTAL_MARGIN.min(area.width / 2),
        vertical: VERTICAL_MARGIN.min(area.height / 2),
    })
}
