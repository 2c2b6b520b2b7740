pub mod bank;
pub mod config;
pub mod dashboard;
pub mod runtime;
pub mod session;
pub mod teacher;
pub mod ui;
pub mod util;

use crate::{
    bank::QuizDefinition,
    config::{Config, ConfigStore, FileConfigStore},
    dashboard::Dashboard,
    runtime::{AppEvent, Countdown, CrosstermEventSource, Runner},
    session::QuizSession,
    teacher::TeacherPortal,
};
use clap::{error::ErrorKind, CommandFactory, Parser, ValueEnum};
use crossterm::{
    event::{KeyCode, KeyEvent, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Frame, Terminal,
};
use std::{
    error::Error,
    io::{self, stdin},
    time::Duration,
};

const TICK_RATE_MS: u64 = 100;

/// Ticks to hold the "tallying" interstitial before the results screen.
/// Display polish only; the session itself completes instantly.
const RESULTS_DELAY_TICKS: u8 = 5;

/// terminal geography quiz with themed question sets and progress screens
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "A terminal geography quiz. Pick a theme, answer multiple-choice questions with instant explanations, and review mock progress on the student dashboard or teacher portal."
)]
pub struct Cli {
    /// quiz theme to jump straight into
    #[clap(short = 't', long, value_enum)]
    theme: Option<SupportedTheme>,

    /// shuffle question order at session start
    #[clap(long)]
    shuffle: bool,

    /// open on the student dashboard
    #[clap(long)]
    dashboard: bool,

    /// open on the teacher portal
    #[clap(long)]
    teacher: bool,

    /// list available themes and exit
    #[clap(long)]
    list_themes: bool,
}

#[derive(Debug, Copy, Clone, ValueEnum, strum_macros::Display)]
pub enum SupportedTheme {
    Continents,
    Capitals,
    Rivers,
    Mountains,
}

impl SupportedTheme {
    fn theme_id(&self) -> String {
        self.to_string().to_lowercase()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum AppState {
    Home,
    Quiz,
    Results,
    Dashboard,
    Teacher,
    NotFound,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TeacherTab {
    Overview,
    Students,
    Assignments,
}

impl TeacherTab {
    fn next(self) -> Self {
        match self {
            TeacherTab::Overview => TeacherTab::Students,
            TeacherTab::Students => TeacherTab::Assignments,
            TeacherTab::Assignments => TeacherTab::Overview,
        }
    }
}

#[derive(Debug)]
pub struct HomeState {
    pub themes: Vec<String>,
    pub cursor: usize,
}

#[derive(Debug)]
pub struct App {
    pub cli: Option<Cli>,
    pub config: Config,
    pub state: AppState,
    pub session: Option<QuizSession>,
    pub home: HomeState,
    pub dashboard: Dashboard,
    pub teacher_portal: TeacherPortal,
    pub teacher_tab: TeacherTab,
    /// Presentation-owned countdown between the final advance and the
    /// results screen. Never part of the session state machine.
    pub results_delay: Countdown,
}

impl App {
    pub fn new(cli: Cli, config: Config) -> Self {
        let themes = bank::available_themes();
        let cursor = themes
            .iter()
            .position(|t| *t == config.theme)
            .unwrap_or(0);

        let mut app = Self {
            config,
            state: AppState::Home,
            session: None,
            home: HomeState { themes, cursor },
            dashboard: Dashboard::load(),
            teacher_portal: TeacherPortal::load(),
            teacher_tab: TeacherTab::Overview,
            results_delay: Countdown::default(),
            cli: Some(cli.clone()),
        };

        if cli.dashboard {
            app.state = AppState::Dashboard;
        } else if cli.teacher {
            app.state = AppState::Teacher;
        } else if let Some(theme) = cli.theme {
            app.start_quiz(&theme.theme_id());
        }
        app
    }

    /// Bank lookup plus session start; an unknown theme or an empty question
    /// set lands on the not-found screen instead of crashing.
    pub fn start_quiz(&mut self, theme_id: &str) {
        let Some(quiz) = bank::get_quiz(theme_id) else {
            self.state = AppState::NotFound;
            return;
        };
        self.start_session(quiz);
    }

    fn start_session(&mut self, mut quiz: QuizDefinition) {
        if self.config.shuffle {
            quiz.shuffle(&mut rand::thread_rng());
        }
        match QuizSession::start(quiz) {
            Ok(session) => {
                self.session = Some(session);
                self.results_delay.cancel();
                self.state = AppState::Quiz;
            }
            Err(_) => self.state = AppState::NotFound,
        }
    }

    pub fn go_home(&mut self) {
        self.session = None;
        self.results_delay.cancel();
        self.state = AppState::Home;
    }

    pub fn on_tick(&mut self) {
        if self.results_delay.tick() {
            self.state = AppState::Results;
        }
    }

    fn selected_theme(&self) -> Option<&str> {
        self.home.themes.get(self.home.cursor).map(String::as_str)
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    if cli.list_themes {
        for theme in bank::available_themes() {
            println!("{theme}");
        }
        return Ok(());
    }

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    let store = FileConfigStore::new();
    let mut config = store.load();
    if let Some(theme) = cli.theme {
        config.theme = theme.theme_id();
    }
    if cli.shuffle {
        config.shuffle = true;
    }

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(cli, config);
    let runner = Runner::new(
        CrosstermEventSource::new(),
        Duration::from_millis(TICK_RATE_MS),
    );
    run_app(&mut terminal, &mut app, &runner)?;

    // Persist preferences chosen during the run, like a theme picked on the
    // home screen, so the next launch starts from them.
    let _ = store.save(&app.config);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen,)?;
    terminal.show_cursor()?;

    Ok(())
}

fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    runner: &Runner<CrosstermEventSource>,
) -> Result<(), Box<dyn Error>> {
    loop {
        terminal.draw(|f| ui(app, f))?;

        match runner.next_event() {
            AppEvent::Tick => {
                app.on_tick();
            }
            AppEvent::Resize => {}
            AppEvent::Key(key) => {
                if handle_key(app, key) {
                    break;
                }
            }
        }
    }
    Ok(())
}

fn ui(app: &mut App, f: &mut Frame) {
    ui::screen::current_screen(&app.state).render(app, f);
}

/// Translate one key press into controller calls or screen changes.
/// Returns true when the app should quit.
pub fn handle_key(app: &mut App, key: KeyEvent) -> bool {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return true;
    }

    match app.state {
        AppState::Home => match key.code {
            KeyCode::Esc => return true,
            KeyCode::Up => {
                if app.home.cursor > 0 {
                    app.home.cursor -= 1;
                }
            }
            KeyCode::Down => {
                if app.home.cursor + 1 < app.home.themes.len() {
                    app.home.cursor += 1;
                }
            }
            KeyCode::Enter => {
                if let Some(theme) = app.selected_theme().map(str::to_string) {
                    app.config.theme = theme.clone();
                    app.start_quiz(&theme);
                }
            }
            KeyCode::Char('d') => app.state = AppState::Dashboard,
            KeyCode::Char('t') => app.state = AppState::Teacher,
            _ => {}
        },
        AppState::Quiz => match key.code {
            KeyCode::Esc => app.go_home(),
            KeyCode::Char(c @ '1'..='4') => {
                if let Some(session) = app.session.as_mut() {
                    session.select_option(c as usize - '1' as usize);
                }
            }
            KeyCode::Char(c @ 'a'..='d') => {
                if let Some(session) = app.session.as_mut() {
                    session.select_option(c as usize - 'a' as usize);
                }
            }
            KeyCode::Up => {
                if let Some(session) = app.session.as_mut() {
                    let next = session.selected_option.map_or(0, |s| s.saturating_sub(1));
                    session.select_option(next);
                }
            }
            KeyCode::Down => {
                if let Some(session) = app.session.as_mut() {
                    let next = session.selected_option.map_or(0, |s| s + 1);
                    session.select_option(next);
                }
            }
            KeyCode::Enter => {
                if app.results_delay.is_armed() {
                    // interstitial: let the tick countdown finish
                } else if let Some(session) = app.session.as_mut() {
                    if session.result_revealed {
                        session.advance();
                        if session.is_complete() {
                            app.results_delay.arm(RESULTS_DELAY_TICKS);
                        }
                    } else {
                        session.submit();
                    }
                }
            }
            _ => {}
        },
        AppState::Results => match key.code {
            KeyCode::Esc => return true,
            KeyCode::Char('r') => {
                if let Some(session) = app.session.as_mut() {
                    session.reset();
                    app.results_delay.cancel();
                    app.state = AppState::Quiz;
                }
            }
            KeyCode::Char('h') => app.go_home(),
            KeyCode::Char('s') => share_score(app),
            _ => {}
        },
        AppState::Dashboard | AppState::NotFound => match key.code {
            KeyCode::Esc | KeyCode::Char('b') | KeyCode::Char('h') => app.go_home(),
            _ => {}
        },
        AppState::Teacher => match key.code {
            KeyCode::Esc | KeyCode::Char('b') | KeyCode::Char('h') => app.go_home(),
            KeyCode::Tab => app.teacher_tab = app.teacher_tab.next(),
            _ => {}
        },
    }
    false
}

fn share_score(app: &App) {
    use webbrowser::Browser;

    let Some(score) = app
        .session
        .as_ref()
        .and_then(|s| s.final_score().ok())
    else {
        return;
    };
    if Browser::is_available() {
        webbrowser::open(&format!(
            "https://twitter.com/intent/tweet?text=I%20scored%20{}%2F{}%20({}%25)%20on%20GeoQuest!",
            score.correct, score.total, score.percent
        ))
        .unwrap_or_default();
    }
}
