use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    event::{KeyCode, KeyEvent, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use std::{
    error::Error,
    io::{self, stdin, Write},
    time::Duration,
};

use tably::progress::{
    append_session_log, FileProgressStore, ProgressStore, SessionLogEntry, MAX_TIME_LIMIT,
    MIN_TIME_LIMIT,
};
use tably::runtime::{EventSource, TerminalEventSource, TrainerEvent};
use tably::session::{Cue, Phase, Session};
use tably::ui::TrainerView;
use tably::TICK_INTERVAL_MS;

/// terminal times-table trainer with mastery tracking and a score marathon
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "A terminal trainer that drills one times-table at a time: repeat every fact until it sticks, then race the score marathon to unlock the next table."
)]
pub struct Cli {
    /// seconds allowed per question (5-8); overrides and persists the saved setting
    #[clap(short = 't', long)]
    time_limit: Option<u8>,

    /// seed for the question picker, for reproducible sessions
    #[clap(long)]
    seed: Option<u64>,
}

pub struct App {
    pub session: Session,
    pub input: String,
}

impl App {
    pub fn new(cli: &Cli) -> Self {
        let store = FileProgressStore::new();
        let mut record = store.load();
        if let Some(limit) = cli.time_limit {
            record.time_limit = limit.clamp(MIN_TIME_LIMIT, MAX_TIME_LIMIT);
            let _ = store.save(&record);
        }
        let rng = match cli.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let session = Session::with_rng(&record, Some(Box::new(store)), rng);
        Self {
            session,
            input: String::new(),
        }
    }

    fn log_entry(&self) -> SessionLogEntry {
        let (mastered, total) = self.session.mastery_progress();
        SessionLogEntry {
            table: self.session.state.table,
            stage: self.session.state.stage.to_string(),
            score: self.session.state.score,
            mastered,
            total,
            session_correct: self.session.milestones.session_correct,
            fast_answers: self.session.milestones.fast_answers,
        }
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(&cli);
    let events = TerminalEventSource::new(Duration::from_millis(TICK_INTERVAL_MS));
    let result = run(&mut terminal, &mut app, &events);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn run<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    events: &dyn EventSource,
) -> Result<(), Box<dyn Error>> {
    loop {
        terminal.draw(|f| {
            f.render_widget(
                TrainerView {
                    session: &app.session,
                    input: &app.input,
                },
                f.area(),
            )
        })?;

        let Some(event) = events.next() else { break };
        let phase_before = app.session.phase;

        let cues = match event {
            TrainerEvent::Tick => {
                let advancing = app.session.has_pending_advance();
                let cues = app.session.tick();
                if advancing {
                    // The old answer dies with the old question.
                    app.input.clear();
                }
                cues
            }
            TrainerEvent::Resize => Vec::new(),
            TrainerEvent::Key(key) => {
                if is_quit_key(key, app) {
                    if app.session.is_active() {
                        let _ = append_session_log(&app.log_entry());
                        app.session.stop();
                    }
                    break;
                }
                handle_key(app, key)
            }
        };

        // A completion phase entered through any event gets one log line.
        if app.session.phase != phase_before
            && matches!(
                app.session.phase,
                Phase::MasteryComplete | Phase::MarathonComplete | Phase::AllTablesComplete
            )
        {
            let _ = append_session_log(&app.log_entry());
        }

        play_cues(&cues);
    }

    Ok(())
}

fn is_quit_key(key: KeyEvent, app: &App) -> bool {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return true;
    }
    key.code == KeyCode::Char('q') && !app.session.is_active()
}

fn handle_key(app: &mut App, key: KeyEvent) -> Vec<Cue> {
    match key.code {
        KeyCode::Esc => {
            if app.session.is_active() {
                let _ = append_session_log(&app.log_entry());
            }
            app.session.stop();
            app.input.clear();
            Vec::new()
        }
        KeyCode::Enter => match app.session.phase {
            Phase::MasteryActive | Phase::MarathonActive => {
                let raw = std::mem::take(&mut app.input);
                app.session.submit_answer(&raw)
            }
            Phase::MasteryComplete | Phase::MarathonComplete | Phase::AllTablesComplete => {
                app.session.acknowledge_stage_transition();
                Vec::new()
            }
            Phase::Idle => Vec::new(),
        },
        KeyCode::Backspace => {
            app.input.pop();
            Vec::new()
        }
        KeyCode::Char('s') if app.session.phase == Phase::Idle => {
            app.input.clear();
            app.session.start();
            Vec::new()
        }
        KeyCode::Char('c') if app.session.is_active() => {
            app.input.clear();
            Vec::new()
        }
        KeyCode::Char(c @ '0'..='9') if app.session.is_active() => {
            // Three digits cover every answer up to 9 × 9.
            if app.input.len() < 3 {
                app.input.push(c);
            }
            Vec::new()
        }
        KeyCode::Char('+') | KeyCode::Char('=') if app.session.phase == Phase::Idle => {
            let limit = app.session.state.time_limit;
            app.session.set_time_limit(limit.saturating_add(1));
            Vec::new()
        }
        KeyCode::Char('-') if app.session.phase == Phase::Idle => {
            let limit = app.session.state.time_limit;
            app.session.set_time_limit(limit.saturating_sub(1));
            Vec::new()
        }
        _ => Vec::new(),
    }
}

/// Outcome cues degrade to the terminal bell; milestones already render as a
/// notice line on screen.
fn play_cues(cues: &[Cue]) {
    for cue in cues {
        match cue {
            Cue::Incorrect | Cue::Timeout => {
                let mut out = io::stdout();
                let _ = out.write_all(b"\x07");
                let _ = out.flush();
            }
            Cue::Correct | Cue::Milestone => {}
        }
    }
}
