use clap::{error::ErrorKind, ArgAction, CommandFactory, Parser};
use crossterm::{
    event::{DisableBracketedPaste, EnableBracketedPaste},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use hardtype::{
    app::App,
    clock::SystemClock,
    config::{Config, ConfigStore, FileConfigStore},
    corpus::Corpus,
    keys::KeySets,
    logging::init_logging,
    runtime::{CrosstermEventSource, FixedTicker, Runner},
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use std::{
    error::Error,
    io::{self, stdin},
    path::PathBuf,
};
use tracing::info;

/// hardcore typing practice: one mistake and the sentence locks
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "Type sentences word by word. A wrong word locks the board for a moment; clear it with Esc, Space or Enter and try again. Strokes and words per minute are tracked per sentence and for the session."
)]
pub struct Cli {
    /// sentence file to practise (.json list or one sentence per line)
    #[clap(short = 's', long)]
    sentences: Option<PathBuf>,

    /// milliseconds a failed attempt stays locked
    #[clap(short = 'l', long)]
    lock_time: Option<u64>,

    /// milliseconds between live statistics updates
    #[clap(short = 'r', long)]
    refresh_interval: Option<u64>,

    /// keep the sentence file order
    #[clap(long)]
    no_shuffle: bool,

    /// characters that separate words
    #[clap(long)]
    separators: Option<String>,

    /// write logs to this file
    #[clap(long)]
    log_file: Option<PathBuf>,

    /// more detailed logs (-v, -vv, -vvv)
    #[clap(short = 'v', long, action = ArgAction::Count)]
    verbose: u8,

    /// store the effective settings as the new defaults
    #[clap(long)]
    save_config: bool,
}

impl Cli {
    /// Flags given on the command line win over the stored configuration.
    fn apply_to(&self, mut config: Config) -> Config {
        if let Some(path) = &self.sentences {
            config.sentences = Some(path.clone());
        }
        if let Some(ms) = self.lock_time {
            config.lock_time_ms = ms;
        }
        if let Some(ms) = self.refresh_interval {
            config.refresh_interval_ms = ms;
        }
        if self.no_shuffle {
            config.shuffle = false;
        }
        if let Some(separators) = &self.separators {
            config.separators = separators.clone();
        }
        config
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    init_logging(cli.verbose, cli.log_file.as_deref())?;

    let store = FileConfigStore::new();
    let config = cli.apply_to(store.load());
    let settings = match config.board_settings() {
        Ok(settings) => settings,
        Err(err) => {
            let mut cmd = Cli::command();
            cmd.error(ErrorKind::InvalidValue, err.to_string()).exit();
        }
    };
    if cli.save_config {
        store.save(&config)?;
        info!(path = %store.path().display(), "config saved");
    }

    let mut corpus = match &config.sentences {
        Some(path) => Corpus::load_file(path)?,
        None => Corpus::embedded()?,
    };
    if config.shuffle {
        corpus.shuffle();
    }

    let mut app = App::new(corpus, settings, KeySets::default(), SystemClock)?;

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableBracketedPaste)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let outcome = start_tui(&mut terminal, &mut app, &config);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        DisableBracketedPaste,
        LeaveAlternateScreen
    )?;
    terminal.show_cursor()?;

    outcome
}

fn start_tui<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    config: &Config,
) -> Result<(), Box<dyn Error>> {
    let runner = Runner::new(
        CrosstermEventSource::new(),
        FixedTicker::new(config.tick_rate()),
    );

    terminal.draw(|f| f.render_widget(&*app, f.area()))?;

    while !app.should_quit() {
        let event = runner.step();
        if app.handle_event(event) {
            terminal.draw(|f| f.render_widget(&*app, f.area()))?;
        }
    }

    info!(
        completed = app.session().completed(),
        total_wpm = app.session().cumulative().wpm,
        "session finished"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_default_values() {
        let cli = Cli::parse_from(["hardtype"]);
        assert_eq!(cli.sentences, None);
        assert_eq!(cli.lock_time, None);
        assert!(!cli.no_shuffle);
        assert_eq!(cli.verbose, 0);
        assert!(!cli.save_config);
    }

    #[test]
    fn test_cli_flags() {
        let cli = Cli::parse_from([
            "hardtype",
            "--sentences",
            "drills.txt",
            "--lock-time",
            "800",
            "-r",
            "100",
            "--no-shuffle",
            "--separators",
            " -",
            "-vv",
        ]);
        assert_eq!(cli.sentences, Some(PathBuf::from("drills.txt")));
        assert_eq!(cli.lock_time, Some(800));
        assert_eq!(cli.refresh_interval, Some(100));
        assert!(cli.no_shuffle);
        assert_eq!(cli.separators.as_deref(), Some(" -"));
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn test_cli_overrides_config() {
        let stored = Config {
            lock_time_ms: 900,
            refresh_interval_ms: 300,
            ..Config::default()
        };
        let cli = Cli::parse_from(["hardtype", "--lock-time", "700", "--no-shuffle"]);
        let merged = cli.apply_to(stored);

        assert_eq!(merged.lock_time_ms, 700);
        assert_eq!(merged.refresh_interval_ms, 300);
        assert!(!merged.shuffle);
    }

    #[test]
    fn test_cli_zero_lock_time_is_rejected() {
        let cli = Cli::parse_from(["hardtype", "--lock-time", "0"]);
        assert!(cli.apply_to(Config::default()).board_settings().is_err());
    }

    #[test]
    fn test_cli_verify() {
        Cli::command().debug_assert();
    }
}
