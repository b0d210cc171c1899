use std::{
    error::Error,
    io::{self, stdin, Write},
    path::{Path, PathBuf},
    sync::Arc,
    time::Instant,
};

use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use log::info;
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};

use studyforge::{
    app::{App, Flow, GeneratorFactory},
    app_dirs::AppDirs,
    config::{Config, ConfigStore, FileConfigStore},
    generate::{self, CancelToken, Document, GeminiClient, GenerationRequest, Generator},
    logging::{self, LogSink},
    runtime::{CrosstermEventSource, EventSource, FixedTicker, Runner, Ticker},
    schema::{read_artifact, write_artifact, Artifact, ArtifactKind},
};

/// turn a PDF into flashcards, a quiz, or a matching game and practise it in the terminal
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "Generates study material from a PDF with a Gemini model, validates it against a fixed schema, and runs an interactive practice session: flip flashcards, take a four question quiz, or race the clock in an eight pair matching game."
)]
pub struct Cli {
    /// PDF to generate study material from
    document: Option<PathBuf>,

    /// kind of study material to generate
    #[clap(short = 'k', long, value_enum)]
    kind: Option<ArtifactKind>,

    /// practise a previously saved artifact instead of generating one
    #[clap(short = 'a', long, conflicts_with = "document")]
    artifact: Option<PathBuf>,

    /// write the validated artifact to this file as JSON
    #[clap(long)]
    save: Option<PathBuf>,

    /// validate or generate, print a summary and exit without starting the TUI
    #[clap(long)]
    check: bool,

    /// model to use instead of the configured one
    #[clap(short = 'm', long)]
    model: Option<String>,
}

impl Cli {
    /// Fold command line overrides into the stored configuration
    fn apply_to(&self, mut config: Config) -> Config {
        if let Some(model) = &self.model {
            config.model = model.clone();
        }
        if let Some(kind) = self.kind {
            config.default_kind = kind;
        }
        config
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    let store = FileConfigStore::new();

    if cli.check {
        let config = cli.apply_to(store.load());
        logging::init(LogSink::Stderr)?;
        if cli.document.is_none() && cli.artifact.is_none() {
            let mut cmd = Cli::command();
            cmd.error(
                ErrorKind::MissingRequiredArgument,
                "--check needs a DOCUMENT or --artifact",
            )
            .exit();
        }
        match run_check(&cli, &config) {
            Ok(artifact) => io::stdout().write_all(summarize(&artifact).as_bytes())?,
            Err(e) => {
                eprintln!("error: {e}");
                std::process::exit(1);
            }
        }
        return Ok(());
    }

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }
    logging::init(LogSink::File(&AppDirs::log_path()))?;
    let config = cli.apply_to(store.load_or_init());
    info!(
        "starting with model {} (config {})",
        config.model,
        store.path().display()
    );

    let runner = Runner::new(CrosstermEventSource::new(), FixedTicker::default());
    let mut app = App::new(gemini_factory(&config), runner.sender(), config.default_kind)
        .with_save_path(cli.save.clone());
    if let Some(path) = &cli.artifact {
        let artifact = read_artifact(path, cli.kind)?;
        app.practice(artifact, file_title(path));
    } else if let Some(path) = &cli.document {
        app = app.with_document(path.display().to_string());
        app.start_generation();
    }

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = start_tui(&mut terminal, &mut app, &runner);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen,)?;
    terminal.show_cursor()?;

    result
}

fn gemini_factory(config: &Config) -> GeneratorFactory {
    let config = config.clone();
    Box::new(move || {
        let client: Arc<dyn Generator> = Arc::new(GeminiClient::new(&config)?);
        Ok(client)
    })
}

fn file_title(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn start_tui<B: Backend, E: EventSource, T: Ticker>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    runner: &Runner<E, T>,
) -> Result<(), Box<dyn Error>> {
    let mut last_tick = Instant::now();

    loop {
        terminal.draw(|f| f.render_widget(&*app, f.area()))?;

        let event = runner.step();
        let now = Instant::now();
        app.on_tick(now - last_tick);
        last_tick = now;

        if app.on_event(event) == Flow::Quit {
            break;
        }
    }

    Ok(())
}

/// Load or generate an artifact without a terminal, saving it when asked
fn run_check(cli: &Cli, config: &Config) -> Result<Artifact, Box<dyn Error>> {
    let artifact = match (&cli.artifact, &cli.document) {
        (Some(path), _) => read_artifact(path, cli.kind)?,
        (None, Some(path)) => {
            let request = GenerationRequest {
                document: Document::from_path(path)?,
                kind: config.default_kind,
            };
            let client = GeminiClient::new(config)?;
            let expected = request.kind.expected_len();
            let mut streamed = 0;
            let result = generate::generate(&client, &request, &CancelToken::new(), |_| {
                streamed += 1;
                eprint!("\rreceived {streamed}/{expected} items");
            });
            eprintln!();
            result?
        }
        (None, None) => return Err("nothing to check".into()),
    };

    if let Some(path) = &cli.save {
        write_artifact(path, &artifact)?;
        info!("saved {} to {}", artifact.kind(), path.display());
    }
    Ok(artifact)
}

fn summarize(artifact: &Artifact) -> String {
    let mut out = format!("{}: {} items\n", artifact.kind(), artifact.len());
    match artifact {
        Artifact::Flashcards(cards) => {
            for card in cards {
                out.push_str(&format!("  {}: {}\n", card.term, card.definition));
            }
        }
        Artifact::Quiz(questions) => {
            for (idx, q) in questions.iter().enumerate() {
                out.push_str(&format!("  {}. {} [{}]\n", idx + 1, q.question, q.answer.letter()));
            }
        }
        Artifact::MatchingGame(pairs) => {
            for pair in pairs {
                out.push_str(&format!("  {} <-> {}\n", pair.left_item, pair.right_item));
            }
        }
    }
    out
}
