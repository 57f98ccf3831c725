//! pitwatch - Live smoker telemetry in the terminal
//!
//! Watches one cook: refetches its telemetry on a timer, charts set, pit and
//! meat temperatures, and projects when the meat reaches the target.

use std::fs::{self, OpenOptions};
use std::io;
use std::panic;
use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use log::{error, info};
use ratatui::{backend::CrosstermBackend, Terminal};

use pitwatch::app::App;
use pitwatch::cli::Cli;
use pitwatch::config::Config;
use pitwatch::error::ErrorKind;
use pitwatch::pipeline::Pipeline;
use pitwatch::refresh::{self, RefreshConfig, RefreshHandle};
use pitwatch::ui;

type Tui = Terminal<CrosstermBackend<io::Stdout>>;

/// Sets up a panic hook that restores the terminal before printing the panic message.
fn setup_panic_hook() {
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(panic_info);
    }));
}

fn init_logging(target: env_logger::Target) {
    env_logger::Builder::from_env(env_logger::Env::new().default_filter_or("info"))
        .target(target)
        .init();
}

/// Log target for TUI mode: a file next to the cache, so the screen stays clean
fn log_file_target(config: &Config) -> io::Result<env_logger::Target> {
    fs::create_dir_all(&config.cache_dir)?;
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(config.log_file())?;
    Ok(env_logger::Target::Pipe(Box::new(file)))
}

/// Runs a single cycle and prints a summary
async fn run_once(config: &Config) -> ExitCode {
    let snapshot = match Pipeline::new(config).run().await {
        Ok(snapshot) => snapshot,
        Err(e) => {
            error!("cook {}: {}", config.cook_id, e);
            eprintln!("{}", e.report());
            return ExitCode::from(e.kind().exit_code());
        }
    };

    println!(
        "Cook {} updated at {} ({})",
        snapshot.cook_id,
        snapshot
            .last_updated
            .with_timezone(&config.utc_offset)
            .format("%Y-%m-%d %H:%M:%S"),
        snapshot.source
    );
    match snapshot.latest() {
        Some(latest) => println!(
            "latest: set {:.1}°F  pit {:.1}°F  meat {:.1}°F  duty {:.2}",
            latest.set_temp, latest.pit_temp, latest.meat_temp, latest.duty_cycle
        ),
        None => println!("latest: no samples yet"),
    }

    match &snapshot.projection {
        Ok(projection) => {
            let note = if projection.is_converging() {
                ""
            } else {
                " (meat cooling)"
            };
            println!(
                "projection: {}{}",
                projection.describe(&config.utc_offset),
                note
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("projection error: {}", e);
            ExitCode::from(e.kind().exit_code())
        }
    }
}

/// Main event loop: applies refresh messages, draws, and handles keys
async fn event_loop(terminal: &mut Tui, config: &Config) -> io::Result<()> {
    let mut app = App::new(config);
    let mut handle = RefreshHandle::spawn(
        RefreshConfig {
            period: config.cycle_period(),
            enabled: config.auto_refresh,
        },
        Pipeline::new(config),
    );

    loop {
        while let Some(message) = refresh::try_recv(&mut handle) {
            app.apply(message);
        }

        if app.refresh_requested {
            handle.request_refresh();
            app.refresh_requested = false;
        }

        terminal.draw(|f| ui::render(f, &app))?;
        app.frame_drawn();

        // Poll for keyboard events with 100ms timeout
        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.handle_key(key);
                }
            }
        }

        if app.should_quit {
            break;
        }
    }

    handle.shutdown().await;
    Ok(())
}

async fn run_tui(config: &Config) -> io::Result<()> {
    setup_panic_hook();

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = event_loop(&mut terminal, config).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;

    result
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match Config::resolve(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(e.kind().exit_code());
        }
    };

    if cli.once {
        init_logging(env_logger::Target::Stderr);
        return run_once(&config).await;
    }

    match log_file_target(&config) {
        Ok(target) => init_logging(target),
        Err(e) => {
            eprintln!(
                "Error: cannot open log file {}: {}",
                config.log_file().display(),
                e
            );
            return ExitCode::from(ErrorKind::Cache.exit_code());
        }
    }

    info!(
        "watching cook {} (target {:.0}°F, refresh every {}s)",
        config.cook_id,
        config.target_temp,
        config.refresh_interval.as_secs()
    );

    match run_tui(&config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("terminal error: {}", e);
            eprintln!("Error: {}", e);
            ExitCode::from(ErrorKind::Terminal.exit_code())
        }
    }
}
