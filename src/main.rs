mod app;
mod config;
mod controller;
mod editor;
mod fileio;
mod grid;
mod input;
mod nav;
mod render;
mod style;
mod ui;
mod util;

use std::fs::File;
use std::io::{self, Write};
use std::panic;
use std::path::PathBuf;
use std::sync::Mutex;

use tracing::{error, info, warn};
use tracing_subscriber::fmt::writer::MakeWriter;

use crossterm::{
    cursor::MoveToColumn,
    event::{DisableFocusChange, DisableMouseCapture, EnableFocusChange, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};

use app::App;
use config::{AppConfig, ConfigError};
use fileio::FileIO;
use style::{Style, Theme};

struct Args {
    file_path: Option<PathBuf>,
    config_path: Option<PathBuf>,
    theme: Option<String>,
}

/// Parse command line arguments
fn parse_args() -> Args {
    let args: Vec<String> = std::env::args().collect();
    let mut parsed = Args { file_path: None, config_path: None, theme: None };

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "-c" | "--config" => {
                if i + 1 < args.len() {
                    parsed.config_path = Some(PathBuf::from(&args[i + 1]));
                    i += 2;
                } else {
                    eprintln!("Error: --config requires an argument");
                    std::process::exit(1);
                }
            }
            "-t" | "--theme" => {
                if i + 1 < args.len() {
                    parsed.theme = Some(args[i + 1].clone());
                    i += 2;
                } else {
                    eprintln!("Error: --theme requires an argument");
                    std::process::exit(1);
                }
            }
            "-h" | "--help" => {
                print_help();
                std::process::exit(0);
            }
            arg if arg.starts_with('-') => {
                eprintln!("Unknown option: {}", arg);
                std::process::exit(1);
            }
            _ => {
                parsed.file_path = Some(PathBuf::from(&args[i]));
                i += 1;
            }
        }
    }

    parsed
}

/// Theme precedence: --theme, then the config's theme_file, then its theme name
fn resolve_theme(config: &AppConfig, cli_theme: Option<&str>) -> Result<Theme, ConfigError> {
    if let Some(name) = cli_theme {
        return Theme::by_name(name).ok_or_else(|| ConfigError::UnknownTheme(name.to_string()));
    }
    if let Some(path) = &config.theme_file {
        return Theme::from_file(path)
            .map_err(|message| ConfigError::Theme { path: path.clone(), message });
    }
    Theme::by_name(&config.theme).ok_or_else(|| ConfigError::UnknownTheme(config.theme.clone()))
}

/// Handle panics gracefully
fn install_panic_hook() {
    let default_hook = panic::take_hook();

    panic::set_hook(Box::new(move |info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), DisableMouseCapture, DisableFocusChange, LeaveAlternateScreen);

        if let Some(location) = info.location() {
            error!(
                file = location.file(),
                line = location.line(),
                "panic occured"
            );
        } else {
            error!("panic occured");
        }

        if let Some(s) = info.payload().downcast_ref::<&str>() {
            error!(message = %s);
        } else if let Some(s) = info.payload().downcast_ref::<String>() {
            error!(message = %s);
        }

        default_hook(info);
    }));
}

/// A `MakeWriter` for `tracing` that logs to the **main screen** by leaving the alternate screen temporarily.
pub struct MainScreenWriter;

impl<'a> MakeWriter<'a> for MainScreenWriter {
    type Writer = MainScreenWriterHandle;

    fn make_writer(&'a self) -> Self::Writer {
        MainScreenWriterHandle
    }
}

/// A handle that writes to stdout outside the alternate screen
pub struct MainScreenWriterHandle;

impl Write for MainScreenWriterHandle {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        execute!(io::stdout(), LeaveAlternateScreen)?;
        println!();
        execute!(io::stdout(), MoveToColumn(0))?;
        let result = io::stdout().write(buf);
        execute!(io::stdout(), MoveToColumn(0))?;
        io::stdout().flush()?;
        execute!(io::stdout(), EnterAlternateScreen)?;
        result
    }

    fn flush(&mut self) -> io::Result<()> {
        io::stdout().flush()
    }
}

fn init_tracing(config: &AppConfig) -> io::Result<()> {
    let builder = tracing_subscriber::fmt().with_max_level(config.tracing_level());
    match &config.log_file {
        Some(path) => {
            let file = File::create(path)?;
            builder.with_ansi(false).with_writer(Mutex::new(file)).init();
        }
        None => builder.with_writer(MainScreenWriter).init(),
    }
    Ok(())
}

fn print_help() {
    eprintln!("cellgrid - An interactive terminal data grid with inline cell editing");
    eprintln!();
    eprintln!("USAGE:");
    eprintln!("    cellgrid [OPTIONS] [FILE]");
    eprintln!();
    eprintln!("OPTIONS:");
    eprintln!("    -c, --config <PATH>  Read settings from PATH instead of ~/.config/cellgrid/config.toml");
    eprintln!("    -t, --theme <NAME>   Use a built-in theme ({})", Theme::builtin_names().join(", "));
    eprintln!("    -h, --help           Print this help message");
    eprintln!();
    eprintln!("FILE is a grid definition (.toml) or a CSV/TSV file with a header row.");
    eprintln!();
    eprintln!("KEYS:");
    eprintln!("    Arrows, Tab, Shift+Tab  Move focus");
    eprintln!("    Enter                   Edit / save / open details");
    eprintln!("    Esc                     Cancel / close details");
    eprintln!("    Ctrl+Q, Ctrl+C          Quit");
}

fn main() -> io::Result<()> {
    let args = parse_args();

    let config = AppConfig::resolve(args.config_path.as_deref()).map_err(|e| {
        eprintln!("{}", e);
        io::Error::from(e)
    })?;
    init_tracing(&config)?;
    info!("cellgrid started");

    install_panic_hook();

    let theme = match resolve_theme(&config, args.theme.as_deref()) {
        Ok(theme) => theme,
        Err(e) => {
            warn!(error = %e, "falling back to default theme");
            Theme::default()
        }
    };

    let file_io = FileIO::new(args.file_path).with_default_trigger(config.default_trigger_text.clone());
    let load_result = file_io.load_grid().map_err(|e| {
        error!(error = %e, "Failed to load grid");
        eprintln!("{}", e);
        io::Error::from(e)
    })?;

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableFocusChange)?;
    if config.mouse {
        execute!(stdout, EnableMouseCapture)?;
    }

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(load_result.grid, file_io.file_name(), Style::with_theme(theme), config);
    if !load_result.warnings.is_empty() {
        app.message = Some(load_result.warnings.join("; "));
    }

    let result = app.run(&mut terminal);
    info!(edits = app.commits.len(), "cellgrid exiting");

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        DisableMouseCapture,
        DisableFocusChange,
        LeaveAlternateScreen
    )?;

    result
}
