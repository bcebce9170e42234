//! `tagfetch` command line.
//!
//! Renders a layout once, or redraws it every `--loop-ms` milliseconds
//! until `q` is pressed.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::Parser;
use env_logger::Env;
use tagfetch::live::draw;
use tagfetch::{layout_lines, static_registry, text_lines, Display, KeyboardQuit, LiveLoop};
use tagfetch_exec::ShellRunner;
use tagfetch_render::{ConfigProvider, OutputTarget, YamlConfig};

/// Render a tagged layout next to a logo
#[derive(Parser, Debug)]
#[command(name = "tagfetch")]
#[command(version)]
#[command(about = "Render a tagged layout next to a logo")]
struct Cli {
    /// YAML configuration file
    #[arg(short, long, value_name = "FILE")]
    config: PathBuf,

    /// Layout file, one layout line per line (defaults to `layout:` in the config)
    #[arg(short, long, value_name = "FILE")]
    layout: Option<PathBuf>,

    /// Logo art file
    #[arg(short, long, value_name = "FILE")]
    source: Option<PathBuf>,

    /// Emit Pango markup instead of terminal escapes
    #[arg(long)]
    gui: bool,

    /// Leave `$(command)` tags unexecuted
    #[arg(long)]
    disallow_command_tag: bool,

    /// Render color tags as nothing
    #[arg(long)]
    disable_colors: bool,

    /// Redraw every N milliseconds until `q` is pressed
    #[arg(long, value_name = "MS")]
    loop_ms: Option<u64>,
}

fn read_lines(path: &Path, what: &str) -> Result<Vec<String>> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read {} file {}", what, path.display()))?;
    Ok(text_lines(&text))
}

fn load_config(cli: &Cli) -> Result<YamlConfig> {
    let text = fs::read_to_string(&cli.config)
        .with_context(|| format!("failed to read config file {}", cli.config.display()))?;
    let mut config = YamlConfig::from_yaml(&text)
        .with_context(|| format!("invalid config file {}", cli.config.display()))?;

    if cli.disallow_command_tag {
        config.set("intern.args.disallow-commands", true);
    }
    if cli.disable_colors {
        config.set("intern.args.disable-colors", true);
    }
    Ok(config)
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    let config = load_config(&cli)?;

    let layout = match &cli.layout {
        Some(path) => read_lines(path, "layout")?,
        None => layout_lines(&config),
    };
    if layout.is_empty() {
        bail!("no layout: pass --layout or add a `layout:` list to the config");
    }
    let art = match &cli.source {
        Some(path) => read_lines(path, "logo")?,
        None => Vec::new(),
    };

    let registry = static_registry(&config);
    let runner = match config.command_timeout() {
        Some(timeout) => ShellRunner::new().with_timeout(timeout),
        None => ShellRunner::new(),
    };
    let target = if cli.gui {
        OutputTarget::Gui
    } else {
        OutputTarget::Terminal
    };
    let display = Display::new(&registry, &config, &runner).with_target(target);

    match cli.loop_ms {
        Some(ms) => {
            let mut quit = KeyboardQuit::new().context("failed to enter raw mode")?;
            let live = LiveLoop::new(Duration::from_millis(ms));
            let frame = || {
                let frame = display.compose(&art, &layout);
                draw(&mut io::stdout().lock(), &frame.lines)
            };
            live.run(frame, &mut quit)?;
        }
        None => {
            let frame = display.compose(&art, &layout);
            let mut out = io::stdout().lock();
            for line in &frame.lines {
                writeln!(out, "{}", line)?;
            }
        }
    }
    Ok(())
}
