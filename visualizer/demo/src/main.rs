//! Visualizer Demo - Command-driven terminal harness
//!
//! Drives a [`Visualizer`] over in-memory surfaces from a line-oriented
//! script, so the engine can be exercised without a browser.
//!
//! # Usage
//!
//! ```bash
//! # Interactive, commands on stdin
//! visualizer-demo
//!
//! # Replay a script at double speed
//! visualizer-demo --script session.txt --speed 2
//!
//! # No pacing at all
//! visualizer-demo --instant --script session.txt
//!
//! # Verbose logging
//! RUST_LOG=visualizer_core=debug visualizer-demo
//! ```
//!
//! # Commands
//!
//! | Command          | Effect                                   |
//! |------------------|------------------------------------------|
//! | `email <value>`  | type into the email input (live check)   |
//! | `next`           | submit the email step                    |
//! | `type <value>`   | type into the dynamic input              |
//! | `submit`         | submit the dynamic step                  |
//! | `view <name>`    | switch to `crm`, `pipeline` or `card`    |
//! | `clear`          | abort everything and start over          |
//! | `redraw`         | re-render all views silently             |
//! | `wait`           | block until the views are idle           |
//! | `sleep <ms>`     | let the clock run                        |
//! | `show`           | print every surface and the form as JSON |
//! | `quit`           | stop                                     |

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tracing::{debug, info, warn};

use visualizer_core::surfaces::memory::PanelContent;
use visualizer_core::surfaces::{InputSurface, TextSurface};
use visualizer_core::{
    load_config_from_path, Field, FrameTweenEngine, MemorySurfaces, RecordingTweenEngine,
    TimingConfig, TweenEngine, ViewId, Visualizer, VisualizerConfig,
};

/// Visualizer Demo - drive the form visualizer from a script
#[derive(Parser, Debug)]
#[command(name = "visualizer-demo")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Read commands from this file instead of stdin
    #[arg(short = 's', long, value_name = "FILE")]
    script: Option<PathBuf>,

    /// Configuration file path
    #[arg(short = 'c', long, env = "VISUALIZER_CONFIG", value_name = "FILE")]
    config: Option<PathBuf>,

    /// Playback speed multiplier (2.0 runs twice as fast)
    #[arg(long, default_value_t = 1.0)]
    speed: f32,

    /// Skip all pacing and tweening
    #[arg(long)]
    instant: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short = 'l', long, env = "VISUALIZER_LOG_LEVEL", default_value = "warn")]
    log_level: String,
}

/// One parsed script line
#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    Email(String),
    Next,
    Type(String),
    Submit,
    View(ViewId),
    Clear,
    Redraw,
    Wait,
    Sleep(u64),
    Show,
    Quit,
}

impl Command {
    /// Parse a line; blank lines and `#` comments yield `None`
    fn parse(line: &str) -> Result<Option<Self>> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return Ok(None);
        }
        let (word, rest) = line
            .split_once(char::is_whitespace)
            .map_or((line, ""), |(word, rest)| (word, rest.trim()));

        let command = match word.to_ascii_lowercase().as_str() {
            "email" => Self::Email(rest.to_string()),
            "type" => Self::Type(rest.to_string()),
            "submit" => Self::Submit,
            "next" => Self::Next,
            "view" => Self::View(rest.parse().map_err(anyhow::Error::msg)?),
            "clear" => Self::Clear,
            "redraw" => Self::Redraw,
            "wait" => Self::Wait,
            "sleep" => Self::Sleep(
                rest.parse()
                    .with_context(|| format!("sleep expects milliseconds, got {rest:?}"))?,
            ),
            "show" => Self::Show,
            "quit" | "exit" => Self::Quit,
            other => bail!("unknown command: {other}"),
        };
        Ok(Some(command))
    }
}

fn init_logging(level: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        tracing_subscriber::EnvFilter::new(format!(
            "visualizer_demo={level},visualizer_core={level}"
        ))
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}

fn build_config(args: &Args) -> Result<VisualizerConfig> {
    if args.speed <= 0.0 || !args.speed.is_finite() {
        bail!("--speed must be a positive number, got {}", args.speed);
    }

    let mut config =
        load_config_from_path(args.config.clone()).context("Failed to load configuration")?;
    if args.instant {
        config.override_timing(TimingConfig::instant());
    } else if (args.speed - 1.0).abs() > f32::EPSILON {
        let scaled = config.timing.scaled(args.speed.recip());
        config.override_timing(scaled);
    }
    Ok(config)
}

/// Owns the session and applies commands to it
struct Demo {
    surfaces: MemorySurfaces,
    visualizer: Visualizer,
}

impl Demo {
    fn start(config: VisualizerConfig, instant: bool) -> Result<Self> {
        let surfaces = MemorySurfaces::new(config.initial_view);
        let tween: Arc<dyn TweenEngine> = if instant {
            Arc::new(RecordingTweenEngine::new())
        } else {
            Arc::new(FrameTweenEngine::default())
        };
        let visualizer = Visualizer::start(config, surfaces.surfaces(), tween)?;
        Ok(Self {
            surfaces,
            visualizer,
        })
    }

    /// Apply one command; returns `false` once the session should stop
    async fn apply(&mut self, command: Command) -> Result<bool> {
        debug!(?command, "applying command");
        match command {
            Command::Email(value) => {
                self.surfaces.email_input.set_value(&value);
                if !self.visualizer.email_input_changed() {
                    println!("email looks malformed: {value}");
                }
            }
            Command::Next => {
                let outcome = self.visualizer.submit_email().await.map(|_| ());
                self.report(outcome);
            }
            Command::Type(value) => self.surfaces.dynamic_input.set_value(&value),
            Command::Submit => {
                let outcome = self.visualizer.submit_dynamic().await.map(|_| ());
                self.report(outcome);
            }
            Command::View(view) => self.visualizer.select_view(view).await?,
            Command::Clear => self.visualizer.clear().await,
            Command::Redraw => self.visualizer.redraw().await?,
            Command::Wait => self.visualizer.idle().await?,
            Command::Sleep(ms) => tokio::time::sleep(Duration::from_millis(ms)).await,
            Command::Show => {
                self.visualizer.idle().await?;
                self.show()?;
            }
            Command::Quit => return Ok(false),
        }
        Ok(true)
    }

    fn report<E: std::fmt::Display>(&self, outcome: Result<(), E>) {
        match outcome {
            Ok(()) => info!(stage = %self.visualizer.derived_stage(), "accepted"),
            Err(err) => println!("rejected: {err}"),
        }
    }

    fn show(&self) -> Result<()> {
        let s = &self.surfaces;
        println!("view      : {}", self.visualizer.active_view());
        println!("stage     : {}", self.visualizer.derived_stage());
        println!("next      : {}", s.dynamic_input.placeholder());
        println!("-- crm");
        for field in Field::CANONICAL {
            println!("{:<10}: {}", field.label(), s.crm(field).text());
        }
        println!("-- pipeline");
        match s.board.card_stage() {
            Some(stage) => println!("card      : {stage}"),
            None => println!("card      : (not mounted)"),
        }
        println!("-- card");
        println!("name      : {}", s.card_name.text());
        println!("title     : {}", s.card_title.text());
        println!("company   : {}", s.card_company.text());
        println!("email     : {}", s.card_email.text());
        if let PanelContent::Completed(message) = s.panel.content() {
            println!("-- done: {} ({})", message.heading, message.link_href);
        }
        let form = serde_json::to_string_pretty(&self.visualizer.form())
            .context("Failed to serialize form")?;
        println!("{form}");
        Ok(())
    }
}

async fn run_script<R>(demo: &mut Demo, reader: R) -> Result<()>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = reader.lines();
    let mut line_no = 0usize;
    while let Some(line) = lines.next_line().await.context("Failed to read command")? {
        line_no += 1;
        let command = match Command::parse(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(e) => {
                warn!(line = line_no, error = %e, "skipping command");
                println!("line {line_no}: {e}");
                continue;
            }
        };
        if !demo.apply(command).await? {
            break;
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(&args.log_level);

    let config = build_config(&args)?;
    info!(
        source = %config.source(),
        view = %config.initial_view,
        instant = args.instant,
        "starting visualizer demo"
    );

    let mut demo = Demo::start(config, args.instant)?;

    match &args.script {
        Some(path) => {
            let file = tokio::fs::File::open(path)
                .await
                .with_context(|| format!("Failed to open script: {path:?}"))?;
            run_script(&mut demo, BufReader::new(file)).await?;
        }
        None => run_script(&mut demo, BufReader::new(tokio::io::stdin())).await?,
    }

    demo.visualizer.idle().await?;
    demo.visualizer.shutdown().await?;
    info!("visualizer demo stopped");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use visualizer_core::ConfigSource;

    #[test]
    fn test_parse_commands() {
        assert_eq!(
            Command::parse("email a@b.com").unwrap(),
            Some(Command::Email("a@b.com".into()))
        );
        assert_eq!(
            Command::parse("  type   Ann Lee ").unwrap(),
            Some(Command::Type("Ann Lee".into()))
        );
        assert_eq!(Command::parse("next").unwrap(), Some(Command::Next));
        assert_eq!(
            Command::parse("VIEW Pipeline").unwrap(),
            Some(Command::View(ViewId::Pipeline))
        );
        assert_eq!(Command::parse("sleep 250").unwrap(), Some(Command::Sleep(250)));
        assert_eq!(Command::parse("quit").unwrap(), Some(Command::Quit));
    }

    #[test]
    fn test_parse_skips_blank_and_comments() {
        assert_eq!(Command::parse("").unwrap(), None);
        assert_eq!(Command::parse("   # a note").unwrap(), None);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(Command::parse("dance").is_err());
        assert!(Command::parse("view kanban").is_err());
        assert!(Command::parse("sleep soon").is_err());
    }

    #[tokio::test]
    async fn test_script_fills_the_form() {
        let mut demo = Demo::start(VisualizerConfig::instant(), true).unwrap();
        let script = "\
# full run
email a@b.com
next
type Ann
submit
type Lee
submit
type Acme
submit
type Eng
submit
view pipeline
wait
";
        run_script(&mut demo, BufReader::new(script.as_bytes()))
            .await
            .unwrap();
        demo.visualizer.idle().await.unwrap();

        assert!(demo.visualizer.is_complete());
        assert_eq!(demo.visualizer.active_view(), ViewId::Pipeline);
        assert_eq!(
            demo.surfaces.board.card_stage(),
            Some(visualizer_core::PipelineStage::Customer)
        );
        assert_eq!(demo.surfaces.crm(Field::JobTitle).text(), "Eng");
    }

    #[tokio::test]
    async fn test_script_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.txt");
        std::fs::write(&path, "email a@b.com\nnext\nclear\nquit\ntype ignored\n").unwrap();

        let mut demo = Demo::start(VisualizerConfig::instant(), true).unwrap();
        let file = tokio::fs::File::open(&path).await.unwrap();
        run_script(&mut demo, BufReader::new(file)).await.unwrap();
        demo.visualizer.idle().await.unwrap();

        assert!(demo.visualizer.form().is_empty());
        assert_eq!(demo.surfaces.dynamic_input.value(), "");
    }

    #[test]
    fn test_cli_flags_mark_the_config_source() {
        let args = Args::parse_from(["visualizer-demo", "--speed", "2"]);
        let config = build_config(&args).unwrap();
        assert_eq!(config.source(), ConfigSource::Cli);
        assert_eq!(config.timing.settle_delay_ms, 250);

        let args = Args::parse_from(["visualizer-demo", "--instant"]);
        let config = build_config(&args).unwrap();
        assert_eq!(config.source(), ConfigSource::Cli);
        assert_eq!(config.timing, TimingConfig::instant());
    }

    #[test]
    fn test_build_config_rejects_bad_speed() {
        let args = Args::parse_from(["visualizer-demo", "--speed", "0"]);
        assert!(build_config(&args).is_err());
    }
}
