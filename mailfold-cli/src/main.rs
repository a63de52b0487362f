//! mailfold CLI - bounded plain-text views of email batches.

use std::env;
use std::fs;
use std::io::{self, Read, Write};
use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use clap::{Args, CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use env_logger::fmt::WriteStyle;
use log::{LevelFilter, debug, info, warn};
use mailfold_core::{
    AppConfig, AppPaths, BodyPipeline, RawBodies, ResponseOptions, build_email_response,
    format::render_query_summary, parse_emails, strip_blockquotes,
};
use serde::Serialize;

const APP_NAME: &str = env!("CARGO_PKG_NAME");

fn main() {
    if let Err(err) = try_main() {
        let _ = writeln!(io::stderr(), "{err:?}");
        std::process::exit(1);
    }
}

fn try_main() -> Result<()> {
    let cli = Cli::parse();
    let ctx = RuntimeContext::new(cli.common.clone())?;
    ctx.init_logging()?;
    debug!("config loaded from {}", ctx.paths.global_config.display());

    match cli.command {
        Command::Render(args) => handle_render(&ctx, args),
        Command::List(args) => handle_list(args),
        Command::Body(args) => handle_body(&ctx, args),
        Command::StripQuotes(args) => handle_strip_quotes(args),
        Command::Truncate(args) => handle_truncate(&ctx, args),
        Command::Config { command } => handle_config(&ctx, command),
        Command::Init(cmd) => handle_init(&ctx, cmd),
        Command::Completions { shell } => handle_completions(shell),
    }
}

#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "Normalize email bodies and fit email batches into a character budget.",
    propagate_version = true
)]
struct Cli {
    #[command(flatten)]
    common: CommonOpts,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, Args)]
struct CommonOpts {
    #[arg(long, value_name = "PATH", global = true)]
    config: Option<PathBuf>,
    #[arg(short, long, action = clap::ArgAction::SetTrue, global = true)]
    quiet: bool,
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count, global = true)]
    verbose: u8,
    #[arg(long, global = true)]
    debug: bool,
    #[arg(long, global = true)]
    trace: bool,
    #[arg(long, global = true, conflicts_with = "yaml")]
    json: bool,
    #[arg(long, global = true)]
    yaml: bool,
    #[arg(long = "no-color", global = true, conflicts_with = "color")]
    no_color: bool,
    #[arg(long, value_enum, default_value_t = ColorOption::Auto, global = true)]
    color: ColorOption,
    #[arg(long = "dry-run", global = true)]
    dry_run: bool,
    #[arg(short = 'y', long = "yes", global = true)]
    assume_yes: bool,
    #[arg(long = "diagnostics", global = true)]
    diagnostics: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ColorOption {
    Auto,
    Always,
    Never,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Render an Email/get result as one bounded response
    Render(RenderArgs),
    /// Print one summary row per email
    List(ListArgs),
    /// Normalize a single raw body (plain text or HTML)
    Body(BodyArgs),
    /// Remove <blockquote> elements from HTML
    StripQuotes(InputArgs),
    /// Cut text to a limit at a line boundary
    Truncate(TruncateArgs),
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
    Init(InitCommand),
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Debug, Args)]
struct InputArgs {
    /// Input file (reads stdin when omitted)
    file: Option<PathBuf>,
}

#[derive(Debug, Args)]
struct RenderArgs {
    /// JSON file with an Email/get response, an email array, or one email
    file: Option<PathBuf>,
    /// Total response budget in characters
    #[arg(short = 'm', long = "max-chars")]
    max_chars: Option<i64>,
    /// Per-email body limit in characters
    #[arg(short = 'b', long = "max-body-chars")]
    max_body_chars: Option<i64>,
    /// Dump all raw headers instead of the summary block
    #[arg(long = "full-headers")]
    full_headers: bool,
}

#[derive(Debug, Args)]
struct ListArgs {
    file: Option<PathBuf>,
    /// Total match count to report (defaults to the number of emails)
    #[arg(long)]
    total: Option<u64>,
    /// Raw header to show under each row (repeatable)
    #[arg(long = "header", value_name = "NAME")]
    headers: Vec<String>,
}

#[derive(Debug, Args)]
struct BodyArgs {
    file: Option<PathBuf>,
    /// Treat the input as HTML even if it does not look like it
    #[arg(long)]
    html: bool,
    #[arg(short = 'b', long = "max-body-chars")]
    max_body_chars: Option<i64>,
}

#[derive(Debug, Args)]
struct TruncateArgs {
    file: Option<PathBuf>,
    #[arg(short = 'l', long)]
    limit: usize,
}

#[derive(Debug, Subcommand)]
enum ConfigCommand {
    Show,
    Path,
    Reset,
}

#[derive(Debug, Clone, Args)]
struct InitCommand {
    #[arg(long = "force")]
    force: bool,
}

#[derive(Debug, Clone)]
struct RuntimeContext {
    common: CommonOpts,
    paths: AppPaths,
    config: AppConfig,
}

impl RuntimeContext {
    fn new(common: CommonOpts) -> Result<Self> {
        let paths = AppPaths::discover(common.config.clone()).map_err(|e| anyhow!("{e}"))?;
        let config = AppConfig::load(&paths).map_err(|e| anyhow!("{e}"))?;
        Ok(Self {
            common,
            paths,
            config,
        })
    }

    fn init_logging(&self) -> Result<()> {
        if self.common.quiet {
            log::set_max_level(LevelFilter::Off);
            return Ok(());
        }

        let mut builder =
            env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));

        builder.filter_level(self.effective_log_level());

        let force_color = matches!(self.common.color, ColorOption::Always)
            || env::var_os("FORCE_COLOR").is_some();
        let disable_color = self.common.no_color
            || matches!(self.common.color, ColorOption::Never)
            || env::var_os("NO_COLOR").is_some();

        if disable_color {
            builder.write_style(WriteStyle::Never);
        } else if force_color {
            builder.write_style(WriteStyle::Always);
        } else {
            builder.write_style(WriteStyle::Auto);
        }

        if self.common.diagnostics {
            builder.format_timestamp_millis();
            builder.format_module_path(true);
            builder.format_target(true);
        }

        builder.try_init().or_else(|err| {
            if self.common.verbose > 0 {
                eprintln!("logger already initialized: {err}");
            }
            Ok(())
        })
    }

    fn effective_log_level(&self) -> LevelFilter {
        if self.common.trace {
            LevelFilter::Trace
        } else if self.common.debug {
            LevelFilter::Debug
        } else {
            match self.common.verbose {
                0 => LevelFilter::Info,
                1 => LevelFilter::Debug,
                _ => LevelFilter::Trace,
            }
        }
    }

    /// Config with per-command limit overrides applied.
    fn config_with(&self, max_body_chars: Option<i64>, max_chars: Option<i64>) -> AppConfig {
        let mut config = self.config.clone();
        if let Some(max) = max_body_chars {
            config.body.max_body_chars = max;
        }
        if let Some(max) = max_chars {
            config.body.max_response_chars = max;
        }
        config
    }
}

fn handle_render(ctx: &RuntimeContext, args: RenderArgs) -> Result<()> {
    let config = ctx.config_with(args.max_body_chars, args.max_chars);
    let input = read_input(args.file.as_ref())?;
    let emails = parse_emails(&input).context("parsing email payload")?;
    if emails.is_empty() {
        return Err(anyhow!("no emails found in input"));
    }

    let mut options = ResponseOptions::from_config(&config);
    options.full_headers |= args.full_headers;
    let pipeline = BodyPipeline::new(&config);
    let allocation = build_email_response(&emails, &options, &pipeline);

    if !allocation.is_complete() {
        warn!(
            "{} of {} emails omitted to stay within {} chars; reduce the batch size",
            allocation.omitted,
            allocation.total,
            options.effective_max_chars()
        );
    }

    if ctx.common.json || ctx.common.yaml {
        return emit_output(&ctx.common, &allocation);
    }
    println!("{}", allocation.output);
    Ok(())
}

fn handle_list(args: ListArgs) -> Result<()> {
    let input = read_input(args.file.as_ref())?;
    let emails = parse_emails(&input).context("parsing email payload")?;
    let total = args.total.unwrap_or(emails.len() as u64);
    print!("{}", render_query_summary(total, &emails, &args.headers));
    Ok(())
}

fn handle_body(ctx: &RuntimeContext, args: BodyArgs) -> Result<()> {
    let config = ctx.config_with(args.max_body_chars, None);
    let input = read_input(args.file.as_ref())?;
    let bodies = if args.html || looks_like_html(&input) {
        RawBodies::html(input)
    } else {
        RawBodies::plain(input)
    };
    let text = BodyPipeline::new(&config).normalize(&bodies);
    println!("{text}");
    Ok(())
}

fn handle_strip_quotes(args: InputArgs) -> Result<()> {
    let input = read_input(args.file.as_ref())?;
    println!("{}", strip_blockquotes(&input));
    Ok(())
}

fn handle_truncate(ctx: &RuntimeContext, args: TruncateArgs) -> Result<()> {
    let input = read_input(args.file.as_ref())?;
    let pipeline = BodyPipeline::new(&ctx.config);
    println!("{}", pipeline.truncate(&input, args.limit));
    Ok(())
}

fn handle_config(ctx: &RuntimeContext, command: ConfigCommand) -> Result<()> {
    match command {
        ConfigCommand::Show => emit_output(&ctx.common, &ctx.config),
        ConfigCommand::Path => {
            match ctx.paths.effective_config() {
                Some(path) => println!("{}", path.display()),
                None => println!("{} (not created)", ctx.paths.global_config.display()),
            }
            Ok(())
        }
        ConfigCommand::Reset => {
            AppConfig::write_default(&ctx.paths.global_config).map_err(|e| anyhow!("{e}"))
        }
    }
}

fn handle_init(ctx: &RuntimeContext, cmd: InitCommand) -> Result<()> {
    let path = &ctx.paths.global_config;
    let overwrite = cmd.force || ctx.common.assume_yes;
    if ctx.common.dry_run {
        println!("dry-run: would write default config to {}", path.display());
        return Ok(());
    }
    if overwrite {
        AppConfig::write_default(path).map_err(|e| anyhow!("{e}"))?;
    } else {
        if path.exists() {
            info!("config already exists at {} (use --force to overwrite)", path.display());
        }
        AppConfig::ensure_default(path).map_err(|e| anyhow!("{e}"))?;
    }
    println!("{}", path.display());
    Ok(())
}

fn handle_completions(shell: Shell) -> Result<()> {
    let mut cmd = Cli::command();
    clap_complete::generate(shell, &mut cmd, APP_NAME, &mut io::stdout());
    Ok(())
}

/// Guess whether a raw body is HTML.
fn looks_like_html(body: &str) -> bool {
    let trimmed = body.trim_start();
    let lower = trimmed
        .get(..trimmed.len().min(512))
        .unwrap_or(trimmed)
        .to_ascii_lowercase();
    lower.starts_with("<!doctype")
        || lower.starts_with("<html")
        || lower.contains("<body")
        || lower.contains("<blockquote")
        || (lower.starts_with('<') && (lower.contains("<p>") || lower.contains("<div")))
}

fn read_input(path: Option<&PathBuf>) -> Result<String> {
    match path {
        Some(p) => fs::read_to_string(p).with_context(|| format!("reading input from {}", p.display())),
        None => {
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .context("reading input from stdin")?;
            Ok(buffer)
        }
    }
}

fn emit_output<T: ?Sized + Serialize + std::fmt::Debug>(
    opts: &CommonOpts,
    value: &T,
) -> Result<()> {
    if opts.json {
        let json = serde_json::to_string_pretty(value)?;
        println!("{json}");
        return Ok(());
    }
    let yaml = serde_yaml::to_string(value)?;
    print!("{yaml}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_looks_like_html() {
        assert!(looks_like_html("<!DOCTYPE html><html></html>"));
        assert!(looks_like_html("  <HTML><body>x</body></HTML>"));
        assert!(looks_like_html("<p>Hello</p><blockquote>q</blockquote>"));
        assert!(looks_like_html("<div>hi</div>"));
        assert!(!looks_like_html("Plain text with a < sign"));
        assert!(!looks_like_html("Hi,\n\nsee you at 5."));
    }

    #[test]
    fn test_cli_parses_render_flags() {
        let cli = Cli::try_parse_from([
            "mailfold",
            "--json",
            "render",
            "emails.json",
            "--max-chars",
            "1000",
            "--full-headers",
        ])
        .unwrap();
        assert!(cli.common.json);
        match cli.command {
            Command::Render(args) => {
                assert_eq!(args.file, Some(PathBuf::from("emails.json")));
                assert_eq!(args.max_chars, Some(1000));
                assert!(args.full_headers);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }
}
