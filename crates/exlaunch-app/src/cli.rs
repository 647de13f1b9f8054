//! Argument parsing and command dispatch for `electrumx-launch`.

use std::ffi::OsString;
use std::io::{self, Write};
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use exlaunch_config::{ConfigLoader, EnvSource, LaunchConfig, ProcessEnv, check_config};
use exlaunch_telemetry::{GlobalContextGuard, LogFormat, LoggingConfig, init_logging};
use tracing::{info, warn};

use crate::bootstrap::launch;
use crate::error::{AppError, AppResult};
use crate::output::{render_check, render_crontab, render_env, render_launch};

#[derive(Parser)]
#[command(
    name = "electrumx-launch",
    version,
    about = "Configure and start an ElectrumX server in the background"
)]
struct Cli {
    #[arg(
        long,
        global = true,
        help = "YAML configuration file (falls back to EXLAUNCH_CONFIG)"
    )]
    config: Option<PathBuf>,
    #[arg(long, global = true, env = "EXLAUNCH_LOG_FORMAT", value_enum)]
    log_format: Option<LogFormatArg>,
    #[arg(
        long = "output",
        alias = "format",
        global = true,
        value_enum,
        default_value_t = OutputFormat::Table,
        help = "Select output format for commands that render structured data"
    )]
    output: OutputFormat,
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Raise the descriptor limit and start the server detached (default).
    Start(StartArgs),
    /// Report problems with the resolved configuration.
    Check,
    /// Print the environment the server would be started with.
    Env(EnvArgs),
    /// Print an `@reboot` crontab line for this launcher.
    Crontab,
}

impl Command {
    const fn label(&self) -> &'static str {
        match self {
            Self::Start(_) => "start",
            Self::Check => "check",
            Self::Env(_) => "env",
            Self::Crontab => "crontab",
        }
    }
}

#[derive(Args, Default)]
struct StartArgs {
    /// Refuse to launch when the advisory checks report errors.
    #[arg(long)]
    check: bool,
}

#[derive(Args)]
struct EnvArgs {
    /// Print the daemon URL password instead of masking it.
    #[arg(long)]
    show_secrets: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    Table,
    Json,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum LogFormatArg {
    Pretty,
    Json,
}

impl From<LogFormatArg> for LogFormat {
    fn from(value: LogFormatArg) -> Self {
        match value {
            LogFormatArg::Pretty => Self::Pretty,
            LogFormatArg::Json => Self::Json,
        }
    }
}

/// Parses arguments from the process, installs logging, and runs the
/// requested command. Returns the process exit code.
#[must_use]
pub fn run() -> i32 {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let _ = err.print();
            return err.exit_code();
        }
    };

    let logging = LoggingConfig {
        format: cli.log_format.map_or_else(LogFormat::infer, LogFormat::from),
        ..LoggingConfig::default()
    };
    if let Err(source) = init_logging(&logging) {
        let err = AppError::telemetry("telemetry.init", source);
        eprintln!("error: {}", err.display_message());
        return err.exit_code();
    }
    let _context = GlobalContextGuard::new(command_label(cli.command.as_ref()));

    let stdout = io::stdout();
    let mut out = stdout.lock();
    match dispatch(cli, &ProcessEnv, &mut out) {
        Ok(()) => 0,
        Err(err) => {
            eprintln!("error: {}", err.display_message());
            err.exit_code()
        }
    }
}

/// Parse `args` and run the command against an explicit environment and
/// output sink. Logging is left to the caller.
///
/// # Errors
///
/// Returns an error when parsing, configuration loading, checking, launching
/// or writing output fails.
pub fn execute<I, T, E, W>(args: I, env: &E, out: &mut W) -> AppResult<()>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
    E: EnvSource,
    W: Write,
{
    let cli = Cli::try_parse_from(args).map_err(|source| AppError::Usage { source })?;
    dispatch(cli, env, out)
}

fn command_label(command: Option<&Command>) -> &'static str {
    command.map_or("start", Command::label)
}

fn dispatch<E: EnvSource, W: Write>(cli: Cli, env: &E, out: &mut W) -> AppResult<()> {
    let loader = ConfigLoader::new(env).with_file(cli.config);
    let command = cli
        .command
        .unwrap_or_else(|| Command::Start(StartArgs::default()));

    match command {
        Command::Start(args) => {
            let config = load(&loader)?;
            if args.check {
                preflight(&config, cli.output, out)?;
            }
            let server = launch(&config)?;
            info!(pid = server.pid(), "server started in background");
            render_launch(&server, cli.output, out)
        }
        Command::Check => {
            let config = load(&loader)?;
            let report = check_config(&config);
            render_check(&report, cli.output, out)?;
            if report.has_errors() {
                return Err(AppError::CheckFailed {
                    errors: report.error_count(),
                });
            }
            Ok(())
        }
        Command::Env(args) => {
            let config = load(&loader)?;
            render_env(&config, args.show_secrets, cli.output, out)
        }
        Command::Crontab => {
            let launcher = std::env::current_exe().map_err(|source| AppError::Io {
                operation: "launcher.current_exe",
                path: None,
                source,
            })?;
            let config_file = loader
                .file_path()
                .map(|path| {
                    std::path::absolute(&path).map_err(|source| AppError::Io {
                        operation: "config.absolute_path",
                        path: Some(path),
                        source,
                    })
                })
                .transpose()?;
            render_crontab(&launcher, config_file.as_deref(), out)
        }
    }
}

fn load<E: EnvSource>(loader: &ConfigLoader<'_, E>) -> AppResult<LaunchConfig> {
    loader
        .load()
        .map_err(|source| AppError::config("config.load", source))
}

fn preflight<W: Write>(config: &LaunchConfig, format: OutputFormat, out: &mut W) -> AppResult<()> {
    let report = check_config(config);
    for finding in &report.findings {
        warn!(
            severity = finding.severity.as_str(),
            field = %finding.field,
            message = %finding.message,
            "configuration finding"
        );
    }
    if report.has_errors() {
        render_check(&report, format, out)?;
        return Err(AppError::CheckFailed {
            errors: report.error_count(),
        });
    }
    Ok(())
}
