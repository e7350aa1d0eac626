//! Binary entry point for the tugpattern CLI.
//!
//! All output is JSON on stdout, including errors; logs go to stderr.
//!
//! ## Usage
//!
//! ```bash
//! # Migrate controller scopes and print the rewritten tree
//! tugpattern run --input controller.json --recipe scope-to-this
//!
//! # Chain recipes and write each output tree into a directory
//! tugpattern run --input foo.service.json --recipe scope-to-this \
//!     --recipe service-mocks --output-dir out/
//!
//! # List built-in kinds and bundled recipes
//! tugpattern kinds
//! tugpattern recipes
//! ```

use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};

use tugpattern::cli::{list_kinds, list_recipes, run_recipes, RunRequest};
use tugpattern::config::{CliOverrides, ResolvedConfig};
use tugpattern::error::{OutputErrorCode, TugPatternError};
use tugpattern::output::{emit_response, ErrorResponse};
use tugpattern_core::KindTable;

// ============================================================================
// CLI Structure
// ============================================================================

/// Declarative tree rewrites for syntax-tree migrations.
///
/// Trees are read and written as JSON documents keyed by kind name.
#[derive(Parser, Debug)]
#[command(
    name = "tugpattern",
    version,
    about = "Declarative tree rewrites for syntax-tree migrations"
)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,
    #[command(subcommand)]
    command: Command,
}

/// Global arguments shared by all subcommands.
#[derive(Parser, Debug)]
struct GlobalArgs {
    /// Log level for tracing output (`RUST_LOG` takes precedence).
    #[arg(long, global = true, value_enum, default_value = "warn")]
    log_level: LogLevel,

    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    log_json: bool,
}

/// Log level for tracing output.
#[derive(Clone, Copy, Debug, ValueEnum)]
enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    fn to_tracing_level(self) -> tracing::Level {
        match self {
            LogLevel::Trace => tracing::Level::TRACE,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Error => tracing::Level::ERROR,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run recipes over a JSON tree.
    Run {
        /// JSON tree to rewrite.
        #[arg(long)]
        input: PathBuf,
        /// Recipe to run (repeat to chain, in order).
        #[arg(long = "recipe", required = true)]
        recipes: Vec<String>,
        /// Write each output tree to `<dir>/<name>.json` instead of inlining it.
        #[arg(long)]
        output_dir: Option<PathBuf>,
        /// Constructor parameter to migrate away from (default: `$scope`).
        #[arg(long)]
        scope_param: Option<String>,
        /// Name of the replacement parameter (default: `rootScope`).
        #[arg(long)]
        renamed_param: Option<String>,
        /// Token for the replacement's `@Inject` decorator (default: `$rootScope`).
        #[arg(long)]
        inject_token: Option<String>,
        /// What feeds the next recipe when one outputs a bundle: whole, primary, halt.
        #[arg(long)]
        bundle_feed: Option<String>,
    },
    /// List the built-in kind table.
    Kinds,
    /// List the bundled recipes.
    Recipes,
}

// ============================================================================
// Main Entry Point
// ============================================================================

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize tracing
    init_tracing(cli.global.log_level, cli.global.log_json);

    // Execute command and handle errors
    match execute(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let error_code = OutputErrorCode::from(&err);
            let response = ErrorResponse::from_error(&err);

            // Errors go to stdout as JSON, like every other response
            let _ = emit_response(&response, &mut io::stdout());
            let _ = io::stdout().flush();

            ExitCode::from(error_code.code())
        }
    }
}

/// Initialize tracing subscriber.
fn init_tracing(level: LogLevel, json: bool) {
    use tracing_subscriber::fmt::format::FmtSpan;
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.to_tracing_level().to_string()));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_span_events(FmtSpan::CLOSE)
        .with_target(false)
        .with_writer(io::stderr);

    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

/// Execute the CLI command.
fn execute(cli: Cli) -> Result<(), TugPatternError> {
    let kinds = KindTable::typescript();
    match cli.command {
        Command::Run {
            input,
            recipes,
            output_dir,
            scope_param,
            renamed_param,
            inject_token,
            bundle_feed,
        } => {
            let overrides = CliOverrides {
                scope_param,
                renamed_param,
                inject_token,
                bundle_feed,
            };
            let request = RunRequest {
                input,
                recipes,
                output_dir,
                config: ResolvedConfig::resolve(&overrides)?,
            };
            emit(&run_recipes(&request, kinds)?)
        }
        Command::Kinds => emit(&list_kinds(kinds)),
        Command::Recipes => emit(&list_recipes()),
    }
}

fn emit<T: serde::Serialize>(response: &T) -> Result<(), TugPatternError> {
    emit_response(response, &mut io::stdout())
        .map_err(|e| TugPatternError::internal(format!("failed to write output: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    mod parsing {
        use super::*;

        #[test]
        fn parse_run_with_chained_recipes() {
            let cli = Cli::try_parse_from([
                "tugpattern",
                "run",
                "--input",
                "tree.json",
                "--recipe",
                "scope-to-this",
                "--recipe",
                "service-mocks",
            ])
            .unwrap();
            match cli.command {
                Command::Run {
                    input,
                    recipes,
                    output_dir,
                    bundle_feed,
                    ..
                } => {
                    assert_eq!(input, PathBuf::from("tree.json"));
                    assert_eq!(recipes, ["scope-to-this", "service-mocks"]);
                    assert!(output_dir.is_none());
                    assert!(bundle_feed.is_none());
                }
                other => panic!("unexpected command: {:?}", other),
            }
        }

        #[test]
        fn parse_run_requires_recipe() {
            let result = Cli::try_parse_from(["tugpattern", "run", "--input", "tree.json"]);
            assert!(result.is_err());
        }

        #[test]
        fn parse_run_overrides() {
            let cli = Cli::try_parse_from([
                "tugpattern",
                "run",
                "--input",
                "tree.json",
                "--recipe",
                "scope-to-this",
                "--scope-param",
                "scopeParam",
                "--bundle-feed",
                "primary",
                "--output-dir",
                "out",
            ])
            .unwrap();
            match cli.command {
                Command::Run {
                    scope_param,
                    bundle_feed,
                    output_dir,
                    ..
                } => {
                    assert_eq!(scope_param.as_deref(), Some("scopeParam"));
                    assert_eq!(bundle_feed.as_deref(), Some("primary"));
                    assert_eq!(output_dir, Some(PathBuf::from("out")));
                }
                other => panic!("unexpected command: {:?}", other),
            }
        }

        #[test]
        fn parse_global_log_flags() {
            let cli = Cli::try_parse_from([
                "tugpattern",
                "kinds",
                "--log-level",
                "debug",
                "--log-json",
            ])
            .unwrap();
            assert!(matches!(cli.global.log_level, LogLevel::Debug));
            assert!(cli.global.log_json);
            assert!(matches!(cli.command, Command::Kinds));
        }

        #[test]
        fn default_log_level_is_warn() {
            let cli = Cli::try_parse_from(["tugpattern", "recipes"]).unwrap();
            assert_eq!(cli.global.log_level.to_tracing_level(), tracing::Level::WARN);
            assert!(!cli.global.log_json);
        }
    }
}
