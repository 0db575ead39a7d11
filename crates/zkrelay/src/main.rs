mod cmd;
mod exit;
mod logging;
mod output;

use clap::Parser;

use crate::cmd::Command;
use crate::logging::{init_logging, LogFormat, LogLevel};
use crate::output::OutputFormat;

#[derive(Parser, Debug)]
#[command(name = "zkrelay", version, about = "zookeeper_client relation databag validator")]
struct Cli {
    /// Output format.
    #[arg(long, value_name = "FORMAT", global = true)]
    format: Option<OutputFormat>,

    /// Log output format (stderr).
    #[arg(long, value_name = "FORMAT", default_value = "text", global = true)]
    log_format: LogFormat,

    /// Minimum log level (stderr). `ZKRELAY_LOG` overrides it with a full filter.
    #[arg(long, value_name = "LEVEL", default_value = "info", global = true)]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Command,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.log_format, cli.log_level);

    let format = cli.format.unwrap_or_else(OutputFormat::default_for_stdout);
    let result = cmd::run(cli.command, format);

    match result {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(err.code);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cmd::SideArg;

    #[test]
    fn parses_validate_subcommand() {
        let cli = Cli::try_parse_from([
            "zkrelay",
            "validate",
            "/tmp/provider.json",
            "--side",
            "provider",
            "--strict",
        ])
        .expect("validate args should parse");

        match cli.command {
            Command::Validate(args) => {
                assert_eq!(args.side, SideArg::Provider);
                assert!(args.config().strict_mode);
                assert!(!args.config().fail_fast);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn validate_requires_side() {
        let err = Cli::try_parse_from(["zkrelay", "validate", "/tmp/provider.json"])
            .expect_err("missing --side should fail");

        assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn parses_schema_subcommand() {
        let cli = Cli::try_parse_from(["zkrelay", "schema", "-s", "requirer"])
            .expect("schema args should parse");
        assert!(matches!(cli.command, Command::Schema(_)));
    }

    #[test]
    fn max_size_overrides_default() {
        let cli = Cli::try_parse_from([
            "zkrelay",
            "validate",
            "-",
            "--side",
            "requirer",
            "--raw",
            "--max-size",
            "128",
        ])
        .expect("validate args should parse");

        match cli.command {
            Command::Validate(args) => {
                assert!(args.raw);
                assert_eq!(args.config().max_databag_size, 128);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
