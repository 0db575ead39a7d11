use clap::{Args, Subcommand, ValueEnum};
use std::path::PathBuf;
use zkrelay_schema::{Side, ValidationConfig};

use crate::exit::CliResult;
use crate::output::OutputFormat;

pub mod endpoints;
pub mod schema;
pub mod validate;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Validate a databag file against one side of the relation.
    Validate(ValidateArgs),
    /// Print the JSON Schema for one side of the relation.
    Schema(SchemaArgs),
    /// Parse a comma-separated endpoint list.
    Endpoints(EndpointsArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Validate(args) => validate::run(args, format),
        Command::Schema(args) => schema::run(args),
        Command::Endpoints(args) => endpoints::run(args, format),
        Command::Version(args) => version::run(args),
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum SideArg {
    Provider,
    Requirer,
}

impl From<SideArg> for Side {
    fn from(value: SideArg) -> Self {
        match value {
            SideArg::Provider => Side::Provider,
            SideArg::Requirer => Side::Requirer,
        }
    }
}

#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Databag file to read, or `-` for stdin.
    pub path: PathBuf,
    /// Relation side the databag belongs to.
    #[arg(long, short = 's')]
    pub side: SideArg,
    /// Input is a flat app databag of string values, as stored in relation data.
    #[arg(long)]
    pub raw: bool,
    /// Reject keys outside the schema.
    #[arg(long, env = "ZKRELAY_STRICT")]
    pub strict: bool,
    /// Stop at the first violation.
    #[arg(long, env = "ZKRELAY_FAIL_FAST")]
    pub fail_fast: bool,
    /// Maximum databag size in bytes.
    #[arg(long, value_name = "BYTES")]
    pub max_size: Option<usize>,
}

impl ValidateArgs {
    pub fn config(&self) -> ValidationConfig {
        let defaults = ValidationConfig::default();
        ValidationConfig {
            strict_mode: self.strict,
            fail_fast: self.fail_fast,
            max_databag_size: self.max_size.unwrap_or(defaults.max_databag_size),
            ..defaults
        }
    }
}

#[derive(Args, Debug)]
pub struct SchemaArgs {
    /// Relation side to describe.
    #[arg(long, short = 's')]
    pub side: SideArg,
    /// Close every object schema with `additionalProperties: false`.
    #[arg(long, env = "ZKRELAY_STRICT")]
    pub strict: bool,
}

#[derive(Args, Debug)]
pub struct EndpointsArgs {
    /// Comma-separated `ip[:port]` entries.
    pub list: String,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}
