use zkrelay_schema::{document, Side, ValidationConfig};

use crate::cmd::SchemaArgs;
use crate::exit::{CliError, CliResult, INTERNAL, SUCCESS};

pub fn run(args: SchemaArgs) -> CliResult<i32> {
    let config = ValidationConfig {
        strict_mode: args.strict,
        ..ValidationConfig::default()
    };
    let doc = document(Side::from(args.side), &config);
    let text = serde_json::to_string_pretty(&doc)
        .map_err(|err| CliError::new(INTERNAL, format!("schema render failed: {err}")))?;
    println!("{text}");
    Ok(SUCCESS)
}
