use std::path::Path;

use zkrelay_schema::{InputFormat, InterfaceValidator, SchemaError, Side, ValidatedDataBag};

use crate::cmd::ValidateArgs;
use crate::exit::{schema_error, CliResult, DATA_INVALID, SUCCESS};
use crate::output::{print_validation, OutputFormat, ValidationReport, VALIDATION_REPORT_SCHEMA_ID};

pub fn run(args: ValidateArgs, format: OutputFormat) -> CliResult<i32> {
    let side = Side::from(args.side);
    let input = if args.raw {
        InputFormat::Raw
    } else {
        InputFormat::Json
    };
    let validator = InterfaceValidator::with_config(args.config())
        .map_err(|err| schema_error("validate failed", err))?;
    let source = args.path.display().to_string();

    let result = read_and_validate(&validator, side, input, &args.path);
    let report = build_report(side, source, result)?;
    print_validation(&report, format);

    if report.valid {
        Ok(SUCCESS)
    } else {
        Ok(DATA_INVALID)
    }
}

fn read_and_validate(
    validator: &InterfaceValidator,
    side: Side,
    input: InputFormat,
    path: &Path,
) -> Result<ValidatedDataBag, SchemaError> {
    if path == Path::new("-") {
        validator.validate_reader(side, input, std::io::stdin().lock())
    } else {
        validator.validate_file(side, input, path)
    }
}

/// Turn a validation outcome into a report. Errors other than a rejected
/// databag abort the command.
fn build_report(
    side: Side,
    source: String,
    result: Result<ValidatedDataBag, SchemaError>,
) -> CliResult<ValidationReport> {
    let (valid, violations, databag) = match result {
        Ok(accepted) => {
            let databag = accepted
                .to_databag()
                .map_err(|err| schema_error("serialize failed", err))?;
            tracing::info!(side = %side, source = %source, "databag valid");
            (true, Vec::new(), Some(databag))
        }
        Err(SchemaError::ValidationFailed { violations, .. }) => {
            tracing::warn!(
                side = %side,
                source = %source,
                violations = violations.len(),
                "databag invalid"
            );
            (false, violations, None)
        }
        Err(err) => return Err(schema_error("validate failed", err)),
    };

    Ok(ValidationReport {
        schema_id: VALIDATION_REPORT_SCHEMA_ID,
        side,
        source,
        valid,
        violations,
        databag,
    })
}
