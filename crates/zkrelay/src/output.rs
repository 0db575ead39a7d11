use std::io::IsTerminal;

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use serde::Serialize;
use serde_json::Value;
use zkrelay_schema::{Endpoint, Side, Violation};

// Report identifiers, versioned with the report layout.
pub const VALIDATION_REPORT_SCHEMA_ID: &str = "urn:zkrelay:cli:validation-report:v1";
pub const ENDPOINTS_REPORT_SCHEMA_ID: &str = "urn:zkrelay:cli:endpoints-report:v1";

#[derive(Clone, Debug, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
    Raw,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ValidationReport {
    pub schema_id: &'static str,
    pub side: Side,
    pub source: String,
    pub valid: bool,
    pub violations: Vec<Violation>,
    /// Canonical wire mapping of an accepted databag.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub databag: Option<Value>,
}

pub fn print_validation(report: &ValidationReport, format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(report),
        OutputFormat::Table => {
            if report.valid {
                println!("{} databag {}: valid", report.side, report.source);
                return;
            }
            let mut table = new_table(vec!["FIELD", "KIND", "MESSAGE"]);
            for violation in &report.violations {
                table.add_row(vec![
                    violation.field.clone(),
                    violation.kind.as_str().to_string(),
                    violation.message.clone(),
                ]);
            }
            println!("{} databag {}: invalid", report.side, report.source);
            println!("{table}");
        }
        OutputFormat::Pretty => {
            let verdict = if report.valid { "valid" } else { "invalid" };
            println!(
                "side={} source={} result={verdict}",
                report.side, report.source
            );
            for violation in &report.violations {
                println!("  [{}] {violation}", violation.kind.as_str());
            }
        }
        OutputFormat::Raw => {
            println!("{}", if report.valid { "valid" } else { "invalid" });
        }
    }
}

#[derive(Debug, Serialize)]
pub struct EndpointRow {
    pub index: usize,
    pub ip: String,
    pub port: Option<u16>,
    pub family: &'static str,
}

impl EndpointRow {
    pub fn new(index: usize, endpoint: &Endpoint) -> Self {
        Self {
            index,
            ip: endpoint.ip.to_string(),
            port: endpoint.port,
            family: if endpoint.ip.is_ipv4() { "ipv4" } else { "ipv6" },
        }
    }
}

#[derive(Debug, Serialize)]
pub struct EndpointsReport {
    pub schema_id: &'static str,
    pub endpoints: Vec<EndpointRow>,
}

pub fn print_endpoints(report: &EndpointsReport, format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(report),
        OutputFormat::Table => {
            let mut table = new_table(vec!["#", "IP", "PORT", "FAMILY"]);
            for row in &report.endpoints {
                table.add_row(vec![
                    row.index.to_string(),
                    row.ip.clone(),
                    port_text(row.port),
                    row.family.to_string(),
                ]);
            }
            println!("{table}");
        }
        OutputFormat::Pretty => {
            for row in &report.endpoints {
                println!(
                    "endpoint={} ip={} port={} family={}",
                    row.index,
                    row.ip,
                    port_text(row.port),
                    row.family
                );
            }
        }
        OutputFormat::Raw => {
            for row in &report.endpoints {
                println!("{}\t{}", row.ip, port_text(row.port));
            }
        }
    }
}

fn port_text(port: Option<u16>) -> String {
    port.map(|p| p.to_string()).unwrap_or_else(|| "-".to_string())
}

fn new_table(header: Vec<&str>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header);
    table
}

fn print_json<T: Serialize>(value: &T) {
    println!(
        "{}",
        serde_json::to_string(value).unwrap_or_else(|_| "{}".to_string())
    );
}
