use zkrelay_schema::Endpoints;

use crate::cmd::EndpointsArgs;
use crate::exit::{endpoint_error, CliResult, SUCCESS};
use crate::output::{
    print_endpoints, EndpointRow, EndpointsReport, OutputFormat, ENDPOINTS_REPORT_SCHEMA_ID,
};

pub fn run(args: EndpointsArgs, format: OutputFormat) -> CliResult<i32> {
    let report = build_report(&args.list)?;
    print_endpoints(&report, format);
    Ok(SUCCESS)
}

fn build_report(list: &str) -> CliResult<EndpointsReport> {
    let endpoints =
        Endpoints::parse(list).map_err(|err| endpoint_error("invalid endpoint list", err))?;
    tracing::debug!(count = endpoints.len(), "endpoint list parsed");

    Ok(EndpointsReport {
        schema_id: ENDPOINTS_REPORT_SCHEMA_ID,
        endpoints: endpoints
            .endpoints()
            .iter()
            .enumerate()
            .map(|(index, endpoint)| EndpointRow::new(index, endpoint))
            .collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exit::DATA_INVALID;

    #[test]
    fn report_lists_every_endpoint() {
        let report = build_report("10.141.78.133:2181,[fd00::1]:2181,10.141.78.45")
            .expect("list should parse");
        assert_eq!(report.endpoints.len(), 3);
        assert_eq!(report.endpoints[1].family, "ipv6");
        assert_eq!(report.endpoints[2].port, None);
    }

    #[test]
    fn malformed_list_is_data_invalid() {
        let err = build_report("10.141.78.133:99999").expect_err("port out of range");
        assert_eq!(err.code, DATA_INVALID);
        assert!(err.message.contains("out of range"));
    }
}
