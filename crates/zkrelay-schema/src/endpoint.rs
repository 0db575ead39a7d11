use std::fmt;
use std::net::{IpAddr, Ipv6Addr, SocketAddr};
use std::num::IntErrorKind;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{EndpointError, EndpointListError};

/// One ZooKeeper server address, `ip` or `ip:port`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Endpoint {
    pub ip: IpAddr,
    pub port: Option<u16>,
}

impl Endpoint {
    pub fn new(ip: IpAddr, port: Option<u16>) -> Self {
        Self { ip, port }
    }

    /// Socket address for this endpoint, if it carries a port.
    pub fn socket_addr(&self) -> Option<SocketAddr> {
        self.port.map(|port| SocketAddr::new(self.ip, port))
    }
}

impl FromStr for Endpoint {
    type Err = EndpointError;

    /// Parse `ip`, `ip:port`, `[v6]` or `[v6]:port`.
    ///
    /// The address and port are split at the first `:`. An empty port
    /// segment (`10.0.0.1:`) means no port. Strings that are a complete IP
    /// literal on their own (bare IPv6 included) carry no port. Brackets
    /// only enclose IPv6 addresses.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        if let Some(rest) = value.strip_prefix('[') {
            let (host, tail) = rest
                .split_once(']')
                .ok_or_else(|| EndpointError::UnclosedBracket(value.to_string()))?;
            let ip = host
                .parse::<Ipv6Addr>()
                .map(IpAddr::V6)
                .map_err(|source| EndpointError::InvalidAddress {
                    address: host.to_string(),
                    source,
                })?;
            let port = match tail {
                "" => None,
                tail => match tail.strip_prefix(':') {
                    Some(port) => parse_port(port)?,
                    None => return Err(EndpointError::TrailingCharacters(tail.to_string())),
                },
            };
            return Ok(Self { ip, port });
        }

        if let Ok(ip) = value.parse::<IpAddr>() {
            return Ok(Self { ip, port: None });
        }

        let (host, port) = match value.split_once(':') {
            Some((host, port)) => (host, Some(port)),
            None => (value, None),
        };
        let ip = parse_ip(host)?;
        let port = match port {
            Some(port) => parse_port(port)?,
            None => None,
        };
        Ok(Self { ip, port })
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.socket_addr() {
            Some(addr) => write!(f, "{addr}"),
            None => write!(f, "{}", self.ip),
        }
    }
}

fn parse_ip(address: &str) -> Result<IpAddr, EndpointError> {
    address
        .parse()
        .map_err(|source| EndpointError::InvalidAddress {
            address: address.to_string(),
            source,
        })
}

fn parse_port(port: &str) -> Result<Option<u16>, EndpointError> {
    if port.is_empty() {
        return Ok(None);
    }

    let value: i64 = port.parse().map_err(|source: std::num::ParseIntError| {
        match source.kind() {
            IntErrorKind::PosOverflow | IntErrorKind::NegOverflow => {
                EndpointError::PortOutOfRange(port.to_string())
            }
            _ => EndpointError::PortNotNumeric {
                port: port.to_string(),
                source,
            },
        }
    })?;

    u16::try_from(value)
        .map(Some)
        .map_err(|_| EndpointError::PortOutOfRange(port.to_string()))
}

/// A validated comma-separated endpoint list.
///
/// Parsing is a gate only: the value kept is the original string, and
/// [`Endpoints::endpoints`] parses it again for callers that need the
/// structure.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Endpoints(String);

impl Endpoints {
    /// Validate every entry of `value`, reporting the first malformed one.
    pub fn parse(value: impl Into<String>) -> Result<Self, EndpointListError> {
        let value = value.into();
        if let Some(err) = invalid_entries(&value).into_iter().next() {
            return Err(err);
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }

    /// Parse the list into its endpoints.
    pub fn endpoints(&self) -> Vec<Endpoint> {
        self.0
            .split(',')
            .filter_map(|entry| entry.parse().ok())
            .collect()
    }

    /// Number of entries in the list.
    pub fn len(&self) -> usize {
        self.0.split(',').count()
    }

    /// Always false: a validated list holds at least one endpoint, since an
    /// empty string is itself a malformed entry.
    pub fn is_empty(&self) -> bool {
        false
    }
}

/// Every malformed entry of a comma-separated endpoint list, in order.
pub fn invalid_entries(value: &str) -> Vec<EndpointListError> {
    value
        .split(',')
        .enumerate()
        .filter_map(|(index, entry)| {
            entry
                .parse::<Endpoint>()
                .err()
                .map(|source| EndpointListError {
                    index,
                    entry: entry.to_string(),
                    source,
                })
        })
        .collect()
}

impl FromStr for Endpoints {
    type Err = EndpointListError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::parse(value)
    }
}

impl TryFrom<String> for Endpoints {
    type Error = EndpointListError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<Endpoints> for String {
    fn from(value: Endpoints) -> Self {
        value.0
    }
}

impl AsRef<str> for Endpoints {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Endpoints {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
