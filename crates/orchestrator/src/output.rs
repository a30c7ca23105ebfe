//! Result row formatting for standard output

use std::fmt;
use std::str::FromStr;

use triager_common::{ProbeResult, TriagerError, TriagerResult};

/// How each probe result is printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// `domain,ip,port,protocol,status,headers,body,size`
    #[default]
    Csv,
    /// One JSON object per line
    Json,
}

impl OutputFormat {
    pub fn format_row(&self, result: &ProbeResult) -> TriagerResult<String> {
        match self {
            OutputFormat::Csv => Ok(result.to_string()),
            OutputFormat::Json => {
                serde_json::to_string(result).map_err(|e| TriagerError::Parse(e.to_string()))
            }
        }
    }
}

impl FromStr for OutputFormat {
    type Err = TriagerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "csv" | "c" | "" => Ok(OutputFormat::Csv),
            "json" | "j" => Ok(OutputFormat::Json),
            other => Err(TriagerError::Config(format!("unknown output format '{}'", other))),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Csv => f.write_str("csv"),
            OutputFormat::Json => f.write_str("json"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::{IpAddr, Ipv4Addr};
    use triager_common::{ProbeTarget, ResponseStatus};

    fn sample() -> ProbeResult {
        ProbeResult::new(
            &ProbeTarget::https("example.com", 443),
            IpAddr::V4(Ipv4Addr::new(93, 184, 216, 34)),
        )
        .with_status(ResponseStatus::Code(200))
        .with_body(b"ok")
    }

    #[test]
    fn csv_row() {
        let row = OutputFormat::Csv.format_row(&sample()).unwrap();
        assert_eq!(row, "example.com,93.184.216.34,443,https,200,null,ok,2");
    }

    #[test]
    fn json_row() {
        let row = OutputFormat::Json.format_row(&sample()).unwrap();
        let v: serde_json::Value = serde_json::from_str(&row).unwrap();
        assert_eq!(v["domain"], "example.com");
        assert_eq!(v["status"], "200");
        assert_eq!(v["response_size"], 2);
    }

    #[test]
    fn parse_formats() {
        assert_eq!("CSV".parse::<OutputFormat>().unwrap(), OutputFormat::Csv);
        assert_eq!(" json ".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert!("table".parse::<OutputFormat>().is_err());
        assert_eq!(OutputFormat::default().to_string(), "csv");
    }
}
