//! GRBL Response Parser
//!
//! Parses the GRBL response lines a probing run cares about: acknowledgments,
//! error and alarm codes, probe reports, settings and free-form messages.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

/// GRBL response types
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GrblResponse {
    /// OK acknowledgment
    Ok,
    /// Error response with error code
    Error(u8),
    /// Alarm response with alarm code
    Alarm(u8),
    /// Probe report (`[PRB:x,y,z:flag]`)
    Probe(ProbeReport),
    /// Setting response ($n=value)
    Setting { number: u16, value: String },
    /// Version information
    Version(String),
    /// Startup message or other text
    Message(String),
}

impl fmt::Display for GrblResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ok => write!(f, "ok"),
            Self::Error(code) => write!(
                f,
                "error:{} ({})",
                code,
                GrblResponseParser::error_description(*code)
            ),
            Self::Alarm(code) => write!(
                f,
                "ALARM:{} ({})",
                code,
                GrblResponseParser::alarm_description(*code)
            ),
            Self::Probe(report) => write!(
                f,
                "probe:{:.3},{:.3},{:.3}:{}",
                report.x, report.y, report.z, report.success as u8
            ),
            Self::Setting { number, value } => write!(f, "setting:${}={}", number, value),
            Self::Version(version) => write!(f, "version:{}", version),
            Self::Message(msg) => write!(f, "message:{}", msg),
        }
    }
}

/// Position reported by a G38.x probe cycle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProbeReport {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    /// Fourth axis, when the firmware reports one
    pub a: Option<f64>,
    /// Whether the probe made contact
    pub success: bool,
}

fn probe_regex() -> &'static Regex {
    static PROBE: OnceLock<Regex> = OnceLock::new();
    PROBE.get_or_init(|| {
        Regex::new(r"\[PRB:([+\-.\d]+),([+\-.\d]+),([+\-.\d]+),?([+\-.\d]+)?:(\d)\]")
            .expect("invalid regex pattern")
    })
}

/// GRBL response parser
#[derive(Debug, Default)]
pub struct GrblResponseParser;

impl GrblResponseParser {
    /// Create a new GRBL response parser
    pub fn new() -> Self {
        Self
    }

    /// Parse a GRBL response line
    pub fn parse(&self, line: &str) -> Option<GrblResponse> {
        let line = line.trim();

        if line.is_empty() {
            return None;
        }

        if line == "ok" {
            return Some(GrblResponse::Ok);
        }

        if let Some(stripped) = line.strip_prefix("error:") {
            if let Ok(code) = stripped.trim().parse::<u8>() {
                return Some(GrblResponse::Error(code));
            }
        }

        // GRBL 1.1 prints "ALARM:n", older builds "alarm:n"
        if let Some(stripped) = line
            .strip_prefix("ALARM:")
            .or_else(|| line.strip_prefix("alarm:"))
        {
            if let Ok(code) = stripped.trim().parse::<u8>() {
                return Some(GrblResponse::Alarm(code));
            }
        }

        if line.contains("PRB") {
            if let Some(report) = Self::parse_probe(line) {
                return Some(GrblResponse::Probe(report));
            }
        }

        if line.starts_with('$') && line.contains('=') {
            if let Some(setting) = self.parse_setting(line) {
                return Some(setting);
            }
        }

        if line.starts_with("Grbl ") {
            return Some(GrblResponse::Version(line.to_string()));
        }

        Some(GrblResponse::Message(line.to_string()))
    }

    /// Parse a `[PRB:...]` report anywhere in the line
    pub fn parse_probe(line: &str) -> Option<ProbeReport> {
        let caps = probe_regex().captures(line)?;
        let x = caps.get(1)?.as_str().parse::<f64>().ok()?;
        let y = caps.get(2)?.as_str().parse::<f64>().ok()?;
        let z = caps.get(3)?.as_str().parse::<f64>().ok()?;
        let a = caps.get(4).and_then(|m| m.as_str().parse::<f64>().ok());
        let success = caps.get(5)?.as_str() == "1";
        Some(ProbeReport { x, y, z, a, success })
    }

    /// Parse a setting response
    fn parse_setting(&self, line: &str) -> Option<GrblResponse> {
        let line = &line[1..]; // Skip '$'
        let (number, value) = line.split_once('=')?;
        let number = number.trim().parse::<u16>().ok()?;
        Some(GrblResponse::Setting {
            number,
            value: value.trim().to_string(),
        })
    }

    /// Get error description
    pub fn error_description(code: u8) -> &'static str {
        match code {
            1 => "Expected command letter",
            2 => "Bad number format",
            3 => "Invalid statement",
            4 => "Negative value",
            5 => "Setting disabled",
            9 => "G-code locked out during alarm or jog state",
            15 => "Travel exceeded",
            20 => "Unsupported or invalid g-code command",
            21 => "Modal group violation",
            22 => "Undefined feed rate",
            23 => "Failed to execute startup block",
            24 => "EEPROM read failed",
            _ => "Unknown error",
        }
    }

    /// Get alarm description
    pub fn alarm_description(code: u8) -> &'static str {
        match code {
            1 => "Hard limit triggered",
            2 => "Soft limit exceeded",
            3 => "Abort during cycle",
            4 => "Probe fail",
            5 => "Probe not triggered",
            6 => "Homing fail",
            7 => "Homing fail pulloff",
            8 => "Spindle control failure",
            9 => "Cooling mist control failure",
            _ => "Unknown alarm",
        }
    }
}
