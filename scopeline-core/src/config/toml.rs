//! Minimal TOML parser for scope configuration
//!
//! Handles only the subset `scope.toml` needs and never allocates. It does
//! NOT support arrays or nested tables.
//!
//! Supported:
//! - `[section]` headers (`acquisition`, `display`, `serial`, `adc`)
//! - `key = value` with decimal or `0x` hex integers (`_` separators allowed),
//!   booleans and double-quoted strings
//! - Comments (`# ...`), whole-line or trailing
//!
//! Unknown sections and keys are rejected so typos do not silently fall
//! back to defaults.

use scopeline_hal::transport::{DataBits, Parity, StopBits};

use super::types::{OneShotPolicy, ScopeConfig, TraceMode};

/// What went wrong on a line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ParseErrorKind {
    /// Malformed `[section]` header
    InvalidSection,
    UnknownSection,
    UnknownKey,
    /// Key/value pair before any section header
    KeyOutsideSection,
    /// Line is neither a header nor `key = value`
    MalformedLine,
    /// Value has the wrong type or is out of range
    InvalidValue,
}

/// Parse error with its 1-based line number
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ParseError {
    pub line: usize,
    pub kind: ParseErrorKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Root,
    Acquisition,
    Display,
    Serial,
    Adc,
}

/// Parse `scope.toml` text into a configuration
///
/// Keys that are not present keep their [`ScopeConfig::default`] values.
pub fn parse_config(input: &str) -> Result<ScopeConfig, ParseError> {
    let mut config = ScopeConfig::default();
    let mut section = Section::Root;

    for (number, raw) in input.lines().enumerate() {
        let at = |kind| ParseError {
            line: number + 1,
            kind,
        };
        let line = strip_comment(raw).trim();

        if line.is_empty() {
            continue;
        }

        if let Some(header) = line.strip_prefix('[') {
            let name = header
                .strip_suffix(']')
                .ok_or(at(ParseErrorKind::InvalidSection))?;
            section = parse_section_header(name.trim()).map_err(at)?;
            continue;
        }

        let (key, value) = parse_key_value(line).ok_or(at(ParseErrorKind::MalformedLine))?;
        apply_value(section, key, value, &mut config).map_err(at)?;
    }

    Ok(config)
}

/// Drop a trailing `# comment` that is not inside a string
fn strip_comment(line: &str) -> &str {
    let mut in_string = false;
    for (i, c) in line.char_indices() {
        match c {
            '"' => in_string = !in_string,
            '#' if !in_string => return &line[..i],
            _ => {}
        }
    }
    line
}

fn parse_section_header(name: &str) -> Result<Section, ParseErrorKind> {
    match name {
        "acquisition" => Ok(Section::Acquisition),
        "display" => Ok(Section::Display),
        "serial" => Ok(Section::Serial),
        "adc" => Ok(Section::Adc),
        "" => Err(ParseErrorKind::InvalidSection),
        _ => Err(ParseErrorKind::UnknownSection),
    }
}

fn parse_key_value(line: &str) -> Option<(&str, &str)> {
    let (key, value) = line.split_once('=')?;
    let key = key.trim();
    let value = value.trim();

    if key.is_empty() || value.is_empty() {
        return None;
    }

    Some((key, value))
}

/// Parse a double-quoted string value
fn parse_string(value: &str) -> Result<&str, ParseErrorKind> {
    value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .ok_or(ParseErrorKind::InvalidValue)
}

fn parse_bool(value: &str) -> Result<bool, ParseErrorKind> {
    match value {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(ParseErrorKind::InvalidValue),
    }
}

/// Parse a non-negative decimal or `0x` hex integer
fn parse_u32(value: &str) -> Result<u32, ParseErrorKind> {
    let (digits, radix) = match value
        .strip_prefix("0x")
        .or_else(|| value.strip_prefix("0X"))
    {
        Some(hex) => (hex, 16),
        None => (value, 10),
    };

    let mut acc: u32 = 0;
    let mut seen_digit = false;
    for c in digits.chars() {
        if c == '_' {
            continue;
        }
        let d = c.to_digit(radix).ok_or(ParseErrorKind::InvalidValue)?;
        acc = acc
            .checked_mul(radix)
            .and_then(|v| v.checked_add(d))
            .ok_or(ParseErrorKind::InvalidValue)?;
        seen_digit = true;
    }

    if seen_digit {
        Ok(acc)
    } else {
        Err(ParseErrorKind::InvalidValue)
    }
}

fn parse_u16(value: &str) -> Result<u16, ParseErrorKind> {
    u16::try_from(parse_u32(value)?).map_err(|_| ParseErrorKind::InvalidValue)
}

fn parse_one_shot(value: &str) -> Result<OneShotPolicy, ParseErrorKind> {
    match parse_string(value)? {
        "halt" => Ok(OneShotPolicy::Halt),
        "restart" => Ok(OneShotPolicy::Restart),
        _ => Err(ParseErrorKind::InvalidValue),
    }
}

fn parse_trace(value: &str) -> Result<TraceMode, ParseErrorKind> {
    match parse_string(value)? {
        "segmented" => Ok(TraceMode::Segmented),
        "continuous" => Ok(TraceMode::Continuous),
        _ => Err(ParseErrorKind::InvalidValue),
    }
}

fn parse_data_bits(value: &str) -> Result<DataBits, ParseErrorKind> {
    match parse_u32(value)? {
        7 => Ok(DataBits::Seven),
        8 => Ok(DataBits::Eight),
        _ => Err(ParseErrorKind::InvalidValue),
    }
}

fn parse_parity(value: &str) -> Result<Parity, ParseErrorKind> {
    match parse_string(value)? {
        "none" => Ok(Parity::None),
        "even" => Ok(Parity::Even),
        "odd" => Ok(Parity::Odd),
        _ => Err(ParseErrorKind::InvalidValue),
    }
}

fn parse_stop_bits(value: &str) -> Result<StopBits, ParseErrorKind> {
    match parse_u32(value)? {
        1 => Ok(StopBits::One),
        2 => Ok(StopBits::Two),
        _ => Err(ParseErrorKind::InvalidValue),
    }
}

fn apply_value(
    section: Section,
    key: &str,
    value: &str,
    config: &mut ScopeConfig,
) -> Result<(), ParseErrorKind> {
    match section {
        Section::Root => return Err(ParseErrorKind::KeyOutsideSection),
        Section::Acquisition => {
            let a = &mut config.acquisition;
            match key {
                "segments_per_screen" => a.segments_per_screen = parse_u16(value)?,
                "pause_on_wrap" => a.pause_on_wrap = parse_bool(value)?,
                "one_shot" => a.one_shot = parse_one_shot(value)?,
                _ => return Err(ParseErrorKind::UnknownKey),
            }
        }
        Section::Display => {
            let d = &mut config.display;
            match key {
                "width" => d.width = parse_u16(value)?,
                "height" => d.height = parse_u16(value)?,
                "foreground" => d.foreground = parse_u16(value)?,
                "background" => d.background = parse_u16(value)?,
                "trace" => d.trace = parse_trace(value)?,
                _ => return Err(ParseErrorKind::UnknownKey),
            }
        }
        Section::Serial => {
            let s = &mut config.serial;
            match key {
                "baudrate" => s.baudrate = parse_u32(value)?,
                "data_bits" => s.data_bits = parse_data_bits(value)?,
                "parity" => s.parity = parse_parity(value)?,
                "stop_bits" => s.stop_bits = parse_stop_bits(value)?,
                _ => return Err(ParseErrorKind::UnknownKey),
            }
        }
        Section::Adc => match key {
            "vref_mv" => config.adc.vref_mv = parse_u16(value)?,
            _ => return Err(ParseErrorKind::UnknownKey),
        },
    }
    Ok(())
}
