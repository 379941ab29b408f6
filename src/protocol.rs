use crate::{Error, Result};
use serde::Serialize;

/// Fixed request token the hub sends to solicit a status line.
pub const STATUS_REQUEST: &str = "STATUS";
/// Command asking the node to collapse its min/max envelope to the current value.
pub const RESET_COMMAND: &str = "RESET";
/// Prefix for the display-message command; the text follows on the same line.
pub const MESSAGE_PREFIX: &str = "MSG:";

/// One humidity sample from the node: the live value plus the min/max
/// envelope the node has tracked since its last reset.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Reading {
    pub current: f32,
    pub minimum: f32,
    pub maximum: f32,
}

/// Decode a status response line of the form `H=<num>;MIN=<num>;MAX=<num>`.
///
/// The final field carries no required trailing delimiter, but its value
/// bytes must be present. Any garbage input yields `Error::Parse`, never a
/// panic.
pub fn parse_status_line(line: &str) -> Result<Reading> {
    let mut fields = line.split(';');
    let current = parse_field(fields.next(), "H=")?;
    let minimum = parse_field(fields.next(), "MIN=")?;
    let maximum = parse_field(fields.next(), "MAX=")?;
    // A single trailing delimiter is tolerated; anything beyond it is not.
    if let Some(extra) = fields.next() {
        if !extra.is_empty() || fields.next().is_some() {
            return Err(Error::Parse(format!(
                "unexpected bytes after MAX field: '{extra}'"
            )));
        }
    }
    Ok(Reading {
        current,
        minimum,
        maximum,
    })
}

fn parse_field(field: Option<&str>, label: &str) -> Result<f32> {
    let field = field.ok_or_else(|| Error::Parse(format!("missing {label} field")))?;
    let digits = field
        .trim()
        .strip_prefix(label)
        .ok_or_else(|| Error::Parse(format!("expected {label} prefix in '{field}'")))?;
    if digits.is_empty() {
        return Err(Error::Parse(format!("{label} field has no value")));
    }
    let value: f32 = digits
        .parse()
        .map_err(|_| Error::Parse(format!("{label} value '{digits}' is not a number")))?;
    if !value.is_finite() {
        return Err(Error::Parse(format!("{label} value '{digits}' is not finite")));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_labeled_status_line() {
        let reading = parse_status_line("H=41.5;MIN=30.0;MAX=72.0").unwrap();
        assert_eq!(
            reading,
            Reading {
                current: 41.5,
                minimum: 30.0,
                maximum: 72.0
            }
        );
    }

    #[test]
    fn parses_integer_and_negative_values() {
        let reading = parse_status_line("H=5;MIN=-2;MAX=10").unwrap();
        assert_eq!(reading.current, 5.0);
        assert_eq!(reading.minimum, -2.0);
        assert_eq!(reading.maximum, 10.0);
    }

    #[test]
    fn tolerates_trailing_delimiter_and_spaces() {
        let reading = parse_status_line("H=1.0; MIN=0.5; MAX=2.0;").unwrap();
        assert_eq!(reading.minimum, 0.5);
    }

    #[test]
    fn rejects_missing_max_field() {
        let err = parse_status_line("H=41.5;MIN=30.0").unwrap_err();
        assert!(format!("{err}").contains("MAX="));
    }

    #[test]
    fn rejects_final_field_without_value() {
        let err = parse_status_line("H=41.5;MIN=30.0;MAX=").unwrap_err();
        assert!(format!("{err}").contains("no value"));
    }

    #[test]
    fn rejects_unknown_label() {
        let err = parse_status_line("H=1.0;LOW=0.5;MAX=2.0").unwrap_err();
        assert!(format!("{err}").contains("MIN="));
    }

    #[test]
    fn rejects_non_numeric_value() {
        assert!(parse_status_line("H=abc;MIN=0;MAX=1").is_err());
    }

    #[test]
    fn rejects_non_finite_values() {
        assert!(parse_status_line("H=inf;MIN=0;MAX=1").is_err());
        assert!(parse_status_line("H=1;MIN=NaN;MAX=1").is_err());
    }

    #[test]
    fn rejects_extra_fields() {
        assert!(parse_status_line("H=1;MIN=0;MAX=2;X=9").is_err());
    }

    #[test]
    fn rejects_empty_and_garbage_lines() {
        assert!(parse_status_line("").is_err());
        assert!(parse_status_line("not a status line").is_err());
    }
}
