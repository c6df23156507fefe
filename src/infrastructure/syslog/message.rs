use std::fmt::Write as _;

use chrono::{DateTime, FixedOffset};

use super::{SyslogError, SyslogResult};

pub const MAX_PRIORITY: u8 = 191;
pub const MAX_HOSTNAME_LEN: usize = 255;
pub const MAX_APP_NAME_LEN: usize = 48;
pub const MAX_PROC_ID_LEN: usize = 128;
pub const MAX_MESSAGE_ID_LEN: usize = 32;

const NIL: &str = "-";
const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6f%:z";

/// One RFC-5424 message.
///
/// Empty header strings stand for the NILVALUE `-`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Message {
    pub priority: u8,
    pub timestamp: Option<DateTime<FixedOffset>>,
    pub hostname: String,
    pub app_name: String,
    pub proc_id: String,
    pub message_id: String,
    pub structured_data: Vec<StructuredData>,
    pub message: String,
}

/// An SD-ELEMENT: `[id name="value" ...]`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StructuredData {
    pub id: String,
    pub params: Vec<SdParam>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SdParam {
    pub name: String,
    pub value: String,
}

impl StructuredData {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            params: Vec::new(),
        }
    }

    pub fn param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.push(SdParam {
            name: name.into(),
            value: value.into(),
        });
        self
    }
}

impl Message {
    /// Check header limits and structured-data names.
    pub fn validate(&self) -> SyslogResult<()> {
        if self.priority > MAX_PRIORITY {
            return Err(SyslogError::InvalidPriority(u16::from(self.priority)));
        }
        validate_header_field("hostname", &self.hostname, MAX_HOSTNAME_LEN)?;
        validate_header_field("app name", &self.app_name, MAX_APP_NAME_LEN)?;
        validate_header_field("proc id", &self.proc_id, MAX_PROC_ID_LEN)?;
        validate_header_field("message id", &self.message_id, MAX_MESSAGE_ID_LEN)?;

        for element in &self.structured_data {
            validate_sd_name(&element.id)?;
            for param in &element.params {
                validate_sd_name(&param.name)?;
            }
        }
        Ok(())
    }

    /// Serialize to the RFC-5424 wire form.
    pub fn to_rfc5424(&self) -> SyslogResult<String> {
        self.validate()?;

        let timestamp = self
            .timestamp
            .map_or_else(|| NIL.to_string(), |ts| ts.format(TIMESTAMP_FORMAT).to_string());

        let mut out = format!(
            "<{}>1 {} {} {} {} {} ",
            self.priority,
            timestamp,
            nil_if_empty(&self.hostname),
            nil_if_empty(&self.app_name),
            nil_if_empty(&self.proc_id),
            nil_if_empty(&self.message_id),
        );

        if self.structured_data.is_empty() {
            out.push_str(NIL);
        }
        for element in &self.structured_data {
            out.push('[');
            out.push_str(&element.id);
            for param in &element.params {
                // Writing into a String cannot fail.
                let _ = write!(out, " {}=\"{}\"", param.name, escape_param_value(&param.value));
            }
            out.push(']');
        }

        if !self.message.is_empty() {
            out.push(' ');
            out.push_str(&self.message);
        }
        Ok(out)
    }
}

fn nil_if_empty(value: &str) -> &str {
    if value.is_empty() {
        NIL
    } else {
        value
    }
}

pub(super) fn is_printable_ascii(c: char) -> bool {
    ('!'..='~').contains(&c)
}

pub(super) fn validate_header_field(
    field: &'static str,
    value: &str,
    max: usize,
) -> SyslogResult<()> {
    if value.len() > max {
        return Err(SyslogError::FieldTooLong { field, max });
    }
    if !value.chars().all(is_printable_ascii) {
        return Err(SyslogError::NonPrintable { field });
    }
    Ok(())
}

pub(super) fn is_sd_name_char(c: char) -> bool {
    is_printable_ascii(c) && !matches!(c, '=' | ']' | '"')
}

pub(super) fn validate_sd_name(name: &str) -> SyslogResult<()> {
    if name.is_empty() || !name.chars().all(is_sd_name_char) {
        return Err(SyslogError::InvalidSdName(name.to_string()));
    }
    Ok(())
}

/// Backslash-escape `\`, `"` and `]` in a PARAM-VALUE.
pub fn escape_param_value(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '\\' | '"' | ']') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_fields_serialize_as_nil() {
        let msg = Message {
            priority: 14,
            ..Message::default()
        };
        assert_eq!(msg.to_rfc5424().unwrap(), "<14>1 - - - - - -");
    }

    #[test]
    fn test_param_values_are_escaped() {
        assert_eq!(escape_param_value(r#"a"b\c]d"#), r#"a\"b\\c\]d"#);
    }

    #[test]
    fn test_priority_limit() {
        let msg = Message {
            priority: 192,
            ..Message::default()
        };
        assert!(matches!(
            msg.to_rfc5424(),
            Err(SyslogError::InvalidPriority(192))
        ));
    }

    #[test]
    fn test_app_name_limit() {
        let msg = Message {
            app_name: "a".repeat(49),
            ..Message::default()
        };
        assert!(matches!(
            msg.validate(),
            Err(SyslogError::FieldTooLong {
                field: "app name",
                max: 48
            })
        ));
    }

    #[test]
    fn test_hostname_must_be_printable() {
        let msg = Message {
            hostname: "my host".to_string(),
            ..Message::default()
        };
        assert!(matches!(
            msg.validate(),
            Err(SyslogError::NonPrintable { field: "hostname" })
        ));
    }

    #[test]
    fn test_sd_names_reject_reserved_characters() {
        for bad in ["a=b", "a]b", "a\"b", "a b", ""] {
            assert!(validate_sd_name(bad).is_err(), "{bad:?} should be rejected");
        }
        let long_name = "x".repeat(64);
        assert!(validate_sd_name(&long_name).is_ok());
        assert!(validate_sd_name("origin@48577").is_ok());
    }
}
