use chrono::DateTime;

use super::message::{
    is_sd_name_char, validate_header_field, Message, SdParam, StructuredData, MAX_APP_NAME_LEN,
    MAX_HOSTNAME_LEN, MAX_MESSAGE_ID_LEN, MAX_PRIORITY, MAX_PROC_ID_LEN,
};
use super::{SyslogError, SyslogResult};

const BOM: char = '\u{feff}';

/// Parse one RFC-5424 message (without framing).
pub fn parse(input: &str) -> SyslogResult<Message> {
    let mut cursor = Cursor { input, pos: 0 };

    let priority = cursor.priority()?;
    let version = cursor.token();
    if version != "1" {
        return Err(SyslogError::UnsupportedVersion(version.to_string()));
    }
    cursor.space()?;

    let timestamp = match cursor.token() {
        "-" => None,
        raw => Some(DateTime::parse_from_rfc3339(raw)?),
    };
    cursor.space()?;

    let hostname = cursor.header_field("hostname", MAX_HOSTNAME_LEN)?;
    let app_name = cursor.header_field("app name", MAX_APP_NAME_LEN)?;
    let proc_id = cursor.header_field("proc id", MAX_PROC_ID_LEN)?;
    let message_id = cursor.header_field("message id", MAX_MESSAGE_ID_LEN)?;
    let structured_data = cursor.structured_data()?;

    let message = if cursor.at_end() {
        String::new()
    } else {
        cursor.space()?;
        cursor.rest().trim_start_matches(BOM).to_string()
    };

    Ok(Message {
        priority,
        timestamp,
        hostname,
        app_name,
        proc_id,
        message_id,
        structured_data,
        message,
    })
}

struct Cursor<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn remaining(&self) -> &'a str {
        &self.input[self.pos..]
    }

    fn at_end(&self) -> bool {
        self.pos >= self.input.len()
    }

    fn peek(&self) -> Option<char> {
        self.remaining().chars().next()
    }

    fn malformed(&self, reason: &'static str) -> SyslogError {
        SyslogError::Malformed {
            position: self.pos,
            reason,
        }
    }

    fn expect(&mut self, expected: char, reason: &'static str) -> SyslogResult<()> {
        if self.peek() == Some(expected) {
            self.pos += expected.len_utf8();
            Ok(())
        } else {
            Err(self.malformed(reason))
        }
    }

    fn space(&mut self) -> SyslogResult<()> {
        self.expect(' ', "expected space")
    }

    /// Characters up to the next space or end of input.
    fn token(&mut self) -> &'a str {
        let rest = self.remaining();
        let len = rest.find(' ').unwrap_or(rest.len());
        self.pos += len;
        &rest[..len]
    }

    fn take_while(&mut self, pred: impl Fn(char) -> bool) -> &'a str {
        let rest = self.remaining();
        let len = rest.find(|c| !pred(c)).unwrap_or(rest.len());
        self.pos += len;
        &rest[..len]
    }

    fn rest(&mut self) -> &'a str {
        let rest = self.remaining();
        self.pos = self.input.len();
        rest
    }

    fn priority(&mut self) -> SyslogResult<u8> {
        self.expect('<', "expected '<'")?;
        let digits = self.take_while(|c| c.is_ascii_digit());
        if digits.is_empty() || digits.len() > 3 {
            return Err(self.malformed("priority must be 1 to 3 digits"));
        }
        self.expect('>', "expected '>'")?;

        let value: u16 = digits
            .parse()
            .map_err(|_| self.malformed("priority must be 1 to 3 digits"))?;
        u8::try_from(value)
            .ok()
            .filter(|p| *p <= MAX_PRIORITY)
            .ok_or(SyslogError::InvalidPriority(value))
    }

    fn header_field(&mut self, field: &'static str, max: usize) -> SyslogResult<String> {
        let raw = self.token();
        self.space()?;
        if raw.is_empty() {
            return Err(self.malformed("empty header field"));
        }
        if raw == "-" {
            return Ok(String::new());
        }
        validate_header_field(field, raw, max)?;
        Ok(raw.to_string())
    }

    fn structured_data(&mut self) -> SyslogResult<Vec<StructuredData>> {
        match self.peek() {
            Some('-') => {
                self.pos += 1;
                Ok(Vec::new())
            }
            Some('[') => {
                let mut elements = Vec::new();
                while self.peek() == Some('[') {
                    elements.push(self.sd_element()?);
                }
                Ok(elements)
            }
            _ => Err(self.malformed("expected structured data")),
        }
    }

    fn sd_element(&mut self) -> SyslogResult<StructuredData> {
        self.expect('[', "expected '['")?;
        let id = self.sd_name()?;
        let mut params = Vec::new();

        loop {
            match self.peek() {
                Some(']') => {
                    self.pos += 1;
                    return Ok(StructuredData { id, params });
                }
                Some(' ') => {
                    self.pos += 1;
                    let name = self.sd_name()?;
                    self.expect('=', "expected '='")?;
                    let value = self.param_value()?;
                    params.push(SdParam { name, value });
                }
                _ => return Err(self.malformed("unterminated structured data element")),
            }
        }
    }

    fn sd_name(&mut self) -> SyslogResult<String> {
        let name = self.take_while(|c| is_sd_name_char(c) && c != ' ');
        if name.is_empty() {
            return Err(self.malformed("empty structured data name"));
        }
        Ok(name.to_string())
    }

    fn param_value(&mut self) -> SyslogResult<String> {
        self.expect('"', "expected '\"'")?;
        let mut value = String::new();
        let mut chars = self.remaining().char_indices();

        while let Some((offset, c)) = chars.next() {
            match c {
                '"' => {
                    self.pos += offset + 1;
                    return Ok(value);
                }
                '\\' => match chars.next() {
                    Some((_, escaped @ ('"' | '\\' | ']'))) => value.push(escaped),
                    // Only three characters are escapable; anything else keeps its backslash.
                    Some((_, other)) => {
                        value.push('\\');
                        value.push(other);
                    }
                    None => break,
                },
                _ => value.push(c),
            }
        }
        Err(self.malformed("unterminated parameter value"))
    }
}
