//! Commit identities.

use serde::{Deserialize, Serialize};
use std::fmt;

/// An author or committer line from a commit or tag.
///
/// Git writes identities as `Name <email> <unix seconds> <+hhmm>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonIdent {
    /// Display name, possibly empty.
    pub name: String,
    /// Email address without angle brackets, possibly empty.
    pub email: String,
    /// Seconds since the unix epoch.
    pub when: i64,
    /// Timezone offset from UTC in minutes.
    pub tz_offset: i32,
}

impl PersonIdent {
    /// Creates an identity at the given time in UTC.
    pub fn new(name: impl Into<String>, email: impl Into<String>, when: i64) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            when,
            tz_offset: 0,
        }
    }

    /// Parses an identity line, without its `author ` / `committer ` keyword.
    ///
    /// Missing timestamps parse as zero; a line without `<` has no email.
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }

        let (name, rest) = match (line.find('<'), line.rfind('>')) {
            (Some(open), Some(close)) if open < close => (
                line[..open].trim(),
                Some((&line[open + 1..close], line[close + 1..].trim())),
            ),
            _ => (line, None),
        };

        let Some((email, tail)) = rest else {
            return Some(Self::new(name, "", 0));
        };

        let mut parts = tail.split_whitespace();
        let when = parts.next().and_then(|s| s.parse().ok()).unwrap_or(0);
        let tz_offset = parts.next().map(parse_tz_offset).unwrap_or(0);

        Some(Self {
            name: name.to_string(),
            email: email.trim().to_string(),
            when,
            tz_offset,
        })
    }

    /// Formats the identity the way git writes it.
    pub fn to_header(&self) -> String {
        let sign = if self.tz_offset < 0 { '-' } else { '+' };
        let offset = self.tz_offset.abs();
        format!(
            "{} <{}> {} {}{:02}{:02}",
            self.name,
            self.email,
            self.when,
            sign,
            offset / 60,
            offset % 60
        )
    }
}

impl fmt::Display for PersonIdent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.email.is_empty() {
            write!(f, "{}", self.name)
        } else {
            write!(f, "{} <{}>", self.name, self.email)
        }
    }
}

fn parse_tz_offset(s: &str) -> i32 {
    let (sign, digits) = match s.as_bytes().first() {
        Some(b'-') => (-1, &s[1..]),
        Some(b'+') => (1, &s[1..]),
        _ => (1, s),
    };
    if digits.len() != 4 {
        return 0;
    }
    let hours: i32 = digits[..2].parse().unwrap_or(0);
    let minutes: i32 = digits[2..].parse().unwrap_or(0);
    sign * (hours * 60 + minutes)
}
