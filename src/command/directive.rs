//! Directive Parsing
//!
//! Turns one line of the command language into a typed directive.
//!
//! ```text
//! GET: <name>
//! PUT: <name>\MAX-AGE: <integer>
//! ```

use std::fmt;

use crate::error::{CacheError, Result};

const GET_PREFIX: &str = "GET: ";
const PUT_PREFIX: &str = "PUT: ";
const AGE_SEPARATOR: char = '\\';
const AGE_PREFIX: &str = "MAX-AGE: ";

// == Directive ==
/// A parsed cache command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Directive {
    /// Fetch a cached file and write it to its output name
    Get { name: String },
    /// Cache a file, or change the max-age of an already cached one
    Put { name: String, max_age: i64 },
}

impl Directive {
    // == Parse ==
    /// Parses a single command line.
    ///
    /// Trailing whitespace (including a CR from CRLF files) is ignored.
    ///
    /// # Errors
    /// `MalformedCommand` for unknown prefixes, an empty name, a missing
    /// `\MAX-AGE: ` section, or an age that is not a decimal integer.
    pub fn parse(line: &str) -> Result<Self> {
        let line = line.trim_end();

        if let Some(name) = line.strip_prefix(GET_PREFIX) {
            if name.is_empty() {
                return Err(malformed(line, "missing file name"));
            }
            return Ok(Directive::Get {
                name: name.to_string(),
            });
        }

        if let Some(rest) = line.strip_prefix(PUT_PREFIX) {
            let (name, age_section) = rest
                .split_once(AGE_SEPARATOR)
                .ok_or_else(|| malformed(line, "missing '\\' separator"))?;
            if name.is_empty() {
                return Err(malformed(line, "missing file name"));
            }
            let age = age_section
                .strip_prefix(AGE_PREFIX)
                .ok_or_else(|| malformed(line, "missing MAX-AGE field"))?;
            let max_age = age
                .parse::<i64>()
                .map_err(|_| malformed(line, "max-age is not an integer"))?;

            return Ok(Directive::Put {
                name: name.to_string(),
                max_age,
            });
        }

        Err(malformed(line, "unknown directive"))
    }
}

impl fmt::Display for Directive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Directive::Get { name } => write!(f, "{GET_PREFIX}{name}"),
            Directive::Put { name, max_age } => {
                write!(f, "{PUT_PREFIX}{name}{AGE_SEPARATOR}{AGE_PREFIX}{max_age}")
            }
        }
    }
}

fn malformed(line: &str, reason: &str) -> CacheError {
    CacheError::MalformedCommand(format!("{reason}: {line:?}"))
}
