//! Team and moniker naming.

use crate::error::{ValidationError, ValidationResult};
use std::fmt;

/// The `(team, moniker)` pair that names an application within an account.
///
/// Both tokens are lowercase alphanumeric with inner hyphens, at least two
/// characters long. Together with the account string this pair uniquely
/// addresses an application.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TeamMoniker {
    team: String,
    moniker: String,
}

impl TeamMoniker {
    pub fn new(team: &str, moniker: &str) -> ValidationResult<Self> {
        let team = validated_token("team", team)?;
        let moniker = validated_token("moniker", moniker)?;
        Ok(Self { team, moniker })
    }

    pub fn team(&self) -> &str {
        &self.team
    }

    pub fn moniker(&self) -> &str {
        &self.moniker
    }
}

impl fmt::Display for TeamMoniker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.team, self.moniker)
    }
}

/// Validate a naming token against `^[a-z0-9][a-z0-9-]*[a-z0-9]$`.
fn validated_token(field: &'static str, value: &str) -> ValidationResult<String> {
    if value.is_empty() {
        return Err(ValidationError::MissingRequired(field));
    }
    if value.len() < 2 {
        return Err(ValidationError::invalid_format(
            field,
            "must be at least 2 characters",
        ));
    }
    let valid_chars = value
        .bytes()
        .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-');
    if !valid_chars || value.starts_with('-') || value.ends_with('-') {
        return Err(ValidationError::invalid_format(
            field,
            "must be lowercase alphanumeric with inner hyphens",
        ));
    }
    Ok(value.to_string())
}
