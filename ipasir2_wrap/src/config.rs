//! Settings of solver options, as given in text.
//!
//! A setting is written `name=value`, or `name[index]=value` for an indexed option.
//! The values `true` and `false` are read as 1 and 0.
//!
//! ```rust
//! # use ipasir2_wrap::config::OptionSetting;
//! let setting: OptionSetting = "phase[12]=-1".parse().unwrap();
//! assert_eq!(setting.name, "phase");
//! assert_eq!(setting.value, -1);
//! assert_eq!(setting.index, 12);
//!
//! let setting: OptionSetting = "restarts=false".parse().unwrap();
//! assert_eq!(setting.value, 0);
//! assert_eq!(setting.index, 0);
//! ```

use std::str::FromStr;

use crate::{
    misc::log::targets::{self},
    solver::Solver,
    types::err::{self},
};

/// A value for an option of a solver.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OptionSetting {
    pub name: String,

    pub value: i64,

    /// The index of the setting, always zero for an option which is not indexed.
    pub index: i64,
}

impl OptionSetting {
    pub fn new(name: impl Into<String>, value: i64) -> Self {
        OptionSetting {
            name: name.into(),
            value,
            index: 0,
        }
    }

    pub fn indexed(name: impl Into<String>, index: i64, value: i64) -> Self {
        OptionSetting {
            name: name.into(),
            value,
            index,
        }
    }
}

impl std::fmt::Display for OptionSetting {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.index {
            0 => write!(f, "{}={}", self.name, self.value),
            index => write!(f, "{}[{index}]={}", self.name, self.value),
        }
    }
}

/// Reasons a setting could not be read.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("expected a setting of the form name=value")]
    MissingValue,

    #[error("the setting has no name")]
    MissingName,

    #[error("'{0}' is not a value")]
    InvalidValue(String),

    #[error("'{0}' is not an index")]
    InvalidIndex(String),
}

fn parse_value(value: &str) -> Result<i64, ParseError> {
    match value {
        "true" => Ok(1),
        "false" => Ok(0),
        _ => value
            .parse()
            .map_err(|_| ParseError::InvalidValue(value.to_string())),
    }
}

impl FromStr for OptionSetting {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let Some((name, value)) = s.split_once('=') else {
            return Err(ParseError::MissingValue);
        };

        let (name, value) = (name.trim(), value.trim());
        let value = parse_value(value)?;

        let (name, index) = match name.strip_suffix(']').and_then(|n| n.split_once('[')) {
            Some((name, index)) => match index.trim().parse() {
                Ok(index) => (name.trim_end(), index),
                Err(_) => return Err(ParseError::InvalidIndex(index.to_string())),
            },
            None => (name, 0),
        };

        if name.is_empty() {
            return Err(ParseError::MissingName);
        }

        Ok(OptionSetting {
            name: name.to_string(),
            value,
            index,
        })
    }
}

impl Solver<'_> {
    /// Applies each setting, in order, stopping at the first setting which fails.
    pub fn configure<'s, I>(&mut self, settings: I) -> Result<(), err::ErrorKind>
    where
        I: IntoIterator<Item = &'s OptionSetting>,
    {
        for setting in settings {
            log::debug!(target: targets::OPTIONS, "Applying {setting}");
            self.set_option_by_name(&setting.name, setting.value, setting.index)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_settings() {
        assert_eq!(
            "restarts=100".parse::<OptionSetting>(),
            Ok(OptionSetting::new("restarts", 100))
        );
        assert_eq!(
            " elim = true ".parse::<OptionSetting>(),
            Ok(OptionSetting::new("elim", 1))
        );
    }

    #[test]
    fn indexed_settings() {
        assert_eq!(
            "phase[3]=-1".parse::<OptionSetting>(),
            Ok(OptionSetting::indexed("phase", 3, -1))
        );
        assert_eq!(
            "phase[x]=1".parse::<OptionSetting>(),
            Err(ParseError::InvalidIndex("x".to_string()))
        );
    }

    #[test]
    fn malformed_settings() {
        assert_eq!("restarts".parse::<OptionSetting>(), Err(ParseError::MissingValue));
        assert_eq!("=1".parse::<OptionSetting>(), Err(ParseError::MissingName));
        assert_eq!(
            "restarts=often".parse::<OptionSetting>(),
            Err(ParseError::InvalidValue("often".to_string()))
        );
    }

    #[test]
    fn display() {
        assert_eq!(OptionSetting::new("restarts", 5).to_string(), "restarts=5");
        assert_eq!(OptionSetting::indexed("phase", 2, 1).to_string(), "phase[2]=1");
    }
}
