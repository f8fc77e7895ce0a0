//! Response language tag

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// Language the assistant answers in
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    /// English
    #[default]
    En,
    /// Roman Urdu (Urdu written in the Latin alphabet)
    Ur,
}

impl Language {
    /// Wire tag (`en` / `ur`)
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Ur => "ur",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Language {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "en" => Ok(Language::En),
            "ur" => Ok(Language::Ur),
            other => Err(Error::invalid_input(format!("Unsupported language: {}", other))),
        }
    }
}
