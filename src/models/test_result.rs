use anyhow::{Result, anyhow};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString, IntoEnumIterator, IntoStaticStr};

use crate::helpers::find_similar;

/// Status a harness records for one action.
#[derive(
    Debug,
    Clone,
    Copy,
    Serialize,
    Deserialize,
    PartialEq,
    Eq,
    Hash,
    AsRefStr,
    Display,
    EnumIter,
    EnumString,
    IntoStaticStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum TestResult {
    Unsupported,
    CompileFailed,
    ExecFailed,
    ExecTimeout,
    Error,
    Success,
}

impl TestResult {
    /// Whether an outcome carrying this result is worth judging. Skipped
    /// (unsupported) actions are not.
    pub fn matters(self) -> bool {
        match self {
            Self::Unsupported => false,
            Self::CompileFailed
            | Self::ExecFailed
            | Self::ExecTimeout
            | Self::Error
            | Self::Success => true,
        }
    }

    /// Parses a result name, suggesting the closest known name on a typo.
    pub fn parse(name: &str) -> Result<Self> {
        name.parse().map_err(|_| {
            let known: Vec<&str> = Self::iter().map(<&'static str>::from).collect();
            match find_similar(name, &known) {
                Some(suggestion) => {
                    anyhow!("Unknown result: {name}\nDid you mean: {suggestion}")
                }
                None => anyhow!("Unknown result: {name}\nExpected one of: {}", known.join(", ")),
            }
        })
    }
}
