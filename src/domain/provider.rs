use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Processor {
    Default,
    Fallback,
}

impl Processor {
    /// Probe and summary order: default first.
    pub const ALL: [Processor; 2] = [Processor::Default, Processor::Fallback];

    pub fn as_str(&self) -> &'static str {
        match self {
            Processor::Default => "default",
            Processor::Fallback => "fallback",
        }
    }

    pub fn other(self) -> Self {
        match self {
            Processor::Default => Processor::Fallback,
            Processor::Fallback => Processor::Default,
        }
    }
}

impl fmt::Display for Processor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Processor {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "default" | "d" => Ok(Processor::Default),
            "fallback" | "f" => Ok(Processor::Fallback),
            other => Err(anyhow::anyhow!("unknown processor '{}'", other)),
        }
    }
}

/// Which provider this process currently believes is healthy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderState {
    Unknown,
    Default,
    Fallback,
}

impl ProviderState {
    pub fn processor(self) -> Option<Processor> {
        match self {
            ProviderState::Unknown => None,
            ProviderState::Default => Some(Processor::Default),
            ProviderState::Fallback => Some(Processor::Fallback),
        }
    }

    pub fn as_u8(self) -> u8 {
        match self {
            ProviderState::Unknown => 0,
            ProviderState::Default => 1,
            ProviderState::Fallback => 2,
        }
    }

    pub fn from_u8(v: u8) -> Self {
        match v {
            1 => ProviderState::Default,
            2 => ProviderState::Fallback,
            _ => ProviderState::Unknown,
        }
    }
}

impl From<Processor> for ProviderState {
    fn from(p: Processor) -> Self {
        match p {
            Processor::Default => ProviderState::Default,
            Processor::Fallback => ProviderState::Fallback,
        }
    }
}
