//! Partner sponsorship tier.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Sponsorship tier, ordered from highest to lowest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "partner_tier", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PartnerTier {
    Platinum,
    Gold,
    Silver,
    Community,
}

impl PartnerTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Platinum => "platinum",
            Self::Gold => "gold",
            Self::Silver => "silver",
            Self::Community => "community",
        }
    }
}

impl fmt::Display for PartnerTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for PartnerTier {
    type Err = comhub_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "platinum" => Ok(Self::Platinum),
            "gold" => Ok(Self::Gold),
            "silver" => Ok(Self::Silver),
            "community" => Ok(Self::Community),
            _ => Err(comhub_core::AppError::invalid_field(
                "tier",
                format!("Invalid partner tier '{s}'. Expected one of: platinum, gold, silver, community"),
            )),
        }
    }
}
