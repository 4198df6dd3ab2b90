//! Converting recurring amounts to an expected monthly figure.

use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::Error;

/// How often a recurring transaction repeats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    /// Every day.
    Daily,
    /// Every week.
    Weekly,
    /// Every month.
    Monthly,
    /// Every year.
    Yearly,
}

impl Frequency {
    /// The lower-case label stored in the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            Frequency::Daily => "daily",
            Frequency::Weekly => "weekly",
            Frequency::Monthly => "monthly",
            Frequency::Yearly => "yearly",
        }
    }

    /// The amount a single occurrence contributes to an average month.
    pub fn monthly_amount(&self, amount: f64) -> f64 {
        match self {
            Frequency::Daily => amount * 30.0,
            Frequency::Weekly => amount * 4.33,
            Frequency::Monthly => amount,
            Frequency::Yearly => amount / 12.0,
        }
    }
}

impl Display for Frequency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Frequency {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "daily" => Ok(Frequency::Daily),
            "weekly" => Ok(Frequency::Weekly),
            "monthly" => Ok(Frequency::Monthly),
            "yearly" => Ok(Frequency::Yearly),
            other => Err(Error::InvalidFrequency(other.to_owned())),
        }
    }
}

/// The monthly equivalent of `amount` repeating with the frequency `label`.
///
/// Unknown labels contribute nothing.
pub fn recurring_to_monthly(amount: f64, label: &str) -> f64 {
    label
        .parse::<Frequency>()
        .map(|frequency| frequency.monthly_amount(amount))
        .unwrap_or(0.0)
}
