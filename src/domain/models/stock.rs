use serde_derive::Deserialize;
use serde_derive::Serialize;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stock {
    pub name: String,
    pub ticker: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Holding {
    pub name: String,
    pub ticker: String,
    pub sector: String,
    pub weight: f64,
}

/// Bucket a 1 to 10 risk level falls into.
#[derive(Copy, Clone, Debug, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum RiskProfile {
    Conservative,
    Balanced,
    Aggressive,
}

impl RiskProfile {
    pub fn from_level(level: i64) -> RiskProfile {
        if level <= 3 {
            return RiskProfile::Conservative;
        }
        if level <= 6 {
            return RiskProfile::Balanced;
        }

        return RiskProfile::Aggressive;
    }
}
