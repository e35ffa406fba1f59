use serde::Deserialize;
use std::fmt::{Display, Formatter};

/// Scalar reported by the router under `result.SignalStrength`.
///
/// Firmwares disagree on the type: most report a bar count, some a dBm figure,
/// a few a string. Integers and decimals compare numerically so that `2` and
/// `2.0` count as the same reading.
#[derive(Deserialize, Debug, Clone)]
#[serde(untagged)]
pub enum SignalStrength {
    Level(i64),
    Decimal(f64),
    Text(String),
    Flag(bool),
}

impl PartialEq for SignalStrength {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Level(a), Self::Level(b)) => a == b,
            (Self::Decimal(a), Self::Decimal(b)) => a == b,
            (Self::Level(a), Self::Decimal(b)) | (Self::Decimal(b), Self::Level(a)) => {
                *a as f64 == *b
            }
            (Self::Text(a), Self::Text(b)) => a == b,
            (Self::Flag(a), Self::Flag(b)) => a == b,
            _ => false,
        }
    }
}

impl Display for SignalStrength {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            SignalStrength::Level(level) => write!(f, "{}", level),
            // Whole decimals keep their `.0`.
            SignalStrength::Decimal(value) if value.is_finite() && value.fract() == 0.0 => {
                write!(f, "{:.1}", value)
            }
            SignalStrength::Decimal(value) => write!(f, "{}", value),
            SignalStrength::Text(text) => write!(f, "{}", text),
            SignalStrength::Flag(flag) => write!(f, "{}", flag),
        }
    }
}

/// Marker printed and spoken when the router reports no reading.
pub const ABSENT_MARKER: &str = "unknown";

/// One poll's outcome. `None` means the router sent no usable reading.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SignalReading(pub Option<SignalStrength>);

impl SignalReading {
    pub fn absent() -> Self {
        Self(None)
    }

    pub fn is_absent(&self) -> bool {
        self.0.is_none()
    }
}

impl From<SignalStrength> for SignalReading {
    fn from(strength: SignalStrength) -> Self {
        Self(Some(strength))
    }
}

impl Display for SignalReading {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match &self.0 {
            Some(strength) => write!(f, "{}", strength),
            None => write!(f, "{}", ABSENT_MARKER),
        }
    }
}
