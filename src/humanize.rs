//! Human-readable duration formatting and parsing utilities

use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("Invalid duration format: {0}")]
    InvalidFormat(String),

    #[error("Invalid number: {0}")]
    InvalidNumber(#[from] std::num::ParseIntError),

    #[error("Invalid unit: {0}")]
    InvalidUnit(String),

    #[error("Duration too large: {0}")]
    Overflow(String),
}

const MINUTE: u64 = 60;
const HOUR: u64 = 60 * MINUTE;
const DAY: u64 = 24 * HOUR;
const WEEK: u64 = 7 * DAY;

/// Whole-second duration with human-readable parsing ("30d", "12h", "2w")
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct HumanDuration(pub u64);

impl HumanDuration {
    pub fn from_days(days: u64) -> Self {
        HumanDuration(days.saturating_mul(DAY))
    }

    pub fn as_secs(&self) -> u64 {
        self.0
    }

    pub fn as_duration(&self) -> time::Duration {
        time::Duration::seconds(i64::try_from(self.0).unwrap_or(i64::MAX))
    }

    /// Render in the largest unit that divides the value exactly.
    pub fn to_human_readable(&self) -> String {
        const UNITS: &[(&str, u64)] = &[
            ("w", WEEK),
            ("d", DAY),
            ("h", HOUR),
            ("m", MINUTE),
        ];

        if self.0 == 0 {
            return "0s".to_string();
        }

        for &(unit, divisor) in UNITS {
            if self.0 % divisor == 0 {
                return format!("{}{}", self.0 / divisor, unit);
            }
        }

        format!("{}s", self.0)
    }
}

impl Serialize for HumanDuration {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_human_readable())
    }
}

impl<'de> Deserialize<'de> for HumanDuration {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        struct HumanDurationVisitor;

        impl<'de> serde::de::Visitor<'de> for HumanDurationVisitor {
            type Value = HumanDuration;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a duration string (e.g. \"30d\", \"12h\") or integer seconds")
            }

            fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                Ok(HumanDuration(v))
            }

            fn visit_i64<E>(self, v: i64) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                u64::try_from(v)
                    .map(HumanDuration)
                    .map_err(|_| E::custom(format!("duration must not be negative: {v}")))
            }

            fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                v.parse::<HumanDuration>().map_err(serde::de::Error::custom)
            }
        }

        deserializer.deserialize_any(HumanDurationVisitor)
    }
}

impl FromStr for HumanDuration {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_lowercase();

        // Try to parse as plain number of seconds first
        if let Ok(num) = s.parse::<u64>() {
            return Ok(HumanDuration(num));
        }

        // Parse with unit suffix
        let (num_str, unit) = if let Some(pos) = s.find(|c: char| !c.is_ascii_digit()) {
            (&s[..pos], &s[pos..])
        } else {
            return Err(ParseError::InvalidFormat(s.to_string()));
        };

        if num_str.is_empty() {
            return Err(ParseError::InvalidFormat(s.to_string()));
        }
        let num: u64 = num_str.parse()?;

        let multiplier = match unit.trim() {
            "s" | "sec" | "secs" => 1,
            "m" | "min" | "mins" => MINUTE,
            "h" | "hr" | "hrs" => HOUR,
            "d" | "day" | "days" => DAY,
            "w" | "week" | "weeks" => WEEK,
            _ => return Err(ParseError::InvalidUnit(unit.to_string())),
        };

        num.checked_mul(multiplier)
            .map(HumanDuration)
            .ok_or_else(|| ParseError::Overflow(s.to_string()))
    }
}

impl fmt::Display for HumanDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_human_readable())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_seconds() {
        assert_eq!("90".parse::<HumanDuration>().unwrap().as_secs(), 90);
        assert_eq!("45s".parse::<HumanDuration>().unwrap().as_secs(), 45);
    }

    #[test]
    fn test_parse_units() {
        assert_eq!("90m".parse::<HumanDuration>().unwrap().as_secs(), 90 * 60);
        assert_eq!("36h".parse::<HumanDuration>().unwrap().as_secs(), 36 * 3600);
        assert_eq!("30d".parse::<HumanDuration>().unwrap(), HumanDuration::from_days(30));
        assert_eq!("2W".parse::<HumanDuration>().unwrap(), HumanDuration::from_days(14));
        assert_eq!("7 days".parse::<HumanDuration>().unwrap(), HumanDuration::from_days(7));
    }

    #[test]
    fn test_parse_invalid() {
        assert!(matches!("".parse::<HumanDuration>(), Err(ParseError::InvalidFormat(_))));
        assert!(matches!("d".parse::<HumanDuration>(), Err(ParseError::InvalidFormat(_))));
        assert!(matches!("3y".parse::<HumanDuration>(), Err(ParseError::InvalidUnit(_))));
        assert!(matches!(
            "99999999999999999w".parse::<HumanDuration>(),
            Err(ParseError::Overflow(_))
        ));
    }

    #[test]
    fn test_to_human_readable() {
        assert_eq!(HumanDuration::from_days(30).to_human_readable(), "30d");
        assert_eq!(HumanDuration::from_days(14).to_human_readable(), "2w");
        assert_eq!(HumanDuration(90 * 60).to_human_readable(), "90m");
        assert_eq!(HumanDuration(61).to_human_readable(), "61s");
        assert_eq!(HumanDuration(0).to_human_readable(), "0s");
    }

    #[test]
    fn test_as_duration() {
        assert_eq!(HumanDuration::from_days(30).as_duration(), time::Duration::days(30));
    }

    #[test]
    fn test_deserialize_string_and_number() {
        #[derive(Deserialize)]
        struct TestStruct {
            threshold: HumanDuration,
        }

        let parsed: TestStruct = serde_json::from_str(r#"{"threshold": "30d"}"#).unwrap();
        assert_eq!(parsed.threshold, HumanDuration::from_days(30));

        let parsed: TestStruct = serde_json::from_str(r#"{"threshold": 3600}"#).unwrap();
        assert_eq!(parsed.threshold.as_secs(), 3600);

        assert!(serde_json::from_str::<TestStruct>(r#"{"threshold": -5}"#).is_err());
    }

    #[test]
    fn test_serialize_round_trip() {
        let json = serde_json::to_string(&HumanDuration::from_days(45)).unwrap();
        assert_eq!(json, r#""45d""#);
        assert_eq!(
            serde_json::from_str::<HumanDuration>(&json).unwrap(),
            HumanDuration::from_days(45)
        );
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", HumanDuration::from_days(1)), "1d");
    }
}
