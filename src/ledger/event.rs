use std::fmt;
use std::ops::{Add, Sub};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use time::format_description::well_known::Rfc3339;
use time::{Duration, OffsetDateTime, UtcOffset};

/// Opaque identifier of a tracked subject.
///
/// Platform ids are usually numeric; they are carried as their decimal string
/// so that the persisted `last_seen` map can key on them directly.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct SubjectId(String);

impl SubjectId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SubjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SubjectId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for SubjectId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<u64> for SubjectId {
    fn from(value: u64) -> Self {
        Self(value.to_string())
    }
}

impl<'de> Deserialize<'de> for SubjectId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        struct SubjectIdVisitor;

        impl<'de> serde::de::Visitor<'de> for SubjectIdVisitor {
            type Value = SubjectId;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a subject id as string or integer")
            }

            fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                Ok(SubjectId::from(v))
            }

            fn visit_i64<E>(self, v: i64) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                Ok(SubjectId(v.to_string()))
            }

            fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                Ok(SubjectId::from(v))
            }

            fn visit_string<E>(self, v: String) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                Ok(SubjectId(v))
            }
        }

        deserializer.deserialize_any(SubjectIdVisitor)
    }
}

/// Closed set of activity kinds.
///
/// Deserialization is tolerant: any label that is not recognized becomes
/// [`EventKind::Other`] instead of failing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", from = "String")]
pub enum EventKind {
    Message,
    Reaction,
    VoicePresence,
    Other,
}

impl EventKind {
    /// Map a free-form label onto a kind.
    ///
    /// Accepts the canonical snake_case names plus the labels written by the
    /// legacy bot (`réaction`, `vocal`).
    pub fn classify(label: &str) -> Self {
        match label.trim().to_lowercase().as_str() {
            "message" | "msg" => EventKind::Message,
            "reaction" | "réaction" => EventKind::Reaction,
            "voice" | "voice_presence" | "vocal" => EventKind::VoicePresence,
            _ => EventKind::Other,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Message => "message",
            EventKind::Reaction => "reaction",
            EventKind::VoicePresence => "voice_presence",
            EventKind::Other => "other",
        }
    }
}

impl From<&str> for EventKind {
    fn from(label: &str) -> Self {
        EventKind::classify(label)
    }
}

impl From<String> for EventKind {
    fn from(label: String) -> Self {
        EventKind::classify(&label)
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Absolute UTC instant, persisted as RFC 3339.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Timestamp(#[serde(serialize_with = "time::serde::rfc3339::serialize")] OffsetDateTime);

impl Timestamp {
    /// Read the wall clock. Only adapters call this; the core takes `now` as input.
    pub fn now() -> Self {
        Self(OffsetDateTime::now_utc())
    }

    pub fn from_unix(seconds: i64) -> Result<Self, time::error::ComponentRange> {
        OffsetDateTime::from_unix_timestamp(seconds).map(Self)
    }

    pub fn as_offset(&self) -> OffsetDateTime {
        self.0
    }

    pub fn checked_sub(&self, duration: Duration) -> Option<Self> {
        self.0.checked_sub(duration).map(Self)
    }

    pub fn to_rfc3339(&self) -> String {
        // Formatting a UTC OffsetDateTime with Rfc3339 only fails for years outside 0..=9999.
        self.0
            .format(&Rfc3339)
            .unwrap_or_else(|_| self.0.unix_timestamp().to_string())
    }
}

impl From<OffsetDateTime> for Timestamp {
    fn from(value: OffsetDateTime) -> Self {
        Self(value.to_offset(UtcOffset::UTC))
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        time::serde::rfc3339::deserialize(deserializer).map(Timestamp::from)
    }
}

impl Sub for Timestamp {
    type Output = Duration;

    fn sub(self, rhs: Self) -> Duration {
        self.0 - rhs.0
    }
}

impl Add<Duration> for Timestamp {
    type Output = Timestamp;

    fn add(self, rhs: Duration) -> Timestamp {
        Self(self.0 + rhs)
    }
}

impl Sub<Duration> for Timestamp {
    type Output = Timestamp;

    fn sub(self, rhs: Duration) -> Timestamp {
        Self(self.0 - rhs)
    }
}

impl FromStr for Timestamp {
    type Err = time::error::Parse;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OffsetDateTime::parse(s.trim(), &Rfc3339).map(Timestamp::from)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_rfc3339())
    }
}

/// One recorded activity occurrence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub subject_id: SubjectId,
    pub kind: EventKind,
    pub timestamp: Timestamp,
}

impl Event {
    pub fn new(
        subject_id: impl Into<SubjectId>,
        kind: impl Into<EventKind>,
        timestamp: Timestamp,
    ) -> Self {
        Self {
            subject_id: subject_id.into(),
            kind: kind.into(),
            timestamp,
        }
    }
}
