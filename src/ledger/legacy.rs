//! Import of the flat activity document written by the legacy bot.
//!
//! Layout of that document:
//!
//! ```json
//! {
//!   "history": [ { "user": 42, "action": "réaction", "time": "2025-06-01 23:09:50.123456" } ],
//!   "42": "2025-06-01 23:09:50.123456"
//! }
//! ```
//!
//! Every top-level key other than `history` is a subject id mapped to its
//! last-seen time. Times are naive UTC datetimes.

use serde::Deserialize;
use serde_json::{Map, Value};
use time::PrimitiveDateTime;
use time::macros::format_description;

use super::error::{LedgerError, Result};
use super::event::{Event, EventKind, SubjectId, Timestamp};
use super::history::{History, Snapshot};

const HISTORY_KEY: &str = "history";

#[derive(Debug, Deserialize)]
struct LegacyEntry {
    user: SubjectId,
    action: String,
    time: String,
}

/// Convert a legacy document into a snapshot.
///
/// `location` names the source in error messages.
pub fn import(bytes: &[u8], location: &str) -> Result<Snapshot> {
    let document: Value =
        serde_json::from_slice(bytes).map_err(|e| LedgerError::corrupt(location, e))?;
    let Value::Object(mut fields) = document else {
        return Err(LedgerError::corrupt(location, "expected a JSON object"));
    };

    let history = match fields.remove(HISTORY_KEY) {
        Some(value) => import_history(value, location)?,
        None => History::new(),
    };
    let mut snapshot = Snapshot {
        history,
        ..Snapshot::default()
    };

    import_last_seen(fields, &mut snapshot, location)?;
    Ok(snapshot)
}

fn import_history(value: Value, location: &str) -> Result<History> {
    let entries: Vec<LegacyEntry> =
        serde_json::from_value(value).map_err(|e| LedgerError::corrupt(location, e))?;

    entries
        .into_iter()
        .map(|entry| {
            let timestamp = parse_time(&entry.time).ok_or_else(|| {
                LedgerError::corrupt(location, format!("bad time '{}'", entry.time))
            })?;
            Ok(Event {
                subject_id: entry.user,
                kind: EventKind::classify(&entry.action),
                timestamp,
            })
        })
        .collect()
}

fn import_last_seen(
    fields: Map<String, Value>,
    snapshot: &mut Snapshot,
    location: &str,
) -> Result<()> {
    for (key, value) in fields {
        let Value::String(raw) = value else {
            return Err(LedgerError::corrupt(
                location,
                format!("last-seen entry '{key}' is not a string"),
            ));
        };
        let timestamp = parse_time(&raw).ok_or_else(|| {
            LedgerError::corrupt(location, format!("bad time '{raw}' for '{key}'"))
        })?;
        snapshot.last_seen.insert(SubjectId::from(key), timestamp);
    }
    Ok(())
}

/// Parse a naive `YYYY-MM-DD HH:MM:SS[.ffffff]` (space or `T` separated) as
/// UTC, falling back to RFC 3339 for values that carry an offset.
fn parse_time(raw: &str) -> Option<Timestamp> {
    let naive = format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");
    let naive_fraction =
        format_description!("[year]-[month]-[day] [hour]:[minute]:[second].[subsecond]");

    let normalized = raw.trim().replacen('T', " ", 1);
    PrimitiveDateTime::parse(&normalized, naive_fraction)
        .or_else(|_| PrimitiveDateTime::parse(&normalized, naive))
        .map(|dt| Timestamp::from(dt.assume_utc()))
        .ok()
        .or_else(|| raw.parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    const LEGACY: &str = r#"{
        "history": [
            {"user": 732823055008530462, "action": "message", "time": "2025-06-01 23:09:50.123456"},
            {"user": 111, "action": "réaction", "time": "2025-06-02 08:00:00"},
            {"user": 111, "action": "vocal", "time": "2025-06-02T09:30:00"},
            {"user": 222, "action": "inconnu", "time": "2025-06-03 10:00:00.5"}
        ],
        "732823055008530462": "2025-06-01 23:09:50.123456",
        "111": "2025-06-02 09:30:00",
        "222": "2025-06-03 10:00:00.5"
    }"#;

    #[test]
    fn test_import_legacy_document() {
        let snapshot = import(LEGACY.as_bytes(), "activity.json").unwrap();

        let events: Vec<&Event> = snapshot.history.iter().collect();
        assert_eq!(events.len(), 4);
        assert_eq!(events[0].subject_id.as_str(), "732823055008530462");
        assert_eq!(events[0].kind, EventKind::Message);
        assert_eq!(events[1].kind, EventKind::Reaction);
        assert_eq!(events[2].kind, EventKind::VoicePresence);
        assert_eq!(events[3].kind, EventKind::Other);
        assert_eq!(
            events[0].timestamp,
            "2025-06-01T23:09:50.123456Z".parse().unwrap()
        );

        assert_eq!(snapshot.last_seen.len(), 3);
        assert_eq!(
            snapshot.last_seen[&SubjectId::from("111")],
            "2025-06-02T09:30:00Z".parse().unwrap()
        );
    }

    #[test]
    fn test_import_empty_object() {
        let snapshot = import(b"{}", "activity.json").unwrap();
        assert!(snapshot.is_empty());
    }

    #[test]
    fn test_import_rejects_non_object() {
        let err = import(b"[]", "activity.json").unwrap_err();
        assert!(err.is_corrupt_data());
    }

    #[test]
    fn test_import_rejects_bad_time() {
        let err = import(br#"{"42": "yesterday"}"#, "activity.json").unwrap_err();
        assert!(err.is_corrupt_data());

        let err = import(
            br#"{"history": [{"user": 1, "action": "message", "time": "soon"}]}"#,
            "activity.json",
        )
        .unwrap_err();
        assert!(err.is_corrupt_data());
    }

    #[test]
    fn test_parse_time_accepts_rfc3339() {
        assert_eq!(
            parse_time("2025-06-01T23:00:00+02:00"),
            Some("2025-06-01T21:00:00Z".parse().unwrap())
        );
    }
}
