/// Livescore date-feed wire helpers.
///
/// The feed is loosely typed: ids arrive as strings or numbers, scores as
/// numeric strings (empty before kick-off), and whole fields are sometimes
/// `null` or missing. These deserializers absorb that so one odd field never
/// fails the whole document.
use chrono::NaiveDate;
use log::warn;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::MatchStatus;

pub const LIVESCORE_BASE: &str = "https://prod-public-api.livescore.com";

/// Fixed-width date key used by the feed and the snapshot store.
pub const DATE_FORMAT: &str = "%Y%m%d";

pub fn date_path(date: NaiveDate) -> String {
    format!("/v1/api/app/date/soccer/{}/0", date.format(DATE_FORMAT))
}

/// Strings and integers both become a trimmed string; empty means absent.
pub fn lenient_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(raw.and_then(|v| match v {
        Value::String(s) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_owned())
        }
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }))
}

pub fn lenient_score<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u32>, D::Error> {
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(raw.and_then(|v| match v {
        Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
        Value::String(s) => s.trim().parse::<u32>().ok(),
        _ => None,
    }))
}

pub fn lenient_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<i64>, D::Error> {
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(raw.and_then(|v| match v {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }))
}

pub fn lenient_status<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<MatchStatus>, D::Error> {
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(raw.and_then(|v| match v {
        Value::String(s) => Some(MatchStatus::from_token(&s)),
        Value::Number(n) => Some(MatchStatus::Other(n.to_string())),
        _ => None,
    }))
}

/// Any shape that does not parse as `T` is treated as absent.
pub fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(raw.and_then(|v| serde_json::from_value(v).ok()))
}

/// Lists tolerate `null`, non-array values, and elements that do not parse;
/// bad elements are skipped with a warning.
pub fn lenient_list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let Some(Value::Array(items)) = Option::<Value>::deserialize(deserializer)? else {
        return Ok(Vec::new());
    };
    Ok(items
        .into_iter()
        .filter_map(|item| match serde_json::from_value(item) {
            Ok(parsed) => Some(parsed),
            Err(e) => {
                warn!("skipping malformed {} entry: {e}", std::any::type_name::<T>());
                None
            }
        })
        .collect())
}
