// Color records and the validate-then-normalize load pipeline

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::hex;

/// Maximum retained recent-color entries
pub const RECENT_LIMIT: usize = 8;

/// Current unix time in milliseconds
pub fn now_millis() -> i64 {
    (time::OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000) as i64
}

/// A selectable color: either a built-in preset or a user-created
/// custom entry. `hex2` present means a two-stop gradient.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ColorOption {
    pub title: String,
    /// Canonical uppercase `#RRGGBB` (or `#RRGGBBAA`)
    pub hex: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hex2: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub keywords: Vec<String>,
    /// Generated id for custom entries; presets have none
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub favorite: bool,
    #[serde(default)]
    pub created_at: i64,
    #[serde(default)]
    pub last_used: i64,
}

impl ColorOption {
    pub fn is_gradient(&self) -> bool {
        self.hex2.is_some()
    }

    /// Identifier used for the preset favorite set and recents:
    /// uppercase hex, or hex-hex2 for gradients.
    pub fn preset_id(&self) -> String {
        match &self.hex2 {
            Some(hex2) => format!("{}-{}", self.hex, hex2),
            None => self.hex.clone(),
        }
    }

    /// Assign the generated fields a fresh custom color needs. An
    /// existing id or timestamp is kept as-is.
    pub fn ensure_normalized(mut self) -> Self {
        let now = now_millis();
        if self.id.is_none() {
            self.id = Some(ulid::Ulid::new().to_string());
        }
        if self.created_at == 0 {
            self.created_at = now;
        }
        if self.last_used == 0 {
            self.last_used = now;
        }
        self
    }
}

/// Provenance of a recent-use record
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Origin {
    Custom,
    Preset,
    Adhoc,
}

/// One entry in the recent-colors history, newest first
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RecentEntry {
    pub id: String,
    pub title: String,
    pub hex: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hex2: Option<String>,
    pub origin: Origin,
    pub last_used: i64,
}

/// Identifier a recent entry is deduplicated by: custom colors keep
/// their own id, presets use the preset id, ad-hoc fills get a
/// synthetic `adhoc-` key so the same pair collapses to one entry.
pub fn recent_id(option: &ColorOption, origin: Origin) -> String {
    match origin {
        Origin::Custom => option
            .id
            .clone()
            .unwrap_or_else(|| option.preset_id()),
        Origin::Preset => option.preset_id(),
        Origin::Adhoc => format!(
            "adhoc-{}-{}",
            option.hex,
            option.hex2.as_deref().unwrap_or("SOLID")
        ),
    }
}

/// Sort custom colors in place: favorited first, then most recently
/// used, ties broken by most recently created. Stable and
/// deterministic for identical data.
pub fn sort_custom(colors: &mut [ColorOption]) {
    colors.sort_by(|a, b| {
        b.favorite
            .cmp(&a.favorite)
            .then(b.last_used.cmp(&a.last_used))
            .then(b.created_at.cmp(&a.created_at))
    });
}

// ---------------------------------------------------------------------------
// Load-time validation
//
// Stored documents are untyped JSON; every record passes a field-by-field
// schema check before it enters the in-memory model. A malformed record is
// dropped, never propagated.

fn string_field(obj: &Value, key: &str) -> Option<String> {
    obj.get(key)?.as_str().map(str::to_string)
}

fn hex_field(obj: &Value, key: &str) -> Option<String> {
    hex::normalize(obj.get(key)?.as_str()?)
}

fn timestamp_field(obj: &Value, key: &str) -> Option<i64> {
    obj.get(key)?.as_i64()
}

/// Validate one stored custom-color record. `fallback_ts` backfills
/// missing timestamps on legacy records; callers derive it from the
/// record's position in the stored array so prior relative ordering
/// survives the backfill.
pub fn validate_custom(value: &Value, fallback_ts: i64) -> Option<ColorOption> {
    let title = string_field(value, "title").filter(|t| !t.is_empty())?;
    let hex = hex_field(value, "hex")?;

    // hex2 may be absent, but if present it must parse
    let hex2 = match value.get("hex2") {
        None | Some(Value::Null) => None,
        Some(raw) => Some(hex::normalize(raw.as_str()?)?),
    };

    let keywords = match value.get("keywords") {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => items
            .iter()
            .map(|kw| kw.as_str().map(str::to_string))
            .collect::<Option<Vec<_>>>()?,
        Some(_) => return None,
    };

    let id = match value.get("id") {
        None | Some(Value::Null) => None,
        Some(raw) => Some(raw.as_str()?.to_string()),
    };

    let favorite = match value.get("favorite") {
        None | Some(Value::Null) => false,
        Some(raw) => raw.as_bool()?,
    };

    let created_at = timestamp_field(value, "createdAt").unwrap_or(fallback_ts);
    let last_used = timestamp_field(value, "lastUsed").unwrap_or(fallback_ts);

    Some(ColorOption {
        title,
        hex,
        hex2,
        keywords,
        id,
        favorite,
        created_at,
        last_used,
    })
}

/// Validate one stored recent-history record
pub fn validate_recent(value: &Value) -> Option<RecentEntry> {
    let id = string_field(value, "id").filter(|s| !s.is_empty())?;
    let title = string_field(value, "title")?;
    let hex = hex_field(value, "hex")?;

    let hex2 = match value.get("hex2") {
        None | Some(Value::Null) => None,
        Some(raw) => Some(hex::normalize(raw.as_str()?)?),
    };

    let origin = match value.get("origin")?.as_str()? {
        "custom" => Origin::Custom,
        "preset" => Origin::Preset,
        "adhoc" => Origin::Adhoc,
        _ => return None,
    };

    let last_used = timestamp_field(value, "lastUsed")?;

    Some(RecentEntry {
        id,
        title,
        hex,
        hex2,
        origin,
        last_used,
    })
}
