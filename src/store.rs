// Persistent document store backed by redb.
//
// Three JSON documents live in one keyed table: the custom-color
// collection, the favorite-preset id set and the recent-use history,
// plus the persisted category filter. Each collection is owned by one
// repository that mirrors its document in memory; mutations update the
// mirror synchronously and persist with an unawaited background write.

use std::collections::HashSet;
use std::fs;
use std::path::PathBuf;
use std::sync::{Arc, OnceLock};

use directories::ProjectDirs;
use eyre::{eyre, Result, WrapErr};
use redb::{Database, ReadableDatabase, TableDefinition};
use tokio::sync::mpsc;

use crate::model::{
    self, now_millis, sort_custom, ColorOption, Origin, RecentEntry, RECENT_LIMIT,
};

const DOCS_TABLE: TableDefinition<&str, &str> = TableDefinition::new("documents");

const CUSTOM_COLORS_KEY: &str = "custom-colors";
const FAVORITE_PRESETS_KEY: &str = "favorite-presets";
const RECENT_COLORS_KEY: &str = "recent-colors";
const CATEGORY_FILTER_KEY: &str = "category-filter";

/// open the database, creating the directory if needed
/// returns the database and the data directory path
pub fn open_db() -> Result<(Arc<Database>, PathBuf)> {
    let project_dirs = ProjectDirs::from("", "", env!("CARGO_PKG_NAME"))
        .ok_or_else(|| eyre!("can't find data dir for {}", env!("CARGO_PKG_NAME")))?;

    let mut db_path = project_dirs.data_local_dir().to_path_buf();

    if !db_path.exists() {
        fs::create_dir_all(&db_path)?;
    }

    let data_dir = db_path.clone();
    db_path.push("colors.redb");

    let db = Database::create(&db_path).wrap_err_with(|| {
        format!(
            "Failed to open database at {:?}. If you upgraded from an older version, delete the old database file: rm {:?}",
            db_path, db_path
        )
    })?;

    Ok((Arc::new(db), data_dir))
}

/// Read one document as a raw JSON string
fn read_doc(db: &Database, key: &str) -> Option<String> {
    let read_txn = db.begin_read().ok()?;
    let table = read_txn.open_table(DOCS_TABLE).ok()?;
    table.get(key).ok()?.map(|guard| guard.value().to_string())
}

fn write_doc(db: &Database, key: &str, json: &str) -> Result<()> {
    let write_txn = db.begin_write()?;
    {
        let mut table = write_txn.open_table(DOCS_TABLE)?;
        table.insert(key, json)?;
    }
    write_txn.commit()?;
    Ok(())
}

struct PendingWrite {
    db: Arc<Database>,
    key: &'static str,
    json: String,
}

/// Single background writer, created on first use inside a runtime.
/// One consumer commits queued writes in submission order, so the
/// durable document always converges to the latest snapshot.
static WRITER: OnceLock<mpsc::UnboundedSender<PendingWrite>> = OnceLock::new();

/// Persist a document without blocking the caller. Inside a tokio
/// runtime the write is queued for the background writer and not
/// awaited; the in-memory mirror is already current, so last write
/// wins. Outside a runtime (tests, direct-launch mode teardown) the
/// write is synchronous.
fn persist(db: &Arc<Database>, key: &'static str, json: String) {
    match tokio::runtime::Handle::try_current() {
        Ok(handle) => {
            let tx = WRITER.get_or_init(|| {
                let (tx, mut rx) = mpsc::unbounded_channel::<PendingWrite>();
                handle.spawn(async move {
                    while let Some(write) = rx.recv().await {
                        let key = write.key;
                        let done = tokio::task::spawn_blocking(move || {
                            write_doc(&write.db, write.key, &write.json)
                        })
                        .await;
                        match done {
                            Ok(Ok(())) => {}
                            Ok(Err(e)) => eprintln!("Warning: failed to persist {}: {}", key, e),
                            Err(e) => eprintln!("Warning: failed to persist {}: {}", key, e),
                        }
                    }
                });
                tx
            });
            let write = PendingWrite {
                db: Arc::clone(db),
                key,
                json,
            };
            // The writer's runtime may be gone; fall back to writing here
            if let Err(mpsc::error::SendError(write)) = tx.send(write) {
                if let Err(e) = write_doc(&write.db, write.key, &write.json) {
                    eprintln!("Warning: failed to persist {}: {}", write.key, e);
                }
            }
        }
        Err(_) => {
            if let Err(e) = write_doc(db, key, &json) {
                eprintln!("Warning: failed to persist {}: {}", key, e);
            }
        }
    }
}

/// Load the persisted category filter name, if any
pub fn load_category_filter(db: &Database) -> Option<String> {
    let raw = read_doc(db, CATEGORY_FILTER_KEY)?;
    serde_json::from_str(&raw).ok()
}

/// Persist the category filter name
pub fn save_category_filter(db: &Arc<Database>, name: &str) {
    if let Ok(json) = serde_json::to_string(name) {
        persist(db, CATEGORY_FILTER_KEY, json);
    }
}

/// Fields of a custom color an edit may change. `None` leaves the
/// stored value alone; `hex2` is doubly optional so an edit can clear
/// the gradient stop.
#[derive(Debug, Default, Clone)]
pub struct ColorPatch {
    pub title: Option<String>,
    pub hex: Option<String>,
    pub hex2: Option<Option<String>>,
    pub keywords: Option<Vec<String>>,
    pub favorite: Option<bool>,
    pub last_used: Option<i64>,
}

/// Repository for the user's custom colors
pub struct CustomColors {
    db: Arc<Database>,
    colors: Vec<ColorOption>,
}

impl CustomColors {
    /// Load and validate the stored collection. Malformed records are
    /// dropped; legacy records missing timestamps are backfilled from
    /// their stored position (the array is stored newest-first, so
    /// earlier indices get newer synthetic timestamps). If the load
    /// changed anything, the normalized collection is persisted once.
    pub fn load(db: Arc<Database>) -> Self {
        let raw = read_doc(&db, CUSTOM_COLORS_KEY);
        let values: Vec<serde_json::Value> = raw
            .as_deref()
            .and_then(|json| serde_json::from_str(json).ok())
            .unwrap_or_default();

        let stored = values.len();
        let base = now_millis();
        let mut needs_rewrite = false;

        let mut colors: Vec<ColorOption> = values
            .iter()
            .enumerate()
            .filter_map(|(index, value)| {
                let backfilled = value.get("createdAt").and_then(|v| v.as_i64()).is_none()
                    || value.get("lastUsed").and_then(|v| v.as_i64()).is_none();
                let loaded = model::validate_custom(value, base - index as i64);
                if loaded.is_some() && backfilled {
                    needs_rewrite = true;
                }
                loaded
            })
            .collect();

        if colors.len() != stored {
            needs_rewrite = true;
        }

        sort_custom(&mut colors);

        let repo = Self { db, colors };
        if needs_rewrite {
            repo.persist();
        }
        repo
    }

    /// Current in-memory snapshot, sorted
    pub fn all(&self) -> &[ColorOption] {
        &self.colors
    }

    pub fn find(&self, id: &str) -> Option<&ColorOption> {
        self.colors.iter().find(|c| c.id.as_deref() == Some(id))
    }

    /// Add a color, replacing any existing entry with the same id or
    /// the same `(hex, hex2)` pair.
    pub fn add(&mut self, color: ColorOption) {
        let color = color.ensure_normalized();
        self.colors.retain(|existing| {
            existing.id != color.id
                && !(existing.hex == color.hex && existing.hex2 == color.hex2)
        });
        self.colors.insert(0, color);
        sort_custom(&mut self.colors);
        self.persist();
    }

    /// Remove by id when both sides carry one, by full equality
    /// otherwise.
    pub fn remove(&mut self, color: &ColorOption) {
        match &color.id {
            Some(id) => self
                .colors
                .retain(|existing| existing.id.as_deref() != Some(id)),
            None => self.colors.retain(|existing| existing != color),
        }
        sort_custom(&mut self.colors);
        self.persist();
    }

    /// Merge a patch into the entry with the given id. Unpatched
    /// fields, the id and createdAt all survive. Unknown ids are a
    /// no-op.
    pub fn update(&mut self, id: &str, patch: ColorPatch) {
        let Some(color) = self
            .colors
            .iter_mut()
            .find(|c| c.id.as_deref() == Some(id))
        else {
            return;
        };

        if let Some(title) = patch.title {
            color.title = title;
        }
        if let Some(hex) = patch.hex {
            color.hex = hex;
        }
        if let Some(hex2) = patch.hex2 {
            color.hex2 = hex2;
        }
        if let Some(keywords) = patch.keywords {
            color.keywords = keywords;
        }
        if let Some(favorite) = patch.favorite {
            color.favorite = favorite;
        }
        if let Some(last_used) = patch.last_used {
            color.last_used = last_used;
        }

        sort_custom(&mut self.colors);
        self.persist();
    }

    /// Flip the favorite flag. Colors without an id (presets) never
    /// take this path; the favorite-preset set covers them.
    pub fn toggle_favorite(&mut self, color: &ColorOption) {
        let Some(id) = color.id.clone() else {
            return;
        };
        let flipped = self
            .find(&id)
            .map(|existing| !existing.favorite);
        if let Some(favorite) = flipped {
            self.update(
                &id,
                ColorPatch {
                    favorite: Some(favorite),
                    ..ColorPatch::default()
                },
            );
        }
    }

    /// Touch the usage timestamp
    pub fn mark_used(&mut self, id: &str) {
        self.update(
            id,
            ColorPatch {
                last_used: Some(now_millis()),
                ..ColorPatch::default()
            },
        );
    }

    fn persist(&self) {
        match serde_json::to_string(&self.colors) {
            Ok(json) => persist(&self.db, CUSTOM_COLORS_KEY, json),
            Err(e) => eprintln!("Warning: failed to encode custom colors: {}", e),
        }
    }
}

/// Repository for the favorite-preset id set
pub struct FavoritePresets {
    db: Arc<Database>,
    ids: HashSet<String>,
}

impl FavoritePresets {
    pub fn load(db: Arc<Database>) -> Self {
        let ids = read_doc(&db, FAVORITE_PRESETS_KEY)
            .and_then(|json| serde_json::from_str::<Vec<String>>(&json).ok())
            .map(|list| list.into_iter().collect())
            .unwrap_or_default();
        Self { db, ids }
    }

    pub fn contains(&self, preset: &ColorOption) -> bool {
        self.ids.contains(&preset.preset_id())
    }

    /// Flip membership; returns the new state
    pub fn toggle(&mut self, preset: &ColorOption) -> bool {
        let id = preset.preset_id();
        let favorited = if self.ids.contains(&id) {
            self.ids.remove(&id);
            false
        } else {
            self.ids.insert(id);
            true
        };
        self.persist();
        favorited
    }

    fn persist(&self) {
        let mut list: Vec<&String> = self.ids.iter().collect();
        list.sort();
        match serde_json::to_string(&list) {
            Ok(json) => persist(&self.db, FAVORITE_PRESETS_KEY, json),
            Err(e) => eprintln!("Warning: failed to encode favorite presets: {}", e),
        }
    }
}

/// Repository for the recent-use history, newest first, capped at
/// [`RECENT_LIMIT`] entries.
pub struct RecentColors {
    db: Arc<Database>,
    entries: Vec<RecentEntry>,
}

impl RecentColors {
    /// Load and validate the stored history. Malformed records are
    /// dropped and the list is trimmed to the retention limit; if that
    /// changed anything, the cleaned document is persisted once.
    pub fn load(db: Arc<Database>) -> Self {
        let values: Vec<serde_json::Value> = read_doc(&db, RECENT_COLORS_KEY)
            .as_deref()
            .and_then(|json| serde_json::from_str(json).ok())
            .unwrap_or_default();

        let stored = values.len();
        let mut entries: Vec<RecentEntry> =
            values.iter().filter_map(model::validate_recent).collect();
        entries.truncate(RECENT_LIMIT);

        let repo = Self { db, entries };
        if repo.entries.len() != stored {
            repo.persist();
        }
        repo
    }

    pub fn all(&self) -> &[RecentEntry] {
        &self.entries
    }

    /// Record a use: drop any stale entry with the same identifier,
    /// prepend the new one, trim to the retention limit.
    pub fn record(&mut self, color: &ColorOption, origin: Origin) {
        let id = model::recent_id(color, origin);
        self.entries.retain(|entry| entry.id != id);
        self.entries.insert(
            0,
            RecentEntry {
                id,
                title: color.title.clone(),
                hex: color.hex.clone(),
                hex2: color.hex2.clone(),
                origin,
                last_used: now_millis(),
            },
        );
        self.entries.truncate(RECENT_LIMIT);
        self.persist();
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.persist();
    }

    fn persist(&self) {
        match serde_json::to_string(&self.entries) {
            Ok(json) => persist(&self.db, RECENT_COLORS_KEY, json),
            Err(e) => eprintln!("Warning: failed to encode recent colors: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn test_db() -> (Arc<Database>, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::create(dir.path().join("colors.redb")).unwrap();
        (Arc::new(db), dir)
    }

    fn color(title: &str, hex: &str) -> ColorOption {
        ColorOption {
            title: title.to_string(),
            hex: hex.to_string(),
            hex2: None,
            keywords: Vec::new(),
            id: None,
            favorite: false,
            created_at: 0,
            last_used: 0,
        }
    }

    #[test]
    fn test_add_assigns_id_and_persists() {
        let (db, _dir) = test_db();
        let mut repo = CustomColors::load(Arc::clone(&db));
        repo.add(color("Coral", "#FF4757"));

        assert_eq!(repo.all().len(), 1);
        assert!(repo.all()[0].id.is_some());

        // reload from disk sees the same record
        let reloaded = CustomColors::load(db);
        assert_eq!(reloaded.all(), repo.all());
    }

    #[test]
    fn test_add_replaces_same_hex_pair() {
        let (db, _dir) = test_db();
        let mut repo = CustomColors::load(db);
        repo.add(color("First", "#FF4757"));
        repo.add(color("Second", "#FF4757"));

        assert_eq!(repo.all().len(), 1);
        assert_eq!(repo.all()[0].title, "Second");

        // same hex but different hex2 is a distinct entry
        let mut gradient = color("Third", "#FF4757");
        gradient.hex2 = Some("#1E90FF".to_string());
        repo.add(gradient);
        assert_eq!(repo.all().len(), 2);
    }

    #[test]
    fn test_add_replaces_same_id() {
        let (db, _dir) = test_db();
        let mut repo = CustomColors::load(db);
        repo.add(color("Original", "#FF4757"));
        let id = repo.all()[0].id.clone();

        let mut edited = color("Renamed", "#1E90FF");
        edited.id = id.clone();
        repo.add(edited);

        assert_eq!(repo.all().len(), 1);
        assert_eq!(repo.all()[0].title, "Renamed");
        assert_eq!(repo.all()[0].id, id);
    }

    #[test]
    fn test_update_merges_and_preserves() {
        let (db, _dir) = test_db();
        let mut repo = CustomColors::load(db);
        repo.add(color("Coral", "#FF4757"));
        let original = repo.all()[0].clone();
        let id = original.id.clone().unwrap();

        repo.update(
            &id,
            ColorPatch {
                title: Some("Coral Red".to_string()),
                ..ColorPatch::default()
            },
        );

        let updated = repo.find(&id).unwrap();
        assert_eq!(updated.title, "Coral Red");
        assert_eq!(updated.hex, original.hex);
        assert_eq!(updated.created_at, original.created_at);
        assert_eq!(updated.last_used, original.last_used);
        assert_eq!(updated.favorite, original.favorite);

        // unknown id is a no-op
        let snapshot: Vec<ColorOption> = repo.all().to_vec();
        repo.update("missing", ColorPatch::default());
        assert_eq!(repo.all(), snapshot.as_slice());
    }

    #[test]
    fn test_toggle_favorite_sorts_first() {
        let (db, _dir) = test_db();
        let mut repo = CustomColors::load(db);
        repo.add(color("First", "#FF4757"));
        repo.add(color("Second", "#1E90FF"));

        let first = repo
            .all()
            .iter()
            .find(|c| c.title == "First")
            .cloned()
            .unwrap();
        repo.toggle_favorite(&first);

        assert_eq!(repo.all()[0].title, "First");
        assert!(repo.all()[0].favorite);

        // presets carry no id: toggling through this path is a no-op
        let snapshot: Vec<ColorOption> = repo.all().to_vec();
        repo.toggle_favorite(&color("Preset", "#FFFFFF"));
        assert_eq!(repo.all(), snapshot.as_slice());
    }

    #[test]
    fn test_load_drops_malformed_records() {
        let (db, _dir) = test_db();
        let json = r##"[
            {"title": "Good", "hex": "#ff4757", "id": "a", "createdAt": 5, "lastUsed": 5},
            {"title": "", "hex": "#ff4757"},
            {"hex": "#123456"},
            {"title": "Bad hex", "hex": "purple"},
            42
        ]"##;
        write_doc(&db, CUSTOM_COLORS_KEY, json).unwrap();

        let repo = CustomColors::load(Arc::clone(&db));
        assert_eq!(repo.all().len(), 1);
        assert_eq!(repo.all()[0].title, "Good");
        assert_eq!(repo.all()[0].hex, "#FF4757");

        // the cleaned collection was rewritten
        let reloaded: Vec<serde_json::Value> =
            serde_json::from_str(&read_doc(&db, CUSTOM_COLORS_KEY).unwrap()).unwrap();
        assert_eq!(reloaded.len(), 1);
    }

    #[test]
    fn test_load_backfills_legacy_timestamps() {
        let (db, _dir) = test_db();
        // stored newest-first, no timestamps
        let json = r##"[
            {"title": "Newer", "hex": "#ff4757", "id": "a"},
            {"title": "Older", "hex": "#1e90ff", "id": "b"}
        ]"##;
        write_doc(&db, CUSTOM_COLORS_KEY, json).unwrap();

        let repo = CustomColors::load(db);
        let order: Vec<&str> = repo.all().iter().map(|c| c.title.as_str()).collect();
        assert_eq!(order, vec!["Newer", "Older"]);
        assert!(repo.all()[0].last_used > repo.all()[1].last_used);
    }

    #[test]
    fn test_favorite_presets_toggle() {
        let (db, _dir) = test_db();
        let mut favorites = FavoritePresets::load(Arc::clone(&db));
        let mint = color("Mint Green", "#66D4CF");

        assert!(!favorites.contains(&mint));
        assert!(favorites.toggle(&mint));
        assert!(favorites.contains(&mint));

        // membership survives a reload
        let reloaded = FavoritePresets::load(Arc::clone(&db));
        assert!(reloaded.contains(&mint));

        assert!(!favorites.toggle(&mint));
        assert!(!favorites.contains(&mint));
    }

    #[test]
    fn test_recents_dedupe_and_trim() {
        let (db, _dir) = test_db();
        let mut recents = RecentColors::load(db);

        for i in 0..12 {
            recents.record(&color(&format!("c{}", i), &format!("#0000{:02X}", i)), Origin::Adhoc);
        }
        assert_eq!(recents.all().len(), RECENT_LIMIT);
        assert_eq!(recents.all()[0].title, "c11");

        // re-recording an identifier moves it to the front, no duplicate
        recents.record(&color("c9 again", "#000009"), Origin::Adhoc);
        assert_eq!(recents.all().len(), RECENT_LIMIT);
        assert_eq!(recents.all()[0].title, "c9 again");
        let matching: Vec<&RecentEntry> = recents
            .all()
            .iter()
            .filter(|e| e.id == "adhoc-#000009-SOLID")
            .collect();
        assert_eq!(matching.len(), 1);
    }

    #[test]
    fn test_recents_reload_roundtrip() {
        let (db, _dir) = test_db();
        let mut recents = RecentColors::load(Arc::clone(&db));
        recents.record(&color("Mint Green", "#66D4CF"), Origin::Preset);

        let reloaded = RecentColors::load(db);
        assert_eq!(reloaded.all(), recents.all());
        assert_eq!(reloaded.all()[0].id, "#66D4CF");
    }

    #[tokio::test]
    async fn test_queued_writes_settle_to_last_snapshot() {
        use std::time::Duration;

        let (db, _dir) = test_db();
        let mut repo = CustomColors::load(Arc::clone(&db));
        repo.add(color("Keep", "#FF4757"));

        // rapid add/remove churn; the durable document must end up
        // matching the final in-memory state, never a stale snapshot
        for i in 0..20 {
            repo.add(color(&format!("transient-{}", i), "#1E90FF"));
            let added = repo
                .all()
                .iter()
                .find(|c| c.title.starts_with("transient"))
                .cloned()
                .unwrap();
            repo.remove(&added);
        }
        assert_eq!(repo.all().len(), 1);

        let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
        loop {
            let stored: Vec<serde_json::Value> = read_doc(&db, CUSTOM_COLORS_KEY)
                .as_deref()
                .and_then(|json| serde_json::from_str(json).ok())
                .unwrap_or_default();
            let titles: Vec<&str> = stored
                .iter()
                .filter_map(|v| v.get("title")?.as_str())
                .collect();
            if titles == ["Keep"] {
                break;
            }
            if tokio::time::Instant::now() > deadline {
                panic!("durable document never settled, last saw {:?}", titles);
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    }

    #[test]
    fn test_recents_load_rewrites_cleaned_document() {
        let (db, _dir) = test_db();
        let mut raw: Vec<serde_json::Value> = (0..10)
            .map(|i| {
                serde_json::json!({
                    "id": format!("adhoc-#0000{:02X}-SOLID", i),
                    "title": format!("c{}", i),
                    "hex": format!("#0000{:02X}", i),
                    "origin": "adhoc",
                    "lastUsed": 100 - i,
                })
            })
            .collect();
        raw.push(serde_json::json!({"title": "no id"}));
        write_doc(&db, RECENT_COLORS_KEY, &serde_json::to_string(&raw).unwrap()).unwrap();

        let repo = RecentColors::load(Arc::clone(&db));
        assert_eq!(repo.all().len(), RECENT_LIMIT);

        // the cleaned, trimmed history was written back on load
        let stored: Vec<serde_json::Value> =
            serde_json::from_str(&read_doc(&db, RECENT_COLORS_KEY).unwrap()).unwrap();
        assert_eq!(stored.len(), RECENT_LIMIT);
        assert_eq!(stored[0].get("title").and_then(|t| t.as_str()), Some("c0"));
    }

    #[test]
    fn test_category_filter_roundtrip() {
        let (db, _dir) = test_db();
        assert_eq!(load_category_filter(&db), None);
        save_category_filter(&db, "favorite");
        assert_eq!(load_category_filter(&db).as_deref(), Some("favorite"));
    }
}
