//! Central UI state: query, category filter, sectioned rows, selection,
//! the custom-color form, and the store-backed repositories behind them.
//! The render loop reads this state; key handlers mutate it and hand an
//! [`Action`] back to the event loop.

use std::str::FromStr;
use std::sync::Arc;

use redb::Database;

use crate::catalog;
use crate::hex::{self, QuickInput};
use crate::matcher;
use crate::model::{ColorOption, Origin, RecentEntry};
use crate::store::{self, ColorPatch, CustomColors, FavoritePresets, RecentColors};

/// Category filter over the list, persisted across sessions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Category {
    #[default]
    All,
    Solid,
    Gradient,
    Custom,
    Favorite,
}

impl Category {
    pub fn as_str(self) -> &'static str {
        match self {
            Category::All => "all",
            Category::Solid => "solid",
            Category::Gradient => "gradient",
            Category::Custom => "custom",
            Category::Favorite => "favorite",
        }
    }

    pub fn next(self) -> Self {
        match self {
            Category::All => Category::Solid,
            Category::Solid => Category::Gradient,
            Category::Gradient => Category::Custom,
            Category::Custom => Category::Favorite,
            Category::Favorite => Category::All,
        }
    }
}

impl FromStr for Category {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(Category::All),
            "solid" => Ok(Category::Solid),
            "gradient" => Ok(Category::Gradient),
            "custom" => Ok(Category::Custom),
            "favorite" => Ok(Category::Favorite),
            _ => Err(()),
        }
    }
}

/// One visible line in the list panel
#[derive(Debug, Clone)]
pub enum ListRow {
    /// Section header, not selectable
    Header(&'static str),
    /// Quick-entry suggestion parsed from the search box
    Quick(QuickInput),
    Recent(RecentEntry),
    Custom(ColorOption),
    Preset { option: ColorOption, favorite: bool },
    /// The always-visible "Custom Color…" entry point
    Create,
}

impl ListRow {
    pub fn selectable(&self) -> bool {
        !matches!(self, ListRow::Header(_))
    }
}

/// What the event loop should do after a key was handled
#[derive(Debug)]
pub enum Action {
    None,
    /// Spawn the overlay renderer with this resolved color
    Launch { hex: String, hex2: Option<String> },
}

/// Create/edit form for a custom color
#[derive(Debug, Clone, Default)]
pub struct ColorForm {
    /// Id of the color being edited; `None` means creating
    pub editing: Option<String>,
    pub title: String,
    pub hex: String,
    pub hex2: String,
    pub keywords: String,
    /// Focused field index, 0..=3
    pub focus: usize,
    pub error: Option<String>,
}

impl ColorForm {
    pub const FIELDS: usize = 4;

    fn for_edit(color: &ColorOption) -> Self {
        Self {
            editing: color.id.clone(),
            title: color.title.clone(),
            hex: color.hex.clone(),
            hex2: color.hex2.clone().unwrap_or_default(),
            keywords: color.keywords.join(", "),
            focus: 0,
            error: None,
        }
    }

    pub fn field_mut(&mut self) -> &mut String {
        match self.focus {
            0 => &mut self.title,
            1 => &mut self.hex,
            2 => &mut self.hex2,
            _ => &mut self.keywords,
        }
    }

    fn parsed_keywords(&self) -> Vec<String> {
        self.keywords
            .split(',')
            .map(str::trim)
            .filter(|kw| !kw.is_empty())
            .map(str::to_string)
            .collect()
    }
}

/// Whether the UI is browsing the list or editing the form
#[derive(Debug, Clone)]
pub enum Mode {
    Browse,
    Form(ColorForm),
}

pub struct State {
    db: Arc<Database>,
    pub query: String,
    pub category: Category,
    pub rows: Vec<ListRow>,
    /// Index into `rows`; always points at a selectable row
    pub selected: Option<usize>,
    pub mode: Mode,
    /// Launch results and notices shown in the status line
    pub status: String,
    pub should_exit: bool,
    /// Don't scroll past the last/first item
    hard_stop: bool,

    customs: CustomColors,
    favorites: FavoritePresets,
    recents: RecentColors,
    solids: Vec<ColorOption>,
    gradients: Vec<ColorOption>,
}

impl State {
    pub fn new(db: Arc<Database>, hard_stop: bool, initial_query: Option<String>) -> Self {
        let category = store::load_category_filter(&db)
            .and_then(|name| name.parse().ok())
            .unwrap_or_default();

        let mut state = Self {
            customs: CustomColors::load(Arc::clone(&db)),
            favorites: FavoritePresets::load(Arc::clone(&db)),
            recents: RecentColors::load(Arc::clone(&db)),
            db,
            query: initial_query.unwrap_or_default(),
            category,
            rows: Vec::new(),
            selected: None,
            mode: Mode::Browse,
            status: String::new(),
            should_exit: false,
            hard_stop,
            solids: catalog::solids(),
            gradients: catalog::gradients(),
        };
        state.filter();
        state
    }

    // -- filtering ----------------------------------------------------------

    /// Rebuild the visible rows from the query and category filter
    pub fn filter(&mut self) {
        let query = matcher::normalize_query(&self.query);
        let mut rows = Vec::new();

        if let Some(quick) = hex::parse_quick(&self.query) {
            rows.push(ListRow::Header("Quick"));
            rows.push(ListRow::Quick(quick));
        }

        if self.category == Category::All {
            let recent: Vec<&RecentEntry> = self
                .recents
                .all()
                .iter()
                .filter(|entry| {
                    query.is_empty()
                        || matcher::is_subsequence(&entry.title, &query)
                        || matcher::is_subsequence(entry.hex.trim_start_matches('#'), &query)
                })
                .collect();
            if !recent.is_empty() {
                rows.push(ListRow::Header("Recent"));
                rows.extend(recent.into_iter().cloned().map(ListRow::Recent));
            }
        }

        if matches!(self.category, Category::All | Category::Custom | Category::Favorite) {
            let customs = self.section(
                self.customs.all(),
                &query,
                self.category == Category::Favorite,
            );
            if !customs.is_empty() {
                rows.push(ListRow::Header("Custom"));
                rows.extend(customs.into_iter().map(ListRow::Custom));
            }
        }

        if matches!(self.category, Category::All | Category::Solid | Category::Favorite) {
            let solids = self.preset_section(&self.solids, &query);
            if !solids.is_empty() {
                rows.push(ListRow::Header("Solid Colors"));
                rows.extend(solids);
            }
        }

        if matches!(self.category, Category::All | Category::Gradient | Category::Favorite) {
            let gradients = self.preset_section(&self.gradients, &query);
            if !gradients.is_empty() {
                rows.push(ListRow::Header("Gradients"));
                rows.extend(gradients);
            }
        }

        rows.push(ListRow::Header("Actions"));
        rows.push(ListRow::Create);

        self.rows = rows;
        self.selected = self.rows.iter().position(ListRow::selectable);
    }

    /// Match and rank one collection of options
    fn section(
        &self,
        options: &[ColorOption],
        query: &str,
        favorites_only: bool,
    ) -> Vec<ColorOption> {
        let mut matcher = matcher::new_matcher();
        let mut hits: Vec<(i64, ColorOption)> = options
            .iter()
            .filter(|opt| !favorites_only || opt.favorite)
            .filter(|opt| matcher::matches(opt, query))
            .map(|opt| (matcher::rank(opt, query, &mut matcher), opt.clone()))
            .collect();
        if !query.is_empty() {
            hits.sort_by(|a, b| b.0.cmp(&a.0));
        }
        hits.into_iter().map(|(_, opt)| opt).collect()
    }

    fn preset_section(&self, presets: &[ColorOption], query: &str) -> Vec<ListRow> {
        let favorites_only = self.category == Category::Favorite;
        self.section(presets, query, false)
            .into_iter()
            .map(|option| {
                let favorite = self.favorites.contains(&option);
                ListRow::Preset { option, favorite }
            })
            .filter(|row| {
                !favorites_only || matches!(row, ListRow::Preset { favorite: true, .. })
            })
            .collect()
    }

    // -- selection ----------------------------------------------------------

    pub fn selected_row(&self) -> Option<&ListRow> {
        self.selected.and_then(|i| self.rows.get(i))
    }

    pub fn move_down(&mut self) {
        let Some(current) = self.selected else { return };
        match self.rows[current + 1..]
            .iter()
            .position(ListRow::selectable)
        {
            Some(offset) => self.selected = Some(current + 1 + offset),
            None if !self.hard_stop => {
                self.selected = self.rows.iter().position(ListRow::selectable);
            }
            None => {}
        }
    }

    pub fn move_up(&mut self) {
        let Some(current) = self.selected else { return };
        match self.rows[..current].iter().rposition(ListRow::selectable) {
            Some(index) => self.selected = Some(index),
            None if !self.hard_stop => {
                self.selected = self.rows.iter().rposition(ListRow::selectable);
            }
            None => {}
        }
    }

    // -- browse-mode mutations ----------------------------------------------

    pub fn push_query(&mut self, c: char) {
        self.query.push(c);
        self.filter();
    }

    pub fn pop_query(&mut self) {
        self.query.pop();
        self.filter();
    }

    pub fn cycle_category(&mut self) {
        self.category = self.category.next();
        store::save_category_filter(&self.db, self.category.as_str());
        self.filter();
    }

    /// Enter on the selected row. Launchable rows record usage and
    /// recency before the renderer result comes back; the list
    /// re-renders from memory immediately.
    pub fn activate(&mut self) -> Action {
        let Some(row) = self.selected_row().cloned() else {
            return Action::None;
        };

        match row {
            ListRow::Header(_) => Action::None,
            ListRow::Create => {
                self.open_form(None);
                Action::None
            }
            ListRow::Quick(quick) => {
                let option = ColorOption {
                    title: match &quick {
                        QuickInput::Solid(hex) => hex.clone(),
                        QuickInput::Gradient(hex, hex2) => format!("{} → {}", hex, hex2),
                    },
                    hex: quick.hex().to_string(),
                    hex2: quick.hex2().map(str::to_string),
                    keywords: Vec::new(),
                    id: None,
                    favorite: false,
                    created_at: 0,
                    last_used: 0,
                };
                self.note_use(&option, Origin::Adhoc)
            }
            ListRow::Recent(entry) => {
                let option = ColorOption {
                    title: entry.title.clone(),
                    hex: entry.hex.clone(),
                    hex2: entry.hex2.clone(),
                    keywords: Vec::new(),
                    id: match entry.origin {
                        Origin::Custom => Some(entry.id.clone()),
                        _ => None,
                    },
                    favorite: false,
                    created_at: 0,
                    last_used: 0,
                };
                self.note_use(&option, entry.origin)
            }
            ListRow::Custom(option) => self.note_use(&option, Origin::Custom),
            ListRow::Preset { option, .. } => self.note_use(&option, Origin::Preset),
        }
    }

    fn note_use(&mut self, option: &ColorOption, origin: Origin) -> Action {
        if origin == Origin::Custom {
            if let Some(id) = &option.id {
                self.customs.mark_used(id);
            }
        }
        self.recents.record(option, origin);
        self.filter();
        Action::Launch {
            hex: option.hex.clone(),
            hex2: option.hex2.clone(),
        }
    }

    /// Ctrl-F: favorite toggle for the selected row. Custom colors
    /// flip their inline flag; presets flip set membership.
    pub fn toggle_favorite(&mut self) {
        match self.selected_row().cloned() {
            Some(ListRow::Custom(option)) => {
                self.customs.toggle_favorite(&option);
                self.filter();
            }
            Some(ListRow::Preset { option, .. }) => {
                let favorited = self.favorites.toggle(&option);
                self.status = if favorited {
                    format!("Favorited {}", option.title)
                } else {
                    format!("Unfavorited {}", option.title)
                };
                self.filter();
            }
            _ => {}
        }
    }

    /// Ctrl-D: delete the selected custom color
    pub fn delete_selected(&mut self) {
        if let Some(ListRow::Custom(option)) = self.selected_row().cloned() {
            self.customs.remove(&option);
            self.status = format!("Deleted {}", option.title);
            self.filter();
        }
    }

    /// Ctrl-E: edit the selected custom color
    pub fn edit_selected(&mut self) {
        if let Some(ListRow::Custom(option)) = self.selected_row().cloned() {
            self.open_form(Some(&option));
        }
    }

    pub fn clear_recents(&mut self) {
        self.recents.clear();
        self.filter();
    }

    // -- form ---------------------------------------------------------------

    pub fn open_form(&mut self, editing: Option<&ColorOption>) {
        let mut form = match editing {
            Some(color) => ColorForm::for_edit(color),
            None => ColorForm::default(),
        };
        // Pre-fill from a typed quick value when creating
        if form.editing.is_none() && form.hex.is_empty() {
            if let Some(quick) = hex::parse_quick(&self.query) {
                form.hex = quick.hex().to_string();
                form.hex2 = quick.hex2().unwrap_or_default().to_string();
            }
        }
        self.mode = Mode::Form(form);
    }

    pub fn close_form(&mut self) {
        self.mode = Mode::Browse;
    }

    /// Validate and commit the form. Invalid input stays inline as a
    /// form error and never leaves this method.
    pub fn submit_form(&mut self) {
        let Mode::Form(form) = &mut self.mode else {
            return;
        };

        let title = form.title.trim().to_string();
        if title.is_empty() {
            form.error = Some("Title is required".to_string());
            return;
        }

        let Some(canonical) = hex::normalize(&form.hex) else {
            form.error = Some(format!("Invalid HEX value: {:?}", form.hex.trim()));
            return;
        };

        let hex2 = if form.hex2.trim().is_empty() {
            None
        } else {
            match hex::normalize(&form.hex2) {
                Some(canonical2) => Some(canonical2),
                None => {
                    form.error = Some(format!("Invalid HEX value: {:?}", form.hex2.trim()));
                    return;
                }
            }
        };

        let keywords = form.parsed_keywords();
        let editing = form.editing.clone();

        match editing {
            Some(id) => {
                self.customs.update(
                    &id,
                    ColorPatch {
                        title: Some(title.clone()),
                        hex: Some(canonical),
                        hex2: Some(hex2),
                        keywords: Some(keywords),
                        ..ColorPatch::default()
                    },
                );
                self.status = format!("Updated {}", title);
            }
            None => {
                self.customs.add(ColorOption {
                    title: title.clone(),
                    hex: canonical,
                    hex2,
                    keywords,
                    id: None,
                    favorite: false,
                    created_at: 0,
                    last_used: 0,
                });
                self.status = format!("Saved {}", title);
            }
        }

        self.mode = Mode::Browse;
        self.filter();
    }
}
