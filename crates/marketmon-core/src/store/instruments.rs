use crate::{Instrument, InstrumentId};

/// Transitions of the instrument store.
#[derive(Debug, Clone, PartialEq)]
pub enum InstrumentsAction {
    BeginFetchList,
    CompleteFetchList(Vec<Instrument>),
    FailFetchList(String),
    /// The view that started the fetch went away before it finished.
    AbandonFetchList,
    SetFavorites(Vec<Instrument>),
    ToggleFavoriteFlag(InstrumentId),
    SetFavoriteFlag { id: InstrumentId, favorite: bool },
    UpsertFavoriteEntry(Instrument),
    RemoveFavoriteEntry(InstrumentId),
}

/// Client-side mirror of the instrument list and the favorites subset.
///
/// `loading` and `error` describe the list fetch only; the favorites
/// collection is replaced wholesale and has no status of its own.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InstrumentsState {
    instruments: Vec<Instrument>,
    favorites: Vec<Instrument>,
    loading: bool,
    error: Option<String>,
}

impl InstrumentsState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reduce(mut self, action: InstrumentsAction) -> Self {
        self.apply(action);
        self
    }

    pub fn apply(&mut self, action: InstrumentsAction) {
        match action {
            InstrumentsAction::BeginFetchList => self.begin_fetch_list(),
            InstrumentsAction::CompleteFetchList(items) => self.complete_fetch_list(items),
            InstrumentsAction::FailFetchList(message) => self.fail_fetch_list(message),
            InstrumentsAction::AbandonFetchList => self.abandon_fetch_list(),
            InstrumentsAction::SetFavorites(items) => self.set_favorites(items),
            InstrumentsAction::ToggleFavoriteFlag(id) => self.toggle_favorite_flag(id),
            InstrumentsAction::SetFavoriteFlag { id, favorite } => {
                self.set_favorite_flag(id, favorite)
            }
            InstrumentsAction::UpsertFavoriteEntry(instrument) => {
                self.upsert_favorite_entry(instrument)
            }
            InstrumentsAction::RemoveFavoriteEntry(id) => self.remove_favorite_entry(id),
        }
    }

    pub fn begin_fetch_list(&mut self) {
        self.loading = true;
        self.error = None;
    }

    pub fn complete_fetch_list(&mut self, items: Vec<Instrument>) {
        self.instruments = items;
        self.loading = false;
    }

    /// Keeps the previous list on screen.
    pub fn fail_fetch_list(&mut self, message: impl Into<String>) {
        self.loading = false;
        self.error = Some(message.into());
    }

    pub fn abandon_fetch_list(&mut self) {
        self.loading = false;
    }

    pub fn set_favorites(&mut self, items: Vec<Instrument>) {
        self.favorites = items;
    }

    /// Flips the flag in `instruments` only. Unknown ids are ignored.
    pub fn toggle_favorite_flag(&mut self, id: InstrumentId) {
        self.instruments = self
            .instruments
            .iter()
            .map(|instrument| {
                if instrument.id == id {
                    instrument.clone().with_favorite(!instrument.favorite)
                } else {
                    instrument.clone()
                }
            })
            .collect();
    }

    pub fn set_favorite_flag(&mut self, id: InstrumentId, favorite: bool) {
        self.instruments = self
            .instruments
            .iter()
            .map(|instrument| {
                if instrument.id == id {
                    instrument.clone().with_favorite(favorite)
                } else {
                    instrument.clone()
                }
            })
            .collect();
    }

    pub fn upsert_favorite_entry(&mut self, instrument: Instrument) {
        let instrument = instrument.with_favorite(true);
        match self.favorites.iter().position(|item| item.id == instrument.id) {
            Some(index) => self.favorites[index] = instrument,
            None => self.favorites.push(instrument),
        }
    }

    pub fn remove_favorite_entry(&mut self, id: InstrumentId) {
        self.favorites.retain(|item| item.id != id);
    }

    pub fn instruments(&self) -> &[Instrument] {
        &self.instruments
    }

    pub fn favorites(&self) -> &[Instrument] {
        &self.favorites
    }

    pub const fn loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn find(&self, id: InstrumentId) -> Option<&Instrument> {
        self.instruments.iter().find(|instrument| instrument.id == id)
    }

    pub fn is_favorite(&self, id: InstrumentId) -> bool {
        self.find(id).map_or_else(
            || self.favorites.iter().any(|item| item.id == id),
            |instrument| instrument.favorite,
        )
    }

    /// Client-side search box: symbol or name, case-insensitive.
    pub fn filtered(&self, term: &str) -> Vec<&Instrument> {
        self.instruments
            .iter()
            .filter(|instrument| instrument.matches(term))
            .collect()
    }
}
