mod flight;
pub mod storage;
pub mod persisted;
pub mod watched;
pub mod selection;
pub mod search;
pub mod details;
pub mod keys;

#[cfg(test)]
pub(crate) mod testing;

pub use storage::{FileStorage, MemoryStorage, Storage};
pub use persisted::PersistedCell;
pub use watched::{WatchedError, WatchedList};
pub use selection::Selection;
pub use search::{SearchFetcher, SearchState};
pub use details::{display_title, DetailsFetcher, DetailsState, DEFAULT_TITLE};
pub use keys::{KeyBinder, KeyDispatcher, KeyEvent};
