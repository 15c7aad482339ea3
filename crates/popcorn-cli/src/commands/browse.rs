//! Interactive browse view.
//!
//! Keys are read on a dedicated thread and handed to the async loop over a
//! channel. Typing in the search box edits the query directly; every other
//! key goes through a [`KeyDispatcher`], whose binders turn presses into
//! [`Action`]s. The Escape binder only exists while details are open.

use super::context::AppContext;
use super::spinner;
use super::watched::summary_line;
use color_eyre::eyre::eyre;
use color_eyre::Result;
use console::{Key, Term};
use owo_colors::OwoColorize;
use popcorn_core::{
    display_title, DetailsFetcher, KeyBinder, KeyDispatcher, KeyEvent, SearchFetcher, Selection, WatchedList,
};
use popcorn_models::{SearchResult, WatchedEntry};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, info, trace};

#[derive(Debug, Clone, Copy, PartialEq)]
enum Action {
    FocusSearch,
    ToggleFocus,
    MoveUp,
    MoveDown,
    Select,
    CloseDetails,
    Rate(f64),
    AddWatched,
    DeleteWatched,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Focus {
    Search,
    List,
}

fn key_event(key: &Key) -> Option<KeyEvent> {
    let name = match key {
        Key::Escape => KeyEvent::ESCAPE.to_string(),
        Key::Enter => KeyEvent::ENTER.to_string(),
        Key::Tab => KeyEvent::TAB.to_string(),
        Key::Backspace => KeyEvent::BACKSPACE.to_string(),
        Key::ArrowUp => KeyEvent::ARROW_UP.to_string(),
        Key::ArrowDown => KeyEvent::ARROW_DOWN.to_string(),
        Key::ArrowLeft => KeyEvent::ARROW_LEFT.to_string(),
        Key::ArrowRight => KeyEvent::ARROW_RIGHT.to_string(),
        Key::Char(' ') => KeyEvent::SPACE.to_string(),
        Key::Char(c) if !c.is_control() => c.to_string(),
        _ => return None,
    };
    Some(KeyEvent::new(name))
}

fn is_interrupt(key: &Key) -> bool {
    matches!(key, Key::Char('\u{3}'))
}

fn bind(dispatcher: &KeyDispatcher, key_name: &str, actions: &UnboundedSender<Action>, action: Action) -> KeyBinder {
    let actions = actions.clone();
    KeyBinder::bind(dispatcher, key_name, move || {
        let _ = actions.send(action);
    })
}

/// Shortcuts that stay bound for the whole session
fn bind_globals(dispatcher: &KeyDispatcher, actions: &UnboundedSender<Action>) -> Vec<KeyBinder> {
    let mut binders = vec![
        bind(dispatcher, KeyEvent::ENTER, actions, Action::FocusSearch),
        bind(dispatcher, KeyEvent::TAB, actions, Action::ToggleFocus),
        bind(dispatcher, KeyEvent::ARROW_UP, actions, Action::MoveUp),
        bind(dispatcher, KeyEvent::ARROW_DOWN, actions, Action::MoveDown),
        bind(dispatcher, KeyEvent::ARROW_RIGHT, actions, Action::Select),
        bind(dispatcher, KeyEvent::SPACE, actions, Action::Select),
        bind(dispatcher, "a", actions, Action::AddWatched),
        bind(dispatcher, "x", actions, Action::DeleteWatched),
    ];
    // 1-9 rate as-is, 0 means 10
    for digit in 0..=9u8 {
        let rating = if digit == 0 { 10.0 } else { f64::from(digit) };
        binders.push(bind(dispatcher, &digit.to_string(), actions, Action::Rate(rating)));
    }
    binders
}

struct BrowseView {
    query: String,
    focus: Focus,
    highlight: usize,
    selection: Selection,
    rating: Option<f64>,
    status: Option<String>,
    search: SearchFetcher,
    details: DetailsFetcher,
    watched: WatchedList,
    max_results_shown: usize,
    dispatcher: KeyDispatcher,
    actions: UnboundedSender<Action>,
    _globals: Vec<KeyBinder>,
    escape: Option<KeyBinder>,
}

impl BrowseView {
    fn new(ctx: &AppContext, actions: UnboundedSender<Action>) -> Self {
        // Any query change closes open details
        let reset = actions.clone();
        let search = SearchFetcher::new(ctx.source.clone()).with_reset_callback(move || {
            let _ = reset.send(Action::CloseDetails);
        });

        let dispatcher = KeyDispatcher::new();
        let globals = bind_globals(&dispatcher, &actions);
        let status = (!ctx.has_api_key())
            .then(|| "No OMDb API key configured; run 'popcorn config set-api-key'".to_string());

        Self {
            query: String::new(),
            focus: Focus::Search,
            highlight: 0,
            selection: Selection::new(),
            rating: None,
            status,
            search,
            details: DetailsFetcher::new(ctx.source.clone()),
            watched: ctx.watched(),
            max_results_shown: ctx.config.browse.max_results_shown,
            dispatcher,
            actions,
            _globals: globals,
            escape: None,
        }
    }

    fn showing_watched(&self) -> bool {
        self.query.trim().is_empty()
    }

    fn visible_results(&self) -> Vec<SearchResult> {
        let mut results = self.search.state().results;
        results.truncate(self.max_results_shown);
        results
    }

    fn list_len(&self) -> usize {
        if self.showing_watched() {
            self.watched.len()
        } else {
            self.visible_results().len()
        }
    }

    /// Returns false when the view should close
    fn handle_key(&mut self, key: Key) -> bool {
        if is_interrupt(&key) {
            return false;
        }

        if self.focus == Focus::Search {
            match key {
                Key::Char(c) if !c.is_control() => {
                    self.query.push(c);
                    self.query_changed();
                    return true;
                }
                Key::Backspace => {
                    if self.query.pop().is_some() {
                        self.query_changed();
                    }
                    return true;
                }
                _ => {}
            }
        }

        if let Some(event) = key_event(&key) {
            let fired = self.dispatcher.dispatch(&event);
            trace!(key = event.name(), fired, "Key dispatched");
        }
        true
    }

    fn query_changed(&mut self) {
        self.highlight = 0;
        self.status = None;
        self.search.observe(&self.query);
    }

    fn apply(&mut self, action: Action) {
        debug!(?action, "Browse action");
        match action {
            Action::FocusSearch => {
                if self.focus != Focus::Search {
                    self.focus = Focus::Search;
                    self.query.clear();
                    self.query_changed();
                }
            }
            Action::ToggleFocus => {
                self.focus = match self.focus {
                    Focus::Search => Focus::List,
                    Focus::List => Focus::Search,
                };
            }
            Action::MoveUp => self.highlight = self.highlight.saturating_sub(1),
            Action::MoveDown => {
                if self.highlight + 1 < self.list_len() {
                    self.highlight += 1;
                }
            }
            Action::Select => {
                if self.showing_watched() {
                    return;
                }
                if let Some(result) = self.visible_results().get(self.highlight) {
                    self.selection.select(&result.imdb_id);
                    self.sync_details();
                }
            }
            Action::CloseDetails => {
                if self.selection.is_open() {
                    self.selection.close();
                    self.sync_details();
                }
            }
            Action::Rate(rating) => {
                let rateable = self
                    .selection
                    .current()
                    .map(|id| !self.watched.contains(id))
                    .unwrap_or(false);
                if rateable {
                    self.rating = Some(rating);
                }
            }
            Action::AddWatched => self.add_watched(),
            Action::DeleteWatched => self.delete_highlighted(),
        }
    }

    /// Point the details fetcher at the current selection and scope Escape to it
    fn sync_details(&mut self) {
        self.rating = None;
        let current = self.selection.current().map(str::to_string);
        self.details.observe(current.as_deref());

        if current.is_some() {
            if self.escape.is_none() {
                self.escape = Some(bind(&self.dispatcher, KeyEvent::ESCAPE, &self.actions, Action::CloseDetails));
            }
        } else {
            self.escape = None;
        }
    }

    fn add_watched(&mut self) {
        let Some(details) = self.details.state().details else {
            return;
        };
        let Some(rating) = self.rating else {
            self.status = Some("Rate the movie first (1-9, 0 for 10)".to_string());
            return;
        };

        match self.watched.add(WatchedEntry::from_details(&details, rating)) {
            Ok(()) => {
                self.status = Some(format!("Added '{}' to your watched list", details.title));
                self.selection.close();
                self.sync_details();
            }
            Err(e) => self.status = Some(e.to_string()),
        }
    }

    fn delete_highlighted(&mut self) {
        if !self.showing_watched() {
            return;
        }
        let Some(entry) = self.watched.entries().get(self.highlight).cloned() else {
            return;
        };

        self.watched.remove(&entry.imdb_id);
        self.status = Some(format!("Removed '{}'", entry.title));
        self.highlight = self.highlight.min(self.watched.len().saturating_sub(1));
    }

    fn marker(&self, index: usize) -> &'static str {
        if self.focus == Focus::List && index == self.highlight {
            "▶"
        } else {
            " "
        }
    }

    fn render(&self, term: &Term) -> std::io::Result<()> {
        let search = self.search.state();
        let details = self.details.state();
        let mut lines = Vec::new();

        lines.push(format!("🍿 {}   {}", "usePopcorn".bold(), display_title(&details).bright_black()));
        let cursor = if self.focus == Focus::Search { "▏" } else { "" };
        let found = if self.showing_watched() {
            String::new()
        } else {
            format!("   Found {} results", search.results.len())
        };
        lines.push(format!("🔍 {}{}{}", self.query, cursor, found));
        lines.push(String::new());

        if self.showing_watched() {
            lines.push("Movies you watched".bright_cyan().bold().to_string());
            lines.push(summary_line(&self.watched.summary()));
            for (i, entry) in self.watched.entries().iter().enumerate() {
                lines.push(format!(
                    "{} {} ({})  ⭐ {}  🌟 {}  ⏳ {} min",
                    self.marker(i),
                    entry.title,
                    entry.year,
                    entry.imdb_rating,
                    entry.user_rating,
                    entry.runtime
                ));
            }
        } else if search.is_loading {
            lines.push("Loading...".to_string());
        } else if let Some(error) = &search.error {
            lines.push(format!("⛔ {}", error).red().to_string());
        } else {
            for (i, result) in self.visible_results().iter().enumerate() {
                let open = self.selection.current() == Some(result.imdb_id.as_str());
                let title = if open { result.title.green().to_string() } else { result.title.clone() };
                lines.push(format!("{} {}  🗓 {}", self.marker(i), title, result.year));
            }
        }

        if self.selection.is_open() {
            lines.push(String::new());
            if details.is_loading {
                lines.push("Loading...".to_string());
            } else if let Some(error) = &details.error {
                lines.push(format!("⛔ {}", error).red().to_string());
            } else if let Some(movie) = &details.details {
                lines.push(format!("{} ({})", movie.title.bold(), movie.year));
                lines.push(format!("{} • {}", movie.released, movie.runtime_label()));
                lines.push(movie.genre.clone());
                let imdb_rating = movie.imdb_rating.map(|r| r.to_string()).unwrap_or_else(|| "N/A".to_string());
                lines.push(format!("⭐ {} IMDb rating", imdb_rating));
                lines.push(movie.plot.italic().to_string());
                lines.push(format!("Starring {}", movie.actors));
                lines.push(format!("Directed by {}", movie.director));
                match self.watched.user_rating(&movie.imdb_id) {
                    Some(rating) => lines.push(format!("You rated this movie {} ⭐", rating)),
                    None => {
                        let rating = self.rating.map(|r| r.to_string()).unwrap_or_else(|| "-".to_string());
                        lines.push(format!("Your rating: {} / 10   (1-9, 0 for 10; 'a' adds to list)", rating));
                    }
                }
            }
        }

        lines.push(String::new());
        if let Some(status) = &self.status {
            lines.push(status.yellow().to_string());
        }
        lines.push(
            "Tab focus • ↑↓ move • →/Space open • Esc close • Enter search • x remove • Ctrl-C quit"
                .bright_black()
                .to_string(),
        );

        term.clear_screen()?;
        term.write_line(&lines.join("\n"))
    }
}

fn spawn_key_reader(term: Term) -> UnboundedReceiver<Key> {
    let (tx, rx) = mpsc::unbounded_channel();
    // A plain thread: a blocking read would otherwise hold up runtime shutdown
    std::thread::spawn(move || loop {
        match term.read_key() {
            Ok(key) => {
                if tx.send(key).is_err() {
                    break;
                }
            }
            Err(e) => {
                debug!(error = %e, "Key reader stopped");
                break;
            }
        }
    });
    rx
}

pub async fn run_browse() -> Result<()> {
    if !spinner::is_interactive() {
        return Err(eyre!("'popcorn browse' needs an interactive terminal"));
    }
    let ctx = AppContext::load()?;

    let term = Term::stdout();
    let (actions_tx, mut actions_rx) = mpsc::unbounded_channel();
    let mut view = BrowseView::new(&ctx, actions_tx);
    let mut search_rx = view.search.subscribe();
    let mut details_rx = view.details.subscribe();
    let mut keys = spawn_key_reader(term.clone());

    info!("Browse view opened");
    term.hide_cursor()?;

    let outcome: Result<()> = loop {
        if let Err(e) = view.render(&term) {
            break Err(eyre!("Failed to draw the browse view: {}", e));
        }

        tokio::select! {
            key = keys.recv() => {
                let Some(key) = key else { break Ok(()) };
                if !view.handle_key(key) {
                    break Ok(());
                }
                while let Ok(action) = actions_rx.try_recv() {
                    view.apply(action);
                }
            }
            changed = search_rx.changed() => {
                if changed.is_err() {
                    break Ok(());
                }
            }
            changed = details_rx.changed() => {
                if changed.is_err() {
                    break Ok(());
                }
            }
        }
    };

    view.search.cancel();
    view.details.cancel();
    term.clear_screen()?;
    term.show_cursor()?;
    info!("Browse view closed");
    outcome
}
