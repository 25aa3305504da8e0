//! Theme state for the light/dark switch.
//!
//! The page needs three things: the current choice, a way to change it, and
//! a way for dependents (the root `data-theme` attribute, the toggle label)
//! to hear about changes. [`ThemeState`] holds the value and its
//! subscribers. [`ThemeController`] is the single owner that also persists
//! the choice through a [`ThemeStore`], so nothing else writes storage.
//!
//! ```text
//! ThemeController ──set──▶ ThemeStore::save
//!        │
//!        └──▶ ThemeState::set ──▶ subscribers(theme)
//! ```
//!
//! The generated site's `theme.js` follows the same rules against
//! `localStorage` and the document root.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A visitor's theme choice.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
    /// Follow `prefers-color-scheme`.
    #[default]
    System,
}

impl Theme {
    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
            Theme::System => "system",
        }
    }

    /// Parse a stored value. Unknown values are `None`.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "light" => Some(Theme::Light),
            "dark" => Some(Theme::Dark),
            "system" => Some(Theme::System),
            _ => None,
        }
    }

    /// Concrete scheme given the platform preference.
    pub fn resolve(self, prefers_dark: bool) -> Theme {
        match self {
            Theme::System if prefers_dark => Theme::Dark,
            Theme::System => Theme::Light,
            concrete => concrete,
        }
    }

    /// Toggle order: light → dark → system → light.
    pub fn next(self) -> Theme {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::System,
            Theme::System => Theme::Light,
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Handle returned by [`ThemeState::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubscriptionId(usize);

type Listener = Box<dyn FnMut(Theme)>;

/// Current theme plus change listeners.
pub struct ThemeState {
    current: Theme,
    listeners: Vec<(SubscriptionId, Listener)>,
    next_id: usize,
}

impl ThemeState {
    pub fn new(initial: Theme) -> Self {
        Self {
            current: initial,
            listeners: Vec::new(),
            next_id: 0,
        }
    }

    pub fn get(&self) -> Theme {
        self.current
    }

    /// Change the theme. Listeners run only when the value changes;
    /// returns whether it did.
    pub fn set(&mut self, theme: Theme) -> bool {
        if theme == self.current {
            return false;
        }
        self.current = theme;
        for (_, listener) in &mut self.listeners {
            listener(theme);
        }
        true
    }

    pub fn subscribe(&mut self, listener: impl FnMut(Theme) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Remove a listener. Returns `false` if it was already gone.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(lid, _)| *lid != id);
        self.listeners.len() != before
    }
}

impl fmt::Debug for ThemeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ThemeState")
            .field("current", &self.current)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

/// Where the controller persists the choice.
pub trait ThemeStore {
    fn load(&self) -> Option<Theme>;
    fn save(&mut self, theme: Theme);
}

/// In-memory store, for tests and for pages without storage.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryStore {
    value: Option<Theme>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_value(theme: Theme) -> Self {
        Self { value: Some(theme) }
    }

    pub fn value(&self) -> Option<Theme> {
        self.value
    }
}

impl ThemeStore for MemoryStore {
    fn load(&self) -> Option<Theme> {
        self.value
    }

    fn save(&mut self, theme: Theme) {
        self.value = Some(theme);
    }
}

/// Sole writer of theme state and storage.
#[derive(Debug)]
pub struct ThemeController<S: ThemeStore> {
    state: ThemeState,
    store: S,
}

impl<S: ThemeStore> ThemeController<S> {
    /// Start from the stored choice, or `default` when nothing is stored.
    pub fn new(store: S, default: Theme) -> Self {
        let initial = store.load().unwrap_or(default);
        Self {
            state: ThemeState::new(initial),
            store,
        }
    }

    pub fn theme(&self) -> Theme {
        self.state.get()
    }

    /// Persist and apply `theme`.
    pub fn set(&mut self, theme: Theme) -> bool {
        self.store.save(theme);
        self.state.set(theme)
    }

    /// Advance to the next theme in toggle order.
    pub fn toggle(&mut self) -> Theme {
        let next = self.theme().next();
        self.set(next);
        next
    }

    pub fn subscribe(&mut self, listener: impl FnMut(Theme) + 'static) -> SubscriptionId {
        self.state.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.state.unsubscribe(id)
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn recorder() -> (Rc<RefCell<Vec<Theme>>>, impl FnMut(Theme) + 'static) {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        (seen, move |t| sink.borrow_mut().push(t))
    }

    #[test]
    fn parse_and_display() {
        assert_eq!(Theme::parse("Dark"), Some(Theme::Dark));
        assert_eq!(Theme::parse("sepia"), None);
        assert_eq!(Theme::System.to_string(), "system");
    }

    #[test]
    fn system_resolves_by_preference() {
        assert_eq!(Theme::System.resolve(true), Theme::Dark);
        assert_eq!(Theme::System.resolve(false), Theme::Light);
        assert_eq!(Theme::Light.resolve(true), Theme::Light);
    }

    #[test]
    fn subscribers_notified_on_change_only() {
        let mut state = ThemeState::new(Theme::Light);
        let (seen, listener) = recorder();
        state.subscribe(listener);

        assert!(!state.set(Theme::Light));
        assert!(state.set(Theme::Dark));
        assert_eq!(state.get(), Theme::Dark);
        assert_eq!(*seen.borrow(), vec![Theme::Dark]);
    }

    #[test]
    fn unsubscribe_stops_notifications() {
        let mut state = ThemeState::new(Theme::Light);
        let (seen, listener) = recorder();
        let id = state.subscribe(listener);
        assert!(state.unsubscribe(id));
        assert!(!state.unsubscribe(id));
        state.set(Theme::Dark);
        assert!(seen.borrow().is_empty());
    }

    #[test]
    fn controller_starts_from_stored_value() {
        let controller = ThemeController::new(MemoryStore::with_value(Theme::Dark), Theme::System);
        assert_eq!(controller.theme(), Theme::Dark);
    }

    #[test]
    fn controller_falls_back_to_default() {
        let controller = ThemeController::new(MemoryStore::new(), Theme::Light);
        assert_eq!(controller.theme(), Theme::Light);
        assert_eq!(controller.store().value(), None);
    }

    #[test]
    fn controller_persists_and_notifies() {
        let mut controller = ThemeController::new(MemoryStore::new(), Theme::System);
        let (seen, listener) = recorder();
        controller.subscribe(listener);

        controller.set(Theme::Dark);
        assert_eq!(controller.store().value(), Some(Theme::Dark));
        assert_eq!(*seen.borrow(), vec![Theme::Dark]);
    }

    #[test]
    fn toggle_cycles_through_all_themes() {
        let mut controller = ThemeController::new(MemoryStore::new(), Theme::Light);
        assert_eq!(controller.toggle(), Theme::Dark);
        assert_eq!(controller.toggle(), Theme::System);
        assert_eq!(controller.toggle(), Theme::Light);
        assert_eq!(controller.store().value(), Some(Theme::Light));
    }
}
