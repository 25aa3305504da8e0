//! Scroll-synchronized table of contents.
//!
//! The TOC lists a post's level-2 headings and highlights the one the reader
//! is in. The decision is split in two:
//!
//! - [`compute_active_heading`] is a pure function of scroll metrics and
//!   heading positions.
//! - [`ScrollSync`] owns the state machine: it measures through a
//!   [`TocSurface`] (the DOM, or a fake in tests), rate-limits scroll
//!   handling with a [`Throttle`], and keeps the indicator in step.
//!
//! ## Active heading rule
//!
//! ```text
//! ┌──────────── viewport ────────────┐  scroll_y
//! │                                  │
//! │ - - - - - - - - - - - - - - - - -│  scroll_y + offset (150px)
//! │  headings above this line are    │
//! │  "reached"; the last one wins    │
//! └──────────────────────────────────┘
//! ```
//!
//! 1. Within `bottom_threshold` (100px) of the document end → last entry.
//!    Short trailing sections would otherwise never become active.
//! 2. Else the last entry whose top is ≤ `scroll_y + offset`.
//! 3. Else the first entry.
//!
//! The generated `toc.js` implements the same rules in the browser, with
//! the thresholds passed as data attributes.

use crate::config::TocConfig;
use crate::types::Heading;
use std::time::Duration;

/// Heading level that appears in the TOC.
pub const TOC_LEVEL: u8 = 2;

/// One TOC line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TocEntry {
    pub id: String,
    pub text: String,
}

/// Level-2 headings minus those whose text is a reserved title.
///
/// `headings` is the renderer's side-table, which already leaves out
/// headings inside footnotes.
pub fn collect_toc_entries(headings: &[Heading], reserved_titles: &[String]) -> Vec<TocEntry> {
    headings
        .iter()
        .filter(|h| h.level == TOC_LEVEL)
        .filter(|h| !reserved_titles.iter().any(|r| *r == h.text))
        .map(|h| TocEntry {
            id: h.id.clone(),
            text: h.text.clone(),
        })
        .collect()
}

/// Scroll position and sizes, in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollMetrics {
    pub scroll_y: f64,
    pub viewport_height: f64,
    pub document_height: f64,
}

impl ScrollMetrics {
    fn distance_to_bottom(&self) -> f64 {
        self.document_height - (self.scroll_y + self.viewport_height)
    }
}

/// Top of a heading in document coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct HeadingPosition {
    pub id: String,
    pub top: f64,
}

/// Thresholds for [`compute_active_heading`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollRule {
    pub offset: f64,
    pub bottom_threshold: f64,
}

impl Default for ScrollRule {
    fn default() -> Self {
        Self::from(&TocConfig::default())
    }
}

impl From<&TocConfig> for ScrollRule {
    fn from(config: &TocConfig) -> Self {
        Self {
            offset: config.offset,
            bottom_threshold: config.bottom_threshold,
        }
    }
}

/// The id of the heading the reader is in, or `None` with no headings.
pub fn compute_active_heading<'a>(
    metrics: &ScrollMetrics,
    headings: &'a [HeadingPosition],
    rule: &ScrollRule,
) -> Option<&'a str> {
    let last = headings.last()?;
    if metrics.distance_to_bottom() <= rule.bottom_threshold {
        return Some(&last.id);
    }
    let line = metrics.scroll_y + rule.offset;
    headings
        .iter()
        .filter(|h| h.top <= line)
        .last()
        .or_else(|| headings.first())
        .map(|h| h.id.as_str())
}

/// Leading-edge rate limiter driven by caller-supplied timestamps.
#[derive(Debug, Clone)]
pub struct Throttle {
    interval: Duration,
    last_run: Option<Duration>,
}

impl Throttle {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_run: None,
        }
    }

    /// Whether work may run at `now`. Records the run when it may.
    pub fn try_acquire(&mut self, now: Duration) -> bool {
        if self.is_ready(now) {
            self.last_run = Some(now);
            true
        } else {
            false
        }
    }

    pub fn is_ready(&self, now: Duration) -> bool {
        match self.last_run {
            None => true,
            Some(last) => now.saturating_sub(last) >= self.interval,
        }
    }
}

/// What the navigator reads from and does to the page.
pub trait TocSurface {
    fn metrics(&self) -> ScrollMetrics;
    /// Document-relative top of the heading with `id`.
    fn heading_top(&self, id: &str) -> Option<f64>;
    /// Offset of the TOC entry for `id` inside the TOC list.
    fn entry_offset(&self, id: &str) -> Option<f64>;
    fn scroll_to(&mut self, y: f64);
    /// Replace the URL fragment without navigating.
    fn replace_fragment(&mut self, id: &str);
}

/// Active entry and indicator position.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScrollState {
    pub active_id: Option<String>,
    pub indicator_offset: f64,
}

/// The TOC state machine for one mounted page.
#[derive(Debug)]
pub struct ScrollSync<S: TocSurface> {
    surface: S,
    entries: Vec<TocEntry>,
    rule: ScrollRule,
    throttle: Throttle,
    state: ScrollState,
    pending: bool,
    mounted: bool,
}

impl<S: TocSurface> ScrollSync<S> {
    /// Collect entries and activate the first one.
    pub fn mount(surface: S, headings: &[Heading], config: &TocConfig) -> Self {
        let entries = collect_toc_entries(headings, &config.reserved_titles);
        let mut sync = Self {
            surface,
            entries,
            rule: ScrollRule::from(config),
            throttle: Throttle::new(Duration::from_millis(config.throttle_ms)),
            state: ScrollState::default(),
            pending: false,
            mounted: true,
        };
        let first = sync.entries.first().map(|e| e.id.clone());
        sync.activate(first);
        sync
    }

    /// Handle a scroll event. Runs immediately outside the cooldown;
    /// otherwise the event is kept for [`tick`](Self::tick).
    /// Returns whether the active entry changed.
    pub fn on_scroll(&mut self, now: Duration) -> bool {
        if !self.mounted {
            return false;
        }
        if self.throttle.try_acquire(now) {
            self.pending = false;
            self.recompute()
        } else {
            self.pending = true;
            false
        }
    }

    /// Apply a scroll held back by the throttle, once the cooldown is over.
    pub fn tick(&mut self, now: Duration) -> bool {
        if !self.mounted || !self.pending || !self.throttle.try_acquire(now) {
            return false;
        }
        self.pending = false;
        self.recompute()
    }

    /// Jump to the heading for a clicked entry and activate it at once.
    /// Unknown ids are ignored.
    pub fn on_click(&mut self, id: &str) -> bool {
        if !self.mounted || !self.entries.iter().any(|e| e.id == id) {
            return false;
        }
        if let Some(top) = self.surface.heading_top(id) {
            self.surface.scroll_to(top);
        }
        self.surface.replace_fragment(id);
        self.activate(Some(id.to_string()))
    }

    /// Stop reacting to events.
    pub fn unmount(&mut self) {
        self.mounted = false;
        self.pending = false;
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    pub fn has_pending(&self) -> bool {
        self.pending
    }

    pub fn entries(&self) -> &[TocEntry] {
        &self.entries
    }

    pub fn state(&self) -> &ScrollState {
        &self.state
    }

    pub fn active_id(&self) -> Option<&str> {
        self.state.active_id.as_deref()
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    fn recompute(&mut self) -> bool {
        let positions: Vec<HeadingPosition> = self
            .entries
            .iter()
            .filter_map(|e| {
                self.surface.heading_top(&e.id).map(|top| HeadingPosition {
                    id: e.id.clone(),
                    top,
                })
            })
            .collect();
        let metrics = self.surface.metrics();
        let active = compute_active_heading(&metrics, &positions, &self.rule).map(str::to_string);
        self.activate(active)
    }

    /// Set the active id; the indicator moves in the same call.
    fn activate(&mut self, id: Option<String>) -> bool {
        if id == self.state.active_id {
            return false;
        }
        self.state.indicator_offset = id
            .as_deref()
            .and_then(|id| self.surface.entry_offset(id))
            .unwrap_or(0.0);
        self.state.active_id = id;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn heading(id: &str, text: &str, level: u8) -> Heading {
        Heading {
            id: id.into(),
            text: text.into(),
            level,
        }
    }

    fn pos(id: &str, top: f64) -> HeadingPosition {
        HeadingPosition {
            id: id.into(),
            top,
        }
    }

    fn metrics(scroll_y: f64) -> ScrollMetrics {
        ScrollMetrics {
            scroll_y,
            viewport_height: 800.0,
            document_height: 5200.0,
        }
    }

    #[derive(Debug, Default)]
    struct FakePage {
        scroll_y: f64,
        tops: HashMap<String, f64>,
        entry_offsets: HashMap<String, f64>,
        fragments: Vec<String>,
    }

    impl FakePage {
        fn with(headings: &[(&str, f64)]) -> Self {
            let mut page = FakePage::default();
            for (i, (id, top)) in headings.iter().enumerate() {
                page.tops.insert(id.to_string(), *top);
                page.entry_offsets.insert(id.to_string(), i as f64 * 32.0);
            }
            page
        }
    }

    impl TocSurface for FakePage {
        fn metrics(&self) -> ScrollMetrics {
            metrics(self.scroll_y)
        }
        fn heading_top(&self, id: &str) -> Option<f64> {
            self.tops.get(id).copied()
        }
        fn entry_offset(&self, id: &str) -> Option<f64> {
            self.entry_offsets.get(id).copied()
        }
        fn scroll_to(&mut self, y: f64) {
            self.scroll_y = y;
        }
        fn replace_fragment(&mut self, id: &str) {
            self.fragments.push(id.to_string());
        }
    }

    fn mounted() -> ScrollSync<FakePage> {
        let page = FakePage::with(&[("intro", 0.0), ("setup", 1200.0), ("usage", 2600.0)]);
        let headings = vec![
            heading("intro", "Intro", 2),
            heading("setup", "Setup", 2),
            heading("details", "Details", 3),
            heading("usage", "Usage", 2),
            heading("subscribe", "Subscribe", 2),
        ];
        ScrollSync::mount(page, &headings, &TocConfig::default())
    }

    // =========================================================================
    // Entry collection
    // =========================================================================

    #[test]
    fn entries_are_level_two_minus_reserved() {
        let headings = vec![
            heading("a", "A", 1),
            heading("b", "B", 2),
            heading("c", "C", 3),
            heading("subscribe", "Subscribe", 2),
            heading("subscribe-now", "Subscribe now", 2),
        ];
        let entries = collect_toc_entries(&headings, &["Subscribe".to_string()]);
        let ids: Vec<&str> = entries.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "subscribe-now"]);
    }

    // =========================================================================
    // compute_active_heading
    // =========================================================================

    #[test]
    fn bottom_rule_overrides_offset_rule() {
        let headings = vec![pos("h1", 0.0), pos("h2", 5000.0)];
        let at_bottom = metrics(4350.0);
        let rule = ScrollRule::default();
        assert!(4350.0 + rule.offset < 5000.0, "offset rule alone picks h1");
        assert_eq!(compute_active_heading(&at_bottom, &headings, &rule), Some("h2"));
    }

    #[test]
    fn last_reached_heading_wins() {
        let headings = vec![pos("a", 0.0), pos("b", 1000.0), pos("c", 2000.0)];
        let rule = ScrollRule::default();
        assert_eq!(compute_active_heading(&metrics(900.0), &headings, &rule), Some("b"));
        assert_eq!(compute_active_heading(&metrics(849.0), &headings, &rule), Some("a"));
        assert_eq!(compute_active_heading(&metrics(1850.0), &headings, &rule), Some("c"));
    }

    #[test]
    fn first_heading_when_none_reached() {
        let headings = vec![pos("a", 500.0), pos("b", 1000.0)];
        let rule = ScrollRule::default();
        assert_eq!(compute_active_heading(&metrics(0.0), &headings, &rule), Some("a"));
    }

    #[test]
    fn no_headings_no_active() {
        assert_eq!(
            compute_active_heading(&metrics(0.0), &[], &ScrollRule::default()),
            None
        );
    }

    // =========================================================================
    // Throttle
    // =========================================================================

    #[test]
    fn throttle_allows_once_per_interval() {
        let mut throttle = Throttle::new(ms(100));
        assert!(throttle.try_acquire(ms(0)));
        assert!(!throttle.try_acquire(ms(50)));
        assert!(!throttle.try_acquire(ms(99)));
        assert!(throttle.try_acquire(ms(100)));
        assert!(!throttle.is_ready(ms(150)));
        assert!(throttle.is_ready(ms(200)));
    }

    // =========================================================================
    // ScrollSync
    // =========================================================================

    #[test]
    fn mount_activates_first_entry() {
        let sync = mounted();
        assert_eq!(sync.active_id(), Some("intro"));
        assert_eq!(sync.state().indicator_offset, 0.0);
        assert_eq!(sync.entries().len(), 3);
    }

    #[test]
    fn mount_with_no_entries_has_no_active() {
        let sync = ScrollSync::mount(FakePage::default(), &[], &TocConfig::default());
        assert_eq!(sync.active_id(), None);
    }

    #[test]
    fn scroll_updates_active_and_indicator_together() {
        let mut sync = mounted();
        sync.surface_mut().scroll_y = 1100.0;
        assert!(sync.on_scroll(ms(0)));
        assert_eq!(sync.active_id(), Some("setup"));
        assert_eq!(sync.state().indicator_offset, 32.0);
    }

    #[test]
    fn scroll_during_cooldown_is_pending_until_tick() {
        let mut sync = mounted();
        sync.on_scroll(ms(0));

        sync.surface_mut().scroll_y = 2500.0;
        assert!(!sync.on_scroll(ms(40)));
        assert!(sync.has_pending());
        assert_eq!(sync.active_id(), Some("intro"));

        assert!(!sync.tick(ms(80)), "still cooling down");
        assert!(sync.tick(ms(100)));
        assert_eq!(sync.active_id(), Some("usage"));
        assert_eq!(sync.state().indicator_offset, 64.0);
        assert!(!sync.has_pending());
    }

    #[test]
    fn tick_without_pending_does_nothing() {
        let mut sync = mounted();
        sync.surface_mut().scroll_y = 2500.0;
        assert!(!sync.tick(ms(500)));
        assert_eq!(sync.active_id(), Some("intro"));
    }

    #[test]
    fn click_scrolls_activates_and_sets_fragment() {
        let mut sync = mounted();
        assert!(sync.on_click("usage"));
        assert_eq!(sync.active_id(), Some("usage"));
        assert_eq!(sync.state().indicator_offset, 64.0);
        assert_eq!(sync.surface().scroll_y, 2600.0);
        assert_eq!(sync.surface().fragments, vec!["usage"]);
    }

    #[test]
    fn click_on_unknown_or_reserved_entry_ignored() {
        let mut sync = mounted();
        assert!(!sync.on_click("subscribe"));
        assert!(!sync.on_click("details"));
        assert_eq!(sync.active_id(), Some("intro"));
        assert!(sync.surface().fragments.is_empty());
    }

    #[test]
    fn unmount_ignores_later_events() {
        let mut sync = mounted();
        sync.on_scroll(ms(0));
        sync.surface_mut().scroll_y = 2500.0;
        sync.on_scroll(ms(10));
        sync.unmount();

        assert!(!sync.is_mounted());
        assert!(!sync.tick(ms(500)));
        assert!(!sync.on_scroll(ms(1000)));
        assert!(!sync.on_click("usage"));
        assert_eq!(sync.active_id(), Some("intro"));
    }

    #[test]
    fn reaching_bottom_activates_last_entry() {
        let page = FakePage::with(&[("h1", 0.0), ("h2", 5000.0)]);
        let headings = vec![heading("h1", "H1", 2), heading("h2", "H2", 2)];
        let mut sync = ScrollSync::mount(page, &headings, &TocConfig::default());
        sync.surface_mut().scroll_y = 4350.0;
        assert!(sync.on_scroll(ms(0)));
        assert_eq!(sync.active_id(), Some("h2"));
    }
}
