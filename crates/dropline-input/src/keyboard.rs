#![forbid(unsafe_code)]

//! Keyboard drag controller.
//!
//! A keyboard drag moves focus between compatible drop targets instead of a
//! floating preview. Entry uses a dedicated chord (default `Alt+M`) so that
//! Space/Enter keep activating controls inside draggable items.
//!
//! # State Machine
//!
//! ```text
//! Idle --entry chord--> KeyboardDragging --Enter/Space--> Idle (drop)
//!                         |     ^        --Escape-------> Idle (cancel)
//!                         +-----+ arrows / Home / End
//! ```
//!
//! # Invariants
//!
//! 1. Candidates are computed once on entry, in registration order: targets
//!    with `can_drop` whose zone differs from the item's source zone.
//! 2. Navigation wraps: next from the last candidate is the first, previous
//!    from the first is the last. With no selection, next picks the first and
//!    previous picks the last.
//! 3. Candidates unregistered mid-drag are skipped, never selected.
//! 4. Every transition queues exactly one announcement.

use std::fmt;

use dropline_core::{
    DragEnd, DragItem, DragMode, DragOrigin, DragStore, DropTargetState, Rect, Session, TargetId,
    ZoneId,
};

use crate::announce::{Announcements, EnglishAnnouncements};
use crate::key::{KeyChord, KeyCode, KeyEvent, Modifiers};

#[cfg(feature = "tracing")]
use tracing::debug;

/// Default entry chord: `Alt+M`.
pub const DEFAULT_ENTRY_CHORD: KeyChord = KeyChord::new(KeyCode::Char('m'), Modifiers::ALT);

/// Maximum undrained announcements kept; older ones are dropped first.
pub const MAX_PENDING_ANNOUNCEMENTS: usize = 16;

/// Keyboard controller configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct KeyboardConfig {
    pub entry_chord: KeyChord,
}

impl Default for KeyboardConfig {
    fn default() -> Self {
        Self {
            entry_chord: DEFAULT_ENTRY_CHORD,
        }
    }
}

impl KeyboardConfig {
    pub fn validate(&self) -> Result<(), KeyboardConfigError> {
        if self.entry_chord.is_activation_key() {
            return Err(KeyboardConfigError::EntryChordConflicts {
                chord: self.entry_chord,
            });
        }
        Ok(())
    }
}

/// Invalid keyboard configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyboardConfigError {
    /// The entry chord is plain Space or Enter, which activate controls.
    EntryChordConflicts { chord: KeyChord },
}

impl fmt::Display for KeyboardConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EntryChordConflicts { chord } => write!(
                f,
                "keyboard drag entry chord {:?} collides with control activation keys",
                chord.code
            ),
        }
    }
}

impl std::error::Error for KeyboardConfigError {}

/// The focused draggable a keyboard drag would pick up.
#[derive(Debug, Clone, PartialEq)]
pub struct FocusedDraggable {
    pub item: DragItem,
    /// Current bounds of the source element; the drag starts at its center.
    pub bounds: Rect,
}

/// Result of one key dispatch.
#[derive(Debug, Clone, PartialEq)]
pub enum KeyboardOutcome {
    /// Not a keyboard-drag key; the host keeps its default handling.
    Ignored,
    /// A pointer drag owns the session.
    Blocked,
    Started { candidates: usize },
    Moved(TargetId),
    /// Navigation requested but no compatible target remains.
    NoTargets,
    Dropped(DragEnd),
    Cancelled(DragEnd),
}

impl KeyboardOutcome {
    /// Whether the host should swallow the key event.
    #[must_use]
    pub fn consumed(&self) -> bool {
        !matches!(self, Self::Ignored)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Nav {
    Next,
    Prev,
    First,
    Last,
}

#[derive(Debug, Clone)]
struct KeyboardDrag {
    candidates: Vec<TargetId>,
    selected: Option<TargetId>,
}

/// Keyboard drag controller.
#[derive(Debug)]
pub struct KeyboardController {
    config: KeyboardConfig,
    drag: Option<KeyboardDrag>,
    formatter: Box<dyn Announcements>,
    announcements: Vec<String>,
}

impl KeyboardController {
    /// Construct a controller with English announcements.
    pub fn new(config: KeyboardConfig) -> Result<Self, KeyboardConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            drag: None,
            formatter: Box::new(EnglishAnnouncements),
            announcements: Vec::new(),
        })
    }

    /// Replace the announcement formatter.
    #[must_use]
    pub fn with_announcements(mut self, formatter: Box<dyn Announcements>) -> Self {
        self.formatter = formatter;
        self
    }

    #[must_use]
    pub const fn config(&self) -> KeyboardConfig {
        self.config
    }

    #[must_use]
    pub fn formatter(&self) -> &dyn Announcements {
        self.formatter.as_ref()
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.drag.is_some()
    }

    /// Candidate targets of the active drag, in navigation order.
    #[must_use]
    pub fn candidates(&self) -> &[TargetId] {
        self.drag.as_ref().map_or(&[], |drag| drag.candidates.as_slice())
    }

    #[must_use]
    pub fn selected(&self) -> Option<&TargetId> {
        self.drag.as_ref().and_then(|drag| drag.selected.as_ref())
    }

    /// Take every queued announcement.
    pub fn drain_announcements(&mut self) -> Vec<String> {
        std::mem::take(&mut self.announcements)
    }

    /// Route one key press.
    pub fn handle_key(
        &mut self,
        event: KeyEvent,
        focused: Option<&FocusedDraggable>,
        store: &mut DragStore,
    ) -> KeyboardOutcome {
        self.sync_with_store(store);

        if self.drag.is_none() {
            if !self.config.entry_chord.matches(&event) {
                return KeyboardOutcome::Ignored;
            }
            if store.is_dragging() {
                return KeyboardOutcome::Blocked;
            }
            return match focused {
                Some(source) => self.start(source, store),
                None => KeyboardOutcome::Ignored,
            };
        }

        match event.code {
            KeyCode::Down | KeyCode::Right => self.navigate(Nav::Next, store),
            KeyCode::Up | KeyCode::Left => self.navigate(Nav::Prev, store),
            KeyCode::Home => self.navigate(Nav::First, store),
            KeyCode::End => self.navigate(Nav::Last, store),
            KeyCode::Enter | KeyCode::Space | KeyCode::Char(' ') => self.commit(store),
            KeyCode::Escape => self.cancel(store).map_or(KeyboardOutcome::Ignored, KeyboardOutcome::Cancelled),
            _ => KeyboardOutcome::Ignored,
        }
    }

    /// Cancel an active keyboard drag, e.g. on blur or teardown.
    pub fn cancel(&mut self, store: &mut DragStore) -> Option<DragEnd> {
        self.sync_with_store(store);
        self.drag.take()?;
        store.set_active_drop_target(None);
        let end = store.end_drag()?;

        #[cfg(feature = "tracing")]
        debug!(item = %end.item.id(), "keyboard drag cancelled");

        let text = self.formatter.cancelled(&end.item);
        self.announce(text);
        Some(end)
    }

    fn start(&mut self, source: &FocusedDraggable, store: &mut DragStore) -> KeyboardOutcome {
        let center = source.bounds.center();
        let position = source.bounds.with_origin(center.x, center.y);
        store.start_drag(source.item.clone(), position, DragOrigin::Keyboard);

        let source_zone = source.item.source_zone();
        let candidates: Vec<TargetId> = store
            .targets()
            .filter(|target| is_candidate(target, source_zone))
            .map(|target| target.id().clone())
            .collect();

        #[cfg(feature = "tracing")]
        debug!(
            item = %source.item.id(),
            candidates = candidates.len(),
            "keyboard drag started"
        );

        let text = self.formatter.picked_up(&source.item, candidates.len());
        self.announce(text);
        let count = candidates.len();
        self.drag = Some(KeyboardDrag {
            candidates,
            selected: None,
        });
        KeyboardOutcome::Started { candidates: count }
    }

    fn navigate(&mut self, nav: Nav, store: &mut DragStore) -> KeyboardOutcome {
        let Some(drag) = self.drag.as_mut() else {
            return KeyboardOutcome::Ignored;
        };
        drag.candidates
            .retain(|id| store.target(id).is_some_and(DropTargetState::can_drop));
        let total = drag.candidates.len();
        if total == 0 {
            drag.selected = None;
            let text = self.formatter.no_targets();
            self.announce(text);
            return KeyboardOutcome::NoTargets;
        }

        let current = drag
            .selected
            .as_ref()
            .and_then(|selected| drag.candidates.iter().position(|id| id == selected));
        let next = match (nav, current) {
            (Nav::Next, None) | (Nav::First, _) => 0,
            (Nav::Prev, None) | (Nav::Last, _) => total - 1,
            (Nav::Next, Some(i)) => (i + 1) % total,
            (Nav::Prev, Some(i)) => (i + total - 1) % total,
        };
        let id = drag.candidates[next].clone();
        drag.selected = Some(id.clone());

        let Some(target) = store.target(&id) else {
            return KeyboardOutcome::NoTargets;
        };
        let center = target.bounds().center();
        let name = target.descriptor().display_name().to_owned();
        store.update_drag_position(center.x, center.y);
        // Overlapping targets may resolve elsewhere at the center point.
        if store.active_drop_target_id() != Some(&id) {
            store.set_active_drop_target(Some(&id));
        }

        #[cfg(feature = "tracing")]
        debug!(target_id = %id, position = next + 1, total, "keyboard drag moved");

        let text = self.formatter.over_target(&name, next + 1, total);
        self.announce(text);
        KeyboardOutcome::Moved(id)
    }

    fn commit(&mut self, store: &mut DragStore) -> KeyboardOutcome {
        if self.drag.take().is_none() {
            return KeyboardOutcome::Ignored;
        }
        let target_name = store
            .active_drop_target_id()
            .and_then(|id| store.target(id))
            .map(|target| target.descriptor().display_name().to_owned());
        let Some(end) = store.end_drag() else {
            return KeyboardOutcome::Ignored;
        };

        #[cfg(feature = "tracing")]
        debug!(item = %end.item.id(), target_id = ?end.target, "keyboard drag dropped");

        let text = self.formatter.dropped(&end.item, target_name.as_deref());
        self.announce(text);
        KeyboardOutcome::Dropped(end)
    }

    /// Forget a drag the store no longer runs in keyboard mode.
    fn sync_with_store(&mut self, store: &DragStore) {
        if self.drag.is_some() && store.session() != Session::Dragging(DragMode::Keyboard) {
            self.drag = None;
        }
    }

    fn announce(&mut self, text: String) {
        if self.announcements.len() == MAX_PENDING_ANNOUNCEMENTS {
            self.announcements.remove(0);
        }
        self.announcements.push(text);
    }
}

fn is_candidate(target: &DropTargetState, source_zone: Option<&ZoneId>) -> bool {
    let same_zone = matches!((target.zone_id(), source_zone), (Some(a), Some(b)) if a == b);
    target.can_drop() && !same_zone
}

#[cfg(test)]
mod tests {
    use super::*;
    use dropline_core::DropTargetDescriptor;
    use pretty_assertions::assert_eq;

    fn alt_m() -> KeyEvent {
        KeyEvent::new(KeyCode::Char('m')).with_modifiers(Modifiers::ALT)
    }

    fn board() -> DragStore {
        let mut store = DragStore::new();
        for (i, zone) in ["todo", "doing", "done"].into_iter().enumerate() {
            store.register_drop_target(
                DropTargetDescriptor::new(zone, Rect::new(i as f64 * 100.0, 0.0, 90.0, 300.0))
                    .accept("card")
                    .with_zone(zone)
                    .with_announced_name(zone.to_uppercase()),
            );
        }
        store.register_drop_target(
            DropTargetDescriptor::new("trash", Rect::new(0.0, 400.0, 50.0, 50.0)).accept("token"),
        );
        store
    }

    fn focused(zone: &str) -> FocusedDraggable {
        FocusedDraggable {
            item: DragItem::new("c1", "card")
                .with_source_zone(zone)
                .with_metadata("label", "Card"),
            bounds: Rect::new(10.0, 10.0, 80.0, 20.0),
        }
    }

    fn controller() -> KeyboardController {
        KeyboardController::new(KeyboardConfig::default()).expect("default config")
    }

    #[test]
    fn activation_keys_are_rejected_as_entry_chord() {
        let err = KeyboardController::new(KeyboardConfig {
            entry_chord: KeyChord::new(KeyCode::Space, Modifiers::NONE),
        })
        .expect_err("space conflicts");
        assert!(err.to_string().contains("collides"));

        let err = KeyboardConfig {
            entry_chord: KeyChord::new(KeyCode::Char(' '), Modifiers::NONE),
        }
        .validate()
        .expect_err("space character conflicts");
        assert!(matches!(err, KeyboardConfigError::EntryChordConflicts { .. }));
    }

    #[test]
    fn space_and_enter_do_not_start_a_drag() {
        let mut store = board();
        let mut kb = controller();
        let source = focused("todo");
        for code in [KeyCode::Space, KeyCode::Enter, KeyCode::Down] {
            assert_eq!(kb.handle_key(code.into(), Some(&source), &mut store), KeyboardOutcome::Ignored);
        }
        assert!(!store.is_dragging());
    }

    #[test]
    fn entry_computes_candidates_excluding_source_zone() {
        let mut store = board();
        let mut kb = controller();
        let outcome = kb.handle_key(alt_m(), Some(&focused("todo")), &mut store);
        assert_eq!(outcome, KeyboardOutcome::Started { candidates: 2 });
        assert_eq!(
            kb.candidates(),
            &[TargetId::from("doing"), TargetId::from("done")]
        );
        assert_eq!(store.session(), Session::Dragging(DragMode::Keyboard));
        assert_eq!(store.drag_position().map(|p| (p.x, p.y)), Some((50.0, 20.0)));
        assert_eq!(kb.drain_announcements().len(), 1);
    }

    #[test]
    fn arrows_cycle_with_wraparound() {
        let mut store = board();
        let mut kb = controller();
        kb.handle_key(alt_m(), Some(&focused("todo")), &mut store);

        let mut visited = Vec::new();
        for _ in 0..3 {
            if let KeyboardOutcome::Moved(id) = kb.handle_key(KeyCode::Down.into(), None, &mut store) {
                visited.push(id.as_str().to_owned());
            }
        }
        assert_eq!(visited, vec!["doing", "done", "doing"]);
        assert_eq!(store.active_drop_target_id(), Some(&TargetId::from("doing")));

        assert_eq!(
            kb.handle_key(KeyCode::Up.into(), None, &mut store),
            KeyboardOutcome::Moved("done".into())
        );
        assert_eq!(
            kb.handle_key(KeyCode::Home.into(), None, &mut store),
            KeyboardOutcome::Moved("doing".into())
        );
        assert_eq!(
            kb.handle_key(KeyCode::End.into(), None, &mut store),
            KeyboardOutcome::Moved("done".into())
        );
    }

    #[test]
    fn previous_from_no_selection_is_last() {
        let mut store = board();
        let mut kb = controller();
        kb.handle_key(alt_m(), Some(&focused("todo")), &mut store);
        assert_eq!(
            kb.handle_key(KeyCode::Left.into(), None, &mut store),
            KeyboardOutcome::Moved("done".into())
        );
    }

    #[test]
    fn enter_drops_on_selected_target() {
        let mut store = board();
        let mut kb = controller();
        kb.handle_key(alt_m(), Some(&focused("todo")), &mut store);
        kb.handle_key(KeyCode::Down.into(), None, &mut store);
        kb.drain_announcements();

        let KeyboardOutcome::Dropped(end) = kb.handle_key(KeyCode::Enter.into(), None, &mut store)
        else {
            panic!("expected drop");
        };
        assert_eq!(end.target, Some(TargetId::from("doing")));
        assert_eq!(end.mode, DragMode::Keyboard);
        assert!(!kb.is_active());
        assert_eq!(kb.drain_announcements(), vec!["Dropped Card on DOING.".to_owned()]);
    }

    #[test]
    fn space_character_drops_like_space() {
        let mut store = board();
        let mut kb = controller();
        kb.handle_key(alt_m(), Some(&focused("todo")), &mut store);
        kb.handle_key(KeyCode::Down.into(), None, &mut store);

        let outcome = kb.handle_key(KeyCode::Char(' ').into(), None, &mut store);
        assert!(matches!(outcome, KeyboardOutcome::Dropped(_)));
        assert!(!store.is_dragging());
    }

    #[test]
    fn escape_clears_target_then_ends() {
        let mut store = board();
        let mut kb = controller();
        kb.handle_key(alt_m(), Some(&focused("todo")), &mut store);
        kb.handle_key(KeyCode::Down.into(), None, &mut store);

        let KeyboardOutcome::Cancelled(end) = kb.handle_key(KeyCode::Escape.into(), None, &mut store)
        else {
            panic!("expected cancel");
        };
        assert_eq!(end.target, None);
        assert_eq!(store.active_drop_target_id(), None);
        assert!(!store.is_dragging());
    }

    #[test]
    fn unmounted_candidates_are_skipped() {
        let mut store = board();
        let mut kb = controller();
        kb.handle_key(alt_m(), Some(&focused("todo")), &mut store);
        store.unregister_drop_target(&"doing".into());
        assert_eq!(
            kb.handle_key(KeyCode::Down.into(), None, &mut store),
            KeyboardOutcome::Moved("done".into())
        );
        store.unregister_drop_target(&"done".into());
        assert_eq!(
            kb.handle_key(KeyCode::Down.into(), None, &mut store),
            KeyboardOutcome::NoTargets
        );
    }

    #[test]
    fn pointer_drag_blocks_entry() {
        let mut store = board();
        store.start_drag(
            DragItem::new("p", "card"),
            Rect::default(),
            DragOrigin::Pointer { preview: None },
        );
        let mut kb = controller();
        assert_eq!(
            kb.handle_key(alt_m(), Some(&focused("todo")), &mut store),
            KeyboardOutcome::Blocked
        );
    }

    #[test]
    fn drag_replaced_elsewhere_resets_controller() {
        let mut store = board();
        let mut kb = controller();
        kb.handle_key(alt_m(), Some(&focused("todo")), &mut store);
        store.end_drag();
        assert_eq!(kb.handle_key(KeyCode::Down.into(), None, &mut store), KeyboardOutcome::Ignored);
        assert!(!kb.is_active());
    }
}
