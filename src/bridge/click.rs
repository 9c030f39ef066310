//! The per-table click interceptor.

use std::fmt;
use std::sync::{Arc, Mutex, PoisonError, RwLock, Weak};

use super::bus::EventBus;
use super::event::SemanticClickEvent;
use crate::columns::{ColumnResolver, ColumnType};
use crate::config::BridgeConfig;
use crate::error::BridgeResult;
use crate::listeners::{ListenerId, ListenerRegistry};
use crate::traits::{
    cell_text, closest_cell, DomEvent, EventCallback, ListenerOptions, Modifier, TabId,
    TableView, WindowView,
};

/// What happened to one intercepted click.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickOutcome {
    /// A semantic event went out; `delivered` callbacks accepted it.
    Published { column: ColumnType, delivered: usize },
    /// Not the primary button.
    IgnoredButton,
    /// The required modifier was not held.
    IgnoredModifier,
    /// The click did not land inside a table cell.
    NoCell,
    /// The cell belongs to a column the mapping does not know.
    UnknownColumn,
}

impl ClickOutcome {
    pub fn is_published(&self) -> bool {
        matches!(self, ClickOutcome::Published { .. })
    }
}

/// Turns modifier-clicks on table cells into [`SemanticClickEvent`]s.
///
/// One bridge serves one table. Its listener only holds a weak reference
/// back to the bridge, so dropping the bridge silences the listener even
/// before it is detached.
pub struct EventBridge {
    origin: RwLock<TabId>,
    window: Weak<dyn WindowView>,
    resolver: Arc<ColumnResolver>,
    bus: EventBus,
    required_modifier: Modifier,
    event_type: String,
    capture: bool,
    attached: Mutex<Option<ListenerId>>,
    this: Weak<EventBridge>,
}

impl EventBridge {
    pub fn new(
        origin: TabId,
        window: &Arc<dyn WindowView>,
        resolver: Arc<ColumnResolver>,
        bus: EventBus,
        config: &BridgeConfig,
    ) -> Arc<Self> {
        Arc::new_cyclic(|this| Self {
            origin: RwLock::new(origin),
            window: Arc::downgrade(window),
            resolver,
            bus,
            required_modifier: config.required_modifier,
            event_type: config.click_event_type.clone(),
            capture: config.capture,
            attached: Mutex::new(None),
            this: this.clone(),
        })
    }

    /// Tab reported as the origin of published clicks.
    pub fn origin(&self) -> TabId {
        *self.origin.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Report clicks as coming from `tab` from now on.
    pub fn set_origin(&self, tab: TabId) {
        *self.origin.write().unwrap_or_else(PoisonError::into_inner) = tab;
    }

    pub fn resolver(&self) -> &Arc<ColumnResolver> {
        &self.resolver
    }

    /// Install the click listener on `table`.
    ///
    /// Calling it again while attached returns the existing listener id.
    pub fn attach(
        &self,
        registry: &ListenerRegistry,
        table: Arc<dyn TableView>,
    ) -> BridgeResult<ListenerId> {
        let mut attached = self
            .attached
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(id) = *attached {
            if registry.contains(id) {
                return Ok(id);
            }
        }

        let this = self.this.clone();
        let callback: EventCallback = Arc::new(move |event: &DomEvent| {
            if let Some(bridge) = this.upgrade() {
                bridge.handle_event(event);
            }
        });
        let options = ListenerOptions {
            capture: self.capture,
            passive: false,
        };
        let id = registry.add(table, &self.event_type, callback, options)?;
        *attached = Some(id);

        tracing::debug!(
            listener_id = id.get(),
            tab = %self.origin(),
            "Click bridge attached (modifier: {})",
            self.required_modifier
        );
        Ok(id)
    }

    /// Remove the click listener. Returns whether one was attached.
    pub fn detach(&self, registry: &ListenerRegistry) -> bool {
        let id = self
            .attached
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        match id {
            Some(id) => registry.remove(id),
            None => false,
        }
    }

    pub fn listener_id(&self) -> Option<ListenerId> {
        *self.attached.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Filter, classify and publish one raw click.
    pub fn handle_event(&self, event: &DomEvent) -> ClickOutcome {
        if !event.button.is_primary() {
            return ClickOutcome::IgnoredButton;
        }
        if !event.modifiers.contains(self.required_modifier) {
            return ClickOutcome::IgnoredModifier;
        }

        let cell = match event.target.as_ref().and_then(closest_cell) {
            Some(cell) => cell,
            None => {
                tracing::warn!("Modifier-click outside any table cell, ignoring");
                return ClickOutcome::NoCell;
            }
        };

        let column = match self.window.upgrade() {
            Some(window) => self
                .resolver
                .mapping(window.as_ref())
                .column_for_cell(cell.as_ref()),
            None => None,
        };
        let column = match column {
            Some(column) => column,
            None => {
                tracing::warn!(
                    "Clicked cell has no known column (classes: {:?}), ignoring",
                    cell.class_tokens()
                );
                return ClickOutcome::UnknownColumn;
            }
        };

        let text = cell_text(cell.as_ref());
        let origin = self.origin();
        tracing::debug!(tab = %origin, "Column click on {}: {:?}", column, text);
        let delivered = self
            .bus
            .publish_click(SemanticClickEvent::new(column, text, origin));
        ClickOutcome::Published { column, delivered }
    }
}

impl fmt::Debug for EventBridge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBridge")
            .field("origin", &self.origin())
            .field("required_modifier", &self.required_modifier)
            .field("event_type", &self.event_type)
            .field("listener_id", &self.listener_id())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::mock::{MockElement, MockTable, MockWindow};
    use crate::traits::{ElementRef, Modifiers, PointerButton};

    struct Fixture {
        table: Arc<MockTable>,
        window: Arc<MockWindow>,
        registry: ListenerRegistry,
        bus: EventBus,
        bridge: Arc<EventBridge>,
        subject_span: ElementRef,
    }

    fn fixture(config: &BridgeConfig) -> Fixture {
        let table = MockTable::with_headers(["sendercol-column", "subjectcol-column", "datecol-column"]);
        let subject = MockElement::cell(["subjectcol-column"]).with_title("Quarterly Report");
        let span = MockElement::other().with_text("Quarterly Rep…");
        subject.append_child(&span);
        table.push_row(&[
            MockElement::cell(["sendercol-column"]).with_text("alice"),
            subject,
            MockElement::cell(["datecol-column"]).with_text("Today"),
        ]);

        let window = MockWindow::with_table(1, table.clone());
        let dyn_window: Arc<dyn WindowView> = window.clone();
        let resolver = Arc::new(ColumnResolver::new(dyn_window.window_id()));
        let bus = EventBus::default();
        let bridge = EventBridge::new(TabId(7), &dyn_window, resolver, bus.clone(), config);
        let registry = ListenerRegistry::new();
        bridge.attach(&registry, table.clone()).unwrap();

        Fixture {
            table,
            window,
            registry,
            bus,
            bridge,
            subject_span: span,
        }
    }

    fn alt_click(target: ElementRef) -> DomEvent {
        DomEvent::click(PointerButton::Primary, Modifiers::alt(), Some(target))
    }

    #[test]
    fn test_alt_click_publishes_title() {
        let f = fixture(&BridgeConfig::default());
        let seen = Arc::new(Mutex::new(Vec::new()));
        let s = Arc::clone(&seen);
        let _ = f.bus.register_click_listener(move |column, text| {
            s.lock().unwrap().push((column, text.to_string()));
        });

        assert_eq!(f.table.dispatch(&alt_click(f.subject_span.clone())), 1);
        assert_eq!(
            *seen.lock().unwrap(),
            vec![(ColumnType::Subject, "Quarterly Report".to_string())]
        );
    }

    #[test]
    fn test_plain_click_publishes_nothing() {
        let f = fixture(&BridgeConfig::default());
        let event = DomEvent::click(
            PointerButton::Primary,
            Modifiers::none(),
            Some(f.subject_span.clone()),
        );
        assert_eq!(f.bridge.handle_event(&event), ClickOutcome::IgnoredModifier);
    }

    #[test]
    fn test_secondary_button_ignored() {
        let f = fixture(&BridgeConfig::default());
        let event = DomEvent::click(
            PointerButton::Secondary,
            Modifiers::alt(),
            Some(f.subject_span.clone()),
        );
        assert_eq!(f.bridge.handle_event(&event), ClickOutcome::IgnoredButton);
    }

    #[test]
    fn test_click_outside_cell() {
        let f = fixture(&BridgeConfig::default());
        let gutter: ElementRef = f.table.body();
        assert_eq!(f.bridge.handle_event(&alt_click(gutter)), ClickOutcome::NoCell);
        assert_eq!(
            f.bridge.handle_event(&DomEvent::click(PointerButton::Primary, Modifiers::alt(), None)),
            ClickOutcome::NoCell
        );
    }

    #[test]
    fn test_unknown_column() {
        let f = fixture(&BridgeConfig::default());
        let date_cell: ElementRef = f.table.body().children_arcs()[0].children_arcs()[2].clone();
        assert_eq!(f.bridge.handle_event(&alt_click(date_cell)), ClickOutcome::UnknownColumn);
    }

    #[test]
    fn test_text_fallback() {
        let f = fixture(&BridgeConfig::default());
        let sender_cell: ElementRef = f.table.body().children_arcs()[0].children_arcs()[0].clone();
        let seen = Arc::new(Mutex::new(String::new()));
        let s = Arc::clone(&seen);
        let _ = f.bus.register_click_listener(move |_, text| *s.lock().unwrap() = text.to_string());

        let outcome = f.bridge.handle_event(&alt_click(sender_cell));
        assert_eq!(
            outcome,
            ClickOutcome::Published {
                column: ColumnType::Sender,
                delivered: 1
            }
        );
        assert_eq!(*seen.lock().unwrap(), "alice");
    }

    #[test]
    fn test_configured_modifier() {
        let config = BridgeConfig::default().with_required_modifier(Modifier::Ctrl);
        let f = fixture(&config);
        let ctrl = Modifiers {
            ctrl: true,
            ..Modifiers::none()
        };

        assert_eq!(
            f.bridge.handle_event(&alt_click(f.subject_span.clone())),
            ClickOutcome::IgnoredModifier
        );
        let event = DomEvent::click(PointerButton::Primary, ctrl, Some(f.subject_span.clone()));
        assert!(f.bridge.handle_event(&event).is_published());
    }

    #[test]
    fn test_attach_is_idempotent() {
        let f = fixture(&BridgeConfig::default());
        let first = f.bridge.listener_id().unwrap();
        let again = f.bridge.attach(&f.registry, f.table.clone()).unwrap();

        assert_eq!(first, again);
        assert_eq!(f.table.listener_count(), 1);
        assert_eq!(f.registry.count(), 1);

        assert!(f.bridge.detach(&f.registry));
        assert!(!f.bridge.detach(&f.registry));
        assert_eq!(f.table.listener_count(), 0);
    }

    #[test]
    fn test_window_gone_means_unknown_column() {
        let f = fixture(&BridgeConfig::default());
        let Fixture {
            window,
            bridge,
            subject_span,
            ..
        } = f;
        drop(window);
        assert_eq!(bridge.handle_event(&alt_click(subject_span)), ClickOutcome::UnknownColumn);
    }

    #[test]
    fn test_mapping_discovered_once() {
        let f = fixture(&BridgeConfig::default());
        for _ in 0..3 {
            f.bridge.handle_event(&alt_click(f.subject_span.clone()));
        }
        assert_eq!(f.table.header_queries(), 1);
        assert!(f.bridge.resolver().cached().is_some());
        assert_eq!(f.window.listener_count(), 0);
    }
}
