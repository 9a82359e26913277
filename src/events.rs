//! Generic event system for the viewer.
//!
//! Callers can subscribe to viewer events via [`EventController`].  Each
//! event carries a set of [`EventKind`] flags (bitflags-style) so that a
//! single occurrence can match multiple categories (e.g. the click that
//! completes a measurement is a `CLICK`, a `PICK_HIT`, a `MEASUREMENT_POINT`
//! and a `MEASUREMENT_COMPLETE`).
//!
//! The caller specifies an [`EventFilter`] to receive only the events they
//! care about.  The filter is a simple OR mask: an event is delivered when
//! `(event.kinds & filter) != 0`.

use std::path::PathBuf;
use std::sync::mpsc::{Receiver, Sender};
use std::sync::{Arc, Mutex, PoisonError};

use crate::data::measurement::{Measurement, Point3};

// ─────────────────────────────────────────────────────────────────────────────
// EventKind – bitflags
// ─────────────────────────────────────────────────────────────────────────────

/// Bitflags describing the *categories* an event belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EventKind(pub u64);

impl EventKind {
    // ── Pointer / picking ───────────────────────────────────────────────
    /// A primary click on the viewport.
    pub const CLICK: Self = Self(1 << 0);
    /// The click ray hit the model.
    pub const PICK_HIT: Self = Self(1 << 1);
    /// The click ray missed the model (or no model was loaded).
    pub const PICK_MISS: Self = Self(1 << 2);

    // ── Measurement ─────────────────────────────────────────────────────
    /// A measurement point was recorded (P1 or P2).
    pub const MEASUREMENT_POINT: Self = Self(1 << 3);
    /// Both points are set and a distance is available.
    pub const MEASUREMENT_COMPLETE: Self = Self(1 << 4);
    /// The previous pair was discarded.
    pub const MEASUREMENT_CLEARED: Self = Self(1 << 5);

    // ── Camera ──────────────────────────────────────────────────────────
    /// The camera orbited around its target.
    pub const ORBIT: Self = Self(1 << 6);
    /// The camera zoomed in or out.
    pub const ZOOM: Self = Self(1 << 7);
    /// The camera returned to its configured pose.
    pub const CAMERA_RESET: Self = Self(1 << 8);

    // ── Viewport ────────────────────────────────────────────────────────
    /// The viewport was resized.
    pub const RESIZE: Self = Self(1 << 9);

    // ── Assets ──────────────────────────────────────────────────────────
    /// Mesh and texture finished loading and were installed.
    pub const MODEL_LOADED: Self = Self(1 << 10);
    /// Mesh or texture failed to load.
    pub const MODEL_LOAD_FAILED: Self = Self(1 << 11);

    /// Wildcard: matches *every* event kind.
    pub const ALL: Self = Self(u64::MAX);

    /// Combine two event kinds (bitwise OR).
    #[inline]
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    /// Check whether `self` contains all bits in `other`.
    #[inline]
    pub const fn contains(self, other: Self) -> bool {
        (self.0 & other.0) == other.0
    }

    /// Check whether `self` intersects with `other` (at least one bit in common).
    #[inline]
    pub const fn intersects(self, other: Self) -> bool {
        (self.0 & other.0) != 0
    }

    /// Returns `true` if no bits are set.
    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl std::ops::BitOr for EventKind {
    type Output = Self;
    #[inline]
    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl std::ops::BitOrAssign for EventKind {
    #[inline]
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl std::ops::BitAnd for EventKind {
    type Output = Self;
    #[inline]
    fn bitand(self, rhs: Self) -> Self {
        Self(self.0 & rhs.0)
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_empty() {
            return write!(f, "EMPTY");
        }
        if *self == EventKind::ALL {
            return write!(f, "ALL");
        }

        let pairs: &[(EventKind, &str)] = &[
            (EventKind::CLICK, "CLICK"),
            (EventKind::PICK_HIT, "PICK_HIT"),
            (EventKind::PICK_MISS, "PICK_MISS"),
            (EventKind::MEASUREMENT_POINT, "MEASUREMENT_POINT"),
            (EventKind::MEASUREMENT_COMPLETE, "MEASUREMENT_COMPLETE"),
            (EventKind::MEASUREMENT_CLEARED, "MEASUREMENT_CLEARED"),
            (EventKind::ORBIT, "ORBIT"),
            (EventKind::ZOOM, "ZOOM"),
            (EventKind::CAMERA_RESET, "CAMERA_RESET"),
            (EventKind::RESIZE, "RESIZE"),
            (EventKind::MODEL_LOADED, "MODEL_LOADED"),
            (EventKind::MODEL_LOAD_FAILED, "MODEL_LOAD_FAILED"),
        ];

        let mut names = Vec::new();
        let mut known_bits: u64 = 0;
        for (kind, name) in pairs {
            known_bits |= kind.0;
            if self.contains(*kind) {
                names.push((*name).to_string());
            }
        }

        let extra = self.0 & !known_bits;
        if extra != 0 {
            names.push(format!("0x{:x}", extra));
        }
        write!(f, "{}", names.join("|"))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Metadata – per-event-type payloads
// ─────────────────────────────────────────────────────────────────────────────

/// Screen (pixel) coordinates relative to the viewport's top-left corner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenPos {
    pub x: f32,
    pub y: f32,
}

/// Metadata attached to click events.
#[derive(Debug, Clone)]
pub struct ClickMeta {
    pub screen_pos: ScreenPos,
    /// Normalized device coordinates of the click.
    pub ndc: [f32; 2],
    /// World-space hit, if the ray struck the model.
    pub hit: Option<Point3>,
}

/// Metadata for measurement events.
///
/// `measurement` is built from the state *after* the transition: present
/// exactly when two points are held.
#[derive(Debug, Clone)]
pub struct MeasurementMeta {
    /// Index the new point landed at (0 = P1, 1 = P2).
    pub point_index: usize,
    pub point: Point3,
    pub measurement: Option<Measurement>,
}

/// Metadata for orbit / zoom / reset events.
#[derive(Debug, Clone, Copy)]
pub struct ViewChangeMeta {
    pub yaw: f32,
    pub pitch: f32,
    pub distance: f32,
}

/// Metadata for resize events.
#[derive(Debug, Clone, Copy)]
pub struct ResizeMeta {
    pub width: f32,
    pub height: f32,
}

/// Metadata for asset load events.
#[derive(Debug, Clone)]
pub struct LoadMeta {
    pub model: PathBuf,
    pub texture: PathBuf,
    /// Number of drawable mesh nodes (0 on failure).
    pub mesh_nodes: usize,
    pub triangles: usize,
    /// Error text on failure.
    pub error: Option<String>,
}

// ─────────────────────────────────────────────────────────────────────────────
// ViewerEvent – the top-level event type
// ─────────────────────────────────────────────────────────────────────────────

/// A rich event emitted by the viewer.
#[derive(Debug, Clone)]
pub struct ViewerEvent {
    /// Bitflag set of categories this event belongs to.
    pub kinds: EventKind,
    /// Seconds since the controller was created.
    pub timestamp: f64,

    pub click: Option<ClickMeta>,
    pub measurement: Option<MeasurementMeta>,
    pub view_change: Option<ViewChangeMeta>,
    pub resize: Option<ResizeMeta>,
    pub load: Option<LoadMeta>,
}

impl ViewerEvent {
    /// Create a new event with the given kinds. The timestamp is set on emit.
    pub fn new(kinds: EventKind) -> Self {
        Self {
            kinds,
            timestamp: 0.0,
            click: None,
            measurement: None,
            view_change: None,
            resize: None,
            load: None,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// EventFilter
// ─────────────────────────────────────────────────────────────────────────────

/// A filter that selects which event categories a subscriber receives.
#[derive(Debug, Clone, Copy)]
pub struct EventFilter {
    pub mask: EventKind,
}

impl EventFilter {
    /// Accept all events.
    pub const fn all() -> Self {
        Self {
            mask: EventKind::ALL,
        }
    }

    /// Accept only the specified event kinds.
    pub const fn only(mask: EventKind) -> Self {
        Self { mask }
    }

    #[inline]
    pub fn matches(&self, event: &ViewerEvent) -> bool {
        event.kinds.intersects(self.mask)
    }
}

impl Default for EventFilter {
    fn default() -> Self {
        Self::all()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// EventController
// ─────────────────────────────────────────────────────────────────────────────

struct Subscriber {
    filter: EventFilter,
    sender: Sender<ViewerEvent>,
}

/// Controller that collects and distributes viewer events to subscribers.
///
/// Attach it to [`ViewerConfig::controllers`](crate::config::ViewerConfig)
/// before launching the UI, then call [`subscribe`](Self::subscribe) to
/// receive events on an `mpsc` channel.
#[derive(Clone)]
pub struct EventController {
    inner: Arc<Mutex<EventCtrlInner>>,
}

struct EventCtrlInner {
    subscribers: Vec<Subscriber>,
    start_instant: std::time::Instant,
}

impl EventController {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(EventCtrlInner {
                subscribers: Vec::new(),
                start_instant: std::time::Instant::now(),
            })),
        }
    }

    /// Subscribe to events matching the given filter.
    pub fn subscribe(&self, filter: EventFilter) -> Receiver<ViewerEvent> {
        let (tx, rx) = std::sync::mpsc::channel();
        let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        inner.subscribers.push(Subscriber { filter, sender: tx });
        rx
    }

    /// Subscribe to *all* events (no filtering).
    pub fn subscribe_all(&self) -> Receiver<ViewerEvent> {
        self.subscribe(EventFilter::all())
    }

    /// Emit an event to all matching subscribers.
    ///
    /// Subscribers whose receiver was dropped are pruned the next time an
    /// event matching their filter is sent.
    pub fn emit(&self, mut event: ViewerEvent) {
        let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        event.timestamp = inner.start_instant.elapsed().as_secs_f64();
        tracing::trace!(kinds = %event.kinds, "emit");
        inner.subscribers.retain(|sub| {
            if sub.filter.matches(&event) {
                sub.sender.send(event.clone()).is_ok()
            } else {
                true
            }
        });
    }

    /// Number of live subscribers (as of the last emit).
    pub fn subscriber_count(&self) -> usize {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner).subscribers.len()
    }
}

impl Default for EventController {
    fn default() -> Self {
        Self::new()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Unit tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_kind_union_and_intersection() {
        let combined = EventKind::CLICK | EventKind::PICK_HIT;
        assert!(combined.contains(EventKind::CLICK));
        assert!(combined.contains(EventKind::PICK_HIT));
        assert!(!combined.intersects(EventKind::ZOOM));
        assert_eq!(
            EventKind::CLICK.union(EventKind::ZOOM),
            EventKind::CLICK | EventKind::ZOOM
        );
    }

    #[test]
    fn event_filter_matches() {
        let filter = EventFilter::only(EventKind::MEASUREMENT_COMPLETE | EventKind::MEASUREMENT_CLEARED);
        assert!(filter.matches(&ViewerEvent::new(EventKind::MEASUREMENT_CLEARED)));
        assert!(!filter.matches(&ViewerEvent::new(EventKind::ORBIT)));
        assert!(filter.matches(&ViewerEvent::new(
            EventKind::MEASUREMENT_POINT | EventKind::MEASUREMENT_COMPLETE
        )));
    }

    #[test]
    fn controller_routes_by_filter() {
        let ctrl = EventController::new();
        let rx_all = ctrl.subscribe_all();
        let rx_clicks = ctrl.subscribe(EventFilter::only(EventKind::CLICK));
        let rx_zoom = ctrl.subscribe(EventFilter::only(EventKind::ZOOM));

        ctrl.emit(ViewerEvent::new(EventKind::CLICK));

        assert!(rx_all.try_recv().is_ok());
        assert!(rx_clicks.try_recv().is_ok());
        assert!(rx_zoom.try_recv().is_err());
    }

    #[test]
    fn timestamp_set_on_emit() {
        let ctrl = EventController::new();
        let rx = ctrl.subscribe_all();
        std::thread::sleep(std::time::Duration::from_millis(10));
        ctrl.emit(ViewerEvent::new(EventKind::CLICK));
        assert!(rx.try_recv().unwrap().timestamp > 0.0);
    }

    #[test]
    fn emit_survives_a_panicked_holder() {
        let ctrl = EventController::new();
        let rx = ctrl.subscribe(EventFilter::only(EventKind::CLICK));
        let poisoner = ctrl.clone();
        let joined = std::thread::spawn(move || {
            let _guard = poisoner.inner.lock().unwrap();
            panic!("subscriber thread died");
        })
        .join();
        assert!(joined.is_err());
        assert!(ctrl.inner.is_poisoned());

        ctrl.emit(ViewerEvent::new(EventKind::CLICK));
        assert!(rx.try_recv().is_ok());
        assert_eq!(ctrl.subscriber_count(), 1);
    }

    #[test]
    fn event_kind_display() {
        assert_eq!(format!("{}", EventKind::CLICK), "CLICK");
        assert_eq!(
            format!("{}", EventKind::CLICK | EventKind::PICK_MISS),
            "CLICK|PICK_MISS"
        );
        assert_eq!(format!("{}", EventKind::ALL), "ALL");
        assert_eq!(format!("{}", EventKind(0)), "EMPTY");
        assert!(format!("{}", EventKind(1 << 63)).starts_with("0x"));
    }

    #[test]
    fn event_kinds_do_not_overlap() {
        let all_kinds = [
            EventKind::CLICK,
            EventKind::PICK_HIT,
            EventKind::PICK_MISS,
            EventKind::MEASUREMENT_POINT,
            EventKind::MEASUREMENT_COMPLETE,
            EventKind::MEASUREMENT_CLEARED,
            EventKind::ORBIT,
            EventKind::ZOOM,
            EventKind::CAMERA_RESET,
            EventKind::RESIZE,
            EventKind::MODEL_LOADED,
            EventKind::MODEL_LOAD_FAILED,
        ];
        for (i, a) in all_kinds.iter().enumerate() {
            for (j, b) in all_kinds.iter().enumerate() {
                if i != j {
                    assert!(!a.intersects(*b), "bits {} and {} overlap", i, j);
                }
            }
        }
    }

    #[test]
    fn dropped_receiver_is_pruned() {
        let ctrl = EventController::new();
        let rx1 = ctrl.subscribe_all();
        let rx2 = ctrl.subscribe_all();
        drop(rx1);

        ctrl.emit(ViewerEvent::new(EventKind::CLICK));
        assert!(rx2.try_recv().is_ok());
        assert_eq!(ctrl.subscriber_count(), 1);
    }
}
