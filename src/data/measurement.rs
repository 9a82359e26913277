//! Two-point distance measurement on the model surface.
//!
//! [`MeasurementTool`] owns the picked points and is the only place they
//! change. Everything else (overlay, info panel, event subscribers) reads a
//! [`PickState`] snapshot.

use glam::{DVec3, Vec3};

use crate::events::{EventController, EventKind, MeasurementMeta, ViewerEvent};

/// A finite point on the model surface, in world coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Point3 {
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Build a point from a ray hit. Non-finite components are refused.
    pub fn from_hit(hit: Vec3) -> Option<Self> {
        if hit.is_finite() {
            Some(Self::new(hit.x as f64, hit.y as f64, hit.z as f64))
        } else {
            None
        }
    }

    /// Euclidean distance to `other`.
    pub fn distance(&self, other: &Point3) -> f64 {
        self.to_dvec3().distance(other.to_dvec3())
    }

    pub fn to_dvec3(self) -> DVec3 {
        DVec3::new(self.x, self.y, self.z)
    }

    pub fn to_vec3(self) -> Vec3 {
        Vec3::new(self.x as f32, self.y as f32, self.z as f32)
    }
}

/// A completed measurement. Only exists while two points are held.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Measurement {
    pub points: [Point3; 2],
    pub distance: f64,
}

impl Measurement {
    fn between(a: Point3, b: Point3) -> Self {
        Self {
            points: [a, b],
            distance: a.distance(&b),
        }
    }
}

/// Logical phase of the pick cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickPhase {
    Empty,
    OnePoint,
    Complete,
}

/// Accumulated picked points, never more than two.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PickState {
    points: Vec<Point3>,
}

impl PickState {
    pub fn points(&self) -> &[Point3] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn phase(&self) -> PickPhase {
        match self.points.len() {
            0 => PickPhase::Empty,
            1 => PickPhase::OnePoint,
            _ => PickPhase::Complete,
        }
    }

    /// The measurement, present iff two points are held.
    pub fn measurement(&self) -> Option<Measurement> {
        match self.points.as_slice() {
            [a, b] => Some(Measurement::between(*a, *b)),
            _ => None,
        }
    }
}

/// What a recorded pick did to the state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MeasurementChange {
    /// First point of a new pair.
    PointAdded,
    /// Second point recorded; the pair is complete.
    Available(Measurement),
    /// A completed pair was discarded and the new point starts the next one.
    Cleared,
}

/// The measurement state machine.
///
/// `Empty --pick--> OnePoint --pick--> Complete --pick--> OnePoint`
#[derive(Default)]
pub struct MeasurementTool {
    state: PickState,
    events: Option<EventController>,
}

impl MeasurementTool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tool that reports every transition to `events`.
    pub fn with_events(events: Option<EventController>) -> Self {
        Self {
            state: PickState::default(),
            events,
        }
    }

    pub fn set_event_controller(&mut self, events: Option<EventController>) {
        self.events = events;
    }

    /// Read-only snapshot for renderers and panels.
    pub fn state(&self) -> &PickState {
        &self.state
    }

    pub fn measurement(&self) -> Option<Measurement> {
        self.state.measurement()
    }

    /// Click-handler entry: a miss (`None`) leaves the state untouched.
    pub fn handle_pick(&mut self, hit: Option<Point3>) -> Option<MeasurementChange> {
        hit.map(|point| self.record_pick(point))
    }

    /// Forget all points, e.g. when a different model is loaded.
    pub fn clear(&mut self) {
        if !self.state.is_empty() {
            tracing::debug!(points = self.state.len(), "Cleared picks");
        }
        self.state.points.clear();
    }

    /// Record a surface hit.
    pub fn record_pick(&mut self, point: Point3) -> MeasurementChange {
        let change = if self.state.points.len() >= 2 {
            self.state.points.clear();
            self.state.points.push(point);
            MeasurementChange::Cleared
        } else {
            self.state.points.push(point);
            match self.state.measurement() {
                Some(m) => MeasurementChange::Available(m),
                None => MeasurementChange::PointAdded,
            }
        };

        tracing::debug!(
            x = point.x,
            y = point.y,
            z = point.z,
            points = self.state.len(),
            ?change,
            "Recorded pick"
        );
        self.notify(point, change);
        change
    }

    fn notify(&self, point: Point3, change: MeasurementChange) {
        let Some(events) = &self.events else {
            return;
        };
        let mut kinds = EventKind::MEASUREMENT_POINT;
        match change {
            MeasurementChange::PointAdded => {}
            MeasurementChange::Available(_) => kinds |= EventKind::MEASUREMENT_COMPLETE,
            MeasurementChange::Cleared => kinds |= EventKind::MEASUREMENT_CLEARED,
        }
        let mut evt = ViewerEvent::new(kinds);
        evt.measurement = Some(MeasurementMeta {
            point_index: self.state.len() - 1,
            point,
            measurement: self.state.measurement(),
        });
        events.emit(evt);
    }
}
