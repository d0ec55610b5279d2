use crate::math::{Point, Point3};
use crate::ElementId;

/// Represents an event or edge of path.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub enum Event<Endpoint, ControlPoint> {
    Begin {
        at: Endpoint,
    },
    Line {
        from: Endpoint,
        to: Endpoint,
    },
    Quadratic {
        from: Endpoint,
        ctrl: ControlPoint,
        to: Endpoint,
    },
    Cubic {
        from: Endpoint,
        ctrl1: ControlPoint,
        ctrl2: ControlPoint,
        to: Endpoint,
    },
    /// A run of control points that does not form a quadratic or cubic curve.
    ///
    /// `control_points` is the number of control points in the run. Control
    /// points left dangling at the end of a sub-path produce an event where
    /// `from` and `to` are the same endpoint.
    Unsupported {
        from: Endpoint,
        to: Endpoint,
        control_points: usize,
    },
    /// `close` is true when the last endpoint coincides with the first one.
    End {
        last: Endpoint,
        first: Endpoint,
        close: bool,
    },
}

/// A path event representing endpoints and control points as positions.
pub type PathEvent = Event<Point3, Point3>;

/// A path event representing endpoints and control points as element IDs.
pub type IdEvent = Event<ElementId, ElementId>;

/// A path event on the xy plane.
pub type PlanarEvent = Event<Point, Point>;

impl<Ep, Cp> Event<Ep, Cp> {
    pub fn is_edge(&self) -> bool {
        match self {
            &Event::Line { .. }
            | &Event::Quadratic { .. }
            | &Event::Cubic { .. }
            | &Event::Unsupported { .. } => true,
            _ => false,
        }
    }

    pub fn from(&self) -> Ep
    where
        Ep: Clone,
    {
        match &self {
            &Event::Line { from, .. }
            | &Event::Quadratic { from, .. }
            | &Event::Cubic { from, .. }
            | &Event::Unsupported { from, .. }
            | &Event::Begin { at: from }
            | &Event::End { last: from, .. } => from.clone(),
        }
    }

    pub fn to(&self) -> Ep
    where
        Ep: Clone,
    {
        match &self {
            &Event::Line { to, .. }
            | &Event::Quadratic { to, .. }
            | &Event::Cubic { to, .. }
            | &Event::Unsupported { to, .. }
            | &Event::Begin { at: to }
            | &Event::End { first: to, .. } => to.clone(),
        }
    }

    /// Applies a function to every endpoint and control point of the event.
    pub fn map<Ep2, Cp2>(
        self,
        mut ep: impl FnMut(Ep) -> Ep2,
        mut cp: impl FnMut(Cp) -> Cp2,
    ) -> Event<Ep2, Cp2> {
        match self {
            Event::Begin { at } => Event::Begin { at: ep(at) },
            Event::Line { from, to } => Event::Line {
                from: ep(from),
                to: ep(to),
            },
            Event::Quadratic { from, ctrl, to } => Event::Quadratic {
                from: ep(from),
                ctrl: cp(ctrl),
                to: ep(to),
            },
            Event::Cubic {
                from,
                ctrl1,
                ctrl2,
                to,
            } => Event::Cubic {
                from: ep(from),
                ctrl1: cp(ctrl1),
                ctrl2: cp(ctrl2),
                to: ep(to),
            },
            Event::Unsupported {
                from,
                to,
                control_points,
            } => Event::Unsupported {
                from: ep(from),
                to: ep(to),
                control_points,
            },
            Event::End { last, first, close } => Event::End {
                last: ep(last),
                first: ep(first),
                close,
            },
        }
    }
}

impl PathEvent {
    /// Drops the z coordinate of every point.
    pub fn to_planar(self) -> PlanarEvent {
        self.map(|p| p.xy(), |p| p.xy())
    }
}

impl PlanarEvent {
    /// Lifts the event to 3D, at a given depth.
    pub fn to_3d(self, z: f64) -> PathEvent {
        self.map(|p| p.extend(z), |p| p.extend(z))
    }
}

#[test]
fn planar_conversion() {
    use crate::math::point3;

    let evt = Event::Quadratic {
        from: point3(0.0, 1.0, 5.0),
        ctrl: point3(2.0, 3.0, 5.0),
        to: point3(4.0, 5.0, 5.0),
    };

    let planar = evt.to_planar();
    assert_eq!(planar.from(), crate::math::point(0.0, 1.0));
    assert_eq!(planar.to_3d(5.0), evt);
    assert!(evt.is_edge());
    assert!(!Event::<u32, u32>::Begin { at: 0 }.is_edge());
}
