//! A compact path on the xy plane.
//!
//! This is the representation exchanged with 2D services (stroking, dashing), which
//! do not know about depth.

use crate::math::*;
use crate::{Event, PlanarEvent};

use std::fmt;

/// Enumeration corresponding to the [Event](enum.Event.html) enum
/// without the parameters.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub(crate) enum Verb {
    Begin,
    LineTo,
    QuadraticTo,
    CubicTo,
    Close,
    End,
}

/// A 2D path stored as a buffer of verbs and a buffer of points.
#[derive(Clone, Default, PartialEq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct PlanarPath {
    points: Vec<Point>,
    verbs: Vec<Verb>,
    in_sub_path: bool,
}

impl PlanarPath {
    pub fn new() -> Self {
        PlanarPath {
            points: Vec::new(),
            verbs: Vec::new(),
            in_sub_path: false,
        }
    }

    /// Builds a path from a sequence of events.
    pub fn from_events(events: impl IntoIterator<Item = PlanarEvent>) -> Self {
        let mut path = PlanarPath::new();
        for evt in events {
            path.push_event(evt);
        }
        path.end_if_needed();

        path
    }

    pub fn push_event(&mut self, evt: PlanarEvent) {
        match evt {
            Event::Begin { at } => self.begin(at),
            Event::Line { to, .. } | Event::Unsupported { to, .. } => self.line_to(to),
            Event::Quadratic { ctrl, to, .. } => self.quadratic_bezier_to(ctrl, to),
            Event::Cubic {
                ctrl1, ctrl2, to, ..
            } => self.cubic_bezier_to(ctrl1, ctrl2, to),
            Event::End { close, .. } => self.end(close),
        }
    }

    /// Starts a sub-path, ending the current one if needed.
    pub fn begin(&mut self, at: Point) {
        self.end_if_needed();
        self.points.push(at);
        self.verbs.push(Verb::Begin);
        self.in_sub_path = true;
    }

    pub fn line_to(&mut self, to: Point) {
        self.begin_if_needed();
        self.points.push(to);
        self.verbs.push(Verb::LineTo);
    }

    pub fn quadratic_bezier_to(&mut self, ctrl: Point, to: Point) {
        self.begin_if_needed();
        self.points.push(ctrl);
        self.points.push(to);
        self.verbs.push(Verb::QuadraticTo);
    }

    pub fn cubic_bezier_to(&mut self, ctrl1: Point, ctrl2: Point, to: Point) {
        self.begin_if_needed();
        self.points.push(ctrl1);
        self.points.push(ctrl2);
        self.points.push(to);
        self.verbs.push(Verb::CubicTo);
    }

    /// Ends the current sub-path. Does nothing outside of a sub-path.
    pub fn end(&mut self, close: bool) {
        if !self.in_sub_path {
            return;
        }
        self.verbs.push(if close { Verb::Close } else { Verb::End });
        self.in_sub_path = false;
    }

    /// Adds a polyline as its own sub-path.
    pub fn add_polygon(&mut self, points: &[Point], closed: bool) {
        let (first, rest) = match points.split_first() {
            Some(split) => split,
            None => return,
        };
        self.begin(*first);
        for p in rest {
            self.line_to(*p);
        }
        self.end(closed);
    }

    /// Appends all sub-paths of another path.
    pub fn extend_from(&mut self, other: &PlanarPath) {
        self.end_if_needed();
        for evt in other.iter() {
            self.push_event(evt);
        }
        self.end_if_needed();
    }

    pub fn is_empty(&self) -> bool {
        self.verbs.is_empty()
    }

    /// Number of sub-paths.
    pub fn sub_path_count(&self) -> usize {
        self.verbs.iter().filter(|v| **v == Verb::Begin).count()
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn has_curves(&self) -> bool {
        self.verbs
            .iter()
            .any(|v| matches!(v, Verb::QuadraticTo | Verb::CubicTo))
    }

    pub fn iter(&self) -> Iter {
        Iter {
            points: self.points.iter(),
            verbs: self.verbs.iter(),
            current: point(0.0, 0.0),
            first: point(0.0, 0.0),
            pending_end: self.in_sub_path,
        }
    }

    fn begin_if_needed(&mut self) {
        if !self.in_sub_path {
            let at = self.points.last().cloned().unwrap_or_else(Point::origin);
            self.begin(at);
        }
    }

    fn end_if_needed(&mut self) {
        if self.in_sub_path {
            self.end(false);
        }
    }
}

impl<'l> IntoIterator for &'l PlanarPath {
    type Item = PlanarEvent;
    type IntoIter = Iter<'l>;

    fn into_iter(self) -> Iter<'l> {
        self.iter()
    }
}

impl fmt::Debug for PlanarPath {
    fn fmt(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        write!(formatter, "PlanarPath {{ ")?;
        for evt in self.iter() {
            match evt {
                Event::Begin { at } => write!(formatter, "M {} {} ", at.x, at.y)?,
                Event::Line { to, .. } | Event::Unsupported { to, .. } => {
                    write!(formatter, "L {} {} ", to.x, to.y)?
                }
                Event::Quadratic { ctrl, to, .. } => {
                    write!(formatter, "Q {} {} {} {} ", ctrl.x, ctrl.y, to.x, to.y)?
                }
                Event::Cubic {
                    ctrl1, ctrl2, to, ..
                } => write!(
                    formatter,
                    "C {} {} {} {} {} {} ",
                    ctrl1.x, ctrl1.y, ctrl2.x, ctrl2.y, to.x, to.y
                )?,
                Event::End { close: true, .. } => write!(formatter, "Z ")?,
                Event::End { close: false, .. } => {}
            }
        }
        write!(formatter, "}}")
    }
}

/// An iterator of `PlanarEvent`s over a `PlanarPath`.
pub struct Iter<'l> {
    points: std::slice::Iter<'l, Point>,
    verbs: std::slice::Iter<'l, Verb>,
    current: Point,
    first: Point,
    pending_end: bool,
}

impl<'l> Iter<'l> {
    #[inline]
    fn next_point(&mut self) -> Point {
        self.points.next().cloned().unwrap_or(self.current)
    }
}

impl<'l> Iterator for Iter<'l> {
    type Item = PlanarEvent;

    fn next(&mut self) -> Option<PlanarEvent> {
        match self.verbs.next() {
            Some(&Verb::Begin) => {
                self.current = self.next_point();
                self.first = self.current;
                Some(Event::Begin { at: self.current })
            }
            Some(&Verb::LineTo) => {
                let from = self.current;
                self.current = self.next_point();
                Some(Event::Line {
                    from,
                    to: self.current,
                })
            }
            Some(&Verb::QuadraticTo) => {
                let from = self.current;
                let ctrl = self.next_point();
                self.current = self.next_point();
                Some(Event::Quadratic {
                    from,
                    ctrl,
                    to: self.current,
                })
            }
            Some(&Verb::CubicTo) => {
                let from = self.current;
                let ctrl1 = self.next_point();
                let ctrl2 = self.next_point();
                self.current = self.next_point();
                Some(Event::Cubic {
                    from,
                    ctrl1,
                    ctrl2,
                    to: self.current,
                })
            }
            Some(&Verb::Close) => Some(Event::End {
                last: self.current,
                first: self.first,
                close: true,
            }),
            Some(&Verb::End) => Some(Event::End {
                last: self.current,
                first: self.first,
                close: false,
            }),
            None => {
                // A path that is still being built is reported as ended.
                if self.pending_end {
                    self.pending_end = false;
                    return Some(Event::End {
                        last: self.current,
                        first: self.first,
                        close: false,
                    });
                }
                None
            }
        }
    }
}

#[test]
fn test_builder_and_iter() {
    let mut path = PlanarPath::new();
    path.begin(point(0.0, 0.0));
    path.line_to(point(1.0, 0.0));
    path.quadratic_bezier_to(point(2.0, 0.0), point(2.0, 1.0));
    path.end(true);
    path.line_to(point(3.0, 3.0));

    let events: Vec<PlanarEvent> = path.iter().collect();
    assert_eq!(
        events,
        vec![
            Event::Begin {
                at: point(0.0, 0.0)
            },
            Event::Line {
                from: point(0.0, 0.0),
                to: point(1.0, 0.0)
            },
            Event::Quadratic {
                from: point(1.0, 0.0),
                ctrl: point(2.0, 0.0),
                to: point(2.0, 1.0)
            },
            Event::End {
                last: point(2.0, 1.0),
                first: point(0.0, 0.0),
                close: true
            },
            Event::Begin {
                at: point(2.0, 1.0)
            },
            Event::Line {
                from: point(2.0, 1.0),
                to: point(3.0, 3.0)
            },
            Event::End {
                last: point(3.0, 3.0),
                first: point(2.0, 1.0),
                close: false
            },
        ]
    );
    assert_eq!(path.sub_path_count(), 2);
    assert!(path.has_curves());
}

#[test]
fn test_from_events_round_trip() {
    let mut path = PlanarPath::new();
    path.add_polygon(&[point(0.0, 0.0), point(4.0, 0.0), point(4.0, 4.0)], true);
    path.add_polygon(&[point(10.0, 0.0), point(12.0, 1.0)], false);
    path.add_polygon(&[], true);

    let copy = PlanarPath::from_events(path.iter());
    assert_eq!(copy, path);
    assert_eq!(copy.sub_path_count(), 2);
    assert!(!copy.has_curves());
}
