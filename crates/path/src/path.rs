//! The default path data structure.
//!

use crate::endpoint::{EndpointStyle, LineStyle};
use crate::math::*;
use crate::{ElementId, Event, IdEvent, PathEvent};

use std::fmt;
use std::ops::Index;

/// One command of a [`Path`](struct.Path.html).
///
/// A quadratic curve is encoded as one `CurveControl` followed by a `CurveTo`, a cubic
/// curve as two `CurveControl` followed by a `CurveTo`.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub enum PathElement {
    MoveTo(Point3),
    LineTo(Point3),
    CurveControl(Point3),
    CurveTo(Point3),
}

impl PathElement {
    #[inline]
    pub fn point(&self) -> Point3 {
        match *self {
            PathElement::MoveTo(p)
            | PathElement::LineTo(p)
            | PathElement::CurveControl(p)
            | PathElement::CurveTo(p) => p,
        }
    }

    #[inline]
    pub fn point_mut(&mut self) -> &mut Point3 {
        match self {
            PathElement::MoveTo(p)
            | PathElement::LineTo(p)
            | PathElement::CurveControl(p)
            | PathElement::CurveTo(p) => p,
        }
    }

    /// Returns false for curve control points.
    #[inline]
    pub fn is_on_curve(&self) -> bool {
        !matches!(self, PathElement::CurveControl(..))
    }

    #[inline]
    pub fn is_move_to(&self) -> bool {
        matches!(self, PathElement::MoveTo(..))
    }

    /// Returns a copy of this element at another position.
    #[inline]
    pub fn with_point(&self, p: Point3) -> Self {
        let mut elt = *self;
        *elt.point_mut() = p;
        elt
    }
}

/// ID of a [`ControlHandle`](struct.ControlHandle.html).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct HandleId(pub u32);

/// An editable handle attached to one element of a path.
///
/// Handles are created on demand for interactive editing and are owned by the path.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct ControlHandle {
    pub id: HandleId,
    pub element: ElementId,
    pub on_curve: bool,
    pub position: Point3,
}

/// A path made of straight segments and quadratic or cubic bézier curves in 3D.
///
/// # Representation
///
/// Paths store a flat list of [`PathElement`](enum.PathElement.html)s. The first element
/// of a non-empty path is always a `MoveTo`: appending anything else to an empty path
/// first inserts a `MoveTo` at the current position (the origin on a fresh path).
///
/// Consecutive `MoveTo`s are legal and simply restart the current sub-path.
///
/// The path also keeps track of:
/// - the start of the current sub-path,
/// - the current position,
/// - a conservative bounding box containing every appended point, control points included,
/// - the decorations used when outlining it.
#[derive(Clone, PartialEq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct Path {
    elements: Vec<PathElement>,
    start: Point3,
    position: Point3,
    bounds: Option<Box3>,
    handles: Vec<ControlHandle>,
    pub start_style: EndpointStyle,
    pub end_style: EndpointStyle,
    pub line_style: LineStyle,
    /// Set when the path comes from a source with a flipped y axis. Flips the
    /// normals of the extruded walls and of the outline.
    pub invert: bool,
}

impl Path {
    /// Creates an empty path.
    pub fn new() -> Self {
        Path {
            elements: Vec::new(),
            start: Point3::origin(),
            position: Point3::origin(),
            bounds: None,
            handles: Vec::new(),
            start_style: EndpointStyle::None,
            end_style: EndpointStyle::None,
            line_style: LineStyle::Solid,
            invert: false,
        }
    }

    pub fn with_capacity(elements: usize) -> Self {
        let mut path = Path::new();
        path.elements.reserve(elements);
        path
    }

    /// Starts a new sub-path at a given position.
    pub fn move_to(&mut self, to: Point3) {
        self.push(PathElement::MoveTo(to));
    }

    /// Adds a straight segment to the current sub-path.
    pub fn line_to(&mut self, to: Point3) {
        self.push(PathElement::LineTo(to));
    }

    /// Adds a quadratic bézier curve to the current sub-path.
    pub fn quadratic_bezier_to(&mut self, ctrl: Point3, to: Point3) {
        self.push(PathElement::CurveControl(ctrl));
        self.push(PathElement::CurveTo(to));
    }

    /// Adds a cubic bézier curve to the current sub-path.
    pub fn cubic_bezier_to(&mut self, ctrl1: Point3, ctrl2: Point3, to: Point3) {
        self.push(PathElement::CurveControl(ctrl1));
        self.push(PathElement::CurveControl(ctrl2));
        self.push(PathElement::CurveTo(to));
    }

    /// Closes the current sub-path with a straight segment back to its start.
    ///
    /// No-op on an empty path or when the current position already is the start of
    /// the sub-path, which makes closing twice in a row append a single segment.
    pub fn close(&mut self) {
        if self.elements.is_empty() || self.position == self.start {
            return;
        }

        self.line_to(self.start);
    }

    /// Appends an element, keeping the derived state up to date.
    pub fn push(&mut self, element: PathElement) {
        if self.elements.is_empty() && !element.is_move_to() {
            let at = self.position;
            self.push(PathElement::MoveTo(at));
        }

        let p = element.point();
        match element {
            PathElement::MoveTo(_) => {
                self.start = p;
                self.position = p;
            }
            PathElement::LineTo(_) | PathElement::CurveTo(_) => {
                self.position = p;
            }
            PathElement::CurveControl(_) => {}
        }

        self.include_in_bounds(p);
        self.elements.push(element);
    }

    /// Removes all elements and releases the control handles.
    ///
    /// Decoration settings are kept.
    pub fn clear(&mut self) {
        self.elements.clear();
        self.handles.clear();
        self.start = Point3::origin();
        self.position = Point3::origin();
        self.bounds = None;
    }

    #[inline]
    pub fn elements(&self) -> &[PathElement] {
        &self.elements
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// The start of the current sub-path.
    #[inline]
    pub fn start(&self) -> Point3 {
        self.start
    }

    /// The current position.
    #[inline]
    pub fn position(&self) -> Point3 {
        self.position
    }

    /// A conservative bounding box of every point of the path, including control points.
    ///
    /// Empty paths have an empty box at the origin.
    #[inline]
    pub fn bounds(&self) -> Box3 {
        self.bounds
            .unwrap_or_else(|| Box3::new(Point3::origin(), Point3::origin()))
    }

    /// Returns true if all points of the path are on the `z = 0` plane.
    pub fn is_flat(&self) -> bool {
        self.elements.iter().all(|elt| elt.point().z == 0.0)
    }

    /// Iterates over the path as `PathEvent`s.
    pub fn iter(&self) -> Iter {
        Iter {
            inner: self.id_iter(),
            path: self,
        }
    }

    /// Iterates over the path as `IdEvent`s.
    pub fn id_iter(&self) -> IdIter {
        IdIter::new(&self.elements)
    }

    /// Iterates over the sub-paths, each of them starting with a `MoveTo`.
    pub fn sub_paths(&self) -> SubPaths {
        SubPaths {
            elements: &self.elements,
        }
    }

    /// Materializes one handle per element, replacing the existing ones.
    pub fn create_handles(&mut self) -> &[ControlHandle] {
        self.handles = self
            .elements
            .iter()
            .enumerate()
            .map(|(idx, elt)| ControlHandle {
                id: HandleId(idx as u32),
                element: ElementId::from_usize(idx),
                on_curve: elt.is_on_curve(),
                position: elt.point(),
            })
            .collect();

        &self.handles
    }

    #[inline]
    pub fn handles(&self) -> &[ControlHandle] {
        &self.handles
    }

    /// Moves a handle and the element it is attached to.
    ///
    /// Returns false if there is no such handle.
    pub fn move_handle(&mut self, id: HandleId, to: Point3) -> bool {
        let handle = match self.handles.iter_mut().find(|h| h.id == id) {
            Some(handle) => handle,
            None => return false,
        };

        let idx = handle.element.to_usize();
        if idx >= self.elements.len() {
            return false;
        }

        handle.position = to;
        *self.elements[idx].point_mut() = to;
        self.recompute_derived_state();

        true
    }

    /// Translates every point of the path.
    pub fn translate(&mut self, by: Vector3) {
        for elt in &mut self.elements {
            *elt.point_mut() += by;
        }
        for handle in &mut self.handles {
            handle.position += by;
        }
        self.start += by;
        self.position += by;
        self.bounds = self.bounds.map(|b| b.translate(by));
    }

    /// Returns a copy of the path with a transformation applied to every point.
    ///
    /// The copy has no control handles.
    pub fn transformed(&self, transform: impl Fn(Point3) -> Point3) -> Self {
        let mut path = Path::with_capacity(self.elements.len());
        path.copy_style_from(self);
        for elt in &self.elements {
            path.push(elt.with_point(transform(elt.point())));
        }

        path
    }

    /// Copies the endpoint styles, line style and inversion flag of another path.
    pub fn copy_style_from(&mut self, other: &Path) {
        self.start_style = other.start_style;
        self.end_style = other.end_style;
        self.line_style = other.line_style;
        self.invert = other.invert;
    }

    /// Appends all elements of another path.
    pub fn extend_from(&mut self, other: &Path) {
        for elt in &other.elements {
            self.push(*elt);
        }
    }

    fn include_in_bounds(&mut self, p: Point3) {
        // Union would ignore `p`: a box of zero volume counts as empty.
        self.bounds = Some(match self.bounds {
            Some(b) => Box3::new(b.min.min(p), b.max.max(p)),
            None => Box3::new(p, p),
        });
    }

    fn recompute_derived_state(&mut self) {
        self.bounds = None;
        self.start = Point3::origin();
        self.position = Point3::origin();
        let elements = std::mem::take(&mut self.elements);
        for elt in &elements {
            let p = elt.point();
            match elt {
                PathElement::MoveTo(_) => {
                    self.start = p;
                    self.position = p;
                }
                PathElement::LineTo(_) | PathElement::CurveTo(_) => {
                    self.position = p;
                }
                PathElement::CurveControl(_) => {}
            }
            self.include_in_bounds(p);
        }
        self.elements = elements;
    }
}

impl Default for Path {
    fn default() -> Self {
        Path::new()
    }
}

impl Index<ElementId> for Path {
    type Output = Point3;

    fn index(&self, id: ElementId) -> &Point3 {
        match &self.elements[id.to_usize()] {
            PathElement::MoveTo(p)
            | PathElement::LineTo(p)
            | PathElement::CurveControl(p)
            | PathElement::CurveTo(p) => p,
        }
    }
}

impl<'l> IntoIterator for &'l Path {
    type Item = PathEvent;
    type IntoIter = Iter<'l>;

    fn into_iter(self) -> Iter<'l> {
        self.iter()
    }
}

impl fmt::Debug for Path {
    fn fmt(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        fn write_point(formatter: &mut fmt::Formatter, p: Point3) -> fmt::Result {
            write!(formatter, " ")?;
            fmt::Debug::fmt(&p.x, formatter)?;
            write!(formatter, " ")?;
            fmt::Debug::fmt(&p.y, formatter)?;
            if p.z != 0.0 {
                write!(formatter, " ")?;
                fmt::Debug::fmt(&p.z, formatter)?;
            }
            Ok(())
        }

        write!(formatter, "\"")?;
        let mut first = true;
        for elt in &self.elements {
            if !first {
                write!(formatter, " ")?;
            }
            first = false;
            let cmd = match elt {
                PathElement::MoveTo(_) => "M",
                PathElement::LineTo(_) => "L",
                PathElement::CurveControl(_) => "C",
                PathElement::CurveTo(_) => "T",
            };
            write!(formatter, "{}", cmd)?;
            write_point(formatter, elt.point())?;
        }
        write!(formatter, "\"")
    }
}

/// An iterator of `PathEvent`s over a `Path`.
pub struct Iter<'l> {
    inner: IdIter<'l>,
    path: &'l Path,
}

impl<'l> Iterator for Iter<'l> {
    type Item = PathEvent;

    fn next(&mut self) -> Option<PathEvent> {
        let path = self.path;
        self.inner.next().map(|evt| evt.map(|id| path[id], |id| path[id]))
    }
}

/// An iterator of `IdEvent`s over a slice of path elements.
///
/// Runs of control points that are not followed by a `CurveTo`, or that contain a
/// number of control points other than one or two, produce `Event::Unsupported`.
pub struct IdIter<'l> {
    elements: &'l [PathElement],
    idx: usize,
    first: Option<ElementId>,
    last: ElementId,
    has_edges: bool,
    pending_ctrl: usize,
    ctrl: [ElementId; 2],
}

impl<'l> IdIter<'l> {
    pub fn new(elements: &'l [PathElement]) -> Self {
        IdIter {
            elements,
            idx: 0,
            first: None,
            last: ElementId::INVALID,
            has_edges: false,
            pending_ctrl: 0,
            ctrl: [ElementId::INVALID; 2],
        }
    }

    fn end_event(&mut self) -> Option<IdEvent> {
        let first = self.first.take()?;
        if self.pending_ctrl > 0 {
            let control_points = self.pending_ctrl;
            self.pending_ctrl = 0;
            self.first = Some(first);
            return Some(Event::Unsupported {
                from: self.last,
                to: self.last,
                control_points,
            });
        }

        let close = self.has_edges
            && self.elements[self.last.to_usize()].point()
                == self.elements[first.to_usize()].point();

        Some(Event::End {
            last: self.last,
            first,
            close,
        })
    }
}

impl<'l> Iterator for IdIter<'l> {
    type Item = IdEvent;

    fn next(&mut self) -> Option<IdEvent> {
        loop {
            let elt = match self.elements.get(self.idx) {
                Some(elt) => *elt,
                None => return self.end_event(),
            };

            let id = ElementId::from_usize(self.idx);

            if elt.is_move_to() && self.first.is_some() {
                // Terminate the previous sub-path before consuming the MoveTo.
                return self.end_event();
            }

            self.idx += 1;

            match elt {
                PathElement::MoveTo(_) => {
                    self.first = Some(id);
                    self.last = id;
                    self.has_edges = false;
                    return Some(Event::Begin { at: id });
                }
                PathElement::CurveControl(_) => {
                    if self.pending_ctrl < 2 {
                        self.ctrl[self.pending_ctrl] = id;
                    }
                    self.pending_ctrl += 1;
                }
                PathElement::LineTo(_) | PathElement::CurveTo(_) => {
                    let from = self.last;
                    let pending = self.pending_ctrl;
                    self.pending_ctrl = 0;
                    self.last = id;
                    self.has_edges = true;

                    let is_curve = matches!(elt, PathElement::CurveTo(_));
                    return Some(match (is_curve, pending) {
                        (false, 0) => Event::Line { from, to: id },
                        (true, 1) => Event::Quadratic {
                            from,
                            ctrl: self.ctrl[0],
                            to: id,
                        },
                        (true, 2) => Event::Cubic {
                            from,
                            ctrl1: self.ctrl[0],
                            ctrl2: self.ctrl[1],
                            to: id,
                        },
                        (_, control_points) => Event::Unsupported {
                            from,
                            to: id,
                            control_points,
                        },
                    });
                }
            }
        }
    }
}

/// An iterator over the sub-paths of a path.
pub struct SubPaths<'l> {
    elements: &'l [PathElement],
}

impl<'l> Iterator for SubPaths<'l> {
    type Item = &'l [PathElement];

    fn next(&mut self) -> Option<&'l [PathElement]> {
        if self.elements.is_empty() {
            return None;
        }

        let end = self
            .elements
            .iter()
            .skip(1)
            .position(PathElement::is_move_to)
            .map(|pos| pos + 1)
            .unwrap_or(self.elements.len());

        let (sub_path, rest) = self.elements.split_at(end);
        self.elements = rest;

        Some(sub_path)
    }
}

#[cfg(test)]
fn p(x: f64, y: f64) -> Point3 {
    point3(x, y, 0.0)
}

#[test]
fn test_synthesized_move_to() {
    let mut path = Path::new();
    path.line_to(p(1.0, 0.0));
    assert_eq!(
        path.elements(),
        &[PathElement::MoveTo(p(0.0, 0.0)), PathElement::LineTo(p(1.0, 0.0))]
    );

    let mut path = Path::new();
    path.quadratic_bezier_to(p(1.0, 1.0), p(2.0, 0.0));
    assert_eq!(path.elements()[0], PathElement::MoveTo(p(0.0, 0.0)));
    assert_eq!(path.len(), 3);
    assert_eq!(path.position(), p(2.0, 0.0));
}

#[test]
fn test_close_idempotence() {
    let mut path = Path::new();
    path.close();
    assert!(path.is_empty());

    path.move_to(p(0.0, 0.0));
    path.line_to(p(10.0, 0.0));
    path.line_to(p(5.0, 10.0));
    path.close();
    path.close();

    assert_eq!(path.len(), 4);
    assert_eq!(path.elements()[3], PathElement::LineTo(p(0.0, 0.0)));
    assert_eq!(path.position(), path.start());
}

#[test]
fn test_bounds_include_control_points() {
    let mut path = Path::new();
    path.move_to(p(0.0, 0.0));
    path.cubic_bezier_to(p(-5.0, 20.0), point3(15.0, 20.0, 3.0), p(10.0, 0.0));

    let bounds = path.bounds();
    assert_eq!(bounds.min, point3(-5.0, 0.0, 0.0));
    assert_eq!(bounds.max, point3(15.0, 20.0, 3.0));

    path.clear();
    assert!(path.is_empty());
    assert_eq!(path.bounds().min, Point3::origin());
    assert_eq!(path.bounds().max, Point3::origin());
}

#[test]
fn test_bounds_of_flat_path() {
    let mut path = Path::new();
    path.move_to(p(0.0, 0.0));
    path.line_to(p(10.0, 0.0));
    path.line_to(p(10.0, 5.0));
    path.close();

    assert_eq!(path.bounds().min, point3(0.0, 0.0, 0.0));
    assert_eq!(path.bounds().max, point3(10.0, 5.0, 0.0));

    let moved = path.transformed(|pt| pt + vector3(1.0, 2.0, 0.0));
    assert_eq!(moved.bounds().max, point3(11.0, 7.0, 0.0));
}

#[test]
fn test_events() {
    let mut path = Path::new();
    path.move_to(p(0.0, 0.0));
    path.line_to(p(1.0, 0.0));
    path.quadratic_bezier_to(p(2.0, 0.0), p(2.0, 1.0));
    path.cubic_bezier_to(p(2.0, 2.0), p(1.0, 2.0), p(0.0, 2.0));
    path.close();
    path.move_to(p(5.0, 5.0));
    path.line_to(p(6.0, 6.0));

    let mut it = path.iter();
    assert_eq!(it.next(), Some(Event::Begin { at: p(0.0, 0.0) }));
    assert_eq!(
        it.next(),
        Some(Event::Line {
            from: p(0.0, 0.0),
            to: p(1.0, 0.0)
        })
    );
    assert_eq!(
        it.next(),
        Some(Event::Quadratic {
            from: p(1.0, 0.0),
            ctrl: p(2.0, 0.0),
            to: p(2.0, 1.0)
        })
    );
    assert_eq!(
        it.next(),
        Some(Event::Cubic {
            from: p(2.0, 1.0),
            ctrl1: p(2.0, 2.0),
            ctrl2: p(1.0, 2.0),
            to: p(0.0, 2.0)
        })
    );
    assert_eq!(
        it.next(),
        Some(Event::Line {
            from: p(0.0, 2.0),
            to: p(0.0, 0.0)
        })
    );
    assert_eq!(
        it.next(),
        Some(Event::End {
            last: p(0.0, 0.0),
            first: p(0.0, 0.0),
            close: true
        })
    );
    assert_eq!(it.next(), Some(Event::Begin { at: p(5.0, 5.0) }));
    assert_eq!(
        it.next(),
        Some(Event::Line {
            from: p(5.0, 5.0),
            to: p(6.0, 6.0)
        })
    );
    assert_eq!(
        it.next(),
        Some(Event::End {
            last: p(6.0, 6.0),
            first: p(5.0, 5.0),
            close: false
        })
    );
    assert_eq!(it.next(), None);
    assert_eq!(it.next(), None);
}

#[test]
fn test_unsupported_runs() {
    let mut path = Path::new();
    path.move_to(p(0.0, 0.0));
    path.push(PathElement::CurveControl(p(1.0, 1.0)));
    path.push(PathElement::CurveControl(p(2.0, 1.0)));
    path.push(PathElement::CurveControl(p(3.0, 1.0)));
    path.push(PathElement::CurveTo(p(4.0, 0.0)));
    path.push(PathElement::CurveControl(p(5.0, 1.0)));

    let events: Vec<IdEvent> = path.id_iter().collect();
    assert_eq!(
        events,
        vec![
            Event::Begin { at: ElementId(0) },
            Event::Unsupported {
                from: ElementId(0),
                to: ElementId(4),
                control_points: 3
            },
            Event::Unsupported {
                from: ElementId(4),
                to: ElementId(4),
                control_points: 1
            },
            Event::End {
                last: ElementId(4),
                first: ElementId(0),
                close: false
            },
        ]
    );
}

#[test]
fn test_consecutive_move_to() {
    let mut path = Path::new();
    path.move_to(p(0.0, 0.0));
    path.move_to(p(1.0, 1.0));
    path.line_to(p(2.0, 1.0));

    let events: Vec<PathEvent> = path.iter().collect();
    assert_eq!(events.len(), 5);
    assert_eq!(
        events[1],
        Event::End {
            last: p(0.0, 0.0),
            first: p(0.0, 0.0),
            close: false
        }
    );
    assert_eq!(path.start(), p(1.0, 1.0));
    assert_eq!(path.sub_paths().count(), 2);
    assert_eq!(path.sub_paths().nth(1).map(|s| s.len()), Some(2));
}

#[test]
fn test_handles() {
    let mut path = Path::new();
    path.move_to(p(0.0, 0.0));
    path.quadratic_bezier_to(p(5.0, 5.0), p(10.0, 0.0));

    let handles = path.create_handles().to_vec();
    assert_eq!(handles.len(), 3);
    assert!(handles[0].on_curve);
    assert!(!handles[1].on_curve);

    assert!(path.move_handle(handles[1].id, p(5.0, 50.0)));
    assert_eq!(path.elements()[1], PathElement::CurveControl(p(5.0, 50.0)));
    assert_eq!(path.bounds().max.y, 50.0);

    assert!(path.move_handle(handles[2].id, p(20.0, 0.0)));
    assert_eq!(path.position(), p(20.0, 0.0));

    path.clear();
    assert!(path.handles().is_empty());
    assert!(!path.move_handle(handles[0].id, p(1.0, 1.0)));
}

#[test]
fn test_translate() {
    let mut path = Path::new();
    path.move_to(p(0.0, 0.0));
    path.line_to(p(1.0, 2.0));
    path.translate(vector3(1.0, 1.0, -1.0));

    assert_eq!(path.elements()[1], PathElement::LineTo(point3(2.0, 3.0, -1.0)));
    assert_eq!(path.bounds().min, point3(1.0, 1.0, -1.0));
    assert_eq!(path.position(), point3(2.0, 3.0, -1.0));

    let scaled = path.transformed(|p| point3(p.x * 2.0, p.y * 2.0, p.z));
    assert_eq!(scaled.bounds().max, point3(4.0, 6.0, -1.0));
}
