//! The 2D path/stroke service.
//!
//! Stroking is delegated to a [`StrokeService`](trait.StrokeService.html), which works on
//! [`PlanarPath`](../path/struct.PlanarPath.html)s. The built-in
//! [`OutlineStroker`](struct.OutlineStroker.html) produces one outline per stroked
//! polyline:
//!
//! - an open polyline gives a single contour going forward along its right side, around
//!   the end cap, back along its left side and around the start cap,
//! - a closed polyline gives two contours, one per side, wound in opposite directions.
//!
//! Outlines are positively wound. Sharp inner turns can make a contour overlap itself,
//! so they are meant to be filled with the positive winding rule.
//!
//! Dashes are applied before stroking by cutting the polylines into pieces, using the
//! dash array of the [`LineStyle`](../path/enum.LineStyle.html) scaled by the line width.

use crate::flatten::step_count;
use crate::geom::utils::{miter_normal, rot90, signed_area, try_normalize};
use crate::geom::{CubicBezierSegment, QuadraticBezierSegment};
use crate::math::{Point, Vector};
use crate::path::{Event, Path, PlanarPath};
use crate::{FlatteningOptions, LineCap, LineJoin, StrokeOptions};

/// Converts paths to and from a planar representation and strokes them.
pub trait StrokeService {
    /// Converts a path to the planar representation, dropping the z coordinates.
    ///
    /// The returned flag is true if every point of the path has a z of zero.
    fn flatten(&self, path: &Path) -> (PlanarPath, bool);

    /// Computes the outline of the stroke of a path, as a set of closed polygons.
    fn stroke(&self, path: &PlanarPath, options: &StrokeOptions) -> PlanarPath;

    /// Converts a planar path back, at a depth of zero.
    fn to_internal(&self, path: &PlanarPath) -> Path;
}

/// A stroke service producing positively wound outlines.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct OutlineStroker {
    /// Used to approximate the curves of the stroked paths.
    pub flattening: FlatteningOptions,
}

impl OutlineStroker {
    pub fn new() -> Self {
        OutlineStroker {
            flattening: FlatteningOptions::DEFAULT,
        }
    }

    pub fn with_flattening(flattening: FlatteningOptions) -> Self {
        OutlineStroker { flattening }
    }

    /// Approximates each sub-path with a polyline.
    fn polylines(&self, path: &PlanarPath) -> Vec<Polyline> {
        let mut polylines = Vec::new();
        let mut current = Polyline::default();
        for evt in path.iter() {
            match evt {
                Event::Begin { at } => {
                    current = Polyline::default();
                    current.push(at);
                }
                Event::Line { to, .. } | Event::Unsupported { to, .. } => current.push(to),
                Event::Quadratic { from, ctrl, to } => {
                    let curve = QuadraticBezierSegment {
                        from: from.extend(0.0),
                        ctrl: ctrl.extend(0.0),
                        to: to.extend(0.0),
                    };
                    let steps = step_count(curve.chord_length(), &self.flattening);
                    for i in 1..steps {
                        current.push(curve.sample(i as f64 / steps as f64).xy());
                    }
                    current.push(to);
                }
                Event::Cubic {
                    from,
                    ctrl1,
                    ctrl2,
                    to,
                } => {
                    let curve = CubicBezierSegment {
                        from: from.extend(0.0),
                        ctrl1: ctrl1.extend(0.0),
                        ctrl2: ctrl2.extend(0.0),
                        to: to.extend(0.0),
                    };
                    let steps = step_count(curve.chord_length(), &self.flattening);
                    for i in 1..steps {
                        current.push(curve.sample(i as f64 / steps as f64).xy());
                    }
                    current.push(to);
                }
                Event::End { close, .. } => {
                    let mut polyline = std::mem::take(&mut current);
                    if close && polyline.points.len() > 2 {
                        if polyline.points.first() == polyline.points.last() {
                            polyline.points.pop();
                        }
                        polyline.closed = true;
                    }
                    polylines.push(polyline);
                }
            }
        }

        polylines
    }
}

impl StrokeService for OutlineStroker {
    fn flatten(&self, path: &Path) -> (PlanarPath, bool) {
        let planar = PlanarPath::from_events(path.iter().map(|evt| evt.to_planar()));
        (planar, path.is_flat())
    }

    fn stroke(&self, path: &PlanarPath, options: &StrokeOptions) -> PlanarPath {
        let mut output = PlanarPath::new();
        let half_width = options.line_width.abs() * 0.5;
        if half_width == 0.0 || !half_width.is_finite() {
            return output;
        }

        let dashes: Vec<f64> = options
            .dash
            .dash_array()
            .iter()
            .map(|d| d * options.line_width.abs())
            .collect();

        for polyline in self.polylines(path) {
            if dashes.is_empty() {
                stroke_polyline(&polyline, half_width, options, &mut output);
            } else {
                for dash in polyline.dashes(&dashes) {
                    stroke_polyline(&dash, half_width, options, &mut output);
                }
            }
        }

        output
    }

    fn to_internal(&self, path: &PlanarPath) -> Path {
        let mut result = Path::new();
        for evt in path.iter() {
            match evt {
                Event::Begin { at } => result.move_to(at.extend(0.0)),
                Event::Line { to, .. } | Event::Unsupported { to, .. } => {
                    result.line_to(to.extend(0.0))
                }
                Event::Quadratic { ctrl, to, .. } => {
                    result.quadratic_bezier_to(ctrl.extend(0.0), to.extend(0.0))
                }
                Event::Cubic {
                    ctrl1, ctrl2, to, ..
                } => result.cubic_bezier_to(ctrl1.extend(0.0), ctrl2.extend(0.0), to.extend(0.0)),
                Event::End { close: true, .. } => result.close(),
                Event::End { close: false, .. } => {}
            }
        }

        result
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
struct Polyline {
    points: Vec<Point>,
    closed: bool,
}

impl Polyline {
    fn push(&mut self, p: Point) {
        if self.points.last() != Some(&p) {
            self.points.push(p);
        }
    }

    /// Cuts the polyline into the "on" intervals of a dash pattern.
    fn dashes(&self, pattern: &[f64]) -> Vec<Polyline> {
        let mut points = self.points.clone();
        if self.closed {
            if let Some(first) = points.first().cloned() {
                points.push(first);
            }
        }

        let mut dashes = Vec::new();
        if pattern.iter().sum::<f64>() <= 0.0 {
            return dashes;
        }

        let mut dash_idx = 0;
        let mut remaining = pattern[0];
        let mut current = Polyline::default();
        if let Some(first) = points.first() {
            current.push(*first);
        }

        for segment in points.windows(2) {
            let (mut from, to) = (segment[0], segment[1]);
            let mut length = (to - from).length();
            while length > remaining {
                let split = from.lerp(to, remaining / length);
                if dash_idx % 2 == 0 {
                    current.push(split);
                    dashes.push(std::mem::take(&mut current));
                } else {
                    current.push(split);
                }
                length -= remaining;
                from = split;
                dash_idx = (dash_idx + 1) % pattern.len();
                remaining = pattern[dash_idx];
            }
            remaining -= length;
            if dash_idx % 2 == 0 {
                current.push(to);
            }
        }

        if dash_idx % 2 == 0 && current.points.len() > 1 {
            dashes.push(current);
        }

        dashes
    }
}

fn stroke_polyline(
    polyline: &Polyline,
    half_width: f64,
    options: &StrokeOptions,
    output: &mut PlanarPath,
) {
    let mut points: Vec<Point> = Vec::with_capacity(polyline.points.len());
    for &p in &polyline.points {
        if points.last().map_or(true, |last| try_normalize(p - *last).is_some()) {
            points.push(p);
        }
    }
    if polyline.closed {
        while points.len() > 1 && try_normalize(points[0] - points[points.len() - 1]).is_none() {
            points.pop();
        }
    }

    match points.len() {
        0 => return,
        1 => {
            // A lone point only shows up through its caps.
            let p = points[0];
            match options.cap {
                LineCap::Flat => {}
                LineCap::Square => {
                    let (x, y) = (Vector::new(half_width, 0.0), Vector::new(0.0, half_width));
                    add_polygon(&[p - x - y, p + x - y, p + x + y, p - x + y], output);
                }
                LineCap::Round => add_polygon(&disk(p, half_width, options), output),
            }
            return;
        }
        _ => {}
    }

    let closed = polyline.closed && points.len() > 2;
    let n = points.len();
    let segment_count = if closed { n } else { n - 1 };
    let segments: Vec<Segment> = (0..segment_count)
        .filter_map(|i| {
            let (from, to) = (points[i], points[(i + 1) % n]);
            try_normalize(to - from).map(|direction| Segment {
                from,
                to,
                direction,
                length: (to - from).length(),
            })
        })
        .collect();
    if segments.is_empty() {
        return;
    }

    let mut right = offset_side(&segments, closed, -1.0, half_width, options);
    let mut left = offset_side(&segments, closed, 1.0, half_width, options);
    left.reverse();

    if closed {
        // The area of the ring is the sum of the two.
        if signed_area(right.iter().cloned()) + signed_area(left.iter().cloned()) < 0.0 {
            right.reverse();
            left.reverse();
        }
        output.add_polygon(&right, true);
        output.add_polygon(&left, true);
        return;
    }

    let (first, last) = (segments[0], segments[segments.len() - 1]);
    let mut contour = right;
    add_cap(last.to, last.direction, half_width, options, &mut contour);
    for p in left {
        push_point(&mut contour, p);
    }
    add_cap(first.from, -first.direction, half_width, options, &mut contour);
    output.add_polygon(&contour, true);
}

#[derive(Copy, Clone, Debug, PartialEq)]
struct Segment {
    from: Point,
    to: Point,
    direction: Vector,
    length: f64,
}

/// Offsets one side of a polyline, following the direction of the polyline.
///
/// `side` is 1.0 for the left side and -1.0 for the right side. Joins are added on the
/// outer side of the turns. On the inner side the two offset segments meet at their
/// intersection, or go through the vertex when the segments are too short for it.
fn offset_side(
    segments: &[Segment],
    closed: bool,
    side: f64,
    half_width: f64,
    options: &StrokeOptions,
) -> Vec<Point> {
    let mut points = Vec::with_capacity(segments.len() * 2);
    let count = segments.len();
    if !closed {
        let first = segments[0];
        points.push(first.from + rot90(first.direction) * (half_width * side));
    }

    for i in 0..count {
        let a = segments[i];
        let offset_a = rot90(a.direction) * (half_width * side);
        let b = if i + 1 < count {
            segments[i + 1]
        } else if closed {
            segments[0]
        } else {
            push_point(&mut points, a.to + offset_a);
            break;
        };
        let offset_b = rot90(b.direction) * (half_width * side);

        let turn = a.direction.cross(b.direction);
        let dot = a.direction.dot(b.direction);
        if turn.abs() <= f64::EPSILON && dot > 0.0 {
            push_point(&mut points, a.to + offset_a);
            continue;
        }

        // A left turn has its outer side on the right.
        let is_outer = turn * side < 0.0 || (turn.abs() <= f64::EPSILON && side < 0.0);
        if !is_outer {
            let miter = miter_normal(a.direction, b.direction);
            let reach = miter.dot(a.direction).abs() * half_width;
            if miter != Vector::zero() && reach <= a.length && reach <= b.length {
                push_point(&mut points, a.to + miter * (half_width * side));
            } else {
                push_point(&mut points, a.to + offset_a);
                push_point(&mut points, a.to);
                push_point(&mut points, a.to + offset_b);
            }
            continue;
        }

        push_point(&mut points, a.to + offset_a);
        match options.join {
            LineJoin::Bevel => {}
            LineJoin::Miter => {
                let miter = miter_normal(a.direction, b.direction);
                let ratio = miter.length();
                if ratio != 0.0 && ratio <= options.miter_limit {
                    push_point(&mut points, a.to + miter * (half_width * side));
                }
            }
            LineJoin::Round => {
                let sweep = turn.atan2(dot);
                arc(a.to, offset_a, sweep, options, &mut points);
            }
        }
        push_point(&mut points, a.to + offset_b);
    }

    points
}

/// Adds the points of a cap between the right and the left side of an endpoint.
///
/// `direction` points out of the polyline.
fn add_cap(
    at: Point,
    direction: Vector,
    half_width: f64,
    options: &StrokeOptions,
    points: &mut Vec<Point>,
) {
    let offset = rot90(direction) * half_width;
    match options.cap {
        LineCap::Flat => {}
        LineCap::Square => {
            let ahead = direction * half_width;
            push_point(points, at + ahead - offset);
            push_point(points, at + ahead + offset);
        }
        LineCap::Round => arc(at, -offset, std::f64::consts::PI, options, points),
    }
}

/// Adds the inner points of an arc around `center`, starting at `center + from` and
/// rotating by `sweep` radians.
fn arc(center: Point, from: Vector, sweep: f64, options: &StrokeOptions, points: &mut Vec<Point>) {
    let segments_per_half_turn = options.round_join_segments.max(1) as f64;
    let steps = (sweep.abs() / std::f64::consts::PI * segments_per_half_turn)
        .ceil()
        .max(1.0) as u32;
    for i in 1..steps {
        let (sin, cos) = (sweep * i as f64 / steps as f64).sin_cos();
        let v = Vector::new(from.x * cos - from.y * sin, from.x * sin + from.y * cos);
        push_point(points, center + v);
    }
}

#[inline]
fn push_point(points: &mut Vec<Point>, p: Point) {
    if points.last() != Some(&p) {
        points.push(p);
    }
}

fn disk(center: Point, radius: f64, options: &StrokeOptions) -> Vec<Point> {
    let count = (options.round_join_segments.max(2) * 2) as usize;
    (0..count)
        .map(|i| {
            let (sin, cos) = (i as f64 * std::f64::consts::TAU / count as f64).sin_cos();
            center + Vector::new(cos, sin) * radius
        })
        .collect()
}

/// Adds a closed polygon, counter-clockwise.
fn add_polygon(points: &[Point], output: &mut PlanarPath) {
    let area = signed_area(points.iter().cloned());
    if area > 0.0 {
        output.add_polygon(points, true);
    } else if area < 0.0 {
        let reversed: Vec<Point> = points.iter().rev().cloned().collect();
        output.add_polygon(&reversed, true);
    }
}

#[cfg(test)]
use crate::math::{point, point3};
#[cfg(test)]
use crate::path::LineStyle;

#[cfg(test)]
fn polygons(path: &PlanarPath) -> Vec<Vec<Point>> {
    let mut result = Vec::new();
    for evt in path.iter() {
        match evt {
            Event::Begin { at } => result.push(vec![at]),
            Event::Line { to, .. } => {
                if let Some(polygon) = result.last_mut() {
                    polygon.push(to)
                }
            }
            Event::End { close, .. } => assert!(close),
            _ => panic!("unexpected curve in a stroke"),
        }
    }
    result
}

#[test]
fn round_trip() {
    let stroker = OutlineStroker::new();
    let mut path = Path::new();
    path.move_to(point3(0.0, 0.0, 0.0));
    path.line_to(point3(10.0, 0.0, 0.0));
    path.line_to(point3(10.0, 5.0, 0.0));
    path.close();
    path.move_to(point3(20.0, 0.0, 0.0));
    path.line_to(point3(30.0, 0.0, 0.0));

    let (planar, is_flat) = stroker.flatten(&path);
    assert!(is_flat);
    assert_eq!(planar.sub_path_count(), 2);
    assert_eq!(stroker.to_internal(&planar), path);

    path.line_to(point3(30.0, 0.0, 1.0));
    assert!(!stroker.flatten(&path).1);
}

#[test]
fn stroke_segment() {
    let stroker = OutlineStroker::new();
    let mut path = PlanarPath::new();
    path.add_polygon(&[point(0.0, 0.0), point(10.0, 0.0)], false);

    let stroke = stroker.stroke(&path, &StrokeOptions::line_width(2.0));
    let polys = polygons(&stroke);
    assert_eq!(polys.len(), 1);
    assert_eq!(
        polys[0],
        vec![point(0.0, -1.0), point(10.0, -1.0), point(10.0, 1.0), point(0.0, 1.0)]
    );
}

#[cfg(test)]
fn assert_points_approx(actual: &[Point], expected: &[(f64, f64)]) {
    assert_eq!(actual.len(), expected.len(), "{:?}", actual);
    for (a, e) in actual.iter().zip(expected) {
        assert!(
            (a.x - e.0).abs() < 1e-9 && (a.y - e.1).abs() < 1e-9,
            "{:?} != {:?}",
            actual,
            expected
        );
    }
}

#[test]
fn one_outline_per_polyline() {
    let stroker = OutlineStroker::new();
    let mut path = PlanarPath::new();
    path.add_polygon(
        &[point(0.0, 0.0), point(10.0, 0.0), point(10.0, 10.0), point(0.0, 10.0)],
        true,
    );
    path.add_polygon(&[point(20.0, 0.0), point(25.0, 5.0), point(30.0, 0.0)], false);

    for join in [LineJoin::Round, LineJoin::Bevel, LineJoin::Miter] {
        for cap in [LineCap::Flat, LineCap::Square, LineCap::Round] {
            let options = StrokeOptions::line_width(1.0)
                .with_line_join(join)
                .with_line_cap(cap);
            let polys = polygons(&stroker.stroke(&path, &options));
            // Two sides for the closed square, one contour for the open polyline.
            assert_eq!(polys.len(), 3);
            let ring = signed_area(polys[0].iter().cloned()) + signed_area(polys[1].iter().cloned());
            assert!(ring > 0.0);
            assert!(signed_area(polys[2].iter().cloned()) > 0.0);

            if join == LineJoin::Miter {
                assert!((ring - (121.0 - 81.0)).abs() < 1e-9);
            }
        }
    }
}

#[test]
fn clockwise_ring_is_positive() {
    let stroker = OutlineStroker::new();
    let mut path = PlanarPath::new();
    path.add_polygon(
        &[point(0.0, 0.0), point(0.0, 10.0), point(10.0, 10.0), point(10.0, 0.0)],
        true,
    );

    let options = StrokeOptions::line_width(2.0).with_line_join(LineJoin::Miter);
    let polys = polygons(&stroker.stroke(&path, &options));
    assert_eq!(polys.len(), 2);
    let areas: Vec<f64> = polys.iter().map(|p| signed_area(p.iter().cloned())).collect();
    assert!((areas[0] + areas[1] - (144.0 - 64.0)).abs() < 1e-9);
}

#[test]
fn miter_limit() {
    let stroker = OutlineStroker::new();
    let mut path = PlanarPath::new();
    path.add_polygon(&[point(0.0, 0.0), point(10.0, 0.0), point(10.0, 10.0)], false);

    let options = StrokeOptions::line_width(2.0).with_line_join(LineJoin::Miter);
    let polys = polygons(&stroker.stroke(&path, &options));
    assert_eq!(polys.len(), 1);
    assert_points_approx(
        &polys[0],
        &[
            (0.0, -1.0),
            (10.0, -1.0),
            (11.0, -1.0),
            (11.0, 0.0),
            (11.0, 10.0),
            (9.0, 10.0),
            (9.0, 1.0),
            (0.0, 1.0),
        ],
    );

    let bevel = StrokeOptions::line_width(2.0).with_line_join(LineJoin::Bevel);
    let polys = polygons(&stroker.stroke(&path, &bevel));
    assert_eq!(polys[0].len(), 7);
    assert!(polys[0].iter().all(|p| !(p.x > 10.5 && p.y < -0.5)));

    // A sharp turn exceeds the limit and falls back to a bevel.
    let mut path = PlanarPath::new();
    path.add_polygon(&[point(0.0, 0.0), point(10.0, 0.0), point(0.0, 1.0)], false);
    let polys = polygons(&stroker.stroke(&path, &options));
    assert_eq!(polys.len(), 1);
    assert!(polys[0].iter().all(|p| p.x < 10.5));
}

#[test]
fn dashes() {
    let stroker = OutlineStroker::new();
    let mut path = PlanarPath::new();
    path.add_polygon(&[point(0.0, 0.0), point(20.0, 0.0)], false);

    // Dashes of 4 units every 6 units at a width of 1.
    let options = StrokeOptions::line_width(1.0).with_dash(LineStyle::Dash);
    let polys = polygons(&stroker.stroke(&path, &options));
    assert_eq!(polys.len(), 4);
    assert_eq!(polys[1][0], point(6.0, -0.5));
    assert_eq!(polys[3][1], point(20.0, -0.5));

    let solid = polygons_of(&stroker, &path, LineStyle::Solid);
    assert_eq!(solid, 1);
}

#[cfg(test)]
fn polygons_of(stroker: &OutlineStroker, path: &PlanarPath, style: LineStyle) -> usize {
    polygons(&stroker.stroke(path, &StrokeOptions::line_width(1.0).with_dash(style))).len()
}

#[test]
fn curves_are_flattened() {
    let stroker = OutlineStroker::new();
    let mut path = PlanarPath::new();
    path.begin(point(0.0, 0.0));
    path.quadratic_bezier_to(point(5.0, 10.0), point(10.0, 0.0));
    path.end(false);

    let options = StrokeOptions::line_width(1.0).with_line_join(LineJoin::Bevel);
    let polys = polygons(&stroker.stroke(&path, &options));
    assert_eq!(polys.len(), 1);
    assert!(polys[0].len() > 4);
    assert!(polys
        .iter()
        .flatten()
        .all(|p| p.x >= -1.0 && p.x <= 11.0 && p.y >= -1.0 && p.y <= 6.0));
}
