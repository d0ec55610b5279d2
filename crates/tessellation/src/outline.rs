//! Outlines of paths, for drawing them with a line color.
//!
//! The outline of a path is the area covered by its stroke plus the decorations at its
//! endpoints. It is computed in four steps:
//!
//! 1. The path is reduced: coincident points collapse, and curves left without
//!    control points become straight segments.
//! 2. Each decorated end is retracted along its heading by the shorten length of its
//!    [`EndpointStyle`](../path/enum.EndpointStyle.html), so that the stroke does not
//!    overlap the decoration.
//! 3. Flat paths are stroked by the [`StrokeService`](../stroke/trait.StrokeService.html).
//!    Other paths cannot be stroked: their reduced centerline is kept to be drawn as
//!    line strips, and `NonFlatStrokeFallback` is reported.
//! 4. The decorations are appended as closed, positively oriented sub-paths.
//!
//! The result is meant to be filled with the positive winding rule.

use crate::error::GeometryError;
use crate::math::{Point3, Vector};
use crate::path::{EndpointStyle, Path, PathElement};
use crate::stroke::{OutlineStroker, StrokeService};
use crate::{LineCap, LineJoin, StrokeOptions};

/// Where a decoration is placed.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct EndpointPlacement {
    pub style: EndpointStyle,
    /// The retracted endpoint.
    pub point: Point3,
    /// Points out of the path, with a length of half of the shorten length.
    pub heading: Vector,
}

/// The result of [`Outline::compute`](struct.Outline.html#method.compute).
#[derive(Clone, Debug, PartialEq)]
pub struct Outline {
    /// The stroke and the decorations.
    pub path: Path,
    /// The reduced path, when it could not be stroked.
    pub centerline: Option<Path>,
    pub start: Option<EndpointPlacement>,
    pub end: Option<EndpointPlacement>,
    pub diagnostics: Vec<GeometryError>,
}

impl Outline {
    /// Computes the outline of a path.
    ///
    /// The cap and join of `options` are ignored: strokes have flat caps and round joins,
    /// the decorations taking care of the ends.
    pub fn compute<S: StrokeService + ?Sized>(
        path: &Path,
        options: &StrokeOptions,
        stroker: &S,
    ) -> Self {
        let line_width = options.line_width.abs();
        let mut elements = reduce(path.elements());

        let mut start = None;
        let mut end = None;
        if elements.len() >= 2 && line_width > 0.0 {
            // Both ends may share a single segment.
            let (start_len, end_len) = (
                path.start_style.shorten_length(line_width),
                path.end_style.shorten_length(line_width),
            );
            let (start_share, end_share) = if elements.len() == 2 && start_len + end_len > 0.0 {
                let total = start_len + end_len;
                (start_len / total, end_len / total)
            } else {
                (1.0, 1.0)
            };

            start = placement(&elements, path.start_style, line_width, Side::Start, start_share);
            end = placement(&elements, path.end_style, line_width, Side::End, end_share);
            if let Some(start) = start {
                *elements[0].point_mut() = start.point;
            }
            if let Some(end) = end {
                let last = elements.len() - 1;
                *elements[last].point_mut() = end.point;
            }
        }

        let mut reduced = Path::with_capacity(elements.len());
        for elt in elements {
            reduced.push(elt);
        }

        let mut outline = Outline {
            path: Path::new(),
            centerline: None,
            start,
            end,
            diagnostics: Vec::new(),
        };

        let (planar, is_flat) = stroker.flatten(&reduced);
        if is_flat {
            let options = options
                .with_line_width(line_width)
                .with_line_cap(LineCap::Flat)
                .with_line_join(LineJoin::Round);
            outline.path = stroker.to_internal(&stroker.stroke(&planar, &options));
        } else {
            let error = GeometryError::NonFlatStrokeFallback;
            error.log();
            outline.diagnostics.push(error);
            outline.centerline = Some(reduced);
        }

        for placement in [start, end].iter().flatten() {
            let decoration = placement
                .style
                .construct(placement.point, placement.heading, line_width);
            outline.path.extend_from(&decoration);
        }

        outline.path.invert = path.invert;
        if let Some(centerline) = &mut outline.centerline {
            centerline.invert = path.invert;
        }

        outline
    }
}

/// Computes the outline of a path with the built-in stroke service.
///
/// The dash pattern is the line style of the path.
pub fn compute_outline(path: &Path, line_width: f64) -> Path {
    let options = StrokeOptions::line_width(line_width).with_dash(path.line_style);
    Outline::compute(path, &options, &OutlineStroker::new()).path
}

/// Drops the elements that duplicate their predecessor.
///
/// Control points equal to the point before them or to the end of their curve are
/// merged into the curve. A curve left without control points becomes a line.
fn reduce(elements: &[PathElement]) -> Vec<PathElement> {
    let mut result: Vec<PathElement> = Vec::with_capacity(elements.len());
    let mut position: Option<Point3> = None;
    let mut controls: Vec<Point3> = Vec::new();

    for elt in elements {
        match *elt {
            PathElement::MoveTo(p) => {
                controls.clear();
                result.push(*elt);
                position = Some(p);
            }
            PathElement::CurveControl(p) => {
                let previous = controls.last().cloned().or(position);
                if previous != Some(p) {
                    controls.push(p);
                }
            }
            PathElement::LineTo(p) => {
                controls.clear();
                if position != Some(p) {
                    result.push(*elt);
                }
                position = Some(p);
            }
            PathElement::CurveTo(p) => {
                while controls.last() == Some(&p) {
                    controls.pop();
                }
                if controls.is_empty() {
                    if position != Some(p) {
                        result.push(PathElement::LineTo(p));
                    }
                } else {
                    result.extend(controls.drain(..).map(PathElement::CurveControl));
                    result.push(PathElement::CurveTo(p));
                }
                position = Some(p);
            }
        }
    }

    result
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Side {
    Start,
    End,
}

/// Computes where the decoration of an end of the path goes.
///
/// The end is moved back along its heading by the shorten length of the style, but no
/// further than `share` of its segment.
fn placement(
    elements: &[PathElement],
    style: EndpointStyle,
    line_width: f64,
    side: Side,
    share: f64,
) -> Option<EndpointPlacement> {
    if style == EndpointStyle::None {
        return None;
    }

    let n = elements.len();
    let (endpoint, neighbour) = match side {
        Side::Start => (elements[0].point(), elements[1].point()),
        Side::End => (elements[n - 1].point(), elements[n - 2].point()),
    };

    let direction = endpoint.xy() - neighbour.xy();
    let length = direction.length();
    if length == 0.0 {
        return None;
    }

    let unit = direction / length;
    let shorten = style.shorten_length(line_width);
    let point = if shorten < length * share {
        let xy = endpoint.xy() - unit * shorten;
        xy.extend(endpoint.z + (neighbour.z - endpoint.z) * (shorten / length))
    } else if share >= 1.0 {
        neighbour
    } else {
        endpoint.lerp(neighbour, share)
    };

    Some(EndpointPlacement {
        style,
        point,
        heading: unit * (shorten * 0.5),
    })
}

#[cfg(test)]
use crate::math::{point3, vector};

#[cfg(test)]
fn line(to: (f64, f64)) -> Path {
    let mut path = Path::new();
    path.move_to(point3(0.0, 0.0, 0.0));
    path.line_to(point3(to.0, to.1, 0.0));
    path
}

#[test]
fn stroked_line_with_arrowhead() {
    let mut path = line((10.0, 0.0));
    path.end_style = EndpointStyle::Arrowhead;

    let options = StrokeOptions::line_width(2.0);
    let outline = Outline::compute(&path, &options, &OutlineStroker::new());

    assert!(outline.diagnostics.is_empty());
    assert!(outline.centerline.is_none());
    assert_eq!(outline.start, None);
    let end = outline.end.unwrap();
    assert_eq!(end.point, point3(6.0, 0.0, 0.0));
    assert_eq!(end.heading, vector(2.0, 0.0));

    // The stroke ends at the retracted point, the arrowhead tip is at the original end.
    let mut expected = Path::new();
    expected.move_to(point3(0.0, -1.0, 0.0));
    expected.line_to(point3(6.0, -1.0, 0.0));
    expected.line_to(point3(6.0, 1.0, 0.0));
    expected.line_to(point3(0.0, 1.0, 0.0));
    expected.close();
    expected.extend_from(&EndpointStyle::Arrowhead.construct(end.point, end.heading, 2.0));
    assert_eq!(outline.path, expected);
    assert!(outline
        .path
        .elements()
        .iter()
        .any(|elt| elt.point() == point3(10.0, 0.0, 0.0)));

    assert_eq!(compute_outline(&path, 2.0), outline.path);
}

#[test]
fn reduction() {
    let mut path = Path::new();
    path.move_to(point3(0.0, 0.0, 0.0));
    path.line_to(point3(0.0, 0.0, 0.0));
    path.line_to(point3(5.0, 0.0, 0.0));
    path.quadratic_bezier_to(point3(5.0, 0.0, 0.0), point3(10.0, 0.0, 0.0));
    path.cubic_bezier_to(
        point3(12.0, 5.0, 0.0),
        point3(15.0, 0.0, 0.0),
        point3(15.0, 0.0, 0.0),
    );

    assert_eq!(
        reduce(path.elements()),
        vec![
            PathElement::MoveTo(point3(0.0, 0.0, 0.0)),
            PathElement::LineTo(point3(5.0, 0.0, 0.0)),
            PathElement::LineTo(point3(10.0, 0.0, 0.0)),
            PathElement::CurveControl(point3(12.0, 5.0, 0.0)),
            PathElement::CurveTo(point3(15.0, 0.0, 0.0)),
        ]
    );
}

#[test]
fn shorten_bounds() {
    for style in EndpointStyle::ALL {
        let mut path = line((100.0, 0.0));
        path.start_style = style;
        path.end_style = style;
        let outline =
            Outline::compute(&path, &StrokeOptions::line_width(2.0), &OutlineStroker::new());

        let shorten = style.shorten_length(2.0);
        assert!(shorten >= 0.0);
        if style == EndpointStyle::None {
            assert!(outline.start.is_none() && outline.end.is_none());
            continue;
        }

        let start = outline.start.unwrap().point;
        let end = outline.end.unwrap().point;
        assert!(start.x > 0.0 && start.x < 100.0);
        assert!(end.x > 0.0 && end.x < 100.0);
        assert!((start.x - shorten).abs() < 1e-9);
        assert!((end.x - (100.0 - shorten)).abs() < 1e-9);
    }
}

#[test]
fn short_segment_is_clamped() {
    let mut path = line((3.0, 0.0));
    path.end_style = EndpointStyle::Arrowhead;
    let outline =
        Outline::compute(&path, &StrokeOptions::line_width(2.0), &OutlineStroker::new());

    let end = outline.end.unwrap();
    assert_eq!(end.point, point3(0.0, 0.0, 0.0));
    assert_eq!(end.heading, vector(2.0, 0.0));
}

#[test]
fn non_flat_fallback() {
    let mut path = Path::new();
    path.move_to(point3(0.0, 0.0, 0.0));
    path.line_to(point3(10.0, 0.0, 2.0));
    path.start_style = EndpointStyle::Circle;
    path.invert = true;

    let outline =
        Outline::compute(&path, &StrokeOptions::line_width(1.0), &OutlineStroker::new());
    assert_eq!(outline.diagnostics, vec![GeometryError::NonFlatStrokeFallback]);
    let centerline = outline.centerline.unwrap();
    assert_eq!(centerline.len(), 2);
    assert!(centerline.invert);

    // Only the decoration remains in the outline.
    assert!(!outline.path.is_empty());
    assert!(outline.path.invert);
}

#[test]
fn degenerate_paths() {
    let mut path = Path::new();
    path.move_to(point3(1.0, 1.0, 0.0));
    path.line_to(point3(1.0, 1.0, 0.0));
    path.end_style = EndpointStyle::Arrowhead;

    let outline =
        Outline::compute(&path, &StrokeOptions::line_width(1.0), &OutlineStroker::new());
    assert!(outline.path.is_empty());
    assert!(outline.end.is_none());
    assert!(outline.diagnostics.is_empty());

    assert!(compute_outline(&Path::new(), 1.0).is_empty());
}

#[test]
fn both_ends_on_one_segment() {
    let mut path = line((10.0, 0.0));
    path.start_style = EndpointStyle::Fletching;
    path.end_style = EndpointStyle::Arrowhead;

    // 6 + 4 units of shortening on a 10 units long segment.
    let outline =
        Outline::compute(&path, &StrokeOptions::line_width(2.0), &OutlineStroker::new());
    assert_eq!(outline.start.unwrap().point, point3(6.0, 0.0, 0.0));
    assert_eq!(outline.end.unwrap().point, point3(6.0, 0.0, 0.0));
}
