//! Approximation of paths with polylines.
//!
//! Curves are evaluated with the Bernstein basis at `steps` uniformly spaced parameter
//! values `t = i / steps, i = 1..=steps`, the start point being emitted by the previous
//! element. See [`step_count`](fn.step_count.html).
//!
//! Texture coordinates are the positions normalized to the bounds of the path, and are
//! interpolated along curves with the same weights as the positions.

use crate::error::GeometryError;
use crate::geom::utils::signed_area;
use crate::geom::{CubicBezierSegment, QuadraticBezierSegment};
use crate::math::*;
use crate::path::{ElementId, Event, Path};
use crate::{FlattenedVertex, FlatteningOptions};

/// Number of samples used to flatten a curve with a given chord length.
///
/// Always within `[1, steps_max]` and monotonically increasing with the chord length.
pub fn step_count(chord_length: f64, options: &FlatteningOptions) -> u32 {
    let max = options.steps_max.max(1.0);
    let steps = options.steps_min + options.steps_increase * (chord_length.max(0.0) + 1.0).log2();
    if steps.is_nan() {
        return 1;
    }

    steps.max(1.0).min(max).ceil() as u32
}

/// One flattened sub-path.
#[derive(Clone, Debug, PartialEq)]
pub struct Contour {
    /// Never empty. For closed contours the closing vertex is not repeated.
    pub vertices: Vec<FlattenedVertex>,
    /// True if the sub-path ends where it starts.
    pub closed: bool,
}

impl Contour {
    #[inline]
    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Signed area of the contour projected on the xy plane, positive if counter-clockwise.
    pub fn signed_area(&self) -> f64 {
        signed_area(self.vertices.iter().map(|v| v.position.xy()))
    }

    /// Reverses the order of the vertices, keeping the first one in place.
    pub fn reverse(&mut self) {
        if self.vertices.len() > 1 {
            self.vertices[1..].reverse();
        }
    }
}

/// The result of [`flatten_path`](fn.flatten_path.html).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FlattenedPath {
    pub contours: Vec<Contour>,
    pub diagnostics: Vec<GeometryError>,
}

impl FlattenedPath {
    pub fn vertex_count(&self) -> usize {
        self.contours.iter().map(Contour::len).sum()
    }
}

/// Maps positions to the unit cube spanned by the bounds of a path.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct TextureMapping {
    min: Point3,
    inv_extent: Vector3,
}

impl TextureMapping {
    pub fn new(bounds: &Box3) -> Self {
        fn inv(extent: f64) -> f64 {
            if extent > 0.0 {
                1.0 / extent
            } else {
                0.0
            }
        }

        let size = bounds.max - bounds.min;
        TextureMapping {
            min: bounds.min,
            inv_extent: vector3(inv(size.x), inv(size.y), inv(size.z)),
        }
    }

    #[inline]
    pub fn map(&self, p: Point3) -> Point3 {
        let d = p - self.min;
        point3(
            d.x * self.inv_extent.x,
            d.y * self.inv_extent.y,
            d.z * self.inv_extent.z,
        )
    }
}

/// Flattens every sub-path of a path into a contour.
///
/// Recoverable problems are reported in the `diagnostics` of the result:
/// - curves with an unsupported number of control points are replaced with a straight
///   segment to their endpoint,
/// - curves with a zero-length chord produce a single point.
///
/// Consecutive duplicate vertices are dropped. Texture coordinates are only computed if
/// `with_texture` is set.
pub fn flatten_path(path: &Path, options: &FlatteningOptions, with_texture: bool) -> FlattenedPath {
    let mut flattener = Flattener {
        mapping: if with_texture {
            Some(TextureMapping::new(&path.bounds()))
        } else {
            None
        },
        current: Vec::new(),
        output: FlattenedPath::default(),
    };

    for evt in path.id_iter() {
        match evt {
            Event::Begin { at } => {
                flattener.end();
                flattener.push(path[at], flattener.texture(path[at]), at);
            }
            Event::Line { from, to } => {
                if path[from] == path[to] {
                    flattener.report(GeometryError::DegenerateGeometry {
                        element: to.to_usize(),
                    });
                }
                flattener.push(path[to], flattener.texture(path[to]), to);
            }
            Event::Quadratic { from, ctrl, to } => {
                let curve = QuadraticBezierSegment {
                    from: path[from],
                    ctrl: path[ctrl],
                    to: path[to],
                };
                let textures = [
                    flattener.texture(curve.from),
                    flattener.texture(curve.ctrl),
                    flattener.texture(curve.to),
                ];
                let steps = flattener.curve_steps(curve.chord_length(), to, options);
                for i in 1..=steps {
                    let t = i as f64 / steps as f64;
                    let w = QuadraticBezierSegment::weights(t);
                    let position = if i == steps { curve.to } else { curve.sample(t) };
                    flattener.push(position, interpolate(&textures, &w), to);
                }
            }
            Event::Cubic {
                from,
                ctrl1,
                ctrl2,
                to,
            } => {
                let curve = CubicBezierSegment {
                    from: path[from],
                    ctrl1: path[ctrl1],
                    ctrl2: path[ctrl2],
                    to: path[to],
                };
                let textures = [
                    flattener.texture(curve.from),
                    flattener.texture(curve.ctrl1),
                    flattener.texture(curve.ctrl2),
                    flattener.texture(curve.to),
                ];
                let steps = flattener.curve_steps(curve.chord_length(), to, options);
                for i in 1..=steps {
                    let t = i as f64 / steps as f64;
                    let w = CubicBezierSegment::weights(t);
                    let position = if i == steps { curve.to } else { curve.sample(t) };
                    flattener.push(position, interpolate(&textures, &w), to);
                }
            }
            Event::Unsupported {
                to, control_points, ..
            } => {
                flattener.report(GeometryError::UnsupportedCurveOrder {
                    element: to.to_usize(),
                    control_points,
                });
                flattener.push(path[to], flattener.texture(path[to]), to);
            }
            Event::End { .. } => {
                flattener.end();
            }
        }
    }
    flattener.end();

    flattener.output
}

fn interpolate(points: &[Point3], weights: &[f64]) -> Point3 {
    let mut result = Point3::origin();
    for (p, w) in points.iter().zip(weights) {
        result += p.to_vector() * *w;
    }

    result
}

struct Flattener {
    mapping: Option<TextureMapping>,
    current: Vec<FlattenedVertex>,
    output: FlattenedPath,
}

impl Flattener {
    fn texture(&self, p: Point3) -> Point3 {
        match &self.mapping {
            Some(mapping) => mapping.map(p),
            None => Point3::origin(),
        }
    }

    fn report(&mut self, error: GeometryError) {
        error.log();
        self.output.diagnostics.push(error);
    }

    fn curve_steps(&mut self, chord_length: f64, to: ElementId, options: &FlatteningOptions) -> u32 {
        if chord_length == 0.0 {
            self.report(GeometryError::DegenerateGeometry {
                element: to.to_usize(),
            });
            return 1;
        }

        step_count(chord_length, options)
    }

    fn push(&mut self, position: Point3, texture: Point3, element: ElementId) {
        if let Some(last) = self.current.last() {
            if last.position == position {
                return;
            }
        }

        let index = i32::try_from(element.0).unwrap_or(i32::MAX);
        self.current.push(FlattenedVertex {
            texture,
            ..FlattenedVertex::new(position, index)
        });
    }

    fn end(&mut self) {
        if self.current.is_empty() {
            return;
        }

        let mut vertices = std::mem::take(&mut self.current);
        let mut closed = false;
        if vertices.len() > 1 && vertices[0].position == vertices[vertices.len() - 1].position {
            vertices.pop();
            closed = true;
        }

        self.output.contours.push(Contour { vertices, closed });
    }
}

#[cfg(test)]
fn p(x: f64, y: f64) -> Point3 {
    point3(x, y, 0.0)
}

#[test]
fn step_count_is_monotonic_and_bounded() {
    let options = FlatteningOptions::DEFAULT;
    let mut previous = 0;
    let mut chord = 0.0;
    while chord < 1e7 {
        let steps = step_count(chord, &options);
        assert!(steps >= 1);
        assert!(steps <= 25);
        assert!(steps >= previous);
        previous = steps;
        chord = chord * 1.5 + 0.01;
    }

    assert_eq!(step_count(0.0, &options), 1);
    assert_eq!(step_count(1.0, &options), 2);
    assert_eq!(step_count(3.0, &options), 4);
    assert_eq!(step_count(f64::INFINITY, &options), 25);
    assert_eq!(step_count(f64::NAN, &options), 1);
}

#[test]
fn flatten_lines() {
    let mut path = Path::new();
    path.move_to(p(0.0, 0.0));
    path.line_to(p(10.0, 0.0));
    path.line_to(p(5.0, 10.0));
    path.close();

    let flattened = flatten_path(&path, &FlatteningOptions::DEFAULT, false);
    assert_eq!(flattened.contours.len(), 1);
    let contour = &flattened.contours[0];
    assert!(contour.closed);
    assert_eq!(contour.len(), 3);
    assert_eq!(
        contour.vertices.iter().map(|v| v.index).collect::<Vec<_>>(),
        vec![0, 1, 2]
    );
    assert!(contour.signed_area() > 0.0);
    assert!(flattened.diagnostics.is_empty());
}

#[test]
fn flatten_curves_within_bounds() {
    let mut path = Path::new();
    path.move_to(p(0.0, 0.0));
    path.quadratic_bezier_to(p(30.0, 40.0), point3(60.0, 0.0, 5.0));
    path.cubic_bezier_to(p(70.0, -30.0), p(-10.0, -50.0), p(0.0, 0.0));

    let flattened = flatten_path(&path, &FlatteningOptions::DEFAULT, true);
    let bounds = path.bounds();
    let eps = 1e-9;
    for v in &flattened.contours[0].vertices {
        let q = v.position;
        assert!(q.x >= bounds.min.x - eps && q.x <= bounds.max.x + eps);
        assert!(q.y >= bounds.min.y - eps && q.y <= bounds.max.y + eps);
        assert!(q.z >= bounds.min.z - eps && q.z <= bounds.max.z + eps);
        for t in [v.texture.x, v.texture.y, v.texture.z] {
            assert!(t >= -eps && t <= 1.0 + eps);
        }
    }

    // chord 60 -> ceil(2 * log2(61)) = 12 samples, chord 60 again for the cubic.
    let contour = &flattened.contours[0];
    assert!(contour.closed);
    assert_eq!(contour.len(), 1 + 12 + 11);
    assert_eq!(contour.vertices[12].position, point3(60.0, 0.0, 5.0));
    assert_eq!(contour.vertices[12].index, 2);
    assert_eq!(contour.vertices[13].index, 5);
}

#[test]
fn texture_coordinates() {
    let mut path = Path::new();
    path.move_to(p(-10.0, 0.0));
    path.line_to(p(10.0, 0.0));
    path.line_to(p(10.0, 5.0));

    let flattened = flatten_path(&path, &FlatteningOptions::DEFAULT, true);
    let textures: Vec<Point3> = flattened.contours[0]
        .vertices
        .iter()
        .map(|v| v.texture)
        .collect();
    assert_eq!(
        textures,
        vec![
            point3(0.0, 0.0, 0.0),
            point3(1.0, 0.0, 0.0),
            point3(1.0, 1.0, 0.0)
        ]
    );

    let untextured = flatten_path(&path, &FlatteningOptions::DEFAULT, false);
    assert!(untextured.contours[0]
        .vertices
        .iter()
        .all(|v| v.texture == Point3::origin()));
}

#[test]
fn zero_length_curve() {
    let mut path = Path::new();
    path.move_to(p(0.0, 0.0));
    path.quadratic_bezier_to(p(0.0, 0.0), p(0.0, 0.0));

    let flattened = flatten_path(&path, &FlatteningOptions::DEFAULT, true);
    assert_eq!(flattened.contours.len(), 1);
    assert_eq!(flattened.contours[0].len(), 1);
    assert_eq!(flattened.contours[0].vertices[0].position, p(0.0, 0.0));
    assert!(!flattened.contours[0].closed);
    assert_eq!(
        flattened.diagnostics,
        vec![GeometryError::DegenerateGeometry { element: 2 }]
    );
}

#[test]
fn unsupported_curve_order() {
    use crate::path::PathElement;

    let mut path = Path::new();
    path.move_to(p(0.0, 0.0));
    path.push(PathElement::CurveControl(p(1.0, 1.0)));
    path.push(PathElement::CurveControl(p(2.0, 1.0)));
    path.push(PathElement::CurveControl(p(3.0, 1.0)));
    path.push(PathElement::CurveTo(p(4.0, 0.0)));
    path.line_to(p(4.0, 4.0));

    let flattened = flatten_path(&path, &FlatteningOptions::DEFAULT, false);
    assert_eq!(
        flattened.diagnostics,
        vec![GeometryError::UnsupportedCurveOrder {
            element: 4,
            control_points: 3
        }]
    );
    let positions: Vec<Point3> = flattened.contours[0]
        .vertices
        .iter()
        .map(|v| v.position)
        .collect();
    assert_eq!(positions, vec![p(0.0, 0.0), p(4.0, 0.0), p(4.0, 4.0)]);
}

#[test]
fn multiple_sub_paths() {
    let mut path = Path::new();
    path.move_to(p(0.0, 0.0));
    path.line_to(p(1.0, 0.0));
    path.move_to(p(5.0, 5.0));
    path.line_to(p(5.0, 5.0));
    path.line_to(p(6.0, 5.0));

    let flattened = flatten_path(&path, &FlatteningOptions::DEFAULT, false);
    assert_eq!(flattened.contours.len(), 2);
    assert_eq!(flattened.contours[1].len(), 2);
    assert_eq!(flattened.vertex_count(), 4);
    assert_eq!(
        flattened.diagnostics,
        vec![GeometryError::DegenerateGeometry { element: 3 }]
    );
}
