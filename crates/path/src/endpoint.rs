//! Decorations drawn at the ends of outlined paths, and dash patterns.
//!
//! # Endpoint constructions
//!
//! Each decoration is built from the (retracted) endpoint `e` and the heading `h`,
//! a vector pointing out of the path whose length is half of the shorten length.
//! `n` is `h` rotated by 90° counter-clockwise. The decoration spans from `e` to
//! `e + 2h`, which is where the path originally ended.
//!
//! | Style        | Construction                                                  |
//! |--------------|---------------------------------------------------------------|
//! | Arrowhead    | `e+2h, e-0.5h+n, e, e-0.5h-n`                                 |
//! | Triangle     | `e+2h, e+n, e-n`                                              |
//! | Pointer      | `e+2h, e+0.6n, e-0.6n`                                        |
//! | Diamond      | `e+2h, e+h+n, e, e+h-n`                                       |
//! | Circle       | circle of radius `\|h\|` centered at `e+h`                    |
//! | Square       | `e+2h+n, e+n, e-n, e+2h-n`                                    |
//! | Bar          | `e+2h+4n, e+4n, e-4n, e+2h-4n`                                |
//! | Cup          | `e+2h+2n, e+2n, e-2n, e+2h-2n, e+2h-n, e+h-n, e+h+n, e+2h+n`  |
//! | Fletching    | `e, e+1.2h-n, e+2h-n, e+0.8h, e+2h+n, e+1.2h+n`               |
//! | Rounded      | half disc of radius `2\|h\|` centered at `e`                  |
//! | HollowCircle | ring of outer radius `\|h\|` and width `line_width`           |
//! | HollowSquare | square frame of half size `\|h\|` and width `line_width`      |
//!
//! All contours are counter-clockwise (holes clockwise) so that they are inside
//! for the positive winding rule.

use crate::math::*;
use crate::Path;

/// Control point distance for a quarter circle approximated with a cubic bézier curve.
const CIRCLE_KAPPA: f64 = 0.5522847498;

/// The decoration drawn at an end of an outlined path.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub enum EndpointStyle {
    None,
    Arrowhead,
    Triangle,
    Pointer,
    Diamond,
    Circle,
    Square,
    Bar,
    Cup,
    Fletching,
    HollowCircle,
    HollowSquare,
    Rounded,
}

type Construction = fn(&mut Builder);

struct StyleInfo {
    shorten: f64,
    construct: Construction,
}

// Indexed by `EndpointStyle as usize`.
static STYLE_TABLE: [StyleInfo; 13] = [
    StyleInfo { shorten: 0.0, construct: none },
    StyleInfo { shorten: 2.0, construct: arrowhead },
    StyleInfo { shorten: 2.0, construct: triangle },
    StyleInfo { shorten: 2.0, construct: pointer },
    StyleInfo { shorten: 2.0, construct: diamond },
    StyleInfo { shorten: 1.5, construct: circle },
    StyleInfo { shorten: 1.5, construct: square },
    StyleInfo { shorten: 0.5, construct: bar },
    StyleInfo { shorten: 1.0, construct: cup },
    StyleInfo { shorten: 3.0, construct: fletching },
    StyleInfo { shorten: 3.5, construct: hollow_circle },
    StyleInfo { shorten: 3.5, construct: hollow_square },
    StyleInfo { shorten: 0.5, construct: rounded },
];

impl EndpointStyle {
    pub const ALL: [EndpointStyle; 13] = [
        EndpointStyle::None,
        EndpointStyle::Arrowhead,
        EndpointStyle::Triangle,
        EndpointStyle::Pointer,
        EndpointStyle::Diamond,
        EndpointStyle::Circle,
        EndpointStyle::Square,
        EndpointStyle::Bar,
        EndpointStyle::Cup,
        EndpointStyle::Fletching,
        EndpointStyle::HollowCircle,
        EndpointStyle::HollowSquare,
        EndpointStyle::Rounded,
    ];

    #[inline]
    fn info(self) -> &'static StyleInfo {
        &STYLE_TABLE[self as usize]
    }

    /// How much the path is shortened at this end, in multiples of the line width.
    #[inline]
    pub fn shorten_multiplier(self) -> f64 {
        self.info().shorten
    }

    /// How much the path is shortened at this end for a given line width.
    #[inline]
    pub fn shorten_length(self, line_width: f64) -> f64 {
        self.shorten_multiplier() * line_width.abs()
    }

    /// Builds the decoration geometry as closed sub-paths.
    ///
    /// `endpoint` is the retracted end of the path, `heading` points out of the path.
    /// All points of the decoration are at the depth of `endpoint`.
    pub fn construct(self, endpoint: Point3, heading: Vector, line_width: f64) -> Path {
        let mut builder = Builder {
            path: Path::new(),
            e: endpoint.xy(),
            h: heading,
            n: vector(-heading.y, heading.x),
            z: endpoint.z,
            line_width: line_width.abs(),
        };
        (self.info().construct)(&mut builder);

        builder.path
    }
}

impl Default for EndpointStyle {
    fn default() -> Self {
        EndpointStyle::None
    }
}

struct Builder {
    path: Path,
    e: Point,
    h: Vector,
    n: Vector,
    z: f64,
    line_width: f64,
}

impl Builder {
    /// The point `e + a·h + b·n`.
    fn at(&self, a: f64, b: f64) -> Point3 {
        (self.e + self.h * a + self.n * b).extend(self.z)
    }

    fn polygon(&mut self, frame_coords: &[(f64, f64)]) {
        for (i, &(a, b)) in frame_coords.iter().enumerate() {
            let p = self.at(a, b);
            if i == 0 {
                self.path.move_to(p);
            } else {
                self.path.line_to(p);
            }
        }
        self.path.close();
    }

    /// Appends a quarter arc from `center + from` to `center + to`.
    ///
    /// `to` must be `from` rotated by ±90°.
    fn quarter_arc(&mut self, center: Point, from: Vector, to: Vector) {
        let ctrl1 = center + from + to * CIRCLE_KAPPA;
        let ctrl2 = center + to + from * CIRCLE_KAPPA;
        self.path.cubic_bezier_to(
            ctrl1.extend(self.z),
            ctrl2.extend(self.z),
            (center + to).extend(self.z),
        );
    }

    /// A full circle starting at `center + radius`, counter-clockwise if `ccw`.
    fn circle(&mut self, center: Point, radius: Vector, ccw: bool) {
        let side = if ccw {
            vector(-radius.y, radius.x)
        } else {
            vector(radius.y, -radius.x)
        };
        let axes = [radius, side, -radius, -side, radius];
        self.path.move_to((center + radius).extend(self.z));
        for pair in axes.windows(2) {
            self.quarter_arc(center, pair[0], pair[1]);
        }
        self.path.close();
    }

    /// A scale factor for the inner contour of hollow shapes.
    fn inner_scale(&self) -> f64 {
        let len = self.h.length();
        if len <= self.line_width || len == 0.0 {
            return 0.0;
        }
        (len - self.line_width) / len
    }
}

fn none(_: &mut Builder) {}

fn arrowhead(b: &mut Builder) {
    b.polygon(&[(2.0, 0.0), (-0.5, 1.0), (0.0, 0.0), (-0.5, -1.0)]);
}

fn triangle(b: &mut Builder) {
    b.polygon(&[(2.0, 0.0), (0.0, 1.0), (0.0, -1.0)]);
}

fn pointer(b: &mut Builder) {
    b.polygon(&[(2.0, 0.0), (0.0, 0.6), (0.0, -0.6)]);
}

fn diamond(b: &mut Builder) {
    b.polygon(&[(2.0, 0.0), (1.0, 1.0), (0.0, 0.0), (1.0, -1.0)]);
}

fn circle(b: &mut Builder) {
    let center = b.e + b.h;
    let radius = b.h;
    b.circle(center, radius, true);
}

fn square(b: &mut Builder) {
    b.polygon(&[(2.0, 1.0), (0.0, 1.0), (0.0, -1.0), (2.0, -1.0)]);
}

fn bar(b: &mut Builder) {
    b.polygon(&[(2.0, 4.0), (0.0, 4.0), (0.0, -4.0), (2.0, -4.0)]);
}

fn cup(b: &mut Builder) {
    b.polygon(&[
        (2.0, 2.0),
        (0.0, 2.0),
        (0.0, -2.0),
        (2.0, -2.0),
        (2.0, -1.0),
        (1.0, -1.0),
        (1.0, 1.0),
        (2.0, 1.0),
    ]);
}

fn fletching(b: &mut Builder) {
    b.polygon(&[
        (0.0, 0.0),
        (1.2, -1.0),
        (2.0, -1.0),
        (0.8, 0.0),
        (2.0, 1.0),
        (1.2, 1.0),
    ]);
}

fn rounded(b: &mut Builder) {
    let center = b.e;
    let h = b.h * 2.0;
    let n = b.n * 2.0;
    b.path.move_to((center - n).extend(b.z));
    b.quarter_arc(center, -n, h);
    b.quarter_arc(center, h, n);
    b.path.close();
}

fn hollow_circle(b: &mut Builder) {
    let center = b.e + b.h;
    let radius = b.h;
    b.circle(center, radius, true);

    let inner = radius * b.inner_scale();
    if inner.square_length() > 0.0 {
        b.circle(center, inner, false);
    }
}

fn hollow_square(b: &mut Builder) {
    b.polygon(&[(2.0, 1.0), (0.0, 1.0), (0.0, -1.0), (2.0, -1.0)]);

    let s = b.inner_scale();
    if s > 0.0 {
        // Same square scaled around its center, in reverse order.
        b.polygon(&[
            (1.0 + s, -s),
            (1.0 - s, -s),
            (1.0 - s, s),
            (1.0 + s, s),
        ]);
    }
}

/// The dash pattern used when outlining a path.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub enum LineStyle {
    Solid,
    Dash,
    Dot,
    DashDot,
    DashDotDot,
    LongDash,
}

impl LineStyle {
    pub const ALL: [LineStyle; 6] = [
        LineStyle::Solid,
        LineStyle::Dash,
        LineStyle::Dot,
        LineStyle::DashDot,
        LineStyle::DashDotDot,
        LineStyle::LongDash,
    ];

    /// Alternating on and off lengths, in multiples of the line width.
    ///
    /// Empty for solid lines.
    pub fn dash_array(self) -> &'static [f64] {
        match self {
            LineStyle::Solid => &[],
            LineStyle::Dash => &[4.0, 2.0],
            LineStyle::Dot => &[1.0, 2.0],
            LineStyle::DashDot => &[4.0, 2.0, 1.0, 2.0],
            LineStyle::DashDotDot => &[4.0, 2.0, 1.0, 2.0, 1.0, 2.0],
            LineStyle::LongDash => &[8.0, 3.0],
        }
    }

    #[inline]
    pub fn is_solid(self) -> bool {
        self == LineStyle::Solid
    }
}

impl Default for LineStyle {
    fn default() -> Self {
        LineStyle::Solid
    }
}

#[cfg(test)]
fn sub_path_areas(path: &Path) -> Vec<f64> {
    use crate::geom::utils::signed_area;
    use crate::Event;

    let mut areas = Vec::new();
    let mut points = Vec::new();
    for evt in path.iter() {
        match evt {
            Event::Begin { at } => {
                points.clear();
                points.push(at.xy());
            }
            Event::End { .. } => areas.push(signed_area(points.iter().cloned())),
            // Control points are close enough to the curve for the sign of the area.
            Event::Cubic {
                ctrl1, ctrl2, to, ..
            } => {
                points.push(ctrl1.xy());
                points.push(ctrl2.xy());
                points.push(to.xy());
            }
            other => points.push(other.to().xy()),
        }
    }

    areas
}

#[test]
fn shorten_table() {
    let expected = [
        (EndpointStyle::HollowCircle, 3.5),
        (EndpointStyle::HollowSquare, 3.5),
        (EndpointStyle::Fletching, 3.0),
        (EndpointStyle::Arrowhead, 2.0),
        (EndpointStyle::Triangle, 2.0),
        (EndpointStyle::Pointer, 2.0),
        (EndpointStyle::Diamond, 2.0),
        (EndpointStyle::Circle, 1.5),
        (EndpointStyle::Square, 1.5),
        (EndpointStyle::Cup, 1.0),
        (EndpointStyle::Rounded, 0.5),
        (EndpointStyle::Bar, 0.5),
        (EndpointStyle::None, 0.0),
    ];

    for (style, multiplier) in expected {
        assert_eq!(style.shorten_multiplier(), multiplier, "{:?}", style);
        assert_eq!(style.shorten_length(-2.0), multiplier * 2.0);
    }
}

#[test]
fn arrowhead_layout() {
    let path = EndpointStyle::Arrowhead.construct(point3(6.0, 0.0, 1.0), vector(2.0, 0.0), 2.0);
    let points: Vec<Point3> = path.elements().iter().map(|e| e.point()).collect();
    assert_eq!(
        points,
        vec![
            point3(10.0, 0.0, 1.0),
            point3(5.0, 2.0, 1.0),
            point3(6.0, 0.0, 1.0),
            point3(5.0, -2.0, 1.0),
            point3(10.0, 0.0, 1.0),
        ]
    );
}

#[test]
fn circle_layout() {
    let path = EndpointStyle::Circle.construct(point3(0.0, 0.0, 0.0), vector(0.0, 1.5), 2.0);
    let bounds = path.bounds();
    assert!((bounds.min.y - 0.0).abs() < 1e-9);
    assert!((bounds.max.y - 3.0).abs() < 1e-9);
    assert!((bounds.min.x + 1.5).abs() < 1e-9);
    assert!((bounds.max.x - 1.5).abs() < 1e-9);
    assert_eq!(path.elements()[0].point(), point3(0.0, 3.0, 0.0));
}

#[test]
fn decorations_are_positively_oriented() {
    for style in EndpointStyle::ALL {
        let path = style.construct(point3(3.0, 4.0, 0.0), vector(0.0, -2.0), 1.0);
        if style == EndpointStyle::None {
            assert!(path.is_empty());
            continue;
        }

        let areas = sub_path_areas(&path);
        assert!(!areas.is_empty(), "{:?}", style);
        assert!(areas[0] > 0.0, "{:?} {:?}", style, areas);
        if let Some(hole) = areas.get(1) {
            assert!(*hole < 0.0, "{:?} {:?}", style, areas);
            assert!(hole.abs() < areas[0]);
        }
    }
}

#[test]
fn hollow_shapes_have_holes() {
    let ring = EndpointStyle::HollowCircle.construct(point3(0.0, 0.0, 0.0), vector(3.5, 0.0), 2.0);
    assert_eq!(ring.sub_paths().count(), 2);

    let thin = EndpointStyle::HollowSquare.construct(point3(0.0, 0.0, 0.0), vector(0.5, 0.0), 2.0);
    assert_eq!(thin.sub_paths().count(), 1);
}

#[test]
fn dash_arrays() {
    for style in LineStyle::ALL {
        let array = style.dash_array();
        assert_eq!(array.len() % 2, 0);
        assert!(array.iter().all(|v| *v > 0.0));
        assert_eq!(style.is_solid(), array.is_empty());
    }
}
