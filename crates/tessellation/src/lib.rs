#![deny(bare_trait_objects)]
#![deny(unconditional_recursion)]
#![allow(clippy::too_many_arguments)]

//! Turn paths into renderable and extrudable geometry.
//!
//! This crate is reexported in [relief](../relief/index.html).
//!
//! # Overview
//!
//! The [`PathRenderer`](draw/struct.PathRenderer.html) takes a
//! [`Path`](../relief_path/struct.Path.html) and a [`StyleContext`](struct.StyleContext.html)
//! and submits vertex batches to a [`RenderSink`](sink/trait.RenderSink.html). A draw call
//! goes through up to three passes:
//!
//! - the fill pass flattens the path, tessellates the contours and, for extruded paths,
//!   draws the back cap and generates the side walls,
//! - the line pass computes the outline of the path (stroke plus endpoint decorations)
//!   and fills it the same way,
//! - the depth closure pass re-submits the caps to the depth buffer only.
//!
//! The pieces are usable on their own:
//!
//! - [`flatten_path`](flatten/fn.flatten_path.html) approximates curves with line segments,
//! - [`Tess2Tessellator`](tessellator/struct.Tess2Tessellator.html) implements the
//!   [`Tessellator`](tessellator/trait.Tessellator.html) callback protocol on top of libtess2,
//! - [`extrude_contour`](extrude/fn.extrude_contour.html) generates side walls,
//! - [`compute_outline`](outline/fn.compute_outline.html) computes decorated outlines.
//!
//! # Flattening
//!
//! Curves are sampled at uniformly spaced parameter values. The number of samples grows
//! with the logarithm of the distance between the endpoints of the curve, see
//! [`FlatteningOptions`](struct.FlatteningOptions.html).
//!
//! # Coordinate system
//!
//! Polygons are expected to be counter-clockwise in a y-up frame. The extrusion goes
//! towards negative z: the front cap is at the depth of the path and the back cap
//! `depth` units behind it.

pub use relief_path as path;

#[cfg(feature = "serialization")]
#[macro_use]
pub extern crate serde;

pub mod draw;
mod error;
pub mod extrude;
pub mod fill;
pub mod flatten;
pub mod outline;
pub mod sink;
pub mod stroke;
pub mod tessellator;

#[cfg(test)]
mod draw_tests;

#[doc(inline)]
pub use crate::draw::{compute_bounds, DrawReport, Pass, PathRenderer};
pub use crate::error::*;
#[doc(inline)]
pub use crate::extrude::{extrude_contour, Extrusion};
#[doc(inline)]
pub use crate::flatten::{flatten_path, step_count, Contour, FlattenedPath};
#[doc(inline)]
pub use crate::outline::{compute_outline, Outline};
#[doc(inline)]
pub use crate::sink::{DrawCommand, FrontFace, RecordingSink, RenderSink};
#[doc(inline)]
pub use crate::stroke::{OutlineStroker, StrokeService};
#[doc(inline)]
pub use crate::tessellator::{Tess2Tessellator, TessellationSink, Tessellator, VertexHandle};

pub use crate::path::geom;
pub use crate::path::math;
pub use crate::path::{EndpointStyle, LineStyle, Path, PathElement, WindingRule};

use crate::math::{vector3, Point3, Vector3};

/// The value of `FlattenedVertex::index` for vertices created by the tessellator.
pub const SYNTHESIZED_VERTEX: i32 = -1;

/// Below this cosine between the normals of two consecutive edges, the corner between
/// them is considered sharp.
pub const SHARP_EDGE_THRESHOLD: f64 = 0.9;

/// Edges shorter than this are ignored when extruding.
pub const MIN_EDGE_LENGTH: f64 = 1e-3;

/// Number of steps used to sweep a beveled sharp corner.
pub const SHARP_CORNER_SUBDIVISIONS: u32 = 5;

/// A vertex as submitted to the renderer.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct FlattenedVertex {
    pub position: Point3,
    pub texture: Point3,
    pub normal: Vector3,
    /// Index of the path element this vertex comes from, or `SYNTHESIZED_VERTEX`.
    pub index: i32,
}

impl FlattenedVertex {
    /// A vertex facing the viewer, with no texture coordinate.
    pub fn new(position: Point3, index: i32) -> Self {
        FlattenedVertex {
            position,
            texture: Point3::origin(),
            normal: vector3(0.0, 0.0, 1.0),
            index,
        }
    }

    #[inline]
    pub fn is_synthesized(&self) -> bool {
        self.index == SYNTHESIZED_VERTEX
    }
}

/// How the renderer should assemble the vertices of a batch.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub enum PrimitiveKind {
    Triangles,
    TriangleStrip,
    TriangleFan,
    Polygon,
    LineStrip,
}

/// A list of vertices and the primitive they form.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct VertexBatch {
    pub kind: PrimitiveKind,
    pub vertices: Vec<FlattenedVertex>,
}

impl VertexBatch {
    pub fn new(kind: PrimitiveKind) -> Self {
        VertexBatch {
            kind,
            vertices: Vec::new(),
        }
    }

    /// Number of triangles the batch describes.
    pub fn triangle_count(&self) -> usize {
        let n = self.vertices.len();
        match self.kind {
            PrimitiveKind::Triangles => n / 3,
            PrimitiveKind::TriangleStrip | PrimitiveKind::TriangleFan | PrimitiveKind::Polygon => {
                n.saturating_sub(2)
            }
            PrimitiveKind::LineStrip => 0,
        }
    }
}

/// Parameters of the curve flattener.
///
/// A curve with a chord length `L` is sampled
/// `ceil(clamp(steps_min + steps_increase * log2(L + 1), 1, steps_max))` times.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct FlatteningOptions {
    /// Default value: `FlatteningOptions::DEFAULT_STEPS_MIN`.
    pub steps_min: f64,
    /// Default value: `FlatteningOptions::DEFAULT_STEPS_INCREASE`.
    pub steps_increase: f64,
    /// Default value: `FlatteningOptions::DEFAULT_STEPS_MAX`.
    pub steps_max: f64,
}

impl FlatteningOptions {
    pub const DEFAULT_STEPS_MIN: f64 = 0.0;
    pub const DEFAULT_STEPS_INCREASE: f64 = 2.0;
    pub const DEFAULT_STEPS_MAX: f64 = 25.0;

    pub const DEFAULT: Self = FlatteningOptions {
        steps_min: Self::DEFAULT_STEPS_MIN,
        steps_increase: Self::DEFAULT_STEPS_INCREASE,
        steps_max: Self::DEFAULT_STEPS_MAX,
    };

    #[inline]
    pub const fn with_steps_min(mut self, steps: f64) -> Self {
        self.steps_min = steps;
        self
    }

    #[inline]
    pub const fn with_steps_increase(mut self, steps: f64) -> Self {
        self.steps_increase = steps;
        self
    }

    #[inline]
    pub const fn with_steps_max(mut self, steps: f64) -> Self {
        self.steps_max = steps;
        self
    }
}

impl Default for FlatteningOptions {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Parameters of the extrusion engine.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct ExtrusionOptions {
    /// Distance between the front and back caps. No walls are generated if this is
    /// not positive.
    ///
    /// Default value: `0.0`.
    pub depth: f64,

    /// Radius of the rounded profile at the edges of the walls, clamped to half of
    /// the depth.
    ///
    /// Default value: `0.0`.
    pub bevel_radius: f64,

    /// Number of facets of the bevel profile. Negative values produce a chamfer with
    /// flat shaded facets. Zero disables the bevel.
    ///
    /// Default value: `0`.
    pub facet_count: i32,

    /// Flips the wall normals, for paths whose source has a flipped y axis.
    ///
    /// Default value: `false`.
    pub invert_normals: bool,

    /// Default value: `SHARP_EDGE_THRESHOLD`.
    pub sharp_edge_threshold: f64,

    /// Default value: `MIN_EDGE_LENGTH`.
    pub min_edge_length: f64,
}

impl ExtrusionOptions {
    pub const DEFAULT: Self = ExtrusionOptions {
        depth: 0.0,
        bevel_radius: 0.0,
        facet_count: 0,
        invert_normals: false,
        sharp_edge_threshold: SHARP_EDGE_THRESHOLD,
        min_edge_length: MIN_EDGE_LENGTH,
    };

    #[inline]
    pub fn depth(depth: f64) -> Self {
        Self::DEFAULT.with_depth(depth)
    }

    #[inline]
    pub const fn with_depth(mut self, depth: f64) -> Self {
        self.depth = depth;
        self
    }

    #[inline]
    pub const fn with_bevel(mut self, radius: f64, facet_count: i32) -> Self {
        self.bevel_radius = radius;
        self.facet_count = facet_count;
        self
    }

    #[inline]
    pub const fn with_inverted_normals(mut self, invert: bool) -> Self {
        self.invert_normals = invert;
        self
    }

    #[inline]
    pub const fn with_sharp_edge_threshold(mut self, threshold: f64) -> Self {
        self.sharp_edge_threshold = threshold;
        self
    }

    #[inline]
    pub fn is_beveled(&self) -> bool {
        self.bevel_radius > 0.0 && self.facet_count != 0
    }
}

impl Default for ExtrusionOptions {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Line cap as defined by the SVG specification.
///
/// See: <https://svgwg.org/specs/strokes/#StrokeLinecapProperty>
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub enum LineCap {
    /// The stroke for each sub-path does not extend beyond its two endpoints.
    Flat,
    /// At the end of each sub-path, the shape representing the stroke will be
    /// extended by a rectangle with the same width as the stroke width and
    /// whose length is half of the stroke width.
    Square,
    /// At each end of each sub-path, the shape representing the stroke will be extended
    /// by a half circle with a radius equal to the stroke width.
    Round,
}

/// Line join as defined by the SVG specification.
///
/// See: <https://svgwg.org/specs/strokes/#StrokeLinejoinProperty>
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub enum LineJoin {
    /// A sharp corner is to be used to join path segments.
    Miter,
    /// A round corner is to be used to join path segments.
    Round,
    /// A bevelled corner is to be used to join path segments.
    Bevel,
}

/// Parameters of the stroke service.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct StrokeOptions {
    /// Default value: `StrokeOptions::DEFAULT_LINE_WIDTH`.
    pub line_width: f64,

    /// Default value: `LineCap::Flat`.
    pub cap: LineCap,

    /// Default value: `LineJoin::Round`.
    pub join: LineJoin,

    /// Default value: `LineStyle::Solid`.
    pub dash: LineStyle,

    /// Number of segments of a round join or cap, per half turn.
    ///
    /// Default value: `StrokeOptions::DEFAULT_ROUND_JOIN_SEGMENTS`.
    pub round_join_segments: u32,

    /// See the SVG specification.
    ///
    /// Default value: `StrokeOptions::DEFAULT_MITER_LIMIT`.
    pub miter_limit: f64,
}

impl StrokeOptions {
    pub const DEFAULT_LINE_WIDTH: f64 = 1.0;
    pub const DEFAULT_ROUND_JOIN_SEGMENTS: u32 = 8;
    pub const DEFAULT_MITER_LIMIT: f64 = 4.0;

    pub const DEFAULT: Self = StrokeOptions {
        line_width: Self::DEFAULT_LINE_WIDTH,
        cap: LineCap::Flat,
        join: LineJoin::Round,
        dash: LineStyle::Solid,
        round_join_segments: Self::DEFAULT_ROUND_JOIN_SEGMENTS,
        miter_limit: Self::DEFAULT_MITER_LIMIT,
    };

    #[inline]
    pub fn line_width(line_width: f64) -> Self {
        Self::DEFAULT.with_line_width(line_width)
    }

    #[inline]
    pub const fn with_line_width(mut self, width: f64) -> Self {
        self.line_width = width;
        self
    }

    #[inline]
    pub const fn with_line_cap(mut self, cap: LineCap) -> Self {
        self.cap = cap;
        self
    }

    #[inline]
    pub const fn with_line_join(mut self, join: LineJoin) -> Self {
        self.join = join;
        self
    }

    #[inline]
    pub const fn with_dash(mut self, dash: LineStyle) -> Self {
        self.dash = dash;
        self
    }

    #[inline]
    pub const fn with_round_join_segments(mut self, segments: u32) -> Self {
        self.round_join_segments = segments;
        self
    }

    #[inline]
    pub const fn with_miter_limit(mut self, limit: f64) -> Self {
        self.miter_limit = limit;
        self
    }
}

impl Default for StrokeOptions {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// The layout and style parameters of a draw call.
///
/// The renderer copies what it needs out of the context when a draw call starts.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub struct StyleContext {
    /// Whether a fill color is set.
    pub fill: bool,
    /// Whether a line color is set.
    pub line: bool,
    pub line_width: f64,
    /// Overrides the line style of the path.
    pub line_style: Option<LineStyle>,
    pub depth: f64,
    pub bevel_radius: f64,
    pub facet_count: i32,
    /// Texture coordinates are only computed when at least one texture unit is used.
    pub texture_units: u32,
    /// Tessellate the fill with this rule, or submit contours as authored if `None`.
    pub winding_rule: Option<WindingRule>,
    pub flattening: FlatteningOptions,
    pub sharp_edge_threshold: f64,
}

impl StyleContext {
    pub const DEFAULT: Self = StyleContext {
        fill: false,
        line: false,
        line_width: 1.0,
        line_style: None,
        depth: 0.0,
        bevel_radius: 0.0,
        facet_count: 0,
        texture_units: 0,
        winding_rule: Some(WindingRule::Positive),
        flattening: FlatteningOptions::DEFAULT,
        sharp_edge_threshold: SHARP_EDGE_THRESHOLD,
    };

    /// A filled style, tessellated with the positive winding rule.
    #[inline]
    pub fn filled() -> Self {
        Self::DEFAULT.with_fill(true)
    }

    /// A stroked style.
    #[inline]
    pub fn stroked(line_width: f64) -> Self {
        Self::DEFAULT.with_line(line_width)
    }

    #[inline]
    pub const fn with_fill(mut self, fill: bool) -> Self {
        self.fill = fill;
        self
    }

    #[inline]
    pub const fn with_line(mut self, line_width: f64) -> Self {
        self.line = true;
        self.line_width = line_width;
        self
    }

    #[inline]
    pub const fn with_line_style(mut self, style: LineStyle) -> Self {
        self.line_style = Some(style);
        self
    }

    #[inline]
    pub const fn with_depth(mut self, depth: f64) -> Self {
        self.depth = depth;
        self
    }

    #[inline]
    pub const fn with_bevel(mut self, radius: f64, facet_count: i32) -> Self {
        self.bevel_radius = radius;
        self.facet_count = facet_count;
        self
    }

    #[inline]
    pub const fn with_texture_units(mut self, units: u32) -> Self {
        self.texture_units = units;
        self
    }

    #[inline]
    pub const fn with_winding_rule(mut self, rule: Option<WindingRule>) -> Self {
        self.winding_rule = rule;
        self
    }

    #[inline]
    pub const fn with_flattening(mut self, options: FlatteningOptions) -> Self {
        self.flattening = options;
        self
    }

    /// The extrusion parameters of this style.
    pub fn extrusion(&self, invert_normals: bool) -> ExtrusionOptions {
        ExtrusionOptions {
            depth: self.depth,
            bevel_radius: self.bevel_radius,
            facet_count: self.facet_count,
            invert_normals,
            sharp_edge_threshold: self.sharp_edge_threshold,
            min_edge_length: MIN_EDGE_LENGTH,
        }
    }

    /// The stroke parameters used to outline a path with this style.
    pub fn stroke(&self, path_line_style: LineStyle) -> StrokeOptions {
        StrokeOptions::line_width(self.line_width)
            .with_dash(self.line_style.unwrap_or(path_line_style))
    }
}

impl Default for StyleContext {
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[test]
fn stroke_options_defaults() {
    let expected = StrokeOptions::DEFAULT;
    assert_eq!(StrokeOptions::default(), expected);
    assert_eq!(expected.cap, LineCap::Flat);
    assert_eq!(expected.join, LineJoin::Round);
    assert_eq!(expected.round_join_segments, 8);
}

#[test]
fn style_context_copies() {
    let style = StyleContext::filled()
        .with_depth(4.0)
        .with_bevel(1.0, 3)
        .with_line(2.0)
        .with_line_style(LineStyle::Dot);

    let extrusion = style.extrusion(true);
    assert_eq!(extrusion.depth, 4.0);
    assert!(extrusion.is_beveled());
    assert!(extrusion.invert_normals);
    assert_eq!(extrusion.sharp_edge_threshold, SHARP_EDGE_THRESHOLD);

    let stroke = style.stroke(LineStyle::Dash);
    assert_eq!(stroke.line_width, 2.0);
    assert_eq!(stroke.dash, LineStyle::Dot);
    assert_eq!(StyleContext::stroked(2.0).stroke(LineStyle::Dash).dash, LineStyle::Dash);
}

#[test]
fn batch_triangle_count() {
    let mut batch = VertexBatch::new(PrimitiveKind::Triangles);
    batch.vertices = vec![FlattenedVertex::new(Point3::origin(), SYNTHESIZED_VERTEX); 6];
    assert_eq!(batch.triangle_count(), 2);
    batch.kind = PrimitiveKind::TriangleStrip;
    assert_eq!(batch.triangle_count(), 4);
    batch.kind = PrimitiveKind::LineStrip;
    assert_eq!(batch.triangle_count(), 0);
}
