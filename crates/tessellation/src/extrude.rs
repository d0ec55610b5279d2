//! Side walls of extruded contours.
//!
//! The walls connect a closed contour at the depth of the path to a copy of itself
//! `depth` units behind it (towards negative z). They are built as a grid:
//!
//! - the *columns* follow the contour. Each vertex produces one column, or several at
//!   sharp corners so that the faces on each side of the corner do not share normals,
//! - the *rows* follow the profile of the wall: two rows for a sharp wall, or the
//!   samples of a quarter circle at both ends of the wall for a beveled one.
//!
//! Each band between two consecutive rows is emitted as one triangle strip.
//!
//! ```text
//!  cap  ___
//!           \     front bevel: offset = r * sin(θ), z = -r * (1 - cos(θ))
//!            |
//!            |    straight wall, if depth > 2r
//!            |
//!        ___/     back bevel, mirrored
//! ```

use crate::flatten::Contour;
use crate::geom::utils::{edge_normal, try_normalize};
use crate::math::{point3, vector, vector3, Vector};
use crate::{
    ExtrusionOptions, FlattenedVertex, PrimitiveKind, VertexBatch, SHARP_CORNER_SUBDIVISIONS,
};

use std::f64::consts::FRAC_PI_2;

/// The walls of one contour.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Extrusion {
    /// One triangle strip per band of the profile.
    pub batches: Vec<VertexBatch>,
    /// Number of columns of the strips, including the column closing the loop.
    pub pairs: usize,
    /// Number of wall faces around the contour.
    pub faces: usize,
    pub sharp_corners: usize,
}

impl Extrusion {
    pub fn is_empty(&self) -> bool {
        self.batches.is_empty()
    }

    pub fn vertex_count(&self) -> usize {
        self.batches.iter().map(|b| b.vertices.len()).sum()
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
struct Column {
    /// Index of the contour vertex.
    vertex: usize,
    /// Direction in which the rows are offset from the contour.
    offset: Vector,
    normal: Vector,
}

#[derive(Copy, Clone, Debug, PartialEq)]
struct Row {
    offset: f64,
    z: f64,
    /// The normal of the row in the (outward, z) plane.
    normal: Vector,
}

/// Generates the side walls of a closed contour.
///
/// Edges shorter than `options.min_edge_length` are skipped. Nothing is generated for
/// contours with less than three remaining vertices or if the depth is not positive.
pub fn extrude_contour(contour: &Contour, options: &ExtrusionOptions) -> Extrusion {
    if options.depth <= 0.0 {
        return Extrusion::default();
    }

    let vertices = filter_short_edges(&contour.vertices, options.min_edge_length);
    let n = vertices.len();
    if n < 3 {
        return Extrusion::default();
    }

    let mut normals = Vec::with_capacity(n);
    for i in 0..n {
        let d = vertices[(i + 1) % n].position.xy() - vertices[i].position.xy();
        let normal = try_normalize(d).map_or(vector(0.0, 0.0), edge_normal);
        normals.push(if options.invert_normals { -normal } else { normal });
    }

    let beveled = options.is_beveled();
    let mut columns = Vec::with_capacity(n * 2 + 1);
    let mut sharp_corners = 0;
    for i in 0..n {
        let n_a = normals[(i + n - 1) % n];
        let n_b = normals[i];
        if n_a.dot(n_b) < options.sharp_edge_threshold {
            sharp_corners += 1;
            if beveled {
                sweep_corner(i, n_a, n_b, &mut columns);
            } else {
                columns.push(Column { vertex: i, offset: n_a, normal: n_a });
                columns.push(Column { vertex: i, offset: n_b, normal: n_b });
            }
        } else {
            let normal = try_normalize(n_a + n_b).unwrap_or(n_b);
            // Such that the offset edges stay parallel to the contour, one unit away.
            let offset = (n_a + n_b) / (1.0 + n_a.dot(n_b)).max(1e-6);
            columns.push(Column { vertex: i, offset, normal });
        }
    }
    columns.push(columns[0]);

    let rows = profile(options);
    let chamfer = options.facet_count < 0;

    let mut batches = Vec::with_capacity(rows.len() - 1);
    for band in rows.windows(2) {
        let (upper, lower) = (band[0], band[1]);
        let (upper_normal, lower_normal) = if chamfer {
            let normal = try_normalize(upper.normal + lower.normal).unwrap_or(upper.normal);
            (normal, normal)
        } else {
            (upper.normal, lower.normal)
        };

        let mut batch = VertexBatch::new(PrimitiveKind::TriangleStrip);
        batch.vertices.reserve(columns.len() * 2);
        for column in &columns {
            let source = &vertices[column.vertex];
            batch.vertices.push(wall_vertex(source, column, &upper, upper_normal, options.depth));
            batch.vertices.push(wall_vertex(source, column, &lower, lower_normal, options.depth));
        }
        batches.push(batch);
    }

    Extrusion {
        batches,
        pairs: columns.len(),
        faces: n,
        sharp_corners,
    }
}

fn filter_short_edges(vertices: &[FlattenedVertex], min_length: f64) -> Vec<FlattenedVertex> {
    let mut result: Vec<FlattenedVertex> = Vec::with_capacity(vertices.len());
    for vertex in vertices {
        if let Some(last) = result.last() {
            if (vertex.position.xy() - last.position.xy()).length() < min_length {
                continue;
            }
        }
        result.push(*vertex);
    }

    while result.len() > 1 {
        let (first, last) = (result[0].position.xy(), result[result.len() - 1].position.xy());
        if (last - first).length() >= min_length {
            break;
        }
        result.pop();
    }

    result
}

/// Rotates the normal from `n_a` to `n_b` around a sharp corner.
fn sweep_corner(vertex: usize, n_a: Vector, n_b: Vector, columns: &mut Vec<Column>) {
    let angle = n_a.cross(n_b).atan2(n_a.dot(n_b));
    for step in 0..=SHARP_CORNER_SUBDIVISIONS {
        let (sin, cos) = (angle * step as f64 / SHARP_CORNER_SUBDIVISIONS as f64).sin_cos();
        let normal = vector(cos * n_a.x - sin * n_a.y, sin * n_a.x + cos * n_a.y);
        columns.push(Column { vertex, offset: normal, normal });
    }
}

/// The rows of the wall, from the front cap to the back cap.
fn profile(options: &ExtrusionOptions) -> Vec<Row> {
    let depth = options.depth;
    let outward = vector(1.0, 0.0);

    if !options.is_beveled() {
        return vec![
            Row { offset: 0.0, z: 0.0, normal: outward },
            Row { offset: 0.0, z: -depth, normal: outward },
        ];
    }

    let r = options.bevel_radius.min(depth * 0.5);
    let straight_wall = depth > 2.0 * r;
    let facets = options.facet_count.unsigned_abs();
    let mut rows = Vec::with_capacity(facets as usize * 2 + 2);

    for k in 0..=facets {
        let (sin, cos) = (k as f64 * FRAC_PI_2 / facets as f64).sin_cos();
        rows.push(Row {
            offset: r * sin,
            z: -r * (1.0 - cos),
            normal: vector(sin, cos),
        });
    }

    for k in (0..=facets).rev() {
        let (sin, cos) = (k as f64 * FRAC_PI_2 / facets as f64).sin_cos();
        let row = Row {
            offset: r * sin,
            z: -depth + r * (1.0 - cos),
            normal: vector(sin, -cos),
        };
        // Without a straight wall, both bevels meet at mid-depth.
        if k == facets && !straight_wall {
            continue;
        }
        rows.push(row);
    }

    rows
}

fn wall_vertex(
    source: &FlattenedVertex,
    column: &Column,
    row: &Row,
    normal: Vector,
    depth: f64,
) -> FlattenedVertex {
    let p = source.position;
    FlattenedVertex {
        position: point3(
            p.x + column.offset.x * row.offset,
            p.y + column.offset.y * row.offset,
            p.z + row.z,
        ),
        texture: point3(source.texture.x, source.texture.y, -row.z / depth),
        normal: vector3(column.normal.x * normal.x, column.normal.y * normal.x, normal.y),
        index: source.index,
    }
}

#[cfg(test)]
fn polygon(points: &[(f64, f64)]) -> Contour {
    Contour {
        vertices: points
            .iter()
            .enumerate()
            .map(|(i, &(x, y))| FlattenedVertex::new(point3(x, y, 0.0), i as i32))
            .collect(),
        closed: true,
    }
}

#[cfg(test)]
fn square() -> Contour {
    polygon(&[(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0)])
}

#[cfg(test)]
fn regular_polygon(sides: usize) -> Contour {
    let points: Vec<(f64, f64)> = (0..sides)
        .map(|i| {
            let a = i as f64 * std::f64::consts::TAU / sides as f64;
            (10.0 * a.cos(), 10.0 * a.sin())
        })
        .collect();
    polygon(&points)
}

#[test]
fn sharp_extrusion_counts() {
    let walls = extrude_contour(&square(), &ExtrusionOptions::depth(2.0));
    assert_eq!(walls.batches.len(), 1);
    assert_eq!(walls.batches[0].kind, PrimitiveKind::TriangleStrip);
    assert_eq!(walls.faces, 4);
    assert_eq!(walls.sharp_corners, 4);
    assert_eq!(walls.pairs, 4 + 1 + 4);
    assert_eq!(walls.vertex_count(), 2 * walls.pairs);

    let walls = extrude_contour(&regular_polygon(32), &ExtrusionOptions::depth(2.0));
    assert_eq!(walls.faces, 32);
    assert_eq!(walls.sharp_corners, 0);
    assert_eq!(walls.pairs, 33);
    assert_eq!(walls.vertex_count(), 66);
}

#[test]
fn sharp_extrusion_geometry() {
    let walls = extrude_contour(&square(), &ExtrusionOptions::depth(2.0));
    let strip = &walls.batches[0].vertices;

    for pair in strip.chunks(2) {
        assert_eq!(pair[0].position.z, 0.0);
        assert_eq!(pair[1].position.z, -2.0);
        assert_eq!(pair[0].position.xy(), pair[1].position.xy());
        assert_eq!(pair[0].normal, pair[1].normal);
        assert_eq!(pair[0].texture.z, 0.0);
        assert_eq!(pair[1].texture.z, 1.0);
    }

    // The strip starts at the first vertex, facing the incoming edge, and loops back.
    assert_eq!(strip[0].normal, vector3(-1.0, 0.0, 0.0));
    assert_eq!(strip[2].normal, vector3(0.0, -1.0, 0.0));
    assert_eq!(strip[strip.len() - 2], strip[0]);

    let inverted = extrude_contour(
        &square(),
        &ExtrusionOptions::depth(2.0).with_inverted_normals(true),
    );
    assert_eq!(inverted.batches[0].vertices[0].normal, vector3(1.0, 0.0, 0.0));
}

#[test]
fn short_edges_are_skipped() {
    let contour = polygon(&[
        (0.0, 0.0),
        (10.0, 0.0),
        (10.0, 0.0001),
        (10.0, 10.0),
        (0.0, 10.0),
        (0.0, 0.0005),
    ]);
    let walls = extrude_contour(&contour, &ExtrusionOptions::depth(1.0));
    assert_eq!(walls.faces, 4);
    assert_eq!(walls.pairs, 9);

    let degenerate = polygon(&[(0.0, 0.0), (10.0, 0.0), (10.0, 0.0001)]);
    assert!(extrude_contour(&degenerate, &ExtrusionOptions::depth(1.0)).is_empty());
    assert!(extrude_contour(&square(), &ExtrusionOptions::depth(0.0)).is_empty());
}

#[test]
fn beveled_profile() {
    let options = ExtrusionOptions::depth(4.0).with_bevel(1.0, 3);
    let walls = extrude_contour(&regular_polygon(32), &options);

    // 4 front rows, 4 back rows.
    assert_eq!(walls.batches.len(), 7);
    for batch in &walls.batches {
        assert_eq!(batch.vertices.len(), 2 * 33);
        for v in &batch.vertices {
            assert!(v.position.z <= 0.0 && v.position.z >= -4.0);
            assert!((v.normal.length() - 1.0).abs() < 1e-9);
        }
    }

    // The bevel starts at the cap, facing the viewer, and reaches the straight wall.
    let first = &walls.batches[0].vertices[0];
    assert_eq!(first.position, point3(10.0, 0.0, 0.0));
    assert_eq!(first.normal, vector3(0.0, 0.0, 1.0));
    let wall = &walls.batches[3].vertices[0];
    // Offset along the miter of the corner, slightly more than the radius.
    assert!(wall.position.x > 11.0 && wall.position.x < 11.01);
    assert!((wall.position.z + 1.0).abs() < 1e-9);
    assert!(wall.normal.z.abs() < 1e-9);
    let last = walls.batches[6].vertices[1];
    assert!((last.position.z + 4.0).abs() < 1e-9);
    assert!((last.normal.z + 1.0).abs() < 1e-9);
}

#[test]
fn bevel_radius_is_clamped() {
    let options = ExtrusionOptions::depth(1.0).with_bevel(2.0, 2);
    let walls = extrude_contour(&regular_polygon(32), &options);

    // Both bevels meet at mid-depth: 3 + 2 rows.
    assert_eq!(walls.batches.len(), 4);
    let max_offset = walls
        .batches
        .iter()
        .flat_map(|b| b.vertices.iter())
        .map(|v| v.position.xy().to_vector().length())
        .fold(0.0, f64::max);
    assert!(max_offset > 10.5 && max_offset < 10.51);
}

#[test]
fn chamfer_uses_flat_normals() {
    let options = ExtrusionOptions::depth(4.0).with_bevel(1.0, -2);
    let walls = extrude_contour(&regular_polygon(32), &options);
    for batch in &walls.batches {
        for pair in batch.vertices.chunks(2) {
            assert_eq!(pair[0].normal, pair[1].normal);
        }
    }
}

#[test]
fn beveled_sharp_corners() {
    let options = ExtrusionOptions::depth(4.0).with_bevel(1.0, 2);
    let walls = extrude_contour(&square(), &options);
    let sweep = SHARP_CORNER_SUBDIVISIONS as usize + 1;
    assert_eq!(walls.sharp_corners, 4);
    assert_eq!(walls.pairs, 4 * sweep + 1);

    // Around the corner, the offset ring follows a quarter circle.
    let band = &walls.batches[1].vertices;
    for i in 0..sweep {
        let v = band[2 * i + 1].position;
        let d = (v.xy() - crate::math::point(0.0, 0.0)).length();
        assert!((d - 1.0).abs() < 1e-9);
    }
}
