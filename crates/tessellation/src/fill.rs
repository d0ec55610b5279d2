//! The tessellation adapter.
//!
//! A [`TessellationJob`](struct.TessellationJob.html) feeds flattened contours to a
//! [`Tessellator`](../tessellator/trait.Tessellator.html), receives its output through the
//! [`TessellationSink`](../tessellator/trait.TessellationSink.html) callbacks and forwards the
//! resulting batches to the renderer.
//!
//! The job owns every vertex it hands out a handle for, including the vertices the
//! tessellator synthesizes at self-intersections. They are released with the job.
//!
//! Without a winding rule the contours are submitted as authored: closed contours as
//! polygons and open ones as line strips.

use crate::error::{InternalError, SinkError, TessellationError};
use crate::flatten::Contour;
use crate::math::{point3, vector3, Point3};
use crate::path::WindingRule;
use crate::sink::{FrontFace, RenderSink};
use crate::tessellator::{TessellationSink, Tessellator, VertexHandle};
use crate::{ExtrusionOptions, FlattenedVertex, PrimitiveKind, VertexBatch, SYNTHESIZED_VERTEX};

/// The state of one fill for one draw call.
///
/// The winding rule and extrusion parameters are copied in when the job is created.
pub struct TessellationJob<'s> {
    rule: Option<WindingRule>,
    extrusion: ExtrusionOptions,
    vertices: Vec<FlattenedVertex>,
    current: Option<VertexBatch>,
    batches: Vec<VertexBatch>,
    sink: &'s mut dyn RenderSink,
}

impl<'s> TessellationJob<'s> {
    pub fn new(
        rule: Option<WindingRule>,
        extrusion: ExtrusionOptions,
        sink: &'s mut dyn RenderSink,
    ) -> Self {
        TessellationJob {
            rule,
            extrusion,
            vertices: Vec::new(),
            current: None,
            batches: Vec::new(),
            sink,
        }
    }

    /// Tessellates the contours and submits the resulting front cap.
    pub fn fill<T: Tessellator + ?Sized>(
        &mut self,
        contours: &[Contour],
        tessellator: &mut T,
    ) -> Result<(), TessellationError> {
        let rule = match self.rule {
            Some(rule) => rule,
            None => return self.submit_as_authored(contours),
        };

        tessellator.begin_polygon(rule);
        for contour in contours.iter().filter(|c| !c.is_empty()) {
            tessellator.begin_contour();
            for vertex in &contour.vertices {
                let handle = self.add_vertex(*vertex)?;
                let p = vertex.position;
                tessellator.vertex([p.x, p.y, p.z], handle);
            }
            tessellator.end_contour();
        }

        let result = tessellator.end_polygon(self);
        if result.is_err() {
            self.current = None;
        }

        result
    }

    fn submit_as_authored(&mut self, contours: &[Contour]) -> Result<(), TessellationError> {
        for contour in contours {
            let kind = if contour.closed && contour.len() >= 3 {
                PrimitiveKind::Polygon
            } else if contour.len() >= 2 {
                PrimitiveKind::LineStrip
            } else {
                continue;
            };

            let batch = VertexBatch {
                kind,
                vertices: contour.vertices.clone(),
            };
            self.sink.submit_batch(&batch)?;
            self.batches.push(batch);
        }

        Ok(())
    }

    /// Draws the front cap a second time as the back cap of the extruded volume.
    ///
    /// The cap is mirrored to `-depth` and its front face winding reversed. Does nothing
    /// if the job has no depth.
    pub fn draw_back_cap(&mut self) -> Result<(), SinkError> {
        if self.extrusion.depth <= 0.0 || self.batches.is_empty() {
            return Ok(());
        }

        self.sink.push_transform()?;
        self.sink.translate(0.0, 0.0, -self.extrusion.depth)?;
        self.sink.scale(1.0, 1.0, -1.0)?;
        self.sink.set_front_face(FrontFace::Cw)?;
        for batch in &self.batches {
            self.sink.submit_batch(batch)?;
        }
        self.sink.set_front_face(FrontFace::Ccw)?;
        self.sink.pop_transform()
    }

    /// The batches of the front cap, in submission order.
    pub fn batches(&self) -> &[VertexBatch] {
        &self.batches
    }

    pub fn into_batches(self) -> Vec<VertexBatch> {
        self.batches
    }

    /// Number of vertices owned by the job, synthesized ones included.
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    fn add_vertex(&mut self, vertex: FlattenedVertex) -> Result<VertexHandle, TessellationError> {
        if self.vertices.len() >= u32::MAX as usize {
            return Err(InternalError::TooManyVertices.into());
        }
        self.vertices.push(vertex);

        Ok(VertexHandle::from_usize(self.vertices.len() - 1))
    }

    fn vertex(&self, handle: VertexHandle) -> Result<&FlattenedVertex, TessellationError> {
        self.vertices
            .get(handle.to_usize())
            .ok_or(TessellationError::Internal(InternalError::InvalidVertex))
    }
}

impl<'s> TessellationSink for TessellationJob<'s> {
    fn on_begin(&mut self, kind: PrimitiveKind) -> Result<(), TessellationError> {
        if self.current.is_some() {
            return Err(InternalError::UnbalancedProtocol("primitive started twice").into());
        }
        self.current = Some(VertexBatch::new(kind));

        Ok(())
    }

    fn on_vertex(&mut self, handle: VertexHandle) -> Result<(), TessellationError> {
        let vertex = *self.vertex(handle)?;
        match &mut self.current {
            Some(batch) => batch.vertices.push(vertex),
            None => {
                return Err(InternalError::UnbalancedProtocol("vertex outside of a primitive").into())
            }
        }

        Ok(())
    }

    fn on_combine(
        &mut self,
        coords: [f64; 3],
        sources: [Option<VertexHandle>; 4],
        weights: [f64; 4],
    ) -> Result<VertexHandle, TessellationError> {
        let mut texture = Point3::origin();
        for (source, weight) in sources.iter().zip(weights.iter()) {
            if let Some(handle) = source {
                texture += self.vertex(*handle)?.texture.to_vector() * *weight;
            }
        }

        self.add_vertex(FlattenedVertex {
            position: point3(coords[0], coords[1], coords[2]),
            texture,
            normal: vector3(0.0, 0.0, 1.0),
            index: SYNTHESIZED_VERTEX,
        })
    }

    fn on_end(&mut self) -> Result<(), TessellationError> {
        let batch = match self.current.take() {
            Some(batch) => batch,
            None => {
                return Err(InternalError::UnbalancedProtocol("primitive ended twice").into())
            }
        };

        self.sink.submit_batch(&batch)?;
        self.batches.push(batch);

        Ok(())
    }
}

#[cfg(test)]
use crate::sink::{DrawCommand, RecordingSink};
#[cfg(test)]
use crate::tessellator::Tess2Tessellator;

#[cfg(test)]
fn contour(points: &[(f64, f64)], closed: bool) -> Contour {
    Contour {
        vertices: points
            .iter()
            .enumerate()
            .map(|(i, &(x, y))| FlattenedVertex {
                texture: point3(x / 10.0, y / 10.0, 0.0),
                ..FlattenedVertex::new(point3(x, y, 0.0), i as i32)
            })
            .collect(),
        closed,
    }
}

#[test]
fn fill_triangle() {
    let mut sink = RecordingSink::new();
    let mut tess = Tess2Tessellator::new();
    let mut job = TessellationJob::new(
        Some(WindingRule::Positive),
        ExtrusionOptions::DEFAULT,
        &mut sink,
    );
    job.fill(&[contour(&[(0.0, 0.0), (10.0, 0.0), (5.0, 10.0)], true)], &mut tess)
        .unwrap();
    assert_eq!(job.vertex_count(), 3);
    job.draw_back_cap().unwrap();
    assert_eq!(job.batches().len(), 1);

    assert_eq!(sink.submit_count(), 1);
    let batch = sink.batches().next().unwrap();
    assert_eq!(batch.kind, PrimitiveKind::Triangles);
    assert_eq!(batch.vertices.len(), 3);
    assert!(batch.vertices.iter().all(|v| !v.is_synthesized()));
    assert!(batch.vertices.iter().all(|v| v.normal == vector3(0.0, 0.0, 1.0)));
}

#[test]
fn combined_vertices_interpolate_textures() {
    let mut sink = RecordingSink::new();
    let mut tess = Tess2Tessellator::new();
    let mut job = TessellationJob::new(
        Some(WindingRule::NonZero),
        ExtrusionOptions::DEFAULT,
        &mut sink,
    );
    let bowtie = contour(&[(0.0, 0.0), (10.0, 10.0), (10.0, 0.0), (0.0, 10.0)], true);
    job.fill(&[bowtie], &mut tess).unwrap();

    let batch = sink.batches().next().unwrap();
    let center = batch
        .vertices
        .iter()
        .find(|v| v.position == point3(5.0, 5.0, 0.0))
        .unwrap();
    assert!(center.is_synthesized());
    assert!((center.texture - point3(0.5, 0.5, 0.0)).length() < 1e-9);
}

#[test]
fn submit_as_authored() {
    let mut sink = RecordingSink::new();
    let mut tess = Tess2Tessellator::new();
    let mut job = TessellationJob::new(None, ExtrusionOptions::DEFAULT, &mut sink);
    job.fill(
        &[
            contour(&[(0.0, 0.0), (10.0, 0.0), (5.0, 10.0)], true),
            contour(&[(0.0, 0.0), (10.0, 0.0)], false),
            contour(&[(3.0, 3.0)], false),
        ],
        &mut tess,
    )
    .unwrap();

    let kinds: Vec<PrimitiveKind> = sink.batches().map(|b| b.kind).collect();
    assert_eq!(kinds, vec![PrimitiveKind::Polygon, PrimitiveKind::LineStrip]);
}

#[test]
fn back_cap_commands() {
    let mut sink = RecordingSink::new();
    let mut tess = Tess2Tessellator::new();
    let mut job = TessellationJob::new(
        Some(WindingRule::Positive),
        ExtrusionOptions::depth(3.0),
        &mut sink,
    );
    job.fill(&[contour(&[(0.0, 0.0), (10.0, 0.0), (5.0, 10.0)], true)], &mut tess)
        .unwrap();
    job.draw_back_cap().unwrap();
    let front = job.into_batches();

    let commands = &sink.commands;
    assert_eq!(commands.len(), 8);
    assert_eq!(commands[0], DrawCommand::Submit(front[0].clone()));
    assert_eq!(commands[1], DrawCommand::PushTransform);
    assert_eq!(commands[2], DrawCommand::Translate([0.0, 0.0, -3.0]));
    assert_eq!(commands[3], DrawCommand::Scale([1.0, 1.0, -1.0]));
    assert_eq!(commands[4], DrawCommand::SetFrontFace(FrontFace::Cw));
    assert_eq!(commands[5], commands[0]);
    assert_eq!(commands[6], DrawCommand::SetFrontFace(FrontFace::Ccw));
    assert_eq!(commands[7], DrawCommand::PopTransform);
    assert_eq!(sink.transform_depth(), 0);
}

#[test]
fn protocol_misuse() {
    let mut sink = RecordingSink::new();
    let mut job = TessellationJob::new(
        Some(WindingRule::Positive),
        ExtrusionOptions::DEFAULT,
        &mut sink,
    );

    assert_eq!(
        job.on_vertex(VertexHandle(7)),
        Err(TessellationError::Internal(InternalError::InvalidVertex))
    );
    assert!(job.on_end().is_err());
    job.on_begin(PrimitiveKind::Triangles).unwrap();
    assert!(job.on_begin(PrimitiveKind::Triangles).is_err());
    assert!(job
        .on_combine([0.0; 3], [Some(VertexHandle(3)), None, None, None], [1.0, 0.0, 0.0, 0.0])
        .is_err());
}
