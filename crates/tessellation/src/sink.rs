//! The renderer side of a draw call.
//!
//! A [`RenderSink`](trait.RenderSink.html) receives vertex batches and the few graphics
//! state changes the renderer needs to draw extruded paths (transform stack, front face
//! winding, color writes). It is the only place where a draw call can fail hard.
//!
//! [`RecordingSink`](struct.RecordingSink.html) records every command, which is handy
//! for testing and for deferring the actual rendering.

use crate::error::SinkError;
use crate::{FlattenedVertex, PrimitiveKind, VertexBatch};

/// Winding of the triangles considered front-facing.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialization", derive(Serialize, Deserialize))]
pub enum FrontFace {
    Cw,
    Ccw,
}

/// The interface between the path renderer and the graphics backend.
pub trait RenderSink {
    /// Draws a batch of vertices.
    fn submit(&mut self, kind: PrimitiveKind, vertices: &[FlattenedVertex])
        -> Result<(), SinkError>;

    fn set_front_face(&mut self, face: FrontFace) -> Result<(), SinkError>;

    /// Saves the current transform.
    fn push_transform(&mut self) -> Result<(), SinkError>;

    /// Restores the last saved transform.
    fn pop_transform(&mut self) -> Result<(), SinkError>;

    /// Post-multiplies the current transform with a translation.
    fn translate(&mut self, x: f64, y: f64, z: f64) -> Result<(), SinkError>;

    /// Post-multiplies the current transform with a scale.
    fn scale(&mut self, x: f64, y: f64, z: f64) -> Result<(), SinkError>;

    /// Enables or disables writing to the color buffer. Depth is always written.
    fn set_color_write(&mut self, _enabled: bool) -> Result<(), SinkError> {
        Ok(())
    }

    fn submit_batch(&mut self, batch: &VertexBatch) -> Result<(), SinkError> {
        self.submit(batch.kind, &batch.vertices)
    }
}

/// A command received by a [`RecordingSink`](struct.RecordingSink.html).
#[derive(Clone, Debug, PartialEq)]
pub enum DrawCommand {
    Submit(VertexBatch),
    SetFrontFace(FrontFace),
    PushTransform,
    PopTransform,
    Translate([f64; 3]),
    Scale([f64; 3]),
    ColorWrite(bool),
}

/// A render sink that records the commands it receives.
///
/// Popping a transform that was not pushed is reported as an error.
#[derive(Clone, Debug, Default)]
pub struct RecordingSink {
    pub commands: Vec<DrawCommand>,
    transform_depth: u32,
}

impl RecordingSink {
    pub fn new() -> Self {
        RecordingSink {
            commands: Vec::new(),
            transform_depth: 0,
        }
    }

    /// The submitted batches, in order.
    pub fn batches(&self) -> impl Iterator<Item = &VertexBatch> {
        self.commands.iter().filter_map(|cmd| match cmd {
            DrawCommand::Submit(batch) => Some(batch),
            _ => None,
        })
    }

    pub fn submit_count(&self) -> usize {
        self.batches().count()
    }

    pub fn vertex_count(&self) -> usize {
        self.batches().map(|b| b.vertices.len()).sum()
    }

    pub fn triangle_count(&self) -> usize {
        self.batches().map(VertexBatch::triangle_count).sum()
    }

    /// Number of transforms pushed and not popped yet.
    pub fn transform_depth(&self) -> u32 {
        self.transform_depth
    }

    pub fn clear(&mut self) {
        self.commands.clear();
        self.transform_depth = 0;
    }
}

impl RenderSink for RecordingSink {
    fn submit(
        &mut self,
        kind: PrimitiveKind,
        vertices: &[FlattenedVertex],
    ) -> Result<(), SinkError> {
        self.commands.push(DrawCommand::Submit(VertexBatch {
            kind,
            vertices: vertices.to_vec(),
        }));
        Ok(())
    }

    fn set_front_face(&mut self, face: FrontFace) -> Result<(), SinkError> {
        self.commands.push(DrawCommand::SetFrontFace(face));
        Ok(())
    }

    fn push_transform(&mut self) -> Result<(), SinkError> {
        self.transform_depth += 1;
        self.commands.push(DrawCommand::PushTransform);
        Ok(())
    }

    fn pop_transform(&mut self) -> Result<(), SinkError> {
        if self.transform_depth == 0 {
            return Err(SinkError::new("transform stack underflow"));
        }
        self.transform_depth -= 1;
        self.commands.push(DrawCommand::PopTransform);
        Ok(())
    }

    fn translate(&mut self, x: f64, y: f64, z: f64) -> Result<(), SinkError> {
        self.commands.push(DrawCommand::Translate([x, y, z]));
        Ok(())
    }

    fn scale(&mut self, x: f64, y: f64, z: f64) -> Result<(), SinkError> {
        self.commands.push(DrawCommand::Scale([x, y, z]));
        Ok(())
    }

    fn set_color_write(&mut self, enabled: bool) -> Result<(), SinkError> {
        self.commands.push(DrawCommand::ColorWrite(enabled));
        Ok(())
    }
}

#[test]
fn recording_sink() {
    use crate::math::point3;

    let mut sink = RecordingSink::new();
    let v = FlattenedVertex::new(point3(1.0, 2.0, 3.0), 0);
    sink.submit(PrimitiveKind::Triangles, &[v, v, v]).unwrap();
    sink.push_transform().unwrap();
    sink.translate(0.0, 0.0, -1.0).unwrap();
    sink.pop_transform().unwrap();

    assert_eq!(sink.submit_count(), 1);
    assert_eq!(sink.vertex_count(), 3);
    assert_eq!(sink.triangle_count(), 1);
    assert_eq!(sink.transform_depth(), 0);
    assert!(sink.pop_transform().is_err());
    assert_eq!(sink.commands.len(), 4);
}
