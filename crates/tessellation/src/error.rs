use thiserror::Error;

/// A failure reported by a [`RenderSink`](../sink/trait.RenderSink.html).
///
/// Sink errors are the only hard failures of a draw call.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("renderer sink error: {message}")]
pub struct SinkError {
    pub message: String,
}

impl SinkError {
    pub fn new(message: impl Into<String>) -> Self {
        SinkError {
            message: message.into(),
        }
    }
}

/// Describes an unexpected error happening during tessellation.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Error)]
pub enum InternalError {
    #[error("too many vertices")]
    TooManyVertices,
    #[error("invalid vertex")]
    InvalidVertex,
    #[error("position is not a finite number")]
    NonFiniteCoordinates,
    #[error("unbalanced tessellator protocol: {0}")]
    UnbalancedProtocol(&'static str),
    #[error("the polygon tessellator gave up")]
    TessellatorAborted,
}

/// The tessellator's error enumeration.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum TessellationError {
    #[error("internal error: {0}")]
    Internal(#[from] InternalError),
    #[error(transparent)]
    Sink(#[from] SinkError),
}

/// Recoverable problems found while building geometry.
///
/// These never abort a draw call: the affected piece of geometry falls back to a
/// simpler rendition and the problem is reported in the
/// [`DrawReport`](../draw/struct.DrawReport.html).
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum GeometryError {
    #[error("curve ending at element {element} has {control_points} control points")]
    UnsupportedCurveOrder {
        element: usize,
        control_points: usize,
    },
    #[error("degenerate geometry at element {element}")]
    DegenerateGeometry { element: usize },
    #[error("the outline is not flat, drawing its centerline instead")]
    NonFlatStrokeFallback,
    #[error("tessellation failed: {0}")]
    TessellatorFailure(InternalError),
}

impl GeometryError {
    /// Degenerate geometry is expected with coincident points and is not worth
    /// reporting to users.
    pub fn is_silent(&self) -> bool {
        matches!(self, GeometryError::DegenerateGeometry { .. })
    }

    pub(crate) fn log(&self) {
        if self.is_silent() {
            log::trace!("{}", self);
        } else {
            log::warn!("{}", self);
        }
    }
}

/// The error type of [`PathRenderer::draw`](../draw/struct.PathRenderer.html#method.draw).
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum DrawError {
    #[error(transparent)]
    Sink(#[from] SinkError),
}

#[test]
fn error_messages() {
    let err: TessellationError = InternalError::UnbalancedProtocol("vertex outside of a contour").into();
    assert_eq!(
        err.to_string(),
        "internal error: unbalanced tessellator protocol: vertex outside of a contour"
    );

    let err: DrawError = SinkError::new("device lost").into();
    assert_eq!(err.to_string(), "renderer sink error: device lost");

    assert!(GeometryError::DegenerateGeometry { element: 3 }.is_silent());
    assert!(!GeometryError::NonFlatStrokeFallback.is_silent());
}
