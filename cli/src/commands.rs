use relief::path::Path;
use relief::tessellation::{FlatteningOptions, StyleContext};
use std::io;

pub struct DrawCmd {
    pub path: Path,
    pub style: StyleContext,
    pub output: Box<dyn io::Write>,
    pub count: bool,
}

pub struct OutlineCmd {
    pub path: Path,
    pub line_width: f64,
    pub output: Box<dyn io::Write>,
}

pub struct FlattenCmd {
    pub path: Path,
    pub flattening: FlatteningOptions,
    pub output: Box<dyn io::Write>,
    pub count: bool,
}

pub struct ReduceCmd {
    pub path: Path,
    pub style: StyleContext,
}
