use crate::commands::ReduceCmd;
use relief::extra::debugging::find_reduced_test_case;
use relief::path::Path;
use relief::tessellation::{GeometryError, PathRenderer, RecordingSink};

/// Prints a reduced version of the path that still makes the tessellator fail.
pub fn reduce_testcase(cmd: ReduceCmd) {
    let style = cmd.style;
    find_reduced_test_case(&cmd.path, &|path: Path| {
        let mut sink = RecordingSink::new();
        match PathRenderer::new().draw(&path, &style, &mut sink) {
            Ok(report) => report
                .diagnostics
                .iter()
                .any(|(_, err)| matches!(err, GeometryError::TessellatorFailure(_))),
            Err(_) => true,
        }
    });
}
