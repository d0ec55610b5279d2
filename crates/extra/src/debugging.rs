use path::math::Point3;
use path::Path;
use path::PathEvent;

use log::warn;

pub type Polygons = Vec<Vec<Point3>>;
pub type PolygonsRef<'a> = &'a [Vec<Point3>];

/// Converts a path made of straight lines into polygons.
///
/// The point closing a sub-path is not repeated. Curves are not supported and are skipped
/// with a warning.
pub fn path_to_polygons(path: &Path) -> Polygons {
    let mut polygons = Vec::new();
    let mut poly = Vec::new();
    for evt in path.iter() {
        match evt {
            PathEvent::Begin { at } => {
                if !poly.is_empty() {
                    polygons.push(poly);
                }
                poly = vec![at];
            }
            PathEvent::Line { to, .. } => {
                poly.push(to);
            }
            PathEvent::End { close, .. } => {
                if close && poly.len() > 1 {
                    poly.pop();
                }
                if !poly.is_empty() {
                    polygons.push(poly);
                }
                poly = Vec::new();
            }
            _ => {
                warn!("path_to_polygons: unsupported event {:?}", evt);
            }
        }
    }
    polygons
}

/// Builds a path with one closed sub-path per polygon.
pub fn polygons_to_path(polygons: PolygonsRef) -> Path {
    let mut path = Path::new();
    for poly in polygons.iter() {
        let mut poly_iter = poly.iter();
        let first = match poly_iter.next() {
            Some(first) => *first,
            None => continue,
        };
        path.move_to(first);
        for v in poly_iter {
            path.line_to(*v);
        }
        path.close();
    }
    path
}

/// Looks for a smaller version of a path that still makes `cb` fail.
///
/// `cb` returns true (or panics) when the test case fails. Sub-paths are removed first,
/// then vertices. The reduced test case is printed as a test function and returned.
pub fn find_reduced_test_case<F: Fn(Path) -> bool + panic::UnwindSafe + panic::RefUnwindSafe>(
    path: &Path,
    cb: &F,
) -> Path {
    let mut polygons = path_to_polygons(path);

    println!(" -- removing sub-paths...");

    polygons = find_reduced_test_case_sp(polygons, cb);

    println!(" -- removing vertices...");

    for p in 0..polygons.len() {
        let mut v = 0;
        loop {
            if v >= polygons[p].len() || polygons[p].len() <= 3 {
                break;
            }

            let mut cloned = polygons.clone();
            cloned[p].remove(v);

            let path = polygons_to_path(&cloned);

            let failed = panic::catch_unwind(|| cb(path)).unwrap_or(true);

            if failed {
                polygons = cloned;
                continue;
            }

            v += 1;
        }
    }

    let path = polygons_to_path(&polygons);
    println!(" ----------- reduced test case: -----------\n\n");
    println!("#[test]");
    println!("fn reduced_test_case() {{");
    println!("    let mut path = Path::new();\n");
    for poly in &polygons {
        let mut poly_iter = poly.iter();
        if let Some(pos) = poly_iter.next() {
            println!("    path.move_to({});", format_point(*pos));
        }
        for pos in poly_iter {
            println!("    path.line_to({});", format_point(*pos));
        }
        println!("    path.close();\n");
    }
    println!("    test_path(&path);");
    println!("}}\n\n");

    path
}

fn format_point(p: Point3) -> String {
    format!("point3({:?}, {:?}, {:?})", p.x, p.y, p.z)
}

use std::panic;

fn find_reduced_test_case_sp<F>(mut polygons: Polygons, cb: &F) -> Polygons
where
    F: Fn(Path) -> bool + panic::UnwindSafe + panic::RefUnwindSafe,
{
    let mut i = 0;
    loop {
        if i >= polygons.len() {
            return polygons;
        }

        let mut cloned = polygons.clone();
        cloned.remove(i);
        let path = polygons_to_path(&cloned);

        let failed = panic::catch_unwind(|| cb(path)).unwrap_or(true);

        if failed {
            polygons = cloned;
            continue;
        }

        i += 1;
    }
}

#[cfg(test)]
use path::math::point3;

#[cfg(test)]
fn square(x: f64, y: f64, size: f64) -> Vec<Point3> {
    vec![
        point3(x, y, 0.0),
        point3(x + size, y, 0.0),
        point3(x + size, y + size, 0.0),
        point3(x, y + size, 0.0),
    ]
}

#[test]
fn polygons_round_trip() {
    let polygons = vec![square(0.0, 0.0, 1.0), square(5.0, 5.0, 2.0)];
    let path = polygons_to_path(&polygons);

    assert_eq!(path.sub_paths().count(), 2);
    assert_eq!(path_to_polygons(&path), polygons);
}

#[test]
fn curves_are_skipped() {
    let mut path = Path::new();
    path.move_to(point3(0.0, 0.0, 0.0));
    path.line_to(point3(1.0, 0.0, 0.0));
    path.quadratic_bezier_to(point3(1.0, 1.0, 0.0), point3(0.0, 1.0, 0.0));
    path.close();

    let polygons = path_to_polygons(&path);
    assert_eq!(polygons.len(), 1);
    assert_eq!(polygons[0][0], point3(0.0, 0.0, 0.0));
}

#[test]
fn reduce_to_failing_sub_path() {
    let mut big = square(10.0, 10.0, 5.0);
    big.insert(1, point3(12.0, 10.0, 0.0));
    let polygons = vec![square(0.0, 0.0, 1.0), big, square(20.0, 0.0, 1.0)];
    let path = polygons_to_path(&polygons);

    // Fails whenever a point with x >= 15 is present.
    let fails = |path: Path| {
        path.iter().any(|evt| match evt {
            PathEvent::Begin { at } => at.x >= 15.0,
            PathEvent::Line { to, .. } => to.x >= 15.0,
            _ => false,
        })
    };

    let reduced = find_reduced_test_case(&path, &fails);
    let reduced = path_to_polygons(&reduced);

    assert_eq!(reduced.len(), 1);
    assert_eq!(reduced[0].len(), 3);
    assert!(reduced[0].iter().any(|p| p.x >= 15.0));
}
