use path::math::{point3, Point3};
use path::Path;

extern crate thiserror;

use self::thiserror::Error;

#[non_exhaustive]
#[derive(Error, Clone, Debug, PartialEq)]
pub enum ParseError {
    #[error("Line {line} Column {column}: Expected number, got {src:?}.")]
    Number { src: String, line: i32, column: i32 },
    #[error("Line {line} Column {column}: Invalid command {command:?}.")]
    Command {
        command: char,
        line: i32,
        column: i32,
    },
    #[error("Line {line} Column {column}: Expected move-to command, got {command:?}.")]
    MissingMoveTo {
        command: char,
        line: i32,
        column: i32,
    },
}

#[non_exhaustive]
#[derive(Clone, Debug, PartialEq)]
pub struct ParserOptions {
    /// Read a z coordinate after the x and y coordinates of each endpoint.
    pub with_z: bool,
    /// Optionally stop parsing when encountering a provided special character.
    pub stop_at: Option<char>,
}

impl ParserOptions {
    pub const DEFAULT: ParserOptions = ParserOptions {
        with_z: false,
        stop_at: None,
    };

    pub const fn with_z(mut self, with_z: bool) -> Self {
        self.with_z = with_z;
        self
    }

    pub const fn with_stop_at(mut self, stop_at: Option<char>) -> Self {
        self.stop_at = stop_at;
        self
    }
}

impl Default for ParserOptions {
    fn default() -> Self {
        ParserOptions::DEFAULT
    }
}

// A buffered iterator of characters keeping track of line and column.
pub struct Source<Iter> {
    src: Iter,
    current: char,
    line: i32,
    col: i32,
    finished: bool,
}

impl<Iter: Iterator<Item = char>> Source<Iter> {
    pub fn new<IntoIter>(src: IntoIter) -> Self
    where
        IntoIter: IntoIterator<IntoIter = Iter>,
    {
        Self::with_position(0, 0, src)
    }

    pub fn with_position<IntoIter>(line: i32, column: i32, src: IntoIter) -> Self
    where
        IntoIter: IntoIterator<IntoIter = Iter>,
    {
        let mut src = src.into_iter();

        let (current, finished) = match src.next() {
            Some(c) => (c, false),
            None => (' ', true),
        };

        let line = line + if current == '\n' { 1 } else { 0 };

        Source {
            current,
            finished,
            src,
            line,
            col: column,
        }
    }

    /// Consumes the source and returns the remaining characters, line and column.
    pub fn into_parts(self) -> (Iter, i32, i32) {
        (self.src, self.line, self.col)
    }

    fn skip_whitespace(&mut self) {
        while !self.finished && (self.current.is_whitespace() || self.current == ',') {
            self.advance_one();
        }
    }

    fn advance_one(&mut self) {
        if self.finished {
            return;
        }
        match self.src.next() {
            Some('\n') => {
                self.current = '\n';
                self.line += 1;
                self.col = -1;
            }
            Some(c) => {
                self.current = c;
                self.col += 1;
            }
            None => {
                self.current = '~';
                self.finished = true;
            }
        }
    }
}

/// A context object for parsing the extended path syntax.
///
/// # Syntax
///
/// The extended path syntax is the subset of the SVG path syntax made of straight lines
/// and bézier curves (`M`, `L`, `H`, `V`, `Q`, `T`, `C`, `S`, `Z` and their relative forms),
/// with an optional z coordinate per endpoint.
///
/// With `ParserOptions::with_z` set, every endpoint is read as three numbers. For example
/// `M 0 0 1 Q 1 1 2 2 3 L 3 3 0` reads as follows:
///
/// - Begin at `[0, 0, 1]`,
/// - quadratic bézier curve ending at `[2, 2, 3]`, with control point `[1, 1]`,
/// - line to `[3, 3, 0]`.
///
/// Control points only have x and y. Their z is interpolated between the endpoints of the
/// curve so that the curve stays in the plane of a flat path. Without `with_z` every point
/// is at `z = 0`.
///
/// Arcs are not part of the syntax and are rejected with `ParseError::Command`.
#[derive(Debug, Default)]
pub struct PathParser {
    float_buffer: String,
    with_z: bool,
    stop_at: Option<char>,
    current_position: Point3,
}

impl PathParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a path, appending it to `output`.
    ///
    /// On error, `output` contains what was parsed before the offending command.
    pub fn parse<Iter>(
        &mut self,
        options: &ParserOptions,
        src: &mut Source<Iter>,
        output: &mut Path,
    ) -> Result<(), ParseError>
    where
        Iter: Iterator<Item = char>,
    {
        self.with_z = options.with_z;
        self.stop_at = options.stop_at;

        self.parse_path(src, output)
    }

    fn parse_path(
        &mut self,
        src: &mut Source<impl Iterator<Item = char>>,
        output: &mut Path,
    ) -> Result<(), ParseError> {
        // A relative move-to at the start of the path is relative to the origin.
        self.current_position = Point3::origin();
        let mut first_position = Point3::origin();

        let mut need_start = false;
        let mut prev_cubic_ctrl = None;
        let mut prev_quadratic_ctrl = None;
        let mut implicit_cmd = 'M';

        src.skip_whitespace();

        while !src.finished {
            let mut cmd = src.current;
            let cmd_line = src.line;
            let cmd_col = src.col;

            if self.stop_at == Some(cmd) {
                break;
            }

            if cmd.is_ascii_alphabetic() {
                src.advance_one();
            } else {
                cmd = implicit_cmd;
            }

            if need_start && cmd != 'm' && cmd != 'M' {
                return Err(ParseError::MissingMoveTo {
                    command: cmd,
                    line: cmd_line,
                    column: cmd_col,
                });
            }

            let is_relative = cmd.is_lowercase();
            let from = self.current_position;

            match cmd {
                'l' | 'L' => {
                    let to = self.parse_endpoint(is_relative, src)?;
                    output.line_to(to);
                }
                'h' | 'H' => {
                    let mut x = self.parse_number(src)?;
                    if is_relative {
                        x += from.x;
                    }
                    let z = self.parse_z(is_relative, src)?;
                    let to = point3(x, from.y, z);
                    self.current_position = to;
                    output.line_to(to);
                }
                'v' | 'V' => {
                    let mut y = self.parse_number(src)?;
                    if is_relative {
                        y += from.y;
                    }
                    let z = self.parse_z(is_relative, src)?;
                    let to = point3(from.x, y, z);
                    self.current_position = to;
                    output.line_to(to);
                }
                'q' | 'Q' => {
                    let ctrl = self.parse_point(is_relative, src)?;
                    let to = self.parse_endpoint(is_relative, src)?;
                    let ctrl = with_z(ctrl, lerp(from.z, to.z, 0.5));
                    prev_quadratic_ctrl = Some(ctrl);
                    output.quadratic_bezier_to(ctrl, to);
                }
                't' | 'T' => {
                    let ctrl = get_smooth_ctrl(from, prev_quadratic_ctrl);
                    let to = self.parse_endpoint(is_relative, src)?;
                    let ctrl = with_z(ctrl, lerp(from.z, to.z, 0.5));
                    prev_quadratic_ctrl = Some(ctrl);
                    output.quadratic_bezier_to(ctrl, to);
                }
                'c' | 'C' => {
                    let ctrl1 = self.parse_point(is_relative, src)?;
                    let ctrl2 = self.parse_point(is_relative, src)?;
                    let to = self.parse_endpoint(is_relative, src)?;
                    let ctrl1 = with_z(ctrl1, lerp(from.z, to.z, 1.0 / 3.0));
                    let ctrl2 = with_z(ctrl2, lerp(from.z, to.z, 2.0 / 3.0));
                    prev_cubic_ctrl = Some(ctrl2);
                    output.cubic_bezier_to(ctrl1, ctrl2, to);
                }
                's' | 'S' => {
                    let ctrl1 = get_smooth_ctrl(from, prev_cubic_ctrl);
                    let ctrl2 = self.parse_point(is_relative, src)?;
                    let to = self.parse_endpoint(is_relative, src)?;
                    let ctrl1 = with_z(ctrl1, lerp(from.z, to.z, 1.0 / 3.0));
                    let ctrl2 = with_z(ctrl2, lerp(from.z, to.z, 2.0 / 3.0));
                    prev_cubic_ctrl = Some(ctrl2);
                    output.cubic_bezier_to(ctrl1, ctrl2, to);
                }
                'm' | 'M' => {
                    let to = self.parse_endpoint(is_relative, src)?;
                    first_position = to;
                    output.move_to(to);
                    need_start = false;
                }
                'z' | 'Z' => {
                    output.close();
                    self.current_position = first_position;
                    need_start = true;
                }
                _ => {
                    return Err(ParseError::Command {
                        command: cmd,
                        line: cmd_line,
                        column: cmd_col,
                    });
                }
            }

            match cmd {
                'c' | 'C' | 's' | 'S' => {
                    prev_quadratic_ctrl = None;
                }
                'q' | 'Q' | 't' | 'T' => {
                    prev_cubic_ctrl = None;
                }
                _ => {
                    prev_cubic_ctrl = None;
                    prev_quadratic_ctrl = None;
                }
            }

            implicit_cmd = match cmd {
                'm' => 'l',
                'M' => 'L',
                'z' => 'm',
                'Z' => 'M',
                c => c,
            };

            src.skip_whitespace();
        }

        Ok(())
    }

    fn parse_endpoint(
        &mut self,
        is_relative: bool,
        src: &mut Source<impl Iterator<Item = char>>,
    ) -> Result<Point3, ParseError> {
        let position = self.parse_point(is_relative, src)?;
        let z = self.parse_z(is_relative, src)?;
        let position = with_z(position, z);
        self.current_position = position;

        Ok(position)
    }

    fn parse_z(
        &mut self,
        is_relative: bool,
        src: &mut Source<impl Iterator<Item = char>>,
    ) -> Result<f64, ParseError> {
        if !self.with_z {
            return Ok(0.0);
        }

        let mut z = self.parse_number(src)?;
        if is_relative {
            z += self.current_position.z;
        }

        Ok(z)
    }

    // Reads x and y. The z coordinate is set by the caller.
    fn parse_point(
        &mut self,
        is_relative: bool,
        src: &mut Source<impl Iterator<Item = char>>,
    ) -> Result<Point3, ParseError> {
        let mut x = self.parse_number(src)?;
        let mut y = self.parse_number(src)?;

        if is_relative {
            x += self.current_position.x;
            y += self.current_position.y;
        }

        Ok(point3(x, y, 0.0))
    }

    fn parse_number(
        &mut self,
        src: &mut Source<impl Iterator<Item = char>>,
    ) -> Result<f64, ParseError> {
        self.float_buffer.clear();

        src.skip_whitespace();

        let line = src.line;
        let column = src.col;

        if src.current == '-' {
            self.float_buffer.push('-');
            src.advance_one();
        }

        while src.current.is_ascii_digit() {
            self.float_buffer.push(src.current);
            src.advance_one();
        }

        if src.current == '.' {
            self.float_buffer.push('.');
            src.advance_one();

            while src.current.is_ascii_digit() {
                self.float_buffer.push(src.current);
                src.advance_one();
            }
        }

        if src.current == 'e' || src.current == 'E' {
            self.float_buffer.push(src.current);
            src.advance_one();

            if src.current == '-' {
                self.float_buffer.push('-');
                src.advance_one();
            }

            while src.current.is_ascii_digit() {
                self.float_buffer.push(src.current);
                src.advance_one();
            }
        }

        match self.float_buffer.parse::<f64>() {
            Ok(val) => Ok(val),
            Err(_) => Err(ParseError::Number {
                src: std::mem::take(&mut self.float_buffer),
                line,
                column,
            }),
        }
    }
}

fn get_smooth_ctrl(current: Point3, prev_ctrl: Option<Point3>) -> Point3 {
    if let Some(prev_ctrl) = prev_ctrl {
        current + (current - prev_ctrl)
    } else {
        current
    }
}

fn with_z(p: Point3, z: f64) -> Point3 {
    point3(p.x, p.y, z)
}

fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

/// Parses a path with the default options.
pub fn parse_path(text: &str) -> Result<Path, ParseError> {
    parse_path_with_options(text, &ParserOptions::DEFAULT)
}

pub fn parse_path_with_options(text: &str, options: &ParserOptions) -> Result<Path, ParseError> {
    let mut path = Path::new();
    PathParser::new().parse(options, &mut Source::new(text.chars()), &mut path)?;

    Ok(path)
}

#[cfg(test)]
use path::PathElement;

#[cfg(test)]
fn parse_with(options: &ParserOptions, src: &str) -> Result<Path, ParseError> {
    let mut path = Path::new();
    PathParser::new().parse(options, &mut Source::new(src.chars()), &mut path)?;
    Ok(path)
}

#[test]
fn empty() {
    assert!(parse_path("").unwrap().is_empty());
    assert!(parse_path(" ").unwrap().is_empty());
}

#[test]
fn simple_square() {
    let path = parse_path("M 0 0 L 1 0 L 1 1 L 0 1 Z").unwrap();

    assert_eq!(
        path.elements(),
        &[
            PathElement::MoveTo(point3(0.0, 0.0, 0.0)),
            PathElement::LineTo(point3(1.0, 0.0, 0.0)),
            PathElement::LineTo(point3(1.0, 1.0, 0.0)),
            PathElement::LineTo(point3(0.0, 1.0, 0.0)),
            PathElement::LineTo(point3(0.0, 0.0, 0.0)),
        ]
    );
    assert!(path.is_flat());
}

#[test]
fn endpoints_with_z() {
    let options = ParserOptions::DEFAULT.with_z(true);
    let path = parse_with(&options, "M 0 0 1 Q 1 1 2 2 3 l 1 0 -3").unwrap();

    assert_eq!(
        path.elements(),
        &[
            PathElement::MoveTo(point3(0.0, 0.0, 1.0)),
            PathElement::CurveControl(point3(1.0, 1.0, 2.0)),
            PathElement::CurveTo(point3(2.0, 2.0, 3.0)),
            PathElement::LineTo(point3(3.0, 2.0, 0.0)),
        ]
    );
    assert!(!path.is_flat());
}

#[test]
fn implicit_polyline() {
    let path = parse_path("0 0 1 1 2 2 3 3").unwrap();

    assert_eq!(path.len(), 4);
    assert!(path.elements()[0].is_move_to());
    assert_eq!(path.elements()[3], PathElement::LineTo(point3(3.0, 3.0, 0.0)));
}

#[test]
fn relative_commands() {
    let path = parse_path("m 1 1 h 2 v 3 l -2 0 z m 10 0 H 0 V 0").unwrap();

    assert_eq!(
        path.elements(),
        &[
            PathElement::MoveTo(point3(1.0, 1.0, 0.0)),
            PathElement::LineTo(point3(3.0, 1.0, 0.0)),
            PathElement::LineTo(point3(3.0, 4.0, 0.0)),
            PathElement::LineTo(point3(1.0, 4.0, 0.0)),
            PathElement::LineTo(point3(1.0, 1.0, 0.0)),
            PathElement::MoveTo(point3(11.0, 1.0, 0.0)),
            PathElement::LineTo(point3(0.0, 1.0, 0.0)),
            PathElement::LineTo(point3(0.0, 0.0, 0.0)),
        ]
    );
}

#[test]
fn smooth_curves() {
    let path = parse_path("M 0 0 C 0 1 1 1 1 0 S 2 -1 2 0 Q 3 1 4 0 T 6 0").unwrap();

    assert_eq!(
        &path.elements()[4..],
        &[
            PathElement::CurveControl(point3(1.0, -1.0, 0.0)),
            PathElement::CurveControl(point3(2.0, -1.0, 0.0)),
            PathElement::CurveTo(point3(2.0, 0.0, 0.0)),
            PathElement::CurveControl(point3(3.0, 1.0, 0.0)),
            PathElement::CurveTo(point3(4.0, 0.0, 0.0)),
            PathElement::CurveControl(point3(5.0, -1.0, 0.0)),
            PathElement::CurveTo(point3(6.0, 0.0, 0.0)),
        ]
    );
}

#[test]
fn invalid_cmd() {
    let result = parse_path("x 0 0 0").err().unwrap();
    assert_eq!(
        result,
        ParseError::Command {
            command: 'x',
            line: 0,
            column: 0
        }
    );

    let result = parse_path("\n M 0 0 \n1 1 x 1 1").err().unwrap();
    assert_eq!(
        result,
        ParseError::Command {
            command: 'x',
            line: 2,
            column: 4
        }
    );
}

#[test]
fn arcs_are_rejected() {
    match parse_path("M 0 0 A 10 10 0 0 1 10 10") {
        Err(ParseError::Command { command: 'A', .. }) => {}
        r => panic!("{r:?}"),
    }
}

#[test]
fn number_01() {
    // Equivalent to "M 0.6 0.5".
    let path = parse_path("M 0.6.5").unwrap();

    assert_eq!(path.elements(), &[PathElement::MoveTo(point3(0.6, 0.5, 0.0))]);
}

#[test]
fn number_scientific_notation() {
    let path = parse_path("M 1e-2 -1E3").unwrap();
    assert_eq!(path.start(), point3(0.01, -1000.0, 0.0));
}

#[test]
fn bad_numbers() {
    let bad_number = |src: &str| match parse_path(src) {
        Err(ParseError::Number { .. }) => true,
        r => {
            println!("{r:?}");
            false
        }
    };

    assert!(bad_number("M 0 --1"));
    assert!(bad_number("M 0 1ee2"));
    assert!(bad_number("M 0 1e--1"));
    assert!(bad_number("M 0 *2"));
    assert!(bad_number("M 0 e"));
    assert!(bad_number("M 0 1e"));
    assert!(bad_number("M 0 +1"));
    assert!(bad_number("M 0 0 L 1"));
}

#[test]
fn stop() {
    let options = ParserOptions::DEFAULT.with_stop_at(Some('|'));

    assert_eq!(parse_with(&options, "M 0 0 | xxxxxx").unwrap().len(), 1);
    parse_with(&options, "M 0 0| xxxxxx").unwrap();
    assert!(parse_with(&options, "| xxxxxx").unwrap().is_empty());
    parse_with(&options, "    | xxxxxx").unwrap();
}

#[test]
fn need_start() {
    let mut p1 = Path::new();
    let res = PathParser::new().parse(
        &ParserOptions::DEFAULT,
        &mut Source::new("M 0 0 1 0 Z L 1 1 2 2 L 3 3 Z M 4 4".chars()),
        &mut p1,
    );
    match res {
        Err(ParseError::MissingMoveTo { command: 'L', .. }) => {}
        _ => {
            panic!("{:?}", res);
        }
    }

    let p2 = parse_path("M 0 0 1 0 Z").unwrap();
    assert!(p1 == p2);
}

#[test]
fn issue_895() {
    parse_path("M 1e-9 0").unwrap();
    parse_path("M -1e-9 0").unwrap();
    parse_path("M -1e11 0").unwrap();
    parse_path("M 1.e-9 1.4e-4z").unwrap();
    parse_path("M 1.6e-9 1.4e-4 z").unwrap();
    parse_path("M0 1.6e-9L0 1.4e-4").unwrap();
}
