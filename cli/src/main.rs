extern crate clap;
extern crate relief;

mod commands;
mod draw;
mod flatten;
mod format;
mod outline;
mod reduce;

use clap::{App, AppSettings, Arg, ArgMatches, SubCommand};
use commands::*;
use relief::extra::parser::{parse_path_with_options, ParseError, ParserOptions};
use relief::path::{EndpointStyle, LineStyle, Path, WindingRule};
use relief::tessellation::{DrawError, FlatteningOptions, StyleContext};

use std::fs::File;
use std::io::prelude::*;
use std::io::{self, stdout};
use std::process;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error("invalid path: {0}")]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Draw(#[from] DrawError),
    #[error("invalid value {value:?} for {name}")]
    InvalidArgument { name: &'static str, value: String },
}

fn main() {
    env_logger::init();

    let matches = app().get_matches();

    if let Err(err) = run(&matches) {
        eprintln!("error: {}", err);
        process::exit(1);
    }
}

fn app() -> App<'static, 'static> {
    let path_args = [
        Arg::with_name("PATH")
            .value_name("PATH")
            .help("A path in the extended SVG path syntax")
            .takes_value(true)
            .required(false),
        Arg::with_name("INPUT")
            .help("Sets the input file to use")
            .short("i")
            .long("input")
            .value_name("FILE")
            .takes_value(true)
            .required(false),
        Arg::with_name("OUTPUT")
            .help("Sets the output file to use")
            .value_name("FILE")
            .short("o")
            .long("output")
            .takes_value(true)
            .required(false),
        Arg::with_name("Z")
            .short("z")
            .long("with-z")
            .help("Reads a z coordinate after each endpoint"),
        Arg::with_name("START")
            .long("start")
            .help("Decoration at the start of the path (arrowhead, circle, ...)")
            .value_name("STYLE")
            .takes_value(true),
        Arg::with_name("END")
            .long("end")
            .help("Decoration at the end of the path (arrowhead, circle, ...)")
            .value_name("STYLE")
            .takes_value(true),
        Arg::with_name("DASH")
            .long("dash")
            .help("Dash pattern (solid, dash, dot, dashdot, dashdotdot, longdash)")
            .value_name("STYLE")
            .takes_value(true),
    ];

    let style_args = [
        Arg::with_name("FILL")
            .short("f")
            .long("fill")
            .help("Fills the path"),
        Arg::with_name("LINE")
            .short("l")
            .long("line")
            .help("Outlines the path with a given line width")
            .value_name("WIDTH")
            .takes_value(true),
        Arg::with_name("DEPTH")
            .short("d")
            .long("depth")
            .help("Extrudes the path (0 by default)")
            .value_name("DEPTH")
            .takes_value(true),
        Arg::with_name("BEVEL")
            .short("b")
            .long("bevel")
            .help("Radius of the bevel of extruded paths (0 by default)")
            .value_name("RADIUS")
            .takes_value(true),
        Arg::with_name("FACETS")
            .long("facets")
            .help("Number of facets of the bevel, negative for a chamfer (4 by default)")
            .value_name("COUNT")
            .takes_value(true)
            .allow_hyphen_values(true),
        Arg::with_name("WINDING")
            .short("w")
            .long("winding")
            .help("Winding rule (nonzero, positive, negative, abs-geq-two, odd, none)")
            .value_name("RULE")
            .takes_value(true),
        Arg::with_name("TEXTURE")
            .long("texture")
            .help("Computes texture coordinates"),
    ];

    App::new("relief command-line interface")
        .version("0.1")
        .about("Path renderer and extruder")
        .setting(AppSettings::SubcommandRequiredElseHelp)
        .subcommand(
            SubCommand::with_name("draw")
                .about("Draws a path into a recording sink and prints the commands")
                .args(&path_args)
                .args(&style_args)
                .arg(
                    Arg::with_name("COUNT")
                        .short("c")
                        .long("count")
                        .help("Only prints the summary"),
                ),
        )
        .subcommand(
            SubCommand::with_name("outline")
                .about("Prints the outline of a path")
                .args(&path_args)
                .arg(
                    Arg::with_name("WIDTH")
                        .long("width")
                        .help("Line width (1 by default)")
                        .value_name("WIDTH")
                        .takes_value(true),
                ),
        )
        .subcommand(
            SubCommand::with_name("flatten")
                .about("Flattens a path")
                .args(&path_args)
                .arg(
                    Arg::with_name("STEPS")
                        .long("max-steps")
                        .help("Maximum number of segments per curve (25 by default)")
                        .value_name("STEPS")
                        .takes_value(true),
                )
                .arg(
                    Arg::with_name("COUNT")
                        .short("c")
                        .long("count")
                        .help("Prints the number of vertices and contours"),
                ),
        )
        .subcommand(
            SubCommand::with_name("reduce")
                .about("Looks for a minimal path that makes the tessellator fail")
                .args(&path_args)
                .args(&style_args),
        )
}

fn run(matches: &ArgMatches) -> Result<(), CliError> {
    match matches.subcommand() {
        ("draw", Some(m)) => draw::draw(DrawCmd {
            path: get_path(m)?,
            style: get_style(m)?,
            output: get_output(m)?,
            count: m.is_present("COUNT"),
        }),
        ("outline", Some(m)) => outline::outline(OutlineCmd {
            path: get_path(m)?,
            line_width: get_number(m, "WIDTH", 1.0)?,
            output: get_output(m)?,
        }),
        ("flatten", Some(m)) => flatten::flatten(FlattenCmd {
            path: get_path(m)?,
            flattening: FlatteningOptions::DEFAULT.with_steps_max(get_number(
                m,
                "STEPS",
                FlatteningOptions::DEFAULT.steps_max,
            )?),
            output: get_output(m)?,
            count: m.is_present("COUNT"),
        }),
        ("reduce", Some(m)) => {
            reduce::reduce_testcase(ReduceCmd {
                path: get_path(m)?,
                style: get_style(m)?,
            });
            Ok(())
        }
        _ => Ok(()),
    }
}

fn get_path(matches: &ArgMatches) -> Result<Path, CliError> {
    let mut input_buffer = matches.value_of("PATH").unwrap_or("").to_string();
    if let Some(input_file) = matches.value_of("INPUT") {
        File::open(input_file)?.read_to_string(&mut input_buffer)?;
    }

    let options = ParserOptions::DEFAULT.with_z(matches.is_present("Z"));
    let mut path = parse_path_with_options(&input_buffer, &options)?;

    if let Some(name) = matches.value_of("START") {
        path.start_style = endpoint_style(name)?;
    }
    if let Some(name) = matches.value_of("END") {
        path.end_style = endpoint_style(name)?;
    }
    if let Some(name) = matches.value_of("DASH") {
        path.line_style = line_style(name)?;
    }

    Ok(path)
}

fn get_style(matches: &ArgMatches) -> Result<StyleContext, CliError> {
    let mut style = StyleContext::DEFAULT
        .with_depth(get_number(matches, "DEPTH", 0.0)?)
        .with_bevel(
            get_number(matches, "BEVEL", 0.0)?,
            get_number(matches, "FACETS", 4)?,
        );

    if let Some(width) = matches.value_of("LINE") {
        style = style.with_line(parse_value("LINE", width)?);
    }
    // Fill by default.
    style = style.with_fill(matches.is_present("FILL") || !style.line);

    if let Some(name) = matches.value_of("WINDING") {
        let rule = match name {
            "none" => None,
            _ => Some(WindingRule::from_name(name).ok_or_else(|| invalid("WINDING", name))?),
        };
        style = style.with_winding_rule(rule);
    }

    if matches.is_present("TEXTURE") {
        style = style.with_texture_units(1);
    }

    Ok(style)
}

fn get_output(matches: &ArgMatches) -> Result<Box<dyn Write>, CliError> {
    Ok(match matches.value_of("OUTPUT") {
        Some(output_file) => Box::new(File::create(output_file)?),
        None => Box::new(stdout()),
    })
}

fn get_number<T: std::str::FromStr>(
    matches: &ArgMatches,
    name: &'static str,
    default: T,
) -> Result<T, CliError> {
    match matches.value_of(name) {
        Some(value) => parse_value(name, value),
        None => Ok(default),
    }
}

fn parse_value<T: std::str::FromStr>(name: &'static str, value: &str) -> Result<T, CliError> {
    value.parse().map_err(|_| invalid(name, value))
}

fn endpoint_style(name: &str) -> Result<EndpointStyle, CliError> {
    EndpointStyle::ALL
        .iter()
        .find(|style| format!("{:?}", style).eq_ignore_ascii_case(name))
        .cloned()
        .ok_or_else(|| invalid("STYLE", name))
}

fn line_style(name: &str) -> Result<LineStyle, CliError> {
    LineStyle::ALL
        .iter()
        .find(|style| format!("{:?}", style).eq_ignore_ascii_case(name))
        .cloned()
        .ok_or_else(|| invalid("DASH", name))
}

fn invalid(name: &'static str, value: &str) -> CliError {
    CliError::InvalidArgument {
        name,
        value: value.to_string(),
    }
}

#[cfg(test)]
fn sub_matches(args: &[&str]) -> ArgMatches<'static> {
    let matches = app().get_matches_from(args.iter().cloned());
    match matches.subcommand() {
        (_, Some(m)) => m.clone(),
        _ => panic!("missing subcommand"),
    }
}

#[test]
fn draw_arguments() {
    let m = sub_matches(&[
        "relief", "draw", "M 0 0 L 10 0 L 5 10 Z", "--line", "2", "--depth", "3", "--end",
        "arrowhead", "-w", "odd",
    ]);

    let path = get_path(&m).unwrap();
    assert_eq!(path.end_style, EndpointStyle::Arrowhead);
    assert_eq!(path.sub_paths().count(), 1);

    let style = get_style(&m).unwrap();
    assert!(style.line && !style.fill);
    assert_eq!(style.line_width, 2.0);
    assert_eq!(style.depth, 3.0);
    assert_eq!(style.winding_rule, Some(WindingRule::Odd));
}

#[test]
fn invalid_arguments() {
    let m = sub_matches(&["relief", "draw", "M 0 0 L 1 0", "--depth", "deep"]);
    match get_style(&m) {
        Err(CliError::InvalidArgument { name, value }) => {
            assert_eq!(name, "DEPTH");
            assert_eq!(value, "deep");
        }
        other => panic!("{:?}", other.map(|_| ())),
    }

    let m = sub_matches(&["relief", "outline", "M 0 0 L 1 0", "--end", "bogus"]);
    assert!(matches!(get_path(&m), Err(CliError::InvalidArgument { .. })));

    let m = sub_matches(&["relief", "flatten", "M 0 0 X"]);
    assert!(matches!(get_path(&m), Err(CliError::Parse(_))));
}
