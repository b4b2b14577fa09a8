// SPDX-License-Identifier: GPL-3.0-or-later

//! This module contains the command line interface of the application.
//!
//! The command line parsing is implemented using the `clap` library.
//! The `Arguments` type is the structured form of the program invocation.

use clap::{arg, command, ArgAction, ArgMatches, Command};

/// The file name which stands for the standard input or output.
pub const STANDARD_STREAM: &str = "-";

/// Represents the command line arguments of the application.
#[derive(Debug, PartialEq)]
pub struct Arguments {
    // The path of the configuration file.
    pub config: Option<String>,
    // The project which owns the build.
    pub project: Option<String>,
    // The directory the build was started in.
    pub build_directory: Option<String>,
    pub input: BuildLog,
    pub output: Diagnostics,
}

/// Where the build output is read from.
#[derive(Debug, PartialEq)]
pub struct BuildLog {
    pub file_name: String,
}

/// Where the matched diagnostics are written to.
#[derive(Debug, PartialEq)]
pub struct Diagnostics {
    pub file_name: String,
}

impl BuildLog {
    pub fn is_stdin(&self) -> bool {
        self.file_name == STANDARD_STREAM
    }
}

impl Diagnostics {
    pub fn is_stdout(&self) -> bool {
        self.file_name == STANDARD_STREAM
    }
}

impl TryFrom<ArgMatches> for Arguments {
    type Error = anyhow::Error;

    fn try_from(matches: ArgMatches) -> Result<Self, Self::Error> {
        let string = |name: &str| matches.get_one::<String>(name).map(String::to_string);

        Ok(Arguments {
            config: string("config"),
            project: string("project"),
            build_directory: string("build-dir"),
            input: BuildLog { file_name: string("input").unwrap_or_else(|| STANDARD_STREAM.to_string()) },
            output: Diagnostics { file_name: string("output").unwrap_or_else(|| STANDARD_STREAM.to_string()) },
        })
    }
}

/// Represents the command line interface of the application.
pub fn cli() -> Command {
    command!()
        .about("Matches the file references of a build output to the files of a workspace")
        .args(&[
            arg!(-v --verbose ... "Sets the level of verbosity").action(ArgAction::Count),
            arg!(-c --config <FILE> "Path of the config file"),
            arg!(-p --project <NAME> "Name of the project which was built"),
            arg!(-d --"build-dir" <DIR> "Directory the build was running in [default: project location]"),
            arg!(-i --input <FILE> "Path of the build output, '-' for the standard input")
                .default_value(STANDARD_STREAM)
                .hide_default_value(false),
            arg!(-o --output <FILE> "Path of the result file, '-' for the standard output")
                .default_value(STANDARD_STREAM)
                .hide_default_value(false),
        ])
}
