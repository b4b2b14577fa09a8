// SPDX-License-Identifier: GPL-3.0-or-later

use buildmatch::{args, config, context, session};
use std::env;
use std::process::ExitCode;

/// Driver function of the application.
fn main() -> anyhow::Result<ExitCode> {
    // Parse the command line arguments first, the verbosity drives the logging.
    let matches = args::cli().get_matches();
    init_logging(matches.get_count("verbose"));

    let pkg_name = env!("CARGO_PKG_NAME");
    let pkg_version = env!("CARGO_PKG_VERSION");
    log::info!("{pkg_name} v{pkg_version}");
    let os = env::consts::OS;
    let family = env::consts::FAMILY;
    let arch = env::consts::ARCH;
    log::info!("Running on... {family}/{os} {arch}");

    // Capture application context.
    let context = context::Context::capture()?;
    log::info!("{context}");
    let arguments = args::Arguments::try_from(matches)?;
    log::info!("{arguments:?}");
    // Load the configuration.
    let configuration = config::Loader::load(&context, &arguments.config)?;
    log::info!("{configuration}");

    // Run the application.
    let session = session::Session::configure(context, arguments, configuration)?;
    log::debug!("Configuration complete, matching the build output now...");
    let result = session.run();
    log::debug!("Exit code: {result:?}");

    Ok(result)
}

/// The `RUST_LOG` environment variable takes precedence over the verbosity flags.
fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    env_logger::Builder::new().filter_level(level).parse_default_env().init();
}
