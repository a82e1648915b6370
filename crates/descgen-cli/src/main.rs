mod cli;
mod commands;

use cli::{BuildParams, CheckParams, DumpParams, build_cli};
use simplelog::{ConfigBuilder, LevelFilter, TermLogger, TerminalMode};

fn main() {
    let matches = build_cli().get_matches();

    match matches.subcommand() {
        Some(("build", m)) => {
            let params = BuildParams::from_matches(m);
            init_logging(params.verbosity);
            commands::build::run(params.into());
        }
        Some(("check", m)) => {
            let params = CheckParams::from_matches(m);
            init_logging(params.verbosity);
            commands::check::run(params.into());
        }
        Some(("dump", m)) => {
            let params = DumpParams::from_matches(m);
            init_logging(params.verbosity);
            commands::dump::run(params.into());
        }
        _ => unreachable!("clap should have caught this"),
    }
}

/// Log to stderr; each `-v` lowers the threshold one level.
fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    let config = ConfigBuilder::new()
        .set_time_level(LevelFilter::Off)
        .set_target_level(LevelFilter::Off)
        .build();
    // Only fails when a logger is already installed.
    let _ = TermLogger::init(
        level,
        config,
        TerminalMode::Stderr,
        simplelog::ColorChoice::Auto,
    );
}
