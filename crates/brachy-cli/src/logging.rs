use crate::error::{CliError, Result};
use std::cmp;
use std::fs::File;
use std::path::Path;
use tracing::Subscriber;
use tracing_subscriber::{
    Layer,
    filter::{LevelFilter, Targets},
    fmt,
    prelude::*,
    registry::LookupSpan,
};

/// Library and binary share this target prefix.
const CRATE_TARGET: &str = "brachyplan";

/// Planner loops log once per iteration; they only reach DEBUG at `-vvv`.
const PLANNER_TARGET: &str = "brachyplan::engine::tasks";

fn verbosity_level(verbosity: u8) -> LevelFilter {
    match verbosity {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    }
}

/// Console filter. Dependencies stay at WARN, planner iterations are capped at
/// INFO below `-vvv`, and `--quiet` silences everything.
fn console_filter(verbosity: u8, quiet: bool) -> Targets {
    if quiet {
        return Targets::new().with_default(LevelFilter::OFF);
    }
    let level = verbosity_level(verbosity);
    let planner_level = if verbosity >= 3 {
        LevelFilter::TRACE
    } else {
        cmp::min(level, LevelFilter::INFO)
    };
    Targets::new()
        .with_default(cmp::min(level, LevelFilter::WARN))
        .with_target(CRATE_TARGET, level)
        .with_target(PLANNER_TARGET, planner_level)
}

/// The log file records the full planning trace regardless of console verbosity.
fn file_filter() -> Targets {
    Targets::new()
        .with_default(LevelFilter::WARN)
        .with_target(CRATE_TARGET, LevelFilter::DEBUG)
}

fn file_layer<S>(file: File) -> impl Layer<S>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fmt::layer()
        .with_writer(file)
        .with_ansi(false)
        .with_thread_ids(true)
        .with_target(true)
        .with_filter(file_filter())
}

pub fn setup_logging(verbosity: u8, quiet: bool, log_file: Option<&Path>) -> Result<()> {
    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(true)
        .with_target(false)
        .compact()
        .with_filter(console_filter(verbosity, quiet));

    let log_file = log_file.map(File::create).transpose().map_err(CliError::Io)?;

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(log_file.map(file_layer))
        .init();

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use tracing::{Level, debug, info, warn};

    #[test]
    fn console_filter_follows_verbosity_for_crate_targets() {
        let filter = console_filter(0, false);
        assert!(filter.would_enable("brachyplan::workflows::plan", &Level::WARN));
        assert!(!filter.would_enable("brachyplan::workflows::plan", &Level::INFO));

        let filter = console_filter(2, false);
        assert!(filter.would_enable("brachyplan::workflows::plan", &Level::DEBUG));
        assert!(!filter.would_enable("brachyplan::workflows::plan", &Level::TRACE));
    }

    #[test]
    fn planner_iterations_need_triple_verbosity() {
        let filter = console_filter(2, false);
        assert!(filter.would_enable("brachyplan::engine::tasks::scm", &Level::INFO));
        assert!(!filter.would_enable("brachyplan::engine::tasks::scm", &Level::DEBUG));

        let filter = console_filter(3, false);
        assert!(filter.would_enable("brachyplan::engine::tasks::iiem", &Level::TRACE));
    }

    #[test]
    fn dependencies_stay_at_warn_and_quiet_silences_all() {
        let filter = console_filter(3, false);
        assert!(filter.would_enable("indicatif::draw", &Level::WARN));
        assert!(!filter.would_enable("indicatif::draw", &Level::INFO));

        let quiet = console_filter(0, true);
        assert!(!quiet.would_enable("brachyplan::main", &Level::ERROR));
    }

    #[test]
    #[serial]
    fn file_layer_records_planner_debug_and_skips_dependencies() {
        let temp_dir = tempfile::tempdir().unwrap();
        let log_path = temp_dir.path().join("plan.log");
        let subscriber =
            tracing_subscriber::registry().with(file_layer(File::create(&log_path).unwrap()));

        tracing::subscriber::with_default(subscriber, || {
            debug!(target: "brachyplan::engine::tasks::scm", coverage = 0.985, "Seed inserted.");
            info!(target: "some_dependency", "Dependency chatter.");
            warn!(target: "some_dependency", "Dependency warning.");
        });

        let content = std::fs::read_to_string(log_path).unwrap();
        assert!(content.contains("Seed inserted."));
        assert!(content.contains("coverage=0.985"));
        assert!(content.contains("ThreadId"));
        assert!(!content.contains("Dependency chatter."));
        assert!(content.contains("Dependency warning."));
    }

    #[test]
    #[serial]
    fn invalid_log_file_path_propagates_error() {
        let invalid_path = Path::new("/");

        if cfg!(unix) && invalid_path.is_dir() {
            let result = setup_logging(0, false, Some(invalid_path));
            assert!(matches!(result, Err(CliError::Io(_))));
        }
    }
}
