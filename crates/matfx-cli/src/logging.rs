use crate::error::{CliError, Result};
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::Subscriber;
use tracing_subscriber::{
    Layer,
    filter::LevelFilter,
    fmt::{self},
    prelude::*,
    registry::LookupSpan,
};

pub fn level_filter(verbosity: u8, quiet: bool) -> LevelFilter {
    if quiet {
        LevelFilter::OFF
    } else {
        match verbosity {
            0 => LevelFilter::WARN,
            1 => LevelFilter::INFO,
            2 => LevelFilter::DEBUG,
            _ => LevelFilter::TRACE,
        }
    }
}

/// Plain-text layer writing every event with its target to `path`.
fn file_layer<S>(path: &Path) -> Result<impl Layer<S>>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    let file = File::create(path).map_err(CliError::Io)?;
    Ok(fmt::layer()
        .with_writer(file)
        .with_ansi(false)
        .with_target(true))
}

pub fn setup_logging(verbosity: u8, quiet: bool, log_file: Option<PathBuf>) -> Result<()> {
    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(true)
        .with_target(false)
        .compact();

    let subscriber = tracing_subscriber::registry()
        .with(level_filter(verbosity, quiet))
        .with(stderr_layer);

    if let Some(path) = log_file {
        subscriber.with(file_layer(&path)?).init();
    } else {
        subscriber.init();
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::build_engine;
    use crate::config::AppConfig;
    use matfx::core::models::material::MaterialProperties;
    use matfx::core::models::particle::ParticleSpecies;
    use matfx::core::models::state::{StateVector, StepRecord};
    use matfx::engine::config::MaterialEffectsConfig;
    use matfx::workflows::slab::SlabGeometry;
    use nalgebra::Vector3;
    use serial_test::serial;

    /// Runs one silicon segment through an engine with the given debug level and
    /// returns what a file layer filtered at `verbosity` recorded.
    fn logged_segment(verbosity: u8, quiet: bool, debug_level: u32) -> String {
        let temp_dir = tempfile::tempdir().unwrap();
        let log_path = temp_dir.path().join("matfx.log");
        let subscriber = tracing_subscriber::registry()
            .with(level_filter(verbosity, quiet))
            .with(file_layer(&log_path).unwrap());

        let silicon = MaterialProperties::preset("silicon").unwrap();
        let geometry = SlabGeometry::new(0.0, [(silicon, 1.0)]).unwrap();
        let config = AppConfig {
            effects: MaterialEffectsConfig::default(),
            debug_level,
        };
        let proton = ParticleSpecies::from_pdg(2212).unwrap();
        let state = StateVector::new(Vector3::zeros(), Vector3::z(), 1.0);

        tracing::subscriber::with_default(subscriber, || {
            let effects = build_engine(&config, geometry).unwrap();
            effects
                .effects(&[StepRecord::new(state, 1.0, silicon)], 1.0, &proton, None)
                .unwrap();
        });

        std::fs::read_to_string(log_path).unwrap()
    }

    #[test]
    fn verbosity_maps_to_level_filters() {
        assert_eq!(level_filter(0, false), LevelFilter::WARN);
        assert_eq!(level_filter(1, false), LevelFilter::INFO);
        assert_eq!(level_filter(2, false), LevelFilter::DEBUG);
        assert_eq!(level_filter(7, false), LevelFilter::TRACE);
        assert_eq!(level_filter(3, true), LevelFilter::OFF);
    }

    #[test]
    #[serial]
    fn engine_diagnostics_reach_the_log_file_at_debug_verbosity() {
        let content = logged_segment(2, false, 1);
        assert!(content.contains("DEBUG"));
        assert!(content.contains("calculate material effects"));
        assert!(content.contains("matfx::engine::effects"));
    }

    #[test]
    #[serial]
    fn engine_diagnostics_are_filtered_below_debug_verbosity() {
        assert!(!logged_segment(1, false, 1).contains("calculate material effects"));
        assert!(logged_segment(3, true, 1).is_empty());
    }

    #[test]
    #[serial]
    fn engine_at_debug_level_zero_stays_silent_even_at_trace() {
        assert!(!logged_segment(3, false, 0).contains("material effects"));
    }

    #[test]
    fn log_file_in_a_missing_directory_is_an_io_error() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("missing").join("matfx.log");
        let result = file_layer::<tracing_subscriber::Registry>(&path);
        assert!(matches!(result, Err(CliError::Io(_))));
    }

    #[test]
    #[serial]
    fn global_logger_writes_engine_diagnostics_to_the_log_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let log_path = temp_dir.path().join("global.log");
        setup_logging(2, false, Some(log_path.clone())).unwrap();

        let silicon = MaterialProperties::preset("silicon").unwrap();
        let geometry = SlabGeometry::new(0.0, [(silicon, 1.0)]).unwrap();
        let config = AppConfig {
            effects: MaterialEffectsConfig::default(),
            debug_level: 1,
        };
        let effects = build_engine(&config, geometry).unwrap();
        let muon = ParticleSpecies::from_pdg(13).unwrap();
        let state = StateVector::new(Vector3::zeros(), Vector3::z(), 1.0);
        effects
            .effects(&[StepRecord::new(state, 0.5, silicon)], 1.0, &muon, None)
            .unwrap();

        let content = std::fs::read_to_string(log_path).unwrap();
        assert!(content.contains("calculate material effects"));
    }
}
