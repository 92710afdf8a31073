use super::{build_engine, load_geometry, parse_species};
use crate::cli::TraverseArgs;
use crate::config::load_config;
use crate::error::{CliError, Result};
use matfx::core::models::state::{Q_OVER_P, StateVector};
use matfx::workflows::slab::{SlabGeometry, StraightLinePropagator};
use matfx::workflows::traverse::{self, TraversalResult, TraverseSettings};
use nalgebra::Vector3;
use std::path::Path;
use tracing::info;

/// Distance (cm) kept in front of the first and behind the last layer by default.
const MARGIN: f64 = 1.0;

pub fn run(args: TraverseArgs) -> Result<()> {
    if !(args.momentum > 0.0) {
        return Err(CliError::Argument(format!(
            "Momentum must be positive, got {}",
            args.momentum
        )));
    }

    let species = parse_species(&args.particle)?;
    let config = load_config(args.config.as_deref())?;
    let geometry = load_geometry(&args.source)?;

    let (tx, ty) = match args.slopes.as_deref() {
        Some([tx, ty]) => (*tx, *ty),
        _ => (0.0, 0.0),
    };
    let direction = Vector3::new(tx, ty, 1.0).normalize();
    let (start_z, max_distance) = plan_path(&geometry, &args, direction.z);
    let start = StateVector::new(
        Vector3::new(0.0, 0.0, start_z),
        direction,
        f64::from(species.charge) / args.momentum,
    );

    let settings = TraverseSettings {
        max_distance,
        with_noise: !args.no_noise,
        backward: args.backward,
        ..TraverseSettings::default()
    };

    let mut effects = build_engine(&config, geometry)?;
    info!(
        "Traversing {} at {} GeV/c from z = {} cm over {} cm.",
        species, args.momentum, start_z, max_distance
    );
    let result = traverse::traverse(
        &mut effects,
        &StraightLinePropagator,
        &start,
        args.momentum,
        &species,
        &settings,
    )?;

    if let Some(path) = &args.output {
        write_steps(path, &result)?;
        info!("Per-step table written to {:?}", path);
    }
    print_summary(&result, args.momentum);
    Ok(())
}

fn plan_path(geometry: &SlabGeometry, args: &TraverseArgs, dz: f64) -> (f64, f64) {
    let front = geometry.front().unwrap_or(0.0);
    let back = geometry.back().unwrap_or(0.0);

    let start_z = args.start_z.unwrap_or(if args.backward {
        back + MARGIN
    } else {
        front - MARGIN
    });
    let max_distance = args.max_distance.unwrap_or_else(|| {
        let target = if args.backward { front - MARGIN } else { back + MARGIN };
        ((target - start_z) / dz).abs()
    });
    (start_z, max_distance)
}

fn write_steps(path: &Path, result: &TraversalResult) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    for step in &result.steps {
        writer.serialize(step)?;
    }
    writer.flush()?;
    Ok(())
}

fn print_summary(result: &TraversalResult, initial_momentum: f64) {
    println!("Steps taken:       {}", result.steps.len());
    println!("Path length:       {:.6} cm", result.path_length);
    println!("Final momentum:    {:.9} GeV/c", result.final_momentum);
    println!(
        "Momentum loss:     {:.9} GeV/c",
        result.momentum_loss(initial_momentum)
    );
    let position = result.final_state.position();
    println!(
        "Final position:    ({:.6}, {:.6}, {:.6}) cm",
        position.x, position.y, position.z
    );
    if let Some(noise) = &result.noise {
        println!("Noise sigma(q/p):  {:.6e}", noise[(Q_OVER_P, Q_OVER_P)].sqrt());
        println!("Noise sigma(x):    {:.6e} cm", noise[(0, 0)].sqrt());
        println!("Noise sigma(ax):   {:.6e}", noise[(3, 3)].sqrt());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::MaterialSource;
    use matfx::core::models::material::MaterialProperties;

    fn args(start_z: Option<f64>, backward: bool) -> TraverseArgs {
        TraverseArgs {
            particle: "mu-".to_string(),
            momentum: 1.0,
            source: MaterialSource {
                geometry: None,
                material: Some("iron".to_string()),
            },
            start_z,
            slopes: None,
            max_distance: None,
            backward,
            no_noise: false,
            output: None,
            config: None,
        }
    }

    fn stack() -> SlabGeometry {
        let iron = MaterialProperties::preset("iron").unwrap();
        SlabGeometry::new(2.0, [(iron, 3.0)]).unwrap()
    }

    #[test]
    fn default_path_crosses_the_whole_stack() {
        let (start, distance) = plan_path(&stack(), &args(None, false), 1.0);
        assert_eq!(start, 1.0);
        assert_eq!(distance, 5.0);
    }

    #[test]
    fn inclined_tracks_need_a_longer_path() {
        let (_, distance) = plan_path(&stack(), &args(None, false), 0.5);
        assert_eq!(distance, 10.0);
    }

    #[test]
    fn backward_paths_start_behind_the_stack() {
        let (start, distance) = plan_path(&stack(), &args(None, true), 1.0);
        assert_eq!(start, 6.0);
        assert_eq!(distance, 5.0);
    }

    #[test]
    fn steps_are_written_as_csv() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("steps.csv");
        let mut run_args = args(Some(-2.0), false);
        run_args.output = Some(output.clone());

        run(run_args).unwrap();

        let content = std::fs::read_to_string(&output).unwrap();
        let header = content.lines().next().unwrap();
        assert!(header.starts_with("index,x,y,z,step_size,limit"));
        assert!(content.contains("boundary"));
    }

    #[test]
    fn non_positive_momentum_is_rejected() {
        let mut bad = args(None, false);
        bad.momentum = 0.0;
        assert!(matches!(run(bad), Err(CliError::Argument(_))));
    }
}
