use super::{build_engine, load_geometry, parse_species};
use crate::cli::DedxArgs;
use crate::config::load_config;
use crate::error::Result;
use matfx::workflows::dedx_table;
use tracing::info;

pub fn run(args: DedxArgs) -> Result<()> {
    let species = parse_species(&args.particle)?;
    let config = load_config(args.config.as_deref())?;
    let geometry = load_geometry(&args.source)?;
    let mut effects = build_engine(&config, geometry)?;

    info!("Tabulating dE/dx for {}.", species);
    let path = dedx_table::write_dedx_table(&mut effects, &species, &args.output_dir)?;
    println!("dE/dx table written to {}", path.display());
    Ok(())
}
