use std::path::Path;

use itertools::Itertools;
use log::{info, warn};
use simplelog::{ColorChoice, ConfigBuilder, TermLogger, TerminalMode};
use uom::si::length::millimeter;

use heat_stack::config::RunConfig;
use heat_stack::slices::process_slices;

const DEFAULT_CONFIG: &str = "heat_stack.json5";

fn main() -> anyhow::Result<()> {
    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_CONFIG.to_string());
    let (config, loaded) = if Path::new(&path).exists() {
        (RunConfig::load(&path)?, true)
    } else {
        (RunConfig::default(), false)
    };

    TermLogger::init(
        config.log_level,
        ConfigBuilder::new().build(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )?;
    if loaded {
        info!("loaded {}", path);
    } else {
        warn!("{} not found, running the built-in stack", path);
    }

    let results = process_slices(&config.stack, &config.slices)?;
    for result in &results {
        let thicknesses = result
            .layer_thicknesses
            .iter()
            .map(|t| format!("{:.4}", t.get::<millimeter>()))
            .join(", ");
        info!(
            "slice {:>3} l/L={:.3} layers [{}] mm interfaces {:.1?} K",
            result.index, result.position, thicknesses, result.interface_temperatures
        );
        if let Some(suggestion) = &result.suggestion {
            info!(
                "slice {:>3} outer layer {:.4} mm ({} runs)",
                result.index,
                suggestion.thickness.get::<millimeter>(),
                suggestion.iterations
            );
        }
    }
    Ok(())
}
