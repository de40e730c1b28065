//! Generate default pipeline configuration file
//!
//! Creates a JSON config with all default parameters

use hair_shade_match::PipelineConfig;
use std::{env, path::Path, process};

fn main() {
    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        eprintln!("Usage: {} <output_config.json>", args[0]);
        eprintln!();
        eprintln!("Example:");
        eprintln!("  {} config/pipeline.json", args[0]);
        process::exit(1);
    }

    let output_path = Path::new(&args[1]);

    if let Some(parent) = output_path.parent() {
        if let Err(e) = std::fs::create_dir_all(parent) {
            eprintln!("Error creating directory: {}", e);
            process::exit(1);
        }
    }

    let config = PipelineConfig::default();

    match config.to_json_file(output_path) {
        Ok(_) => {
            eprintln!("Configuration saved to {}", output_path.display());
            eprintln!();
            eprintln!("Config summary:");
            eprintln!(
                "  Model grid: {}x{}, mask {:?}",
                config.segmentation.input_width, config.segmentation.input_height, config.segmentation.mask
            );
            eprintln!(
                "  Clustering: {} shades, at most {} rounds",
                config.clustering.shade_count, config.clustering.max_iterations
            );
            eprintln!("  Matching: top {} per shade", config.matching.top_k);
            eprintln!(
                "  Catalog: {} (images in {})",
                config.catalog.database_path.display(),
                config.catalog.data_dir.display()
            );
        }
        Err(e) => {
            eprintln!("Error saving config: {}", e);
            process::exit(1);
        }
    }
}
