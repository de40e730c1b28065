//! Command-line interface for hair_shade_match
//!
//! Basic CLI tool for color conversion, catalog management and matching
//! known shades against the catalog

use hair_shade_match::color::{delta_e_76, hex_to_lab, parse_hex};
use hair_shade_match::{
    delta_e_2000, logger, AnalysisError, CatalogMatcher, CatalogStore, HairPipeline, JsonCatalogStore, LabColor,
    MatchQuality, PipelineConfig, Shade,
};
use std::{env, path::Path, process};

fn main() {
    logger::init();

    let args: Vec<String> = env::args().collect();

    let mut config_path = None;
    let mut top_k = None;
    let mut positional: Vec<String> = Vec::new();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--config" => {
                i += 1;
                match args.get(i) {
                    Some(path) => config_path = Some(path.clone()),
                    None => fail_usage("--config needs a path"),
                }
            }
            "--top-k" => {
                i += 1;
                match args.get(i).and_then(|v| v.parse::<usize>().ok()) {
                    Some(k) if k > 0 => top_k = Some(k),
                    _ => fail_usage("--top-k needs a positive integer"),
                }
            }
            "--help" | "-h" => {
                print_help(&args[0]);
                process::exit(0);
            }
            arg if arg.starts_with("--") => fail_usage(&format!("Unknown option: {}", arg)),
            arg => positional.push(arg.to_string()),
        }
        i += 1;
    }

    let mut config = match config_path {
        Some(path) => PipelineConfig::from_json_file(Path::new(&path)).unwrap_or_else(|e| exit_with(e)),
        None => PipelineConfig::default(),
    };
    if let Some(k) = top_k {
        config.matching.top_k = k;
    }

    let words: Vec<&str> = positional.iter().map(String::as_str).collect();
    let result = match words.as_slice() {
        ["lab", hex] => print_lab(hex),
        ["delta-e", first, second] => print_delta_e(first, second),
        ["catalog", "list"] => list_catalog(&config),
        ["catalog", "add", id, name, image] => add_extension(&config, id, name, Path::new(image)),
        ["match", hexes @ ..] if !hexes.is_empty() => match_hexes(&config, hexes),
        _ => {
            print_help(&args[0]);
            process::exit(1);
        }
    };

    if let Err(error) = result {
        exit_with(error);
    }
}

fn print_help(program_name: &str) {
    eprintln!("Usage: {} [OPTIONS] <COMMAND>", program_name);
    eprintln!();
    eprintln!("Hair shade conversion and extension catalog matching.");
    eprintln!();
    eprintln!("Commands:");
    eprintln!("  lab <hex>                        Convert a color to L*a*b* and LCh");
    eprintln!("  delta-e <hex> <hex>              CIEDE2000 and CIE76 distance");
    eprintln!("  catalog list                     Print every catalog entry");
    eprintln!("  catalog add <id> <name> <image>  Add or replace an extension from a sample image");
    eprintln!("  match <hex> [hex...]             Rank catalog entries against each shade");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --config <FILE>  Pipeline configuration (JSON)");
    eprintln!("  --top-k <N>      Matches per shade (default: 3)");
    eprintln!("  --help, -h       Show this help message");
    eprintln!();
    eprintln!("Examples:");
    eprintln!("  {} lab '#8b4513'", program_name);
    eprintln!("  {} catalog add chestnut 'Chestnut Brown' swatch.jpg", program_name);
    eprintln!("  {} --top-k 5 match 8b4513 3c281e", program_name);
}

fn fail_usage(message: &str) -> ! {
    eprintln!("Error: {}", message);
    eprintln!("Use --help for usage information");
    process::exit(1);
}

fn exit_with(error: AnalysisError) -> ! {
    eprintln!("Failed: {}", error);
    eprintln!("Suggestion: {}", error.user_message());
    process::exit(1);
}

fn print_json<T: serde::Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Error serializing result: {}", e),
    }
}

fn print_lab(hex: &str) -> Result<(), AnalysisError> {
    let [r, g, b] = parse_hex(hex)?;
    let lab = hex_to_lab(hex)?;
    let lch = lab.to_lch();

    print_json(&serde_json::json!({
        "rgb": [r, g, b],
        "lab": lab,
        "lch": [lch.l, lch.chroma, lch.hue.into_positive_degrees()],
    }));

    eprintln!();
    eprintln!("Lab Values: L*={:.1}, a*={:.1}, b*={:.1}", lab.l, lab.a, lab.b);
    eprintln!(
        "LCh Values: L*={:.1}, C*={:.1}, h={:.1}",
        lch.l,
        lch.chroma,
        lch.hue.into_positive_degrees()
    );
    Ok(())
}

fn print_delta_e(first: &str, second: &str) -> Result<(), AnalysisError> {
    let a = hex_to_lab(first)?;
    let b = hex_to_lab(second)?;
    let de00 = delta_e_2000(a, b);

    print_json(&serde_json::json!({
        "deltaE2000": de00,
        "deltaE76": delta_e_76(a, b),
        "quality": MatchQuality::from_delta_e(de00),
    }));
    Ok(())
}

fn list_catalog(config: &PipelineConfig) -> Result<(), AnalysisError> {
    let store = JsonCatalogStore::new(&config.catalog.database_path);
    let catalog = store.load()?;
    print_json(&catalog);
    eprintln!("{} entries in {}", catalog.len(), store.path().display());
    Ok(())
}

fn add_extension(config: &PipelineConfig, id: &str, name: &str, image: &Path) -> Result<(), AnalysisError> {
    let pipeline = HairPipeline::new(config.clone())?;
    let store = JsonCatalogStore::open(&config.catalog.database_path)?;
    let saved = pipeline.save_extension(&store, id, name, image)?;
    print_json(&serde_json::json!({ "saved": saved }));
    Ok(())
}

fn match_hexes(config: &PipelineConfig, hexes: &[&str]) -> Result<(), AnalysisError> {
    let shades = hexes
        .iter()
        .map(|hex| {
            let rgb = parse_hex(hex)?;
            Ok(Shade::from_rgb(rgb.map(f64::from), 0))
        })
        .collect::<Result<Vec<Shade>, AnalysisError>>()?;

    let catalog = JsonCatalogStore::new(&config.catalog.database_path).load()?;
    let matcher = CatalogMatcher::from_config(&config.matching);
    let matches = matcher.match_shades(&shades, catalog.entries());

    print_json(&serde_json::json!({ "userHair": shades, "topMatches": matches }));

    eprintln!();
    for (shade, ranked) in shades.iter().zip(&matches) {
        eprintln!("{} {}", shade.hex, describe(shade.lab));
        if ranked.is_empty() {
            eprintln!("  (catalog is empty)");
        }
        for m in ranked {
            eprintln!("  {:<24} {}  ΔE={:.2} ({:?})", m.entry.name, m.entry.hex, m.delta_e, m.quality());
        }
    }
    Ok(())
}

fn describe(lab: LabColor) -> String {
    format!("L*={:.1} a*={:.1} b*={:.1}", lab.l, lab.a, lab.b)
}
