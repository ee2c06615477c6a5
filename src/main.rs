use std::path::PathBuf;

use clap::Parser;
use tamar::{
    config::TamarConfig,
    data::observation::load_observations,
    error::TamarError,
    logging::setup_tracing,
    model::input::{assemble, OrchardParamsBuilder, TreeAge},
    pipeline,
};

#[derive(Parser, Debug)]
#[command(about = "Extract yield-model features from raw weather station readings")]
struct Args {
    /// Path to a JSON file of raw station observations
    #[clap(short, long)]
    observations: PathBuf,
    /// Target harvest year
    #[clap(short, long)]
    year: i32,
    /// Optional configuration file (default: config.yml)
    #[clap(short, long)]
    config: Option<PathBuf>,
    /// Tree age in years
    #[clap(long, conflicts_with = "planting_year")]
    tree_age: Option<i32>,
    /// Planting year, as an alternative to --tree-age
    #[clap(long)]
    planting_year: Option<i32>,
    /// Bunches per tree
    #[clap(long)]
    bunches: Option<u32>,
    /// Spadices per bunch
    #[clap(long)]
    spadices: Option<u32>,
    /// Fruits per spadix (applied to all three generations)
    #[clap(long)]
    fruits: Option<u32>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let (_non_blocking, _guard) = setup_tracing(None)?;

    let config = TamarConfig::read_config(args.config.as_ref())?;

    let observations = load_observations(&args.observations)?;

    let mut builder = OrchardParamsBuilder::default();
    if let Some(age) = args.tree_age {
        builder.tree_age(TreeAge::Years(age));
    } else if let Some(planted) = args.planting_year {
        builder.tree_age(TreeAge::PlantingYear(planted));
    }
    if let Some(bunches) = args.bunches {
        builder.bunches(bunches);
    }
    if let Some(spadices) = args.spadices {
        builder.spadices_per_bunch(spadices);
    }
    if let Some(fruits) = args.fruits {
        builder
            .fruits_upper(fruits)
            .fruits_center(fruits)
            .fruits_lower(fruits);
    }
    let params = builder
        .build()
        .map_err(|e| TamarError::OrchardParamsError(e.to_string()))?;

    let features = pipeline::extract_features(&observations, args.year, &config)?;
    println!("Feature vector for {}:", args.year);
    for (key, value) in features.iter() {
        match value {
            Some(v) => println!("  {:<24} {:>10.2}", key, v),
            None => println!("  {:<24} {:>10}", key, "no data"),
        }
    }

    let input = assemble(
        &params,
        &features,
        args.year,
        &config.model_schema(),
        config.default_humidity,
    )?;
    println!("\nModel input record ({} keys):", input.len());
    for (key, value) in input.iter() {
        println!("  {:<24} {:>10.2}", key, value);
    }

    Ok(())
}
