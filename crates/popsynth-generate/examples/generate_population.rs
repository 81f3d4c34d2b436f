use std::env;
use std::path::PathBuf;

use popsynth_config::load_config;
use popsynth_generate::{GenerateOptions, GenerationEngine};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let mut args = env::args().skip(1);
    let mut config_path: Option<PathBuf> = None;
    let mut out_dir: Option<PathBuf> = None;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" => config_path = args.next().map(PathBuf::from),
            "--out" => out_dir = args.next().map(PathBuf::from),
            _ => {
                if config_path.is_none() {
                    config_path = Some(PathBuf::from(arg));
                } else {
                    return Err("unexpected argument".into());
                }
            }
        }
    }

    let config_path = config_path.ok_or("missing --config path")?;
    let validated = load_config(&config_path)?;

    let mut options = GenerateOptions::default();
    if let Some(out_dir) = out_dir {
        options.out_dir = out_dir;
    }

    let engine = GenerationEngine::new(options);
    let result = engine.run(&validated.config)?;

    println!("out_dir={}", result.out_dir.display());
    Ok(())
}
