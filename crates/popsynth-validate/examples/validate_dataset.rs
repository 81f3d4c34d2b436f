use std::env;
use std::path::PathBuf;

use popsynth_config::load_config;
use popsynth_validate::{DatasetExpectations, ValidateOptions, ValidationEngine};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let mut args = env::args().skip(1);
    let mut config_path: Option<PathBuf> = None;
    let mut dataset_dir: Option<PathBuf> = None;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" => config_path = args.next().map(PathBuf::from),
            "--dataset" => dataset_dir = args.next().map(PathBuf::from),
            _ => {
                if dataset_dir.is_none() {
                    dataset_dir = Some(PathBuf::from(arg));
                } else {
                    return Err("unexpected argument".into());
                }
            }
        }
    }

    let config_path = config_path.ok_or("missing --config path")?;
    let dataset_dir = dataset_dir.ok_or("missing --dataset directory")?;

    let validated = load_config(&config_path)?;
    let expectations = DatasetExpectations::from(&validated.config);

    let options = ValidateOptions {
        strict: false,
        ..ValidateOptions::default()
    };
    let result = ValidationEngine::new(options).run(&dataset_dir, &expectations)?;

    for check in result.failed_checks() {
        println!("FAIL {} {}: {}", check.subject, check.check, check.detail);
    }
    println!("metrics_path={}", result.metrics_path.display());
    println!("report_path={}", result.report_path.display());
    Ok(())
}
