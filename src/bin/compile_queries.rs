use dma_dashboard::config::{Compiler, FormState, TogglePolicy, TogglePolicyKind};
use dma_dashboard::telemetry;
use indexmap::IndexMap;
use serde::Serialize;
use std::fs;
use std::path::PathBuf;

const USAGE: &str = "usage: compile_queries --input <form.json> [--output <path>] [--policy <independent|mode-switch>] [--no-advanced-implies-performance]";

#[derive(Debug)]
struct CliArgs {
    input: PathBuf,
    output: Option<PathBuf>,
    policy: TogglePolicyKind,
    advanced_implies_performance: bool,
}

#[derive(Debug, Serialize)]
struct CompiledFile<'a, S: Serialize, D: Serialize> {
    signals: &'a S,
    stock_data: &'a D,
    signals_query: IndexMap<String, String>,
    stock_data_query: IndexMap<String, String>,
    signals_cache_key: String,
    stock_data_cache_key: String,
}

fn main() {
    let _ = telemetry::init_default_tracing();
    if let Err(err) = run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), String> {
    let args = parse_args()?;
    let raw = fs::read_to_string(&args.input)
        .map_err(|err| format!("failed to read `{}`: {err}", args.input.display()))?;
    let form: FormState =
        serde_json::from_str(&raw).map_err(|err| format!("invalid form json: {err}"))?;

    let policy = TogglePolicy::from_kind(args.policy)
        .with_advanced_implies_performance(args.advanced_implies_performance);
    let compiled = Compiler::new(policy)
        .compile(&form)
        .map_err(|err| format!("{} ({err})", err.field()))?;

    let file = CompiledFile {
        signals: &compiled.signals,
        stock_data: &compiled.stock_data,
        signals_query: compiled.signals.query_pairs().map_err(|err| err.to_string())?,
        stock_data_query: compiled
            .stock_data
            .query_pairs()
            .map_err(|err| err.to_string())?,
        signals_cache_key: compiled.signals.cache_key().map_err(|err| err.to_string())?,
        stock_data_cache_key: compiled
            .stock_data
            .cache_key()
            .map_err(|err| err.to_string())?,
    };
    let payload = serde_json::to_string_pretty(&file)
        .map_err(|err| format!("failed to serialize json: {err}"))?;

    match args.output {
        Some(path) => fs::write(&path, payload)
            .map_err(|err| format!("failed to write `{}`: {err}", path.display())),
        None => {
            println!("{payload}");
            Ok(())
        }
    }
}

fn parse_args() -> Result<CliArgs, String> {
    let mut args = std::env::args().skip(1);
    let mut input = None::<PathBuf>;
    let mut output = None::<PathBuf>;
    let mut policy = TogglePolicyKind::Independent;
    let mut advanced_implies_performance = true;

    while let Some(flag) = args.next() {
        match flag.as_str() {
            "--input" => {
                let value = args
                    .next()
                    .ok_or_else(|| "missing value for --input".to_owned())?;
                input = Some(PathBuf::from(value));
            }
            "--output" => {
                let value = args
                    .next()
                    .ok_or_else(|| "missing value for --output".to_owned())?;
                output = Some(PathBuf::from(value));
            }
            "--policy" => {
                policy = match args.next().as_deref() {
                    Some("independent") => TogglePolicyKind::Independent,
                    Some("mode-switch") => TogglePolicyKind::ModeSwitch,
                    Some(other) => return Err(format!("unknown policy `{other}`")),
                    None => return Err("missing value for --policy".to_owned()),
                };
            }
            "--no-advanced-implies-performance" => advanced_implies_performance = false,
            "--help" | "-h" => return Err(USAGE.to_owned()),
            _ => return Err(format!("unknown argument `{flag}`")),
        }
    }

    let input = input.ok_or_else(|| USAGE.to_owned())?;
    Ok(CliArgs {
        input,
        output,
        policy,
        advanced_implies_performance,
    })
}
