//! autocast CLI - cast JSON data against a YAML type schema
//!
//! Reads JSON, casts every tagged record against the declared types and prints
//! where each typed record ended up.

use clap::{Parser, Subcommand};
use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use std::process;

use autocast::{CastOptions, CastSettings, SchemaConfig, TypeCaster};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "autocast")]
#[command(version, about = "Cast tagged JSON records into registered types", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Cast a JSON document and report the typed records
    Cast {
        /// Path to the YAML type schema
        #[arg(short, long)]
        schema: PathBuf,

        /// JSON input file (reads stdin when omitted)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Tag field name for this run (overrides settings and environment)
        #[arg(short, long)]
        type_key: Option<String>,

        /// Path to a YAML settings file
        #[arg(long)]
        settings: Option<PathBuf>,
    },

    /// Validate a YAML type schema without casting anything
    Validate {
        /// Path to the YAML type schema
        #[arg(short, long)]
        schema: PathBuf,
    },
}

fn main() {
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Cast {
            schema,
            input,
            type_key,
            settings,
        } => cast(schema, input, type_key, settings),
        Commands::Validate { schema } => validate(schema),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn cast(
    schema: PathBuf,
    input: Option<PathBuf>,
    type_key: Option<String>,
    settings: Option<PathBuf>,
) -> Result<(), String> {
    let settings = match settings {
        Some(path) => CastSettings::load_from_file(path).map_err(|e| e.to_string())?,
        None => CastSettings::default(),
    }
    .with_env_overrides();

    let mut caster = TypeCaster::new();
    settings.apply(caster.config_mut());

    let schema = SchemaConfig::load_from_file(&schema).map_err(|e| e.to_string())?;
    let registered = schema
        .register_into(&mut caster)
        .map_err(|e| e.to_string())?;
    tracing::info!("Registered {} types", registered.len());

    let raw = match input {
        Some(path) => fs::read_to_string(&path)
            .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?,
        None => {
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .map_err(|e| format!("Failed to read stdin: {}", e))?;
            buffer
        }
    };
    let value: serde_json::Value =
        serde_json::from_str(&raw).map_err(|e| format!("Failed to parse JSON: {}", e))?;

    let mut options = CastOptions::new();
    if let Some(key) = type_key {
        options = options.with_type_key(key);
    }

    let node = caster.cast_json(value, &options).map_err(|e| e.to_string())?;

    let typed = node.typed_records();
    for (path, record) in &typed {
        println!("{}\t{}", path, record.class_name().unwrap_or_default());
    }
    println!("{} typed records", typed.len());

    Ok(())
}

fn validate(schema: PathBuf) -> Result<(), String> {
    let schema = SchemaConfig::load_from_file(&schema).map_err(|e| e.to_string())?;

    let transform_count: usize = schema.types.iter().map(|def| def.transforms.len()).sum();
    println!(
        "Schema valid: {} types, {} field transforms",
        schema.types.len(),
        transform_count
    );

    Ok(())
}
