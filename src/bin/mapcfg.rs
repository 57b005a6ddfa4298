//! mapcfg CLI - assemble and inspect a mapping-layer configuration
//!
//! Runs the full assembly on a YAML configuration document and reports
//! what was built, or the first error encountered.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process;
use std::sync::Arc;

use mapcfg::session::SETTINGS;
use mapcfg::{ConfigBuilder, FsResourceLoader, Properties, Settings};

/// Environment variable naming the environment to select.
const ENVIRONMENT_VAR: &str = "MAPCFG_ENVIRONMENT";

#[derive(Parser)]
#[command(name = "mapcfg")]
#[command(version, about = "Assemble and validate mapping-layer configuration documents", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Assemble a configuration document and print a summary
    Check {
        /// Path to the YAML configuration document
        #[arg(short, long)]
        config: PathBuf,

        /// Environment to select (defaults to $MAPCFG_ENVIRONMENT, then the document default)
        #[arg(short, long)]
        environment: Option<String>,

        /// Variable overriding every property in the document (KEY=VALUE)
        #[arg(long = "var", value_parser = parse_key_val)]
        vars: Vec<(String, String)>,

        /// Directory to look up resources in; repeatable, searched in order
        #[arg(short, long = "root")]
        roots: Vec<PathBuf>,

        /// Print the summary as JSON
        #[arg(long)]
        json: bool,
    },

    /// List every known setting with its default value
    Settings,
}

fn parse_key_val(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("invalid KEY=VALUE: no '=' found in '{}'", s))?;
    Ok((key.to_string(), value.to_string()))
}

fn main() {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Check {
            config,
            environment,
            vars,
            roots,
            json,
        } => check_config(config, environment, vars, roots, json),
        Commands::Settings => list_settings(),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

/// Assemble the configuration at `config` and print what was built
fn check_config(
    config: PathBuf,
    environment: Option<String>,
    vars: Vec<(String, String)>,
    roots: Vec<PathBuf>,
    json: bool,
) -> Result<(), String> {
    let mut builder = ConfigBuilder::from_path(&config).map_err(|e| e.to_string())?;

    if let Some(environment) = environment.or_else(|| std::env::var(ENVIRONMENT_VAR).ok()) {
        builder = builder.environment(environment);
    }
    if !vars.is_empty() {
        builder = builder.variables(vars.into_iter().collect::<Properties>());
    }
    if !roots.is_empty() {
        let loader = roots
            .into_iter()
            .fold(FsResourceLoader::new(), |loader, root| loader.with_root(root));
        builder = builder.resource_loader(Arc::new(loader));
    }

    let configuration = builder.parse().map_err(|e| e.to_string())?;
    let summary = configuration.summary();

    if json {
        let rendered = serde_json::to_string_pretty(&summary)
            .map_err(|e| format!("Failed to render summary: {}", e))?;
        println!("{}", rendered);
        return Ok(());
    }

    println!("✅ {} assembled", config.display());
    println!("  Environment:   {}", summary.environment.unwrap_or("(none)"));
    println!("  Database id:   {}", summary.database_id.unwrap_or("(none)"));
    println!("  Variables:     {}", summary.variables.len());
    println!("  Type aliases:  {}", summary.type_aliases);
    println!("  Type handlers: {}", summary.type_handlers.len());
    println!("  Interceptors:  {}", summary.interceptors.len());
    println!("  Mappers:       {}", summary.mappers.len());
    for mapper in &summary.mappers {
        println!("    - {}", mapper);
    }
    println!("  Statements:    {}", summary.statements.len());
    for statement in &summary.statements {
        println!("    - {}", statement);
    }
    Ok(())
}

/// Print every setting name with its default
fn list_settings() -> Result<(), String> {
    let defaults = serde_json::to_value(Settings::default())
        .map_err(|e| format!("Failed to render settings: {}", e))?;

    for def in SETTINGS {
        let value = match defaults.get(def.name) {
            None | Some(serde_json::Value::Null) => "(unset)".to_string(),
            Some(serde_json::Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
        };
        println!("{:<36} {}", def.name, value);
    }
    Ok(())
}
