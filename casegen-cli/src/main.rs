use anyhow::{Context, Result};
use casegen::discover::{DiscoveredObject, ModuleRegistry, Object};
use casegen::{create_tests, expand_type, sorted_expansions, ExpansionConfig, TypeExpr};
use clap::{Parser, Subcommand};
use colored::Colorize;
use serde_json::json;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "casegen")]
#[command(about = "Generate exhaustive test scaffolding from a module manifest", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to the module manifest
    #[arg(short, long, default_value = "casegen.json")]
    manifest: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create test files for modules under a source directory
    Create {
        /// Source directory to discover objects under
        src: Option<PathBuf>,

        /// Destination directory for generated test files
        dst: Option<PathBuf>,
    },
    /// List objects discoverable under a source directory
    List {
        /// Source directory to discover objects under
        src: Option<PathBuf>,

        /// Emit JSON instead of plain text
        #[arg(long)]
        json: bool,
    },
    /// Expand a type expression into its representative instantiations
    Expand {
        /// The type expression, e.g. "dict[str, Optional[int]]"
        type_expr: String,

        /// Cap on enumerated branches per sum type
        #[arg(long, default_value_t = 5)]
        max_elements: usize,

        /// Recursion ceiling
        #[arg(long, default_value_t = 5)]
        max_depth: usize,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Create { src, dst } => create(&cli.manifest, src, dst),
        Commands::List { src, json } => list(&cli.manifest, src, json),
        Commands::Expand {
            type_expr,
            max_elements,
            max_depth,
        } => expand(&type_expr, max_elements, max_depth),
    }
}

fn load_registry(manifest: &Path) -> Result<ModuleRegistry> {
    ModuleRegistry::from_manifest(manifest)
        .with_context(|| format!("Failed to load manifest {}", manifest.display()))
}

fn resolve_src(src: Option<PathBuf>) -> Result<PathBuf> {
    match src {
        Some(src) => Ok(src),
        None => {
            let root = std::env::current_dir().context("Failed to resolve current directory")?;
            Ok(casegen::default_src(&root))
        }
    }
}

fn create(manifest: &Path, src: Option<PathBuf>, dst: Option<PathBuf>) -> Result<()> {
    let registry = load_registry(manifest)?;
    let src = resolve_src(src)?;
    let dst = match dst {
        Some(dst) => dst,
        None => std::env::current_dir()
            .context("Failed to resolve current directory")?
            .join("tests"),
    };

    let created = create_tests(&registry, &src, &dst).context("Failed to create test files")?;
    if created.is_empty() {
        println!(
            "{}",
            format!("No modules discovered under {}", src.display()).yellow()
        );
        return Ok(());
    }
    for file in &created {
        println!("{} {}", "created".green().bold(), file.display());
    }
    println!("\n{} file(s) generated", created.len());
    Ok(())
}

fn list(manifest: &Path, src: Option<PathBuf>, as_json: bool) -> Result<()> {
    let registry = load_registry(manifest)?;
    let src = resolve_src(src)?;

    let mut walk = registry.find_objects(src.as_path(), None);
    let objects: Vec<DiscoveredObject> = walk.by_ref().collect();
    let skipped = walk.diagnostics().len();

    if as_json {
        let rows: Vec<serde_json::Value> = objects
            .iter()
            .map(|obj| {
                json!({
                    "module": obj.module,
                    "name": obj.name,
                    "kind": kind(&obj.object),
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    if objects.is_empty() {
        println!(
            "{}",
            format!("No objects discovered under {}", src.display()).yellow()
        );
    }
    for obj in &objects {
        println!("{:>8} {}::{}", kind(&obj.object).blue(), obj.module, obj.name);
    }
    if skipped > 0 {
        eprintln!(
            "{} {} module(s) could not be loaded and were skipped",
            "warning:".yellow().bold(),
            skipped
        );
    }
    Ok(())
}

fn expand(type_expr: &str, max_elements: usize, max_depth: usize) -> Result<()> {
    let ty = TypeExpr::parse(type_expr)
        .with_context(|| format!("Malformed type expression '{}'", type_expr))?;
    let config =
        ExpansionConfig::new(max_elements, max_depth).context("Invalid expansion configuration")?;
    for member in sorted_expansions(&expand_type(&ty, &config)) {
        println!("{}", member);
    }
    Ok(())
}

fn kind(object: &Object) -> &'static str {
    match object {
        Object::Function(_) => "function",
        Object::Class(_) => "class",
        Object::Value(_) => "value",
    }
}
