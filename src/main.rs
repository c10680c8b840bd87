//! Java Templates CLI
//!
//! Usage:
//!   java-templates [OPTIONS] <COMMAND>
//!
//! Commands:
//!   classify  Print the categories a snippet can fill
//!   fill      Substitute attributes into a template
//!   smooth    Print a template with placeholders replaced by stand-ins
//!   check     Smooth a template and report what still fails to parse
//!
//! Options:
//!   -c, --config <FILE>  Engine configuration (TOML format)
//!   -d, --debug          Log every parser attempt
//!   -h, --help           Print help

use std::collections::HashMap;
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use java_templates::{
    Attributes, EngineConfig, FillError, GrammarContext, LanguageConfig, ParseError,
    SyntaxOracle, TemplateEngine,
};

#[derive(Parser)]
#[command(name = "java-templates")]
#[command(about = "Typed Java code templates checked by a Java parser")]
struct Cli {
    /// Engine configuration file (TOML format)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Debug mode: log every parser attempt
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the categories a snippet can fill
    Classify {
        snippet: String,
    },

    /// Substitute attributes into a template and print the generated code
    Fill {
        /// Template file
        template: PathBuf,

        /// Attribute binding as name=value (repeatable)
        #[arg(short = 'a', long = "attr", value_parser = parse_binding)]
        attrs: Vec<(String, String)>,

        /// TOML file of name = "value" attribute bindings
        #[arg(long)]
        attributes: Option<PathBuf>,
    },

    /// Print the template with every placeholder replaced by a stand-in
    Smooth {
        /// Template file (reads from stdin if not provided)
        template: Option<PathBuf>,
    },

    /// Smooth the template and report parse errors in the result
    Check {
        /// Template file (reads from stdin if not provided)
        template: Option<PathBuf>,
    },
}

fn parse_binding(s: &str) -> Result<(String, String), String> {
    let (name, value) = s
        .split_once('=')
        .ok_or_else(|| format!("invalid binding '{}': expected name=value", s))?;
    Ok((name.trim().to_string(), value.to_string()))
}

fn main() {
    let cli = Cli::parse();

    let filter = if cli.debug {
        EnvFilter::new("java_templates=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    // Load configuration
    let config = match &cli.config {
        Some(path) => match EngineConfig::from_file(path) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Error loading config '{}': {}", path.display(), e);
                process::exit(1);
            }
        },
        None => EngineConfig::default(),
    };
    let engine = TemplateEngine::new().with_config(config);

    match cli.command {
        Command::Classify { snippet } => {
            println!("{}", engine.classify(&snippet));
        }
        Command::Fill {
            template,
            attrs,
            attributes,
        } => run_fill(&engine, &template, attrs, attributes.as_deref()),
        Command::Smooth { template } => {
            let source = read_source(template.as_deref());
            print!("{}", engine.smooth(&engine.template(source)));
        }
        Command::Check { template } => run_check(&engine, template.as_deref()),
    }
}

fn run_fill(
    engine: &TemplateEngine,
    path: &Path,
    bindings: Vec<(String, String)>,
    attributes_file: Option<&Path>,
) {
    let source = read_source(Some(path));

    let mut attributes: Attributes = match attributes_file {
        Some(file) => match load_attributes(file) {
            Ok(a) => a,
            Err(e) => {
                eprintln!("Error loading attributes '{}': {}", file.display(), e);
                process::exit(1);
            }
        },
        None => HashMap::new(),
    };
    // command-line bindings override the file
    attributes.extend(bindings);

    let template = engine.template(source);
    match engine.fill(&template, &attributes) {
        Ok(generated) => {
            print!("{}", generated.source);
            report(&generated.source, &path.display().to_string(), &generated.diagnostics);
        }
        Err(FillError::Validation(e)) => {
            eprintln!("Invalid attributes: {}", e);
            process::exit(1);
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    }
}

fn run_check(engine: &TemplateEngine, path: Option<&Path>) {
    let source = read_source(path);
    let smoothed = engine.smooth(&engine.template(source));

    let config = LanguageConfig::new(engine.config().level);
    let outcome = engine
        .oracle()
        .try_parse(&smoothed, GrammarContext::CompilationUnit, &config);

    let filename = path.map_or_else(|| "<stdin>".to_string(), |p| p.display().to_string());
    if outcome.is_clean() {
        eprintln!("{}: ok", filename);
    } else {
        report(&smoothed, &filename, &outcome.diagnostics);
        process::exit(1);
    }
}

/// Print parser diagnostics against the text they were reported on
fn report(source: &str, filename: &str, diagnostics: &[ParseError]) {
    for diagnostic in diagnostics {
        eprint!("{}", diagnostic.format(source, filename));
    }
}

fn load_attributes(path: &Path) -> Result<Attributes, String> {
    let content = fs::read_to_string(path).map_err(|e| e.to_string())?;
    toml::from_str(&content).map_err(|e| e.to_string())
}

fn read_source(path: Option<&Path>) -> String {
    match path {
        Some(path) => match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                eprintln!("Error reading file '{}': {}", path.display(), e);
                process::exit(1);
            }
        },
        None => {
            let mut buffer = String::new();
            match io::stdin().read_to_string(&mut buffer) {
                Ok(_) => buffer,
                Err(e) => {
                    eprintln!("Error reading from stdin: {}", e);
                    process::exit(1);
                }
            }
        }
    }
}
