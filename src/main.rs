//! markup-template CLI
//!
//! Usage:
//!   markup-template [OPTIONS] [TEMPLATE]
//!
//! Options:
//!   -m, --messages <FILE>     Message bundle for `tr` and `block` (TOML format)
//!   -b, --bindings <FILE>     Variable bindings and conditions (TOML format)
//!   -c, --config <FILE>       Template configuration (TOML format)
//!       --condition <NAME>    Enable a conditional block (repeatable)
//!   -v, --verbose             Log render progress to stderr
//!   -h, --help                Print help

use std::collections::BTreeMap;
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use clap::Parser;
use serde::Deserialize;
use tracing_subscriber::EnvFilter;

use markup_template::{ConfigError, Markup, MessageBundle, Template, TemplateConfig, TextFormat};

#[derive(Parser)]
#[command(name = "markup-template")]
#[command(about = "Render placeholder templates from the command line")]
struct Cli {
    /// Template file (reads from stdin if not provided)
    input: Option<PathBuf>,

    /// Message bundle for `tr` and `block` (TOML format)
    #[arg(short, long)]
    messages: Option<PathBuf>,

    /// Variable bindings and conditions (TOML format)
    #[arg(short, long)]
    bindings: Option<PathBuf>,

    /// Template configuration (TOML format)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable a conditional block
    #[arg(long = "condition", value_name = "NAME")]
    conditions: Vec<String>,

    /// Log render progress to stderr
    #[arg(short, long)]
    verbose: bool,
}

/// Bindings file layout
///
/// ```toml
/// [strings]
/// user = "Ann & Bob"
///
/// [markup]
/// banner = "<b>Welcome</b>"
///
/// [conditions]
/// admin = true
///
/// [components.panel]
/// id = "p1"
/// html = '<div id="{id}" class="{class}"></div>'
/// ```
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct BindingsFile {
    strings: BTreeMap<String, String>,
    markup: BTreeMap<String, String>,
    conditions: BTreeMap<String, bool>,
    components: BTreeMap<String, ComponentEntry>,
}

#[derive(Debug, Deserialize)]
struct ComponentEntry {
    id: String,
    html: String,
}

impl BindingsFile {
    fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    fn apply(self, template: &mut Template<Markup>) {
        for (name, value) in self.strings {
            template.bind_string(&name, value, TextFormat::Plain);
        }
        for (name, value) in self.markup {
            template.bind_string(&name, value, TextFormat::Xhtml);
        }
        for (name, value) in self.conditions {
            template.set_condition(&name, value);
        }
        for (name, entry) in self.components {
            if let Err(rejected) = template.bind_component(&name, Markup::new(entry.id, entry.html)) {
                eprintln!("Warning: component '{}' not bound: {}", name, rejected.error);
            }
        }
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    // Load configuration
    let config = match &cli.config {
        Some(path) => match TemplateConfig::from_file(path) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Error loading config '{}': {}", path.display(), e);
                std::process::exit(1);
            }
        },
        None => TemplateConfig::default(),
    };

    // Read template
    let (source, filename) = match &cli.input {
        Some(path) => match fs::read_to_string(path) {
            Ok(content) => (content, path.display().to_string()),
            Err(e) => {
                eprintln!("Error reading file '{}': {}", path.display(), e);
                std::process::exit(1);
            }
        },
        None => {
            let mut buffer = String::new();
            match io::stdin().read_to_string(&mut buffer) {
                Ok(_) => (buffer, "<stdin>".to_string()),
                Err(e) => {
                    eprintln!("Error reading from stdin: {}", e);
                    std::process::exit(1);
                }
            }
        }
    };

    let mut template: Template<Markup> = Template::new(source.as_str()).with_config(config);

    if let Some(path) = &cli.messages {
        match MessageBundle::from_file(path) {
            Ok(bundle) => template.set_localizer(bundle),
            Err(e) => {
                eprintln!("Error loading messages '{}': {}", path.display(), e);
                std::process::exit(1);
            }
        }
    }

    if let Some(path) = &cli.bindings {
        match BindingsFile::from_file(path) {
            Ok(bindings) => bindings.apply(&mut template),
            Err(e) => {
                eprintln!("Error loading bindings '{}': {}", path.display(), e);
                std::process::exit(1);
            }
        }
    }

    for name in &cli.conditions {
        template.set_condition(name, true);
    }

    let rendered = template.render();
    for warning in &rendered.warnings {
        eprintln!("Warning: {}", warning);
    }
    match rendered.error {
        None => print!("{}", rendered.output),
        Some(e) => {
            match e.span() {
                Some(_) => eprint!("{}", e.format(&source, &filename)),
                None => eprintln!("Error: {}", e),
            }
            std::process::exit(1);
        }
    }
}
