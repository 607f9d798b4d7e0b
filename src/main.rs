//! phl - check, list and preview syntax highlighter definitions

use std::env;
use std::fs;
use std::io;
use std::path::Path;
use std::process;
use std::rc::Rc;

use crossterm::tty::IsTty;
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

use phl::config::Config;
use phl::error::{PhlError, Result};
use phl::render::render_document;
use phl::syntax::{
    self, collect_metas, load_spec_file, BundledStorage, Document, FileStorage, Highlighter,
    SpecResult, SpecStorage, TextBuffer,
};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run() -> Result<()> {
    let args: Vec<String> = env::args().collect();

    match args.get(1).map(String::as_str) {
        None | Some("--help") | Some("-h") => {
            print_usage();
            Ok(())
        }
        Some("--version") | Some("-V") => {
            print_version();
            Ok(())
        }
        Some("check") => match args.get(2) {
            Some(path) => check(Path::new(path)),
            None => Err(PhlError::Message("check: missing <file>".into())),
        },
        Some("list") => list(&Config::load()),
        Some("show") => match args.get(2) {
            Some(spec) => show(&Config::load(), spec, args.get(3).map(Path::new)),
            None => Err(PhlError::Message("show: missing <spec>".into())),
        },
        Some(other) => Err(PhlError::Message(format!(
            "Unknown command \"{}\", try --help",
            other
        ))),
    }
}

/// Configured directories first, then the bundled definitions
fn storages(config: &Config) -> Vec<Rc<dyn SpecStorage>> {
    let mut storages: Vec<Rc<dyn SpecStorage>> = config
        .spec_dirs
        .iter()
        .map(|dir| {
            Rc::new(FileStorage::new(dir).with_extension(config.extension.as_str()))
                as Rc<dyn SpecStorage>
        })
        .collect();
    storages.push(Rc::new(BundledStorage::all()));
    storages
}

fn check(path: &Path) -> Result<()> {
    let result = load_spec_file(path, true)?;
    if result.warnings.is_empty() {
        println!(
            "{}: {} rules, no warnings",
            result.spec.meta.display_title(),
            result.spec.rules.len()
        );
        return Ok(());
    }
    for (line, message) in &result.warnings {
        println!("Line {}: {}", line, message);
    }
    Err(PhlError::Message(format!(
        "{} warning(s) in {}",
        result.warnings.len(),
        path.display()
    )))
}

fn list(config: &Config) -> Result<()> {
    let storages = storages(config);
    for meta in collect_metas(&storages) {
        let storage = meta
            .storage()
            .map(|s| s.name().to_string())
            .unwrap_or_default();
        println!(
            "{:<16} {:<24} {} ({})",
            meta.name,
            meta.display_title(),
            meta.source,
            storage
        );
    }
    Ok(())
}

/// Load a spec given either as a file path or by name
fn resolve_spec(storages: &[Rc<dyn SpecStorage>], spec: &str) -> Result<SpecResult> {
    let path = Path::new(spec);
    if path.is_file() {
        return load_spec_file(path, true);
    }
    let meta = collect_metas(storages)
        .into_iter()
        .find(|meta| meta.name == spec)
        .ok_or_else(|| PhlError::SpecNotFound(spec.to_string()))?;
    syntax::load_spec(&meta, true)
}

fn show(config: &Config, spec: &str, file: Option<&Path>) -> Result<()> {
    let storages = storages(config);
    let result = resolve_spec(&storages, spec)?;
    for (line, message) in &result.warnings {
        warn!(spec = %result.spec.meta.name, line = *line, "{}", message);
    }

    let text = match file {
        Some(path) => fs::read_to_string(path)
            .map_err(|e| PhlError::file(path.to_string_lossy(), e))?,
        None => result.spec.raw_sample().to_string(),
    };

    let mut doc = Document::from_text(&text).with_font_size(config.font_size);
    Highlighter::new(result.spec.clone()).rehighlight(&mut doc);
    debug!(blocks = doc.block_count(), "highlighted");

    let stdout = io::stdout();
    let color = config.color && stdout.is_tty();
    render_document(&mut stdout.lock(), &doc, color)
}

fn print_usage() {
    println!(
        "phl {} - declarative syntax highlighter",
        env!("CARGO_PKG_VERSION")
    );
    println!();
    println!("Usage: phl [OPTIONS] <COMMAND>");
    println!();
    println!("Commands:");
    println!("  check <file>        Report warnings of a highlighter definition");
    println!("  list                List available highlighters");
    println!("  show <spec> [file]  Print a file (or the spec's sample) highlighted");
    println!();
    println!("Options:");
    println!("  -h, --help     Show this help message");
    println!("  -V, --version  Show version information");
    println!();
    println!("Settings are read from ~/.phl.toml, logging is controlled by RUST_LOG");
}

fn print_version() {
    println!("phl {}", env!("CARGO_PKG_VERSION"));
}
