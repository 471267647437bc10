//! CLI binary for ficha2contrato.
//!
//! A thin shim over the library crate that maps CLI flags to
//! `GenerationConfig`/`GenerationRequest` and prints results. The OCR
//! engine and the SQL store are external collaborators, so the CLI works
//! from their outputs: a recognized-text file and a JSON record fixture.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use ficha2contrato::pipeline::docx::DocxArchive;
use ficha2contrato::pipeline::engine;
use ficha2contrato::{
    catalog, extract, generate, GenerationConfig, GenerationRequest, JsonRecordStore,
};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeSet;
use std::io::{self, Write};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

const AFTER_HELP: &str = r#"EXAMPLES:
  # Extract fields from recognized text (stdout JSON)
  ficha2contrato extract scan.txt

  # Render a contract from extracted fields
  ficha2contrato generate --fields campos.json --records registros.json \
    --template contrato_servicios.docx --contract-date 2025-01-29 \
    --company-id 1 --representative-id 1 --request-id req-001

  # List every supported placeholder
  ficha2contrato placeholders

  # Check which tokens a template uses, and flag unknown ones
  ficha2contrato inspect plantillas/contrato_servicios.docx

RECORD FIXTURE:
  The --records file stands in for the SQL store:
  {
    "empresas":       { "1": { "razon_social": "ACME S.A.", ... } },
    "representantes": { "1": { "nombre_completo": "...", "cui": "...",
                               "fecha_nacimiento": "1980-05-14" } }
  }

ENVIRONMENT VARIABLES:
  FICHA2CONTRATO_TEMPLATE_DIR  Template directory (default: plantillas)
  FICHA2CONTRATO_OUTPUT_DIR    Output directory (default: generated)
"#;

/// Extract fields from scanned contract forms and render DOCX contracts.
#[derive(Parser, Debug)]
#[command(
    name = "ficha2contrato",
    version,
    about = "Extract fields from OCR'd contract forms and render legal contracts",
    arg_required_else_help = true,
    after_long_help = AFTER_HELP
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Parse recognized text into the structured field JSON.
    Extract {
        /// File with the recognition engine's text output.
        input: PathBuf,

        /// Compact JSON instead of pretty-printed.
        #[arg(long)]
        compact: bool,
    },

    /// Render a contract document from extracted fields.
    Generate {
        /// Extraction JSON (the output of `extract`, possibly corrected).
        #[arg(long)]
        fields: PathBuf,

        /// JSON record fixture standing in for the SQL store.
        #[arg(long)]
        records: PathBuf,

        /// Template file name inside the template directory.
        #[arg(long)]
        template: String,

        /// Contract authored date, e.g. 2025-01-29.
        #[arg(long)]
        contract_date: String,

        #[arg(long)]
        company_id: u32,

        #[arg(long)]
        representative_id: u32,

        /// Unique request id; the document lands in <output-dir>/<id>/.
        #[arg(long)]
        request_id: String,

        /// Template directory.
        #[arg(long, env = "FICHA2CONTRATO_TEMPLATE_DIR", default_value = "plantillas")]
        template_dir: PathBuf,

        /// Output directory.
        #[arg(long, env = "FICHA2CONTRATO_OUTPUT_DIR", default_value = "generated")]
        output_dir: PathBuf,
    },

    /// List the closed placeholder vocabulary.
    Placeholders {
        /// Emit the catalog as JSON.
        #[arg(long)]
        json: bool,
    },

    /// List placeholder tokens used by a template; flag unknown ones.
    Inspect {
        /// Path to a DOCX template.
        template: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.quiet {
        "error"
    } else if cli.verbose {
        "debug"
    } else {
        "info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .with_writer(io::stderr)
        .init();

    match cli.command {
        Commands::Extract { input, compact } => cmd_extract(&input, compact),
        Commands::Generate {
            fields,
            records,
            template,
            contract_date,
            company_id,
            representative_id,
            request_id,
            template_dir,
            output_dir,
        } => cmd_generate(
            &fields,
            &records,
            template,
            contract_date,
            company_id,
            representative_id,
            request_id,
            template_dir,
            output_dir,
            cli.quiet,
        ),
        Commands::Placeholders { json } => cmd_placeholders(json),
        Commands::Inspect { template } => cmd_inspect(&template),
    }
}

fn cmd_extract(input: &PathBuf, compact: bool) -> Result<()> {
    let text = std::fs::read_to_string(input)
        .with_context(|| format!("Failed to read recognized text from {}", input.display()))?;
    let output = extract(&text);
    let json = if compact {
        serde_json::to_string(&output)
    } else {
        serde_json::to_string_pretty(&output)
    }
    .context("Failed to serialise extraction output")?;
    println!("{json}");
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn cmd_generate(
    fields: &PathBuf,
    records: &PathBuf,
    template: String,
    contract_date: String,
    company_id: u32,
    representative_id: u32,
    request_id: String,
    template_dir: PathBuf,
    output_dir: PathBuf,
    quiet: bool,
) -> Result<()> {
    let raw = std::fs::read_to_string(fields)
        .with_context(|| format!("Failed to read fields from {}", fields.display()))?;
    let colaborador_data =
        serde_json::from_str(&raw).context("Fields file is not valid extraction JSON")?;

    let store = JsonRecordStore::from_path(records)
        .with_context(|| format!("Failed to load record fixture {}", records.display()))?;

    let config = GenerationConfig::builder()
        .template_dir(template_dir)
        .output_dir(output_dir)
        .build()
        .context("Invalid configuration")?;

    let request = GenerationRequest {
        request_id,
        template_name: template,
        fecha_contrato: contract_date,
        empresa_id: company_id,
        representante_id: representative_id,
        colaborador_data,
    };

    let output = generate(&store, &request, &config).context("Generation failed")?;

    if !quiet {
        eprintln!(
            "✔ {} ({} paragraphs across {} parts, {}ms)",
            output.path.display(),
            output.paragraphs_rewritten,
            output.parts,
            output.duration_ms
        );
    }
    println!("{}", output.path.display());
    Ok(())
}

fn cmd_placeholders(json: bool) -> Result<()> {
    if json {
        let out = serde_json::to_string_pretty(catalog::PLACEHOLDERS)
            .context("Failed to serialise catalog")?;
        println!("{out}");
        return Ok(());
    }
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    let width = catalog::PLACEHOLDERS
        .iter()
        .map(|p| p.token.chars().count())
        .max()
        .unwrap_or(0);
    for p in catalog::PLACEHOLDERS {
        writeln!(
            handle,
            "{:width$}  {}  (ej: {})",
            p.token, p.description, p.example
        )?;
    }
    Ok(())
}

static RE_TOKEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\{\{[^{}]+\}\}").unwrap());

fn cmd_inspect(template: &PathBuf) -> Result<()> {
    let archive = DocxArchive::from_path(template)
        .with_context(|| format!("Failed to open template {}", template.display()))?;

    let mut known = BTreeSet::new();
    let mut unknown = BTreeSet::new();
    for part_name in archive.text_parts() {
        let bytes = archive.part(&part_name).unwrap_or_default();
        let xml = std::str::from_utf8(bytes)
            .with_context(|| format!("Part {part_name} is not valid UTF-8"))?;
        for text in engine::paragraph_texts(&part_name, xml)? {
            for token in RE_TOKEN.find_iter(&text) {
                if catalog::find(token.as_str()).is_some() {
                    known.insert(token.as_str().to_string());
                } else {
                    unknown.insert(token.as_str().to_string());
                }
            }
        }
    }

    println!("Tokens used ({}):", known.len());
    for token in &known {
        println!("  {token}");
    }
    if !unknown.is_empty() {
        println!("\nUNKNOWN tokens ({}) — these will NOT be substituted:", unknown.len());
        for token in &unknown {
            println!("  {token}");
        }
        std::process::exit(1);
    }
    Ok(())
}
