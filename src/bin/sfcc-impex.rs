//! sfcc-impex CLI
//!
//! CSV/Excelの商品データをSFCCカタログXMLに変換するコマンドラインツール。
//! ログは標準エラーに出力します（`RUST_LOG`で制御、既定は`info`）。

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use sfcc_impex::{
    analyze_columns, source, ConfigStore, ConversionResult, Converter, ConverterBuilder,
    MappingConfiguration, Schema,
};

#[derive(Parser)]
#[command(author, version, about = "Convert tabular product data to SFCC catalog XML")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Convert a CSV or Excel file to catalog XML.
    Convert {
        #[command(flatten)]
        target: Target,
        /// Output file ("-" writes to stdout).
        #[arg(short, long, default_value = "-")]
        output: PathBuf,
        /// Indent width (0 disables pretty printing).
        #[arg(long, default_value_t = 2)]
        indent: usize,
        /// Emit one product per row even if the mapping enables variations.
        #[arg(long)]
        no_grouping: bool,
        /// Write the full conversion result as JSON.
        #[arg(long)]
        report: Option<PathBuf>,
    },
    /// Print catalog XML for the first rows only.
    Preview {
        #[command(flatten)]
        target: Target,
        /// Number of rows to include.
        #[arg(short = 'n', long, default_value_t = 5)]
        limit: usize,
    },
    /// Print a data quality report as JSON.
    Quality {
        #[command(flatten)]
        target: Target,
    },
    /// Print sample values, a guessed type and a suggested element per column as JSON.
    Analyze {
        /// Input file (.csv, .xlsx or .xls).
        input: PathBuf,
        /// Also list the fields of this company's mapping that read each column.
        #[arg(short, long)]
        company: Option<String>,
        #[command(flatten)]
        store: StoreArgs,
    },
    /// List companies with a mapping configuration.
    Companies {
        #[command(flatten)]
        store: StoreArgs,
    },
    /// Validate a mapping configuration.
    CheckConfig {
        /// Mapping document to validate.
        #[arg(required_unless_present = "company")]
        file: Option<PathBuf>,
        /// Validate a company's mapping from the store instead of a file.
        #[arg(short, long, conflicts_with = "file")]
        company: Option<String>,
        #[command(flatten)]
        store: StoreArgs,
    },
}

#[derive(Args)]
struct StoreArgs {
    /// Directory laid out as <dir>/<company>/catalog.json (defaults to the bundled mappings).
    #[arg(long, env = "SFCC_IMPEX_CONFIG_DIR")]
    config_dir: Option<PathBuf>,
}

impl StoreArgs {
    fn open(&self) -> ConfigStore {
        match &self.config_dir {
            Some(dir) => ConfigStore::from_dir(dir),
            None => ConfigStore::bundled(),
        }
    }
}

#[derive(Args)]
struct Target {
    /// Input file (.csv, .xlsx or .xls).
    input: PathBuf,
    /// Company whose mapping is applied.
    #[arg(short, long)]
    company: String,
    #[command(flatten)]
    store: StoreArgs,
}

impl Target {
    fn converter(&self, configure: impl FnOnce(ConverterBuilder) -> ConverterBuilder) -> Result<Converter> {
        let mapping = self
            .store
            .open()
            .load(&self.company, Schema::Catalog)
            .with_context(|| format!("loading mapping for '{}'", self.company))?;
        let converter = configure(ConverterBuilder::new().with_mapping(mapping)).build()?;
        Ok(converter)
    }
}

fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    if let Err(e) = run(Cli::parse()) {
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Convert {
            target,
            output,
            indent,
            no_grouping,
            report,
        } => {
            let converter = target.converter(|builder| {
                let builder = builder.with_indent(indent);
                if no_grouping {
                    builder.with_variation_grouping(false)
                } else {
                    builder
                }
            })?;
            let rows = source::read_path(&target.input)
                .with_context(|| format!("reading {}", target.input.display()))?;
            let result = converter.convert(&rows);

            if let Some(path) = report {
                let json = serde_json::to_string_pretty(&result)?;
                fs::write(&path, json).with_context(|| format!("writing {}", path.display()))?;
            }
            if let Some(xml) = &result.xml_content {
                write_output(&output, xml)?;
            }
            print_problems(&result);

            if !result.success {
                bail!("conversion finished with {} error(s)", result.errors.len());
            }
        }
        Command::Preview { target, limit } => {
            let converter = target.converter(|builder| builder)?;
            let rows = source::read_path(&target.input)?;
            println!("{}", converter.preview(&rows.rows, limit)?);
        }
        Command::Quality { target } => {
            let converter = target.converter(|builder| builder)?;
            let rows = source::read_path(&target.input)?;
            let report = converter.quality_report(&rows);
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Command::Analyze {
            input,
            company,
            store,
        } => {
            let rows = source::read_path(&input)
                .with_context(|| format!("reading {}", input.display()))?;
            let columns = match company {
                Some(company) => {
                    let target = Target { input, company, store };
                    target.converter(|builder| builder)?.column_analysis(&rows)
                }
                None => analyze_columns(&rows),
            };
            println!("{}", serde_json::to_string_pretty(&columns)?);
        }
        Command::Companies { store } => {
            for company in store.open().available_companies()? {
                println!("{}\t{}\t{}", company.name, company.version, company.description);
            }
        }
        Command::CheckConfig {
            file,
            company,
            store,
        } => {
            let name = match (company, file) {
                (_, Some(path)) => {
                    let mapping = MappingConfiguration::from_path(&path)
                        .with_context(|| format!("checking {}", path.display()))?;
                    mapping.company_name
                }
                (Some(company), None) => store.open().load(&company, Schema::Catalog)?.company_name.clone(),
                (None, None) => bail!("either FILE or --company is required"),
            };
            println!("ok: mapping for '{}' is valid", name);
        }
    }
    Ok(())
}

fn write_output(path: &Path, xml: &str) -> Result<()> {
    if path == Path::new("-") {
        let stdout = io::stdout();
        let mut handle = stdout.lock();
        handle.write_all(xml.as_bytes())?;
        handle.write_all(b"\n")?;
        handle.flush()?;
    } else {
        fs::write(path, xml).with_context(|| format!("writing {}", path.display()))?;
        info!(path = %path.display(), "Catalog written");
    }
    Ok(())
}

fn print_problems(result: &ConversionResult) {
    for warning in &result.warnings {
        match &warning.column {
            Some(column) => eprintln!("warning: row {} [{}]: {}", warning.row, column, warning.message),
            None => eprintln!("warning: row {}: {}", warning.row, warning.message),
        }
    }
    for error in &result.errors {
        eprintln!("error: row {}: {}", error.row, error.message);
    }
}
