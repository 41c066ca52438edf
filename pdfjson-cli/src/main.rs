use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use pdfjson::{
    archive_member_name, convert_file_with_options, create_zip_package, ConvertOptions,
    DocumentResult, PackageEntry,
};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

#[derive(Parser)]
#[command(
    name = "pdfjson",
    about = "Convert PDF files into per-page JSON documents",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert PDF files to JSON
    Convert {
        /// Input PDF files
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Output file path (single input only, defaults to <name>.json)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Directory for generated JSON files (defaults to the current directory)
        #[arg(short = 'd', long)]
        output_dir: Option<PathBuf>,

        /// Extract at most this many pages per file
        #[arg(long)]
        max_pages: Option<usize>,

        /// Write JSON without indentation
        #[arg(long)]
        compact: bool,
    },

    /// Bundle JSON files into a ZIP package
    Package {
        /// Input JSON files
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Output archive path
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Show page, word and character counts of a PDF
    Info {
        /// Input PDF file
        input: PathBuf,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pdfjson=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Convert {
            inputs,
            output,
            output_dir,
            max_pages,
            compact,
        } => {
            if output.is_some() && inputs.len() > 1 {
                bail!("--output can only be used with a single input file, use --output-dir instead");
            }

            let mut options = ConvertOptions::default();
            if let Some(max_pages) = max_pages {
                options = options.with_max_pages(max_pages);
            }

            if let Some(dir) = &output_dir {
                std::fs::create_dir_all(dir)
                    .with_context(|| format!("Failed to create {}", dir.display()))?;
            }

            let mut failures = 0;
            for input in &inputs {
                let target = match &output {
                    Some(path) => path.clone(),
                    None => default_output_path(input, output_dir.as_deref()),
                };

                match convert_one(input, &target, &options, compact) {
                    Ok(doc) => println!(
                        "✓ {} -> {} ({} pages)",
                        input.display(),
                        target.display(),
                        doc.total_pages
                    ),
                    Err(e) => {
                        eprintln!("Error converting {}: {:#}", input.display(), e);
                        failures += 1;
                    }
                }
            }

            if failures > 0 {
                bail!("{} of {} files failed to convert", failures, inputs.len());
            }
        }

        Commands::Package { inputs, output } => {
            let entries = inputs
                .iter()
                .map(|path| package_entry(path))
                .collect::<Result<Vec<_>>>()?;

            let archive = create_zip_package(&entries)?;
            std::fs::write(&output, &archive)
                .with_context(|| format!("Failed to write {}", output.display()))?;

            println!(
                "✓ Packaged {} files into {} ({} bytes)",
                entries.len(),
                output.display(),
                archive.len()
            );
        }

        Commands::Info { input } => {
            let doc = convert_file_with_options(&input, &ConvertOptions::default())
                .with_context(|| format!("Failed to read {}", input.display()))?;

            println!("PDF Information for: {}", input.display());
            println!("==========================================");
            println!("Pages: {}", doc.total_pages);
            println!("Words: {}", doc.total_words());
            println!("Characters: {}", doc.total_characters());

            if !doc.pages.is_empty() {
                println!("\nPage Information:");
                println!("-----------------");
                for page in &doc.pages {
                    println!(
                        "Page {}: {} words, {} characters",
                        page.page_number, page.word_count, page.character_count
                    );
                }
            }
        }
    }

    Ok(())
}

/// `<stem>.json`, in `output_dir` when given, otherwise relative to the current directory
fn default_output_path(input: &Path, output_dir: Option<&Path>) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_string());
    let file_name = format!("{stem}.json");

    match output_dir {
        Some(dir) => dir.join(file_name),
        None => PathBuf::from(file_name),
    }
}

fn convert_one(
    input: &Path,
    target: &Path,
    options: &ConvertOptions,
    compact: bool,
) -> Result<DocumentResult> {
    let doc = convert_file_with_options(input, options)?;
    info!("{}: {} pages extracted", doc.filename, doc.total_pages);

    let json = if compact {
        serde_json::to_string(&doc)?
    } else {
        serde_json::to_string_pretty(&doc)?
    };
    std::fs::write(target, json)
        .with_context(|| format!("Failed to write {}", target.display()))?;

    Ok(doc)
}

/// Read a JSON file as a package entry named after the file
fn package_entry(path: &Path) -> Result<PackageEntry> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let data: serde_json::Value = serde_json::from_str(&text)
        .with_context(|| format!("{} is not valid JSON", path.display()))?;

    let filename = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    debug!("Packaging {} as {}", path.display(), archive_member_name(&filename));

    Ok(PackageEntry::new(filename, data))
}
