//! docingest CLI - page-level PDF ingestion tool

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use docingest::pipeline::pdf_files_in;
use docingest::{
    extract_txt_file, render, CommandPartitioner, DocumentSummary, ExtractOptions, JsonFormat,
    OcrConfig, Pipeline, RenderConfig, TableRouting,
};

#[derive(Parser)]
#[command(name = "docingest")]
#[command(version)]
#[command(about = "Extract text, images, tables and layout elements from PDFs", long_about = None)]
struct Cli {
    /// Directory to scan for PDF files (defaults to the executable's directory)
    #[arg(value_name = "DIR")]
    dir: Option<PathBuf>,

    /// Write one <name>.json summary per processed file into this directory
    #[arg(long, value_name = "DIR")]
    json_out: Option<PathBuf>,

    #[command(flatten)]
    extract: ExtractArgs,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Args)]
struct ExtractArgs {
    /// Directory for extracted images
    #[arg(long, global = true, value_name = "DIR", default_value = docingest::options::DEFAULT_IMAGE_DIR)]
    image_dir: PathBuf,

    /// Keep extracted images in memory instead of writing them out
    #[arg(long, global = true)]
    no_persist_images: bool,

    /// Attach tables to the page they were found on when known
    #[arg(long, global = true)]
    tables_by_page: bool,

    /// Tesseract executable
    #[arg(long, global = true, env = "TESSERACT_CMD", default_value = "tesseract")]
    tesseract: String,

    /// OCR language (e.g. "eng+deu")
    #[arg(long, global = true, env = "DOCINGEST_OCR_LANG")]
    lang: Option<String>,

    /// pdftoppm executable used for full-page OCR
    #[arg(long, global = true, env = "PDFTOPPM_CMD", default_value = "pdftoppm")]
    pdftoppm: String,

    /// Rendering resolution for full-page OCR
    #[arg(long, global = true, default_value = "72")]
    dpi: u32,
}

impl ExtractArgs {
    fn options(&self) -> ExtractOptions {
        let mut ocr = OcrConfig::default().with_program(&self.tesseract);
        if let Some(lang) = &self.lang {
            ocr = ocr.with_language(lang);
        }
        let routing = if self.tables_by_page {
            TableRouting::ByPage
        } else {
            TableRouting::FirstPage
        };

        ExtractOptions::new()
            .with_image_dir(&self.image_dir)
            .with_persist_images(!self.no_persist_images)
            .with_table_routing(routing)
            .with_ocr(ocr)
            .with_render(
                RenderConfig::default()
                    .with_program(&self.pdftoppm)
                    .with_dpi(self.dpi),
            )
    }

    fn pipeline(&self) -> Pipeline {
        let pipeline = Pipeline::new(self.options());
        match CommandPartitioner::from_env() {
            Some(partitioner) => pipeline.with_partitioner(partitioner),
            None => pipeline,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Process one PDF and print its JSON summary
    Process {
        /// Input PDF file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Output compact JSON
        #[arg(long)]
        compact: bool,
    },

    /// Print all text of a PDF on one line
    Text {
        /// Input PDF file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Print the OCR text of every image in a PDF
    Ocr {
        /// Input PDF file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Read a plain-text file and print the result as JSON
    Txt {
        /// Input text file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output compact JSON
        #[arg(long)]
        compact: bool,
    },

    /// Show version information
    Version,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let result = match cli.command {
        Some(Commands::Process {
            input,
            output,
            compact,
        }) => cmd_process(&cli.extract, &input, output.as_deref(), compact),
        Some(Commands::Text { input, output }) => {
            cmd_text(&cli.extract, &input, output.as_deref())
        }
        Some(Commands::Ocr { input, output }) => cmd_ocr(&cli.extract, &input, output.as_deref()),
        Some(Commands::Txt { input, compact }) => cmd_txt(&input, compact),
        Some(Commands::Version) => {
            cmd_version();
            Ok(())
        }
        None => cmd_scan(&cli.extract, cli.dir.as_deref(), cli.json_out.as_deref()),
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn json_format(compact: bool) -> JsonFormat {
    if compact {
        JsonFormat::Compact
    } else {
        JsonFormat::Pretty
    }
}

fn write_or_print(output: Option<&Path>, content: &str) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(path) = output {
        fs::write(path, content)?;
        println!("{} {}", "Saved to".green(), path.display());
    } else {
        println!("{}", content);
    }
    Ok(())
}

fn default_scan_dir() -> Result<PathBuf, Box<dyn std::error::Error>> {
    let exe = std::env::current_exe()?;
    let dir = exe
        .parent()
        .ok_or("cannot determine the executable's directory")?;
    Ok(dir.to_path_buf())
}

fn cmd_scan(
    args: &ExtractArgs,
    dir: Option<&Path>,
    json_out: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let dir = match dir {
        Some(dir) => dir.to_path_buf(),
        None => default_scan_dir()?,
    };
    log::debug!("Scanning {}", dir.display());
    let files = pdf_files_in(&dir)?;
    if files.is_empty() {
        println!("{} {}", "No PDF files in".yellow(), dir.display());
        return Ok(());
    }
    if let Some(out) = json_out {
        fs::create_dir_all(out)?;
    }

    let pipeline = args.pipeline();
    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("#>-"),
    );

    let mut failed = 0;
    for path in &files {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        pb.set_message(name.clone());

        match pipeline.process_pdf(path) {
            // Per-page counts and diagnostics are already logged by the pipeline
            Ok(summary) => {
                if let Some(out) = json_out {
                    let stem = path.file_stem().unwrap_or_default().to_string_lossy();
                    let target = out.join(format!("{}.json", stem));
                    if let Err(e) = write_summary(&summary, &target) {
                        failed += 1;
                        pb.println(format!(
                            "{} {}: {}",
                            "Error".red().bold(),
                            target.display(),
                            e
                        ));
                    }
                }
            }
            Err(e) => {
                failed += 1;
                pb.println(format!("{} {}: {}", "Error".red().bold(), name, e));
            }
        }
        pb.inc(1);
    }
    pb.finish_with_message("Done!");

    if failed > 0 {
        return Err(format!("{} of {} files failed", failed, files.len()).into());
    }
    Ok(())
}

fn write_summary(
    summary: &DocumentSummary,
    target: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    let json = render::to_json(summary, JsonFormat::Pretty)?;
    fs::write(target, json)?;
    Ok(())
}

fn cmd_process(
    args: &ExtractArgs,
    input: &Path,
    output: Option<&Path>,
    compact: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let summary = args.pipeline().process_pdf(input)?;
    let json = render::to_json(&summary, json_format(compact))?;
    write_or_print(output, &json)
}

fn cmd_text(
    args: &ExtractArgs,
    input: &Path,
    output: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let text = args.pipeline().all_text_one_line(input)?;
    write_or_print(output, &text)
}

fn cmd_ocr(
    args: &ExtractArgs,
    input: &Path,
    output: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let text = args.pipeline().all_ocr_text(input)?;
    write_or_print(output, &text)
}

fn cmd_txt(input: &Path, compact: bool) -> Result<(), Box<dyn std::error::Error>> {
    let result = extract_txt_file(input);
    println!("{}", render::text_result_to_json(&result, json_format(compact))?);
    Ok(())
}

fn cmd_version() {
    println!(
        "{} {}",
        "docingest".cyan().bold(),
        env!("CARGO_PKG_VERSION")
    );
    println!("Page-level PDF ingestion with OCR fallback");
    println!();
    println!("License: MIT");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_summary_reports_unwritable_target() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("not-a-dir");
        fs::write(&blocker, "").unwrap();

        let summary = DocumentSummary::new("a.pdf", 1);
        assert!(write_summary(&summary, &blocker.join("a.json")).is_err());

        let target = dir.path().join("a.json");
        write_summary(&summary, &target).unwrap();
        let written = fs::read_to_string(&target).unwrap();
        assert!(written.contains("\"filename\": \"a.pdf\""));
    }
}
