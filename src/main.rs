//! undbf - a tool for inspecting and exporting xBase .dbf table files
//!
//! Usage:
//!   undbf info <dbf_file>              - Show table information
//!   undbf head <dbf_file> [-n N]       - Print the first N rows
//!   undbf export <dbf_file> [-o file]  - Export all rows to a text file

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use undbf::{processor, DbfReader};

#[derive(Parser)]
#[command(name = "undbf")]
#[command(version = "0.1.0")]
#[command(about = "Inspect and export xBase .dbf table files", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show table information
    Info {
        /// Path to the .dbf file
        dbf_file: PathBuf,
    },
    /// Print the first rows of the table
    Head {
        /// Path to the .dbf file
        dbf_file: PathBuf,
        /// Number of rows to print
        #[arg(short = 'n', long, default_value_t = 10)]
        count: u32,
    },
    /// Export all rows to a column-aligned text file
    Export {
        /// Path to the .dbf file
        dbf_file: PathBuf,
        /// Output file path (defaults to the input with a .txt extension)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Info { dbf_file } => {
            show_info(&dbf_file)?;
        }
        Commands::Head { dbf_file, count } => {
            print_head(&dbf_file, count)?;
        }
        Commands::Export { dbf_file, output } => {
            export_txt(&dbf_file, output.as_deref())?;
        }
    }

    Ok(())
}

fn show_info(path: &Path) -> Result<()> {
    println!("{}", processor::table_info(path)?);
    Ok(())
}

fn print_head(path: &Path, count: u32) -> Result<()> {
    let mut reader = DbfReader::open(path)
        .with_context(|| format!("Failed to open {}", path.display()))?;

    let names: Vec<String> = reader
        .header()
        .fields()
        .iter()
        .map(|f| f.name().to_owned())
        .collect();
    println!("{}", names.join(" | "));

    for row in reader.rows().take(count as usize) {
        let row = row?;
        let rendered: Vec<String> = row.values().iter().map(|v| v.to_string()).collect();
        println!("{}", rendered.join(" | "));
    }
    Ok(())
}

fn export_txt(path: &Path, output: Option<&Path>) -> Result<()> {
    let output_path = output.map(PathBuf::from).unwrap_or_else(|| {
        let mut p = path.to_path_buf();
        p.set_extension("txt");
        p
    });

    let mut reader = DbfReader::open(path)
        .with_context(|| format!("Failed to open {}", path.display()))?;

    // Progress by output bytes; every exported line is about one record long
    let total = reader.record_count() as u64 * reader.header().record_length() as u64;
    let pb = ProgressBar::new(total);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {bytes}/{total_bytes}")
            .unwrap()
            .progress_chars("#>-"),
    );

    let file = File::create(&output_path)
        .with_context(|| format!("Failed to create {}", output_path.display()))?;
    let rows = processor::write_to_txt(&mut reader, pb.wrap_write(BufWriter::new(file)))?;
    pb.finish_and_clear();

    println!("Exported {} rows to {}", rows, output_path.display());
    Ok(())
}
