//! sqz-cli - Command-line interface for the SQZ/DIET unpacker
//!
//! A command-line tool for unpacking Titus game resources packed with SQZ
//! (LZW or Huffman+RLE) or DIET.

use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use sqz::{decompress_bytes_with, inspect, LzwMode, PackedHeader, SqzError};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

#[derive(Parser)]
#[command(name = "sqz-cli")]
#[command(about = "A CLI tool for unpacking SQZ and DIET compressed game resources")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Quiet mode (suppress non-error output)
    #[arg(short, long)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Unpack a single file
    Unpack {
        /// Packed input file
        input: PathBuf,

        /// Unpacked output file
        output: PathBuf,

        /// Use the alternate LZW control codes (clear 0x101, end 0x100)
        #[arg(long)]
        alt_lzw: bool,

        /// Retry with the alternate LZW codes if the standard ones fail
        #[arg(long, conflicts_with = "alt_lzw")]
        retry_alt_lzw: bool,

        /// Force overwrite of output file
        #[arg(short, long)]
        force: bool,
    },

    /// Unpack many files into a directory
    Batch {
        /// Packed input files
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Directory receiving the unpacked files (same file names)
        #[arg(short, long)]
        out_dir: PathBuf,

        /// Use the alternate LZW control codes (clear 0x101, end 0x100)
        #[arg(long)]
        alt_lzw: bool,

        /// Force overwrite of output files
        #[arg(short, long)]
        force: bool,
    },

    /// Get information about a packed file
    Info {
        /// Packed file to analyze
        input: PathBuf,
    },
}

fn lzw_mode(alt_lzw: bool) -> LzwMode {
    if alt_lzw {
        LzwMode::Alternate
    } else {
        LzwMode::Standard
    }
}

fn main() {
    let cli = Cli::parse();

    let level = if cli.verbose {
        log::LevelFilter::Debug
    } else if cli.quiet {
        log::LevelFilter::Error
    } else {
        log::LevelFilter::Warn
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();

    let result = match cli.command {
        Commands::Unpack {
            input,
            output,
            alt_lzw,
            retry_alt_lzw,
            force,
        } => unpack_file(
            &input,
            &output,
            lzw_mode(alt_lzw),
            retry_alt_lzw,
            force,
            cli.verbose,
            cli.quiet,
        ),
        Commands::Batch {
            inputs,
            out_dir,
            alt_lzw,
            force,
        } => unpack_batch(&inputs, &out_dir, lzw_mode(alt_lzw), force, cli.quiet),
        Commands::Info { input } => show_file_info(&input, cli.verbose),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Decode `data`, optionally retrying once with the alternate LZW codes
fn unpack_data(data: &[u8], mode: LzwMode, retry_alt_lzw: bool) -> sqz::Result<Vec<u8>> {
    match decompress_bytes_with(data, mode) {
        Err(e @ (SqzError::LengthMismatch { .. } | SqzError::CorruptStream(_)))
            if retry_alt_lzw && mode == LzwMode::Standard =>
        {
            log::info!("Standard LZW codes failed ({}), retrying with alternate codes", e);
            decompress_bytes_with(data, LzwMode::Alternate)
        }
        other => other,
    }
}

fn unpack_file(
    input: &Path,
    output: &Path,
    mode: LzwMode,
    retry_alt_lzw: bool,
    force: bool,
    verbose: bool,
    quiet: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    // Check if input file exists
    if !input.exists() {
        return Err(format!("Input file '{}' does not exist", input.display()).into());
    }

    // Check if output file exists and force flag
    if output.exists() && !force {
        return Err(format!(
            "Output file '{}' already exists. Use --force to overwrite",
            output.display()
        )
        .into());
    }

    if verbose {
        println!("Unpacking '{}' to '{}'", input.display(), output.display());
        println!("LZW codes: {:?}", mode);
    }

    let start_time = Instant::now();

    let packed = fs::read(input)?;
    let input_size = packed.len();

    let unpacked = unpack_data(&packed, mode, retry_alt_lzw)
        .map_err(|e| format!("Decompression failed: {}", e))?;

    fs::write(output, &unpacked)?;

    let elapsed = start_time.elapsed();
    let output_size = unpacked.len();

    if !quiet {
        println!("✓ Unpacking successful!");
        println!("  Input:  {} bytes", input_size);
        println!("  Output: {} bytes", output_size);
        if output_size > 0 {
            println!(
                "  Ratio:  {:.1}%",
                (input_size as f64 / output_size as f64) * 100.0
            );
        }
        println!("  Time:   {:.2?}", elapsed);
    }

    Ok(())
}

fn unpack_batch(
    inputs: &[PathBuf],
    out_dir: &Path,
    mode: LzwMode,
    force: bool,
    quiet: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    fs::create_dir_all(out_dir)?;

    let progress = if quiet {
        ProgressBar::hidden()
    } else {
        let pb = ProgressBar::new(inputs.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}")?
                .progress_chars("#>-"),
        );
        pb
    };

    let mut failures = Vec::new();
    for input in inputs {
        let name = input
            .file_name()
            .ok_or_else(|| format!("'{}' has no file name", input.display()))?;
        progress.set_message(name.to_string_lossy().into_owned());

        let output = out_dir.join(name);
        let result = if output.exists() && !force {
            Err(format!(
                "output '{}' already exists. Use --force to overwrite",
                output.display()
            )
            .into())
        } else {
            sqz::decompress_with(input, mode)
                .map_err(Box::<dyn std::error::Error>::from)
                .and_then(|data| fs::write(&output, data).map_err(Into::into))
        };

        if let Err(e) = result {
            failures.push(format!("{}: {}", input.display(), e));
        }
        progress.inc(1);
    }
    progress.finish_with_message("done");

    if !quiet {
        println!(
            "Unpacked {} of {} files into '{}'",
            inputs.len() - failures.len(),
            inputs.len(),
            out_dir.display()
        );
    }

    if failures.is_empty() {
        Ok(())
    } else {
        for failure in &failures {
            eprintln!("  ✗ {}", failure);
        }
        Err(format!("{} file(s) failed", failures.len()).into())
    }
}

fn show_file_info(input: &Path, verbose: bool) -> Result<(), Box<dyn std::error::Error>> {
    // Check if input file exists
    if !input.exists() {
        return Err(format!("Input file '{}' does not exist", input.display()).into());
    }

    let data = fs::read(input)?;
    let header = inspect(&data)?;

    println!("Packed File Information:");
    println!("  File: {}", input.display());
    println!("  Size: {} bytes", data.len());

    match &header {
        PackedHeader::Diet(diet) => {
            println!("  Container: DIET data file");
            if verbose {
                println!("  Unknown byte: {:02x}", diet.unknown);
                println!(
                    "  Checksum field: {:02x} {:02x} {:02x} {:02x}",
                    diet.checksum[0], diet.checksum[1], diet.checksum[2], diet.checksum[3]
                );
            }
        }
        PackedHeader::Container(container) => {
            println!(
                "  Container: SQZ, {} (format byte {:02x})",
                container.format(),
                container.format_byte
            );
        }
    }
    println!("  Declared Size: {} bytes", header.payload_size());

    if verbose {
        let shown = data.len().min(header.header_len());
        let bytes: Vec<String> = data[..shown].iter().map(|b| format!("{:02x}", b)).collect();
        println!("  Header bytes: {}", bytes.join(" "));
    }

    // Try the full decode with both LZW code assignments
    match unpack_data(&data, LzwMode::Standard, true) {
        Ok(unpacked) => {
            println!("  Decompressed Size: {} bytes", unpacked.len());
            println!("  Status: ✓ Valid packed file");
        }
        Err(e) => {
            println!("  Status: ✗ Invalid or corrupted packed file");
            if verbose {
                println!("  Error: {}", e);
            }
        }
    }

    Ok(())
}
