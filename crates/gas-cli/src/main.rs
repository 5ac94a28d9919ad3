//! gas: inspect and validate GAS files.

use std::fs::File;
use std::io::{self, BufReader, Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueHint};
use gas::limits::{DEFAULT_MAX_DEPTH, DEFAULT_MAX_LENGTH};
use gas::{digest_encoded, dump_string, encode_chunk, hexdump, ChunkStream, DecodeOptions};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "gas",
    version,
    about = "Inspect and validate GAS (Generic Attribute Structure) files",
    after_help = r#"EXAMPLES
  $ gas dump tree.gas
  $ cat tree.gas | gas check
  $ gas --max-length 1048576 hex big.gas

Set RUST_LOG=gas=trace to log every chunk as it is decoded."#,
    arg_required_else_help = true
)]
struct Cli {
    #[arg(
        long,
        global = true,
        default_value_t = DEFAULT_MAX_LENGTH,
        help = "Largest accepted length field (sizes, counts, byte strings)"
    )]
    max_length: usize,
    #[arg(
        long,
        global = true,
        default_value_t = DEFAULT_MAX_DEPTH,
        help = "Deepest accepted nesting below a root chunk"
    )]
    max_depth: usize,
    #[arg(long, global = true, help = "Reject chunks that repeat an attribute key")]
    strict: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print every chunk in the input as an indented tree.
    Dump {
        #[arg(default_value = "-", value_hint = ValueHint::FilePath, help = "Input file, or - for stdin")]
        file: PathBuf,
    },
    /// Parse every chunk, re-encode it and report whether the input was canonical.
    Check {
        #[arg(default_value = "-", value_hint = ValueHint::FilePath, help = "Input file, or - for stdin")]
        file: PathBuf,
    },
    /// Hex dump of the raw input.
    Hex {
        #[arg(default_value = "-", value_hint = ValueHint::FilePath, help = "Input file, or - for stdin")]
        file: PathBuf,
    },
}

impl Cli {
    fn decode_options(&self) -> DecodeOptions {
        let options = if self.strict {
            DecodeOptions::strict()
        } else {
            DecodeOptions::new()
        };
        options
            .with_max_length(self.max_length)
            .with_max_depth(self.max_depth)
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let options = cli.decode_options();

    match &cli.command {
        Command::Dump { file } => cmd_dump(file, options),
        Command::Check { file } => cmd_check(file, options),
        Command::Hex { file } => cmd_hex(file),
    }
}

fn open_input(path: &Path) -> Result<Box<dyn Read>> {
    if path.as_os_str() == "-" {
        return Ok(Box::new(io::stdin().lock()));
    }
    let file = File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    Ok(Box::new(file))
}

fn read_input(path: &Path) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();
    open_input(path)?
        .read_to_end(&mut bytes)
        .with_context(|| format!("failed to read {}", path.display()))?;
    Ok(bytes)
}

// ── Subcommand handlers ─────────────────────────────────────────────────────

fn cmd_dump(path: &Path, options: DecodeOptions) -> Result<()> {
    let mut stream = ChunkStream::with_options(BufReader::new(open_input(path)?), options);
    let mut out = io::stdout().lock();
    let mut index = 0usize;
    while let Some(chunk) = stream.next() {
        let chunk = chunk.with_context(|| {
            format!("chunk {} in {}: decode failed at byte {}", index, path.display(), stream.position())
        })?;
        out.write_all(dump_string(&chunk).as_bytes())?;
        index += 1;
    }
    tracing::debug!(chunks = index, bytes = stream.position(), "dump finished");
    Ok(())
}

fn cmd_check(path: &Path, options: DecodeOptions) -> Result<()> {
    let bytes = read_input(path)?;
    let mut stream = ChunkStream::with_options(&bytes[..], options);
    let mut out = io::stdout().lock();

    let mut count = 0usize;
    let mut non_canonical = 0usize;
    let mut start = 0usize;
    while let Some(chunk) = stream.next() {
        let mut chunk = chunk.with_context(|| {
            format!("chunk {} in {}: decode failed at byte {}", count, path.display(), stream.position())
        })?;
        let end = stream.position() as usize;
        let encoded = encode_chunk(&mut chunk);
        let canonical = encoded == bytes[start..end];
        if !canonical {
            non_canonical += 1;
        }
        let digest: String = digest_encoded(&encoded)
            .iter()
            .map(|b| format!("{:02x}", b))
            .collect();
        writeln!(
            out,
            "{:>4}  {:>8}  {:>6}  {}  {}",
            count,
            start,
            end - start,
            if canonical { "canonical    " } else { "non-canonical" },
            digest
        )?;
        start = end;
        count += 1;
    }

    writeln!(out, "{} chunk(s), {} non-canonical", count, non_canonical)?;
    if count == 0 {
        bail!("{}: no chunks found", path.display());
    }
    Ok(())
}

fn cmd_hex(path: &Path) -> Result<()> {
    let bytes = read_input(path)?;
    let mut text = String::new();
    hexdump(&bytes, &mut text)?;
    io::stdout().lock().write_all(text.as_bytes())?;
    Ok(())
}
