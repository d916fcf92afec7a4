use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand};
use regsnap_core::message::arm::encode_stub;
use regsnap_core::message::{encode_payload, FRAME_PREFIX};
use regsnap_core::patch::{arm, find_empty_space, thumb, write_patch, write_stub};
use regsnap_core::scan::{scan_bytes, scan_object, FoundMessage};
use regsnap_core::snapshot::fields_for;
use regsnap_core::{AnySnapshot, Architecture};
use regsnap_utils::hex::{hex_bytes, hex_words, hexdump, parse_number, parse_size};
use regsnap_utils::{debug, info, init_logging_with_config, LogConfig, LogLevel};

type CliResult<T> = Result<T, Box<dyn Error>>;

/// Inspect trap-time register snapshots and manage no$gba-style debug message stubs.
#[derive(Parser, Debug)]
#[command(name = "regsnap")]
#[command(version)]
#[command(about = "Inspect register snapshot layouts and debug message stubs", long_about = None)]
struct Cli
{
    /// Increase log verbosity (-v debug, -vv trace); overrides RUST_LOG
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands
{
    /// Print the register snapshot layout (offset, size, kind, aliases)
    Layout
    {
        /// Architecture to show (default: all four)
        #[arg(short, long)]
        arch: Option<Architecture>,
    },
    /// Decode a raw register snapshot dump and print every register
    Decode
    {
        /// Architecture the dump was taken on
        #[arg(short, long, default_value_t = Architecture::current())]
        arch: Architecture,
        /// Byte offset of the snapshot inside the file (hex or decimal)
        #[arg(long, default_value = "0", value_parser = parse_size)]
        offset: usize,
        /// Dump file
        file: PathBuf,
    },
    /// Encode a debug message as an ARM stub and print it as hex
    Encode
    {
        /// Print only the payload (tag, text, padding) without marker and branch
        #[arg(long, default_value_t = false)]
        payload_only: bool,
        /// Do not prepend the "%frame%: " prefix the injector adds
        #[arg(long, default_value_t = false)]
        no_frame: bool,
        /// Message text
        text: String,
    },
    /// List debug messages embedded in an object file or raw image
    Scan
    {
        /// Treat the file as a raw image instead of parsing it as an object file
        #[arg(long, default_value_t = false)]
        raw: bool,
        /// Load address of the first byte of a raw image (hex or decimal)
        #[arg(long, default_value = "0", value_parser = parse_number, requires = "raw")]
        base: u64,
        /// File to scan
        file: PathBuf,
    },
    /// List zero-filled gaps large enough to hold a stub
    Space
    {
        /// Minimum gap size in bytes
        #[arg(long, default_value = "0x100", value_parser = parse_size)]
        min_size: usize,
        /// Alignment of reported gaps (power of two)
        #[arg(long, default_value = "0x10", value_parser = parse_size)]
        align: usize,
        /// Image to search
        file: PathBuf,
    },
    /// Write a debug message stub into an image
    Patch
    {
        /// File offset to write at (4-byte aligned, hex or decimal)
        #[arg(long, value_parser = parse_size)]
        offset: usize,
        /// Message text
        #[arg(short, long)]
        message: String,
        /// Do not prepend the "%frame%: " prefix the injector adds
        #[arg(long, default_value_t = false)]
        no_frame: bool,
        /// Output file (default: patch the input in place)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Image to patch
        file: PathBuf,
    },
    /// Overwrite code with a jump or call to another address
    Redirect
    {
        /// File offset of the patched instruction (hex or decimal)
        #[arg(long, value_parser = parse_size)]
        offset: usize,
        /// Destination address (hex or decimal)
        #[arg(long, value_parser = parse_number)]
        to: u64,
        /// Load address of the first byte of the image
        #[arg(long, default_value = "0", value_parser = parse_number)]
        base: u64,
        /// Emit a call that returns after the patch instead of a jump
        #[arg(long, default_value_t = false)]
        call: bool,
        /// Patch Thumb code instead of A32
        #[arg(long, default_value_t = false)]
        thumb: bool,
        /// Output file (default: patch the input in place)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Image to patch
        file: PathBuf,
    },
}

fn main()
{
    let cli = Cli::parse();

    // REGSNAP_LOG_FORMAT / REGSNAP_LOG_FILE from the environment, -v on top
    let config = match LogConfig::from_env() {
        Ok(config) => config.with_level(LogLevel::from_verbosity(cli.verbose)),
        Err(e) => {
            eprintln!("Failed to initialize logging: {}", e);
            process::exit(1);
        }
    };
    let _log_guard = match init_logging_with_config(&config) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {}", e);
            process::exit(1);
        }
    };

    if let Err(e) = run_command(cli.command) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run_command(command: Commands) -> CliResult<()>
{
    match command {
        Commands::Layout { arch } => {
            match arch {
                Some(arch) => print_layout(arch),
                None => {
                    for (index, arch) in Architecture::ALL.into_iter().enumerate() {
                        if index > 0 {
                            println!();
                        }
                        print_layout(arch);
                    }
                }
            }
            Ok(())
        }
        Commands::Decode { arch, offset, file } => {
            let data = read_file(&file)?;
            let bytes = data.get(offset..).ok_or_else(|| {
                format!("offset {offset:#x} is past the end of {} ({} bytes)", file.display(), data.len())
            })?;
            let snapshot = AnySnapshot::decode(arch, bytes)?;
            print_snapshot(&snapshot);
            Ok(())
        }
        Commands::Encode {
            payload_only,
            no_frame,
            text,
        } => {
            let text = message_text(&text, no_frame);
            let bytes = if payload_only {
                encode_payload(&text)?
            } else {
                encode_stub(&text)?
            };
            debug!(len = bytes.len(), payload_only, "encoded debug message");
            println!("{}", hex_words(&bytes).join(" "));
            print!("{}", hexdump(&bytes, 0));
            Ok(())
        }
        Commands::Scan { raw, base, file } => {
            let data = read_file(&file)?;
            let found = if raw {
                scan_bytes(&data, base)
            } else {
                scan_object(&data)?
            };
            info!(messages = found.len(), file = %file.display(), "scan complete");
            print_found(&found);
            Ok(())
        }
        Commands::Space {
            min_size,
            align,
            file,
        } => {
            let data = read_file(&file)?;
            let spaces = find_empty_space(&data, min_size, align)?;
            if spaces.is_empty() {
                println!("No zero-filled gaps of at least {min_size} bytes");
                return Ok(());
            }
            println!("{:>10}  {:>8}", "OFFSET", "SIZE");
            for space in spaces {
                println!("{:#010x}  {:>8}", space.offset, space.size);
            }
            Ok(())
        }
        Commands::Patch {
            offset,
            message,
            no_frame,
            output,
            file,
        } => {
            let mut image = read_file(&file)?;
            let text = message_text(&message, no_frame);
            let written = write_stub(&mut image, offset, &text)?;

            let target = output.unwrap_or(file);
            fs::write(&target, &image).map_err(|e| format!("cannot write {}: {e}", target.display()))?;
            info!(offset, written, output = %target.display(), "patched image");
            println!("Wrote {written}-byte stub at {offset:#x} to {}", target.display());
            Ok(())
        }
        Commands::Redirect {
            offset,
            to,
            base,
            call,
            thumb: thumb_mode,
            output,
            file,
        } => {
            let from = u32::try_from(base.wrapping_add(offset as u64))
                .map_err(|_| format!("patch address for offset {offset:#x} does not fit in 32 bits"))?;
            let to = u32::try_from(to).map_err(|_| format!("destination {to:#x} does not fit in 32 bits"))?;

            let (bytes, align) = match (thumb_mode, call) {
                (false, false) => (arm::jump_patch(from, to), 4),
                (false, true) => (arm::call_patch(from, to), 4),
                (true, false) => (thumb::jump_patch(from, to), 2),
                (true, true) => (thumb::call_patch(from, to), 2),
            };

            let mut image = read_file(&file)?;
            let written = write_patch(&mut image, offset, &bytes, align)?;
            let target = output.unwrap_or(file);
            fs::write(&target, &image).map_err(|e| format!("cannot write {}: {e}", target.display()))?;
            info!(from, to, written, call, thumb = thumb_mode, "redirected code");
            println!("{}", hex_bytes(&bytes));
            println!("Wrote {written}-byte patch at {offset:#x} ({from:#010x} -> {to:#010x}) to {}", target.display());
            Ok(())
        }
    }
}

fn read_file(path: &Path) -> CliResult<Vec<u8>>
{
    let data = fs::read(path).map_err(|e| format!("cannot read {}: {e}", path.display()))?;
    debug!(path = %path.display(), len = data.len(), "read input file");
    Ok(data)
}

fn message_text(text: &str, no_frame: bool) -> String
{
    if no_frame {
        text.to_string()
    } else {
        format!("{FRAME_PREFIX}{text}")
    }
}

fn print_layout(arch: Architecture)
{
    println!("{arch} ({} bytes)", arch.snapshot_size());
    println!("  {:>6}  {:>4}  {:<8}  {:<8}  ALIASES", "OFFSET", "SIZE", "KIND", "NAME");
    for field in fields_for(arch) {
        println!(
            "  {:>6}  {:>4}  {:<8}  {:<8}  {}",
            field.offset,
            field.size,
            field.kind.to_string(),
            field.name,
            field.aliases.join(", ")
        );
    }
}

fn print_snapshot(snapshot: &AnySnapshot)
{
    println!("{} snapshot", snapshot.architecture());
    for (field, value) in snapshot.values() {
        if field.aliases.is_empty() {
            println!("  {:<8} {value}", field.name);
        } else {
            println!("  {:<8} {value}  ({})", field.name, field.aliases.join(", "));
        }
    }
    println!("  sp       {:#x}", snapshot.stack_pointer());
    println!("  flags    {:#x}", snapshot.flags());
}

fn print_found(found: &[FoundMessage])
{
    if found.is_empty() {
        println!("No debug messages found");
        return;
    }
    for hit in found {
        match &hit.symbol {
            Some(symbol) => println!("{:#010x}  {symbol}: {}", hit.address, hit.message),
            None => println!("{:#010x}  {}", hit.address, hit.message),
        }
    }
}
