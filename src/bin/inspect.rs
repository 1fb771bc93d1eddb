//! Cairn Inspector
//!
//! Command-line tool for poking at a Cairn store: decode addresses between
//! their external forms, list segment files, and fetch the bytes behind a
//! persisted address.

use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};

use cairn::address::{decode_fields, decode_text, encode_fields};
use cairn::{Config, Engine};

/// Cairn store inspector
#[derive(Parser, Debug)]
#[command(name = "cairn-inspect")]
#[command(about = "Inspect Cairn stores and decode addresses")]
#[command(version)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Decode an address from its Base64 text form
    Decode {
        /// The Base64 text form
        text: String,
    },

    /// Decode an address from its two-field decimal form (low, then high)
    Fields {
        /// The low word as a signed decimal
        low: String,

        /// The high word as a signed decimal
        high: String,
    },

    /// List the segment files of a store
    Segments {
        /// Data directory of the store
        data_dir: String,
    },

    /// Fetch the bytes behind an address (hex dump to stdout)
    Get {
        /// Data directory of the store
        data_dir: String,

        /// The address in Base64 text form
        text: String,
    },
}

fn main() {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    fmt().with_env_filter(filter).with_target(false).init();

    let args = Args::parse();

    if let Err(e) = run(args) {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}

fn run(args: Args) -> cairn::Result<()> {
    match args.command {
        Commands::Decode { text } => {
            let address = decode_text(&text)?;
            print_address(&address);
        }

        Commands::Fields { low, high } => {
            let address = decode_fields(&[low, high])?;
            print_address(&address);
        }

        Commands::Segments { data_dir } => {
            let segments_dir = std::path::Path::new(&data_dir).join("segments");
            if !segments_dir.is_dir() {
                return Err(cairn::CairnError::StorageUnavailable(format!(
                    "no segments directory at {}",
                    segments_dir.display()
                )));
            }
            let store = cairn::pagestore::FilePageStore::open(
                &segments_dir,
                Config::default().segment_size_limit,
            )?;
            for id in store.segment_ids()? {
                println!("segment_{:06}.seg", id);
            }
        }

        Commands::Get { data_dir, text } => {
            let address = decode_text(&text)?;
            let config = Config::builder().data_dir(&data_dir).build();
            let engine = Engine::open(config)?;
            let bytes = engine.get(&address)?;
            hex_dump(&bytes);
        }
    }

    Ok(())
}

/// Print every external form of an address
fn print_address(address: &cairn::Address) {
    let kind = if address.is_novelty() {
        "novelty"
    } else {
        "persisted"
    };
    let fields = encode_fields(address);

    println!("kind:   {}", kind);
    println!("high:   {:#018x} ({})", address.high(), address.high() as i64);
    println!("low:    {:#018x} ({})", address.low(), address.low() as i64);
    println!("text:   {}", address);
    println!("fields: [{}, {}]", fields[0], fields[1]);
}

/// Hex dump in 16-byte rows
fn hex_dump(bytes: &[u8]) {
    for (row, chunk) in bytes.chunks(16).enumerate() {
        let hex: Vec<String> = chunk.iter().map(|b| format!("{:02x}", b)).collect();
        let ascii: String = chunk
            .iter()
            .map(|&b| {
                if b.is_ascii_graphic() || b == b' ' {
                    b as char
                } else {
                    '.'
                }
            })
            .collect();
        println!("{:08x}  {:<47}  {}", row * 16, hex.join(" "), ascii);
    }
}
