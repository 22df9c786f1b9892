//! WaddleMap CLI Client
//!
//! Command-line interface for interacting with a WaddleMap server.

use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};
use waddlemap::{BlockData, Client, ClientConfig, DistanceMetric, KeywordMode, SearchResultItem};

/// WaddleMap CLI
#[derive(Parser, Debug)]
#[command(name = "waddle-cli")]
#[command(about = "CLI for the WaddleMap block and vector store")]
#[command(version)]
struct Args {
    /// Server address
    #[arg(short, long, default_value = "127.0.0.1:6969")]
    server: String,

    /// Read timeout in milliseconds (0 = wait forever)
    #[arg(long, default_value = "0")]
    timeout_ms: u64,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List collections
    Collections,

    /// Create a collection
    CreateCollection {
        name: String,

        /// Vector dimensions (0 = no vectors)
        #[arg(short, long, default_value = "0")]
        dimensions: u32,

        /// Distance metric (l2, cosine, ip)
        #[arg(short, long, default_value = "l2")]
        metric: DistanceMetric,
    },

    /// Delete a collection and everything in it
    DeleteCollection { name: String },

    /// Append a block to a key
    Append {
        collection: String,
        key: String,
        primary: String,

        /// Comma-separated vector components
        #[arg(short, long, value_delimiter = ',', allow_negative_numbers = true)]
        vector: Option<Vec<f32>>,

        /// Comma-separated keywords
        #[arg(short, long, value_delimiter = ',')]
        keywords: Vec<String>,
    },

    /// Get a block by index
    Get {
        collection: String,
        key: String,
        index: u32,
    },

    /// Get a block and the one after it
    Next {
        collection: String,
        key: String,
        index: u32,
    },

    /// Get a block and the one before it
    Prev {
        collection: String,
        key: String,
        index: u32,
    },

    /// List keys of a collection
    Keys { collection: String },

    /// Check whether a key exists
    Contains { collection: String, key: String },

    /// Delete a key and its blocks
    DeleteKey { collection: String, key: String },

    /// Vector search
    Search {
        collection: String,

        /// Comma-separated query vector
        #[arg(required = true, value_delimiter = ',', allow_negative_numbers = true)]
        query: Vec<f32>,

        #[arg(short = 'k', long, default_value = "10")]
        top_k: u32,

        /// Comma-separated keyword filter
        #[arg(long, value_delimiter = ',')]
        keywords: Vec<String>,

        /// Keyword mode (exact, prefix, partial, levenshtein[:n])
        #[arg(long, default_value = "exact")]
        mode: KeywordMode,
    },

    /// Keys whose blocks match keywords
    KeywordSearch {
        collection: String,

        #[arg(required = true)]
        keywords: Vec<String>,

        #[arg(long, default_value = "exact")]
        mode: KeywordMode,
    },
}

fn main() {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn,waddlemap=info"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let config = ClientConfig::builder()
        .addr(&args.server)
        .read_timeout_ms(args.timeout_ms)
        .build();

    let mut client = match Client::connect(config) {
        Ok(c) => c,
        Err(e) => {
            tracing::error!("Failed to connect to {}: {}", args.server, e);
            std::process::exit(1);
        }
    };

    let outcome = run(&mut client, args.command);
    let _ = client.close();

    if let Err(e) = outcome {
        tracing::error!("{}", e);
        std::process::exit(1);
    }
}

fn run(client: &mut Client, command: Commands) -> waddlemap::Result<()> {
    match command {
        Commands::Collections => {
            for info in client.list_collections()? {
                println!("{}\tdims={}\tmetric={}", info.name, info.dimensions, info.metric);
            }
        }
        Commands::CreateCollection {
            name,
            dimensions,
            metric,
        } => {
            client.create_collection(&name, dimensions, metric)?;
            println!("OK");
        }
        Commands::DeleteCollection { name } => {
            client.delete_collection(&name)?;
            println!("OK");
        }
        Commands::Append {
            collection,
            key,
            primary,
            vector,
            keywords,
        } => {
            let mut block = BlockData::new(primary).with_keywords(keywords);
            block.vector = vector;
            let index = client.collection(&collection).append_block(&key, block)?;
            println!("{}", index);
        }
        Commands::Get { collection, key, index } => {
            let block = client.collection(&collection).get_block(&key, index)?;
            print_block(index, &block);
        }
        Commands::Next { collection, key, index } => {
            let blocks = client.collection(&collection).get_next_block(&key, index)?;
            for (i, block) in block_indices(index, blocks.len()).zip(&blocks) {
                print_block(i, block);
            }
        }
        Commands::Prev { collection, key, index } => {
            let blocks = client.collection(&collection).get_previous_block(&key, index)?;
            let first = previous_first(index, blocks.len());
            for (i, block) in block_indices(first, blocks.len()).zip(&blocks) {
                print_block(i, block);
            }
        }
        Commands::Keys { collection } => {
            for key in client.collection(&collection).list_keys()? {
                println!("{}", key);
            }
        }
        Commands::Contains { collection, key } => {
            println!("{}", client.collection(&collection).contains_key(&key)?);
        }
        Commands::DeleteKey { collection, key } => {
            client.collection(&collection).delete_key(&key)?;
            println!("OK");
        }
        Commands::Search {
            collection,
            query,
            top_k,
            keywords,
            mode,
        } => {
            let hits = client
                .collection(&collection)
                .search(&query, top_k, keywords.as_slice(), mode)?;
            for hit in &hits {
                print_hit(hit);
            }
        }
        Commands::KeywordSearch {
            collection,
            keywords,
            mode,
        } => {
            for key in client.collection(&collection).keyword_search(keywords.as_slice(), mode)? {
                println!("{}", key);
            }
        }
    }
    Ok(())
}

/// Indices of `count` consecutive blocks starting at `first`, stopping at `u32::MAX`
fn block_indices(first: u32, count: usize) -> impl Iterator<Item = u32> {
    (first..=u32::MAX).take(count)
}

/// Index of the first of `count` blocks ending at `index`
fn previous_first(index: u32, count: usize) -> u32 {
    index.saturating_sub(count.saturating_sub(1) as u32)
}

fn print_block(index: u32, block: &BlockData) {
    let primary = String::from_utf8_lossy(&block.primary);
    println!("[{}] {}", index, primary);
    if let Some(vector) = &block.vector {
        println!("    vector: {:?}", vector);
    }
    if !block.keywords.is_empty() {
        println!("    keywords: {}", block.keywords.join(","));
    }
}

fn print_hit(hit: &SearchResultItem) {
    let primary = hit
        .block
        .as_ref()
        .map(|b| String::from_utf8_lossy(&b.primary).into_owned())
        .unwrap_or_default();
    println!("{:.6}\t{}[{}]\t{}", hit.distance, hit.key, hit.index, primary);
}
