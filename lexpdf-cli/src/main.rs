use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use lexpdf::parser::{find_trailer_offset, load_source, LexerOptions, Token, Tokenizer};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(
    name = "lexpdf",
    about = "Inspect the lexical structure of PDF files",
    version,
    author
)]
struct Cli {
    /// Log scanner decisions (overrides RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the token stream of a file, one token per line
    Tokens {
        /// Input PDF file
        input: PathBuf,

        /// Byte offset to start tokenizing from
        #[arg(short, long, default_value_t = 0)]
        seek: usize,

        /// Use content stream character classes
        #[arg(short, long)]
        content_stream: bool,

        /// Stop after this many tokens
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Print the byte offset of the primary xref section
    XrefOffset {
        /// Input PDF file
        input: PathBuf,
    },
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}

fn render(token: &Token) -> String {
    match token {
        Token::StreamBody(bytes) => format!("[stream body: {} bytes]", bytes.len()),
        Token::EmptyName => "[empty name]".to_string(),
        other => other.to_string(),
    }
}

fn print_tokens(
    input: &Path,
    options: LexerOptions,
    limit: Option<usize>,
) -> Result<()> {
    let file = File::open(input).with_context(|| format!("Failed to open {}", input.display()))?;
    let data = load_source(file).with_context(|| format!("Failed to read {}", input.display()))?;
    info!(bytes = data.len(), ?options, "tokenizing");

    let mut tokenizer = Tokenizer::with_options(&data, options);
    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());

    let mut count = 0usize;
    while limit.map_or(true, |limit| count < limit) {
        let Some(token) = tokenizer.next_token() else {
            break;
        };
        writeln!(out, "{}", render(&token))?;
        count += 1;
    }
    out.flush()?;

    info!(count, "done");
    Ok(())
}

fn print_xref_offset(input: &Path) -> Result<()> {
    let mut file =
        File::open(input).with_context(|| format!("Failed to open {}", input.display()))?;
    let offset = find_trailer_offset(&mut file)
        .with_context(|| format!("Could not locate xref offset in {}", input.display()))?;
    println!("{offset}");
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Tokens {
            input,
            seek,
            content_stream,
            limit,
        } => {
            let options = LexerOptions::default()
                .with_seek(seek)
                .with_content_stream(content_stream);
            print_tokens(&input, options, limit)?;
        }

        Commands::XrefOffset { input } => {
            print_xref_offset(&input)?;
        }
    }

    Ok(())
}
