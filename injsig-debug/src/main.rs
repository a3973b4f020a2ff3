//! Inspection CLI: runs one input through the detection pipeline and prints
//! every intermediate stage, for tuning fingerprints and debugging verdicts.

use std::fs;
use std::io::{self, Read};

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use tracing::debug;

use injsig::sqli::fold;
use injsig::sqli::tokenizer::Tokenizer;
use injsig::xss;
use injsig::{HtmlContext, SqliFlags};

#[derive(Parser, Debug)]
#[command(name = "injsig-debug", version, about = "Trace injsig detection verdicts")]
struct Args {
    /// Input to analyze; reads stdin when absent and --file is not given.
    input: Option<String>,

    /// Treat the input string as hex-encoded bytes.
    #[arg(long)]
    hex: bool,

    /// Read the input from a file instead of the command line.
    #[arg(long, conflicts_with = "input")]
    file: Option<String>,

    /// Dump the token stream of every SQLi pass.
    #[arg(long)]
    tokens: bool,

    /// Only run the SQLi pipeline.
    #[arg(long, conflicts_with = "xss_only")]
    sqli_only: bool,

    /// Only run the XSS pipeline.
    #[arg(long)]
    xss_only: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    let input = read_input(&args)?;
    debug!(len = input.len(), "analyzing input");

    println!("{} {} bytes", "input:".bold(), input.len());
    println!("  {}", String::from_utf8_lossy(&input));
    if input.iter().any(|b| !b.is_ascii_graphic() && *b != b' ') {
        println!("  {} {}", "hex:".dimmed(), hex::encode(&input));
    }
    println!();

    if !args.xss_only {
        report_sqli(&input, args.tokens);
    }
    if !args.sqli_only {
        report_xss(&input);
    }
    Ok(())
}

fn read_input(args: &Args) -> Result<Vec<u8>> {
    let raw = if let Some(path) = &args.file {
        fs::read(path).with_context(|| format!("reading {path}"))?
    } else if let Some(input) = &args.input {
        input.clone().into_bytes()
    } else {
        let mut buf = Vec::new();
        io::stdin()
            .read_to_end(&mut buf)
            .context("reading stdin")?;
        buf
    };

    if args.hex {
        let text = String::from_utf8(raw).context("hex input must be ASCII")?;
        hex::decode(text.trim()).context("decoding hex input")
    } else {
        Ok(raw)
    }
}

fn report_sqli(input: &[u8], dump_tokens: bool) {
    let result = injsig::detect_sqli(input);
    let verdict = if result.is_sqli {
        "SQLI".red().bold()
    } else {
        "safe".green()
    };
    println!(
        "{} {}  fingerprint={}",
        "sqli:".bold(),
        verdict,
        result.fingerprint.as_str().yellow()
    );

    let contexts = [
        ("none/ansi", SqliFlags::QUOTE_NONE | SqliFlags::SQL_ANSI),
        ("none/mysql", SqliFlags::QUOTE_NONE | SqliFlags::SQL_MYSQL),
        ("single/ansi", SqliFlags::QUOTE_SINGLE | SqliFlags::SQL_ANSI),
        ("single/mysql", SqliFlags::QUOTE_SINGLE | SqliFlags::SQL_MYSQL),
        ("double/mysql", SqliFlags::QUOTE_DOUBLE | SqliFlags::SQL_MYSQL),
    ];
    for (name, flags) in contexts {
        let pass = injsig::detect_sqli_with_flags(input, flags);
        let mark = if pass.is_sqli { "!".red().bold() } else { " ".normal() };
        println!(
            "  {mark} {:<13} {}",
            name,
            pass.fingerprint.as_str().yellow()
        );
        if dump_tokens {
            dump_pass_tokens(input, flags);
        }
    }
    println!();
}

fn dump_pass_tokens(input: &[u8], flags: SqliFlags) {
    let mut tokenizer = Tokenizer::new(input, flags);
    let folded = fold::fold(&mut tokenizer);
    for token in &folded.tokens {
        println!(
            "      {} pos={:<4} {:?}",
            (token.kind.code() as char).to_string().cyan(),
            token.pos,
            String::from_utf8_lossy(&token.val)
        );
    }
    println!(
        "      {} raw tokens, {} folds",
        folded.total_tokens, folded.folds
    );
}

fn report_xss(input: &[u8]) {
    let verdict = if injsig::detect_xss(input).is_xss() {
        "XSS".red().bold()
    } else {
        "safe".green()
    };
    println!("{} {}", "xss:".bold(), verdict);

    let contexts = [
        ("data", HtmlContext::Data),
        ("value-noquote", HtmlContext::ValueNoQuote),
        ("value-single", HtmlContext::ValueSingleQuote),
        ("value-double", HtmlContext::ValueDoubleQuote),
        ("value-backtick", HtmlContext::ValueBackQuote),
    ];
    for (name, context) in contexts {
        let hit = injsig::detect_xss_in_context(input, context);
        let mark = if hit { "!".red().bold() } else { " ".normal() };
        println!("  {mark} {name}");
    }
}
