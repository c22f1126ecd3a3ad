//! Stock Insight CLI
//!
//! Answers a single query, or runs an interactive session when no query is
//! given.
//!
//! # Usage
//!
//! ```bash
//! export GEMINI_API_KEY="..."
//! export ALPHA_VANTAGE_API_KEY="..."   # optional, enables fundamentals
//!
//! cargo run --bin stock-insight -- "Give me a full analysis of TSLA"
//! cargo run --bin stock-insight -- --image chart.png "What does this chart show?"
//! cargo run --bin stock-insight -- --document q1-results.md
//! cargo run --bin stock-insight
//! ```

use anyhow::Context;
use clap::Parser;
use insight_llm::GeminiProvider;
use insight_utils::{LogConfig, LogFormat, init_tracing_with};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;
use stock_insight::{
    AlphaVantageFundamentals, DocumentAttachment, Formatter, ImageAttachment, InsightConfig,
    InsightEngine, JsonFormatter, TextFormatter, Ticker, UserInput, YahooMarketData,
};
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "stock-insight")]
#[command(about = "Multi-agent stock analysis: prices, full reports, charts and documents", long_about = None)]
struct Args {
    /// Question to answer; starts an interactive session when omitted
    query: Option<String>,

    /// Chart image to read (PNG, JPEG, GIF or WebP)
    #[arg(long)]
    image: Option<PathBuf>,

    /// Plain text or Markdown document to analyse
    #[arg(long)]
    document: Option<PathBuf>,

    /// Title of the document, overriding its first heading
    #[arg(long, requires = "document")]
    title: Option<String>,

    /// Model used by every agent, overriding INSIGHT_MODEL
    #[arg(long)]
    model: Option<String>,

    /// Print responses as JSON
    #[arg(long)]
    json: bool,

    /// Log output format: fmt or json
    #[arg(long, default_value = "fmt")]
    log_format: LogFormat,
}

const HELP: &str = "Ask in plain language, for example:
  What's the price of AAPL?
  Give me a full analysis of TSLA
Commands:
  /image <path> [question]  - read a chart image
  /doc <path>               - analyse a document
  /help                     - show this help
  /exit                     - quit
Answer 'yes' after a chart or document to get the full report.";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing_with(&LogConfig::default().with_format(args.log_format));

    let mut config = InsightConfig::from_env()?;
    if let Some(model) = &args.model {
        config.default_model.clone_from(model);
    }

    let mut market = YahooMarketData::new(config.currency.clone());
    if let Some(key) = &config.alpha_vantage_api_key {
        market = market.with_fundamentals(AlphaVantageFundamentals::new(
            key.clone(),
            config.alpha_vantage_rate_limit,
        ));
    } else {
        info!("ALPHA_VANTAGE_API_KEY not set; reports will state that fundamentals are unavailable");
    }

    let provider = Arc::new(GeminiProvider::from_env().context("GEMINI_API_KEY or GOOGLE_API_KEY must be set")?);
    let engine = InsightEngine::new(config, provider, Arc::new(market))?;

    let formatter: Box<dyn Formatter> = if args.json {
        Box::new(JsonFormatter)
    } else {
        Box::new(TextFormatter)
    };

    let one_shot = args.query.is_some() || args.image.is_some() || args.document.is_some();
    if one_shot {
        let mut input = UserInput::default();
        input.text = args.query;
        if let Some(path) = &args.image {
            input = input.with_image(ImageAttachment::from_path(path).await?);
        }
        if let Some(path) = &args.document {
            let mut document = DocumentAttachment::from_path(path).await?;
            if args.title.is_some() {
                document = DocumentAttachment::new(args.title, document.text);
            }
            input = input.with_document(document);
        }

        return match engine.handle(&input).await {
            Ok(response) => {
                println!("{}", formatter.format_response(&response));
                Ok(())
            }
            Err(e) => {
                eprintln!("{}", formatter.format_error(&e));
                std::process::exit(1);
            }
        };
    }

    run_session(&engine, formatter.as_ref()).await
}

/// Interactive loop; remembers the ticker of the last follow-up offer
async fn run_session(engine: &InsightEngine, formatter: &dyn Formatter) -> anyhow::Result<()> {
    println!("Stock Insight. Type /help for examples, /exit to quit.\n");

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut pending: Option<Ticker> = None;

    loop {
        print!("> ");
        stdout.flush()?;

        let mut line = String::new();
        match stdin.lock().read_line(&mut line) {
            Ok(0) => {
                println!("\nGoodbye!");
                break;
            }
            Ok(_) => {}
            Err(e) => {
                eprintln!("Error reading input: {e}");
                continue;
            }
        }

        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let result = match line {
            "/exit" | "/quit" => {
                println!("Goodbye!");
                break;
            }
            "/help" => {
                println!("{HELP}\n");
                continue;
            }
            "yes" | "y" | "sure" | "yes please" if pending.is_some() => {
                let Some(ticker) = pending.take() else {
                    continue;
                };
                engine.follow_up(ticker).await
            }
            _ => match parse_line(line).await {
                Ok(input) => engine.handle(&input).await,
                Err(e) => {
                    eprintln!("Error: {e}\n");
                    continue;
                }
            },
        };

        match result {
            Ok(response) => {
                pending = response.follow_up_ticker().cloned();
                println!("{}\n", formatter.format_response(&response));
            }
            Err(e) => {
                pending = None;
                eprintln!("{}\n", formatter.format_error(&e));
            }
        }
    }

    Ok(())
}

/// Turn one session line into a request, loading attachments named by commands
async fn parse_line(line: &str) -> anyhow::Result<UserInput> {
    if let Some(rest) = line.strip_prefix("/image ") {
        let (path, question) = rest.trim().split_once(' ').unwrap_or((rest.trim(), ""));
        let image = ImageAttachment::from_path(path).await?;
        let mut input = UserInput::default().with_image(image);
        if !question.trim().is_empty() {
            input = input.with_text(question.trim());
        }
        return Ok(input);
    }
    if let Some(path) = line.strip_prefix("/doc ") {
        let document = DocumentAttachment::from_path(path.trim()).await?;
        return Ok(UserInput::default().with_document(document));
    }
    Ok(UserInput::text(line))
}

