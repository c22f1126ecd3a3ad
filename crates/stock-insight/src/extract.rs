//! Deterministic ticker extraction from free-form text
//!
//! Candidates come from three tiers, strongest first: `$CASHTAG` mentions,
//! upper-case symbol tokens, and well-known company names. Only the
//! strongest tier that yields anything is considered.

use crate::error::ResolutionError;
use crate::input::DocumentAttachment;
use crate::ticker::Ticker;
use regex::Regex;
use std::sync::LazyLock;

static CASHTAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$([A-Za-z]{1,5}(?:[.\-][A-Za-z]{1,2})?)\b").expect("cashtag pattern is valid")
});

static SYMBOL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b([A-Z]{2,5}(?:[.\-][A-Z]{1,2})?)\b").expect("symbol pattern is valid")
});

static COMPANY: LazyLock<Regex> = LazyLock::new(|| {
    let mut names: Vec<&str> = COMPANY_TICKERS.iter().map(|(name, _)| *name).collect();
    names.sort_by_key(|name| std::cmp::Reverse(name.len()));
    let alternation = names
        .iter()
        .map(|name| regex::escape(name))
        .collect::<Vec<_>>()
        .join("|");
    Regex::new(&format!(r"(?i)\b(?:{alternation})\b")).expect("company pattern is valid")
});

/// Upper-case words that look like symbols but are not
const STOPWORDS: &[&str] = &[
    "AI", "AM", "AN", "AND", "ARE", "AS", "AT", "BE", "BUY", "BY", "CAN", "CEO", "CFO", "COO",
    "CORP", "CTO", "DO", "EBIT", "EPS", "ESG", "ETF", "EU", "FAQ", "FOR", "FY", "GAAP", "GDP",
    "HOW", "IF", "IN", "INC", "IPO", "IS", "IT", "ITS", "LLC", "LTD", "ME", "MY", "NA", "NM",
    "NO", "NOT", "NYSE", "OF", "OK", "ON", "OR", "PE", "PM", "PRICE", "QOQ", "ROA", "ROE",
    "ROI", "SEC", "SELL", "SO", "THE", "TO", "TTM", "UK", "UP", "US", "USA", "USD", "VS", "WE",
    "WHAT", "YES", "YOY", "YTD",
];

/// Company names recognised without a symbol, lower-case
const COMPANY_TICKERS: &[(&str, &str)] = &[
    ("apple", "AAPL"),
    ("microsoft", "MSFT"),
    ("tesla", "TSLA"),
    ("amazon", "AMZN"),
    ("alphabet", "GOOGL"),
    ("google", "GOOGL"),
    ("meta platforms", "META"),
    ("meta", "META"),
    ("facebook", "META"),
    ("nvidia", "NVDA"),
    ("netflix", "NFLX"),
    ("berkshire hathaway", "BRK-B"),
    ("jpmorgan", "JPM"),
    ("jp morgan", "JPM"),
    ("walmart", "WMT"),
    ("coca-cola", "KO"),
    ("disney", "DIS"),
    ("intel", "INTC"),
    ("amd", "AMD"),
    ("advanced micro devices", "AMD"),
    ("oracle", "ORCL"),
    ("salesforce", "CRM"),
    ("adobe", "ADBE"),
    ("ibm", "IBM"),
    ("exxon mobil", "XOM"),
    ("exxonmobil", "XOM"),
    ("johnson & johnson", "JNJ"),
    ("procter & gamble", "PG"),
    ("visa", "V"),
    ("mastercard", "MA"),
    ("boeing", "BA"),
    ("pfizer", "PFE"),
    ("nike", "NKE"),
    ("starbucks", "SBUX"),
    ("mcdonald's", "MCD"),
    ("paypal", "PYPL"),
    ("uber", "UBER"),
    ("palantir", "PLTR"),
    ("broadcom", "AVGO"),
];

/// Which extraction tier produced a candidate
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Tier {
    Cashtag,
    Symbol,
    CompanyName,
}

/// A ticker mention found in text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub ticker: Ticker,
    pub tier: Tier,
    pub position: usize,
}

/// Every candidate in `text`, ordered by position
pub fn candidates(text: &str) -> Vec<Candidate> {
    let mut found = Vec::new();

    for caps in CASHTAG.captures_iter(text) {
        let (Some(whole), Some(symbol)) = (caps.get(0), caps.get(1)) else { continue };
        if let Ok(ticker) = Ticker::parse(symbol.as_str()) {
            found.push(Candidate { ticker, tier: Tier::Cashtag, position: whole.start() });
        }
    }

    for caps in SYMBOL.captures_iter(text) {
        let Some(symbol) = caps.get(1) else { continue };
        let preceded_by_dollar = text[..symbol.start()].ends_with('$');
        if preceded_by_dollar || STOPWORDS.contains(&symbol.as_str()) {
            continue;
        }
        if let Ok(ticker) = Ticker::parse(symbol.as_str()) {
            found.push(Candidate { ticker, tier: Tier::Symbol, position: symbol.start() });
        }
    }

    for m in COMPANY.find_iter(text) {
        let name = m.as_str().to_lowercase();
        let ticker = COMPANY_TICKERS
            .iter()
            .find(|(known, _)| *known == name)
            .and_then(|(_, symbol)| Ticker::parse(symbol).ok());
        if let Some(ticker) = ticker {
            found.push(Candidate { ticker, tier: Tier::CompanyName, position: m.start() });
        }
    }

    found.sort_by_key(|c| c.position);
    found
}

/// Distinct tickers from the strongest tier present, in order of first mention
pub fn strongest(text: &str) -> Vec<Ticker> {
    strongest_of(candidates(text))
}

/// Like [`strongest`], for something a user typed or said
///
/// Casing carries no signal in a multi-word utterance without lower-case
/// letters, so its upper-case words are not taken as symbols there.
pub fn strongest_in_utterance(text: &str) -> Vec<Ticker> {
    let mut found = candidates(text);
    if is_shouted(text) {
        found.retain(|c| c.tier != Tier::Symbol);
    }
    strongest_of(found)
}

fn is_shouted(text: &str) -> bool {
    !text.chars().any(char::is_lowercase) && text.split_whitespace().nth(1).is_some()
}

fn strongest_of(found: Vec<Candidate>) -> Vec<Ticker> {
    let Some(best) = found.iter().map(|c| c.tier).min() else {
        return Vec::new();
    };

    let mut tickers: Vec<Ticker> = Vec::new();
    for candidate in found.into_iter().filter(|c| c.tier == best) {
        if !tickers.contains(&candidate.ticker) {
            tickers.push(candidate.ticker);
        }
    }
    tickers
}

/// Resolve a single ticker from a message or transcript
///
/// `Ok(None)` means nothing was found; several distinct candidates in the
/// strongest tier are ambiguous.
pub fn resolve_text(text: &str) -> Result<Option<Ticker>, ResolutionError> {
    let mut tickers = strongest_in_utterance(text);
    match tickers.len() {
        0 => Ok(None),
        1 => Ok(tickers.pop()),
        _ => Err(ResolutionError::Ambiguous {
            candidates: tickers.into_iter().map(String::from).collect(),
        }),
    }
}

/// Resolve the subject of a document: title first, then the first mention in the body
pub fn resolve_document(document: &DocumentAttachment) -> Option<Ticker> {
    document
        .title
        .as_deref()
        .and_then(|title| strongest(title).into_iter().next())
        .or_else(|| strongest(&document.text).into_iter().next())
}
