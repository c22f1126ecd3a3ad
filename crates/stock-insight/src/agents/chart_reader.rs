//! Chart Reader: structured readings of price chart images
//!
//! The model only ever proposes a reading. Every level it reports is checked
//! against the price axis it claims to see, and anything that cannot be
//! placed on that axis is dropped. A reading that loses its support or
//! resistance in the process is reported as unreadable instead.

use super::model_failure;
use crate::error::{InsightError, Result};
use crate::input::ImageAttachment;
use crate::prompts::{PromptLibrary, user};
use crate::ticker::Ticker;
use insight_llm::image::{dimensions, encode_image};
use insight_llm::{Message, ModelAgent};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::sync::Arc;
use tracing::{debug, instrument, warn};

/// Direction of the visible price trend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    Up,
    Down,
    Sideways,
    Unclear,
}

impl Trend {
    fn parse(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "up" | "uptrend" | "upward" | "rising" | "bullish" => Self::Up,
            "down" | "downtrend" | "downward" | "falling" | "bearish" => Self::Down,
            "sideways" | "flat" | "range" | "ranging" | "consolidating" => Self::Sideways,
            _ => Self::Unclear,
        }
    }
}

/// Direction of the visible volume bars
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VolumeTrend {
    Increasing,
    Decreasing,
    Flat,
    NotVisible,
}

impl VolumeTrend {
    fn parse(raw: &str) -> Self {
        match raw.trim().to_lowercase().replace(['_', '-'], " ").as_str() {
            "increasing" | "rising" | "up" | "higher" => Self::Increasing,
            "decreasing" | "falling" | "down" | "lower" => Self::Decreasing,
            "flat" | "stable" | "steady" => Self::Flat,
            _ => Self::NotVisible,
        }
    }
}

/// Price range covered by the chart's axis labels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceRange {
    pub low: f64,
    pub high: f64,
}

impl PriceRange {
    pub fn contains(&self, price: f64) -> bool {
        price.is_finite() && price >= self.low && price <= self.high
    }
}

/// A validated reading of a legible chart
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartObservation {
    pub ticker: Ticker,
    pub timeframe: Option<String>,
    /// Rightmost price, when it lies on the visible axis
    pub price_level: Option<f64>,
    pub price_axis: PriceRange,
    pub trend: Trend,
    /// Ascending, never empty
    pub support_levels: Vec<f64>,
    /// Ascending, never empty
    pub resistance_levels: Vec<f64>,
    pub volume_trend: VolumeTrend,
    pub summary: String,
    /// Set once the user has been offered a full report for the ticker
    pub follow_up_offered: bool,
}

/// Either a reading or the reason the image could not be read, never both
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ChartReading {
    Reading(ChartObservation),
    Unreadable { error: String },
}

impl ChartReading {
    pub fn unreadable(reason: impl Into<String>) -> Self {
        Self::Unreadable {
            error: reason.into(),
        }
    }

    pub fn is_readable(&self) -> bool {
        matches!(self, Self::Reading(_))
    }

    pub fn ticker(&self) -> Option<&Ticker> {
        match self {
            Self::Reading(observation) => Some(&observation.ticker),
            Self::Unreadable { .. } => None,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct RawAxis {
    low: Option<f64>,
    high: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct RawReading {
    #[serde(default)]
    ticker: Option<String>,
    #[serde(default)]
    timeframe: Option<String>,
    #[serde(default)]
    price_level: Option<f64>,
    #[serde(default)]
    price_axis: Option<RawAxis>,
    #[serde(default)]
    trend: Option<String>,
    #[serde(default)]
    support_levels: Vec<f64>,
    #[serde(default)]
    resistance_levels: Vec<f64>,
    #[serde(default)]
    volume_trend: Option<String>,
    #[serde(default)]
    summary: Option<String>,
}

/// Reads chart images through the chart analyzer agent
pub struct ChartReader {
    agent: ModelAgent,
    prompts: Arc<PromptLibrary>,
    min_size: (u32, u32),
}

impl ChartReader {
    pub fn new(agent: ModelAgent, prompts: Arc<PromptLibrary>, min_size: (u32, u32)) -> Self {
        Self {
            agent,
            prompts,
            min_size,
        }
    }

    /// Read a chart image, optionally guided by the user's question
    #[instrument(skip_all, fields(bytes = image.bytes.len()))]
    pub async fn read(&self, image: &ImageAttachment, question: Option<&str>) -> Result<ChartReading> {
        if let Some(reason) = self.precheck(image) {
            debug!(reason, "image rejected before model call");
            return Ok(ChartReading::unreadable(reason));
        }
        let Some(media_type) = image.media_type else {
            return Ok(ChartReading::unreadable("the attachment is not a supported image"));
        };

        let source = encode_image(&image.bytes, media_type)
            .map_err(|e| InsightError::InvalidInput(e.to_string()))?;
        let prompt = self
            .prompts
            .render(user::READ_CHART, json!({ "question": question }))?;

        let reply: Value = self
            .agent
            .invoke_json(vec![Message::user_with_image(prompt, source)])
            .await
            .map_err(|e| model_failure(&self.agent, e))?;

        if let Some(error) = reply.get("error").filter(|e| !e.is_null()) {
            let reason = error.as_str().unwrap_or("the chart could not be read").trim();
            return Ok(ChartReading::unreadable(reason));
        }

        let raw: RawReading = serde_json::from_value(reply)
            .map_err(|e| InsightError::downstream(self.agent.name(), e))?;
        self.validate(raw)
    }

    fn precheck(&self, image: &ImageAttachment) -> Option<&'static str> {
        if image.bytes.is_empty() {
            return Some("the image is empty");
        }
        if !image.is_supported() {
            return Some("the attachment is not a PNG, JPEG, GIF or WebP image");
        }
        let (min_width, min_height) = self.min_size;
        match dimensions(&image.bytes) {
            Some((width, height)) if width < min_width || height < min_height => {
                Some("the image resolution is too low to read price levels")
            }
            _ => None,
        }
    }

    fn validate(&self, raw: RawReading) -> Result<ChartReading> {
        let summary = raw.summary.as_deref().map(str::trim).unwrap_or_default();
        if summary.is_empty() {
            return Err(InsightError::downstream(self.agent.name(), "reading has no summary"));
        }

        let Some(ticker) = raw.ticker.as_deref().and_then(|t| Ticker::parse(t).ok()) else {
            return Ok(ChartReading::unreadable("no ticker symbol is visible on the chart"));
        };

        let axis = raw.price_axis.unwrap_or_default();
        let price_axis = match (axis.low, axis.high) {
            (Some(low), Some(high)) if low.is_finite() && high.is_finite() && low < high => {
                PriceRange { low, high }
            }
            _ => return Ok(ChartReading::unreadable("no readable price axis")),
        };

        let support_levels = on_axis(raw.support_levels, &price_axis);
        let resistance_levels = on_axis(raw.resistance_levels, &price_axis);
        if support_levels.is_empty() || resistance_levels.is_empty() {
            warn!(%ticker, "reading lacks support or resistance on the visible axis");
            return Ok(ChartReading::unreadable(
                "support and resistance levels cannot be read from the chart",
            ));
        }

        Ok(ChartReading::Reading(ChartObservation {
            ticker,
            timeframe: raw
                .timeframe
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty()),
            price_level: raw.price_level.filter(|p| price_axis.contains(*p)),
            price_axis,
            trend: raw.trend.as_deref().map_or(Trend::Unclear, Trend::parse),
            support_levels,
            resistance_levels,
            volume_trend: raw
                .volume_trend
                .as_deref()
                .map_or(VolumeTrend::NotVisible, VolumeTrend::parse),
            summary: summary.to_string(),
            follow_up_offered: false,
        }))
    }
}

/// Keep the levels that lie on the axis, ascending and without repeats
fn on_axis(levels: Vec<f64>, axis: &PriceRange) -> Vec<f64> {
    let mut kept: Vec<f64> = levels.into_iter().filter(|l| axis.contains(*l)).collect();
    kept.sort_by(f64::total_cmp);
    kept.dedup_by(|a, b| (*a - *b).abs() < 1e-9);
    kept
}
