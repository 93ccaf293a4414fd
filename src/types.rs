// src/types.rs
use chrono::{DateTime, Local};
use serde::Serialize;
use serde_json::Value;

/// A single indicator reading exactly as the caller sent it.
/// `None` means the key was missing (or explicitly null), never zero.
pub type Reading = Option<Value>;

// --- Input ---
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IndicatorSnapshot {
    pub price: Reading,
    pub rsi: Reading,
    pub ema9: Reading,
    pub ema21: Reading,
    pub vwap: Reading,
    pub bb_mid: Reading,
    pub macd_hist: Reading,
    pub volume_osc: Reading,
    pub atr: Reading,
    pub bb_width: Reading,
    pub session_range: Reading,
}

impl IndicatorSnapshot {
    /// Readings in log column order.
    pub fn readings(&self) -> [&Reading; 11] {
        [
            &self.price,
            &self.rsi,
            &self.ema9,
            &self.ema21,
            &self.vwap,
            &self.bb_mid,
            &self.macd_hist,
            &self.volume_osc,
            &self.atr,
            &self.bb_width,
            &self.session_range,
        ]
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Candle {
    pub open: Reading,
    pub high: Reading,
    pub low: Reading,
    pub close: Reading,
}

impl Candle {
    pub fn readings(&self) -> [&Reading; 4] {
        [&self.open, &self.high, &self.low, &self.close]
    }
}

/// Snapshot plus the last three candles, oldest first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NormalizedInput {
    pub snapshot: IndicatorSnapshot,
    pub candles: [Candle; 3],
}

// --- Output ---
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TradeAction {
    GoLong,
    GoShort,
    StayOut,
}

impl TradeAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            TradeAction::GoLong => "go_long",
            TradeAction::GoShort => "go_short",
            TradeAction::StayOut => "stay_out",
        }
    }

    /// Lenient match for whatever the model wrote ("GO_LONG", "go long", "go-short", ...).
    pub fn from_model_text(text: &str) -> Option<Self> {
        let normalized: String = text
            .trim()
            .to_lowercase()
            .chars()
            .map(|c| if c == ' ' || c == '-' { '_' } else { c })
            .collect();
        match normalized.as_str() {
            "go_long" | "long" => Some(TradeAction::GoLong),
            "go_short" | "short" => Some(TradeAction::GoShort),
            "stay_out" | "none" | "hold" => Some(TradeAction::StayOut),
            _ => None,
        }
    }
}

impl std::fmt::Display for TradeAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct Decision {
    pub decision: TradeAction,
    pub confidence: u8,
    pub entry_price: Option<f64>,
    pub stop_loss: Option<f64>,
    pub take_profit: Option<f64>,
    pub reasoning: String,
}

impl Decision {
    pub fn stay_out(confidence: u8, reasoning: impl Into<String>) -> Self {
        Self {
            decision: TradeAction::StayOut,
            confidence,
            entry_price: None,
            stop_loss: None,
            take_profit: None,
            reasoning: reasoning.into(),
        }
    }
}

/// One row of the trade log.
#[derive(Debug, Clone)]
pub struct LogRecord {
    pub timestamp: DateTime<Local>,
    pub input: NormalizedInput,
    pub decision: Decision,
    pub raw_response: String,
}

impl LogRecord {
    /// Stamps the record with the current local time.
    pub fn now(input: NormalizedInput, decision: Decision, raw_response: String) -> Self {
        Self {
            timestamp: Local::now(),
            input,
            decision,
            raw_response,
        }
    }
}

// --- HTTP bodies ---
#[derive(Serialize, Debug)]
pub struct StructuredWebhookResponse {
    pub status: &'static str,
    pub structured_decision: Decision,
    pub raw_response: String,
}

#[derive(Serialize, Debug)]
pub struct FreeFormWebhookResponse {
    pub decision: String,
}

#[derive(Serialize, Debug)]
pub struct ErrorResponse {
    pub error: String,
}
