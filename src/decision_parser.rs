// src/decision_parser.rs
// Best-effort extraction of a Decision from whatever text the model returned.
use log::{debug, warn};
use serde::Deserialize;
use serde_json::Value;

use crate::types::{Decision, TradeAction};

pub const REASONING_PREVIEW_CHARS: usize = 200;
pub const PARSE_FAILURE_REASONING: &str = "Failed to parse GPT response as JSON.";
/// Used when the object decodes but carries no usable confidence.
pub const MISSING_CONFIDENCE: u8 = 50;

/// How the reply was turned into a decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseOutcome {
    /// A JSON object was found and decoded.
    Clean,
    /// No `{` ... `}` pair in the reply.
    NoBraces,
    /// A brace pair was found but its contents are not a JSON object.
    InvalidJson,
}

impl ParseOutcome {
    pub fn fallback_confidence(&self) -> Option<u8> {
        match self {
            ParseOutcome::Clean => None,
            ParseOutcome::NoBraces => Some(50),
            ParseOutcome::InvalidJson => Some(30),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParsedDecision {
    pub decision: Decision,
    pub outcome: ParseOutcome,
}

// Every field is optional and loosely typed; coercion happens afterwards.
#[derive(Deserialize, Debug)]
struct RawDecision {
    decision: Option<Value>,
    confidence: Option<Value>,
    entry_price: Option<Value>,
    stop_loss: Option<Value>,
    take_profit: Option<Value>,
    reasoning: Option<Value>,
}

fn as_number(value: &Option<Value>) -> Option<f64> {
    match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

fn coerce_confidence(value: &Option<Value>) -> u8 {
    match as_number(value) {
        Some(c) if c.is_finite() => c.round().clamp(0.0, 100.0) as u8,
        _ => MISSING_CONFIDENCE,
    }
}

fn coerce_action(value: &Option<Value>) -> TradeAction {
    let text = match value {
        Some(Value::String(s)) => s.as_str(),
        _ => return TradeAction::StayOut,
    };
    TradeAction::from_model_text(text).unwrap_or_else(|| {
        warn!("🧠 Unrecognized decision '{}', treating as stay_out", text);
        TradeAction::StayOut
    })
}

impl From<RawDecision> for Decision {
    fn from(raw: RawDecision) -> Self {
        let reasoning = match raw.reasoning {
            Some(Value::String(s)) => s,
            Some(Value::Null) | None => String::new(),
            Some(other) => other.to_string(),
        };
        Decision {
            decision: coerce_action(&raw.decision),
            confidence: coerce_confidence(&raw.confidence),
            entry_price: as_number(&raw.entry_price),
            stop_loss: as_number(&raw.stop_loss),
            take_profit: as_number(&raw.take_profit),
            reasoning,
        }
    }
}

fn preview(text: &str) -> String {
    let mut chars = text.chars();
    let head: String = chars.by_ref().take(REASONING_PREVIEW_CHARS).collect();
    if chars.next().is_some() {
        format!("{}...", head)
    } else {
        head
    }
}

/// Pure extraction: the decoded decision, or why there is none.
pub fn extract_decision(text: &str) -> Result<Decision, ParseOutcome> {
    let (start, end) = match (text.find('{'), text.rfind('}')) {
        (Some(start), Some(end)) => (start, end),
        _ => return Err(ParseOutcome::NoBraces),
    };
    if end < start {
        return Err(ParseOutcome::InvalidJson);
    }

    let candidate = &text[start..=end];
    match serde_json::from_str::<RawDecision>(candidate) {
        Ok(raw) => Ok(raw.into()),
        Err(e) => {
            debug!("🧠 JSON decode failed: {}", e);
            Err(ParseOutcome::InvalidJson)
        }
    }
}

/// Always yields a decision, falling back to `stay_out` with a confidence
/// that tells which kind of failure happened.
pub fn parse_decision(text: &str) -> ParsedDecision {
    match extract_decision(text) {
        Ok(decision) => ParsedDecision {
            decision,
            outcome: ParseOutcome::Clean,
        },
        Err(outcome) => {
            let confidence = outcome.fallback_confidence().unwrap_or(MISSING_CONFIDENCE);
            let reasoning = match outcome {
                ParseOutcome::NoBraces => preview(text),
                _ => PARSE_FAILURE_REASONING.to_string(),
            };
            warn!("🧠 Model reply not usable ({:?}), falling back to stay_out", outcome);
            ParsedDecision {
                decision: Decision::stay_out(confidence, reasoning),
                outcome,
            }
        }
    }
}
