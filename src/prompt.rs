// src/prompt.rs
use serde_json::Value;
use std::str::FromStr;

use crate::types::{Candle, NormalizedInput, Reading};

/// Text written into the prompt for a missing reading.
pub const NULL_PLACEHOLDER: &str = "null";

const STRUCTURED_TEMPERATURE: f32 = 0.2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptVariant {
    /// Natural-language answer, returned to the caller verbatim.
    FreeForm,
    /// JSON-object-only answer, parsed into a `Decision`.
    Structured,
}

impl PromptVariant {
    /// Sampling temperature to request. Structured output runs cooler so the
    /// model sticks to the JSON shape; free-form uses the provider default.
    pub fn temperature(&self) -> Option<f32> {
        match self {
            PromptVariant::FreeForm => None,
            PromptVariant::Structured => Some(STRUCTURED_TEMPERATURE),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PromptVariant::FreeForm => "free_form",
            PromptVariant::Structured => "structured",
        }
    }
}

impl FromStr for PromptVariant {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "free_form" | "freeform" | "free" | "v1" => Ok(PromptVariant::FreeForm),
            "structured" | "json" | "v2" => Ok(PromptVariant::Structured),
            other => Err(format!("unknown prompt variant '{}'", other)),
        }
    }
}

fn render(reading: &Reading) -> String {
    match reading {
        None | Some(Value::Null) => NULL_PLACEHOLDER.to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(v) => v.to_string(),
    }
}

fn candle_line(index: usize, candle: &Candle) -> String {
    format!(
        "{}: Open {}, High {}, Low {}, Close {}",
        index,
        render(&candle.open),
        render(&candle.high),
        render(&candle.low),
        render(&candle.close)
    )
}

fn market_block(input: &NormalizedInput) -> String {
    let s = &input.snapshot;
    let candles = input
        .candles
        .iter()
        .enumerate()
        .map(|(i, c)| candle_line(i + 1, c))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        r#"Indicators:
- Price: {price}
- RSI: {rsi}
- EMA9: {ema9}
- EMA21: {ema21}
- VWAP: {vwap}
- Bollinger Midline: {bb_mid}
- MACD Histogram: {macd_hist}
- Volume Oscillator: {volume_osc}x average
- ATR: {atr}
- BB Width: {bb_width}
- Daily Session Range: {session_range}

Last 3 candles:
{candles}"#,
        price = render(&s.price),
        rsi = render(&s.rsi),
        ema9 = render(&s.ema9),
        ema21 = render(&s.ema21),
        vwap = render(&s.vwap),
        bb_mid = render(&s.bb_mid),
        macd_hist = render(&s.macd_hist),
        volume_osc = render(&s.volume_osc),
        atr = render(&s.atr),
        bb_width = render(&s.bb_width),
        session_range = render(&s.session_range),
        candles = candles,
    )
}

const FREE_FORM_INSTRUCTIONS: &str = r#"Decide:
1. Go long, short, or stay out?
2. Suggest Entry, Stop-Loss, and Take-Profit.
3. Explain your logic briefly.
4. Rate your confidence from 0-100."#;

const STRUCTURED_INSTRUCTIONS: &str = r#"Respond with ONLY a JSON object in exactly this shape:
{
  "decision": "go_long" | "go_short" | "stay_out",
  "confidence": <integer 0-100>,
  "entry_price": <number or null>,
  "stop_loss": <number or null>,
  "take_profit": <number or null>,
  "reasoning": "<one or two short sentences>"
}

Rules:
- "decision" must be one of "go_long", "go_short" or "stay_out".
- Use null for the price levels when staying out.
- Do not include markdown, code fences or any text outside the JSON object."#;

/// Renders the full prompt for one snapshot.
pub fn build_prompt(input: &NormalizedInput, variant: PromptVariant) -> String {
    let instructions = match variant {
        PromptVariant::FreeForm => FREE_FORM_INSTRUCTIONS,
        PromptVariant::Structured => STRUCTURED_INSTRUCTIONS,
    };

    format!(
        "You are ChartGPT, an intelligent scalping assistant. Interpret the following BTCUSD 1-minute chart snapshot.\n\n{}\n\n{}\n",
        market_block(input),
        instructions
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalizer::normalize;
    use serde_json::json;

    #[test]
    fn test_present_readings_and_null_placeholders() {
        let input = normalize(&json!({ "price": 100, "rsi": 55 }));
        let prompt = build_prompt(&input, PromptVariant::Structured);

        assert!(prompt.contains("Price: 100"));
        assert!(prompt.contains("RSI: 55"));
        for label in [
            "EMA9",
            "EMA21",
            "VWAP",
            "Bollinger Midline",
            "MACD Histogram",
            "ATR",
            "BB Width",
            "Daily Session Range",
        ] {
            assert!(
                prompt.contains(&format!("{}: null", label)),
                "missing null placeholder for {}",
                label
            );
        }
        assert!(prompt.contains("Volume Oscillator: nullx average"));
        assert!(prompt.contains("1: Open null, High null, Low null, Close null"));
    }

    #[test]
    fn test_candles_render_in_order() {
        let input = normalize(&json!({
            "candle_1": { "open": 1, "high": 2, "low": 0, "close": 1.5 },
            "candle_3": { "open": 7 }
        }));
        let prompt = build_prompt(&input, PromptVariant::FreeForm);

        assert!(prompt.contains("1: Open 1, High 2, Low 0, Close 1.5"));
        assert!(prompt.contains("2: Open null, High null, Low null, Close null"));
        assert!(prompt.contains("3: Open 7, High null"));
    }

    #[test]
    fn test_variant_instructions() {
        let input = NormalizedInput::default();

        let free = build_prompt(&input, PromptVariant::FreeForm);
        assert!(free.contains("Go long, short, or stay out?"));
        assert!(!free.contains("\"go_long\""));

        let structured = build_prompt(&input, PromptVariant::Structured);
        assert!(structured.contains("ONLY a JSON object"));
        assert!(structured.contains("\"take_profit\""));
    }

    #[test]
    fn test_variant_parsing_and_temperature() {
        assert_eq!("v1".parse::<PromptVariant>(), Ok(PromptVariant::FreeForm));
        assert_eq!(" Structured ".parse::<PromptVariant>(), Ok(PromptVariant::Structured));
        assert!("yaml".parse::<PromptVariant>().is_err());

        assert_eq!(PromptVariant::FreeForm.temperature(), None);
        assert!(PromptVariant::Structured.temperature().unwrap() < 1.0);
    }
}
