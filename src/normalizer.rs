// src/normalizer.rs
// Pulls the known indicator keys out of an arbitrary webhook body.
use serde_json::{Map, Value};

use crate::types::{Candle, IndicatorSnapshot, NormalizedInput, Reading};

pub const CANDLE_KEYS: [&str; 3] = ["candle_1", "candle_2", "candle_3"];

fn reading(map: Option<&Map<String, Value>>, key: &str) -> Reading {
    match map.and_then(|m| m.get(key)) {
        None | Some(Value::Null) => None,
        Some(v) => Some(v.clone()),
    }
}

fn candle(map: Option<&Map<String, Value>>, key: &str) -> Candle {
    // A missing or non-object candle behaves like an empty mapping.
    let fields = map.and_then(|m| m.get(key)).and_then(Value::as_object);
    Candle {
        open: reading(fields, "open"),
        high: reading(fields, "high"),
        low: reading(fields, "low"),
        close: reading(fields, "close"),
    }
}

/// Builds the snapshot and candles from a decoded body. Never fails: unknown
/// keys are ignored, values are copied as-is and absent keys become `None`.
pub fn normalize(body: &Value) -> NormalizedInput {
    let map = body.as_object();

    let snapshot = IndicatorSnapshot {
        price: reading(map, "price"),
        rsi: reading(map, "rsi"),
        ema9: reading(map, "ema9"),
        ema21: reading(map, "ema21"),
        vwap: reading(map, "vwap"),
        bb_mid: reading(map, "bb_mid"),
        macd_hist: reading(map, "macd_hist"),
        volume_osc: reading(map, "volume_osc"),
        atr: reading(map, "atr"),
        bb_width: reading(map, "bb_width"),
        session_range: reading(map, "session_range"),
    };

    NormalizedInput {
        snapshot,
        candles: CANDLE_KEYS.map(|key| candle(map, key)),
    }
}
