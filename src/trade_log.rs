// src/trade_log.rs - Append-only CSV log of every webhook decision
use csv::{ReaderBuilder, WriterBuilder};
use log::{error, info, warn};
use parking_lot::Mutex;
use serde_json::Value;
use std::fs::{create_dir_all, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::types::{LogRecord, Reading};

/// Header row. New columns go at the end; existing ones are never renamed or
/// reordered, so older files stay readable with the same column indices.
pub const COLUMNS: [&str; 31] = [
    "timestamp",
    "price",
    "rsi",
    "ema9",
    "ema21",
    "vwap",
    "bb_mid",
    "macd_hist",
    "volume_osc",
    "atr",
    "bb_width",
    "session_range",
    "c1_open",
    "c1_high",
    "c1_low",
    "c1_close",
    "c2_open",
    "c2_high",
    "c2_low",
    "c2_close",
    "c3_open",
    "c3_high",
    "c3_low",
    "c3_close",
    "decision",
    "confidence",
    "entry_price",
    "stop_loss",
    "take_profit",
    "reasoning",
    "raw_gpt_response",
];

#[derive(Error, Debug)]
pub enum TradeLogError {
    #[error("trade log io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("trade log csv error: {0}")]
    Csv(#[from] csv::Error),
}

/// Where rows land. Lets a failed write be cut back to the last good row.
trait LogSink: Write {
    fn byte_len(&self) -> io::Result<u64>;
    fn truncate_to(&mut self, len: u64) -> io::Result<()>;
}

impl LogSink for File {
    fn byte_len(&self) -> io::Result<u64> {
        Ok(self.metadata()?.len())
    }

    fn truncate_to(&mut self, len: u64) -> io::Result<()> {
        self.set_len(len)
    }
}

pub struct TradeLog {
    path: PathBuf,
    // Held across the whole "empty? -> header -> row" sequence.
    file: Mutex<File>,
}

impl TradeLog {
    /// Opens (or creates) the log once at startup.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, TradeLogError> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                create_dir_all(parent)?;
                info!("📁 Created trade log directory: {:?}", parent);
            }
        }

        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        if file.metadata()?.len() > 0 {
            check_existing_header(&path)?;
        }
        info!("📝 Trade log ready: {:?}", path);

        Ok(Self {
            path,
            file: Mutex::new(file),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends one row, writing the header first if the file is empty.
    /// On failure nothing from this record is left in the file.
    pub fn append(&self, record: &LogRecord) -> Result<(), TradeLogError> {
        let mut file = self.file.lock();
        append_record(&mut *file, record)
    }
}

/// Encodes header (when the sink is empty) and row up front, then writes them
/// in one go. A failed write is truncated back to the previous length.
fn append_record<S: LogSink>(sink: &mut S, record: &LogRecord) -> Result<(), TradeLogError> {
    let start = sink.byte_len()?;
    let bytes = encode(start == 0, record)?;

    if let Err(e) = sink.write_all(&bytes).and_then(|_| sink.flush()) {
        if let Err(rollback) = sink.truncate_to(start) {
            error!("📝 Failed to roll back partial trade log row: {}", rollback);
        }
        return Err(e.into());
    }
    Ok(())
}

fn encode(with_header: bool, record: &LogRecord) -> Result<Vec<u8>, TradeLogError> {
    let mut writer = WriterBuilder::new().has_headers(false).from_writer(vec![]);
    if with_header {
        writer.write_record(COLUMNS)?;
    }
    writer.write_record(&to_row(record))?;
    writer
        .into_inner()
        .map_err(|e| TradeLogError::Io(e.into_error()))
}

fn check_existing_header(path: &Path) -> Result<(), TradeLogError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)?;

    let existing = match reader.records().next() {
        Some(record) => record?,
        None => return Ok(()),
    };

    let is_prefix = existing.len() <= COLUMNS.len()
        && existing.iter().zip(COLUMNS.iter()).all(|(a, b)| a == *b);

    if !is_prefix {
        warn!(
            "📝 Trade log {:?} has an incompatible header ({} columns); rows will be appended in the current {}-column layout",
            path,
            existing.len(),
            COLUMNS.len()
        );
    } else if existing.len() < COLUMNS.len() {
        warn!(
            "📝 Trade log {:?} uses an older {}-column header; new rows carry {} columns",
            path,
            existing.len(),
            COLUMNS.len()
        );
    }
    Ok(())
}

/// Keeps every cell on one line so rows stay column-aligned.
fn sanitize(text: &str) -> String {
    text.replace("\r\n", " ").replace(['\n', '\r'], " ")
}

fn reading_cell(reading: &Reading) -> String {
    match reading {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => sanitize(s),
        Some(v) => v.to_string(),
    }
}

fn price_cell(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

fn to_row(record: &LogRecord) -> Vec<String> {
    let mut row = Vec::with_capacity(COLUMNS.len());
    row.push(record.timestamp.to_rfc3339());
    row.extend(record.input.snapshot.readings().into_iter().map(reading_cell));
    for candle in &record.input.candles {
        row.extend(candle.readings().into_iter().map(reading_cell));
    }

    let d = &record.decision;
    row.push(d.decision.as_str().to_string());
    row.push(d.confidence.to_string());
    row.push(price_cell(d.entry_price));
    row.push(price_cell(d.stop_loss));
    row.push(price_cell(d.take_profit));
    row.push(sanitize(&d.reasoning));
    row.push(sanitize(record.raw_response.trim()));
    row
}
