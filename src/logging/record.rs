use crate::event::{Event, EventKind, Payload};
use crate::portfolio::PortfolioInfo;
use crate::strategy::MaStrategyInfo;
use chrono::{DateTime, Utc};
use std::fs::File;
use std::io::{self, Write};

/// One logger unit's accumulated rows plus their header, modeled on the
/// source's `LoggerStringUnit`: a header line of `index,committer,datetime,
/// <head>` followed by one formatted row per `log` call.
#[derive(Clone, Debug)]
pub struct StringLogUnit {
    header: String,
    rows: Vec<String>,
}

impl StringLogUnit {
    pub fn new(head: &str) -> Self {
        Self { header: format!("index,committer,datetime,{head}"), rows: Vec::new() }
    }

    pub fn log(&mut self, committer: &str, datetime: DateTime<Utc>, repr: &str) {
        let index = self.rows.len() + 1;
        self.rows.push(format!("{index},{committer},{datetime},{repr}"));
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Writes the header plus every accumulated row to `path`, UTF-8 encoded
    /// (the source's legacy `GB2312` output encoding is not reproduced; see
    /// the grounding ledger).
    pub fn write_to(&self, path: &str) -> io::Result<()> {
        let mut file = File::create(path)?;
        writeln!(file, "{}", self.header)?;
        for row in &self.rows {
            writeln!(file, "{row}")?;
        }
        Ok(())
    }
}

fn kind_word(kind: EventKind) -> &'static str {
    match kind {
        EventKind::Default => "Default",
        EventKind::Bar => "Bar",
        EventKind::Price => "Price",
        EventKind::Cancel => "Cancel",
        EventKind::Fill => "Fill",
        EventKind::Order => "Order",
        EventKind::Signal => "Signal",
        EventKind::Clear => "Clear",
        EventKind::End => "End",
    }
}

/// Formats an event record as `timestamp,kind,<payload_csv>`, the row shape
/// for the event log.
pub fn format_event_record(event: &Event) -> String {
    let payload_csv = match &event.payload {
        Payload::None => "NULL".to_string(),
        Payload::Bar(b) => format!(
            "{},{:.2},{:.2},{:.2},{:.2},{:.2},{:.2}",
            b.symbol, b.open, b.high, b.low, b.close, b.volume, b.turnover
        ),
        Payload::Price(p) => format!(
            "{},{:.2},{:.2},{:.2}",
            p.symbol, p.current_price, p.last_price, p.volume
        ),
        Payload::Signal(s) => format!(
            "{},{},{},{:.2},{:.2},{:.2},{},{},{}",
            s.symbol, s.direction, s.open_or_close, s.price, s.volume, s.amount, s.currency, s.signal_type, s.id
        ),
        Payload::Order(o) => format!(
            "{},{},{},{},{:.2},{:.2},{}",
            o.id, o.symbol, o.direction, o.open_or_close, o.price, o.volume, o.order_type
        ),
        Payload::Cancel(c) => format!("{},{},{}", c.id, c.symbol, c.direction),
        Payload::Fill(f) => format!(
            "{},{},{},{},{:.2},{:.2},{}",
            f.id, f.symbol, f.direction, f.open_or_close, f.filled_price, f.volume, if f.partial { "partial" } else { "" }
        ),
    };
    format!("{},{},{}", event.timestamp, kind_word(event.kind), payload_csv)
}

/// Formats a [`PortfolioInfo`] snapshot, the row shape for the portfolio log.
pub fn format_portfolio_record(info: &PortfolioInfo) -> String {
    format!(
        "{:.2},{:.2},{:.2},{:.2},{:.2},{:.2},{:.4}",
        info.cash, info.amount, info.asset, info.debt, info.net_asset, info.share, info.net_price
    )
}

/// Formats a [`MaStrategyInfo`] snapshot, the row shape for the MA strategy
/// log: `crt_price,short_ma,long_ma,crt_direction`.
pub fn format_strategy_record(info: &MaStrategyInfo) -> String {
    format!("{:.2},{:.4},{:.4},{:+}", info.crt_price, info.short_ma, info.long_ma, info.crt_direction)
}
