use crate::utils::error::DashError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Planet {
    Sun,
    Moon,
    Mercury,
    Venus,
    Mars,
    Jupiter,
    Saturn,
    Uranus,
    Neptune,
    Pluto,
}

impl Planet {
    pub const ALL: [Planet; 10] = [
        Planet::Sun,
        Planet::Moon,
        Planet::Mercury,
        Planet::Venus,
        Planet::Mars,
        Planet::Jupiter,
        Planet::Saturn,
        Planet::Uranus,
        Planet::Neptune,
        Planet::Pluto,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Planet::Sun => "Sun",
            Planet::Moon => "Moon",
            Planet::Mercury => "Mercury",
            Planet::Venus => "Venus",
            Planet::Mars => "Mars",
            Planet::Jupiter => "Jupiter",
            Planet::Saturn => "Saturn",
            Planet::Uranus => "Uranus",
            Planet::Neptune => "Neptune",
            Planet::Pluto => "Pluto",
        }
    }

    pub fn glyph(self) -> &'static str {
        match self {
            Planet::Sun => "☀️",
            Planet::Moon => "🌙",
            Planet::Mercury => "☿",
            Planet::Venus => "♀",
            Planet::Mars => "♂",
            Planet::Jupiter => "♃",
            Planet::Saturn => "♄",
            Planet::Uranus => "♅",
            Planet::Neptune => "♆",
            Planet::Pluto => "♇",
        }
    }
}

impl fmt::Display for Planet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Signal {
    StrongBuy,
    Buy,
    Warning,
    Hold,
    Sell,
    StrongSell,
}

impl Signal {
    /// 儀表板上分組的顯示順序
    pub const DISPLAY_ORDER: [Signal; 6] = [
        Signal::StrongBuy,
        Signal::Buy,
        Signal::Warning,
        Signal::Hold,
        Signal::Sell,
        Signal::StrongSell,
    ];

    pub const DEFAULT_FILTER: [Signal; 4] = [
        Signal::StrongBuy,
        Signal::Buy,
        Signal::StrongSell,
        Signal::Sell,
    ];

    pub fn code(self) -> &'static str {
        match self {
            Signal::StrongBuy => "STRONG_BUY",
            Signal::Buy => "BUY",
            Signal::Warning => "WARNING",
            Signal::Hold => "HOLD",
            Signal::Sell => "SELL",
            Signal::StrongSell => "STRONG_SELL",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Signal::StrongBuy => "STRONG BUY",
            Signal::Buy => "BUY",
            Signal::Warning => "WARNING",
            Signal::Hold => "HOLD",
            Signal::Sell => "SELL",
            Signal::StrongSell => "STRONG SELL",
        }
    }

    pub fn eye(self) -> &'static str {
        match self {
            Signal::StrongBuy => "👁️🟢✨",
            Signal::Buy => "👁️🟢",
            Signal::Warning => "👁️🟡",
            Signal::Hold => "👁️⚪",
            Signal::Sell => "👁️🔴",
            Signal::StrongSell => "👁️🔴✨",
        }
    }

    pub fn color(self) -> &'static str {
        match self {
            Signal::StrongBuy => "darkgreen",
            Signal::Buy => "green",
            Signal::Warning => "orange",
            Signal::Hold => "gray",
            Signal::Sell => "red",
            Signal::StrongSell => "darkred",
        }
    }

    pub fn css_class(self) -> &'static str {
        match self {
            Signal::StrongBuy => "signal-strong-buy",
            Signal::Buy => "signal-buy",
            Signal::Warning => "signal-warning",
            Signal::Hold => "signal-hold",
            Signal::Sell => "signal-sell",
            Signal::StrongSell => "signal-strong-sell",
        }
    }

    pub fn guide(self) -> &'static str {
        match self {
            Signal::StrongBuy => "Strong Buy (Very High Confidence)",
            Signal::Buy => "Buy (High Confidence)",
            Signal::Warning => "Warning (Potential Volatility)",
            Signal::Hold => "Hold (Neutral)",
            Signal::Sell => "Sell (High Confidence)",
            Signal::StrongSell => "Strong Sell (Very High Confidence)",
        }
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Signal {
    type Err = DashError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_uppercase().replace(['-', ' '], "_");
        Signal::DISPLAY_ORDER
            .into_iter()
            .find(|signal| signal.code() == normalized)
            .ok_or_else(|| {
                DashError::invalid_value(
                    "signals",
                    s,
                    "expected one of STRONG_BUY, BUY, WARNING, HOLD, SELL, STRONG_SELL",
                )
            })
    }
}

/// 單一行星在某個時間點的強度與子午線通過時間
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlanetReading {
    pub strength: f64,
    pub next_transit: Option<DateTime<Utc>>,
    pub prev_transit: Option<DateTime<Utc>>,
}

impl PlanetReading {
    pub const NEUTRAL_STRENGTH: f64 = 0.5;

    pub fn neutral() -> Self {
        Self {
            strength: Self::NEUTRAL_STRENGTH,
            next_transit: None,
            prev_transit: None,
        }
    }

    pub fn next_transit_label(&self) -> String {
        format_transit(self.next_transit)
    }

    pub fn prev_transit_label(&self) -> String {
        format_transit(self.prev_transit)
    }
}

pub fn format_transit(at: Option<DateTime<Utc>>) -> String {
    at.map(|t| t.format("%H:%M UTC").to_string())
        .unwrap_or_else(|| "N/A".to_string())
}

/// 千分位、兩位小數；沒有報價時顯示 N/A
pub fn format_price(price: f64) -> String {
    if !(price > 0.0) || !price.is_finite() {
        return "N/A".to_string();
    }

    let fixed = format!("{:.2}", price);
    let (whole, fraction) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));
    let digits = whole.as_bytes();
    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (index, digit) in digits.iter().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(*digit as char);
    }
    format!("{}.{}", grouped, fraction)
}

pub fn format_confidence(strength: f64) -> String {
    format!("{:.0}%", strength * 100.0)
}

/// 單一商品的評估結果
#[derive(Debug, Clone, PartialEq)]
pub struct SignalCard {
    pub symbol: String,
    pub price: f64,
    pub signal: Signal,
    pub reason: String,
    pub strength: f64,
    pub planet: Planet,
    pub transit: String,
    pub next_transit: String,
}

impl SignalCard {
    pub fn price_display(&self) -> String {
        format_price(self.price)
    }

    pub fn confidence_display(&self) -> String {
        format_confidence(self.strength)
    }

    pub fn signal_display(&self) -> String {
        format!("{} {}", self.signal.eye(), self.signal.label())
    }
}

/// 匯出與 API 使用的扁平格式
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalRow {
    pub symbol: String,
    pub price: String,
    pub signal: Signal,
    pub signal_display: String,
    pub reason: String,
    pub confidence: String,
    pub strength: f64,
    pub planet: Planet,
    pub planet_glyph: String,
    pub transit: String,
    pub next_transit: String,
    pub color: String,
}

impl From<&SignalCard> for SignalRow {
    fn from(card: &SignalCard) -> Self {
        Self {
            symbol: card.symbol.clone(),
            price: card.price_display(),
            signal: card.signal,
            signal_display: card.signal_display(),
            reason: card.reason.clone(),
            confidence: card.confidence_display(),
            strength: card.strength,
            planet: card.planet,
            planet_glyph: card.planet.glyph().to_string(),
            transit: card.transit.clone(),
            next_transit: card.next_transit.clone(),
            color: card.signal.color().to_string(),
        }
    }
}

impl Serialize for SignalCard {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        SignalRow::from(self).serialize(serializer)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SymbolGroup {
    #[serde(alias = "all")]
    AllSymbols,
    Futures,
    Watchlist,
    #[serde(alias = "eye")]
    EyeSymbols,
    #[serde(alias = "custom_selection")]
    Custom,
}

impl SymbolGroup {
    pub const ALL: [SymbolGroup; 5] = [
        SymbolGroup::AllSymbols,
        SymbolGroup::Futures,
        SymbolGroup::Watchlist,
        SymbolGroup::EyeSymbols,
        SymbolGroup::Custom,
    ];

    pub fn key(self) -> &'static str {
        match self {
            SymbolGroup::AllSymbols => "all_symbols",
            SymbolGroup::Futures => "futures",
            SymbolGroup::Watchlist => "watchlist",
            SymbolGroup::EyeSymbols => "eye_symbols",
            SymbolGroup::Custom => "custom",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SymbolGroup::AllSymbols => "All Symbols",
            SymbolGroup::Futures => "Futures",
            SymbolGroup::Watchlist => "Watchlist",
            SymbolGroup::EyeSymbols => "Eye Symbols",
            SymbolGroup::Custom => "Custom Selection",
        }
    }
}

impl Default for SymbolGroup {
    fn default() -> Self {
        SymbolGroup::AllSymbols
    }
}

impl FromStr for SymbolGroup {
    type Err = DashError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace(['-', ' '], "_");
        match normalized.as_str() {
            "all" | "all_symbols" => Ok(SymbolGroup::AllSymbols),
            "futures" => Ok(SymbolGroup::Futures),
            "watchlist" => Ok(SymbolGroup::Watchlist),
            "eye" | "eye_symbols" => Ok(SymbolGroup::EyeSymbols),
            "custom" | "custom_selection" => Ok(SymbolGroup::Custom),
            _ => Err(DashError::invalid_value(
                "group",
                s,
                "expected all_symbols, futures, watchlist, eye_symbols or custom",
            )),
        }
    }
}
