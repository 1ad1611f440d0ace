use crate::domain::model::{Planet, Signal, SignalCard};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const TRANSIT_COLUMNS: usize = 4;
pub const DEFAULT_MIN_CONFIDENCE: u8 = 30;
pub const CONFIDENCE_STEP: u8 = 5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoardFilters {
    pub min_confidence: u8,
    pub signals: Vec<Signal>,
}

impl Default for BoardFilters {
    fn default() -> Self {
        Self {
            min_confidence: DEFAULT_MIN_CONFIDENCE,
            signals: Signal::DEFAULT_FILTER.to_vec(),
        }
    }
}

impl BoardFilters {
    pub fn accepts(&self, card: &SignalCard) -> bool {
        card.strength >= f64::from(self.min_confidence) / 100.0
            && self.signals.contains(&card.signal)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransitSummary {
    pub planet: Planet,
    pub glyph: &'static str,
    pub count: usize,
    pub transit_time: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SignalGroup {
    pub signal: Signal,
    pub heading: String,
    pub columns: usize,
    pub cards: Vec<SignalCard>,
}

/// 一次掃描經過篩選、分組後要呈現的內容
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Board {
    pub generated_at: DateTime<Utc>,
    pub processed: usize,
    pub elapsed_seconds: f64,
    pub shown: usize,
    pub filters: BoardFilters,
    pub transits: Vec<TransitSummary>,
    pub groups: Vec<SignalGroup>,
}

/// 每組的欄數：卡片越多欄數越少，介於 2 到 4
pub fn group_columns(cards: usize) -> usize {
    6usize.saturating_sub(cards / 5).clamp(2, 4)
}

impl Board {
    /// `cards` must already be sorted by strength, strongest first.
    pub fn build(
        cards: &[SignalCard],
        filters: &BoardFilters,
        processed: usize,
        elapsed: Duration,
        generated_at: DateTime<Utc>,
    ) -> Self {
        let filtered: Vec<&SignalCard> = cards.iter().filter(|c| filters.accepts(c)).collect();

        let mut transits: Vec<TransitSummary> = Vec::new();
        for card in &filtered {
            match transits.iter_mut().find(|t| t.planet == card.planet) {
                Some(summary) => summary.count += 1,
                None => transits.push(TransitSummary {
                    planet: card.planet,
                    glyph: card.planet.glyph(),
                    count: 1,
                    transit_time: card.next_transit.clone(),
                }),
            }
        }

        let groups = Signal::DISPLAY_ORDER
            .into_iter()
            .filter_map(|signal| {
                let members: Vec<SignalCard> = filtered
                    .iter()
                    .filter(|c| c.signal == signal)
                    .map(|c| (*c).clone())
                    .collect();
                if members.is_empty() {
                    return None;
                }
                Some(SignalGroup {
                    signal,
                    heading: format!(
                        "{} {} Signals ({})",
                        signal.eye(),
                        signal.label(),
                        members.len()
                    ),
                    columns: group_columns(members.len()),
                    cards: members,
                })
            })
            .collect();

        Self {
            generated_at,
            processed,
            elapsed_seconds: elapsed.as_secs_f64(),
            shown: filtered.len(),
            filters: filters.clone(),
            transits,
            groups,
        }
    }

    pub fn cards(&self) -> impl Iterator<Item = &SignalCard> {
        self.groups.iter().flat_map(|g| g.cards.iter())
    }

    pub fn caption(&self) -> String {
        format!(
            "Last update: {} | Processed {} symbols in {:.2}s | Showing {} filtered signals",
            self.generated_at.format("%Y-%m-%d %H:%M:%S UTC"),
            self.processed,
            self.elapsed_seconds,
            self.shown
        )
    }

    /// 效能條：每 0.1 秒一格，上限 100
    pub fn performance(&self) -> u8 {
        (self.elapsed_seconds * 10.0).clamp(0.0, 100.0) as u8
    }
}
