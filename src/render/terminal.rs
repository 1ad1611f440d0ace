use crate::domain::board::Board;
use crate::domain::ports::BoardSink;
use crate::utils::error::Result;
use async_trait::async_trait;
use std::fmt;

struct BoardReport<'a>(&'a Board);

impl fmt::Display for BoardReport<'_> {
    fn fmt(&self, out: &mut fmt::Formatter<'_>) -> fmt::Result {
        let board = self.0;
        writeln!(out, "🌌 Advanced Astro Trading Dashboard")?;

        if !board.transits.is_empty() {
            writeln!(out, "\n🌠 Upcoming Planetary Transits (Next 24 Hours)")?;
            for transit in &board.transits {
                writeln!(
                    out,
                    "  {} {:<8} {}  affects {} symbols",
                    transit.glyph, transit.planet, transit.transit_time, transit.count
                )?;
            }
        }

        for group in &board.groups {
            writeln!(out, "\n{}", group.heading)?;
            for card in &group.cards {
                writeln!(
                    out,
                    "  {} {:<28} {:>14}  {:>5}  {}",
                    card.planet.glyph(),
                    card.symbol,
                    card.price_display(),
                    card.confidence_display(),
                    card.transit
                )?;
            }
        }

        if board.groups.is_empty() {
            writeln!(out, "\nNo signals match the current filters.")?;
        }

        writeln!(out, "\n{}", board.caption())
    }
}

pub fn render_board(board: &Board) -> String {
    BoardReport(board).to_string()
}

/// 掃描結果直接印到終端機
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalSink;

#[async_trait]
impl BoardSink for TerminalSink {
    async fn publish(&self, board: &Board) -> Result<()> {
        println!("{}", render_board(board));
        Ok(())
    }
}
