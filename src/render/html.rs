use crate::domain::board::{Board, SignalGroup, TransitSummary, CONFIDENCE_STEP, TRANSIT_COLUMNS};
use crate::domain::model::{Planet, Signal, SignalCard, SymbolGroup};
use std::fmt::{self, Write};

pub const PAGE_TITLE: &str = "Astro Trading Pro";

const STYLE: &str = r#"
body { font-family: -apple-system, "Segoe UI", Roboto, sans-serif; margin: 0; display: flex; color: #262730; }
.sidebar { width: 300px; min-height: 100vh; padding: 1.5rem; background: #f0f2f6; box-sizing: border-box; }
.sidebar label { display: block; margin-top: 1rem; font-weight: 600; }
.sidebar select, .sidebar input[type=number], .sidebar textarea { width: 100%; box-sizing: border-box; }
.main { flex: 1; padding: 1.5rem 2.5rem; }
.caption { color: #808495; font-size: 0.9rem; }
.grid { display: grid; gap: 1rem; }
.symbol-card {
    border-radius: 10px;
    padding: 15px;
    margin-bottom: 15px;
    box-shadow: 0 4px 8px rgba(0,0,0,0.1);
    transition: transform 0.2s;
}
.symbol-card:hover { transform: translateY(-5px); }
.signal-strong-buy { background: linear-gradient(135deg, #e6ffe6, #ccffcc); border-left: 5px solid #00cc00; }
.signal-buy { background: linear-gradient(135deg, #f0fff0, #e0ffe0); border-left: 5px solid #00aa00; }
.signal-strong-sell { background: linear-gradient(135deg, #ffe6e6, #ffcccc); border-left: 5px solid #cc0000; }
.signal-sell { background: linear-gradient(135deg, #fff0f0, #ffe0e0); border-left: 5px solid #aa0000; }
.signal-warning { background: linear-gradient(135deg, #fff9e6, #fff2cc); border-left: 5px solid #ffaa00; }
.signal-hold { background: linear-gradient(135deg, #f5f5f5, #e5e5e5); border-left: 5px solid #888888; }
.planet-indicator { font-size: 1.5rem; margin-right: 10px; }
.symbol-name { font-weight: bold; font-size: 1.1rem; margin-bottom: 5px; }
.signal-display { font-size: 1.3rem; font-weight: bold; margin: 5px 0; }
.price-display { font-size: 1.2rem; margin: 5px 0; }
.transit-info { font-size: 0.9rem; color: #555; margin-top: 5px; }
.section-title { border-bottom: 2px solid #eee; padding-bottom: 5px; margin-top: 20px; margin-bottom: 15px; }
.legend { display: grid; grid-template-columns: repeat(3, 1fr); gap: 0.25rem; }
progress { width: 100%; }
"#;

/// 側邊欄控制項目前的狀態
#[derive(Debug, Clone)]
pub struct PageControls<'a> {
    pub group: SymbolGroup,
    pub custom: &'a [String],
    pub available: &'a [String],
    pub live: bool,
    pub refresh_seconds: u64,
}

pub fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

struct DashboardPage<'a> {
    board: &'a Board,
    controls: &'a PageControls<'a>,
}

impl fmt::Display for DashboardPage<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_page(f, self.board, self.controls)
    }
}

pub fn render_page(board: &Board, controls: &PageControls<'_>) -> String {
    DashboardPage { board, controls }.to_string()
}

fn write_page<W: Write>(html: &mut W, board: &Board, controls: &PageControls<'_>) -> fmt::Result {
    html.write_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n")?;
    if controls.live {
        writeln!(
            html,
            "<meta http-equiv=\"refresh\" content=\"{}\">",
            controls.refresh_seconds
        )?;
    }
    writeln!(html, "<title>🔮 {}</title>", PAGE_TITLE)?;
    writeln!(html, "<style>{}</style>\n</head>\n<body>", STYLE)?;

    render_sidebar(html, board, controls)?;

    html.write_str("<main class=\"main\">\n")?;
    html.write_str("<h1>🌌 Advanced Astro Trading Dashboard</h1>\n")?;
    html.write_str(
        "<p class=\"caption\">Real-time planetary analysis for intraday trading decisions</p>\n",
    )?;

    render_transits(html, &board.transits)?;
    for group in &board.groups {
        render_group(html, group)?;
    }
    if board.groups.is_empty() {
        html.write_str("<p>No signals match the current filters.</p>\n")?;
    }

    writeln!(html, "<p class=\"caption\">{}</p>", escape(&board.caption()))?;
    writeln!(
        html,
        "<label>System performance <progress max=\"100\" value=\"{}\">{}%</progress></label>",
        board.performance(),
        board.performance()
    )?;
    html.write_str("</main>\n</body>\n</html>\n")
}

fn render_sidebar<W: Write>(html: &mut W, board: &Board, controls: &PageControls<'_>) -> fmt::Result {
    html.write_str("<aside class=\"sidebar\">\n<h2>Astro Trading Controls</h2>\n")?;
    html.write_str("<form method=\"get\" action=\"/\">\n")?;

    html.write_str("<label for=\"group\">Select Symbol Group</label>\n<select id=\"group\" name=\"group\">\n")?;
    for group in SymbolGroup::ALL {
        writeln!(
            html,
            "<option value=\"{}\"{}>{}</option>",
            group.key(),
            selected(group == controls.group),
            group.label()
        )?;
    }
    html.write_str("</select>\n")?;

    if controls.group == SymbolGroup::Custom {
        html.write_str("<label for=\"symbols\">Select Symbols</label>\n")?;
        html.write_str("<select id=\"symbols\" name=\"symbols\" multiple size=\"10\">\n")?;
        for symbol in controls.available {
            writeln!(
                html,
                "<option value=\"{0}\"{1}>{0}</option>",
                escape(symbol),
                selected(controls.custom.contains(symbol))
            )?;
        }
        html.write_str("</select>\n")?;
    }

    writeln!(
        html,
        "<label for=\"min_confidence\">Minimum Confidence Threshold</label>\n\
         <input id=\"min_confidence\" type=\"range\" name=\"min_confidence\" min=\"0\" max=\"100\" step=\"{}\" value=\"{}\"> {}%",
        CONFIDENCE_STEP, board.filters.min_confidence, board.filters.min_confidence
    )?;

    html.write_str("<label>Filter Signals</label>\n")?;
    for signal in Signal::DISPLAY_ORDER {
        writeln!(
            html,
            "<div><input type=\"checkbox\" name=\"signals\" value=\"{0}\"{1}> {0}</div>",
            signal.code(),
            checked(board.filters.signals.contains(&signal))
        )?;
    }

    // 未勾選時只會送出隱藏欄位的 false
    writeln!(
        html,
        "<input type=\"hidden\" name=\"live\" value=\"false\">\n\
         <label><input type=\"checkbox\" name=\"live\" value=\"true\"{}> Enable Live Mode</label>",
        checked(controls.live)
    )?;
    writeln!(
        html,
        "<label for=\"refresh\">Refresh Frequency (seconds)</label>\n\
         <input id=\"refresh\" type=\"number\" name=\"refresh\" min=\"15\" max=\"300\" value=\"{}\">",
        controls.refresh_seconds
    )?;
    html.write_str("<p><button type=\"submit\">Apply</button></p>\n</form>\n")?;

    html.write_str("<h3>Signal Guide</h3>\n<ul>\n")?;
    for signal in Signal::DISPLAY_ORDER {
        writeln!(html, "<li>{} {}</li>", signal.eye(), signal.guide())?;
    }
    html.write_str("</ul>\n")?;

    html.write_str("<h3>Planet Indicators</h3>\n<div class=\"legend\">\n")?;
    for planet in Planet::ALL {
        writeln!(html, "<div>{} {}</div>", planet.glyph(), planet)?;
    }
    html.write_str("</div>\n</aside>\n")
}

fn render_transits<W: Write>(html: &mut W, transits: &[TransitSummary]) -> fmt::Result {
    html.write_str("<h3 class=\"section-title\">🌠 Upcoming Planetary Transits (Next 24 Hours)</h3>\n")?;
    writeln!(
        html,
        "<div class=\"grid\" style=\"grid-template-columns: repeat({}, 1fr);\">",
        TRANSIT_COLUMNS
    )?;
    for transit in transits {
        writeln!(
            html,
            "<div class=\"symbol-card\"><div class=\"planet-indicator\">{}</div><div>\
             <div><strong>{}</strong></div><div>{}</div>\
             <div><small>Affects {} symbols</small></div></div></div>",
            transit.glyph,
            transit.planet,
            escape(&transit.transit_time),
            transit.count
        )?;
    }
    html.write_str("</div>\n")
}

fn render_group<W: Write>(html: &mut W, group: &SignalGroup) -> fmt::Result {
    writeln!(
        html,
        "<h3 class=\"section-title\">{}</h3>\n<div class=\"grid\" style=\"grid-template-columns: repeat({}, 1fr);\">",
        escape(&group.heading),
        group.columns
    )?;
    for card in &group.cards {
        render_card(html, card)?;
    }
    html.write_str("</div>\n")
}

fn render_card<W: Write>(html: &mut W, card: &SignalCard) -> fmt::Result {
    writeln!(
        html,
        "<div class=\"symbol-card {}\">\n\
         <div style=\"display: flex; align-items: center;\"><div class=\"planet-indicator\">{}</div>\
         <div class=\"symbol-name\">{}</div></div>\n\
         <div class=\"signal-display\" style=\"color: {};\">{}</div>\n\
         <div class=\"price-display\">Price: {}</div>\n\
         <div>Confidence: {}</div>\n\
         <div class=\"transit-info\">{}</div>\n\
         <div><small>{}</small></div>\n</div>",
        card.signal.css_class(),
        card.planet.glyph(),
        escape(&card.symbol),
        card.signal.color(),
        card.signal_display(),
        card.price_display(),
        card.confidence_display(),
        escape(&card.transit),
        escape(&card.reason)
    )
}

fn selected(on: bool) -> &'static str {
    if on {
        " selected"
    } else {
        ""
    }
}

fn checked(on: bool) -> &'static str {
    if on {
        " checked"
    } else {
        ""
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::board::BoardFilters;
    use chrono::{TimeZone, Utc};
    use std::time::Duration;

    fn board_with(symbol: &str) -> Board {
        let card = SignalCard {
            symbol: symbol.to_string(),
            price: 2500.0,
            signal: Signal::Buy,
            reason: "Strong planetary support".to_string(),
            strength: 0.75,
            planet: Planet::Venus,
            transit: "Venus alignment at 11:02 UTC (prev: 11:05 UTC)".to_string(),
            next_transit: "11:02 UTC".to_string(),
        };
        Board::build(
            &[card],
            &BoardFilters::default(),
            1,
            Duration::from_millis(1500),
            Utc.with_ymd_and_hms(2024, 8, 9, 10, 11, 12).unwrap(),
        )
    }

    fn controls(live: bool) -> PageControls<'static> {
        PageControls {
            group: SymbolGroup::Futures,
            custom: &[],
            available: &[],
            live,
            refresh_seconds: 45,
        }
    }

    #[test]
    fn test_escape() {
        assert_eq!(
            escape("<a href=\"x\">Tom & 'Jerry'</a>"),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; &#39;Jerry&#39;&lt;/a&gt;"
        );
    }

    #[test]
    fn test_page_contains_board_sections() {
        let page = render_page(&board_with("NSE:TITAN"), &controls(false));

        assert!(page.contains("🌌 Advanced Astro Trading Dashboard"));
        assert!(page.contains("🌠 Upcoming Planetary Transits (Next 24 Hours)"));
        assert!(page.contains("Affects 1 symbols"));
        assert!(page.contains("👁️🟢 BUY Signals (1)"));
        assert!(page.contains("class=\"symbol-card signal-buy\""));
        assert!(page.contains("Price: 2,500.00"));
        assert!(page.contains("Confidence: 75%"));
        assert!(page.contains("Processed 1 symbols in 1.50s"));
        assert!(page.contains("value=\"15\">15%</progress>"));
        assert!(page.contains("<option value=\"futures\" selected>Futures</option>"));
        assert!(page.contains("value=\"STRONG_BUY\" checked"));
        assert!(page.contains("value=\"WARNING\"> WARNING"));
        assert!(!page.contains("http-equiv=\"refresh\""));
    }

    #[test]
    fn test_live_mode_adds_meta_refresh() {
        let page = render_page(&board_with("NSE:TITAN"), &controls(true));
        assert!(page.contains("<meta http-equiv=\"refresh\" content=\"45\">"));
        assert!(page.contains("name=\"live\" value=\"true\" checked"));
    }

    #[test]
    fn test_symbols_are_escaped() {
        let page = render_page(&board_with("<script>"), &controls(false));
        assert!(page.contains("&lt;script&gt;"));
        assert!(!page.contains("<div class=\"symbol-name\"><script>"));
    }

    #[test]
    fn test_custom_group_lists_symbols() {
        let available = vec!["NSE:ITC".to_string(), "NSE:SBIN".to_string()];
        let custom = vec!["NSE:SBIN".to_string()];
        let page = render_page(
            &board_with("NSE:SBIN"),
            &PageControls {
                group: SymbolGroup::Custom,
                custom: &custom,
                available: &available,
                live: false,
                refresh_seconds: 60,
            },
        );
        assert!(page.contains("<option value=\"NSE:ITC\">NSE:ITC</option>"));
        assert!(page.contains("<option value=\"NSE:SBIN\" selected>NSE:SBIN</option>"));
    }
}
