//! Planet-symbol lookup.
//!
//! A symbol is matched against three keyword tables in order. The first table is
//! ordered: the earliest keyword contained in the upper-cased symbol wins, so broad
//! keys such as `IT` or `NIFTY` shadow the more specific entries listed after them.

use crate::domain::model::Planet;

pub const DEFAULT_PLANET: Planet = Planet::Sun;

/// 商品、指數、產業、加密貨幣與個股的對照表，順序即優先順序
const PLANET_KEYWORDS: &[(&str, Planet)] = &[
    // 商品
    ("GOLD", Planet::Sun),
    ("SILVER", Planet::Moon),
    ("CRUDEOIL", Planet::Mars),
    ("NATURALGAS", Planet::Venus),
    ("ALUMINIUM", Planet::Mercury),
    ("COPPER", Planet::Venus),
    ("SUGAR", Planet::Jupiter),
    ("OIL", Planet::Neptune),
    // 指數
    ("NIFTY", Planet::Jupiter),
    ("BANKNIFTY", Planet::Mercury),
    ("SENSEX", Planet::Sun),
    ("FINNIFTY", Planet::Mercury),
    ("MIDCAP", Planet::Venus),
    ("SMALLCAP", Planet::Mars),
    // 產業
    ("AUTO", Planet::Mars),
    ("IT", Planet::Mercury),
    ("PHARMA", Planet::Moon),
    ("FMCG", Planet::Venus),
    ("BANK", Planet::Mercury),
    ("FINANCE", Planet::Jupiter),
    ("METAL", Planet::Mars),
    ("ENERGY", Planet::Sun),
    ("REALTY", Planet::Venus),
    // 加密貨幣
    ("BTC", Planet::Uranus),
    ("ETH", Planet::Neptune),
    ("SOL", Planet::Pluto),
    // 個股
    ("RELIANCE", Planet::Jupiter),
    ("TATA", Planet::Venus),
    ("HDFC", Planet::Mercury),
    ("INFY", Planet::Saturn),
    ("ICICI", Planet::Neptune),
    ("BHARTI", Planet::Mars),
    ("TCS", Planet::Mercury),
    ("WIPRO", Planet::Mercury),
    ("HINDUNILVR", Planet::Venus),
    ("ITC", Planet::Venus),
    ("ASIANPAINT", Planet::Venus),
    ("NESTLE", Planet::Moon),
    ("DEFAULT", DEFAULT_PLANET),
];

const SECTOR_KEYWORDS: &[(&[&str], Planet)] = &[
    (&["BANK", "FIN"], Planet::Mercury),
    (&["PHARMA", "DRUG", "MED", "HEALTH"], Planet::Moon),
    (&["IT", "TECH"], Planet::Mercury),
    (&["AUTO", "MOTOR"], Planet::Mars),
    (&["OIL", "GAS"], Planet::Sun),
    (&["METAL", "STEEL"], Planet::Mars),
    (&["FMCG", "CONSUM"], Planet::Venus),
];

const TRAIT_KEYWORDS: &[(&[&str], Planet)] = &[
    (&["GOLD", "SUN", "LIGHT"], Planet::Sun),
    (&["SILVER", "MOON", "WATER"], Planet::Moon),
    (&["OIL", "FIRE", "ENERGY"], Planet::Mars),
    (&["LOVE", "BEAUTY", "ART"], Planet::Venus),
    (&["COMM", "TECH", "MERC"], Planet::Mercury),
    (&["GROWTH", "LUCK", "EXPAN"], Planet::Jupiter),
];

pub fn planet_for(symbol: &str) -> Planet {
    let upper = symbol.to_uppercase();

    PLANET_KEYWORDS
        .iter()
        .find(|(keyword, _)| upper.contains(keyword))
        .map(|(_, planet)| *planet)
        .or_else(|| {
            SECTOR_KEYWORDS
                .iter()
                .chain(TRAIT_KEYWORDS)
                .find(|(keywords, _)| keywords.iter().any(|k| upper.contains(k)))
                .map(|(_, planet)| *planet)
        })
        .unwrap_or(DEFAULT_PLANET)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_commodities_map_to_their_planets() {
        assert_eq!(planet_for("MCX:GOLD1!"), Planet::Sun);
        assert_eq!(planet_for("MCX:SILVER1!"), Planet::Moon);
        assert_eq!(planet_for("MCX:CRUDEOIL1!"), Planet::Mars);
        assert_eq!(planet_for("MCX:COPPER1!"), Planet::Venus);
        assert_eq!(planet_for("OANDA:SUGARUSD"), Planet::Jupiter);
    }

    #[test]
    fn test_first_keyword_in_table_order_wins() {
        // NIFTY 排在 BANKNIFTY 之前
        assert_eq!(planet_for("NSE:BANKNIFTY1!"), Planet::Jupiter);
        // IT 排在 ITC 之前
        assert_eq!(planet_for("NSE:ITC1!"), Planet::Mercury);
        // TATA 排在 STEEL 關鍵字之前
        assert_eq!(planet_for("NSE:TATASTEEL"), Planet::Venus);
        // BITSTAMP 內含 IT
        assert_eq!(planet_for("BITSTAMP:BTCUSD"), Planet::Mercury);
    }

    #[test]
    fn test_stock_keywords() {
        assert_eq!(planet_for("NSE:INFY1!"), Planet::Saturn);
        assert_eq!(planet_for("COINBASE:ETHUSD"), Planet::Neptune);
        assert_eq!(planet_for("NSE:RELIANCE1!"), Planet::Jupiter);
    }

    #[test]
    fn test_sector_keywords_apply_after_table() {
        assert_eq!(planet_for("NSE:MEDPLUS"), Planet::Moon);
        assert_eq!(planet_for("NSE:STARHEALTH"), Planet::Moon);
        assert_eq!(planet_for("NSE:JSWSTEEL1!"), Planet::Mars);
        assert_eq!(planet_for("NSE:GUJGASLTD"), Planet::Sun);
    }

    #[test]
    fn test_trait_keywords_and_default() {
        assert_eq!(planet_for("NSE:WATERBASE"), Planet::Moon);
        assert_eq!(planet_for("NSE:TRENT1!"), DEFAULT_PLANET);
        assert_eq!(planet_for(""), DEFAULT_PLANET);
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        assert_eq!(planet_for("mcx:silver1!"), planet_for("MCX:SILVER1!"));
    }
}
