use crate::domain::model::{Planet, Signal};

pub const STRONG_BUY_ABOVE: f64 = 0.85;
pub const BUY_ABOVE: f64 = 0.7;
pub const STRONG_SELL_BELOW: f64 = 0.15;
pub const SELL_BELOW: f64 = 0.3;

/// 由行星強度推導訊號；先看共通門檻，再套用個別行星規則
pub fn calculate_signal(strength: f64, planet: Planet) -> (Signal, &'static str) {
    if strength > STRONG_BUY_ABOVE {
        return (Signal::StrongBuy, "Extremely favorable planetary alignment");
    }
    if strength > BUY_ABOVE {
        return (Signal::Buy, "Strong planetary support");
    }
    if strength < STRONG_SELL_BELOW {
        return (Signal::StrongSell, "Critical planetary opposition");
    }
    if strength < SELL_BELOW {
        return (Signal::Sell, "Challenging planetary aspects");
    }

    match planet {
        Planet::Mercury if strength > 0.4 && strength < 0.6 => {
            (Signal::Warning, "Mercury neutral - potential volatility")
        }
        Planet::Mars if strength > 0.6 => (Signal::Buy, "Mars energy driving momentum"),
        Planet::Saturn if strength < 0.4 => (Signal::Sell, "Saturn restriction in effect"),
        _ => (Signal::Hold, "Neutral planetary influence"),
    }
}

pub fn transit_alert(planet: Planet, next: &str, prev: &str) -> String {
    let phrase = match planet {
        Planet::Sun => "Solar peak",
        Planet::Moon => "Lunar shift",
        Planet::Mercury => "Mercury transit",
        Planet::Venus => "Venus alignment",
        Planet::Mars => "Mars energy",
        Planet::Jupiter => "Jupiter expansion",
        Planet::Saturn => "Saturn restriction",
        Planet::Uranus => "Uranus disruption",
        Planet::Neptune => "Neptune intuition",
        Planet::Pluto => "Pluto transformation",
    };
    format!("{} at {} (prev: {})", phrase, next, prev)
}
