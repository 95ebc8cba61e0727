use crate::alerting::alert_decision::Direction;
use crate::types::{price::Price, symbol::Symbol};

pub fn startup(symbol: &Symbol, price: Option<Price>, threshold_step: f64) -> String {
    match price {
        Some(price) => format!(
            "✅ Start: watching {symbol}. Price: ${price}. Alert on a move of ±${threshold_step:.2}."
        ),
        None => format!("✅ Start: watching {symbol}. Alert on a move of ±${threshold_step:.2}."),
    }
}

pub fn market_open(symbol: &Symbol, price: Price) -> String {
    format!("🔔 Market open: watching {symbol} from ${price}.")
}

pub fn market_close(symbol: &Symbol) -> String {
    format!("🌙 Market closed: pausing {symbol} until the next session.")
}

pub fn price_alert(symbol: &Symbol, price: Price, direction: Direction, moved: f64) -> String {
    let sign = match direction {
        Direction::Up => '+',
        Direction::Down => '-',
    };

    format!(
        "{} {symbol} at ${price} ({sign}${moved:.2})",
        direction.indicator()
    )
}
