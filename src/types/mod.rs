pub mod price;
pub mod symbol;
pub mod trading_hours;
