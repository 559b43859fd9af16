pub mod open_exchange_rates;

pub use open_exchange_rates::HttpSource;
