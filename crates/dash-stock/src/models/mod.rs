//! Data model shared by providers, the summarizer and reports

pub mod bar;
pub mod period;
pub mod summary;

pub use bar::PriceBar;
pub use period::Period;
pub use summary::StockSummary;
