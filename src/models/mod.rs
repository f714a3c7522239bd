pub mod day_entry;
pub mod period;
pub mod settings;
pub mod summary;

pub use day_entry::{checked_profit, DayEntry, TradeDayRow};
pub use period::YearMonth;
pub use settings::{format_phone, SettingsDefaults, UserSettings};
pub use summary::{DayResult, MonthlySummary, MonthlySummaryRow};
