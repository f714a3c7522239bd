pub mod aggregator;
pub mod ledger;
pub mod month;
pub mod totals;

pub use aggregator::summarize;
pub use ledger::{
    LedgerError, LedgerUpdate, MonthLedger, MonthView, PersistPolicy, PersistStatus, SaveReport,
    SettingsChange,
};
pub use month::{days_in_month, initialize_month};
pub use totals::{month_totals, MonthTotals};
