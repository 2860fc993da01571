pub mod catalog;
pub mod clock;
pub mod config;
pub mod data_structures;
pub mod error;
pub mod ledger;
pub mod session;
pub mod store;

pub use catalog::ToolCatalog;
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::LedgerConfig;
pub use data_structures::{
    Access, Identity, MonthlyUsage, Remaining, Tier, ToolDescriptor, ToolVariant, UsageEvent,
    UserProfile,
};
pub use error::ToolError;
pub use ledger::UsageLedger;
pub use session::Session;
pub use store::UsageStore;

pub use anyhow::Result;
pub use chrono::{DateTime, Duration, NaiveDate, Utc};

pub mod prelude {
    pub use crate::catalog::ToolCatalog;
    pub use crate::clock::{Clock, SystemClock};
    pub use crate::data_structures::{Remaining, Tier};
    pub use crate::error::ToolError;
    pub use crate::session::Session;
    pub use anyhow::Result;
    pub use chrono::{DateTime, Utc};
}
