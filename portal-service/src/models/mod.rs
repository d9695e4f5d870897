mod account;
mod audit;
mod company;

pub use account::{Account, AccountScope, AccountSummary, ApprovalStatus, Role};
pub use audit::{AuditEntry, LogActor, LogFilter, LogRecord};
pub use company::Company;
