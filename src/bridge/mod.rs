//! Header notification handling: fetch, encode, validate and distribute.

pub mod pipeline;
pub mod receipts;
pub mod watch;

pub use pipeline::{Bridge, NotificationReport, Stage};
pub use receipts::{collect_receipts, wait_for_transaction_receipt};
pub use watch::{HeaderWatcher, WatchStats};
