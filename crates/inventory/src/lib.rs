//! `wagonops-inventory` — Part Ledger domain types.
//!
//! The Part Ledger holds one additive counter per (project, part). Rows are
//! only ever adjusted by increments; stores upsert a zero-based row when a
//! part first appears. Balances may go negative: consumption reported ahead
//! of the matching production receipt is treated as a transient backlog, not
//! an error (the store layer logs a warning when a balance crosses zero).

pub mod ledger;

pub use ledger::{
    LedgerDelta, LedgerSnapshot, ReceiptEntry, ReceiptRecord, StockReceipt, consume_deltas,
    produce_deltas,
};
