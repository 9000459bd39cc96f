//! `wagonops-bom` — Bill of Materials definitions and the consumption
//! calculator.
//!
//! One BOM exists per wagon type. It names the parts a wagon is built from
//! and the production stages that consume them, with a per-stage, per-part
//! consumption rate. The calculator in [`Bom::consumption`] is pure: daily
//! reports feed it stage-completion counts and it answers how many of each
//! part left the inventory that day.

pub mod definition;

pub use definition::{Bom, PartRequirement, PartUsage, Stage};
