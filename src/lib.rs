//! Outboard Quote
//!
//! Outboard Quote is the pricing and package-configuration engine behind an outboard motor
//! sales quoting tool: promotion matching, warranty extension pricing, financing, quote totals
//! and Essential/Complete/Premium package tiers.

pub mod config;
pub mod financing;
pub mod fixtures;
pub mod money;
pub mod motors;
pub mod options;
pub mod packages;
pub mod prelude;
pub mod promotions;
pub mod quote;
pub mod quote_sheet;
pub mod snapshot;
pub mod trade_in;
pub mod warranty;
