#![deny(
    clippy::all,
    clippy::nursery,
    clippy::pedantic,
    clippy::style,
    clippy::complexity,
    clippy::perf,
    clippy::correctness,
    clippy::suspicious,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(
    clippy::similar_names,
    clippy::missing_safety_doc,
    clippy::missing_panics_doc,
    clippy::missing_errors_doc
)]

//! In-memory TRN network for demos and offline sessions.
//!
//! [`DemoChain`] implements every chain collaborator the copilot consumes.
//! New addresses are funded from a faucet on first use, swaps settle at fixed
//! exchange rates and liquidity deposits mint LP tokens pro rata.

mod demo;
mod ledger;

pub use demo::DemoChain;
