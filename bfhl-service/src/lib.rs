//! BFHL service: a health probe plus one multiplexed operations endpoint
//! (Fibonacci, primes, LCM, HCF, one-word AI answers).

pub mod config;
pub mod dtos;
pub mod handlers;
pub mod services;
pub mod startup;

pub use startup::{build_router, AppState, Application};
