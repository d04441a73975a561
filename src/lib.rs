//! Tally - Personal Finance Transaction API
//!
//! This crate implements a small REST API for recording income and expense
//! transactions. Every request passes through a per-client rate limiter with
//! sliding windows, temporary blocking and a bounded client store.

pub mod config;
pub mod error;
pub mod http;
pub mod ledger;
pub mod ratelimit;
