//! Payroll engine for temporary event staff.
//!
//! This crate turns noisy attendance records, a staffing roster and a posting's
//! pay policy into one payroll line per (worker, role) for a period, plus a
//! summary. The pipeline can run on a background execution context through the
//! [`dispatcher`], and is exposed over HTTP by [`api`].

#![warn(missing_docs)]

pub mod api;
pub mod calculation;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod export;
pub mod models;
