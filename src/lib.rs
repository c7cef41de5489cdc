//! errlens - cross-view coordination core for inspecting where a text
//! classifier goes wrong
//!
//! Loads a dataset bundle with its mined error rules, serves the five
//! dashboard views over HTTP, and orchestrates the exchange with the
//! statistics backend that scores rule subpopulations.

pub mod backend;
pub mod bus;
pub mod cli;
pub mod concepts;
pub mod config;
pub mod coordinator;
pub mod dataset;
pub mod observability;
pub mod rules;
pub mod server;
pub mod session;
pub mod views;
