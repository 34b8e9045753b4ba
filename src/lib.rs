//! Match data collector for the Riot API: polls match and spectator
//! endpoints, flattens results into warehouse rows and serves rolling
//! technical indicators (RSI, Bollinger Bands) straight from SQL.

pub mod collector;
pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod processor;
pub mod riot;
