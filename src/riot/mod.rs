//! Typed wrappers around the official Riot REST endpoints used by the
//! collector: Account-V1, Summoner-V4, Match-V5 and Spectator-V4.

mod client;
mod region;
pub mod types;

pub use client::RiotClient;
pub use region::{Platform, Region};
