pub mod clash;
pub mod cli;
pub mod data;
pub mod matchup;
pub mod parallel;
pub mod server;
