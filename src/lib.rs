//! Alpha factor tooling: compute per-day factor files from level-5 tick
//! data, and score a directory of such files against a reference set.

pub mod config;
pub mod data;
pub mod factor;
pub mod report;
pub mod score;
