//! suicide-rates - suicide statistics aggregation
//!
//! Loads per-record suicide statistics and computes suicide rates per
//! 100,000 population by country, year, sex and age group. Rates are always
//! a ratio of summed counts to summed populations within a group.

pub mod analysis;
pub mod cli;
pub mod config;
pub mod dataset;
pub mod models;
pub mod report;
