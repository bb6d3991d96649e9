//! Core library for rediscover-weekly
pub mod config;
pub mod models;
pub mod error;
pub mod token;
pub mod api;
pub mod finder;
pub mod collector;
pub mod sync;
pub mod util;
