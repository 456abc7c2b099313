//! NutChat Library
//!
//! Nutrition chat backend: meal parsing, food matching against a reference
//! table, nutrient totals and dietary advice.

pub mod api;
pub mod build_info;
pub mod chat;
pub mod config;
pub mod db;
pub mod llm;
pub mod models;
pub mod nutrition;
pub mod status;
pub mod test_utils;
