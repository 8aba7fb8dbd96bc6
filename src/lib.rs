//! FoldGuide - interactive step-by-step origami instruction service
//!
//! A step sequence with a cursor, an enrichment cache in front of
//! external generators (text advice, image-grounded advice, avatar
//! video), and a REST surface over both.

pub mod api;
pub mod cache;
pub mod config;
pub mod errors;
pub mod guide;
pub mod logging;
pub mod rest;
