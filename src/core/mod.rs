// src/core/mod.rs

pub mod color;
pub mod commons;
pub mod manifest;
pub mod paths;
pub mod project;
pub mod registry;
pub mod script_kit;
pub mod script_locator;
