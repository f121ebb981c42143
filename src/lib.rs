include!(concat!(env!("OUT_DIR"), "/translations.rs"));

pub mod cli;
pub mod constants;
pub mod core;
pub mod models;
pub mod scripts;
pub mod system;

#[cfg(test)]
pub(crate) mod test_support;
