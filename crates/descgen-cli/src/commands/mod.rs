pub mod build;
pub mod check;
pub mod dump;
pub mod output;
pub mod run_common;
pub mod source_loader;

#[cfg(test)]
mod output_tests;
