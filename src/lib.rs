//! Loader for the UCI "Online Retail II" transaction data.
//!
//! [`Loader::standard_access`] serves the dataset from a local CSV cache when
//! one exists, and otherwise reads the remote workbook and writes the cache.
//! [`Loader::load`] reads a single `.xlsx` or `.csv` source directly.

pub mod cache;
pub mod config;
pub mod dataset;
pub mod error;
pub mod fetch;
pub mod loader;
pub mod observe;
pub mod source;

#[cfg(test)]
mod test_support;

pub use config::LoaderConfig;
pub use dataset::Dataset;
pub use error::DatasetError;
pub use loader::Loader;
