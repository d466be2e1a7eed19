//! Orchestration for the `gfit` command line tool: logging activities into
//! the Fitness API and cleaning up same-day records it created.

pub mod cleanup;
pub mod logger;

#[cfg(test)]
mod test_utils;
