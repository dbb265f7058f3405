//! Integration tests for jake-lib, run against in-memory projects.

mod common;

mod build_tests;
mod bundle_tests;
mod helper_tests;
mod package_tests;
