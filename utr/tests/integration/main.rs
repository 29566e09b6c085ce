#[path = "../common/mod.rs"]
mod common;

mod candidates_tests;
mod command_tests;
mod config_tests;
mod run_tests;
