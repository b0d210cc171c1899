// Library surface shared by the binary and the integration tests.
pub mod app;
pub mod app_dirs;
pub mod config;
pub mod error;
pub mod flashcards;
pub mod generate;
pub mod logging;
pub mod matching;
pub mod quiz;
pub mod runtime;
pub mod schema;
pub mod session;
pub mod ui;
pub mod util;
