// Library surface for the binary, headless tests and reuse.
pub mod app;
pub mod board;
pub mod clock;
pub mod config;
pub mod corpus;
pub mod error;
pub mod input;
pub mod keys;
pub mod lock;
pub mod logging;
pub mod runtime;
pub mod session;
pub mod stats;
pub mod tokenizer;
pub mod ui;

pub use error::{Error, Result};
