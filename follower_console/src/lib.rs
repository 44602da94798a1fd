#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
//! Operator console: live tuning commands and the yes/no prompt.
//!
//! Everything is generic over `BufRead`/`Write` so the binary can hand over
//! stdin/stdout and tests can hand over byte slices.

pub mod command;
pub mod console;
pub mod prompt;

pub use command::{TuningCommand, TuningError, apply, parse};
pub use console::{ConsoleExit, MENU, run_console};
pub use prompt::confirm_yes_no;
