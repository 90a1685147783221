//! CLI command implementations.
//!
//! | Module  | Commands handled             |
//! |---------|------------------------------|
//! | `run`   | `Run`, `Generate`, `Commit`  |
//! | `serve` | `Serve`                      |

pub mod run;
pub mod serve;

pub use run::{cmd_commit, cmd_generate, cmd_run};
pub use serve::cmd_serve;
