pub mod completion;
pub mod config;
pub mod editor;
pub mod errors;
pub mod pipeline;
pub mod selector;
pub mod serve;
pub mod util;
pub mod vcs;
