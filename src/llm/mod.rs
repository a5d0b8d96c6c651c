pub mod client;
pub mod extract;
pub mod prompts;

pub use client::*;
pub use extract::*;
pub use prompts::*;
