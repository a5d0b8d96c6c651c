pub mod stage0_resolve;
pub mod stage1_parse;
pub mod stage2_summarize;
pub mod stage3_assemble;

pub use stage0_resolve::*;
pub use stage1_parse::*;
pub use stage2_summarize::*;
pub use stage3_assemble::*;
