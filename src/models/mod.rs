pub mod record;
pub mod session;
pub mod summary;
pub mod turn;

pub use record::*;
pub use session::*;
pub use summary::*;
pub use turn::*;
