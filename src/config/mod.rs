pub mod connections;
pub mod session;

pub use connections::{ConnectionEntry, ConnectionStrings};
pub use session::SessionRecord;
