mod categories;
mod expenses;
mod groups;
mod init;
mod members;
mod refresh;

pub use categories::*;
pub use expenses::*;
pub use groups::*;
pub use init::*;
pub use members::*;
pub use refresh::*;
