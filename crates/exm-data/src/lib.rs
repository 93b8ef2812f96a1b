// Operations
mod operations;
pub use operations::*;

mod changes;
pub use changes::*;

mod sync;
pub use sync::*;

// Models
mod state;
pub use state::*;

mod groups;
pub use groups::*;

mod members;
pub use members::*;

mod categories;
pub use categories::*;

mod expenses;
pub use expenses::*;
