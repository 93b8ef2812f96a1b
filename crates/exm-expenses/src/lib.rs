pub mod clock;
pub mod color;
pub mod config;
pub mod controller;
pub mod dialogs;
pub mod filter;
pub mod presenters;

pub use clock::{Clock, SystemClock};
pub use color::{Color, ColorError};
pub use config::ControllerConfig;
pub use controller::{
    ExpenseListController, ExpenseStore, ScreenEvent, SyncOutcome, SyncTrigger,
};
pub use dialogs::{FilterDialogs, FilterKind, FilterSelection};
pub use filter::{FilterState, QueryVariant};
pub use presenters::{ChromePresenter, ListPresenter, Presenters};
