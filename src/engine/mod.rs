mod controller;
mod domain;
mod lists;
mod parser;
mod scheduler;
mod store;
mod traits;

pub use controller::{CheckOutcome, ReloadController};
pub use domain::split_domain;
pub use lists::{FilterLists, ListSource, ListSummary};
pub use parser::{Entry, FileParser, ParseError};
pub use scheduler::TaskScheduler;
pub use store::FilterStore;
pub use traits::{ListParser, ListPathSource, Scheduler};
