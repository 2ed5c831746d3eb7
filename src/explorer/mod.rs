pub mod columns;
pub mod filters;
pub mod pagination;
pub mod panels;
pub mod search;
pub mod selection;
pub mod state;

pub use state::{Action, BulkOperation, Explorer, ExplorerEvent, PanelView};
