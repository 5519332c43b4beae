//! Widgets shared by the views.

pub mod detail;
pub mod filter;
pub mod progress;
pub mod status;
pub mod tree;

pub use detail::DetailPanel;
pub use filter::{FilterBar, TimelineFilter};
pub use progress::ProgressBar;
pub use status::StatusIndicator;
pub use tree::{TreeItem, TreeStyle, TreeWidget};
