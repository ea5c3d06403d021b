pub mod pages;
pub mod toasts;
pub mod tools;

pub use pages::{PagesView, show_pages};
pub use toasts::show_toasts;
pub use tools::{ToolPanels, show_tool};
