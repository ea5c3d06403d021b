pub mod codec;
mod controller;
mod drag;
mod naming;
pub mod notify;
mod plan;
mod progress;
mod registry;
mod session;
pub mod thumbnail;
mod types;

pub use codec::{DocumentCodec, LopdfCodec, assemble};
pub use controller::PageController;
pub use drag::{DragState, PendingMove};
pub use naming::{base_name, output_file_name};
pub use notify::{NotificationHub, Subscription, Toast, ToastId, ToastRequest, ToastVariant};
pub use plan::{CommitPlan, PageRange, PageSelection};
pub use progress::*;
pub use registry::{PageDescriptor, PageRegistry};
pub use session::*;
pub use thumbnail::{NoThumbnails, Thumbnail, ThumbnailKey, ThumbnailProvider, ThumbnailSet};
pub use types::*;
