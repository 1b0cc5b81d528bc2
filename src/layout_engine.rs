pub mod apply;
pub mod calculate;
mod direction;
pub mod engine;
pub mod message;
pub mod weights;
pub mod workspaces;

pub use direction::Direction;
pub use engine::{EventResponse, LayoutCommand, LayoutEngine, LayoutEvent};
pub use message::{MessageError, WeightAdjustment};
pub use workspaces::{ConfigProvider, MainSide, WorkspaceConfig};
