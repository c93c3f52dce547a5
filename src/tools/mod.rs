pub mod adapter;
pub mod envelope;
pub mod params;
pub mod shaping;
pub mod zoekt_tool_router;

pub use adapter::ToolAdapter;
pub use envelope::{ToolEnvelope, ToolErrorKind, ToolFailure};
pub use params::{FetchContentParams, SearchParams, SearchPromptGuideParams};
pub use shaping::ShapingLimits;
pub use zoekt_tool_router::ZoektToolRouter;
