//! Scatter chart
//!
//! Scales, the retained scene, and everything drawn into it:
//! - [`scale`]: date-time → pixel mapping and axis ticks
//! - [`scene`]: the node arena and its markup serialization
//! - [`render`]: teardown plus axes, markers and legend for one pass
//! - [`legend`] / [`tooltip`]: pointer interaction

pub mod axis;
pub mod legend;
pub mod render;
pub mod scale;
pub mod scene;
pub mod tooltip;

pub use axis::{Axis, Orientation};
pub use legend::{Toggle, HIDE_CLASS, INACTIVE_CLASS};
pub use render::{CanvasSize, RenderError, RenderedChart, Renderer, TIME_AXIS_TITLE};
pub use scale::{TickInterval, TimeScale};
pub use scene::{Element, NodeId, Scene, Selector};
pub use tooltip::{
    Fade, HideTimer, HorizontalSide, InteractionState, MarkerBox, Placement, TooltipContent,
    TooltipPhase, VerticalSide,
};
