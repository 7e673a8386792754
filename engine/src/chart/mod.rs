//! Chart-space / pixel-space plumbing shared by the annotation engine.

pub mod converter;
pub mod headless;
pub mod pan;
pub mod surface;

pub use converter::CoordinateConverter;
pub use headless::HeadlessSurface;
pub use pan::{PanController, ViewRanges};
pub use surface::{LogicalRange, PriceRange, RenderSurface};
