pub mod area;
pub mod bundle;
pub mod profile;
pub mod role;

pub use area::{Area, MaxLines, Template};
pub use bundle::{Bundle, RoleValue};
pub use profile::{RenderProfile, RoleStyle};
pub use role::RoleKind;
