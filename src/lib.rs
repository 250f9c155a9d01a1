pub mod numeric;
pub mod transform;
pub mod math_utils;
pub mod bbox;
pub mod constraint;
pub mod affordance;
pub mod presets;
pub mod grab;
pub mod manipulator;
pub mod host;
pub mod config;
pub mod bounding_box;

pub mod prelude;
