#![doc = r"Standard widget kinds, element constructors and prefabricated components for re-wx-rs."]

pub mod components;
pub mod elements;
pub mod registry;

pub use components::{labeled_field, Counter, Toggle};
pub use elements::{block, button, checkbox, column, frame, row, scroll, text, textbox};
pub use registry::{standard_registry, BLOCK, BUTTON, CHECKBOX, FRAME, SCROLL, TEXT, TEXTBOX};

pub mod prelude {
    pub use crate::components::*;
    pub use crate::elements::*;
    pub use crate::registry::standard_registry;
}
