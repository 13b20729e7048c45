//! Constructors for host elements of the standard registry.

use rewx_core::{Callback, Element};

use crate::registry::{BLOCK, BUTTON, CHECKBOX, FRAME, SCROLL, TEXT, TEXTBOX};

pub fn block() -> Element {
    Element::new(BLOCK)
}

pub fn text(label: impl Into<String>) -> Element {
    Element::new(TEXT).prop("label", label.into())
}

pub fn button(label: impl Into<String>, on_click: Callback) -> Element {
    Element::new(BUTTON)
        .prop("label", label.into())
        .prop("on_click", on_click)
}

pub fn textbox(value: impl Into<String>) -> Element {
    Element::new(TEXTBOX).prop("value", value.into())
}

pub fn checkbox(label: impl Into<String>, checked: bool) -> Element {
    Element::new(CHECKBOX)
        .prop("label", label.into())
        .prop("checked", checked)
}

pub fn frame(title: impl Into<String>) -> Element {
    Element::new(FRAME).prop("title", title.into())
}

pub fn scroll() -> Element {
    Element::new(SCROLL)
}

/// Vertical stack of `children`.
pub fn column<I>(children: I) -> Element
where
    I: IntoIterator,
    I::Item: Into<Element>,
{
    block().prop("direction", "column").with_children(children)
}

/// Horizontal stack of `children`.
pub fn row<I>(children: I) -> Element
where
    I: IntoIterator,
    I::Item: Into<Element>,
{
    block().prop("direction", "row").with_children(children)
}
