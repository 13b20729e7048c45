//! Contract between the reconciler and a native widget toolkit.

use thiserror::Error;

use crate::props::{PropValue, Props};

/// Handle of a native widget, issued by the host adapter.
pub type WidgetId = usize;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HostError {
    #[error("unknown host tag `{tag}`")]
    UnknownHostTag { tag: String },
    #[error("property `{key}` is not supported by `{tag}`")]
    UnsupportedProp { tag: String, key: String },
    #[error("widget {id} missing")]
    MissingWidget { id: WidgetId },
    #[error("`{tag}` does not accept children")]
    ChildrenNotSupported { tag: String },
    #[error("`{tag}` accepts at most {limit} child widget(s)")]
    TooManyChildren { tag: String, limit: usize },
}

/// Everything the reconciler needs from a native toolkit.
///
/// `UnsupportedProp` from `set_prop`/`clear_prop` is recoverable; every other
/// error aborts the running render pass.
pub trait HostAdapter {
    fn create_instance(
        &mut self,
        tag: &str,
        initial_props: &Props,
        parent: Option<WidgetId>,
    ) -> Result<WidgetId, HostError>;

    fn set_prop(&mut self, widget: WidgetId, key: &str, value: &PropValue)
        -> Result<(), HostError>;

    /// Resets `key` to the kind's default value.
    fn clear_prop(&mut self, widget: WidgetId, key: &str) -> Result<(), HostError>;

    fn append_child(
        &mut self,
        parent: WidgetId,
        child: WidgetId,
        index: usize,
    ) -> Result<(), HostError>;

    fn remove_child(&mut self, parent: WidgetId, child: WidgetId) -> Result<(), HostError>;

    fn destroy_instance(&mut self, widget: WidgetId) -> Result<(), HostError>;
}

impl<H: HostAdapter + ?Sized> HostAdapter for Box<H> {
    fn create_instance(
        &mut self,
        tag: &str,
        initial_props: &Props,
        parent: Option<WidgetId>,
    ) -> Result<WidgetId, HostError> {
        (**self).create_instance(tag, initial_props, parent)
    }

    fn set_prop(
        &mut self,
        widget: WidgetId,
        key: &str,
        value: &PropValue,
    ) -> Result<(), HostError> {
        (**self).set_prop(widget, key, value)
    }

    fn clear_prop(&mut self, widget: WidgetId, key: &str) -> Result<(), HostError> {
        (**self).clear_prop(widget, key)
    }

    fn append_child(
        &mut self,
        parent: WidgetId,
        child: WidgetId,
        index: usize,
    ) -> Result<(), HostError> {
        (**self).append_child(parent, child, index)
    }

    fn remove_child(&mut self, parent: WidgetId, child: WidgetId) -> Result<(), HostError> {
        (**self).remove_child(parent, child)
    }

    fn destroy_instance(&mut self, widget: WidgetId) -> Result<(), HostError> {
        (**self).destroy_instance(widget)
    }
}
