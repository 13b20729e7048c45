#![doc = r"Element model, component runtime and positional reconciler for re-wx-rs."]

extern crate self as rewx_core;

pub mod collections;
mod component;
mod element;
mod error;
mod host;
mod macros;
mod memory;
mod options;
mod props;
mod reconciler;
mod registry;
mod root;
mod runtime;

pub use component::{Component, ComponentClass, Context, FunctionComponent};
pub use element::{create_element, Element, ElementType, TEXT_PROP, TEXT_TAG};
pub use error::{HookResult, RenderError, RenderResult};
pub use host::{HostAdapter, HostError, WidgetId};
pub use memory::{MemoryHost, Widget};
pub use options::{ReconcilerOptions, DEFAULT_MAX_UPDATE_PASSES};
pub use props::{
    is_reserved, Callback, FromProp, NodeRef, PropValue, Props, CHILDREN_KEY, REF_KEY,
};
pub use reconciler::{LiveNode, NodeId, NodeKind};
pub use registry::{ChildPolicy, HostRegistry, WidgetKind};
pub use root::{render, Root};
pub use runtime::StateHandle;

pub mod prelude {
    pub use crate::{
        render, tree, Callback, Component, ComponentClass, Context, Element, FunctionComponent,
        HookResult, HostAdapter, HostRegistry, MemoryHost, NodeRef, PropValue, Props,
        RenderError, RenderResult, Root, StateHandle, WidgetKind,
    };
}
