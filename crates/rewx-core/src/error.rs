use thiserror::Error;

use crate::element::Element;
use crate::host::HostError;
use crate::reconciler::NodeId;

/// Failure of a `render` or `set_state` call.
///
/// Structural errors abort the pass that hit them; the live tree is left in
/// whatever state the depth-first walk had reached.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("invalid element type: {reason}")]
    InvalidElementType { reason: String },
    #[error("unknown host tag `{tag}`")]
    UnknownHostTag { tag: String },
    /// Only surfaced when `ReconcilerOptions::strict_props` is set.
    #[error("property `{key}` is not supported by `{tag}`")]
    UnsupportedProp { tag: String, key: String },
    #[error(transparent)]
    Host(HostError),
    #[error("missing required property `{key}`")]
    MissingProp { key: String },
    #[error("property `{key}` expected {expected}, found {found}")]
    PropType {
        key: String,
        expected: &'static str,
        found: &'static str,
    },
    #[error("component `{component}` failed: {message}")]
    Component { component: String, message: String },
    #[error("live node {id} missing")]
    MissingNode { id: NodeId },
    #[error("render called while a render pass is already running")]
    Reentrant,
    #[error("state updates did not settle after {limit} passes")]
    UpdateLoop { limit: usize },
}

impl RenderError {
    /// Error raised by user code inside a render function or lifecycle hook.
    pub fn component(component: impl Into<String>, message: impl Into<String>) -> Self {
        RenderError::Component {
            component: component.into(),
            message: message.into(),
        }
    }
}

impl From<HostError> for RenderError {
    fn from(err: HostError) -> Self {
        match err {
            HostError::UnknownHostTag { tag } => RenderError::UnknownHostTag { tag },
            HostError::UnsupportedProp { tag, key } => RenderError::UnsupportedProp { tag, key },
            other => RenderError::Host(other),
        }
    }
}

pub type RenderResult = Result<Element, RenderError>;

pub type HookResult = Result<(), RenderError>;
