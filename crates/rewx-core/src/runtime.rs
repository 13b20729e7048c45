use std::any::Any;
use std::fmt;
use std::marker::PhantomData;
use std::rc::Weak;

use crate::error::RenderError;
use crate::reconciler::NodeId;

pub(crate) type StateUpdate = Box<dyn FnOnce(&mut dyn Any)>;

pub(crate) struct PendingUpdate {
    pub(crate) node: NodeId,
    pub(crate) apply: StateUpdate,
}

/// Receiver of state updates; implemented by the root that owns the tree.
pub(crate) trait UpdateSink {
    fn enqueue(&self, update: PendingUpdate);
    fn is_rendering(&self) -> bool;
    fn flush(&self) -> Result<(), RenderError>;
}

#[derive(Clone)]
pub(crate) struct Updater {
    sink: Weak<dyn UpdateSink>,
    node: NodeId,
}

impl Updater {
    pub(crate) fn new(sink: Weak<dyn UpdateSink>, node: NodeId) -> Self {
        Self { sink, node }
    }

    fn schedule(&self, apply: StateUpdate) -> Result<(), RenderError> {
        let Some(sink) = self.sink.upgrade() else {
            log::debug!("state update for node {} dropped: root is gone", self.node);
            return Ok(());
        };
        sink.enqueue(PendingUpdate {
            node: self.node,
            apply,
        });
        // Updates raised during a pass are drained by that pass before it returns.
        if sink.is_rendering() {
            return Ok(());
        }
        sink.flush()
    }
}

/// Handle to a stateful component's state.
///
/// Outside a render pass each update re-renders the owning component's
/// subtree before returning. Updates issued while a pass is running (from a
/// lifecycle hook, say) are queued and applied before that pass returns.
pub struct StateHandle<S> {
    updater: Updater,
    _state: PhantomData<fn(&mut S)>,
}

impl<S: 'static> StateHandle<S> {
    pub(crate) fn new(updater: Updater) -> Self {
        Self {
            updater,
            _state: PhantomData,
        }
    }

    /// Applies a partial update: the closure assigns only the fields it changes.
    pub fn set_state(&self, update: impl FnOnce(&mut S) + 'static) -> Result<(), RenderError> {
        let node = self.updater.node;
        self.updater.schedule(Box::new(move |state: &mut dyn Any| {
            match state.downcast_mut::<S>() {
                Some(state) => update(state),
                None => log::error!("state update for node {node} has the wrong state type"),
            }
        }))
    }

    pub fn replace_state(&self, state: S) -> Result<(), RenderError> {
        self.set_state(move |current| *current = state)
    }

    pub fn node(&self) -> NodeId {
        self.updater.node
    }
}

impl<S> Clone for StateHandle<S> {
    fn clone(&self) -> Self {
        Self {
            updater: self.updater.clone(),
            _state: PhantomData,
        }
    }
}

impl<S> fmt::Debug for StateHandle<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateHandle")
            .field("node", &self.updater.node)
            .finish()
    }
}
