use std::any::Any;
use std::cell::{Ref, RefCell};
use std::rc::Rc;

use rewx_core::{
    ChildPolicy, Element, HostAdapter, HostError, HostRegistry, MemoryHost, PropValue, Props,
    ReconcilerOptions, RenderError, Root, WidgetId, WidgetKind, TEXT_PROP, TEXT_TAG,
};

/// One successful call into a host adapter.
#[derive(Debug, Clone, PartialEq)]
pub enum HostOp {
    Create {
        widget: WidgetId,
        tag: String,
        parent: Option<WidgetId>,
    },
    SetProp {
        widget: WidgetId,
        key: String,
        value: PropValue,
    },
    ClearProp {
        widget: WidgetId,
        key: String,
    },
    Append {
        parent: WidgetId,
        child: WidgetId,
        index: usize,
    },
    RemoveChild {
        parent: WidgetId,
        child: WidgetId,
    },
    Destroy {
        widget: WidgetId,
    },
}

impl HostOp {
    pub fn is_structural(&self) -> bool {
        !matches!(self, HostOp::SetProp { .. } | HostOp::ClearProp { .. })
    }
}

/// Shared, cloneable log of host operations.
#[derive(Clone, Default)]
pub struct OpLog(Rc<RefCell<Vec<HostOp>>>);

impl OpLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, op: HostOp) {
        self.0.borrow_mut().push(op);
    }

    /// Returns and clears everything recorded so far.
    pub fn take(&self) -> Vec<HostOp> {
        std::mem::take(&mut *self.0.borrow_mut())
    }

    pub fn snapshot(&self) -> Vec<HostOp> {
        self.0.borrow().clone()
    }

    pub fn clear(&self) {
        self.0.borrow_mut().clear();
    }

    pub fn len(&self) -> usize {
        self.0.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.borrow().is_empty()
    }

    /// Tags of created widgets, in creation order.
    pub fn creates(&self) -> Vec<String> {
        self.0
            .borrow()
            .iter()
            .filter_map(|op| match op {
                HostOp::Create { tag, .. } => Some(tag.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn destroys(&self) -> Vec<WidgetId> {
        self.0
            .borrow()
            .iter()
            .filter_map(|op| match op {
                HostOp::Destroy { widget } => Some(*widget),
                _ => None,
            })
            .collect()
    }

    pub fn structural(&self) -> Vec<HostOp> {
        self.0
            .borrow()
            .iter()
            .filter(|op| op.is_structural())
            .cloned()
            .collect()
    }

    pub fn prop_writes(&self) -> Vec<HostOp> {
        self.0
            .borrow()
            .iter()
            .filter(|op| !op.is_structural())
            .cloned()
            .collect()
    }
}

impl std::fmt::Debug for OpLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.0.borrow().iter()).finish()
    }
}

/// Host adapter wrapper that records every successful call into an [`OpLog`].
pub struct RecordingHost<H = MemoryHost> {
    inner: H,
    log: OpLog,
}

impl<H> RecordingHost<H> {
    pub fn new(inner: H) -> Self {
        Self {
            inner,
            log: OpLog::new(),
        }
    }

    pub fn log(&self) -> OpLog {
        self.log.clone()
    }

    pub fn inner(&self) -> &H {
        &self.inner
    }

    pub fn inner_mut(&mut self) -> &mut H {
        &mut self.inner
    }
}

impl<H: HostAdapter> HostAdapter for RecordingHost<H> {
    fn create_instance(
        &mut self,
        tag: &str,
        initial_props: &Props,
        parent: Option<WidgetId>,
    ) -> Result<WidgetId, HostError> {
        let widget = self.inner.create_instance(tag, initial_props, parent)?;
        self.log.record(HostOp::Create {
            widget,
            tag: tag.to_owned(),
            parent,
        });
        Ok(widget)
    }

    fn set_prop(
        &mut self,
        widget: WidgetId,
        key: &str,
        value: &PropValue,
    ) -> Result<(), HostError> {
        self.inner.set_prop(widget, key, value)?;
        self.log.record(HostOp::SetProp {
            widget,
            key: key.to_owned(),
            value: value.clone(),
        });
        Ok(())
    }

    fn clear_prop(&mut self, widget: WidgetId, key: &str) -> Result<(), HostError> {
        self.inner.clear_prop(widget, key)?;
        self.log.record(HostOp::ClearProp {
            widget,
            key: key.to_owned(),
        });
        Ok(())
    }

    fn append_child(
        &mut self,
        parent: WidgetId,
        child: WidgetId,
        index: usize,
    ) -> Result<(), HostError> {
        self.inner.append_child(parent, child, index)?;
        self.log.record(HostOp::Append {
            parent,
            child,
            index,
        });
        Ok(())
    }

    fn remove_child(&mut self, parent: WidgetId, child: WidgetId) -> Result<(), HostError> {
        self.inner.remove_child(parent, child)?;
        self.log.record(HostOp::RemoveChild { parent, child });
        Ok(())
    }

    fn destroy_instance(&mut self, widget: WidgetId) -> Result<(), HostError> {
        self.inner.destroy_instance(widget)?;
        self.log.record(HostOp::Destroy { widget });
        Ok(())
    }
}

/// Shared log of lifecycle events, e.g. `"mount:A"`.
#[derive(Clone, Default)]
pub struct EventLog(Rc<RefCell<Vec<String>>>);

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, event: impl Into<String>) {
        self.0.borrow_mut().push(event.into());
    }

    pub fn take(&self) -> Vec<String> {
        std::mem::take(&mut *self.0.borrow_mut())
    }

    pub fn snapshot(&self) -> Vec<String> {
        self.0.borrow().clone()
    }

    pub fn clear(&self) {
        self.0.borrow_mut().clear();
    }
}

impl std::fmt::Debug for EventLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.0.borrow().iter()).finish()
    }
}

/// Small registry covering the widget kinds used throughout the test suites.
pub fn test_registry() -> HostRegistry {
    HostRegistry::new()
        .register(
            WidgetKind::new("block")
                .prop("direction", "column")
                .prop("label", "")
                .children(ChildPolicy::Many),
        )
        .register(
            WidgetKind::new("text")
                .prop("label", "")
                .prop("color", PropValue::Null),
        )
        .register(
            WidgetKind::new("button")
                .prop("label", "")
                .prop("on_click", PropValue::Null),
        )
        .register(WidgetKind::new("x").prop("label", ""))
        .register(WidgetKind::new("y").prop("label", ""))
        .register(
            WidgetKind::new("frame")
                .prop("title", "")
                .children(ChildPolicy::Single),
        )
        .register(WidgetKind::new(TEXT_TAG).prop(TEXT_PROP, ""))
}

/// A root over a [`RecordingHost`] wrapping a [`MemoryHost`] with [`test_registry`].
pub struct TestRoot {
    root: Root<RecordingHost>,
    ops: OpLog,
}

pub fn test_root() -> TestRoot {
    test_root_with(ReconcilerOptions::default())
}

pub fn test_root_with(options: ReconcilerOptions) -> TestRoot {
    let host = RecordingHost::new(MemoryHost::new(test_registry()));
    let ops = host.log();
    TestRoot {
        root: Root::with_options(host, options),
        ops,
    }
}

impl TestRoot {
    pub fn render(&self, element: &Element) -> Result<WidgetId, RenderError> {
        self.root.render(element)
    }

    pub fn unmount(&self) -> Result<(), RenderError> {
        self.root.unmount()
    }

    pub fn root(&self) -> &Root<RecordingHost> {
        &self.root
    }

    pub fn ops(&self) -> &OpLog {
        &self.ops
    }

    pub fn memory(&self) -> Ref<'_, MemoryHost> {
        Ref::map(self.root.host(), RecordingHost::inner)
    }

    pub fn root_widget(&self) -> Option<WidgetId> {
        self.root.root_widget()
    }

    pub fn widget_count(&self) -> usize {
        self.memory().len()
    }

    pub fn tag_of(&self, widget: WidgetId) -> Option<String> {
        self.memory().widget(widget).map(|w| w.tag().to_owned())
    }

    pub fn prop_of(&self, widget: WidgetId, key: &str) -> Option<PropValue> {
        self.memory().widget(widget)?.prop(key).cloned()
    }

    pub fn label_of(&self, widget: WidgetId) -> Option<String> {
        self.prop_of(widget, "label")?.as_str().map(str::to_owned)
    }

    pub fn children_of(&self, widget: WidgetId) -> Vec<WidgetId> {
        self.memory()
            .widget(widget)
            .map(|w| w.children().to_vec())
            .unwrap_or_default()
    }

    /// Invokes the handler stored under `key` as a native event would.
    /// Returns `false` when no handler is set.
    pub fn fire(&self, widget: WidgetId, key: &str, event: &dyn Any) -> bool {
        let handler = self.memory().handler(widget, key);
        match handler {
            Some(handler) => {
                handler.call(event);
                true
            }
            None => false,
        }
    }

    pub fn dump(&self) -> String {
        self.memory().dump_tree(self.root_widget())
    }
}
