//! Positional diff between the live tree and a new element tree.
//!
//! Every tree position is visited depth-first, parent before children, and
//! resolved to one of create / update / replace / remove. Siblings are
//! correlated by index only. Host props are reapplied on every update rather
//! than diffed against the previous values.

use std::any::Any;
use std::cell::RefCell;
use std::rc::{Rc, Weak};

use log::{debug, trace, warn};

use crate::collections::map::HashMap;
use crate::component::{ComponentInstance, DetachedComponent};
use crate::element::{Element, ElementType};
use crate::error::{HookResult, RenderError};
use crate::host::{HostAdapter, HostError, WidgetId};
use crate::options::ReconcilerOptions;
use crate::props::{NodeRef, Props};
use crate::runtime::{PendingUpdate, UpdateSink, Updater};

pub type NodeId = usize;

const TARGET: &str = "rewx::reconcile";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Host,
    Function,
    Stateful,
}

pub(crate) enum LiveKind {
    Host { tag: Rc<str> },
    Function,
    Stateful(ComponentInstance),
}

/// Bookkeeping record shadowing one widget or one component expansion.
///
/// A component node has exactly one child, the node built from what it
/// rendered, and shares that child's outermost widget.
pub struct LiveNode {
    id: NodeId,
    parent: Option<NodeId>,
    kind: LiveKind,
    native: Option<WidgetId>,
    element: Element,
    children: Vec<NodeId>,
}

impl LiveNode {
    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn kind(&self) -> NodeKind {
        match self.kind {
            LiveKind::Host { .. } => NodeKind::Host,
            LiveKind::Function => NodeKind::Function,
            LiveKind::Stateful(_) => NodeKind::Stateful,
        }
    }

    pub fn native(&self) -> Option<WidgetId> {
        self.native
    }

    /// Element this node was last created or updated from.
    pub fn element(&self) -> &Element {
        &self.element
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// `None` for nodes that are not stateful components.
    pub fn is_mounted(&self) -> Option<bool> {
        match &self.kind {
            LiveKind::Stateful(instance) => Some(instance.is_mounted()),
            _ => None,
        }
    }
}

/// Where a node's outermost widget sits among its native siblings.
#[derive(Debug, Clone, Copy)]
struct Position {
    parent_widget: Option<WidgetId>,
    index: usize,
}

pub(crate) enum PendingHook {
    Mount(NodeId),
    Update {
        node: NodeId,
        prev_props: Props,
        prev_state: Box<dyn Any>,
    },
}

impl PendingHook {
    fn node(&self) -> NodeId {
        match self {
            PendingHook::Mount(node) | PendingHook::Update { node, .. } => *node,
        }
    }
}

/// A queued hook whose component has been checked out of the tree.
pub(crate) struct HookCall {
    hook: PendingHook,
    component: DetachedComponent,
    updater: Updater,
}

impl HookCall {
    /// Runs the hook and hands the component back for `finish_hook`.
    pub(crate) fn fire(self) -> (NodeId, DetachedComponent, HookResult) {
        let Self {
            hook,
            mut component,
            updater,
        } = self;
        let node = hook.node();
        let result = match hook {
            PendingHook::Mount(_) => component.mount(&updater),
            PendingHook::Update {
                prev_props,
                prev_state,
                ..
            } => component.update(&updater, &prev_props, prev_state),
        };
        (node, component, result)
    }
}

pub(crate) struct Reconciler<H> {
    host: Rc<RefCell<H>>,
    options: ReconcilerOptions,
    nodes: HashMap<NodeId, LiveNode>,
    next_id: NodeId,
    root: Option<NodeId>,
    container: Option<WidgetId>,
    hooks: Vec<PendingHook>,
    sink: Weak<dyn UpdateSink>,
}

impl<H: HostAdapter> Reconciler<H> {
    pub(crate) fn new(
        host: Rc<RefCell<H>>,
        options: ReconcilerOptions,
        sink: Weak<dyn UpdateSink>,
    ) -> Self {
        Self {
            host,
            options,
            nodes: HashMap::new(),
            next_id: 0,
            root: None,
            container: None,
            hooks: Vec::new(),
            sink,
        }
    }

    pub(crate) fn options(&self) -> &ReconcilerOptions {
        &self.options
    }

    pub(crate) fn set_container(&mut self, container: Option<WidgetId>) {
        self.container = container;
    }

    pub(crate) fn root(&self) -> Option<NodeId> {
        self.live(self.root)
    }

    pub(crate) fn root_widget(&self) -> Option<WidgetId> {
        self.root().and_then(|id| self.nodes.get(&id)).and_then(|node| node.native)
    }

    pub(crate) fn node(&self, id: NodeId) -> Option<&LiveNode> {
        self.nodes.get(&id)
    }

    pub(crate) fn len(&self) -> usize {
        self.nodes.len()
    }

    pub(crate) fn render_root(&mut self, element: &Element) -> Result<WidgetId, RenderError> {
        let position = self.root_position();
        let checkpoint = self.next_id;
        let result = match self.root() {
            Some(previous) => self.diff(previous, element, None, position),
            None => self.create(element, None, position),
        };
        match result {
            Ok(root) => {
                self.root = Some(root);
                self.native_of(root)
            }
            Err(err) => {
                // Keep a partially built root so the next render diffs against it.
                if self.root().is_none() {
                    let partial = self.nodes.get(&checkpoint).filter(|node| node.parent.is_none());
                    self.root = partial.map(|node| node.id);
                }
                Err(err)
            }
        }
    }

    pub(crate) fn clear_root(&mut self) -> Result<(), RenderError> {
        if let Some(root) = self.root() {
            self.root = None;
            self.remove(root, self.container)?;
        }
        Ok(())
    }

    /// Applies a queued state update and re-renders only that component.
    pub(crate) fn apply_state_update(&mut self, update: PendingUpdate) -> Result<(), RenderError> {
        let PendingUpdate { node: id, apply } = update;
        let updater = self.updater(id);
        let Some(node) = self.nodes.get_mut(&id) else {
            debug!(target: TARGET, "dropping state update for removed node {id}");
            return Ok(());
        };
        let LiveKind::Stateful(instance) = &mut node.kind else {
            debug!(target: TARGET, "dropping state update for stateless node {id}");
            return Ok(());
        };
        if instance.is_unmounting() {
            debug!(target: TARGET, "dropping state update for unmounting node {id}");
            return Ok(());
        }
        trace!(target: TARGET, "re-render {} node={id}", instance.name());
        let prev_state = instance.snapshot_state()?;
        instance.apply(apply)?;
        let prev_props = instance.props().clone();
        let rendered = instance.render(&updater)?;
        let element = node.element.clone();
        let position = self.position_of(id)?;
        self.update_component(id, &element, &element, &rendered, position)?;
        self.propagate_native(id)?;
        self.hooks.push(PendingHook::Update {
            node: id,
            prev_props,
            prev_state,
        });
        Ok(())
    }

    /// Hands over the queued `on_mount` / `on_update` hooks, children before parents.
    pub(crate) fn take_hooks(&mut self) -> Vec<PendingHook> {
        std::mem::take(&mut self.hooks)
    }

    /// Puts hooks that did not get to run back in front of the queue.
    pub(crate) fn requeue_hooks(&mut self, hooks: impl IntoIterator<Item = PendingHook>) {
        let mut hooks: Vec<PendingHook> = hooks.into_iter().collect();
        hooks.append(&mut self.hooks);
        self.hooks = hooks;
    }

    /// Drops queued `on_update` hooks after a failed pass. Mount hooks stay
    /// queued so components created by that pass still mount on the next one.
    pub(crate) fn keep_mount_hooks(&mut self) {
        self.hooks
            .retain(|hook| matches!(hook, PendingHook::Mount(_)));
    }

    /// Checks the component out of its node so the hook can run without a
    /// borrow on the tree. `None` when the hook no longer applies.
    pub(crate) fn begin_hook(&mut self, hook: PendingHook) -> Option<HookCall> {
        let id = hook.node();
        let updater = self.updater(id);
        let instance = self.instance_mut(id)?;
        let component = match hook {
            PendingHook::Mount(_) => instance.detach_for_mount(),
            PendingHook::Update { .. } => instance.detach_for_update(),
        }?;
        Some(HookCall {
            hook,
            component,
            updater,
        })
    }

    pub(crate) fn finish_hook(&mut self, id: NodeId, component: DetachedComponent) {
        match self.instance_mut(id) {
            Some(instance) => instance.attach(component),
            None => debug!(target: TARGET, "node {id} vanished while its hook ran"),
        }
    }

    pub(crate) fn dump_tree(&self) -> String {
        let mut output = String::new();
        match self.root() {
            Some(root) => self.dump_node(&mut output, root, 0),
            None => output.push_str("(empty)\n"),
        }
        output
    }

    fn dump_node(&self, output: &mut String, id: NodeId, depth: usize) {
        let indent = "  ".repeat(depth);
        let Some(node) = self.nodes.get(&id) else {
            output.push_str(&format!("{indent}#{id} (missing)\n"));
            return;
        };
        let widget = node
            .native
            .map_or_else(|| "-".to_owned(), |widget| widget.to_string());
        output.push_str(&format!(
            "{indent}{:?} #{id} widget={widget}\n",
            node.element.element_type()
        ));
        for &child in &node.children {
            self.dump_node(output, child, depth + 1);
        }
    }

    fn diff(
        &mut self,
        previous: NodeId,
        element: &Element,
        parent: Option<NodeId>,
        position: Position,
    ) -> Result<NodeId, RenderError> {
        let same_type = self
            .live_node(previous)?
            .element
            .element_type()
            .same_type(element.element_type());
        if same_type {
            self.update(previous, element, position)?;
            return Ok(previous);
        }
        trace!(
            target: TARGET,
            "replace node={previous} with {:?}",
            element.element_type()
        );
        self.remove(previous, position.parent_widget)?;
        self.create(element, parent, position)
    }

    fn create(
        &mut self,
        element: &Element,
        parent: Option<NodeId>,
        position: Position,
    ) -> Result<NodeId, RenderError> {
        let ty = element.element_type();
        ty.validate()?;
        match ty {
            ElementType::Host(tag) => self.create_host(Rc::clone(tag), element, parent, position),
            ElementType::Function(function) => {
                let rendered = function.render(element.props())?;
                let id = self.allocate();
                self.create_component(id, LiveKind::Function, element, &rendered, parent, position)
            }
            ElementType::Stateful(class) => {
                let id = self.allocate();
                let instance = class.instantiate(element.props())?;
                let rendered = instance.render(&self.updater(id))?;
                self.create_component(
                    id,
                    LiveKind::Stateful(instance),
                    element,
                    &rendered,
                    parent,
                    position,
                )
            }
        }
    }

    fn create_host(
        &mut self,
        tag: Rc<str>,
        element: &Element,
        parent: Option<NodeId>,
        position: Position,
    ) -> Result<NodeId, RenderError> {
        let widget = self
            .host
            .borrow_mut()
            .create_instance(&tag, element.props(), position.parent_widget)?;
        let id = self.allocate();
        trace!(target: TARGET, "create <{tag}> node={id} widget={widget}");
        self.nodes.insert(
            id,
            LiveNode {
                id,
                parent,
                kind: LiveKind::Host { tag },
                native: Some(widget),
                element: element.clone(),
                children: Vec::with_capacity(element.children().len()),
            },
        );
        self.apply_props(widget, None, element.props())?;
        if let Some(parent_widget) = position.parent_widget {
            self.host
                .borrow_mut()
                .append_child(parent_widget, widget, position.index)?;
        }
        if let Some(node_ref) = element.node_ref() {
            node_ref.set(widget);
        }
        for (index, child) in element.children().iter().enumerate() {
            let position = Position {
                parent_widget: Some(widget),
                index,
            };
            let child = self.create(child, Some(id), position)?;
            self.live_node_mut(id)?.children.push(child);
        }
        Ok(id)
    }

    fn create_component(
        &mut self,
        id: NodeId,
        kind: LiveKind,
        element: &Element,
        rendered: &Element,
        parent: Option<NodeId>,
        position: Position,
    ) -> Result<NodeId, RenderError> {
        trace!(target: TARGET, "create {:?} node={id}", element.element_type());
        let stateful = matches!(kind, LiveKind::Stateful(_));
        self.nodes.insert(
            id,
            LiveNode {
                id,
                parent,
                kind,
                native: None,
                element: element.clone(),
                children: Vec::with_capacity(1),
            },
        );
        let child = self.create(rendered, Some(id), position)?;
        let native = self.native_of(child)?;
        let node = self.live_node_mut(id)?;
        node.children.push(child);
        node.native = Some(native);
        if let Some(node_ref) = element.node_ref() {
            node_ref.set(native);
        }
        if stateful {
            self.hooks.push(PendingHook::Mount(id));
        }
        Ok(id)
    }

    fn update(
        &mut self,
        id: NodeId,
        element: &Element,
        position: Position,
    ) -> Result<(), RenderError> {
        match element.element_type() {
            ElementType::Host(tag) => self.update_host(id, tag, element),
            ElementType::Function(function) => {
                let rendered = function.render(element.props())?;
                let previous = self.replace_element(id, element)?;
                self.update_component(id, &previous, element, &rendered, position)
            }
            ElementType::Stateful(class) => {
                let updater = self.updater(id);
                let node = self.live_node_mut(id)?;
                let LiveKind::Stateful(instance) = &mut node.kind else {
                    return Err(RenderError::component(
                        class.name(),
                        format!("live node {id} is not a stateful component"),
                    ));
                };
                let prev_state = instance.snapshot_state()?;
                let prev_props = instance.replace_props(element.props().clone());
                let rendered = instance.render(&updater)?;
                let previous = std::mem::replace(&mut node.element, element.clone());
                self.update_component(id, &previous, element, &rendered, position)?;
                self.hooks.push(PendingHook::Update {
                    node: id,
                    prev_props,
                    prev_state,
                });
                Ok(())
            }
        }
    }

    fn update_host(&mut self, id: NodeId, tag: &str, element: &Element) -> Result<(), RenderError> {
        let widget = self.native_of(id)?;
        let previous = self.replace_element(id, element)?;
        trace!(target: TARGET, "update <{tag}> node={id} widget={widget}");
        self.apply_props(widget, Some(previous.props()), element.props())?;
        sync_ref(previous.node_ref(), element.node_ref(), widget, false);
        self.reconcile_children(id, widget, element.children())
    }

    fn update_component(
        &mut self,
        id: NodeId,
        previous: &Element,
        element: &Element,
        rendered: &Element,
        position: Position,
    ) -> Result<(), RenderError> {
        trace!(target: TARGET, "update {:?} node={id}", element.element_type());
        let child = self.live(self.live_node(id)?.children.first().copied());
        let child = match child {
            Some(child) => self.diff(child, rendered, Some(id), position)?,
            None => self.create(rendered, Some(id), position)?,
        };
        let native = self.native_of(child)?;
        let node = self.live_node_mut(id)?;
        node.children.clear();
        node.children.push(child);
        let moved = node.native.replace(native) != Some(native);
        sync_ref(previous.node_ref(), element.node_ref(), native, moved);
        Ok(())
    }

    fn reconcile_children(
        &mut self,
        id: NodeId,
        widget: WidgetId,
        next: &[Element],
    ) -> Result<(), RenderError> {
        let previous = self.live_node(id)?.children.clone();
        for (index, element) in next.iter().enumerate() {
            let position = Position {
                parent_widget: Some(widget),
                index,
            };
            match previous.get(index).copied() {
                Some(previous_child) => {
                    let child = match self.live(Some(previous_child)) {
                        Some(previous_child) => {
                            self.diff(previous_child, element, Some(id), position)?
                        }
                        None => self.create(element, Some(id), position)?,
                    };
                    self.live_node_mut(id)?.children[index] = child;
                }
                None => {
                    let child = self.create(element, Some(id), position)?;
                    self.live_node_mut(id)?.children.push(child);
                }
            }
        }
        for index in (next.len()..previous.len()).rev() {
            if let Some(child) = self.live(Some(previous[index])) {
                self.remove(child, Some(widget))?;
            }
            self.live_node_mut(id)?.children.truncate(index);
        }
        Ok(())
    }

    fn remove(&mut self, id: NodeId, parent_widget: Option<WidgetId>) -> Result<(), RenderError> {
        let updater = self.updater(id);
        if let LiveKind::Stateful(instance) = &mut self.live_node_mut(id)?.kind {
            instance.unmount(&updater)?;
        }
        let node = self
            .nodes
            .remove(&id)
            .ok_or(RenderError::MissingNode { id })?;
        trace!(target: TARGET, "remove {:?} node={id}", node.element.element_type());
        match node.kind {
            LiveKind::Host { .. } => {
                let widget = node.native.ok_or(RenderError::MissingNode { id })?;
                for &child in node.children.iter().rev() {
                    self.remove(child, Some(widget))?;
                }
                if let Some(parent_widget) = parent_widget {
                    self.host.borrow_mut().remove_child(parent_widget, widget)?;
                }
                self.host.borrow_mut().destroy_instance(widget)?;
            }
            LiveKind::Function | LiveKind::Stateful(_) => {
                for &child in node.children.iter() {
                    self.remove(child, parent_widget)?;
                }
            }
        }
        if let Some(node_ref) = node.element.node_ref() {
            node_ref.clear();
        }
        Ok(())
    }

    fn apply_props(
        &mut self,
        widget: WidgetId,
        previous: Option<&Props>,
        next: &Props,
    ) -> Result<(), RenderError> {
        for (key, value) in next.iter() {
            let result = self.host.borrow_mut().set_prop(widget, key, value);
            self.recover(result)?;
        }
        if let Some(previous) = previous {
            for key in previous.keys().filter(|key| !next.contains(key)) {
                let result = self.host.borrow_mut().clear_prop(widget, key);
                self.recover(result)?;
            }
        }
        Ok(())
    }

    fn recover(&self, result: Result<(), HostError>) -> Result<(), RenderError> {
        match result {
            Err(HostError::UnsupportedProp { tag, key }) if !self.options.strict_props => {
                warn!("skipping unsupported property `{key}` on <{tag}>");
                Ok(())
            }
            other => other.map_err(RenderError::from),
        }
    }

    /// Re-points component ancestors at `id`'s widget after it was rebuilt.
    fn propagate_native(&mut self, id: NodeId) -> Result<(), RenderError> {
        let native = self.native_of(id)?;
        let mut current = id;
        while let Some(parent) = self.live_node(current)?.parent {
            let node = self.live_node_mut(parent)?;
            if matches!(node.kind, LiveKind::Host { .. }) {
                break;
            }
            if node.native.replace(native) != Some(native) {
                if let Some(node_ref) = node.element.node_ref() {
                    node_ref.set(native);
                }
            }
            current = parent;
        }
        Ok(())
    }

    fn position_of(&self, id: NodeId) -> Result<Position, RenderError> {
        let mut current = id;
        loop {
            let Some(parent) = self.live_node(current)?.parent else {
                return Ok(self.root_position());
            };
            let parent_node = self.live_node(parent)?;
            if let LiveKind::Host { .. } = parent_node.kind {
                let index = parent_node
                    .children
                    .iter()
                    .position(|&child| child == current)
                    .ok_or(RenderError::MissingNode { id: current })?;
                return Ok(Position {
                    parent_widget: parent_node.native,
                    index,
                });
            }
            current = parent;
        }
    }

    fn root_position(&self) -> Position {
        Position {
            parent_widget: self.container,
            index: 0,
        }
    }

    fn replace_element(&mut self, id: NodeId, element: &Element) -> Result<Element, RenderError> {
        let node = self.live_node_mut(id)?;
        Ok(std::mem::replace(&mut node.element, element.clone()))
    }

    fn native_of(&self, id: NodeId) -> Result<WidgetId, RenderError> {
        self.live_node(id)?
            .native
            .ok_or(RenderError::MissingNode { id })
    }

    fn live(&self, id: Option<NodeId>) -> Option<NodeId> {
        id.filter(|id| self.nodes.contains_key(id))
    }

    fn live_node(&self, id: NodeId) -> Result<&LiveNode, RenderError> {
        self.nodes.get(&id).ok_or(RenderError::MissingNode { id })
    }

    fn live_node_mut(&mut self, id: NodeId) -> Result<&mut LiveNode, RenderError> {
        self.nodes.get_mut(&id).ok_or(RenderError::MissingNode { id })
    }

    fn instance_mut(&mut self, id: NodeId) -> Option<&mut ComponentInstance> {
        match &mut self.nodes.get_mut(&id)?.kind {
            LiveKind::Stateful(instance) => Some(instance),
            _ => None,
        }
    }

    fn updater(&self, id: NodeId) -> Updater {
        Updater::new(self.sink.clone(), id)
    }

    fn allocate(&mut self) -> NodeId {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}

fn sync_ref(previous: Option<&NodeRef>, next: Option<&NodeRef>, widget: WidgetId, moved: bool) {
    match (previous, next) {
        (Some(previous), Some(next)) if previous.ptr_eq(next) => {
            if moved {
                next.set(widget);
            }
        }
        (previous, next) => {
            if let Some(previous) = previous {
                previous.clear();
            }
            if let Some(next) = next {
                next.set(widget);
            }
        }
    }
}
