//! Function and stateful components.

use std::any::{Any, TypeId};
use std::fmt;
use std::rc::Rc;

use crate::error::{HookResult, RenderError, RenderResult};
use crate::props::Props;
use crate::runtime::{StateHandle, StateUpdate, Updater};

/// Stateless component: re-invoked every time its position is reached.
///
/// Two function components are the same type when their render functions
/// share a Rust type and, for plain `fn` pointers, the same address. A `fn`
/// item or a closure defined at one site keeps its identity across renders,
/// and distinct functions stored as `fn(&Props) -> RenderResult` stay distinct.
#[derive(Clone)]
pub struct FunctionComponent {
    name: &'static str,
    type_id: TypeId,
    addr: Option<usize>,
    render: Rc<dyn Fn(&Props) -> RenderResult>,
}

type RenderFn = fn(&Props) -> RenderResult;

impl FunctionComponent {
    pub fn new<F>(name: &'static str, render: F) -> Self
    where
        F: Fn(&Props) -> RenderResult + 'static,
    {
        let addr = (&render as &dyn Any)
            .downcast_ref::<RenderFn>()
            .map(|render| *render as usize);
        Self {
            name,
            type_id: TypeId::of::<F>(),
            addr,
            render: Rc::new(render),
        }
    }

    /// Component over a plain function pointer, identified by its address.
    pub fn from_fn(name: &'static str, render: fn(&Props) -> RenderResult) -> Self {
        Self::new(name, render)
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub(crate) fn same_component(&self, other: &FunctionComponent) -> bool {
        self.type_id == other.type_id && self.addr == other.addr
    }

    pub fn render(&self, props: &Props) -> RenderResult {
        (self.render)(props)
    }
}

impl fmt::Debug for FunctionComponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("FunctionComponent").field(&self.name).finish()
    }
}

/// A component owning state across renders.
///
/// The reconciler keeps one instance per tree position for as long as the
/// element type at that position does not change.
pub trait Component: Sized + 'static {
    type State: Clone + 'static;

    fn initialize(props: &Props) -> Self;

    fn initial_state(&self, props: &Props) -> Result<Self::State, RenderError>;

    fn render(&self, cx: &Context<'_, Self>) -> RenderResult;

    /// Runs once, after the rendered subtree is attached.
    fn on_mount(&mut self, _cx: &Context<'_, Self>) -> HookResult {
        Ok(())
    }

    /// Runs after an update of this component's subtree has settled.
    fn on_update(
        &mut self,
        _cx: &Context<'_, Self>,
        _prev_props: &Props,
        _prev_state: &Self::State,
    ) -> HookResult {
        Ok(())
    }

    /// Runs before the subtree is torn down.
    fn on_unmount(&mut self, _cx: &Context<'_, Self>) -> HookResult {
        Ok(())
    }

    /// Type name without its module path; generic arguments are kept as is.
    fn name() -> &'static str {
        let full = std::any::type_name::<Self>();
        let head = full.find('<').unwrap_or(full.len());
        let start = full[..head].rfind("::").map_or(0, |at| at + 2);
        &full[start..]
    }
}

pub struct Context<'a, C: Component> {
    props: &'a Props,
    state: &'a C::State,
    updater: &'a Updater,
}

impl<'a, C: Component> Context<'a, C> {
    pub(crate) fn new(props: &'a Props, state: &'a C::State, updater: &'a Updater) -> Self {
        Self {
            props,
            state,
            updater,
        }
    }

    pub fn props(&self) -> &'a Props {
        self.props
    }

    pub fn state(&self) -> &'a C::State {
        self.state
    }

    /// Handle for updating this component's state, e.g. from an event handler.
    pub fn handle(&self) -> StateHandle<C::State> {
        StateHandle::new(self.updater.clone())
    }
}

/// Descriptor used as the element type of a stateful component.
#[derive(Clone, Copy)]
pub struct ComponentClass {
    name: &'static str,
    type_id: TypeId,
    instantiate: fn(&Props) -> Result<Box<dyn ErasedComponent>, RenderError>,
}

impl ComponentClass {
    pub fn of<C: Component>() -> Self {
        Self {
            name: C::name(),
            type_id: TypeId::of::<C>(),
            instantiate: instantiate::<C>,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub(crate) fn type_id(&self) -> TypeId {
        self.type_id
    }

    pub(crate) fn instantiate(&self, props: &Props) -> Result<ComponentInstance, RenderError> {
        Ok(ComponentInstance {
            name: self.name,
            behavior: Some((self.instantiate)(props)?),
            props: props.clone(),
            mounted: false,
            unmounting: false,
        })
    }
}

impl fmt::Debug for ComponentClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ComponentClass").field(&self.name).finish()
    }
}

fn instantiate<C: Component>(props: &Props) -> Result<Box<dyn ErasedComponent>, RenderError> {
    let component = C::initialize(props);
    let state = component.initial_state(props)?;
    Ok(Box::new(ComponentCell { component, state }))
}

pub(crate) trait ErasedComponent {
    fn render(&self, props: &Props, updater: &Updater) -> RenderResult;
    fn snapshot_state(&self) -> Box<dyn Any>;
    fn apply(&mut self, update: StateUpdate);
    fn on_mount(&mut self, props: &Props, updater: &Updater) -> HookResult;
    fn on_update(
        &mut self,
        props: &Props,
        updater: &Updater,
        prev_props: &Props,
        prev_state: Box<dyn Any>,
    ) -> HookResult;
    fn on_unmount(&mut self, props: &Props, updater: &Updater) -> HookResult;
}

struct ComponentCell<C: Component> {
    component: C,
    state: C::State,
}

impl<C: Component> ErasedComponent for ComponentCell<C> {
    fn render(&self, props: &Props, updater: &Updater) -> RenderResult {
        self.component
            .render(&Context::new(props, &self.state, updater))
    }

    fn snapshot_state(&self) -> Box<dyn Any> {
        Box::new(self.state.clone())
    }

    fn apply(&mut self, update: StateUpdate) {
        update(&mut self.state);
    }

    fn on_mount(&mut self, props: &Props, updater: &Updater) -> HookResult {
        let Self { component, state } = self;
        component.on_mount(&Context::new(props, state, updater))
    }

    fn on_update(
        &mut self,
        props: &Props,
        updater: &Updater,
        prev_props: &Props,
        prev_state: Box<dyn Any>,
    ) -> HookResult {
        let prev_state = prev_state.downcast::<C::State>().map_err(|_| {
            RenderError::component(C::name(), "previous state snapshot has the wrong type")
        })?;
        let Self { component, state } = self;
        component.on_update(&Context::new(props, state, updater), prev_props, &prev_state)
    }

    fn on_unmount(&mut self, props: &Props, updater: &Updater) -> HookResult {
        let Self { component, state } = self;
        component.on_unmount(&Context::new(props, state, updater))
    }
}

/// Per-position state of a stateful component.
///
/// The behavior is moved out while `on_mount` / `on_update` run so the hooks
/// can reach back into the root that owns the tree.
pub(crate) struct ComponentInstance {
    name: &'static str,
    behavior: Option<Box<dyn ErasedComponent>>,
    props: Props,
    mounted: bool,
    unmounting: bool,
}

impl ComponentInstance {
    pub(crate) fn name(&self) -> &'static str {
        self.name
    }

    pub(crate) fn props(&self) -> &Props {
        &self.props
    }

    pub(crate) fn is_mounted(&self) -> bool {
        self.mounted
    }

    pub(crate) fn is_unmounting(&self) -> bool {
        self.unmounting
    }

    pub(crate) fn replace_props(&mut self, props: Props) -> Props {
        std::mem::replace(&mut self.props, props)
    }

    fn behavior(&self) -> Result<&dyn ErasedComponent, RenderError> {
        let name = self.name;
        self.behavior
            .as_deref()
            .ok_or_else(|| RenderError::component(name, BUSY))
    }

    fn behavior_mut(&mut self) -> Result<&mut (dyn ErasedComponent + 'static), RenderError> {
        let name = self.name;
        self.behavior
            .as_deref_mut()
            .ok_or_else(|| RenderError::component(name, BUSY))
    }

    pub(crate) fn snapshot_state(&self) -> Result<Box<dyn Any>, RenderError> {
        Ok(self.behavior()?.snapshot_state())
    }

    pub(crate) fn apply(&mut self, update: StateUpdate) -> Result<(), RenderError> {
        self.behavior_mut()?.apply(update);
        Ok(())
    }

    pub(crate) fn render(&self, updater: &Updater) -> RenderResult {
        self.behavior()?.render(&self.props, updater)
    }

    /// Checks the behavior out for an `on_mount` call. `None` once mounted,
    /// while unmounting or while another hook holds it.
    pub(crate) fn detach_for_mount(&mut self) -> Option<DetachedComponent> {
        if self.mounted || self.unmounting {
            return None;
        }
        let detached = self.detach()?;
        self.mounted = true;
        Some(detached)
    }

    /// Checks the behavior out for an `on_update` call on a mounted instance.
    pub(crate) fn detach_for_update(&mut self) -> Option<DetachedComponent> {
        if !self.mounted || self.unmounting {
            return None;
        }
        self.detach()
    }

    fn detach(&mut self) -> Option<DetachedComponent> {
        let behavior = self.behavior.take()?;
        Some(DetachedComponent {
            behavior,
            props: self.props.clone(),
        })
    }

    pub(crate) fn attach(&mut self, detached: DetachedComponent) {
        self.behavior = Some(detached.behavior);
    }

    pub(crate) fn unmount(&mut self, updater: &Updater) -> HookResult {
        self.unmounting = true;
        let result = match (self.mounted, self.behavior.as_mut()) {
            (true, Some(behavior)) => behavior.on_unmount(&self.props, updater),
            _ => Ok(()),
        };
        self.mounted = false;
        result
    }
}

const BUSY: &str = "component is running a lifecycle hook";

/// Component behavior moved out of the live tree for one hook call.
pub(crate) struct DetachedComponent {
    behavior: Box<dyn ErasedComponent>,
    props: Props,
}

impl DetachedComponent {
    pub(crate) fn mount(&mut self, updater: &Updater) -> HookResult {
        self.behavior.on_mount(&self.props, updater)
    }

    pub(crate) fn update(
        &mut self,
        updater: &Updater,
        prev_props: &Props,
        prev_state: Box<dyn Any>,
    ) -> HookResult {
        self.behavior
            .on_update(&self.props, updater, prev_props, prev_state)
    }
}

#[cfg(test)]
#[path = "tests/component_tests.rs"]
mod tests;
