//! Render entry point owning one live tree.

use std::cell::{Cell, Ref, RefCell, RefMut};
use std::collections::VecDeque;
use std::rc::{Rc, Weak};

use log::debug;

use crate::element::Element;
use crate::error::RenderError;
use crate::host::{HostAdapter, WidgetId};
use crate::options::ReconcilerOptions;
use crate::reconciler::{LiveNode, NodeId, Reconciler};
use crate::runtime::{PendingUpdate, UpdateSink};

const TARGET: &str = "rewx::root";

/// Owns a host adapter and the live tree rendered into it.
///
/// Every `render` call diffs the new element tree against the previous one.
/// Cloning yields another handle to the same tree.
///
/// `on_mount` and `on_update` run with the tree released and may use every
/// accessor here. `on_unmount` runs while the tree is being rewritten, so
/// only `host` and `host_mut` are usable from it; the tree accessors panic.
pub struct Root<H: HostAdapter + 'static> {
    shared: Rc<RootShared<H>>,
}

struct RootShared<H> {
    host: Rc<RefCell<H>>,
    reconciler: RefCell<Reconciler<H>>,
    queue: RefCell<VecDeque<PendingUpdate>>,
    rendering: Cell<bool>,
    max_update_passes: usize,
}

impl<H: HostAdapter + 'static> Root<H> {
    pub fn new(host: H) -> Self {
        Self::with_options(host, ReconcilerOptions::default())
    }

    pub fn with_options(host: H, options: ReconcilerOptions) -> Self {
        let host = Rc::new(RefCell::new(host));
        let shared = Rc::new_cyclic(|weak: &Weak<RootShared<H>>| {
            let sink: Weak<dyn UpdateSink> = weak.clone();
            RootShared {
                host: Rc::clone(&host),
                reconciler: RefCell::new(Reconciler::new(host, options, sink)),
                queue: RefCell::new(VecDeque::new()),
                rendering: Cell::new(false),
                max_update_passes: options.max_update_passes,
            }
        });
        Self { shared }
    }

    /// Attaches the root widget to `container` on the next initial render.
    pub fn attach_to(self, container: WidgetId) -> Self {
        self.shared
            .reconciler
            .borrow_mut()
            .set_container(Some(container));
        self
    }

    /// Reconciles `element` against the tree from the previous call and
    /// returns the outermost widget.
    ///
    /// Lifecycle hooks and any state updates they raise have all run by the
    /// time this returns.
    pub fn render(&self, element: &Element) -> Result<WidgetId, RenderError> {
        self.shared.run(|reconciler| reconciler.render_root(element))
    }

    /// Removes the whole tree, firing `on_unmount` hooks.
    pub fn unmount(&self) -> Result<(), RenderError> {
        self.shared.run(|reconciler| reconciler.clear_root())
    }

    pub fn root_widget(&self) -> Option<WidgetId> {
        self.shared.reconciler.borrow().root_widget()
    }

    pub fn root_node(&self) -> Option<NodeId> {
        self.shared.reconciler.borrow().root()
    }

    pub fn node(&self, id: NodeId) -> Option<Ref<'_, LiveNode>> {
        Ref::filter_map(self.shared.reconciler.borrow(), |reconciler| {
            reconciler.node(id)
        })
        .ok()
    }

    /// Number of live nodes, components included.
    pub fn node_count(&self) -> usize {
        self.shared.reconciler.borrow().len()
    }

    pub fn options(&self) -> ReconcilerOptions {
        *self.shared.reconciler.borrow().options()
    }

    pub fn is_rendering(&self) -> bool {
        self.shared.rendering.get()
    }

    /// Borrows the host adapter. Usable from every lifecycle hook.
    ///
    /// # Panics
    ///
    /// Panics if a `host_mut` guard is alive, or if a pass has to write to
    /// the host while the returned guard is held.
    pub fn host(&self) -> Ref<'_, H> {
        self.shared.host.borrow()
    }

    /// # Panics
    ///
    /// Panics if another guard on the host is alive.
    pub fn host_mut(&self) -> RefMut<'_, H> {
        self.shared.host.borrow_mut()
    }

    pub fn dump_tree(&self) -> String {
        self.shared.reconciler.borrow().dump_tree()
    }
}

impl<H: HostAdapter + 'static> Clone for Root<H> {
    fn clone(&self) -> Self {
        Self {
            shared: Rc::clone(&self.shared),
        }
    }
}

/// Creates a root over `host` and performs the initial render.
pub fn render<H: HostAdapter + 'static>(host: H, element: &Element) -> Result<Root<H>, RenderError> {
    let root = Root::new(host);
    root.render(element)?;
    Ok(root)
}

impl<H: HostAdapter> RootShared<H> {
    fn run<T>(
        &self,
        pass: impl FnOnce(&mut Reconciler<H>) -> Result<T, RenderError>,
    ) -> Result<T, RenderError> {
        if self.rendering.replace(true) {
            return Err(RenderError::Reentrant);
        }
        let _guard = PassGuard(&self.rendering);
        let result = self.pass(pass);
        if result.is_err() {
            self.queue.borrow_mut().clear();
            if let Ok(mut reconciler) = self.reconciler.try_borrow_mut() {
                reconciler.keep_mount_hooks();
            }
        }
        result
    }

    fn pass<T>(
        &self,
        pass: impl FnOnce(&mut Reconciler<H>) -> Result<T, RenderError>,
    ) -> Result<T, RenderError> {
        let value = pass(&mut self.reconciler.borrow_mut())?;
        self.run_hooks()?;
        self.drain()?;
        Ok(value)
    }

    /// Fires queued hooks one at a time with the tree unborrowed, so hooks
    /// may read the root they belong to.
    fn run_hooks(&self) -> Result<(), RenderError> {
        let mut hooks = self.reconciler.borrow_mut().take_hooks().into_iter();
        while let Some(hook) = hooks.next() {
            let call = self.reconciler.borrow_mut().begin_hook(hook);
            let Some(call) = call else {
                continue;
            };
            let (node, component, result) = call.fire();
            self.reconciler.borrow_mut().finish_hook(node, component);
            if let Err(err) = result {
                self.reconciler.borrow_mut().requeue_hooks(hooks);
                return Err(err);
            }
        }
        Ok(())
    }

    fn drain(&self) -> Result<(), RenderError> {
        let mut passes = 0;
        loop {
            let batch: Vec<PendingUpdate> = self.queue.borrow_mut().drain(..).collect();
            if batch.is_empty() {
                return Ok(());
            }
            passes += 1;
            if passes > self.max_update_passes {
                return Err(RenderError::UpdateLoop {
                    limit: self.max_update_passes,
                });
            }
            debug!(
                target: TARGET,
                "applying {} queued state updates (pass {passes})",
                batch.len()
            );
            {
                let mut reconciler = self.reconciler.borrow_mut();
                for update in batch {
                    reconciler.apply_state_update(update)?;
                }
            }
            self.run_hooks()?;
        }
    }
}

impl<H: HostAdapter> UpdateSink for RootShared<H> {
    fn enqueue(&self, update: PendingUpdate) {
        self.queue.borrow_mut().push_back(update);
    }

    fn is_rendering(&self) -> bool {
        self.rendering.get()
    }

    fn flush(&self) -> Result<(), RenderError> {
        self.run(|_| Ok(()))
    }
}

struct PassGuard<'a>(&'a Cell<bool>);

impl Drop for PassGuard<'_> {
    fn drop(&mut self) {
        self.0.set(false);
    }
}

#[cfg(test)]
#[path = "tests/root_tests.rs"]
mod tests;
