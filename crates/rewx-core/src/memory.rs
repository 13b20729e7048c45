use indexmap::IndexMap;

use crate::host::{HostAdapter, HostError, WidgetId};
use crate::props::{Callback, PropValue, Props};
use crate::registry::{ChildPolicy, HostRegistry};

#[derive(Debug, Clone)]
pub struct Widget {
    tag: String,
    props: IndexMap<String, PropValue>,
    children: Vec<WidgetId>,
    parent: Option<WidgetId>,
}

impl Widget {
    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn prop(&self, key: &str) -> Option<&PropValue> {
        self.props.get(key)
    }

    pub fn props(&self) -> impl Iterator<Item = (&str, &PropValue)> + '_ {
        self.props.iter().map(|(key, value)| (key.as_str(), value))
    }

    pub fn children(&self) -> &[WidgetId] {
        &self.children
    }

    pub fn parent(&self) -> Option<WidgetId> {
        self.parent
    }
}

/// Headless host keeping widgets in an arena, validated against a registry.
///
/// Widget ids are never reused.
#[derive(Debug)]
pub struct MemoryHost {
    registry: HostRegistry,
    widgets: Vec<Option<Widget>>,
}

impl MemoryHost {
    pub fn new(registry: HostRegistry) -> Self {
        Self {
            registry,
            widgets: Vec::new(),
        }
    }

    pub fn registry(&self) -> &HostRegistry {
        &self.registry
    }

    pub fn widget(&self, id: WidgetId) -> Option<&Widget> {
        self.widgets.get(id).and_then(Option::as_ref)
    }

    pub fn widgets(&self) -> impl Iterator<Item = (WidgetId, &Widget)> + '_ {
        self.widgets
            .iter()
            .enumerate()
            .filter_map(|(id, widget)| widget.as_ref().map(|widget| (id, widget)))
    }

    /// Number of live widgets.
    pub fn len(&self) -> usize {
        self.widgets.iter().filter(|w| w.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Event handler stored under `key`, for simulating native events.
    pub fn handler(&self, id: WidgetId, key: &str) -> Option<Callback> {
        self.widget(id)?.prop(key)?.as_handler().cloned()
    }

    pub fn find_by_tag(&self, tag: &str) -> Vec<WidgetId> {
        self.widgets()
            .filter(|(_, widget)| widget.tag == tag)
            .map(|(id, _)| id)
            .collect()
    }

    pub fn dump_tree(&self, root: Option<WidgetId>) -> String {
        let mut output = String::new();
        if let Some(root_id) = root {
            self.dump_widget(&mut output, root_id, 0);
        } else {
            output.push_str("(no root)\n");
        }
        output
    }

    fn dump_widget(&self, output: &mut String, id: WidgetId, depth: usize) {
        let indent = "  ".repeat(depth);
        if let Some(widget) = self.widget(id) {
            output.push_str(&format!("{}[{}] {}", indent, id, widget.tag));
            for (key, value) in widget.props.iter().filter(|(_, value)| !value.is_null()) {
                output.push_str(&format!(" {key}={value:?}"));
            }
            output.push('\n');
            for &child_id in &widget.children {
                self.dump_widget(output, child_id, depth + 1);
            }
        } else {
            output.push_str(&format!("{}[{}] (missing)\n", indent, id));
        }
    }

    fn widget_mut(&mut self, id: WidgetId) -> Result<&mut Widget, HostError> {
        self.widgets
            .get_mut(id)
            .and_then(Option::as_mut)
            .ok_or(HostError::MissingWidget { id })
    }
}

impl HostAdapter for MemoryHost {
    fn create_instance(
        &mut self,
        tag: &str,
        _initial_props: &Props,
        parent: Option<WidgetId>,
    ) -> Result<WidgetId, HostError> {
        if let Some(parent) = parent {
            if self.widget(parent).is_none() {
                return Err(HostError::MissingWidget { id: parent });
            }
        }
        let kind = self.registry.lookup(tag)?;
        let widget = Widget {
            tag: tag.to_owned(),
            props: kind
                .defaults()
                .map(|(key, value)| (key.to_owned(), value.clone()))
                .collect(),
            children: Vec::new(),
            parent: None,
        };
        let id = self.widgets.len();
        self.widgets.push(Some(widget));
        Ok(id)
    }

    fn set_prop(
        &mut self,
        widget: WidgetId,
        key: &str,
        value: &PropValue,
    ) -> Result<(), HostError> {
        let target = self.widget_mut(widget)?;
        if !target.props.contains_key(key) {
            return Err(HostError::UnsupportedProp {
                tag: target.tag.clone(),
                key: key.to_owned(),
            });
        }
        target.props.insert(key.to_owned(), value.clone());
        Ok(())
    }

    fn clear_prop(&mut self, widget: WidgetId, key: &str) -> Result<(), HostError> {
        let tag = self.widget_mut(widget)?.tag.clone();
        let default = self
            .registry
            .lookup(&tag)?
            .default_value(key)
            .cloned()
            .ok_or_else(|| HostError::UnsupportedProp {
                tag,
                key: key.to_owned(),
            })?;
        self.widget_mut(widget)?.props.insert(key.to_owned(), default);
        Ok(())
    }

    fn append_child(
        &mut self,
        parent: WidgetId,
        child: WidgetId,
        index: usize,
    ) -> Result<(), HostError> {
        self.widget_mut(child)?;
        let tag = self.widget_mut(parent)?.tag.clone();
        let policy = self.registry.lookup(&tag)?.child_policy();
        let target = self.widget_mut(parent)?;
        match policy {
            ChildPolicy::None => return Err(HostError::ChildrenNotSupported { tag }),
            ChildPolicy::Single if !target.children.is_empty() => {
                return Err(HostError::TooManyChildren { tag, limit: 1 })
            }
            _ => {}
        }
        let index = index.min(target.children.len());
        target.children.insert(index, child);
        self.widget_mut(child)?.parent = Some(parent);
        Ok(())
    }

    fn remove_child(&mut self, parent: WidgetId, child: WidgetId) -> Result<(), HostError> {
        self.widget_mut(parent)?.children.retain(|&c| c != child);
        let child = self.widget_mut(child)?;
        if child.parent == Some(parent) {
            child.parent = None;
        }
        Ok(())
    }

    fn destroy_instance(&mut self, widget: WidgetId) -> Result<(), HostError> {
        let removed = self
            .widgets
            .get_mut(widget)
            .and_then(Option::take)
            .ok_or(HostError::MissingWidget { id: widget })?;
        if let Some(parent) = removed.parent {
            if let Some(Some(parent)) = self.widgets.get_mut(parent) {
                parent.children.retain(|&c| c != widget);
            }
        }
        Ok(())
    }
}
