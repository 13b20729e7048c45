//! Static description of the widget kinds a host supports.

use indexmap::IndexMap;

use crate::collections::map::HashMap;
use crate::element::TEXT_TAG;
use crate::host::HostError;
use crate::props::PropValue;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChildPolicy {
    #[default]
    None,
    Single,
    Many,
}

impl ChildPolicy {
    pub fn limit(self) -> Option<usize> {
        match self {
            ChildPolicy::None => Some(0),
            ChildPolicy::Single => Some(1),
            ChildPolicy::Many => None,
        }
    }
}

/// One widget kind: its tag, settable properties with their clear values,
/// and how it takes children.
#[derive(Debug, Clone)]
pub struct WidgetKind {
    tag: String,
    props: IndexMap<String, PropValue>,
    children: ChildPolicy,
}

impl WidgetKind {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            props: IndexMap::new(),
            children: ChildPolicy::None,
        }
    }

    pub fn prop(mut self, key: impl Into<String>, default: impl Into<PropValue>) -> Self {
        self.props.insert(key.into(), default.into());
        self
    }

    pub fn children(mut self, policy: ChildPolicy) -> Self {
        self.children = policy;
        self
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn child_policy(&self) -> ChildPolicy {
        self.children
    }

    pub fn supports(&self, key: &str) -> bool {
        self.props.contains_key(key)
    }

    pub fn default_value(&self, key: &str) -> Option<&PropValue> {
        self.props.get(key)
    }

    pub fn defaults(&self) -> impl Iterator<Item = (&str, &PropValue)> + '_ {
        self.props.iter().map(|(key, value)| (key.as_str(), value))
    }
}

/// Registry of widget kinds, built once and handed to a host adapter.
#[derive(Debug, Clone, Default)]
pub struct HostRegistry {
    kinds: HashMap<String, WidgetKind>,
}

impl HostRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(mut self, kind: WidgetKind) -> Self {
        self.insert(kind);
        self
    }

    pub fn insert(&mut self, kind: WidgetKind) {
        if self.kinds.contains_key(kind.tag()) {
            log::warn!("widget kind `{}` registered twice; keeping the last", kind.tag());
        }
        self.kinds.insert(kind.tag.clone(), kind);
    }

    pub fn get(&self, tag: &str) -> Option<&WidgetKind> {
        self.kinds.get(tag)
    }

    pub fn lookup(&self, tag: &str) -> Result<&WidgetKind, HostError> {
        self.kinds.get(tag).ok_or_else(|| HostError::UnknownHostTag {
            tag: tag.to_owned(),
        })
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.kinds.contains_key(tag)
    }

    /// Whether primitive text leaves can be created.
    pub fn supports_text(&self) -> bool {
        self.contains(TEXT_TAG)
    }

    pub fn tags(&self) -> impl Iterator<Item = &str> + '_ {
        self.kinds.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_reports_unknown_tags() {
        let registry = HostRegistry::new().register(
            WidgetKind::new("block")
                .prop("direction", "column")
                .children(ChildPolicy::Many),
        );
        let kind = registry.lookup("block").unwrap();
        assert!(kind.supports("direction"));
        assert_eq!(kind.default_value("direction"), Some(&PropValue::from("column")));
        assert_eq!(
            registry.lookup("slider").unwrap_err(),
            HostError::UnknownHostTag {
                tag: "slider".to_owned()
            }
        );
        assert!(!registry.supports_text());
    }
}
