//! Property values carried by elements.

use std::any::Any;
use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;

use crate::element::Element;
use crate::error::RenderError;
use crate::host::WidgetId;

pub const CHILDREN_KEY: &str = "children";
pub const REF_KEY: &str = "ref";

pub fn is_reserved(key: &str) -> bool {
    key == CHILDREN_KEY || key == REF_KEY
}

/// Event handler stored in a prop. The payload is whatever the host toolkit
/// hands over; it is passed through untouched.
#[derive(Clone)]
pub struct Callback(Rc<dyn Fn(&dyn Any)>);

impl Callback {
    pub fn new(handler: impl Fn(&dyn Any) + 'static) -> Self {
        Self(Rc::new(handler))
    }

    /// Handler that ignores the event payload.
    pub fn from_fn(handler: impl Fn() + 'static) -> Self {
        Self::new(move |_| handler())
    }

    pub fn call(&self, event: &dyn Any) {
        (self.0)(event)
    }

    pub fn ptr_eq(&self, other: &Callback) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for Callback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Callback({:p})", Rc::as_ptr(&self.0))
    }
}

#[derive(Clone, Default)]
pub enum PropValue {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(Rc<str>),
    List(Rc<[PropValue]>),
    Handler(Callback),
    Any(Rc<dyn Any>),
}

impl PropValue {
    pub fn type_name(&self) -> &'static str {
        match self {
            PropValue::Null => "null",
            PropValue::Bool(_) => "bool",
            PropValue::Int(_) => "int",
            PropValue::Float(_) => "float",
            PropValue::Str(_) => "string",
            PropValue::List(_) => "list",
            PropValue::Handler(_) => "handler",
            PropValue::Any(_) => "opaque value",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, PropValue::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            PropValue::Bool(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            PropValue::Int(value) => Some(*value),
            _ => None,
        }
    }

    /// Integers widen to floats.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            PropValue::Float(value) => Some(*value),
            PropValue::Int(value) => Some(*value as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            PropValue::Str(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[PropValue]> {
        match self {
            PropValue::List(values) => Some(values),
            _ => None,
        }
    }

    pub fn as_handler(&self) -> Option<&Callback> {
        match self {
            PropValue::Handler(handler) => Some(handler),
            _ => None,
        }
    }

    pub fn downcast_ref<T: 'static>(&self) -> Option<&T> {
        match self {
            PropValue::Any(value) => value.downcast_ref::<T>(),
            _ => None,
        }
    }
}

impl PartialEq for PropValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (PropValue::Null, PropValue::Null) => true,
            (PropValue::Bool(a), PropValue::Bool(b)) => a == b,
            (PropValue::Int(a), PropValue::Int(b)) => a == b,
            (PropValue::Float(a), PropValue::Float(b)) => a == b,
            (PropValue::Str(a), PropValue::Str(b)) => a == b,
            (PropValue::List(a), PropValue::List(b)) => a == b,
            (PropValue::Handler(a), PropValue::Handler(b)) => a.ptr_eq(b),
            (PropValue::Any(a), PropValue::Any(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Debug for PropValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropValue::Null => f.write_str("null"),
            PropValue::Bool(value) => write!(f, "{value}"),
            PropValue::Int(value) => write!(f, "{value}"),
            PropValue::Float(value) => write!(f, "{value}"),
            PropValue::Str(value) => write!(f, "{value:?}"),
            PropValue::List(values) => f.debug_list().entries(values.iter()).finish(),
            PropValue::Handler(handler) => handler.fmt(f),
            PropValue::Any(_) => f.write_str("<opaque>"),
        }
    }
}

impl From<bool> for PropValue {
    fn from(value: bool) -> Self {
        PropValue::Bool(value)
    }
}

impl From<i32> for PropValue {
    fn from(value: i32) -> Self {
        PropValue::Int(value.into())
    }
}

impl From<i64> for PropValue {
    fn from(value: i64) -> Self {
        PropValue::Int(value)
    }
}

impl From<u32> for PropValue {
    fn from(value: u32) -> Self {
        PropValue::Int(value.into())
    }
}

impl From<usize> for PropValue {
    fn from(value: usize) -> Self {
        PropValue::Int(value as i64)
    }
}

impl From<f32> for PropValue {
    fn from(value: f32) -> Self {
        PropValue::Float(value.into())
    }
}

impl From<f64> for PropValue {
    fn from(value: f64) -> Self {
        PropValue::Float(value)
    }
}

impl From<&str> for PropValue {
    fn from(value: &str) -> Self {
        PropValue::Str(value.into())
    }
}

impl From<String> for PropValue {
    fn from(value: String) -> Self {
        PropValue::Str(value.into())
    }
}

impl From<Rc<str>> for PropValue {
    fn from(value: Rc<str>) -> Self {
        PropValue::Str(value)
    }
}

impl From<Callback> for PropValue {
    fn from(value: Callback) -> Self {
        PropValue::Handler(value)
    }
}

impl From<Vec<PropValue>> for PropValue {
    fn from(values: Vec<PropValue>) -> Self {
        PropValue::List(values.into())
    }
}

impl<T: Into<PropValue>> From<Option<T>> for PropValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(PropValue::Null, Into::into)
    }
}

/// Conversion used by [`Props::extract`].
pub trait FromProp: Sized {
    const EXPECTED: &'static str;

    fn from_prop(value: &PropValue) -> Option<Self>;

    fn missing(key: &str) -> Result<Self, RenderError> {
        Err(RenderError::MissingProp {
            key: key.to_owned(),
        })
    }
}

impl FromProp for PropValue {
    const EXPECTED: &'static str = "any value";

    fn from_prop(value: &PropValue) -> Option<Self> {
        Some(value.clone())
    }
}

impl FromProp for bool {
    const EXPECTED: &'static str = "bool";

    fn from_prop(value: &PropValue) -> Option<Self> {
        value.as_bool()
    }
}

impl FromProp for i64 {
    const EXPECTED: &'static str = "int";

    fn from_prop(value: &PropValue) -> Option<Self> {
        value.as_int()
    }
}

impl FromProp for i32 {
    const EXPECTED: &'static str = "int";

    fn from_prop(value: &PropValue) -> Option<Self> {
        value.as_int().and_then(|value| i32::try_from(value).ok())
    }
}

impl FromProp for f64 {
    const EXPECTED: &'static str = "float";

    fn from_prop(value: &PropValue) -> Option<Self> {
        value.as_float()
    }
}

impl FromProp for String {
    const EXPECTED: &'static str = "string";

    fn from_prop(value: &PropValue) -> Option<Self> {
        value.as_str().map(str::to_owned)
    }
}

impl FromProp for Rc<str> {
    const EXPECTED: &'static str = "string";

    fn from_prop(value: &PropValue) -> Option<Self> {
        match value {
            PropValue::Str(value) => Some(Rc::clone(value)),
            _ => None,
        }
    }
}

impl FromProp for Callback {
    const EXPECTED: &'static str = "handler";

    fn from_prop(value: &PropValue) -> Option<Self> {
        value.as_handler().cloned()
    }
}

impl FromProp for Vec<PropValue> {
    const EXPECTED: &'static str = "list";

    fn from_prop(value: &PropValue) -> Option<Self> {
        value.as_list().map(<[PropValue]>::to_vec)
    }
}

/// Absent keys and `null` both extract as `None`.
impl<T: FromProp> FromProp for Option<T> {
    const EXPECTED: &'static str = T::EXPECTED;

    fn from_prop(value: &PropValue) -> Option<Self> {
        if value.is_null() {
            return Some(None);
        }
        T::from_prop(value).map(Some)
    }

    fn missing(_key: &str) -> Result<Self, RenderError> {
        Ok(None)
    }
}

/// Property map of an element plus its children.
///
/// Keys keep insertion order so hosts see writes in a stable order. The
/// reserved `children` and `ref` keys never appear among the values.
#[derive(Clone, Default)]
pub struct Props {
    values: IndexMap<String, PropValue>,
    children: Vec<Element>,
}

impl Props {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<PropValue>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<PropValue>) {
        let key = key.into();
        if is_reserved(&key) {
            log::warn!("ignoring reserved property key `{key}`");
            return;
        }
        self.values.insert(key, value.into());
    }

    pub fn remove(&mut self, key: &str) -> Option<PropValue> {
        self.values.shift_remove(key)
    }

    pub fn get(&self, key: &str) -> Option<&PropValue> {
        self.values.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> + '_ {
        self.values.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &PropValue)> + '_ {
        self.values.iter().map(|(key, value)| (key.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn children(&self) -> &[Element] {
        &self.children
    }

    pub fn set_children(&mut self, children: Vec<Element>) {
        self.children = children;
    }

    pub fn push_child(&mut self, child: Element) {
        self.children.push(child);
    }

    /// Overlays `other`'s values onto `self`; `other`'s children are appended.
    pub fn merge(&mut self, other: &Props) {
        for (key, value) in other.values.iter() {
            self.values.insert(key.clone(), value.clone());
        }
        self.children.extend(other.children.iter().cloned());
    }

    pub fn extract<T: FromProp>(&self, key: &str) -> Result<T, RenderError> {
        match self.values.get(key) {
            None => T::missing(key),
            Some(value) => T::from_prop(value).ok_or_else(|| RenderError::PropType {
                key: key.to_owned(),
                expected: T::EXPECTED,
                found: value.type_name(),
            }),
        }
    }
}

impl fmt::Debug for Props {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        map.entries(self.values.iter());
        if !self.children.is_empty() {
            map.entry(&CHILDREN_KEY, &self.children);
        }
        map.finish()
    }
}

impl<K: Into<String>, V: Into<PropValue>> FromIterator<(K, V)> for Props {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut props = Props::new();
        for (key, value) in iter {
            props.insert(key, value);
        }
        props
    }
}

/// Output slot through which a caller obtains the widget created for an
/// element. Cloning shares the slot.
#[derive(Clone, Default)]
pub struct NodeRef(Rc<Cell<Option<WidgetId>>>);

impl NodeRef {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> Option<WidgetId> {
        self.0.get()
    }

    pub fn is_set(&self) -> bool {
        self.0.get().is_some()
    }

    pub(crate) fn set(&self, widget: WidgetId) {
        self.0.set(Some(widget));
    }

    pub(crate) fn clear(&self) {
        self.0.set(None);
    }

    pub fn ptr_eq(&self, other: &NodeRef) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for NodeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("NodeRef").field(&self.0.get()).finish()
    }
}
