//! Immutable descriptions of the UI a caller wants.

use std::fmt;
use std::rc::Rc;

use crate::component::{Component, ComponentClass, FunctionComponent};
use crate::error::RenderError;
use crate::props::{NodeRef, PropValue, Props};

/// Host tag used for primitive text leaves.
pub const TEXT_TAG: &str = "#text";
/// Property carrying the content of a text leaf.
pub const TEXT_PROP: &str = "text";

#[derive(Clone)]
pub enum ElementType {
    Host(Rc<str>),
    Function(FunctionComponent),
    Stateful(ComponentClass),
}

impl ElementType {
    pub fn host(tag: impl Into<Rc<str>>) -> Self {
        ElementType::Host(tag.into())
    }

    pub fn name(&self) -> &str {
        match self {
            ElementType::Host(tag) => tag,
            ElementType::Function(function) => function.name(),
            ElementType::Stateful(class) => class.name(),
        }
    }

    pub fn is_host(&self) -> bool {
        matches!(self, ElementType::Host(_))
    }

    /// Whether a live node built from `self` can be updated in place to `other`.
    pub fn same_type(&self, other: &ElementType) -> bool {
        match (self, other) {
            (ElementType::Host(a), ElementType::Host(b)) => a == b,
            (ElementType::Function(a), ElementType::Function(b)) => a.same_component(b),
            (ElementType::Stateful(a), ElementType::Stateful(b)) => a.type_id() == b.type_id(),
            _ => false,
        }
    }

    pub(crate) fn validate(&self) -> Result<(), RenderError> {
        let ElementType::Host(tag) = self else {
            return Ok(());
        };
        if tag.is_empty() {
            return Err(RenderError::InvalidElementType {
                reason: "host tag is empty".to_owned(),
            });
        }
        if tag.chars().any(|c| c.is_whitespace() || c.is_control()) {
            return Err(RenderError::InvalidElementType {
                reason: format!("host tag {:?} contains whitespace", tag),
            });
        }
        Ok(())
    }
}

impl fmt::Debug for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ElementType::Host(tag) => write!(f, "<{tag}>"),
            ElementType::Function(function) => write!(f, "fn {}", function.name()),
            ElementType::Stateful(class) => write!(f, "component {}", class.name()),
        }
    }
}

impl From<&str> for ElementType {
    fn from(tag: &str) -> Self {
        ElementType::host(tag)
    }
}

impl From<String> for ElementType {
    fn from(tag: String) -> Self {
        ElementType::host(tag)
    }
}

impl From<FunctionComponent> for ElementType {
    fn from(function: FunctionComponent) -> Self {
        ElementType::Function(function)
    }
}

impl From<ComponentClass> for ElementType {
    fn from(class: ComponentClass) -> Self {
        ElementType::Stateful(class)
    }
}

#[derive(Clone)]
struct ElementData {
    ty: ElementType,
    props: Props,
    node_ref: Option<NodeRef>,
}

/// A node of a declarative tree.
///
/// Elements are shared, never mutated once another handle exists: the
/// builder methods copy on write. Equality is identity.
#[derive(Clone)]
pub struct Element(Rc<ElementData>);

impl Element {
    pub fn new(ty: impl Into<ElementType>) -> Self {
        Self(Rc::new(ElementData {
            ty: ty.into(),
            props: Props::new(),
            node_ref: None,
        }))
    }

    pub fn text(content: impl Into<Rc<str>>) -> Self {
        Element::new(TEXT_TAG).prop(TEXT_PROP, PropValue::Str(content.into()))
    }

    pub fn component<C: Component>() -> Self {
        Element::new(ComponentClass::of::<C>())
    }

    pub fn element_type(&self) -> &ElementType {
        &self.0.ty
    }

    pub fn props(&self) -> &Props {
        &self.0.props
    }

    pub fn children(&self) -> &[Element] {
        self.0.props.children()
    }

    pub fn node_ref(&self) -> Option<&NodeRef> {
        self.0.node_ref.as_ref()
    }

    pub fn prop(mut self, key: impl Into<String>, value: impl Into<PropValue>) -> Self {
        Rc::make_mut(&mut self.0).props.insert(key, value);
        self
    }

    pub fn props_from(mut self, props: &Props) -> Self {
        Rc::make_mut(&mut self.0).props.merge(props);
        self
    }

    pub fn child(mut self, child: impl Into<Element>) -> Self {
        Rc::make_mut(&mut self.0).props.push_child(child.into());
        self
    }

    pub fn with_children<I>(mut self, children: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Element>,
    {
        let props = &mut Rc::make_mut(&mut self.0).props;
        for child in children {
            props.push_child(child.into());
        }
        self
    }

    pub fn with_ref(mut self, node_ref: NodeRef) -> Self {
        Rc::make_mut(&mut self.0).node_ref = Some(node_ref);
        self
    }

    pub fn ptr_eq(&self, other: &Element) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl PartialEq for Element {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl Eq for Element {}

impl fmt::Debug for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Element")
            .field("type", &self.0.ty)
            .field("props", &self.0.props)
            .finish()
    }
}

impl From<&str> for Element {
    fn from(content: &str) -> Self {
        Element::text(content)
    }
}

impl From<String> for Element {
    fn from(content: String) -> Self {
        Element::text(content)
    }
}

/// Checked constructor. Builder-made elements are validated when the
/// reconciler first creates them instead.
pub fn create_element(
    ty: impl Into<ElementType>,
    props: Props,
    children: impl IntoIterator<Item = Element>,
) -> Result<Element, RenderError> {
    let ty = ty.into();
    ty.validate()?;
    let mut props = props;
    for child in children {
        props.push_child(child);
    }
    Ok(Element(Rc::new(ElementData {
        ty,
        props,
        node_ref: None,
    })))
}
