use rewx_core::{
    Component, ComponentClass, Context, Element, FunctionComponent, HookResult, HostError,
    HostRegistry, MemoryHost, NodeRef, PropValue, Props, ReconcilerOptions, RenderError,
    RenderResult, Root, WidgetKind,
};
use rewx_testing::{test_root, test_root_with, EventLog, HostOp};

thread_local! {
    static KEEPER_EVENTS: EventLog = EventLog::new();
}

fn block(children: Vec<Element>) -> Element {
    Element::new("block").with_children(children)
}

fn text(label: &str) -> Element {
    Element::new("text").prop("label", label)
}

fn x(label: &str) -> Element {
    Element::new("x").prop("label", label)
}

fn y(label: &str) -> Element {
    Element::new("y").prop("label", label)
}

#[test]
fn fresh_render_creates_one_widget_per_host_element() {
    let root = test_root();
    let tree = block(vec![
        text("A").prop("color", "red"),
        block(vec![Element::new("button").prop("label", "go"), "leaf".into()]),
    ]);
    let widget = root.render(&tree).expect("render");

    assert_eq!(root.widget_count(), 5);
    assert_eq!(
        root.ops().creates(),
        vec!["block", "text", "block", "button", "#text"]
    );
    let children = root.children_of(widget);
    assert_eq!(children.len(), 2);
    assert_eq!(root.label_of(children[0]).as_deref(), Some("A"));
    assert_eq!(root.prop_of(children[0], "color"), Some(PropValue::from("red")));
    let inner = root.children_of(children[1]);
    assert_eq!(root.label_of(inner[0]).as_deref(), Some("go"));
    assert_eq!(root.prop_of(inner[1], "text"), Some(PropValue::from("leaf")));
}

#[test]
fn rendering_the_same_tree_twice_only_rewrites_props() {
    let tree = || block(vec![text("A"), x("B"), "plain".into()]);
    let root = test_root();
    root.render(&tree()).expect("first render");
    let first = root.ops().take();

    root.render(&tree()).expect("second render");
    let second = root.ops().take();

    assert!(second.iter().all(|op| !op.is_structural()), "{second:?}");
    let first_writes: Vec<HostOp> = first.into_iter().filter(|op| !op.is_structural()).collect();
    assert_eq!(first_writes, second);
}

#[test]
fn text_label_updates_in_place() {
    let root = test_root();
    let container = root.render(&block(vec![text("A")])).expect("render");
    let label = root.children_of(container)[0];
    root.ops().clear();

    let again = root.render(&block(vec![text("B")])).expect("re-render");
    assert_eq!(again, container);
    assert_eq!(root.children_of(container), vec![label]);
    assert_eq!(root.label_of(label).as_deref(), Some("B"));
    assert!(root.ops().structural().is_empty());
    assert_eq!(root.widget_count(), 2);
}

#[test]
fn dropping_the_last_child_keeps_the_container() {
    let root = test_root();
    let container = root.render(&block(vec![text("A")])).expect("render");
    let label = root.children_of(container)[0];
    root.ops().clear();

    root.render(&block(vec![])).expect("re-render");
    assert_eq!(
        root.ops().structural(),
        vec![
            HostOp::RemoveChild {
                parent: container,
                child: label
            },
            HostOp::Destroy { widget: label },
        ]
    );
    assert_eq!(root.root_widget(), Some(container));
    assert!(root.children_of(container).is_empty());
}

#[test]
fn siblings_are_correlated_by_position() {
    let root = test_root();
    let container = root
        .render(&block(vec![x("A"), x("B"), x("C")]))
        .expect("render");
    let [a, b, c] = root.children_of(container)[..] else {
        panic!("expected three children");
    };
    root.ops().clear();

    root.render(&block(vec![x("A'"), y("D")])).expect("re-render");
    let ops = root.ops().take();
    let d = match ops.iter().find(|op| matches!(op, HostOp::Create { .. })) {
        Some(HostOp::Create { widget, .. }) => *widget,
        _ => panic!("expected a create for D: {ops:?}"),
    };
    assert_eq!(
        ops,
        vec![
            HostOp::SetProp {
                widget: a,
                key: "label".into(),
                value: PropValue::from("A'"),
            },
            HostOp::RemoveChild {
                parent: container,
                child: b
            },
            HostOp::Destroy { widget: b },
            HostOp::Create {
                widget: d,
                tag: "y".into(),
                parent: Some(container),
            },
            HostOp::SetProp {
                widget: d,
                key: "label".into(),
                value: PropValue::from("D"),
            },
            HostOp::Append {
                parent: container,
                child: d,
                index: 1
            },
            HostOp::RemoveChild {
                parent: container,
                child: c
            },
            HostOp::Destroy { widget: c },
        ]
    );
    assert_ne!(d, c);
    assert_eq!(root.children_of(container), vec![a, d]);
}

#[test]
fn replaced_child_takes_the_vacated_position() {
    let root = test_root();
    let container = root
        .render(&block(vec![x("first"), x("middle"), x("last")]))
        .expect("render");
    let before = root.children_of(container);

    root.render(&block(vec![x("first"), y("middle"), x("last")]))
        .expect("re-render");
    let after = root.children_of(container);
    assert_eq!(after.len(), 3);
    assert_eq!(after[0], before[0]);
    assert_eq!(after[2], before[2]);
    assert_eq!(root.tag_of(after[1]).as_deref(), Some("y"));
}

#[test]
fn removed_props_are_cleared_to_defaults() {
    let root = test_root();
    let widget = root
        .render(&text("A").prop("color", "red"))
        .expect("render");
    root.ops().clear();

    root.render(&text("B")).expect("re-render");
    assert_eq!(
        root.ops().prop_writes(),
        vec![
            HostOp::SetProp {
                widget,
                key: "label".into(),
                value: PropValue::from("B"),
            },
            HostOp::ClearProp {
                widget,
                key: "color".into(),
            },
        ]
    );
    assert_eq!(root.prop_of(widget, "color"), Some(PropValue::Null));
}

#[test]
fn root_type_change_replaces_the_root_widget() {
    let root = test_root();
    let first = root.render(&text("A")).expect("render");
    let second = root.render(&x("A")).expect("re-render");
    assert_ne!(first, second);
    assert_eq!(root.tag_of(first), None);
    assert_eq!(root.widget_count(), 1);
}

#[test]
fn unmount_destroys_everything() {
    let root = test_root();
    root.render(&block(vec![text("A"), block(vec![x("B"), "c".into()])]))
        .expect("render");
    let created = root.widget_count();
    root.ops().clear();

    root.unmount().expect("unmount");
    assert_eq!(root.ops().destroys().len(), created);
    assert_eq!(root.widget_count(), 0);
    assert_eq!(root.root_widget(), None);
    assert_eq!(root.root().node_count(), 0);
}

#[test]
fn refs_follow_the_widget_they_point_at() {
    let root = test_root();
    let node_ref = NodeRef::new();
    let widget = root
        .render(&block(vec![text("A").with_ref(node_ref.clone())]))
        .expect("render");
    let label = root.children_of(widget)[0];
    assert_eq!(node_ref.get(), Some(label));

    root.render(&block(vec![x("A").with_ref(node_ref.clone())]))
        .expect("replace");
    let replacement = root.children_of(widget)[0];
    assert_ne!(replacement, label);
    assert_eq!(node_ref.get(), Some(replacement));

    root.render(&block(vec![])).expect("remove");
    assert_eq!(node_ref.get(), None);
}

#[test]
fn moving_a_ref_to_another_element_clears_the_old_slot() {
    let root = test_root();
    let old_ref = NodeRef::new();
    let new_ref = NodeRef::new();
    let widget = root
        .render(&text("A").with_ref(old_ref.clone()))
        .expect("render");
    root.render(&text("A").with_ref(new_ref.clone()))
        .expect("re-render");
    assert_eq!(old_ref.get(), None);
    assert_eq!(new_ref.get(), Some(widget));
}

#[test]
fn unsupported_props_are_skipped_unless_strict() {
    let tree = block(vec![text("A").prop("font", "mono").prop("color", "blue")]);

    let lenient = test_root();
    let widget = lenient.render(&tree).expect("unsupported prop is skipped");
    let label = lenient.children_of(widget)[0];
    assert_eq!(lenient.prop_of(label, "color"), Some(PropValue::from("blue")));
    assert_eq!(lenient.prop_of(label, "font"), None);

    let strict = test_root_with(ReconcilerOptions::new().strict_props(true));
    let err = strict.render(&tree).expect_err("strict render fails");
    assert!(
        matches!(err, RenderError::UnsupportedProp { ref tag, ref key } if tag == "text" && key == "font")
    );
}

#[test]
fn dropped_unsupported_props_are_skipped_unless_strict() {
    let lenient = test_root();
    let widget = lenient
        .render(&text("A").prop("font", "mono"))
        .expect("render");
    lenient.ops().take();
    lenient
        .render(&text("A"))
        .expect("clearing an unsupported prop is skipped");
    assert_eq!(lenient.label_of(widget).as_deref(), Some("A"));
    assert!(lenient
        .ops()
        .take()
        .iter()
        .all(|op| !matches!(op, HostOp::ClearProp { .. })));

    let strict = test_root_with(ReconcilerOptions::new().strict_props(true));
    strict
        .render(&text("A").prop("font", "mono"))
        .expect_err("setting fails first");
    let err = strict.render(&text("A")).expect_err("clearing fails too");
    assert!(
        matches!(err, RenderError::UnsupportedProp { ref tag, ref key } if tag == "text" && key == "font")
    );
}

#[test]
fn unknown_tags_and_invalid_types_fail_the_render() {
    let root = test_root();
    let err = root
        .render(&block(vec![Element::new("slider")]))
        .expect_err("unknown tag");
    assert!(matches!(err, RenderError::UnknownHostTag { ref tag } if tag == "slider"));

    let err = test_root()
        .render(&block(vec![Element::new("")]))
        .expect_err("empty tag");
    assert!(matches!(err, RenderError::InvalidElementType { .. }));

    root.render(&block(vec![text("ok")]))
        .expect("the root stays usable");
}

#[test]
fn text_leaves_need_a_registered_text_kind() {
    let host = MemoryHost::new(
        HostRegistry::new().register(
            WidgetKind::new("block").children(rewx_core::ChildPolicy::Many),
        ),
    );
    let root = Root::new(host);
    let err = root
        .render(&Element::new("block").child("hello"))
        .expect_err("no #text kind");
    assert!(matches!(err, RenderError::UnknownHostTag { ref tag } if tag == "#text"));
}

#[test]
fn child_policy_violations_surface_as_host_errors() {
    let root = test_root();
    let err = root
        .render(&Element::new("frame").child(text("a")).child(text("b")))
        .expect_err("frame takes one child");
    assert!(matches!(
        err,
        RenderError::Host(HostError::TooManyChildren { limit: 1, .. })
    ));
}

#[test]
fn function_components_expand_transparently() {
    fn labelled(props: &Props) -> RenderResult {
        let caption: String = props.extract("caption")?;
        Ok(text(&caption))
    }

    let root = test_root();
    let component = FunctionComponent::new("labelled", labelled);
    let container = root
        .render(&block(vec![
            Element::new(component.clone()).prop("caption", "one"),
        ]))
        .expect("render");
    let label = root.children_of(container)[0];
    assert_eq!(root.tag_of(label).as_deref(), Some("text"));

    root.render(&block(vec![
        Element::new(component).prop("caption", "two"),
    ]))
    .expect("re-render");
    assert_eq!(root.children_of(container), vec![label]);
    assert_eq!(root.label_of(label).as_deref(), Some("two"));
}

#[test]
fn different_function_components_replace_each_other() {
    fn first(_props: &Props) -> RenderResult {
        Ok(text("same"))
    }
    fn second(_props: &Props) -> RenderResult {
        Ok(text("same"))
    }

    let root = test_root();
    let a = root
        .render(&Element::new(FunctionComponent::new("first", first)))
        .expect("render");
    let b = root
        .render(&Element::new(FunctionComponent::new("second", second)))
        .expect("re-render");
    assert_ne!(a, b);
    assert_eq!(root.widget_count(), 1);
}

/// Stateful leaf recording when it mounts and unmounts.
struct Keeper;

impl Component for Keeper {
    type State = ();

    fn initialize(_props: &Props) -> Self {
        Keeper
    }

    fn initial_state(&self, _props: &Props) -> Result<(), RenderError> {
        Ok(())
    }

    fn render(&self, cx: &Context<'_, Self>) -> RenderResult {
        let page: String = cx.props().extract("page")?;
        Ok(text(&page))
    }

    fn on_mount(&mut self, _cx: &Context<'_, Self>) -> HookResult {
        KEEPER_EVENTS.with(|log| log.push("mount"));
        Ok(())
    }

    fn on_unmount(&mut self, _cx: &Context<'_, Self>) -> HookResult {
        KEEPER_EVENTS.with(|log| log.push("unmount"));
        Ok(())
    }
}

#[test]
fn function_pointers_in_a_table_stay_distinct_components() {
    fn login(_props: &Props) -> RenderResult {
        Ok(Element::component::<Keeper>().prop("page", "login"))
    }
    fn settings(_props: &Props) -> RenderResult {
        Ok(Element::component::<Keeper>().prop("page", "settings"))
    }

    KEEPER_EVENTS.with(EventLog::clear);
    let pages: [(&'static str, fn(&Props) -> RenderResult); 2] =
        [("login", login), ("settings", settings)];
    let page = |index: usize| {
        let (name, render) = pages[index];
        Element::new(FunctionComponent::from_fn(name, render))
    };

    let root = test_root();
    root.render(&page(0)).expect("login");
    root.render(&page(1)).expect("settings");
    assert_eq!(KEEPER_EVENTS.with(EventLog::take), vec!["mount", "unmount", "mount"]);

    // The same pointer through `new` is still the same component.
    let (name, render) = pages[1];
    root.render(&Element::new(FunctionComponent::new(name, render)))
        .expect("settings again");
    assert!(KEEPER_EVENTS.with(EventLog::take).is_empty());
    assert_eq!(root.widget_count(), 1);
}

#[test]
fn render_errors_from_components_propagate() {
    fn broken(_props: &Props) -> RenderResult {
        Err(RenderError::component("broken", "cannot render"))
    }

    let root = test_root();
    let err = root
        .render(&block(vec![
            Element::new(FunctionComponent::new("broken", broken)),
        ]))
        .expect_err("render fails");
    assert!(matches!(err, RenderError::Component { ref component, .. } if component == "broken"));
    assert!(!root.root().is_rendering());
}

#[test]
fn class_descriptors_compare_by_component_type() {
    struct A;
    struct B;
    impl rewx_core::Component for A {
        type State = ();
        fn initialize(_props: &Props) -> Self {
            A
        }
        fn initial_state(&self, _props: &Props) -> Result<(), RenderError> {
            Ok(())
        }
        fn render(&self, _cx: &rewx_core::Context<'_, Self>) -> RenderResult {
            Ok(text("a"))
        }
    }
    impl rewx_core::Component for B {
        type State = ();
        fn initialize(_props: &Props) -> Self {
            B
        }
        fn initial_state(&self, _props: &Props) -> Result<(), RenderError> {
            Ok(())
        }
        fn render(&self, _cx: &rewx_core::Context<'_, Self>) -> RenderResult {
            Ok(text("b"))
        }
    }

    let a = Element::new(ComponentClass::of::<A>());
    assert!(a
        .element_type()
        .same_type(Element::component::<A>().element_type()));
    assert!(!a
        .element_type()
        .same_type(Element::component::<B>().element_type()));
    assert_eq!(a.element_type().name(), "A");
}
