use std::cell::RefCell;
use std::rc::Rc;

use rewx_core::{Callback, Element, MemoryHost, PropValue, RenderError, Root, WidgetId};
use rewx_widgets::prelude::*;

fn root() -> Root<MemoryHost> {
    Root::new(MemoryHost::new(standard_registry()))
}

fn prop(root: &Root<MemoryHost>, widget: WidgetId, key: &str) -> Option<PropValue> {
    root.host().widget(widget)?.prop(key).cloned()
}

fn children(root: &Root<MemoryHost>, widget: WidgetId) -> Vec<WidgetId> {
    root.host()
        .widget(widget)
        .map(|w| w.children().to_vec())
        .unwrap_or_default()
}

fn click(root: &Root<MemoryHost>, widget: WidgetId, key: &str) {
    let handler = root.host().handler(widget, key).expect("handler attached");
    handler.call(&());
}

#[test]
fn column_and_row_set_the_direction() {
    let root = root();
    let widget = root
        .render(&column([row([text("a"), text("b")]), text("c")]))
        .expect("render");
    assert_eq!(prop(&root, widget, "direction"), Some(PropValue::from("column")));
    let first = children(&root, widget)[0];
    assert_eq!(prop(&root, first, "direction"), Some(PropValue::from("row")));
    assert_eq!(children(&root, first).len(), 2);
}

#[test]
fn labeled_field_puts_the_caption_first() {
    let root = root();
    let widget = root
        .render(
            &Element::new(labeled_field())
                .prop("label", "Name")
                .child(textbox("Ada")),
        )
        .expect("render");
    let items = children(&root, widget);
    assert_eq!(items.len(), 2);
    assert_eq!(prop(&root, items[0], "label"), Some(PropValue::from("Name")));
    assert_eq!(prop(&root, items[1], "value"), Some(PropValue::from("Ada")));
}

#[test]
fn counter_buttons_step_the_count() {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    let root = root();
    let widget = root
        .render(
            &Element::component::<Counter>()
                .prop("label", "Clicks")
                .prop("step", 2)
                .prop(
                    "on_change",
                    Callback::new(move |value| {
                        if let Some(value) = value.downcast_ref::<i64>() {
                            sink.borrow_mut().push(*value);
                        }
                    }),
                ),
        )
        .expect("render");
    let [caption, buttons] = children(&root, widget)[..] else {
        panic!("counter renders a caption and a row");
    };
    let [minus, plus] = children(&root, buttons)[..] else {
        panic!("two buttons");
    };
    assert_eq!(prop(&root, caption, "label"), Some(PropValue::from("Clicks: 0")));

    click(&root, plus, "on_click");
    click(&root, plus, "on_click");
    click(&root, minus, "on_click");
    assert_eq!(prop(&root, caption, "label"), Some(PropValue::from("Clicks: 2")));
    assert_eq!(*seen.borrow(), vec![2, 4, 2]);
    assert_eq!(root.host().len(), 5);
}

#[test]
fn mistyped_initial_props_are_reported() {
    let root = root();
    let err = root
        .render(&Element::component::<Counter>().prop("start", "ten"))
        .expect_err("start must be an integer");
    assert!(matches!(err, RenderError::PropType { ref key, .. } if key == "start"));

    let err = root
        .render(&Element::component::<Toggle>().prop("checked", 1))
        .expect_err("checked must be a bool");
    assert!(matches!(err, RenderError::PropType { ref key, .. } if key == "checked"));
}

#[test]
fn toggle_flips_and_notifies() {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    let on_toggle = Callback::new(move |value| {
        if let Some(value) = value.downcast_ref::<bool>() {
            sink.borrow_mut().push(*value);
        }
    });
    let root = root();
    let toggle = |checked: bool| {
        Element::component::<Toggle>()
            .prop("label", "Dark mode")
            .prop("checked", checked)
            .prop("on_toggle", on_toggle.clone())
    };
    let widget = root.render(&toggle(false)).expect("render");
    assert_eq!(prop(&root, widget, "checked"), Some(PropValue::Bool(false)));

    click(&root, widget, "on_change");
    assert_eq!(prop(&root, widget, "checked"), Some(PropValue::Bool(true)));
    assert_eq!(*seen.borrow(), vec![true]);

    // Re-rendering with an unchanged `checked` prop keeps the internal state.
    root.render(&toggle(false)).expect("re-render");
    assert_eq!(prop(&root, widget, "checked"), Some(PropValue::Bool(true)));

    // A changed `checked` prop from the parent wins.
    root.render(&toggle(true)).expect("re-render");
    root.render(&toggle(false)).expect("re-render");
    assert_eq!(prop(&root, widget, "checked"), Some(PropValue::Bool(false)));
}

#[test]
fn frame_takes_a_single_child() {
    let root = root();
    let widget = root
        .render(&frame("Main").child(scroll().child(column([text("body")]))))
        .expect("render");
    assert_eq!(prop(&root, widget, "title"), Some(PropValue::from("Main")));
    assert!(root
        .render(&frame("Main").child(text("a")).child(text("b")))
        .is_err());
}
