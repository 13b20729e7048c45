use std::process::ExitCode;

use rewx_core::{Callback, Element, MemoryHost, RenderError, Root, WidgetId};
use rewx_widgets::prelude::*;
use rewx_widgets::{BUTTON, CHECKBOX};

fn app(dark_mode: bool) -> Element {
    frame("re-wx demo").child(column([
        Element::new(labeled_field())
            .prop("label", "Name")
            .child(textbox("Ada")),
        Element::component::<Toggle>()
            .prop("label", "Dark mode")
            .prop("checked", dark_mode)
            .prop(
                "on_toggle",
                Callback::new(|value| {
                    if let Some(checked) = value.downcast_ref::<bool>() {
                        log::info!("dark mode toggled: {checked}");
                    }
                }),
            ),
        Element::component::<Counter>()
            .prop("label", "Clicks")
            .prop(
                "on_change",
                Callback::new(|value| {
                    if let Some(count) = value.downcast_ref::<i64>() {
                        log::info!("counter changed: {count}");
                    }
                }),
            ),
    ]))
}

/// Fires the handler stored under `key`, as the toolkit would on a native event.
fn dispatch(root: &Root<MemoryHost>, widget: WidgetId, key: &str) {
    let handler = root.host().handler(widget, key);
    match handler {
        Some(handler) => handler.call(&()),
        None => log::warn!("widget {widget} has no `{key}` handler"),
    }
}

fn dump(root: &Root<MemoryHost>, title: &str) {
    println!("--- {title} ---");
    print!("{}", root.host().dump_tree(root.root_widget()));
    println!();
}

fn run() -> Result<(), RenderError> {
    let root = Root::new(MemoryHost::new(standard_registry()));
    root.render(&app(false))?;
    dump(&root, "initial render");

    let plus = root.host().find_by_tag(BUTTON).last().copied();
    if let Some(plus) = plus {
        dispatch(&root, plus, "on_click");
        dispatch(&root, plus, "on_click");
    }
    dump(&root, "after two clicks on +");

    let toggle = root.host().find_by_tag(CHECKBOX).first().copied();
    if let Some(toggle) = toggle {
        dispatch(&root, toggle, "on_change");
    }
    dump(&root, "after toggling dark mode");

    root.render(&app(false))?;
    dump(&root, "after re-rendering the app");

    log::debug!("live tree:\n{}", root.dump_tree());
    root.unmount()?;
    println!("widgets left after unmount: {}", root.host().len());
    Ok(())
}

fn main() -> ExitCode {
    env_logger::init();

    println!("=== re-wx headless demo ===");
    println!("Set RUST_LOG=rewx=trace to watch every reconciler operation.");
    println!();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("demo failed: {err}");
            ExitCode::FAILURE
        }
    }
}
