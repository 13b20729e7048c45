//! Prefabricated composite components built from the standard elements.

use log::error;
use rewx_core::{
    Callback, Component, Context, Element, HookResult, Props, RenderError, RenderResult,
};
use rewx_macros::component;

use crate::elements::{button, checkbox, column, row, text};

/// A caption followed by the field widgets passed as children.
#[component]
pub fn labeled_field(label: String, children: Vec<Element>) -> RenderResult {
    let mut items = Vec::with_capacity(children.len() + 1);
    items.push(text(label));
    items.extend(children);
    Ok(row(items))
}

/// Checkbox keeping its own checked state.
///
/// Props: `label`, `checked` (initial value; a changed value from the parent
/// overrides the internal state) and `on_toggle`, called with the new `bool`.
pub struct Toggle;

impl Component for Toggle {
    type State = bool;

    fn initialize(_props: &Props) -> Self {
        Toggle
    }

    fn initial_state(&self, props: &Props) -> Result<bool, RenderError> {
        Ok(props.extract::<Option<bool>>("checked")?.unwrap_or(false))
    }

    fn render(&self, cx: &Context<'_, Self>) -> RenderResult {
        let label: Option<String> = cx.props().extract("label")?;
        let on_toggle: Option<Callback> = cx.props().extract("on_toggle")?;
        let next = !*cx.state();
        let handle = cx.handle();
        let on_change = Callback::from_fn(move || {
            if let Err(err) = handle.replace_state(next) {
                error!("toggle update failed: {err}");
                return;
            }
            if let Some(on_toggle) = &on_toggle {
                on_toggle.call(&next);
            }
        });
        Ok(checkbox(label.unwrap_or_default(), *cx.state()).prop("on_change", on_change))
    }

    fn on_update(&mut self, cx: &Context<'_, Self>, prev_props: &Props, _prev: &bool) -> HookResult {
        let checked: Option<bool> = cx.props().extract("checked")?;
        let before: Option<bool> = prev_props.extract("checked")?;
        match checked {
            Some(checked) if before != Some(checked) && checked != *cx.state() => {
                cx.handle().replace_state(checked)
            }
            _ => Ok(()),
        }
    }
}

/// Counter with decrement and increment buttons.
///
/// Props: `label`, `start`, `step` (default 1) and `on_change`, called with
/// the new `i64` count.
pub struct Counter;

impl Counter {
    fn stepper(cx: &Context<'_, Self>, caption: &str, delta: i64) -> RenderResult {
        let on_change: Option<Callback> = cx.props().extract("on_change")?;
        let next = *cx.state() + delta;
        let handle = cx.handle();
        Ok(button(
            caption,
            Callback::from_fn(move || {
                if let Err(err) = handle.replace_state(next) {
                    error!("counter update failed: {err}");
                    return;
                }
                if let Some(on_change) = &on_change {
                    on_change.call(&next);
                }
            }),
        ))
    }
}

impl Component for Counter {
    type State = i64;

    fn initialize(_props: &Props) -> Self {
        Counter
    }

    fn initial_state(&self, props: &Props) -> Result<i64, RenderError> {
        Ok(props.extract::<Option<i64>>("start")?.unwrap_or(0))
    }

    fn render(&self, cx: &Context<'_, Self>) -> RenderResult {
        let label: Option<String> = cx.props().extract("label")?;
        let step = cx.props().extract::<Option<i64>>("step")?.unwrap_or(1);
        let caption = match label {
            Some(label) => format!("{label}: {}", cx.state()),
            None => cx.state().to_string(),
        };
        Ok(column([
            text(caption),
            row([
                Self::stepper(cx, "-", -step)?,
                Self::stepper(cx, "+", step)?,
            ]),
        ]))
    }
}
