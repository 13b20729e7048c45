use rewx_core::{ChildPolicy, HostRegistry, PropValue, WidgetKind, TEXT_PROP, TEXT_TAG};

pub const BLOCK: &str = "block";
pub const TEXT: &str = "text";
pub const BUTTON: &str = "button";
pub const TEXTBOX: &str = "textbox";
pub const CHECKBOX: &str = "checkbox";
pub const FRAME: &str = "frame";
pub const SCROLL: &str = "scroll";

/// Widget kinds understood by the elements in this crate.
///
/// Event props (`on_click`, `on_change`) default to `null`, so clearing one
/// detaches the handler.
pub fn standard_registry() -> HostRegistry {
    HostRegistry::new()
        .register(
            WidgetKind::new(BLOCK)
                .prop("direction", "column")
                .prop("gap", 0)
                .prop("padding", 0)
                .children(ChildPolicy::Many),
        )
        .register(
            WidgetKind::new(TEXT)
                .prop("label", "")
                .prop("color", PropValue::Null)
                .prop("wrap", false),
        )
        .register(
            WidgetKind::new(BUTTON)
                .prop("label", "")
                .prop("enabled", true)
                .prop("on_click", PropValue::Null),
        )
        .register(
            WidgetKind::new(TEXTBOX)
                .prop("value", "")
                .prop("placeholder", "")
                .prop("enabled", true)
                .prop("on_change", PropValue::Null),
        )
        .register(
            WidgetKind::new(CHECKBOX)
                .prop("label", "")
                .prop("checked", false)
                .prop("on_change", PropValue::Null),
        )
        .register(
            WidgetKind::new(FRAME)
                .prop("title", "")
                .prop("width", 640)
                .prop("height", 480)
                .children(ChildPolicy::Single),
        )
        .register(
            WidgetKind::new(SCROLL)
                .prop("horizontal", false)
                .children(ChildPolicy::Single),
        )
        .register(WidgetKind::new(TEXT_TAG).prop(TEXT_PROP, ""))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registers_every_standard_kind() {
        let registry = standard_registry();
        for tag in [BLOCK, TEXT, BUTTON, TEXTBOX, CHECKBOX, FRAME, SCROLL] {
            assert!(registry.contains(tag), "missing {tag}");
        }
        assert!(registry.supports_text());
        assert_eq!(
            registry.get(FRAME).map(WidgetKind::child_policy),
            Some(ChildPolicy::Single)
        );
    }
}
