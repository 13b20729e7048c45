/// Builds an element tree from a nested-list literal.
///
/// ```
/// use rewx_core::tree;
///
/// let element = tree!(["block", {"direction" => "row"},
///     ["text", {"label" => "Name"}],
///     "plain text",
/// ]);
/// assert_eq!(element.children().len(), 2);
/// ```
///
/// Each list is `[type, {props}, children...]`; the props block is optional.
/// Any other single token tree becomes a child through `Element::from`, so
/// string literals turn into text leaves and longer expressions need parens.
#[macro_export]
macro_rules! tree {
    ([ $ty:expr, { $($key:literal => $value:expr),* $(,)? } $(, $child:tt)* $(,)? ]) => {
        $crate::Element::new($ty)
            $(.prop($key, $value))*
            $(.child($crate::tree!($child)))*
    };
    ([ $ty:expr $(, $child:tt)* $(,)? ]) => {
        $crate::Element::new($ty)
            $(.child($crate::tree!($child)))*
    };
    ($leaf:expr) => {
        $crate::Element::from($leaf)
    };
}
