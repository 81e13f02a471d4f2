//! Generic first-match search over a parsed document tree.
//!
//! Only element nodes are visited: text and comment nodes can never carry a
//! tag name or a class attribute, so no predicate in this crate could match
//! them anyway.

use scraper::ElementRef;

/// Returns the first element, in pre-order, that satisfies `predicate`.
///
/// The root itself is tested before any of its descendants, and the search
/// stops at the first match. Traversal uses an explicit work stack instead of
/// recursion, so deeply nested documents can't overflow the native stack.
///
/// # Examples
///
/// ```
/// use scraper::Html;
/// use trendinghubs_extract::matcher::{find_first, with_tag};
///
/// let document = Html::parse_fragment("<div><p>one</p><p>two</p></div>");
/// let found = find_first(document.root_element(), with_tag("p")).unwrap();
/// assert_eq!(found.text().collect::<String>(), "one");
/// ```
pub fn find_first<'a, P>(root: ElementRef<'a>, predicate: P) -> Option<ElementRef<'a>>
where
    P: Fn(&ElementRef<'a>) -> bool,
{
    let mut stack = vec![root];
    while let Some(element) = stack.pop() {
        if predicate(&element) {
            return Some(element);
        }
        // Push in reverse so the first child is popped next.
        let children: Vec<_> = element.children().filter_map(ElementRef::wrap).collect();
        stack.extend(children.into_iter().rev());
    }
    None
}

/// Returns `true` if the element's `class` attribute contains `name` as a
/// whole whitespace-separated token. Matching is exact (case-sensitive).
pub fn has_class(name: &str, element: &ElementRef<'_>) -> bool {
    element
        .value()
        .attr("class")
        .is_some_and(|classes| classes.split_whitespace().any(|class| class == name))
}

/// Returns `true` if the element's tag name is exactly `name`.
pub fn has_tag(name: &str, element: &ElementRef<'_>) -> bool {
    element.value().name() == name
}

/// Predicate builder for [`has_class`], for use with [`find_first`].
pub fn with_class<'n, 'a>(name: &'n str) -> impl Fn(&ElementRef<'a>) -> bool + 'n {
    move |element| has_class(name, element)
}

/// Predicate builder for [`has_tag`], for use with [`find_first`].
pub fn with_tag<'n, 'a>(name: &'n str) -> impl Fn(&ElementRef<'a>) -> bool + 'n {
    move |element| has_tag(name, element)
}

pub fn find_first_with_class<'a>(root: ElementRef<'a>, name: &str) -> Option<ElementRef<'a>> {
    find_first(root, with_class(name))
}

pub fn find_first_with_tag<'a>(root: ElementRef<'a>, name: &str) -> Option<ElementRef<'a>> {
    find_first(root, with_tag(name))
}
