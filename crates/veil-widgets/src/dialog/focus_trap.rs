#![forbid(unsafe_code)]

//! Tab-key focus trap over an ordered set of focusable elements.
//!
//! Only the two boundary cases are handled here: Tab on the last element
//! wraps to the first, Shift+Tab on the first wraps to the last. Every other
//! Tab is left to the document's default traversal, which already moves
//! between adjacent focusables in document order. Together these form a
//! closed cycle over the set.
//!
//! When focus sits on anything outside the set (nothing focused, a background
//! element, or an opted-out element inside the panel), [`enter_trap`] pulls
//! it back to the nearest end. The default traversal only ever starts from a
//! member of the set.

use veil_core::dom::ElementId;

/// Outcome of one Tab press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrapDecision {
    /// Let the default traversal run.
    Allow,
    /// Prevent the default and focus this element instead.
    Redirect(ElementId),
}

/// Decide how a Tab press should be handled.
///
/// `reverse` is true for Shift+Tab (or BackTab).
#[must_use]
pub fn trap_tab(focusables: &[ElementId], active: Option<ElementId>, reverse: bool) -> TrapDecision {
    let (Some(&first), Some(&last)) = (focusables.first(), focusables.last()) else {
        return TrapDecision::Allow;
    };
    match active {
        Some(current) if reverse && current == first => TrapDecision::Redirect(last),
        Some(current) if !reverse && current == last => TrapDecision::Redirect(first),
        Some(current) if focusables.contains(&current) => TrapDecision::Allow,
        _ => enter_trap(focusables, reverse),
    }
}

/// Redirect a Tab press that started outside the trapped region.
///
/// Forward lands on the first element, reverse on the last.
#[must_use]
pub fn enter_trap(focusables: &[ElementId], reverse: bool) -> TrapDecision {
    let target = if reverse {
        focusables.last()
    } else {
        focusables.first()
    };
    target.map_or(TrapDecision::Allow, |&id| TrapDecision::Redirect(id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use veil_core::dom::{Document, Node};

    fn ids(n: usize) -> (Document, Vec<ElementId>) {
        let doc = Document::new();
        let root = doc.root();
        let ids = (0..n)
            .filter_map(|i| doc.append(root, &Node::button(format!("b{i}"))))
            .collect();
        (doc, ids)
    }

    #[test]
    fn empty_set_allows() {
        assert_eq!(trap_tab(&[], None, false), TrapDecision::Allow);
        assert_eq!(trap_tab(&[], None, true), TrapDecision::Allow);
    }

    #[test]
    fn forward_from_last_wraps_to_first() {
        let (_doc, ids) = ids(3);
        assert_eq!(
            trap_tab(&ids, Some(ids[2]), false),
            TrapDecision::Redirect(ids[0])
        );
        assert_eq!(trap_tab(&ids, Some(ids[0]), false), TrapDecision::Allow);
    }

    #[test]
    fn reverse_from_first_wraps_to_last() {
        let (_doc, ids) = ids(3);
        assert_eq!(
            trap_tab(&ids, Some(ids[0]), true),
            TrapDecision::Redirect(ids[2])
        );
        assert_eq!(trap_tab(&ids, Some(ids[2]), true), TrapDecision::Allow);
    }

    #[test]
    fn single_element_redirects_to_itself() {
        let (_doc, ids) = ids(1);
        assert_eq!(
            trap_tab(&ids, Some(ids[0]), false),
            TrapDecision::Redirect(ids[0])
        );
        assert_eq!(
            trap_tab(&ids, Some(ids[0]), true),
            TrapDecision::Redirect(ids[0])
        );
    }

    #[test]
    fn focus_outside_the_set_reenters_at_nearest_end() {
        let (doc, ids) = ids(3);
        let outside = doc.append(doc.root(), &Node::button("outside"));
        assert_eq!(
            trap_tab(&ids[..2], outside, false),
            TrapDecision::Redirect(ids[0])
        );
        assert_eq!(trap_tab(&ids, None, true), TrapDecision::Redirect(ids[2]));
    }

    #[test]
    fn enter_trap_picks_nearest_end() {
        let (_doc, ids) = ids(3);
        assert_eq!(enter_trap(&ids, false), TrapDecision::Redirect(ids[0]));
        assert_eq!(enter_trap(&ids, true), TrapDecision::Redirect(ids[2]));
        assert_eq!(enter_trap(&[], false), TrapDecision::Allow);
    }
}
