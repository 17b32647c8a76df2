//! Property tests: Tab and Shift+Tab form a closed cycle over the dialog's focusables.

use std::time::Duration;

use proptest::prelude::*;
use veil_core::dom::{Document, Fragment, Node, Tag};
use veil_core::event::{KeyCode, KeyEvent, Modifiers};
use veil_runtime::Scheduler;
use veil_widgets::dialog::Dialog;
use veil_widgets::{DialogOptions, DialogPhase};

#[derive(Debug, Clone)]
enum Item {
    Text,
    Button,
    Input,
    Link,
    TabStop,
    Skipped,
    OptedOut,
    Group(Vec<Item>),
}

fn item() -> impl Strategy<Value = Item> {
    let leaf = prop_oneof![
        Just(Item::Text),
        Just(Item::Button),
        Just(Item::Input),
        Just(Item::Link),
        Just(Item::TabStop),
        Just(Item::Skipped),
        Just(Item::OptedOut),
    ];
    leaf.prop_recursive(3, 24, 4, |inner| {
        prop::collection::vec(inner, 0..4).prop_map(Item::Group)
    })
}

fn to_node(item: &Item) -> Node {
    match item {
        Item::Text => Node::paragraph("text"),
        Item::Button => Node::button("go"),
        Item::Input => Node::input(),
        Item::Link => Node::link("/next", "next"),
        Item::TabStop => Node::div().tabindex(0),
        Item::Skipped => Node::new(Tag::Span).tabindex(-1),
        Item::OptedOut => Node::button("off").tabindex(-1),
        Item::Group(children) => Node::div().children(children.iter().map(to_node)),
    }
}

fn mount(items: &[Item], show_close: bool) -> (Document, Scheduler, Dialog) {
    let doc = Document::new();
    doc.append(doc.root(), &Node::button("before"));
    let scheduler = Scheduler::new();
    let content: Fragment = items.iter().map(to_node).collect();
    let dialog = Dialog::new(&doc, &scheduler)
        .content(content)
        .options(&DialogOptions::new().show_close_button(show_close));
    dialog.open();
    doc.append(doc.root(), &Node::button("after"));
    scheduler.advance(Duration::from_millis(150));
    (doc, scheduler, dialog)
}

proptest! {
    #[test]
    fn tab_presses_cycle_through_focusables(
        items in prop::collection::vec(item(), 0..8),
        show_close in any::<bool>(),
        presses in prop::collection::vec(any::<bool>(), 1..40),
    ) {
        let (doc, _scheduler, dialog) = mount(&items, show_close);
        prop_assert_eq!(dialog.phase(), DialogPhase::Visible);
        let focusables = dialog.focusables();
        let panel = dialog.elements().unwrap().panel;

        if focusables.is_empty() {
            prop_assert_eq!(doc.active_element(), None);
            return Ok(());
        }

        let n = focusables.len();
        let mut index = 0usize;
        prop_assert_eq!(doc.active_element(), Some(focusables[0]));

        for reverse in presses {
            let key = if reverse {
                KeyEvent::new(KeyCode::Tab).with_modifiers(Modifiers::SHIFT)
            } else {
                KeyEvent::new(KeyCode::Tab)
            };
            doc.dispatch_key(&key);
            index = if reverse { (index + n - 1) % n } else { (index + 1) % n };

            let active = doc.active_element();
            prop_assert_eq!(active, Some(focusables[index]));
            prop_assert!(doc.is_inclusive_descendant(panel, focusables[index]));
        }
    }

    #[test]
    fn n_forward_presses_return_to_first(
        items in prop::collection::vec(item(), 1..8),
    ) {
        let (doc, _scheduler, dialog) = mount(&items, true);
        let focusables = dialog.focusables();
        for _ in 0..focusables.len() {
            doc.dispatch_key(&KeyEvent::new(KeyCode::Tab));
        }
        prop_assert_eq!(doc.active_element(), focusables.first().copied());
    }
}
