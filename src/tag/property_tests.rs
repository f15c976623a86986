//! Property-based tests for tag membership and focus

use super::*;
use crate::client::testing::{mapped_view, unmapped_view, TestView};
use crate::client::Client;
use proptest::prelude::*;
use std::cell::RefCell;
use std::rc::Rc;

/// Clients 0..4 are mapped, 4 and 5 are unmapped
const CLIENTS: usize = 6;
const MAPPED: usize = 4;

#[derive(Debug, Clone, Copy)]
enum Op {
    Add(usize),
    Remove(usize),
    Focus(usize),
    RemoveFocused,
    FocusNext,
    FocusPrev,
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0..CLIENTS).prop_map(Op::Add),
        (0..CLIENTS).prop_map(Op::Remove),
        (0..CLIENTS).prop_map(Op::Focus),
        Just(Op::RemoveFocused),
        Just(Op::FocusNext),
        Just(Op::FocusPrev),
    ]
}

fn registry() -> (ClientRegistry, Vec<ClientId>, Vec<Rc<RefCell<TestView>>>) {
    let mut clients = ClientRegistry::new();
    let mut ids = Vec::new();
    let mut views = Vec::new();
    for i in 0..CLIENTS {
        let (view, handle) = if i < MAPPED {
            mapped_view()
        } else {
            unmapped_view()
        };
        ids.push(clients.insert(Client::new(&handle)));
        views.push(view);
    }
    (clients, ids, views)
}

proptest! {
    #[test]
    fn prop_focus_is_none_or_member(ops in prop::collection::vec(op(), 0..64)) {
        let ctx = Context::default();
        let mut tag = Tag::new("1", &ctx);
        let (mut clients, ids, _views) = registry();

        for op in ops {
            match op {
                Op::Add(i) => tag.add_client(ids[i], &mut clients),
                Op::Remove(i) => {
                    tag.remove_client(ids[i]);
                }
                Op::Focus(i) => {
                    let accepted = tag.focus_client(ids[i], &mut clients);
                    prop_assert_eq!(accepted, tag.contains(ids[i]) && i < MAPPED);
                }
                Op::RemoveFocused => {
                    if let Some(focused) = tag.focused_client() {
                        prop_assert!(tag.remove_client(focused));
                    }
                }
                Op::FocusNext => {
                    tag.focus_next(&mut clients);
                }
                Op::FocusPrev => {
                    tag.focus_prev(&mut clients);
                }
            }

            if let Some(focused) = tag.focused_client() {
                prop_assert!(tag.contains(focused), "focused {} is not a member", focused);
            }
        }
    }

    #[test]
    fn prop_membership_has_no_duplicates(ops in prop::collection::vec(op(), 0..64)) {
        let ctx = Context::default();
        let mut tag = Tag::new("1", &ctx);
        let (mut clients, ids, _views) = registry();

        for op in ops {
            match op {
                Op::Add(i) => tag.add_client(ids[i], &mut clients),
                Op::Remove(i) => {
                    tag.remove_client(ids[i]);
                }
                _ => {}
            }
            let mut members = tag.clients().to_vec();
            members.sort();
            members.dedup();
            prop_assert_eq!(members.len(), tag.len());
        }
    }
}
