//! Property-based tests for command buffer cursor bounds.

use core_actions::CommandBuffer;
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Op {
    Insert(char),
    Backspace,
    Delete,
    Left,
    Right,
    Home,
    End,
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        any::<char>().prop_map(Op::Insert),
        Just(Op::Backspace),
        Just(Op::Delete),
        Just(Op::Left),
        Just(Op::Right),
        Just(Op::Home),
        Just(Op::End),
    ]
}

proptest! {
    #[test]
    fn cursor_stays_in_bounds(ops in prop::collection::vec(op(), 0..200)) {
        let mut b = CommandBuffer::new();
        for op in ops {
            match op {
                Op::Insert(c) => b.insert(c),
                Op::Backspace => { b.backspace(); }
                Op::Delete => { b.delete(); }
                Op::Left => { b.left(); }
                Op::Right => { b.right(); }
                Op::Home => b.home(),
                Op::End => b.end(),
            }
            prop_assert!(b.cursor() <= b.len());
        }
    }

    #[test]
    fn insert_places_char_at_cursor(text in "[a-z]{0,20}", back in 0usize..25, c in any::<char>()) {
        let mut b = CommandBuffer::new();
        b.set(&text);
        for _ in 0..back {
            b.left();
        }
        let k = b.cursor();
        let n = b.len();
        b.insert(c);
        prop_assert_eq!(b.len(), n + 1);
        prop_assert_eq!(b.text().chars().nth(k), Some(c));
        prop_assert_eq!(b.cursor(), k + 1);
    }
}
