use core_input::InputQueue;
use proptest::prelude::*;
use std::collections::VecDeque;
use std::time::Duration;
use tokio::time::timeout;

#[derive(Debug, Clone)]
enum Op {
    Enqueue,
    TryDequeue,
    /// Dequeue that gives up at once when nothing is buffered.
    PollDequeue,
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => Just(Op::Enqueue),
        1 => Just(Op::TryDequeue),
        1 => Just(Op::PollDequeue),
    ]
}

proptest! {
    #[test]
    fn single_consumer_sees_enqueue_order_exactly_once(ops in proptest::collection::vec(op(), 0..64)) {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .build()
            .unwrap();
        rt.block_on(async {
            let queue = InputQueue::new();
            let mut model = VecDeque::new();
            let mut next = 0u32;
            let mut seen = Vec::new();
            for op in &ops {
                match op {
                    Op::Enqueue => {
                        queue.enqueue(next);
                        model.push_back(next);
                        next += 1;
                    }
                    Op::TryDequeue => {
                        let got = queue.try_dequeue();
                        assert_eq!(got, model.pop_front());
                        seen.extend(got);
                    }
                    Op::PollDequeue => {
                        let got = timeout(Duration::ZERO, queue.dequeue()).await.ok();
                        assert_eq!(got, model.pop_front());
                        seen.extend(got);
                    }
                }
            }
            while let Some(item) = queue.try_dequeue() {
                seen.push(item);
            }
            assert_eq!(seen, (0..next).collect::<Vec<_>>());
        });
    }
}
