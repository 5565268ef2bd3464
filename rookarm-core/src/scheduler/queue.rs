//! Bounded FIFO of pending actions

use heapless::Deque;

use crate::error::RobotError;
use crate::planner::PlannerAction;

/// Actions that may wait behind the one executing
pub const QUEUE_CAPACITY: usize = 4;

/// Action queue with reject-on-full semantics
#[derive(Debug, Default)]
pub struct ActionQueue {
    actions: Deque<PlannerAction, QUEUE_CAPACITY>,
}

impl ActionQueue {
    pub const fn new() -> Self {
        Self {
            actions: Deque::new(),
        }
    }

    /// Append an action
    ///
    /// A full queue returns `QueueFull` and is left unchanged.
    pub fn push(&mut self, action: PlannerAction) -> Result<(), RobotError> {
        self.actions
            .push_back(action)
            .map_err(|_| RobotError::QueueFull)
    }

    pub fn pop(&mut self) -> Option<PlannerAction> {
        self.actions.pop_front()
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.actions.is_full()
    }

    /// Drop every pending action
    pub fn clear(&mut self) {
        self.actions.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = &PlannerAction> {
        self.actions.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planner::ChessSquare;

    fn remove(text: &str) -> PlannerAction {
        PlannerAction::Remove {
            from: ChessSquare::parse(text).unwrap(),
        }
    }

    #[test]
    fn test_fifo_order() {
        let mut queue = ActionQueue::new();
        queue.push(remove("a1")).unwrap();
        queue.push(remove("b2")).unwrap();

        assert_eq!(queue.pop(), Some(remove("a1")));
        assert_eq!(queue.pop(), Some(remove("b2")));
        assert_eq!(queue.pop(), None);
    }

    #[test]
    fn test_fifth_action_rejected() {
        let mut queue = ActionQueue::new();
        for text in ["a1", "b2", "c3", "d4"] {
            queue.push(remove(text)).unwrap();
        }
        assert!(queue.is_full());

        assert_eq!(queue.push(remove("e5")), Err(RobotError::QueueFull));
        assert_eq!(queue.len(), QUEUE_CAPACITY);
        let pending: heapless::Vec<PlannerAction, QUEUE_CAPACITY> =
            queue.iter().copied().collect();
        assert_eq!(
            pending.as_slice(),
            &[remove("a1"), remove("b2"), remove("c3"), remove("d4")]
        );
    }

    #[test]
    fn test_clear() {
        let mut queue = ActionQueue::new();
        queue.push(remove("h8")).unwrap();
        queue.clear();
        assert!(queue.is_empty());
    }
}
