//! Change notifications emitted by [`EditActionHistory`](super::EditActionHistory).

use std::fmt;

/// A payload-free notification about a history transition.
///
/// Listeners re-query whatever state they care about. Every state-changing
/// call emits `BeforeChange` strictly before touching the target and
/// `AfterChange` strictly after; undo and redo calls emit their own marker
/// in between.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HistoryEvent {
    /// The target and the stacks are about to change.
    BeforeChange,
    /// The change announced by the last `BeforeChange` is complete.
    AfterChange,
    /// The last change was an undo.
    Undo,
    /// The last change was a redo.
    Redo,
}

/// Handle returned by [`subscribe`](super::EditActionHistory::subscribe).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener = Box<dyn FnMut(HistoryEvent) + Send>;

/// Registered history listeners, called in subscription order.
#[derive(Default)]
pub(crate) struct Listeners {
    next_id: u64,
    entries: Vec<(SubscriptionId, Listener)>,
}

impl Listeners {
    pub fn subscribe(
        &mut self,
        listener: impl FnMut(HistoryEvent) + Send + 'static,
    ) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.entries.push((id, Box::new(listener)));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(entry_id, _)| *entry_id != id);
        self.entries.len() != before
    }

    pub fn emit(&mut self, event: HistoryEvent) {
        for (_, listener) in &mut self.entries {
            listener(event);
        }
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

impl fmt::Debug for Listeners {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Listeners")
            .field("count", &self.entries.len())
            .finish()
    }
}
