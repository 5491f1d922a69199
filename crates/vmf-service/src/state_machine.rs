//! Power-state transition table
//!
//! | action  | provisioning | running | stopped |
//! |---------|--------------|---------|---------|
//! | start   | running      | running | running |
//! | stop    | stopped      | stopped | stopped |
//! | restart | running      | running | running |
//!
//! The table is total: every action is accepted in every state, and an
//! action that leaves the status unchanged is a successful no-op.

use vmf_core::{Status, VmAction};

/// Outcome of applying an action to a status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    /// Action applied
    pub action: VmAction,
    /// Status before
    pub from: Status,
    /// Status after
    pub to: Status,
}

impl Transition {
    /// Check if the action changes nothing
    ///
    /// A restart of a running VM still power-cycles it, so it is never a no-op.
    #[inline]
    #[must_use]
    pub fn is_noop(&self) -> bool {
        self.from == self.to && self.action != VmAction::Restart
    }
}

/// Apply `action` to `from`
#[must_use]
pub fn apply(action: VmAction, from: Status) -> Transition {
    let to = match action {
        VmAction::Start | VmAction::Restart => Status::Running,
        VmAction::Stop => Status::Stopped,
    };
    Transition { action, from, to }
}

/// Statuses reachable from `from` with a single action
#[must_use]
pub fn reachable(from: Status) -> Vec<Status> {
    let mut out: Vec<Status> = Vec::with_capacity(2);
    for action in VmAction::ALL {
        let to = apply(action, from).to;
        if !out.contains(&to) {
            out.push(to);
        }
    }
    out
}
