use serde::Serialize;

use crate::types::RecordId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Action {
    Edit,
    Delete,
}

/// Record held while its edit or delete dialog is open
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Target {
    pub id: RecordId,
    pub action: Action,
}

/// Dialog state of a table.
///
/// `Idle -> Staged(target)` when a dialog opens, `Staged -> Confirming` once
/// the operator commits, and back to `Idle` when the request settles or the
/// dialog is cancelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum Staging {
    #[default]
    Idle,
    Staged(Target),
    Confirming(Target),
}

impl Staging {
    pub fn target(&self) -> Option<Target> {
        match self {
            Staging::Idle => None,
            Staging::Staged(t) | Staging::Confirming(t) => Some(*t),
        }
    }

    /// Target staged for `action` and not yet committed
    pub fn staged(&self, action: Action) -> Option<Target> {
        match self {
            Staging::Staged(t) if t.action == action => Some(*t),
            _ => None,
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, Staging::Idle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn staged_filters_by_action() {
        let target = Target { id: 3, action: Action::Delete };
        let staging = Staging::Staged(target);
        assert_eq!(staging.staged(Action::Delete), Some(target));
        assert_eq!(staging.staged(Action::Edit), None);
        assert_eq!(Staging::Confirming(target).staged(Action::Delete), None);
        assert_eq!(Staging::Confirming(target).target(), Some(target));
        assert!(Staging::default().is_idle());
    }
}
