use shared::domain::{Intervention, InterventionKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    Added,
    Removed,
}

/// Active scenario interventions, keyed by kind. Consumers must not rely on
/// the order of `as_slice`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InterventionSet {
    active: Vec<Intervention>,
}

impl InterventionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Membership is decided by kind alone: toggling an active kind removes it
    /// even when the reduction differs.
    pub fn toggle(&mut self, intervention: Intervention) -> ToggleOutcome {
        if let Some(pos) = self
            .active
            .iter()
            .position(|active| active.kind == intervention.kind)
        {
            self.active.remove(pos);
            ToggleOutcome::Removed
        } else {
            self.active.push(intervention);
            ToggleOutcome::Added
        }
    }

    pub fn contains(&self, kind: &InterventionKind) -> bool {
        self.active.iter().any(|active| &active.kind == kind)
    }

    pub fn as_slice(&self) -> &[Intervention] {
        &self.active
    }

    pub fn to_vec(&self) -> Vec<Intervention> {
        self.active.clone()
    }

    pub fn len(&self) -> usize {
        self.active.len()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }
}
