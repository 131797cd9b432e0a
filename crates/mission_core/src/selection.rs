use shared::domain::{AppMode, CityId};
use tracing::debug;

/// Primary is always set; the secondary, when present, differs from it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionState {
    primary: CityId,
    secondary: Option<CityId>,
}

impl SelectionState {
    pub fn new(primary: CityId) -> Self {
        Self {
            primary,
            secondary: None,
        }
    }

    pub fn primary(&self) -> &CityId {
        &self.primary
    }

    pub fn secondary(&self) -> Option<&CityId> {
        self.secondary.as_ref()
    }

    /// Promoting the current secondary to primary clears the secondary.
    pub fn set_primary(&mut self, id: CityId) -> bool {
        if self.primary == id {
            return false;
        }
        if self.secondary.as_ref() == Some(&id) {
            self.secondary = None;
        }
        self.primary = id;
        true
    }

    /// A secondary equal to the primary is refused.
    pub fn set_secondary(&mut self, id: Option<CityId>) -> bool {
        if id.as_ref() == Some(&self.primary) {
            debug!(city = %self.primary, "ignoring secondary equal to primary");
            return false;
        }
        if self.secondary == id {
            return false;
        }
        self.secondary = id;
        true
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActivationOutcome {
    pub selection_changed: bool,
    pub next_mode: Option<AppMode>,
}

/// Applies a city click. Outside compare mode the click picks the primary and
/// opens the deep dive; in compare mode a click on another city picks the
/// secondary, a click on the primary keeps it.
pub fn handle_city_activation(
    mode: AppMode,
    selection: &mut SelectionState,
    clicked: CityId,
) -> ActivationOutcome {
    if mode != AppMode::CompareCities {
        return ActivationOutcome {
            selection_changed: selection.set_primary(clicked),
            next_mode: Some(AppMode::CityDeepDive),
        };
    }

    let selection_changed = if selection.primary() != &clicked {
        selection.set_secondary(Some(clicked))
    } else {
        selection.set_primary(clicked)
    };
    ActivationOutcome {
        selection_changed,
        next_mode: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(value: &str) -> CityId {
        CityId::from(value)
    }

    #[test]
    fn click_outside_compare_sets_primary_and_opens_deep_dive() {
        let mut selection = SelectionState::new(id("delhi"));
        let outcome = handle_city_activation(AppMode::GlobalOverview, &mut selection, id("tokyo"));
        assert!(outcome.selection_changed);
        assert_eq!(outcome.next_mode, Some(AppMode::CityDeepDive));
        assert_eq!(selection.primary(), &id("tokyo"));
        assert_eq!(selection.secondary(), None);
    }

    #[test]
    fn compare_clicks_pick_secondary_then_keep_primary() {
        let mut selection = SelectionState::new(id("a"));

        let outcome = handle_city_activation(AppMode::CompareCities, &mut selection, id("b"));
        assert!(outcome.selection_changed);
        assert_eq!(outcome.next_mode, None);
        assert_eq!(selection.secondary(), Some(&id("b")));

        let outcome = handle_city_activation(AppMode::CompareCities, &mut selection, id("a"));
        assert!(!outcome.selection_changed);
        assert_eq!(selection.primary(), &id("a"));
        assert_eq!(selection.secondary(), Some(&id("b")));
    }

    #[test]
    fn unknown_ids_are_accepted_structurally() {
        let mut selection = SelectionState::new(id("delhi"));
        handle_city_activation(AppMode::CityDeepDive, &mut selection, id("atlantis"));
        assert_eq!(selection.primary(), &id("atlantis"));
    }

    #[test]
    fn secondary_never_equals_primary() {
        let mut selection = SelectionState::new(id("a"));
        assert!(!selection.set_secondary(Some(id("a"))));
        assert_eq!(selection.secondary(), None);

        assert!(selection.set_secondary(Some(id("b"))));
        // deep-dive click on the current secondary promotes it
        handle_city_activation(AppMode::CityDeepDive, &mut selection, id("b"));
        assert_eq!(selection.primary(), &id("b"));
        assert_eq!(selection.secondary(), None);
    }
}
