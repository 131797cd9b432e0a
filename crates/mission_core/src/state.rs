use std::sync::Arc;

use registry::CityRegistry;
use shared::{
    domain::{AppMode, CityId, Intervention},
    protocol::RequestContext,
};
use tracing::{debug, info};

use crate::{
    antipode::resolve_antipode,
    interventions::{InterventionSet, ToggleOutcome},
    mode::{ModeEffect, ModeMachine},
    selection::{handle_city_activation, SelectionState},
};

/// Everything the user can change. Each mutator reports whether the
/// analysis-relevant state actually changed.
#[derive(Debug, Clone)]
pub struct MissionState {
    registry: Arc<CityRegistry>,
    mode: ModeMachine,
    selection: SelectionState,
    interventions: InterventionSet,
    custom_query: Option<String>,
}

impl MissionState {
    pub fn new(registry: Arc<CityRegistry>, default_primary: CityId) -> Self {
        Self {
            registry,
            mode: ModeMachine::new(),
            selection: SelectionState::new(default_primary),
            interventions: InterventionSet::new(),
            custom_query: None,
        }
    }

    pub fn registry(&self) -> &Arc<CityRegistry> {
        &self.registry
    }

    pub fn mode(&self) -> AppMode {
        self.mode.current()
    }

    pub fn selection(&self) -> &SelectionState {
        &self.selection
    }

    pub fn interventions(&self) -> &InterventionSet {
        &self.interventions
    }

    pub fn custom_query(&self) -> Option<&str> {
        self.custom_query.as_deref()
    }

    pub fn set_mode(&mut self, mode: AppMode) -> bool {
        let transition = self
            .mode
            .transition(mode, self.selection.secondary().is_some());
        let mut changed = transition.changed();
        if transition.effect == Some(ModeEffect::ResolveCounterpart) {
            changed |= self.adopt_counterpart();
        }
        if changed {
            info!(from = %transition.from, to = %transition.to, "mode changed");
        }
        changed
    }

    /// Globe click.
    pub fn activate_city(&mut self, clicked: CityId) -> bool {
        let outcome = handle_city_activation(self.mode.current(), &mut self.selection, clicked);
        let mode_changed = match outcome.next_mode {
            Some(next) => self.set_mode(next),
            None => false,
        };
        outcome.selection_changed || mode_changed
    }

    /// List selection: replaces the primary without touching the mode.
    pub fn activate_primary(&mut self, id: CityId) -> bool {
        self.selection.set_primary(id)
    }

    pub fn set_secondary(&mut self, id: Option<CityId>) -> bool {
        self.selection.set_secondary(id)
    }

    /// Picks the opposite of the primary as secondary and switches to compare.
    pub fn find_opposite(&mut self) -> bool {
        let adopted = self.adopt_counterpart();
        let transition = self.mode.transition(AppMode::CompareCities, true);
        adopted || transition.changed()
    }

    pub fn toggle_intervention(&mut self, intervention: Intervention) -> bool {
        let kind = intervention.kind.clone();
        let added = self.interventions.toggle(intervention) == ToggleOutcome::Added;
        debug!(%kind, added, "intervention toggled");
        true
    }

    /// Blank text clears the query.
    pub fn set_custom_query(&mut self, text: impl Into<String>) -> bool {
        let text = text.into();
        let next = (!text.trim().is_empty()).then(|| text.trim().to_string());
        if next == self.custom_query {
            return false;
        }
        self.custom_query = next;
        true
    }

    pub fn request_context(&self) -> RequestContext {
        let mode = self.mode.current();
        RequestContext {
            mode,
            primary_city_id: self.selection.primary().clone(),
            secondary_city_id: self.selection.secondary().cloned(),
            interventions: (mode == AppMode::ScenarioNarrative)
                .then(|| self.interventions.to_vec()),
            custom_query: self.custom_query.clone(),
        }
    }

    fn adopt_counterpart(&mut self) -> bool {
        let primary = self.selection.primary().clone();
        let Some(source) = self.registry.get(&primary) else {
            debug!(city = %primary, "primary not in registry; no counterpart");
            return false;
        };
        let opposite = resolve_antipode(source, self.registry.list_cities());
        if opposite == primary {
            debug!(city = %primary, "registry has no other city to compare against");
            return false;
        }
        info!(primary = %primary, opposite = %opposite, "adopting opposite city");
        self.selection.set_secondary(Some(opposite))
    }
}
