use shared::domain::AppMode;

/// Work a mode change asks the caller to perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeEffect {
    /// Compare mode was requested with no secondary city; pick the opposite
    /// of the current primary.
    ResolveCounterpart,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModeTransition {
    pub from: AppMode,
    pub to: AppMode,
    pub effect: Option<ModeEffect>,
}

impl ModeTransition {
    pub fn changed(&self) -> bool {
        self.from != self.to
    }
}

/// Current-mode register. Every mode is reachable from every mode.
#[derive(Debug, Clone, Default)]
pub struct ModeMachine {
    current: AppMode,
}

impl ModeMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> AppMode {
        self.current
    }

    pub fn transition(&mut self, to: AppMode, has_secondary: bool) -> ModeTransition {
        let from = self.current;
        self.current = to;
        let effect = (to == AppMode::CompareCities && !has_secondary)
            .then_some(ModeEffect::ResolveCounterpart);
        ModeTransition { from, to, effect }
    }
}
