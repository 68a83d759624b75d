//! Application state for the time & attendance API.

use std::sync::Arc;

use crate::engine::Engine;
use crate::repository::InMemoryRepository;

/// Shared application state.
///
/// Holds the engine every handler runs its operation on.
#[derive(Clone)]
pub struct AppState {
    engine: Arc<Engine<InMemoryRepository>>,
}

impl AppState {
    /// Creates a new application state around an engine.
    pub fn new(engine: Engine<InMemoryRepository>) -> Self {
        Self {
            engine: Arc::new(engine),
        }
    }

    /// Returns a shared handle to the engine.
    pub fn engine(&self) -> Arc<Engine<InMemoryRepository>> {
        Arc::clone(&self.engine)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::EngineSettings;

    #[test]
    fn test_app_state_is_clone() {
        // Verify AppState can be cloned (required for axum state)
        fn assert_clone<T: Clone>() {}
        assert_clone::<AppState>();
    }

    #[test]
    fn test_clones_share_engine() {
        let settings = EngineSettings::new("kt", 9).unwrap();
        let state = AppState::new(Engine::new(InMemoryRepository::new(), settings));
        let other = state.clone();
        assert!(Arc::ptr_eq(&state.engine(), &other.engine()));
    }
}
