//! Client-side mirror of a remotely simulated round

use super::model::GameState;

/// Holds the last authoritative snapshot received from the remote
/// session service. Replacement is wholesale and last write wins; the
/// only derived signal is the terminal edge, which fires once per
/// round so score submission cannot double up.
#[derive(Debug, Default)]
pub struct RemoteProxy {
    state: GameState,
}

impl RemoteProxy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// Replace the mirrored state. Returns true when this snapshot is
    /// the terminal edge (running to game over).
    pub fn replace(&mut self, incoming: GameState) -> bool {
        let ended = incoming.game_over && !self.state.game_over;
        self.state = incoming;
        ended
    }

    /// Drop back to the pre-round state.
    pub fn clear(&mut self) {
        self.state = GameState::default();
    }
}
