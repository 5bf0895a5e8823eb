//! WebSocket protocol message definitions
//! These are the wire types for the remote gesture session

use serde::{Deserialize, Serialize};

use crate::command::Command;
use crate::game::GameState;

/// Messages sent from client to the session service
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMsg {
    /// Begin the round
    Start,

    /// One camera frame as a `data:image/...;base64,` payload
    Frame { frame: String },

    /// Stop sending frames; the service confirms with CameraStopped
    StopCamera,

    /// Reset to a fresh round after game over
    Restart,
}

/// Messages sent from the session service to the client
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMsg {
    /// Round began; the first authoritative state
    GameStarted { state: GameState },

    /// Authoritative state push from the simulation loop.
    /// `gesture` is the most recent zone the authority acted on; hand
    /// presence is NOT carried here, only on VideoFrame.
    GameState {
        state: GameState,
        #[serde(default)]
        gesture: Command,
    },

    /// Echo of a processed camera frame. This is the sole source of
    /// hand presence for the client.
    VideoFrame {
        frame: String,
        hand_detected: bool,
        description: String,
        #[serde(default)]
        gesture: Command,
    },

    /// Confirmation that the service stopped consuming frames
    CameraStopped,

    /// Fresh round after a restart request
    GameRestarted { state: GameState },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_messages_use_snake_case_tags() {
        let json = serde_json::to_value(&ClientMsg::Start).unwrap();
        assert_eq!(json["type"], "start");

        let json = serde_json::to_value(&ClientMsg::StopCamera).unwrap();
        assert_eq!(json["type"], "stop_camera");

        let msg: ClientMsg = serde_json::from_str(
            r#"{"type": "frame", "frame": "data:image/jpeg;base64,AAAA"}"#,
        )
        .unwrap();
        assert!(matches!(msg, ClientMsg::Frame { frame } if frame.starts_with("data:")));
    }

    #[test]
    fn state_push_parses_without_gesture() {
        // Older service builds omit the gesture field
        let json = r#"{
            "type": "game_state",
            "state": {
                "airplane": {"x": 100.0, "y": 250.0, "width": 80.0, "height": 35.0},
                "obstacles": [],
                "score": 0,
                "gameOver": false,
                "gameStarted": true,
                "gameSpeed": 1.0
            }
        }"#;
        let msg: ServerMsg = serde_json::from_str(json).unwrap();
        match msg {
            ServerMsg::GameState { state, gesture } => {
                assert!(state.game_started);
                assert_eq!(gesture, Command::None);
            }
            other => panic!("unexpected message: {other:?}"),
        }
    }

    #[test]
    fn video_frame_round_trips() {
        let msg = ServerMsg::VideoFrame {
            frame: "data:image/jpeg;base64,AAAA".to_string(),
            hand_detected: true,
            description: "UP - hand at (0.42, 0.18)".to_string(),
            gesture: Command::Up,
        };
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["type"], "video_frame");
        assert_eq!(json["hand_detected"], true);
        assert_eq!(json["gesture"], "up");
    }
}
