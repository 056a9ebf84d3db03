use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::config::{RulesConfig, TableConfig};
use crate::phase::{GroupLoadState, Phase};

/// Protocol version - increment when making breaking changes.
pub const PROTOCOL_VERSION: u32 = 1;

// === Server -> Client ===

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../../web/generated/")]
#[serde(tag = "type")]
pub enum ServerMsg {
    #[serde(rename = "welcome")]
    Welcome(WelcomeMsg),
    #[serde(rename = "snapshot")]
    Snapshot(SnapshotMsg),
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../../web/generated/")]
#[serde(rename_all = "camelCase")]
pub struct WelcomeMsg {
    pub protocol_version: u32,
    pub server_version: String,
    pub connection_id: u32,
    pub table: TableConfig,
    pub rules: RulesConfig,
    pub snapshot: SnapshotMsg,
}

/// Everything the page needs to render one frame of UI.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../../web/generated/")]
#[serde(rename_all = "camelCase")]
pub struct SnapshotMsg {
    pub phase: Phase,
    pub shot_unlocked: bool,
    pub game_started: bool,
    pub setup_visible: bool,
    pub onboarding_visible: bool,
    pub current_player_id: Option<String>,
    pub players: Vec<PlayerWire>,
    pub balls: Vec<BallWire>,
    pub question: Option<QuestionWire>,
    pub answer_text: String,
    pub answer_meta: String,
    pub status_detail: String,
    /// Helper text drawn next to the cue ball on a human turn
    pub cue_hint: Option<String>,
    pub aim: Option<AimWire>,
    pub group_load_state: GroupLoadState,
    pub score_correct: u32,
    pub score_total: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../../web/generated/")]
#[serde(rename_all = "camelCase")]
pub struct PlayerWire {
    pub id: String,
    pub label: String,
    pub is_npc: bool,
    pub correct: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../../web/generated/")]
#[serde(rename_all = "camelCase")]
pub struct BallWire {
    pub id: u32,
    pub pos: [f64; 2],
    pub is_cue: bool,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../../web/generated/")]
#[serde(rename_all = "camelCase")]
pub struct QuestionWire {
    pub image: String,
    pub alt: String,
    pub choices: Vec<String>,
    pub choices_enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../../web/generated/")]
pub struct AimWire {
    pub from: [f64; 2],
    pub to: [f64; 2],
}

// === Client -> Server ===

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../../web/generated/")]
#[serde(tag = "type")]
pub enum ClientMsg {
    /// Setup modal submitted. Counts are the raw input values, if parseable.
    #[serde(rename = "start_game")]
    StartGame {
        #[serde(rename = "humanCount", default)]
        human_count: Option<i64>,
        #[serde(rename = "npcCount", default)]
        npc_count: Option<i64>,
    },
    #[serde(rename = "answer")]
    Answer { choice: String },
    /// Pointer coordinates are in canvas units.
    #[serde(rename = "pointer_down")]
    PointerDown {
        #[serde(rename = "pointerId")]
        pointer_id: i64,
        x: f64,
        y: f64,
    },
    #[serde(rename = "pointer_move")]
    PointerMove {
        #[serde(rename = "pointerId")]
        pointer_id: i64,
        x: f64,
        y: f64,
    },
    #[serde(rename = "pointer_up")]
    PointerUp {
        #[serde(rename = "pointerId")]
        pointer_id: i64,
    },
    #[serde(rename = "pointer_cancel")]
    PointerCancel {
        #[serde(rename = "pointerId")]
        pointer_id: i64,
    },
    #[serde(rename = "lost_pointer_capture")]
    LostPointerCapture {
        #[serde(rename = "pointerId")]
        pointer_id: i64,
    },
    #[serde(rename = "rack")]
    Rack,
    #[serde(rename = "next_group")]
    NextGroup,
    #[serde(rename = "dismiss_onboarding")]
    DismissOnboarding,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_msg_welcome_roundtrip() {
        let msg = ServerMsg::Welcome(WelcomeMsg {
            protocol_version: PROTOCOL_VERSION,
            server_version: "0.1.0".to_string(),
            connection_id: 7,
            table: TableConfig::default(),
            rules: RulesConfig::default(),
            snapshot: SnapshotMsg {
                setup_visible: true,
                ..Default::default()
            },
        });
        let json = serde_json::to_string(&msg).unwrap();
        assert!(json.contains("\"type\":\"welcome\""));
        assert!(json.contains("\"protocolVersion\":1"));
        assert!(json.contains("\"restFramesRequired\":85"));
        let parsed: ServerMsg = serde_json::from_str(&json).unwrap();
        match parsed {
            ServerMsg::Welcome(w) => {
                assert_eq!(w.protocol_version, PROTOCOL_VERSION);
                assert_eq!(w.connection_id, 7);
                assert!(w.snapshot.setup_visible);
                assert_eq!(w.snapshot.phase, Phase::QuestionActive);
            }
            _ => panic!("Expected Welcome"),
        }
    }

    #[test]
    fn snapshot_uses_camel_case_and_phase_names() {
        let msg = ServerMsg::Snapshot(SnapshotMsg {
            phase: Phase::ShotReady,
            shot_unlocked: true,
            game_started: true,
            current_player_id: Some("P1".to_string()),
            players: vec![PlayerWire {
                id: "P1".to_string(),
                label: "Player 1".to_string(),
                is_npc: false,
                correct: 1,
            }],
            balls: vec![BallWire {
                id: 0,
                pos: [245.5, 270.0],
                is_cue: true,
                color: "#ffffff".to_string(),
            }],
            ..Default::default()
        });
        let json = serde_json::to_string(&msg).unwrap();
        assert!(json.contains("\"type\":\"snapshot\""));
        assert!(json.contains("\"phase\":\"SHOT_READY\""));
        assert!(json.contains("\"shotUnlocked\":true"));
        assert!(json.contains("\"isCue\":true"));
        assert!(json.contains("\"groupLoadState\":\"pending\""));
    }

    #[test]
    fn client_msg_start_game_accepts_missing_counts() {
        let parsed: ClientMsg = serde_json::from_str(r#"{"type":"start_game"}"#).unwrap();
        assert_eq!(
            parsed,
            ClientMsg::StartGame {
                human_count: None,
                npc_count: None
            }
        );

        let parsed: ClientMsg =
            serde_json::from_str(r#"{"type":"start_game","humanCount":2,"npcCount":1}"#).unwrap();
        assert_eq!(
            parsed,
            ClientMsg::StartGame {
                human_count: Some(2),
                npc_count: Some(1)
            }
        );
    }

    #[test]
    fn client_msg_pointer_events_use_pointer_id() {
        let msg = ClientMsg::PointerDown {
            pointer_id: 3,
            x: 10.5,
            y: 20.0,
        };
        let json = serde_json::to_string(&msg).unwrap();
        assert!(json.contains("\"type\":\"pointer_down\""));
        assert!(json.contains("\"pointerId\":3"));

        let parsed: ClientMsg =
            serde_json::from_str(r#"{"type":"lost_pointer_capture","pointerId":3}"#).unwrap();
        assert_eq!(parsed, ClientMsg::LostPointerCapture { pointer_id: 3 });
    }

    #[test]
    fn client_msg_unit_variants() {
        for (raw, expected) in [
            (r#"{"type":"rack"}"#, ClientMsg::Rack),
            (r#"{"type":"next_group"}"#, ClientMsg::NextGroup),
            (r#"{"type":"dismiss_onboarding"}"#, ClientMsg::DismissOnboarding),
        ] {
            let parsed: ClientMsg = serde_json::from_str(raw).unwrap();
            assert_eq!(parsed, expected);
        }
    }

    #[test]
    fn unknown_client_msg_rejected() {
        assert!(serde_json::from_str::<ClientMsg>(r#"{"type":"ball_escaped"}"#).is_err());
    }
}
