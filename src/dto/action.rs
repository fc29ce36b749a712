use crate::debate::Role;
use crate::types::RoomId;
use crate::types::Seat;

/// Player actions accepted over a live session. Anything that fails to
/// parse into one of these is rejected to the sender as invalid-action.
/// Joining is carried by the HTTP join route plus the session handshake,
/// not as a socket action.
#[derive(Debug, Clone, serde::Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ClientAction {
    AcknowledgeCase,
    SubmitArgument { text: String },
    ChooseSide { side: Role },
}

/// Body of `POST /rooms/{room}/join`. A missing player id mints a fresh
/// identity; supplying one reclaims an existing seat on reconnect.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct JoinRequest {
    pub player_id: Option<uuid::Uuid>,
    pub display_name: String,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct JoinResponse {
    pub room: RoomId,
    pub player_id: uuid::Uuid,
    pub seat: Seat,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn actions_parse_from_kebab_case_json() {
        let action: ClientAction =
            serde_json::from_str(r#"{"type":"submit-argument","text":"objection"}"#).unwrap();
        assert!(matches!(action, ClientAction::SubmitArgument { ref text } if text == "objection"));
        let action: ClientAction =
            serde_json::from_str(r#"{"type":"choose-side","side":"defender"}"#).unwrap();
        assert!(matches!(action, ClientAction::ChooseSide { side: Role::Defender }));
        assert!(serde_json::from_str::<ClientAction>(r#"{"type":"cast-spell"}"#).is_err());
    }
}
