//! Push notification tokens
//!
//! A pending submission's listing row carries a signed token the external
//! push channel accepts for delivering the final judge result. The token
//! binds the judging task handle to the display config the issuing caller
//! was entitled to, so a replayed token can never reveal more fields than
//! the original listing did.

use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppResult;
use crate::models::{DisplayConfig, JudgeState};

/// What the push channel should deliver for this subscription
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationType {
    /// Status and (possibly) score for a listing row
    Rough,
    /// Compile diagnostics
    Compile,
    /// Full per-testcase detail
    Detail,
}

/// The signed token payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PushClaims {
    pub task_id: Uuid,
    #[serde(rename = "type")]
    pub kind: NotificationType,
    pub display_config: DisplayConfig,
}

pub struct NotificationService;

impl NotificationService {
    /// Issue a token for a submission, or `None` when the submission is
    /// not actually pending or has no judging task handle. Never issues
    /// for settled rows.
    pub fn issue(
        judge: &JudgeState,
        kind: NotificationType,
        display: &DisplayConfig,
        secret: &str,
    ) -> AppResult<Option<String>> {
        if !judge.pending {
            return Ok(None);
        }
        let Some(task_id) = judge.task_id else {
            return Ok(None);
        };

        let claims = PushClaims {
            task_id,
            kind,
            display_config: display.clone(),
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )?;

        Ok(Some(token))
    }

    /// Verify a token's signature and recover its claims. The push
    /// channel still has to check the task against a pending submission.
    pub fn verify(token: &str, secret: &str) -> AppResult<PushClaims> {
        let mut validation = Validation::default();
        validation.validate_exp = false;
        validation.required_spec_claims.clear();

        let data = decode::<PushClaims>(
            token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &validation,
        )?;

        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SubmissionKind;
    use chrono::Utc;

    const SECRET: &str = "push-channel-secret";

    fn pending_judge() -> JudgeState {
        JudgeState {
            id: 1,
            user_id: 10,
            problem_id: 100,
            status: "Waiting".to_string(),
            score: None,
            kind: SubmissionKind::Normal,
            contest_id: None,
            pending: true,
            task_id: Some(Uuid::new_v4()),
            language: Some("cpp".to_string()),
            code: String::new(),
            is_public: true,
            submit_time: Utc::now(),
        }
    }

    #[test]
    fn test_issue_and_verify_round_trip() {
        let judge = pending_judge();
        let display = DisplayConfig::open();
        let token = NotificationService::issue(&judge, NotificationType::Rough, &display, SECRET)
            .unwrap()
            .unwrap();

        let claims = NotificationService::verify(&token, SECRET).unwrap();
        assert_eq!(claims.task_id, judge.task_id.unwrap());
        assert_eq!(claims.kind, NotificationType::Rough);
        assert_eq!(claims.display_config, display);
    }

    #[test]
    fn test_no_token_for_settled_submission() {
        let mut judge = pending_judge();
        judge.pending = false;
        judge.status = "Accepted".to_string();

        let token = NotificationService::issue(
            &judge,
            NotificationType::Rough,
            &DisplayConfig::open(),
            SECRET,
        )
        .unwrap();
        assert!(token.is_none());
    }

    #[test]
    fn test_no_token_without_task_handle() {
        let mut judge = pending_judge();
        judge.task_id = None;

        let token = NotificationService::issue(
            &judge,
            NotificationType::Rough,
            &DisplayConfig::open(),
            SECRET,
        )
        .unwrap();
        assert!(token.is_none());
    }

    #[test]
    fn test_tampered_token_is_rejected() {
        let judge = pending_judge();
        let token = NotificationService::issue(
            &judge,
            NotificationType::Detail,
            &DisplayConfig::open(),
            SECRET,
        )
        .unwrap()
        .unwrap();

        assert!(NotificationService::verify(&token, "wrong-secret").is_err());

        let mut forged = token.clone();
        forged.replace_range(forged.len() - 4.., "AAAA");
        assert!(NotificationService::verify(&forged, SECRET).is_err());
    }

    #[test]
    fn test_restricted_display_config_survives_the_token() {
        let judge = pending_judge();
        let mut display = DisplayConfig::open();
        display.show_score = false;
        display.show_result = false;
        display.in_contest = true;

        let token = NotificationService::issue(&judge, NotificationType::Rough, &display, SECRET)
            .unwrap()
            .unwrap();
        let claims = NotificationService::verify(&token, SECRET).unwrap();

        assert!(!claims.display_config.show_score);
        assert!(!claims.display_config.show_result);
        assert!(claims.display_config.in_contest);
    }
}
