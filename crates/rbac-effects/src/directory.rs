//! Directory lookups against a Graph-style user endpoint

use crate::http::{error_body, send, Endpoint, RawResponse, RequestFailure};
use async_trait::async_trait;
use rbac_core::{DirectoryError, DirectoryService, DirectoryUser};
use reqwest::StatusCode;
use serde::Deserialize;
use tracing::debug;

/// User object as returned by `GET /users/{oid}`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GraphUser {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    user_principal_name: Option<String>,
    #[serde(default)]
    mail: Option<String>,
    #[serde(default)]
    display_name: Option<String>,
}

impl GraphUser {
    /// The principal name is the sign-in address; `mail` is only used when it
    /// is absent
    fn into_user(self, oid: &str) -> DirectoryUser {
        let mail = self
            .user_principal_name
            .filter(|name| !name.trim().is_empty())
            .or(self.mail)
            .unwrap_or_default();
        DirectoryUser {
            oid: self.id.unwrap_or_else(|| oid.to_string()),
            mail,
            display_name: self.display_name.unwrap_or_default(),
        }
    }
}

/// [`DirectoryService`] over HTTP
#[derive(Debug, Clone)]
pub struct GraphDirectory {
    endpoint: Endpoint,
}

impl GraphDirectory {
    /// Directory rooted at `base_url`
    pub fn new(base_url: &str, token: Option<String>) -> Result<Self, DirectoryError> {
        let endpoint = Endpoint::new(base_url, token).map_err(into_directory)?;
        Ok(Self { endpoint })
    }
}

#[async_trait]
impl DirectoryService for GraphDirectory {
    async fn lookup_identity(&self, oid: &str) -> Result<Option<DirectoryUser>, DirectoryError> {
        let url = self.endpoint.url(&["users", oid]).map_err(into_directory)?;
        debug!(url = %url, "Directory lookup");
        let response = send(self.endpoint.get(url))
            .await
            .map_err(into_directory)?;
        decode_user(oid, response)
    }
}

/// 404 means the identity is unknown, which is not an error
pub(crate) fn decode_user(
    oid: &str,
    response: RawResponse,
) -> Result<Option<DirectoryUser>, DirectoryError> {
    match response.status {
        status if status.is_success() => {
            let user: GraphUser = serde_json::from_str(&response.body)
                .map_err(|e| DirectoryError::decode(format!("user {oid}: {e}")))?;
            Ok(Some(user.into_user(oid)))
        }
        StatusCode::NOT_FOUND => Ok(None),
        status => Err(DirectoryError::status(
            status.as_u16(),
            error_body(&response.body),
        )),
    }
}

fn into_directory(failure: RequestFailure) -> DirectoryError {
    DirectoryError::network(failure.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(status: u16, body: &str) -> RawResponse {
        RawResponse {
            status: StatusCode::from_u16(status).unwrap(),
            body: body.to_string(),
        }
    }

    #[test]
    fn principal_name_is_preferred() {
        let body = r#"{
            "id": "oid-1",
            "userPrincipalName": "alice@corp.test",
            "mail": "alice.smith@corp.test",
            "displayName": "Alice"
        }"#;
        let user = decode_user("oid-1", raw(200, body)).unwrap().unwrap();
        assert_eq!(
            user,
            DirectoryUser {
                oid: "oid-1".into(),
                mail: "alice@corp.test".into(),
                display_name: "Alice".into(),
            }
        );
    }

    #[test]
    fn mail_is_used_without_principal_name() {
        let body = r#"{"mail": "bob@corp.test"}"#;
        let user = decode_user("oid-2", raw(200, body)).unwrap().unwrap();
        assert_eq!(user.oid, "oid-2");
        assert_eq!(user.mail, "bob@corp.test");
    }

    #[test]
    fn user_without_any_address_has_blank_mail() {
        let user = decode_user("oid-3", raw(200, "{}")).unwrap().unwrap();
        assert!(user.mail.is_empty());
    }

    #[test]
    fn unknown_identity_is_none() {
        assert_eq!(decode_user("ghost", raw(404, "")).unwrap(), None);
    }

    #[test]
    fn throttling_is_an_error() {
        let err = decode_user("oid-1", raw(429, "slow down")).unwrap_err();
        assert_eq!(err, DirectoryError::status(429, "slow down"));
    }
}
