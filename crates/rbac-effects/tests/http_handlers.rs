//! Handlers against a canned local HTTP responder

#![allow(clippy::unwrap_used, missing_docs)]

use rbac_core::{
    AccessLevel, AclEntry, DirectoryService, RemoteError, ResourceApi, ResourcePath, Role,
    SecurityPolicy,
};
use rbac_effects::{GraphDirectory, HttpResourceApi};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

/// One request as seen by the responder
#[derive(Debug, Clone)]
struct Seen {
    method: String,
    path: String,
    authorization: Option<String>,
    body: String,
}

/// Answers `"METHOD /path"` with a canned status and body; anything else is 404
struct Responder {
    base: String,
    seen: Arc<Mutex<Vec<Seen>>>,
}

impl Responder {
    async fn start(routes: &[(&str, u16, &str)]) -> Self {
        let routes: HashMap<String, (u16, String)> = routes
            .iter()
            .map(|(route, status, body)| (route.to_string(), (*status, body.to_string())))
            .collect();
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());
        let seen = Arc::new(Mutex::new(Vec::new()));

        let log = seen.clone();
        tokio::spawn(async move {
            loop {
                let Ok((stream, _)) = listener.accept().await else {
                    return;
                };
                serve(stream, &routes, &log).await;
            }
        });

        Self { base, seen }
    }

    fn seen(&self) -> Vec<Seen> {
        self.seen.lock().unwrap().clone()
    }
}

async fn serve(
    mut stream: TcpStream,
    routes: &HashMap<String, (u16, String)>,
    log: &Mutex<Vec<Seen>>,
) {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    let header_end = loop {
        let n = stream.read(&mut chunk).await.unwrap();
        if n == 0 {
            return;
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = String::from_utf8_lossy(&buf[..header_end]).to_string();
    let mut lines = head.split("\r\n");
    let mut request_line = lines.next().unwrap().split(' ');
    let method = request_line.next().unwrap().to_string();
    let path = request_line.next().unwrap().to_string();

    let mut content_length = 0;
    let mut authorization = None;
    for line in lines {
        if let Some((name, value)) = line.split_once(':') {
            match name.trim().to_ascii_lowercase().as_str() {
                "content-length" => content_length = value.trim().parse().unwrap(),
                "authorization" => authorization = Some(value.trim().to_string()),
                _ => {}
            }
        }
    }
    while buf.len() < header_end + content_length {
        let n = stream.read(&mut chunk).await.unwrap();
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
    }
    let body = String::from_utf8_lossy(&buf[header_end..]).to_string();

    let (status, payload) = routes
        .get(&format!("{method} {path}"))
        .cloned()
        .unwrap_or((404, String::new()));
    log.lock().unwrap().push(Seen {
        method,
        path,
        authorization,
        body,
    });

    let response = format!(
        "HTTP/1.1 {status} X\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{payload}",
        payload.len()
    );
    stream.write_all(response.as_bytes()).await.unwrap();
    stream.shutdown().await.unwrap();
}

const ORGANIZATIONS: &str = r#"[
    {"id": "o-1", "name": "First", "ownerId": "oid-1"},
    {"id": "o-2", "name": "Second", "ownerId": "oid-2",
     "security": {"default": "viewer", "accessControlList": []}}
]"#;

#[tokio::test]
async fn lists_organizations_with_bearer_token() {
    let server = Responder::start(&[("GET /organizations", 200, ORGANIZATIONS)]).await;
    let api = HttpResourceApi::new(&server.base, Some("secret".into())).unwrap();

    let organizations = api.list_organizations().await.unwrap();

    assert_eq!(organizations.len(), 2);
    assert_eq!(organizations[0].owner_id, "oid-1");
    assert!(organizations[0].existing_policy.is_none());
    assert_eq!(
        organizations[1].existing_policy.as_ref().unwrap().default_access,
        AccessLevel::Viewer
    );

    let seen = server.seen();
    assert_eq!(seen[0].method, "GET");
    assert_eq!(seen[0].authorization.as_deref(), Some("Bearer secret"));
}

#[tokio::test]
async fn scenario_listing_uses_nested_route() {
    let server = Responder::start(&[(
        "GET /organizations/o-1/workspaces/w-1/scenarios",
        200,
        r#"[{"id": "s-1", "name": "Run", "ownerId": "oid-9"}]"#,
    )])
    .await;
    let api = HttpResourceApi::new(&server.base, None).unwrap();

    let scenarios = api.list_scenarios("o-1", "w-1").await.unwrap();

    assert_eq!(scenarios[0].id, "s-1");
    assert_eq!(server.seen()[0].authorization, None);
}

#[tokio::test]
async fn missing_organization_is_not_found() {
    let server = Responder::start(&[]).await;
    let api = HttpResourceApi::new(&server.base, None).unwrap();

    let err = api.get_organization("o-404").await.unwrap_err();

    assert_eq!(err, RemoteError::not_found("/organizations/o-404"));
}

#[tokio::test]
async fn server_error_carries_status_and_body() {
    let server = Responder::start(&[("GET /organizations/o-1/workspaces", 500, "boom")]).await;
    let api = HttpResourceApi::new(&server.base, None).unwrap();

    let err = api.list_workspaces("o-1").await.unwrap_err();

    assert_eq!(err, RemoteError::status(500, "boom"));
}

#[tokio::test]
async fn policy_update_is_a_patch_on_the_resource() {
    let server = Responder::start(&[(
        "PATCH /organizations/o-1/workspaces/w-1",
        200,
        r#"{"id": "w-1", "name": "W", "ownerId": "oid-1",
            "security": {"default": "none",
                         "accessControlList": [{"id": "a@x", "role": "admin"}]}}"#,
    )])
    .await;
    let api = HttpResourceApi::new(&server.base, None).unwrap();
    let policy = SecurityPolicy {
        default_access: AccessLevel::None,
        acl: vec![AclEntry::new("a@x", Role::Admin)],
    };

    let stored = api
        .update_policy(&ResourcePath::workspace("o-1", "w-1"), &policy)
        .await
        .unwrap();

    assert!(stored.existing_policy.unwrap().same_grants(&policy));
    let seen = server.seen();
    assert_eq!(seen[0].method, "PATCH");
    let sent: serde_json::Value = serde_json::from_str(&seen[0].body).unwrap();
    assert_eq!(sent["security"]["default"], "none");
    assert_eq!(sent["security"]["accessControlList"][0]["id"], "a@x");
}

#[tokio::test]
async fn unreachable_api_is_a_network_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());
    drop(listener);
    let api = HttpResourceApi::new(&base, None).unwrap();

    let err = api.list_organizations().await.unwrap_err();

    assert!(matches!(err, RemoteError::Network { .. }));
}

#[tokio::test]
async fn directory_resolves_known_and_unknown_users() {
    let server = Responder::start(&[(
        "GET /v1.0/users/oid-1",
        200,
        r#"{"id": "oid-1", "userPrincipalName": "alice@corp.test", "displayName": "Alice"}"#,
    )])
    .await;
    let directory = GraphDirectory::new(&format!("{}/v1.0", server.base), None).unwrap();

    let alice = directory.lookup_identity("oid-1").await.unwrap().unwrap();
    assert_eq!(alice.mail, "alice@corp.test");
    assert_eq!(alice.display_name, "Alice");

    assert_eq!(directory.lookup_identity("ghost").await.unwrap(), None);
    assert_eq!(server.seen()[1].path, "/v1.0/users/ghost");
}
