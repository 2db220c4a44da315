use std::collections::HashMap;

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::NetError;
use crate::mojang::{server_hash, Session};

pub const AUTH_BASE: &str = "https://authserver.mojang.com";
pub const SESSION_BASE: &str = "https://sessionserver.mojang.com";

#[derive(Debug, Error)]
pub enum AuthError {
    /// The service answered with a non-empty `error` field.
    #[error("yggdrasil: {error}: {message}")]
    Server { error: String, message: String },

    /// The service answered outside the 2xx range without a readable
    /// `error` field.
    #[error("unexpected http status {0}")]
    Status(u16),

    #[error("http: {0}")]
    Http(#[from] reqwest::Error),

    #[error("malformed response: {0}")]
    Json(#[from] serde_json::Error),

    #[error("no access token available")]
    NoAccessToken,

    #[error("no profile selected")]
    NoProfile,

    #[error("credential source: {0}")]
    Credentials(String),

    #[error("token store: {0}")]
    Store(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub id: String,
    pub name: String,
}

/// The persisted slice of an account's auth state. Username and password
/// are never part of it: only tokens and profiles survive across runs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthInfo {
    #[serde(default)]
    pub client_token: String,
    #[serde(default)]
    pub access_token: String,
    #[serde(default)]
    pub selected_profile: Option<Profile>,
    #[serde(default)]
    pub available_profiles: Vec<Profile>,
}

/// Interface of the external key-value configuration store the tokens are
/// persisted into. The store itself (file layout, value encryption) lives
/// outside this crate.
pub trait KvStore {
    fn value(&self, name: &str) -> Option<String>;

    fn set_value(&mut self, name: &str, value: &str) -> Result<(), AuthError>;
}

impl<S: KvStore> KvStore for &mut S {
    fn value(&self, name: &str) -> Option<String> {
        (**self).value(name)
    }

    fn set_value(&mut self, name: &str, value: &str) -> Result<(), AuthError> {
        (**self).set_value(name, value)
    }
}

#[derive(Debug, Default)]
pub struct MemoryStore(HashMap<String, String>);

impl KvStore for MemoryStore {
    fn value(&self, name: &str) -> Option<String> {
        self.0.get(name).cloned()
    }

    fn set_value(&mut self, name: &str, value: &str) -> Result<(), AuthError> {
        self.0.insert(name.to_owned(), value.to_owned());

        Ok(())
    }
}

const TOKEN_KEY: &str = "authInfo";

/// Persists [`AuthInfo`] as a base64-wrapped JSON blob under one key of a
/// [`KvStore`], so that text-only stores can carry it safely.
pub struct TokenStore<S: KvStore> {
    store: S,
    key: String,
}

impl<S: KvStore> TokenStore<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            key: TOKEN_KEY.to_owned(),
        }
    }

    pub fn load(&self) -> Result<Option<AuthInfo>, AuthError> {
        let Some(value) = self.store.value(&self.key) else {
            return Ok(None);
        };

        let data = base64::decode(&value).map_err(|e| AuthError::Store(e.to_string()))?;

        Ok(Some(serde_json::from_slice(&data)?))
    }

    pub fn save(&mut self, info: &AuthInfo) -> Result<(), AuthError> {
        let data = serde_json::to_vec(info)?;

        self.store.set_value(&self.key, &base64::encode(data))
    }
}

/// Asked for `(username, password)` only when every cached token has been
/// rejected. Prompting itself is the caller's concern.
pub trait CredentialSource {
    fn credentials(&mut self) -> Result<(String, String), AuthError>;
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct YggResponse {
    #[serde(default)]
    access_token: Option<String>,
    #[serde(default)]
    client_token: Option<String>,
    #[serde(default)]
    selected_profile: Option<Profile>,
    #[serde(default)]
    available_profiles: Option<Vec<Profile>>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    error_message: Option<String>,
}

/// Client for Mojang's account service: the token lifecycle against
/// `authserver.mojang.com` and the join handshake against
/// `sessionserver.mojang.com`.
pub struct Yggdrasil<S: KvStore> {
    http: reqwest::Client,
    auth_base: String,
    session_base: String,
    tokens: TokenStore<S>,
    info: AuthInfo,
}

impl<S: KvStore> Yggdrasil<S> {
    pub fn new(store: S) -> Self {
        Self::with_endpoints(store, AUTH_BASE, SESSION_BASE)
    }

    /// The endpoint bases are injectable so tests can run against a local
    /// stub service.
    pub fn with_endpoints(store: S, auth_base: &str, session_base: &str) -> Self {
        let tokens = TokenStore::new(store);
        // A missing or corrupt blob just means a fresh login.
        let info = tokens.load().unwrap_or(None).unwrap_or_default();

        Self {
            http: reqwest::Client::new(),
            auth_base: auth_base.to_owned(),
            session_base: session_base.to_owned(),
            tokens,
            info,
        }
    }

    pub fn info(&self) -> &AuthInfo {
        &self.info
    }

    pub fn profile(&self) -> Option<&Profile> {
        self.info.selected_profile.as_ref()
    }

    /// Produces a usable access token with as little interaction as
    /// possible: validate the cached token, fall back to a refresh, and
    /// only then ask the credential source and authenticate from scratch.
    /// The fallthrough happens on rejection by the service, never on
    /// transport failures.
    pub async fn start<C: CredentialSource>(&mut self, credentials: &mut C) -> Result<(), AuthError> {
        if !self.info.access_token.is_empty() {
            match self.validate().await {
                Ok(()) => return Ok(()),
                Err(AuthError::Server { error, .. }) => debug!("stale access token: {}", error),
                Err(e) => return Err(e),
            }

            if !self.info.client_token.is_empty() {
                match self.refresh().await {
                    Ok(()) => return Ok(()),
                    Err(AuthError::Server { error, .. }) => debug!("refresh rejected: {}", error),
                    Err(e) => return Err(e),
                }
            }
        }

        let (username, password) = credentials.credentials()?;

        self.authenticate(&username, &password).await
    }

    /// Trades credentials for a fresh access token. The client token is
    /// generated once per installation and reused ever after, so that
    /// refreshes keep working across runs.
    pub async fn authenticate(&mut self, username: &str, password: &str) -> Result<(), AuthError> {
        if self.info.client_token.is_empty() {
            self.info.client_token = Uuid::new_v4().to_string();
        }

        let resp = self
            .request("/authenticate", &json!({
                "agent": {
                    "name": "Minecraft",
                    "version": 1,
                },
                "username": username,
                "password": password,
                "clientToken": self.info.client_token,
            }))
            .await?;

        self.update(resp)?;

        info!(
            "Authenticated as {}",
            self.profile().map(|p| p.name.as_str()).unwrap_or("<no profile>")
        );

        Ok(())
    }

    /// Rotates the access token using the client/access token pair. The
    /// prior access token is invalidated by the service.
    pub async fn refresh(&mut self) -> Result<(), AuthError> {
        let resp = self
            .request("/refresh", &json!({
                "accessToken": self.access_token()?,
                "clientToken": self.info.client_token,
            }))
            .await?;

        self.update(resp)
    }

    /// Checks that the cached access token is still usable. Success is an
    /// empty response without an `error` field.
    pub async fn validate(&mut self) -> Result<(), AuthError> {
        self.request("/validate", &json!({
            "accessToken": self.access_token()?,
        }))
        .await?;

        Ok(())
    }

    pub async fn invalidate(&mut self) -> Result<(), AuthError> {
        self.request("/invalidate", &json!({
            "accessToken": self.access_token()?,
            "clientToken": self.info.client_token,
        }))
        .await?;

        self.info.access_token.clear();
        self.tokens.save(&self.info)
    }

    /// Invalidates every access token of the account, by credentials
    /// rather than by token pair.
    pub async fn sign_out(&mut self, username: &str, password: &str) -> Result<(), AuthError> {
        self.request("/signout", &json!({
            "username": username,
            "password": password,
        }))
        .await?;

        Ok(())
    }

    /// The join half of the encryption exchange: generates the shared
    /// secret, reports the server hash to the session service and returns
    /// the session used to build the encryption response.
    pub async fn join_session(
        &mut self,
        server_id: &str,
        public_key_der: &[u8],
    ) -> Result<Session, NetError> {
        let session = Session::new(public_key_der)?;
        let hash = server_hash(server_id, &session.shared_secret(), public_key_der);

        let profile = self.profile().ok_or(AuthError::NoProfile)?;
        let payload = json!({
            "accessToken": self.access_token()?,
            "selectedProfile": profile,
            "serverId": hash,
        });

        let url = format!("{}/session/minecraft/join", self.session_base);
        let response = self
            .http
            .post(&url)
            .json(&payload)
            .send()
            .await
            .map_err(AuthError::Http)?;

        let status = response.status();
        let body = response.text().await.map_err(AuthError::Http)?;
        parse_response(status, &body)?;

        info!("Session joined as {}", profile.name);

        Ok(session)
    }

    fn access_token(&self) -> Result<&str, AuthError> {
        if self.info.access_token.is_empty() {
            return Err(AuthError::NoAccessToken);
        }

        Ok(&self.info.access_token)
    }

    async fn request(&self, endpoint: &str, payload: &serde_json::Value) -> Result<YggResponse, AuthError> {
        let url = format!("{}{}", self.auth_base, endpoint);

        let response = self.http.post(&url).json(payload).send().await?;

        let status = response.status();
        let body = response.text().await?;

        parse_response(status, &body)
    }

    /// Applies a successful response to the cached state and persists it.
    fn update(&mut self, resp: YggResponse) -> Result<(), AuthError> {
        if let Some(token) = resp.access_token {
            self.info.access_token = token;
        }
        if let Some(token) = resp.client_token {
            self.info.client_token = token;
        }
        if let Some(profile) = resp.selected_profile {
            self.info.selected_profile = Some(profile);
        }
        if let Some(profiles) = resp.available_profiles {
            self.info.available_profiles = profiles;
        }

        self.tokens.save(&self.info)
    }
}

/// Success is a 2xx status with no `error` field; an empty 2xx body is
/// fine (the validate and join endpoints answer 204). A named service
/// error is preferred over the bare status when both are present.
fn parse_response(status: StatusCode, body: &str) -> Result<YggResponse, AuthError> {
    let resp = if body.trim().is_empty() {
        YggResponse::default()
    } else {
        match serde_json::from_str::<YggResponse>(body) {
            Ok(resp) => resp,
            Err(_) if !status.is_success() => return Err(AuthError::Status(status.as_u16())),
            Err(e) => return Err(AuthError::Json(e)),
        }
    };

    if let Some(error) = &resp.error {
        if !error.is_empty() {
            return Err(AuthError::Server {
                error: error.clone(),
                message: resp.error_message.clone().unwrap_or_default(),
            });
        }
    }

    if !status.is_success() {
        return Err(AuthError::Status(status.as_u16()));
    }

    Ok(resp)
}

#[cfg(test)]
mod tests {
    use crate::auth::{
        AuthError, AuthInfo, CredentialSource, KvStore, MemoryStore, Profile, TokenStore,
        Yggdrasil,
    };
    use crate::stub::StubService;

    fn persisted(yggdrasil: &Yggdrasil<MemoryStore>) -> AuthInfo {
        TokenStore::new(MemoryStore(yggdrasil.tokens.store.0.clone()))
            .load()
            .unwrap()
            .unwrap()
    }

    fn preloaded_store(info: &AuthInfo) -> MemoryStore {
        let mut store = MemoryStore::default();
        TokenStore::new(&mut store).save(info).unwrap();
        store
    }

    struct NoPrompt;

    impl CredentialSource for NoPrompt {
        fn credentials(&mut self) -> Result<(String, String), AuthError> {
            Err(AuthError::Credentials("prompt must not be reached".to_owned()))
        }
    }

    #[derive(Default)]
    struct CountingPrompt {
        calls: usize,
    }

    impl CredentialSource for CountingPrompt {
        fn credentials(&mut self) -> Result<(String, String), AuthError> {
            self.calls += 1;

            Ok(("notch@mojang.com".to_owned(), "hunter2".to_owned()))
        }
    }

    fn cached_info() -> AuthInfo {
        AuthInfo {
            client_token: "11111111-2222-3333-4444-555555555555".to_owned(),
            access_token: "cached-access-token".to_owned(),
            selected_profile: Some(Profile {
                id: "4566e69fc90748ee8d71d7ba5aa00d20".to_owned(),
                name: "Notch".to_owned(),
            }),
            available_profiles: vec![],
        }
    }

    #[test]
    fn token_store_roundtrip() {
        let mut store = TokenStore::new(MemoryStore::default());

        assert_eq!(None, store.load().unwrap());

        let info = cached_info();
        store.save(&info).unwrap();
        assert_eq!(Some(info), store.load().unwrap());

        // The persisted value is base64 text, safe for text-only stores.
        let raw = store.store.value("authInfo").unwrap();
        assert!(base64::decode(&raw).is_ok());
    }

    #[tokio::test]
    async fn start_with_valid_token_only_validates() {
        let stub = StubService::serve(vec![("/validate", 204, "")]).await;

        let mut yggdrasil =
            Yggdrasil::with_endpoints(preloaded_store(&cached_info()), &stub.base(), &stub.base());
        yggdrasil.start(&mut NoPrompt).await.unwrap();

        assert_eq!(vec!["/validate"], stub.requests());
        assert_eq!("cached-access-token", yggdrasil.info().access_token);
    }

    #[tokio::test]
    async fn start_falls_back_to_refresh() {
        let stub = StubService::serve(vec![
            (
                "/validate",
                403,
                r#"{"error":"ForbiddenOperationException","errorMessage":"Invalid token"}"#,
            ),
            (
                "/refresh",
                200,
                r#"{"accessToken":"rotated-access-token","clientToken":"11111111-2222-3333-4444-555555555555"}"#,
            ),
        ])
        .await;

        let mut yggdrasil =
            Yggdrasil::with_endpoints(preloaded_store(&cached_info()), &stub.base(), &stub.base());
        yggdrasil.start(&mut NoPrompt).await.unwrap();

        assert_eq!(vec!["/validate", "/refresh"], stub.requests());

        // The rotated access token is persisted, the client token survives.
        let info = persisted(&yggdrasil);
        assert_eq!("rotated-access-token", info.access_token);
        assert_eq!("11111111-2222-3333-4444-555555555555", info.client_token);
    }

    #[tokio::test]
    async fn start_falls_back_to_credentials() {
        let stub = StubService::serve(vec![
            (
                "/validate",
                403,
                r#"{"error":"ForbiddenOperationException","errorMessage":"Invalid token"}"#,
            ),
            (
                "/refresh",
                403,
                r#"{"error":"ForbiddenOperationException","errorMessage":"Invalid token"}"#,
            ),
            (
                "/authenticate",
                200,
                r#"{
                    "accessToken": "fresh-access-token",
                    "clientToken": "11111111-2222-3333-4444-555555555555",
                    "selectedProfile": {"id": "4566e69fc90748ee8d71d7ba5aa00d20", "name": "Notch"},
                    "availableProfiles": [{"id": "4566e69fc90748ee8d71d7ba5aa00d20", "name": "Notch"}]
                }"#,
            ),
        ])
        .await;

        let mut yggdrasil =
            Yggdrasil::with_endpoints(preloaded_store(&cached_info()), &stub.base(), &stub.base());

        let mut prompt = CountingPrompt::default();
        yggdrasil.start(&mut prompt).await.unwrap();

        assert_eq!(1, prompt.calls);
        assert_eq!(
            vec!["/validate", "/refresh", "/authenticate"],
            stub.requests()
        );
        assert_eq!("fresh-access-token", persisted(&yggdrasil).access_token);
    }

    #[tokio::test]
    async fn authenticate_generates_client_token_once() {
        let stub = StubService::serve(vec![(
            "/authenticate",
            200,
            r#"{"accessToken":"a","selectedProfile":{"id":"i","name":"n"}}"#,
        )])
        .await;

        let mut yggdrasil =
            Yggdrasil::with_endpoints(MemoryStore::default(), &stub.base(), &stub.base());

        assert!(yggdrasil.info().client_token.is_empty());
        yggdrasil.authenticate("user", "password").await.unwrap();

        let generated = yggdrasil.info().client_token.clone();
        assert!(uuid::Uuid::parse_str(&generated).is_ok());

        yggdrasil.authenticate("user", "password").await.unwrap();
        assert_eq!(generated, yggdrasil.info().client_token);
    }

    #[test]
    fn non_success_status_with_empty_body_is_an_error() {
        use reqwest::StatusCode;

        use crate::auth::parse_response;

        assert!(parse_response(StatusCode::NO_CONTENT, "").is_ok());
        assert!(parse_response(StatusCode::OK, r#"{"accessToken":"a"}"#).is_ok());

        // A dead or misrouted service must not look like a passed
        // validation, whatever it puts in the body.
        assert!(matches!(
            parse_response(StatusCode::INTERNAL_SERVER_ERROR, ""),
            Err(AuthError::Status(500))
        ));
        assert!(matches!(
            parse_response(StatusCode::NOT_FOUND, "<html>sign in to this network</html>"),
            Err(AuthError::Status(404))
        ));

        // A named service error stays the more useful diagnosis.
        assert!(matches!(
            parse_response(
                StatusCode::FORBIDDEN,
                r#"{"error":"ForbiddenOperationException","errorMessage":"Invalid token"}"#,
            ),
            Err(AuthError::Server { .. })
        ));
    }

    #[tokio::test]
    async fn broken_service_does_not_cascade() {
        let stub = StubService::serve(vec![("/validate", 500, "")]).await;

        let mut yggdrasil =
            Yggdrasil::with_endpoints(preloaded_store(&cached_info()), &stub.base(), &stub.base());

        // A 500 is an outage, not a token rejection: it propagates instead
        // of falling through to refresh or the credential prompt.
        assert!(matches!(
            yggdrasil.start(&mut NoPrompt).await,
            Err(AuthError::Status(500))
        ));
        assert_eq!(vec!["/validate"], stub.requests());
    }

    #[tokio::test]
    async fn invalidate_reports_service_errors() {
        let stub = StubService::serve(vec![(
            "/invalidate",
            403,
            r#"{"error":"ForbiddenOperationException","errorMessage":"nope"}"#,
        )])
        .await;

        let mut yggdrasil =
            Yggdrasil::with_endpoints(preloaded_store(&cached_info()), &stub.base(), &stub.base());

        assert!(matches!(
            yggdrasil.invalidate().await,
            Err(AuthError::Server { .. })
        ));
    }

    #[tokio::test]
    async fn validate_without_token_never_hits_the_network() {
        let mut yggdrasil = Yggdrasil::with_endpoints(
            MemoryStore::default(),
            "http://127.0.0.1:9",
            "http://127.0.0.1:9",
        );

        assert!(matches!(
            yggdrasil.validate().await,
            Err(AuthError::NoAccessToken)
        ));
    }
}
