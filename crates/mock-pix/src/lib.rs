//! Mock PIX provider.
//!
//! An in-memory stand-in for the provider's REST API, served over plain
//! HTTP.  It implements the OAuth client-credentials token endpoint
//! (issuing HS256-signed JWTs) and the charge, random-key and webhook
//! endpoints the SDK talks to, with the provider's status codes and error
//! shapes.
//!
//! ```rust,no_run
//! # async fn run() -> std::io::Result<()> {
//! use mock_pix::{MockConfig, MockPix};
//!
//! let mock = MockPix::new(MockConfig::default());
//! let base_url = mock.spawn().await?;
//! println!("mock provider at {base_url}");
//! # Ok(())
//! # }
//! ```

mod config;

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post, put};
use axum::{Json, Router};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::{DateTime, SecondsFormat, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use pix_models::{
    ApiError, Calendario, Charge, FieldError, KeyList, Loc, Paginacao, Parametros, RandomKey,
    Webhook, WebhookList, WebhookRegistration, SKIP_MTLS_HEADER,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{info, warn};

pub use config::{MockConfig, DEFAULT_SCOPE};

/// Default charge lifetime when the request omits `calendario.expiracao`.
const DEFAULT_EXPIRACAO: u32 = 86_400;

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------

/// Claims of the issued access tokens.
#[derive(Serialize, Deserialize)]
struct AccessClaims {
    sub: String,
    iat: i64,
    exp: i64,
    scope: String,
    jti: String,
}

#[derive(Default)]
struct Store {
    keys: Vec<String>,
    charges: HashMap<String, Charge>,
    webhooks: BTreeMap<String, Webhook>,
}

struct Inner {
    config: MockConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    token_requests: AtomicUsize,
    next_loc_id: AtomicU64,
    store: Mutex<Store>,
}

/// A running mock provider.  Clones share state.
#[derive(Clone)]
pub struct MockPix {
    inner: Arc<Inner>,
}

impl MockPix {
    /// A provider with the keys from `config` registered and a fresh
    /// signing secret.
    pub fn new(config: MockConfig) -> Self {
        let secret = uuid::Uuid::new_v4();
        let store = Store {
            keys: config.keys.clone(),
            ..Store::default()
        };
        Self {
            inner: Arc::new(Inner {
                config,
                encoding_key: EncodingKey::from_secret(secret.as_bytes()),
                decoding_key: DecodingKey::from_secret(secret.as_bytes()),
                token_requests: AtomicUsize::new(0),
                next_loc_id: AtomicU64::new(1),
                store: Mutex::new(store),
            }),
        }
    }

    /// The provider's routes.
    pub fn router(&self) -> Router {
        Router::new()
            .route("/oauth/token", post(issue_token))
            .route("/v2/gn/evp", get(list_keys).post(create_key))
            .route("/v2/gn/evp/{chave}", delete(delete_key))
            .route("/v2/cob", post(create_charge))
            .route("/v2/cob/{txid}", put(put_charge).get(fetch_charge))
            .route("/v2/webhook", get(list_webhooks))
            .route(
                "/v2/webhook/{chave}",
                put(register_webhook)
                    .get(fetch_webhook)
                    .delete(delete_webhook),
            )
            .with_state(self.clone())
    }

    /// Serve on an ephemeral localhost port and return the base URL.
    pub async fn spawn(&self) -> std::io::Result<String> {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let app = self.router();
        tokio::spawn(async move {
            if let Err(err) = axum::serve(listener, app).await {
                warn!(error = %err, "mock provider stopped");
            }
        });
        Ok(format!("http://{addr}"))
    }

    /// Number of calls to `/oauth/token`, successful or not.
    pub fn token_requests(&self) -> usize {
        self.inner.token_requests.load(Ordering::SeqCst)
    }

    /// Keys currently registered.
    pub fn keys(&self) -> Vec<String> {
        self.store().keys.clone()
    }

    fn store(&self) -> MutexGuard<'_, Store> {
        self.inner.store.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Check `authorization: Basic ...` against the configured client.
    fn client_matches(&self, headers: &HeaderMap) -> bool {
        let Some(encoded) = header_value(headers, header::AUTHORIZATION.as_str())
            .and_then(|v| v.strip_prefix("Basic "))
        else {
            return false;
        };
        let Ok(decoded) = STANDARD.decode(encoded.trim()) else {
            return false;
        };
        let expected = format!(
            "{}:{}",
            self.inner.config.client_id, self.inner.config.client_secret
        );
        decoded == expected.as_bytes()
    }

    /// Check `authorization: Bearer ...` against the issued tokens.
    #[allow(clippy::result_large_err)]
    fn authorize(&self, headers: &HeaderMap) -> Result<(), Response> {
        let token = header_value(headers, header::AUTHORIZATION.as_str())
            .and_then(|v| v.strip_prefix("Bearer "))
            .ok_or_else(|| unauthorized("missing bearer token"))?;

        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        decode::<AccessClaims>(token, &self.inner.decoding_key, &validation)
            .map(|_| ())
            .map_err(|err| unauthorized(&format!("invalid access token: {err}")))
    }
}

// ---------------------------------------------------------------------------
// OAuth
// ---------------------------------------------------------------------------

/// `POST /oauth/token`: client-credentials grant.
async fn issue_token(State(mock): State<MockPix>, headers: HeaderMap, body: Bytes) -> Response {
    mock.inner.token_requests.fetch_add(1, Ordering::SeqCst);

    if !mock.client_matches(&headers) {
        warn!("token request with invalid client credentials");
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "invalid_client",
                "error_description": "client authentication failed"
            })),
        )
            .into_response();
    }

    let grant_type = serde_json::from_slice::<serde_json::Value>(&body)
        .ok()
        .and_then(|v| v.get("grant_type")?.as_str().map(str::to_owned));
    if grant_type.as_deref() != Some("client_credentials") {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "unsupported_grant_type",
                "error_description": "grant_type must be client_credentials"
            })),
        )
            .into_response();
    }

    let config = &mock.inner.config;
    let now = Utc::now().timestamp();
    let claims = AccessClaims {
        sub: config.client_id.clone(),
        iat: now,
        exp: now + config.token_ttl_secs,
        scope: DEFAULT_SCOPE.to_string(),
        jti: uuid::Uuid::new_v4().to_string(),
    };

    match encode(&Header::default(), &claims, &mock.inner.encoding_key) {
        Ok(access_token) => {
            info!(client_id = %config.client_id, ttl = config.token_ttl_secs, "access token issued");
            Json(json!({
                "access_token": access_token,
                "token_type": "Bearer",
                "expires_in": config.token_ttl_secs,
                "scope": DEFAULT_SCOPE,
            }))
            .into_response()
        }
        Err(err) => problem(
            StatusCode::INTERNAL_SERVER_ERROR,
            "erro_interno",
            &format!("failed to sign token: {err}"),
        ),
    }
}

// ---------------------------------------------------------------------------
// Keys
// ---------------------------------------------------------------------------

/// `GET /v2/gn/evp`
async fn list_keys(State(mock): State<MockPix>, headers: HeaderMap) -> Response {
    if let Err(denied) = mock.authorize(&headers) {
        return denied;
    }
    Json(KeyList {
        chaves: mock.keys(),
        ..KeyList::default()
    })
    .into_response()
}

/// `POST /v2/gn/evp`
async fn create_key(State(mock): State<MockPix>, headers: HeaderMap) -> Response {
    if let Err(denied) = mock.authorize(&headers) {
        return denied;
    }
    let chave = uuid::Uuid::new_v4().to_string();
    mock.store().keys.push(chave.clone());
    (
        StatusCode::CREATED,
        Json(RandomKey {
            chave,
            ..RandomKey::default()
        }),
    )
        .into_response()
}

/// `DELETE /v2/gn/evp/{chave}`
async fn delete_key(
    State(mock): State<MockPix>,
    Path(chave): Path<String>,
    headers: HeaderMap,
) -> Response {
    if let Err(denied) = mock.authorize(&headers) {
        return denied;
    }
    let mut store = mock.store();
    let before = store.keys.len();
    store.keys.retain(|k| k != &chave);
    if store.keys.len() == before {
        return problem(StatusCode::NOT_FOUND, "chave_nao_encontrada", "key not found");
    }
    StatusCode::NO_CONTENT.into_response()
}

// ---------------------------------------------------------------------------
// Charges
// ---------------------------------------------------------------------------

/// `POST /v2/cob`: the provider assigns the txid.
async fn create_charge(State(mock): State<MockPix>, headers: HeaderMap, body: Bytes) -> Response {
    let txid = uuid::Uuid::new_v4().simple().to_string();
    store_charge(&mock, &headers, txid, &body)
}

/// `PUT /v2/cob/{txid}`
async fn put_charge(
    State(mock): State<MockPix>,
    Path(txid): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    store_charge(&mock, &headers, txid, &body)
}

fn store_charge(mock: &MockPix, headers: &HeaderMap, txid: String, body: &[u8]) -> Response {
    if let Err(denied) = mock.authorize(headers) {
        return denied;
    }

    let mut charge: Charge = match serde_json::from_slice(body) {
        Ok(charge) => charge,
        Err(err) => return problem(StatusCode::BAD_REQUEST, "json_invalido", &err.to_string()),
    };

    let mut violations = Vec::new();
    let amount = charge.valor.as_ref().and_then(|v| v.original.as_deref());
    if amount.is_none_or(|a| a.parse::<f64>().is_err()) {
        violations.push(field_error("required", "$.valor.original", "must be a decimal amount"));
    }
    if charge.txid().is_some() {
        violations.push(field_error("additionalProperties", "$.txid", "must not be sent in the body"));
    }
    let Some(chave) = charge.key().map(str::to_owned) else {
        violations.push(field_error("required", "$.chave", "is required"));
        return schema_violation(violations);
    };
    if !violations.is_empty() {
        return schema_violation(violations);
    }

    let mut store = mock.store();
    if store.charges.contains_key(&txid) {
        return problem(StatusCode::BAD_REQUEST, "txid_duplicado", "txid already in use");
    }
    if !store.keys.contains(&chave) {
        return problem(
            StatusCode::BAD_REQUEST,
            "chave_invalida",
            "key is not registered to this account",
        );
    }

    let loc_id = mock.inner.next_loc_id.fetch_add(1, Ordering::SeqCst);
    let location = format!("pix.example.com/v2/{}", uuid::Uuid::new_v4().simple());
    let calendario = charge.calendario.take().unwrap_or_default();

    charge.txid = Some(txid.clone());
    charge.status = Some("ATIVA".to_string());
    charge.revisao = Some(0);
    charge.calendario = Some(Calendario {
        criacao: Some(Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)),
        expiracao: calendario.expiracao.or(Some(DEFAULT_EXPIRACAO)),
        ..calendario
    });
    charge.loc = Some(Loc {
        id: Some(loc_id),
        location: Some(location.clone()),
        tipo_cob: Some("cob".to_string()),
    });
    charge.pix_copia_e_cola = Some(format!(
        "00020101021226830014BR.GOV.BCB.PIX2561{location}5204000053039865802BR5904MOCK6008BRASILIA62070503***6304"
    ));
    charge.location = Some(location);

    store.charges.insert(txid, charge.clone());
    (StatusCode::CREATED, Json(charge)).into_response()
}

/// `GET /v2/cob/{txid}`
async fn fetch_charge(
    State(mock): State<MockPix>,
    Path(txid): Path<String>,
    headers: HeaderMap,
) -> Response {
    if let Err(denied) = mock.authorize(&headers) {
        return denied;
    }
    match mock.store().charges.get(&txid) {
        Some(charge) => Json(charge.clone()).into_response(),
        None => problem(
            StatusCode::NOT_FOUND,
            "cobranca_nao_encontrada",
            "no charge found for the given txid",
        ),
    }
}

// ---------------------------------------------------------------------------
// Webhooks
// ---------------------------------------------------------------------------

/// `PUT /v2/webhook/{chave}`
async fn register_webhook(
    State(mock): State<MockPix>,
    Path(chave): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    if let Err(denied) = mock.authorize(&headers) {
        return denied;
    }

    let registration: WebhookRegistration = match serde_json::from_slice(&body) {
        Ok(r) => r,
        Err(err) => return problem(StatusCode::BAD_REQUEST, "json_invalido", &err.to_string()),
    };
    let skip_mtls = header_value(&headers, SKIP_MTLS_HEADER) == Some("true");
    if !registration.webhook_url.starts_with("https://") {
        return schema_violation(vec![field_error(
            "format",
            "$.webhookUrl",
            "must be an https URL",
        )]);
    }

    let mut store = mock.store();
    if !store.keys.contains(&chave) {
        return problem(
            StatusCode::BAD_REQUEST,
            "chave_invalida",
            "key is not registered to this account",
        );
    }

    info!(%chave, url = %registration.webhook_url, skip_mtls, "webhook registered");
    let webhook = Webhook {
        webhook_url: Some(registration.webhook_url),
        chave: Some(chave.clone()),
        criacao: Some(Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)),
        ..Webhook::default()
    };
    store.webhooks.insert(chave, webhook.clone());
    (StatusCode::CREATED, Json(webhook)).into_response()
}

/// `GET /v2/webhook/{chave}`
async fn fetch_webhook(
    State(mock): State<MockPix>,
    Path(chave): Path<String>,
    headers: HeaderMap,
) -> Response {
    if let Err(denied) = mock.authorize(&headers) {
        return denied;
    }
    match mock.store().webhooks.get(&chave) {
        Some(webhook) => Json(webhook.clone()).into_response(),
        None => problem(
            StatusCode::NOT_FOUND,
            "webhook_nao_encontrado",
            "no webhook registered for the given key",
        ),
    }
}

/// `GET /v2/webhook?inicio=..&fim=..`
async fn list_webhooks(
    State(mock): State<MockPix>,
    Query(params): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Response {
    if let Err(denied) = mock.authorize(&headers) {
        return denied;
    }

    let window = |name: &str| {
        params
            .get(name)
            .and_then(|v| DateTime::parse_from_rfc3339(v).ok())
            .map(|dt| dt.with_timezone(&Utc))
    };
    let (Some(inicio), Some(fim)) = (window("inicio"), window("fim")) else {
        return schema_violation(vec![field_error(
            "required",
            "$.inicio",
            "inicio and fim must be RFC 3339 timestamps",
        )]);
    };
    let page = |name: &str, default: u32| {
        params
            .get(name)
            .and_then(|v| v.parse::<u32>().ok())
            .unwrap_or(default)
    };
    let pagina_atual = page("paginacao.paginaAtual", 0);
    let itens_por_pagina = page("paginacao.itensPorPagina", 100).max(1);

    let matching: Vec<Webhook> = mock
        .store()
        .webhooks
        .values()
        .filter(|w| {
            w.criacao
                .as_deref()
                .and_then(|c| DateTime::parse_from_rfc3339(c).ok())
                .map(|c| c.with_timezone(&Utc))
                .is_some_and(|c| c >= inicio && c <= fim)
        })
        .cloned()
        .collect();

    let total = u32::try_from(matching.len()).unwrap_or(u32::MAX);
    let per_page = usize::try_from(itens_por_pagina).unwrap_or(usize::MAX);
    let offset = usize::try_from(pagina_atual)
        .unwrap_or(usize::MAX)
        .saturating_mul(per_page);
    let webhooks = matching.into_iter().skip(offset).take(per_page).collect();

    Json(WebhookList {
        parametros: Some(Parametros {
            inicio: params.get("inicio").cloned().unwrap_or_default(),
            fim: params.get("fim").cloned().unwrap_or_default(),
            paginacao: Paginacao {
                pagina_atual,
                itens_por_pagina,
                quantidade_de_paginas: total.div_ceil(itens_por_pagina),
                quantidade_total_de_itens: total,
            },
        }),
        webhooks,
        ..WebhookList::default()
    })
    .into_response()
}

/// `DELETE /v2/webhook/{chave}`
async fn delete_webhook(
    State(mock): State<MockPix>,
    Path(chave): Path<String>,
    headers: HeaderMap,
) -> Response {
    if let Err(denied) = mock.authorize(&headers) {
        return denied;
    }
    match mock.store().webhooks.remove(&chave) {
        Some(_) => StatusCode::NO_CONTENT.into_response(),
        None => problem(
            StatusCode::NOT_FOUND,
            "webhook_nao_encontrado",
            "no webhook registered for the given key",
        ),
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn header_value<'h>(headers: &'h HeaderMap, name: &str) -> Option<&'h str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

fn problem(status: StatusCode, name: &str, message: &str) -> Response {
    let body = ApiError {
        name: Some(name.to_string()),
        message: Some(message.to_string()),
        ..ApiError::default()
    };
    (status, Json(body)).into_response()
}

fn unauthorized(message: &str) -> Response {
    problem(StatusCode::UNAUTHORIZED, "acesso_negado", message)
}

fn schema_violation(errors: Vec<FieldError>) -> Response {
    let body = ApiError {
        name: Some("valor_invalido".to_string()),
        message: Some("request does not match the schema".to_string()),
        errors,
        ..ApiError::default()
    };
    (StatusCode::BAD_REQUEST, Json(body)).into_response()
}

fn field_error(key: &str, path: &str, message: &str) -> FieldError {
    FieldError {
        key: Some(key.to_string()),
        path: Some(path.to_string()),
        message: Some(message.to_string()),
    }
}
