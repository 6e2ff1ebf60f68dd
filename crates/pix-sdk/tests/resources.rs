mod common;

use common::{connected, mock_config, KEY};
use pix_sdk::{Charge, Devedor, PixError, ProviderDiagnostics, WebhookQuery};
use reqwest::StatusCode;

#[tokio::test]
async fn create_charge_with_txid_uses_put() {
    let (_mock, _base, session) = connected(mock_config()).await;

    let charge = Charge::immediate("123.45", 3600)
        .with_txid("7978c0c97ea847e78e8849634473c1f1")
        .with_key(KEY)
        .with_debtor(Devedor::person("12345678909", "Francisco da Silva"))
        .with_payer_request("Invoice 42")
        .with_info("Campo 1", "Informação Adicional1");

    let created = session.charges().create(charge).await.unwrap();
    assert_eq!(created.txid(), Some("7978c0c97ea847e78e8849634473c1f1"));
    assert_eq!(created.status.as_deref(), Some("ATIVA"));
    assert_eq!(created.key(), Some(KEY));
    assert!(!created.has_api_error());

    let fetched = session
        .charges()
        .fetch("7978c0c97ea847e78e8849634473c1f1")
        .await
        .unwrap();
    assert_eq!(fetched.valor, created.valor);
    assert_eq!(fetched.location, created.location);
}

#[tokio::test]
async fn create_charge_without_txid_gets_one_assigned() {
    let (_mock, _base, session) = connected(mock_config()).await;

    let created = session
        .charges()
        .create(Charge::immediate("1.00", 600).with_key(KEY))
        .await
        .unwrap();
    assert!(created.txid().is_some());
    assert!(created.pix_copia_e_cola.is_some());
}

#[tokio::test]
async fn create_charge_defaults_to_first_registered_key() {
    let (_mock, _base, session) = connected(mock_config()).await;

    let created = session
        .charges()
        .create(Charge::immediate("5.00", 600))
        .await
        .unwrap();
    assert_eq!(created.key(), Some(KEY));
}

#[tokio::test]
async fn create_charge_without_any_key_is_rejected_locally() {
    let (_mock, _base, session) = connected(mock_config().with_keys(Vec::new())).await;

    let err = session
        .charges()
        .create(Charge::immediate("5.00", 600))
        .await
        .unwrap_err();
    assert!(matches!(err, PixError::Validation(ref m) if m == "no pix keys found"));
}

#[tokio::test]
async fn unknown_charge_is_provider_not_found() {
    let (_mock, _base, session) = connected(mock_config()).await;

    let err = session.charges().fetch("doesnotexist").await.unwrap_err();
    assert_eq!(err.status(), Some(StatusCode::NOT_FOUND));
    assert_eq!(
        err.api_error().and_then(|e| e.name.as_deref()),
        Some("cobranca_nao_encontrada")
    );
}

#[tokio::test]
async fn fetch_charge_requires_txid() {
    let (mock, _base, session) = connected(mock_config()).await;

    let err = session.charges().fetch("").await.unwrap_err();
    assert!(matches!(err, PixError::Validation(_)));
    assert_eq!(mock.token_requests(), 0);
}

#[tokio::test]
async fn invalid_amount_reports_field_errors() {
    let (_mock, _base, session) = connected(mock_config()).await;

    let err = session
        .charges()
        .create(Charge::immediate("ten reais", 600).with_key(KEY))
        .await
        .unwrap_err();
    let detail = err.api_error().unwrap();
    assert_eq!(detail.errors[0].path.as_deref(), Some("$.valor.original"));
    assert!(err.to_string().contains("$.valor.original"));
}

#[tokio::test]
async fn random_key_lifecycle() {
    let (mock, _base, session) = connected(mock_config()).await;

    let created = session.keys().create_random().await.unwrap();
    assert!(!created.chave.is_empty());

    let listed = session.keys().list().await.unwrap();
    assert_eq!(listed.chaves, vec![KEY.to_string(), created.chave.clone()]);

    session.keys().delete(&created.chave).await.unwrap();
    assert_eq!(mock.keys(), vec![KEY.to_string()]);

    let err = session.keys().delete(&created.chave).await.unwrap_err();
    assert_eq!(err.status(), Some(StatusCode::NOT_FOUND));
}

#[tokio::test]
async fn webhook_lifecycle() {
    let (_mock, _base, session) = connected(mock_config()).await;
    let webhooks = session.webhooks();

    let registered = webhooks
        .register(KEY, "https://example.com/pix/webhook", true)
        .await
        .unwrap();
    assert_eq!(
        registered.webhook_url.as_deref(),
        Some("https://example.com/pix/webhook")
    );

    let fetched = webhooks.fetch(KEY).await.unwrap();
    assert_eq!(fetched.chave.as_deref(), Some(KEY));

    let now = chrono::Utc::now();
    let query = WebhookQuery::between(
        (now - chrono::Duration::hours(1)).to_rfc3339(),
        (now + chrono::Duration::hours(1)).to_rfc3339(),
    )
    .page(0, 10);
    let listed = webhooks.list(&query).await.unwrap();
    assert_eq!(listed.webhooks.len(), 1);
    let paginacao = listed.parametros.unwrap().paginacao;
    assert_eq!(paginacao.itens_por_pagina, 10);
    assert_eq!(paginacao.quantidade_total_de_itens, 1);

    // 204 with an empty body is success.
    webhooks.delete(KEY).await.unwrap();

    let err = webhooks.fetch(KEY).await.unwrap_err();
    assert_eq!(err.status(), Some(StatusCode::NOT_FOUND));
}

#[tokio::test]
async fn webhook_on_unknown_key_is_rejected() {
    let (_mock, _base, session) = connected(mock_config()).await;

    let err = session
        .webhooks()
        .register("not-a-registered-key", "https://example.com/hook", false)
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(StatusCode::BAD_REQUEST));
}
