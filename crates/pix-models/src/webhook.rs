//! Webhook registrations bound to a PIX key (`/v2/webhook`).

use serde::{Deserialize, Serialize};

use crate::error::{ApiError, ProviderDiagnostics};

/// Header that asks the provider to skip the mTLS check when calling the
/// webhook URL.
pub const SKIP_MTLS_HEADER: &str = "x-skip-mtls-checking";

/// Body of `PUT /v2/webhook/{chave}`.
///
/// The key travels in the path only, never in the body.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct WebhookRegistration {
    pub webhook_url: String,
}

/// A webhook as returned by the provider.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Webhook {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub webhook_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chave: Option<String>,
    /// Registration timestamp (RFC 3339).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub criacao: Option<String>,
    #[serde(flatten)]
    pub api_error: ApiError,
}

impl ProviderDiagnostics for Webhook {
    fn api_error(&self) -> &ApiError {
        &self.api_error
    }
}

/// Query of `GET /v2/webhook`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WebhookQuery {
    /// Start of the creation window (RFC 3339).
    pub inicio: String,
    /// End of the creation window (RFC 3339).
    pub fim: String,
    pub pagina_atual: Option<u32>,
    pub itens_por_pagina: Option<u32>,
}

impl WebhookQuery {
    /// Webhooks created between `inicio` and `fim`.
    pub fn between(inicio: impl Into<String>, fim: impl Into<String>) -> Self {
        Self {
            inicio: inicio.into(),
            fim: fim.into(),
            ..Self::default()
        }
    }

    /// Request a specific page.
    #[must_use]
    pub fn page(mut self, pagina_atual: u32, itens_por_pagina: u32) -> Self {
        self.pagina_atual = Some(pagina_atual);
        self.itens_por_pagina = Some(itens_por_pagina);
        self
    }

    /// Query-string pairs in the provider's naming.
    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![("inicio", self.inicio.clone()), ("fim", self.fim.clone())];
        if let Some(page) = self.pagina_atual {
            pairs.push(("paginacao.paginaAtual", page.to_string()));
        }
        if let Some(per_page) = self.itens_por_pagina {
            pairs.push(("paginacao.itensPorPagina", per_page.to_string()));
        }
        pairs
    }
}

/// Response of `GET /v2/webhook`.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct WebhookList {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parametros: Option<Parametros>,
    #[serde(default)]
    pub webhooks: Vec<Webhook>,
    #[serde(flatten)]
    pub api_error: ApiError,
}

impl ProviderDiagnostics for WebhookList {
    fn api_error(&self) -> &ApiError {
        &self.api_error
    }
}

/// Echo of the query window and pagination state.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct Parametros {
    pub inicio: String,
    pub fim: String,
    pub paginacao: Paginacao,
}

/// Pagination state.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Paginacao {
    pub pagina_atual: u32,
    pub itens_por_pagina: u32,
    pub quantidade_de_paginas: u32,
    pub quantidade_total_de_itens: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registration_body_has_only_url() {
        let body = serde_json::to_value(WebhookRegistration {
            webhook_url: "https://example.com/pix".into(),
        })
        .unwrap();
        assert_eq!(body, serde_json::json!({"webhookUrl": "https://example.com/pix"}));
    }

    #[test]
    fn list_response_deserializes() {
        let body = r#"{
            "parametros": {
                "inicio": "2024-01-01T00:00:00Z",
                "fim": "2024-12-31T23:59:59Z",
                "paginacao": {"paginaAtual": 0, "itensPorPagina": 100, "quantidadeDePaginas": 1, "quantidadeTotalDeItens": 1}
            },
            "webhooks": [{"webhookUrl": "https://example.com/pix", "chave": "k1", "criacao": "2024-05-01T10:00:00Z"}]
        }"#;
        let list: WebhookList = serde_json::from_str(body).unwrap();
        assert_eq!(list.webhooks.len(), 1);
        assert_eq!(list.webhooks[0].chave.as_deref(), Some("k1"));
        assert_eq!(list.parametros.unwrap().paginacao.quantidade_total_de_itens, 1);
    }

    #[test]
    fn query_pairs_include_pagination_only_when_set() {
        let q = WebhookQuery::between("a", "b");
        assert_eq!(q.to_pairs().len(), 2);
        let q = q.page(2, 50);
        assert_eq!(
            q.to_pairs(),
            vec![
                ("inicio", "a".to_string()),
                ("fim", "b".to_string()),
                ("paginacao.paginaAtual", "2".to_string()),
                ("paginacao.itensPorPagina", "50".to_string()),
            ]
        );
    }
}
