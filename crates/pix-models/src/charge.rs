//! Immediate and due-date charges (`/v2/cob`).
//!
//! A [`Charge`] is both the request body sent to create a charge and the
//! document the provider returns.  Every field is optional on the wire; the
//! provider fills in `txid`, `status`, `loc`, `pixCopiaECola` and friends.

use serde::{Deserialize, Serialize};

use crate::error::{ApiError, ProviderDiagnostics};

// ---------------------------------------------------------------------------
// Charge
// ---------------------------------------------------------------------------

/// A PIX charge (`cob`).
///
/// # Examples
///
/// ```
/// use pix_models::Charge;
///
/// let charge = Charge::immediate("12.50", 3600)
///     .with_payer_request("Order #42");
/// let json = serde_json::to_value(&charge).unwrap();
/// assert_eq!(json["valor"]["original"], "12.50");
/// assert_eq!(json["calendario"]["expiracao"], 3600);
/// ```
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Charge {
    /// Charge type, e.g. `cob` or `cobv`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tipo_cob: Option<String>,
    /// Lifecycle status (`ATIVA`, `CONCLUIDA`, ...).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub calendario: Option<Calendario>,
    /// Payload location URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    /// Transaction identifier.  Empty means "let the provider assign one".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub txid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revisao: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub devedor: Option<Devedor>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pagador: Option<Pagador>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub valor: Option<Valor>,
    /// PIX key that receives the payment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chave: Option<String>,
    /// Free text shown to the payer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub solicitacao_pagador: Option<String>,
    /// "Copy and paste" BR Code.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pix_copia_e_cola: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub info_adicionais: Vec<InfoAdicional>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loc: Option<Loc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub favorecido: Option<Favorecido>,
    /// Provider diagnostics, present when the call failed.
    #[serde(flatten)]
    pub api_error: ApiError,
}

impl Charge {
    /// An immediate charge of `amount` (decimal string, e.g. `"10.00"`)
    /// expiring `expires_in_secs` seconds after creation.
    pub fn immediate(amount: impl Into<String>, expires_in_secs: u32) -> Self {
        Self {
            calendario: Some(Calendario {
                expiracao: Some(expires_in_secs),
                ..Calendario::default()
            }),
            valor: Some(Valor::original(amount)),
            ..Self::default()
        }
    }

    /// Set the transaction identifier (the charge is then created with PUT).
    #[must_use]
    pub fn with_txid(mut self, txid: impl Into<String>) -> Self {
        self.txid = Some(txid.into());
        self
    }

    /// Set the receiving PIX key.
    #[must_use]
    pub fn with_key(mut self, chave: impl Into<String>) -> Self {
        self.chave = Some(chave.into());
        self
    }

    /// Attach debtor details.
    #[must_use]
    pub fn with_debtor(mut self, devedor: Devedor) -> Self {
        self.devedor = Some(devedor);
        self
    }

    /// Set the free text shown to the payer.
    #[must_use]
    pub fn with_payer_request(mut self, text: impl Into<String>) -> Self {
        self.solicitacao_pagador = Some(text.into());
        self
    }

    /// Append an additional-information entry.
    #[must_use]
    pub fn with_info(mut self, nome: impl Into<String>, valor: impl Into<String>) -> Self {
        self.info_adicionais.push(InfoAdicional {
            nome: nome.into(),
            valor: valor.into(),
        });
        self
    }

    /// The transaction identifier, treating an empty string as absent.
    pub fn txid(&self) -> Option<&str> {
        self.txid.as_deref().filter(|t| !t.is_empty())
    }

    /// The receiving key, treating an empty string as absent.
    pub fn key(&self) -> Option<&str> {
        self.chave.as_deref().filter(|k| !k.is_empty())
    }
}

impl ProviderDiagnostics for Charge {
    fn api_error(&self) -> &ApiError {
        &self.api_error
    }
}

// ---------------------------------------------------------------------------
// Nested types
// ---------------------------------------------------------------------------

/// Creation and expiry information.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Calendario {
    /// Creation timestamp (RFC 3339), set by the provider.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub criacao: Option<String>,
    /// Lifetime in seconds for immediate charges.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiracao: Option<u32>,
    /// Due date (`YYYY-MM-DD`) for due-date charges.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_de_vencimento: Option<String>,
    /// Days the charge stays payable after the due date.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validade_apos_vencimento: Option<u32>,
}

/// Debtor identity and address.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct Devedor {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpf: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cnpj: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nome: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logradouro: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cidade: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uf: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cep: Option<String>,
}

impl Devedor {
    /// An individual debtor identified by CPF.
    pub fn person(cpf: impl Into<String>, nome: impl Into<String>) -> Self {
        Self {
            cpf: Some(cpf.into()),
            nome: Some(nome.into()),
            ..Self::default()
        }
    }

    /// A company debtor identified by CNPJ.
    pub fn company(cnpj: impl Into<String>, nome: impl Into<String>) -> Self {
        Self {
            cnpj: Some(cnpj.into()),
            nome: Some(nome.into()),
            ..Self::default()
        }
    }
}

/// Amount, with the optional penalty/interest/discount rules of due-date
/// charges.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct Valor {
    /// Decimal amount as a string, e.g. `"10.00"`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub multa: Option<Modalidade>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub juros: Option<Modalidade>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub desconto: Option<Desconto>,
}

impl Valor {
    /// A plain amount.
    pub fn original(amount: impl Into<String>) -> Self {
        Self {
            original: Some(amount.into()),
            ..Self::default()
        }
    }
}

/// Penalty (`multa`) or interest (`juros`) rule.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Modalidade {
    pub modalidade: u8,
    pub valor_perc: String,
}

/// Discount rule.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Desconto {
    pub modalidade: u8,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub desconto_data_fixa: Vec<DescontoDataFixa>,
}

/// A fixed-date discount step.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DescontoDataFixa {
    pub data: String,
    pub valor_perc: String,
}

/// Free-form name/value pair shown to the payer.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct InfoAdicional {
    pub nome: String,
    pub valor: String,
}

/// Payload location attached to a charge.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Loc {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tipo_cob: Option<String>,
}

/// Payer details reported on a settled charge.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Pagador {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chave: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub info_pagador: Option<String>,
}

/// Receiving party.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct Favorecido {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chave: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_response_deserializes() {
        let body = r#"{
            "calendario": {"criacao": "2024-10-01T12:00:00.000Z", "expiracao": 3600},
            "txid": "7978c0c97ea847e78e8849634473c1f1",
            "revisao": 0,
            "loc": {"id": 789, "location": "pix.example.com/qr/9d36b84f", "tipoCob": "cob"},
            "location": "pix.example.com/qr/9d36b84f",
            "status": "ATIVA",
            "devedor": {"cnpj": "12345678000195", "nome": "Empresa de Serviços SA"},
            "valor": {"original": "37.00"},
            "chave": "7d9f0335-8dcc-4054-9bf9-0dbd61d36906",
            "solicitacaoPagador": "Serviço realizado.",
            "pixCopiaECola": "00020101021226830014BR.GOV.BCB.PIX"
        }"#;
        let charge: Charge = serde_json::from_str(body).unwrap();
        assert_eq!(charge.txid(), Some("7978c0c97ea847e78e8849634473c1f1"));
        assert_eq!(charge.loc.as_ref().and_then(|l| l.id), Some(789));
        assert_eq!(
            charge.valor.as_ref().and_then(|v| v.original.as_deref()),
            Some("37.00")
        );
        assert!(!charge.has_api_error());
    }

    #[test]
    fn error_fields_land_in_api_error() {
        let body = r#"{"nome": "cobranca_nao_encontrada", "mensagem": "Nenhuma cobrança encontrada"}"#;
        let charge: Charge = serde_json::from_str(body).unwrap();
        assert!(charge.has_api_error());
        assert_eq!(charge.api_error().name.as_deref(), Some("cobranca_nao_encontrada"));
    }

    #[test]
    fn request_body_omits_unset_fields() {
        let charge = Charge::immediate("1.00", 600).with_key("my-key");
        let json = serde_json::to_value(&charge).unwrap();
        let obj = json.as_object().unwrap();
        let mut keys: Vec<&str> = obj.keys().map(String::as_str).collect();
        keys.sort_unstable();
        assert_eq!(keys, vec!["calendario", "chave", "valor"]);
    }

    #[test]
    fn empty_txid_and_key_are_absent() {
        let charge = Charge::default().with_txid("").with_key("");
        assert_eq!(charge.txid(), None);
        assert_eq!(charge.key(), None);
    }

    #[test]
    fn due_date_value_roundtrips_discounts() {
        let valor = Valor {
            original: Some("100.00".into()),
            multa: Some(Modalidade {
                modalidade: 2,
                valor_perc: "15.00".into(),
            }),
            juros: None,
            desconto: Some(Desconto {
                modalidade: 1,
                desconto_data_fixa: vec![DescontoDataFixa {
                    data: "2024-12-01".into(),
                    valor_perc: "5.00".into(),
                }],
            }),
        };
        let json = serde_json::to_value(&valor).unwrap();
        assert_eq!(json["multa"]["valorPerc"], "15.00");
        assert_eq!(json["desconto"]["descontoDataFixa"][0]["data"], "2024-12-01");
        assert!(json.get("juros").is_none());
    }
}
