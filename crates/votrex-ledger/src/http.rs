//! HTTP ledger gateway
//!
//! Talks to a JSON relay in front of the VotreX contracts. Reads post to
//! `/read` and get the raw contract tuple back; writes post to `/write` and get
//! the transaction hash. Tuples go through [`crate::codec`] before leaving
//! this module.

use crate::codec::{decode_organization, decode_user_info};
use crate::error::{RemoteError, Result};
use crate::gateway::{LedgerGateway, LedgerMutation, LedgerQuery, LedgerValue};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, instrument};
use votrex_types::{Receipt, WalletAddress};

/// Call envelope understood by the relay.
#[derive(Debug, Serialize)]
struct ContractCall<'a> {
    function: &'a str,
    args: Vec<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    from: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct ReadResponse {
    result: Vec<Value>,
}

#[derive(Debug, Deserialize)]
struct WriteResponse {
    tx_hash: String,
}

/// Gateway backed by the ledger relay
pub struct HttpLedgerGateway {
    client: Client,
    base_url: String,
    sender: Option<WalletAddress>,
}

impl HttpLedgerGateway {
    /// Create a gateway posting to `endpoint`.
    pub fn new(endpoint: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url: endpoint.trim_end_matches('/').to_string(),
            sender: None,
        })
    }

    /// Account that signs writes and scopes organization reads.
    pub fn with_sender(mut self, sender: WalletAddress) -> Self {
        self.sender = Some(sender);
        self
    }

    #[instrument(skip(self), fields(function = query.function_name()))]
    async fn read_tuple(&self, query: &LedgerQuery) -> Result<Vec<Value>> {
        let call = match query {
            LedgerQuery::OrganizationData { org_id } => ContractCall {
                function: query.function_name(),
                args: vec![Value::String(org_id.to_string())],
                from: self.sender.as_ref().map(|s| s.as_str()),
            },
            LedgerQuery::UserInfo { caller } => ContractCall {
                function: query.function_name(),
                args: vec![],
                from: Some(caller.as_str()),
            },
        };

        let response: ReadResponse = self.post("/read", &call).await?;
        debug!(fields = response.result.len(), "Ledger read returned");
        Ok(response.result)
    }

    async fn post<B: Serialize, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);
        let response = self.client.post(&url).json(body).send().await?;
        self.handle_response(response).await
    }

    async fn handle_response<T: DeserializeOwned>(&self, response: reqwest::Response) -> Result<T> {
        let status = response.status();

        if status.is_success() {
            Ok(response.json().await?)
        } else {
            let message = response.text().await.unwrap_or_default();
            Err(RemoteError::Status {
                status: status.as_u16(),
                message,
            })
        }
    }
}

#[async_trait]
impl LedgerGateway for HttpLedgerGateway {
    async fn read(&self, query: LedgerQuery) -> Result<LedgerValue> {
        let tuple = self.read_tuple(&query).await?;

        match query {
            LedgerQuery::OrganizationData { .. } => {
                decode_organization(&tuple).map(LedgerValue::Organization)
            }
            LedgerQuery::UserInfo { .. } => decode_user_info(&tuple).map(LedgerValue::User),
        }
    }

    #[instrument(skip(self), fields(function = mutation.function_name()))]
    async fn write(&self, mutation: LedgerMutation) -> Result<Receipt> {
        let function = mutation.function_name();
        let call = ContractCall {
            function,
            args: vec![Value::String(mutation.target.destination().to_string())],
            from: self.sender.as_ref().map(|s| s.as_str()),
        };

        let result: Result<WriteResponse> = self.post("/write", &call).await;
        match result {
            Ok(response) => Ok(Receipt {
                tx_hash: response.tx_hash,
                function: function.to_string(),
            }),
            // The relay answers a reverted transaction with 422.
            Err(RemoteError::Status { status, message })
                if status == StatusCode::UNPROCESSABLE_ENTITY.as_u16() =>
            {
                Err(RemoteError::Rejected {
                    function: function.to_string(),
                    reason: message,
                })
            }
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use votrex_types::{ConfigTarget, ConfigTargetKind, OrgId};
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_endpoint_normalization() {
        let gateway = HttpLedgerGateway::new("http://localhost:8545/", Duration::from_secs(5)).unwrap();
        assert_eq!(gateway.base_url, "http://localhost:8545");
    }

    #[tokio::test]
    async fn test_organization_read_decodes_tuple() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/read"))
            .and(body_json(json!({
                "function": "organizationData",
                "args": ["ORG1"],
                "from": "0xABC"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "result": ["ORG1", "0xABC", "Org One", "7", 1, true]
            })))
            .mount(&server)
            .await;

        let gateway = HttpLedgerGateway::new(&server.uri(), Duration::from_secs(5))
            .unwrap()
            .with_sender(WalletAddress::new("0xABC"));
        let record = gateway
            .organization_data(&OrgId::new("ORG1").unwrap())
            .await
            .unwrap();

        assert!(record.exists);
        assert_eq!(record.member_count, 7);
        assert_eq!(record.admin, WalletAddress::new("0xabc"));
    }

    #[tokio::test]
    async fn test_user_info_read_is_scoped_to_caller() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/read"))
            .and(body_json(json!({
                "function": "getUserInfo",
                "args": [],
                "from": "0xDEF"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "result": ["bob", false]
            })))
            .mount(&server)
            .await;

        let gateway = HttpLedgerGateway::new(&server.uri(), Duration::from_secs(5)).unwrap();
        let info = gateway.user_info(&WalletAddress::new("0xDEF")).await.unwrap();
        assert!(!info.is_admin);
    }

    #[tokio::test]
    async fn test_write_returns_receipt() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/write"))
            .and(body_json(json!({
                "function": "setStakingContract",
                "args": ["0xAAA"]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "tx_hash": "0xfeed"
            })))
            .mount(&server)
            .await;

        let gateway = HttpLedgerGateway::new(&server.uri(), Duration::from_secs(5)).unwrap();
        let receipt = gateway
            .write(LedgerMutation::new(ConfigTarget::new(
                ConfigTargetKind::StakingContract,
                "0xAAA",
            )))
            .await
            .unwrap();

        assert_eq!(receipt.tx_hash, "0xfeed");
        assert_eq!(receipt.function, "setStakingContract");
    }

    #[tokio::test]
    async fn test_reverted_write_is_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/write"))
            .respond_with(ResponseTemplate::new(422).set_body_string("Ownable: caller is not the owner"))
            .mount(&server)
            .await;

        let gateway = HttpLedgerGateway::new(&server.uri(), Duration::from_secs(5)).unwrap();
        let err = gateway
            .write(LedgerMutation::new(ConfigTarget::new(
                ConfigTargetKind::DexContract,
                "0xAAA",
            )))
            .await
            .unwrap_err();

        match err {
            RemoteError::Rejected { function, reason } => {
                assert_eq!(function, "setDexContract");
                assert!(reason.contains("not the owner"));
            }
            other => panic!("expected rejection, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_server_error_surfaces_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/read"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let gateway = HttpLedgerGateway::new(&server.uri(), Duration::from_secs(5)).unwrap();
        let err = gateway
            .organization_data(&OrgId::new("ORG1").unwrap())
            .await
            .unwrap_err();

        assert!(matches!(err, RemoteError::Status { status: 503, .. }));
    }
}
