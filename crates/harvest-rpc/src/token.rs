use tonic::transport::Channel;

use harvest_core::traits::TokenClient;
use harvest_core::AppError;

use crate::channel::{self, Environment};
use crate::pb::auth::token_service_client::TokenServiceClient;
use crate::pb::auth::GenerateTokenRequest;

/// Thin typed adapter over the token service stub.
#[derive(Clone)]
pub struct OutboundTokenClient {
    client: TokenServiceClient<Channel>,
}

impl OutboundTokenClient {
    pub async fn connect(
        env: Environment,
        address: &str,
        ca_file: Option<&str>,
    ) -> Result<Self, AppError> {
        let channel = channel::connect(env, address, ca_file).await?;
        Ok(Self {
            client: TokenServiceClient::new(channel),
        })
    }
}

impl TokenClient for OutboundTokenClient {
    async fn generate(&self, issuer: &str, scopes: &[String]) -> Result<String, AppError> {
        let request = GenerateTokenRequest {
            issuer: issuer.to_string(),
            scopes: scopes.to_vec(),
        };

        let mut client = self.client.clone();
        let response = client
            .generate(request)
            .await
            .map_err(|status| AppError::RpcError(format!("generate token: {}", status.message())))?;

        Ok(response.into_inner().token)
    }
}
