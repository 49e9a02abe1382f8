use tonic::metadata::{Ascii, MetadataValue};
use tonic::transport::Channel;
use tonic::Request;

use harvest_core::traits::VacancyClient;
use harvest_core::AppError;

use crate::channel::{self, Environment};
use crate::pb::vacancy::vacancy_service_client::VacancyServiceClient;
use crate::pb::vacancy::{
    CreateVacancyRequest, CreateVacancyResponse, DeleteVacancyRequest, PurgeVacanciesRequest,
};

/// Thin typed adapter over the vacancy service stub.
///
/// Every call carries `authorization: Bearer <token>` request metadata; the
/// token is supplied per call because it is only valid for one forwarding
/// cycle.
#[derive(Clone)]
pub struct OutboundVacancyClient {
    client: VacancyServiceClient<Channel>,
}

impl OutboundVacancyClient {
    pub async fn connect(
        env: Environment,
        address: &str,
        ca_file: Option<&str>,
    ) -> Result<Self, AppError> {
        let channel = channel::connect(env, address, ca_file).await?;
        Ok(Self {
            client: VacancyServiceClient::new(channel),
        })
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn create(
        &self,
        token: &str,
        title: &str,
        company: &str,
        description: &str,
        posted_at: &str,
        location: &str,
    ) -> Result<CreateVacancyResponse, AppError> {
        let mut request = Request::new(CreateVacancyRequest {
            title: title.to_string(),
            company: company.to_string(),
            description: description.to_string(),
            posted_at: posted_at.to_string(),
            location: location.to_string(),
        });
        attach_bearer(&mut request, token)?;

        let mut client = self.client.clone();
        let response = client
            .create_vacancy(request)
            .await
            .map_err(|status| AppError::RpcError(format!("create vacancy: {}", status.message())))?;
        Ok(response.into_inner())
    }

    pub async fn delete(&self, token: &str, id: i64) -> Result<(), AppError> {
        let mut request = Request::new(DeleteVacancyRequest { id });
        attach_bearer(&mut request, token)?;

        let mut client = self.client.clone();
        client
            .delete_vacancy(request)
            .await
            .map_err(|status| AppError::RpcError(format!("delete vacancy: {}", status.message())))?;
        Ok(())
    }

    pub async fn purge(&self, token: &str) -> Result<(), AppError> {
        let mut request = Request::new(PurgeVacanciesRequest {});
        attach_bearer(&mut request, token)?;

        let mut client = self.client.clone();
        client
            .purge_vacancies(request)
            .await
            .map_err(|status| AppError::RpcError(format!("purge vacancies: {}", status.message())))?;
        Ok(())
    }
}

impl VacancyClient for OutboundVacancyClient {
    async fn create_vacancy(
        &self,
        token: &str,
        title: &str,
        company: &str,
        description: &str,
        posted_at: &str,
        location: &str,
    ) -> Result<i64, AppError> {
        let response = self
            .create(token, title, company, description, posted_at, location)
            .await?;
        Ok(response.id)
    }
}

fn attach_bearer<T>(request: &mut Request<T>, token: &str) -> Result<(), AppError> {
    let value: MetadataValue<Ascii> = format!("Bearer {token}")
        .parse()
        .map_err(|_| AppError::RpcError("invalid bearer token metadata".into()))?;
    request.metadata_mut().insert("authorization", value);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bearer_metadata_is_attached() {
        let mut request = Request::new(PurgeVacanciesRequest {});
        attach_bearer(&mut request, "jwt-123").unwrap();

        let value = request.metadata().get("authorization").unwrap();
        assert_eq!(value.to_str().unwrap(), "Bearer jwt-123");
    }

    #[test]
    fn test_non_ascii_token_is_rejected() {
        let mut request = Request::new(PurgeVacanciesRequest {});
        assert!(attach_bearer(&mut request, "jwt\u{1F512}").is_err());
    }
}
