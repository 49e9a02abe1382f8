#[derive(Clone, PartialEq, ::prost::Message)]
pub struct CreateVacancyRequest {
    #[prost(string, tag = "1")]
    pub title: ::prost::alloc::string::String,
    #[prost(string, tag = "2")]
    pub company: ::prost::alloc::string::String,
    #[prost(string, tag = "3")]
    pub description: ::prost::alloc::string::String,
    /// Rendered as YYYY-MM-DD.
    #[prost(string, tag = "4")]
    pub posted_at: ::prost::alloc::string::String,
    #[prost(string, tag = "5")]
    pub location: ::prost::alloc::string::String,
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct CreateVacancyResponse {
    #[prost(int64, tag = "1")]
    pub id: i64,
    #[prost(string, tag = "2")]
    pub title: ::prost::alloc::string::String,
    #[prost(string, tag = "3")]
    pub company: ::prost::alloc::string::String,
    #[prost(string, tag = "4")]
    pub description: ::prost::alloc::string::String,
    #[prost(string, tag = "5")]
    pub posted_at: ::prost::alloc::string::String,
    #[prost(string, tag = "6")]
    pub location: ::prost::alloc::string::String,
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct DeleteVacancyRequest {
    #[prost(int64, tag = "1")]
    pub id: i64,
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct DeleteVacancyResponse {}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct PurgeVacanciesRequest {}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct PurgeVacanciesResponse {}
/// Client implementation for `vacancy.v1.VacancyService`.
pub mod vacancy_service_client {
    #![allow(unused_variables, dead_code, missing_docs, clippy::wildcard_imports)]
    use tonic::codegen::http::Uri;
    use tonic::codegen::*;

    #[derive(Debug, Clone)]
    pub struct VacancyServiceClient<T> {
        inner: tonic::client::Grpc<T>,
    }

    impl VacancyServiceClient<tonic::transport::Channel> {
        /// Attempt to create a new client by connecting to a given endpoint.
        pub async fn connect<D>(dst: D) -> Result<Self, tonic::transport::Error>
        where
            D: TryInto<tonic::transport::Endpoint>,
            D::Error: Into<StdError>,
        {
            let conn = tonic::transport::Endpoint::new(dst)?.connect().await?;
            Ok(Self::new(conn))
        }
    }

    impl<T> VacancyServiceClient<T>
    where
        T: tonic::client::GrpcService<tonic::body::BoxBody>,
        T::Error: Into<StdError>,
        T::ResponseBody: Body<Data = Bytes> + std::marker::Send + 'static,
        <T::ResponseBody as Body>::Error: Into<StdError> + std::marker::Send,
    {
        pub fn new(inner: T) -> Self {
            let inner = tonic::client::Grpc::new(inner);
            Self { inner }
        }

        pub fn with_origin(inner: T, origin: Uri) -> Self {
            let inner = tonic::client::Grpc::with_origin(inner, origin);
            Self { inner }
        }

        pub async fn create_vacancy(
            &mut self,
            request: impl tonic::IntoRequest<super::CreateVacancyRequest>,
        ) -> std::result::Result<tonic::Response<super::CreateVacancyResponse>, tonic::Status>
        {
            self.inner.ready().await.map_err(|e| {
                tonic::Status::new(
                    tonic::Code::Unknown,
                    format!("Service was not ready: {}", e.into()),
                )
            })?;
            let codec = tonic::codec::ProstCodec::default();
            let path = http::uri::PathAndQuery::from_static(
                "/vacancy.v1.VacancyService/CreateVacancy",
            );
            let mut req = request.into_request();
            req.extensions_mut()
                .insert(GrpcMethod::new("vacancy.v1.VacancyService", "CreateVacancy"));
            self.inner.unary(req, path, codec).await
        }

        pub async fn delete_vacancy(
            &mut self,
            request: impl tonic::IntoRequest<super::DeleteVacancyRequest>,
        ) -> std::result::Result<tonic::Response<super::DeleteVacancyResponse>, tonic::Status>
        {
            self.inner.ready().await.map_err(|e| {
                tonic::Status::new(
                    tonic::Code::Unknown,
                    format!("Service was not ready: {}", e.into()),
                )
            })?;
            let codec = tonic::codec::ProstCodec::default();
            let path = http::uri::PathAndQuery::from_static(
                "/vacancy.v1.VacancyService/DeleteVacancy",
            );
            let mut req = request.into_request();
            req.extensions_mut()
                .insert(GrpcMethod::new("vacancy.v1.VacancyService", "DeleteVacancy"));
            self.inner.unary(req, path, codec).await
        }

        pub async fn purge_vacancies(
            &mut self,
            request: impl tonic::IntoRequest<super::PurgeVacanciesRequest>,
        ) -> std::result::Result<tonic::Response<super::PurgeVacanciesResponse>, tonic::Status>
        {
            self.inner.ready().await.map_err(|e| {
                tonic::Status::new(
                    tonic::Code::Unknown,
                    format!("Service was not ready: {}", e.into()),
                )
            })?;
            let codec = tonic::codec::ProstCodec::default();
            let path = http::uri::PathAndQuery::from_static(
                "/vacancy.v1.VacancyService/PurgeVacancies",
            );
            let mut req = request.into_request();
            req.extensions_mut()
                .insert(GrpcMethod::new("vacancy.v1.VacancyService", "PurgeVacancies"));
            self.inner.unary(req, path, codec).await
        }
    }
}
