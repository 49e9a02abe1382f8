//! Lazy wiring of the component graph.
//!
//! Every node initializes exactly once on first access and is cached for
//! the life of the process. The graph is a DAG: config → proxy client →
//! identity controller → pipelines, and config → database/RPC → scheduler.

use std::sync::{Arc, OnceLock};
use std::time::Duration;

use tokio::sync::OnceCell;

use harvest_core::parse::{AlfaParser, BetaParser, RssParser, SitemapParser};
use harvest_core::traits::TokenClient;
use harvest_core::{
    AppError, ForwardingScheduler, PipelineOrchestrator, RetryPolicy, SitemapIngester,
    SourcePipeline,
};
use harvest_db::{Database, MongoUrlStore, MongoVacancyStore};
use harvest_proxy::{
    ChromeUserAgent, ControlSession, EgressNotifier, IdentityController, PingProbe,
    ProxiedFetcher, ProxyHttpClient,
};
use harvest_rpc::{Environment, OutboundTokenClient, OutboundVacancyClient};

use crate::config::AppConfig;

const HTTP_TIMEOUT: Duration = Duration::from_secs(10);
const CONTROL_TIMEOUT: Duration = Duration::from_secs(10);
const FORWARD_BATCH_SIZE: usize = 5;
const FORWARD_TICKER: Duration = Duration::from_secs(15);
const TOKEN_SCOPES: &[&str] = &["write"];

type Rotator = Arc<IdentityController<PingProbe, ControlSession>>;

type RssIngester = SitemapIngester<ProxiedFetcher, RssParser, EgressNotifier, MongoUrlStore>;
type XmlIngester = SitemapIngester<ProxiedFetcher, SitemapParser, EgressNotifier, MongoUrlStore>;

type AlfaPipeline =
    SourcePipeline<RssIngester, Rotator, MongoUrlStore, MongoVacancyStore, ProxiedFetcher, AlfaParser>;
type BetaPipeline =
    SourcePipeline<XmlIngester, Rotator, MongoUrlStore, MongoVacancyStore, ProxiedFetcher, BetaParser>;

pub type Forwarder =
    ForwardingScheduler<MongoVacancyStore, OutboundTokenClient, OutboundVacancyClient>;

/// Application container holding single instances of every shared node.
pub struct App {
    config: AppConfig,
    http: OnceLock<ProxyHttpClient>,
    database: OnceCell<Database>,
    rotator: OnceCell<Rotator>,
    token_client: OnceCell<OutboundTokenClient>,
    vacancy_client: OnceCell<OutboundVacancyClient>,
}

impl App {
    pub fn new(config: AppConfig) -> Self {
        Self {
            config,
            http: OnceLock::new(),
            database: OnceCell::new(),
            rotator: OnceCell::new(),
            token_client: OnceCell::new(),
            vacancy_client: OnceCell::new(),
        }
    }

    fn http(&self) -> &ProxyHttpClient {
        self.http.get_or_init(|| {
            ProxyHttpClient::new(
                self.config.proxy.host.clone(),
                self.config.proxy.port.clone(),
                HTTP_TIMEOUT,
                ChromeUserAgent::new(),
            )
        })
    }

    async fn database(&self) -> Result<&Database, AppError> {
        self.database
            .get_or_try_init(|| Database::connect(self.config.mongo.clone()))
            .await
    }

    async fn rotator(&self) -> Result<&Rotator, AppError> {
        self.rotator
            .get_or_try_init(|| async {
                let address = format!(
                    "{}:{}",
                    self.config.proxy.host, self.config.proxy.control_port
                );
                let session = ControlSession::new(
                    address,
                    self.config.proxy.control_password.clone(),
                    CONTROL_TIMEOUT,
                )?;
                let probe = PingProbe::new(
                    self.config.proxy.host.clone(),
                    self.config.proxy.port.clone(),
                    self.config.proxy.ping_url.clone(),
                    ChromeUserAgent::new(),
                );
                Ok(Arc::new(IdentityController::new(
                    probe,
                    session,
                    RetryPolicy::default(),
                    self.http().clone(),
                )))
            })
            .await
    }

    fn environment(&self) -> Result<Environment, AppError> {
        self.config.env.parse()
    }

    async fn token_client(&self) -> Result<&OutboundTokenClient, AppError> {
        self.token_client
            .get_or_try_init(|| async {
                OutboundTokenClient::connect(self.environment()?, &self.config.auth.address, None)
                    .await
            })
            .await
    }

    pub async fn vacancy_client(&self) -> Result<&OutboundVacancyClient, AppError> {
        self.vacancy_client
            .get_or_try_init(|| async {
                OutboundVacancyClient::connect(
                    self.environment()?,
                    &self.config.vacancy_server.address,
                    None,
                )
                .await
            })
            .await
    }

    /// Issue a fresh bearer token with the configured issuer and scopes.
    pub async fn generate_token(&self) -> Result<String, AppError> {
        let scopes: Vec<String> = TOKEN_SCOPES.iter().map(|s| s.to_string()).collect();
        self.token_client()
            .await?
            .generate(&self.config.auth.issuer, &scopes)
            .await
    }

    /// Build the orchestrator with both source pipelines registered.
    pub async fn orchestrator(&self) -> Result<PipelineOrchestrator, AppError> {
        let database = self.database().await?;
        let url_store = database.url_store();
        let vacancy_store = database.vacancy_store();
        let rotator = self.rotator().await?.clone();
        let fetcher = ProxiedFetcher::new(self.http().clone());
        let notifier = EgressNotifier::new(self.http().clone(), self.config.proxy.ping_url.clone());

        let orchestrator = PipelineOrchestrator::new(self.config.sources.batch_size);

        let alfa: AlfaPipeline = SourcePipeline::new(
            "alfa",
            self.config.sources.alfa_sitemap_url.clone(),
            SitemapIngester::new(
                fetcher.clone(),
                RssParser::new(),
                notifier.clone(),
                url_store.clone(),
            ),
            rotator.clone(),
            url_store.clone(),
            vacancy_store.clone(),
            fetcher.clone(),
            AlfaParser::new(),
        );
        orchestrator.register("alfa", Arc::new(alfa))?;

        let beta: BetaPipeline = SourcePipeline::new(
            "beta",
            self.config.sources.beta_sitemap_url.clone(),
            SitemapIngester::new(
                fetcher.clone(),
                SitemapParser::new(),
                notifier,
                url_store.clone(),
            ),
            rotator,
            url_store,
            vacancy_store,
            fetcher,
            BetaParser::new(),
        );
        orchestrator.register("beta", Arc::new(beta))?;

        Ok(orchestrator)
    }

    /// Build the forwarding scheduler over the shared stores and clients.
    pub async fn forwarder(&self) -> Result<Forwarder, AppError> {
        let database = self.database().await?;
        let tokens = self.token_client().await?.clone();
        let rpc = self.vacancy_client().await?.clone();
        let scopes: Vec<String> = TOKEN_SCOPES.iter().map(|s| s.to_string()).collect();

        Ok(ForwardingScheduler::new(
            database.vacancy_store(),
            tokens,
            rpc,
            FORWARD_BATCH_SIZE,
            self.config.auth.issuer.clone(),
            scopes,
            FORWARD_TICKER,
        ))
    }

    /// Release long-lived resources, bounded so shutdown cannot hang.
    pub async fn shutdown(&self) {
        if let Some(database) = self.database.get() {
            let _ = tokio::time::timeout(Duration::from_secs(5), database.shutdown()).await;
        }
    }
}
