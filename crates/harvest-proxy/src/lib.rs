pub mod agent;
pub mod client;
pub mod control;
pub mod fetch;
pub mod identity;
pub mod notify;
pub mod probe;

pub use agent::ChromeUserAgent;
pub use client::ProxyHttpClient;
pub use control::{ControlLink, ControlSession};
pub use fetch::ProxiedFetcher;
pub use identity::IdentityController;
pub use notify::EgressNotifier;
pub use probe::{probe_pool, PingProbe, ProbeStatus, StatusProbe};
