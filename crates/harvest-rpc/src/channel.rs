use std::str::FromStr;
use std::time::Duration;

use tonic::transport::{Certificate, Channel, ClientTlsConfig, Endpoint};

use harvest_core::AppError;

const RPC_TIMEOUT: Duration = Duration::from_secs(10);

/// Deployment environment, selecting the transport security of outbound
/// channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    /// Plaintext transport for local development.
    Dev,
    /// TLS over the system trust store, or an explicit CA certificate.
    Prod,
}

impl FromStr for Environment {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "dev" => Ok(Environment::Dev),
            "prod" => Ok(Environment::Prod),
            other => Err(AppError::ConfigError(format!(
                "unsupported environment {other:?}; must be \"prod\" or \"dev\""
            ))),
        }
    }
}

/// Open a channel to `address`, upgrading to TLS in `prod`.
///
/// `ca_file` optionally pins a CA certificate; without it the system trust
/// store validates the server.
pub async fn connect(
    env: Environment,
    address: &str,
    ca_file: Option<&str>,
) -> Result<Channel, AppError> {
    if address.is_empty() {
        return Err(AppError::ConfigError("server address is required".into()));
    }

    let uri = if address.contains("://") {
        address.to_string()
    } else {
        match env {
            Environment::Prod => format!("https://{address}"),
            Environment::Dev => format!("http://{address}"),
        }
    };

    let mut endpoint = Endpoint::from_shared(uri)
        .map_err(|e| AppError::ConfigError(format!("invalid server address {address}: {e}")))?
        .timeout(RPC_TIMEOUT)
        .connect_timeout(RPC_TIMEOUT);

    if env == Environment::Prod {
        let tls = match ca_file {
            Some(path) => {
                let pem = std::fs::read(path).map_err(|e| {
                    AppError::ConfigError(format!("read CA certificate {path}: {e}"))
                })?;
                ClientTlsConfig::new().ca_certificate(Certificate::from_pem(pem))
            }
            None => ClientTlsConfig::new().with_native_roots(),
        };
        endpoint = endpoint
            .tls_config(tls)
            .map_err(|e| AppError::RpcError(format!("tls config: {e}")))?;
    }

    let channel = endpoint
        .connect()
        .await
        .map_err(|e| AppError::RpcError(format!("connect to {address}: {e}")))?;

    tracing::info!(
        address = %address,
        tls = env == Environment::Prod,
        "connected to server"
    );
    Ok(channel)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_environment_parsing() {
        assert_eq!("dev".parse::<Environment>().unwrap(), Environment::Dev);
        assert_eq!("prod".parse::<Environment>().unwrap(), Environment::Prod);

        let err = "staging".parse::<Environment>().unwrap_err();
        assert!(err.to_string().contains("unsupported environment"));
    }

    #[tokio::test]
    async fn test_empty_address_is_rejected() {
        let err = connect(Environment::Dev, "", None).await.unwrap_err();
        assert!(matches!(err, AppError::ConfigError(_)));
    }
}
