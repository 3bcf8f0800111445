//! Tunnel provider configuration.

use std::time::Duration;

/// How a provider reports its assigned public URL.
#[derive(Debug, Clone)]
pub enum Discovery {
    /// The provider prints the URL somewhere in its stdout/stderr stream.
    Stream,
    /// The provider exposes a local HTTP API listing active tunnels.
    QueryApi {
        /// Endpoint returning `{"tunnels": [{"public_url": ...}]}`.
        endpoint: String,
        /// Delay before the first poll, giving the provider time to register.
        grace: Duration,
    },
}

/// One externally invoked tunnel provider.
#[derive(Debug, Clone)]
pub struct Provider {
    /// Short name used in logs and manual instructions.
    pub name: String,
    /// Program to execute.
    pub program: String,
    /// Arguments, already bound to the local port.
    pub args: Vec<String>,
    /// URL discovery mode.
    pub discovery: Discovery,
}

impl Provider {
    /// The full command line, as an operator would type it.
    pub fn command_line(&self) -> String {
        let mut parts = vec![self.program.clone()];
        parts.extend(self.args.iter().cloned());
        parts.join(" ")
    }
}

/// Provider cascade configuration.
#[derive(Debug, Clone)]
pub struct TunnelSettings {
    /// Providers in strict priority order; attempted one at a time, never
    /// in parallel (only one forward may hold the port).
    pub providers: Vec<Provider>,
}

impl TunnelSettings {
    /// Grace period before polling a query-API provider.
    pub const DEFAULT_GRACE: Duration = Duration::from_secs(3);

    /// Default cascade: ngrok (query API), then serveo over ssh (stream).
    pub fn defaults(port: u16) -> Self {
        Self {
            providers: vec![
                Provider {
                    name: "ngrok".into(),
                    program: "ngrok".into(),
                    args: vec!["http".into(), port.to_string()],
                    discovery: Discovery::QueryApi {
                        endpoint: "http://127.0.0.1:4040/api/tunnels".into(),
                        grace: Self::DEFAULT_GRACE,
                    },
                },
                Provider {
                    name: "serveo".into(),
                    program: "ssh".into(),
                    args: vec![
                        "-o".into(),
                        "StrictHostKeyChecking=no".into(),
                        "-R".into(),
                        format!("80:localhost:{port}"),
                        "serveo.net".into(),
                    ],
                    discovery: Discovery::Stream,
                },
            ],
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic, clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn default_cascade_order() {
        let settings = TunnelSettings::defaults(8080);

        let names: Vec<&str> = settings.providers.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["ngrok", "serveo"]);
    }

    #[test]
    fn providers_bind_the_requested_port() {
        let settings = TunnelSettings::defaults(9000);

        assert_eq!(settings.providers[0].command_line(), "ngrok http 9000");
        assert_eq!(
            settings.providers[1].command_line(),
            "ssh -o StrictHostKeyChecking=no -R 80:localhost:9000 serveo.net"
        );
    }

    #[test]
    fn query_api_provider_carries_the_grace_period() {
        let settings = TunnelSettings::defaults(8080);

        match &settings.providers[0].discovery {
            Discovery::QueryApi { endpoint, grace } => {
                assert_eq!(endpoint, "http://127.0.0.1:4040/api/tunnels");
                assert_eq!(*grace, TunnelSettings::DEFAULT_GRACE);
            }
            Discovery::Stream => panic!("ngrok should use the query API"),
        }
    }
}
