use super::*;

fn sh_provider(name: &str, script: &str) -> Provider {
    Provider {
        name: name.into(),
        program: "sh".into(),
        args: vec!["-c".into(), script.into()],
        discovery: Discovery::Stream,
    }
}

fn supervisor_with(providers: Vec<Provider>) -> (TunnelSupervisor, Arc<TunnelState>) {
    let state = Arc::new(TunnelState::new());
    let supervisor = TunnelSupervisor::new(
        TunnelSettings { providers },
        8080,
        Arc::clone(&state),
    );
    (supervisor, state)
}

#[cfg(unix)]
#[tokio::test]
async fn stream_provider_publishes_the_first_url() {
    let provider = sh_provider(
        "fake",
        "echo 'connecting...'; \
         echo 'forwarding to https://abc123.example.tld'; \
         echo 'https://abc123.example.tld'",
    );
    let (supervisor, state) = supervisor_with(vec![provider.clone()]);

    let outcome = supervisor.attempt(&provider).await.expect("attempt");

    assert!(outcome.established);
    assert_eq!(
        state.current().await.as_deref(),
        Some("https://abc123.example.tld")
    );
}

#[cfg(unix)]
#[tokio::test]
async fn stderr_is_scanned_too() {
    let provider = sh_provider("noisy", "echo 'ready at https://err.example.tld' >&2");
    let (supervisor, state) = supervisor_with(vec![provider.clone()]);

    let outcome = supervisor.attempt(&provider).await.expect("attempt");

    assert!(outcome.established);
    assert_eq!(
        state.current().await.as_deref(),
        Some("https://err.example.tld")
    );
}

#[cfg(unix)]
#[tokio::test]
async fn urlless_exit_advances_the_cascade() {
    let silent = sh_provider("silent", "true");
    let talker = sh_provider("talker", "echo 'https://fallback.example.tld'");
    let (supervisor, state) = supervisor_with(vec![silent, talker]);

    supervisor.run().await;

    assert_eq!(
        state.current().await.as_deref(),
        Some("https://fallback.example.tld")
    );
}

#[tokio::test]
async fn spawn_failure_is_reported_as_such() {
    let missing = Provider {
        name: "missing".into(),
        program: "waymark-test-no-such-binary".into(),
        args: vec![],
        discovery: Discovery::Stream,
    };
    let (supervisor, _state) = supervisor_with(vec![missing.clone()]);

    let error = supervisor.attempt(&missing).await.expect_err("spawn");

    assert!(matches!(error, TunnelError::Spawn(_)));
}

#[tokio::test]
async fn all_providers_failing_leaves_the_state_unset() {
    let missing = Provider {
        name: "missing".into(),
        program: "waymark-test-no-such-binary".into(),
        args: vec![],
        discovery: Discovery::Stream,
    };
    let also_missing = Provider {
        name: "also-missing".into(),
        program: "waymark-test-no-such-binary-either".into(),
        args: vec![],
        discovery: Discovery::QueryApi {
            endpoint: "http://127.0.0.1:1/api/tunnels".into(),
            grace: Duration::from_millis(10),
        },
    };
    let (supervisor, state) = supervisor_with(vec![missing, also_missing]);

    supervisor.run().await;

    assert!(state.current().await.is_none());
}

#[cfg(unix)]
#[tokio::test]
async fn query_api_failure_fails_the_attempt_without_publishing() {
    // The process stands in for a provider whose local API never comes up;
    // nothing listens on the polled endpoint.
    let provider = Provider {
        name: "fake-api".into(),
        program: "sleep".into(),
        args: vec!["30".into()],
        discovery: Discovery::QueryApi {
            endpoint: "http://127.0.0.1:1/api/tunnels".into(),
            grace: Duration::from_millis(10),
        },
    };
    let (supervisor, state) = supervisor_with(vec![provider.clone()]);

    let error = supervisor.attempt(&provider).await.expect_err("poll");

    assert!(matches!(error, TunnelError::QueryApi(_)));
    assert!(state.current().await.is_none());
}
