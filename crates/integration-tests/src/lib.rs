pub mod llms;

use std::{net::SocketAddr, sync::Once, time::Duration};

use config::Config;
use server::ServeConfig;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

pub use llms::{LlmMock, LlmMockHandle, ReceivedRequest};

static INIT: Once = Once::new();

#[ctor::ctor]
fn init_crypto_provider() {
    INIT.call_once(|| {
        rustls::crypto::aws_lc_rs::default_provider()
            .install_default()
            .expect("Failed to install default crypto provider");
    });
}

/// Test client for making HTTP requests to the test server
#[derive(Clone)]
pub struct TestClient {
    base_url: String,
    client: reqwest::Client,
}

impl TestClient {
    /// Create a new test client for the given base URL
    pub fn new(base_url: String) -> Self {
        Self {
            base_url,
            client: reqwest::Client::new(),
        }
    }

    /// Send a POST request to the given path with JSON body
    pub async fn post<T: serde::Serialize>(&self, path: &str, body: &T) -> reqwest::Response {
        self.client
            .post(format!("{}{}", self.base_url, path))
            .json(body)
            .send()
            .await
            .unwrap()
    }

    /// Send a GET request to the given path
    pub async fn get(&self, path: &str) -> reqwest::Response {
        self.client
            .get(format!("{}{}", self.base_url, path))
            .send()
            .await
            .unwrap()
    }

    /// Send a GET request to the given path, returning Result instead of panicking
    pub async fn try_get(&self, path: &str) -> reqwest::Result<reqwest::Response> {
        self.client.get(format!("{}{}", self.base_url, path)).send().await
    }

    /// Create a request with the given method and path
    pub fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        self.client.request(method, format!("{}{}", self.base_url, path))
    }
}

/// Test server that manages the lifecycle of a server instance
pub struct TestServer {
    pub client: TestClient,
    pub address: SocketAddr,
    /// Configuration used by this test server
    pub config: Config,
    /// Cancellation tokens for the mock providers
    test_service_tokens: Vec<CancellationToken>,
    _server_task_handle: tokio::task::JoinHandle<()>,
    shutdown_signal: CancellationToken,
}

impl TestServer {
    pub fn builder() -> TestServerBuilder {
        TestServerBuilder::default()
    }

    /// Start a new test server with the given TOML configuration
    pub async fn start(config_toml: &str) -> Self {
        Self::start_with_services(config_toml, Vec::new()).await
    }

    async fn start_with_services(config_toml: &str, test_service_tokens: Vec<CancellationToken>) -> Self {
        // Go through the real loader so validation and env expansion apply
        let temp_dir = tempfile::tempdir().unwrap();
        let config_path = temp_dir.path().join("config.toml");
        std::fs::write(&config_path, config_toml).unwrap();

        let config = Config::load(&config_path).unwrap();

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap();

        let shutdown_signal = CancellationToken::new();

        let serve_config = ServeConfig {
            listen_address: address,
            config: config.clone(),
            shutdown_signal: shutdown_signal.clone(),
            log_filter: "server=debug,llm=debug,config=debug,integration_tests=debug".to_string(),
        };

        let (tx, mut rx) = tokio::sync::oneshot::channel();

        let server_task_handle = tokio::spawn(async move {
            // Free the port for the server to bind
            drop(listener);

            let _ = tx.send(server::serve(serve_config).await);
        });

        let client = TestClient::new(format!("http://{address}"));

        let mut retries = 30;
        let mut last_error = None;

        while retries > 0 {
            #[allow(clippy::panic)]
            if let Ok(Err(e)) = rx.try_recv() {
                panic!("Server failed to start: {e}");
            }

            match client.try_get("/").await {
                Ok(_) => break,
                Err(e) => last_error = Some(e),
            }

            retries -= 1;
            tokio::time::sleep(Duration::from_millis(100)).await;
        }

        #[allow(clippy::panic)]
        if retries == 0 {
            panic!("Server failed to become ready after 30 retries. Last error: {last_error:?}");
        }

        TestServer {
            client,
            address,
            config,
            test_service_tokens,
            _server_task_handle: server_task_handle,
            shutdown_signal,
        }
    }

    /// POST /ask and return the status with the parsed body.
    pub async fn ask(&self, query: &str, models: &[&str]) -> (u16, serde_json::Value) {
        let request = serde_json::json!({ "query": query, "models": models });
        let response = self.client.post("/ask", &request).await;

        let status = response.status().as_u16();
        let body = response.json().await.unwrap();

        (status, body)
    }

    /// GET /models and return the parsed body.
    pub async fn models(&self) -> serde_json::Value {
        let response = self.client.get("/models").await;
        assert_eq!(response.status(), 200);

        response.json().await.unwrap()
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        for token in &self.test_service_tokens {
            token.cancel();
        }

        self.shutdown_signal.cancel();
    }
}

#[derive(Default)]
pub struct TestServerBuilder {
    config: String,
    test_service_tokens: Vec<CancellationToken>,
}

impl TestServerBuilder {
    /// Spawn a mock provider and register it with the server configuration
    pub async fn spawn_llm(&mut self, mock: LlmMock) -> LlmMockHandle {
        let handle = mock.spawn().await;

        self.config.push_str(&handle.config_snippet());
        self.test_service_tokens.push(handle.shutdown.clone());

        handle
    }

    /// Start the server with the given extra configuration in front of the mock providers
    pub async fn build(self, config: &str) -> TestServer {
        let config = format!("{config}\n{}", self.config);
        TestServer::start_with_services(&config, self.test_service_tokens).await
    }
}
