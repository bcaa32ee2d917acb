use lms_client::{ApiClient, ReqwestTransport};
use mock_server::Library;

/// Start the mock backend on a random port and return its base URL.
pub async fn spawn_server(library: Library) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(mock_server::serve(listener, library));
    format!("http://{addr}")
}

/// A client with its own cookie jar, like a fresh browser profile.
pub fn api(base_url: &str) -> ApiClient<ReqwestTransport> {
    ApiClient::new(base_url, ReqwestTransport::new().unwrap())
}

/// A base URL nothing is listening on.
pub fn dead_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}")
}
