#![allow(dead_code)]

use std::path::PathBuf;

use mock_pix::{MockConfig, MockPix};
use pix_sdk::{Credentials, PixSession};

pub const CLIENT_ID: &str = "Client_Id_test";
pub const CLIENT_SECRET: &str = "Client_Secret_test";
pub const KEY: &str = "3f0c2a1e-8b7d-4e6f-9a5b-2c1d0e9f8a7b";

pub fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

pub fn mock_config() -> MockConfig {
    MockConfig::default()
        .with_client(CLIENT_ID, CLIENT_SECRET)
        .with_keys(vec![KEY.to_string()])
}

pub fn credentials(base_url: &str, secret: &str) -> Credentials {
    Credentials::new(
        CLIENT_ID,
        secret,
        fixture("client.crt"),
        fixture("client.key"),
    )
    .sandbox(true)
    .timeout_secs(5)
    .base_url(base_url)
}

/// A running mock and a session configured against it.
pub async fn connected(config: MockConfig) -> (MockPix, String, PixSession) {
    let mock = MockPix::new(config);
    let base_url = mock.spawn().await.expect("spawn mock provider");
    let session = PixSession::connect(credentials(&base_url, CLIENT_SECRET)).expect("configure");
    (mock, base_url, session)
}
