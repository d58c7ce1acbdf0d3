//! Shared utilities for integration tests.

use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use image_api::{HttpServer, ServiceConfig, Shutdown};
use reqwest::multipart::{Form, Part};
use std::io::Cursor;
use std::net::SocketAddr;
use tokio::net::TcpListener;

/// A running service on an ephemeral port. Shuts down on drop.
pub struct TestServer {
    pub addr: SocketAddr,
    shutdown: Shutdown,
}

impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

/// Start the service with `config`, bound to 127.0.0.1:0.
pub async fn start_server(config: ServiceConfig) -> TestServer {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let signal = shutdown.subscribe();
    let server = HttpServer::new(config);

    tokio::spawn(async move {
        let _ = server.run(listener, signal).await;
    });

    TestServer { addr, shutdown }
}

pub async fn start_default_server() -> TestServer {
    start_server(ServiceConfig::default()).await
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder().no_proxy().build().unwrap()
}

/// A colorful test pattern encoded as `format`.
pub fn sample_image(width: u32, height: u32, format: ImageFormat) -> Vec<u8> {
    let img = RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8])
    });

    let mut bytes = Vec::new();
    DynamicImage::ImageRgb8(img)
        .write_to(&mut Cursor::new(&mut bytes), format)
        .unwrap();
    bytes
}

/// Multipart form carrying `bytes` as the `image` file plus text fields.
pub fn upload_form(bytes: Vec<u8>, file_name: &str, fields: &[(&str, &str)]) -> Form {
    let mut form = Form::new().part("image", Part::bytes(bytes).file_name(file_name.to_string()));
    for (name, value) in fields {
        form = form.text(name.to_string(), value.to_string());
    }
    form
}

/// Multipart form with only text fields.
pub fn fields_form(fields: &[(&str, &str)]) -> Form {
    let mut form = Form::new();
    for (name, value) in fields {
        form = form.text(name.to_string(), value.to_string());
    }
    form
}
