use clap::{Parser, Subcommand};
use reqwest::multipart::{Form, Part};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "image-cli")]
#[command(about = "Command line client for the Image Manipulation API", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8080")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check that the service is up
    Ping,
    /// Rotate an image clockwise
    Rotate {
        input: PathBuf,
        #[arg(short, long)]
        output: PathBuf,
        /// 90, 180 or 270; the server default is 180
        #[arg(short, long)]
        angle: Option<i64>,
    },
    /// Resize an image to exact dimensions
    Resize {
        input: PathBuf,
        #[arg(short, long)]
        output: PathBuf,
        #[arg(long)]
        width: Option<i64>,
        #[arg(long)]
        height: Option<i64>,
    },
    /// Convert an image to grayscale
    Grayscale {
        input: PathBuf,
        #[arg(short, long)]
        output: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    let (endpoint, input, output, fields) = match cli.command {
        Commands::Ping => {
            let res = client.get(format!("{}/ping", cli.url)).send().await?;
            println!("{} {}", res.status(), res.text().await?);
            return Ok(());
        }
        Commands::Rotate {
            input,
            output,
            angle,
        } => ("rotate", input, output, vec![("angle", angle)]),
        Commands::Resize {
            input,
            output,
            width,
            height,
        } => (
            "resize",
            input,
            output,
            vec![("width", width), ("height", height)],
        ),
        Commands::Grayscale { input, output } => ("grayscale", input, output, vec![]),
    };

    let mut form = Form::new().part("image", file_part(&input).await?);
    for (name, value) in fields {
        if let Some(value) = value {
            form = form.text(name, value.to_string());
        }
    }

    let res = client
        .post(format!("{}/{}", cli.url, endpoint))
        .multipart(form)
        .send()
        .await?;

    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: API returned status {}", status);
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        std::process::exit(1);
    }

    let content_type = res
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_string();
    let bytes = res.bytes().await?;
    tokio::fs::write(&output, &bytes).await?;

    println!(
        "Wrote {} bytes ({}) to {}",
        bytes.len(),
        content_type,
        output.display()
    );
    Ok(())
}

async fn file_part(path: &Path) -> Result<Part, Box<dyn std::error::Error>> {
    let data = tokio::fs::read(path).await?;
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "upload".to_string());

    Ok(Part::bytes(data).file_name(file_name))
}
