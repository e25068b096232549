use std::path::PathBuf;

use clap::{Parser, Subcommand};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use serde_json::Value;
use url::Url;

#[derive(Parser)]
#[command(name = "repo-cli")]
#[command(about = "Command-line client for the schema repository server", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8888")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check server liveness
    Status,
    /// Show the effective configuration
    Config {
        /// Include keys left at their default value
        #[arg(long)]
        include_defaults: bool,
    },
    /// List registered subjects
    Subjects,
    /// List a subject's schemas, newest first
    Entries { subject: String },
    /// Create a subject (no-op if it exists)
    CreateSubject { subject: String },
    /// Register the schema read from a file
    Register { subject: String, file: PathBuf },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();
    let base = Url::parse(&cli.url)?;

    let mut json = HeaderMap::new();
    json.insert(ACCEPT, HeaderValue::from_static("application/json"));

    match cli.command {
        Commands::Status => {
            let res = client.get(endpoint(&base, &["status"])?).send().await?;
            print_text(res).await?;
        }
        Commands::Config { include_defaults } => {
            let res = client
                .get(endpoint(&base, &["config"])?)
                .query(&[("include_defaults", include_defaults)])
                .headers(json)
                .send()
                .await?;
            print_json(res).await?;
        }
        Commands::Subjects => {
            let res = client
                .get(endpoint(&base, &["schema-repo"])?)
                .headers(json)
                .send()
                .await?;
            print_json(res).await?;
        }
        Commands::Entries { subject } => {
            let res = client
                .get(endpoint(&base, &["schema-repo", subject.as_str(), "all"])?)
                .headers(json)
                .send()
                .await?;
            print_json(res).await?;
        }
        Commands::CreateSubject { subject } => {
            let res = client
                .put(endpoint(&base, &["schema-repo", subject.as_str()])?)
                .send()
                .await?;
            print_text(res).await?;
        }
        Commands::Register { subject, file } => {
            let schema = std::fs::read_to_string(&file)?;
            let res = client
                .put(endpoint(&base, &["schema-repo", subject.as_str(), "register"])?)
                .body(schema)
                .send()
                .await?;
            print_text(res).await?;
        }
    }

    Ok(())
}

/// `base` with each segment appended, percent-encoded.
fn endpoint(base: &Url, segments: &[&str]) -> Result<Url, Box<dyn std::error::Error>> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| format!("{base} cannot be used as a base URL"))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

/// The response body, or an error carrying the server's message.
async fn success_body(res: reqwest::Response) -> Result<String, Box<dyn std::error::Error>> {
    let status = res.status();
    let text = res.text().await?;
    if !status.is_success() {
        if text.is_empty() {
            return Err(format!("server returned status {status}").into());
        }
        return Err(format!("server returned status {status}: {text}").into());
    }
    Ok(text)
}

async fn print_text(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", success_body(res).await?);
    Ok(())
}

async fn print_json(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let json: Value = serde_json::from_str(&success_body(res).await?)?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subjects_are_encoded_as_one_segment() {
        let base = Url::parse("http://localhost:8888").unwrap();
        let url = endpoint(&base, &["schema-repo", "a#b c?d/e", "all"]).unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:8888/schema-repo/a%23b%20c%3Fd%2Fe/all"
        );
    }

    #[test]
    fn base_path_is_kept() {
        let base = Url::parse("http://proxy.local/registry/").unwrap();
        let url = endpoint(&base, &["status"]).unwrap();
        assert_eq!(url.as_str(), "http://proxy.local/registry/status");
    }

    fn response(status: u16, body: &'static str) -> reqwest::Response {
        reqwest::Response::from(
            axum::http::Response::builder()
                .status(status)
                .body(body)
                .unwrap(),
        )
    }

    #[tokio::test]
    async fn error_statuses_fail_the_command() {
        let err = success_body(response(404, "subject `x` does not exist"))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("404"));
        assert!(err.to_string().contains("subject `x` does not exist"));

        assert_eq!(success_body(response(200, "OK")).await.unwrap(), "OK");
    }
}
