//! Submit one prompt and poll for its images.
//!
//! JIMENG_TOKENS=tok1,tok2 cargo run --example generate -- "a cat"

use jimeng_core::{ClientConfig, CredentialPool, GenerationRequest, JimengClient};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>>
{   env_logger::init();

    let tokens = std::env::var("JIMENG_TOKENS")
      .map_err(|_| "JIMENG_TOKENS not set")?;
    let prompt = std::env::args()
      .nth(1)
      .unwrap_or_else(|| "a cat".to_string());

    let config = ClientConfig::from_env();
    let client = JimengClient::with_http(&config)?;
    let credentials = CredentialPool::from_authorization(&tokens);

    let job = client
      .generate(&GenerationRequest::new("jimeng-3.0", prompt), &credentials)
      .await?;
    println!("history id: {}", job.job_id);

    let result = client.fetch_result(&job.job_id, &credentials).await?;
    for image in result.images
    {   println!("{}", image.large);
    }
    Ok(())
}
