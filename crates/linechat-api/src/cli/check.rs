//! `linechat check` -- verify the completion upstream.

use secrecy::SecretString;

use linechat_infra::llm::{create_completion_client, test_completion_connection};
use linechat_types::config::RelayConfig;

/// Send a minimal completion and report the outcome.
pub async fn check(config: &RelayConfig, api_key: SecretString) -> anyhow::Result<()> {
    let client = create_completion_client(&config.completion, api_key);

    println!();
    println!(
        "  {} Checking {} ({})",
        console::style("🔍").bold(),
        console::style(client.name()).cyan(),
        config.completion.model
    );

    match test_completion_connection(&client).await {
        Ok(reply) => {
            println!(
                "  {} Completion upstream reachable",
                console::style("✓").green()
            );
            println!("  {}", console::style(reply).dim());
            println!();
            Ok(())
        }
        Err(e) => {
            println!("  {} {}", console::style("✗").red(), e);
            println!();
            Err(e.into())
        }
    }
}
