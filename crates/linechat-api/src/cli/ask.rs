//! `linechat ask` -- run one message through the dispatcher locally.

use linechat_core::dispatch::Dispatcher;
use linechat_types::chat::OutboundResponse;

pub async fn ask(dispatcher: &Dispatcher, user_id: &str, text: &str) -> anyhow::Result<()> {
    let response = dispatcher.handle(user_id, text).await;
    println!("{}", render(&response));
    Ok(())
}

fn render(response: &OutboundResponse) -> String {
    match response {
        OutboundResponse::Text { content } => content.clone(),
        OutboundResponse::Image { locator } => {
            format!("{} {}", console::style("image:").cyan(), locator)
        }
    }
}
