//! Application state wiring the dispatcher and reply channel together.
//!
//! AppState holds the concrete instances used by the HTTP handlers. The
//! dispatcher and channel are type-erased, so tests can inject fakes.

use std::sync::Arc;
use std::time::Duration;

use secrecy::SecretString;
use tokio_util::task::TaskTracker;

use linechat_core::channel::BoxReplyChannel;
use linechat_core::dispatch::Dispatcher;
use linechat_core::memory::ConversationMemory;
use linechat_infra::image::create_image_client;
use linechat_infra::llm::create_completion_client;
use linechat_types::config::RelayConfig;

/// Shared state for the webhook server.
#[derive(Clone)]
pub struct AppState {
    pub dispatcher: Arc<Dispatcher>,
    pub replies: Arc<BoxReplyChannel>,
    /// Key for verifying `X-Line-Signature`.
    pub channel_secret: Arc<SecretString>,
    /// Admin API token. `None` disables the admin API.
    pub admin_token: Option<Arc<SecretString>>,
    /// Message tasks spawned by the webhook; drained on shutdown.
    pub tasks: TaskTracker,
}

impl AppState {
    pub fn new(
        dispatcher: Dispatcher,
        replies: BoxReplyChannel,
        channel_secret: SecretString,
        admin_token: Option<SecretString>,
    ) -> Self {
        Self {
            dispatcher: Arc::new(dispatcher),
            replies: Arc::new(replies),
            channel_secret: Arc::new(channel_secret),
            admin_token: admin_token.map(Arc::new),
            tasks: TaskTracker::new(),
        }
    }

    /// Wait for in-flight message tasks to finish.
    ///
    /// Returns `false` if `limit` elapsed with tasks still running.
    pub async fn drain(&self, limit: Duration) -> bool {
        self.tasks.close();
        tokio::time::timeout(limit, self.tasks.wait()).await.is_ok()
    }
}

/// Build a dispatcher backed by the OpenAI upstreams.
///
/// The same API key serves both the completion and the image upstream.
pub fn build_dispatcher(config: &RelayConfig, api_key: SecretString) -> Dispatcher {
    let memory = ConversationMemory::new(config.memory.capacity);
    let completion = create_completion_client(&config.completion, api_key.clone());
    let image = create_image_client(&config.image, api_key);

    Dispatcher::new(memory, completion, image)
        .with_upstream_timeout(Duration::from_secs(config.upstream_timeout_secs))
}
