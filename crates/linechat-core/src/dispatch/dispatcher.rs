//! Dispatcher -- maps one inbound message to one outbound response.
//!
//! Chat messages go through conversation memory and the completion
//! upstream; `/imagine` messages go straight to the image upstream and never
//! touch memory. Every failure, including a panic inside an upstream client,
//! is converted into a text response at this boundary.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::time::Duration;

use futures_util::FutureExt;
use tokio::time::timeout;
use tracing::{Instrument, debug, error, info, info_span, warn};

use linechat_types::chat::{OutboundResponse, Speaker, Turn};
use linechat_types::error::{DispatchError, Upstream, UpstreamError};

use super::command::Command;
use crate::image::BoxImageClient;
use crate::llm::BoxCompletionClient;
use crate::memory::ConversationMemory;

/// Upper bound on a single upstream call unless overridden.
pub const DEFAULT_UPSTREAM_TIMEOUT: Duration = Duration::from_secs(60);

/// Per-message orchestration over memory and the two upstream clients.
///
/// Holds no per-request state; all conversational state lives in the
/// injected [`ConversationMemory`]. Share it behind an `Arc` across tasks.
pub struct Dispatcher {
    memory: ConversationMemory,
    completion: BoxCompletionClient,
    image: BoxImageClient,
    upstream_timeout: Duration,
}

impl Dispatcher {
    pub fn new(
        memory: ConversationMemory,
        completion: BoxCompletionClient,
        image: BoxImageClient,
    ) -> Self {
        Self {
            memory,
            completion,
            image,
            upstream_timeout: DEFAULT_UPSTREAM_TIMEOUT,
        }
    }

    /// Override the per-call upstream timeout.
    pub fn with_upstream_timeout(mut self, limit: Duration) -> Self {
        self.upstream_timeout = limit;
        self
    }

    /// The memory this dispatcher reads and writes.
    pub fn memory(&self) -> &ConversationMemory {
        &self.memory
    }

    pub fn upstream_timeout(&self) -> Duration {
        self.upstream_timeout
    }

    /// Handle one message from `user_id`. Never fails.
    pub async fn handle(&self, user_id: &str, text: &str) -> OutboundResponse {
        let command = Command::parse(text);
        info!(user_id, text, path = command.kind(), "Inbound message");

        let span = info_span!("dispatch", user_id, path = command.kind());
        let outcome = AssertUnwindSafe(self.route(user_id, command))
            .catch_unwind()
            .instrument(span)
            .await;

        match outcome {
            Ok(Ok(response)) => response,
            Ok(Err(e)) => {
                match &e {
                    DispatchError::InvalidCommand(_) => info!(user_id, error = %e, "Rejected command"),
                    _ => warn!(user_id, error = %e, "Dispatch failed"),
                }
                OutboundResponse::text(e.user_message())
            }
            Err(payload) => {
                let e = DispatchError::Internal(panic_message(payload.as_ref()));
                error!(user_id, error = %e, "Dispatch panicked");
                OutboundResponse::text(e.user_message())
            }
        }
    }

    async fn route(
        &self,
        user_id: &str,
        command: Command<'_>,
    ) -> Result<OutboundResponse, DispatchError> {
        match command {
            Command::Chat(text) => self.chat(user_id, text).await,
            Command::Imagine(prompt) => self.imagine(prompt).await,
        }
    }

    /// Chat path. The user turn stays in memory even if the upstream fails.
    async fn chat(&self, user_id: &str, text: &str) -> Result<OutboundResponse, DispatchError> {
        let turns = self.memory.append_and_snapshot(user_id, Turn::user(text));

        let span = info_span!(
            "gen_ai.complete",
            gen_ai.system = self.completion.name(),
            history_len = turns.len(),
        );
        let reply = timeout(self.upstream_timeout, self.completion.complete(&turns))
            .instrument(span)
            .await
            .map_err(|_| UpstreamError::timeout(Upstream::Completion, self.upstream_timeout))??;

        if reply.role() != Speaker::Assistant {
            return Err(UpstreamError::completion(format!(
                "expected an assistant turn, got a {} turn",
                reply.role()
            ))
            .into());
        }

        let content = reply.content().to_owned();
        self.memory.append(user_id, reply);
        debug!(user_id, retained = self.memory.len(user_id), "Assistant reply stored");

        Ok(OutboundResponse::text(content))
    }

    async fn imagine(&self, prompt: &str) -> Result<OutboundResponse, DispatchError> {
        if prompt.is_empty() {
            return Err(DispatchError::InvalidCommand(
                "image prompt is empty".to_string(),
            ));
        }

        let span = info_span!("gen_ai.image", gen_ai.system = self.image.name());
        let locator = timeout(self.upstream_timeout, self.image.generate(prompt))
            .instrument(span)
            .await
            .map_err(|_| UpstreamError::timeout(Upstream::Image, self.upstream_timeout))??;

        Ok(OutboundResponse::image(locator))
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::num::NonZeroUsize;
    use std::sync::{Arc, Mutex};

    use linechat_types::error::{GENERIC_FAILURE_MESSAGE, IMAGINE_USAGE_MESSAGE};
    use linechat_types::image::ImageLocator;

    use crate::image::ImageClient;
    use crate::llm::CompletionClient;

    // -- Completion stubs --

    /// Replies with "echo: <last user text>" and records every request.
    #[derive(Clone, Default)]
    struct EchoCompletion {
        requests: Arc<Mutex<Vec<Vec<Turn>>>>,
    }

    impl CompletionClient for EchoCompletion {
        fn name(&self) -> &str {
            "echo"
        }

        async fn complete(&self, turns: &[Turn]) -> Result<Turn, UpstreamError> {
            self.requests.lock().unwrap().push(turns.to_vec());
            let last = turns.last().map(Turn::content).unwrap_or_default();
            Ok(Turn::assistant(format!("echo: {last}")))
        }
    }

    /// Always returns the same scripted result.
    struct ScriptedCompletion(Result<Turn, UpstreamError>);

    impl CompletionClient for ScriptedCompletion {
        fn name(&self) -> &str {
            "scripted"
        }

        async fn complete(&self, _turns: &[Turn]) -> Result<Turn, UpstreamError> {
            self.0.clone()
        }
    }

    /// Never resolves.
    struct HangingCompletion;

    impl CompletionClient for HangingCompletion {
        fn name(&self) -> &str {
            "hanging"
        }

        fn complete(
            &self,
            _turns: &[Turn],
        ) -> impl std::future::Future<Output = Result<Turn, UpstreamError>> + Send {
            std::future::pending::<Result<Turn, UpstreamError>>()
        }
    }

    struct PanickingCompletion;

    impl CompletionClient for PanickingCompletion {
        fn name(&self) -> &str {
            "panicking"
        }

        async fn complete(&self, _turns: &[Turn]) -> Result<Turn, UpstreamError> {
            panic!("completion client exploded")
        }
    }

    /// Echoes once every caller has reached the upstream, so all snapshots
    /// are taken before any reply is stored.
    struct BarrierEcho {
        barrier: Arc<tokio::sync::Barrier>,
        requests: Arc<Mutex<Vec<Vec<Turn>>>>,
    }

    impl CompletionClient for BarrierEcho {
        fn name(&self) -> &str {
            "barrier-echo"
        }

        async fn complete(&self, turns: &[Turn]) -> Result<Turn, UpstreamError> {
            self.requests.lock().unwrap().push(turns.to_vec());
            self.barrier.wait().await;
            tokio::task::yield_now().await;
            let last = turns.last().map(Turn::content).unwrap_or_default();
            Ok(Turn::assistant(format!("echo: {last}")))
        }
    }

    // -- Image stubs --

    #[derive(Clone, Default)]
    struct RecordingImage {
        prompts: Arc<Mutex<Vec<String>>>,
    }

    impl ImageClient for RecordingImage {
        fn name(&self) -> &str {
            "recording"
        }

        async fn generate(&self, prompt: &str) -> Result<ImageLocator, UpstreamError> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            Ok(ImageLocator::new(format!("https://img.test/{}.png", prompt.replace(' ', "-"))))
        }
    }

    struct FailingImage;

    impl ImageClient for FailingImage {
        fn name(&self) -> &str {
            "failing"
        }

        async fn generate(&self, _prompt: &str) -> Result<ImageLocator, UpstreamError> {
            Err(UpstreamError::image("HTTP 400: content policy violation"))
        }
    }

    fn memory(capacity: usize) -> ConversationMemory {
        ConversationMemory::new(NonZeroUsize::new(capacity).unwrap())
    }

    fn dispatcher<C, I>(completion: C, image: I) -> Dispatcher
    where
        C: CompletionClient + 'static,
        I: ImageClient + 'static,
    {
        Dispatcher::new(
            memory(10),
            BoxCompletionClient::new(completion),
            BoxImageClient::new(image),
        )
    }

    // -- Chat path --

    #[tokio::test]
    async fn test_chat_round_trip() {
        let d = dispatcher(
            ScriptedCompletion(Ok(Turn::assistant("hello"))),
            RecordingImage::default(),
        );

        let response = d.handle("u1", "hi").await;

        assert_eq!(response, OutboundResponse::text("hello"));
        assert_eq!(
            d.memory().get("u1"),
            vec![Turn::user("hi"), Turn::assistant("hello")]
        );
    }

    #[tokio::test]
    async fn test_completion_sees_full_history_ending_with_user_turn() {
        let echo = EchoCompletion::default();
        let d = dispatcher(echo.clone(), RecordingImage::default());

        d.handle("u1", "first").await;
        d.handle("u1", "second").await;

        let requests = echo.requests.lock().unwrap();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0], vec![Turn::user("first")]);
        assert_eq!(
            requests[1],
            vec![
                Turn::user("first"),
                Turn::assistant("echo: first"),
                Turn::user("second"),
            ]
        );
    }

    #[tokio::test]
    async fn test_completion_failure_keeps_user_turn() {
        let d = dispatcher(
            ScriptedCompletion(Err(UpstreamError::completion("HTTP 503"))),
            RecordingImage::default(),
        );

        let response = d.handle("u1", "hi").await;

        let text = response.as_text().unwrap();
        assert!(text.contains("completion"));
        assert!(text.contains("HTTP 503"));
        assert_eq!(d.memory().get("u1"), vec![Turn::user("hi")]);
    }

    #[tokio::test]
    async fn test_non_assistant_reply_is_upstream_error() {
        let d = dispatcher(
            ScriptedCompletion(Ok(Turn::user("i am not the assistant"))),
            RecordingImage::default(),
        );

        let response = d.handle("u1", "hi").await;

        assert!(response.as_text().unwrap().contains("completion"));
        assert_eq!(d.memory().get("u1"), vec![Turn::user("hi")]);
    }

    #[tokio::test]
    async fn test_chat_history_is_bounded() {
        let d = Dispatcher::new(
            memory(3),
            BoxCompletionClient::new(EchoCompletion::default()),
            BoxImageClient::new(RecordingImage::default()),
        );

        for i in 0..5 {
            d.handle("u1", &format!("m{i}")).await;
        }

        assert_eq!(
            d.memory().get("u1"),
            vec![
                Turn::assistant("echo: m3"),
                Turn::user("m4"),
                Turn::assistant("echo: m4"),
            ]
        );
    }

    #[tokio::test]
    async fn test_users_are_isolated() {
        let d = dispatcher(EchoCompletion::default(), RecordingImage::default());

        d.handle("u1", "a").await;
        d.handle("u2", "b").await;

        assert_eq!(
            d.memory().get("u1"),
            vec![Turn::user("a"), Turn::assistant("echo: a")]
        );
        assert_eq!(
            d.memory().get("u2"),
            vec![Turn::user("b"), Turn::assistant("echo: b")]
        );
    }

    #[tokio::test]
    async fn test_message_containing_imagine_mid_text_is_chat() {
        let image = RecordingImage::default();
        let d = dispatcher(EchoCompletion::default(), image.clone());

        let response = d.handle("u1", "hello /imagine").await;

        assert_eq!(response, OutboundResponse::text("echo: hello /imagine"));
        assert!(image.prompts.lock().unwrap().is_empty());
    }

    // -- Image path --

    #[tokio::test]
    async fn test_imagine_returns_image_and_leaves_memory_untouched() {
        let image = RecordingImage::default();
        let d = dispatcher(EchoCompletion::default(), image.clone());

        d.handle("u1", "hi").await;
        let before = d.memory().get("u1");

        let response = d.handle("u1", "/imagine  a red cat ").await;

        assert_eq!(
            response,
            OutboundResponse::image(ImageLocator::new("https://img.test/a-red-cat.png"))
        );
        assert_eq!(*image.prompts.lock().unwrap(), vec!["a red cat".to_string()]);
        assert_eq!(d.memory().get("u1"), before);
    }

    #[tokio::test]
    async fn test_imagine_for_unseen_user_creates_no_history() {
        let d = dispatcher(EchoCompletion::default(), RecordingImage::default());

        d.handle("u9", "/imagine a boat").await;

        assert_eq!(d.memory().user_count(), 0);
    }

    #[tokio::test]
    async fn test_bare_imagine_is_invalid_command() {
        let image = RecordingImage::default();
        let d = dispatcher(EchoCompletion::default(), image.clone());

        for text in ["/imagine", "/imagine    "] {
            let response = d.handle("u1", text).await;
            assert_eq!(response, OutboundResponse::text(IMAGINE_USAGE_MESSAGE));
        }
        assert!(image.prompts.lock().unwrap().is_empty());
        assert!(d.memory().get("u1").is_empty());
    }

    #[tokio::test]
    async fn test_image_failure_becomes_text() {
        let d = dispatcher(EchoCompletion::default(), FailingImage);

        let response = d.handle("u1", "/imagine a cat").await;

        let text = response.as_text().unwrap();
        assert!(text.contains("image generation"));
        assert!(text.contains("content policy violation"));
        assert!(d.memory().get("u1").is_empty());
    }

    // -- Fault handling --

    #[tokio::test]
    async fn test_upstream_timeout_maps_to_upstream_error() {
        let d = dispatcher(HangingCompletion, RecordingImage::default())
            .with_upstream_timeout(Duration::from_millis(50));

        let response = d.handle("u1", "hi").await;

        let text = response.as_text().unwrap();
        assert!(text.contains("completion"));
        assert!(text.contains("50ms"));
        assert_eq!(d.memory().get("u1"), vec![Turn::user("hi")]);
    }

    #[tokio::test]
    async fn test_panic_is_contained_to_one_message() {
        let d = dispatcher(PanickingCompletion, RecordingImage::default());

        let response = d.handle("u1", "hi").await;
        assert_eq!(response, OutboundResponse::text(GENERIC_FAILURE_MESSAGE));

        // Memory is still usable afterwards, for this user and others.
        d.memory().append("u2", Turn::user("still works"));
        assert_eq!(d.memory().get("u1"), vec![Turn::user("hi")]);
        assert_eq!(d.memory().get("u2"), vec![Turn::user("still works")]);

        let image = d.handle("u1", "/imagine a phoenix").await;
        assert!(matches!(image, OutboundResponse::Image { .. }));
    }

    #[tokio::test]
    async fn test_concurrent_users() {
        let d = Arc::new(dispatcher(EchoCompletion::default(), RecordingImage::default()));

        let mut handles = Vec::new();
        for i in 0..20 {
            let d = Arc::clone(&d);
            handles.push(tokio::spawn(async move {
                let user = format!("user-{i}");
                let text = format!("hello {i}");
                let response = d.handle(&user, &text).await;
                (user, text, response)
            }));
        }

        for handle in handles {
            let (user, text, response) = handle.await.unwrap();
            let expected = format!("echo: {text}");
            assert_eq!(response, OutboundResponse::text(expected.clone()));
            assert_eq!(
                d.memory().get(&user),
                vec![Turn::user(text), Turn::assistant(expected)]
            );
        }
        assert_eq!(d.memory().user_count(), 20);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_same_user_requests_see_their_own_turn() {
        const CALLS: usize = 20;
        let requests = Arc::new(Mutex::new(Vec::new()));
        let d = Arc::new(Dispatcher::new(
            memory(3),
            BoxCompletionClient::new(BarrierEcho {
                barrier: Arc::new(tokio::sync::Barrier::new(CALLS)),
                requests: Arc::clone(&requests),
            }),
            BoxImageClient::new(RecordingImage::default()),
        ));

        let mut handles = Vec::new();
        for i in 0..CALLS {
            let d = Arc::clone(&d);
            handles.push(tokio::spawn(async move {
                let text = format!("msg {i}");
                let response = d.handle("u1", &text).await;
                (text, response)
            }));
        }

        for handle in handles {
            let (text, response) = handle.await.unwrap();
            assert_eq!(response, OutboundResponse::text(format!("echo: {text}")));
        }

        let requests = requests.lock().unwrap();
        assert_eq!(requests.len(), CALLS);
        let mut last_turns: Vec<String> = requests
            .iter()
            .map(|turns| {
                assert!(turns.len() <= 3);
                let last = turns.last().unwrap();
                assert_eq!(last.role(), Speaker::User);
                last.content().to_string()
            })
            .collect();
        last_turns.sort();
        let mut expected: Vec<String> = (0..CALLS).map(|i| format!("msg {i}")).collect();
        expected.sort();
        assert_eq!(last_turns, expected);

        assert!(d.memory().len("u1") <= 3);
        assert_eq!(d.memory().user_count(), 1);
    }

    #[test]
    fn test_panic_message_extraction() {
        let s: Box<dyn Any + Send> = Box::new("static str");
        assert_eq!(panic_message(s.as_ref()), "static str");
        let s: Box<dyn Any + Send> = Box::new(String::from("owned"));
        assert_eq!(panic_message(s.as_ref()), "owned");
        let s: Box<dyn Any + Send> = Box::new(42u8);
        assert_eq!(panic_message(s.as_ref()), "unknown panic");
    }
}
