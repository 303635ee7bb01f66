//! Message classification.

/// Command prefix that routes a message to image generation.
pub const IMAGINE_PREFIX: &str = "/imagine";

/// What an inbound message asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command<'a> {
    /// Ordinary chat text, passed through unchanged.
    Chat(&'a str),
    /// Image request. The prompt is trimmed and may be empty.
    Imagine(&'a str),
}

impl<'a> Command<'a> {
    /// Classify `text`. Pure; no side effects.
    ///
    /// A message is an image request when it starts with `/imagine`
    /// followed by nothing or by whitespace. `/imagined` is chat.
    pub fn parse(text: &'a str) -> Self {
        match text.strip_prefix(IMAGINE_PREFIX) {
            Some(rest) if rest.is_empty() || rest.starts_with(char::is_whitespace) => {
                Command::Imagine(rest.trim())
            }
            _ => Command::Chat(text),
        }
    }

    /// Short label for logs and spans.
    pub fn kind(&self) -> &'static str {
        match self {
            Command::Chat(_) => "chat",
            Command::Imagine(_) => "image",
        }
    }
}
