//! Chat front end for a [`Session`]
//!
//! Turns user messages into session calls and every outcome into exactly one
//! user-visible reply. The transport (terminal, web socket, ...) drains the
//! outbox and decides how to render [`Reply::Status`] updates.

use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, warn};

use crate::embed::Embedder;
use crate::generate::Generator;
use crate::parse::{DocumentParser, FileParser};
use crate::session::{Session, Stage, Upload};
use crate::Error;

pub const GREETING: &str = "👋 Hi! I'm your local document chatbot.\n\n\
    💬 You can:\n\
    - Chat with me about anything\n\
    - Upload a file (PDF, CSV, or DOCX) to ask questions about its content\n\n\
    How can I help you today?";

pub const UNSUPPORTED_FILE: &str = "❌ Unsupported file type. Please upload a PDF, CSV, or DOCX file.";
pub const PROCESSING: &str = "⏳ Processing your file...";
pub const BUILDING_INDEX: &str = "⏳ Creating vector database...";

/// Something for the user to see.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// A new chat message
    Message(String),
    /// Replaces the current processing notice
    Status(String),
}

/// A user turn: text plus any attached files.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Message {
    pub content: String,
    pub files: Vec<Upload>,
}

impl Message {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            files: Vec::new(),
        }
    }

    pub fn with_file(mut self, upload: Upload) -> Self {
        self.files.push(upload);
        self
    }
}

pub struct Conversation<E, G, P = FileParser>
where
    E: Embedder + 'static,
    G: Generator,
    P: DocumentParser + 'static,
{
    session: Session<E, G, P>,
    outbox: UnboundedSender<Reply>,
}

impl<E, G, P> Conversation<E, G, P>
where
    E: Embedder + 'static,
    G: Generator,
    P: DocumentParser + 'static,
{
    pub fn new(session: Session<E, G, P>, outbox: UnboundedSender<Reply>) -> Self {
        Self { session, outbox }
    }

    pub fn session(&self) -> &Session<E, G, P> {
        &self.session
    }

    /// Send the greeting.
    pub fn start(&self) {
        self.send(Reply::Message(GREETING.to_string()));
    }

    /// Handle one user turn.
    ///
    /// With files attached only the first one is ingested and the text is
    /// left for the next turn. Otherwise the text is answered.
    pub async fn handle(&self, message: Message) {
        if let Some(upload) = message.files.first() {
            if message.files.len() > 1 {
                debug!(ignored = message.files.len() - 1, "only the first attachment is ingested");
            }
            self.upload(upload).await;
            return;
        }

        match self.session.answer(&message.content).await {
            Ok(answer) => self.send(Reply::Message(answer)),
            Err(Error::Generation(e)) => {
                warn!(error = %e, "generation failed");
                self.send(Reply::Message(format!("❌ Error calling the model API: {e}")));
            }
            Err(e) => self.send(Reply::Message(format!("❌ Error searching the document: {e}"))),
        }
    }

    async fn upload(&self, upload: &Upload) {
        let outbox = &self.outbox;
        let result = self
            .session
            .ingest(upload, |stage| {
                let text = match stage {
                    Stage::Processing => PROCESSING,
                    Stage::BuildingIndex => BUILDING_INDEX,
                };
                if outbox.send(Reply::Status(text.to_string())).is_err() {
                    debug!("conversation outbox closed");
                }
            })
            .await;

        let reply = match result {
            Ok(report) => format!(
                "✅ File processed successfully! Loaded {} chunks from '{}'. Ask me anything about its content!",
                report.chunk_count, report.file_name
            ),
            Err(Error::UnsupportedInput(_)) => UNSUPPORTED_FILE.to_string(),
            Err(Error::IndexBuild(e)) => format!("❌ Error creating vector database: {e}"),
            Err(e) => format!("❌ Error loading file: {e}"),
        };
        self.send(Reply::Message(reply));
    }

    fn send(&self, reply: Reply) {
        if self.outbox.send(reply).is_err() {
            debug!("conversation outbox closed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{temp_file, ScriptedGenerator, SwitchableEmbedder};
    use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver};

    type TestConversation = Conversation<SwitchableEmbedder, ScriptedGenerator>;

    fn conversation() -> (TestConversation, UnboundedReceiver<Reply>) {
        let (tx, rx) = unbounded_channel();
        let session = Session::new(SwitchableEmbedder::default(), ScriptedGenerator::default());
        (Conversation::new(session, tx), rx)
    }

    fn drain(rx: &mut UnboundedReceiver<Reply>) -> Vec<Reply> {
        let mut replies = Vec::new();
        while let Ok(reply) = rx.try_recv() {
            replies.push(reply);
        }
        replies
    }

    #[test]
    fn test_start_greets() {
        let (conversation, mut rx) = conversation();
        conversation.start();
        assert_eq!(drain(&mut rx), vec![Reply::Message(GREETING.to_string())]);
    }

    #[tokio::test]
    async fn test_upload_then_ask() {
        let (conversation, mut rx) = conversation();
        let file = temp_file(".csv", "name,qty\napple,3\npear,5\n");

        conversation
            .handle(Message::text("what is in here?").with_file(Upload::new("stock.csv", file.path())))
            .await;
        assert_eq!(
            drain(&mut rx),
            vec![
                Reply::Status(PROCESSING.to_string()),
                Reply::Status(BUILDING_INDEX.to_string()),
                Reply::Message(
                    "✅ File processed successfully! Loaded 2 chunks from 'stock.csv'. Ask me anything about its content!"
                        .to_string()
                ),
            ]
        );
        // the text sent along with the file is not answered
        assert!(conversation.session().generator().prompts().is_empty());

        conversation.handle(Message::text("total qty?")).await;
        assert_eq!(
            drain(&mut rx),
            vec![Reply::Message(ScriptedGenerator::ANSWER.to_string())]
        );
        let prompt = conversation.session().generator().last_prompt();
        assert!(prompt.contains("name: apple\nqty: 3\n\nname: pear\nqty: 5"));
    }

    #[tokio::test]
    async fn test_unsupported_upload() {
        let (conversation, mut rx) = conversation();
        let file = temp_file(".exe", "MZ");

        conversation
            .handle(Message::default().with_file(Upload::new("report.exe", file.path())))
            .await;
        assert_eq!(drain(&mut rx), vec![Reply::Message(UNSUPPORTED_FILE.to_string())]);
    }

    #[tokio::test]
    async fn test_load_error_is_reported_once() {
        let (conversation, mut rx) = conversation();
        let file = temp_file(".docx", "not a zip");

        conversation
            .handle(Message::default().with_file(Upload::new("notes.docx", file.path())))
            .await;
        let replies = drain(&mut rx);
        assert_eq!(replies.len(), 2);
        assert_eq!(replies[0], Reply::Status(PROCESSING.to_string()));
        assert!(matches!(&replies[1], Reply::Message(m) if m.starts_with("❌ Error loading file: ")));
    }

    #[tokio::test]
    async fn test_index_error_is_reported() {
        let (conversation, mut rx) = conversation();
        conversation.session().embedder().set_failing(true);
        let file = temp_file(".csv", "a\nx\n");

        conversation
            .handle(Message::default().with_file(Upload::new("a.csv", file.path())))
            .await;
        let replies = drain(&mut rx);
        assert_eq!(replies.len(), 3);
        assert!(matches!(&replies[2], Reply::Message(m) if m.starts_with("❌ Error creating vector database: ")));
    }

    #[tokio::test]
    async fn test_generation_error_then_recovery() {
        let (conversation, mut rx) = conversation();
        conversation.session().generator().fail_next("connection reset by peer");

        conversation.handle(Message::text("hello")).await;
        let replies = drain(&mut rx);
        assert_eq!(replies.len(), 1);
        assert!(matches!(&replies[0], Reply::Message(m) if m.contains("connection reset by peer")));

        conversation.handle(Message::text("hello again")).await;
        assert_eq!(
            drain(&mut rx),
            vec![Reply::Message(ScriptedGenerator::ANSWER.to_string())]
        );
    }

    #[tokio::test]
    async fn test_search_error_is_not_blamed_on_the_model() {
        let (conversation, mut rx) = conversation();
        let file = temp_file(".csv", "name,qty\napple,3\npear,5\n");
        conversation
            .handle(Message::default().with_file(Upload::new("stock.csv", file.path())))
            .await;
        drain(&mut rx);

        conversation.session().embedder().set_failing(true);
        conversation.handle(Message::text("which fruit is apple?")).await;

        let replies = drain(&mut rx);
        assert_eq!(replies.len(), 1);
        assert!(matches!(&replies[0], Reply::Message(m) if m.starts_with("❌ Error searching the document: ")));
        assert!(conversation.session().generator().prompts().is_empty());
    }

    #[tokio::test]
    async fn test_closed_outbox_is_ignored() {
        let (conversation, rx) = conversation();
        drop(rx);
        conversation.handle(Message::text("anyone there?")).await;
        assert_eq!(conversation.session().generator().prompts().len(), 1);
    }
}
