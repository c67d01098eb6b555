//! Interactive multi-chat session over one engine.

use crate::answer::{answer_question, ingest_blocking};
use crate::completion::CompletionService;
use crate::filenames::{sanitize_filename, sanitize_storage_path};
use crate::persistence::{Persistence, Role};
use crate::titles::chat_title;
use anyhow::Result;
use ragchat_engine::{ChatKey, RetrievalEngine};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

const NEW_CHAT_TITLE: &str = "New chat";

const HELP: &str = "\
Commands:
  /new                 start a new chat
  /chats               list chats, newest first
  /use <id>            switch to a chat
  /upload <path>...    attach PDF, TXT or DOCX files to the current chat
  /history             show the current chat's messages
  /delete              delete the current chat and its documents
  /help                show this help
  /quit                leave
Anything else is a question about the current chat's documents.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

pub struct Session<W: Write> {
    engine: Arc<RetrievalEngine>,
    persistence: Arc<dyn Persistence>,
    completion: Arc<dyn CompletionService>,
    models: Vec<String>,
    k: usize,
    current: Option<i64>,
    out: W,
}

impl<W: Write> Session<W> {
    pub fn new(
        engine: Arc<RetrievalEngine>,
        persistence: Arc<dyn Persistence>,
        completion: Arc<dyn CompletionService>,
        models: Vec<String>,
        out: W,
    ) -> Self {
        let k = engine.config().default_k;
        Self {
            engine,
            persistence,
            completion,
            models,
            k,
            current: None,
            out,
        }
    }

    pub const fn current_chat(&self) -> Option<i64> {
        self.current
    }

    pub fn into_output(self) -> W {
        self.out
    }

    pub fn print_help(&mut self) -> Result<()> {
        writeln!(self.out, "{HELP}")?;
        Ok(())
    }

    /// Handle one input line. Store failures are reported and the session
    /// goes on.
    pub async fn handle_line(&mut self, line: &str) -> Result<Flow> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(Flow::Continue);
        }

        let (command, rest) = match line.split_once(char::is_whitespace) {
            Some((command, rest)) => (command, rest.trim()),
            None => (line, ""),
        };

        match command {
            "/quit" | "/exit" => return Ok(Flow::Quit),
            "/help" => self.print_help()?,
            "/new" => self.new_chat()?,
            "/chats" => self.list_chats()?,
            "/use" => self.use_chat(rest)?,
            "/upload" => self.upload(rest).await?,
            "/history" => self.history()?,
            "/delete" => self.delete()?,
            _ if command.starts_with('/') => {
                writeln!(self.out, "Unknown command {command}. Type /help.")?;
            }
            _ => self.ask(line).await?,
        }
        Ok(Flow::Continue)
    }

    fn new_chat(&mut self) -> Result<()> {
        match self.persistence.create_chat(NEW_CHAT_TITLE) {
            Ok(chat) => {
                self.current = Some(chat.id);
                writeln!(self.out, "Created chat {}", chat.id)?;
            }
            Err(err) => writeln!(self.out, "Could not create chat: {err}")?,
        }
        Ok(())
    }

    fn list_chats(&mut self) -> Result<()> {
        let chats = match self.persistence.list_chats() {
            Ok(chats) => chats,
            Err(err) => {
                writeln!(self.out, "Could not list chats: {err}")?;
                return Ok(());
            }
        };
        if chats.is_empty() {
            writeln!(self.out, "No chats yet. Use /new to start one.")?;
        }
        for chat in chats {
            let marker = if Some(chat.id) == self.current { '*' } else { ' ' };
            let title = if chat.title.is_empty() {
                format!("Chat {}", chat.id)
            } else {
                chat.title
            };
            writeln!(self.out, "{marker} {:>4}  {title}", chat.id)?;
        }
        Ok(())
    }

    fn use_chat(&mut self, arg: &str) -> Result<()> {
        let Ok(id) = arg.parse::<i64>() else {
            writeln!(self.out, "Usage: /use <id>")?;
            return Ok(());
        };
        let exists = self
            .persistence
            .list_chats()
            .map(|chats| chats.iter().any(|c| c.id == id))
            .unwrap_or(false);
        if exists {
            self.current = Some(id);
            writeln!(self.out, "Switched to chat {id}")?;
        } else {
            writeln!(self.out, "Chat {id} not found")?;
        }
        Ok(())
    }

    fn require_chat(&mut self) -> Result<Option<i64>> {
        if self.current.is_none() {
            writeln!(self.out, "Select or create a chat first (/new or /use <id>).")?;
        }
        Ok(self.current)
    }

    async fn upload(&mut self, args: &str) -> Result<()> {
        let Some(chat_id) = self.require_chat()? else {
            return Ok(());
        };
        let paths: Vec<PathBuf> = match split_args(args) {
            Some(words) if !words.is_empty() => words.into_iter().map(PathBuf::from).collect(),
            _ => {
                writeln!(self.out, "Usage: /upload <path>...  (quote paths with spaces)")?;
                return Ok(());
            }
        };

        for path in &paths {
            let raw_name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            let safe_name = sanitize_filename(&raw_name);
            let storage_path = sanitize_storage_path(&format!("{chat_id}/{safe_name}"));
            let stored = std::fs::read(path)
                .map_err(anyhow::Error::from)
                .and_then(|bytes| {
                    self.persistence
                        .save_file_record(chat_id, &safe_name, &storage_path, &bytes)
                        .map_err(anyhow::Error::from)
                });
            if let Err(err) = stored {
                log::warn!("Could not store {}: {err}", path.display());
            }
        }

        let key = ChatKey::Id(chat_id);
        match ingest_blocking(&self.engine, &key, paths).await {
            Ok(report) => {
                writeln!(
                    self.out,
                    "Indexed {} chunks ({} skipped, {} failed)",
                    report.indexed,
                    report.skipped_unsupported.len(),
                    report.failures.len()
                )?;
                for failure in &report.failures {
                    writeln!(self.out, "  failed {}: {}", failure.path.display(), failure.error)?;
                }
            }
            Err(err) => writeln!(self.out, "Upload failed: {err}")?,
        }
        Ok(())
    }

    fn history(&mut self) -> Result<()> {
        let Some(chat_id) = self.require_chat()? else {
            return Ok(());
        };
        match self.persistence.fetch_history(chat_id) {
            Ok(messages) if messages.is_empty() => {
                writeln!(self.out, "No messages yet. Ask something to begin!")?;
            }
            Ok(messages) => {
                for message in messages {
                    writeln!(self.out, "{}: {}", message.role, message.content)?;
                }
            }
            Err(err) => writeln!(self.out, "Could not fetch history: {err}")?,
        }
        Ok(())
    }

    fn delete(&mut self) -> Result<()> {
        let Some(chat_id) = self.require_chat()? else {
            return Ok(());
        };
        self.engine.clear(&ChatKey::Id(chat_id));
        if let Err(err) = self.persistence.delete_chat(chat_id) {
            writeln!(self.out, "Could not delete chat {chat_id}: {err}")?;
        } else {
            writeln!(self.out, "Deleted chat {chat_id}")?;
        }
        self.current = None;
        Ok(())
    }

    async fn ask(&mut self, question: &str) -> Result<()> {
        let Some(chat_id) = self.require_chat()? else {
            return Ok(());
        };
        let key = ChatKey::Id(chat_id);

        let first_message = self
            .persistence
            .fetch_history(chat_id)
            .map(|h| h.is_empty())
            .unwrap_or(false);
        if let Err(err) = self.persistence.save_message(chat_id, Role::User, question) {
            log::warn!("Could not save user message: {err}");
        }
        if first_message {
            let title = chat_title(question);
            if let Err(err) = self.persistence.update_chat_title(chat_id, &title) {
                log::warn!("Could not update chat title: {err}");
            }
        }

        let answer = match answer_question(
            &self.engine,
            self.completion.as_ref(),
            &self.models,
            &key,
            question,
            self.k,
        )
        .await
        {
            Ok(answer) => answer.text,
            Err(err) => {
                log::error!("Failed to answer in chat {chat_id}: {err:#}");
                "Could not generate an answer right now.".to_string()
            }
        };

        if let Err(err) = self.persistence.save_message(chat_id, Role::Assistant, &answer) {
            log::warn!("Could not save assistant message: {err}");
        }
        writeln!(self.out, "{answer}")?;
        Ok(())
    }
}

/// Split command arguments on whitespace. Single or double quotes group a
/// path with spaces; `None` means a quote was left open.
fn split_args(args: &str) -> Option<Vec<String>> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut in_word = false;
    let mut quote: Option<char> = None;

    for c in args.chars() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => current.push(c),
            None if c == '"' || c == '\'' => {
                quote = Some(c);
                in_word = true;
            }
            None if c.is_whitespace() => {
                if in_word {
                    words.push(std::mem::take(&mut current));
                    in_word = false;
                }
            }
            None => {
                current.push(c);
                in_word = true;
            }
        }
    }

    if quote.is_some() {
        return None;
    }
    if in_word {
        words.push(current);
    }
    Some(words)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::answer::INSUFFICIENT_DATA_ANSWER;
    use crate::completion::CompletionError;
    use crate::persistence::JsonPersistence;
    use async_trait::async_trait;
    use ragchat_engine::RetrievalConfig;
    use ragchat_text_chunker::Chunker;
    use ragchat_vector_store::EmbeddingModel;
    use tempfile::TempDir;

    struct Echo;

    #[async_trait]
    impl CompletionService for Echo {
        async fn complete(&self, prompt: &str, _models: &[String]) -> Result<String, CompletionError> {
            let passages = prompt
                .split("Relevant passages:\n")
                .nth(1)
                .and_then(|rest| rest.split("\n\nUser question:").next())
                .unwrap_or_default();
            Ok(format!("From docs: {passages}"))
        }
    }

    fn session(dir: &TempDir) -> (Session<Vec<u8>>, Arc<JsonPersistence>) {
        let engine = Arc::new(RetrievalEngine::new(
            Arc::new(EmbeddingModel::stub(384)),
            Chunker::default(),
            RetrievalConfig::default(),
        ));
        let persistence = Arc::new(JsonPersistence::open(dir.path().join("data")).unwrap());
        let session = Session::new(
            engine,
            persistence.clone(),
            Arc::new(Echo),
            vec!["m".to_string()],
            Vec::new(),
        );
        (session, persistence)
    }

    #[test]
    fn upload_arguments_honour_quotes() {
        assert_eq!(
            split_args(r#"a.txt "my notes.txt" 'old report.pdf'"#),
            Some(vec![
                "a.txt".to_string(),
                "my notes.txt".to_string(),
                "old report.pdf".to_string(),
            ])
        );
        assert_eq!(split_args("   "), Some(Vec::new()));
        assert_eq!(split_args(r#""""#), Some(vec![String::new()]));
        assert_eq!(split_args(r#""unterminated.txt"#), None);
    }

    #[tokio::test]
    async fn upload_accepts_quoted_path_with_spaces() {
        let dir = TempDir::new().unwrap();
        let doc = dir.path().join("travel notes.txt");
        std::fs::write(&doc, "Paris is the capital of France. Rome is in Italy.").unwrap();
        let (mut session, persistence) = session(&dir);

        session.handle_line("/new").await.unwrap();
        let chat = session.current_chat().unwrap();
        session
            .handle_line(&format!("/upload \"{}\"", doc.display()))
            .await
            .unwrap();

        let output = String::from_utf8(session.into_output()).unwrap();
        assert!(output.contains("Indexed 2 chunks (0 skipped, 0 failed)"), "{output}");
        let stored = persistence
            .uploads_dir()
            .join(chat.to_string())
            .join("travel_notes.txt");
        assert!(stored.exists(), "{}", stored.display());
    }

    #[tokio::test]
    async fn upload_then_ask_titles_and_answers() {
        let dir = TempDir::new().unwrap();
        let doc = dir.path().join("França.txt");
        std::fs::write(
            &doc,
            "Paris is the capital of France. The Eiffel Tower is in Paris.",
        )
        .unwrap();
        let (mut session, persistence) = session(&dir);

        session.handle_line("/new").await.unwrap();
        let chat = session.current_chat().unwrap();
        session
            .handle_line(&format!("/upload {}", doc.display()))
            .await
            .unwrap();
        session
            .handle_line("what is the capital of France? please")
            .await
            .unwrap();

        let history = persistence.fetch_history(chat).unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].role, Role::User);
        assert!(history[1].content.contains("Paris is the capital of France"));
        assert!(!history[1].content.contains("Eiffel"));

        let chats = persistence.list_chats().unwrap();
        assert_eq!(chats[0].title, "What is the capital of France");

        let stored = persistence.uploads_dir().join(format!("{chat}/Franca.txt"));
        assert!(stored.exists());

        let out = String::from_utf8(session.into_output()).unwrap();
        assert!(out.contains("Indexed 2 chunks (0 skipped, 0 failed)"), "{out}");
    }

    #[tokio::test]
    async fn questions_need_a_chat() {
        let dir = TempDir::new().unwrap();
        let (mut session, _) = session(&dir);
        session.handle_line("hello?").await.unwrap();
        let out = String::from_utf8(session.into_output()).unwrap();
        assert!(out.contains("Select or create a chat first"));
    }

    #[tokio::test]
    async fn no_documents_means_insufficient_data() {
        let dir = TempDir::new().unwrap();
        let (mut session, _) = session(&dir);
        session.handle_line("/new").await.unwrap();
        session.handle_line("anything at all").await.unwrap();
        let out = String::from_utf8(session.into_output()).unwrap();
        assert!(out.contains(INSUFFICIENT_DATA_ANSWER));
    }

    #[tokio::test]
    async fn delete_clears_chat_and_quit_stops() {
        let dir = TempDir::new().unwrap();
        let (mut session, persistence) = session(&dir);
        session.handle_line("/new").await.unwrap();
        session.handle_line("/new").await.unwrap();
        session.handle_line("/use 1").await.unwrap();
        assert_eq!(session.current_chat(), Some(1));
        session.handle_line("/delete").await.unwrap();
        assert_eq!(session.current_chat(), None);
        assert_eq!(persistence.list_chats().unwrap().len(), 1);
        session.handle_line("/use 1").await.unwrap();
        assert_eq!(session.current_chat(), None);
        assert_eq!(session.handle_line("/quit").await.unwrap(), Flow::Quit);
        assert_eq!(session.handle_line("/bogus").await.unwrap(), Flow::Continue);
    }
}
