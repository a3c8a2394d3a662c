use common::helper::error_chain_fmt;
use rust_bert::{
    pipelines::sentence_embeddings::{SentenceEmbeddingsBuilder, SentenceEmbeddingsModelType},
    RustBertError,
};
use std::{
    sync::mpsc,
    thread::{self, JoinHandle},
};
use tokio::{sync::oneshot, task};
use tracing::info;

/// Service generating sentence embeddings for listing descriptions, using
/// models available from Hugging Face.
///
/// Using model AllMiniLmL12V2: 384-dimensional vectors, matching the
/// `vector(384)` columns of the schema.
pub struct BertEmbeddingsService {
    sender_to_runner: mpsc::SyncSender<RunnerMessage>,
    _thread_handle: JoinHandle<Result<(), BertEmbeddingsServiceError>>,
}

impl BertEmbeddingsService {
    /// Spawns an embeddings generator runner on a separate thread
    /// and returns a handle to interact with it
    pub fn new() -> Self {
        let (sender, receiver) = mpsc::sync_channel(100);
        let handle = thread::spawn(move || Self::runner(receiver));

        Self {
            _thread_handle: handle,
            sender_to_runner: sender,
        }
    }

    /// The embeddings generator runner itself
    ///
    /// Running the model inside a future should be avoided, so the runner
    /// lives on a dedicated sync thread. Each message carries a batch of
    /// texts and a sender for the resulting embeddings.
    #[tracing::instrument(name = "Embeddings runner", skip(receiver))]
    fn runner(receiver: mpsc::Receiver<RunnerMessage>) -> Result<(), BertEmbeddingsServiceError> {
        let model = SentenceEmbeddingsBuilder::remote(SentenceEmbeddingsModelType::AllMiniLmL12V2)
            .create_model()?;
        info!("Embeddings model loaded");

        while let Ok((texts, sender)) = receiver.recv() {
            let texts: Vec<&str> = texts.iter().map(String::as_str).collect();
            let embeddings = model.encode(&texts)?;

            sender.send(embeddings).expect("sending embeddings");
        }

        Ok(())
    }

    /// One embedding per input text, in input order
    #[tracing::instrument(name = "Generate embeddings batch", skip(self, texts), fields(batch_size = texts.len()))]
    pub async fn generate_embeddings(
        &self,
        texts: Vec<String>,
    ) -> Result<Vec<Vec<f32>>, BertEmbeddingsServiceError> {
        let (sender, receiver) = oneshot::channel();

        task::block_in_place(|| self.sender_to_runner.send((texts, sender)))?;

        Ok(receiver.await?)
    }
}

impl Default for BertEmbeddingsService {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(thiserror::Error)]
pub enum BertEmbeddingsServiceError {
    #[error("Embeddings model error: {0}")]
    ModelError(#[from] RustBertError),
    #[error(transparent)]
    SenderError(
        #[from]
        std::sync::mpsc::SendError<(
            Vec<std::string::String>,
            tokio::sync::oneshot::Sender<Vec<Vec<f32>>>,
        )>,
    ),
    #[error(transparent)]
    ReceiverError(#[from] tokio::sync::oneshot::error::RecvError),
}

impl std::fmt::Debug for BertEmbeddingsServiceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

/// Message type for internal channel, passing around input texts and generated embeddings
type RunnerMessage = (Vec<String>, oneshot::Sender<Vec<Vec<f32>>>);
