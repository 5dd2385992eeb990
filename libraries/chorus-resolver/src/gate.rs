//! Disambiguation gate
//!
//! When a lookup returns several candidates the flow suspends and asks the
//! requester to pick one. The gate only sees candidates through a pair of
//! label functions, so one implementation serves every candidate type.
//!
//! Questions travel over an explicit request/response channel:
//!
//! ```text
//! resolver ──Question──▶ Disambiguator ──PendingQuestion──▶ UI / chat
//!          ◀──index──────               ◀──choose("2")────
//! ```
//!
//! Cancellation (token fired, question dropped, nobody listening) ends the
//! flow without delivery and is not an error.

use async_trait::async_trait;
use chorus_core::{ResolveError, Result};
use std::fmt;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Primary and optional secondary label extraction for a candidate type
pub struct Labeler<T> {
    primary: fn(&T) -> String,
    secondary: Option<fn(&T) -> Option<String>>,
}

impl<T> Labeler<T> {
    pub fn new(primary: fn(&T) -> String) -> Self {
        Self {
            primary,
            secondary: None,
        }
    }

    /// Secondary label; `None` for a candidate leaves its option without one
    pub fn with_secondary(mut self, secondary: fn(&T) -> Option<String>) -> Self {
        self.secondary = Some(secondary);
        self
    }

    pub fn primary(&self, candidate: &T) -> String {
        (self.primary)(candidate)
    }

    pub fn secondary(&self, candidate: &T) -> Option<String> {
        self.secondary.and_then(|f| f(candidate))
    }
}

/// One selectable option of a question
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionOption {
    pub key: String,
    pub primary: String,
    pub secondary: Option<String>,
}

/// Candidates presented to the requester, keyed "1".."n"
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    options: Vec<QuestionOption>,
}

impl Question {
    pub fn new(labels: Vec<(String, Option<String>)>) -> Self {
        let options = labels
            .into_iter()
            .enumerate()
            .map(|(i, (primary, secondary))| QuestionOption {
                key: (i + 1).to_string(),
                primary,
                secondary,
            })
            .collect();
        Self { options }
    }

    pub fn options(&self) -> &[QuestionOption] {
        &self.options
    }

    pub fn len(&self) -> usize {
        self.options.len()
    }

    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }

    /// Index of the option with the given key
    pub fn index_of(&self, key: &str) -> Option<usize> {
        let key = key.trim();
        self.options.iter().position(|o| o.key == key)
    }
}

impl fmt::Display for Question {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for option in &self.options {
            match &option.secondary {
                Some(secondary) => writeln!(f, "{}: {} ({})", option.key, option.primary, secondary)?,
                None => writeln!(f, "{}: {}", option.key, option.primary)?,
            }
        }
        Ok(())
    }
}

/// Presents questions and waits for the requester's choice
#[async_trait]
pub trait Disambiguator: Send + Sync {
    /// Index of the chosen option, or `None` if the requester walked away
    async fn ask(&self, question: Question) -> Result<Option<usize>>;
}

/// Question waiting for an answer on the receiving side of a channel gate
#[derive(Debug)]
pub struct PendingQuestion {
    question: Question,
    reply: oneshot::Sender<usize>,
}

impl PendingQuestion {
    pub fn question(&self) -> &Question {
        &self.question
    }

    /// Answer with an option key
    ///
    /// Unknown keys hand the question back so the caller can ask again.
    pub fn choose(self, key: &str) -> std::result::Result<(), Self> {
        match self.question.index_of(key) {
            Some(index) => {
                // The asking side may have been cancelled meanwhile; nothing to do then.
                let _ = self.reply.send(index);
                Ok(())
            }
            None => Err(self),
        }
    }

    /// Decline to answer
    pub fn cancel(self) {}
}

/// Disambiguator backed by an mpsc channel of `PendingQuestion`s
#[derive(Debug, Clone)]
pub struct ChannelDisambiguator {
    questions: mpsc::Sender<PendingQuestion>,
}

impl ChannelDisambiguator {
    /// Create the gate and the receiver the answering side listens on
    pub fn channel(buffer: usize) -> (Self, mpsc::Receiver<PendingQuestion>) {
        let (tx, rx) = mpsc::channel(buffer.max(1));
        (Self { questions: tx }, rx)
    }
}

#[async_trait]
impl Disambiguator for ChannelDisambiguator {
    async fn ask(&self, question: Question) -> Result<Option<usize>> {
        let (reply, answer) = oneshot::channel();
        let pending = PendingQuestion { question, reply };

        if self.questions.send(pending).await.is_err() {
            debug!("No one is listening for questions");
            return Ok(None);
        }

        Ok(answer.await.ok())
    }
}

/// Suspends resolution until one candidate is chosen
#[derive(Clone)]
pub struct DisambiguationGate {
    disambiguator: Arc<dyn Disambiguator>,
}

impl DisambiguationGate {
    pub fn new(disambiguator: Arc<dyn Disambiguator>) -> Self {
        Self { disambiguator }
    }

    /// Ask the requester to pick one of `candidates`
    ///
    /// # Errors
    /// `Cancelled` when the token fires or the requester walks away.
    pub async fn ask<T: Send>(
        &self,
        candidates: Vec<T>,
        labels: &Labeler<T>,
        cancel: &CancellationToken,
    ) -> Result<T> {
        let question = Question::new(
            candidates
                .iter()
                .map(|c| (labels.primary(c), labels.secondary(c)))
                .collect(),
        );

        info!(options = question.len(), "Asking requester to choose");

        let choice = tokio::select! {
            biased;
            _ = cancel.cancelled() => None,
            answer = self.disambiguator.ask(question) => answer?,
        };

        let Some(index) = choice else {
            debug!("Disambiguation cancelled");
            return Err(ResolveError::Cancelled);
        };

        debug!(index, "Requester chose candidate");
        candidates.into_iter().nth(index).ok_or_else(|| {
            ResolveError::invalid_input(format!("No option at position {}", index + 1))
        })
    }
}
