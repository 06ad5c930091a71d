use crate::models::book::{ResultPage, SearchDocument};
use crate::services::client::{FetchError, SearchTransport};
use crate::services::query::RequestSpec;
use reqwest::Url;
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tracing::debug;

pub type Transport = Arc<dyn SearchTransport + Send + Sync>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchStatus {
    Idle,
    Loading,
    Success,
    Error(String),
}

/// What the front end should show right now.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewState {
    Idle,
    Loading,
    Error(String),
    Empty,
    Populated,
}

/// A request that has been issued but not yet resolved.
#[derive(Debug, Clone)]
pub struct Ticket {
    generation: u64,
    url: Url,
    page: u32,
}

impl Ticket {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub async fn run(self, transport: &(dyn SearchTransport + Send + Sync)) -> Completion {
        let outcome = match transport.fetch(&self.url).await {
            Ok(body) => serde_json::from_str::<SearchDocument>(&body).map_err(FetchError::from),
            Err(e) => Err(e),
        };

        Completion {
            generation: self.generation,
            page: self.page,
            outcome,
        }
    }
}

#[derive(Debug)]
pub struct Completion {
    generation: u64,
    page: u32,
    outcome: Result<SearchDocument, FetchError>,
}

impl Completion {
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// Owns the fetch lifecycle and the single result page on display.
///
/// Every issued request gets the next generation number; a completion is
/// applied only if its generation is still the latest one, so responses
/// that arrive out of order can never overwrite newer state.
pub struct ResultController {
    status: FetchStatus,
    page: ResultPage,
    generation: u64,
    in_flight: Option<JoinHandle<()>>,
}

impl Default for ResultController {
    fn default() -> Self {
        Self::new()
    }
}

impl ResultController {
    pub fn new() -> Self {
        Self {
            status: FetchStatus::Idle,
            page: ResultPage::empty(1),
            generation: 0,
            in_flight: None,
        }
    }

    pub fn status(&self) -> &FetchStatus {
        &self.status
    }

    pub fn page(&self) -> &ResultPage {
        &self.page
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn view(&self) -> ViewState {
        match &self.status {
            FetchStatus::Idle => ViewState::Idle,
            FetchStatus::Loading => ViewState::Loading,
            FetchStatus::Error(message) => ViewState::Error(message.clone()),
            FetchStatus::Success if self.page.items.is_empty() => ViewState::Empty,
            FetchStatus::Success => ViewState::Populated,
        }
    }

    pub fn begin(&mut self, spec: &RequestSpec) -> Ticket {
        self.generation += 1;
        self.status = FetchStatus::Loading;

        let ticket = Ticket {
            generation: self.generation,
            url: spec.url(),
            page: spec.page,
        };
        debug!("Issuing request #{}: {}", ticket.generation, ticket.url);
        ticket
    }

    /// Returns false when the completion belongs to a superseded request.
    pub fn apply(&mut self, completion: Completion) -> bool {
        if completion.generation != self.generation {
            debug!(
                "Discarding stale response #{} (current #{})",
                completion.generation, self.generation
            );
            return false;
        }

        match completion.outcome {
            Ok(document) => {
                self.page = ResultPage::from_document(document, completion.page);
                self.status = FetchStatus::Success;
            }
            Err(e) => {
                debug!("Request #{} failed: {}", completion.generation, e);
                self.page = ResultPage::empty(completion.page);
                self.status = FetchStatus::Error(e.to_string());
            }
        }
        true
    }

    /// Starts a fetch for `spec` on the current runtime, aborting whatever
    /// was still in flight. The completion is delivered through `completions`
    /// and must be handed back to [`ResultController::apply`].
    pub fn dispatch(
        &mut self,
        spec: &RequestSpec,
        transport: &Transport,
        completions: &UnboundedSender<Completion>,
    ) -> u64 {
        let ticket = self.begin(spec);
        let generation = ticket.generation;

        if let Some(previous) = self.in_flight.take() {
            previous.abort();
        }

        let transport = Arc::clone(transport);
        let completions = completions.clone();
        self.in_flight = Some(tokio::spawn(async move {
            let completion = ticket.run(transport.as_ref()).await;
            let _ = completions.send(completion);
        }));

        generation
    }

    /// Issues `spec` and waits for it in place.
    pub async fn refresh(
        &mut self,
        spec: &RequestSpec,
        transport: &(dyn SearchTransport + Send + Sync),
    ) -> &FetchStatus {
        let ticket = self.begin(spec);
        let completion = ticket.run(transport).await;
        self.apply(completion);
        &self.status
    }
}

impl Drop for ResultController {
    fn drop(&mut self) {
        if let Some(handle) = self.in_flight.take() {
            handle.abort();
        }
    }
}
