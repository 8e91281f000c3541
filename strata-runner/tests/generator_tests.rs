use async_trait::async_trait;
use futures::StreamExt;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use strata_core::{
    AggregatedContext, ConnectionStatus, Depth, ErrorCode, GenerationRequest, ModelLimits,
    ProviderError, ProviderKind, StreamEvent, TemplateError, TemplateSection, TemplateSource,
    Ticket, TicketSource, TicketSourceError,
};
use strata_model::{
    CompletionRequest, LlmProvider, MockProvider, ModelLimitsTable, ProviderRegistry, TextStream,
};
use strata_runner::{Generator, Outcome, SectionRequest};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

#[derive(Default)]
struct InMemoryTickets {
    tickets: HashMap<String, Ticket>,
    children: HashMap<String, Vec<Ticket>>,
}

impl InMemoryTickets {
    fn with(mut self, ticket: Ticket) -> Self {
        self.tickets.insert(ticket.key.clone(), ticket);
        self
    }

    fn with_children(mut self, epic: &str, children: Vec<Ticket>) -> Self {
        self.children.insert(epic.to_string(), children);
        self
    }
}

#[async_trait]
impl TicketSource for InMemoryTickets {
    async fn fetch(&self, ticket_id: &str) -> Result<Ticket, TicketSourceError> {
        if ticket_id == "BROKEN-1" {
            return Err(TicketSourceError::Connection("Cannot connect to JIRA server".into()));
        }
        self.tickets
            .get(ticket_id)
            .cloned()
            .ok_or_else(|| TicketSourceError::NotFound(ticket_id.to_string()))
    }

    async fn fetch_children(&self, epic_key: &str) -> Result<Vec<Ticket>, TicketSourceError> {
        Ok(self.children.get(epic_key).cloned().unwrap_or_default())
    }

    async fn test_connection(&self) -> ConnectionStatus {
        ConnectionStatus::ok("in memory")
    }
}

/// Template source with a fixed outline, or none at all.
struct FixedTemplate(Option<Vec<TemplateSection>>);

impl TemplateSource for FixedTemplate {
    fn locate(&self) -> Option<PathBuf> {
        self.0.as_ref().map(|_| PathBuf::from("outline.txt"))
    }

    fn parse(&self, _path: &Path) -> Result<Vec<TemplateSection>, TemplateError> {
        self.0.clone().ok_or_else(|| TemplateError::Parse("no outline".into()))
    }
}

/// Yields one chunk and then never finishes.
struct StallingProvider;

#[async_trait]
impl LlmProvider for StallingProvider {
    fn name(&self) -> &str {
        "stalling"
    }

    async fn generate_stream(&self, _request: CompletionRequest) -> Result<TextStream, ProviderError> {
        let first = futures::stream::iter(vec![Ok("partial".to_string())]);
        Ok(Box::pin(first.chain(futures::stream::pending())))
    }

    async fn test_connection(&self) -> ConnectionStatus {
        ConnectionStatus::ok("stalling")
    }

    async fn list_models(&self) -> Vec<String> {
        Vec::new()
    }
}

fn payments() -> InMemoryTickets {
    InMemoryTickets::default()
        .with(Ticket::new("PROJ-1", "Payments Epic", "Epic").with_label("security"))
        .with(
            Ticket::new("PROJ-2", "Pay by card", "Story")
                .with_priority("High")
                .with_description("Customers pay with a credit card."),
        )
}

fn generator(tickets: InMemoryTickets, template: FixedTemplate, provider: Arc<dyn LlmProvider>) -> Generator {
    let providers = ProviderRegistry::new().with_provider(ProviderKind::Groq, provider);
    Generator::new(Arc::new(tickets), Arc::new(template), providers)
}

async fn collect(generator: &Generator, request: GenerationRequest) -> (Vec<StreamEvent>, Outcome) {
    let (tx, mut rx) = mpsc::channel(64);
    let outcome = generator.run(request, tx, CancellationToken::new()).await;
    let mut events = Vec::new();
    while let Some(event) = rx.recv().await {
        events.push(event);
    }
    (events, outcome)
}

fn two_sections() -> Vec<TemplateSection> {
    vec![
        TemplateSection::new("1", "Introduction")
            .with_subsections(vec![TemplateSection::new("1.1", "Purpose")]),
        TemplateSection::new("2", "Risk Management"),
    ]
}

#[tokio::test]
async fn monolithic_run_streams_content_then_done() {
    let mock = MockProvider::new("groq").with_chunk("Hello").with_chunk(" world");
    let generator = generator(payments(), FixedTemplate(None), Arc::new(mock.clone()));
    let request = GenerationRequest::new(["PROJ-1"], ProviderKind::Groq, "llama-3.3-70b-versatile")
        .with_depth(Depth::Standard);

    let (events, outcome) = collect(&generator, request).await;

    assert_eq!(events.len(), 6, "{events:?}");
    assert_eq!(events[0], StreamEvent::status(1, "Analyzing JIRA context (1 tickets)..."));
    assert_eq!(events[1], StreamEvent::status(2, "Parsing template structure..."));
    assert!(matches!(&events[2], StreamEvent::Status { stage: 3, message } if message.starts_with("Generating test strategy (utilization: ")));
    assert_eq!(events[3], StreamEvent::content("Hello"));
    assert_eq!(events[4], StreamEvent::content(" world"));
    assert!(matches!(events[5], StreamEvent::Done { total_tokens_used: 2, .. }));
    match outcome {
        Outcome::Completed { title, total_tokens_used, .. } => {
            assert_eq!(title, "Test Strategy: Payments Epic");
            assert_eq!(total_tokens_used, 2);
        }
        other => panic!("unexpected outcome {other:?}"),
    }

    let requests = mock.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].max_tokens, 4000);
    // Default outline is used when no template file exists.
    assert!(requests[0].prompt.contains("13. Appendices"));
}

#[tokio::test]
async fn no_tickets_ends_with_error() {
    let mock = MockProvider::new("groq").with_chunk("unused");
    let generator = generator(InMemoryTickets::default(), FixedTemplate(None), Arc::new(mock.clone()));
    let request = GenerationRequest::new(["PROJ-404"], ProviderKind::Groq, "llama-3.3-70b-versatile");

    let (events, outcome) = collect(&generator, request).await;

    assert_eq!(
        events,
        vec![
            StreamEvent::status(1, "Analyzing JIRA context (1 tickets)..."),
            StreamEvent::error("No tickets found or accessible", ErrorCode::NoTickets),
        ]
    );
    assert_eq!(outcome, Outcome::Failed(ErrorCode::NoTickets));
    assert!(mock.requests().is_empty());
}

#[tokio::test]
async fn partial_fetch_failures_become_a_warning() {
    let mock = MockProvider::new("groq").with_chunk("ok");
    let generator = generator(payments(), FixedTemplate(None), Arc::new(mock));
    let request = GenerationRequest::new(
        ["PROJ-2", "PROJ-9", "BROKEN-1"],
        ProviderKind::Groq,
        "llama-3.3-70b-versatile",
    );

    let (events, _) = collect(&generator, request).await;

    assert_eq!(
        events[1],
        StreamEvent::warning(
            "Fetched 1 tickets with 2 errors: Ticket PROJ-9 not found, \
             Error fetching BROKEN-1: Connection error: Cannot connect to JIRA server"
        )
    );
}

#[tokio::test]
async fn epic_children_are_added_once() {
    let tickets = payments().with_children(
        "PROJ-1",
        vec![
            Ticket::new("PROJ-2", "Pay by card", "Story"),
            Ticket::new("PROJ-3", "Refunds", "Story"),
        ],
    );
    let mock = MockProvider::new("groq");
    let generator = generator(tickets, FixedTemplate(None), Arc::new(mock.clone()));
    let request =
        GenerationRequest::new(["PROJ-1", "PROJ-2"], ProviderKind::Groq, "llama-3.3-70b-versatile");

    let (events, _) = collect(&generator, request).await;
    // The status counts requested ids; the prompt sees the expanded set.
    assert_eq!(events[0], StreamEvent::status(1, "Analyzing JIRA context (2 tickets)..."));
    assert!(mock.requests()[0].prompt.contains("**Total Tickets Analyzed**: 3"));

    let request = GenerationRequest::new(["PROJ-1"], ProviderKind::Groq, "llama-3.3-70b-versatile")
        .with_fetch_children(false);
    let (events, _) = collect(&generator, request).await;
    assert_eq!(events[0], StreamEvent::status(1, "Analyzing JIRA context (1 tickets)..."));
    assert!(mock.requests()[1].prompt.contains("**Total Tickets Analyzed**: 1"));
}

#[tokio::test]
async fn sectional_run_frames_each_section() {
    let mock = MockProvider::new("groq").with_chunk("Body.");
    let limits = ModelLimitsTable::new().with_entry(
        ProviderKind::Groq,
        "tiny-model",
        ModelLimits::new(32_768, 4096),
    );
    let generator = generator(payments(), FixedTemplate(Some(two_sections())), Arc::new(mock.clone()))
        .with_limits(limits);
    let request = GenerationRequest::new(["PROJ-1"], ProviderKind::Groq, "tiny-model")
        .with_depth(Depth::Detailed);

    let (events, outcome) = collect(&generator, request).await;

    let framed: Vec<StreamEvent> = events
        .iter()
        .filter(|e| !matches!(e, StreamEvent::Status { .. } | StreamEvent::Done { .. }))
        .cloned()
        .collect();
    assert_eq!(
        framed,
        vec![
            StreamEvent::section_start("Introduction", "1"),
            StreamEvent::content("Body."),
            StreamEvent::section_complete("Introduction"),
            StreamEvent::section_start("Risk Management", "2"),
            StreamEvent::content("Body."),
            StreamEvent::section_complete("Risk Management"),
        ]
    );
    assert!(matches!(outcome, Outcome::Completed { total_tokens_used: 2, .. }));

    let requests = mock.requests();
    assert_eq!(requests.len(), 2);
    // min(8000, 4096 - 1000) split across two sections.
    assert!(requests.iter().all(|r| r.max_tokens == 1548));
    assert!(requests[0].prompt.contains("Generate ONLY section 1. Introduction now."));
    assert!(requests[1].prompt.contains("## PREVIOUSLY GENERATED CONTENT (for consistency)\nBody."));
}

#[tokio::test]
async fn provider_failure_after_content_is_reported() {
    let mock = MockProvider::new("groq")
        .with_chunk("Partial")
        .with_failure(ProviderError::RateLimited("Groq API error (429): slow down".into()));
    let generator = generator(payments(), FixedTemplate(None), Arc::new(mock));
    let request = GenerationRequest::new(["PROJ-1"], ProviderKind::Groq, "llama-3.3-70b-versatile");

    let (events, outcome) = collect(&generator, request).await;

    let tail = &events[events.len() - 2..];
    assert_eq!(tail[0], StreamEvent::content("Partial"));
    assert!(matches!(&tail[1], StreamEvent::Error { code: ErrorCode::RateLimit, .. }));
    assert_eq!(outcome, Outcome::Failed(ErrorCode::RateLimit));
}

#[tokio::test]
async fn unregistered_provider_fails_without_fetching() {
    let generator = generator(payments(), FixedTemplate(None), Arc::new(MockProvider::new("groq")));
    let request = GenerationRequest::new(["PROJ-1"], ProviderKind::Ollama, "llama3.1");

    let (events, outcome) = collect(&generator, request).await;

    assert_eq!(events.len(), 1);
    assert!(matches!(&events[0], StreamEvent::Error { error, .. } if error.contains("ollama")));
    assert_eq!(outcome, Outcome::Failed(ErrorCode::Unknown));
}

#[tokio::test]
async fn cancelling_stops_forwarding_chunks() {
    let generator = generator(payments(), FixedTemplate(None), Arc::new(StallingProvider));
    let request = GenerationRequest::new(["PROJ-1"], ProviderKind::Groq, "llama-3.3-70b-versatile");
    let (tx, mut rx) = mpsc::channel(64);
    let cancel = CancellationToken::new();

    let task = {
        let generator = generator.clone();
        let cancel = cancel.clone();
        tokio::spawn(async move { generator.run(request, tx, cancel).await })
    };

    loop {
        match rx.recv().await {
            Some(StreamEvent::Content { text }) => {
                assert_eq!(text, "partial");
                break;
            }
            Some(_) => continue,
            None => panic!("stream ended before content"),
        }
    }
    cancel.cancel();

    let outcome = tokio::time::timeout(Duration::from_secs(5), task).await.unwrap().unwrap();
    assert_eq!(outcome, Outcome::Cancelled);
    assert!(rx.recv().await.is_none());
}

#[tokio::test]
async fn event_stream_ends_after_done() {
    let mock = MockProvider::new("groq").with_chunk("Hello");
    let generator = generator(payments(), FixedTemplate(None), Arc::new(mock));
    let request = GenerationRequest::new(["PROJ-1"], ProviderKind::Groq, "llama-3.3-70b-versatile");

    let events: Vec<StreamEvent> = generator.stream(request).collect().await;

    assert_eq!(events.iter().filter(|e| e.is_terminal()).count(), 1);
    assert!(matches!(events.last(), Some(StreamEvent::Done { total_tokens_used: 1, .. })));
}

#[tokio::test]
async fn regenerate_section_collects_text() {
    let mock = MockProvider::new("groq").with_chunk("## 4. ").with_chunk("Automation");
    let generator = generator(payments(), FixedTemplate(None), Arc::new(mock.clone()));

    let text = generator
        .regenerate_section(SectionRequest {
            section_number: "4".into(),
            section_title: "Test Automation Strategy".into(),
            jira_context: AggregatedContext::default(),
            previous_content: "## 3. Approach".into(),
            provider: ProviderKind::Groq,
            model: "llama-3.3-70b-versatile".into(),
            temperature: 0.2,
        })
        .await
        .unwrap();

    assert_eq!(text, "## 4. Automation");
    let request = &mock.requests()[0];
    assert_eq!(request.max_tokens, 4000);
    assert!(request.prompt.contains("Generate ONLY section 4. Test Automation Strategy now."));
    assert!(request.system_prompt.contains("Regenerate only the requested section"));
}
