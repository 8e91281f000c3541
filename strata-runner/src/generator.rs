use crate::budget::{calculate_depth_tokens, per_section_tokens, should_use_sectional};
use crate::fetch::{FetchReport, append_epic_children, fetch_all};
use crate::stream::EventStream;
use futures::StreamExt;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use strata_context::{ContextOptimizer, aggregate};
use strata_core::{
    AggregatedContext, Depth, ErrorCode, GenerationRequest, ModelLimits, ProviderKind,
    STAGE_ANALYZING, STAGE_GENERATING, STAGE_TEMPLATE, StrataError, StreamEvent,
    TemplateSection, TemplateSource, TemplateStructure, Ticket, TicketSource,
};
use strata_model::{CompletionRequest, LlmProvider, ModelLimitsTable, ProviderRegistry};
use strata_prompt::{
    GENERATION_SYSTEM_PROMPT, PromptInputs, REGENERATE_SYSTEM_PROMPT, build_generation_prompt,
    build_section_prompt, document_title, resolve_template,
};
use strata_telemetry::{generation_span, provider_call_span, section_span};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

/// Events buffered between the pipeline task and a slow consumer.
pub const EVENT_BUFFER: usize = 32;

/// Max tokens for a single regenerated section.
pub const REGENERATE_MAX_TOKENS: u32 = 4000;

const WARNING_ERROR_SAMPLES: usize = 3;

/// How a run ended.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Completed { title: String, total_tokens_used: usize, generation_time_seconds: f64 },
    Failed(ErrorCode),
    Cancelled,
}

/// Request to regenerate one section outside a full run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SectionRequest {
    pub section_number: String,
    pub section_title: String,
    pub jira_context: AggregatedContext,
    #[serde(default)]
    pub previous_content: String,
    pub provider: ProviderKind,
    pub model: String,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

fn default_temperature() -> f32 {
    0.3
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Monolithic,
    Sectional,
}

enum State {
    Fetching,
    Aggregating { tickets: Vec<Ticket>, errors: Vec<String> },
    ResolvingTemplate { context: AggregatedContext },
    Optimizing { context: AggregatedContext, template: TemplateStructure },
    SelectingMode {
        context: AggregatedContext,
        template: TemplateStructure,
        output_tokens: u32,
        utilization: f64,
    },
    Generating {
        context: AggregatedContext,
        template: TemplateStructure,
        output_tokens: u32,
        mode: Mode,
    },
    Finalizing { title: String, document_chars: usize },
    Failed(StrataError),
}

/// Event sink shared by every pipeline step.
///
/// A send that finds the receiver gone cancels the run.
struct Sink {
    tx: mpsc::Sender<StreamEvent>,
    cancel: CancellationToken,
}

impl Sink {
    async fn send(&self, event: StreamEvent) -> Result<(), StrataError> {
        if self.cancel.is_cancelled() {
            return Err(StrataError::Cancelled);
        }
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(StrataError::Cancelled),
            sent = self.tx.send(event) => sent.map_err(|_| {
                self.cancel.cancel();
                StrataError::Cancelled
            }),
        }
    }
}

/// Everything a step needs that stays fixed for the whole run.
struct RunContext<'a> {
    request: &'a GenerationRequest,
    provider: Arc<dyn LlmProvider>,
    limits: ModelLimits,
    sink: &'a Sink,
}

/// Drives one request from ticket ids to a streamed document.
#[derive(Clone)]
pub struct Generator {
    tickets: Arc<dyn TicketSource>,
    templates: Arc<dyn TemplateSource>,
    providers: ProviderRegistry,
    limits: ModelLimitsTable,
}

impl Generator {
    pub fn new(
        tickets: Arc<dyn TicketSource>,
        templates: Arc<dyn TemplateSource>,
        providers: ProviderRegistry,
    ) -> Self {
        Self { tickets, templates, providers, limits: ModelLimitsTable::default() }
    }

    pub fn with_limits(mut self, limits: ModelLimitsTable) -> Self {
        self.limits = limits;
        self
    }

    pub fn limits(&self) -> &ModelLimitsTable {
        &self.limits
    }

    pub fn providers(&self) -> &ProviderRegistry {
        &self.providers
    }

    pub fn ticket_source(&self) -> &Arc<dyn TicketSource> {
        &self.tickets
    }

    pub fn template_source(&self) -> &Arc<dyn TemplateSource> {
        &self.templates
    }

    /// Runs `request` on a new task and returns its events.
    ///
    /// Dropping the returned stream cancels the run.
    pub fn stream(&self, request: GenerationRequest) -> EventStream {
        let (tx, rx) = mpsc::channel(EVENT_BUFFER);
        let cancel = CancellationToken::new();
        let generator = self.clone();
        let token = cancel.clone();
        tokio::spawn(async move {
            let outcome = generator.run(request, tx, token).await;
            tracing::debug!(?outcome, "generation task finished");
        });
        EventStream::new(rx, cancel)
    }

    /// Runs `request` to completion, sending every event to `tx`.
    ///
    /// Exactly one `done` or `error` event ends the sequence unless the run is
    /// cancelled, in which case nothing further is sent.
    pub async fn run(
        &self,
        request: GenerationRequest,
        tx: mpsc::Sender<StreamEvent>,
        cancel: CancellationToken,
    ) -> Outcome {
        let request_id = uuid::Uuid::new_v4().to_string();
        let span = generation_span(&request_id, request.provider.as_str(), &request.model);
        let sink = Sink { tx, cancel };
        self.drive(request, &sink).instrument(span).await
    }

    async fn drive(&self, request: GenerationRequest, sink: &Sink) -> Outcome {
        let started = Instant::now();
        let prepared = request
            .normalized()
            .and_then(|request| Ok((self.providers.get(request.provider)?, request)));
        let (provider, request) = match prepared {
            Ok(prepared) => prepared,
            Err(err) => return fail(sink, err).await,
        };
        let run = RunContext {
            limits: self.limits.limits_for(request.provider, &request.model),
            request: &request,
            provider,
            sink,
        };
        tracing::info!(
            tickets = request.jira_ids.len(),
            depth = %request.depth,
            "starting generation"
        );

        let mut state = State::Fetching;
        loop {
            if sink.cancel.is_cancelled() && !matches!(state, State::Failed(_)) {
                state = State::Failed(StrataError::Cancelled);
            }
            state = match state {
                State::Fetching => self.fetch(&run).await,
                State::Aggregating { tickets, errors } => analyze(&run, tickets, errors).await,
                State::ResolvingTemplate { context } => self.resolve_template(&run, context).await,
                State::Optimizing { context, template } => optimize(&run, context, template),
                State::SelectingMode { context, template, output_tokens, utilization } => {
                    select_mode(&run, context, template, output_tokens, utilization).await
                }
                State::Generating { context, template, output_tokens, mode } => {
                    generate(&run, &context, &template, output_tokens, mode).await
                }
                State::Finalizing { title, document_chars } => {
                    let total_tokens_used = document_chars / 4;
                    let generation_time_seconds =
                        (started.elapsed().as_secs_f64() * 100.0).round() / 100.0;
                    let event = StreamEvent::done(total_tokens_used, generation_time_seconds);
                    if sink.send(event).await.is_err() {
                        return Outcome::Cancelled;
                    }
                    tracing::info!(total_tokens_used, generation_time_seconds, "generation complete");
                    return Outcome::Completed { title, total_tokens_used, generation_time_seconds };
                }
                State::Failed(StrataError::Cancelled) => {
                    tracing::info!("generation cancelled");
                    return Outcome::Cancelled;
                }
                State::Failed(err) => return fail(sink, err).await,
            }
            .unwrap_or_else(State::Failed);
        }
    }

    async fn fetch(&self, run: &RunContext<'_>) -> Result<State, StrataError> {
        run.sink
            .send(StreamEvent::status(
                STAGE_ANALYZING,
                format!("Analyzing JIRA context ({} tickets)...", run.request.jira_ids.len()),
            ))
            .await?;
        let FetchReport { mut tickets, errors } =
            fetch_all(self.tickets.as_ref(), &run.request.jira_ids).await;

        if tickets.is_empty() {
            tracing::warn!(errors = ?errors, "no tickets could be fetched");
            return Err(StrataError::NoTickets);
        }
        if run.request.fetch_children {
            append_epic_children(self.tickets.as_ref(), &mut tickets).await;
        }

        Ok(State::Aggregating { tickets, errors })
    }

    async fn resolve_template(
        &self,
        run: &RunContext<'_>,
        context: AggregatedContext,
    ) -> Result<State, StrataError> {
        run.sink.send(StreamEvent::status(STAGE_TEMPLATE, "Parsing template structure...")).await?;
        let template = resolve_template(self.templates.as_ref());
        Ok(State::Optimizing { context, template })
    }

    /// Generates one section's text outside a full run.
    pub async fn regenerate_section(&self, request: SectionRequest) -> Result<String, StrataError> {
        let provider = self.providers.get(request.provider)?;
        let section = TemplateSection::new(&request.section_number, &request.section_title);
        let inputs = PromptInputs {
            sections: &[],
            context: &request.jira_context,
            depth: Depth::Detailed,
            focus_areas: &[],
            additional_context: None,
        };
        let prompt = build_section_prompt(&inputs, &section, &request.previous_content);
        let completion = CompletionRequest::new(REGENERATE_SYSTEM_PROMPT, prompt, &request.model)
            .with_temperature(request.temperature)
            .with_max_tokens(REGENERATE_MAX_TOKENS);

        let span = provider_call_span(request.provider.as_str(), &request.model, REGENERATE_MAX_TOKENS);
        async {
            let mut stream = provider.generate_stream(completion).await?;
            let mut text = String::new();
            while let Some(chunk) = stream.next().await {
                text.push_str(&chunk?);
            }
            Ok::<_, StrataError>(text)
        }
        .instrument(span)
        .await
    }
}

async fn fail(sink: &Sink, err: StrataError) -> Outcome {
    let code = err.code();
    tracing::error!(error = %err, code = %code, "generation failed");
    match sink.send(StreamEvent::error(err.to_string(), code)).await {
        Ok(()) => Outcome::Failed(code),
        Err(_) => Outcome::Cancelled,
    }
}

async fn analyze(
    run: &RunContext<'_>,
    tickets: Vec<Ticket>,
    errors: Vec<String>,
) -> Result<State, StrataError> {
    let context = aggregate(&tickets);

    if !errors.is_empty() {
        let sample: Vec<&str> = errors.iter().take(WARNING_ERROR_SAMPLES).map(String::as_str).collect();
        run.sink
            .send(StreamEvent::warning(format!(
                "Fetched {} tickets with {} errors: {}",
                tickets.len(),
                errors.len(),
                sample.join(", ")
            )))
            .await?;
    }

    Ok(State::ResolvingTemplate { context })
}

fn optimize(
    run: &RunContext<'_>,
    context: AggregatedContext,
    template: TemplateStructure,
) -> Result<State, StrataError> {
    let output_tokens = calculate_depth_tokens(run.request.depth, run.limits);
    let (context, metadata) = ContextOptimizer::new(run.limits, output_tokens).optimize(&context);
    tracing::info!(
        level = metadata.optimization_level,
        original_tokens = metadata.original_tokens,
        final_tokens = metadata.final_tokens,
        utilization_pct = metadata.utilization_pct,
        "context optimized"
    );
    if metadata.truncated {
        tracing::debug!(recommendation = %metadata.recommendation(), "context was reduced");
    }
    Ok(State::SelectingMode { context, template, output_tokens, utilization: metadata.utilization_pct })
}

async fn select_mode(
    run: &RunContext<'_>,
    context: AggregatedContext,
    template: TemplateStructure,
    output_tokens: u32,
    utilization: f64,
) -> Result<State, StrataError> {
    let mode = if should_use_sectional(run.request.depth, run.limits) {
        Mode::Sectional
    } else {
        Mode::Monolithic
    };
    tracing::info!(?mode, output_tokens, "generation mode selected");
    run.sink
        .send(StreamEvent::status(
            STAGE_GENERATING,
            format!("Generating test strategy (utilization: {:.0}%)...", utilization),
        ))
        .await?;
    Ok(State::Generating { context, template, output_tokens, mode })
}

async fn generate(
    run: &RunContext<'_>,
    context: &AggregatedContext,
    template: &TemplateStructure,
    output_tokens: u32,
    mode: Mode,
) -> Result<State, StrataError> {
    let request = run.request;
    let inputs = PromptInputs {
        sections: &template.sections,
        context,
        depth: request.depth,
        focus_areas: &request.focus_areas,
        additional_context: request.additional_context.as_deref(),
    };
    let title = document_title(context);

    match mode {
        Mode::Monolithic => {
            let prompt = build_generation_prompt(&inputs, None);
            let text = forward(run, prompt, output_tokens).await?;
            Ok(State::Finalizing { title, document_chars: text.chars().count() })
        }
        Mode::Sectional => {
            let max_tokens = per_section_tokens(output_tokens, template.sections.len());
            let mut written: Vec<String> = Vec::with_capacity(template.sections.len());
            for section in &template.sections {
                run.sink
                    .send(StreamEvent::section_start(&section.title, &section.number))
                    .await?;
                let previous = written.join("\n\n");
                let prompt = build_section_prompt(&inputs, section, &previous);
                let text = forward(run, prompt, max_tokens)
                    .instrument(section_span(&section.number, &section.title))
                    .await?;
                run.sink.send(StreamEvent::section_complete(&section.title)).await?;
                written.push(text);
            }
            let document_chars = written.iter().map(|s| s.chars().count()).sum();
            Ok(State::Finalizing { title, document_chars })
        }
    }
}

/// Streams one completion, forwarding each chunk as a content event.
async fn forward(run: &RunContext<'_>, prompt: String, max_tokens: u32) -> Result<String, StrataError> {
    let request = run.request;
    let completion = CompletionRequest::new(GENERATION_SYSTEM_PROMPT, prompt, &request.model)
        .with_temperature(request.temperature)
        .with_max_tokens(max_tokens);
    let span = provider_call_span(request.provider.as_str(), &request.model, max_tokens);

    async {
        let mut stream = run.provider.generate_stream(completion).await?;
        let mut text = String::new();
        loop {
            tokio::select! {
                biased;
                _ = run.sink.cancel.cancelled() => return Err(StrataError::Cancelled),
                next = stream.next() => match next {
                    Some(Ok(chunk)) => {
                        text.push_str(&chunk);
                        run.sink.send(StreamEvent::content(chunk)).await?;
                    }
                    Some(Err(err)) => return Err(err.into()),
                    None => return Ok(text),
                },
            }
        }
    }
    .instrument(span)
    .await
}
