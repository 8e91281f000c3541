//! Span helpers for the generation pipeline

use tracing::Span;

/// Span covering one document generation request.
///
/// # Example
/// ```
/// use strata_telemetry::generation_span;
/// let span = generation_span("req-1", "groq", "llama-3.3-70b-versatile");
/// let _enter = span.enter();
/// ```
pub fn generation_span(request_id: &str, provider: &str, model: &str) -> Span {
    tracing::info_span!(
        "strategy.generate",
        request.id = request_id,
        provider.name = provider,
        model.name = model,
        otel.kind = "internal"
    )
}

/// Span for one streaming call to an LLM backend.
pub fn provider_call_span(provider: &str, model: &str, max_tokens: u32) -> Span {
    tracing::info_span!(
        "provider.call",
        provider.name = provider,
        model.name = model,
        max_tokens,
        otel.kind = "client"
    )
}

/// Span for fetching one ticket from the issue tracker.
pub fn ticket_fetch_span(ticket_id: &str) -> Span {
    tracing::info_span!("ticket.fetch", ticket.id = ticket_id, otel.kind = "client")
}

/// Span for one section of a sectional generation.
pub fn section_span(number: &str, title: &str) -> Span {
    tracing::info_span!("strategy.section", section.number = number, section.title = title)
}
