//! Keyword tables used to pull risk and technology signals out of tickets.

use strata_core::Ticket;

/// Label fragments that mark a ticket as risky.
pub const RISK_LABELS: &[&str] = &[
    "security",
    "performance",
    "compliance",
    "critical",
    "production",
    "payment",
    "pii",
    "gdpr",
    "hipaa",
];

/// Description keyword to risk indicator.
pub const RISK_KEYWORDS: &[(&str, &str)] = &[
    ("payment", "Payment processing involved"),
    ("credit card", "PCI DSS considerations"),
    ("pii", "Personal identifiable information"),
    ("gdpr", "GDPR compliance required"),
    ("hipaa", "HIPAA compliance required"),
    ("security", "Security considerations"),
    ("authentication", "Authentication system"),
    ("authorization", "Authorization system"),
    ("third-party", "Third-party integration"),
    ("external api", "External API dependency"),
    ("performance", "Performance requirements"),
    ("scale", "Scalability considerations"),
    ("concurrent", "Concurrency handling"),
    ("transaction", "Transaction handling"),
    ("migration", "Data migration involved"),
    ("legacy", "Legacy system integration"),
];

/// Description keyword to technology signal.
pub const TECH_PATTERNS: &[(&str, &str)] = &[
    ("react", "React frontend"),
    ("angular", "Angular frontend"),
    ("vue", "Vue.js frontend"),
    ("node.js", "Node.js backend"),
    ("python", "Python backend"),
    ("java", "Java backend"),
    ("spring", "Spring framework"),
    ("django", "Django framework"),
    ("flask", "Flask framework"),
    ("fastapi", "FastAPI framework"),
    ("postgresql", "PostgreSQL database"),
    ("mysql", "MySQL database"),
    ("mongodb", "MongoDB database"),
    ("redis", "Redis cache"),
    ("docker", "Docker containers"),
    ("kubernetes", "Kubernetes orchestration"),
    ("aws", "AWS cloud"),
    ("azure", "Azure cloud"),
    ("gcp", "Google Cloud Platform"),
    ("rest api", "REST API"),
    ("graphql", "GraphQL API"),
    ("grpc", "gRPC API"),
    ("microservice", "Microservices architecture"),
    ("serverless", "Serverless architecture"),
    ("lambda", "AWS Lambda"),
];

/// Risk indicators for one ticket, from its labels, description and priority.
pub fn risk_indicators(ticket: &Ticket) -> Vec<String> {
    let mut indicators = Vec::new();

    for label in &ticket.labels {
        let lower = label.to_lowercase();
        if RISK_LABELS.iter().any(|risk| lower.contains(risk)) {
            indicators.push(format!("Label: {}", label));
        }
    }

    let description = ticket.description.as_deref().unwrap_or_default().to_lowercase();
    for (keyword, indicator) in RISK_KEYWORDS {
        if description.contains(keyword) {
            indicators.push((*indicator).to_string());
        }
    }

    match ticket.priority.as_deref() {
        Some("Critical") | Some("Highest") => indicators.push("Critical priority".to_string()),
        Some("High") => indicators.push("High priority".to_string()),
        _ => {}
    }

    dedup_preserving_order(indicators)
}

/// Technology signals mentioned in a description.
pub fn technical_signals(description: Option<&str>) -> Vec<&'static str> {
    let Some(text) = description.filter(|d| !d.is_empty()) else {
        return Vec::new();
    };
    let lower = text.to_lowercase();
    TECH_PATTERNS
        .iter()
        .filter(|(pattern, _)| lower.contains(pattern))
        .map(|(_, signal)| *signal)
        .collect()
}

pub(crate) fn dedup_preserving_order(items: Vec<String>) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    items.into_iter().filter(|item| seen.insert(item.clone())).collect()
}
