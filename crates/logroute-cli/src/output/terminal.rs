//! Terminal output formatter

use logroute_core::memory::MemoryStats;
use logroute_core::{
    AskResponse, ComparisonResult, HealthStatus, Insights, ProviderHealth, RequestFailure,
    RouteResponse, StatsReport,
};

pub fn format_failure(failure: &RequestFailure) -> String {
    let mut output = format!("Error: {}\n", failure.message);
    output.push_str(&format!("Request: {}\n", failure.request));
    if !failure.attempted_providers.is_empty() {
        let tried: Vec<&str> = failure
            .attempted_providers
            .iter()
            .map(|p| p.as_str())
            .collect();
        output.push_str(&format!("Tried:   {}\n", tried.join(", ")));
    }
    output
}

pub fn format_route(response: &RouteResponse) -> String {
    let details = &response.provider_details;
    let mut output = format!("{}\n\n", response.response_text.trim_end());
    output.push_str(&format!(
        "-- {} ({}) {}ms, {} category",
        response.provider_used, details.model, details.latency_ms, details.category
    ));
    if details.used_fallback {
        let tried: Vec<&str> = details.attempted.iter().map(|p| p.as_str()).collect();
        output.push_str(&format!(", fallback after {}", tried.join(" -> ")));
    }
    output.push('\n');
    output
}

pub fn format_ask(response: &AskResponse) -> String {
    let mut output = format!("{}\n\n", response.summary);
    output.push_str(&format!(
        "-- query by {} ({}) in {}ms",
        response.provider, response.model, response.latency_ms
    ));
    if response.used_fallback_query {
        output.push_str(", broad fallback query used");
    }
    output.push('\n');
    output
}

pub fn format_stats(report: &StatsReport) -> String {
    let available: Vec<&str> = report
        .available_providers
        .iter()
        .map(|p| p.as_str())
        .collect();

    let mut output = String::new();
    output.push_str(&format!(
        "Available:       {}\n",
        if available.is_empty() {
            "none".to_string()
        } else {
            available.join(", ")
        }
    ));
    output.push_str(&format!(
        "Fallback:        {}\n",
        if report.enable_fallback { "enabled" } else { "disabled" }
    ));
    output.push_str(&format!("Total attempts:  {}\n\n", report.total_requests));

    output.push_str("Providers:\n");
    for (provider, stat) in &report.provider_stats {
        output.push_str(&format!(
            "  {:<8} {:>5} requests {:>5} errors {:>9.1}ms avg\n",
            provider.as_str(),
            stat.request_count,
            stat.error_count,
            stat.mean_latency_ms
        ));
    }

    output.push_str("\nRouting:\n");
    for (category, order) in &report.routing_config.categories {
        let names: Vec<&str> = order.iter().map(|p| p.as_str()).collect();
        output.push_str(&format!("  {:<8} {}\n", category.as_str(), names.join(" > ")));
    }
    let default: Vec<&str> = report.routing_config.default.iter().map(|p| p.as_str()).collect();
    output.push_str(&format!("  {:<8} {}\n", "default", default.join(" > ")));

    output
}

pub fn format_health(health: &[ProviderHealth]) -> String {
    let mut output = String::new();
    for entry in health {
        let status = match entry.status {
            HealthStatus::Healthy => "healthy",
            HealthStatus::Unhealthy => "unhealthy",
            HealthStatus::NotConfigured => "not configured",
        };
        output.push_str(&format!("{:<8} {}", entry.provider.as_str(), status));
        if let Some(ms) = entry.latency_ms {
            output.push_str(&format!(" ({}ms)", ms));
        }
        if let Some(model) = &entry.model {
            output.push_str(&format!(" [{}]", model));
        }
        if entry.status == HealthStatus::Unhealthy {
            if let Some(error) = &entry.error {
                output.push_str(&format!(": {}", error));
            }
        }
        output.push('\n');
    }
    output
}

pub fn format_comparison(results: &[ComparisonResult]) -> String {
    if results.is_empty() {
        return "No providers available to compare.\n".to_string();
    }

    let mut output = String::new();
    for result in results {
        output.push_str(&format!("== {} ", result.provider));
        if let Some(model) = &result.model {
            output.push_str(&format!("({}) ", model));
        }
        if let Some(ms) = result.latency_ms {
            output.push_str(&format!("{}ms", ms));
        }
        output.push('\n');

        match (&result.response, &result.error) {
            (Some(text), _) if result.success => output.push_str(text.trim_end()),
            (_, Some(error)) => output.push_str(&format!("failed: {}", error)),
            _ => output.push_str("failed"),
        }
        output.push_str("\n\n");
    }
    output
}

pub fn format_insights(insights: &Insights, stats: Option<&MemoryStats>) -> String {
    let mut output = String::new();

    output.push_str("Top errors:\n");
    if insights.top_errors.is_empty() {
        output.push_str("  (none yet)\n");
    }
    for entry in &insights.top_errors {
        output.push_str(&format!("  {:>4}  {}\n", entry.count, entry.pattern));
    }

    output.push_str("\nTop services:\n");
    if insights.top_services.is_empty() {
        output.push_str("  (none yet)\n");
    }
    for entry in &insights.top_services {
        output.push_str(&format!("  {:>4}  {}\n", entry.count, entry.service));
    }

    if !insights.query_patterns.is_empty() {
        output.push_str("\nQuery types:\n");
        for (kind, count) in &insights.query_patterns {
            output.push_str(&format!("  {:>4}  {}\n", count, kind));
        }
    }

    output.push_str(&format!(
        "\nSession: {} min\n",
        insights.session_duration_minutes
    ));

    if let Some(stats) = stats {
        output.push_str(&format!(
            "Memory:  {} turns, {} queries, {} error patterns, {} services\n",
            stats.conversation_turns,
            stats.query_context_items,
            stats.learned_error_patterns,
            stats.tracked_services
        ));
    }

    output
}
