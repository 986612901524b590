//! Conversation memory under concurrent writers

use logroute_core::config::MemoryConfig;
use logroute_core::memory::{ContextMetadata, TurnMetadata};
use logroute_core::{ConversationMemory, LogEntry, SearchResults};
use std::sync::Arc;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_turns_respect_capacity() {
    let memory = Arc::new(ConversationMemory::default());

    let tasks: Vec<_> = (0..8)
        .map(|task| {
            let memory = Arc::clone(&memory);
            tokio::spawn(async move {
                for i in 0..40 {
                    memory.add_conversation_turn(
                        &format!("task {task} query {i}"),
                        "r",
                        TurnMetadata::default(),
                    );
                }
            })
        })
        .collect();
    for task in tasks {
        task.await.unwrap();
    }

    assert_eq!(memory.turns().len(), 50);
    assert_eq!(memory.memory_stats().conversation_turns, 50);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_pattern_counts_are_exact() {
    let memory = Arc::new(ConversationMemory::default());
    let page = SearchResults::from_items(vec![
        LogEntry::new("t", "gateway", "ERROR", "upstream 502 from pod 7"),
        LogEntry::new("t", "gateway", "WARN", "retrying request 91"),
    ]);

    let tasks: Vec<_> = (0..10)
        .map(|_| {
            let memory = Arc::clone(&memory);
            let page = page.clone();
            tokio::spawn(async move {
                for _ in 0..10 {
                    memory.add_query_context(
                        "gateway errors",
                        "{}",
                        &page,
                        ContextMetadata::default(),
                    );
                }
            })
        })
        .collect();
    for task in tasks {
        task.await.unwrap();
    }

    assert_eq!(memory.service_count("gateway"), 200);
    assert_eq!(
        memory.error_pattern_count("upstream [NUMBER] from pod [NUMBER]"),
        100
    );
    assert_eq!(memory.error_pattern_count("retrying request [NUMBER]"), 100);
    assert_eq!(memory.query_contexts().len(), 20);
}

#[test]
fn test_custom_capacities() {
    let memory = ConversationMemory::new(MemoryConfig {
        max_turns: 3,
        max_contexts: 2,
        max_tracked_patterns: None,
    });
    for i in 0..5 {
        memory.add_conversation_turn(&format!("q{i}"), "r", TurnMetadata::default());
        memory.add_query_context(
            &format!("q{i}"),
            "{}",
            &SearchResults::default(),
            ContextMetadata::default(),
        );
    }

    let queries: Vec<String> = memory.turns().into_iter().map(|t| t.user_query).collect();
    assert_eq!(queries, vec!["q2", "q3", "q4"]);
    assert_eq!(memory.query_contexts().len(), 2);
    assert_eq!(memory.conversation_summary(10).len(), 3);
}
