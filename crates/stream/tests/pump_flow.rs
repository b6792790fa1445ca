use oibridge_core::testing::{self, code_cycle};
use oibridge_classifier::Classifier;
use oibridge_core::{EventKind, Panel, ProcessingError, RawChunk, StreamItem, UpstreamError};
use oibridge_stream::{PumpOutcome, ScriptedSource, run, run_with, spawn_session};
use tokio::sync::mpsc;

fn instructions(items: &[StreamItem]) -> Vec<&oibridge_core::UIInstruction> {
    items.iter().filter_map(StreamItem::instruction).collect()
}

#[tokio::test]
async fn completed_session_ends_with_single_sentinel() {
    let mut chunks = code_cycle("python", "print(1)", "1\n");
    chunks.push(testing::message_start("Done"));
    let expected = chunks.len();

    let session = spawn_session(ScriptedSource::from_chunks(chunks), 4);
    let (items, report) = session.collect().await;
    let report = report.expect("producer should finish");

    assert_eq!(items.len(), expected + 1);
    assert_eq!(items.iter().filter(|i| i.is_end()).count(), 1);
    assert!(items.last().is_some_and(StreamItem::is_end));
    assert_eq!(report.outcome, PumpOutcome::Completed);
    assert_eq!(report.delivered, expected as u64);

    let last = instructions(&items).pop().expect("message instruction");
    assert!(last.new_message_after_code);
}

#[tokio::test]
async fn upstream_failure_after_three_chunks() {
    let source = ScriptedSource::failing_after(
        vec![
            testing::message_start("Working"),
            testing::code_start("python"),
            testing::code_end(),
        ],
        UpstreamError::agent("model endpoint went away"),
    );

    let (items, report) = spawn_session(source, 2).collect().await;

    assert_eq!(items.len(), 5);
    let kinds: Vec<EventKind> = instructions(&items).iter().map(|i| i.kind.clone()).collect();
    assert_eq!(
        kinds,
        vec![
            EventKind::Message,
            EventKind::Code,
            EventKind::Code,
            EventKind::Error
        ]
    );
    let error = instructions(&items)[3].clone();
    assert_eq!(error.content, "model endpoint went away");
    assert!(items[4].is_end());

    let report = report.expect("producer should finish");
    assert_eq!(report.outcome, PumpOutcome::UpstreamFailed);
    assert_eq!(report.delivered, 3);
}

#[tokio::test]
async fn malformed_chunks_do_not_end_the_session() {
    let chunks = vec![
        testing::record(serde_json::json!({"foo": "bar"})),
        RawChunk::from_value(serde_json::json!(12)),
        RawChunk::from_text("<think>"),
        testing::message_start("still here"),
    ];
    let (items, _) = spawn_session(ScriptedSource::from_chunks(chunks), 8).collect().await;
    let delivered = instructions(&items);

    assert_eq!(delivered.len(), 4);
    assert_eq!(delivered[1].kind, EventKind::Error);
    assert_eq!(delivered[2].kind, EventKind::ThinkingStart);
    assert_eq!(delivered[3].content, "still here");
}

#[tokio::test]
async fn order_matches_arrival() {
    let chunks: Vec<RawChunk> = (0..50)
        .map(|i| testing::message(&format!("part {i}"), i == 0, i == 49))
        .collect();
    let (items, _) = spawn_session(ScriptedSource::from_chunks(chunks), 1).collect().await;
    let contents: Vec<String> = instructions(&items).iter().map(|i| i.content.clone()).collect();
    let expected: Vec<String> = (0..50).map(|i| format!("part {i}")).collect();
    assert_eq!(contents, expected);
}

#[tokio::test]
async fn dropping_consumer_cancels_idle_producer() {
    let (chunk_tx, chunk_rx) = mpsc::channel(4);
    let mut session = spawn_session(chunk_rx, 4);

    chunk_tx
        .send(Ok(testing::message_start("hello")))
        .await
        .expect("send chunk");
    let first = session.recv().await.expect("first item");
    assert_eq!(first.instruction().map(|i| i.content.as_str()), Some("hello"));

    // The agent is still "running" (sender alive) when the client leaves.
    let report = session.finish().await.expect("producer should finish");
    assert_eq!(report.outcome, PumpOutcome::Cancelled);
    assert_eq!(report.delivered, 1);
    drop(chunk_tx);
}

#[tokio::test]
async fn dropping_consumer_cancels_blocked_producer() {
    let chunks: Vec<RawChunk> = (0..1000).map(|i| testing::output(&i.to_string())).collect();
    let mut session = spawn_session(ScriptedSource::from_chunks(chunks), 1);
    assert!(session.recv().await.is_some());

    let report = session.finish().await.expect("producer should finish");
    assert_eq!(report.outcome, PumpOutcome::Cancelled);
    assert!(report.delivered < 1000);
}

#[tokio::test]
async fn sessions_use_independent_channels() {
    let a = spawn_session(
        ScriptedSource::from_chunks(vec![testing::message_start("from a")]),
        1,
    );
    let b = spawn_session(
        ScriptedSource::from_chunks(vec![
            testing::message_start("from b"),
            testing::message("more b", false, true),
        ]),
        1,
    );
    assert_ne!(a.id(), b.id());

    let ((items_a, _), (items_b, _)) = tokio::join!(a.collect(), b.collect());
    assert!(instructions(&items_a).iter().all(|i| i.content.ends_with('a')));
    assert!(instructions(&items_b).iter().all(|i| i.content.ends_with('b')));
    assert_eq!(items_a.len(), 2);
    assert_eq!(items_b.len(), 3);
}

#[tokio::test]
async fn run_reports_counts_for_direct_channel() {
    let (tx, mut rx) = mpsc::channel(16);
    let report = run(
        ScriptedSource::from_chunks(vec![
            testing::code_start("js"),
            testing::code_end(),
        ]),
        tx,
    )
    .await;

    assert_eq!(report.delivered, 2);
    assert_eq!(report.degraded, 0);
    let mut ends = 0;
    while let Some(item) = rx.recv().await {
        if item.is_end() {
            ends += 1;
        }
    }
    assert_eq!(ends, 1);
}

#[tokio::test]
async fn rejected_chunk_falls_back_to_raw_content() {
    let (tx, mut rx) = mpsc::channel(16);
    let mut classifier = Classifier::new();
    let process = move |raw: &RawChunk| {
        if raw.raw_content() == "x = 1" {
            return Err(ProcessingError::PanelMismatch {
                kind: EventKind::Code,
                panel: Panel::Chat,
            });
        }
        classifier.process(raw)
    };
    let report = run_with(
        ScriptedSource::from_chunks(vec![
            testing::code_start("python"),
            testing::code("python", "x = 1", false, false),
            testing::code_end(),
            testing::message_start("after"),
        ]),
        tx,
        process,
    )
    .await;

    assert_eq!(report.outcome, PumpOutcome::Completed);
    assert_eq!(report.delivered, 4);
    assert_eq!(report.degraded, 1);

    let mut items = Vec::new();
    while let Some(item) = rx.recv().await {
        items.push(item);
    }
    assert_eq!(items.iter().filter(|i| i.is_end()).count(), 1);
    assert!(items.last().is_some_and(StreamItem::is_end));

    let delivered = instructions(&items);
    assert_eq!(delivered.len(), 4);
    assert_eq!(delivered[1].kind, EventKind::Message);
    assert_eq!(delivered[1].panel, Panel::Chat);
    assert_eq!(delivered[1].content, "x = 1");
    assert_eq!(delivered[2].kind, EventKind::Code);
    assert_eq!(delivered[3].content, "after");
}
