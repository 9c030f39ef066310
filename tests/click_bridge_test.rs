// Integration tests for click interception
// Exercises the full path: bound tab -> capturing click listener ->
// column resolution -> bus delivery.

mod common;

use std::time::Duration;

use common::*;
use quickfilter::bridge::SemanticClickEvent;
use quickfilter::columns::ColumnType;
use quickfilter::config::BridgeConfig;
use quickfilter::lifecycle::BindOutcome;
use quickfilter::traits::{DomEvent, ElementRef, Modifier, Modifiers, PointerButton, TabId};

fn bound_host() -> TestHost {
    let host = TestHostBuilder::new().with_tab(1, DEFAULT_HEADERS).build();
    assert_eq!(host.manager.bind_tab(TabId(1)), BindOutcome::Bound);
    host
}

#[tokio::test]
async fn test_alt_click_on_subject_publishes_title() {
    let host = bound_host();
    let (clicks, _sub) = ClickRecorder::attach(host.manager.bus());
    let table = host.table(1);

    let cells = message_row(
        &table,
        &[
            ("sendercol-column", Some("alice@example.com"), "Alice"),
            ("subjectcol-column", Some("Quarterly Report"), "Quarterly Rep…"),
        ],
    );

    table.dispatch(&alt_click(&cells[1]));
    assert_eq!(
        clicks.events(),
        vec![(ColumnType::Subject, "Quarterly Report".to_string())]
    );
}

#[tokio::test]
async fn test_same_click_without_alt_publishes_nothing() {
    let host = bound_host();
    let (clicks, _sub) = ClickRecorder::attach(host.manager.bus());
    let table = host.table(1);
    let cells = message_row(
        &table,
        &[("subjectcol-column", Some("Quarterly Report"), "Quarterly Report")],
    );

    table.dispatch(&plain_click(&cells[0]));
    assert_eq!(clicks.count(), 0);
}

#[tokio::test]
async fn test_alt_click_outside_any_cell_publishes_nothing() {
    let host = bound_host();
    let (clicks, _sub) = ClickRecorder::attach(host.manager.bus());
    let table = host.table(1);

    // Row gutter: a row element with no cell around it.
    let row = table.insert_row(&[]);
    table.dispatch(&alt_click(&row));
    table.dispatch(&DomEvent::click(PointerButton::Primary, Modifiers::alt(), None));

    assert_eq!(clicks.count(), 0);
}

#[tokio::test]
async fn test_click_on_nested_span_resolves_cell() {
    let host = bound_host();
    let (clicks, _sub) = ClickRecorder::attach(host.manager.bus());
    let table = host.table(1);
    let cells = message_row(&table, &[("recipientcol-column", None, "bob@example.com")]);

    let span = MockElement::other().with_text("bob");
    cells[0].append_child(&span);
    table.dispatch(&alt_click(&span));

    assert_eq!(
        clicks.events(),
        vec![(ColumnType::Recipient, "bob@example.com".to_string())]
    );
}

#[tokio::test]
async fn test_correspondent_column_reports_sender() {
    let host = TestHostBuilder::new()
        .with_tab(1, &["correspondentcol-column", "subjectcol-column"])
        .build();
    host.manager.bind_tab(TabId(1));
    let (clicks, _sub) = ClickRecorder::attach(host.manager.bus());
    let table = host.table(1);
    let cells = message_row(&table, &[("correspondentcol-column", None, "carol")]);

    table.dispatch(&alt_click(&cells[0]));
    assert_eq!(clicks.events(), vec![(ColumnType::Sender, "carol".to_string())]);
}

#[tokio::test]
async fn test_unmapped_column_is_ignored() {
    let host = bound_host();
    let (clicks, _sub) = ClickRecorder::attach(host.manager.bus());
    let table = host.table(1);
    let cells = message_row(&table, &[("datecol-column", None, "Yesterday")]);

    table.dispatch(&alt_click(&cells[0]));
    assert_eq!(clicks.count(), 0);
}

#[tokio::test]
async fn test_empty_cell_publishes_empty_text() {
    let host = bound_host();
    let (clicks, _sub) = ClickRecorder::attach(host.manager.bus());
    let table = host.table(1);
    let cell = MockElement::cell(["subjectcol-column"]);
    table.insert_row(&[cell.clone()]);

    table.dispatch(&alt_click(&cell));
    assert_eq!(clicks.events(), vec![(ColumnType::Subject, String::new())]);
}

#[tokio::test]
async fn test_failing_consumer_does_not_block_next_click() {
    let host = bound_host();
    let bus = host.manager.bus();
    let _ = bus.register_click_listener(|_, _| panic!("filter crashed"));
    let _ = bus.on_click(|_| Err("filter rejected".into()));
    let (clicks, _sub) = ClickRecorder::attach(bus);

    let table = host.table(1);
    let cells = message_row(
        &table,
        &[
            ("sendercol-column", None, "alice"),
            ("subjectcol-column", None, "Hello"),
        ],
    );

    table.dispatch(&alt_click(&cells[0]));
    table.dispatch(&alt_click(&cells[1]));

    assert_eq!(
        clicks.events(),
        vec![
            (ColumnType::Sender, "alice".to_string()),
            (ColumnType::Subject, "Hello".to_string()),
        ]
    );
    assert_eq!(bus.failure_count(), 4);
}

#[tokio::test]
async fn test_unregister_stops_delivery() {
    let host = bound_host();
    let (clicks, sub) = ClickRecorder::attach(host.manager.bus());
    let table = host.table(1);
    let cells = message_row(&table, &[("subjectcol-column", None, "Hi")]);

    table.dispatch(&alt_click(&cells[0]));
    assert!(sub.unregister());
    table.dispatch(&alt_click(&cells[0]));

    assert_eq!(clicks.count(), 1);
}

#[tokio::test]
async fn test_async_consumer_receives_json_ready_event() {
    let host = bound_host();
    let mut rx = host.manager.bus().subscribe_clicks();
    let table = host.table(1);
    let cells = message_row(&table, &[("subjectcol-column", Some("Invoice 42"), "Invoice")]);

    table.dispatch(&alt_click(&cells[0]));

    let event = tokio::time::timeout(Duration::from_secs(1), rx.recv())
        .await
        .expect("timed out")
        .expect("channel closed");
    assert_eq!(event.origin_tab, TabId(1));

    let json = event.to_json().unwrap();
    let parsed: SemanticClickEvent = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed.column_type, ColumnType::Subject);
    assert_eq!(parsed.raw_cell_text, "Invoice 42");
    assert!(json.contains("\"columnType\":\"subject\""));
}

#[tokio::test]
async fn test_clicks_are_delivered_in_dispatch_order() {
    let host = bound_host();
    let (clicks, _sub) = ClickRecorder::attach(host.manager.bus());
    let table = host.table(1);

    let mut expected = Vec::new();
    for i in 0..10 {
        let text = format!("message {}", i);
        let cells = message_row(&table, &[("subjectcol-column", None, text.as_str())]);
        table.dispatch(&alt_click(&cells[0]));
        expected.push((ColumnType::Subject, text));
    }

    assert_eq!(clicks.events(), expected);
}

#[tokio::test]
async fn test_custom_modifier_from_json_settings() {
    let config = BridgeConfig::from_json(r#"{ "modifier": "shift" }"#).unwrap();
    assert_eq!(config.required_modifier, Modifier::Shift);

    let host = TestHostBuilder::new()
        .with_tab(1, DEFAULT_HEADERS)
        .with_config(config)
        .build();
    host.manager.bind_tab(TabId(1));
    let (clicks, _sub) = ClickRecorder::attach(host.manager.bus());
    let table = host.table(1);
    let cells = message_row(&table, &[("subjectcol-column", None, "Hi")]);

    table.dispatch(&alt_click(&cells[0]));
    assert_eq!(clicks.count(), 0);

    let shift = Modifiers {
        shift: true,
        ..Modifiers::none()
    };
    let target: ElementRef = cells[0].clone();
    table.dispatch(&DomEvent::click(PointerButton::Primary, shift, Some(target)));
    assert_eq!(clicks.count(), 1);
}

#[tokio::test]
async fn test_tabs_report_their_own_origin() {
    let host = TestHostBuilder::new()
        .with_tab(1, DEFAULT_HEADERS)
        .with_tab(2, DEFAULT_HEADERS)
        .build();
    host.bind_all();
    let mut rx = host.manager.bus().subscribe_clicks();

    for tab in [2, 1] {
        let table = host.table(tab);
        let cells = message_row(&table, &[("subjectcol-column", None, "x")]);
        table.dispatch(&alt_click(&cells[0]));
    }

    assert_eq!(rx.recv().await.unwrap().origin_tab, TabId(2));
    assert_eq!(rx.recv().await.unwrap().origin_tab, TabId(1));
}
