use statelog::transport::{InboundMessage, SessionState, forward};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

#[test]
fn fresh_session_subscribes_on_every_connect() {
    let mut s = SessionState::default();

    assert!(s.on_connect(false));
    s.on_subscribed();
    assert!(s.subscribed);

    // Broker dropped the session: subscriptions are gone too.
    assert!(s.on_connect(false));
    assert!(!s.subscribed);
    assert_eq!(s.connects, 2);
}

#[test]
fn present_session_keeps_its_subscription() {
    let mut s = SessionState::default();
    assert!(s.on_connect(false));
    s.on_subscribed();
    s.on_disconnect();
    assert!(!s.connected);

    assert!(!s.on_connect(true));
    assert!(s.subscribed);
    assert!(s.connected);
}

#[test]
fn present_session_without_subscription_resubscribes() {
    let mut s = SessionState::default();
    assert!(s.on_connect(true));
    assert!(!s.subscribed);
}

#[tokio::test]
async fn forward_delivers_when_there_is_room() {
    let (tx, mut rx) = mpsc::channel(1);
    let cancel = CancellationToken::new();

    assert!(forward(&tx, InboundMessage::live("t", "1"), &cancel).await);
    assert_eq!(rx.recv().await, Some(InboundMessage::live("t", "1")));
}

#[tokio::test]
async fn cancel_releases_a_sender_blocked_on_a_full_channel() {
    let (tx, _rx) = mpsc::channel(1);
    let cancel = CancellationToken::new();
    assert!(forward(&tx, InboundMessage::live("t", "1"), &cancel).await);

    let stopper = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        stopper.cancel();
    });

    let sent = tokio::time::timeout(
        Duration::from_secs(5),
        forward(&tx, InboundMessage::live("t", "0"), &cancel),
    )
    .await
    .expect("cancel must not wait for room in the channel");
    assert!(!sent);
}

#[tokio::test]
async fn forward_reports_a_closed_pipeline() {
    let (tx, rx) = mpsc::channel(1);
    drop(rx);
    let cancel = CancellationToken::new();

    assert!(!forward(&tx, InboundMessage::live("t", "1"), &cancel).await);
}
