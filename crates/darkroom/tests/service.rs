use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;

use darkroom::protocol::{
    CreateRequest, DestroyRequest, LoginRequest, SendMessageRequest, ServerPush,
    SubscribeRequest,
};
use darkroom::{
    CleanupOutcome, Darkroom, DarkroomError, FrameOutcome, MaintenanceLog,
    MemoryBroker, MemoryStore, PushSender,
};
use darkroom_protocol::{MessageKey, RoomCode, RoomRecord};
use darkroom_store::{RoomStore, RoomWatch, StoreError};

const SECRET: &str = "integration-secret";

fn init_tracing() {
    use tracing_subscriber::EnvFilter;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn code_string(ch: char) -> String {
    ch.to_string().repeat(64)
}

fn service() -> Darkroom<MemoryStore, MemoryBroker> {
    init_tracing();
    Darkroom::builder(Arc::new(MemoryStore::new()), MemoryBroker::new(), SECRET).build()
}

fn create_request(ch: char, days: u32, timer: &str) -> CreateRequest {
    CreateRequest {
        code: code_string(ch),
        inactive_days_limit: days,
        auto_destroy_timer: timer.to_owned(),
    }
}

async fn stored_record<S: RoomStore>(
    darkroom: &Darkroom<S, MemoryBroker>,
    ch: char,
) -> RoomRecord {
    let code = RoomCode::parse(&code_string(ch)).unwrap();
    darkroom
        .rooms()
        .store()
        .get(&code)
        .await
        .unwrap()
        .expect("room should exist")
}

fn channel() -> (PushSender, mpsc::UnboundedReceiver<ServerPush>) {
    mpsc::unbounded_channel()
}

async fn recv(rx: &mut mpsc::UnboundedReceiver<ServerPush>) -> Option<ServerPush> {
    tokio::time::timeout(Duration::from_secs(1), rx.recv())
        .await
        .expect("push expected within a second")
}

#[tokio::test]
async fn test_create_login_and_send_message() {
    let darkroom = service();
    darkroom
        .create_room(create_request('a', 1, "01:00:00"))
        .await
        .unwrap();

    let token = darkroom
        .login(LoginRequest {
            code: code_string('a'),
        })
        .await
        .unwrap();
    assert_eq!(token.as_str().len(), 32);

    let record = stored_record(&darkroom, 'a').await;
    darkroom
        .send_message(SendMessageRequest {
            dark_room_code: code_string('a'),
            message: "first".to_owned(),
            time_to_destroy: record.time_to_destroy,
            data_hash: record.data_hash,
        })
        .await
        .unwrap();

    let record = stored_record(&darkroom, 'a').await;
    assert_eq!(record.messages.len(), 1);
}

#[tokio::test]
async fn test_create_duplicate_code_is_a_client_fault() {
    let darkroom = service();
    darkroom
        .create_room(create_request('a', 1, "00:00:00"))
        .await
        .unwrap();

    let err = darkroom
        .create_room(create_request('a', 2, "00:10:00"))
        .await
        .unwrap_err();
    assert_eq!(err.status(), 400);
}

#[tokio::test]
async fn test_login_with_malformed_code_is_a_client_fault() {
    let darkroom = service();
    let err = darkroom
        .login(LoginRequest {
            code: "short".to_owned(),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, DarkroomError::Protocol(_)));
    assert_eq!(err.status(), 400);
}

#[tokio::test]
async fn test_destroy_requires_a_token_for_that_room() {
    let darkroom = service();
    darkroom
        .create_room(create_request('a', 1, "00:00:00"))
        .await
        .unwrap();
    let other = darkroom
        .create_room(create_request('b', 1, "00:00:00"))
        .await
        .unwrap();

    // A token for room b cannot destroy room a.
    let err = darkroom
        .destroy_room(DestroyRequest {
            code: code_string('a'),
            auth_token: other.as_str().to_owned(),
        })
        .await
        .unwrap_err();
    assert_eq!(err.status(), 400);

    // An unknown token cannot destroy anything.
    let err = darkroom
        .destroy_room(DestroyRequest {
            code: code_string('a'),
            auth_token: "0".repeat(32),
        })
        .await
        .unwrap_err();
    assert_eq!(err.status(), 400);
}

#[tokio::test]
async fn test_destroy_removes_room_and_revokes_tokens() {
    let darkroom = service();
    let token = darkroom
        .create_room(create_request('a', 1, "00:00:00"))
        .await
        .unwrap();

    let (tx, mut rx) = channel();
    let _sub = darkroom
        .subscribe(
            SubscribeRequest {
                dark_room_code: code_string('a'),
            },
            &tx,
        )
        .await
        .unwrap();
    recv(&mut rx).await.expect("initial state push");

    darkroom
        .destroy_room(DestroyRequest {
            code: code_string('a'),
            auth_token: token.as_str().to_owned(),
        })
        .await
        .unwrap();

    // The subscriber sees exactly one destroy push, then nothing. The
    // forwarding task holds the only other sender clone, so once the
    // test lets go of its own the channel closing proves the task ended.
    assert_eq!(recv(&mut rx).await, Some(ServerPush::destroy()));
    drop(tx);
    assert_eq!(recv(&mut rx).await, None);

    // The revoked token is dead even though absent-room destroys would
    // otherwise succeed.
    let err = darkroom
        .destroy_room(DestroyRequest {
            code: code_string('a'),
            auth_token: token.as_str().to_owned(),
        })
        .await
        .unwrap_err();
    assert_eq!(err.status(), 400);
}

#[tokio::test]
async fn test_frame_dispatch_subscribe_then_message() {
    let darkroom = service();
    darkroom
        .create_room(create_request('a', 1, "00:30:00"))
        .await
        .unwrap();
    let record = stored_record(&darkroom, 'a').await;

    let (tx, mut rx) = channel();
    let subscribe_frame = format!(
        r#"{{"action":"startDataListener","darkRoomCode":"{}"}}"#,
        code_string('a')
    );
    let outcome = darkroom
        .handle_frame(subscribe_frame.as_bytes(), &tx)
        .await
        .unwrap();
    let _sub = match outcome {
        FrameOutcome::Subscribed(sub) => sub,
        FrameOutcome::Accepted(_) => panic!("expected a subscription"),
    };
    recv(&mut rx).await.expect("initial state push");

    let message_frame = format!(
        r#"{{"action":"sendMessage","darkRoomCode":"{}","message":"hi",
            "timeToDestroy":{},"dataHash":"{}"}}"#,
        code_string('a'),
        record.time_to_destroy,
        record.data_hash
    );
    let outcome = darkroom
        .handle_frame(message_frame.as_bytes(), &tx)
        .await
        .unwrap();
    assert!(matches!(outcome, FrameOutcome::Accepted(_)));

    match recv(&mut rx).await {
        Some(ServerPush::Update { messages, .. }) => {
            assert_eq!(messages.values().next().map(String::as_str), Some("hi"));
        }
        other => panic!("expected an update push, got {other:?}"),
    }
}

#[tokio::test]
async fn test_frame_with_forged_digest_is_rejected() {
    let darkroom = service();
    darkroom
        .create_room(create_request('a', 1, "00:30:00"))
        .await
        .unwrap();
    let record = stored_record(&darkroom, 'a').await;

    let (tx, _rx) = channel();
    // Claim a later deadline than the digest was sealed over.
    let frame = format!(
        r#"{{"action":"sendMessage","darkRoomCode":"{}","message":"hi",
            "timeToDestroy":{},"dataHash":"{}"}}"#,
        code_string('a'),
        record.time_to_destroy + 60_000,
        record.data_hash
    );
    let err = darkroom.handle_frame(frame.as_bytes(), &tx).await.unwrap_err();
    assert_eq!(err.status(), 400);

    // The room is untouched.
    let after = stored_record(&darkroom, 'a').await;
    assert!(after.messages.is_empty());
    assert_eq!(after.last_activity_timestamp, record.last_activity_timestamp);
}

#[tokio::test]
async fn test_unparsable_frame_is_a_client_fault() {
    let darkroom = service();
    let (tx, _rx) = channel();

    let err = darkroom
        .handle_frame(b"'; DROP TABLE rooms; --", &tx)
        .await
        .unwrap_err();
    assert!(matches!(err, DarkroomError::Protocol(_)));
    assert_eq!(err.status(), 400);

    let err = darkroom
        .handle_frame(br#"{"action":"unknownThing"}"#, &tx)
        .await
        .unwrap_err();
    assert_eq!(err.status(), 400);
}

#[tokio::test]
async fn test_expired_room_sweeps_to_a_single_destroy_push() {
    let darkroom = service();
    // Zero-day inactivity budget: expires as soon as any time passes.
    darkroom
        .create_room(create_request('a', 0, "00:00:00"))
        .await
        .unwrap();

    let (tx, mut rx) = channel();
    let _sub = darkroom
        .subscribe(
            SubscribeRequest {
                dark_room_code: code_string('a'),
            },
            &tx,
        )
        .await
        .unwrap();
    recv(&mut rx).await.expect("initial state push");

    tokio::time::sleep(Duration::from_millis(2)).await;
    let report = darkroom.run_sweep().await;
    assert_eq!(report.destroyed, 1);

    assert_eq!(recv(&mut rx).await, Some(ServerPush::destroy()));
    drop(tx);
    assert_eq!(recv(&mut rx).await, None);
}

#[tokio::test]
async fn test_cleanup_database_respects_the_rate_limit() {
    init_tracing();
    let path = std::env::temp_dir().join(format!(
        "darkroom-cleanup-{}",
        MessageKey::generate()
    ));
    let darkroom = Darkroom::builder(
        Arc::new(MemoryStore::new()),
        MemoryBroker::new(),
        SECRET,
    )
    .with_maintenance_log(MaintenanceLog::new(&path))
    .build();

    darkroom
        .create_room(create_request('a', 0, "00:00:00"))
        .await
        .unwrap();
    tokio::time::sleep(Duration::from_millis(2)).await;

    match darkroom.cleanup_database().await.unwrap() {
        CleanupOutcome::Swept(report) => assert_eq!(report.destroyed, 1),
        CleanupOutcome::NotDue => panic!("first cleanup must run"),
    }
    assert_eq!(
        darkroom.cleanup_database().await.unwrap(),
        CleanupOutcome::NotDue
    );

    let _ = tokio::fs::remove_file(&path).await;
}

/// Delegating store whose `snapshot` blocks until released, to hold a
/// sweep pass open.
struct StallStore {
    inner: MemoryStore,
    release: tokio::sync::Notify,
    entered: tokio::sync::Notify,
}

impl StallStore {
    fn new() -> Self {
        Self {
            inner: MemoryStore::new(),
            release: tokio::sync::Notify::new(),
            entered: tokio::sync::Notify::new(),
        }
    }
}

impl RoomStore for StallStore {
    async fn get(&self, code: &RoomCode) -> Result<Option<RoomRecord>, StoreError> {
        self.inner.get(code).await
    }

    async fn insert(&self, code: &RoomCode, record: RoomRecord) -> Result<(), StoreError> {
        self.inner.insert(code, record).await
    }

    async fn touch(&self, code: &RoomCode, at_ms: u64) -> Result<(), StoreError> {
        self.inner.touch(code, at_ms).await
    }

    async fn append_message(
        &self,
        code: &RoomCode,
        key: MessageKey,
        payload: String,
        at_ms: u64,
    ) -> Result<(), StoreError> {
        self.inner.append_message(code, key, payload, at_ms).await
    }

    async fn remove(&self, code: &RoomCode) -> Result<(), StoreError> {
        self.inner.remove(code).await
    }

    async fn snapshot(
        &self,
    ) -> Result<std::collections::HashMap<RoomCode, RoomRecord>, StoreError> {
        self.entered.notify_one();
        self.release.notified().await;
        self.inner.snapshot().await
    }

    async fn watch(&self, code: &RoomCode) -> Result<RoomWatch, StoreError> {
        self.inner.watch(code).await
    }
}

#[tokio::test]
async fn test_cleanup_skipped_pass_does_not_consume_the_window() {
    init_tracing();
    let path = std::env::temp_dir().join(format!(
        "darkroom-cleanup-skip-{}",
        MessageKey::generate()
    ));
    let store = Arc::new(StallStore::new());
    let darkroom = Arc::new(
        Darkroom::builder(Arc::clone(&store), MemoryBroker::new(), SECRET)
            .with_maintenance_log(MaintenanceLog::new(&path))
            .build(),
    );

    // Park a sweep pass inside snapshot().
    let busy = Arc::clone(&darkroom);
    let held = tokio::spawn(async move { busy.run_sweep().await });
    store.entered.notified().await;

    // Cleanup bounces off the single-flight gate and must not record a
    // run: the 30-day window stays open.
    match darkroom.cleanup_database().await.unwrap() {
        CleanupOutcome::Swept(report) => assert!(report.skipped),
        CleanupOutcome::NotDue => panic!("nothing has been recorded yet"),
    }

    store.release.notify_one();
    assert!(!held.await.unwrap().skipped);

    // Now a cleanup really runs, and only then does the gate close.
    store.release.notify_one();
    match darkroom.cleanup_database().await.unwrap() {
        CleanupOutcome::Swept(report) => assert!(!report.skipped),
        CleanupOutcome::NotDue => panic!("window must survive a skipped pass"),
    }
    assert_eq!(
        darkroom.cleanup_database().await.unwrap(),
        CleanupOutcome::NotDue
    );

    let _ = tokio::fs::remove_file(&path).await;
}
