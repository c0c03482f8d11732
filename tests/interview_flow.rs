//! End-to-end orchestration scenarios with in-process fakes.
//!
//! These tests swap every external platform for an instrumented fake and
//! assert the lifecycle contract: startup ordering (avatar strictly before
//! session), abort behavior on each failure class, and the environment gate
//! the binary runs before constructing anything.

use async_trait::async_trait;
use intervox::agent::{AgentEvent, InterviewAgent, Stage};
use intervox::avatar::{AvatarHandle, AvatarRenderer};
use intervox::config::{
    ENV_TAVUS_PERSONA_ID, ENV_TAVUS_REPLICA_ID, PERSONA_ID_PLACEHOLDER, REPLICA_ID_PLACEHOLDER,
    StageTimeouts,
};
use intervox::doctor::check_environment;
use intervox::error::{AgentError, Result};
use intervox::providers::{LanguageModel, SpeechSynthesis, SpeechToText};
use intervox::room::{RoomConnector, RoomHandle};
use intervox::session::AgentSession;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::{mpsc, watch};

/// Shared call-order instrumentation.
#[derive(Clone, Default)]
struct CallLog(Arc<Mutex<Vec<String>>>);

impl CallLog {
    fn push(&self, call: &str) {
        self.0.lock().unwrap().push(call.to_owned());
    }

    fn calls(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }

    fn index_of(&self, call: &str) -> Option<usize> {
        self.calls().iter().position(|c| c == call)
    }
}

struct FakeConnector {
    log: CallLog,
    fail: bool,
    close: Arc<Mutex<Option<watch::Sender<bool>>>>,
}

#[async_trait]
impl RoomConnector for FakeConnector {
    async fn connect(&self) -> Result<RoomHandle> {
        self.log.push("room.connect");
        if self.fail {
            return Err(AgentError::Room("connection refused".into()));
        }
        let (handle, close) = RoomHandle::with_close_signal("interview-test", "wss://test");
        *self.close.lock().unwrap() = Some(close);
        Ok(handle)
    }
}

struct FakeAvatar {
    log: CallLog,
    fail: bool,
    hang: bool,
}

#[async_trait]
impl AvatarRenderer for FakeAvatar {
    fn label(&self) -> String {
        "fake/avatar".into()
    }

    async fn start(&self, room: &RoomHandle) -> Result<AvatarHandle> {
        self.log.push("avatar.start");
        if self.hang {
            std::future::pending::<()>().await;
        }
        if self.fail {
            return Err(AgentError::Avatar("replica rejected".into()));
        }
        Ok(AvatarHandle {
            conversation_id: format!("conv-{}", room.name()),
            conversation_url: "https://avatar.test/conv".into(),
        })
    }

    async fn stop(&self, _handle: &AvatarHandle) -> Result<()> {
        self.log.push("avatar.stop");
        Ok(())
    }
}

struct FakeStt(CallLog);
struct FakeLlm(CallLog);
struct FakeTts(CallLog);

#[async_trait]
impl SpeechToText for FakeStt {
    fn label(&self) -> String {
        "fake/stt".into()
    }

    async fn start(&self) -> Result<()> {
        self.0.push("stt.start");
        Ok(())
    }
}

#[async_trait]
impl LanguageModel for FakeLlm {
    fn label(&self) -> String {
        "fake/llm".into()
    }

    fn instructions(&self) -> &str {
        "conduct the interview"
    }

    async fn start(&self) -> Result<()> {
        self.0.push("llm.start");
        Ok(())
    }
}

#[async_trait]
impl SpeechSynthesis for FakeTts {
    fn label(&self) -> String {
        "fake/tts".into()
    }

    async fn start(&self) -> Result<()> {
        self.0.push("tts.start");
        Ok(())
    }
}

fn fake_session(log: &CallLog) -> AgentSession {
    AgentSession::builder()
        .stt(FakeStt(log.clone()))
        .llm(FakeLlm(log.clone()))
        .tts(FakeTts(log.clone()))
        .build()
        .expect("complete session")
}

struct Harness {
    log: CallLog,
    close: Arc<Mutex<Option<watch::Sender<bool>>>>,
}

impl Harness {
    fn agent(
        connect_fails: bool,
        avatar_fails: bool,
        avatar_hangs: bool,
    ) -> (Self, InterviewAgent) {
        Self::agent_with(
            connect_fails,
            avatar_fails,
            avatar_hangs,
            StageTimeouts::default(),
        )
    }

    fn agent_with(
        connect_fails: bool,
        avatar_fails: bool,
        avatar_hangs: bool,
        timeouts: StageTimeouts,
    ) -> (Self, InterviewAgent) {
        let log = CallLog::default();
        let close = Arc::new(Mutex::new(None));
        let agent = InterviewAgent::new(
            FakeConnector {
                log: log.clone(),
                fail: connect_fails,
                close: close.clone(),
            },
            FakeAvatar {
                log: log.clone(),
                fail: avatar_fails,
                hang: avatar_hangs,
            },
            fake_session(&log),
            timeouts,
        );
        (Self { log, close }, agent)
    }

    fn close_room(&self) {
        let guard = self.close.lock().unwrap();
        let close = guard.as_ref().expect("room was connected");
        close.send(true).expect("agent still running");
    }
}

// Scenario B: with everything healthy, the avatar start strictly precedes
// every session capability start.
#[tokio::test]
async fn avatar_starts_strictly_before_session() {
    let (harness, agent) = Harness::agent(false, false, false);
    let (tx, mut events) = mpsc::unbounded_channel();
    let run = tokio::spawn(agent.with_events(tx).run());

    // Wait for the session to come up, then end the room.
    loop {
        let event = events.recv().await.expect("agent running");
        if matches!(event, AgentEvent::SessionReady { .. }) {
            break;
        }
    }
    harness.close_room();
    run.await.expect("join").expect("clean run");

    let avatar = harness.log.index_of("avatar.start").expect("avatar started");
    for call in ["stt.start", "llm.start", "tts.start"] {
        let session = harness.log.index_of(call).expect(call);
        assert!(
            avatar < session,
            "{call} ran before avatar.start: {:?}",
            harness.log.calls()
        );
    }
}

#[tokio::test]
async fn terminated_run_stops_the_avatar() {
    let (harness, agent) = Harness::agent(false, false, false);
    let (tx, mut events) = mpsc::unbounded_channel();
    let run = tokio::spawn(agent.with_events(tx).run());

    loop {
        let event = events.recv().await.expect("agent running");
        if matches!(event, AgentEvent::SessionReady { .. }) {
            break;
        }
    }
    harness.close_room();
    run.await.expect("join").expect("clean run");

    // RoomClosed then Terminated, and teardown reached the avatar.
    let mut saw_closed = false;
    let mut saw_terminated = false;
    while let Ok(event) = events.try_recv() {
        match event {
            AgentEvent::RoomClosed => saw_closed = true,
            AgentEvent::StageChanged(Stage::Terminated) => {
                assert!(saw_closed, "Terminated before RoomClosed");
                saw_terminated = true;
            }
            _ => {}
        }
    }
    assert!(saw_terminated);
    assert_eq!(harness.log.calls().last().map(String::as_str), Some("avatar.stop"));
}

// Ctrl+C while the interview is active ends the run without waiting for the
// room to close, and teardown still stops the avatar.
#[tokio::test]
async fn cancellation_terminates_an_active_run() {
    let (harness, agent) = Harness::agent(false, false, false);
    let cancel = agent.cancel_token();
    let (tx, mut events) = mpsc::unbounded_channel();
    let run = tokio::spawn(agent.with_events(tx).run());

    loop {
        let event = events.recv().await.expect("agent running");
        if matches!(event, AgentEvent::StageChanged(Stage::Active)) {
            break;
        }
    }
    cancel.cancel();
    run.await.expect("join").expect("clean run");

    let mut saw_terminated = false;
    while let Ok(event) = events.try_recv() {
        match event {
            AgentEvent::StageChanged(Stage::Terminated) => saw_terminated = true,
            AgentEvent::RoomClosed => panic!("cancellation is not a room close"),
            _ => {}
        }
    }
    assert!(saw_terminated);
    assert_eq!(
        harness.log.calls().last().map(String::as_str),
        Some("avatar.stop")
    );
}

// Scenario C: a failed room connection terminates the run before the avatar
// is ever touched.
#[tokio::test]
async fn connect_failure_never_reaches_the_avatar() {
    let (harness, agent) = Harness::agent(true, false, false);
    let err = agent.run().await.unwrap_err();
    assert!(matches!(err, AgentError::Room(_)));
    assert_eq!(harness.log.calls(), vec!["room.connect"]);
}

// Open-question resolution: a failed avatar start aborts the run; the
// session start is never attempted.
#[tokio::test]
async fn avatar_failure_aborts_before_session_start() {
    let (harness, agent) = Harness::agent(false, true, false);
    let err = agent.run().await.unwrap_err();
    assert!(matches!(err, AgentError::Avatar(_)));
    let calls = harness.log.calls();
    assert_eq!(calls, vec!["room.connect", "avatar.start"]);
}

// A hung avatar surfaces as a stage timeout instead of stalling forever.
#[tokio::test]
async fn hung_avatar_surfaces_a_stage_timeout() {
    let timeouts = StageTimeouts {
        connect_secs: 5,
        avatar_start_secs: 1,
        session_start_secs: 5,
    };
    let (harness, agent) = Harness::agent_with(false, false, true, timeouts);
    let err = agent.run().await.unwrap_err();
    match err {
        AgentError::StageTimeout { stage, .. } => assert_eq!(stage, "avatar-starting"),
        other => panic!("expected stage timeout, got {other}"),
    }
    assert!(harness.log.index_of("stt.start").is_none());
}

// Scenario A: credentials present but identity IDs left at their checked-in
// placeholders. The binary's readiness gate refuses to start, naming exactly
// the two identity variables, so no provider is ever constructed.
#[test]
fn placeholder_ids_block_startup() {
    let env: HashMap<String, String> = [
        ("OPENAI_API_KEY", "sk-test"),
        ("LIVEKIT_URL", "wss://example.livekit.cloud"),
        ("LIVEKIT_API_KEY", "lk-key"),
        ("LIVEKIT_API_SECRET", "lk-secret"),
        ("TAVUS_API_KEY", "tv-key"),
        (ENV_TAVUS_REPLICA_ID, REPLICA_ID_PLACEHOLDER),
        (ENV_TAVUS_PERSONA_ID, PERSONA_ID_PLACEHOLDER),
    ]
    .iter()
    .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
    .collect();

    let report = check_environment(&env);
    assert!(!report.is_ready());
    assert_eq!(
        report.flagged_vars(),
        vec![ENV_TAVUS_REPLICA_ID, ENV_TAVUS_PERSONA_ID]
    );
}
