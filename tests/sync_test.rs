//! End-to-end tests for the polling client against a live server.
//!
//! Each test binds the full router to an ephemeral loopback port and
//! drives it through `ApiClient` and the polling views, with the poll
//! intervals tightened to milliseconds. Assertions on poll-fed state
//! wait for convergence instead of assuming tick order.

use std::sync::Arc;
use std::time::Duration;

use liveqa::api;
use liveqa::client::{
    resume, resume_as_admin, AdminView, ApiClient, AudienceView, ClientError, SessionContext,
    SyncConfig,
};
use liveqa::service::EventService;
use liveqa::store::MemoryStore;
use liveqa::types::Role;

async fn serve() -> String {
    let store = Arc::new(MemoryStore::new());
    let service = Arc::new(EventService::new(store));
    let app = api::router(service);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

fn fast_polls() -> SyncConfig {
    SyncConfig {
        question_interval: Duration::from_millis(50),
        responses_interval: Duration::from_millis(50),
        event_interval: Duration::from_millis(50),
    }
}

/// Polls the probe until it holds or a few seconds pass.
async fn wait_for<F>(mut probe: F, what: &str)
where
    F: FnMut() -> bool,
{
    let deadline = tokio::time::Instant::now() + Duration::from_secs(3);
    loop {
        if probe() {
            return;
        }
        if tokio::time::Instant::now() > deadline {
            panic!("timed out waiting for {what}");
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
}

// ---------------------------------------------------------------------------
// Test: ApiClient round trip over a real socket
// ---------------------------------------------------------------------------

#[tokio::test]
async fn api_client_round_trip() {
    let client = ApiClient::new(serve().await).unwrap();

    let created = client.create_event("Live Demo").await.unwrap();
    assert_eq!(created.event.name, "Live Demo");
    assert_eq!(created.admin_key.len(), 20);

    let by_code = client
        .get_event_by_code(&created.event.access_code)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(by_code.id, created.event.id);

    // Lookups report absence as None, not as an error.
    assert!(client.get_event_by_id("nope").await.unwrap().is_none());

    let question = client
        .add_question(&created.event.id, "Your thoughts?")
        .await
        .unwrap();
    assert!(question.is_active);

    let response = client
        .submit_response(
            &created.event.id,
            &question.id,
            "great",
            false,
            Some("p_x".to_string()),
        )
        .await
        .unwrap();
    assert_eq!(response.text, "great");

    let all = client.all_responses(&created.event.id).await.unwrap();
    assert_eq!(all.len(), 1);

    assert!(client
        .moderate_response(&created.event.id, &response.id, true)
        .await
        .unwrap());
    // Refusals read as false.
    assert!(!client
        .moderate_response(&created.event.id, "nope", true)
        .await
        .unwrap());

    assert!(client
        .verify_admin(&created.event.id, &created.admin_key, &created.admin_pin)
        .await
        .unwrap());
    assert!(client.health().await.unwrap());

    // Validation failures surface as Rejected with the server message.
    let rejected = client.add_question(&created.event.id, "   ").await;
    assert!(matches!(rejected, Err(ClientError::Rejected(_))));
}

// ---------------------------------------------------------------------------
// Test: the admin view polls, refreshes on actions and flips
//       moderation locally
// ---------------------------------------------------------------------------

#[tokio::test]
async fn admin_view_follows_the_event() {
    let base = serve().await;
    let client = ApiClient::new(base.clone()).unwrap();
    let created = client.create_event("Retro").await.unwrap();
    let event_id = created.event.id.clone();

    let view = AdminView::spawn(client.clone(), event_id.clone(), fast_polls());

    // A poll fetched just before the post can land just after it and
    // null the locally applied active question for one tick. Let that
    // in-flight poll land first; afterwards every poll confirms it.
    let question = view.post_question("What went well?").await.unwrap();
    tokio::time::sleep(Duration::from_millis(120)).await;
    wait_for(
        || {
            view.state()
                .active_question
                .as_ref()
                .map(|q| q.id == question.id)
                .unwrap_or(false)
        },
        "posted question to become active",
    )
    .await;

    // Another client submits; the responses poll carries it over.
    let participant = ApiClient::new(base).unwrap();
    participant
        .submit_response(
            &event_id,
            &question.id,
            "shipping fast",
            false,
            Some("p_a".to_string()),
        )
        .await
        .unwrap();
    wait_for(
        || view.state().responses.len() == 1,
        "submission to reach the moderation list",
    )
    .await;

    // The host's own answer refreshes both resources right away, but
    // an in-flight poll may still land after it.
    view.submit_answer("thanks all").await.unwrap();
    wait_for(
        || {
            let state = view.state();
            state.responses.len() == 2 && state.responses.iter().any(|r| r.is_from_admin)
        },
        "host answer to land",
    )
    .await;

    let json = view.export_responses().unwrap();
    assert!(json.contains("shipping fast"));

    // Hiding flips the local copy and sticks once the server agrees.
    // A poll fetched before the server flip may land after it, so the
    // probe checks a single settled snapshot, cloud included.
    let hidden_id = view.state().responses[0].id.clone();
    assert!(view.set_hidden(&hidden_id, true).await.unwrap());
    wait_for(
        || {
            let state = view.state();
            let hidden = state
                .responses
                .iter()
                .find(|r| r.id == hidden_id)
                .map(|r| r.is_moderated)
                .unwrap_or(false);
            hidden && state.word_cloud().iter().all(|w| w.text != "shipping fast")
        },
        "moderation to settle",
    )
    .await;

    // Put a second question on stage, then bring the first back. The
    // settling beat keeps a pre-activate poll from flipping the local
    // active question after the check, which clear_active reads.
    view.post_question("Anything else?").await.unwrap();
    let reactivated = view.activate(&question.id).await.unwrap();
    assert!(reactivated.is_active);
    assert_eq!(reactivated.id, question.id);
    tokio::time::sleep(Duration::from_millis(120)).await;
    wait_for(
        || {
            view.state()
                .active_question
                .as_ref()
                .map(|q| q.id == question.id)
                .unwrap_or(false)
        },
        "reactivated question to come back",
    )
    .await;

    assert_eq!(view.questions().await.unwrap().len(), 2);

    let cleared = view.clear_active().await.unwrap();
    assert!(cleared.responses.is_empty());
    wait_for(
        || view.state().responses.is_empty(),
        "cleared responses to settle",
    )
    .await;
}

// ---------------------------------------------------------------------------
// Test: the audience view selects the active question, overlays own
//       submissions and keeps a manual selection sticky
// ---------------------------------------------------------------------------

#[tokio::test]
async fn audience_view_overlay_and_sticky_selection() {
    let base = serve().await;
    let host = ApiClient::new(base.clone()).unwrap();
    let created = host.create_event("Q&A").await.unwrap();
    let event_id = created.event.id.clone();
    let first = host
        .add_question(&event_id, "Opening question")
        .await
        .unwrap();

    let participant = ApiClient::new(base).unwrap();
    let view = AudienceView::spawn(
        participant,
        event_id.clone(),
        "p_me".to_string(),
        fast_polls(),
    );

    // The first poll lands on the active question.
    wait_for(
        || view.state().selected_id() == Some(first.id.as_str()),
        "initial selection",
    )
    .await;

    // Same settling beat: the overlay shows the submission right
    // away, but one stale poll may drop it until the next tick.
    let mine = view.submit("hello from me").await.unwrap();
    assert_eq!(mine.text, "hello from me");
    tokio::time::sleep(Duration::from_millis(120)).await;
    wait_for(
        || {
            let responses = view.my_responses();
            responses.len() == 1 && responses[0].id == mine.id
        },
        "own submission to appear",
    )
    .await;

    // A new question goes live server-side; the earlier selection
    // survives because the question still exists.
    let second = host.add_question(&event_id, "Follow-up").await.unwrap();
    wait_for(|| view.state().questions().len() == 2, "question list").await;
    assert_eq!(view.state().selected_id(), Some(first.id.as_str()));

    // Manual switching works and stays put across further polls.
    assert!(view.select(&second.id));
    assert_eq!(view.state().selected_id(), Some(second.id.as_str()));
    tokio::time::sleep(Duration::from_millis(150)).await;
    assert_eq!(view.state().selected_id(), Some(second.id.as_str()));

    // Unknown ids are refused and change nothing.
    assert!(!view.select("nope"));
    assert_eq!(view.state().selected_id(), Some(second.id.as_str()));
}

// ---------------------------------------------------------------------------
// Test: session resume by id, by code fallback and admin takeover
// ---------------------------------------------------------------------------

#[tokio::test]
async fn session_resume_round_trip() {
    let client = ApiClient::new(serve().await).unwrap();
    let created = client.create_event("Recurring").await.unwrap();

    let mut session = SessionContext::default();
    session.remember_join(&created.event);
    let found = resume(&client, &mut session).await.unwrap();
    assert_eq!(found.id, created.event.id);
    assert_eq!(session.role, Some(Role::Participant));

    // A stale id falls back to the code and heals itself.
    session.event_id = Some("stale".to_string());
    let found = resume(&client, &mut session).await.unwrap();
    assert_eq!(found.id, created.event.id);
    assert_eq!(session.event_id.as_deref(), Some(created.event.id.as_str()));

    // Admin takeover from a blank session with the shared credentials.
    let mut admin_session = SessionContext::default();
    let event = resume_as_admin(
        &client,
        &mut admin_session,
        &created.event.access_code,
        &created.admin_key,
        &created.admin_pin,
    )
    .await
    .unwrap();
    assert_eq!(event.id, created.event.id);
    assert_eq!(admin_session.role, Some(Role::Admin));
    assert_eq!(admin_session.admin_key.as_deref(), Some(created.admin_key.as_str()));

    // Wrong credentials are refused and remember nothing.
    let wrong_pin = if created.admin_pin == "999999" {
        "000000"
    } else {
        "999999"
    };
    let mut intruder = SessionContext::default();
    let denied = resume_as_admin(
        &client,
        &mut intruder,
        &created.event.access_code,
        &created.admin_key,
        wrong_pin,
    )
    .await;
    assert!(matches!(denied, Err(ClientError::Unauthorized)));
    assert_eq!(intruder.role, None);

    // An empty session has nothing to resume.
    let mut empty = SessionContext::default();
    let stale = resume(&client, &mut empty).await;
    assert!(matches!(stale, Err(ClientError::StaleSession)));
}
