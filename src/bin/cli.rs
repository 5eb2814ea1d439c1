//! Terminal client for LiveQA events.
//!
//! One binary covers both sides of an event: hosts create or resume
//! events and moderate from an interactive prompt, participants join
//! with the five-digit access code and type responses. Live state
//! comes from the polling views in `liveqa::client`; the prompt and
//! the renderer share the terminal through a select over stdin lines
//! and watch-channel updates.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use liveqa::client::{
    normalize_access_code, resume, resume_as_admin, AdminView, AdminViewState, ApiClient,
    AudienceView, AudienceViewState, ClientError, ClientResult, SessionContext, SyncConfig,
};
use liveqa::types::Role;

#[derive(Parser)]
#[command(name = "liveqa-cli")]
#[command(about = "Terminal client for LiveQA events")]
struct Cli {
    /// Base URL of the LiveQA server
    #[arg(
        long,
        env = "LIVEQA_SERVER_URL",
        default_value = "http://localhost:5174"
    )]
    server: String,

    /// Where the session file lives
    #[arg(long, env = "LIVEQA_SESSION_FILE", default_value = ".liveqa-session.json")]
    session: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new event and start hosting it
    Create {
        /// Event name shown to participants
        name: String,
    },

    /// Join an event as an anonymous participant
    Join {
        /// Five-digit access code
        code: String,
    },

    /// Pick up the saved session, in whatever role it holds
    Resume,

    /// Host an existing event with its admin credentials
    Host {
        /// Five-digit access code
        code: String,
        #[arg(long, env = "LIVEQA_ADMIN_KEY")]
        key: String,
        #[arg(long, env = "LIVEQA_ADMIN_PIN")]
        pin: String,
    },

    /// Forget the saved session
    Clear,
}

const HOST_HELP: &str = "\
commands:
  /ask <text>      pose a new question (goes live immediately)
  /answer <text>   answer the live question yourself
  /questions       list all questions
  /switch <n>      put question n on screen
  /responses       moderation list with response ids
  /hide <id>       hide a response from everyone
  /show <id>       bring it back
  /clear           wipe the live question's responses
  /export          dump every response as JSON
  /quit            leave (the event keeps running)";

const AUDIENCE_HELP: &str = "\
type a response and hit enter to submit it
  /questions   list the event's questions
  /switch <n>  look at question n
  /mine        your responses to the current question
  /quit        leave";

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Quiet by default, RUST_LOG opens it up. Logs go to stderr so
    // they do not interleave with the prompt.
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> ClientResult<()> {
    let client = ApiClient::new(cli.server.clone())?;
    let mut session = SessionContext::load(&cli.session)?;

    match cli.command {
        Commands::Create { name } => {
            let created = client.create_event(&name).await?;
            println!("Event \"{}\" is live.", created.event.name);
            println!();
            println!("  Access code: {}", created.event.access_code);
            println!("  Admin key:   {}", created.admin_key);
            println!("  Admin PIN:   {}", created.admin_pin);
            println!();
            println!("Write the key and PIN down, they are not shown again.");
            session.remember_admin(&created.event, &created.admin_key, &created.admin_pin);
            session.save(&cli.session)?;
            host_loop(client, created.event.id).await
        }
        Commands::Join { code } => {
            let code = normalize_access_code(&code).ok_or_else(|| {
                ClientError::Rejected("access code must be five digits".to_string())
            })?;
            let event = client
                .get_event_by_code(&code)
                .await?
                .ok_or(ClientError::NotFound { entity: "event" })?;
            session.remember_join(&event);
            let participant_id = session.participant_id_for(&event.id);
            session.save(&cli.session)?;
            println!("Joined \"{}\".", event.name);
            audience_loop(client, event.id, participant_id, session, cli.session).await
        }
        Commands::Resume => {
            let event = resume(&client, &mut session).await?;
            session.save(&cli.session)?;
            match session.role {
                Some(Role::Admin) => {
                    println!("Hosting \"{}\" again.", event.name);
                    host_loop(client, event.id).await
                }
                Some(Role::Participant) => {
                    let participant_id = session.participant_id_for(&event.id);
                    session.save(&cli.session)?;
                    println!("Back in \"{}\".", event.name);
                    audience_loop(client, event.id, participant_id, session, cli.session).await
                }
                None => Err(ClientError::StaleSession),
            }
        }
        Commands::Host { code, key, pin } => {
            let event = resume_as_admin(&client, &mut session, &code, &key, &pin).await?;
            session.save(&cli.session)?;
            println!("Hosting \"{}\".", event.name);
            host_loop(client, event.id).await
        }
        Commands::Clear => {
            session.clear();
            session.save(&cli.session)?;
            println!("Session cleared.");
            Ok(())
        }
    }
}

async fn host_loop(client: ApiClient, event_id: String) -> ClientResult<()> {
    let view = AdminView::spawn(client, event_id, SyncConfig::default());
    let mut updates = view.subscribe();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut last = AdminViewState::default();

    println!("{}", HOST_HELP);
    loop {
        tokio::select! {
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                let state = updates.borrow_and_update().clone();
                if state != last {
                    render_host(&state);
                    last = state;
                }
            }
            line = lines.next_line() => {
                match line? {
                    Some(line) => {
                        if !host_command(&view, line.trim()).await {
                            break;
                        }
                    }
                    None => break,
                }
            }
        }
    }
    Ok(())
}

/// Runs one host command. Returns false when the loop should end.
async fn host_command(view: &AdminView, line: &str) -> bool {
    if line.is_empty() {
        return true;
    }
    let (command, rest) = match line.split_once(char::is_whitespace) {
        Some((c, r)) => (c, r.trim()),
        None => (line, ""),
    };
    let outcome: ClientResult<()> = match command {
        "/ask" if !rest.is_empty() => view.post_question(rest).await.map(|q| {
            println!("live: {}", q.text);
        }),
        "/answer" if !rest.is_empty() => view.submit_answer(rest).await.map(|_| ()),
        "/questions" => list_questions(view).await,
        "/switch" => switch_question(view, rest).await,
        "/responses" => {
            render_moderation(&view.state());
            Ok(())
        }
        "/hide" if !rest.is_empty() => moderate(view, rest, true).await,
        "/show" if !rest.is_empty() => moderate(view, rest, false).await,
        "/clear" => view.clear_active().await.map(|q| {
            println!("cleared: {}", q.text);
        }),
        "/export" => view.export_responses().map(|json| println!("{}", json)),
        "/help" => {
            println!("{}", HOST_HELP);
            Ok(())
        }
        "/quit" => return false,
        _ => {
            println!("unknown command, /help lists them");
            Ok(())
        }
    };
    if let Err(e) = outcome {
        println!("error: {}", e);
    }
    true
}

async fn list_questions(view: &AdminView) -> ClientResult<()> {
    let questions = view.questions().await?;
    if questions.is_empty() {
        println!("no questions yet, /ask one");
        return Ok(());
    }
    for (i, question) in questions.iter().enumerate() {
        let marker = if question.is_active { " [live]" } else { "" };
        println!(
            "  {}. {}{}  ({} responses)",
            i + 1,
            question.text,
            marker,
            question.responses.len()
        );
    }
    Ok(())
}

async fn switch_question(view: &AdminView, rest: &str) -> ClientResult<()> {
    let questions = view.questions().await?;
    let index = rest
        .parse::<usize>()
        .ok()
        .and_then(|n| n.checked_sub(1))
        .filter(|i| *i < questions.len());
    match index {
        Some(i) => {
            let question = view.activate(&questions[i].id).await?;
            println!("live: {}", question.text);
        }
        None => println!("usage: /switch <n> with n from /questions"),
    }
    Ok(())
}

async fn moderate(view: &AdminView, id: &str, hidden: bool) -> ClientResult<()> {
    if view.set_hidden(id, hidden).await? {
        println!("{}: {}", if hidden { "hidden" } else { "restored" }, id);
    } else {
        println!("no response with id {}", id);
    }
    Ok(())
}

fn render_host(state: &AdminViewState) {
    println!();
    match &state.active_question {
        Some(question) => {
            println!("=== {}", question.text);
            let visible: Vec<_> = question
                .responses
                .iter()
                .filter(|r| !r.is_moderated)
                .collect();
            if visible.is_empty() {
                println!("    no responses yet");
            }
            for response in visible {
                let tag = if response.is_from_admin { " [host]" } else { "" };
                println!("    {}{}", response.text, tag);
            }
            let cloud = state.word_cloud();
            if !cloud.is_empty() {
                let top: Vec<String> = cloud
                    .iter()
                    .take(8)
                    .map(|w| format!("{} ({})", w.text, w.count))
                    .collect();
                println!("    cloud: {}", top.join(", "));
            }
        }
        None => println!("=== nothing live, /ask a question"),
    }
}

fn render_moderation(state: &AdminViewState) {
    if state.responses.is_empty() {
        println!("no responses yet");
        return;
    }
    for response in &state.responses {
        let mut tags = String::new();
        if response.is_from_admin {
            tags.push_str(" [host]");
        }
        if response.is_moderated {
            tags.push_str(" [hidden]");
        }
        println!("  {}  {}{}", response.id, response.text, tags);
    }
}

async fn audience_loop(
    client: ApiClient,
    event_id: String,
    participant_id: String,
    mut session: SessionContext,
    session_path: PathBuf,
) -> ClientResult<()> {
    let view = AudienceView::spawn(client, event_id, participant_id, SyncConfig::default());
    let mut updates = view.subscribe();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut last = AudienceViewState::default();

    println!("{}", AUDIENCE_HELP);
    loop {
        tokio::select! {
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                let state = updates.borrow_and_update().clone();
                if state != last {
                    render_audience(&state, view.participant_id());
                    last = state;
                }
            }
            line = lines.next_line() => {
                match line? {
                    Some(line) => {
                        if !audience_command(&view, &mut session, &session_path, line.trim()).await {
                            break;
                        }
                    }
                    None => break,
                }
            }
        }
    }
    Ok(())
}

/// Runs one participant input line. Returns false when the loop
/// should end.
async fn audience_command(
    view: &AudienceView,
    session: &mut SessionContext,
    session_path: &Path,
    line: &str,
) -> bool {
    if line.is_empty() {
        return true;
    }
    if let Some(rest) = line.strip_prefix('/') {
        let (command, arg) = match rest.split_once(char::is_whitespace) {
            Some((c, a)) => (c, a.trim()),
            None => (rest, ""),
        };
        match command {
            "questions" => {
                let state = view.state();
                if state.questions().is_empty() {
                    println!("nothing asked yet");
                }
                for (i, question) in state.questions().iter().enumerate() {
                    let mut marker = String::new();
                    if question.is_active {
                        marker.push_str(" [live]");
                    }
                    if state.selected_id() == Some(question.id.as_str()) {
                        marker.push_str(" <-");
                    }
                    println!("  {}. {}{}", i + 1, question.text, marker);
                }
            }
            "switch" => {
                let state = view.state();
                let id = arg
                    .parse::<usize>()
                    .ok()
                    .and_then(|n| n.checked_sub(1))
                    .and_then(|i| state.questions().get(i))
                    .map(|q| q.id.clone());
                let switched = match id {
                    Some(id) => view.select(&id),
                    None => false,
                };
                if !switched {
                    println!("usage: /switch <n> with n from /questions");
                }
            }
            "mine" => {
                let mine = view.my_responses();
                if mine.is_empty() {
                    println!("nothing from you on this question yet");
                }
                for response in mine {
                    let tag = if response.is_moderated {
                        " [hidden by the host]"
                    } else {
                        ""
                    };
                    println!("  {}{}", response.text, tag);
                }
            }
            "help" => println!("{}", AUDIENCE_HELP),
            "quit" => return false,
            _ => println!("unknown command, /help lists them"),
        }
        return true;
    }

    // Anything that is not a command is a response to the selected
    // question.
    let question_id = view.state().selected_id().map(str::to_string);
    if let Some(question_id) = &question_id {
        if session.has_submitted(question_id) {
            println!("(you already answered this one, sending another)");
        }
    }
    match view.submit(line).await {
        Ok(_) => {
            if let Some(question_id) = question_id {
                session.mark_submitted(&question_id);
                if let Err(e) = session.save(session_path) {
                    tracing::warn!("Could not save the session file: {}", e);
                }
            }
            println!("sent");
        }
        Err(e) => println!("error: {}", e),
    }
    true
}

fn render_audience(state: &AudienceViewState, participant_id: &str) {
    println!();
    if state.questions().is_empty() {
        println!("=== waiting for the host to ask something");
        return;
    }
    match state.selected_question() {
        Some(question) => {
            let live = if question.is_active { "" } else { " (not live)" };
            println!("=== {}{}", question.text, live);
            let visible: Vec<_> = question
                .responses
                .iter()
                .filter(|r| !r.is_moderated)
                .collect();
            if visible.is_empty() {
                println!("    no responses yet, type one and hit enter");
            }
            for response in visible {
                let tag = if response.is_from_admin {
                    " [host]"
                } else if response.participant_id.as_deref() == Some(participant_id) {
                    " [you]"
                } else {
                    ""
                };
                println!("    {}{}", response.text, tag);
            }
        }
        None => println!("=== no question selected, /questions to pick one"),
    }
}
