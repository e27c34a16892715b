use std::io::Write as _;
use std::path::Path;
use std::sync::Arc;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use eyre::Result;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};

use mycoach_app::command::{self, Command, HELP};
use mycoach_app::config::{self, AppConfig};
use mycoach_app::{aws, dashboard};
use mycoach_core::clock::{Clock, SystemClock};
use mycoach_core::models::profile::ProfileUpdate;
use mycoach_model::bedrock::BedrockCoach;
use mycoach_session::error::SessionError;
use mycoach_session::session::{CoachSession, TurnOutcome};
use mycoach_storage::backend::FileBackend;
use mycoach_storage::store::StateStore;

type Session = CoachSession<FileBackend, BedrockCoach>;
type Input = Lines<BufReader<Stdin>>;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = if config::has_config() {
        config::load_config()?
    } else {
        let fresh = AppConfig::new(jiff::Timestamp::now());
        config::save_config(&fresh)?;
        fresh
    };

    let clock: Arc<dyn Clock> = match &config.time_zone {
        Some(zone) => Arc::new(SystemClock::named(zone)?),
        None => Arc::new(SystemClock::system()),
    };
    let data_dir = config.resolved_data_dir()?;
    tracing::info!(
        data_dir = %data_dir.display(),
        region = %config.region,
        model_id = %config.model_id,
        credentials = %config::credential_summary(&config.credentials),
        "starting"
    );

    let store = Arc::new(StateStore::new(FileBackend::new(data_dir), clock));
    let sdk_config = aws::build_aws_config(&config.region, &config.credentials).await;
    let session = CoachSession::new(store, BedrockCoach::new(&sdk_config, &config.model_id));

    let mut input = BufReader::new(tokio::io::stdin()).lines();

    if !session.store().load()?.profile.onboarding_completed
        && !onboard(&session, &mut input).await?
    {
        return Ok(());
    }

    if let Some(outcome) = session.greet().await? {
        print_turn(&outcome);
    }
    println!("(type /help for commands)");

    loop {
        let Some(line) = prompt(&mut input, "> ").await? else {
            break;
        };
        let command = match Command::parse(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(e) => {
                println!("{e}");
                continue;
            }
        };
        if command == Command::Quit {
            break;
        }
        if let Err(e) = run(&session, command).await {
            println!("error: {e}");
        }
    }

    Ok(())
}

async fn run(session: &Session, command: Command) -> Result<()> {
    let store = session.store();
    let today = store.clock().today();

    match command {
        Command::Chat(text) => send(session, &text, None).await?,
        Command::Image { path, text } => {
            let payload = image_payload(&path)?;
            send(session, &text, Some(payload)).await?;
        }
        Command::ConfirmPlan => match session.confirm_plan()? {
            Some(state) => println!("{}", dashboard::render_plan(&state, today)),
            None => println!("No proposed plan to confirm."),
        },
        Command::ShowPlan => println!("{}", dashboard::render_plan(&store.load()?, today)),
        Command::Done(n) => mark_task(session, n, true)?,
        Command::Undo(n) => mark_task(session, n, false)?,
        Command::AddHabit(title) => {
            let state = store.add_habit(&title)?;
            println!("{}", dashboard::render_summary(&state, today));
        }
        Command::CheckHabit(n) => {
            let id = habit_id(session, n)?;
            let state = store.toggle_habit_check_in(id)?;
            println!("{}", dashboard::render_summary(&state, today));
        }
        Command::DeleteHabit(n) => {
            let id = habit_id(session, n)?;
            let state = store.delete_habit(id)?;
            println!("{}", dashboard::render_summary(&state, today));
        }
        Command::Weight(w) => {
            let state = store.update_profile(ProfileUpdate::current_weight(w))?;
            println!("{}", dashboard::render_summary(&state, today));
        }
        Command::Target(w) => {
            let state = store.update_profile(ProfileUpdate {
                target_weight: Some(w),
                ..ProfileUpdate::default()
            })?;
            println!("{}", dashboard::render_summary(&state, today));
        }
        Command::Stats => println!("{}", dashboard::render_summary(&store.load()?, today)),
        Command::Motivate => println!("{}", session.motivate().await?),
        Command::Reset => {
            store.clear()?;
            println!("All data erased. Restart to onboard again.");
        }
        Command::Help => println!("{HELP}"),
        Command::Quit => {}
    }
    Ok(())
}

fn mark_task(session: &Session, n: usize, completed: bool) -> Result<()> {
    let store = session.store();
    let state = store.load()?;
    let task =
        command::nth(&state.current_plan, n).ok_or_else(|| eyre::eyre!("no plan task {n}"))?;
    let state = store.toggle_task_completion(task, completed)?;
    println!("{}", dashboard::render_plan(&state, store.clock().today()));
    Ok(())
}

fn habit_id(session: &Session, n: usize) -> Result<uuid::Uuid> {
    let state = session.store().load()?;
    command::nth(&state.habits, n)
        .map(|h| h.id)
        .ok_or_else(|| eyre::eyre!("no habit {n}"))
}

async fn send(session: &Session, text: &str, image: Option<String>) -> Result<()> {
    match session.send(text, image).await {
        Ok(outcome) => print_turn(&outcome),
        Err(SessionError::Busy) => println!("Still thinking, hang on."),
        Err(e) => return Err(e.into()),
    }
    Ok(())
}

fn print_turn(outcome: &TurnOutcome) {
    println!("\n{}\n", outcome.reply.text);
    for title in &outcome.habits_added {
        println!("(now tracking habit: {title})");
    }
    if outcome.staged.is_some() {
        println!("(type /confirm to add this plan to your dashboard)");
    }
}

/// Ask the onboarding questions. Returns `false` if input ended first.
async fn onboard(session: &Session, input: &mut Input) -> Result<bool> {
    println!("Welcome. A few questions before we start.");

    let Some(name) = prompt(input, "Your name: ").await? else {
        return Ok(false);
    };
    let Some(age) = prompt(input, "Age: ").await? else {
        return Ok(false);
    };
    let Some(gender) = prompt(input, "Gender: ").await? else {
        return Ok(false);
    };
    let Some(goal) = prompt(input, "Main goal: ").await? else {
        return Ok(false);
    };
    let Some(current) = prompt(input, "Current weight (blank to skip): ").await? else {
        return Ok(false);
    };
    let Some(target) = prompt(input, "Target weight (blank to skip): ").await? else {
        return Ok(false);
    };
    let Some(coach) = prompt(input, "Name your coach (blank for default): ").await? else {
        return Ok(false);
    };

    let update = ProfileUpdate {
        name: Some(name.trim().to_string()),
        age: age.trim().parse().ok(),
        gender: Some(gender.trim().to_string()),
        goal: Some(goal.trim().to_string()),
        coach_name: Some(coach.trim().to_string()).filter(|c| !c.is_empty()),
        current_weight: current.trim().parse().ok(),
        target_weight: target.trim().parse().ok(),
        onboarding_completed: Some(true),
    };
    session.store().update_profile(update)?;
    Ok(true)
}

async fn prompt(input: &mut Input, label: &str) -> Result<Option<String>> {
    print!("{label}");
    std::io::stdout().flush()?;
    Ok(input.next_line().await?)
}

/// Read an image file into a data URL.
fn image_payload(path: &Path) -> Result<String> {
    let media_type = match path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .as_deref()
    {
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        _ => return Err(eyre::eyre!("unsupported image type: {}", path.display())),
    };
    let bytes = std::fs::read(path)
        .map_err(|e| eyre::eyre!("failed to read image at {}: {e}", path.display()))?;
    Ok(format!("data:{media_type};base64,{}", STANDARD.encode(bytes)))
}
