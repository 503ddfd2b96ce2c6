// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// CODE QUEST CLI
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//
// Executa uma submissão pelo mesmo pipeline do editor das lições.
//
// Uso:
//   code-quest-cli hello.js
//   code-quest-cli --page /lessons/variables --user ana vars.js
//   echo 'console.log("Hi")' | code-quest-cli -
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

use std::io::Read;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context as _;
use code_quest::achievements::INTRODUCTION_PAGE;
use code_quest::prelude::*;

/// Tenta carregar o arquivo .env do diretório atual ou do diretório pai
fn load_dotenv() {
    let possible_paths = [PathBuf::from(".env"), PathBuf::from("../.env")];

    for path in &possible_paths {
        if path.exists() {
            match dotenvy::from_path(path) {
                Ok(_) => {
                    log::debug!("Loaded .env from {:?}", path);
                    return;
                }
                Err(e) => {
                    eprintln!("⚠ Failed to load {:?}: {}", path, e);
                }
            }
        }
    }
}

fn print_usage(program: &str) {
    eprintln!("Code Quest CLI v{}", code_quest::VERSION);
    eprintln!();
    eprintln!("Usage: {} [--page PATH] [--user ID] <file.js | ->", program);
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --page <path>   Lesson page (default: {})", INTRODUCTION_PAGE);
    eprintln!("  --user <id>     User whose progress is updated (default: CODE_QUEST_USER)");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  CODE_QUEST_STORE        memory | local (default: local)");
    eprintln!("  CODE_QUEST_STORE_DIR    Progress directory (default: ./progress)");
    eprintln!("  CODE_QUEST_LOOP_LIMIT   Sandbox loop iteration limit");
}

/// Argumentos da linha de comando
struct CliArgs {
    page: String,
    user: Option<String>,
    source: String,
}

fn parse_args(args: &[String]) -> Option<CliArgs> {
    let mut page = INTRODUCTION_PAGE.to_string();
    let mut user = None;
    let mut source = None;

    let mut iter = args.iter().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--page" => page = iter.next()?.clone(),
            "--user" => user = Some(iter.next()?.clone()),
            "-h" | "--help" => return None,
            _ => source = Some(arg.clone()),
        }
    }

    Some(CliArgs {
        page,
        user,
        source: source?,
    })
}

fn read_source(source: &str) -> anyhow::Result<String> {
    if source == "-" {
        let mut code = String::new();
        std::io::stdin()
            .read_to_string(&mut code)
            .context("failed to read code from stdin")?;
        Ok(code)
    } else {
        std::fs::read_to_string(source).with_context(|| format!("failed to read {}", source))
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Carregar .env PRIMEIRO, antes de qualquer coisa
    load_dotenv();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = std::env::args().collect();
    let program = args.first().map(String::as_str).unwrap_or("code-quest-cli");
    let Some(cli) = parse_args(&args) else {
        print_usage(program);
        std::process::exit(1);
    };

    let code = read_source(&cli.source)?;
    let runner_config = load_runner_config();
    let mut store_config = load_store_config();
    if let Some(user) = cli.user {
        store_config.user_id = user;
    }

    let store = create_store(&store_config);
    log::info!("📦 Using {} store for '{}'", store.name(), store_config.user_id);

    let events = AchievementEvents::default();
    let coordinator = Arc::new(AwardCoordinator::new(
        store,
        store_config.user_id.clone(),
        events.clone(),
    ));
    let runner = LessonRunner::new(Some(&cli.page), &runner_config, coordinator.clone(), events);

    let report = runner
        .run(&code)
        .await
        .context("runner was busy")?;

    println!("{}", serde_json::to_string_pretty(&report)?);

    // Sem camada de apresentação: exibe e dispensa a fila inteira
    let mut queue = AchievementQueue::new();
    queue.enqueue_batch(report.awarded.clone());
    while let Some(achievement) = queue.current() {
        log::info!("{} {} (+{} XP)", achievement.icon, achievement.title, achievement.xp);
        if queue.dismiss() {
            coordinator.dismissed();
        }
    }

    if let Some(error) = coordinator.last_store_error().await {
        eprintln!("⚠ Progress could not be saved: {}", error);
    }

    let earned = coordinator.earned_ids().await;
    let catalog = AchievementCatalog::builtin();
    log::info!(
        "⭐ Total XP for '{}': {}",
        store_config.user_id,
        catalog.total_xp(&earned)
    );
    log::debug!("{}", report.timings.summary());

    Ok(())
}
