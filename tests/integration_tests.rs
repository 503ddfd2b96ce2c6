//! # Testes de Integração
//!
//! Este módulo valida o fluxo completo de uma execução pela API pública:
//! - Análise → Sandbox → Regras → Coordinator → Store
//! - Cenários das lições de introdução e variáveis
//! - Propriedades: comentários desbalanceados, ordem diagnóstico/execução, reset

use std::collections::HashSet;
use std::sync::Arc;

use code_quest::achievements::{INTRODUCTION_PAGE, VARIABLES_PAGE};
use code_quest::prelude::*;

fn session(page: &str) -> (LessonRunner, Arc<InMemoryStore>) {
    let store = Arc::new(InMemoryStore::new());
    let events = AchievementEvents::default();
    let coordinator = Arc::new(AwardCoordinator::new(store.clone(), "ana", events.clone()));
    let runner = LessonRunner::new(Some(page), &RunnerConfig::default(), coordinator, events);
    (runner, store)
}

fn awarded_ids(report: &RunReport) -> Vec<&str> {
    report.awarded.iter().map(|a| a.id.as_str()).collect()
}

// ============================================================================
// CENÁRIO A: primeira execução do programa padrão
// ============================================================================

#[tokio::test]
async fn test_first_run_of_default_program() {
    let (runner, store) = session(INTRODUCTION_PAGE);

    let report = runner
        .run(r#"console.log("Hello, World!");"#)
        .await
        .unwrap();

    assert!(report.result.diagnostics.is_empty());
    assert_eq!(report.result.output, "Hello, World!\n");
    assert_eq!(runner.run_count(), 1);

    let ids = awarded_ids(&report);
    assert!(ids.contains(&"first-program"));
    assert!(ids.contains(&"hello-coder"));
    assert!(ids.contains(&"quick-learner"));
    assert!(!ids.contains(&"personalized-hello"));

    // Tudo persistido
    assert_eq!(store.list_earned("ana").await.unwrap().len(), ids.len());
}

// ============================================================================
// CENÁRIO B: segunda execução com saudação personalizada
// ============================================================================

#[tokio::test]
async fn test_second_run_personalized_hello() {
    let (runner, _store) = session(INTRODUCTION_PAGE);

    runner.run(r#"console.log("Hello, World!");"#).await.unwrap();
    let report = runner.run(r#"console.log("Hello there!");"#).await.unwrap();

    assert_eq!(runner.run_count(), 2);
    let ids = awarded_ids(&report);
    assert!(ids.contains(&"personalized-hello"));
    assert!(ids.contains(&"creative-coder"));
    // Nada da primeira execução é concedido de novo
    assert!(!ids.contains(&"first-program"));
    assert!(!ids.contains(&"hello-coder"));
    assert!(runner.context().unique_output_lines.contains("Hello there!"));
}

// ============================================================================
// CENÁRIO C: comentário com uma barra só
// ============================================================================

#[tokio::test]
async fn test_single_slash_comment() {
    let (runner, _store) = session(INTRODUCTION_PAGE);

    let report = runner.run("/ not a real comment").await.unwrap();
    let diagnostics = &report.result.diagnostics;

    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].kind, DiagnosticKind::CommentError);
    assert!(diagnostics[0].help_link.is_some());
    assert!(diagnostics[0].message.contains("two slashes"));
    assert!(report.result.output.is_empty());
    assert_eq!(runner.run_count(), 0);
}

// ============================================================================
// CENÁRIO D: string aberta na linha 1, fechada na linha 3
// ============================================================================

#[tokio::test]
async fn test_string_spanning_lines() {
    let (runner, _store) = session(INTRODUCTION_PAGE);

    let report = runner.run("console.log(\"Hello\nWorld\n\");").await.unwrap();
    let diagnostics = &report.result.diagnostics;

    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].kind, DiagnosticKind::StringError);
    assert_eq!(diagnostics[0].line, Some(1));
    assert_eq!(diagnostics[0].column, Some(13));
}

// ============================================================================
// CENÁRIO E: variável declarada e reatribuída
// ============================================================================

#[tokio::test]
async fn test_value_changer_on_variables_page() {
    let (runner, _store) = session(VARIABLES_PAGE);

    let report = runner
        .run("let age = 25;\nconsole.log(age);\nage = 30;\nconsole.log(age);")
        .await
        .unwrap();

    assert!(report.result.diagnostics.is_empty());
    assert_eq!(report.result.output, "25\n30\n");
    let ids = awarded_ids(&report);
    assert!(ids.contains(&"value-changer"));
    assert!(ids.contains(&"number-ninja"));
}

#[test]
fn test_rule_engine_value_changer() {
    let engine = RuleEngine::default();
    let context = RunContext {
        run_count: 1,
        code: "let age = 25;\nconsole.log(age);\nage = 30;\nconsole.log(age);".to_string(),
        page: Some(VARIABLES_PAGE.to_string()),
        ..Default::default()
    };

    let ids: Vec<String> = engine
        .evaluate(&context, &HashSet::new())
        .into_iter()
        .map(|a| a.id)
        .collect();
    assert!(ids.contains(&"value-changer".to_string()));
    assert!(ids.contains(&"number-ninja".to_string()));
}

// ============================================================================
// PROPRIEDADES
// ============================================================================

#[test]
fn test_mismatched_block_comments_yield_single_comment_error() {
    let analyzer = Analyzer::default();
    let samples = [
        "/*",
        "*/",
        "/* one */ /* two",
        "console.log(\"hi\"); */",
        "/* a\n/* b\nconsole.log(hello)\n*/",
        "*/ console.log(\n/ lone",
    ];

    for code in samples {
        let diagnostics = analyzer.analyze(code, Some(INTRODUCTION_PAGE));
        assert_eq!(diagnostics.len(), 1, "code: {:?}", code);
        assert_eq!(diagnostics[0].kind, DiagnosticKind::CommentError, "code: {:?}", code);
    }
}

#[tokio::test]
async fn test_diagnostics_mean_no_output() {
    let (runner, _store) = session(INTRODUCTION_PAGE);
    let samples = [
        "console.log(hello);",
        "console.log \"hi\"",
        "/* open",
        "console.\nlog(\"x\")",
    ];

    for code in samples {
        let report = runner.run(code).await.unwrap();
        if !report.result.diagnostics.is_empty() {
            assert!(report.result.output.is_empty(), "code: {:?}", code);
        }
    }
    assert_eq!(runner.run_count(), 0);
}

#[tokio::test]
async fn test_awards_are_idempotent_across_runs() {
    let (runner, store) = session(INTRODUCTION_PAGE);

    let first = runner.run(r#"console.log("Hello, World!");"#).await.unwrap();
    let second = runner.run(r#"console.log("Hello, World!");"#).await.unwrap();

    assert!(!first.awarded.is_empty());
    for achievement in &second.awarded {
        assert!(!first.awarded.contains(achievement));
    }

    let stored: Vec<String> = store
        .list_earned("ana")
        .await
        .unwrap()
        .into_iter()
        .map(|e| e.achievement_id)
        .collect();
    let unique: HashSet<&String> = stored.iter().collect();
    assert_eq!(unique.len(), stored.len());
}

#[tokio::test]
async fn test_reset_round_trip() {
    let (runner, _store) = session(INTRODUCTION_PAGE);

    runner.run("console.log(\"Hi\");").await.unwrap();
    assert!(runner.reset());

    assert_eq!(runner.code(), DEFAULT_PROGRAM);
    assert!(runner.last_result().is_none());
}

#[tokio::test]
async fn test_earned_then_dismissed_events() {
    let (runner, _store) = session(INTRODUCTION_PAGE);
    let mut rx = runner.events().subscribe();

    let report = runner.run(r#"console.log("Hello, World!");"#).await.unwrap();

    match rx.recv().await.unwrap() {
        AchievementEvent::Earned(batch) => assert_eq!(batch, report.awarded),
        other => panic!("unexpected event {:?}", other),
    }
    assert_eq!(
        rx.recv().await.unwrap(),
        AchievementEvent::RunSucceeded { run_count: 1 }
    );

    let mut queue = AchievementQueue::new();
    queue.enqueue_batch(report.awarded.clone());
    while !queue.dismiss() {}
    assert!(runner.coordinator().dismissed());
    assert_eq!(rx.recv().await.unwrap(), AchievementEvent::RefreshRequested);
}

#[tokio::test]
async fn test_progress_survives_in_local_store() {
    let dir = tempfile::tempdir().unwrap();
    let events = AchievementEvents::default();
    let store: Arc<dyn AchievementStore> = Arc::new(LocalStore::new(dir.path().to_path_buf()));
    let coordinator = Arc::new(AwardCoordinator::new(store.clone(), "ana", events.clone()));
    let runner = LessonRunner::new(
        Some(INTRODUCTION_PAGE),
        &RunnerConfig::default(),
        coordinator,
        events,
    );
    runner.run(r#"console.log("Hello, World!");"#).await.unwrap();

    // Nova sessão, mesmo diretório: nada é concedido de novo
    let events = AchievementEvents::default();
    let coordinator = Arc::new(AwardCoordinator::new(store, "ana", events.clone()));
    let runner = LessonRunner::new(
        Some(INTRODUCTION_PAGE),
        &RunnerConfig::default(),
        coordinator,
        events,
    );
    let report = runner.run(r#"console.log("Hello, World!");"#).await.unwrap();
    let ids = awarded_ids(&report);
    assert!(!ids.contains(&"first-program"));
    assert!(!ids.contains(&"hello-coder"));
    // run_count recomeça na nova sessão, então quick-learner já obtido também não volta
    assert!(!ids.contains(&"quick-learner"));
}
