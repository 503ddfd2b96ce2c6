// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// LESSON RUNNER - Orquestração de cada execução
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//
// Pipeline por submissão:
//   análise → (bloqueia se houver diagnósticos) → sandbox → resultado
//           → regras de conquistas → coordinator
//
// Uma execução por vez por runner: pedidos enquanto outra está em
// andamento são ignorados. O flag de ocupado é liberado em qualquer saída.
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Executor isolado (Boa) com allow-list de globais.
pub mod sandbox;
/// Máquina de estados da execução.
pub mod state;

pub use sandbox::{SandboxError, SandboxExecutor, DEFAULT_ALLOWED_GLOBALS};
pub use state::RunState;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::Serialize;

use crate::achievements::{AchievementEvent, AchievementEvents, AwardCoordinator, RuleEngine};
use crate::analysis::{hints, Analyzer};
use crate::config::RunnerConfig;
use crate::types::{Achievement, Diagnostic, RunContext, RunResult, DEFAULT_PROGRAM};
use crate::utils::{PhaseTimer, RunTimings};

/// Resultado de uma chamada a [`LessonRunner::run`]
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    /// Resultado publicado para a apresentação
    pub result: RunResult,
    /// Conquistas concedidas nesta execução
    pub awarded: Vec<Achievement>,
    /// Tempo gasto em cada fase
    #[serde(skip)]
    pub timings: RunTimings,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Marca o runner como ocupado enquanto existir.
///
/// O drop devolve o runner a `Idle` e libera o flag em qualquer caminho de saída.
struct BusyGuard<'a> {
    runner: &'a LessonRunner,
}

impl<'a> BusyGuard<'a> {
    fn acquire(runner: &'a LessonRunner) -> Option<Self> {
        runner
            .busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()?;
        Some(Self { runner })
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.runner.set_state(RunState::Idle);
        self.runner.busy.store(false, Ordering::Release);
    }
}

/// Runner de código de uma lição
///
/// # Exemplo
/// ```ignore
/// let events = AchievementEvents::default();
/// let coordinator = Arc::new(AwardCoordinator::new(store, "ana", events.clone()));
/// let runner = LessonRunner::new(Some("/lessons/introduction"), &RunnerConfig::default(), coordinator, events);
///
/// let report = runner.run(r#"console.log("Hello, World!");"#).await.unwrap();
/// assert_eq!(report.result.output, "Hello, World!\n");
/// ```
pub struct LessonRunner {
    page: Option<String>,
    analyzer: Analyzer,
    sandbox: SandboxExecutor,
    rules: RuleEngine,
    coordinator: Arc<AwardCoordinator>,
    events: AchievementEvents,
    busy: AtomicBool,
    state: Mutex<RunState>,
    context: Mutex<RunContext>,
    buffer: Mutex<String>,
    last_result: Mutex<Option<RunResult>>,
}

impl LessonRunner {
    /// Cria um runner para a página, com o catálogo embutido de conquistas
    pub fn new(
        page: Option<&str>,
        config: &RunnerConfig,
        coordinator: Arc<AwardCoordinator>,
        events: AchievementEvents,
    ) -> Self {
        Self {
            page: page.map(str::to_string),
            analyzer: Analyzer::new(config),
            sandbox: SandboxExecutor::new(config),
            rules: RuleEngine::default(),
            coordinator,
            events,
            busy: AtomicBool::new(false),
            state: Mutex::new(RunState::Idle),
            context: Mutex::new(RunContext::for_page(page)),
            buffer: Mutex::new(DEFAULT_PROGRAM.to_string()),
            last_result: Mutex::new(None),
        }
    }

    /// Usa outro motor de regras (ex: catálogo carregado de arquivo)
    pub fn with_rules(mut self, rules: RuleEngine) -> Self {
        self.rules = rules;
        self
    }

    /// Usa outro executor (ex: allow-list customizada)
    pub fn with_sandbox(mut self, sandbox: SandboxExecutor) -> Self {
        self.sandbox = sandbox;
        self
    }

    /// Executa o código do aluno.
    ///
    /// Retorna `None` se outra execução já estiver em andamento.
    pub async fn run(&self, code: &str) -> Option<RunReport> {
        let Some(_guard) = BusyGuard::acquire(self) else {
            log::debug!("run ignored: runner is busy");
            return None;
        };

        *lock(&self.buffer) = code.to_string();
        self.set_state(RunState::Analyzing);

        let mut timings = RunTimings::default();
        let timer = PhaseTimer::start("analysis");
        let hints = hints(code);
        let diagnostics = self.analyzer.analyze(code, self.page.as_deref());
        timings.analysis = timer.stop_and_log();

        if !diagnostics.is_empty() {
            self.set_state(RunState::Blocked);
            log::info!(
                "🛑 Run blocked by {} diagnostic(s): {}",
                diagnostics.len(),
                diagnostics.iter().map(|d| d.kind.as_str()).collect::<Vec<_>>().join(", ")
            );
            let result = RunResult::blocked(diagnostics, hints);
            self.publish(&result);
            return Some(RunReport {
                result,
                awarded: Vec::new(),
                timings,
            });
        }

        self.set_state(RunState::Executing);
        let timer = PhaseTimer::start("execution");
        let executed = {
            let mut context = lock(&self.context);
            context.code = code.to_string();
            match self.sandbox.execute(code, &mut context.unique_output_lines) {
                Ok(output) => {
                    context.run_count += 1;
                    Ok((output, context.clone()))
                }
                Err(e) => Err(e),
            }
        };
        timings.execution = timer.stop_and_log();

        let (output, snapshot) = match executed {
            Ok(done) => done,
            Err(e) => {
                log::info!("💥 Run failed at runtime: {}", e);
                let result = RunResult::blocked(vec![Diagnostic::runtime(e.to_string())], hints);
                self.publish(&result);
                return Some(RunReport {
                    result,
                    awarded: Vec::new(),
                    timings,
                });
            }
        };

        let result = RunResult::success(output, hints);
        self.publish(&result);
        log::info!("✅ Run #{} succeeded", snapshot.run_count);

        let timer = PhaseTimer::start("awarding");
        let earned = self.coordinator.earned_ids().await;
        let qualified = self.rules.evaluate(&snapshot, &earned);
        let awarded = self.coordinator.award(qualified, &earned).await;
        timings.awarding = timer.stop_and_log();

        self.events.publish(AchievementEvent::RunSucceeded {
            run_count: snapshot.run_count,
        });
        log::debug!("run timings: {}", timings.summary());

        Some(RunReport {
            result,
            awarded,
            timings,
        })
    }

    /// Volta o editor ao programa inicial e limpa o último resultado.
    ///
    /// Só tem efeito com o runner em `Idle`; retorna `false` caso contrário.
    pub fn reset(&self) -> bool {
        if !self.state().is_idle() || self.busy.load(Ordering::Acquire) {
            return false;
        }
        *lock(&self.buffer) = DEFAULT_PROGRAM.to_string();
        *lock(&self.last_result) = None;
        true
    }

    /// Substitui o conteúdo do editor
    pub fn set_code(&self, code: &str) {
        *lock(&self.buffer) = code.to_string();
    }

    /// Conteúdo atual do editor
    pub fn code(&self) -> String {
        lock(&self.buffer).clone()
    }

    /// Página da lição
    pub fn page(&self) -> Option<&str> {
        self.page.as_deref()
    }

    /// Estado atual
    pub fn state(&self) -> RunState {
        *lock(&self.state)
    }

    /// Execuções sem diagnósticos até agora
    pub fn run_count(&self) -> u32 {
        lock(&self.context).run_count
    }

    /// Cópia do contexto acumulado
    pub fn context(&self) -> RunContext {
        lock(&self.context).clone()
    }

    /// Último resultado publicado
    pub fn last_result(&self) -> Option<RunResult> {
        lock(&self.last_result).clone()
    }

    /// Coordinator de conquistas da sessão
    pub fn coordinator(&self) -> &Arc<AwardCoordinator> {
        &self.coordinator
    }

    /// Canal de eventos da sessão
    pub fn events(&self) -> &AchievementEvents {
        &self.events
    }

    fn publish(&self, result: &RunResult) {
        *lock(&self.last_result) = Some(result.clone());
    }

    fn set_state(&self, next: RunState) {
        let mut state = lock(&self.state);
        if *state != next && !state.can_transition_to(next) {
            log::warn!("⚠️ Unexpected run state transition {} → {}", *state, next);
        }
        log::debug!("run state: {} → {}", *state, next);
        *state = next;
    }
}
