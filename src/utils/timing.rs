// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// TIMING UTILITIES
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//
// Mede quanto tempo cada fase de uma execução levou.
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

use std::time::{Duration, Instant};

/// Timer de uma fase do pipeline (análise, execução, premiação)
pub struct PhaseTimer {
    start: Instant,
    phase: &'static str,
}

impl PhaseTimer {
    /// Inicia o timer de uma fase
    pub fn start(phase: &'static str) -> Self {
        Self {
            start: Instant::now(),
            phase,
        }
    }

    /// Retorna o tempo decorrido
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    /// Para o timer e loga em nível debug
    pub fn stop_and_log(self) -> Duration {
        let elapsed = self.elapsed();
        log::debug!("⏱️  {} took {}µs", self.phase, elapsed.as_micros());
        elapsed
    }
}

/// Tempos da última execução
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunTimings {
    /// Análise estática
    pub analysis: Duration,
    /// Execução no sandbox (zero se bloqueada)
    pub execution: Duration,
    /// Avaliação e persistência de conquistas
    pub awarding: Duration,
}

impl RunTimings {
    /// Soma de todas as fases
    pub fn total(&self) -> Duration {
        self.analysis + self.execution + self.awarding
    }

    /// Resumo em uma linha para logs
    pub fn summary(&self) -> String {
        format!(
            "analysis {}µs, execution {}µs, awarding {}µs (total {}µs)",
            self.analysis.as_micros(),
            self.execution.as_micros(),
            self.awarding.as_micros(),
            self.total().as_micros()
        )
    }
}
