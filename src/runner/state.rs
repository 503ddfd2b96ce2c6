// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// ESTADOS DO RUNNER
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

use std::fmt;

/// Estado de uma execução - transições explícitas
///
/// ```text
/// Idle → Analyzing → Blocked   → Idle
///                  → Executing → Idle
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunState {
    /// Pronto para uma nova execução
    #[default]
    Idle,
    /// Análise estática em andamento
    Analyzing,
    /// Análise encontrou diagnósticos; o código não será executado
    Blocked,
    /// Código rodando no sandbox
    Executing,
}

impl RunState {
    /// Verifica se o runner aceita uma nova execução
    pub fn is_idle(&self) -> bool {
        matches!(self, RunState::Idle)
    }

    /// Verifica se uma transição é válida
    pub fn can_transition_to(&self, target: RunState) -> bool {
        matches!(
            (self, target),
            (RunState::Idle, RunState::Analyzing)
                | (RunState::Analyzing, RunState::Blocked)
                | (RunState::Analyzing, RunState::Executing)
                | (RunState::Blocked, RunState::Idle)
                | (RunState::Executing, RunState::Idle)
                // Saída antecipada (erro inesperado durante a análise)
                | (RunState::Analyzing, RunState::Idle)
        )
    }

    /// Nome do estado para logs
    pub fn as_str(&self) -> &'static str {
        match self {
            RunState::Idle => "Idle",
            RunState::Analyzing => "Analyzing",
            RunState::Blocked => "Blocked",
            RunState::Executing => "Executing",
        }
    }
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_idle() {
        assert!(RunState::default().is_idle());
    }

    #[test]
    fn test_valid_transitions() {
        assert!(RunState::Idle.can_transition_to(RunState::Analyzing));
        assert!(RunState::Analyzing.can_transition_to(RunState::Blocked));
        assert!(RunState::Analyzing.can_transition_to(RunState::Executing));
        assert!(RunState::Blocked.can_transition_to(RunState::Idle));
        assert!(RunState::Executing.can_transition_to(RunState::Idle));
    }

    #[test]
    fn test_invalid_transitions() {
        assert!(!RunState::Idle.can_transition_to(RunState::Executing));
        assert!(!RunState::Blocked.can_transition_to(RunState::Executing));
        assert!(!RunState::Executing.can_transition_to(RunState::Analyzing));
        assert!(!RunState::Idle.can_transition_to(RunState::Blocked));
    }
}
