// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// CANAL DE EVENTOS DA SESSÃO
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//
// Cada sessão de lição tem seu próprio canal, injetado no runner e no
// coordinator. Observadores (modal de conquistas, barra de XP) assinam
// com `subscribe()`.
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

use tokio::sync::broadcast;

use crate::types::Achievement;

/// Capacidade padrão do canal
pub const DEFAULT_EVENT_CAPACITY: usize = 64;

/// Eventos emitidos durante a sessão
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AchievementEvent {
    /// Lote de conquistas persistidas (um evento por lote)
    Earned(Vec<Achievement>),
    /// O lote foi exibido; observadores devem reler o store
    RefreshRequested,
    /// Execução sem diagnósticos concluída
    RunSucceeded {
        /// Contagem após a execução
        run_count: u32,
    },
}

/// Canal de eventos de conquistas de uma sessão
#[derive(Debug, Clone)]
pub struct AchievementEvents {
    sender: broadcast::Sender<AchievementEvent>,
}

impl Default for AchievementEvents {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_CAPACITY)
    }
}

impl AchievementEvents {
    /// Cria um canal com a capacidade informada
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Assina os eventos a partir de agora
    pub fn subscribe(&self) -> broadcast::Receiver<AchievementEvent> {
        self.sender.subscribe()
    }

    /// Publica um evento. Retorna quantos observadores o receberam.
    pub fn publish(&self, event: AchievementEvent) -> usize {
        match self.sender.send(event) {
            Ok(receivers) => receivers,
            Err(e) => {
                log::debug!("no subscribers for {:?}", e.0);
                0
            }
        }
    }

    /// Número de observadores ativos
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}
