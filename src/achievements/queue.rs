// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// FILA DE CONQUISTAS A EXIBIR
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

use std::collections::VecDeque;

use crate::types::Achievement;

/// Fila FIFO de conquistas aguardando apresentação.
///
/// A frente da fila é a conquista "sendo exibida"; cada dispensa remove a frente.
#[derive(Debug, Clone, Default)]
pub struct AchievementQueue {
    items: VecDeque<Achievement>,
}

impl AchievementQueue {
    /// Cria uma fila vazia
    pub fn new() -> Self {
        Self::default()
    }

    /// Enfileira um lote inteiro, mantendo a ordem
    pub fn enqueue_batch(&mut self, batch: Vec<Achievement>) {
        self.items.extend(batch);
    }

    /// Conquista sendo exibida
    pub fn current(&self) -> Option<&Achievement> {
        self.items.front()
    }

    /// Dispensa a conquista exibida.
    ///
    /// Retorna `true` quando a fila esvaziou com esta dispensa.
    pub fn dismiss(&mut self) -> bool {
        self.items.pop_front().is_some() && self.items.is_empty()
    }

    /// Fila vazia
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Quantidade aguardando
    pub fn len(&self) -> usize {
        self.items.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn achievement(id: &str) -> Achievement {
        Achievement {
            id: id.to_string(),
            title: id.to_string(),
            description: String::new(),
            xp: 10,
            icon: "⭐".to_string(),
            lesson_path: None,
        }
    }

    #[test]
    fn test_fifo_order() {
        let mut queue = AchievementQueue::new();
        queue.enqueue_batch(vec![achievement("a"), achievement("b")]);
        queue.enqueue_batch(vec![achievement("c")]);

        assert_eq!(queue.len(), 3);
        assert_eq!(queue.current().unwrap().id, "a");
        assert!(!queue.dismiss());
        assert_eq!(queue.current().unwrap().id, "b");
        assert!(!queue.dismiss());
        assert!(queue.dismiss());
        assert!(queue.is_empty());
    }

    #[test]
    fn test_dismiss_on_empty_queue() {
        let mut queue = AchievementQueue::new();
        assert!(!queue.dismiss());
        assert!(queue.current().is_none());
    }
}
