// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// CATÁLOGO DE CONQUISTAS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//
// Dados estáticos: cada conquista tem um id único, título, descrição, XP
// positivo, ícone e a lição onde pode ser obtida.
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

use std::collections::{HashMap, HashSet};
use std::path::Path;

use thiserror::Error;

use crate::types::Achievement;

/// Lição de introdução
pub const INTRODUCTION_PAGE: &str = "/lessons/introduction";
/// Lição de variáveis
pub const VARIABLES_PAGE: &str = "/lessons/variables";

/// Erros de carregamento e consulta do catálogo
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Dois itens com o mesmo id
    #[error("duplicate achievement id '{0}'")]
    DuplicateId(String),

    /// XP precisa ser positivo
    #[error("achievement '{0}' must award a positive amount of XP")]
    InvalidXp(String),

    /// Id ausente do catálogo
    #[error("unknown achievement id '{0}'")]
    UnknownId(String),

    /// Falha ao ler o arquivo do catálogo
    #[error("failed to read catalog: {0}")]
    Io(#[from] std::io::Error),

    /// JSON inválido
    #[error("failed to parse catalog: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Catálogo imutável de conquistas, indexado por id
#[derive(Debug, Clone, Default)]
pub struct AchievementCatalog {
    achievements: Vec<Achievement>,
    index: HashMap<String, usize>,
}

impl AchievementCatalog {
    /// Cria um catálogo validando ids únicos e XP positivo
    pub fn new(achievements: Vec<Achievement>) -> Result<Self, CatalogError> {
        let mut index = HashMap::with_capacity(achievements.len());

        for (position, achievement) in achievements.iter().enumerate() {
            if achievement.xp == 0 {
                return Err(CatalogError::InvalidXp(achievement.id.clone()));
            }
            if index.insert(achievement.id.clone(), position).is_some() {
                return Err(CatalogError::DuplicateId(achievement.id.clone()));
            }
        }

        Ok(Self {
            achievements,
            index,
        })
    }

    /// Catálogo embutido das lições de introdução e variáveis
    pub fn builtin() -> Self {
        Self::new(builtin_entries()).unwrap_or_else(|e| {
            log::error!("❌ Built-in achievement catalog is invalid: {}", e);
            Self::default()
        })
    }

    /// Carrega um catálogo de uma string JSON (array de conquistas)
    pub fn from_json_str(json: &str) -> Result<Self, CatalogError> {
        let achievements: Vec<Achievement> = serde_json::from_str(json)?;
        Self::new(achievements)
    }

    /// Carrega um catálogo de um arquivo JSON
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    /// Busca por id
    pub fn get(&self, id: &str) -> Option<&Achievement> {
        self.index.get(id).map(|&i| &self.achievements[i])
    }

    /// Busca por id, falhando se não existir
    pub fn require(&self, id: &str) -> Result<&Achievement, CatalogError> {
        self.get(id)
            .ok_or_else(|| CatalogError::UnknownId(id.to_string()))
    }

    /// Conquistas de uma lição, na ordem do catálogo
    pub fn for_lesson(&self, path: &str) -> Vec<&Achievement> {
        self.achievements
            .iter()
            .filter(|a| a.lesson_path.as_deref() == Some(path))
            .collect()
    }

    /// Soma do XP das conquistas obtidas (ids desconhecidos são ignorados)
    pub fn total_xp(&self, earned_ids: &HashSet<String>) -> u32 {
        earned_ids
            .iter()
            .filter_map(|id| self.get(id))
            .map(|a| a.xp)
            .sum()
    }

    /// Todas as conquistas
    pub fn iter(&self) -> impl Iterator<Item = &Achievement> {
        self.achievements.iter()
    }

    /// Quantidade de conquistas
    pub fn len(&self) -> usize {
        self.achievements.len()
    }

    /// Catálogo vazio
    pub fn is_empty(&self) -> bool {
        self.achievements.is_empty()
    }
}

fn entry(id: &str, title: &str, description: &str, xp: u32, icon: &str, lesson: &str) -> Achievement {
    Achievement {
        id: id.to_string(),
        title: title.to_string(),
        description: description.to_string(),
        xp,
        icon: icon.to_string(),
        lesson_path: Some(lesson.to_string()),
    }
}

fn builtin_entries() -> Vec<Achievement> {
    vec![
        // Introdução
        entry("first-program", "First Program", "Ran your very first program without errors.", 50, "🚀", INTRODUCTION_PAGE),
        entry("hello-coder", "Hello Coder", "Printed a greeting with console.log.", 25, "👋", INTRODUCTION_PAGE),
        entry("quick-learner", "Quick Learner", "Got it right on the first successful run.", 25, "⚡", INTRODUCTION_PAGE),
        entry("code-explorer", "Code Explorer", "Ran your code three times or more.", 30, "🧭", INTRODUCTION_PAGE),
        entry("creative-coder", "Creative Coder", "Printed something new of your own.", 40, "🎨", INTRODUCTION_PAGE),
        entry("personalized-hello", "Personalized Hello", "Changed the starter greeting into your own.", 35, "✍️", INTRODUCTION_PAGE),
        // Variáveis
        entry("variable-master", "Variable Master", "Declared a variable with let, const or var.", 30, "📦", VARIABLES_PAGE),
        entry("string-sage", "String Sage", "Used a string value.", 20, "🧵", VARIABLES_PAGE),
        entry("number-ninja", "Number Ninja", "Stored a number in a variable.", 20, "🔢", VARIABLES_PAGE),
        entry("boolean-boss", "Boolean Boss", "Used true or false.", 20, "✅", VARIABLES_PAGE),
        entry("array-ace", "Array Ace", "Created an array with [ ].", 30, "📚", VARIABLES_PAGE),
        entry("object-expert", "Object Expert", "Created an object with { }.", 30, "🗂️", VARIABLES_PAGE),
        entry("name-wizard", "Name Wizard", "Named a variable in camelCase.", 25, "🧙", VARIABLES_PAGE),
        entry("value-changer", "Value Changer", "Declared a variable and later gave it a new value.", 35, "🔄", VARIABLES_PAGE),
        entry("null-navigator", "Null Navigator", "Worked with null or undefined.", 25, "🕳️", VARIABLES_PAGE),
    ]
}
