// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// SANDBOX EXECUTOR - Execução isolada do código do aluno
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//
// Executa JavaScript via Boa Engine com:
// - Apenas os globais da allow-list alcançáveis pelo código
// - console.log capturado em um buffer de saída
// - Limites de iterações de loop e de recursão
//
// Não há preempção por tempo de relógio: o código roda até o fim, lança
// um erro ou estoura um dos limites.
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

use std::collections::BTreeSet;

use boa_engine::object::builtins::JsArray;
use boa_engine::property::Attribute;
use boa_engine::{Context, JsString, JsValue, Source};
use thiserror::Error;

use crate::analysis::syntax_probe::{to_source_lines, wrap_as_function_body};
use crate::config::RunnerConfig;
use crate::types::DEFAULT_OUTPUT;
use crate::utils::{normalize_output_line, sanitize_html};

/// Globais expostos ao código do aluno
pub const DEFAULT_ALLOWED_GLOBALS: &[&str] = &[
    "console",
    "Math",
    "Date",
    "parseInt",
    "parseFloat",
    "String",
    "Number",
    "Array",
];

/// Nome temporário do buffer de saída durante o setup (removido antes do código rodar)
const SINK_NAME: &str = "__codeQuestSink";

/// Erros que podem ocorrer durante a execução no sandbox
#[derive(Debug, Error)]
pub enum SandboxError {
    /// Erro lançado (ou de parse) pelo código do aluno, mensagem original
    #[error("{message}")]
    Runtime {
        /// Mensagem original do engine
        message: String,
    },

    /// Limite de loop ou recursão excedido
    #[error("Resource limit exceeded: {0}")]
    ResourceLimit(String),

    /// Falha ao montar o ambiente isolado
    #[error("Sandbox setup failed: {0}")]
    Setup(String),
}

impl SandboxError {
    fn from_engine(message: String) -> Self {
        let message = to_source_lines(&message);
        let lower = message.to_lowercase();
        if lower.contains("exceeded") && (lower.contains("limit") || lower.contains("maximum")) {
            SandboxError::ResourceLimit(message)
        } else {
            SandboxError::Runtime { message }
        }
    }
}

/// Executor isolado de código do aluno
#[derive(Debug, Clone)]
pub struct SandboxExecutor {
    allowed_globals: Vec<String>,
    loop_iteration_limit: u64,
    recursion_limit: usize,
}

impl Default for SandboxExecutor {
    fn default() -> Self {
        Self::new(&RunnerConfig::default())
    }
}

impl SandboxExecutor {
    /// Cria um executor com a allow-list padrão e os limites da configuração
    pub fn new(config: &RunnerConfig) -> Self {
        Self {
            allowed_globals: DEFAULT_ALLOWED_GLOBALS.iter().map(|s| s.to_string()).collect(),
            loop_iteration_limit: config.loop_iteration_limit,
            recursion_limit: config.recursion_limit,
        }
    }

    /// Substitui a allow-list de globais
    pub fn with_allowed_globals(mut self, names: &[&str]) -> Self {
        self.allowed_globals = names.iter().map(|s| s.to_string()).collect();
        self
    }

    /// Globais expostos ao código
    pub fn allowed_globals(&self) -> &[String] {
        &self.allowed_globals
    }

    /// Executa o código e retorna a saída acumulada de `console.log`.
    ///
    /// Cada linha impressa (normalizada, não vazia e diferente da saída do
    /// programa padrão) é adicionada a `unique_lines`, mesmo quando o código
    /// lança um erro depois de imprimir.
    pub fn execute(
        &self,
        code: &str,
        unique_lines: &mut BTreeSet<String>,
    ) -> Result<String, SandboxError> {
        let mut context = Context::default();
        context
            .runtime_limits_mut()
            .set_loop_iteration_limit(self.loop_iteration_limit);
        context
            .runtime_limits_mut()
            .set_recursion_limit(self.recursion_limit);

        let sink = JsArray::new(&mut context);
        context
            .register_global_property(JsString::from(SINK_NAME), sink.clone(), Attribute::all())
            .map_err(|e| SandboxError::Setup(e.to_string()))?;

        context
            .eval(Source::from_bytes(&self.prelude()))
            .map_err(|e| SandboxError::Setup(e.to_string()))?;

        let program = format!("{}()", wrap_as_function_body(code));
        let result = context.eval(Source::from_bytes(&program));

        let lines = drain_sink(&sink, &mut context)?;
        let mut output = String::new();
        for line in lines {
            for printed in line.split('\n') {
                if let Some(normalized) = normalize_output_line(printed) {
                    if normalized != DEFAULT_OUTPUT {
                        unique_lines.insert(normalized);
                    }
                }
            }
            output.push_str(&line);
            output.push('\n');
        }

        match result {
            Ok(_) => Ok(output),
            Err(e) => {
                let error = SandboxError::from_engine(e.to_string());
                log::debug!("sandbox execution failed: {}", error);
                Err(error)
            }
        }
    }

    /// Script de setup: instala o console e remove globais fora da allow-list.
    ///
    /// O console guarda referências próprias a `JSON` e `String`, então
    /// continua funcionando depois que esses nomes somem do escopo global.
    fn prelude(&self) -> String {
        let allowed = self
            .allowed_globals
            .iter()
            .map(|name| format!("\"{}\"", name))
            .collect::<Vec<_>>()
            .join(", ");

        format!(
            r#"
(function (global, sink) {{
    var stringify = JSON.stringify;
    var toText = String;
    global.console = {{
        log: function () {{
            var parts = [];
            for (var i = 0; i < arguments.length; i++) {{
                var value = arguments[i];
                if (typeof value === "string") {{
                    parts.push([true, value]);
                }} else if (typeof value === "object" && value !== null) {{
                    var json;
                    try {{ json = stringify(value); }} catch (e) {{ json = undefined; }}
                    parts.push([false, json === undefined ? toText(value) : json]);
                }} else {{
                    parts.push([false, toText(value)]);
                }}
            }}
            sink.push(stringify(parts));
        }}
    }};
    var allowed = [{allowed}];
    Object.getOwnPropertyNames(global).forEach(function (key) {{
        if (allowed.indexOf(key) < 0) {{
            try {{ delete global[key]; }} catch (e) {{ global[key] = undefined; }}
        }}
    }});
}})(globalThis, {sink});
"#,
            allowed = allowed,
            sink = SINK_NAME,
        )
    }
}

/// Lê as chamadas registradas pelo console e monta cada linha impressa.
///
/// Strings passam pelo filtro de HTML; os demais valores já chegam convertidos.
fn drain_sink(sink: &JsArray, context: &mut Context) -> Result<Vec<String>, SandboxError> {
    let length = sink
        .length(context)
        .map_err(|e| SandboxError::Setup(e.to_string()))?;

    let mut lines = Vec::with_capacity(length as usize);
    for index in 0..length {
        let value: JsValue = sink
            .at(index as i64, context)
            .map_err(|e| SandboxError::Setup(e.to_string()))?;
        let Some(raw) = value.as_string().map(|s| s.to_std_string_escaped()) else {
            continue;
        };

        let parts: Vec<(bool, String)> =
            serde_json::from_str(&raw).map_err(|e| SandboxError::Setup(e.to_string()))?;
        let line = parts
            .into_iter()
            .map(|(is_string, text)| if is_string { sanitize_html(&text) } else { text })
            .collect::<Vec<_>>()
            .join(" ");
        lines.push(line);
    }

    Ok(lines)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(code: &str) -> (Result<String, SandboxError>, BTreeSet<String>) {
        let mut lines = BTreeSet::new();
        let result = SandboxExecutor::default().execute(code, &mut lines);
        (result, lines)
    }

    #[test]
    fn test_default_program_output() {
        let (result, lines) = run(r#"console.log("Hello, World!");"#);
        assert_eq!(result.unwrap(), "Hello, World!\n");
        // A saída do programa padrão nunca entra no conjunto
        assert!(lines.is_empty());
    }

    #[test]
    fn test_arguments_are_space_separated() {
        let (result, lines) = run(r#"console.log("Age:", 12, true, [1, 2]);"#);
        assert_eq!(result.unwrap(), "Age: 12 true [1,2]\n");
        assert!(lines.contains("Age: 12 true [1,2]"));
    }

    #[test]
    fn test_strings_are_sanitized() {
        let (result, _) = run(r#"console.log("<b>hi</b>", 1 < 2);"#);
        assert_eq!(result.unwrap(), "&lt;b&gt;hi&lt;/b&gt; true\n");
    }

    #[test]
    fn test_unique_lines_are_trimmed_and_deduplicated() {
        let (result, lines) = run(
            r#"console.log("  Hi  ");
console.log("Hi");
console.log("");"#,
        );
        assert_eq!(result.unwrap(), "  Hi  \nHi\n\n");
        assert_eq!(lines.len(), 1);
        assert!(lines.contains("Hi"));
    }

    #[test]
    fn test_ambient_globals_are_unreachable() {
        let (result, _) = run(
            r#"console.log(typeof JSON, typeof Object, typeof eval, typeof globalThis);
console.log(typeof Math, typeof parseInt, typeof Array);"#,
        );
        assert_eq!(
            result.unwrap(),
            "undefined undefined undefined undefined\nobject function function\n"
        );
    }

    #[test]
    fn test_allowed_globals_still_work() {
        let (result, _) = run(
            r#"console.log(Math.max(1, 5), parseInt("42"), Number("3"), String(7));"#,
        );
        assert_eq!(result.unwrap(), "5 42 3 7\n");
    }

    #[test]
    fn test_runtime_error_passes_message_through() {
        let (result, lines) = run("console.log(\"before\");\nmissingName();");
        match result {
            Err(SandboxError::Runtime { message }) => {
                assert!(message.contains("missingName"), "unexpected message: {}", message)
            }
            other => panic!("expected runtime error, got {:?}", other),
        }
        // A saída anterior ao erro ainda é registrada
        assert!(lines.contains("before"));
    }

    #[test]
    fn test_loop_limit_stops_infinite_loop() {
        let config = RunnerConfig {
            loop_iteration_limit: 1_000,
            ..Default::default()
        };
        let mut lines = BTreeSet::new();
        let result = SandboxExecutor::new(&config).execute("while (true) {}", &mut lines);
        assert!(matches!(result, Err(SandboxError::ResourceLimit(_))));
    }

    #[test]
    fn test_error_classification() {
        assert!(matches!(
            SandboxError::from_engine("RuntimeLimit: Maximum loop iteration limit 10 exceeded".into()),
            SandboxError::ResourceLimit(_)
        ));
        assert!(matches!(
            SandboxError::from_engine("ReferenceError: x is not defined".into()),
            SandboxError::Runtime { .. }
        ));
    }

    #[test]
    fn test_engine_positions_use_learner_lines() {
        match SandboxError::from_engine("SyntaxError: bad token at line 3, col 1".into()) {
            SandboxError::Runtime { message } => {
                assert_eq!(message, "SyntaxError: bad token at line 2, col 1")
            }
            other => panic!("unexpected error {:?}", other),
        }
    }
}
