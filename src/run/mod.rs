//! Best-effort guess at what submitted code would print. This is NOT an
//! interpreter or a sandbox: it only recognizes literal `print("...")` calls
//! and echoes their arguments. The result is informational for the editor
//! pane; the progress evaluator never reads it.

use regex::Regex;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunRequest {
    pub code: String,
    #[serde(default)]
    pub lesson_id: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunResult {
    pub output: String,
    pub has_error: bool,
    pub message: String,
}

/// The external collaborator boundary. A real implementation would hand the
/// code to a sandboxed interpreter.
pub trait CodeRunner {
    fn run(&self, request: &RunRequest) -> RunResult;
}

/// Echoes the arguments of literal `print(...)` calls, quotes stripped.
pub struct PrintSimulator;

impl CodeRunner for PrintSimulator {
    fn run(&self, request: &RunRequest) -> RunResult {
        let output = if request.code.contains("print(") {
            let re = Regex::new(r"print\(([^)]*)\)").unwrap();
            re.captures_iter(&request.code)
                .map(|c| c[1].replace('\'', "").replace('"', ""))
                .collect::<Vec<String>>()
                .join("\n")
        } else {
            "Code executed successfully!".to_string()
        };
        RunResult {
            output,
            has_error: false,
            message: "Code executed successfully!".to_string(),
        }
    }
}
