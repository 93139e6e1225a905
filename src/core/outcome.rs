//! 运行结果：成功（报告 + 保存路径）或已分类的失败（类别 + 指引文本）

use std::path::PathBuf;

use serde_json::{json, Value};

use crate::core::ErrorKind;

#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    Success { report: String, report_path: PathBuf },
    Failure { error_type: ErrorKind, error: String },
}

impl RunOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, RunOutcome::Success { .. })
    }

    /// `{success: true, report, report_path}` 或 `{success: false, error_type, error}`
    pub fn to_json(&self) -> Value {
        match self {
            RunOutcome::Success {
                report,
                report_path,
            } => json!({
                "success": true,
                "report": report,
                "report_path": report_path.display().to_string(),
            }),
            RunOutcome::Failure { error_type, error } => json!({
                "success": false,
                "error_type": error_type,
                "error": error,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_json() {
        let outcome = RunOutcome::Success {
            report: "# R".into(),
            report_path: PathBuf::from("kb/a.md"),
        };
        assert!(outcome.is_success());
        assert_eq!(
            outcome.to_json(),
            json!({"success": true, "report": "# R", "report_path": "kb/a.md"})
        );
    }

    #[test]
    fn test_failure_json() {
        let outcome = RunOutcome::Failure {
            error_type: ErrorKind::CredentialError,
            error: "fix it".into(),
        };
        assert!(!outcome.is_success());
        let v = outcome.to_json();
        assert_eq!(v["success"], false);
        assert_eq!(v["error_type"], "credential_error");
        assert!(v.get("report").is_none());
    }
}
