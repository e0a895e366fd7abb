//! Sequential rule evaluation with per-rule fault isolation.
//!
//! A failing rule never aborts the run: both returned errors and panics are
//! turned into a warning verdict carrying the fault text, so the result always
//! holds exactly one verdict per rule, in declaration order.
use crate::rules::RuleDefinition;
use crate::schema::{Finding, RunResult, Verdict};
use crate::snapshot::ProjectSnapshot;
use std::panic::{self, AssertUnwindSafe};

const FAULT_PREFIX: &str = "检查过程中出现错误";

pub fn run(snapshot: &ProjectSnapshot, rules: &[RuleDefinition]) -> RunResult {
    tracing::debug!(root = %snapshot.root().display(), rules = rules.len(), "running checks");
    let verdicts = rules
        .iter()
        .map(|rule| {
            let finding = evaluate_isolated(snapshot, rule);
            let verdict = Verdict::from_finding(rule.phase, rule.id, finding);
            tracing::debug!(rule = %rule.id, status = %verdict.status, "rule evaluated");
            verdict
        })
        .collect();
    RunResult { verdicts }
}

fn evaluate_isolated(snapshot: &ProjectSnapshot, rule: &RuleDefinition) -> Finding {
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| (rule.evaluate)(snapshot)));
    let fault = match outcome {
        Ok(Ok(finding)) => return finding,
        Ok(Err(err)) => err.to_string(),
        Err(payload) => panic_message(&*payload),
    };
    tracing::warn!(rule = %rule.id, error = %fault, "rule failed; reporting as warning");
    fault_finding(&fault)
}

pub(crate) fn fault_finding(fault: &str) -> Finding {
    Finding::bare_warning(format!("{FAULT_PREFIX}: {fault}"))
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(text) = payload.downcast_ref::<&str>() {
        return (*text).to_string();
    }
    if let Some(text) = payload.downcast_ref::<String>() {
        return text.clone();
    }
    "rule panicked".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::RULES;
    use crate::schema::{Phase, RuleId, Status};
    use crate::snapshot::{SnapshotError, SnapshotResult};

    fn always_fails(_: &ProjectSnapshot) -> SnapshotResult<Finding> {
        Err(SnapshotError::NotFound {
            path: "index.html".to_string(),
        })
    }

    fn always_panics(_: &ProjectSnapshot) -> SnapshotResult<Finding> {
        panic!("detector bug")
    }

    fn always_passes(_: &ProjectSnapshot) -> SnapshotResult<Finding> {
        Ok(Finding::passed("fine"))
    }

    #[test]
    fn faults_degrade_to_warnings_without_aborting() {
        let rules = [
            RuleDefinition {
                phase: Phase::DnsResolution,
                id: RuleId::DnsPrefetch,
                evaluate: always_fails,
            },
            RuleDefinition {
                phase: Phase::HttpRequest,
                id: RuleId::SmallFileMerge,
                evaluate: always_panics,
            },
            RuleDefinition {
                phase: Phase::BuildTooling,
                id: RuleId::BuildToolConfiguration,
                evaluate: always_passes,
            },
        ];
        let dir = tempfile::tempdir().expect("tempdir");
        let result = run(&ProjectSnapshot::new(dir.path()), &rules);

        assert_eq!(result.len(), 3);
        let first = &result.verdicts[0];
        assert_eq!(first.status, Status::Warning);
        assert!(first.message.starts_with("检查过程中出现错误: "));
        assert!(first.message.contains("index.html"));
        assert_eq!(first.recommendation, None);
        assert_eq!(first.doc_path.as_deref(), Some("optimizations/dns-prefetch"));

        let second = &result.verdicts[1];
        assert_eq!(second.status, Status::Warning);
        assert!(second.message.contains("detector bug"));
        assert_eq!(second.id, RuleId::SmallFileMerge);

        assert_eq!(result.verdicts[2].status, Status::Passed);
    }

    #[test]
    fn full_registry_on_empty_project_yields_one_verdict_per_rule() {
        let dir = tempfile::tempdir().expect("tempdir");
        let result = run(&ProjectSnapshot::new(dir.path()), RULES);
        assert_eq!(result.len(), RULES.len());
        for (verdict, rule) in result.iter().zip(RULES) {
            assert_eq!(verdict.id, rule.id);
            assert_eq!(verdict.phase, rule.phase);
        }
    }

    #[test]
    fn missing_root_still_yields_complete_result() {
        let dir = tempfile::tempdir().expect("tempdir");
        let gone = dir.path().join("does-not-exist");
        let result = run(&ProjectSnapshot::new(gone), RULES);
        assert_eq!(result.len(), RULES.len());
    }
}
