//! Selection protocol tests
//!
//! End-to-end round trips over a disk-loaded bundle and a scripted
//! statistics backend:
//! - a rule click transitions, exchanges, and renders in one settled step
//! - a second click on the selected row toggles off without an exchange
//! - overlapping exchanges resolve in favor of the latest issued request
//! - failed exchanges surface as errors and keep the previous rendering
//! - edited paths resolve concept references before they reach the wire

use std::collections::VecDeque;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use errlens::backend::{
    BackendError, BackendResult, ConceptStat, Hint, InspectRuleRequest, InspectRuleResponse,
    OrderedMap, PathNode, StatGroup, StatRow, StatisticsBackend, UpdateConceptRequest,
};
use errlens::coordinator::Selection;
use errlens::dataset::DatasetBundle;
use errlens::rules::{Condition, MiningFilter, RuleFlavor, Sign};
use errlens::session::{Session, SessionError};

// =============================================================================
// Fixtures
// =============================================================================

struct ScriptedBackend {
    responses: Mutex<VecDeque<BackendResult<InspectRuleResponse>>>,
    seen: std::sync::Mutex<Vec<InspectRuleRequest>>,
}

impl ScriptedBackend {
    fn new(responses: Vec<BackendResult<InspectRuleResponse>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            seen: std::sync::Mutex::new(Vec::new()),
        }
    }

    /// Inspect requests that reached the backend, in arrival order.
    fn seen(&self) -> Vec<InspectRuleRequest> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl StatisticsBackend for ScriptedBackend {
    async fn inspect_rule(
        &self,
        request: &InspectRuleRequest,
    ) -> BackendResult<InspectRuleResponse> {
        self.seen.lock().unwrap().push(request.clone());
        self.responses
            .lock()
            .await
            .pop_front()
            .unwrap_or_else(|| Err(BackendError::status("inspect_rule/", 500)))
    }

    async fn update_concept(&self, _request: &UpdateConceptRequest) -> BackendResult<ConceptStat> {
        Ok(ConceptStat {
            err_rate: 0.52,
            ci: (0.40, 0.64),
            support: 9,
        })
    }
}

fn write(dir: &Path, name: &str, content: &str) {
    fs::write(dir.join(name), content).unwrap();
}

/// Six sentiment documents, three misclassified, with three token rules
/// and one high-level rule mined over them.
fn write_bundle(dir: &Path) {
    write(
        dir,
        "descriptor.json",
        r#"{
            "name": "twitter",
            "doc_kind": "sentiment",
            "model_name": "twitter-roberta-base-sentiment",
            "accuracy": 0.72,
            "labels": ["negative", "neutral", "positive"]
        }"#,
    );
    write(
        dir,
        "doc.jsonl",
        "{\"text\": \"loved every minute of it\", \"label\": 2}\n\
         {\"text\": \"only got worse after lunch\", \"label\": 0}\n\
         {\"text\": \"never again with this airline\", \"label\": 0}\n\
         {\"text\": \"it was fine I guess\", \"label\": 1}\n\
         {\"text\": \"the only good part was leaving\", \"label\": 0}\n\
         {\"text\": \"never been happier\", \"label\": 2}\n",
    );
    write(
        dir,
        "model_output.csv",
        "y_gt,y_pred\n2,2\n0,1\n0,0\n1,1\n0,2\n2,0\n",
    );
    write(
        dir,
        "projection.csv",
        "x,y\n0.0,0.0\n1.0,-1.0\n2.0,-2.0\n3.0,-3.0\n4.0,-4.0\n5.0,-5.0\n",
    );
    write(
        dir,
        "model_stat.json",
        r#"{
            "by_label": {
                "0": {"label": 0, "is_error": 2, "tot": 3},
                "1": {"label": 1, "is_error": 0, "tot": 1},
                "2": {"label": 2, "is_error": 1, "tot": 2}
            },
            "by_pred": {
                "0": {"pred": 0, "is_error": 1, "tot": 2},
                "1": {"pred": 1, "is_error": 1, "tot": 2},
                "2": {"pred": 2, "is_error": 1, "tot": 2}
            }
        }"#,
    );

    fs::create_dir(dir.join("rule")).unwrap();
    write(
        dir,
        "rule/list.json",
        r#"{
            "rule_lists": [
                {"rules": [{"feature": 0, "sign": ">"}],
                 "doc_idx": [1, 4], "err_rate": 0.55, "err_rate_test": 0.5,
                 "p_one": 0.04, "ci": [0.4, 0.7]},
                {"rules": [{"feature": 1, "sign": ">"}],
                 "doc_idx": [2, 5], "err_rate": 0.8, "err_rate_test": 0.75,
                 "p_one": 0.01, "ci": [0.62, 0.91]},
                {"rules": [{"feature": 0, "sign": ">"}, {"feature": 2, "sign": ">"}],
                 "doc_idx": [4], "err_rate": 0.6, "err_rate_test": 0.55,
                 "p_one": 0.02, "ci": [0.45, 0.75]}
            ],
            "target_names": ["negative", "neutral", "positive"],
            "histogram": [0, 2, 1]
        }"#,
    );
    write(dir, "rule/test.json", r#"{"good_cols": ["only", "never", "leaving"]}"#);

    fs::create_dir(dir.join("hfeat")).unwrap();
    write(
        dir,
        "hfeat/list.json",
        r#"{
            "rule_lists": [
                {"rules": [{"feature": 0, "sign": "=", "val": 2}],
                 "doc_idx": [0, 3], "err_rate": 0.5, "p_one": 0.05}
            ]
        }"#,
    );
    write(dir, "hfeat/test.json", r#"{"columns": ["ADJ", "overlap"]}"#);
}

fn bundle() -> Arc<DatasetBundle> {
    let dir = tempfile::tempdir().unwrap();
    write_bundle(dir.path());
    let filter = MiningFilter {
        min_support: 1,
        max_conditions: 3,
    };
    Arc::new(DatasetBundle::load(dir.path(), &filter).unwrap())
}

fn session(responses: Vec<BackendResult<InspectRuleResponse>>) -> (Session, Arc<ScriptedBackend>) {
    let backend = Arc::new(ScriptedBackend::new(responses));
    (Session::new(bundle(), backend.clone()), backend)
}

fn group(column: &str, cells: &[(i64, u64, u64)]) -> StatGroup {
    cells
        .iter()
        .map(|&(bucket, errors, total)| {
            StatRow::new(
                Some((column.to_string(), serde_json::json!(bucket))),
                errors,
                total,
            )
        })
        .collect::<Vec<_>>()
        .into()
}

fn response(doc_list: Vec<u32>) -> InspectRuleResponse {
    let mut stat = OrderedMap::new();
    stat.insert("by_label", group("label", &[(0, 2, 2), (2, 1, 1)]));
    InspectRuleResponse {
        doc_list,
        path_info: PathNode {
            condition: Condition::contains("only"),
            size: 2,
            error_rate: 0.55,
            children: Vec::new(),
        },
        hint: vec![Hint {
            feature: "worse".to_string(),
            sign: Sign::Contains,
            threshold: 0.5,
            err_rate: 0.62,
        }],
        top_token_list: Vec::new(),
        stat,
        train_stat: None,
    }
}

// =============================================================================
// Rule selection round trips
// =============================================================================

/// One click flows end to end; every dependent view renders the same
/// response, and the wire request carries the clicked rule's conditions
/// plus the breakdown keys of the loaded dataset.
#[tokio::test]
async fn test_rule_click_renders_all_views_from_one_response() {
    let (session, backend) = session(vec![Ok(response(vec![1, 4]))]);

    let outcome = session.select_rule(0).await.unwrap();

    assert_eq!(outcome.selection, Selection::Rule(0));
    assert_eq!(outcome.seq, Some(1));
    assert!(outcome.applied);

    let coordinator = session.coordinator().lock().await;
    // Rules rank by error rate, so rule 0 (0.55) sits below 0.8 and 0.6.
    assert_eq!(coordinator.documents().context(), Some("Rule 3"));
    assert_eq!(coordinator.documents().doc_count(), 2);
    assert_eq!(coordinator.documents().error_count(), 2);
    assert!(coordinator.statistics().has_selection());
    assert!(coordinator.projection().is_highlighting());
    assert_eq!(coordinator.explorer().pending_labels(), vec!["contain: only"]);
    assert_eq!(coordinator.explorer().path_rows().len(), 1);
    assert_eq!(coordinator.explorer().hints().len(), 1);

    let seen = backend.seen();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].rules, vec![Condition::contains("only")]);
    assert_eq!(seen[0].data_name, "twitter");
    assert_eq!(seen[0].key_list, vec!["label", "pred"]);
    assert_eq!(seen[0].error_only, 0);
}

/// A second click on the selected row returns to idle without touching
/// the backend, and every view drops back to its resting state.
#[tokio::test]
async fn test_second_click_toggles_off_without_an_exchange() {
    let (session, backend) = session(vec![Ok(response(vec![1, 4]))]);

    session.select_rule(0).await.unwrap();
    let outcome = session.select_rule(0).await.unwrap();

    assert!(outcome.selection.is_idle());
    assert_eq!(outcome.seq, None);
    assert!(!outcome.applied);
    assert_eq!(backend.seen().len(), 1);

    let coordinator = session.coordinator().lock().await;
    assert_eq!(coordinator.documents().doc_count(), 0);
    assert!(!coordinator.statistics().has_selection());
    assert!(!coordinator.projection().is_highlighting());
    assert!(coordinator.explorer().pending().is_empty());
    assert_eq!(coordinator.rule_list().selected(), None);
}

// =============================================================================
// Ordering under overlapping exchanges
// =============================================================================

/// When a second selection is issued before the first response lands,
/// the late first response is discarded and the second one renders.
#[tokio::test]
async fn test_latest_of_two_overlapping_selections_wins() {
    let (session, _) = session(Vec::new());
    let mut coordinator = session.coordinator().lock().await;

    let first = coordinator.click_rule(1).unwrap().unwrap();
    let second = coordinator.click_rule(2).unwrap().unwrap();
    assert_eq!((first.seq(), second.seq()), (1, 2));

    assert!(!coordinator.apply_response(first.seq(), response(vec![2, 5])));
    assert_eq!(coordinator.documents().doc_count(), 0);

    assert!(coordinator.apply_response(second.seq(), response(vec![4])));
    assert_eq!(coordinator.documents().doc_list(), &[4]);
    assert_eq!(coordinator.documents().context(), Some("Rule 2"));
    assert_eq!(coordinator.counters().stale_discards(), 1);
    assert_eq!(coordinator.counters().responses_applied(), 1);
}

/// A response that lands after the analyst unselected is dropped; the
/// views stay idle.
#[tokio::test]
async fn test_response_after_unselect_is_dropped() {
    let (session, _) = session(Vec::new());
    let mut coordinator = session.coordinator().lock().await;

    let pending = coordinator.click_rule(0).unwrap().unwrap();
    coordinator.unselect();

    assert!(!coordinator.apply_response(pending.seq(), response(vec![1, 4])));
    assert!(coordinator.selection().is_idle());
    assert_eq!(coordinator.documents().doc_count(), 0);
    assert_eq!(coordinator.counters().stale_discards(), 1);
}

/// A failed exchange surfaces as an error while the previously applied
/// rendering stays on screen.
#[tokio::test]
async fn test_backend_failure_keeps_the_previous_rendering() {
    let (session, _) = session(vec![
        Ok(response(vec![2, 5])),
        Err(BackendError::status("inspect_rule/", 502)),
    ]);

    session.select_rule(1).await.unwrap();
    let result = session.select_rule(0).await;

    assert!(matches!(result, Err(SessionError::Backend(_))));
    let coordinator = session.coordinator().lock().await;
    assert_eq!(coordinator.selection(), Selection::Rule(0));
    assert_eq!(coordinator.documents().context(), Some("Rule 1"));
    assert_eq!(coordinator.documents().doc_count(), 2);
    assert_eq!(coordinator.counters().backend_failures(), 1);
}

// =============================================================================
// Edited rules and concepts
// =============================================================================

/// Submitting an edited path sends the concept's member list and the
/// normalized token over the wire, never the raw reference.
#[tokio::test]
async fn test_edited_path_resolves_concepts_on_the_wire() {
    let (session, backend) = session(vec![Ok(response(vec![4]))]);

    let id = session.create_concept().await;
    session.update_concept(id, "great, fantastic").await.unwrap();
    session.add_concept_condition(id).await.unwrap();
    session.add_token_condition("bad weather").await;

    let outcome = session.submit_explorer().await.unwrap();

    assert_eq!(outcome.selection, Selection::Edited);
    assert!(outcome.applied);

    let seen = backend.seen();
    assert_eq!(seen.len(), 1);
    assert_eq!(
        seen[0].rules[0].members(),
        Some(["great".to_string(), "fantastic".to_string()].as_slice())
    );
    assert_eq!(seen[0].rules[1], Condition::contains("bad_weather"));

    let coordinator = session.coordinator().lock().await;
    assert_eq!(coordinator.documents().context(), Some("Edited rule"));
    assert_eq!(coordinator.rule_list().selected(), None);
}

/// A concept deleted while still referenced fails resolution at submit;
/// nothing reaches the backend and the pending path stays editable.
#[tokio::test]
async fn test_dangling_concept_reference_fails_at_submit() {
    let (session, backend) = session(Vec::new());

    let id = session.create_concept().await;
    session.add_concept_condition(id).await.unwrap();
    session.remove_concept(id).await.unwrap();

    let result = session.submit_explorer().await;

    assert!(matches!(result, Err(SessionError::Resolution(_))));
    assert!(backend.seen().is_empty());
    let coordinator = session.coordinator().lock().await;
    assert_eq!(coordinator.explorer().pending().len(), 1);
    assert!(coordinator.selection().is_idle());
}

/// Concept scoring lands on the panel row; removing the concept drops
/// the row and its marker.
#[tokio::test]
async fn test_concept_scoring_marks_the_panel_row() {
    let (session, _) = session(Vec::new());

    let id = session.create_concept().await;
    let stat = session.update_concept(id, "great, fantastic").await.unwrap();
    assert_eq!(stat.support, 9);

    {
        let coordinator = session.coordinator().lock().await;
        let rows = coordinator.concept_panel().rows(coordinator.registry());
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].members_text(), "great, fantastic");
        assert!(rows[0].summary().is_some());
    }

    session.remove_concept(id).await.unwrap();
    let coordinator = session.coordinator().lock().await;
    assert!(coordinator.concept_panel().rows(coordinator.registry()).is_empty());
}

// =============================================================================
// Flavor and sequence bookkeeping
// =============================================================================

/// Switching artifact flavor swaps the listing for the other mined set
/// and resets the selection.
#[tokio::test]
async fn test_flavor_switch_swaps_rows_and_resets() {
    let (session, _) = session(vec![Ok(response(vec![1, 4]))]);

    session.select_rule(0).await.unwrap();
    session.set_flavor(RuleFlavor::HighLevel).await;

    let coordinator = session.coordinator().lock().await;
    assert!(coordinator.selection().is_idle());
    assert_eq!(coordinator.flavor(), RuleFlavor::HighLevel);
    assert_eq!(coordinator.rule_list().rows().len(), 1);
    assert_eq!(coordinator.documents().doc_count(), 0);
}

/// Sequence numbers grow across every issued exchange, whatever the
/// trigger.
#[tokio::test]
async fn test_sequence_numbers_grow_across_triggers() {
    let (session, _) = session(vec![
        Ok(response(vec![1, 4])),
        Ok(response(vec![2, 5])),
        Ok(response(vec![4])),
    ]);

    let first = session.select_rule(0).await.unwrap();
    let second = session.select_rule(1).await.unwrap();

    session.add_token_condition("worse").await;
    let third = session.submit_explorer().await.unwrap();

    assert_eq!(first.seq, Some(1));
    assert_eq!(second.seq, Some(2));
    assert_eq!(third.seq, Some(3));
    assert!(third.applied);
    assert_eq!(third.selection, Selection::Edited);
}
