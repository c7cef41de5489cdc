//! Session host
//!
//! One session per served dataset: the coordinator and its views behind
//! an async mutex, plus the statistics backend used for inspect and
//! update-concept exchanges. Handlers lock to transition, release the
//! lock for the backend await, then re-lock to apply the outcome; the
//! coordinator's sequence check makes that interleaving safe.

use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::backend::{ConceptStat, StatisticsBackend};
use crate::concepts::ConceptId;
use crate::coordinator::{Coordinator, PendingInspect, Selection};
use crate::dataset::DatasetBundle;
use crate::observability::{
    log_event_with_fields, Event, ObservationScope, ProtocolCounters, Timer,
};
use crate::rules::{MiningFilter, RuleFlavor, RuleId};

use super::errors::{SessionError, SessionResult};

/// Outcome of an action that may have run an inspect exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InspectOutcome {
    /// Selection state after the action settled.
    pub selection: Selection,
    /// Sequence number of the issued request, when one was issued.
    pub seq: Option<u64>,
    /// Whether the response was applied (false on toggle-off and on a
    /// stale response).
    pub applied: bool,
}

/// A served dashboard session.
pub struct Session {
    id: Uuid,
    dataset: String,
    started_at: DateTime<Utc>,
    counters: Arc<ProtocolCounters>,
    coordinator: Arc<Mutex<Coordinator>>,
    backend: Arc<dyn StatisticsBackend + Send + Sync>,
}

impl Session {
    pub fn new(
        bundle: Arc<DatasetBundle>,
        backend: Arc<dyn StatisticsBackend + Send + Sync>,
    ) -> Self {
        let dataset = bundle.descriptor().name.clone();
        let counters = Arc::new(ProtocolCounters::new());
        let coordinator = Coordinator::new(bundle, Arc::clone(&counters));
        Self {
            id: Uuid::new_v4(),
            dataset,
            started_at: Utc::now(),
            counters,
            coordinator: Arc::new(Mutex::new(coordinator)),
            backend,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Name of the served dataset.
    pub fn dataset(&self) -> &str {
        &self.dataset
    }

    /// When the session was constructed.
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Counter handle readable without taking the session lock.
    pub fn counters(&self) -> &Arc<ProtocolCounters> {
        &self.counters
    }

    /// The locked coordinator; handlers take the lock to read render
    /// models.
    pub fn coordinator(&self) -> &Arc<Mutex<Coordinator>> {
        &self.coordinator
    }

    /// Handles a rule row click end to end: transition, exchange,
    /// apply.
    pub async fn select_rule(&self, id: RuleId) -> SessionResult<InspectOutcome> {
        let pending = {
            let mut coordinator = self.coordinator.lock().await;
            coordinator.click_rule(id)?
        };
        match pending {
            Some(pending) => self.run_inspect(pending).await,
            None => {
                let coordinator = self.coordinator.lock().await;
                Ok(InspectOutcome {
                    selection: coordinator.selection(),
                    seq: None,
                    applied: false,
                })
            }
        }
    }

    pub async fn unselect(&self) {
        self.coordinator.lock().await.unselect();
    }

    pub async fn set_flavor(&self, flavor: RuleFlavor) {
        self.coordinator.lock().await.set_flavor(flavor);
    }

    pub async fn add_token_condition(&self, text: &str) {
        self.coordinator.lock().await.add_token_condition(text);
    }

    pub async fn add_feature_condition(&self, feature: &str, value: &str) {
        self.coordinator
            .lock()
            .await
            .add_feature_condition(feature, value);
    }

    pub async fn add_concept_condition(&self, id: ConceptId) -> SessionResult<()> {
        self.coordinator.lock().await.add_concept_condition(id)?;
        Ok(())
    }

    pub async fn remove_condition(&self, index: usize) {
        self.coordinator.lock().await.remove_condition(index);
    }

    pub async fn reset_explorer(&self) {
        self.coordinator.lock().await.reset_explorer();
    }

    /// Submits the pending explorer path as an edited rule.
    pub async fn submit_explorer(&self) -> SessionResult<InspectOutcome> {
        let pending = {
            let mut coordinator = self.coordinator.lock().await;
            coordinator
                .submit_explorer()
                .map_err(SessionError::Resolution)?
        };
        match pending {
            Some(pending) => self.run_inspect(pending).await,
            None => {
                let coordinator = self.coordinator.lock().await;
                Ok(InspectOutcome {
                    selection: coordinator.selection(),
                    seq: None,
                    applied: false,
                })
            }
        }
    }

    pub async fn create_concept(&self) -> ConceptId {
        self.coordinator.lock().await.create_concept()
    }

    /// Rewrites a concept's members and refreshes its error-rate marker
    /// through the backend.
    pub async fn update_concept(&self, id: ConceptId, raw: &str) -> SessionResult<ConceptStat> {
        let pending = {
            let mut coordinator = self.coordinator.lock().await;
            coordinator.set_concept_members(id, raw)?
        };
        let result = self.backend.update_concept(pending.request()).await;
        let mut coordinator = self.coordinator.lock().await;
        match result {
            Ok(stat) => {
                coordinator.apply_concept_stat(id, stat.clone());
                Ok(stat)
            }
            Err(err) => {
                coordinator.apply_concept_failure(id, &err);
                Err(err.into())
            }
        }
    }

    pub async fn remove_concept(&self, id: ConceptId) -> SessionResult<()> {
        self.coordinator.lock().await.remove_concept(id)?;
        Ok(())
    }

    /// Runs one inspect exchange. The lock is dropped for the await and
    /// retaken to apply; a selection made meanwhile wins via the stale
    /// check.
    async fn run_inspect(&self, pending: PendingInspect) -> SessionResult<InspectOutcome> {
        let scope = ObservationScope::with_fields("INSPECT", &[("context", pending.context())]);
        let result = self.backend.inspect_rule(pending.request()).await;
        let mut coordinator = self.coordinator.lock().await;
        match result {
            Ok(response) => {
                let applied = coordinator.apply_response(pending.seq(), response);
                scope.complete_with_fields(&[("applied", if applied { "true" } else { "false" })]);
                Ok(InspectOutcome {
                    selection: coordinator.selection(),
                    seq: Some(pending.seq()),
                    applied,
                })
            }
            Err(err) => {
                coordinator.apply_failure(pending.seq(), &err);
                scope.fail(&err.to_string());
                Err(SessionError::Backend(err))
            }
        }
    }
}

/// Loads the dataset bundle a session serves, with begin/complete
/// tracing around the read.
pub fn load_bundle(
    data_dir: &Path,
    data_name: &str,
    filter: &MiningFilter,
) -> SessionResult<DatasetBundle> {
    let scope = ObservationScope::with_fields("DATASET_LOAD", &[("dataset", data_name)]);
    let timer = Timer::new();
    match DatasetBundle::load(data_dir.join(data_name), filter) {
        Ok(bundle) => {
            log_event_with_fields(
                Event::ArtifactsParsed,
                &[
                    (
                        "token_rules",
                        bundle.rule_set(RuleFlavor::TokenBinary).len().to_string().as_str(),
                    ),
                    (
                        "high_level_rules",
                        bundle.rule_set(RuleFlavor::HighLevel).len().to_string().as_str(),
                    ),
                ],
            );
            scope.complete_with_fields(&[
                ("documents", bundle.document_count().to_string().as_str()),
                ("errors", bundle.error_count().to_string().as_str()),
                ("elapsed_ms", timer.elapsed_ms().as_str()),
            ]);
            Ok(bundle)
        }
        Err(err) => {
            scope.fail(&err.to_string());
            Err(err.into())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;

    use async_trait::async_trait;

    use crate::backend::{
        BackendError, BackendResult, InspectRuleRequest, InspectRuleResponse, OrderedMap,
        PathNode, UpdateConceptRequest,
    };
    use crate::dataset::{DatasetDescriptor, Document, ModelOutput, ProjectionPoint};
    use crate::rules::{Condition, Rule, RuleSet};

    struct ScriptedBackend {
        responses: Mutex<VecDeque<BackendResult<InspectRuleResponse>>>,
        concept_stat: ConceptStat,
    }

    impl ScriptedBackend {
        fn new(responses: Vec<BackendResult<InspectRuleResponse>>) -> Self {
            Self {
                responses: Mutex::new(responses.into()),
                concept_stat: ConceptStat {
                    err_rate: 40.0,
                    ci: (30.0, 50.0),
                    support: 8,
                },
            }
        }
    }

    #[async_trait]
    impl StatisticsBackend for ScriptedBackend {
        async fn inspect_rule(
            &self,
            _request: &InspectRuleRequest,
        ) -> BackendResult<InspectRuleResponse> {
            self.responses
                .lock()
                .await
                .pop_front()
                .unwrap_or_else(|| Err(BackendError::status("inspect_rule/", 500)))
        }

        async fn update_concept(
            &self,
            _request: &UpdateConceptRequest,
        ) -> BackendResult<ConceptStat> {
            Ok(self.concept_stat.clone())
        }
    }

    fn session(responses: Vec<BackendResult<InspectRuleResponse>>) -> Session {
        Session::new(bundle(), Arc::new(ScriptedBackend::new(responses)))
    }

    fn bundle() -> Arc<DatasetBundle> {
        let descriptor = DatasetDescriptor::from_json(
            r#"{
                "name": "twitter",
                "doc_kind": "sentiment",
                "model_name": "twitter-roberta-base-sentiment",
                "accuracy": 0.7,
                "labels": ["negative", "neutral", "positive"]
            }"#,
        )
        .unwrap();
        let documents = vec![
            Document::from_value(serde_json::json!({"text": "the only good part", "label": 1})),
            Document::from_value(serde_json::json!({"text": "only got worse", "label": 0})),
        ];
        let outputs = vec![
            ModelOutput { truth: 1, prediction: 1 },
            ModelOutput { truth: 0, prediction: 2 },
        ];
        let projection = vec![
            ProjectionPoint { x: 0.0, y: 0.0 },
            ProjectionPoint { x: 1.0, y: 1.0 },
        ];
        let rules = RuleSet::new(
            vec![Rule::new(
                0,
                vec![Condition::contains("only")],
                0.55,
                0.50,
                (0.40, 0.70),
                0.03,
                vec![0, 1],
                1,
            )],
            vec!["negative".into(), "neutral".into(), "positive".into()],
            vec![0, 1],
            Vec::new(),
        );
        Arc::new(DatasetBundle::from_parts(
            descriptor,
            documents,
            outputs,
            projection,
            OrderedMap::new(),
            rules,
            RuleSet::default(),
        ))
    }

    fn response(doc_list: Vec<u32>) -> InspectRuleResponse {
        InspectRuleResponse {
            doc_list,
            path_info: PathNode {
                condition: Condition::contains("only"),
                size: 2,
                error_rate: 0.55,
                children: Vec::new(),
            },
            hint: Vec::new(),
            top_token_list: Vec::new(),
            stat: OrderedMap::new(),
            train_stat: None,
        }
    }

    #[tokio::test]
    async fn test_select_rule_round_trip() {
        let session = session(vec![Ok(response(vec![0, 1]))]);

        let outcome = session.select_rule(0).await.unwrap();

        assert_eq!(outcome.selection, Selection::Rule(0));
        assert_eq!(outcome.seq, Some(1));
        assert!(outcome.applied);

        let coordinator = session.coordinator().lock().await;
        assert_eq!(coordinator.documents().doc_count(), 2);
        assert_eq!(coordinator.documents().context(), Some("Rule 1"));
    }

    #[tokio::test]
    async fn test_toggle_off_skips_the_backend() {
        let session = session(vec![Ok(response(vec![0]))]);

        session.select_rule(0).await.unwrap();
        let outcome = session.select_rule(0).await.unwrap();

        assert!(outcome.selection.is_idle());
        assert_eq!(outcome.seq, None);
        assert!(!outcome.applied);

        let coordinator = session.coordinator().lock().await;
        assert_eq!(coordinator.documents().doc_count(), 0);
    }

    #[tokio::test]
    async fn test_backend_failure_surfaces_and_retains_state() {
        let session = session(vec![
            Ok(response(vec![0, 1])),
            Err(BackendError::status("inspect_rule/", 502)),
        ]);

        session.select_rule(0).await.unwrap();
        session.unselect().await;
        let result = session.select_rule(0).await;

        assert!(matches!(result, Err(SessionError::Backend(_))));
        assert_eq!(session.counters().backend_failures(), 1);

        let coordinator = session.coordinator().lock().await;
        assert_eq!(coordinator.selection(), Selection::Rule(0));
        assert_eq!(coordinator.documents().doc_count(), 0);
    }

    #[tokio::test]
    async fn test_update_concept_applies_marker() {
        let session = session(Vec::new());

        let id = session.create_concept().await;
        let stat = session.update_concept(id, "great, fantastic").await.unwrap();

        assert_eq!(stat.support, 8);
        let coordinator = session.coordinator().lock().await;
        let rows = coordinator.concept_panel().rows(coordinator.registry());
        assert!(rows[0].summary().is_some());
    }

    #[tokio::test]
    async fn test_submit_without_resolvable_concept_is_a_resolution_error() {
        let session = session(Vec::new());

        let id = session.create_concept().await;
        session.add_concept_condition(id).await.unwrap();
        session.remove_concept(id).await.unwrap();

        let result = session.submit_explorer().await;

        assert!(matches!(result, Err(SessionError::Resolution(_))));
        let coordinator = session.coordinator().lock().await;
        assert_eq!(coordinator.explorer().pending().len(), 1);
    }
}
