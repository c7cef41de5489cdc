//! Cross-view coordinator
//!
//! Owns the seven render models, the concept registry, and the
//! selection state machine. View events (rule clicks, explorer submits)
//! land on the per-view buses; the coordinator subscribes and queues
//! them as intents, then drains the queue after every action so one
//! analyst click settles completely before the next is handled.
//!
//! A selection that needs backend statistics does not block: the
//! transition yields a [`PendingInspect`] carrying a sequence number and
//! the fully resolved wire request. The session host performs the
//! exchange and feeds the outcome back through [`apply_response`] or
//! [`apply_failure`]; responses whose sequence is no longer the latest
//! issued are discarded, so the most recently issued request always wins
//! the rendering.
//!
//! [`apply_response`]: Coordinator::apply_response
//! [`apply_failure`]: Coordinator::apply_failure

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use crate::backend::{
    BackendError, ConceptStat, InspectRuleRequest, InspectRuleResponse, UpdateConceptRequest,
};
use crate::concepts::{ConceptError, ConceptId, ConceptRegistry};
use crate::dataset::DatasetBundle;
use crate::observability::{log_event, log_event_with_fields, Event, ProtocolCounters};
use crate::rules::{Condition, RuleFlavor, RuleId};
use crate::views::{
    ConceptPanel, DocumentView, ExplorerEvent, ExplorerView, OverviewPanel, ProjectionView,
    RuleListEvent, RuleListView, StatisticsView,
};

use super::errors::{CoordinatorError, CoordinatorResult};
use super::selection::Selection;

/// A queued view event awaiting coordination.
#[derive(Debug, Clone)]
enum Intent {
    Select(RuleId),
    Unselect,
    Inspect(Vec<Condition>),
}

/// Context kept for the latest issued inspect request, consumed when
/// its response is applied.
#[derive(Debug, Clone)]
struct InspectContext {
    conditions: Vec<Condition>,
    context: String,
}

/// An inspect request handed to the session host for the backend
/// exchange. `seq` tags the eventual response for the stale check.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingInspect {
    seq: u64,
    request: InspectRuleRequest,
    context: String,
}

impl PendingInspect {
    pub fn seq(&self) -> u64 {
        self.seq
    }

    pub fn request(&self) -> &InspectRuleRequest {
        &self.request
    }

    /// Label the views will carry ("Rule 3", "Edited rule").
    pub fn context(&self) -> &str {
        &self.context
    }
}

/// An update-concept request handed to the session host, scoring one
/// concept's member list for the panel's error-rate marker.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingConceptUpdate {
    id: ConceptId,
    request: UpdateConceptRequest,
}

impl PendingConceptUpdate {
    pub fn id(&self) -> ConceptId {
        self.id
    }

    pub fn request(&self) -> &UpdateConceptRequest {
        &self.request
    }
}

/// The session-wide coordinator.
pub struct Coordinator {
    bundle: Arc<DatasetBundle>,
    data_name: String,
    flavor: RuleFlavor,
    selection: Selection,
    latest_seq: u64,
    inflight: Option<InspectContext>,
    registry: ConceptRegistry,
    counters: Arc<ProtocolCounters>,
    intents: Arc<Mutex<VecDeque<Intent>>>,
    rule_list: RuleListView,
    explorer: ExplorerView,
    documents: DocumentView,
    statistics: StatisticsView,
    projection: ProjectionView,
    overview: OverviewPanel,
    concept_panel: ConceptPanel,
}

impl Coordinator {
    /// Builds the coordinator over a loaded bundle, starting on the
    /// token-binary rule flavor with nothing selected.
    pub fn new(bundle: Arc<DatasetBundle>, counters: Arc<ProtocolCounters>) -> Self {
        let descriptor = Arc::new(bundle.descriptor().clone());
        let flavor = RuleFlavor::TokenBinary;

        let rule_list = RuleListView::new(
            Arc::clone(bundle.rule_set(flavor)),
            Arc::clone(&descriptor),
            flavor,
        );
        let explorer = ExplorerView::new(Arc::clone(&descriptor));
        let documents = DocumentView::new(Arc::clone(&bundle));
        let statistics = StatisticsView::new(Arc::clone(&bundle));
        let projection = ProjectionView::new(Arc::clone(&bundle));
        let overview = OverviewPanel::new(Arc::clone(&bundle));
        let concept_panel = ConceptPanel::new(descriptor.base_error_rate());

        let intents: Arc<Mutex<VecDeque<Intent>>> = Arc::new(Mutex::new(VecDeque::new()));

        let queue = Arc::clone(&intents);
        rule_list.bus().subscribe("rule_selected", move |event| {
            if let RuleListEvent::Selected(id) = event {
                if let Ok(mut intents) = queue.lock() {
                    intents.push_back(Intent::Select(*id));
                }
            }
        });

        let queue = Arc::clone(&intents);
        rule_list.bus().subscribe("rule_unselected", move |event| {
            if let RuleListEvent::Unselected = event {
                if let Ok(mut intents) = queue.lock() {
                    intents.push_back(Intent::Unselect);
                }
            }
        });

        let queue = Arc::clone(&intents);
        explorer.bus().subscribe("rule_inspect", move |event| {
            let ExplorerEvent::Inspect(conditions) = event;
            if let Ok(mut intents) = queue.lock() {
                intents.push_back(Intent::Inspect(conditions.clone()));
            }
        });

        let data_name = bundle.descriptor().name.clone();
        Self {
            bundle,
            data_name,
            flavor,
            selection: Selection::Idle,
            latest_seq: 0,
            inflight: None,
            registry: ConceptRegistry::new(),
            counters,
            intents,
            rule_list,
            explorer,
            documents,
            statistics,
            projection,
            overview,
            concept_panel,
        }
    }

    // Rule list actions

    /// Handles a click on a rule row: select it, or toggle the current
    /// selection off. Selecting yields the inspect request to send.
    pub fn click_rule(&mut self, id: RuleId) -> CoordinatorResult<Option<PendingInspect>> {
        if self.rule_list.rules().get(id).is_none() {
            return Err(CoordinatorError::UnknownRule(id));
        }
        self.rule_list.click(id);
        self.drain_intents()
    }

    /// Explicit unselect: any state returns to idle.
    pub fn unselect(&mut self) {
        if self.selection.is_idle() {
            return;
        }
        self.return_to_idle();
        log_event(Event::RuleUnselected);
    }

    /// Replaces the rule list with the other mined flavor. The
    /// selection does not carry across artifacts, so the views reset.
    pub fn set_flavor(&mut self, flavor: RuleFlavor) {
        if flavor == self.flavor {
            return;
        }
        self.flavor = flavor;
        self.rule_list
            .replace_rules(Arc::clone(self.bundle.rule_set(flavor)), flavor);
        self.return_to_idle();
        log_event_with_fields(Event::FlavorSwitched, &[("flavor", flavor.dir_name())]);
    }

    // Explorer actions

    pub fn add_token_condition(&mut self, text: &str) {
        self.explorer.add_token(text);
    }

    pub fn add_feature_condition(&mut self, feature: &str, value: &str) {
        self.explorer.add_feature(feature, value);
    }

    /// Appends a concept membership condition. The concept must be
    /// live; a deleted id fails here rather than at submit.
    pub fn add_concept_condition(&mut self, id: ConceptId) -> CoordinatorResult<()> {
        if self.registry.get(id).is_none() {
            return Err(ConceptError::UnknownConcept(id).into());
        }
        self.explorer.add_concept(id);
        Ok(())
    }

    pub fn remove_condition(&mut self, index: usize) {
        self.explorer.remove(index);
    }

    pub fn reset_explorer(&mut self) {
        self.explorer.reset();
    }

    /// Submits the pending condition path as an edited rule. Concept
    /// resolution failures abort the submission and leave the pending
    /// path in place for correction.
    pub fn submit_explorer(&mut self) -> CoordinatorResult<Option<PendingInspect>> {
        self.explorer.submit();
        self.drain_intents()
    }

    // Backend exchange outcomes

    /// Applies an inspect response. All four dependent views update in
    /// this one call, so a reader never observes a half-applied
    /// response. Returns false when the response was discarded as
    /// stale.
    pub fn apply_response(&mut self, seq: u64, response: InspectRuleResponse) -> bool {
        if seq != self.latest_seq {
            self.discard_stale(seq);
            return false;
        }
        let Some(InspectContext {
            conditions,
            context,
        }) = self.inflight.take()
        else {
            // Latest sequence but nothing awaited: the selection was
            // cleared while the request was in flight.
            self.discard_stale(seq);
            return false;
        };

        let doc_count = response.doc_list.len();
        self.explorer
            .show_inspection(conditions.clone(), response.path_info, response.hint);
        self.documents.show(
            response.doc_list.clone(),
            &conditions,
            response.top_token_list,
            context.clone(),
        );
        self.statistics
            .show(response.stat, response.train_stat, context.clone());
        self.projection.highlight(response.doc_list, context);

        self.counters.increment_responses_applied();
        log_event_with_fields(
            Event::InspectApplied,
            &[
                ("doc_count", doc_count.to_string().as_str()),
                ("seq", seq.to_string().as_str()),
            ],
        );
        true
    }

    /// Records a failed inspect exchange. The views keep their prior
    /// state; the analyst re-triggers manually.
    pub fn apply_failure(&mut self, seq: u64, error: &BackendError) {
        if seq == self.latest_seq {
            self.inflight = None;
        }
        self.counters.increment_backend_failures();
        log_event_with_fields(
            Event::BackendFailure,
            &[
                ("error", error.to_string().as_str()),
                ("seq", seq.to_string().as_str()),
            ],
        );
    }

    // Concept registry actions

    pub fn create_concept(&mut self) -> ConceptId {
        let id = self.registry.create();
        log_event_with_fields(Event::ConceptCreated, &[("concept_id", id.to_string().as_str())]);
        id
    }

    /// Overwrites a concept's member list and yields the update-concept
    /// request that refreshes its error-rate marker.
    pub fn set_concept_members(
        &mut self,
        id: ConceptId,
        raw: &str,
    ) -> CoordinatorResult<PendingConceptUpdate> {
        self.registry.set_members(id, raw)?;
        let members = self
            .registry
            .get(id)
            .ok_or(ConceptError::UnknownConcept(id))?
            .members()
            .to_vec();
        log_event_with_fields(
            Event::ConceptUpdated,
            &[
                ("concept_id", id.to_string().as_str()),
                ("member_count", members.len().to_string().as_str()),
            ],
        );
        self.counters.increment_requests_issued();
        Ok(PendingConceptUpdate {
            id,
            request: UpdateConceptRequest {
                concept: members,
                data_name: self.data_name.clone(),
            },
        })
    }

    pub fn remove_concept(&mut self, id: ConceptId) -> CoordinatorResult<()> {
        self.registry.remove(id)?;
        self.concept_panel.drop_summary(id);
        log_event_with_fields(Event::ConceptRemoved, &[("concept_id", id.to_string().as_str())]);
        Ok(())
    }

    /// Applies the scored statistics of an update-concept exchange to
    /// the panel marker.
    pub fn apply_concept_stat(&mut self, id: ConceptId, stat: ConceptStat) {
        self.concept_panel.set_summary(id, stat);
        self.counters.increment_responses_applied();
    }

    /// Records a failed update-concept exchange; the previous marker
    /// (if any) stays.
    pub fn apply_concept_failure(&mut self, id: ConceptId, error: &BackendError) {
        self.counters.increment_backend_failures();
        log_event_with_fields(
            Event::BackendFailure,
            &[
                ("concept_id", id.to_string().as_str()),
                ("error", error.to_string().as_str()),
            ],
        );
    }

    // State access

    pub fn bundle(&self) -> &Arc<DatasetBundle> {
        &self.bundle
    }

    pub fn data_name(&self) -> &str {
        &self.data_name
    }

    pub fn flavor(&self) -> RuleFlavor {
        self.flavor
    }

    pub fn selection(&self) -> Selection {
        self.selection
    }

    pub fn latest_seq(&self) -> u64 {
        self.latest_seq
    }

    pub fn counters(&self) -> &Arc<ProtocolCounters> {
        &self.counters
    }

    pub fn registry(&self) -> &ConceptRegistry {
        &self.registry
    }

    pub fn rule_list(&self) -> &RuleListView {
        &self.rule_list
    }

    /// Mutable handle for the list's order, filter, and significance
    /// parameters. Selection changes go through [`click_rule`].
    ///
    /// [`click_rule`]: Coordinator::click_rule
    pub fn rule_list_mut(&mut self) -> &mut RuleListView {
        &mut self.rule_list
    }

    pub fn explorer(&self) -> &ExplorerView {
        &self.explorer
    }

    pub fn documents(&self) -> &DocumentView {
        &self.documents
    }

    /// Mutable handle for the document view's label switch.
    pub fn documents_mut(&mut self) -> &mut DocumentView {
        &mut self.documents
    }

    pub fn statistics(&self) -> &StatisticsView {
        &self.statistics
    }

    pub fn projection(&self) -> &ProjectionView {
        &self.projection
    }

    pub fn overview(&self) -> &OverviewPanel {
        &self.overview
    }

    pub fn concept_panel(&self) -> &ConceptPanel {
        &self.concept_panel
    }

    // Internals

    /// Drains queued view events. At most one inspect request survives
    /// the drain; a later intent supersedes an earlier one.
    fn drain_intents(&mut self) -> CoordinatorResult<Option<PendingInspect>> {
        let mut pending = None;
        loop {
            let intent = match self.intents.lock() {
                Ok(mut intents) => intents.pop_front(),
                Err(_) => None,
            };
            let Some(intent) = intent else {
                break;
            };
            match intent {
                Intent::Select(id) => pending = Some(self.issue_rule_inspect(id)?),
                Intent::Unselect => {
                    self.return_to_idle();
                    log_event(Event::RuleUnselected);
                    pending = None;
                }
                Intent::Inspect(conditions) => {
                    pending = Some(self.issue_edited_inspect(conditions)?)
                }
            }
        }
        Ok(pending)
    }

    fn issue_rule_inspect(&mut self, id: RuleId) -> CoordinatorResult<PendingInspect> {
        let conditions = {
            let rule = self
                .rule_list
                .rules()
                .get(id)
                .ok_or(CoordinatorError::UnknownRule(id))?;
            self.registry.resolve_all(rule.conditions())?
        };
        let position = self.rule_list.display_rank(id).unwrap_or(id + 1);
        self.selection = Selection::Rule(id);
        log_event_with_fields(Event::RuleSelected, &[("rule_id", id.to_string().as_str())]);
        Ok(self.issue_inspect(conditions, format!("Rule {}", position)))
    }

    fn issue_edited_inspect(
        &mut self,
        conditions: Vec<Condition>,
    ) -> CoordinatorResult<PendingInspect> {
        let resolved = self.registry.resolve_all(&conditions)?;
        self.selection = Selection::Edited;
        // An edited path is never a row of the loaded list.
        self.rule_list.clear_selection();
        Ok(self.issue_inspect(resolved, "Edited rule".to_string()))
    }

    fn issue_inspect(&mut self, conditions: Vec<Condition>, context: String) -> PendingInspect {
        self.latest_seq += 1;
        let seq = self.latest_seq;
        let request = InspectRuleRequest::new(
            conditions.clone(),
            self.data_name.clone(),
            self.statistics.key_list(),
        );
        self.inflight = Some(InspectContext {
            conditions,
            context: context.clone(),
        });
        self.counters.increment_requests_issued();
        log_event_with_fields(
            Event::InspectIssued,
            &[
                ("context", context.as_str()),
                ("seq", seq.to_string().as_str()),
            ],
        );
        PendingInspect {
            seq,
            request,
            context,
        }
    }

    fn return_to_idle(&mut self) {
        self.selection = Selection::Idle;
        self.inflight = None;
        self.rule_list.clear_selection();
        self.explorer.clear();
        self.documents.clear();
        self.statistics.clear();
        self.projection.reset();
    }

    fn discard_stale(&self, seq: u64) {
        self.counters.increment_stale_discards();
        log_event_with_fields(
            Event::StaleResponseDiscarded,
            &[
                ("latest_seq", self.latest_seq.to_string().as_str()),
                ("stale_seq", seq.to_string().as_str()),
            ],
        );
    }
}
