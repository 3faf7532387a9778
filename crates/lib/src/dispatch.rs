//! Turn dispatch: query the knowledge and intent backends for the utterance,
//! pick exactly one response path by a fixed precedence chain, and produce the
//! reply text.
//!
//! A usable knowledge-base answer wins over intent branches regardless of
//! intent confidence. Backend failures propagate untouched; a failed turn
//! produces no reply.

use crate::clients::{
    IntentBackend, IntentError, IntentResult, KnowledgeBackend, KnowledgeError, KnowledgeResult,
    SchedulerBackend, SchedulerError,
};

/// Answer text the knowledge base returns when it has no real match.
pub const NO_ANSWER_SENTINEL: &str = "No answer found";

/// Reply used when no branch matches.
pub const FALLBACK_TEXT: &str = "Could you say that differently? I had trouble understanding it.";

const AVAILABILITY_INTENT: &str = "GetAvailability";
const SCHEDULE_INTENT: &str = "ScheduleAppointment";
const TIME_ENTITY: &str = "time";

// Both thresholds are strict greater-than.
const AVAILABILITY_MIN_SCORE: f64 = 0.85;
const SCHEDULE_MIN_SCORE: f64 = 0.6;

#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error(transparent)]
    Knowledge(#[from] KnowledgeError),
    #[error(transparent)]
    Intent(#[from] IntentError),
    #[error(transparent)]
    Scheduler(#[from] SchedulerError),
}

/// The single response path selected for a turn.
#[derive(Debug, Clone, PartialEq)]
pub enum DispatchDecision {
    AnswerFromKnowledgeBase(String),
    ReportAvailability,
    /// Carries the first extracted time span's text.
    ScheduleAppointment(String),
    Fallback,
}

type Rule = fn(&KnowledgeResult, &IntentResult) -> Option<DispatchDecision>;

/// Precedence chain; the first matching rule wins.
const RULES: &[Rule] = &[knowledge_answer, report_availability, schedule_appointment];

/// Derive the response path for one turn. Deterministic, recomputed per message.
pub fn decide(knowledge: &KnowledgeResult, intent: &IntentResult) -> DispatchDecision {
    RULES
        .iter()
        .find_map(|rule| rule(knowledge, intent))
        .unwrap_or(DispatchDecision::Fallback)
}

fn knowledge_answer(knowledge: &KnowledgeResult, _intent: &IntentResult) -> Option<DispatchDecision> {
    let best = knowledge.best()?;
    if best.answer == NO_ANSWER_SENTINEL {
        return None;
    }
    Some(DispatchDecision::AnswerFromKnowledgeBase(best.answer.clone()))
}

fn report_availability(_knowledge: &KnowledgeResult, intent: &IntentResult) -> Option<DispatchDecision> {
    if intent.top_intent == AVAILABILITY_INTENT
        && intent.score(AVAILABILITY_INTENT) > AVAILABILITY_MIN_SCORE
    {
        Some(DispatchDecision::ReportAvailability)
    } else {
        None
    }
}

fn schedule_appointment(_knowledge: &KnowledgeResult, intent: &IntentResult) -> Option<DispatchDecision> {
    if intent.top_intent != SCHEDULE_INTENT || intent.score(SCHEDULE_INTENT) <= SCHEDULE_MIN_SCORE {
        return None;
    }
    intent
        .first_entity(TIME_ENTITY)
        .map(|span| DispatchDecision::ScheduleAppointment(span.text.clone()))
}

/// Routes one inbound utterance to exactly one downstream service.
pub struct Dispatcher<K, I, S> {
    knowledge: K,
    intent: I,
    scheduler: S,
}

impl<K, I, S> Dispatcher<K, I, S>
where
    K: KnowledgeBackend,
    I: IntentBackend,
    S: SchedulerBackend,
{
    pub fn new(knowledge: K, intent: I, scheduler: S) -> Self {
        Self {
            knowledge,
            intent,
            scheduler,
        }
    }

    /// Run one turn: query knowledge and intent concurrently, decide, and call
    /// the scheduler only when a scheduling branch was selected. The first
    /// backend failure aborts the turn.
    pub async fn handle_message(&self, utterance: &str) -> Result<String, DispatchError> {
        let (knowledge, intent) = tokio::try_join!(
            async { self.knowledge.query(utterance).await.map_err(DispatchError::from) },
            async { self.intent.classify(utterance).await.map_err(DispatchError::from) },
        )?;

        let decision = decide(&knowledge, &intent);
        log::debug!("dispatch: selected {:?}", decision);

        let reply = match decision {
            DispatchDecision::AnswerFromKnowledgeBase(answer) => answer,
            DispatchDecision::ReportAvailability => self.scheduler.get_availability().await?,
            DispatchDecision::ScheduleAppointment(time) => {
                self.scheduler.schedule_appointment(&time).await?
            }
            DispatchDecision::Fallback => FALLBACK_TEXT.to_string(),
        };
        Ok(reply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::{EntitySpan, KnowledgeAnswer};
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn answers(texts: &[&str]) -> KnowledgeResult {
        KnowledgeResult {
            answers: texts
                .iter()
                .map(|t| KnowledgeAnswer {
                    answer: t.to_string(),
                    confidence_score: None,
                    source: None,
                })
                .collect(),
        }
    }

    fn intent(top: &str, score: f64, times: &[&str]) -> IntentResult {
        let mut entities = HashMap::new();
        if !times.is_empty() {
            entities.insert(
                "time".to_string(),
                times
                    .iter()
                    .map(|t| EntitySpan {
                        text: t.to_string(),
                    })
                    .collect(),
            );
        }
        IntentResult {
            top_intent: top.to_string(),
            scores: HashMap::from([(top.to_string(), score)]),
            entities,
        }
    }

    #[test]
    fn knowledge_answer_wins_over_any_intent() {
        let decision = decide(
            &answers(&["We are open 9-5."]),
            &intent("GetAvailability", 0.99, &[]),
        );
        assert_eq!(
            decision,
            DispatchDecision::AnswerFromKnowledgeBase("We are open 9-5.".to_string())
        );
    }

    #[test]
    fn sentinel_answer_falls_through_to_intents() {
        let decision = decide(
            &answers(&[NO_ANSWER_SENTINEL]),
            &intent("GetAvailability", 0.9, &[]),
        );
        assert_eq!(decision, DispatchDecision::ReportAvailability);
    }

    #[test]
    fn availability_score_must_exceed_threshold() {
        let exactly = decide(&answers(&[]), &intent("GetAvailability", 0.85, &[]));
        assert_eq!(exactly, DispatchDecision::Fallback);

        let above = decide(&answers(&[]), &intent("GetAvailability", 0.86, &[]));
        assert_eq!(above, DispatchDecision::ReportAvailability);
    }

    #[test]
    fn schedule_score_must_exceed_threshold() {
        let exactly = decide(
            &answers(&[]),
            &intent("ScheduleAppointment", 0.6, &["3pm Friday"]),
        );
        assert_eq!(exactly, DispatchDecision::Fallback);

        let above = decide(
            &answers(&[]),
            &intent("ScheduleAppointment", 0.61, &["3pm Friday"]),
        );
        assert_eq!(
            above,
            DispatchDecision::ScheduleAppointment("3pm Friday".to_string())
        );
    }

    #[test]
    fn schedule_without_time_entity_falls_back() {
        let decision = decide(&answers(&[]), &intent("ScheduleAppointment", 0.9, &[]));
        assert_eq!(decision, DispatchDecision::Fallback);
    }

    // First-mention selection is intentional; a change here must be deliberate.
    #[test]
    fn first_time_occurrence_wins() {
        let decision = decide(
            &answers(&[]),
            &intent("ScheduleAppointment", 0.9, &["3pm Friday", "4pm Monday"]),
        );
        assert_eq!(
            decision,
            DispatchDecision::ScheduleAppointment("3pm Friday".to_string())
        );
    }

    #[test]
    fn nothing_matched_falls_back() {
        let decision = decide(&answers(&[]), &intent("None", 0.3, &[]));
        assert_eq!(decision, DispatchDecision::Fallback);
    }

    struct FakeKnowledge {
        result: Option<KnowledgeResult>,
    }

    #[async_trait]
    impl KnowledgeBackend for FakeKnowledge {
        async fn query(&self, _question: &str) -> Result<KnowledgeResult, KnowledgeError> {
            self.result
                .clone()
                .ok_or_else(|| KnowledgeError::Api("503 unavailable".to_string()))
        }
    }

    struct FakeIntent {
        result: IntentResult,
    }

    #[async_trait]
    impl IntentBackend for FakeIntent {
        async fn classify(&self, _utterance: &str) -> Result<IntentResult, IntentError> {
            Ok(self.result.clone())
        }
    }

    struct FakeScheduler {
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl SchedulerBackend for FakeScheduler {
        async fn get_availability(&self) -> Result<String, SchedulerError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok("We have openings Tuesday at 10am.".to_string())
        }

        async fn schedule_appointment(&self, time_text: &str) -> Result<String, SchedulerError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(format!("You are booked for {}.", time_text))
        }
    }

    fn dispatcher(
        knowledge: Option<KnowledgeResult>,
        intent: IntentResult,
    ) -> (
        Dispatcher<FakeKnowledge, FakeIntent, FakeScheduler>,
        Arc<AtomicUsize>,
    ) {
        let calls = Arc::new(AtomicUsize::new(0));
        let dispatcher = Dispatcher::new(
            FakeKnowledge { result: knowledge },
            FakeIntent { result: intent },
            FakeScheduler {
                calls: calls.clone(),
            },
        );
        (dispatcher, calls)
    }

    #[tokio::test]
    async fn hours_question_gets_knowledge_answer() {
        let (dispatcher, scheduler_calls) = dispatcher(
            Some(answers(&["We are open 9-5."])),
            intent("None", 0.1, &[]),
        );
        let reply = dispatcher
            .handle_message("What are your hours?")
            .await
            .expect("turn");
        assert_eq!(reply, "We are open 9-5.");
        assert_eq!(scheduler_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn availability_question_gets_scheduler_text() {
        let (dispatcher, _) = dispatcher(Some(answers(&[])), intent("GetAvailability", 0.9, &[]));
        let reply = dispatcher
            .handle_message("Any openings this week?")
            .await
            .expect("turn");
        assert_eq!(reply, "We have openings Tuesday at 10am.");
    }

    #[tokio::test]
    async fn booking_uses_extracted_time_text() {
        let (dispatcher, _) = dispatcher(
            Some(answers(&[NO_ANSWER_SENTINEL])),
            intent("ScheduleAppointment", 0.7, &["3pm Friday"]),
        );
        let reply = dispatcher
            .handle_message("Book me for 3pm Friday")
            .await
            .expect("turn");
        assert_eq!(reply, "You are booked for 3pm Friday.");
    }

    #[tokio::test]
    async fn gibberish_gets_fallback_text() {
        let (dispatcher, scheduler_calls) =
            dispatcher(Some(answers(&[])), intent("None", 0.2, &[]));
        let reply = dispatcher.handle_message("wibble wobble").await.expect("turn");
        assert_eq!(reply, FALLBACK_TEXT);
        assert_eq!(scheduler_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn backend_failure_aborts_the_turn() {
        let (dispatcher, scheduler_calls) = dispatcher(None, intent("GetAvailability", 0.99, &[]));
        let err = dispatcher
            .handle_message("Any openings?")
            .await
            .expect_err("knowledge failure propagates");
        assert!(matches!(err, DispatchError::Knowledge(_)));
        assert_eq!(scheduler_calls.load(Ordering::SeqCst), 0);
    }
}
