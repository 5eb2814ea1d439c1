//! Pure view state for the polling loops.
//!
//! Polls replace local data wholesale. The only state that survives
//! a poll is the question selection, which stays put while its
//! question still exists. Anything a poll cannot know yet rides in a
//! pending overlay that the next successful poll discards.

use crate::cloud::{self, WordEntry};
use crate::types::{Question, QuestionId, Response};

/// Choose the question to look at after new data arrived: keep the
/// current selection while it exists, otherwise the active question,
/// otherwise the first one, otherwise none.
pub fn reconcile_selection(previous: Option<&str>, questions: &[Question]) -> Option<QuestionId> {
    if let Some(prev) = previous {
        if questions.iter().any(|q| q.id == prev) {
            return Some(prev.to_string());
        }
    }
    if let Some(active) = questions.iter().find(|q| q.is_active) {
        return Some(active.id.clone());
    }
    questions.first().map(|q| q.id.clone())
}

#[derive(Debug, Clone, PartialEq)]
struct PendingResponse {
    question_id: QuestionId,
    response: Response,
}

/// What a participant sees: the polled questions, the sticky
/// selection, and an overlay of own submissions confirmed since the
/// last poll.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AudienceViewState {
    questions: Vec<Question>,
    selected: Option<QuestionId>,
    pending: Vec<PendingResponse>,
}

impl AudienceViewState {
    /// Fold a fresh poll in: replace the questions, re-derive the
    /// selection, drop the overlay wholesale.
    pub fn apply_poll(&mut self, questions: Vec<Question>) {
        self.questions = questions;
        self.selected = reconcile_selection(self.selected.as_deref(), &self.questions);
        self.pending.clear();
    }

    /// Switch to another question. Unknown ids are refused.
    pub fn select(&mut self, question_id: &str) -> bool {
        if self.questions.iter().any(|q| q.id == question_id) {
            self.selected = Some(question_id.to_string());
            true
        } else {
            false
        }
    }

    /// Record a confirmed submission so it shows up before the next
    /// poll delivers it.
    pub fn record_submission(&mut self, question_id: &str, response: Response) {
        self.pending.push(PendingResponse {
            question_id: question_id.to_string(),
            response,
        });
    }

    pub fn selected_id(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn selected_question(&self) -> Option<Question> {
        let id = self.selected.clone()?;
        self.question(&id)
    }

    /// A question with the overlay merged in. Pending responses the
    /// poll already delivered are not repeated.
    pub fn question(&self, question_id: &str) -> Option<Question> {
        let mut question = self.questions.iter().find(|q| q.id == question_id)?.clone();
        for pending in &self.pending {
            if pending.question_id == question.id
                && !question
                    .responses
                    .iter()
                    .any(|r| r.id == pending.response.id)
            {
                question.responses.push(pending.response.clone());
            }
        }
        Some(question)
    }

    /// The participant's own responses to the selected question, in
    /// submission order.
    pub fn my_responses(&self, participant_id: &str) -> Vec<Response> {
        let Some(question) = self.selected_question() else {
            return Vec::new();
        };
        let mut mine: Vec<Response> = question
            .responses
            .into_iter()
            .filter(|r| r.participant_id.as_deref() == Some(participant_id))
            .collect();
        mine.sort_by_key(|r| r.created_at);
        mine
    }
}

/// What the host sees: the active question with its responses, and
/// the flat list of every response for the moderation panel.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AdminViewState {
    pub active_question: Option<Question>,
    pub responses: Vec<Response>,
}

impl AdminViewState {
    pub fn apply_active_poll(&mut self, question: Option<Question>) {
        self.active_question = question;
    }

    pub fn apply_responses_poll(&mut self, responses: Vec<Response>) {
        self.responses = responses;
    }

    /// Locally flip a moderation flag ahead of the next poll.
    pub fn set_hidden_local(&mut self, response_id: &str, hidden: bool) {
        if let Some(r) = self.responses.iter_mut().find(|r| r.id == response_id) {
            r.is_moderated = hidden;
        }
        if let Some(question) = &mut self.active_question {
            if let Some(r) = question
                .responses
                .iter_mut()
                .find(|r| r.id == response_id)
            {
                r.is_moderated = hidden;
            }
        }
    }

    /// Ranked phrases over the active question's responses.
    pub fn word_cloud(&self) -> Vec<WordEntry> {
        match &self.active_question {
            Some(question) => cloud::word_cloud(&question.responses),
            None => Vec::new(),
        }
    }
}
