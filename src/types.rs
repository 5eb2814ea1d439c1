use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ulid::Ulid;

/// Opaque ID types for type safety
pub type EventId = String;
pub type QuestionId = String;
pub type ResponseId = String;
pub type ParticipantId = String;

/// Upper bound on question text length after trimming.
pub const MAX_QUESTION_CHARS: usize = 500;
/// Upper bound on response text length after trimming.
pub const MAX_RESPONSE_CHARS: usize = 280;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Participant,
}

/// One short answer to a question. Anonymous apart from the
/// self-assigned participant id, which participants use to
/// recognize their own entries in the shared list.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Response {
    pub id: ResponseId,
    pub text: String,
    pub created_at: DateTime<Utc>,
    pub is_from_admin: bool,
    /// Hidden from aggregated displays when true. The raw entry stays
    /// visible in moderation views so the flip can be undone.
    pub is_moderated: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub participant_id: Option<ParticipantId>,
}

impl Response {
    pub fn new(
        text: impl Into<String>,
        is_from_admin: bool,
        participant_id: Option<ParticipantId>,
    ) -> Self {
        Self {
            id: Ulid::new().to_string(),
            text: text.into(),
            created_at: Utc::now(),
            is_from_admin,
            is_moderated: false,
            participant_id,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub id: QuestionId,
    pub text: String,
    pub created_at: DateTime<Utc>,
    pub is_active: bool,
    pub responses: Vec<Response>,
}

impl Question {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            id: Ulid::new().to_string(),
            text: text.into(),
            created_at: Utc::now(),
            is_active: false,
            responses: Vec::new(),
        }
    }
}

/// The whole state of one live session: questions in posting order,
/// each carrying its responses. Loaded and stored as a unit, so every
/// mutation below works on an exclusive copy.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: EventId,
    pub name: String,
    /// Short numeric code participants type in to join.
    pub access_code: String,
    pub created_at: DateTime<Utc>,
    pub questions: Vec<Question>,
    /// Host credential, shown once at creation time.
    pub admin_key: String,
    /// Second host credential, shown once at creation time.
    pub admin_pin: String,
}

impl Event {
    pub fn new(
        name: impl Into<String>,
        access_code: impl Into<String>,
        admin_key: impl Into<String>,
        admin_pin: impl Into<String>,
    ) -> Self {
        Self {
            id: Ulid::new().to_string(),
            name: name.into(),
            access_code: access_code.into(),
            created_at: Utc::now(),
            questions: Vec::new(),
            admin_key: admin_key.into(),
            admin_pin: admin_pin.into(),
        }
    }

    pub fn question(&self, question_id: &str) -> Option<&Question> {
        self.questions.iter().find(|q| q.id == question_id)
    }

    pub fn question_mut(&mut self, question_id: &str) -> Option<&mut Question> {
        self.questions.iter_mut().find(|q| q.id == question_id)
    }

    pub fn active_question(&self) -> Option<&Question> {
        self.questions.iter().find(|q| q.is_active)
    }

    /// Append a new question and make it the single active one.
    /// Returns a snapshot of the stored question.
    pub fn add_question(&mut self, text: impl Into<String>) -> Question {
        for q in &mut self.questions {
            q.is_active = false;
        }
        let mut question = Question::new(text);
        question.is_active = true;
        let snapshot = question.clone();
        self.questions.push(question);
        snapshot
    }

    /// Make the given question the single active one. Returns `None`
    /// if the id does not belong to this event, leaving activation
    /// state untouched.
    pub fn activate_question(&mut self, question_id: &str) -> Option<Question> {
        if !self.questions.iter().any(|q| q.id == question_id) {
            return None;
        }
        for q in &mut self.questions {
            q.is_active = q.id == question_id;
        }
        self.question(question_id).cloned()
    }

    /// Append a response to the given question. Submissions are
    /// accepted for inactive questions too; participants may browse
    /// back to an earlier question and answer it.
    pub fn submit_response(&mut self, question_id: &str, response: Response) -> Option<Response> {
        let question = self.question_mut(question_id)?;
        let snapshot = response.clone();
        question.responses.push(response);
        Some(snapshot)
    }

    /// Flip the moderation flag on a response, wherever it lives.
    /// Returns `false` if no question holds the id.
    pub fn moderate_response(&mut self, response_id: &str, hidden: bool) -> bool {
        for q in &mut self.questions {
            if let Some(r) = q.responses.iter_mut().find(|r| r.id == response_id) {
                r.is_moderated = hidden;
                return true;
            }
        }
        false
    }

    /// Drop every response of the given question. Activation state is
    /// not touched; a cleared question stays active.
    pub fn clear_responses(&mut self, question_id: &str) -> Option<Question> {
        let question = self.question_mut(question_id)?;
        question.responses.clear();
        Some(question.clone())
    }

    /// All responses across all questions, in question posting order
    /// and submission order within each question.
    pub fn all_responses(&self) -> Vec<Response> {
        self.questions
            .iter()
            .flat_map(|q| q.responses.iter().cloned())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event() -> Event {
        Event::new("Town Hall", "12345", "k".repeat(20), "123456")
    }

    #[test]
    fn add_question_activates_it_and_deactivates_rest() {
        let mut event = event();
        let first = event.add_question("What went well?").id.clone();
        assert!(event.question(&first).unwrap().is_active);

        let second = event.add_question("What should change?").id.clone();
        assert!(!event.question(&first).unwrap().is_active);
        assert!(event.question(&second).unwrap().is_active);
        assert_eq!(event.active_question().unwrap().id, second);
    }

    #[test]
    fn activate_switches_exclusively() {
        let mut event = event();
        let first = event.add_question("one").id.clone();
        event.add_question("two");

        let activated = event.activate_question(&first).unwrap();
        assert_eq!(activated.id, first);
        assert_eq!(event.questions.iter().filter(|q| q.is_active).count(), 1);
        assert!(event.question(&first).unwrap().is_active);
    }

    #[test]
    fn activate_unknown_question_changes_nothing() {
        let mut event = event();
        let first = event.add_question("one").id.clone();
        assert!(event.activate_question("nope").is_none());
        assert!(event.question(&first).unwrap().is_active);
    }

    #[test]
    fn submit_accepts_inactive_questions() {
        let mut event = event();
        let first = event.add_question("one").id.clone();
        event.add_question("two");

        let stored = event
            .submit_response(&first, Response::new("still relevant", false, None))
            .unwrap();
        assert_eq!(stored.text, "still relevant");
        assert_eq!(event.question(&first).unwrap().responses.len(), 1);
    }

    #[test]
    fn moderate_finds_responses_in_any_question() {
        let mut event = event();
        let first = event.add_question("one").id.clone();
        event
            .submit_response(&first, Response::new("rude", false, None))
            .unwrap();
        let target = event.question(&first).unwrap().responses[0].id.clone();
        event.add_question("two");

        assert!(event.moderate_response(&target, true));
        assert!(event.question(&first).unwrap().responses[0].is_moderated);

        assert!(event.moderate_response(&target, false));
        assert!(!event.question(&first).unwrap().responses[0].is_moderated);

        assert!(!event.moderate_response("missing", true));
    }

    #[test]
    fn moderate_is_idempotent() {
        let mut event = event();
        let first = event.add_question("one").id.clone();
        event
            .submit_response(&first, Response::new("rude", false, None))
            .unwrap();
        let target = event.question(&first).unwrap().responses[0].id.clone();

        assert!(event.moderate_response(&target, true));
        let once = serde_json::to_value(&event).unwrap();
        assert!(event.moderate_response(&target, true));
        assert_eq!(serde_json::to_value(&event).unwrap(), once);
    }

    #[test]
    fn clear_empties_only_the_target_question() {
        let mut event = event();
        let first = event.add_question("one").id.clone();
        event.submit_response(&first, Response::new("a", false, None));
        let second = event.add_question("two").id.clone();
        event.submit_response(&second, Response::new("b", false, None));

        let cleared = event.clear_responses(&second).unwrap();
        assert!(cleared.responses.is_empty());
        assert!(cleared.is_active);
        assert_eq!(event.question(&first).unwrap().responses.len(), 1);
    }

    #[test]
    fn clear_is_idempotent() {
        let mut event = event();
        let qid = event.add_question("one").id.clone();
        event.submit_response(&qid, Response::new("a", false, None));

        let cleared = event.clear_responses(&qid).unwrap();
        let once = serde_json::to_value(&event).unwrap();

        let again = event.clear_responses(&qid).unwrap();
        assert_eq!(again, cleared);
        assert_eq!(serde_json::to_value(&event).unwrap(), once);
    }

    #[test]
    fn all_responses_flattens_in_posting_order() {
        let mut event = event();
        let first = event.add_question("one").id.clone();
        event.submit_response(&first, Response::new("a", false, None));
        let second = event.add_question("two").id.clone();
        event.submit_response(&second, Response::new("b", false, None));
        event.submit_response(&first, Response::new("c", false, None));

        let texts: Vec<_> = event.all_responses().into_iter().map(|r| r.text).collect();
        assert_eq!(texts, vec!["a", "c", "b"]);
    }

    #[test]
    fn wire_format_uses_camel_case_and_hides_empty_participant() {
        let mut event = event();
        let qid = event.add_question("one").id.clone();
        event.submit_response(&qid, Response::new("hi", true, None));

        let json = serde_json::to_value(&event).unwrap();
        assert!(json.get("accessCode").is_some());
        assert!(json.get("createdAt").is_some());
        let response = &json["questions"][0]["responses"][0];
        assert_eq!(response["isFromAdmin"], true);
        assert_eq!(response["isModerated"], false);
        assert!(response.get("participantId").is_none());
    }
}
