use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Question {
    pub id: i64,
    pub question_text: String,
    pub pub_date: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Choice {
    pub id: i64,
    pub question_id: i64,
    pub choice_text: String,
    pub votes: i64,
}

// A question as listed on the index, with the number of choices it owns
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionSummary {
    pub question: Question,
    pub choice_count: i64,
}

impl Question {
    /// True when `pub_date` falls within the last day, `now` included.
    /// A question dated in the future is never recent.
    pub fn was_published_recently(&self, now: DateTime<Utc>) -> bool {
        now - Duration::days(1) <= self.pub_date && self.pub_date <= now
    }

    /// Published and holding at least one choice. Only visible questions are
    /// ever shown on the index, detail or results pages.
    pub fn is_visible(&self, choice_count: i64, now: DateTime<Utc>) -> bool {
        self.pub_date <= now && choice_count >= 1
    }
}

impl QuestionSummary {
    pub fn is_visible(&self, now: DateTime<Utc>) -> bool {
        self.question.is_visible(self.choice_count, now)
    }
}
