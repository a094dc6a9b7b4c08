use std::cmp::Reverse;

use chrono::{DateTime, Utc};
use log::debug;

use crate::db::Database;
use crate::error::PollsError;
use crate::models::{Choice, Question, QuestionSummary};

// A visible question with its choices, as shown on the detail and results pages
#[derive(Debug, Clone)]
pub struct PollView {
    pub question: Question,
    pub choices: Vec<Choice>,
}

/// Visible questions, newest first, at most `limit` of them.
/// Questions sharing a publish date are ordered by descending id.
pub fn latest(summaries: Vec<QuestionSummary>, now: DateTime<Utc>, limit: usize) -> Vec<Question> {
    let mut visible: Vec<Question> = summaries
        .into_iter()
        .filter(|summary| summary.is_visible(now))
        .map(|summary| summary.question)
        .collect();

    visible.sort_by_key(|question| Reverse((question.pub_date, question.id)));
    visible.truncate(limit);
    visible
}

pub async fn latest_questions(
    database: &Database,
    now: DateTime<Utc>,
    limit: usize,
) -> Result<Vec<Question>, PollsError> {
    let summaries = database.get_question_summaries().await?;
    let total = summaries.len();
    let questions = latest(summaries, now, limit);
    debug!("{} of {} question(s) listed", questions.len(), total);
    Ok(questions)
}

/// Looks up a question for the detail and results pages. Unknown ids,
/// questions dated in the future and questions without choices all come
/// back as `NotFound`.
pub async fn visible_poll(
    database: &Database,
    question_id: i64,
    now: DateTime<Utc>,
) -> Result<PollView, PollsError> {
    let question = database
        .get_question(question_id)
        .await?
        .ok_or(PollsError::NotFound)?;

    let choices = database.get_choices(question_id).await?;
    if !question.is_visible(choices.len() as i64, now) {
        debug!("Question {} exists but is not visible", question_id);
        return Err(PollsError::NotFound);
    }

    Ok(PollView { question, choices })
}
