//! HTML pages for the three poll routes, rendered with tera.
//! Templates are compiled into the binary; tera autoescapes every `.html`
//! template, so question and choice text is always escaped.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tera::{Context, Tera};

use crate::error::PollsError;
use crate::models::Question;
use crate::polls::PollView;

const TEMPLATES: [(&str, &str); 4] = [
    ("polls/base.html", include_str!("../../templates/polls/base.html")),
    ("polls/index.html", include_str!("../../templates/polls/index.html")),
    ("polls/detail.html", include_str!("../../templates/polls/detail.html")),
    ("polls/results.html", include_str!("../../templates/polls/results.html")),
];

// One row of the index list
#[derive(Serialize)]
struct IndexEntry<'a> {
    question: &'a Question,
    recent: bool,
}

pub struct Templates {
    tera: Tera,
}

impl Templates {
    pub fn new() -> Result<Self, PollsError> {
        let mut tera = Tera::default();
        tera.add_raw_templates(TEMPLATES)?;
        Ok(Self { tera })
    }

    /// Questions published within the last day are flagged as new.
    pub fn index_page(&self, questions: &[Question], now: DateTime<Utc>) -> Result<String, PollsError> {
        let entries: Vec<IndexEntry> = questions
            .iter()
            .map(|question| IndexEntry {
                question,
                recent: question.was_published_recently(now),
            })
            .collect();

        let mut context = Context::new();
        context.insert("latest_question_list", &entries);
        Ok(self.tera.render("polls/index.html", &context)?)
    }

    pub fn detail_page(&self, poll: &PollView) -> Result<String, PollsError> {
        self.render_poll("polls/detail.html", poll)
    }

    pub fn results_page(&self, poll: &PollView) -> Result<String, PollsError> {
        self.render_poll("polls/results.html", poll)
    }

    fn render_poll(&self, template: &str, poll: &PollView) -> Result<String, PollsError> {
        let mut context = Context::new();
        context.insert("question", &poll.question);
        context.insert("choices", &poll.choices);
        Ok(self.tera.render(template, &context)?)
    }
}
