use std::sync::Arc;

use axum::{
    Router,
    extract::{Path, State},
    response::Html,
    routing::get,
};
use chrono::Utc;
use log::info;

use crate::db::Database;
use crate::error::PollsError;
use crate::polls;
use crate::views::Templates;

pub struct AppState {
    pub database: Database,
    pub templates: Templates,
    pub index_limit: usize,
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/polls/", get(index))
        .route("/polls/{question_id}/", get(detail))
        .route("/polls/{question_id}/results/", get(results))
        .fallback(not_found)
        .with_state(state)
}

pub async fn index(State(state): State<Arc<AppState>>) -> Result<Html<String>, PollsError> {
    info!("GET index");
    let now = Utc::now();
    let questions = polls::latest_questions(&state.database, now, state.index_limit).await?;
    Ok(Html(state.templates.index_page(&questions, now)?))
}

pub async fn detail(
    State(state): State<Arc<AppState>>,
    Path(question_id): Path<String>,
) -> Result<Html<String>, PollsError> {
    info!("GET detail for question {}", question_id);
    let poll = polls::visible_poll(&state.database, parse_question_id(&question_id)?, Utc::now()).await?;
    Ok(Html(state.templates.detail_page(&poll)?))
}

pub async fn results(
    State(state): State<Arc<AppState>>,
    Path(question_id): Path<String>,
) -> Result<Html<String>, PollsError> {
    info!("GET results for question {}", question_id);
    let poll = polls::visible_poll(&state.database, parse_question_id(&question_id)?, Utc::now()).await?;
    Ok(Html(state.templates.results_page(&poll)?))
}

async fn not_found() -> PollsError {
    PollsError::NotFound
}

// Ids that are not integers never name a question
fn parse_question_id(raw: &str) -> Result<i64, PollsError> {
    raw.parse().map_err(|_| PollsError::NotFound)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use chrono::Duration;

    use crate::models::Question;

    async fn test_state() -> Arc<AppState> {
        Arc::new(AppState {
            database: Database::in_memory().await.unwrap(),
            templates: Templates::new().unwrap(),
            index_limit: 5,
        })
    }

    /// Creates a question published `days` from now (negative for the past)
    /// with one choice per entry in `choices`.
    async fn create_question(state: &AppState, question_text: &str, days: i64, choices: &[&str]) -> Question {
        let pub_date = Utc::now() + Duration::days(days);
        let question = state.database.create_question(question_text, pub_date).await.unwrap();
        for choice in choices {
            state.database.create_choice(question.id, choice).await.unwrap();
        }
        question
    }

    async fn get(state: &Arc<AppState>, uri: &str) -> (StatusCode, String) {
        let server = TestServer::new(router(Arc::clone(state))).unwrap();
        let response = server.get(uri).await;
        (response.status_code(), response.text())
    }

    fn detail_path(question: &Question) -> String {
        format!("/polls/{}/", question.id)
    }

    fn results_path(question: &Question) -> String {
        format!("/polls/{}/results/", question.id)
    }

    async fn listed(state: &AppState) -> Vec<i64> {
        polls::latest_questions(&state.database, Utc::now(), state.index_limit)
            .await
            .unwrap()
            .iter()
            .map(|q| q.id)
            .collect()
    }

    #[tokio::test]
    async fn test_index_no_questions() {
        let state = test_state().await;
        let (status, body) = get(&state, "/polls/").await;

        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("No polls are available."));
        assert!(listed(&state).await.is_empty());
    }

    #[tokio::test]
    async fn test_index_past_question() {
        let state = test_state().await;
        let question = create_question(&state, "Past question.", -30, &["past choice"]).await;
        let (status, body) = get(&state, "/polls/").await;

        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("Past question."));
        assert_eq!(listed(&state).await, [question.id]);
    }

    #[tokio::test]
    async fn test_index_future_question() {
        let state = test_state().await;
        create_question(&state, "Future question.", 30, &["future choice"]).await;
        let (status, body) = get(&state, "/polls/").await;

        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("No polls are available."));
        assert!(!body.contains("Future question."));
        assert!(listed(&state).await.is_empty());
    }

    #[tokio::test]
    async fn test_index_future_question_and_past_question() {
        let state = test_state().await;
        let past = create_question(&state, "Past question.", -30, &["past choice"]).await;
        create_question(&state, "Future question.", 30, &["future choice"]).await;
        let (_, body) = get(&state, "/polls/").await;

        assert_eq!(state.database.question_count().await.unwrap(), 2);
        assert!(body.contains("Past question."));
        assert!(!body.contains("Future question."));
        assert_eq!(listed(&state).await, [past.id]);
    }

    #[tokio::test]
    async fn test_index_two_past_questions() {
        let state = test_state().await;
        let question1 = create_question(&state, "Past question 1.", -5, &["past choice 1"]).await;
        let question2 = create_question(&state, "Past question 2.", -30, &["past choice 2"]).await;
        let (_, body) = get(&state, "/polls/").await;

        assert_eq!(listed(&state).await, [question1.id, question2.id]);
        let first = body.find("Past question 1.").unwrap();
        let second = body.find("Past question 2.").unwrap();
        assert!(first < second);
    }

    #[tokio::test]
    async fn test_index_empty_question() {
        let state = test_state().await;
        create_question(&state, "No choices.", -5, &[]).await;
        let (_, body) = get(&state, "/polls/").await;

        assert!(body.contains("No polls are available."));
        assert!(listed(&state).await.is_empty());
    }

    #[tokio::test]
    async fn test_index_is_limited() {
        let state = test_state().await;
        for day in 1..=7 {
            create_question(&state, &format!("Question {day}."), -day, &["choice"]).await;
        }
        let (_, body) = get(&state, "/polls/").await;

        assert_eq!(listed(&state).await.len(), 5);
        assert!(body.contains("Question 5."));
        assert!(!body.contains("Question 6."));
    }

    #[tokio::test]
    async fn test_index_escapes_question_text() {
        let state = test_state().await;
        create_question(&state, "<script>alert(1)</script>", -1, &["choice"]).await;
        let (_, body) = get(&state, "/polls/").await;

        assert!(!body.contains("<script>"));
        assert!(body.contains("&lt;script&gt;alert(1)&lt;"));
    }

    #[tokio::test]
    async fn test_detail_future_question() {
        let state = test_state().await;
        let question = create_question(&state, "Future question.", 5, &["future choice"]).await;
        let (status, _) = get(&state, &detail_path(&question)).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_detail_past_question() {
        let state = test_state().await;
        let question = create_question(&state, "Past question.", -5, &["past choice"]).await;
        let (status, body) = get(&state, &detail_path(&question)).await;

        assert_eq!(status, StatusCode::OK);
        assert!(body.contains(&question.question_text));
        assert!(body.contains("past choice"));
    }

    #[tokio::test]
    async fn test_detail_empty_question() {
        let state = test_state().await;
        let question = create_question(&state, "No choices.", -5, &[]).await;
        let (status, _) = get(&state, &detail_path(&question)).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_detail_unknown_or_malformed_id() {
        let state = test_state().await;

        let (status, _) = get(&state, "/polls/404/").await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = get(&state, "/polls/abc/").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_results_future_question() {
        let state = test_state().await;
        let question = create_question(&state, "Future question.", 5, &["future choice"]).await;
        let (status, _) = get(&state, &results_path(&question)).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_results_past_question() {
        let state = test_state().await;
        let question = create_question(&state, "Past question.", -5, &["past choice", "other choice"]).await;
        let (status, body) = get(&state, &results_path(&question)).await;

        assert_eq!(status, StatusCode::OK);
        assert!(body.contains(&question.question_text));
        assert!(body.contains("past choice -- 0 votes"));
        assert!(body.contains("other choice -- 0 votes"));
    }

    #[tokio::test]
    async fn test_results_empty_question() {
        let state = test_state().await;
        let question = create_question(&state, "No choices.", -5, &[]).await;
        let (status, _) = get(&state, &results_path(&question)).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_unknown_route() {
        let state = test_state().await;
        let (status, _) = get(&state, "/admin/").await;

        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
