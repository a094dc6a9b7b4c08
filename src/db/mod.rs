use chrono::{DateTime, SecondsFormat, Utc};
use log::{debug, info};
use sqlx::{
    migrate::MigrateDatabase,
    sqlite::{SqlitePool, SqlitePoolOptions, SqliteRow},
    Row, Sqlite,
};

use crate::config::Config;
use crate::error::PollsError;
use crate::models::{Choice, Question, QuestionSummary};

pub struct Database {
    pool: SqlitePool,
}

impl Database {
    pub async fn new(config: &Config) -> Result<Self, PollsError> {
        let db_url = &config.database_url;

        // Create database if it doesn't exist
        if !Sqlite::database_exists(db_url).await.unwrap_or(false) {
            info!("Creating database at {}", db_url);
            Sqlite::create_database(db_url).await?;
        }

        let pool = SqlitePoolOptions::new()
            .max_connections(config.database_max_connections)
            .connect(db_url)
            .await?;

        Self::init_schema(&pool).await?;

        Ok(Self { pool })
    }

    /// A private in-memory database. The pool holds exactly one connection
    /// that is never recycled, since every new SQLite memory connection
    /// would start out empty.
    #[cfg(test)]
    pub async fn in_memory() -> Result<Self, PollsError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await?;

        Self::init_schema(&pool).await?;

        Ok(Self { pool })
    }

    async fn init_schema(pool: &SqlitePool) -> Result<(), PollsError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS questions (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                question_text TEXT NOT NULL,
                pub_date TEXT NOT NULL
            );
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS choices (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                question_id INTEGER NOT NULL,
                choice_text TEXT NOT NULL,
                votes INTEGER NOT NULL DEFAULT 0 CHECK (votes >= 0),
                FOREIGN KEY (question_id) REFERENCES questions(id) ON DELETE CASCADE
            );
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS choices_question_id ON choices (question_id);")
            .execute(pool)
            .await?;

        Ok(())
    }

    pub async fn create_question(
        &self,
        question_text: &str,
        pub_date: DateTime<Utc>,
    ) -> Result<Question, PollsError> {
        let result = sqlx::query(
            r#"
            INSERT INTO questions (question_text, pub_date)
            VALUES (?, ?)
            "#,
        )
        .bind(question_text)
        .bind(format_timestamp(pub_date))
        .execute(&self.pool)
        .await?;

        let id = result.last_insert_rowid();
        debug!("Created question {} published at {}", id, pub_date);

        Ok(Question {
            id,
            question_text: question_text.to_string(),
            pub_date,
        })
    }

    // Choices start with no votes
    pub async fn create_choice(&self, question_id: i64, choice_text: &str) -> Result<Choice, PollsError> {
        let result = sqlx::query(
            r#"
            INSERT INTO choices (question_id, choice_text)
            VALUES (?, ?)
            "#,
        )
        .bind(question_id)
        .bind(choice_text)
        .execute(&self.pool)
        .await?;

        Ok(Choice {
            id: result.last_insert_rowid(),
            question_id,
            choice_text: choice_text.to_string(),
            votes: 0,
        })
    }

    pub async fn question_count(&self) -> Result<i64, PollsError> {
        let row = sqlx::query("SELECT COUNT(*) AS count FROM questions")
            .fetch_one(&self.pool)
            .await?;

        Ok(row.try_get("count")?)
    }

    pub async fn get_question(&self, question_id: i64) -> Result<Option<Question>, PollsError> {
        let row = sqlx::query(
            r#"
            SELECT id, question_text, pub_date
            FROM questions
            WHERE id = ?
            "#,
        )
        .bind(question_id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(question_from_row).transpose()
    }

    // Choices of a question, in the order they were added
    pub async fn get_choices(&self, question_id: i64) -> Result<Vec<Choice>, PollsError> {
        let rows = sqlx::query(
            r#"
            SELECT id, question_id, choice_text, votes
            FROM choices
            WHERE question_id = ?
            ORDER BY id
            "#,
        )
        .bind(question_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| -> Result<Choice, PollsError> {
                Ok(Choice {
                    id: row.try_get("id")?,
                    question_id: row.try_get("question_id")?,
                    choice_text: row.try_get("choice_text")?,
                    votes: row.try_get("votes")?,
                })
            })
            .collect()
    }

    /// Every question together with the number of choices it owns.
    pub async fn get_question_summaries(&self) -> Result<Vec<QuestionSummary>, PollsError> {
        let rows = sqlx::query(
            r#"
            SELECT q.id, q.question_text, q.pub_date, COUNT(c.id) AS choice_count
            FROM questions q
            LEFT JOIN choices c ON c.question_id = q.id
            GROUP BY q.id, q.question_text, q.pub_date
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| -> Result<QuestionSummary, PollsError> {
                Ok(QuestionSummary {
                    question: question_from_row(row)?,
                    choice_count: row.try_get("choice_count")?,
                })
            })
            .collect()
    }
}

fn question_from_row(row: &SqliteRow) -> Result<Question, PollsError> {
    let pub_date: String = row.try_get("pub_date")?;

    Ok(Question {
        id: row.try_get("id")?,
        question_text: row.try_get("question_text")?,
        pub_date: parse_timestamp(&pub_date)?,
    })
}

// Fixed-width UTC timestamps so stored values also sort correctly as text
fn format_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_timestamp(value: &str) -> Result<DateTime<Utc>, PollsError> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|source| PollsError::InvalidTimestamp {
            value: value.to_string(),
            source,
        })
}
