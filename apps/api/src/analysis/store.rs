use async_trait::async_trait;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::analysis::ports::{ResumeStore, StoreFailure};
use crate::models::resume::ResumeRecord;

/// Stores analyzed resumes in the `resumes` table. The AI's raw document is
/// kept in a JSONB column next to the extracted fields.
#[derive(Clone)]
pub struct PgResumeStore {
    pool: PgPool,
}

impl PgResumeStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ResumeStore for PgResumeStore {
    async fn insert(&self, record: &ResumeRecord) -> Result<(), StoreFailure> {
        validate_record(record)?;

        let id = Uuid::new_v4();
        sqlx::query(
            r#"
            INSERT INTO resumes
                (id, name, email, skills, summary, experience_highlights, education,
                 overall_impression, original_resume_text, full_analysis)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(id)
        .bind(&record.name)
        .bind(&record.email)
        .bind(&record.skills)
        .bind(&record.summary)
        .bind(&record.experience_highlights)
        .bind(&record.education)
        .bind(&record.overall_impression)
        .bind(&record.original_resume_text)
        .bind(&record.full_analysis)
        .execute(&self.pool)
        .await
        .map_err(classify_sqlx_error)?;

        info!("Inserted resume {id}");
        Ok(())
    }
}

/// Document-level checks applied before the row reaches Postgres.
fn validate_record(record: &ResumeRecord) -> Result<(), StoreFailure> {
    let mut problems = Vec::new();
    if record.name.trim().is_empty() {
        problems.push("name: Path `name` is required.");
    }
    if record.email.trim().is_empty() {
        problems.push("email: Path `email` is required.");
    }

    if problems.is_empty() {
        Ok(())
    } else {
        Err(StoreFailure::Validation(problems.join(", ")))
    }
}

/// SQLSTATE class 22 (data exception) and 23 (integrity constraint) are
/// rejections of the record itself; class 08 and transport failures mean the
/// database could not be reached.
fn classify_sqlx_error(err: sqlx::Error) -> StoreFailure {
    match &err {
        sqlx::Error::Database(db) => {
            let code = db.code().map(|c| c.into_owned()).unwrap_or_default();
            if code.starts_with("22") || code.starts_with("23") {
                StoreFailure::Validation(db.message().to_string())
            } else if code.starts_with("08") {
                StoreFailure::Connection(err.to_string())
            } else {
                StoreFailure::Other(err.to_string())
            }
        }
        sqlx::Error::Io(_)
        | sqlx::Error::Tls(_)
        | sqlx::Error::PoolTimedOut
        | sqlx::Error::PoolClosed
        | sqlx::Error::WorkerCrashed => StoreFailure::Connection(err.to_string()),
        _ => StoreFailure::Other(err.to_string()),
    }
}
