use crate::domain::analysis::{Analysis, AnalysisDraft, AnalysisWithProperty, Scenario};
use crate::domain::buyer::{BuyerProfile, CreditBand};
use crate::storage::properties::fetch_property;
use anyhow::Context;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::types::Json;
use uuid::Uuid;

const ANALYSIS_COLUMNS: &str = "id, property_id, user_id, first_time_home, annual_income, \
     household_size, credit_band, is_veteran, is_frontline, cash_on_hand, occupation, scenarios, \
     programs, created_at, updated_at";

#[derive(Debug, sqlx::FromRow)]
struct AnalysisRow {
    id: Uuid,
    property_id: Uuid,
    user_id: Option<String>,
    first_time_home: bool,
    annual_income: Decimal,
    household_size: i32,
    credit_band: String,
    is_veteran: bool,
    is_frontline: bool,
    cash_on_hand: Decimal,
    occupation: String,
    scenarios: Json<Vec<Scenario>>,
    programs: Json<Vec<serde_json::Value>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<AnalysisRow> for Analysis {
    type Error = anyhow::Error;

    fn try_from(row: AnalysisRow) -> anyhow::Result<Self> {
        let credit_band = CreditBand::parse(&row.credit_band).with_context(|| {
            format!("unknown credit_band {:?} for analysis {}", row.credit_band, row.id)
        })?;

        Ok(Analysis {
            id: row.id,
            property_id: row.property_id,
            user_id: row.user_id,
            profile: BuyerProfile {
                first_time_home: row.first_time_home,
                annual_income: row.annual_income,
                household_size: row.household_size,
                credit_band,
                is_veteran: row.is_veteran,
                is_frontline: row.is_frontline,
                cash_on_hand: row.cash_on_hand,
                occupation: row.occupation,
            },
            scenarios: row.scenarios.0,
            programs: row.programs.0,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Inserts only when the referenced property exists; `None` means it does not.
pub async fn insert_analysis(
    pool: &sqlx::PgPool,
    draft: &AnalysisDraft,
) -> anyhow::Result<Option<Analysis>> {
    let sql = format!(
        "INSERT INTO analyses (property_id, user_id, first_time_home, annual_income, household_size, \
         credit_band, is_veteran, is_frontline, cash_on_hand, occupation, scenarios, programs) \
         SELECT $1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12 \
         WHERE EXISTS (SELECT 1 FROM properties WHERE id = $1) \
         RETURNING {ANALYSIS_COLUMNS}"
    );

    let profile = &draft.profile;
    let row: Option<AnalysisRow> = sqlx::query_as(&sql)
        .bind(draft.property_id)
        .bind(&draft.user_id)
        .bind(profile.first_time_home)
        .bind(profile.annual_income)
        .bind(profile.household_size)
        .bind(profile.credit_band.as_str())
        .bind(profile.is_veteran)
        .bind(profile.is_frontline)
        .bind(profile.cash_on_hand)
        .bind(profile.occupation.trim())
        .bind(Json(&draft.scenarios))
        .bind(Json(&draft.programs))
        .fetch_optional(pool)
        .await
        .context("insert analyses failed")?;

    row.map(Analysis::try_from).transpose()
}

pub async fn fetch_analysis(pool: &sqlx::PgPool, id: Uuid) -> anyhow::Result<Option<Analysis>> {
    let sql = format!("SELECT {ANALYSIS_COLUMNS} FROM analyses WHERE id = $1 LIMIT 1");
    let row: Option<AnalysisRow> = sqlx::query_as(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("select analyses by id failed")?;

    row.map(Analysis::try_from).transpose()
}

pub async fn fetch_analysis_with_property(
    pool: &sqlx::PgPool,
    id: Uuid,
) -> anyhow::Result<Option<AnalysisWithProperty>> {
    let Some(analysis) = fetch_analysis(pool, id).await? else {
        return Ok(None);
    };

    let property = fetch_property(pool, analysis.property_id)
        .await?
        .with_context(|| {
            format!(
                "analysis {} references missing property {}",
                analysis.id, analysis.property_id
            )
        })?;

    Ok(Some(AnalysisWithProperty { analysis, property }))
}
