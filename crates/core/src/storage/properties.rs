use crate::domain::property::{NewProperty, Property, SourceSite};
use anyhow::Context;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

const PROPERTY_COLUMNS: &str = "id, user_id, address, city, state, zip_code, price, bedrooms, \
     bathrooms, hoa, sqft, year_built, lot_size, property_type, description, source_url, \
     source_logo, created_at, updated_at";

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct PropertyRow {
    id: Uuid,
    user_id: Option<String>,
    address: String,
    city: String,
    state: String,
    zip_code: String,
    price: Decimal,
    bedrooms: Option<i32>,
    bathrooms: Option<Decimal>,
    hoa: Option<Decimal>,
    sqft: Option<i32>,
    year_built: Option<i32>,
    lot_size: Option<String>,
    property_type: Option<String>,
    description: Option<String>,
    source_url: Option<String>,
    source_logo: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<PropertyRow> for Property {
    type Error = anyhow::Error;

    fn try_from(row: PropertyRow) -> anyhow::Result<Self> {
        let source_logo = match row.source_logo.as_deref() {
            Some(tag) => Some(
                SourceSite::parse(tag)
                    .with_context(|| format!("unknown source_logo {tag:?} for property {}", row.id))?,
            ),
            None => None,
        };

        Ok(Property {
            id: row.id,
            user_id: row.user_id,
            address: row.address,
            city: row.city,
            state: row.state,
            zip_code: row.zip_code,
            price: row.price,
            bedrooms: row.bedrooms,
            bathrooms: row.bathrooms,
            hoa: row.hoa,
            sqft: row.sqft,
            year_built: row.year_built,
            lot_size: row.lot_size,
            property_type: row.property_type,
            description: row.description,
            source_url: row.source_url,
            source_logo,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Callers validate `input` first; the table's CHECK constraints are a backstop.
pub async fn insert_property(
    pool: &sqlx::PgPool,
    input: &NewProperty,
    user_id: Option<&str>,
) -> anyhow::Result<Property> {
    let sql = format!(
        "INSERT INTO properties (user_id, address, city, state, zip_code, price, bedrooms, bathrooms, hoa, \
         source_url, source_logo, sqft, year_built, lot_size, property_type, description) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16) \
         RETURNING {PROPERTY_COLUMNS}"
    );

    let row: PropertyRow = sqlx::query_as(&sql)
        .bind(user_id)
        .bind(input.address.trim())
        .bind(input.city.trim())
        .bind(input.state.to_ascii_uppercase())
        .bind(input.zip_code.trim())
        .bind(input.price)
        .bind(input.bedrooms)
        .bind(input.bathrooms)
        .bind(input.hoa)
        .bind(&input.source_url)
        .bind(input.source_logo.map(SourceSite::as_str))
        .bind(input.sqft)
        .bind(input.year_built)
        .bind(&input.lot_size)
        .bind(&input.property_type)
        .bind(&input.description)
        .fetch_one(pool)
        .await
        .context("insert properties failed")?;

    row.try_into()
}

pub async fn fetch_property(pool: &sqlx::PgPool, id: Uuid) -> anyhow::Result<Option<Property>> {
    let sql = format!("SELECT {PROPERTY_COLUMNS} FROM properties WHERE id = $1 LIMIT 1");
    let row: Option<PropertyRow> = sqlx::query_as(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("select properties by id failed")?;

    row.map(Property::try_from).transpose()
}

pub async fn list_properties_for_user(
    pool: &sqlx::PgPool,
    user_id: &str,
) -> anyhow::Result<Vec<Property>> {
    let sql = format!(
        "SELECT {PROPERTY_COLUMNS} FROM properties WHERE user_id = $1 ORDER BY created_at ASC"
    );
    let rows: Vec<PropertyRow> = sqlx::query_as(&sql)
        .bind(user_id)
        .fetch_all(pool)
        .await
        .context("select properties by user failed")?;

    rows.into_iter().map(Property::try_from).collect()
}
