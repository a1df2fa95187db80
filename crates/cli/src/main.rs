use anyhow::Context;
use clap::{Parser, Subcommand};
use homeguide_core::domain::property::{validate_listing_url, NewProperty};
use homeguide_core::extract::ListingExtractor;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "homeguide_cli")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run listing extraction for a URL and print the parsed record as JSON.
    ParseUrl {
        url: String,

        /// Also store the result as a property (requires DATABASE_URL).
        #[arg(long)]
        save: bool,

        /// Owner id recorded with --save.
        #[arg(long, requires = "save")]
        user_id: Option<String>,
    },

    /// Apply pending database migrations.
    Migrate,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = homeguide_core::config::Settings::from_env()?;
    let _sentry_guard = init_sentry(&settings);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer())
        .init();

    let args = Args::parse();

    match args.command {
        Command::ParseUrl { url, save, user_id } => {
            let url = validate_listing_url(&url)?;
            let extractor = ListingExtractor::from_settings(&settings)?;
            let parsed = extractor.parse_url(&url).await;

            if parsed.degraded {
                tracing::warn!(
                    %url,
                    reason = ?parsed.fallback_reason,
                    "extraction returned placeholder data"
                );
            }

            println!("{}", serde_json::to_string_pretty(&parsed)?);

            if save {
                let input = NewProperty::from(parsed);
                input.validate(chrono_year())?;
                let pool = connect(&settings).await?;
                let property = homeguide_core::storage::properties::insert_property(
                    &pool,
                    &input,
                    user_id.as_deref(),
                )
                .await?;
                tracing::info!(property_id = %property.id, "persisted property");
            }
        }
        Command::Migrate => {
            connect(&settings).await?;
            tracing::info!("migrations applied");
        }
    }

    Ok(())
}

/// Connects and brings the schema up to date.
async fn connect(settings: &homeguide_core::config::Settings) -> anyhow::Result<sqlx::PgPool> {
    let db_url = settings.require_database_url()?;

    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(2)
        .connect(db_url)
        .await
        .context("connect DATABASE_URL failed")?;

    if let Err(err) = homeguide_core::storage::migrate(&pool).await {
        sentry_anyhow::capture_anyhow(&err);
        return Err(err);
    }
    Ok(pool)
}

fn chrono_year() -> i32 {
    use chrono::Datelike;
    chrono::Utc::now().year()
}

fn init_sentry(settings: &homeguide_core::config::Settings) -> Option<sentry::ClientInitGuard> {
    let dsn = settings.sentry_dsn.as_deref()?;
    Some(sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            ..Default::default()
        },
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_parse_url_with_save() {
        let args = Args::try_parse_from([
            "homeguide_cli",
            "parse-url",
            "https://www.zillow.com/homedetails/1",
            "--save",
            "--user-id",
            "user_1",
        ])
        .unwrap();
        match args.command {
            Command::ParseUrl { url, save, user_id } => {
                assert_eq!(url, "https://www.zillow.com/homedetails/1");
                assert!(save);
                assert_eq!(user_id.as_deref(), Some("user_1"));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn user_id_requires_save() {
        let res = Args::try_parse_from([
            "homeguide_cli",
            "parse-url",
            "https://www.redfin.com/x",
            "--user-id",
            "user_1",
        ]);
        assert!(res.is_err());
    }
}
