//! Database repository for leaderboard entries.

use diesel::prelude::*;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use tracing::{debug, info, instrument};

use crate::challenge::GameMode;
use crate::db::{LeaderboardRow, NewLeaderboardRow, schema};
use crate::leaderboard::{LeaderboardEntry, LeaderboardError};

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Database repository for leaderboard operations.
///
/// Opens a fresh connection per call; every method is blocking.
#[derive(Debug, Clone)]
pub struct LeaderboardRepository {
    db_path: String,
}

impl LeaderboardRepository {
    /// Creates a new repository for the database at the given path.
    ///
    /// Use `":memory:"` only for one-shot checks; each call opens a new
    /// connection and so a new, empty in-memory database.
    ///
    /// # Errors
    ///
    /// Returns [`LeaderboardError`] if the path is empty.
    #[instrument(skip(db_path), fields(db_path = %db_path))]
    pub fn new(db_path: String) -> Result<Self, LeaderboardError> {
        if db_path.trim().is_empty() {
            return Err(LeaderboardError::new("Database path is empty"));
        }
        info!(path = %db_path, "Creating LeaderboardRepository");
        Ok(Self { db_path })
    }

    /// Establishes a database connection.
    #[instrument(skip(self))]
    fn connection(&self) -> Result<SqliteConnection, LeaderboardError> {
        debug!(path = %self.db_path, "Establishing connection");
        SqliteConnection::establish(&self.db_path).map_err(|e| {
            LeaderboardError::new(format!("Failed to connect to '{}': {}", self.db_path, e))
        })
    }

    /// Applies pending schema migrations.
    ///
    /// # Errors
    ///
    /// Returns [`LeaderboardError`] if a migration fails.
    #[instrument(skip(self))]
    pub fn run_migrations(&self) -> Result<(), LeaderboardError> {
        let mut conn = self.connection()?;
        let applied = conn
            .run_pending_migrations(MIGRATIONS)
            .map_err(|e| LeaderboardError::new(format!("Migration failed: {}", e)))?;
        info!(count = applied.len(), "Migrations applied");
        Ok(())
    }

    /// Lists every entry, highest score first, then fastest.
    ///
    /// # Errors
    ///
    /// Returns [`LeaderboardError`] if a database error occurs or a row is
    /// malformed.
    #[instrument(skip(self))]
    pub fn list(&self) -> Result<Vec<LeaderboardEntry>, LeaderboardError> {
        let mut conn = self.connection()?;

        let rows = schema::leaderboard::table
            .order((
                schema::leaderboard::score.desc(),
                schema::leaderboard::best_time_ms.asc(),
                schema::leaderboard::name.asc(),
            ))
            .select(LeaderboardRow::as_select())
            .load(&mut conn)?;

        info!(count = rows.len(), "Leaderboard loaded");
        rows.iter().map(LeaderboardRow::to_entry).collect()
    }

    /// Gets the entry for `(name, mode)`. Returns `None` if not found.
    ///
    /// # Errors
    ///
    /// Returns [`LeaderboardError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn find(&self, name: &str, mode: GameMode) -> Result<Option<LeaderboardEntry>, LeaderboardError> {
        let mut conn = self.connection()?;
        find_row(&mut conn, name, mode)?
            .as_ref()
            .map(LeaderboardRow::to_entry)
            .transpose()
    }

    /// Inserts `entry`, or replaces the stored entry for its identity when
    /// `entry` scores strictly higher. Runs in one transaction.
    ///
    /// Returns the entry as stored afterwards.
    ///
    /// # Errors
    ///
    /// Returns [`LeaderboardError`] if a database error occurs.
    #[instrument(skip(self, entry), fields(name = %entry.name(), mode = %entry.mode(), score = entry.score()))]
    pub fn upsert_if_better(&self, entry: &LeaderboardEntry) -> Result<LeaderboardEntry, LeaderboardError> {
        let mut conn = self.connection()?;
        let row = NewLeaderboardRow::from_entry(entry)?;

        let stored = conn.transaction::<_, LeaderboardError, _>(|conn| {
            match find_row(conn, entry.name(), *entry.mode())? {
                None => {
                    let inserted = diesel::insert_into(schema::leaderboard::table)
                        .values(&row)
                        .returning(LeaderboardRow::as_returning())
                        .get_result(conn)?;
                    info!(id = inserted.id(), "Leaderboard entry created");
                    Ok(inserted)
                }
                Some(existing) if entry.score() > existing.score() => {
                    let updated = diesel::update(&existing)
                        .set((&row, schema::leaderboard::updated_at.eq(diesel::dsl::now)))
                        .returning(LeaderboardRow::as_returning())
                        .get_result(conn)?;
                    info!(
                        id = updated.id(),
                        old_score = existing.score(),
                        "Leaderboard entry improved"
                    );
                    Ok(updated)
                }
                Some(existing) => {
                    debug!(id = existing.id(), best = existing.score(), "Existing score kept");
                    Ok(existing)
                }
            }
        })?;

        stored.to_entry()
    }
}

fn find_row(
    conn: &mut SqliteConnection,
    name: &str,
    mode: GameMode,
) -> Result<Option<LeaderboardRow>, LeaderboardError> {
    let row = schema::leaderboard::table
        .filter(schema::leaderboard::name.eq(name))
        .filter(schema::leaderboard::mode.eq(mode.to_string()))
        .select(LeaderboardRow::as_select())
        .first(conn)
        .optional()?;
    Ok(row)
}
