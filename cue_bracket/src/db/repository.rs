//! Repository trait definitions and the PostgreSQL implementation.
//!
//! Managers depend on these traits rather than on a pool, so the same
//! orchestration runs against PostgreSQL in production and against
//! [`MemoryRepository`](super::memory::MemoryRepository) in tests.

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Postgres, QueryBuilder, Row};

use super::timeouts::{
    DEFAULT_TRANSACTION_TIMEOUT, TimeoutError, with_default_timeout, with_timeout,
};
use crate::bracket::{
    Bracket, BracketError, BracketId, BracketResult, BracketStatus, Match, MatchId, MatchSlot,
    Slot,
};
use crate::tournament::{
    Player, PlayerId, Registration, RegistrationStatus, Tournament, TournamentId,
    TournamentResult, TournamentStatus,
};

/// Trait for tournament and registration storage
#[async_trait]
pub trait TournamentRepository: Send + Sync {
    /// Check that the store is reachable
    async fn ping(&self) -> TournamentResult<()>;

    async fn create_tournament(&self, tournament: &Tournament) -> TournamentResult<()>;

    async fn get_tournament(&self, id: TournamentId) -> TournamentResult<Option<Tournament>>;

    /// All tournaments ordered by date
    async fn list_tournaments(&self) -> TournamentResult<Vec<Tournament>>;

    async fn update_tournament_status(
        &self,
        id: TournamentId,
        status: TournamentStatus,
    ) -> TournamentResult<()>;

    /// Store a player profile and register it under `seed`
    async fn register_player(
        &self,
        tournament_id: TournamentId,
        player: &Player,
        seed: u32,
    ) -> TournamentResult<Registration>;

    /// Registrations ordered by seed
    async fn list_registrations(
        &self,
        tournament_id: TournamentId,
    ) -> TournamentResult<Vec<Registration>>;
}

/// Trait for bracket and match storage
#[async_trait]
pub trait BracketRepository: Send + Sync {
    /// The active bracket of a tournament, else its most recent completed one
    async fn find_current_bracket(
        &self,
        tournament_id: TournamentId,
    ) -> BracketResult<Option<Bracket>>;

    async fn get_bracket(&self, id: BracketId) -> BracketResult<Option<Bracket>>;

    /// Matches ordered by round then match number
    async fn list_matches(&self, bracket_id: BracketId) -> BracketResult<Vec<Match>>;

    async fn get_match(&self, id: MatchId) -> BracketResult<Option<Match>>;

    /// Insert a bracket together with all of its matches, atomically.
    ///
    /// Fails with [`BracketError::ActiveBracketExists`] when the tournament
    /// already has an active bracket.
    async fn create_bracket(&self, bracket: &Bracket, matches: &[Match]) -> BracketResult<()>;

    /// Write scores, winner, table and status of a match
    async fn update_match_result(&self, m: &Match) -> BracketResult<()>;

    /// Write one player slot of a match
    async fn set_player_slot(
        &self,
        match_id: MatchId,
        slot: Slot,
        player: Option<PlayerId>,
    ) -> BracketResult<()>;

    async fn update_bracket_status(&self, id: BracketId, status: BracketStatus)
    -> BracketResult<()>;

    /// Delete a bracket and its matches
    async fn delete_bracket(&self, id: BracketId) -> BracketResult<()>;
}

/// PostgreSQL implementation of both repository traits
#[derive(Clone)]
pub struct PgRepository {
    pool: PgPool,
}

impl PgRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn column_u32(row: &PgRow, column: &str) -> Result<u32, sqlx::Error> {
    let value: i32 = row.try_get(column)?;
    u32::try_from(value).map_err(|e| sqlx::Error::ColumnDecode {
        index: column.to_string(),
        source: Box::new(e),
    })
}

fn column_parse<T: std::str::FromStr<Err = String>>(
    row: &PgRow,
    column: &str,
) -> Result<T, sqlx::Error> {
    let value: String = row.try_get(column)?;
    value.parse().map_err(|e: String| sqlx::Error::ColumnDecode {
        index: column.to_string(),
        source: e.into(),
    })
}

fn tournament_from_row(row: &PgRow) -> Result<Tournament, sqlx::Error> {
    Ok(Tournament {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        date: row.try_get("date")?,
        location: row.try_get("location")?,
        max_players: column_u32(row, "max_players")?,
        entry_fee: row.try_get("entry_fee")?,
        pre_registration: row.try_get("pre_registration")?,
        status: column_parse(row, "status")?,
        created_at: row.try_get("created_at")?,
    })
}

fn registration_from_row(row: &PgRow) -> Result<Registration, sqlx::Error> {
    Ok(Registration {
        player: Player {
            id: row.try_get("player_id")?,
            first_name: row.try_get("first_name")?,
            last_name: row.try_get("last_name")?,
            email: row.try_get("email")?,
        },
        seed: column_u32(row, "seed")?,
        status: column_parse(row, "status")?,
    })
}

fn bracket_from_row(row: &PgRow) -> BracketResult<Bracket> {
    let config: serde_json::Value = row.try_get("config")?;
    Ok(Bracket {
        id: row.try_get("id")?,
        tournament_id: row.try_get("tournament_id")?,
        config: serde_json::from_value(config)?,
        bracket_size: column_u32(row, "bracket_size")?,
        status: column_parse(row, "status")?,
        created_at: row.try_get("created_at")?,
    })
}

fn match_from_row(row: &PgRow) -> Result<Match, sqlx::Error> {
    let table_number: Option<i32> = row.try_get("table_number")?;
    Ok(Match {
        id: row.try_get("id")?,
        bracket_id: row.try_get("bracket_id")?,
        slot: MatchSlot {
            round: column_u32(row, "round")?,
            match_number: column_u32(row, "match_number")?,
            player1: row.try_get("player1_id")?,
            player2: row.try_get("player2_id")?,
            player1_score: column_u32(row, "player1_score")?,
            player2_score: column_u32(row, "player2_score")?,
            winner: row.try_get("winner_id")?,
            table_number: table_number.map(|t| t as u32),
            status: column_parse(row, "status")?,
        },
    })
}

/// A unique violation on a bracket write means another bracket is active
fn bracket_write_error(err: TimeoutError) -> BracketError {
    match err {
        TimeoutError::Database(sqlx::Error::Database(db)) if db.is_unique_violation() => {
            BracketError::ActiveBracketExists
        }
        other => other.into(),
    }
}

const TOURNAMENT_COLUMNS: &str = "id, name, date, location, max_players, entry_fee, \
     pre_registration, status, created_at";

const BRACKET_COLUMNS: &str = "id, tournament_id, config, bracket_size, status, created_at";

const MATCH_COLUMNS: &str = "id, bracket_id, round, match_number, player1_id, player2_id, \
     player1_score, player2_score, winner_id, table_number, status";

#[async_trait]
impl TournamentRepository for PgRepository {
    async fn ping(&self) -> TournamentResult<()> {
        with_default_timeout(sqlx::query("SELECT 1").execute(&self.pool)).await?;
        Ok(())
    }

    async fn create_tournament(&self, t: &Tournament) -> TournamentResult<()> {
        with_default_timeout(
            sqlx::query(
                r#"
                INSERT INTO tournaments (id, name, date, location, max_players, entry_fee, pre_registration, status, created_at)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
                "#,
            )
            .bind(t.id)
            .bind(&t.name)
            .bind(t.date)
            .bind(&t.location)
            .bind(t.max_players as i32)
            .bind(t.entry_fee)
            .bind(t.pre_registration)
            .bind(t.status.as_str())
            .bind(t.created_at)
            .execute(&self.pool),
        )
        .await?;
        Ok(())
    }

    async fn get_tournament(&self, id: TournamentId) -> TournamentResult<Option<Tournament>> {
        let row = with_default_timeout(
            sqlx::query(&format!(
                "SELECT {TOURNAMENT_COLUMNS} FROM tournaments WHERE id = $1"
            ))
            .bind(id)
            .fetch_optional(&self.pool),
        )
        .await?;

        Ok(row.as_ref().map(tournament_from_row).transpose()?)
    }

    async fn list_tournaments(&self) -> TournamentResult<Vec<Tournament>> {
        let rows = with_default_timeout(
            sqlx::query(&format!(
                "SELECT {TOURNAMENT_COLUMNS} FROM tournaments ORDER BY date, created_at"
            ))
            .fetch_all(&self.pool),
        )
        .await?;

        Ok(rows
            .iter()
            .map(tournament_from_row)
            .collect::<Result<_, _>>()?)
    }

    async fn update_tournament_status(
        &self,
        id: TournamentId,
        status: TournamentStatus,
    ) -> TournamentResult<()> {
        with_default_timeout(
            sqlx::query("UPDATE tournaments SET status = $1, updated_at = NOW() WHERE id = $2")
                .bind(status.as_str())
                .bind(id)
                .execute(&self.pool),
        )
        .await?;
        Ok(())
    }

    async fn register_player(
        &self,
        tournament_id: TournamentId,
        player: &Player,
        seed: u32,
    ) -> TournamentResult<Registration> {
        let mut tx = self.pool.begin().await?;

        with_default_timeout(
            sqlx::query(
                "INSERT INTO player_profiles (id, first_name, last_name, email) VALUES ($1, $2, $3, $4)",
            )
            .bind(player.id)
            .bind(&player.first_name)
            .bind(&player.last_name)
            .bind(&player.email)
            .execute(&mut *tx),
        )
        .await?;

        let status = RegistrationStatus::Registered;
        with_default_timeout(
            sqlx::query(
                "INSERT INTO tournament_registrations (tournament_id, player_id, seed, status) VALUES ($1, $2, $3, $4)",
            )
            .bind(tournament_id)
            .bind(player.id)
            .bind(seed as i32)
            .bind(status.as_str())
            .execute(&mut *tx),
        )
        .await?;

        tx.commit().await?;

        Ok(Registration {
            player: player.clone(),
            seed,
            status,
        })
    }

    async fn list_registrations(
        &self,
        tournament_id: TournamentId,
    ) -> TournamentResult<Vec<Registration>> {
        let rows = with_default_timeout(
            sqlx::query(
                r#"
                SELECT r.player_id, p.first_name, p.last_name, p.email, r.seed, r.status
                FROM tournament_registrations r
                JOIN player_profiles p ON p.id = r.player_id
                WHERE r.tournament_id = $1
                ORDER BY r.seed
                "#,
            )
            .bind(tournament_id)
            .fetch_all(&self.pool),
        )
        .await?;

        Ok(rows
            .iter()
            .map(registration_from_row)
            .collect::<Result<_, _>>()?)
    }
}

#[async_trait]
impl BracketRepository for PgRepository {
    async fn find_current_bracket(
        &self,
        tournament_id: TournamentId,
    ) -> BracketResult<Option<Bracket>> {
        let row = with_default_timeout(
            sqlx::query(&format!(
                r#"
                SELECT {BRACKET_COLUMNS} FROM tournament_brackets
                WHERE tournament_id = $1 AND status IN ('active', 'completed')
                ORDER BY (status = 'active') DESC, created_at DESC
                LIMIT 1
                "#
            ))
            .bind(tournament_id)
            .fetch_optional(&self.pool),
        )
        .await?;

        row.as_ref().map(bracket_from_row).transpose()
    }

    async fn get_bracket(&self, id: BracketId) -> BracketResult<Option<Bracket>> {
        let row = with_default_timeout(
            sqlx::query(&format!(
                "SELECT {BRACKET_COLUMNS} FROM tournament_brackets WHERE id = $1"
            ))
            .bind(id)
            .fetch_optional(&self.pool),
        )
        .await?;

        row.as_ref().map(bracket_from_row).transpose()
    }

    async fn list_matches(&self, bracket_id: BracketId) -> BracketResult<Vec<Match>> {
        let rows = with_default_timeout(
            sqlx::query(&format!(
                "SELECT {MATCH_COLUMNS} FROM tournament_matches WHERE bracket_id = $1 ORDER BY round, match_number"
            ))
            .bind(bracket_id)
            .fetch_all(&self.pool),
        )
        .await?;

        Ok(rows.iter().map(match_from_row).collect::<Result<_, _>>()?)
    }

    async fn get_match(&self, id: MatchId) -> BracketResult<Option<Match>> {
        let row = with_default_timeout(
            sqlx::query(&format!(
                "SELECT {MATCH_COLUMNS} FROM tournament_matches WHERE id = $1"
            ))
            .bind(id)
            .fetch_optional(&self.pool),
        )
        .await?;

        Ok(row.as_ref().map(match_from_row).transpose()?)
    }

    async fn create_bracket(&self, bracket: &Bracket, matches: &[Match]) -> BracketResult<()> {
        let config = serde_json::to_value(&bracket.config)?;
        let mut tx = self.pool.begin().await?;

        with_default_timeout(
            sqlx::query(
                r#"
                INSERT INTO tournament_brackets (id, tournament_id, config, bracket_size, status, created_at)
                VALUES ($1, $2, $3, $4, $5, $6)
                "#,
            )
            .bind(bracket.id)
            .bind(bracket.tournament_id)
            .bind(config)
            .bind(bracket.bracket_size as i32)
            .bind(bracket.status.as_str())
            .bind(bracket.created_at)
            .execute(&mut *tx),
        )
        .await
        .map_err(bracket_write_error)?;

        if !matches.is_empty() {
            let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(
                "INSERT INTO tournament_matches (id, bracket_id, round, match_number, player1_id, \
                 player2_id, player1_score, player2_score, winner_id, table_number, status) ",
            );
            builder.push_values(matches, |mut row, m| {
                row.push_bind(m.id)
                    .push_bind(m.bracket_id)
                    .push_bind(m.slot.round as i32)
                    .push_bind(m.slot.match_number as i32)
                    .push_bind(m.slot.player1)
                    .push_bind(m.slot.player2)
                    .push_bind(m.slot.player1_score as i32)
                    .push_bind(m.slot.player2_score as i32)
                    .push_bind(m.slot.winner)
                    .push_bind(m.slot.table_number.map(|t| t as i32))
                    .push_bind(m.slot.status.as_str());
            });
            with_timeout(
                DEFAULT_TRANSACTION_TIMEOUT,
                builder.build().execute(&mut *tx),
            )
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn update_match_result(&self, m: &Match) -> BracketResult<()> {
        let result = with_default_timeout(
            sqlx::query(
                r#"
                UPDATE tournament_matches
                SET player1_score = $1, player2_score = $2, winner_id = $3,
                    table_number = $4, status = $5, updated_at = NOW()
                WHERE id = $6
                "#,
            )
            .bind(m.slot.player1_score as i32)
            .bind(m.slot.player2_score as i32)
            .bind(m.slot.winner)
            .bind(m.slot.table_number.map(|t| t as i32))
            .bind(m.slot.status.as_str())
            .bind(m.id)
            .execute(&self.pool),
        )
        .await?;

        if result.rows_affected() == 0 {
            return Err(BracketError::MatchNotFound(m.id));
        }
        Ok(())
    }

    async fn set_player_slot(
        &self,
        match_id: MatchId,
        slot: Slot,
        player: Option<PlayerId>,
    ) -> BracketResult<()> {
        // Column name comes from the closed Slot enum, never from input.
        let sql = format!(
            "UPDATE tournament_matches SET {} = $1, updated_at = NOW() WHERE id = $2",
            slot.column()
        );
        let result =
            with_default_timeout(sqlx::query(&sql).bind(player).bind(match_id).execute(&self.pool))
                .await?;

        if result.rows_affected() == 0 {
            return Err(BracketError::MatchNotFound(match_id));
        }
        Ok(())
    }

    async fn update_bracket_status(
        &self,
        id: BracketId,
        status: BracketStatus,
    ) -> BracketResult<()> {
        let result = with_default_timeout(
            sqlx::query("UPDATE tournament_brackets SET status = $1 WHERE id = $2")
                .bind(status.as_str())
                .bind(id)
                .execute(&self.pool),
        )
        .await
        .map_err(bracket_write_error)?;

        if result.rows_affected() == 0 {
            return Err(BracketError::BracketNotFound(id));
        }
        Ok(())
    }

    async fn delete_bracket(&self, id: BracketId) -> BracketResult<()> {
        let result = with_default_timeout(
            sqlx::query("DELETE FROM tournament_brackets WHERE id = $1")
                .bind(id)
                .execute(&self.pool),
        )
        .await?;

        if result.rows_affected() == 0 {
            return Err(BracketError::BracketNotFound(id));
        }
        Ok(())
    }
}
