use crate::config::LimitsConfig;
use crate::db::models::{PlanTier, UsageStatus, UserAccount};
use chrono::{DateTime, Utc};
use duckdb::{params, Connection, Result as DbResult, Row};

pub struct UsageService;

impl UsageService {
    fn row_to_user(row: &Row) -> DbResult<UserAccount> {
        // Timestamps are selected AS text so we don't depend on the driver's
        // chrono feature; see the CAST in the SELECT statements.
        let created_str: String = row.get(2)?;
        let created_at = created_str
            .parse::<DateTime<Utc>>()
            .unwrap_or_else(|_| Utc::now());

        Ok(UserAccount {
            user_id: row.get(0)?,
            plan: PlanTier::from_name(&row.get::<_, String>(1)?),
            created_at,
        })
    }

    fn day_key(user_id: &str, day: &str) -> String {
        format!("{}_{}", user_id, day)
    }

    fn today() -> String {
        Utc::now().format("%Y-%m-%d").to_string()
    }

    // --- User Operations ---

    pub fn get_or_create_user(conn: &Connection, user_id: &str) -> DbResult<UserAccount> {
        let mut stmt = conn.prepare(
            "SELECT user_id, plan, CAST(created_at AS VARCHAR) FROM users WHERE user_id = ?",
        )?;
        let mut rows = stmt.query_map(params![user_id], Self::row_to_user)?;

        if let Some(row) = rows.next() {
            return row;
        }

        conn.execute("INSERT INTO users (user_id) VALUES (?)", params![user_id])?;

        Ok(UserAccount {
            user_id: user_id.to_string(),
            plan: PlanTier::Free,
            created_at: Utc::now(),
        })
    }

    pub fn set_plan(conn: &Connection, user_id: &str, plan: PlanTier) -> DbResult<()> {
        Self::get_or_create_user(conn, user_id)?;
        conn.execute(
            "UPDATE users SET plan = ? WHERE user_id = ?",
            params![plan.as_str(), user_id],
        )?;
        Ok(())
    }

    // --- Usage Operations ---
    //
    // Counters are keyed by userId_YYYY-MM-DD, so a new day starts from a
    // missing row rather than an explicit midnight reset.

    pub fn check_limit(
        conn: &Connection,
        user_id: &str,
        limits: &LimitsConfig,
    ) -> DbResult<UsageStatus> {
        Self::check_limit_on(conn, user_id, limits, &Self::today())
    }

    pub fn check_limit_on(
        conn: &Connection,
        user_id: &str,
        limits: &LimitsConfig,
        day: &str,
    ) -> DbResult<UsageStatus> {
        let user = Self::get_or_create_user(conn, user_id)?;
        let key = Self::day_key(user_id, day);

        let mut stmt = conn.prepare("SELECT requests FROM usage_records WHERE day_key = ?")?;
        let mut rows = stmt.query_map(params![key], |row| row.get::<_, i64>(0))?;
        let count = match rows.next() {
            Some(row) => row?,
            None => 0,
        };

        let limit = user.plan.daily_limit(limits);
        let (can_proceed, remaining) = if limit < 0 {
            (true, -1)
        } else {
            (count < limit, (limit - count).max(0))
        };

        Ok(UsageStatus {
            user_id: user_id.to_string(),
            plan: user.plan,
            day: day.to_string(),
            count,
            limit,
            remaining,
            can_proceed,
        })
    }

    pub fn record_usage(conn: &Connection, user_id: &str) -> DbResult<()> {
        Self::record_usage_on(conn, user_id, &Self::today())
    }

    pub fn record_usage_on(conn: &Connection, user_id: &str, day: &str) -> DbResult<()> {
        // Single-statement upsert; the increment is atomic per row, which is
        // all the original relied on. Two in-flight requests from one user
        // can still each pass check_limit before either increment lands.
        conn.execute(
            "INSERT INTO usage_records (day_key, user_id, day, requests) VALUES (?, ?, ?, 1)
             ON CONFLICT (day_key) DO UPDATE SET requests = requests + 1, updated_at = now()",
            params![Self::day_key(user_id, day), user_id, day],
        )?;
        Ok(())
    }

    pub fn reset_today(conn: &Connection, user_id: &str) -> DbResult<()> {
        conn.execute(
            "DELETE FROM usage_records WHERE day_key = ?",
            params![Self::day_key(user_id, &Self::today())],
        )?;
        Ok(())
    }
}
