use std::path::Path;
use std::sync::Mutex;

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::types::Type;
use rusqlite::{Connection, OptionalExtension, Row, params};

use super::Store;
use super::schema::SCHEMA;
use crate::error::{Error, Result};
use crate::types::*;

pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    pub fn new<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let conn = Connection::open(db_path)?;

        conn.pragma_update(None, "foreign_keys", "ON")?;
        conn.pragma_update(None, "journal_mode", "WAL")?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> std::sync::MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(|e| e.into_inner())
    }
}

fn parse_datetime(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .or_else(|_| {
            // Handle SQLite's default datetime format: "YYYY-MM-DD HH:MM:SS"
            chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").map(|ndt| ndt.and_utc())
        })
        .unwrap_or_else(|e| {
            tracing::error!("Invalid datetime in database: '{}' - {}", s, e);
            Utc::now()
        })
}

// Fixed-width UTC so TEXT ordering matches time ordering.
fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn datetime_at(row: &Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    Ok(parse_datetime(&row.get::<_, String>(idx)?))
}

fn opt_datetime_at(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<DateTime<Utc>>> {
    Ok(row.get::<_, Option<String>>(idx)?.map(|s| parse_datetime(&s)))
}

fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _)
            if e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
                || e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY
    )
}

const PROFILE_COLUMNS: &str =
    "p.user_id, p.email, p.full_name, p.company_name, p.logo_url, p.created_at, p.updated_at";

fn profile_from_row(row: &Row<'_>) -> rusqlite::Result<Profile> {
    Ok(Profile {
        user_id: row.get(0)?,
        email: row.get(1)?,
        full_name: row.get(2)?,
        company_name: row.get(3)?,
        logo_url: row.get(4)?,
        created_at: datetime_at(row, 5)?,
        updated_at: datetime_at(row, 6)?,
    })
}

fn user_from_row(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        profile: profile_from_row(row)?,
        role: row.get(7)?,
    })
}

const TOKEN_COLUMNS: &str =
    "id, token_hash, token_lookup, user_id, created_at, expires_at, last_used_at";

fn token_from_row(row: &Row<'_>) -> rusqlite::Result<Token> {
    Ok(Token {
        id: row.get(0)?,
        token_hash: row.get(1)?,
        token_lookup: row.get(2)?,
        user_id: row.get(3)?,
        created_at: datetime_at(row, 4)?,
        expires_at: opt_datetime_at(row, 5)?,
        last_used_at: opt_datetime_at(row, 6)?,
    })
}

const ONBOARDING_COLUMNS: &str = "id, user_id, company_name, logo_url, inspiration_images, \
     project_description, additional_details, approval_status, approved_at, submitted_at, \
     created_at, updated_at";

fn onboarding_from_row(row: &Row<'_>) -> rusqlite::Result<ClientOnboarding> {
    let images: String = row.get(4)?;
    let inspiration_images = serde_json::from_str(&images)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(4, Type::Text, Box::new(e)))?;

    Ok(ClientOnboarding {
        id: row.get(0)?,
        user_id: row.get(1)?,
        company_name: row.get(2)?,
        logo_url: row.get(3)?,
        inspiration_images,
        project_description: row.get(5)?,
        additional_details: row.get(6)?,
        approval_status: row.get(7)?,
        approved_at: opt_datetime_at(row, 8)?,
        submitted_at: opt_datetime_at(row, 9)?,
        created_at: datetime_at(row, 10)?,
        updated_at: datetime_at(row, 11)?,
    })
}

const PROJECT_COLUMNS: &str = "id, client_id, name, description, status, health_status, \
     waiting_on, support_plan, internal_notes, launch_date, launch_notes, created_at, updated_at";

fn project_from_row(row: &Row<'_>) -> rusqlite::Result<Project> {
    Ok(Project {
        id: row.get(0)?,
        client_id: row.get(1)?,
        name: row.get(2)?,
        description: row.get(3)?,
        status: row.get(4)?,
        health_status: row.get(5)?,
        waiting_on: row.get(6)?,
        support_plan: row.get(7)?,
        internal_notes: row.get(8)?,
        launch_date: opt_datetime_at(row, 9)?,
        launch_notes: row.get(10)?,
        created_at: datetime_at(row, 11)?,
        updated_at: datetime_at(row, 12)?,
    })
}

const CONTRACT_COLUMNS: &str = "id, client_id, project_id, title, content, is_signed, \
     signature_data, signed_at, created_at, updated_at";

fn contract_from_row(row: &Row<'_>) -> rusqlite::Result<Contract> {
    Ok(Contract {
        id: row.get(0)?,
        client_id: row.get(1)?,
        project_id: row.get(2)?,
        title: row.get(3)?,
        content: row.get(4)?,
        is_signed: row.get(5)?,
        signature_data: row.get(6)?,
        signed_at: opt_datetime_at(row, 7)?,
        created_at: datetime_at(row, 8)?,
        updated_at: datetime_at(row, 9)?,
    })
}

const DELIVERABLE_COLUMNS: &str = "id, project_id, title, description, file_url, file_type, \
     external_link, version, is_delivered, delivered_at, created_at, updated_at";

fn deliverable_from_row(row: &Row<'_>) -> rusqlite::Result<Deliverable> {
    Ok(Deliverable {
        id: row.get(0)?,
        project_id: row.get(1)?,
        title: row.get(2)?,
        description: row.get(3)?,
        file_url: row.get(4)?,
        file_type: row.get(5)?,
        external_link: row.get(6)?,
        version: row.get(7)?,
        is_delivered: row.get(8)?,
        delivered_at: opt_datetime_at(row, 9)?,
        created_at: datetime_at(row, 10)?,
        updated_at: datetime_at(row, 11)?,
    })
}

const INVOICE_COLUMNS: &str = "id, project_id, client_id, amount, currency, description, \
     due_date, status, paid_at, created_at, updated_at";

fn invoice_from_row(row: &Row<'_>) -> rusqlite::Result<Invoice> {
    Ok(Invoice {
        id: row.get(0)?,
        project_id: row.get(1)?,
        client_id: row.get(2)?,
        amount: row.get(3)?,
        currency: row.get(4)?,
        description: row.get(5)?,
        due_date: row.get(6)?,
        status: row.get(7)?,
        paid_at: opt_datetime_at(row, 8)?,
        created_at: datetime_at(row, 9)?,
        updated_at: datetime_at(row, 10)?,
    })
}

const MESSAGE_COLUMNS: &str = "id, project_id, sender_id, content, is_read, created_at";

fn message_from_row(row: &Row<'_>) -> rusqlite::Result<Message> {
    Ok(Message {
        id: row.get(0)?,
        project_id: row.get(1)?,
        sender_id: row.get(2)?,
        content: row.get(3)?,
        is_read: row.get(4)?,
        created_at: datetime_at(row, 5)?,
    })
}

const MILESTONE_COLUMNS: &str = "id, project_id, title, description, status, due_date, \
     is_completed, completed_at, sort_order, created_at, updated_at";

fn milestone_from_row(row: &Row<'_>) -> rusqlite::Result<Milestone> {
    Ok(Milestone {
        id: row.get(0)?,
        project_id: row.get(1)?,
        title: row.get(2)?,
        description: row.get(3)?,
        status: row.get(4)?,
        due_date: row.get(5)?,
        is_completed: row.get(6)?,
        completed_at: opt_datetime_at(row, 7)?,
        sort_order: row.get(8)?,
        created_at: datetime_at(row, 9)?,
        updated_at: datetime_at(row, 10)?,
    })
}

const APPROVAL_COLUMNS: &str = "id, project_id, approval_type, approved_by, notes, approved_at";

fn approval_from_row(row: &Row<'_>) -> rusqlite::Result<MilestoneApproval> {
    Ok(MilestoneApproval {
        id: row.get(0)?,
        project_id: row.get(1)?,
        approval_type: row.get(2)?,
        approved_by: row.get(3)?,
        notes: row.get(4)?,
        approved_at: datetime_at(row, 5)?,
    })
}

impl SqliteStore {
    fn query_one<T>(
        &self,
        sql: &str,
        params: impl rusqlite::Params,
        map: fn(&Row<'_>) -> rusqlite::Result<T>,
    ) -> Result<Option<T>> {
        self.conn()
            .query_row(sql, params, map)
            .optional()
            .map_err(Error::from)
    }

    fn query_all<T>(
        &self,
        sql: &str,
        params: impl rusqlite::Params,
        map: fn(&Row<'_>) -> rusqlite::Result<T>,
    ) -> Result<Vec<T>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(sql)?;
        let rows = stmt.query_map(params, map)?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }
}

impl Store for SqliteStore {
    fn initialize(&self) -> Result<()> {
        self.conn().execute_batch(SCHEMA)?;
        Ok(())
    }

    // User operations

    fn create_user(&self, user: &User) -> Result<()> {
        let mut conn = self.conn();
        let tx = conn.transaction()?;

        let profile = &user.profile;
        let inserted = tx.execute(
            "INSERT INTO profiles (user_id, email, full_name, company_name, logo_url, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                profile.user_id,
                profile.email,
                profile.full_name,
                profile.company_name,
                profile.logo_url,
                format_datetime(&profile.created_at),
                format_datetime(&profile.updated_at),
            ],
        );
        match inserted {
            Ok(_) => {}
            Err(e) if is_unique_violation(&e) => return Err(Error::AlreadyExists),
            Err(e) => return Err(Error::from(e)),
        }

        tx.execute(
            "INSERT INTO user_roles (user_id, role) VALUES (?1, ?2)",
            params![profile.user_id, user.role],
        )?;

        tx.commit()?;
        Ok(())
    }

    fn get_user(&self, id: &str) -> Result<Option<User>> {
        self.query_one(
            &format!(
                "SELECT {PROFILE_COLUMNS}, r.role FROM profiles p
                 JOIN user_roles r ON r.user_id = p.user_id WHERE p.user_id = ?1"
            ),
            params![id],
            user_from_row,
        )
    }

    fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        self.query_one(
            &format!(
                "SELECT {PROFILE_COLUMNS}, r.role FROM profiles p
                 JOIN user_roles r ON r.user_id = p.user_id WHERE p.email = ?1"
            ),
            params![email],
            user_from_row,
        )
    }

    fn get_profile(&self, user_id: &str) -> Result<Option<Profile>> {
        self.query_one(
            &format!("SELECT {PROFILE_COLUMNS} FROM profiles p WHERE p.user_id = ?1"),
            params![user_id],
            profile_from_row,
        )
    }

    fn list_users(&self, cursor: &str, limit: i32) -> Result<Vec<User>> {
        self.query_all(
            &format!(
                "SELECT {PROFILE_COLUMNS}, r.role FROM profiles p
                 JOIN user_roles r ON r.user_id = p.user_id
                 WHERE p.user_id > ?1 ORDER BY p.user_id LIMIT ?2"
            ),
            params![cursor, limit],
            user_from_row,
        )
    }

    // Token operations

    fn create_token(&self, token: &Token) -> Result<()> {
        let result = self.conn().execute(
            "INSERT INTO tokens (id, token_hash, token_lookup, user_id, created_at, expires_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                token.id,
                token.token_hash,
                token.token_lookup,
                token.user_id,
                format_datetime(&token.created_at),
                token.expires_at.as_ref().map(format_datetime),
            ],
        );

        match result {
            Ok(_) => Ok(()),
            Err(e) if is_unique_violation(&e) => Err(Error::TokenLookupCollision),
            Err(e) => Err(Error::from(e)),
        }
    }

    fn get_token_by_id(&self, id: &str) -> Result<Option<Token>> {
        self.query_one(
            &format!("SELECT {TOKEN_COLUMNS} FROM tokens WHERE id = ?1"),
            params![id],
            token_from_row,
        )
    }

    fn get_token_by_lookup(&self, lookup: &str) -> Result<Option<Token>> {
        self.query_one(
            &format!("SELECT {TOKEN_COLUMNS} FROM tokens WHERE token_lookup = ?1"),
            params![lookup],
            token_from_row,
        )
    }

    fn list_tokens(&self, cursor: &str, limit: i32) -> Result<Vec<Token>> {
        self.query_all(
            &format!("SELECT {TOKEN_COLUMNS} FROM tokens WHERE id > ?1 ORDER BY id LIMIT ?2"),
            params![cursor, limit],
            token_from_row,
        )
    }

    fn list_user_tokens(&self, user_id: &str) -> Result<Vec<Token>> {
        self.query_all(
            &format!(
                "SELECT {TOKEN_COLUMNS} FROM tokens WHERE user_id = ?1 ORDER BY created_at DESC"
            ),
            params![user_id],
            token_from_row,
        )
    }

    fn delete_token(&self, id: &str) -> Result<bool> {
        let rows = self
            .conn()
            .execute("DELETE FROM tokens WHERE id = ?1", params![id])?;
        Ok(rows > 0)
    }

    fn update_token_last_used(&self, id: &str) -> Result<()> {
        self.conn().execute(
            "UPDATE tokens SET last_used_at = ?1 WHERE id = ?2",
            params![format_datetime(&Utc::now()), id],
        )?;
        Ok(())
    }

    fn has_admin_token(&self) -> Result<bool> {
        let count: i64 = self.conn().query_row(
            "SELECT COUNT(*) FROM tokens t
             JOIN user_roles r ON r.user_id = t.user_id WHERE r.role = 'admin'",
            [],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    // Onboarding operations

    fn create_onboarding(&self, onboarding: &ClientOnboarding) -> Result<()> {
        let images = serde_json::to_string(&onboarding.inspiration_images)?;
        let result = self.conn().execute(
            "INSERT INTO client_onboarding (id, user_id, company_name, logo_url, inspiration_images,
                 project_description, additional_details, approval_status, approved_at, submitted_at,
                 created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
            params![
                onboarding.id,
                onboarding.user_id,
                onboarding.company_name,
                onboarding.logo_url,
                images,
                onboarding.project_description,
                onboarding.additional_details,
                onboarding.approval_status,
                onboarding.approved_at.as_ref().map(format_datetime),
                onboarding.submitted_at.as_ref().map(format_datetime),
                format_datetime(&onboarding.created_at),
                format_datetime(&onboarding.updated_at),
            ],
        );

        match result {
            Ok(_) => Ok(()),
            Err(e) if is_unique_violation(&e) => Err(Error::AlreadyExists),
            Err(e) => Err(Error::from(e)),
        }
    }

    fn get_onboarding(&self, user_id: &str) -> Result<Option<ClientOnboarding>> {
        self.query_one(
            &format!("SELECT {ONBOARDING_COLUMNS} FROM client_onboarding WHERE user_id = ?1"),
            params![user_id],
            onboarding_from_row,
        )
    }

    fn list_onboarding(&self, status: Option<ApprovalStatus>) -> Result<Vec<ClientOnboarding>> {
        self.query_all(
            &format!(
                "SELECT {ONBOARDING_COLUMNS} FROM client_onboarding
                 WHERE ?1 IS NULL OR approval_status = ?1
                 ORDER BY created_at DESC"
            ),
            params![status],
            onboarding_from_row,
        )
    }

    fn submit_onboarding(
        &self,
        user_id: &str,
        intake: &IntakeSubmission,
        submitted_at: DateTime<Utc>,
    ) -> Result<bool> {
        let images = serde_json::to_string(&intake.inspiration_images)?;
        let now = format_datetime(&submitted_at);
        let rows = self.conn().execute(
            "UPDATE client_onboarding
             SET company_name = ?1, project_description = ?2, additional_details = ?3,
                 logo_url = ?4, inspiration_images = ?5, submitted_at = ?6, updated_at = ?6
             WHERE user_id = ?7 AND submitted_at IS NULL",
            params![
                intake.company_name,
                intake.project_description,
                intake.additional_details,
                intake.logo_url,
                images,
                now,
                user_id,
            ],
        )?;
        Ok(rows > 0)
    }

    fn set_approval_status(
        &self,
        user_id: &str,
        status: ApprovalStatus,
        approved_at: Option<DateTime<Utc>>,
    ) -> Result<bool> {
        let rows = self.conn().execute(
            "UPDATE client_onboarding
             SET approval_status = ?1, approved_at = COALESCE(?2, approved_at), updated_at = ?3
             WHERE user_id = ?4",
            params![
                status,
                approved_at.as_ref().map(format_datetime),
                format_datetime(&Utc::now()),
                user_id,
            ],
        )?;
        Ok(rows > 0)
    }

    // Project operations

    fn create_project(&self, project: &Project) -> Result<()> {
        self.conn().execute(
            "INSERT INTO projects (id, client_id, name, description, status, health_status,
                 waiting_on, support_plan, internal_notes, launch_date, launch_notes,
                 created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
            params![
                project.id,
                project.client_id,
                project.name,
                project.description,
                project.status,
                project.health_status,
                project.waiting_on,
                project.support_plan,
                project.internal_notes,
                project.launch_date.as_ref().map(format_datetime),
                project.launch_notes,
                format_datetime(&project.created_at),
                format_datetime(&project.updated_at),
            ],
        )?;
        Ok(())
    }

    fn get_project(&self, id: &str) -> Result<Option<Project>> {
        self.query_one(
            &format!("SELECT {PROJECT_COLUMNS} FROM projects WHERE id = ?1"),
            params![id],
            project_from_row,
        )
    }

    fn list_projects(&self) -> Result<Vec<Project>> {
        self.query_all(
            &format!("SELECT {PROJECT_COLUMNS} FROM projects ORDER BY created_at DESC"),
            [],
            project_from_row,
        )
    }

    fn list_client_projects(&self, client_id: &str) -> Result<Vec<Project>> {
        self.query_all(
            &format!(
                "SELECT {PROJECT_COLUMNS} FROM projects WHERE client_id = ?1
                 ORDER BY created_at DESC"
            ),
            params![client_id],
            project_from_row,
        )
    }

    fn update_project(&self, project: &Project) -> Result<()> {
        let rows = self.conn().execute(
            "UPDATE projects SET name = ?1, description = ?2, status = ?3, health_status = ?4,
                 waiting_on = ?5, support_plan = ?6, internal_notes = ?7, launch_date = ?8,
                 launch_notes = ?9, updated_at = ?10
             WHERE id = ?11",
            params![
                project.name,
                project.description,
                project.status,
                project.health_status,
                project.waiting_on,
                project.support_plan,
                project.internal_notes,
                project.launch_date.as_ref().map(format_datetime),
                project.launch_notes,
                format_datetime(&project.updated_at),
                project.id,
            ],
        )?;

        if rows == 0 {
            return Err(Error::NotFound);
        }
        Ok(())
    }

    // Contract operations

    fn create_contract(&self, contract: &Contract) -> Result<()> {
        self.conn().execute(
            "INSERT INTO contracts (id, client_id, project_id, title, content, is_signed,
                 signature_data, signed_at, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            params![
                contract.id,
                contract.client_id,
                contract.project_id,
                contract.title,
                contract.content,
                contract.is_signed,
                contract.signature_data,
                contract.signed_at.as_ref().map(format_datetime),
                format_datetime(&contract.created_at),
                format_datetime(&contract.updated_at),
            ],
        )?;
        Ok(())
    }

    fn get_contract(&self, id: &str) -> Result<Option<Contract>> {
        self.query_one(
            &format!("SELECT {CONTRACT_COLUMNS} FROM contracts WHERE id = ?1"),
            params![id],
            contract_from_row,
        )
    }

    fn list_contracts(&self) -> Result<Vec<Contract>> {
        self.query_all(
            &format!("SELECT {CONTRACT_COLUMNS} FROM contracts ORDER BY created_at DESC"),
            [],
            contract_from_row,
        )
    }

    fn list_client_contracts(&self, client_id: &str) -> Result<Vec<Contract>> {
        self.query_all(
            &format!(
                "SELECT {CONTRACT_COLUMNS} FROM contracts WHERE client_id = ?1
                 ORDER BY created_at DESC"
            ),
            params![client_id],
            contract_from_row,
        )
    }

    fn update_contract_terms(&self, id: &str, title: &str, content: &str) -> Result<bool> {
        let rows = self.conn().execute(
            "UPDATE contracts SET title = ?1, content = ?2, updated_at = ?3
             WHERE id = ?4 AND is_signed = 0",
            params![title, content, format_datetime(&Utc::now()), id],
        )?;
        Ok(rows > 0)
    }

    fn sign_contract(
        &self,
        id: &str,
        client_id: &str,
        signature_data: &str,
        signed_at: DateTime<Utc>,
    ) -> Result<bool> {
        let now = format_datetime(&signed_at);
        let rows = self.conn().execute(
            "UPDATE contracts SET is_signed = 1, signature_data = ?1, signed_at = ?2, updated_at = ?2
             WHERE id = ?3 AND client_id = ?4 AND is_signed = 0",
            params![signature_data, now, id, client_id],
        )?;
        Ok(rows > 0)
    }

    fn has_signed_contract(&self, client_id: &str) -> Result<bool> {
        let signed: bool = self.conn().query_row(
            "SELECT EXISTS(SELECT 1 FROM contracts WHERE client_id = ?1 AND is_signed = 1)",
            params![client_id],
            |row| row.get(0),
        )?;
        Ok(signed)
    }

    // Deliverable operations

    fn create_deliverable(&self, deliverable: &Deliverable) -> Result<()> {
        self.conn().execute(
            "INSERT INTO deliverables (id, project_id, title, description, file_url, file_type,
                 external_link, version, is_delivered, delivered_at, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
            params![
                deliverable.id,
                deliverable.project_id,
                deliverable.title,
                deliverable.description,
                deliverable.file_url,
                deliverable.file_type,
                deliverable.external_link,
                deliverable.version,
                deliverable.is_delivered,
                deliverable.delivered_at.as_ref().map(format_datetime),
                format_datetime(&deliverable.created_at),
                format_datetime(&deliverable.updated_at),
            ],
        )?;
        Ok(())
    }

    fn get_deliverable(&self, id: &str) -> Result<Option<Deliverable>> {
        self.query_one(
            &format!("SELECT {DELIVERABLE_COLUMNS} FROM deliverables WHERE id = ?1"),
            params![id],
            deliverable_from_row,
        )
    }

    fn list_deliverables(&self) -> Result<Vec<Deliverable>> {
        self.query_all(
            &format!("SELECT {DELIVERABLE_COLUMNS} FROM deliverables ORDER BY created_at DESC"),
            [],
            deliverable_from_row,
        )
    }

    fn list_project_deliverables(
        &self,
        project_id: &str,
        delivered_only: bool,
    ) -> Result<Vec<Deliverable>> {
        self.query_all(
            &format!(
                "SELECT {DELIVERABLE_COLUMNS} FROM deliverables
                 WHERE project_id = ?1 AND (?2 = 0 OR is_delivered = 1)
                 ORDER BY created_at DESC"
            ),
            params![project_id, delivered_only],
            deliverable_from_row,
        )
    }

    fn update_deliverable(&self, deliverable: &Deliverable) -> Result<()> {
        let rows = self.conn().execute(
            "UPDATE deliverables SET title = ?1, description = ?2, file_url = ?3, file_type = ?4,
                 external_link = ?5, version = ?6, is_delivered = ?7, delivered_at = ?8,
                 updated_at = ?9
             WHERE id = ?10",
            params![
                deliverable.title,
                deliverable.description,
                deliverable.file_url,
                deliverable.file_type,
                deliverable.external_link,
                deliverable.version,
                deliverable.is_delivered,
                deliverable.delivered_at.as_ref().map(format_datetime),
                format_datetime(&deliverable.updated_at),
                deliverable.id,
            ],
        )?;

        if rows == 0 {
            return Err(Error::NotFound);
        }
        Ok(())
    }

    fn delete_deliverable(&self, id: &str) -> Result<bool> {
        let rows = self
            .conn()
            .execute("DELETE FROM deliverables WHERE id = ?1", params![id])?;
        Ok(rows > 0)
    }

    // Invoice operations

    fn create_invoice(&self, invoice: &Invoice) -> Result<()> {
        self.conn().execute(
            "INSERT INTO invoices (id, project_id, client_id, amount, currency, description,
                 due_date, status, paid_at, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            params![
                invoice.id,
                invoice.project_id,
                invoice.client_id,
                invoice.amount,
                invoice.currency,
                invoice.description,
                invoice.due_date,
                invoice.status,
                invoice.paid_at.as_ref().map(format_datetime),
                format_datetime(&invoice.created_at),
                format_datetime(&invoice.updated_at),
            ],
        )?;
        Ok(())
    }

    fn get_invoice(&self, id: &str) -> Result<Option<Invoice>> {
        self.query_one(
            &format!("SELECT {INVOICE_COLUMNS} FROM invoices WHERE id = ?1"),
            params![id],
            invoice_from_row,
        )
    }

    fn list_invoices(&self) -> Result<Vec<Invoice>> {
        self.query_all(
            &format!("SELECT {INVOICE_COLUMNS} FROM invoices ORDER BY created_at DESC"),
            [],
            invoice_from_row,
        )
    }

    fn list_project_invoices(&self, project_id: &str) -> Result<Vec<Invoice>> {
        self.query_all(
            &format!(
                "SELECT {INVOICE_COLUMNS} FROM invoices WHERE project_id = ?1
                 ORDER BY created_at DESC"
            ),
            params![project_id],
            invoice_from_row,
        )
    }

    fn set_invoice_status(
        &self,
        id: &str,
        status: InvoiceStatus,
        paid_at: Option<DateTime<Utc>>,
    ) -> Result<bool> {
        let rows = self.conn().execute(
            "UPDATE invoices SET status = ?1, paid_at = ?2, updated_at = ?3 WHERE id = ?4",
            params![
                status,
                paid_at.as_ref().map(format_datetime),
                format_datetime(&Utc::now()),
                id,
            ],
        )?;
        Ok(rows > 0)
    }

    // Message operations

    fn create_message(&self, message: &Message) -> Result<()> {
        self.conn().execute(
            "INSERT INTO messages (id, project_id, sender_id, content, is_read, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                message.id,
                message.project_id,
                message.sender_id,
                message.content,
                message.is_read,
                format_datetime(&message.created_at),
            ],
        )?;
        Ok(())
    }

    fn list_project_messages(&self, project_id: &str) -> Result<Vec<Message>> {
        self.query_all(
            &format!(
                "SELECT {MESSAGE_COLUMNS} FROM messages WHERE project_id = ?1
                 ORDER BY created_at ASC, rowid ASC"
            ),
            params![project_id],
            message_from_row,
        )
    }

    fn mark_messages_read(&self, project_id: &str, reader_id: &str) -> Result<usize> {
        let rows = self.conn().execute(
            "UPDATE messages SET is_read = 1
             WHERE project_id = ?1 AND sender_id != ?2 AND is_read = 0",
            params![project_id, reader_id],
        )?;
        Ok(rows)
    }

    // Milestone operations

    fn create_milestone(&self, milestone: &Milestone) -> Result<()> {
        self.conn().execute(
            "INSERT INTO milestones (id, project_id, title, description, status, due_date,
                 is_completed, completed_at, sort_order, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            params![
                milestone.id,
                milestone.project_id,
                milestone.title,
                milestone.description,
                milestone.status,
                milestone.due_date,
                milestone.is_completed,
                milestone.completed_at.as_ref().map(format_datetime),
                milestone.sort_order,
                format_datetime(&milestone.created_at),
                format_datetime(&milestone.updated_at),
            ],
        )?;
        Ok(())
    }

    fn get_milestone(&self, id: &str) -> Result<Option<Milestone>> {
        self.query_one(
            &format!("SELECT {MILESTONE_COLUMNS} FROM milestones WHERE id = ?1"),
            params![id],
            milestone_from_row,
        )
    }

    fn list_project_milestones(&self, project_id: &str) -> Result<Vec<Milestone>> {
        self.query_all(
            &format!(
                "SELECT {MILESTONE_COLUMNS} FROM milestones WHERE project_id = ?1
                 ORDER BY sort_order ASC, created_at ASC"
            ),
            params![project_id],
            milestone_from_row,
        )
    }

    fn update_milestone(&self, milestone: &Milestone) -> Result<()> {
        let rows = self.conn().execute(
            "UPDATE milestones SET title = ?1, description = ?2, status = ?3, due_date = ?4,
                 is_completed = ?5, completed_at = ?6, sort_order = ?7, updated_at = ?8
             WHERE id = ?9",
            params![
                milestone.title,
                milestone.description,
                milestone.status,
                milestone.due_date,
                milestone.is_completed,
                milestone.completed_at.as_ref().map(format_datetime),
                milestone.sort_order,
                format_datetime(&milestone.updated_at),
                milestone.id,
            ],
        )?;

        if rows == 0 {
            return Err(Error::NotFound);
        }
        Ok(())
    }

    fn delete_milestone(&self, id: &str) -> Result<bool> {
        let rows = self
            .conn()
            .execute("DELETE FROM milestones WHERE id = ?1", params![id])?;
        Ok(rows > 0)
    }

    // Milestone approval operations

    fn create_approval(&self, approval: &MilestoneApproval) -> Result<()> {
        let result = self.conn().execute(
            "INSERT INTO milestone_approvals (id, project_id, approval_type, approved_by, notes, approved_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                approval.id,
                approval.project_id,
                approval.approval_type,
                approval.approved_by,
                approval.notes,
                format_datetime(&approval.approved_at),
            ],
        );

        match result {
            Ok(_) => Ok(()),
            Err(e) if is_unique_violation(&e) => Err(Error::AlreadyExists),
            Err(e) => Err(Error::from(e)),
        }
    }

    fn list_project_approvals(&self, project_id: &str) -> Result<Vec<MilestoneApproval>> {
        self.query_all(
            &format!(
                "SELECT {APPROVAL_COLUMNS} FROM milestone_approvals WHERE project_id = ?1
                 ORDER BY approved_at ASC"
            ),
            params![project_id],
            approval_from_row,
        )
    }

    fn dashboard_stats(&self) -> Result<DashboardStats> {
        let stats = self.conn().query_row(
            "SELECT
                 (SELECT COUNT(*) FROM client_onboarding WHERE approval_status = 'pending'),
                 (SELECT COUNT(*) FROM projects WHERE status != 'delivered'),
                 (SELECT COUNT(*) FROM invoices WHERE status = 'pending')",
            [],
            |row| {
                Ok(DashboardStats {
                    pending_approvals: row.get(0)?,
                    active_projects: row.get(1)?,
                    pending_invoices: row.get(2)?,
                })
            },
        )?;
        Ok(stats)
    }
}
