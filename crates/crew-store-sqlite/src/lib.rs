//! SQLite storage backend for crew.
//!
//! Single-connection pool: SQLite serializes writers, so every
//! conditional mutation below commits as one atomic statement (or one
//! transaction) and no two conflicting writes can observe the same
//! pre-commit state.

use std::str::FromStr;

use chrono::{DateTime, SubsecRound, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use uuid::Uuid;

use crew_history::{HistoryEntry, HistoryEntryId, HistoryError, HistoryRecorder};
use crew_storage::{
    CreateProjectParams, FileRef, JoinCode, PrincipalId, Project, ProjectId, Store, StoreError,
    Task, TaskDraft, TaskId, TaskStatus,
};

static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");

pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// `~/.crew/store.db` (creates dir with 0700 perms on unix)
    pub async fn open_default() -> Result<Self, StoreError> {
        let dir = dirs::home_dir()
            .ok_or_else(|| StoreError::Backend("no home dir".into()))?
            .join(".crew");
        std::fs::create_dir_all(&dir).map_err(|e| StoreError::Backend(e.to_string()))?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&dir, std::fs::Permissions::from_mode(0o700))
                .map_err(|e| StoreError::Backend(e.to_string()))?;
        }
        let path = dir.join("store.db");
        let url = format!("sqlite://{}", path.to_string_lossy());
        Self::open(&url).await
    }

    pub async fn open_in_memory() -> Result<Self, StoreError> {
        Self::open("sqlite::memory:").await
    }

    pub async fn open(url: &str) -> Result<Self, StoreError> {
        let opts = SqliteConnectOptions::from_str(url)
            .map_err(|e| StoreError::Backend(e.to_string()))?
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(opts)
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;

        MIGRATOR
            .run(&pool)
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;

        Ok(Self { pool })
    }

    /// Assemble a full project record (members, files, tasks in stored order).
    async fn load_project(&self, id: &str) -> Result<Project, StoreError> {
        let row = sqlx::query_as::<_, (String, String, String, i64, String, i64)>(
            "SELECT p.id, p.name, p.description, p.team_size, p.owner_id, p.created_at
               FROM projects p WHERE p.id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StoreError::Backend(e.to_string()))?;

        let (id, name, description, team_size, owner_id, created_at) = match row {
            Some(row) => row,
            None => return Err(StoreError::NotFound),
        };

        let (code,) = sqlx::query_as::<_, (String,)>(
            "SELECT code FROM join_codes WHERE project_id = ?",
        )
        .bind(&id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| StoreError::Backend(e.to_string()))?;

        let member_rows = sqlx::query_as::<_, (String,)>(
            "SELECT principal_id FROM project_members WHERE project_id = ? ORDER BY position",
        )
        .bind(&id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StoreError::Backend(e.to_string()))?;

        let mut members = Vec::with_capacity(member_rows.len());
        for (principal,) in member_rows {
            members.push(PrincipalId(parse_uuid(&principal)?));
        }

        let file_rows = sqlx::query_as::<_, (String, i64, String, String)>(
            "SELECT name, size, content_type, path
               FROM project_files WHERE project_id = ? ORDER BY position",
        )
        .bind(&id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StoreError::Backend(e.to_string()))?;

        let files = file_rows
            .into_iter()
            .map(|(name, size, content_type, path)| FileRef {
                name,
                size,
                content_type,
                path,
            })
            .collect();

        let task_rows =
            sqlx::query_as::<_, (String, String, String, String, String, Option<i64>, i64)>(
                "SELECT id, title, description, assigned_to, status, due_date, created_at
                   FROM tasks WHERE project_id = ? ORDER BY position",
            )
            .bind(&id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;

        let mut tasks = Vec::with_capacity(task_rows.len());
        for (task_id, title, description, assigned_to, status, due_date, task_created) in task_rows
        {
            tasks.push(Task {
                id: TaskId(parse_uuid(&task_id)?),
                title,
                description,
                assigned_to,
                status: status.parse::<TaskStatus>().map_err(StoreError::Backend)?,
                due_date: due_date.map(datetime).transpose()?,
                created_at: datetime(task_created)?,
            });
        }

        Ok(Project {
            id: ProjectId(parse_uuid(&id)?),
            name,
            description,
            team_size: team_size as u32,
            join_code: JoinCode(code),
            owner_id: PrincipalId(parse_uuid(&owner_id)?),
            members,
            files,
            tasks,
            created_at: datetime(created_at)?,
        })
    }
}

fn parse_uuid(s: &str) -> Result<Uuid, StoreError> {
    Uuid::try_parse(s).map_err(|e| StoreError::Backend(e.to_string()))
}

fn datetime(secs: i64) -> Result<DateTime<Utc>, StoreError> {
    DateTime::from_timestamp(secs, 0)
        .ok_or_else(|| StoreError::Backend(format!("invalid timestamp: {}", secs)))
}

#[async_trait::async_trait]
impl Store for SqliteStore {
    async fn create_project(&self, params: &CreateProjectParams) -> Result<Project, StoreError> {
        let id = Uuid::now_v7().to_string();
        let now = Utc::now().timestamp();

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;

        // The join_codes primary key is the global uniqueness constraint;
        // a collision (including with a deleted project's code) surfaces
        // here and the caller redraws.
        sqlx::query("INSERT INTO join_codes(code, project_id) VALUES(?, ?)")
            .bind(&params.join_code.0)
            .bind(&id)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                let s = e.to_string();
                if s.contains("UNIQUE") {
                    StoreError::JoinCodeTaken
                } else {
                    StoreError::Backend(s)
                }
            })?;

        sqlx::query(
            "INSERT INTO projects(id, name, description, team_size, owner_id, created_at)
             VALUES(?, ?, ?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(&params.name)
        .bind(&params.description)
        .bind(params.team_size as i64)
        .bind(params.owner_id.0.to_string())
        .bind(now)
        .execute(&mut *tx)
        .await
        .map_err(|e| StoreError::Backend(e.to_string()))?;

        sqlx::query("INSERT INTO project_members(project_id, principal_id, position) VALUES(?, ?, 0)")
            .bind(&id)
            .bind(params.owner_id.0.to_string())
            .execute(&mut *tx)
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;

        for (position, file) in params.files.iter().enumerate() {
            sqlx::query(
                "INSERT INTO project_files(project_id, position, name, size, content_type, path)
                 VALUES(?, ?, ?, ?, ?, ?)",
            )
            .bind(&id)
            .bind(position as i64)
            .bind(&file.name)
            .bind(file.size)
            .bind(&file.content_type)
            .bind(&file.path)
            .execute(&mut *tx)
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;
        }

        tx.commit()
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;

        self.load_project(&id).await
    }

    async fn get_project(&self, project_id: &ProjectId) -> Result<Project, StoreError> {
        self.load_project(&project_id.0.to_string()).await
    }

    async fn list_projects_for(
        &self,
        principal_id: &PrincipalId,
    ) -> Result<Vec<Project>, StoreError> {
        let rows = sqlx::query_as::<_, (String,)>(
            "SELECT p.id
               FROM projects p
               JOIN project_members m ON m.project_id = p.id
              WHERE m.principal_id = ?
              ORDER BY p.created_at, p.id",
        )
        .bind(principal_id.0.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StoreError::Backend(e.to_string()))?;

        let mut out = Vec::with_capacity(rows.len());
        for (id,) in rows {
            out.push(self.load_project(&id).await?);
        }
        Ok(out)
    }

    async fn add_member(
        &self,
        code: &JoinCode,
        principal_id: &PrincipalId,
    ) -> Result<Project, StoreError> {
        let principal = principal_id.0.to_string();

        // Predicate and mutation in one statement: the member is inserted
        // iff not already present and the member count is still below
        // team_size, both evaluated at commit time.
        let result = sqlx::query(
            "INSERT INTO project_members(project_id, principal_id, position)
             SELECT p.id, ?1,
                    (SELECT COUNT(*) FROM project_members m WHERE m.project_id = p.id)
               FROM projects p
               JOIN join_codes c ON c.project_id = p.id
              WHERE c.code = ?2
                AND NOT EXISTS (SELECT 1 FROM project_members m
                                 WHERE m.project_id = p.id AND m.principal_id = ?1)
                AND (SELECT COUNT(*) FROM project_members m WHERE m.project_id = p.id)
                    < p.team_size",
        )
        .bind(&principal)
        .bind(&code.0)
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::Backend(e.to_string()))?;

        let project_id = sqlx::query_as::<_, (String,)>(
            "SELECT p.id FROM projects p JOIN join_codes c ON c.project_id = p.id
              WHERE c.code = ?",
        )
        .bind(&code.0)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StoreError::Backend(e.to_string()))?;

        // Retired codes keep their join_codes row but lose the project row,
        // so both unknown and stale codes land here.
        let (project_id,) = project_id.ok_or(StoreError::NotFound)?;

        if result.rows_affected() == 0 {
            // Admission was rejected at commit time; classify why.
            let member = sqlx::query_as::<_, (i64,)>(
                "SELECT COUNT(*) FROM project_members WHERE project_id = ? AND principal_id = ?",
            )
            .bind(&project_id)
            .bind(&principal)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;

            if member.0 > 0 {
                return Err(StoreError::AlreadyMember);
            }
            return Err(StoreError::CapacityReached);
        }

        self.load_project(&project_id).await
    }

    async fn append_task(
        &self,
        project_id: &ProjectId,
        draft: &TaskDraft,
    ) -> Result<Task, StoreError> {
        let id = Uuid::now_v7();
        let now = Utc::now();
        let status = TaskStatus::Pending;

        let result = sqlx::query(
            "INSERT INTO tasks(id, project_id, position, title, description, assigned_to,
                               status, due_date, created_at)
             SELECT ?1, p.id,
                    (SELECT COUNT(*) FROM tasks t WHERE t.project_id = p.id),
                    ?2, ?3, ?4, ?5, ?6, ?7
               FROM projects p
              WHERE p.id = ?8",
        )
        .bind(id.to_string())
        .bind(&draft.title)
        .bind(&draft.description)
        .bind(&draft.assigned_to)
        .bind(status.to_string())
        .bind(draft.due_date.map(|d| d.timestamp()))
        .bind(now.timestamp())
        .bind(project_id.0.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::Backend(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }

        Ok(Task {
            id: TaskId(id),
            title: draft.title.clone(),
            description: draft.description.clone(),
            assigned_to: draft.assigned_to.clone(),
            status,
            due_date: draft.due_date.map(|d| d.trunc_subsecs(0)),
            created_at: now.trunc_subsecs(0),
        })
    }

    async fn delete_project(
        &self,
        project_id: &ProjectId,
        owner_id: &PrincipalId,
    ) -> Result<Project, StoreError> {
        let id = project_id.0.to_string();
        let project = self.load_project(&id).await?;

        // Conditional on ownership at commit time; member and task rows
        // cascade, the join_codes row is left behind on purpose.
        let result = sqlx::query("DELETE FROM projects WHERE id = ? AND owner_id = ?")
            .bind(&id)
            .bind(owner_id.0.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(project)
    }
}

#[async_trait::async_trait]
impl HistoryRecorder for SqliteStore {
    async fn record(&self, entry: HistoryEntry) -> Result<(), HistoryError> {
        sqlx::query(
            "INSERT INTO history(id, principal_id, action, text, recorded_at)
             VALUES(?, ?, ?, ?, ?)",
        )
        .bind(entry.id.to_string())
        .bind(entry.principal_id.to_string())
        .bind(entry.action.to_string())
        .bind(&entry.text)
        .bind(entry.recorded_at.timestamp())
        .execute(&self.pool)
        .await
        .map_err(|e| HistoryError::Database(e.to_string()))?;
        Ok(())
    }

    async fn history_for(
        &self,
        principal_id: &PrincipalId,
    ) -> Result<Vec<HistoryEntry>, HistoryError> {
        // rowid order is insertion order, which is exactly the order the
        // triggering operations completed.
        let rows = sqlx::query_as::<_, (String, String, String, i64)>(
            "SELECT id, action, text, recorded_at
               FROM history
              WHERE principal_id = ?
              ORDER BY rowid",
        )
        .bind(principal_id.0.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| HistoryError::Database(e.to_string()))?;

        let mut out = Vec::with_capacity(rows.len());
        for (id, action, text, recorded_at) in rows {
            out.push(HistoryEntry {
                id: id
                    .parse::<HistoryEntryId>()
                    .map_err(|e| HistoryError::Database(e.to_string()))?,
                principal_id: principal_id.0,
                action: action.parse().map_err(HistoryError::Database)?,
                text,
                recorded_at: DateTime::from_timestamp(recorded_at, 0)
                    .ok_or_else(|| HistoryError::Database(format!("invalid timestamp: {}", recorded_at)))?,
            });
        }
        Ok(out)
    }
}
