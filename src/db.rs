use sqlx::{postgres::PgPoolOptions, PgPool};

/// Schema for the leads table when the service owns the database.
/// `{table}` is replaced with the configured table name.
const LEADS_SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS {table} (
    id uuid PRIMARY KEY DEFAULT gen_random_uuid(),
    name text NOT NULL CHECK (length(btrim(name)) > 0),
    email text NOT NULL,
    company text,
    status text NOT NULL DEFAULT 'new' CHECK (status IN ('new', 'contacted', 'converted')),
    created_at timestamptz NOT NULL DEFAULT now(),
    updated_at timestamptz NOT NULL DEFAULT now()
)
"#;

const LEADS_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS {table}_created_at_idx ON {table} (created_at DESC)";

/// Schema statements for `table`, in execution order.
pub fn schema_statements(table: &str) -> [String; 2] {
    [
        LEADS_SCHEMA.replace("{table}", table),
        LEADS_INDEX.replace("{table}", table),
    ]
}

pub struct Database {
    pub pool: PgPool,
}

impl Database {
    pub async fn new(database_url: &str) -> anyhow::Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await?;

        sqlx::query("SELECT 1").execute(&pool).await?;

        Ok(Self { pool })
    }

    /// Creates the leads table and its listing index if missing.
    pub async fn ensure_schema(&self, table: &str) -> anyhow::Result<()> {
        for statement in schema_statements(table) {
            sqlx::query(&statement).execute(&self.pool).await?;
        }
        tracing::info!("Leads schema verified ({})", table);
        Ok(())
    }
}
