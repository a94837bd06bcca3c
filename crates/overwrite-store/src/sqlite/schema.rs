//! SQLite schema for command permission overwrites.

pub const CREATE_TABLES: &str = r#"
CREATE TABLE IF NOT EXISTS overwrite_metadata (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL,
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
);

-- List columns hold JSON arrays; requirement lists may nest one level
-- (["a", ["b", "c"]] means a AND (b OR c)).
CREATE TABLE IF NOT EXISTS command_permission_overwrites (
    id INTEGER PRIMARY KEY,
    scope_id TEXT NOT NULL,
    commands_json TEXT NOT NULL,
    on_match TEXT NOT NULL,
    disabled INTEGER NOT NULL DEFAULT 0,
    required_channels_json TEXT,
    required_roles_json TEXT,
    required_permissions_json TEXT,
    required_system_permissions_json TEXT,
    required_users_json TEXT,
    required_level INTEGER
);

CREATE INDEX IF NOT EXISTS idx_overwrites_scope ON command_permission_overwrites(scope_id, disabled);

INSERT OR REPLACE INTO overwrite_metadata (key, value) VALUES ('schema_version', '1');
"#;
