//! SQL schema for the Ideaboard SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

-- Ideas are never deleted.
CREATE TABLE IF NOT EXISTS ideas (
    id                 INTEGER PRIMARY KEY AUTOINCREMENT,
    owner_id           INTEGER NOT NULL,
    display_name       TEXT    NOT NULL,
    short_text         TEXT    NOT NULL,
    full_text          TEXT    NOT NULL,
    vote_count         INTEGER NOT NULL DEFAULT 0,
    has_priority       INTEGER NOT NULL DEFAULT 0,   -- monotonic: 0 -> 1 only
    channel_chat_id    TEXT,
    channel_message_id INTEGER,
    created_at         TEXT    NOT NULL              -- RFC 3339 UTC
);

-- One row per (voter, idea); a changed vote overwrites `direction`.
CREATE TABLE IF NOT EXISTS votes (
    voter_id   INTEGER NOT NULL,
    voter_name TEXT    NOT NULL,
    idea_id    INTEGER NOT NULL REFERENCES ideas(id),
    direction  TEXT    NOT NULL CHECK (direction IN ('up', 'down')),
    PRIMARY KEY (voter_id, idea_id)
);

-- `idea_id` is NULL while a pre-publication boost waits for its idea.
CREATE TABLE IF NOT EXISTS payments (
    id           INTEGER PRIMARY KEY AUTOINCREMENT,
    payer_id     INTEGER NOT NULL,
    idea_id      INTEGER,
    kind         TEXT    NOT NULL,
    amount_stars INTEGER NOT NULL,
    charge_id    TEXT    NOT NULL,
    created_at   TEXT    NOT NULL
);

CREATE TABLE IF NOT EXISTS conversation_log (
    id           INTEGER PRIMARY KEY AUTOINCREMENT,
    session_id   TEXT    NOT NULL,
    user_id      INTEGER NOT NULL,
    user_name    TEXT    NOT NULL,
    turn_number  INTEGER NOT NULL,
    user_message TEXT    NOT NULL,
    model_reply  TEXT    NOT NULL,
    ready        INTEGER NOT NULL,
    published    INTEGER NOT NULL DEFAULT 0,
    created_at   TEXT    NOT NULL
);

CREATE TABLE IF NOT EXISTS pinned_posts (
    kind       TEXT PRIMARY KEY,                    -- 'leaderboard'
    chat_id    TEXT    NOT NULL,
    message_id INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS ideas_vote_count_idx    ON ideas(vote_count DESC);
CREATE INDEX IF NOT EXISTS votes_idea_idx          ON votes(idea_id);
CREATE INDEX IF NOT EXISTS payments_payer_idx      ON payments(payer_id);
CREATE INDEX IF NOT EXISTS conversation_session_idx ON conversation_log(session_id);

PRAGMA user_version = 1;
";
