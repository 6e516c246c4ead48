pub const CURRENT_SCHEMA: &str = r#"
PRAGMA foreign_keys = 1;

CREATE TABLE IF NOT EXISTS user_credentials (
    id INTEGER PRIMARY KEY,
    username TEXT NOT NULL UNIQUE,
    password_hash TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS user_sessions (
    id INTEGER PRIMARY KEY,
    user_id INTEGER NOT NULL,
    token TEXT NOT NULL UNIQUE,
    created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP,
    expires_at TIMESTAMP NOT NULL,
    FOREIGN KEY (user_id) REFERENCES user_credentials (id) ON DELETE CASCADE
);

CREATE TABLE IF NOT EXISTS user_profiles (
    id INTEGER PRIMARY KEY,
    full_name TEXT NOT NULL,
    address_1 TEXT NOT NULL,
    address_2 TEXT,
    city TEXT NOT NULL,
    state TEXT NOT NULL,
    zipcode TEXT NOT NULL,
    preferences TEXT,
    availability TEXT NOT NULL DEFAULT '[]',
    FOREIGN KEY (id) REFERENCES user_credentials (id) ON DELETE CASCADE
);

CREATE TABLE IF NOT EXISTS skills (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL UNIQUE COLLATE NOCASE
);

CREATE TABLE IF NOT EXISTS profile_skills (
    profile_id INTEGER NOT NULL,
    skill_id INTEGER NOT NULL,
    position INTEGER NOT NULL DEFAULT 0,
    PRIMARY KEY (profile_id, skill_id),
    FOREIGN KEY (profile_id) REFERENCES user_profiles (id) ON DELETE CASCADE,
    FOREIGN KEY (skill_id) REFERENCES skills (id) ON DELETE CASCADE
);

CREATE TABLE IF NOT EXISTS event_details (
    id INTEGER PRIMARY KEY,
    event_name TEXT NOT NULL,
    description TEXT NOT NULL,
    location TEXT NOT NULL,
    urgency TEXT NOT NULL,
    event_date DATE NOT NULL
);

CREATE TABLE IF NOT EXISTS event_skills (
    event_id INTEGER NOT NULL,
    skill_id INTEGER NOT NULL,
    position INTEGER NOT NULL DEFAULT 0,
    PRIMARY KEY (event_id, skill_id),
    FOREIGN KEY (event_id) REFERENCES event_details (id) ON DELETE CASCADE,
    FOREIGN KEY (skill_id) REFERENCES skills (id) ON DELETE CASCADE
);

-- event_id has no foreign key: rows outlive a deleted event until removed explicitly
CREATE TABLE IF NOT EXISTS volunteer_history (
    id INTEGER PRIMARY KEY,
    user_id INTEGER NOT NULL,
    event_id INTEGER NOT NULL,
    participation_date DATE NOT NULL,
    session_active BOOLEAN NOT NULL DEFAULT 1,
    FOREIGN KEY (user_id) REFERENCES user_profiles (id) ON DELETE CASCADE
);

CREATE INDEX IF NOT EXISTS idx_volunteer_history_event ON volunteer_history (event_id, session_active);
CREATE INDEX IF NOT EXISTS idx_volunteer_history_user ON volunteer_history (user_id, session_active);
CREATE INDEX IF NOT EXISTS idx_event_details_name ON event_details (event_name);
"#;
