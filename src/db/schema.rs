//! Idempotent schema, account and seed-data batches.
//!
//! Every statement is safe to re-issue: `IF NOT EXISTS` DDL, `CREATE USER
//! IF NOT EXISTS`, and seed inserts that ride on the tenant-scoped unique
//! keys via `INSERT IGNORE`. A partially provisioned database can always
//! be repaired by a full rerun.

use crate::config::DatabaseConfig;
use crate::db::auth::AuthOutcome;
use crate::db::sql::{self, SqlError};

/// The multi-tenant table set. Each table carries a `site_key`
/// discriminator; identifier-like columns are unique per tenant, never
/// globally, so two sites can both have a `home` page.
const TABLES: &[(&str, &str)] = &[
    (
        "pages",
        "CREATE TABLE IF NOT EXISTS pages (
            id INT UNSIGNED NOT NULL AUTO_INCREMENT,
            site_key VARCHAR(64) NOT NULL,
            slug VARCHAR(191) NOT NULL,
            title VARCHAR(255) NOT NULL,
            body MEDIUMTEXT,
            published TINYINT(1) NOT NULL DEFAULT 0,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP ON UPDATE CURRENT_TIMESTAMP,
            PRIMARY KEY (id),
            UNIQUE KEY uniq_pages_site_slug (site_key, slug),
            KEY idx_pages_site (site_key)
        ) ENGINE=InnoDB;",
    ),
    (
        "projects",
        "CREATE TABLE IF NOT EXISTS projects (
            id INT UNSIGNED NOT NULL AUTO_INCREMENT,
            site_key VARCHAR(64) NOT NULL,
            slug VARCHAR(191) NOT NULL,
            title VARCHAR(255) NOT NULL,
            description TEXT,
            image_url VARCHAR(512),
            sort_order INT NOT NULL DEFAULT 0,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            PRIMARY KEY (id),
            UNIQUE KEY uniq_projects_site_slug (site_key, slug),
            KEY idx_projects_site (site_key)
        ) ENGINE=InnoDB;",
    ),
    (
        "transactions",
        "CREATE TABLE IF NOT EXISTS transactions (
            id INT UNSIGNED NOT NULL AUTO_INCREMENT,
            site_key VARCHAR(64) NOT NULL,
            reference VARCHAR(191) NOT NULL,
            amount DECIMAL(10,2) NOT NULL,
            currency CHAR(3) NOT NULL DEFAULT 'USD',
            status VARCHAR(32) NOT NULL DEFAULT 'pending',
            customer_email VARCHAR(255),
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            PRIMARY KEY (id),
            UNIQUE KEY uniq_transactions_site_ref (site_key, reference),
            KEY idx_transactions_site (site_key)
        ) ENGINE=InnoDB;",
    ),
    (
        "contacts",
        "CREATE TABLE IF NOT EXISTS contacts (
            id INT UNSIGNED NOT NULL AUTO_INCREMENT,
            site_key VARCHAR(64) NOT NULL,
            name VARCHAR(255) NOT NULL,
            email VARCHAR(255) NOT NULL,
            message TEXT,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            PRIMARY KEY (id),
            KEY idx_contacts_site_created (site_key, created_at)
        ) ENGINE=InnoDB;",
    ),
    (
        "appointments",
        "CREATE TABLE IF NOT EXISTS appointments (
            id INT UNSIGNED NOT NULL AUTO_INCREMENT,
            site_key VARCHAR(64) NOT NULL,
            contact_name VARCHAR(255) NOT NULL,
            email VARCHAR(255) NOT NULL,
            scheduled_at DATETIME NOT NULL,
            service VARCHAR(191),
            status VARCHAR(32) NOT NULL DEFAULT 'requested',
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            PRIMARY KEY (id),
            UNIQUE KEY uniq_appointments_site_slot (site_key, email, scheduled_at),
            KEY idx_appointments_site (site_key)
        ) ENGINE=InnoDB;",
    ),
    (
        "site_settings",
        "CREATE TABLE IF NOT EXISTS site_settings (
            id INT UNSIGNED NOT NULL AUTO_INCREMENT,
            site_key VARCHAR(64) NOT NULL,
            setting_name VARCHAR(191) NOT NULL,
            setting_value TEXT,
            updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP ON UPDATE CURRENT_TIMESTAMP,
            PRIMARY KEY (id),
            UNIQUE KEY uniq_settings_site_name (site_key, setting_name)
        ) ENGINE=InnoDB;",
    ),
    (
        "admin_users",
        "CREATE TABLE IF NOT EXISTS admin_users (
            id INT UNSIGNED NOT NULL AUTO_INCREMENT,
            site_key VARCHAR(64) NOT NULL,
            username VARCHAR(191) NOT NULL,
            email VARCHAR(255) NOT NULL,
            password_hash VARCHAR(255) NOT NULL,
            role VARCHAR(32) NOT NULL DEFAULT 'editor',
            last_login DATETIME,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            PRIMARY KEY (id),
            UNIQUE KEY uniq_admin_site_username (site_key, username)
        ) ENGINE=InnoDB;",
    ),
];

/// Create the database and the full table set.
pub fn create_database(config: &DatabaseConfig, auth: &AuthOutcome) -> Result<(), SqlError> {
    sql::execute(&database_sql(&config.name), config, false, auth)?;
    sql::execute(&tables_sql(), config, true, auth)
}

/// Create the service account and grant it full privileges on the one
/// created database, for both local and remote connections.
pub fn create_user(config: &DatabaseConfig, auth: &AuthOutcome) -> Result<(), SqlError> {
    sql::execute(&user_sql(config), config, false, auth)
}

/// Insert tenant-scoped sample rows for the `default` site. Rides on the
/// unique keys, so reruns are no-ops.
pub fn seed(config: &DatabaseConfig, auth: &AuthOutcome) -> Result<(), SqlError> {
    sql::execute(SEED_SQL, config, true, auth)
}

fn database_sql(name: &str) -> String {
    format!(
        "CREATE DATABASE IF NOT EXISTS {} CHARACTER SET utf8mb4 COLLATE utf8mb4_unicode_ci;",
        quote_ident(name)
    )
}

fn tables_sql() -> String {
    TABLES
        .iter()
        .map(|(_, ddl)| *ddl)
        .collect::<Vec<_>>()
        .join("\n")
}

fn user_sql(config: &DatabaseConfig) -> String {
    let password = escape_literal(&config.password);
    let user = escape_literal(&config.user);
    let database = quote_ident(&config.name);
    format!(
        "CREATE USER IF NOT EXISTS '{user}'@'localhost' IDENTIFIED BY '{password}';\n\
         CREATE USER IF NOT EXISTS '{user}'@'%' IDENTIFIED BY '{password}';\n\
         GRANT ALL PRIVILEGES ON {database}.* TO '{user}'@'localhost';\n\
         GRANT ALL PRIVILEGES ON {database}.* TO '{user}'@'%';\n\
         FLUSH PRIVILEGES;"
    )
}

const SEED_SQL: &str = "\
INSERT IGNORE INTO site_settings (site_key, setting_name, setting_value) VALUES
    ('default', 'site_title', 'My Website'),
    ('default', 'contact_email', 'hello@example.com'),
    ('default', 'theme', 'light');
INSERT IGNORE INTO pages (site_key, slug, title, body, published) VALUES
    ('default', 'home', 'Home', 'Welcome to your new website.', 1),
    ('default', 'about', 'About', 'Tell visitors about yourself here.', 0);
INSERT IGNORE INTO projects (site_key, slug, title, description, sort_order) VALUES
    ('default', 'sample-project', 'Sample Project', 'An example portfolio entry.', 1);";

/// Backtick-quote an identifier for interpolation into DDL.
fn quote_ident(ident: &str) -> String {
    format!("`{}`", ident.replace('`', "``"))
}

/// Escape a string literal for single-quoted interpolation.
fn escape_literal(value: &str) -> String {
    value.replace('\\', "\\\\").replace('\'', "\\'")
}
