use serde::{Deserialize, Serialize};

pub const BACKEND_RUNNING: &str = "✅ Running";
pub const DATABASE_NOT_AVAILABLE: &str = "❌ Not Available";
pub const DATABASE_WORKING: &str = "✅ Connected & Working";
pub const ENV_SET: &str = "✅ Set";
pub const ENV_NOT_SET: &str = "❌ Not Set";

/// Collections listed in a diagnostics report
pub const MAX_REPORTED_COLLECTIONS: usize = 10;

/// Error text is cut to this many characters in a diagnostics report
pub const MAX_REPORTED_ERROR_CHARS: usize = 50;

/// Availability report served at `/test`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatabaseDiagnostics {
    pub backend: String,
    pub database: String,
    pub database_url: String,
    pub database_name: String,
    pub connection_status: String,
    pub collections: Vec<String>,
}

impl DatabaseDiagnostics {
    /// Report for a process with no store configured
    pub fn disconnected(database_url_set: bool, database_name_set: bool) -> Self {
        Self {
            backend: BACKEND_RUNNING.to_string(),
            database: DATABASE_NOT_AVAILABLE.to_string(),
            database_url: env_presence(database_url_set),
            database_name: env_presence(database_name_set),
            connection_status: "Not Connected".to_string(),
            collections: Vec::new(),
        }
    }

    pub fn connected(mut self, collections: Vec<String>) -> Self {
        self.database = DATABASE_WORKING.to_string();
        self.connection_status = "Connected".to_string();
        self.collections = collections
            .into_iter()
            .take(MAX_REPORTED_COLLECTIONS)
            .collect();
        self
    }

    pub fn connected_with_error(mut self, error: &str) -> Self {
        let truncated: String = error.chars().take(MAX_REPORTED_ERROR_CHARS).collect();
        self.database = format!("⚠️  Connected but Error: {}", truncated);
        self.connection_status = "Connected".to_string();
        self
    }
}

fn env_presence(set: bool) -> String {
    if set { ENV_SET } else { ENV_NOT_SET }.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disconnected_report() {
        let report = DatabaseDiagnostics::disconnected(false, true);

        assert_eq!(report.backend, "✅ Running");
        assert_eq!(report.database, "❌ Not Available");
        assert_eq!(report.database_url, "❌ Not Set");
        assert_eq!(report.database_name, "✅ Set");
        assert_eq!(report.connection_status, "Not Connected");
        assert!(report.collections.is_empty());
    }

    #[test]
    fn test_connected_report_caps_collections() {
        let collections = (0..15).map(|i| format!("collection{}", i)).collect();
        let report = DatabaseDiagnostics::disconnected(true, true).connected(collections);

        assert_eq!(report.database, "✅ Connected & Working");
        assert_eq!(report.connection_status, "Connected");
        assert_eq!(report.collections.len(), 10);
        assert_eq!(report.collections[0], "collection0");
    }

    #[test]
    fn test_error_report_truncates_message() {
        let report = DatabaseDiagnostics::disconnected(true, true)
            .connected_with_error(&"e".repeat(80));

        assert_eq!(
            report.database,
            format!("⚠️  Connected but Error: {}", "e".repeat(50))
        );
    }
}
