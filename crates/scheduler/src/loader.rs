//! Loads job definitions from a YAML file (spec §4.4).

use std::path::Path;

use quotron_core::JobDefinition;

#[derive(Debug, serde::Deserialize)]
struct JobsFile {
    jobs: Vec<JobDefinition>,
}

pub fn load_jobs(path: &Path) -> anyhow::Result<Vec<JobDefinition>> {
    let contents = std::fs::read_to_string(path)?;
    let file: JobsFile = serde_yaml::from_str(&contents)?;
    Ok(file.jobs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_jobs_parses_yaml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("jobs.yaml");
        std::fs::write(
            &path,
            r#"
jobs:
  - name: stocks-5m
    cron: "*/5 * * * *"
    enabled: true
    params:
      symbols: "AAPL,MSFT"
      category: stocks
"#,
        )
        .unwrap();

        let jobs = load_jobs(&path).unwrap();
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].name, "stocks-5m");
        assert_eq!(jobs[0].symbols(), vec!["AAPL", "MSFT"]);
    }
}
