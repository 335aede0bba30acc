//! Tests for the scheduler module.

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::str::FromStr;

    use chrono::Utc;
    use cron::Schedule;
    use quotron_core::JobDefinition;

    use crate::scheduler::cron::{is_cron_due, normalize_cron};
    use crate::scheduler::JobScheduler;

    fn make_job(name: &str, cron: &str, enabled: bool) -> JobDefinition {
        JobDefinition {
            name: name.to_string(),
            cron: cron.to_string(),
            enabled,
            params: HashMap::new(),
        }
    }

    #[test]
    fn normalize_cron_5_to_6_fields() {
        assert_eq!(normalize_cron("*/15 * * * *"), "0 */15 * * * *");
        assert_eq!(normalize_cron("0 6 * * 1-5"), "0 0 6 * * 1-5");
    }

    #[test]
    fn normalize_cron_already_6_fields() {
        assert_eq!(normalize_cron("0 */15 * * * *"), "0 */15 * * * *");
    }

    #[test]
    fn normalize_cron_trims_whitespace() {
        assert_eq!(normalize_cron("  */5 * * * *  "), "0 */5 * * * *");
    }

    #[test]
    fn should_run_within_cron_window() {
        let mut sched = JobScheduler::new();
        sched.sync_jobs(&[make_job("j1", "* * * * *", true)]);

        assert!(sched.should_run("j1", Utc::now()));
    }

    #[test]
    fn should_run_disabled_job_returns_false() {
        let mut sched = JobScheduler::new();
        sched.sync_jobs(&[make_job("j1", "* * * * *", false)]);

        assert!(!sched.should_run("j1", Utc::now()));
    }

    #[test]
    fn should_run_unknown_job_returns_false() {
        let sched = JobScheduler::new();
        assert!(!sched.should_run("nonexistent", Utc::now()));
    }

    #[test]
    fn should_run_while_running_returns_false() {
        let mut sched = JobScheduler::new();
        sched.sync_jobs(&[make_job("j1", "* * * * *", true)]);
        sched.mark_running("j1");

        assert!(!sched.should_run("j1", Utc::now()));
        assert!(sched.is_running("j1"));
    }

    #[test]
    fn mark_finished_clears_running_and_sets_last_triggered() {
        let mut sched = JobScheduler::new();
        sched.sync_jobs(&[make_job("j1", "* * * * *", true)]);
        sched.mark_running("j1");
        sched.mark_finished("j1");

        assert!(!sched.is_running("j1"));
        assert!(sched.get("j1").unwrap().last_triggered.is_some());
    }

    #[test]
    fn should_run_after_recent_trigger_respects_last_run() {
        let mut sched = JobScheduler::new();
        sched.sync_jobs(&[make_job("j1", "*/5 * * * *", true)]);

        let just_after_tick = chrono::DateTime::parse_from_rfc3339("2026-01-15T10:00:01Z")
            .unwrap()
            .with_timezone(&Utc);
        sched.record_trigger_at("j1", just_after_tick);

        let two_min_later = just_after_tick + chrono::Duration::minutes(2);
        assert!(!sched.should_run("j1", two_min_later));

        let five_min_later = just_after_tick + chrono::Duration::minutes(5);
        assert!(sched.should_run("j1", five_min_later));
    }

    #[test]
    fn sync_jobs_adds_new_jobs() {
        let mut sched = JobScheduler::new();
        assert!(sched.is_empty());

        sched.sync_jobs(&[
            make_job("j1", "* * * * *", true),
            make_job("j2", "*/5 * * * *", true),
        ]);

        assert_eq!(sched.len(), 2);
        assert!(sched.get("j1").is_some());
        assert!(sched.get("j2").is_some());
    }

    #[test]
    fn sync_jobs_removes_deleted_jobs() {
        let mut sched = JobScheduler::new();
        sched.sync_jobs(&[make_job("j1", "* * * * *", true), make_job("j2", "* * * * *", true)]);
        assert_eq!(sched.len(), 2);

        sched.sync_jobs(&[make_job("j1", "* * * * *", true)]);

        assert_eq!(sched.len(), 1);
        assert!(sched.get("j2").is_none());
    }

    #[test]
    fn sync_jobs_updates_changed_preserves_last_triggered() {
        let mut sched = JobScheduler::new();
        sched.sync_jobs(&[make_job("j1", "* * * * *", true)]);

        let trigger_time = Utc::now();
        sched.record_trigger_at("j1", trigger_time);

        sched.sync_jobs(&[make_job("j1", "*/5 * * * *", false)]);

        let entry = sched.get("j1").unwrap();
        assert_eq!(entry.cron_expression, "0 */5 * * * *");
        assert!(!entry.enabled);
        assert_eq!(entry.last_triggered, Some(trigger_time));
    }

    #[test]
    fn due_jobs_returns_correct_subset() {
        let mut sched = JobScheduler::new();
        sched.sync_jobs(&[
            make_job("always", "* * * * *", true),
            make_job("disabled", "* * * * *", false),
        ]);

        let due = sched.due_jobs(Utc::now());
        assert_eq!(due, vec!["always"]);
    }

    #[test]
    fn is_cron_due_never_run_before() {
        let schedule = Schedule::from_str("0 * * * * *").unwrap();
        let now = Utc::now();
        assert!(is_cron_due(&schedule, now, None));
    }

    #[test]
    fn is_cron_due_just_ran() {
        let schedule = Schedule::from_str("0 * * * * *").unwrap();
        let now = Utc::now();
        assert!(!is_cron_due(&schedule, now, Some(now)));
    }
}
