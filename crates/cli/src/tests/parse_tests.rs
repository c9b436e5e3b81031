#[cfg(test)]
mod tests {
    use crate::cmd::Commands;
    use crate::Opts;
    use clap::Parser;

    fn parse(args: &[&str]) -> Opts {
        let mut full = vec!["fleetwatch"];
        full.extend_from_slice(args);
        Opts::parse_from(full)
    }

    fn try_parse(args: &[&str]) -> Result<Opts, clap::Error> {
        let mut full = vec!["fleetwatch"];
        full.extend_from_slice(args);
        Opts::try_parse_from(full)
    }

    #[test]
    fn parse_version() {
        let opts = parse(&["version"]);
        assert!(matches!(opts.cmd, Commands::Version));
    }

    #[test]
    fn parse_json_flag() {
        let opts = parse(&["--json", "version"]);
        assert!(opts.json);
        assert_eq!(opts.output_mode(), crate::output::OutputMode::Json);
    }

    #[test]
    fn parse_server_and_token() {
        let opts = parse(&["--server", "http://fleet:8080", "--token", "abc", "health"]);
        assert_eq!(opts.server, "http://fleet:8080");
        assert_eq!(opts.token.as_deref(), Some("abc"));
        assert!(matches!(opts.cmd, Commands::Health(_)));
    }

    #[test]
    fn parse_alerts_list_filters() {
        let opts = parse(&["alerts", "list", "--severity", "critical", "--open", "--time-range", "24h", "--limit", "5"]);
        let Commands::Alerts(crate::cmd::alerts::AlertsCmd::List(args)) = opts.cmd else {
            panic!("expected alerts list");
        };
        let query = args.query();
        assert!(query.contains(&("severity", "critical".to_string())));
        assert!(query.contains(&("resolved", "false".to_string())));
        assert!(query.contains(&("time_range", "24h".to_string())));
        assert!(query.contains(&("limit", "5".to_string())));
    }

    #[test]
    fn parse_alert_lifecycle_commands() {
        assert!(matches!(parse(&["alerts", "ack", "a-1", "--by", "kim"]).cmd, Commands::Alerts(_)));
        assert!(matches!(parse(&["alerts", "acknowledge", "a-1"]).cmd, Commands::Alerts(_)));
        assert!(matches!(parse(&["alerts", "resolve", "a-1"]).cmd, Commands::Alerts(_)));
        assert!(matches!(parse(&["alerts", "delete", "a-1", "--yes"]).cmd, Commands::Alerts(_)));
        assert!(matches!(parse(&["alerts", "stats", "--time-range", "7d"]).cmd, Commands::Alerts(_)));
    }

    #[test]
    fn alerts_create_body() {
        let opts = parse(&["alerts", "create", "--metric", "battery", "--value", "9.5", "--source", "robot-3"]);
        let Commands::Alerts(crate::cmd::alerts::AlertsCmd::Create(args)) = opts.cmd else {
            panic!("expected alerts create");
        };
        let body = args.body();
        assert_eq!(body["metric_type"], "battery");
        assert_eq!(body["severity"], "info");
        assert_eq!(body["source_id"], "robot-3");
        assert!(body.get("threshold_value").is_none());
    }

    #[test]
    fn thresholds_create_from_flags() {
        let opts = parse(&[
            "thresholds", "create", "--metric", "temperature", "--warning", "60", "--critical", "75",
        ]);
        let Commands::Thresholds(crate::cmd::thresholds::ThresholdsCmd::Create(args)) = opts.cmd else {
            panic!("expected thresholds create");
        };
        let body = args.body().unwrap();
        assert_eq!(body["metric_type"], "temperature");
        assert_eq!(body["critical_value"], 75.0);
        assert_eq!(body["enabled"], true);
        assert!(body.get("source_id").is_none());
    }

    #[test]
    fn thresholds_create_needs_values() {
        let opts = parse(&["thresholds", "create", "--metric", "temperature"]);
        let Commands::Thresholds(crate::cmd::thresholds::ThresholdsCmd::Create(args)) = opts.cmd else {
            panic!("expected thresholds create");
        };
        assert!(args.body().is_err());
    }

    #[test]
    fn thresholds_update_builds_patch() {
        let opts = parse(&["thresholds", "update", "t-1", "--critical", "90", "--disable"]);
        let Commands::Thresholds(crate::cmd::thresholds::ThresholdsCmd::Update(args)) = opts.cmd else {
            panic!("expected thresholds update");
        };
        let body = args.body().unwrap();
        assert_eq!(body["critical_value"], 90.0);
        assert_eq!(body["enabled"], false);
        assert!(body.get("warning_value").is_none());
    }

    #[test]
    fn thresholds_update_rejects_empty_patch() {
        let opts = parse(&["thresholds", "update", "t-1"]);
        let Commands::Thresholds(crate::cmd::thresholds::ThresholdsCmd::Update(args)) = opts.cmd else {
            panic!("expected thresholds update");
        };
        assert!(args.body().is_err());
    }

    #[test]
    fn conflicting_flags_are_rejected() {
        assert!(try_parse(&["thresholds", "update", "t-1", "--enable", "--disable"]).is_err());
        assert!(try_parse(&["thresholds", "create", "--data", "{}", "--metric", "x"]).is_err());
    }

    #[test]
    fn parse_thresholds_crud() {
        assert!(matches!(parse(&["thresholds", "list"]).cmd, Commands::Thresholds(_)));
        assert!(matches!(parse(&["thresholds", "get", "t-1"]).cmd, Commands::Thresholds(_)));
        assert!(matches!(parse(&["thresholds", "delete", "t-1", "--yes"]).cmd, Commands::Thresholds(_)));
    }
}
